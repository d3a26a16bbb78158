//! Pipeline input and intermediate types.
//!
//! [`PartialExtraction`] is the typed form of one chunk's model output.
//! Model replies are semi-structured at best, so it is built from a
//! [`serde_json::Value`] through tolerant accessors: wrong-typed or
//! missing keys default to empty, list elements that are not objects are
//! skipped, and unknown keys are ignored.

use serde_json::Value;
use sintese_domain::{CaseRecord, Decision, KeyDocument, MonetaryItem, Party, Side};

/// One source document as delivered by the ingestion collaborator.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Source identifier, typically the file name
    pub source_name: String,
    /// Page texts in page order; empty pages are allowed
    pub pages: Vec<String>,
    /// Flagged important at ingestion (filename prefix or folder)
    pub important: bool,
}

/// A raw timeline entry as reported by the model, before noise filtering
/// and categorization.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    /// Display date, possibly empty
    pub date: String,
    /// Event label
    pub kind: String,
    /// What happened
    pub description: String,
}

/// The typed shape of one chunk's extraction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialExtraction {
    /// Parties named in this chunk
    pub parties: Vec<Party>,
    /// What the action is about
    pub subject_of_action: String,
    /// Narrative of the facts
    pub facts_summary: String,
    /// Monetary values tied to the case
    pub monetary_items: Vec<MonetaryItem>,
    /// Claims/pedidos
    pub claims: Vec<String>,
    /// Decisions found in this chunk
    pub decisions: Vec<Decision>,
    /// Plaintiff's theses
    pub plaintiff_theses: Vec<String>,
    /// Defendant's theses
    pub defendant_theses: Vec<String>,
    /// Principal filings
    pub key_documents: Vec<KeyDocument>,
    /// Raw timeline entries
    pub timeline: Vec<TimelineEntry>,
    /// Current procedural stage
    pub current_status: String,
}

fn text_field(obj: &Value, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn object_items<'a>(obj: &'a Value, key: &str) -> Vec<&'a serde_json::Map<String, Value>> {
    obj.get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_object).collect())
        .unwrap_or_default()
}

fn string_items(obj: &Value, key: &str) -> Vec<String> {
    obj.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn map_text(map: &serde_json::Map<String, Value>, key: &str) -> String {
    map.get(key)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Role labels that put a party on the plaintiff side; everything else is
/// treated as defendant.
fn side_from_label(label: &str) -> Side {
    let upper = label.to_uppercase();
    if upper.contains("AUTOR") || upper.contains("REQUERENTE") || upper.contains("APELANTE") {
        Side::Plaintiff
    } else {
        Side::Defendant
    }
}

impl PartialExtraction {
    /// Build a partial extraction from recovered model JSON.
    pub fn from_value(value: &Value) -> Self {
        let mut partial = PartialExtraction {
            subject_of_action: text_field(value, "objeto_acao"),
            facts_summary: text_field(value, "resumo_fatos"),
            current_status: text_field(value, "status_atual"),
            claims: string_items(value, "pedidos"),
            plaintiff_theses: string_items(value, "teses_autor"),
            defendant_theses: string_items(value, "teses_reu"),
            ..Default::default()
        };

        for p in object_items(value, "partes") {
            let name = map_text(p, "nome");
            if name.is_empty() {
                continue;
            }
            partial.parties.push(Party {
                side: side_from_label(&map_text(p, "polo")),
                name,
            });
        }

        for v in object_items(value, "valores_relevantes") {
            partial.monetary_items.push(MonetaryItem {
                description: map_text(v, "descricao"),
                value: map_text(v, "valor"),
            });
        }

        for d in object_items(value, "decisoes") {
            partial.decisions.push(Decision {
                date: map_text(d, "data"),
                kind: map_text(d, "tipo"),
                content: map_text(d, "conteudo"),
            });
        }

        for d in object_items(value, "documentos_importantes") {
            partial.key_documents.push(KeyDocument {
                kind: map_text(d, "tipo"),
                date: map_text(d, "data"),
                party: map_text(d, "parte"),
                summary: map_text(d, "resumo"),
            });
        }

        for h in object_items(value, "historico_detalhado") {
            let kind = map_text(h, "evento");
            let mut description = map_text(h, "descricao");
            if description.is_empty() {
                // Some models put the whole description under the label key
                description = kind.clone();
            }
            partial.timeline.push(TimelineEntry {
                date: map_text(h, "data"),
                kind,
                description,
            });
        }

        partial
    }
}

impl From<&CaseRecord> for PartialExtraction {
    /// Project a consolidated record back into partial form, so that a
    /// merged record can be fed through consolidation again (re-merging is
    /// idempotent).
    fn from(record: &CaseRecord) -> Self {
        PartialExtraction {
            parties: record.parties.clone(),
            subject_of_action: record.subject_of_action.clone(),
            facts_summary: record.facts_summary.clone(),
            monetary_items: record.monetary_items.clone(),
            claims: record.claims.clone(),
            decisions: record.decisions.clone(),
            plaintiff_theses: record.plaintiff_theses.clone(),
            defendant_theses: record.defendant_theses.clone(),
            key_documents: record.key_documents.clone(),
            timeline: record
                .events
                .iter()
                .map(|e| TimelineEntry {
                    date: e.date.clone(),
                    kind: e.kind.clone(),
                    description: e.description.clone(),
                })
                .collect(),
            current_status: record.current_status.clone(),
        }
    }
}
