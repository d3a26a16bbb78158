//! The case record and its component types.
//!
//! A *partial* record is what one extraction call yields for one chunk of
//! text; the *canonical* record is the consolidated output of a whole run.
//! Both share these types. Serde names follow the report wire format.

use serde::{Deserialize, Serialize};

/// Case-management system that produced the source export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseSystem {
    /// PJe - Processo Judicial Eletrônico
    Pje,
    /// e-Proc federal-court system
    Eproc,
    /// SAJ / e-SAJ
    Saj,
    /// Projudi
    Projudi,
    /// No recognized signature
    #[default]
    #[serde(rename = "generico")]
    Generic,
}

impl CaseSystem {
    /// Lowercase identifier used in diagnostics and the report header.
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseSystem::Pje => "pje",
            CaseSystem::Eproc => "eproc",
            CaseSystem::Saj => "saj",
            CaseSystem::Projudi => "projudi",
            CaseSystem::Generic => "generico",
        }
    }
}

/// Which side of the suit a party is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// The party that brought the action
    #[serde(rename = "Autor")]
    Plaintiff,
    /// The party the action was brought against
    #[serde(rename = "Réu")]
    Defendant,
}

/// A party to the proceeding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    /// Display name as it appears in the record
    #[serde(rename = "nome")]
    pub name: String,
    /// Side of the suit
    #[serde(rename = "polo")]
    pub side: Side,
}

/// Classification of a timeline event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EventCategory {
    /// An act of the proceeding itself (filing, ruling, service, ...)
    #[default]
    #[serde(rename = "processual")]
    Procedural,
    /// A fact of the underlying dispute (contract, payment, listing, ...)
    #[serde(rename = "fatico")]
    Factual,
}

/// One entry of the case timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Display date, `dd/mm/aaaa` when known, possibly empty
    #[serde(rename = "data")]
    pub date: String,
    /// Free-text label (Petição, Sentença, ...)
    #[serde(rename = "evento")]
    pub kind: String,
    /// What happened
    #[serde(rename = "descricao")]
    pub description: String,
    /// Procedural or factual
    #[serde(rename = "categoria", default)]
    pub category: EventCategory,
}

/// A monetary value tied to the case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonetaryItem {
    /// What the value refers to
    #[serde(rename = "descricao")]
    pub description: String,
    /// Display value, e.g. `R$ 10.000,00`
    #[serde(rename = "valor")]
    pub value: String,
}

/// One of the principal filings of the case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyDocument {
    /// Document type label (Petição Inicial, Contestação, ...)
    #[serde(rename = "tipo")]
    pub kind: String,
    /// Display date, possibly empty
    #[serde(rename = "data", default)]
    pub date: String,
    /// Who presented it
    #[serde(rename = "parte", default)]
    pub party: String,
    /// Summary of the document's content
    #[serde(rename = "resumo", default)]
    pub summary: String,
}

/// A judicial decision found in the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Display date, possibly empty
    #[serde(rename = "data", default)]
    pub date: String,
    /// Despacho, Decisão, Sentença, ...
    #[serde(rename = "tipo", default)]
    pub kind: String,
    /// What was decided
    #[serde(rename = "conteudo", default)]
    pub content: String,
}

/// The structured factual summary of a legal proceeding.
///
/// Fields in the first block are set once by pattern extraction and are
/// never overwritten by model output. The remaining fields are filled by
/// the consolidation of per-chunk extractions; all default to empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CaseRecord {
    /// Docket number
    #[serde(rename = "numero", default)]
    pub case_number: String,
    /// Procedural class
    #[serde(rename = "classe", default)]
    pub case_class: String,
    /// Court or chamber
    #[serde(rename = "vara", default)]
    pub court: String,
    /// Claim value as displayed
    #[serde(rename = "valor_causa", default)]
    pub claim_value: String,
    /// Distribution date
    #[serde(rename = "data_distribuicao", default)]
    pub distribution_date: String,
    /// Subject matter
    #[serde(rename = "assunto", default)]
    pub subject: String,
    /// Source case-management system
    #[serde(rename = "sistema", default)]
    pub system: CaseSystem,

    /// What the action is about, one or two sentences
    #[serde(rename = "objeto_acao", default)]
    pub subject_of_action: String,
    /// Narrative of the facts
    #[serde(rename = "resumo_fatos", default)]
    pub facts_summary: String,
    /// Current procedural stage
    #[serde(rename = "status_atual", default)]
    pub current_status: String,

    /// Parties, at most one per normalized name
    #[serde(rename = "partes", default)]
    pub parties: Vec<Party>,
    /// Deduplicated monetary values
    #[serde(rename = "valores_relevantes", default)]
    pub monetary_items: Vec<MonetaryItem>,
    /// Claims/pedidos
    #[serde(rename = "pedidos", default)]
    pub claims: Vec<String>,
    /// Plaintiff's theses
    #[serde(rename = "teses_autor", default)]
    pub plaintiff_theses: Vec<String>,
    /// Defendant's theses
    #[serde(rename = "teses_reu", default)]
    pub defendant_theses: Vec<String>,
    /// Principal filings, one per document-type label
    #[serde(rename = "documentos_importantes", default)]
    pub key_documents: Vec<KeyDocument>,
    /// Decisions, in the order they were seen
    #[serde(rename = "decisoes", default)]
    pub decisions: Vec<Decision>,

    /// Procedural timeline, chronological
    #[serde(rename = "historico_processual", default)]
    pub procedural_events: Vec<Event>,
    /// Factual timeline, chronological
    #[serde(rename = "historico_fatico", default)]
    pub factual_events: Vec<Event>,
    /// Combined view of both timelines, re-sorted by date
    #[serde(rename = "historico_detalhado", default)]
    pub events: Vec<Event>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_default_is_generic() {
        assert_eq!(CaseSystem::default(), CaseSystem::Generic);
        assert_eq!(CaseSystem::Generic.as_str(), "generico");
    }

    #[test]
    fn test_record_default_is_empty() {
        let record = CaseRecord::default();
        assert!(record.case_number.is_empty());
        assert!(record.parties.is_empty());
        assert!(record.events.is_empty());
        assert_eq!(record.system, CaseSystem::Generic);
    }

    #[test]
    fn test_record_serializes_with_wire_names() {
        let record = CaseRecord {
            case_number: "0001234-56.2023.8.13.0001".to_string(),
            parties: vec![Party {
                name: "Empresa ABC".to_string(),
                side: Side::Plaintiff,
            }],
            ..Default::default()
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["numero"], "0001234-56.2023.8.13.0001");
        assert_eq!(json["partes"][0]["nome"], "Empresa ABC");
        assert_eq!(json["partes"][0]["polo"], "Autor");
        assert_eq!(json["sistema"], "generico");
    }
}
