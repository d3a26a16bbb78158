//! Consolidation of per-chunk extractions into one canonical record.
//!
//! The merge is pure over its inputs and commutative for every
//! set/sequence field; only the explicitly first-wins scalar fields
//! depend on input order. It is also idempotent: feeding an already
//! consolidated record back through changes nothing. Deduplication keys
//! are deliberately coarse, model output phrases the same fact many
//! ways across chunks.

use crate::types::{PartialExtraction, TimelineEntry};
use crate::util::char_prefix;
use sintese_domain::{
    normalize_name, parse_brl_amount, CaseRecord, Event, EventCategory, MonetaryItem,
};
use std::collections::HashSet;

/// Clerical boilerplate: an event whose description contains any of
/// these is dropped from the timeline.
const NOISE_PHRASES: &[&str] = &[
    "assinado eletronicamente",
    "assinatura eletrônica",
    "documento assinado",
    "concluso para assinatura",
    "conclusos para",
    "remetido para",
    "juntada automática",
    "certidão de publicação",
    "vista ao",
    "autos recebidos",
    "aguardando",
    "expediente forense",
    "não houve expediente",
    "feriado",
    "recesso",
    "portaria conjunta",
];

/// Substantive-fact markers: an event mentioning one of these belongs to
/// the factual timeline rather than the procedural one.
const FACTUAL_KEYWORDS: &[&str] = &[
    "contrato",
    "pagamento",
    "pago",
    "boleto",
    "parcela",
    "protesto",
    "negativação",
    "serasa",
    "spc",
    "cadastro",
    "whatsapp",
    "mensagem",
    "email",
    "notificação extrajudicial",
    "renegociação",
    "acordo",
    "tratamento",
    "serviço",
    "emissão",
    "vencimento",
    "prestação",
];

/// Characters of a free-text entry used as its deduplication key.
const LIST_KEY_CHARS: usize = 50;
/// Characters of an event description used in its deduplication key.
const EVENT_KEY_CHARS: usize = 30;

fn is_relevant(description: &str) -> bool {
    if description.is_empty() {
        return false;
    }
    let lower = description.to_lowercase();
    !NOISE_PHRASES.iter().any(|noise| lower.contains(noise))
}

fn categorize(description: &str) -> EventCategory {
    let lower = description.to_lowercase();
    if FACTUAL_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        EventCategory::Factual
    } else {
        EventCategory::Procedural
    }
}

/// Key for monetary deduplication: rounded numeric value plus the first
/// three words of the description. Unparseable values key as 0.
fn monetary_key(item: &MonetaryItem) -> String {
    let amount = parse_brl_amount(&item.value);
    let head = item
        .description
        .to_lowercase()
        .split_whitespace()
        .take(3)
        .collect::<Vec<_>>()
        .join(" ");
    format!("{amount:.2}|{head}")
}

fn list_key(text: &str) -> String {
    char_prefix(text.trim(), LIST_KEY_CHARS).to_lowercase()
}

fn event_key(date: &str, description: &str) -> String {
    format!("{date}|{}", char_prefix(description, EVENT_KEY_CHARS)).to_lowercase()
}

fn sort_by_date(events: &mut [Event]) {
    // Stable: same-date events keep arrival order, empty/invalid dates
    // sort first as the all-zero key
    events.sort_by_key(|e| sintese_domain::date_key(&e.date));
}

fn merge_list(target: &mut Vec<String>, seen: &mut HashSet<String>, incoming: &[String]) {
    for item in incoming {
        if item.is_empty() {
            continue;
        }
        if seen.insert(list_key(item)) {
            target.push(item.clone());
        }
    }
}

/// Consolidate chunk extractions onto a pattern-extracted base record.
///
/// The base's identification fields (number, system, class, ...) are
/// authoritative and never overwritten; its pattern-derived events seed
/// the timeline and deduplicate against model-derived entries.
pub fn consolidate(base: CaseRecord, partials: &[PartialExtraction]) -> CaseRecord {
    let mut record = base;

    let pattern_entries: Vec<TimelineEntry> = std::mem::take(&mut record.events)
        .into_iter()
        .map(|e| TimelineEntry {
            date: e.date,
            kind: e.kind,
            description: e.description,
        })
        .collect();
    record.procedural_events.clear();
    record.factual_events.clear();

    let mut party_keys: HashSet<String> = record
        .parties
        .iter()
        .map(|p| normalize_name(&p.name))
        .collect();
    let mut claim_keys: HashSet<String> = record.claims.iter().map(|c| list_key(c)).collect();
    let mut plaintiff_keys: HashSet<String> =
        record.plaintiff_theses.iter().map(|t| list_key(t)).collect();
    let mut defendant_keys: HashSet<String> =
        record.defendant_theses.iter().map(|t| list_key(t)).collect();
    let mut document_keys: HashSet<String> = record
        .key_documents
        .iter()
        .map(|d| d.kind.trim().to_lowercase())
        .collect();
    let mut decision_keys: HashSet<String> = record
        .decisions
        .iter()
        .map(|d| format!("{}|{}|{}", d.date, d.kind, d.content).to_lowercase())
        .collect();
    let mut monetary_candidates: Vec<MonetaryItem> = Vec::new();
    let mut timeline: Vec<TimelineEntry> = pattern_entries;

    for partial in partials {
        if record.subject_of_action.is_empty() && !partial.subject_of_action.is_empty() {
            record.subject_of_action = partial.subject_of_action.clone();
        }
        if record.current_status.is_empty() && !partial.current_status.is_empty() {
            record.current_status = partial.current_status.clone();
        }

        let summary = partial.facts_summary.trim();
        if !summary.is_empty() && !record.facts_summary.contains(summary) {
            if !record.facts_summary.is_empty() {
                record.facts_summary.push_str("\n\n");
            }
            record.facts_summary.push_str(summary);
        }

        for party in &partial.parties {
            let name = party.name.trim();
            let upper = name.to_uppercase();
            if name.is_empty() || upper == "NONE" || upper == "NULL" {
                continue;
            }
            let key = normalize_name(name);
            if !key.is_empty() && party_keys.insert(key) {
                record.parties.push(party.clone());
            }
        }

        monetary_candidates.extend(partial.monetary_items.iter().cloned());

        merge_list(&mut record.claims, &mut claim_keys, &partial.claims);
        merge_list(
            &mut record.plaintiff_theses,
            &mut plaintiff_keys,
            &partial.plaintiff_theses,
        );
        merge_list(
            &mut record.defendant_theses,
            &mut defendant_keys,
            &partial.defendant_theses,
        );

        for doc in &partial.key_documents {
            let key = doc.kind.trim().to_lowercase();
            if !key.is_empty() && document_keys.insert(key) {
                record.key_documents.push(doc.clone());
            }
        }

        for decision in &partial.decisions {
            let key = format!("{}|{}|{}", decision.date, decision.kind, decision.content)
                .to_lowercase();
            if decision_keys.insert(key) {
                record.decisions.push(decision.clone());
            }
        }

        timeline.extend(partial.timeline.iter().cloned());
    }

    for item in monetary_candidates {
        let empty = item.description.trim().is_empty() || item.value.trim().is_empty();
        if empty {
            continue;
        }
        let key = monetary_key(&item);
        if !record.monetary_items.iter().any(|kept| monetary_key(kept) == key) {
            record.monetary_items.push(item);
        }
    }

    let mut event_keys: HashSet<String> = HashSet::new();
    for entry in timeline {
        if !is_relevant(&entry.description) {
            continue;
        }
        if !event_keys.insert(event_key(&entry.date, &entry.description)) {
            continue;
        }
        let category = categorize(&entry.description);
        let event = Event {
            date: entry.date,
            kind: entry.kind,
            description: entry.description,
            category,
        };
        match category {
            EventCategory::Factual => record.factual_events.push(event),
            EventCategory::Procedural => record.procedural_events.push(event),
        }
    }

    sort_by_date(&mut record.procedural_events);
    sort_by_date(&mut record.factual_events);

    record.events = record
        .procedural_events
        .iter()
        .chain(record.factual_events.iter())
        .cloned()
        .collect();
    sort_by_date(&mut record.events);

    record
}
