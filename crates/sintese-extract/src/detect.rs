//! Case-management-system detection and regex pattern extraction.
//!
//! Each supported export format gets an ordered rule table of
//! `(pattern, target field, transform)` entries. Rules never raise:
//! the first match wins per field, and a non-match leaves the field
//! empty for the model-driven extraction to fill later. The docket
//! number and system classification set here are authoritative — the
//! consolidator never overwrites them with model output.

use crate::util::char_prefix;
use regex::Regex;
use sintese_domain::{CaseRecord, CaseSystem, Event, Party, Side};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Signature matching inspects only the head of the combined text.
const DETECT_PREFIX_CHARS: usize = 5_000;
/// The party table of a PJe cover sheet sits in the first page or two.
const PARTY_PREFIX_CHARS: usize = 3_000;
/// Generic docket numbers are only trusted near the top of the text.
const GENERIC_NUMBER_PREFIX_CHARS: usize = 2_000;
/// Pattern-scraped event descriptions are truncated for the timeline.
const EVENT_DESCRIPTION_CHARS: usize = 100;

/// Classify which system produced the export, defaulting to generic.
pub fn detect_system(text: &str) -> CaseSystem {
    let head = char_prefix(text, DETECT_PREFIX_CHARS).to_lowercase();

    if head.contains("pje - processo judicial eletrônico") || head.contains("pje.tjmg") {
        CaseSystem::Pje
    } else if head.contains("página de separação") && head.contains("evento") {
        CaseSystem::Eproc
    } else if head.contains("projudi") {
        CaseSystem::Projudi
    } else if head.contains("saj") || head.contains("esaj") {
        CaseSystem::Saj
    } else {
        CaseSystem::Generic
    }
}

/// Record field a rule writes into.
#[derive(Debug, Clone, Copy)]
enum Target {
    Number,
    Class,
    Court,
    ClaimValue,
    DistributionDate,
    Subject,
}

/// One extraction rule: pattern, destination field, value transform.
struct FieldRule {
    target: Target,
    regex: Regex,
    transform: fn(&str) -> String,
}

fn rule(target: Target, pattern: &str, transform: fn(&str) -> String) -> FieldRule {
    FieldRule {
        target,
        // Patterns are static and known-valid
        regex: Regex::new(pattern).expect("invalid extraction rule"),
        transform,
    }
}

fn plain(value: &str) -> String {
    value.trim().to_string()
}

fn currency(value: &str) -> String {
    format!("R$ {}", value.trim())
}

fn field_mut(record: &mut CaseRecord, target: Target) -> &mut String {
    match target {
        Target::Number => &mut record.case_number,
        Target::Class => &mut record.case_class,
        Target::Court => &mut record.court,
        Target::ClaimValue => &mut record.claim_value,
        Target::DistributionDate => &mut record.distribution_date,
        Target::Subject => &mut record.subject,
    }
}

/// Apply a rule table: first match wins per field, non-matches are
/// silently skipped.
fn apply_rules(rules: &[FieldRule], text: &str, record: &mut CaseRecord) {
    for rule in rules {
        if !field_mut(record, rule.target).is_empty() {
            continue;
        }
        if let Some(m) = rule.regex.captures(text).and_then(|c| c.get(1)) {
            *field_mut(record, rule.target) = (rule.transform)(m.as_str());
        }
    }
}

static PJE_RULES: LazyLock<Vec<FieldRule>> = LazyLock::new(|| {
    vec![
        rule(Target::Number, r"Número:\s*([\d.-]+)", plain),
        rule(Target::Class, r"Classe:\s*\[?\w*\]?\s*([^\n]+)", plain),
        rule(Target::Court, r"Órgão julgador:\s*([^\n]+)", plain),
        rule(Target::ClaimValue, r"Valor da causa:\s*R?\$?\s*([\d.,]+)", currency),
        rule(
            Target::DistributionDate,
            r"(?:Última )?[Dd]istribuição\s*:?\s*(\d{2}/\d{2}/\d{4})",
            plain,
        ),
        rule(Target::Subject, r"Assuntos?:\s*([^\n]+)", plain),
    ]
});

static PJE_PARTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"([A-ZÁÉÍÓÚÇÃÕ][A-ZÁÉÍÓÚÇÃÕ\s]+)\s*\((AUTOR|RÉU|RÉ|REQUERENTE|REQUERIDO|APELANTE|APELADO)[^)]*\)",
    )
    .expect("invalid party pattern")
});

static PJE_EVENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\d{2}/\d{2}/\d{4}\s+\d{2}:\d{2})\s+([^\n]+?)\s+(Petição|Contestação|Sentença|Despacho|Decisão|Certidão|Intimação|Citação|Manifestação|Acórdão|Recurso|Laudo|Impugnação|Réplica)[^\n]*",
    )
    .expect("invalid event pattern")
});

fn extract_pje(text: &str) -> CaseRecord {
    let mut record = CaseRecord {
        system: CaseSystem::Pje,
        ..Default::default()
    };
    apply_rules(&PJE_RULES, text, &mut record);

    // Party table on the cover sheet: NAME (ROLE)
    for cap in PJE_PARTY.captures_iter(char_prefix(text, PARTY_PREFIX_CHARS)) {
        let name = cap[1].trim().to_string();
        if name.chars().count() <= 3 {
            continue;
        }
        let side = match &cap[2] {
            "AUTOR" | "REQUERENTE" | "APELANTE" => Side::Plaintiff,
            _ => Side::Defendant,
        };
        record.parties.push(Party { name, side });
    }

    // Document table rows: timestamp, description, document kind
    for cap in PJE_EVENT.captures_iter(text) {
        let date = cap[1]
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string();
        record.events.push(Event {
            date,
            kind: cap[3].trim().to_string(),
            description: char_prefix(cap[2].trim(), EVENT_DESCRIPTION_CHARS).to_string(),
            category: Default::default(),
        });
    }

    record
}

static EPROC_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Processo:\s*([\d.-]+)").expect("invalid number pattern"));

static EPROC_EVENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)Evento\s+(\d+).*?Data:\s*(\d{2}/\d{2}/\d{4})[^\n]*.*?(?:Tipo|Documento):\s*([^\n]+)",
    )
    .expect("invalid event pattern")
});

fn extract_eproc(text: &str) -> CaseRecord {
    let mut record = CaseRecord {
        system: CaseSystem::Eproc,
        ..Default::default()
    };

    if let Some(m) = EPROC_NUMBER.captures(text).and_then(|c| c.get(1)) {
        record.case_number = m.as_str().trim().to_string();
    }

    // Separator-page event blocks
    for cap in EPROC_EVENT.captures_iter(text) {
        record.events.push(Event {
            date: cap[2].to_string(),
            kind: cap[3].trim().to_string(),
            description: format!("Evento {}", &cap[1]),
            category: Default::default(),
        });
    }

    record
}

static GENERIC_NUMBER_RULES: LazyLock<Vec<FieldRule>> = LazyLock::new(|| {
    vec![
        // National CNJ format first, then looser docket phrasings
        rule(Target::Number, r"(\d{7}-\d{2}\.\d{4}\.\d\.\d{2}\.\d{4})", plain),
        rule(Target::Number, r"Processo\s*(?:n[ºo.]?)?\s*([\d./-]+)", plain),
        rule(Target::Number, r"Autos\s*(?:n[ºo.]?)?\s*([\d./-]+)", plain),
    ]
});

static GENERIC_VALUE_RULE: LazyLock<Vec<FieldRule>> = LazyLock::new(|| {
    vec![rule(
        Target::ClaimValue,
        r"[Vv]alor\s+(?:da\s+)?[Cc]ausa[:\s]*R?\$?\s*([\d.,]+)",
        currency,
    )]
});

fn extract_generic(text: &str, system: CaseSystem) -> CaseRecord {
    let mut record = CaseRecord {
        system,
        ..Default::default()
    };
    apply_rules(
        &GENERIC_NUMBER_RULES,
        char_prefix(text, GENERIC_NUMBER_PREFIX_CHARS),
        &mut record,
    );
    apply_rules(&GENERIC_VALUE_RULE, text, &mut record);
    record
}

/// Detect the source system and run its pattern extractor.
///
/// Pattern-derived events are deduplicated by `(date, kind, description)`
/// before they seed the timeline.
pub fn extract_patterns(text: &str) -> CaseRecord {
    let system = detect_system(text);
    let mut record = match system {
        CaseSystem::Pje => extract_pje(text),
        CaseSystem::Eproc => extract_eproc(text),
        // SAJ and Projudi exports carry no stable tabular layout; the
        // generic rules still find the docket number and claim value.
        other => extract_generic(text, other),
    };

    let mut seen = HashSet::new();
    record
        .events
        .retain(|e| seen.insert(format!("{}|{}|{}", e.date, e.kind, e.description)));

    record
}

#[cfg(test)]
mod tests {
    use super::*;

    const PJE_SAMPLE: &str = "\
PJe - Processo Judicial Eletrônico\n\
Número: 0001234-56.2023.8.13.0001\n\
Classe: [CÍVEL] Procedimento Comum Cível\n\
Órgão julgador: 2ª Vara Cível de Belo Horizonte\n\
Valor da causa: R$ 10.000,00\n\
Última distribuição: 15/01/2023\n\
Assuntos: Inadimplemento\n\
EMPRESA ABC LTDA (AUTOR)\n\
JOÃO DA SILVA (RÉU)\n\
15/01/2023 14:32 Petição inicial apresentada Petição\n\
20/02/2023 09:10 Contestação do réu Contestação\n";

    #[test]
    fn test_detect_pje() {
        assert_eq!(detect_system(PJE_SAMPLE), CaseSystem::Pje);
    }

    #[test]
    fn test_detect_eproc() {
        let text = "Página de Separação\nEvento 12\nData: 01/02/2023";
        assert_eq!(detect_system(text), CaseSystem::Eproc);
    }

    #[test]
    fn test_detect_defaults_to_generic() {
        assert_eq!(detect_system("texto qualquer sem assinatura"), CaseSystem::Generic);
    }

    #[test]
    fn test_pje_fields_extracted() {
        let record = extract_patterns(PJE_SAMPLE);
        assert_eq!(record.system, CaseSystem::Pje);
        assert_eq!(record.case_number, "0001234-56.2023.8.13.0001");
        assert_eq!(record.court, "2ª Vara Cível de Belo Horizonte");
        assert_eq!(record.claim_value, "R$ 10.000,00");
        assert_eq!(record.distribution_date, "15/01/2023");
        assert_eq!(record.subject, "Inadimplemento");
    }

    #[test]
    fn test_pje_parties_and_sides() {
        let record = extract_patterns(PJE_SAMPLE);
        assert_eq!(record.parties.len(), 2);
        assert_eq!(record.parties[0].side, Side::Plaintiff);
        assert!(record.parties[0].name.contains("EMPRESA ABC"));
        assert_eq!(record.parties[1].side, Side::Defendant);
    }

    #[test]
    fn test_pje_events_scraped_with_date_only() {
        let record = extract_patterns(PJE_SAMPLE);
        assert_eq!(record.events.len(), 2);
        assert_eq!(record.events[0].date, "15/01/2023");
        assert_eq!(record.events[0].kind, "Petição");
        assert_eq!(record.events[1].kind, "Contestação");
    }

    #[test]
    fn test_pattern_events_deduplicated() {
        let text = format!("{PJE_SAMPLE}15/01/2023 14:32 Petição inicial apresentada Petição\n");
        let record = extract_patterns(&text);
        assert_eq!(record.events.len(), 2);
    }

    #[test]
    fn test_eproc_events() {
        let text = "\
Página de Separação evento\n\
Processo: 5001234-55.2023.4.04.7000\n\
Evento 3\nData: 10/03/2023\nTipo: Sentença\n";
        let record = extract_patterns(text);
        assert_eq!(record.system, CaseSystem::Eproc);
        assert_eq!(record.case_number, "5001234-55.2023.4.04.7000");
        assert_eq!(record.events.len(), 1);
        assert_eq!(record.events[0].description, "Evento 3");
        assert_eq!(record.events[0].kind, "Sentença");
    }

    #[test]
    fn test_generic_number_cascade_prefers_cnj() {
        let text = "Autos nº 123/2020\nprocesso 0009876-12.2021.8.26.0100 em curso\n\
                    0009876-12.2021.8.26.0100";
        let record = extract_patterns(text);
        assert_eq!(record.case_number, "0009876-12.2021.8.26.0100");
    }

    #[test]
    fn test_generic_falls_back_to_looser_phrasings() {
        let record = extract_patterns("Processo nº 123.456/2020, partes diversas");
        assert_eq!(record.case_number, "123.456/2020");
    }

    #[test]
    fn test_generic_claim_value() {
        let record = extract_patterns("pedido certo. Valor da causa: R$ 5.500,00");
        assert_eq!(record.claim_value, "R$ 5.500,00");
    }

    #[test]
    fn test_unmatched_fields_stay_empty() {
        let record = extract_patterns("texto sem nada reconhecível");
        assert!(record.case_number.is_empty());
        assert!(record.claim_value.is_empty());
        assert_eq!(record.system, CaseSystem::Generic);
    }
}
