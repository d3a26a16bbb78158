//! Markdown report rendering.
//!
//! The canonical record is rendered section by section; empty fields
//! simply omit their section. The record reaches this module as plain
//! data, so any other renderer (docx, HTML) could consume the same
//! input.

use crate::error::Result;
use chrono::Local;
use sintese_domain::CaseRecord;
use sintese_llm::BackendId;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Report file name, written into the case folder itself.
pub const REPORT_FILE: &str = "sintese_processual.md";

/// Run metadata shown in the report header.
#[derive(Debug)]
pub struct RunMeta {
    /// Backend that produced the extractions
    pub backend: BackendId,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

/// Reflow a narrative that arrived as one long block into paragraphs of
/// roughly three hundred characters, cutting at sentence ends.
fn reflow(narrative: &str) -> String {
    let text = narrative.replace("\\n\\n", "\n\n").replace("\\n", "\n");
    if text.contains("\n\n") || text.chars().count() <= 500 {
        return text;
    }

    let mut paragraphs = Vec::new();
    let mut current = String::new();
    for sentence in text.split(". ") {
        current.push_str(sentence);
        current.push_str(". ");
        if current.chars().count() > 300 {
            paragraphs.push(current.trim().to_string());
            current.clear();
        }
    }
    if !current.trim().is_empty() {
        paragraphs.push(current.trim().to_string());
    }
    paragraphs.join("\n\n")
}

fn push_field(out: &mut String, label: &str, value: &str) {
    if !value.is_empty() {
        let _ = writeln!(out, "- **{label}:** {value}");
    }
}

/// Render the canonical record as a Markdown report.
pub fn render(record: &CaseRecord, meta: &RunMeta) -> String {
    let mut md = String::new();

    let _ = writeln!(md, "# Síntese Processual");
    let number = if record.case_number.is_empty() {
        "Não identificado"
    } else {
        &record.case_number
    };
    let _ = writeln!(md, "**Processo:** {number}");
    let _ = writeln!(
        md,
        "**Gerado em:** {}",
        Local::now().format("%d/%m/%Y às %H:%M")
    );
    let _ = writeln!(md, "**Modo:** {}", meta.backend.as_str().to_uppercase());
    let _ = writeln!(
        md,
        "**Tempo de processamento:** {:.1} segundos",
        meta.elapsed.as_secs_f64()
    );
    md.push_str("\n---\n\n");

    md.push_str("## Dados Gerais\n\n");
    push_field(&mut md, "Classe", &record.case_class);
    push_field(&mut md, "Vara", &record.court);
    push_field(&mut md, "Valor da causa", &record.claim_value);
    push_field(&mut md, "Distribuição", &record.distribution_date);
    push_field(&mut md, "Assunto", &record.subject);
    push_field(&mut md, "Sistema", record.system.as_str());
    md.push('\n');

    if !record.parties.is_empty() {
        md.push_str("## Partes\n\n| Polo | Nome |\n|------|------|\n");
        for party in &record.parties {
            let side = match party.side {
                sintese_domain::Side::Plaintiff => "Autor",
                sintese_domain::Side::Defendant => "Réu",
            };
            let _ = writeln!(md, "| {side} | {} |", party.name);
        }
        md.push('\n');
    }

    if !record.subject_of_action.is_empty() {
        let _ = writeln!(md, "## Objeto da Ação\n\n{}\n", record.subject_of_action);
    }

    if !record.facts_summary.is_empty() {
        let _ = writeln!(md, "## Resumo dos Fatos\n\n{}\n", reflow(&record.facts_summary));
    }

    if !record.key_documents.is_empty() {
        md.push_str("## Documentos Importantes\n\n");
        for (i, doc) in record.key_documents.iter().enumerate() {
            let mut title = format!("### {}. {}", i + 1, doc.kind);
            if !doc.date.is_empty() {
                let _ = write!(title, " ({})", doc.date);
            }
            let _ = writeln!(md, "{title}");
            if !doc.party.is_empty() {
                let _ = writeln!(md, "**Apresentado por:** {}", doc.party);
            }
            md.push('\n');
            if !doc.summary.is_empty() {
                let _ = writeln!(md, "{}\n", doc.summary);
            }
        }
        md.push_str("---\n\n");
    }

    if !record.procedural_events.is_empty() {
        md.push_str("## Histórico Processual\n\n| Data | Descrição |\n|------|-----------|\n");
        for event in &record.procedural_events {
            let date = if event.date.is_empty() { "N/D" } else { &event.date };
            let _ = writeln!(md, "| {date} | {} |", event.description);
        }
        md.push('\n');
    }

    if !record.factual_events.is_empty() {
        md.push_str("## Linha do Tempo dos Fatos\n\n| Data | Descrição |\n|------|-----------|\n");
        for event in &record.factual_events {
            let date = if event.date.is_empty() { "N/D" } else { &event.date };
            let _ = writeln!(md, "| {date} | {} |", event.description);
        }
        md.push('\n');
    }

    if !record.monetary_items.is_empty() {
        md.push_str("## Valores Identificados\n\n");
        for item in &record.monetary_items {
            let _ = writeln!(md, "- **{}:** {}", item.description, item.value);
        }
        md.push('\n');
    }

    if !record.claims.is_empty() {
        md.push_str("## Pedidos\n\n");
        for claim in &record.claims {
            let _ = writeln!(md, "- {claim}");
        }
        md.push('\n');
    }

    if !record.plaintiff_theses.is_empty() || !record.defendant_theses.is_empty() {
        md.push_str("## Teses das Partes\n\n");
        if !record.plaintiff_theses.is_empty() {
            md.push_str("**Autor:**\n");
            for thesis in &record.plaintiff_theses {
                let _ = writeln!(md, "- {thesis}");
            }
            md.push('\n');
        }
        if !record.defendant_theses.is_empty() {
            md.push_str("**Réu:**\n");
            for thesis in &record.defendant_theses {
                let _ = writeln!(md, "- {thesis}");
            }
            md.push('\n');
        }
    }

    if !record.decisions.is_empty() {
        md.push_str("## Decisões\n\n");
        for decision in &record.decisions {
            if decision.content.is_empty() {
                continue;
            }
            let date = if decision.date.is_empty() { "N/D" } else { &decision.date };
            let kind = if decision.kind.is_empty() { "N/D" } else { &decision.kind };
            let _ = writeln!(md, "- **{date} - {kind}:** {}", decision.content);
        }
        md.push('\n');
    }

    if !record.current_status.is_empty() {
        let _ = writeln!(md, "## Status Atual\n\n{}\n", record.current_status);
    }

    md.push_str("---\n\n");
    md.push_str("*Documento gerado automaticamente pelo Sintese.*\n");
    md.push_str("*Este é um resumo factual. Não contém análises ou recomendações jurídicas.*\n");

    md
}

/// Write the rendered report into the case folder.
pub fn write_report(folder: &Path, content: &str) -> Result<PathBuf> {
    let path = folder.join(REPORT_FILE);
    std::fs::write(&path, content)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sintese_domain::{Event, EventCategory, MonetaryItem, Party, Side};

    fn record() -> CaseRecord {
        CaseRecord {
            case_number: "0001234-56.2023.8.13.0001".to_string(),
            court: "2ª Vara Cível".to_string(),
            subject_of_action: "Cobrança de dívida".to_string(),
            facts_summary: "O autor firmou contrato.\n\nO réu não pagou.".to_string(),
            parties: vec![Party {
                name: "Empresa ABC".to_string(),
                side: Side::Plaintiff,
            }],
            monetary_items: vec![MonetaryItem {
                description: "Valor da causa".to_string(),
                value: "R$ 10.000,00".to_string(),
            }],
            procedural_events: vec![Event {
                date: "15/01/2023".to_string(),
                kind: "Distribuição".to_string(),
                description: "Ação distribuída".to_string(),
                category: EventCategory::Procedural,
            }],
            current_status: "Aguardando sentença".to_string(),
            ..Default::default()
        }
    }

    fn meta() -> RunMeta {
        RunMeta {
            backend: BackendId::Local,
            elapsed: Duration::from_secs_f64(12.3),
        }
    }

    #[test]
    fn test_report_has_expected_sections() {
        let md = render(&record(), &meta());
        assert!(md.contains("# Síntese Processual"));
        assert!(md.contains("**Processo:** 0001234-56.2023.8.13.0001"));
        assert!(md.contains("**Modo:** LOCAL"));
        assert!(md.contains("| Autor | Empresa ABC |"));
        assert!(md.contains("## Histórico Processual"));
        assert!(md.contains("| 15/01/2023 | Ação distribuída |"));
        assert!(md.contains("## Status Atual"));
    }

    #[test]
    fn test_empty_sections_are_omitted() {
        let md = render(&CaseRecord::default(), &meta());
        assert!(md.contains("**Processo:** Não identificado"));
        assert!(!md.contains("## Partes"));
        assert!(!md.contains("## Decisões"));
        assert!(!md.contains("## Linha do Tempo"));
    }

    #[test]
    fn test_reflow_splits_long_single_block() {
        let narrative = "Frase de exemplo com algum conteúdo. ".repeat(30);
        let reflowed = reflow(&narrative);
        assert!(reflowed.contains("\n\n"));
    }

    #[test]
    fn test_reflow_keeps_existing_paragraphs() {
        let narrative = "Primeiro parágrafo.\n\nSegundo parágrafo.";
        assert_eq!(reflow(narrative), narrative);
    }

    #[test]
    fn test_write_report_places_file_in_folder() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(dir.path(), "conteúdo").unwrap();
        assert_eq!(path.file_name().unwrap(), REPORT_FILE);
        assert_eq!(std::fs::read_to_string(path).unwrap(), "conteúdo");
    }
}
