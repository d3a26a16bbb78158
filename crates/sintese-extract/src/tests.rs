//! End-to-end pipeline tests over the mock backend.

use crate::{Diagnostics, Pipeline, PipelineConfig, RawDocument};
use sintese_llm::{BackendId, MockBackend};
use std::sync::{Arc, Mutex};

const COVER_PAGE: &str = "\
PJe - Processo Judicial Eletrônico\n\
Número: 0001234-56.2023.8.13.0001\n\
Classe: [CÍVEL] Procedimento Comum Cível\n\
Órgão julgador: 2ª Vara Cível de Belo Horizonte\n\
Valor da causa: R$ 10.000,00\n\
Última distribuição: 15/01/2023\n";

const RICH_REPLY: &str = r#"```json
{
    "partes": [
        {"nome": "Empresa ABC Ltda.", "polo": "Autor"},
        {"nome": "João da Silva", "polo": "Réu"}
    ],
    "objeto_acao": "Ação de cobrança de dívida contratual",
    "resumo_fatos": "O autor firmou contrato de prestação de serviços.\n\nO réu deixou de pagar as parcelas.",
    "valores_relevantes": [
        {"descricao": "Valor da causa", "valor": "R$ 10.000,00"}
    ],
    "pedidos": ["Condenação ao pagamento", "Juros e correção monetária"],
    "decisoes": [],
    "teses_autor": ["Inadimplemento contratual"],
    "teses_reu": [],
    "documentos_importantes": [
        {"tipo": "Petição Inicial", "data": "15/01/2023", "parte": "Autor", "resumo": "Cobrança"}
    ],
    "historico_detalhado": [
        {"data": "10/06/2022", "evento": "Contrato", "descricao": "Assinatura do contrato de prestação"},
        {"data": "15/01/2023", "evento": "Distribuição", "descricao": "Ação distribuída"},
        {"data": "16/01/2023", "evento": "Certidão", "descricao": "Documento assinado eletronicamente"}
    ],
    "status_atual": "Aguardando citação"
}
```"#;

fn folder() -> Vec<RawDocument> {
    vec![
        RawDocument {
            source_name: "processo.pdf".to_string(),
            pages: vec![COVER_PAGE.to_string(), "Petição inicial: narrativa dos fatos.".to_string()],
            important: false,
        },
        RawDocument {
            source_name: "copia_processo.pdf".to_string(),
            pages: vec![COVER_PAGE.to_string(), "Petição inicial: narrativa dos fatos.".to_string()],
            important: false,
        },
    ]
}

#[tokio::test]
async fn test_full_run_produces_canonical_record() {
    let pipeline = Pipeline::new(
        MockBackend::new(RICH_REPLY),
        PipelineConfig::for_backend(BackendId::Google),
    );
    let outcome = pipeline.run(folder()).await.unwrap();

    let record = &outcome.record;
    // Identification comes from pattern extraction
    assert_eq!(record.case_number, "0001234-56.2023.8.13.0001");
    assert_eq!(record.system.as_str(), "pje");
    assert_eq!(record.court, "2ª Vara Cível de Belo Horizonte");

    // Model-derived fields come from consolidation
    assert_eq!(record.subject_of_action, "Ação de cobrança de dívida contratual");
    assert_eq!(record.parties.len(), 2);
    assert_eq!(record.claims.len(), 2);
    assert_eq!(record.current_status, "Aguardando citação");

    // The clerical-noise event was filtered, the contract event went to
    // the factual timeline
    assert!(record
        .factual_events
        .iter()
        .any(|e| e.description.contains("contrato")));
    assert!(!record
        .events
        .iter()
        .any(|e| e.description.contains("assinado eletronicamente")));
}

#[tokio::test]
async fn test_duplicate_document_is_reported_and_collapsed() {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let captured = Arc::clone(&lines);
    let pipeline = Pipeline::new(
        MockBackend::new(RICH_REPLY),
        PipelineConfig::for_backend(BackendId::Google),
    )
    .with_diagnostics(Diagnostics::new(move |line| {
        captured.lock().unwrap().push(line.to_string())
    }));

    pipeline.run(folder()).await.unwrap();

    let lines = lines.lock().unwrap();
    assert!(lines
        .iter()
        .any(|l| l.contains("Duplicata descartada: processo.pdf")));
    assert!(lines.iter().any(|l| l.contains("1 documento(s) único(s)")));
}

#[tokio::test]
async fn test_record_serializes_to_wire_format() {
    let pipeline = Pipeline::new(
        MockBackend::new(RICH_REPLY),
        PipelineConfig::for_backend(BackendId::Google),
    );
    let outcome = pipeline.run(folder()).await.unwrap();

    let json = serde_json::to_value(&outcome.record).unwrap();
    assert_eq!(json["numero"], "0001234-56.2023.8.13.0001");
    assert_eq!(json["partes"][0]["polo"], "Autor");
    assert!(json["historico_processual"].is_array());
    assert!(json["historico_fatico"].is_array());
}
