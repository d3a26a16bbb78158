//! Command execution.

use crate::cli::{ConfigAction, ConfigArgs, RunArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::{ingest, report};
use sintese_extract::{Diagnostics, Pipeline, PipelineConfig};
use sintese_llm::{BackendId, Gateway};
use std::time::Instant;

/// Process one case folder and write the report into it.
pub async fn execute_run(args: RunArgs, config: &Config) -> Result<()> {
    let backend: BackendId = args
        .backend
        .as_deref()
        .unwrap_or(&config.default_backend)
        .parse()
        .map_err(CliError::InvalidInput)?;

    let documents = ingest::collect_documents(&args.folder)?;
    println!(
        "{} documento(s) encontrado(s) em {}",
        documents.len(),
        args.folder.display()
    );

    let mut pipeline_config = PipelineConfig::for_backend(backend);
    let budget_override = if backend.is_cloud() {
        config.cloud_chunk_tokens
    } else {
        config.local_chunk_tokens
    };
    if budget_override > 0 {
        pipeline_config.token_budget = budget_override;
    }
    if config.chars_per_token > 0 {
        pipeline_config.chars_per_token = config.chars_per_token;
    }

    let gateway = Gateway::new(backend, config.gateway_config());
    let pipeline = Pipeline::new(gateway, pipeline_config)
        .with_diagnostics(Diagnostics::new(|line| println!("{line}")));

    let start = Instant::now();
    let outcome = pipeline.run(documents).await?;

    let meta = report::RunMeta {
        backend,
        elapsed: start.elapsed(),
    };
    let content = report::render(&outcome.record, &meta);
    let path = report::write_report(&args.folder, &content)?;

    println!("Relatório gravado em {}", path.display());
    if outcome.chunks_failed > 0 {
        println!(
            "{} de {} parte(s) falharam durante a extração",
            outcome.chunks_failed, outcome.chunks_total
        );
    }
    Ok(())
}

/// Show or update the configuration file.
pub fn execute_config(args: ConfigArgs, config: &mut Config) -> Result<()> {
    match args.action {
        ConfigAction::Show => println!("{}", config.masked()),
        ConfigAction::Set { key, value } => {
            config.set(&key, &value)?;
            config.save()?;
            println!("Configuração salva em {}", Config::path()?.display());
        }
    }
    Ok(())
}
