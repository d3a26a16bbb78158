//! The run orchestrator.
//!
//! One [`Pipeline::run`] call takes a folder's worth of [`RawDocument`]s
//! through deduplication, system detection, chunking, concurrent backend
//! invocation, JSON recovery and consolidation. Chunk-level failures are
//! warnings; only a missing or rejected credential aborts the run. The
//! run always tries to produce a best-effort record, and whatever chunks
//! completed before a cancellation are still consolidated.

use crate::chunker::{self, CLOUD_TOKEN_BUDGET, DEFAULT_CHARS_PER_TOKEN, LOCAL_TOKEN_BUDGET};
use crate::dedup;
use crate::detect;
use crate::diag::Diagnostics;
use crate::error::ExtractError;
use crate::merge;
use crate::prompt::extraction_prompt;
use crate::recover::recover_json;
use crate::types::{PartialExtraction, RawDocument};
use sintese_domain::CaseRecord;
use sintese_llm::{BackendId, LlmError, TextGenerator};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

/// Tunables of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Per-chunk token budget, converted to characters by the chunker
    pub token_budget: usize,
    /// Chars-per-token ratio used for that conversion
    pub chars_per_token: usize,
    /// Maximum chunk extractions in flight at once
    pub concurrency: usize,
}

impl PipelineConfig {
    /// Defaults for the given backend: cloud backends get the large
    /// budget and two calls in flight, the local backend a small budget
    /// and strictly sequential calls.
    pub fn for_backend(backend: BackendId) -> Self {
        if backend.is_cloud() {
            Self {
                token_budget: CLOUD_TOKEN_BUDGET,
                chars_per_token: DEFAULT_CHARS_PER_TOKEN,
                concurrency: 2,
            }
        } else {
            Self {
                token_budget: LOCAL_TOKEN_BUDGET,
                chars_per_token: DEFAULT_CHARS_PER_TOKEN,
                concurrency: 1,
            }
        }
    }
}

/// What one run produced.
#[derive(Debug)]
pub struct RunOutcome {
    /// The consolidated record, always present even when every chunk failed
    pub record: CaseRecord,
    /// Chunks the combined text was split into
    pub chunks_total: usize,
    /// Chunks that failed extraction or parsing
    pub chunks_failed: usize,
    /// Whether the run was cancelled before all chunks were attempted
    pub cancelled: bool,
    /// No chunk yielded a usable extraction; only pattern-derived fields
    /// are populated
    pub incomplete: bool,
}

/// The extraction pipeline, generic over the backend seam.
pub struct Pipeline<G> {
    generator: Arc<G>,
    config: PipelineConfig,
    diagnostics: Diagnostics,
    cancel: Arc<AtomicBool>,
}

impl<G: TextGenerator + 'static> Pipeline<G> {
    /// Pipeline over `generator` with the given tunables.
    pub fn new(generator: G, config: PipelineConfig) -> Self {
        Self {
            generator: Arc::new(generator),
            config,
            diagnostics: Diagnostics::silent(),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Attach a diagnostics sink.
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Flag to request best-effort cooperative cancellation. In-flight
    /// calls finish; chunks not yet started are skipped.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Run the whole pipeline over one folder's documents.
    pub async fn run(&self, documents: Vec<RawDocument>) -> Result<RunOutcome, ExtractError> {
        let deduplicated = dedup::deduplicate(documents);
        for (dropped, kept) in &deduplicated.dropped_duplicates {
            self.diagnostics
                .report(format!("Duplicata descartada: {dropped} (igual a {kept})"));
        }
        self.diagnostics.report(format!(
            "{} documento(s) único(s), {} página(s) de texto",
            deduplicated.unique_documents, deduplicated.total_pages
        ));
        if deduplicated.empty_pages > 0 {
            self.diagnostics.report(format!(
                "Atenção: {} página(s) sem texto extraível",
                deduplicated.empty_pages
            ));
        }
        if deduplicated.combined.is_empty() {
            return Err(ExtractError::NoText);
        }

        let base = detect::extract_patterns(&deduplicated.combined);
        self.diagnostics
            .report(format!("Sistema detectado: {}", base.system.as_str()));

        self.generator.preflight().await?;

        let max_chars =
            chunker::budget_chars(self.config.token_budget, self.config.chars_per_token);
        let mut chunks = chunker::split_chunks(&deduplicated.combined, max_chars);
        if chunks.is_empty() {
            chunks.push(chunker::truncated_chunk(&deduplicated.combined, max_chars));
        }
        let chunks_total = chunks.len();
        self.diagnostics
            .report(format!("Texto dividido em {chunks_total} parte(s)"));

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut set: JoinSet<(usize, Option<Result<String, LlmError>>)> = JoinSet::new();
        for (index, chunk) in chunks.into_iter().enumerate() {
            let generator = Arc::clone(&self.generator);
            let semaphore = Arc::clone(&semaphore);
            let cancel = Arc::clone(&self.cancel);
            set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                if cancel.load(Ordering::Relaxed) {
                    return (index, None);
                }
                let prompt = extraction_prompt(&chunk);
                (index, Some(generator.generate(&prompt).await))
            });
        }

        let mut partials: Vec<(usize, PartialExtraction)> = Vec::new();
        let mut chunks_failed = 0;
        let mut skipped = 0;
        let mut fatal: Option<LlmError> = None;

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, Some(Ok(reply)))) => match recover_json(&reply) {
                    Some(value) => {
                        self.diagnostics
                            .report(format!("Parte {}/{chunks_total} processada", index + 1));
                        partials.push((index, PartialExtraction::from_value(&value)));
                    }
                    None => {
                        chunks_failed += 1;
                        self.diagnostics.report(format!(
                            "Parte {}/{chunks_total} descartada: resposta não interpretável",
                            index + 1
                        ));
                    }
                },
                Ok((index, Some(Err(err)))) => {
                    if matches!(err, LlmError::Auth(_) | LlmError::MissingCredential(_)) {
                        // Fatal for this backend selection; stop the
                        // chunks that have not started yet
                        self.cancel.store(true, Ordering::Relaxed);
                        fatal.get_or_insert(err);
                    } else {
                        chunks_failed += 1;
                        self.diagnostics.report(format!(
                            "Parte {}/{chunks_total} falhou: {err}",
                            index + 1
                        ));
                    }
                }
                Ok((_, None)) => skipped += 1,
                Err(join_err) => {
                    chunks_failed += 1;
                    warn!("chunk task failed to join: {join_err}");
                }
            }
        }

        if let Some(err) = fatal {
            return Err(err.into());
        }

        let cancelled = skipped > 0;
        let attempted = chunks_total - skipped;
        let incomplete = attempted > 0 && partials.is_empty();

        partials.sort_by_key(|(index, _)| *index);
        let ordered: Vec<PartialExtraction> =
            partials.into_iter().map(|(_, partial)| partial).collect();

        self.diagnostics.report("Consolidando extrações");
        let record = merge::consolidate(base, &ordered);

        if incomplete {
            self.diagnostics.report(
                "ATENÇÃO: nenhuma parte pôde ser extraída; o relatório terá apenas os \
                 dados reconhecidos por padrão",
            );
        }

        Ok(RunOutcome {
            record,
            chunks_total,
            chunks_failed,
            cancelled,
            incomplete,
        })
    }
}
