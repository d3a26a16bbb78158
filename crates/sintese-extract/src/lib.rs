//! Sintese Extraction Pipeline
//!
//! The core of the case-synthesis system: turns a folder's worth of
//! page-text documents into one canonical [`CaseRecord`].
//!
//! # Architecture
//!
//! ```text
//! RawDocuments → dedup → combined text → { detect ∥ chunk }
//!     → backend gateway (per chunk) → JSON recovery → partial extractions
//!     → consolidate → CaseRecord
//! ```
//!
//! - [`dedup`]: collapses byte-identical documents by content fingerprint,
//!   important documents winning and ordered first
//! - [`detect`]: classifies the source case-management system and runs its
//!   regex rule table into the pattern-extracted half of the record
//! - [`chunker`]: greedy page packing under the backend's size budget
//! - [`recover`]: tolerant JSON extraction from free-form model replies
//! - [`merge`]: the order-independent consolidation of partial extractions
//! - [`pipeline`]: the run orchestrator tying it all together
//!
//! Every run is one-shot: nothing is persisted, and a chunk-level failure
//! is a warning, never a run abort.

#![warn(missing_docs)]

pub mod chunker;
pub mod dedup;
pub mod detect;
pub mod diag;
mod error;
pub mod merge;
pub mod prompt;
pub mod recover;
mod types;
pub(crate) mod util;

pub mod pipeline;

#[cfg(test)]
mod tests;

pub use diag::Diagnostics;
pub use error::ExtractError;
pub use pipeline::{Pipeline, PipelineConfig, RunOutcome};
pub use types::{PartialExtraction, RawDocument, TimelineEntry};
