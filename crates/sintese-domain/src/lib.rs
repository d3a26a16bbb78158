//! Sintese Domain Layer
//!
//! Core data model for the case-synthesis pipeline: the canonical case
//! record, its component types, and the text-normalization utilities that
//! define identity for parties, dates and monetary values.
//!
//! ## Key Concepts
//!
//! - **CaseRecord**: the structured factual summary of one legal proceeding
//! - **Party identity**: diacritic-free, upper-cased, suffix-stripped name
//! - **Date key**: a `(year, month, day)` tuple giving a total order over
//!   display dates, with unparseable dates sorting first
//!
//! Every field of the record serializes with the wire names the report
//! renderers expect (`numero`, `partes`, `historico_fatico`, ...), so the
//! output is a plain JSON tree with no dependency on these types.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod normalize;
pub mod record;

// Re-exports for convenience
pub use record::{
    CaseRecord, CaseSystem, Decision, Event, EventCategory, KeyDocument, MonetaryItem, Party, Side,
};
pub use normalize::{date_key, normalize_name, parse_brl_amount};
