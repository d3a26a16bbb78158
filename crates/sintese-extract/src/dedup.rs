//! Document deduplication and combined-text assembly.
//!
//! Duplicate exports of the same filing are common in case folders (the
//! same PDF saved under two names, or once loose and once in the
//! `importantes/` folder). Documents are fingerprinted over a bounded
//! content prefix; within a fingerprint the important copy wins. Output
//! ordering is fully deterministic: important documents first, then by
//! source name.

use crate::types::RawDocument;
use crate::util::char_prefix;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Characters of content hashed per document.
const FINGERPRINT_PREFIX_CHARS: usize = 10_000;

/// Result of deduplicating one run's input documents.
#[derive(Debug)]
pub struct Deduplicated {
    /// All unique documents concatenated with page markers, important
    /// documents first then by source name.
    pub combined: String,
    /// Number of unique documents kept
    pub unique_documents: usize,
    /// How many of the kept documents were flagged important
    pub important_documents: usize,
    /// Total non-empty pages across kept documents
    pub total_pages: usize,
    /// Pages dropped for having no extractable text
    pub empty_pages: usize,
    /// Dropped duplicates as `(dropped source, kept source)`
    pub dropped_duplicates: Vec<(String, String)>,
}

/// Page-marked text of one document. Empty pages are dropped and counted.
fn marked_text(doc: &RawDocument) -> (String, usize, usize) {
    let mut text = String::new();
    let mut pages = 0;
    let mut empty = 0;
    for (i, page) in doc.pages.iter().enumerate() {
        if page.trim().is_empty() {
            empty += 1;
            continue;
        }
        text.push_str(&format!("\n[PÁGINA {}]\n{page}", i + 1));
        pages += 1;
    }
    (text, pages, empty)
}

fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(char_prefix(text, FINGERPRINT_PREFIX_CHARS).as_bytes());
    hex::encode(hasher.finalize())
}

/// Collapse byte-identical documents and assemble the combined text.
///
/// The same input set always yields the same output, regardless of the
/// order documents arrive in.
pub fn deduplicate(mut documents: Vec<RawDocument>) -> Deduplicated {
    // Important-first, then by name: this makes "important copy wins"
    // fall out of plain first-wins and fixes the output ordering.
    documents.sort_by(|a, b| {
        b.important
            .cmp(&a.important)
            .then_with(|| a.source_name.cmp(&b.source_name))
    });

    let mut seen: HashMap<String, String> = HashMap::new();
    let mut kept: Vec<(String, bool)> = Vec::new();
    let mut dropped_duplicates = Vec::new();
    let mut total_pages = 0;
    let mut empty_pages = 0;
    let mut important_documents = 0;

    for doc in &documents {
        let (text, pages, empty) = marked_text(doc);
        empty_pages += empty;
        if text.is_empty() {
            continue;
        }

        let print = fingerprint(&text);
        if let Some(kept_name) = seen.get(&print) {
            dropped_duplicates.push((doc.source_name.clone(), kept_name.clone()));
            continue;
        }

        seen.insert(print, doc.source_name.clone());
        total_pages += pages;
        if doc.important {
            important_documents += 1;
        }
        kept.push((text, doc.important));
    }

    let combined = kept
        .iter()
        .map(|(text, _)| text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    Deduplicated {
        combined,
        unique_documents: kept.len(),
        important_documents,
        total_pages,
        empty_pages,
        dropped_duplicates,
    }
}
