//! Splitting the combined text into model-sized chunks.
//!
//! Chunk boundaries follow page markers so the model never sees a page
//! cut mid-sentence. Budgets are expressed in approximate tokens and
//! converted with a flat chars-per-token ratio; the conversion only needs
//! to keep chunks comfortably inside the context window, not to be
//! exact.

use crate::util::{char_prefix, char_slices};
use regex::Regex;
use std::sync::LazyLock;

/// Token budget per chunk for the local backend.
pub const LOCAL_TOKEN_BUDGET: usize = 6_000;
/// Token budget per chunk for cloud backends.
pub const CLOUD_TOKEN_BUDGET: usize = 50_000;
/// Default chars-per-token estimate for Portuguese legal text.
pub const DEFAULT_CHARS_PER_TOKEN: usize = 4;

static PAGE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\[PÁGINA \d+\]\n").expect("invalid page marker pattern"));

/// Maximum chunk size in characters for the given budget and ratio.
pub fn budget_chars(token_budget: usize, chars_per_token: usize) -> usize {
    token_budget * chars_per_token.max(1)
}

/// Segments of `text` starting at each page marker. Text before the
/// first marker (or all of it, when there are no markers) is its own
/// segment.
fn page_segments(text: &str) -> Vec<&str> {
    let starts: Vec<usize> = PAGE_MARKER.find_iter(text).map(|m| m.start()).collect();
    if starts.is_empty() {
        return vec![text];
    }

    let mut segments = Vec::with_capacity(starts.len() + 1);
    if starts[0] > 0 {
        segments.push(&text[..starts[0]]);
    }
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(text.len());
        segments.push(&text[start..end]);
    }
    segments
}

/// Split `text` into chunks of at most `max_chars` characters, packing
/// whole pages greedily. A single page larger than the budget is cut at
/// character boundaries.
pub fn split_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0;

    let mut flush = |current: &mut String, current_chars: &mut usize, chunks: &mut Vec<String>| {
        if !current.trim().is_empty() {
            chunks.push(std::mem::take(current));
        } else {
            current.clear();
        }
        *current_chars = 0;
    };

    for segment in page_segments(text) {
        let segment_chars = segment.chars().count();

        if segment_chars > max_chars {
            flush(&mut current, &mut current_chars, &mut chunks);
            for slice in char_slices(segment, max_chars) {
                if !slice.trim().is_empty() {
                    chunks.push(slice.to_string());
                }
            }
            continue;
        }

        if current_chars + segment_chars > max_chars {
            flush(&mut current, &mut current_chars, &mut chunks);
        }
        current.push_str(segment);
        current_chars += segment_chars;
    }
    flush(&mut current, &mut current_chars, &mut chunks);

    chunks
}

/// Convenience for the degenerate single-chunk case: the head of the
/// text, truncated to one budget.
pub fn truncated_chunk(text: &str, max_chars: usize) -> String {
    char_prefix(text, max_chars).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paged(pages: &[&str]) -> String {
        pages
            .iter()
            .enumerate()
            .map(|(i, p)| format!("\n[PÁGINA {}]\n{p}", i + 1))
            .collect()
    }

    #[test]
    fn test_small_text_is_one_chunk() {
        let text = paged(&["primeira página", "segunda página"]);
        let chunks = split_chunks(&text, 1_000);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].contains("[PÁGINA 2]"));
    }

    #[test]
    fn test_pages_never_split_when_they_fit() {
        let text = paged(&[&"a".repeat(60), &"b".repeat(60), &"c".repeat(60)]);
        let chunks = split_chunks(&text, 160);
        assert_eq!(chunks.len(), 2);
        // Each page stays whole inside its chunk
        assert!(chunks[0].contains(&"a".repeat(60)));
        assert!(chunks[0].contains(&"b".repeat(60)));
        assert!(chunks[1].contains(&"c".repeat(60)));
    }

    #[test]
    fn test_oversized_page_is_cut_at_char_boundaries() {
        let text = paged(&[&"ç".repeat(500)]);
        let chunks = split_chunks(&text, 200);
        assert!(chunks.len() >= 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 200));
        let total: usize = chunks.iter().map(|c| c.matches('ç').count()).sum();
        assert_eq!(total, 500);
    }

    #[test]
    fn test_text_without_markers_falls_back_to_flat_slicing() {
        let text = "x".repeat(250);
        let chunks = split_chunks(&text, 100);
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        assert!(split_chunks("", 100).is_empty());
        assert!(split_chunks("   \n  ", 100).is_empty());
    }

    #[test]
    fn test_budget_conversion() {
        assert_eq!(budget_chars(LOCAL_TOKEN_BUDGET, DEFAULT_CHARS_PER_TOKEN), 24_000);
        assert_eq!(budget_chars(CLOUD_TOKEN_BUDGET, DEFAULT_CHARS_PER_TOKEN), 200_000);
    }

    #[test]
    fn test_budget_conversion_honors_custom_ratio() {
        assert_eq!(budget_chars(6_000, 3), 18_000);
        // A zero ratio would collapse every chunk; clamp to one
        assert_eq!(budget_chars(6_000, 0), 6_000);
    }

    #[test]
    fn test_truncated_chunk_respects_budget() {
        let text = "ação".repeat(100);
        let head = truncated_chunk(&text, 10);
        assert_eq!(head.chars().count(), 10);
    }
}
