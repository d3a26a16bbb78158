//! Small text helpers shared across the pipeline. The source text is
//! UTF-8 Portuguese, so every length-bounded operation must respect char
//! boundaries.

/// The longest prefix of `text` holding at most `max_chars` characters.
pub fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Split `text` into consecutive slices of at most `max_chars` characters.
pub fn char_slices(text: &str, max_chars: usize) -> Vec<&str> {
    let mut slices = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let head = char_prefix(rest, max_chars);
        slices.push(head);
        rest = &rest[head.len()..];
    }
    slices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_respects_char_boundaries() {
        assert_eq!(char_prefix("ação", 2), "aç");
        assert_eq!(char_prefix("abc", 10), "abc");
        assert_eq!(char_prefix("", 5), "");
    }

    #[test]
    fn test_slices_cover_whole_text() {
        let slices = char_slices("petição inicial", 4);
        assert_eq!(slices.join(""), "petição inicial");
        assert!(slices.iter().all(|s| s.chars().count() <= 4));
    }
}
