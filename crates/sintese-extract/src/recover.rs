//! Tolerant recovery of a JSON object from a model reply.
//!
//! Replies routinely wrap the object in markdown fences, surround it
//! with prose, leave trailing commas, or put raw newlines inside string
//! literals. Recovery is strict-parse first, then one repair pass and a
//! reparse. Anything still unparseable, and anything whose top level is
//! not an object, yields `None` so the caller can skip the chunk.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("invalid comma pattern"));

static MISSING_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([}\]])\s*""#).expect("invalid separator pattern"));

fn strip_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "")
}

/// The substring from the first `{` to the last `}`, if any.
fn slice_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Escape raw control characters that appear inside string literals.
/// State machine rather than a pattern: the distinction between inside
/// and outside a string needs lookbehind a regex cannot express.
fn escape_control_in_strings(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if !in_string {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
            continue;
        }
        if escaped {
            out.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' => {
                out.push(c);
                escaped = true;
            }
            '"' => {
                out.push(c);
                in_string = false;
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

fn repair(candidate: &str) -> String {
    let escaped = escape_control_in_strings(candidate);
    let without_trailing = TRAILING_COMMA.replace_all(&escaped, "$1");
    // Dropped comma between a closer and the next key
    MISSING_SEPARATOR
        .replace_all(&without_trailing, "$1, \"")
        .into_owned()
}

fn into_object(value: Value) -> Option<Value> {
    value.is_object().then_some(value)
}

/// Recover a JSON object from `raw`, repairing common model mistakes.
pub fn recover_json(raw: &str) -> Option<Value> {
    let stripped = strip_fences(raw);
    let candidate = slice_object(&stripped)?;

    if let Ok(value) = serde_json::from_str::<Value>(candidate) {
        return into_object(value);
    }

    serde_json::from_str::<Value>(&repair(candidate))
        .ok()
        .and_then(into_object)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_json_passes_through() {
        let value = recover_json(r#"{"numero": "123"}"#).unwrap();
        assert_eq!(value["numero"], "123");
    }

    #[test]
    fn test_markdown_fences_are_stripped() {
        let raw = "```json\n{\"numero\": \"123\"}\n```";
        assert_eq!(recover_json(raw).unwrap()["numero"], "123");
    }

    #[test]
    fn test_surrounding_prose_is_ignored() {
        let raw = "Aqui está o resultado:\n{\"pedidos\": [\"pagamento\"]}\nEspero ter ajudado.";
        let value = recover_json(raw).unwrap();
        assert_eq!(value["pedidos"][0], "pagamento");
    }

    #[test]
    fn test_trailing_commas_are_repaired() {
        let raw = r#"{"pedidos": ["a", "b",], "status_atual": "ativo",}"#;
        let value = recover_json(raw).unwrap();
        assert_eq!(value["pedidos"].as_array().unwrap().len(), 2);
        assert_eq!(value["status_atual"], "ativo");
    }

    #[test]
    fn test_missing_separator_after_closer_is_repaired() {
        let raw = r#"{"partes": [{"nome": "A", "polo": "Autor"}] "status_atual": "ativo"}"#;
        let value = recover_json(raw).unwrap();
        assert_eq!(value["partes"][0]["nome"], "A");
        assert_eq!(value["status_atual"], "ativo");
    }

    #[test]
    fn test_missing_separator_after_array_closer_is_repaired() {
        let raw = r#"{"pedidos": ["a", "b"] "status_atual": "ativo"}"#;
        let value = recover_json(raw).unwrap();
        assert_eq!(value["pedidos"].as_array().unwrap().len(), 2);
        assert_eq!(value["status_atual"], "ativo");
    }

    #[test]
    fn test_raw_newline_inside_string_is_escaped() {
        let raw = "{\"resumo_fatos\": \"linha um\nlinha dois\"}";
        let value = recover_json(raw).unwrap();
        assert_eq!(value["resumo_fatos"], "linha um\nlinha dois");
    }

    #[test]
    fn test_escaped_quote_does_not_end_string_tracking() {
        let raw = "{\"resumo_fatos\": \"disse \\\"sim\\\"\ne saiu\"}";
        let value = recover_json(raw).unwrap();
        assert_eq!(value["resumo_fatos"], "disse \"sim\"\ne saiu");
    }

    #[test]
    fn test_garbage_yields_none() {
        assert!(recover_json("sem json nenhum").is_none());
        assert!(recover_json("{quebrado de verdade").is_none());
    }

    #[test]
    fn test_bare_scalar_is_rejected() {
        assert!(recover_json("\"apenas uma string\"").is_none());
        assert!(recover_json("42").is_none());
    }

    #[test]
    fn test_object_inside_array_wrapper_is_recovered() {
        // Brace slicing peels a single-element array wrapper off
        let value = recover_json(r#"[{"numero": "1"}]"#).unwrap();
        assert_eq!(value["numero"], "1");
    }
}
