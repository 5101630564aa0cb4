use crate::core::channel::dedup_key;
use crate::error::{Error, Result};
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::LazyLock;

/// A link, or an `@handle` that does not continue a word (so the domain of
/// `name@example.com` is not a handle).
static CANDIDATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(https?://[^\s<>"'()\[\]]+)|(?:^|[^A-Za-z0-9._])(@[A-Za-z0-9._]+)"#)
        .expect("candidate pattern is valid")
});

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

/// Turns a model response into an ordered, de-duplicated list of at most
/// `target` candidate channel URLs or handles.
///
/// A JSON array must contain only strings; any other JSON document is
/// rejected. Free text is scanned for `@handles` and `http(s)` links.
pub fn parse_candidates(response: &str, target: usize) -> Result<Vec<String>> {
    let body = strip_code_fence(response.trim());

    let raw = match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(items)) => from_json_array(items)?,
        Ok(other) => {
            return Err(Error::MalformedCandidates(format!(
                "expected a list of strings, got {}",
                json_kind(&other)
            )));
        }
        Err(_) => from_free_text(body),
    };

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    for item in raw {
        // Items that fail to normalize are kept so the merge step can reject
        // the whole list.
        let key = dedup_key(&item).unwrap_or_else(|_| item.clone());
        if seen.insert(key) {
            candidates.push(item);
        }
    }

    if candidates.is_empty() {
        return Err(Error::MalformedCandidates(
            "response contained no channel handles or URLs".to_string(),
        ));
    }

    candidates.truncate(target);
    Ok(candidates)
}

fn from_json_array(items: Vec<Value>) -> Result<Vec<String>> {
    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::String(s) => Ok(s),
            other => Err(Error::MalformedCandidates(format!(
                "element {idx} is {}, not a string",
                json_kind(&other)
            ))),
        })
        .collect()
}

fn from_free_text(text: &str) -> Vec<String> {
    CANDIDATE_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().trim_end_matches(TRAILING_PUNCTUATION))
        .filter(|s| s.len() > 1)
        .filter(|s| match dedup_key(s) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Skipping unusable candidate {s}: {e}");
                false
            }
        })
        .map(str::to_string)
        .collect()
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_handles_in_order_without_duplicates() {
        let response = "Here you go:\n@doggo\n@Cat.Daily\n@doggo\nhttps://www.tiktok.com/@parrot_talks/\n";
        let parsed = parse_candidates(response, 20).unwrap();
        assert_eq!(
            parsed,
            vec!["@doggo", "@Cat.Daily", "https://www.tiktok.com/@parrot_talks/"]
        );
    }

    #[test]
    fn handle_and_profile_url_count_once() {
        let parsed = parse_candidates("@doggo and https://www.tiktok.com/@DOGGO", 20).unwrap();
        assert_eq!(parsed, vec!["@doggo"]);
    }

    #[test]
    fn trailing_sentence_punctuation_is_dropped() {
        let parsed = parse_candidates("Try @doggo. Also @kitty, maybe.", 20).unwrap();
        assert_eq!(parsed, vec!["@doggo", "@kitty"]);
    }

    #[test]
    fn email_domains_are_not_handles() {
        let response = "Contact partnerships@petco.com or try @doggo (and @kitty)";
        let parsed = parse_candidates(response, 20).unwrap();
        assert_eq!(parsed, vec!["@doggo", "@kitty"]);
    }

    #[test]
    fn dotted_names_in_json_stay_handles() {
        let parsed = parse_candidates(r#"["cat.daily", "doggo"]"#, 20).unwrap();
        let keys: Vec<String> = parsed.iter().map(|c| dedup_key(c).unwrap()).collect();
        assert_eq!(
            keys,
            ["https://www.tiktok.com/@cat.daily", "https://www.tiktok.com/@doggo"]
        );
    }

    #[test]
    fn truncates_to_target() {
        let parsed = parse_candidates("@a1 @a2 @a3 @a4", 2).unwrap();
        assert_eq!(parsed, vec!["@a1", "@a2"]);
    }

    #[test]
    fn accepts_json_string_array() {
        let parsed = parse_candidates(r#"["@doggo", "https://example.com/u/1"]"#, 20).unwrap();
        assert_eq!(parsed, vec!["@doggo", "https://example.com/u/1"]);
    }

    #[test]
    fn accepts_fenced_json() {
        let parsed = parse_candidates("```json\n[\"@doggo\"]\n```", 20).unwrap();
        assert_eq!(parsed, vec!["@doggo"]);
    }

    #[test]
    fn rejects_json_that_is_not_a_string_list() {
        assert!(matches!(
            parse_candidates(r#"{"channels": ["@doggo"]}"#, 20),
            Err(Error::MalformedCandidates(_))
        ));
        assert!(matches!(
            parse_candidates(r#"["@doggo", 42]"#, 20),
            Err(Error::MalformedCandidates(_))
        ));
    }

    #[test]
    fn rejects_responses_without_candidates() {
        assert!(matches!(
            parse_candidates("Sorry, I could not find any channels.", 20),
            Err(Error::MalformedCandidates(_))
        ));
    }
}
