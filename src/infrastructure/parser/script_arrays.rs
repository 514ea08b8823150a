//! Image URL arrays embedded in inline scripts

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static URL_ARRAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\[\s*(?:"https?://[^"]+"(?:\s*,\s*"https?://[^"]+")*)\s*\]"#)
        .expect("valid url array regex")
});
static IMAGES_MEMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)["']?images["']?\s*:\s*\[.*?\]"#).expect("valid images member regex")
});
static ARRAY_ASSIGNMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)=\s*\[.*?https?://.*?\]").expect("valid assignment regex"));

/// Collect string URLs from array literals in script text.
///
/// Three shapes are recognised, in this order: bare arrays of http(s)
/// strings, `images: [...]` members and `= [...]` assignments. Fragments
/// that are not valid JSON are skipped. Duplicates keep their first position.
pub fn find_json_arrays_in_text(text: &str) -> Vec<String> {
    let mut found: Vec<Value> = Vec::new();

    for m in URL_ARRAY.find_iter(text) {
        if let Ok(Value::Array(items)) = serde_json::from_str(m.as_str()) {
            found.extend(items);
        }
    }

    for m in IMAGES_MEMBER.find_iter(text) {
        let object = format!("{{{}}}", m.as_str());
        if let Ok(Value::Object(mut map)) = serde_json::from_str(&object) {
            if let Some(Value::Array(items)) = map.remove("images") {
                found.extend(items);
            }
        }
    }

    for m in ARRAY_ASSIGNMENT.find_iter(text) {
        let literal = m.as_str().trim().trim_start_matches('=').trim();
        if let Ok(Value::Array(items)) = serde_json::from_str(literal) {
            found.extend(items);
        }
    }

    let mut seen = HashSet::new();
    found
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s),
            _ => None,
        })
        .filter(|s| seen.insert(s.clone()))
        .collect()
}
