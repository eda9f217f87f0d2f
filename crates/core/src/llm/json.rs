use crate::domain::analysis::AnalysisRecord;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn fenced_json() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)```json\s*(.*?)\s*```").expect("valid fence regex"))
}

/// Body of the first ```` ```json ```` fenced block in `text`.
pub fn extract_fenced_json(text: &str) -> Option<&str> {
    fenced_json()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Parsed(AnalysisRecord),
    /// The reply carried no fenced JSON block.
    Missing,
    /// A block was present but is not a JSON object.
    Malformed { error: String, block: String },
}

pub fn extract_analysis(text: &str) -> Extraction {
    let Some(block) = extract_fenced_json(text) else {
        return Extraction::Missing;
    };

    match serde_json::from_str::<Value>(block) {
        Ok(Value::Object(map)) => Extraction::Parsed(AnalysisRecord::from(map)),
        Ok(other) => Extraction::Malformed {
            error: format!("expected a JSON object, got {}", json_kind(&other)),
            block: block.to_string(),
        },
        Err(err) => Extraction::Malformed {
            error: err.to_string(),
            block: block.to_string(),
        },
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
