use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const STOCK_NAME: &str = "STOCK NAME";
pub const ENTRY_PRICE: &str = "ENTRY PRICE";
pub const TARGET_PRICE: &str = "TARGET PRICE";
pub const STOP_LOSS: &str = "STOP LOSS";
pub const TIME_HORIZON: &str = "TIME HORIZON";
pub const CONFIDENCE_LEVEL: &str = "CONFIDENCE LEVEL";
pub const SETUP_TYPE: &str = "SETUP TYPE";
pub const REASONING: &str = "REASONING";
pub const LATEST_NEWS: &str = "LATEST NEWS";

pub const RECORD_KEYS: [&str; 9] = [
    STOCK_NAME,
    ENTRY_PRICE,
    TARGET_PRICE,
    STOP_LOSS,
    TIME_HORIZON,
    CONFIDENCE_LEVEL,
    SETUP_TYPE,
    REASONING,
    LATEST_NEWS,
];

/// Recommendation extracted from the model's reply for one symbol.
///
/// Kept as a free-form JSON object: the model decides what it puts under each key and the
/// fields are not validated. An empty record stands for "nothing usable came back".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisRecord(pub Map<String, Value>);

impl AnalysisRecord {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Field rendered as display text; `None` for missing, null or blank values.
    pub fn field(&self, key: &str) -> Option<String> {
        let text = match self.0.get(key)? {
            Value::Null => return None,
            Value::String(s) => s.trim().to_string(),
            Value::Array(items) => items
                .iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("; "),
            other => other.to_string(),
        };
        (!text.is_empty()).then_some(text)
    }
}

impl From<Map<String, Value>> for AnalysisRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub message: String,
    pub results: Vec<AnalysisRecord>,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> AnalysisRecord {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn field_renders_strings_numbers_and_lists() {
        let r = record(json!({
            STOCK_NAME: " TCS ",
            ENTRY_PRICE: 3850.5,
            LATEST_NEWS: ["Q2 beat", "New deal"],
        }));
        assert_eq!(r.field(STOCK_NAME).as_deref(), Some("TCS"));
        assert_eq!(r.field(ENTRY_PRICE).as_deref(), Some("3850.5"));
        assert_eq!(r.field(LATEST_NEWS).as_deref(), Some("Q2 beat; New deal"));
    }

    #[test]
    fn field_treats_null_and_blank_as_missing() {
        let r = record(json!({ STOP_LOSS: null, REASONING: "  " }));
        assert_eq!(r.field(STOP_LOSS), None);
        assert_eq!(r.field(REASONING), None);
        assert_eq!(r.field(TARGET_PRICE), None);
    }

    #[test]
    fn empty_record_serializes_as_empty_object() {
        assert_eq!(serde_json::to_value(AnalysisRecord::empty()).unwrap(), json!({}));
    }
}
