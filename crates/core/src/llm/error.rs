use crate::llm::Provider;
use serde_json::Value;
use std::fmt;

/// Upper bound on raw provider output copied into log events.
pub const RAW_PREVIEW_CHARS: usize = 2000;

/// A provider call that failed after the request left the process. Carries whatever the
/// provider sent back so a failed run can be diagnosed from logs alone.
#[derive(Debug, Clone)]
pub struct LlmDiagnosticsError {
    pub provider: Provider,
    pub stage: &'static str,
    pub detail: String,
    pub raw_output: Option<String>,
    pub raw_response_json: Option<Value>,
}

impl LlmDiagnosticsError {
    /// First diagnostics error anywhere in the chain, so `.context(..)` wrapping added by
    /// callers does not hide it.
    pub fn find(err: &anyhow::Error) -> Option<&Self> {
        err.chain().find_map(|e| e.downcast_ref::<Self>())
    }

    pub fn raw_preview(&self) -> Option<String> {
        self.raw_output
            .as_deref()
            .map(|raw| raw.chars().take(RAW_PREVIEW_CHARS).collect())
    }
}

impl fmt::Display for LlmDiagnosticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} call failed at {}: {}",
            self.provider, self.stage, self.detail
        )
    }
}

impl std::error::Error for LlmDiagnosticsError {}

/// Emits the provider's raw reply for a failed run. Returns `false` when the failure did
/// not come from a provider call.
pub fn log_provider_diagnostics(err: &anyhow::Error) -> bool {
    let Some(diag) = LlmDiagnosticsError::find(err) else {
        return false;
    };
    tracing::error!(
        provider = ?diag.provider,
        stage = diag.stage,
        raw_output = diag.raw_preview().as_deref().unwrap_or(""),
        raw_response = ?diag.raw_response_json,
        "provider diagnostics"
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http_failure(raw: &str) -> LlmDiagnosticsError {
        LlmDiagnosticsError {
            provider: Provider::Anthropic,
            stage: "http",
            detail: "status=529".to_string(),
            raw_output: Some(raw.to_string()),
            raw_response_json: serde_json::from_str(raw).ok(),
        }
    }

    #[test]
    fn find_sees_through_context_layers() {
        let err = anyhow::Error::from(http_failure(r#"{"type":"error"}"#))
            .context("analysis failed for TCS")
            .context("batch aborted");

        let diag = LlmDiagnosticsError::find(&err).unwrap();
        assert_eq!(diag.stage, "http");
        assert_eq!(diag.raw_output.as_deref(), Some(r#"{"type":"error"}"#));
        assert!(diag.raw_response_json.is_some());
    }

    #[test]
    fn find_is_none_for_unrelated_errors() {
        let err = anyhow::anyhow!("SEARCH_API_KEY is required");
        assert!(LlmDiagnosticsError::find(&err).is_none());
        assert!(!log_provider_diagnostics(&err));
    }

    #[test]
    fn raw_preview_is_clipped_on_char_boundaries() {
        let raw = "₹".repeat(RAW_PREVIEW_CHARS + 10);
        let preview = http_failure(&raw).raw_preview().unwrap();
        assert_eq!(preview.chars().count(), RAW_PREVIEW_CHARS);
    }

    #[test]
    fn logs_diagnostics_for_wrapped_provider_failures() {
        let err = anyhow::Error::from(http_failure("overloaded")).context("analysis failed");
        assert!(log_provider_diagnostics(&err));
    }

    #[test]
    fn display_names_stage_and_detail() {
        assert_eq!(
            http_failure("x").to_string(),
            "Anthropic call failed at http: status=529"
        );
    }
}
