//! Structured configuration errors.

use serde::Serialize;

use super::error_code::ErrorCode;

/// One configuration problem: a stable code, the JSON pointer of the
/// offending field, a human-readable message and an optional fix hint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineConfigError {
    pub code: ErrorCode,
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl PipelineConfigError {
    pub fn new(code: ErrorCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            path: path.into(),
            message: message.into(),
            hint: None,
        }
    }

    /// Attach a suggestion for fixing the problem.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl std::fmt::Display for PipelineConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.path, self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, " (hint: {hint})")?;
        }
        Ok(())
    }
}

impl std::error::Error for PipelineConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_hint() {
        let err = PipelineConfigError::new(
            ErrorCode::OutOfRange,
            "/summary/damping",
            "damping must be in (0, 1)",
        )
        .with_hint("The usual value is 0.85");
        assert_eq!(
            err.to_string(),
            "[out_of_range] /summary/damping: damping must be in (0, 1) (hint: The usual value is 0.85)"
        );
    }

    #[test]
    fn test_hint_omitted_from_json_when_absent() {
        let err = PipelineConfigError::new(ErrorCode::UnknownField, "/bogus", "unrecognized field");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "unknown_field");
        assert!(json.get("hint").is_none());
    }
}
