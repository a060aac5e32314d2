//! Stable error codes for configuration diagnostics.
//!
//! Codes serialize as `snake_case` strings and never change meaning once
//! published, so callers can match on them instead of on message text.

use serde::Serialize;

/// Machine-readable classification of a configuration problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// A numeric field is outside its permitted range.
    OutOfRange,
    /// Two fields are individually valid but contradict each other.
    InvalidCombo,
    /// A field name is not part of the schema.
    UnknownField,
    /// A string value does not name a supported option.
    UnsupportedValue,
    /// Catch-all for custom rules.
    ValidationFailed,
}

impl ErrorCode {
    /// Returns the serialized name of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OutOfRange => "out_of_range",
            Self::InvalidCombo => "invalid_combo",
            Self::UnknownField => "unknown_field",
            Self::UnsupportedValue => "unsupported_value",
            Self::ValidationFailed => "validation_failed",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
