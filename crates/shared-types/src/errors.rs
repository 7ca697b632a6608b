//! Common error type used across the tooltip crates
//!
//! Only configuration loading and the JavaScript boundary can fail; the
//! tooltip engine itself degrades to no-ops instead of returning errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum TooltipError {
    #[error("Config parse error: {message}")]
    Parse { message: String },

    #[error("Invalid configuration: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("JavaScript interop error: {message}")]
    JsInterop { message: String },
}

/// Result type alias for tooltip operations
pub type TooltipResult<T> = Result<T, TooltipError>;

impl TooltipError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        TooltipError::Validation {
            message: message.into(),
            field: Some(field.to_string()),
        }
    }

    /// Convert to a JSON string for JavaScript
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"type":"JsInterop","details":{"message":"Failed to serialize error"}}"#.to_string()
        })
    }
}

impl From<serde_json::Error> for TooltipError {
    fn from(err: serde_json::Error) -> Self {
        TooltipError::Parse {
            message: format!("JSON parse error: {err}"),
        }
    }
}
