//! Error types for tool dispatch.

use daraja::DarajaError;
use serde_json::{Map, Value, json};

/// Errors that can occur while dispatching a tool call.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ToolError {
    /// No tool is registered under the requested name.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The arguments do not decode into the tool's parameter type.
    #[error("Invalid arguments for {tool}: {source}")]
    InvalidArguments {
        /// The tool that was called.
        tool: String,
        /// The decoding failure.
        #[source]
        source: serde_json::Error,
    },

    /// The adapter rejected or failed the call.
    #[error(transparent)]
    Adapter(#[from] DarajaError),

    /// The adapter result could not be encoded as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ToolError {
    /// Returns a stable identifier for the failure.
    ///
    /// Adapter failures report their [`daraja::ErrorKind`]; undecodable
    /// arguments count as `validation` since nothing was sent.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownTool(_) => "unknown_tool",
            Self::InvalidArguments { .. } => "validation",
            Self::Adapter(err) => err.kind().as_str(),
            Self::Json(_) => "internal",
        }
    }

    /// Builds the `structuredContent` of a failed call:
    ///
    /// ```json
    /// { "error": { "kind": "api", "message": "...", "code": "500001", "status": 500 } }
    /// ```
    ///
    /// `code` and `status` are present only for provider errors.
    #[must_use]
    pub fn to_payload(&self) -> Value {
        let mut error = Map::new();
        error.insert("kind".into(), json!(self.kind()));
        error.insert("message".into(), json!(self.to_string()));
        if let Self::Adapter(err) = self {
            if let Some(code) = err.api_code() {
                error.insert("code".into(), json!(code));
            }
            if let Some(status) = err.http_status() {
                error.insert("status".into(), json!(status.as_u16()));
            }
        }
        json!({ "error": error })
    }
}
