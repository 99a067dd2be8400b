//! Protocol types for tool listing and dispatch.
//!
//! Framework-agnostic mirrors of the MCP `tools/list` and `tools/call`
//! shapes, so any MCP SDK (or a plain JSON-RPC loop) can drive a
//! [`ToolRegistry`](crate::registry::ToolRegistry).

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A tool as advertised by `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name, e.g. `daraja_stk_push`.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema of the `arguments` object.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl ToolDefinition {
    /// Creates a tool definition.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Parameters for calling a tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallToolParams {
    /// The tool name to invoke.
    pub name: String,
    /// Arguments to pass to the tool.
    #[serde(default)]
    pub arguments: serde_json::Map<String, Value>,
    /// Optional `_meta` field for protocol extensions. Ignored by the registry.
    #[serde(rename = "_meta", default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Map<String, Value>>,
}

impl CallToolParams {
    /// Creates call parameters without `_meta`.
    #[must_use]
    pub fn new(name: impl Into<String>, arguments: serde_json::Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            arguments,
            meta: None,
        }
    }
}

/// A single content item in a tool call result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
#[non_exhaustive]
pub enum ContentItem {
    /// Text content.
    Text {
        /// The text value.
        text: String,
    },
}

impl ContentItem {
    /// Creates a new text content item.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Returns the text content if this is a text item.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
        }
    }
}

/// Result of a tool call.
///
/// Success and failure both carry the JSON payload twice: pretty-printed in
/// a text content item for clients that only read `content`, and verbatim
/// in `structuredContent`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallToolResult {
    /// Content items returned by the tool.
    #[serde(default)]
    pub content: Vec<ContentItem>,
    /// Whether the tool returned an error.
    #[serde(default, rename = "isError")]
    pub is_error: bool,
    /// Optional `_meta` field for protocol extensions.
    #[serde(rename = "_meta", default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Map<String, Value>>,
    /// The JSON result or error payload.
    #[serde(
        default,
        rename = "structuredContent",
        skip_serializing_if = "Option::is_none"
    )]
    pub structured_content: Option<Value>,
}

impl CallToolResult {
    /// Wraps a successful result.
    #[must_use]
    pub fn success(value: Value) -> Self {
        Self::with_payload(value, false)
    }

    /// Wraps an error payload.
    #[must_use]
    pub fn error(payload: Value) -> Self {
        Self::with_payload(payload, true)
    }

    fn with_payload(value: Value, is_error: bool) -> Self {
        let text = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
        Self {
            content: vec![ContentItem::text(text)],
            is_error,
            meta: None,
            structured_content: Some(value),
        }
    }
}
