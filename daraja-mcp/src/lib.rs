#![cfg_attr(docsrs, feature(doc_cfg))]

//! MCP (Model Context Protocol) tool surface for the Daraja adapter.
//!
//! Every adapter operation is exposed as a named tool with a JSON Schema for
//! its arguments. A call never fails at the transport level: adapter errors
//! come back as tool results with `isError: true` and a structured payload
//! naming the error kind.
//!
//! # Architecture
//!
//! The crate provides framework-agnostic types that work with any MCP SDK
//! implementation via [`serde_json::Value`]-based interfaces.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use daraja::{ClientConfig, DarajaClient};
//! use daraja_mcp::{CallToolParams, daraja_tools};
//!
//! let client = DarajaClient::try_new(ClientConfig::from_env()?)?;
//! let tools = daraja_tools(Arc::new(client));
//!
//! // `tools/list`
//! let definitions = tools.list_tools();
//!
//! // `tools/call`
//! let result = tools.call_tool(CallToolParams::new("daraja_stk_query", args)).await;
//! ```
//!
//! # Feature Flags
//!
//! - `telemetry` - Logs every tool call and failure through `tracing`

pub mod error;
pub mod registry;
pub mod tools;
pub mod types;

pub use error::ToolError;
pub use registry::{ToolHandler, ToolRegistry};
pub use tools::{daraja_tools, register_daraja_tools};
pub use types::{CallToolParams, CallToolResult, ContentItem, ToolDefinition};
