//! Generic tool registry.
//!
//! [`ToolRegistry`] maps a tool name to its [`ToolDefinition`] and a handler
//! that takes the raw JSON arguments. It knows nothing about the transport:
//! a server loop calls [`ToolRegistry::list_tools`] for `tools/list` and
//! [`ToolRegistry::call_tool`] for `tools/call`.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use daraja::DarajaError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ToolError;
use crate::types::{BoxFuture, CallToolParams, CallToolResult, ToolDefinition};

/// A tool handler operating on raw JSON arguments.
pub type ToolHandler =
    Arc<dyn Fn(Map<String, Value>) -> BoxFuture<'static, Result<Value, ToolError>> + Send + Sync>;

struct RegisteredTool {
    definition: ToolDefinition,
    handler: ToolHandler,
}

/// Registry of callable tools, ordered by name.
#[derive(Default)]
pub struct ToolRegistry(BTreeMap<String, RegisteredTool>);

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.keys().map(String::as_str).collect();
        f.debug_tuple("ToolRegistry").field(&names).finish()
    }
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Registers a raw JSON handler, replacing any tool with the same name.
    pub fn register(&mut self, definition: ToolDefinition, handler: ToolHandler) {
        self.0.insert(
            definition.name.clone(),
            RegisteredTool {
                definition,
                handler,
            },
        );
    }

    /// Registers a handler with typed arguments and result.
    ///
    /// Arguments are decoded into `P` before `handler` runs; a decoding
    /// failure becomes [`ToolError::InvalidArguments`]. The result is
    /// encoded back to JSON.
    pub fn register_typed<P, R, F, Fut>(&mut self, definition: ToolDefinition, handler: F)
    where
        P: DeserializeOwned + Send + 'static,
        R: Serialize + Send + 'static,
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, DarajaError>> + Send + 'static,
    {
        let tool = definition.name.clone();
        let raw: ToolHandler = Arc::new(
            move |arguments: Map<String, Value>| -> BoxFuture<'static, Result<Value, ToolError>> {
                match serde_json::from_value::<P>(Value::Object(arguments)) {
                    Ok(params) => {
                        let pending = handler(params);
                        Box::pin(async move {
                            let result = pending.await?;
                            Ok::<_, ToolError>(serde_json::to_value(result)?)
                        })
                    }
                    Err(source) => {
                        let err = ToolError::InvalidArguments {
                            tool: tool.clone(),
                            source,
                        };
                        Box::pin(async move { Err::<Value, _>(err) })
                    }
                }
            },
        );
        self.register(definition, raw);
    }

    /// Returns every tool definition, sorted by name.
    #[must_use]
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.0.values().map(|tool| tool.definition.clone()).collect()
    }

    /// Returns the definition of `name`, if registered.
    #[must_use]
    pub fn definition(&self, name: &str) -> Option<&ToolDefinition> {
        self.0.get(name).map(|tool| &tool.definition)
    }

    /// Returns `true` if a tool named `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Returns the number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Invokes `name` and returns its JSON result.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownTool`] for an unregistered name, otherwise
    /// whatever the handler returns.
    pub async fn call(&self, name: &str, arguments: Map<String, Value>) -> Result<Value, ToolError> {
        let tool = self
            .0
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_owned()))?;
        (tool.handler)(arguments).await
    }

    /// Invokes a tool and wraps the outcome in a [`CallToolResult`].
    ///
    /// Failures are returned as tool errors (`isError: true`), never as
    /// transport errors.
    pub async fn call_tool(&self, params: CallToolParams) -> CallToolResult {
        #[cfg(feature = "telemetry")]
        tracing::info!(tool = %params.name, "daraja.tool.called");

        match self.call(&params.name, params.arguments).await {
            Ok(value) => CallToolResult::success(value),
            Err(err) => {
                #[cfg(feature = "telemetry")]
                tracing::warn!(tool = %params.name, kind = err.kind(), error = %err, "daraja.tool.failed");
                CallToolResult::error(err.to_payload())
            }
        }
    }
}
