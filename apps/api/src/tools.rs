//! Tool dispatch table.
//!
//! The orchestrator never matches on tool names: every external
//! capability registers here, and a tool-call request from the model is
//! routed by name through the table. Adding a tool touches only its own
//! module plus one `register` call at startup.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::llm_client::ToolSpec;

/// An external capability the model may invoke.
///
/// `invoke` receives the provider's raw argument JSON and returns the
/// literal tool output text fed back into the conversation.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn spec(&self) -> ToolSpec;
    async fn invoke(&self, arguments: &str) -> Result<String, AppError>;
}

/// Name → handler registry, built once at startup.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) {
        let name = handler.spec().function.name.clone();
        self.tools.insert(name, handler);
    }

    /// Provider-facing specs for every registered tool.
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.values().map(|t| t.spec()).collect()
    }

    /// Routes a model-emitted tool call to its handler. A name the model
    /// invented is a model-output defect, not a caller error.
    pub async fn dispatch(&self, name: &str, arguments: &str) -> Result<String, AppError> {
        let handler = self
            .tools
            .get(name)
            .ok_or_else(|| AppError::Llm(format!("model requested unknown tool '{name}'")))?;
        handler.invoke(arguments).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    #[async_trait]
    impl ToolHandler for EchoTool {
        fn spec(&self) -> ToolSpec {
            ToolSpec::function(
                "echo",
                "echoes its arguments",
                serde_json::json!({"type": "object", "properties": {}}),
            )
        }

        async fn invoke(&self, arguments: &str) -> Result<String, AppError> {
            Ok(arguments.to_string())
        }
    }

    fn registry_with_echo() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));
        registry
    }

    #[tokio::test]
    async fn test_dispatch_routes_by_name() {
        let registry = registry_with_echo();
        let output = registry.dispatch("echo", "{\"x\":1}").await.unwrap();
        assert_eq!(output, "{\"x\":1}");
    }

    #[tokio::test]
    async fn test_dispatch_rejects_unknown_tool() {
        let registry = registry_with_echo();
        let err = registry.dispatch("delete_everything", "{}").await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }

    #[test]
    fn test_specs_lists_registered_tools() {
        let registry = registry_with_echo();
        let specs = registry.specs();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].function.name, "echo");
    }
}
