//! Conversation message types, serialized directly as the provider's
//! chat wire format. Messages are append-only within one orchestration
//! run and never mutated after they join the sequence.

use serde::{Deserialize, Serialize};

/// Conversation role. Serialized to the provider's lowercase role strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A single conversation turn.
///
/// Assistant messages may carry zero or more tool calls; tool messages
/// carry the `tool_call_id` of the request they answer. Fields that are
/// `None` are omitted from the serialized form entirely — the provider
/// rejects explicit nulls in places it does not expect them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// A structured tool invocation request emitted by the model.
/// `arguments` is the provider's raw JSON string, parsed by the tool
/// that ends up handling the call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// A tool result message paired to the tool call it answers.
    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(call_id.into()),
        }
    }

    /// The tool calls carried by this message, empty for non-assistant turns.
    pub fn tool_calls(&self) -> &[ToolCall] {
        self.tool_calls.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_serializes_without_tool_fields() {
        let json = serde_json::to_value(Message::user("Halo")).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "Halo");
        assert!(json.get("tool_calls").is_none());
        assert!(json.get("tool_call_id").is_none());
    }

    #[test]
    fn test_tool_result_carries_call_id() {
        let msg = Message::tool_result("call_abc", "Category: HR\nResume: ...");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "tool");
        assert_eq!(json["tool_call_id"], "call_abc");
    }

    #[test]
    fn test_assistant_message_with_tool_calls_deserializes() {
        let json = r#"{
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": {
                    "name": "get_relevant_docs",
                    "arguments": "{\"query\":\"HR Manager\",\"category_filter\":\"HR\"}"
                }
            }]
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.role, Role::Assistant);
        assert!(msg.content.is_none());
        assert_eq!(msg.tool_calls().len(), 1);
        assert_eq!(msg.tool_calls()[0].function.name, "get_relevant_docs");
        assert_eq!(msg.tool_calls()[0].id, "call_1");
    }

    #[test]
    fn test_assistant_message_without_tool_calls_deserializes() {
        let json = r#"{"role": "assistant", "content": "Halo juga!"}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.role, Role::Assistant);
        assert!(msg.tool_calls().is_empty());
    }
}
