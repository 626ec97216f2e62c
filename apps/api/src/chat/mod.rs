//! Conversation orchestrator — one run per user submission.
//!
//! Flow: assemble prompt → first model call (tool registered) →
//!       branch on tool calls → execute tools, append paired results →
//!       final generation call → answer + usage + display logs.
//!
//! Errors from the model provider or a tool are NOT caught here: they
//! propagate to the request boundary, which presents the degraded
//! response. No partial answer is ever synthesized at this level.

pub mod handlers;
pub mod prompts;

use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::{ChatModel, Usage};
use crate::models::conversation::{Message, ToolCall};
use crate::session::truncate_chars;
use crate::tools::ToolRegistry;

/// What one orchestration run hands back to the presentation boundary.
#[derive(Debug)]
pub struct TurnOutput {
    pub answer: String,
    pub usage: Usage,
    /// One display-only entry per executed tool call. Not part of the
    /// model-facing conversation.
    pub tool_logs: Vec<String>,
}

/// Branch taken after the first model response. A response carrying tool
/// calls goes through execution before the final generation call; one
/// without skips straight to it. A direct answer is accepted even when
/// the system prompt mandated tool use.
enum Phase {
    ToolsRequested(Vec<ToolCall>),
    DirectAnswer,
}

/// Builds the message sequence for the first model call. Deterministic
/// for a given `(query, uploaded_text)` pair.
pub fn assemble_messages(query: &str, uploaded_text: Option<&str>) -> Vec<Message> {
    vec![
        Message::system(prompts::SYSTEM_PROMPT),
        Message::user(prompts::build_user_message(query, uploaded_text)),
    ]
}

/// Display log entry for one executed tool call: truncated query, the
/// filter as the model passed it, then the literal tool output.
fn tool_log_line(call: &ToolCall, output: &str) -> String {
    let args: serde_json::Value =
        serde_json::from_str(&call.function.arguments).unwrap_or(serde_json::Value::Null);
    let query = args.get("query").and_then(|v| v.as_str()).unwrap_or("N/A");
    let filter = args
        .get("category_filter")
        .and_then(|v| v.as_str())
        .unwrap_or("None");
    format!(
        "Tool Output (Query: {}..., Filter: {}):\n{}",
        truncate_chars(query, 50),
        filter,
        output
    )
}

/// Runs one full orchestration: two model calls at most, tools executed
/// in emission order between them.
pub async fn run_turn(
    model: &dyn ChatModel,
    tools: &ToolRegistry,
    query: &str,
    uploaded_text: Option<&str>,
) -> Result<TurnOutput, AppError> {
    let run_id = Uuid::new_v4();
    let mut messages = assemble_messages(query, uploaded_text);
    let specs = tools.specs();

    info!(
        "run {run_id}: first model call ({} tool(s) registered)",
        specs.len()
    );
    let first = model
        .chat(&messages, Some(&specs))
        .await
        .map_err(|e| AppError::Llm(format!("first model call failed: {e}")))?;

    let phase = match &first.message.tool_calls {
        Some(calls) if !calls.is_empty() => Phase::ToolsRequested(calls.clone()),
        _ => Phase::DirectAnswer,
    };
    // The response joins the conversation verbatim — the second call
    // must see what was requested.
    messages.push(first.message);

    let mut tool_logs = Vec::new();
    match &phase {
        Phase::ToolsRequested(calls) => {
            info!("run {run_id}: model requested {} tool call(s)", calls.len());
            for call in calls {
                let output = tools
                    .dispatch(&call.function.name, &call.function.arguments)
                    .await?;
                tool_logs.push(tool_log_line(call, &output));
                messages.push(Message::tool_result(call.id.clone(), output));
            }
        }
        Phase::DirectAnswer => {
            info!("run {run_id}: no tool calls, answering directly");
        }
    }

    let finalized = model
        .chat(&messages, None)
        .await
        .map_err(|e| AppError::Llm(format!("final model call failed: {e}")))?;

    let answer = finalized
        .message
        .content
        .clone()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Llm("model returned an empty answer".to_string()))?;

    info!(
        "run {run_id}: answered ({} prompt / {} completion tokens)",
        finalized.usage.prompt_tokens, finalized.usage.completion_tokens
    );

    Ok(TurnOutput {
        answer,
        usage: finalized.usage,
        tool_logs,
    })
}
