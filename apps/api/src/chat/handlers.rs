//! Axum route handlers for the chat API.
//!
//! This is the request boundary for run failures: a model or retrieval
//! failure during a run is caught HERE, answered with a generic degraded
//! message and zeroed usage, and the session keeps going.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::chat::run_turn;
use crate::errors::AppError;
use crate::extract::extract_pdf_text;
use crate::llm_client::Usage;
use crate::session::HistoryEntry;
use crate::state::AppState;

/// Generic answer shown when a run fails. Usage is zeroed alongside it.
const FALLBACK_ANSWER: &str =
    "Maaf, terjadi kesalahan internal saat memproses permintaan Anda.";

// gpt-4o-mini list pricing, per million tokens. Display estimate only.
const INPUT_USD_PER_MTOKEN: f64 = 0.15;
const OUTPUT_USD_PER_MTOKEN: f64 = 0.60;
const USD_TO_IDR: f64 = 17_000.0;

#[derive(Debug, Serialize)]
pub struct UsageReport {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

#[derive(Debug, Serialize)]
pub struct CostEstimate {
    pub usd: f64,
    pub idr: f64,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
    pub usage: UsageReport,
    /// Diagnostic log per executed tool call, for the tool-call panel.
    pub tool_calls: Vec<String>,
    pub cost: CostEstimate,
    /// Trimmed history window including this turn.
    pub history: Vec<HistoryEntry>,
}

fn estimate_cost(usage: &Usage) -> CostEstimate {
    let usd = (usage.prompt_tokens as f64 * INPUT_USD_PER_MTOKEN
        + usage.completion_tokens as f64 * OUTPUT_USD_PER_MTOKEN)
        / 1_000_000.0;
    CostEstimate {
        usd,
        idr: usd * USD_TO_IDR,
    }
}

/// POST /api/v1/chat
///
/// Multipart form: `query` text field plus an optional `file` PDF field.
/// A malformed PDF fails this upload only (422); a failed run degrades to
/// the fallback answer with zeroed usage instead of an error status.
pub async fn handle_chat(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ChatResponse>, AppError> {
    let mut query = String::new();
    let mut uploaded_text: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart request: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("query") => {
                query = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable query field: {e}")))?;
            }
            Some("file") => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable file field: {e}")))?;
                let text = extract_pdf_text(&data)?;
                // A text-free PDF behaves like no upload at all
                if !text.trim().is_empty() {
                    uploaded_text = Some(text);
                }
            }
            _ => {}
        }
    }

    let query = query.trim().to_string();
    if query.is_empty() && uploaded_text.is_none() {
        return Err(AppError::Validation(
            "Silakan tulis pertanyaan atau unggah CV untuk dianalisis.".to_string(),
        ));
    }
    if query.is_empty() {
        return Err(AppError::Validation(
            "Apa yang ingin Anda tanyakan tentang kandidat ini?".to_string(),
        ));
    }

    let (answer, usage, tool_logs) =
        match run_turn(state.model.as_ref(), &state.tools, &query, uploaded_text.as_deref()).await
        {
            Ok(turn) => (turn.answer, turn.usage, turn.tool_logs),
            Err(e @ (AppError::Retrieval(_) | AppError::Llm(_))) => {
                error!("chat run failed: {e}");
                (FALLBACK_ANSWER.to_string(), Usage::default(), Vec::new())
            }
            Err(other) => return Err(other),
        };

    let cost = estimate_cost(&usage);

    let history = {
        let mut history = state.history.lock().await;
        history.push("Human", &query);
        history.push("AI", &answer);
        history.window()
    };

    Ok(Json(ChatResponse {
        answer,
        usage: UsageReport {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
        },
        tool_calls: tool_logs,
        cost,
        history,
    }))
}

/// GET /api/v1/chat/history
///
/// The trimmed display window of the session history.
pub async fn handle_history(State(state): State<AppState>) -> Json<Vec<HistoryEntry>> {
    Json(state.history.lock().await.window())
}
