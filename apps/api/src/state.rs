use std::sync::Arc;

use tokio::sync::Mutex;

use crate::llm_client::ChatModel;
use crate::session::SessionHistory;
use crate::tools::ToolRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The model seam. Production: `LlmClient`; tests script their own.
    pub model: Arc<dyn ChatModel>,
    /// Dispatch table of every capability the model may invoke.
    pub tools: Arc<ToolRegistry>,
    /// Single-session chat history, owned here and injected — never a
    /// process-wide global.
    pub history: Arc<Mutex<SessionHistory>>,
}
