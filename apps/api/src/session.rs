//! In-memory session chat history.
//!
//! Owned by the presentation boundary and injected into handlers via
//! `AppState` — never ambient global state. Entries are append-only and
//! unbounded; only the display window is trimmed.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Display window: the most recent entries shown to the user.
pub const HISTORY_WINDOW: usize = 20;
/// Per-entry truncation applied to the display window.
const DISPLAY_CONTENT_CHARS: usize = 1000;

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub role: String,
    pub content: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct SessionHistory {
    entries: Vec<HistoryEntry>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: &str, content: &str) {
        self.entries.push(HistoryEntry {
            role: role.to_string(),
            content: content.to_string(),
            at: Utc::now(),
        });
    }

    /// The most recent `HISTORY_WINDOW` entries, content truncated for
    /// display. Stored entries are never mutated.
    pub fn window(&self) -> Vec<HistoryEntry> {
        let start = self.entries.len().saturating_sub(HISTORY_WINDOW);
        self.entries[start..]
            .iter()
            .map(|e| HistoryEntry {
                role: e.role.clone(),
                content: truncate_chars(&e.content, DISPLAY_CONTENT_CHARS),
                at: e.at,
            })
            .collect()
    }
}

/// Char-boundary-safe truncation to at most `max` characters.
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_keeps_most_recent_twenty() {
        let mut history = SessionHistory::new();
        for i in 0..25 {
            history.push("Human", &format!("pesan {i}"));
        }
        let window = history.window();
        assert_eq!(window.len(), HISTORY_WINDOW);
        assert_eq!(window[0].content, "pesan 5");
        assert_eq!(window.last().unwrap().content, "pesan 24");
    }

    #[test]
    fn test_window_shorter_than_limit_returns_all() {
        let mut history = SessionHistory::new();
        history.push("Human", "Halo");
        history.push("AI", "Halo juga!");
        assert_eq!(history.window().len(), 2);
    }

    #[test]
    fn test_window_truncates_long_content() {
        let mut history = SessionHistory::new();
        history.push("AI", &"x".repeat(1500));
        let window = history.window();
        assert_eq!(window[0].content.chars().count(), 1000);
    }

    #[test]
    fn test_truncate_chars_is_char_boundary_safe() {
        let s = "ééééé";
        assert_eq!(truncate_chars(s, 3), "ééé");
        assert_eq!(truncate_chars(s, 10), "ééééé");
    }
}
