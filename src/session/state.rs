//! Observable search session state

use serde::{Deserialize, Serialize};

use crate::api::types::{SearchMode, Source};

/// Complete state of the current search session.
///
/// One instance describes everything a consumer needs to render a session:
/// the inputs (`query`, `mode`), the accumulated outputs, and the transient
/// progress flags. `answer` only grows while a stream is live; `sources`
/// and `related_queries` are replaced wholesale, never merged.
///
/// Snapshots of this struct are persisted as JSON. Missing fields in an
/// older snapshot fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SessionState {
    pub query: String,
    pub mode: SearchMode,
    /// Synthesized answer text; append-only while streaming.
    pub answer: String,
    pub sources: Vec<Source>,
    pub related_queries: Vec<String>,
    /// Server-reported search duration in seconds.
    pub search_time: f64,
    pub model_used: String,
    /// True from request issue until a terminal condition.
    pub loading: bool,
    /// True while an event stream is being consumed.
    pub streaming: bool,
    /// User-visible failure description, if the last search failed.
    pub error: Option<String>,
}

impl SessionState {
    /// Copy of the state with the transient fields neutralized.
    ///
    /// Applied before every snapshot write and after every snapshot read,
    /// so a persisted session can never resurrect as "in progress" or
    /// replay a stale error.
    pub fn neutralized(&self) -> Self {
        Self {
            loading: false,
            streaming: false,
            error: None,
            ..self.clone()
        }
    }
}
