//! Wire types for the answer-service API
//!
//! Request and response payloads exchanged with the remote search service,
//! plus the typed payloads carried by streaming frames.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Retrieval strategy requested from the answer service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Fast general web retrieval
    #[default]
    Quick,
    /// Multi-pass retrieval with deeper synthesis
    Deep,
    /// Scholarly sources
    Academic,
    /// ArXiv papers with enrichment fields
    Arxiv,
}

impl SearchMode {
    /// All mode names accepted on the wire and the CLI.
    pub const NAMES: [&'static str; 4] = ["quick", "deep", "academic", "arxiv"];

    /// Wire name of the mode (lowercase).
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Quick => "quick",
            SearchMode::Deep => "deep",
            SearchMode::Academic => "academic",
            SearchMode::Arxiv => "arxiv",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "quick" => Ok(SearchMode::Quick),
            "deep" => Ok(SearchMode::Deep),
            "academic" => Ok(SearchMode::Academic),
            "arxiv" => Ok(SearchMode::Arxiv),
            other => Err(format!(
                "unknown search mode '{}' (expected one of: {})",
                other,
                SearchMode::NAMES.join(", ")
            )),
        }
    }
}

/// Per-request LLM override passed through to the service unmodified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RuntimeLlmConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl RuntimeLlmConfig {
    /// True when the override is usable: both a base URL and a model name
    /// are present and non-empty.
    pub fn is_configured(&self) -> bool {
        let has = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        has(&self.base_url) && has(&self.model)
    }
}

/// One retrieved source in a search result.
///
/// `title`, `url`, and `snippet` are always present; the remaining fields
/// are enrichment the service attaches when available (academic and arxiv
/// modes fill most of them). Sources are immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Source {
    pub title: String,
    pub url: String,
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_engine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arxiv_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_summary_3lines: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method_highlights: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limitations: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reproduction_difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_repo_url: Option<String>,
}

/// Body of `POST /api/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub mode: SearchMode,
    pub max_sources: u32,
    /// Synthesis language hint; only sent on streaming requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_config: Option<RuntimeLlmConfig>,
}

/// Complete answer returned by a non-streaming search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub answer: String,
    pub sources: Vec<Source>,
    #[serde(default)]
    pub related_queries: Vec<String>,
    pub search_time: f64,
    pub model_used: String,
}

/// Response of `POST /api/llm/verify`.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResponse {
    pub ok: bool,
    pub model_used: String,
    pub message: String,
}

/// Response of `GET /api/health`.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub llm_connected: bool,
    pub reranker_loaded: bool,
    #[serde(default)]
    pub search_engines: Vec<String>,
}

/// Payload of a `sources` frame.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SourcesPayload {
    pub items: Option<Vec<Source>>,
}

/// Payload of an `answer_chunk` frame.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ChunkPayload {
    pub chunk: Option<String>,
}

/// Payload of an `answer_end` frame. Every field is optional; the session
/// controller decides per field whether to take the frame value or keep
/// what it accumulated.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AnswerEndPayload {
    pub answer: Option<String>,
    pub sources: Option<Vec<Source>>,
    pub related_queries: Option<Vec<String>>,
    pub search_time: Option<f64>,
    pub model_used: Option<String>,
}

/// Payload of an `error` frame.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ErrorPayload {
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_mode_wire_names() {
        assert_eq!(
            serde_json::to_string(&SearchMode::Academic).unwrap(),
            "\"academic\""
        );
        let mode: SearchMode = serde_json::from_str("\"arxiv\"").unwrap();
        assert_eq!(mode, SearchMode::Arxiv);
    }

    #[test]
    fn test_search_mode_from_str_rejects_unknown() {
        assert_eq!("deep".parse::<SearchMode>().unwrap(), SearchMode::Deep);
        assert!("fast".parse::<SearchMode>().is_err());
    }

    #[test]
    fn test_request_omits_absent_optional_fields() {
        let request = SearchRequest {
            query: "rust async".to_string(),
            mode: SearchMode::Quick,
            max_sources: 6,
            language: None,
            stream: false,
            llm_config: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("language"));
        assert!(!json.contains("llm_config"));
        assert!(json.contains("\"stream\":false"));
    }

    #[test]
    fn test_request_includes_language_when_set() {
        let request = SearchRequest {
            query: "rust async".to_string(),
            mode: SearchMode::Deep,
            max_sources: 6,
            language: Some("en".to_string()),
            stream: true,
            llm_config: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"language\":\"en\""));
        assert!(json.contains("\"mode\":\"deep\""));
    }

    #[test]
    fn test_response_tolerates_missing_related_queries() {
        let json = r#"{
            "query": "q",
            "answer": "a",
            "sources": [],
            "search_time": 1.5,
            "model_used": "m"
        }"#;
        let response: SearchResponse = serde_json::from_str(json).unwrap();
        assert!(response.related_queries.is_empty());
    }

    #[test]
    fn test_source_ignores_unknown_fields() {
        let json = r#"{"title":"t","url":"u","snippet":"s","favicon_url":"f"}"#;
        let source: Source = serde_json::from_str(json).unwrap();
        assert_eq!(source.title, "t");
        assert!(source.content.is_none());
    }

    #[test]
    fn test_llm_config_is_configured() {
        let mut config = RuntimeLlmConfig::default();
        assert!(!config.is_configured());

        config.base_url = Some("http://localhost:11434/v1".to_string());
        assert!(!config.is_configured());

        config.model = Some("qwen3:8b".to_string());
        assert!(config.is_configured());

        config.model = Some("  ".to_string());
        assert!(!config.is_configured());
    }

    #[test]
    fn test_answer_end_payload_from_raw_string_falls_back_to_default() {
        let value = serde_json::Value::String("not an object".to_string());
        let payload: AnswerEndPayload =
            serde_json::from_value(value).unwrap_or_default();
        assert!(payload.answer.is_none());
        assert!(payload.sources.is_none());
    }
}
