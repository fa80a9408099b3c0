//! Reader handoff
//!
//! Passing a full source record through a URL is impractical, so opening a
//! result in the reader goes through storage instead: `save` writes a
//! projection of the source under a fresh correlation id and returns the
//! id, and a later invocation resolves it back with `load`. A pointer key
//! always tracks the most recently saved record, so `load(None)` means
//! "whatever was handed off last".
//!
//! Records never expire; they are overwritten or left behind. Like the
//! session snapshot, all storage traffic here is best-effort: `save`
//! returns a usable id even when the write fails, and `load` answers
//! `None` rather than erroring.

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::api::types::Source;
use crate::storage::StateStore;

/// Prefix for reader record keys; the correlation id is appended.
const READER_KEY_PREFIX: &str = "reader:v1:";
/// Key holding the id of the most recently saved record.
const READER_LAST_KEY: &str = "reader:last:v1";

const BASE36_DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Projection of a [`Source`] for the reader view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReaderPaperState {
    pub pdf: String,
    pub title: String,
    /// ArXiv identifier when the source is a paper, empty otherwise.
    pub id: String,
    pub published: String,
    pub authors: Vec<String>,
    pub categories: Vec<String>,
    pub code: String,
    pub method: String,
    pub limits: String,
}

impl ReaderPaperState {
    /// Build the reader projection of a source.
    ///
    /// Absent enrichment fields project to empty values; a missing title
    /// falls back to `ArXiv Paper`.
    pub fn from_source(source: &Source) -> Self {
        Self {
            pdf: source.pdf_url.clone().unwrap_or_default(),
            title: if source.title.is_empty() {
                "ArXiv Paper".to_string()
            } else {
                source.title.clone()
            },
            id: source.arxiv_id.clone().unwrap_or_default(),
            published: source.published_date.clone().unwrap_or_default(),
            authors: source.authors.clone().unwrap_or_default(),
            categories: source.categories.clone().unwrap_or_default(),
            code: source.code_repo_url.clone().unwrap_or_default(),
            method: source.method_highlights.clone().unwrap_or_default(),
            limits: source.limitations.clone().unwrap_or_default(),
        }
    }
}

/// Saves and resolves reader handoff records.
pub struct ReaderHandoff {
    store: Arc<dyn StateStore>,
}

impl ReaderHandoff {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// Persist the reader projection of `source` and return its id.
    ///
    /// The id is derived from the source (arxiv id or title, slugged) plus
    /// a timestamp and a random suffix, so collisions are practically
    /// impossible. The id comes back even when the write fails; the caller
    /// can still hand it off and the reader will simply find nothing.
    pub fn save(&self, source: &Source) -> String {
        let id = make_reader_id(source);
        let record = ReaderPaperState::from_source(source);

        match serde_json::to_string(&record) {
            Ok(payload) => {
                let key = format!("{}{}", READER_KEY_PREFIX, id);
                if let Err(err) = self.store.put(&key, &payload) {
                    warn!(error = %err, "failed to write reader record");
                } else if let Err(err) = self.store.put(READER_LAST_KEY, &id) {
                    warn!(error = %err, "failed to update last-reader pointer");
                }
            }
            Err(err) => warn!(error = %err, "failed to serialize reader record"),
        }

        id
    }

    /// Resolve a handoff record.
    ///
    /// With `None` (or an empty id) the most recently saved record is
    /// returned. An unknown id, a missing pointer, or an unparseable
    /// record all answer `None`.
    pub fn load(&self, id: Option<&str>) -> Option<ReaderPaperState> {
        let target = match id {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => self.store.get(READER_LAST_KEY).ok().flatten()?,
        };

        let key = format!("{}{}", READER_KEY_PREFIX, target);
        let raw = self.store.get(&key).ok().flatten()?;
        serde_json::from_str(&raw).ok()
    }
}

/// Derive a fresh correlation id for a source.
///
/// Shape: `<slug>-<millis base36>-<6 random base36 chars>`, where the slug
/// comes from the arxiv id when present, else the title, else `paper`.
fn make_reader_id(source: &Source) -> String {
    let base = source
        .arxiv_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(if source.title.is_empty() {
            "paper"
        } else {
            &source.title
        });

    let slug = slugify(base);
    let slug = if slug.is_empty() { "paper" } else { &slug };

    let millis = Utc::now().timestamp_millis().max(0) as u64;

    format!("{}-{}-{}", slug, to_base36(millis), random_suffix(6))
}

/// Lowercase the input and collapse every non-alphanumeric run to a single
/// `-`, trimming separators from both ends.
fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    for ch in input.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

fn random_suffix(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| BASE36_DIGITS[rng.random_range(0..BASE36_DIGITS.len())] as char)
        .collect()
}
