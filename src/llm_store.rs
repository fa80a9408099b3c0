//! Runtime LLM credential persistence via OS keyring
//!
//! The answer service accepts a per-request LLM override; users configure
//! it once and every search picks it up. Because the override can carry an
//! API key, it goes in the operating system's native credential store
//! (Keychain on macOS, Secret Service on Linux, Windows Credential
//! Manager on Windows) rather than the state database.
//!
//! The config is serialized to JSON before storage and deserialized on
//! load. The keyring is stateless; [`RuntimeLlmStore`] is a zero-field
//! struct that acts as a namespaced accessor.

use crate::api::types::RuntimeLlmConfig;
use crate::error::{AutosearchError, Result};

const KEYRING_SERVICE: &str = "autosearch";
const KEYRING_USER: &str = "runtime-llm";

/// Stateless accessor for the stored runtime LLM override.
///
/// # Examples
///
/// ```no_run
/// use autosearch::api::RuntimeLlmConfig;
/// use autosearch::llm_store::RuntimeLlmStore;
///
/// # fn example() -> autosearch::error::Result<()> {
/// let store = RuntimeLlmStore::new();
/// let config = RuntimeLlmConfig {
///     base_url: Some("http://localhost:11434/v1".to_string()),
///     model: Some("qwen3:8b".to_string()),
///     ..Default::default()
/// };
/// store.save(&config)?;
/// assert!(store.load()?.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct RuntimeLlmStore;

impl RuntimeLlmStore {
    pub fn new() -> Self {
        Self
    }

    fn entry() -> Result<keyring::Entry> {
        keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)
            .map_err(|e| AutosearchError::Keyring(e).into())
    }

    /// Persist the runtime LLM override.
    ///
    /// # Errors
    ///
    /// Returns [`AutosearchError::Serialization`] if JSON serialization
    /// fails or [`AutosearchError::Keyring`] if the OS credential store
    /// rejects the write.
    pub fn save(&self, config: &RuntimeLlmConfig) -> Result<()> {
        let json_str = serde_json::to_string(config)?;
        Self::entry()?
            .set_password(&json_str)
            .map_err(AutosearchError::Keyring)?;
        Ok(())
    }

    /// Load the stored override.
    ///
    /// Returns `Ok(None)` when nothing has been saved, letting callers
    /// distinguish "not configured" from a genuine keyring error.
    ///
    /// # Errors
    ///
    /// Returns [`AutosearchError::Keyring`] if the OS credential store
    /// returns an unexpected error, or [`AutosearchError::Serialization`]
    /// if the stored JSON is malformed.
    pub fn load(&self) -> Result<Option<RuntimeLlmConfig>> {
        match Self::entry()?.get_password() {
            Ok(json_str) => {
                let config: RuntimeLlmConfig = serde_json::from_str(&json_str)?;
                Ok(Some(config))
            }
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(AutosearchError::Keyring(e).into()),
        }
    }

    /// Delete the stored override.
    ///
    /// A no-op when nothing is stored, so it is safe to call
    /// unconditionally.
    pub fn clear(&self) -> Result<()> {
        match Self::entry()?.delete_password() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(AutosearchError::Keyring(e).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrip_through_json() {
        let original = RuntimeLlmConfig {
            base_url: Some("http://localhost:11434/v1".to_string()),
            api_key: Some("sk-local".to_string()),
            model: Some("qwen3:8b".to_string()),
            temperature: Some(0.2),
            max_tokens: Some(2048),
        };

        let json = serde_json::to_string(&original).expect("serialize");
        let restored: RuntimeLlmConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, original);
    }

    #[test]
    fn test_empty_config_serializes_to_empty_object() {
        let json = serde_json::to_string(&RuntimeLlmConfig::default()).expect("serialize");
        assert_eq!(json, "{}");
    }

    // Keyring integration tests (require a system keyring; skipped in CI).

    #[test]
    #[ignore = "requires system keyring"]
    fn test_save_load_clear_roundtrip_via_keyring() {
        let store = RuntimeLlmStore::new();
        let config = RuntimeLlmConfig {
            base_url: Some("http://localhost:11434/v1".to_string()),
            model: Some("qwen3:8b".to_string()),
            ..Default::default()
        };

        store.save(&config).expect("save");
        let loaded = store.load().expect("load").expect("config present");
        assert_eq!(loaded, config);

        store.clear().expect("clear");
        assert!(store.load().expect("load after clear").is_none());
    }

    #[test]
    #[ignore = "requires system keyring"]
    fn test_clear_is_idempotent() {
        let store = RuntimeLlmStore::new();
        store.clear().expect("first clear");
        store.clear().expect("second clear is no-op");
    }
}
