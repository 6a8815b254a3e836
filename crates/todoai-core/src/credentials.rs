//! Resolution of the Mistral API key
//!
//! A key saved by the user always wins over the default baked in at build
//! time. Resolution happens on every read, so a key saved through the
//! settings dialog takes effect on the very next request.

use std::path::PathBuf;
use anyhow::Result;
use tracing::warn;

use crate::config::Config;

/// Default key captured from the build environment, if any
pub const BUILD_DEFAULT_KEY: Option<&str> = option_env!("MISTRAL_API_KEY");

/// Persistent storage for the single user-supplied key
pub trait CredentialStore {
    fn get(&self) -> Result<Option<String>>;
    fn set(&mut self, value: &str) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
}

impl<S: CredentialStore + ?Sized> CredentialStore for Box<S> {
    fn get(&self) -> Result<Option<String>> {
        (**self).get()
    }

    fn set(&mut self, value: &str) -> Result<()> {
        (**self).set(value)
    }

    fn clear(&mut self) -> Result<()> {
        (**self).clear()
    }
}

/// Stores the key in the JSON config file
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store backed by `<config_dir>/todoai/config.json`
    pub fn new() -> Result<Self> {
        Ok(Self::at(Config::get_config_path()?))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Rewrite the key field. An unreadable file is left untouched.
    fn update(&self, key: Option<String>) -> Result<()> {
        let mut config = Config::load_from(&self.path)?;
        config.mistral_api_key = key;
        config.save_to(&self.path)
    }
}

impl CredentialStore for ConfigStore {
    fn get(&self) -> Result<Option<String>> {
        Ok(Config::load_from(&self.path)?.mistral_api_key)
    }

    fn set(&mut self, value: &str) -> Result<()> {
        self.update(Some(value.to_string()))
    }

    fn clear(&mut self) -> Result<()> {
        self.update(None)
    }
}

/// In-process store, used when no config directory is available
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    value: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self) -> Result<Option<String>> {
        Ok(self.value.clone())
    }

    fn set(&mut self, value: &str) -> Result<()> {
        self.value = Some(value.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.value = None;
        Ok(())
    }
}

/// Where the resolved key came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    User,
    Default,
    None,
}

impl KeySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySource::User => "saved key",
            KeySource::Default => "built-in default",
            KeySource::None => "not configured",
        }
    }
}

pub struct Credentials<S: CredentialStore> {
    store: S,
    default: Option<String>,
}

impl<S: CredentialStore> Credentials<S> {
    /// Resolver using the key captured at build time as the fallback
    pub fn new(store: S) -> Self {
        Self::with_default(store, BUILD_DEFAULT_KEY)
    }

    pub fn with_default(store: S, default: Option<&str>) -> Self {
        Self {
            store,
            default: default.filter(|k| !k.is_empty()).map(str::to_string),
        }
    }

    /// The key to send, or an empty string when nothing is configured
    pub fn resolve(&self) -> String {
        self.user_key()
            .or_else(|| self.default.clone())
            .unwrap_or_default()
    }

    pub fn source(&self) -> KeySource {
        if self.user_key().is_some() {
            KeySource::User
        } else if self.default.is_some() {
            KeySource::Default
        } else {
            KeySource::None
        }
    }

    /// Save a user key. A blank value removes the saved key instead.
    pub fn set(&mut self, value: &str) -> Result<()> {
        let value = value.trim();
        if value.is_empty() {
            return self.clear();
        }
        self.store.set(value)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.store.clear()
    }

    fn user_key(&self) -> Option<String> {
        match self.store.get() {
            Ok(key) => key.filter(|k| !k.is_empty()),
            Err(e) => {
                warn!(error = %e, "could not read saved API key");
                None
            }
        }
    }
}

/// Show only the tail of a key, for display
pub fn mask_key(key: &str) -> String {
    let count = key.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = key.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_key_overrides_default() {
        let mut creds = Credentials::with_default(MemoryStore::new(), Some("default-key"));
        creds.set("user-key").unwrap();

        assert_eq!(creds.resolve(), "user-key");
        assert_eq!(creds.source(), KeySource::User);
    }

    #[test]
    fn test_clear_falls_back_to_default() {
        let mut creds = Credentials::with_default(MemoryStore::new(), Some("default-key"));
        creds.set("user-key").unwrap();
        creds.clear().unwrap();

        assert_eq!(creds.resolve(), "default-key");
        assert_eq!(creds.source(), KeySource::Default);
    }

    #[test]
    fn test_nothing_configured_resolves_empty() {
        let creds = Credentials::with_default(MemoryStore::new(), None);
        assert_eq!(creds.resolve(), "");
        assert_eq!(creds.source(), KeySource::None);
    }

    #[test]
    fn test_empty_default_counts_as_absent() {
        let creds = Credentials::with_default(MemoryStore::new(), Some(""));
        assert_eq!(creds.source(), KeySource::None);
    }

    #[test]
    fn test_blank_set_clears_saved_key() {
        let mut creds = Credentials::with_default(MemoryStore::new(), None);
        creds.set("user-key").unwrap();
        creds.set("   ").unwrap();

        assert_eq!(creds.resolve(), "");
    }

    #[test]
    fn test_set_trims_value() {
        let mut creds = Credentials::with_default(MemoryStore::new(), None);
        creds.set("  abc123 \n").unwrap();
        assert_eq!(creds.resolve(), "abc123");
    }

    #[test]
    fn test_config_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todoai").join("config.json");

        let mut creds = Credentials::with_default(ConfigStore::at(&path), None);
        creds.set("persisted").unwrap();

        let reopened = Credentials::with_default(ConfigStore::at(&path), Some("fallback"));
        assert_eq!(reopened.resolve(), "persisted");

        let mut reopened = reopened;
        reopened.clear().unwrap();
        assert_eq!(reopened.resolve(), "fallback");
    }

    #[test]
    fn test_unreadable_config_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "garbage").unwrap();

        let creds = Credentials::with_default(ConfigStore::at(&path), Some("fallback"));
        assert_eq!(creds.resolve(), "fallback");
    }

    #[test]
    fn test_unreadable_config_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let mut creds = Credentials::with_default(ConfigStore::at(&path), None);
        assert!(creds.set("new-key").is_err());
        assert!(creds.clear().is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("abcdefgh"), "****efgh");
        assert_eq!(mask_key("abc"), "***");
        assert_eq!(mask_key(""), "");
    }
}
