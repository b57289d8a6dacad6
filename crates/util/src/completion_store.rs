//! Persistence for the "walkthrough has been shown" flag.
//!
//! Each walkthrough provider owns exactly one boolean, addressed by a key of
//! the form `<ProviderIdentity>-WalkthroughCompleted`. The JSON-backed store
//! writes those flags to the standard configuration directory
//! (`~/.config/lumen/walkthroughs.json` on most platforms) and is safe to use
//! from multiple threads thanks to the internal `Mutex`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::path_processing::{config_file_path, expand_tilde_path};

/// Environment variable allowing callers to override the completion file path.
pub const COMPLETION_PATH_ENV: &str = "LUMEN_COMPLETION_PATH";

/// Default filename for the persisted completion flags.
pub const COMPLETION_FILE_NAME: &str = "walkthroughs.json";

/// Suffix appended to a provider identity to build its completion key.
pub const COMPLETION_KEY_SUFFIX: &str = "-WalkthroughCompleted";

/// Builds the completion key for a provider identity.
pub fn completion_key(identity: &str) -> String {
    format!("{identity}{COMPLETION_KEY_SUFFIX}")
}

/// Errors surfaced by completion store operations.
#[derive(Debug, Error)]
pub enum CompletionStoreError {
    /// I/O failure while reading or writing the completion file.
    #[error("completion store I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization or deserialization failure.
    #[error("completion store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct CompletionFile {
    #[serde(default)]
    flags: BTreeMap<String, bool>,
}

impl CompletionFile {
    fn get(&self, key: &str) -> bool {
        self.flags.get(key).copied().unwrap_or(false)
    }

    fn set(&mut self, key: &str, completed: bool) {
        if completed {
            self.flags.insert(key.to_string(), true);
        } else {
            self.flags.remove(key);
        }
    }

    fn forget_walkthrough_flags(&mut self) -> usize {
        let before = self.flags.len();
        self.flags.retain(|key, _| !key.ends_with(COMPLETION_KEY_SUFFIX));
        before - self.flags.len()
    }
}

/// Key/value capability used to remember which walkthroughs were completed.
pub trait CompletionStore: Send + Sync {
    /// Returns whether the flag stored under `key` is set. Missing keys read as `false`.
    fn is_completed(&self, key: &str) -> Result<bool, CompletionStoreError>;

    /// Sets or clears the flag stored under `key`.
    fn set_completed(&self, key: &str, completed: bool) -> Result<(), CompletionStoreError>;

    /// Clears every walkthrough completion flag and returns how many were removed.
    fn forget_all(&self) -> Result<usize, CompletionStoreError>;
}

/// JSON-backed completion store persisted on disk.
#[derive(Debug)]
pub struct JsonCompletionStore {
    path: PathBuf,
    file: Mutex<CompletionFile>,
}

impl JsonCompletionStore {
    /// Create a store at the provided path (or the default path when omitted).
    pub fn new<P: Into<Option<PathBuf>>>(path: P) -> Result<Self, CompletionStoreError> {
        let resolved_path = match path.into() {
            Some(path) => expand_tilde_path(&path),
            None => default_completion_path(),
        };

        let file = load_completion_file(&resolved_path)?;
        Ok(Self {
            path: resolved_path,
            file: Mutex::new(file),
        })
    }

    /// Initialize a store at the default location.
    pub fn with_defaults() -> Result<Self, CompletionStoreError> {
        Self::new(None::<PathBuf>)
    }

    /// Path to the underlying JSON file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save_locked(&self, file: &CompletionFile) -> Result<(), CompletionStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(file)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl CompletionStore for JsonCompletionStore {
    fn is_completed(&self, key: &str) -> Result<bool, CompletionStoreError> {
        let file = self.file.lock().expect("completion store lock poisoned");
        Ok(file.get(key))
    }

    fn set_completed(&self, key: &str, completed: bool) -> Result<(), CompletionStoreError> {
        let mut file = self.file.lock().expect("completion store lock poisoned");
        file.set(key, completed);
        debug!(key, completed, path = %self.path.display(), "persisting walkthrough completion flag");
        self.save_locked(&file)
    }

    fn forget_all(&self) -> Result<usize, CompletionStoreError> {
        let mut file = self.file.lock().expect("completion store lock poisoned");
        let removed = file.forget_walkthrough_flags();
        self.save_locked(&file)?;
        Ok(removed)
    }
}

/// In-memory completion store used for tests and as a fallback when the
/// configuration directory cannot be accessed.
#[derive(Debug, Default)]
pub struct InMemoryCompletionStore {
    file: Mutex<CompletionFile>,
}

impl InMemoryCompletionStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CompletionStore for InMemoryCompletionStore {
    fn is_completed(&self, key: &str) -> Result<bool, CompletionStoreError> {
        let file = self.file.lock().expect("completion store lock poisoned");
        Ok(file.get(key))
    }

    fn set_completed(&self, key: &str, completed: bool) -> Result<(), CompletionStoreError> {
        let mut file = self.file.lock().expect("completion store lock poisoned");
        file.set(key, completed);
        Ok(())
    }

    fn forget_all(&self) -> Result<usize, CompletionStoreError> {
        let mut file = self.file.lock().expect("completion store lock poisoned");
        Ok(file.forget_walkthrough_flags())
    }
}

/// Default on-disk location, honouring [`COMPLETION_PATH_ENV`].
pub fn default_completion_path() -> PathBuf {
    config_file_path(COMPLETION_PATH_ENV, COMPLETION_FILE_NAME)
}

fn load_completion_file(path: &Path) -> Result<CompletionFile, CompletionStoreError> {
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<CompletionFile>(&content) {
            Ok(file) => Ok(file),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse walkthrough completion file; treating every walkthrough as not shown"
                );
                Ok(CompletionFile::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(CompletionFile::default()),
        Err(error) => Err(CompletionStoreError::Io(error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use tempfile::tempdir;

    #[test]
    fn completion_key_appends_suffix() {
        assert_eq!(completion_key("DemoScreen"), "DemoScreen-WalkthroughCompleted");
    }

    #[test]
    fn in_memory_store_round_trip() {
        let store = InMemoryCompletionStore::new();
        let key = completion_key("DemoScreen");
        assert!(!store.is_completed(&key).unwrap());

        store.set_completed(&key, true).unwrap();
        assert!(store.is_completed(&key).unwrap());

        store.set_completed(&key, false).unwrap();
        assert!(!store.is_completed(&key).unwrap());
    }

    #[test]
    fn json_store_persists_flags() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("walkthroughs.json");
        let store = JsonCompletionStore::new(Some(path.clone())).unwrap();
        store.set_completed(&completion_key("Settings"), true).unwrap();

        drop(store);
        let reloaded = JsonCompletionStore::new(Some(path)).unwrap();
        assert!(reloaded.is_completed(&completion_key("Settings")).unwrap());
        assert!(!reloaded.is_completed(&completion_key("Profile")).unwrap());
    }

    #[test]
    fn forget_all_only_clears_walkthrough_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("walkthroughs.json");
        fs::write(
            &path,
            r#"{"flags":{"Settings-WalkthroughCompleted":true,"Profile-WalkthroughCompleted":true,"unrelated":true}}"#,
        )
        .unwrap();

        let store = JsonCompletionStore::new(Some(path.clone())).unwrap();
        assert_eq!(store.forget_all().unwrap(), 2);
        assert!(store.is_completed("unrelated").unwrap());

        drop(store);
        let reloaded = JsonCompletionStore::new(Some(path)).unwrap();
        assert!(!reloaded.is_completed(&completion_key("Settings")).unwrap());
        assert!(reloaded.is_completed("unrelated").unwrap());
    }

    #[test]
    fn default_path_honors_env_override() {
        let override_path = "~/custom/walkthroughs.json";
        temp_env::with_var(COMPLETION_PATH_ENV, Some(override_path), || {
            let path = default_completion_path();
            let expected = expand_tilde_path(Path::new(override_path));
            assert_eq!(path, expected);
        });
    }

    #[test]
    fn invalid_json_reads_as_not_completed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("walkthroughs.json");
        fs::write(&path, "not json").unwrap();

        let store = JsonCompletionStore::new(Some(path)).unwrap();
        assert!(!store.is_completed(&completion_key("DemoScreen")).unwrap());
    }

    #[test]
    fn concurrent_writes_keep_every_flag() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("walkthroughs.json");
        let store = Arc::new(JsonCompletionStore::new(Some(path.clone())).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|index| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.set_completed(&completion_key(&format!("Screen{index}")), true).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let reloaded = JsonCompletionStore::new(Some(path)).unwrap();
        for index in 0..4 {
            assert!(reloaded.is_completed(&completion_key(&format!("Screen{index}"))).unwrap());
        }
    }
}
