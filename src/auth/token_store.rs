use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::AuthError;

/// Token file name, stored next to the executable
const TOKEN_FILE: &str = ".tokens.json";

/// The persisted OAuth credential triple.
///
/// Replaced wholesale on every refresh - the access token, refresh token and
/// expiry all come from the same token endpoint response, never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
    /// Absolute expiry as a Unix timestamp in seconds
    pub expires_at: i64,
}

impl Credential {
    /// True while `expires_at` is strictly in the future
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now.timestamp()
    }
}

/// Owns the on-disk credential file. At most one process touches the store at
/// a time; no locking.
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default token file location: alongside the binary, falling back to the
    /// working directory when the executable path is unavailable.
    pub fn default_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(TOKEN_FILE)))
            .unwrap_or_else(|| PathBuf::from(TOKEN_FILE))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load the saved credential. A missing file is `Ok(None)`; a file that
    /// exists but does not parse as the credential record is an error.
    pub fn load(&self) -> Result<Option<Credential>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read token file {}", self.path.display()))?;

        let credential: Credential =
            serde_json::from_str(&contents).map_err(|e| AuthError::CorruptState {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        Ok(Some(credential))
    }

    /// Save the credential, overwriting any prior contents. Writes to a
    /// temporary sibling and renames it over the target so a concurrent
    /// reader never observes a half-written file.
    pub fn save(&self, credential: &Credential) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let contents = serde_json::to_string_pretty(credential)?;

        let mut tmp = self.path.clone();
        tmp.as_mut_os_string().push(".tmp");
        std::fs::write(&tmp, contents)
            .with_context(|| format!("Failed to write token file {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to move token file into place at {}", self.path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> TokenStore {
        let dir = std::env::temp_dir().join(format!("ridestats-test-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        TokenStore::new(dir.join(TOKEN_FILE))
    }

    #[test]
    fn test_load_absent_is_none() {
        let store = temp_store("absent");
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let store = temp_store("roundtrip");
        let credential = Credential {
            access_token: "A".to_string(),
            refresh_token: "R".to_string(),
            expires_at: 1_900_000_000,
        };
        store.save(&credential).unwrap();

        let loaded = store.load().unwrap().expect("credential should exist");
        assert_eq!(loaded, credential);
    }

    #[test]
    fn test_save_overwrites_unconditionally() {
        let store = temp_store("overwrite");
        let first = Credential {
            access_token: "A".to_string(),
            refresh_token: "R".to_string(),
            expires_at: 100,
        };
        let second = Credential {
            access_token: "B".to_string(),
            refresh_token: "R2".to_string(),
            expires_at: 200,
        };
        store.save(&first).unwrap();
        store.save(&second).unwrap();

        assert_eq!(store.load().unwrap().unwrap(), second);
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let store = temp_store("tmpfile");
        let credential = Credential {
            access_token: "A".to_string(),
            refresh_token: "R".to_string(),
            expires_at: 100,
        };
        store.save(&credential).unwrap();

        let dir = store.path().parent().unwrap();
        let entries: Vec<_> = std::fs::read_dir(dir).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_corrupt_file_is_an_error_not_absent() {
        let store = temp_store("corrupt");
        std::fs::write(store.path(), "not json at all").unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AuthError>(),
            Some(AuthError::CorruptState { .. })
        ));
    }

    #[test]
    fn test_wrong_shape_is_corrupt() {
        let store = temp_store("shape");
        std::fs::write(store.path(), r#"{"access_token": "A"}"#).unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AuthError>(),
            Some(AuthError::CorruptState { .. })
        ));
    }

    #[test]
    fn test_freshness_is_strict() {
        let now = Utc::now();
        let fresh = Credential {
            access_token: "A".to_string(),
            refresh_token: "R".to_string(),
            expires_at: now.timestamp() + 3600,
        };
        let expired = Credential {
            expires_at: now.timestamp(),
            ..fresh.clone()
        };
        assert!(fresh.is_fresh(now));
        assert!(!expired.is_fresh(now));
    }
}
