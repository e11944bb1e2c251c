//! Venue credential loading.
//!
//! Security notes:
//! - The token is held in `Zeroizing<String>` and wiped on drop.
//! - Loaded once at startup; no runtime rotation.
//! - Never logged. `Debug` is redacted.

use crate::error::{TradeError, TradeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use zeroize::Zeroizing;

/// Where the venue API token comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum KeySource {
    /// Load from environment variable (development).
    EnvVar { var_name: String },
    /// Load from file (production, recommend 0600 permissions).
    File { path: PathBuf },
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnvVar { var_name } => write!(f, "env:{var_name}"),
            Self::File { path } => write!(f, "file:{}", path.display()),
        }
    }
}

/// Bearer token for the venue order API.
pub struct VenueCredential {
    token: Zeroizing<String>,
}

impl VenueCredential {
    /// Load the token from `source`. Surrounding whitespace is trimmed.
    pub fn load(source: &KeySource) -> TradeResult<Self> {
        let raw = match source {
            KeySource::EnvVar { var_name } => Zeroizing::new(
                std::env::var(var_name)
                    .map_err(|_| TradeError::EnvVarNotFound(var_name.clone()))?,
            ),
            KeySource::File { path } => Zeroizing::new(std::fs::read_to_string(path)?),
        };
        Self::from_token(raw.trim())
    }

    pub fn from_token(token: impl Into<String>) -> TradeResult<Self> {
        let token = Zeroizing::new(token.into());
        if token.is_empty() {
            return Err(TradeError::EmptyCredential);
        }
        Ok(Self { token })
    }

    pub(crate) fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for VenueCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VenueCredential")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_env() {
        let var = "VAULT_TRADE_TEST_CREDENTIAL_ENV";
        std::env::set_var(var, "  tok_123\n");
        let cred = VenueCredential::load(&KeySource::EnvVar {
            var_name: var.to_string(),
        })
        .unwrap();
        assert_eq!(cred.token(), "tok_123");
        std::env::remove_var(var);
    }

    #[test]
    fn test_missing_env_var() {
        let err = VenueCredential::load(&KeySource::EnvVar {
            var_name: "VAULT_TRADE_TEST_DOES_NOT_EXIST".to_string(),
        })
        .unwrap_err();
        assert!(matches!(err, TradeError::EnvVarNotFound(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "file_token").unwrap();
        let cred = VenueCredential::load(&KeySource::File {
            path: file.path().to_path_buf(),
        })
        .unwrap();
        assert_eq!(cred.token(), "file_token");
    }

    #[test]
    fn test_empty_file_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = VenueCredential::load(&KeySource::File {
            path: file.path().to_path_buf(),
        })
        .unwrap_err();
        assert!(matches!(err, TradeError::EmptyCredential));
    }

    #[test]
    fn test_debug_is_redacted() {
        let cred = VenueCredential::from_token("super_secret").unwrap();
        let dbg = format!("{cred:?}");
        assert!(!dbg.contains("super_secret"));
        assert!(dbg.contains("redacted"));
    }

    #[test]
    fn test_key_source_deserialize() {
        #[derive(Deserialize)]
        struct Wrapper {
            credential: KeySource,
        }
        let w: Wrapper = serde_json::from_str(
            r#"{"credential":{"source":"env_var","var_name":"VENUE_API_KEY"}}"#,
        )
        .unwrap();
        assert_eq!(
            w.credential,
            KeySource::EnvVar {
                var_name: "VENUE_API_KEY".to_string()
            }
        );
    }
}
