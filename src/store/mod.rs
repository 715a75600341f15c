// Session cookie persistence
use crate::error::{LoginError, Result};
use crate::models::{SessionCookie, SESSION_COOKIE_NAME};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the saved cookie, relative to the home directory
pub const COOKIE_FILE_NAME: &str = ".aws-federated-headless-login";

/// Encode a cookie as base64 of its JSON form
pub fn encode(cookie: &SessionCookie) -> Result<String> {
    let json = serde_json::to_vec(cookie)?;
    Ok(STANDARD.encode(json))
}

/// Decode the base64/JSON form written by [`encode`]
pub fn decode(data: &str) -> Result<SessionCookie> {
    let bytes = STANDARD.decode(data.trim())?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Result of reading the saved cookie
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub cookie: Option<SessionCookie>,
    /// Set when a file was present but could not be used
    pub warning: Option<String>,
}

/// Stores the single IAM Identity Center session cookie
/// in ~/.aws-federated-headless-login
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: Option<PathBuf>,
}

impl CredentialStore {
    /// Store at the default location under the home directory
    ///
    /// A missing home directory leaves the store without a path: loads find
    /// nothing and saves are skipped.
    pub fn new() -> Self {
        let path = dirs::home_dir().map(|home| home.join(COOKIE_FILE_NAME));
        if path.is_none() {
            tracing::warn!("Could not determine home directory, cookies will not be kept");
        }
        Self { path }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read the saved cookie, if any
    ///
    /// Never fails: an absent file is the normal first-run case and a corrupt
    /// one is treated as absent.
    pub fn load(&self) -> LoadOutcome {
        let Some(path) = self.path.as_deref() else {
            return LoadOutcome {
                cookie: None,
                warning: Some("Could not determine home directory".to_string()),
            };
        };

        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No saved cookie at {}", path.display());
                return LoadOutcome::default();
            }
            Err(e) => {
                tracing::warn!("Failed to read cookie file {}: {}", path.display(), e);
                return LoadOutcome {
                    cookie: None,
                    warning: Some(format!("Failed to read saved cookie: {}", e)),
                };
            }
        };

        match decode(&data) {
            Ok(cookie) => {
                tracing::debug!("Loaded {} cookie from {}", cookie.name, path.display());
                LoadOutcome {
                    cookie: Some(cookie),
                    warning: None,
                }
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable cookie file {}: {}", path.display(), e);
                LoadOutcome {
                    cookie: None,
                    warning: Some(format!("Ignoring unreadable saved cookie: {}", e)),
                }
            }
        }
    }

    /// Persist the session cookie out of a browser cookie jar
    ///
    /// Returns `Ok(false)` without touching the file when the jar holds no
    /// session cookie.
    pub fn save(&self, jar: &[SessionCookie]) -> Result<bool> {
        let Some(cookie) = jar.iter().find(|c| c.is_identity_center_session()) else {
            tracing::debug!("No {} cookie in browser jar", SESSION_COOKIE_NAME);
            return Ok(false);
        };

        let path = self.path.as_deref().ok_or_else(|| {
            LoginError::Config("Could not determine home directory".to_string())
        })?;

        let encoded = encode(cookie)?;
        write_private(path, encoded.as_bytes())?;

        tracing::debug!("Saved {} cookie to {}", cookie.name, path.display());
        Ok(true)
    }

    /// Remove the saved cookie (logout)
    pub fn remove(&self) -> Result<bool> {
        let Some(path) = self.path.as_deref() else {
            return Ok(false);
        };

        if path.exists() {
            fs::remove_file(path)?;
            return Ok(true);
        }

        Ok(false)
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents)?;
    Ok(())
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> Result<()> {
    fs::write(path, contents)?;
    Ok(())
}
