// Configuration management
use crate::browser::AutomationSettings;
use crate::error::{LoginError, Result};
use crate::store::CredentialStore;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const APP_DIR: &str = "aws-federated-headless-login";

/// Environment variable naming the Chromium executable
pub const BROWSER_ENV: &str = "AWS_FEDERATED_LOGIN_BROWSER";
/// Environment variable overriding the cookie file location
pub const COOKIE_FILE_ENV: &str = "AWS_FEDERATED_LOGIN_COOKIE_FILE";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub automation: AutomationConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Chromium executable; chromiumoxide searches the usual locations when unset
    pub executable: Option<PathBuf>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            executable: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_settle")]
    pub settle_ms: u64,
    #[serde(default = "default_element_timeout")]
    pub element_timeout_secs: u64,
    /// Unset means wait for the Allow button indefinitely
    pub max_allow_attempts: Option<u32>,
}

fn default_poll_interval() -> u64 {
    500
}

fn default_settle() -> u64 {
    1000
}

fn default_element_timeout() -> u64 {
    30
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            settle_ms: default_settle(),
            element_timeout_secs: default_element_timeout(),
            max_allow_attempts: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    pub cookie_file: Option<PathBuf>,
}

impl Config {
    /// Get the config directory path
    ///
    /// Priority:
    /// 1. XDG_CONFIG_HOME/aws-federated-headless-login (if env var is set)
    /// 2. ~/.config/aws-federated-headless-login (if ~/.config exists)
    /// 3. ~/.aws-federated-headless-login.d (fallback on Unix)
    /// 4. Platform default on Windows
    pub fn config_dir() -> Result<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return Ok(PathBuf::from(xdg_config).join(APP_DIR));
        }

        #[cfg(unix)]
        {
            if let Some(home_dir) = dirs::home_dir() {
                let xdg_config = home_dir.join(".config");

                if xdg_config.exists() {
                    return Ok(xdg_config.join(APP_DIR));
                }

                // ~/.aws-federated-headless-login itself is the cookie file
                return Ok(home_dir.join(format!(".{}.d", APP_DIR)));
            }
        }

        #[cfg(not(unix))]
        {
            if let Some(config_dir) = dirs::config_dir() {
                return Ok(config_dir.join(APP_DIR));
            }
        }

        Err(LoginError::Config(
            "Could not determine config directory".to_string(),
        ))
    }

    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, environment variables, and defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;

        let mut config = if config_path.exists() {
            tracing::debug!("Loading config from: {}", config_path.display());
            let contents = fs::read_to_string(&config_path)
                .map_err(|e| LoginError::Config(format!("Failed to read config file: {}", e)))?;
            Self::parse(&contents)?
        } else {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            Config::default()
        };

        if let Ok(executable) = std::env::var(BROWSER_ENV) {
            tracing::debug!("Using {} from environment: {}", BROWSER_ENV, executable);
            config.browser.executable = Some(PathBuf::from(executable));
        }

        if let Ok(cookie_file) = std::env::var(COOKIE_FILE_ENV) {
            tracing::debug!("Using {} from environment: {}", COOKIE_FILE_ENV, cookie_file);
            config.store.cookie_file = Some(PathBuf::from(cookie_file));
        }

        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| LoginError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Create a sample config file with comments
    pub fn create_sample() -> Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        let config_path = Self::config_file_path()?;

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).map_err(|e| {
                LoginError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        // Don't overwrite existing config
        if config_path.exists() {
            return Err(LoginError::Config(format!(
                "Config file already exists at: {}",
                config_path.display()
            )));
        }

        fs::write(&config_path, SAMPLE_CONFIG)
            .map_err(|e| LoginError::Config(format!("Failed to write sample config: {}", e)))?;

        Ok(config_path)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.browser.request_timeout_secs)
    }

    pub fn element_timeout(&self) -> Duration {
        Duration::from_secs(self.automation.element_timeout_secs)
    }

    pub fn credential_store(&self) -> CredentialStore {
        match &self.store.cookie_file {
            Some(path) => CredentialStore::at(path),
            None => CredentialStore::new(),
        }
    }

    pub fn automation_settings(&self, headless: bool) -> AutomationSettings {
        AutomationSettings {
            headless,
            poll_interval: Duration::from_millis(self.automation.poll_interval_ms),
            settle: Duration::from_millis(self.automation.settle_ms),
            max_allow_attempts: self.automation.max_allow_attempts,
        }
    }
}

const SAMPLE_CONFIG: &str = r#"# aws-federated-headless-login configuration
# Location priority:
#   1. $XDG_CONFIG_HOME/aws-federated-headless-login/config.toml
#   2. ~/.config/aws-federated-headless-login/config.toml (if ~/.config exists)
#   3. ~/.aws-federated-headless-login.d/config.toml (fallback)
#
# Environment overrides:
#   AWS_FEDERATED_LOGIN_BROWSER      Chromium executable
#   AWS_FEDERATED_LOGIN_COOKIE_FILE  saved cookie location

[browser]
# Chromium/Chrome executable (searched on PATH when unset)
# executable = "/usr/bin/chromium"

# Page load timeout in seconds
request_timeout_secs = 30

[automation]
# Delay between lookups of the Allow button
poll_interval_ms = 500

# Pause after clicking "Confirm and continue"
settle_ms = 1000

# How long to wait for a button to appear or become clickable
element_timeout_secs = 30

# Give up on the Allow button after this many lookups (default: never)
# max_allow_attempts = 120

[store]
# Where the session cookie is kept (default: ~/.aws-federated-headless-login)
# cookie_file = "/home/me/.aws-federated-headless-login"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_automation_defaults() {
        let settings = Config::default().automation_settings(true);
        let defaults = AutomationSettings::default();
        assert_eq!(settings.poll_interval, defaults.poll_interval);
        assert_eq!(settings.settle, defaults.settle);
        assert_eq!(settings.max_allow_attempts, defaults.max_allow_attempts);
        assert_eq!(Config::default().request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_sample_config_parses() {
        let config = Config::parse(SAMPLE_CONFIG).unwrap();
        assert_eq!(config.automation.poll_interval_ms, 500);
        assert_eq!(config.automation.settle_ms, 1000);
        assert!(config.browser.executable.is_none());
        assert!(config.store.cookie_file.is_none());
    }

    #[test]
    fn test_partial_config() {
        let config = Config::parse(
            r#"
            [automation]
            max_allow_attempts = 10

            [store]
            cookie_file = "/tmp/cookie"
            "#,
        )
        .unwrap();

        assert_eq!(config.automation.max_allow_attempts, Some(10));
        assert_eq!(config.automation.poll_interval_ms, 500);
        assert_eq!(config.browser.request_timeout_secs, 30);
        assert_eq!(config.store.cookie_file, Some(PathBuf::from("/tmp/cookie")));

        let settings = config.automation_settings(false);
        assert!(!settings.headless);
        assert_eq!(settings.max_allow_attempts, Some(10));
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let err = Config::parse("[automation]\npoll_interval_ms = \"fast\"").unwrap_err();
        assert!(matches!(err, LoginError::Config(_)));
    }
}
