use thiserror::Error;

/// Error text the automation layer produces when stdout has lost its reader.
pub const CLOSED_PIPE_MESSAGE: &str = "write on closed pipe";

#[derive(Error, Debug)]
pub enum LoginError {
    #[error("Browser launch failed: {0}")]
    BrowserLaunch(String),

    #[error("Browser connection failed: {0}")]
    BrowserConnect(String),

    #[error("Timed out waiting for page")]
    Timeout,

    #[error("write on closed pipe")]
    ClosedPipe,

    #[error("{0}")]
    Automation(String),

    #[error("Input ended before a device authorization URL was found")]
    NoAuthorizationUrl,

    #[error("Allow button not found after {attempts} attempts")]
    AllowButtonNotFound { attempts: u32 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid cookie encoding: {0}")]
    CookieEncoding(#[from] base64::DecodeError),
}

impl LoginError {
    /// Classify raw error text coming out of the browser automation layer.
    pub fn from_automation_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if message == CLOSED_PIPE_MESSAGE {
            LoginError::ClosedPipe
        } else {
            LoginError::Automation(message)
        }
    }

    /// True when the output consumer went away mid-run.
    pub fn is_closed_pipe(&self) -> bool {
        match self {
            LoginError::ClosedPipe => true,
            LoginError::Io(e) => e.kind() == std::io::ErrorKind::BrokenPipe,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, LoginError>;
