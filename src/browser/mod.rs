// Browser automation for the IAM Identity Center consent screen
mod chromium;
mod controller;

pub use chromium::ChromiumLauncher;
pub use controller::{AutomationSettings, LoginFlow};

use crate::error::Result;
use crate::models::SessionCookie;
use async_trait::async_trait;

/// Starts a browser process and connects a control session to it
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    type Session: BrowserSession;

    async fn launch(&self, headless: bool) -> Result<Self::Session>;
}

/// A connected browser: its cookie jar and its pages
#[async_trait]
pub trait BrowserSession: Send {
    type Page: ConsentPage;

    async fn set_cookies(&mut self, cookies: Vec<SessionCookie>) -> Result<()>;

    /// Open `url` in a new tab and wait for it to load
    async fn open(&mut self, url: &str) -> Result<Self::Page>;

    async fn cookies(&mut self) -> Result<Vec<SessionCookie>>;

    async fn close(&mut self) -> Result<()>;
}

/// A loaded page showing the consent UI
#[async_trait]
pub trait ConsentPage: Send + Sync {
    type Button: ConsentButton;

    /// Wait for a button whose text contains `label`
    ///
    /// Bounded by the driver's element timeout.
    async fn button(&self, label: &str) -> Result<Self::Button>;

    /// Single lookup of a button whose text contains `label`
    async fn try_button(&self, label: &str) -> Result<Option<Self::Button>>;
}

#[async_trait]
pub trait ConsentButton: Send + Sync {
    async fn wait_enabled(&self) -> Result<()>;

    async fn wait_visible(&self) -> Result<()>;

    async fn click(&self) -> Result<()>;
}
