use super::{BrowserLauncher, BrowserSession, ConsentButton, ConsentPage};
use crate::error::{LoginError, Result};
use crate::models::SESSION_COOKIE_NAME;
use crate::status::StatusReporter;
use crate::store::CredentialStore;
use std::time::Duration;
use tokio::time::sleep;

pub const CONFIRM_LABEL: &str = "Confirm and continue";
pub const ALLOW_LABEL: &str = "Allow";

const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
const DEFAULT_SETTLE_MS: u64 = 1000;

/// Timing knobs of the consent-screen automation
#[derive(Debug, Clone)]
pub struct AutomationSettings {
    pub headless: bool,
    /// Delay between lookups of the Allow button
    pub poll_interval: Duration,
    /// Pause after clicking Confirm while the next page renders
    pub settle: Duration,
    /// `None` polls for the Allow button until it shows up
    pub max_allow_attempts: Option<u32>,
}

impl Default for AutomationSettings {
    fn default() -> Self {
        Self {
            headless: true,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            settle: Duration::from_millis(DEFAULT_SETTLE_MS),
            max_allow_attempts: None,
        }
    }
}

/// One sign-in: launch, restore cookie, consent, save cookie
pub struct LoginFlow<'a, L: BrowserLauncher> {
    launcher: &'a L,
    store: &'a CredentialStore,
    reporter: &'a dyn StatusReporter,
    settings: AutomationSettings,
}

impl<'a, L: BrowserLauncher> LoginFlow<'a, L> {
    pub fn new(
        launcher: &'a L,
        store: &'a CredentialStore,
        reporter: &'a dyn StatusReporter,
        settings: AutomationSettings,
    ) -> Self {
        Self {
            launcher,
            store,
            reporter,
            settings,
        }
    }

    /// Drive the consent screen behind `url` to completion
    ///
    /// Launch and connect failures, navigation errors and UI errors are
    /// returned; problems with the saved cookie only produce warnings.
    pub async fn run(&self, url: &str) -> Result<()> {
        self.reporter.progress("init headless-browser");
        let mut session = self.launcher.launch(self.settings.headless).await?;
        tracing::debug!(headless = self.settings.headless, "Browser session connected");

        self.inject_prior_credential(&mut session).await;

        let outcome = self.drive(&mut session, url).await;

        if let Err(e) = session.close().await {
            tracing::debug!("Failed to close browser: {}", e);
        }

        outcome
    }

    async fn inject_prior_credential(&self, session: &mut L::Session) {
        self.reporter.progress("loading cookies");

        let loaded = self.store.load();
        if let Some(warning) = loaded.warning {
            self.reporter.warning(&warning);
        }

        let Some(cookie) = loaded.cookie else {
            return;
        };

        if let Err(e) = session.set_cookies(vec![cookie]).await {
            self.reporter
                .warning(&format!("Failed to restore saved cookie: {}", e));
        }
    }

    async fn drive(&self, session: &mut L::Session, url: &str) -> Result<()> {
        self.reporter.progress("opening url");
        let page = session.open(url).await?;

        self.reporter.progress("clicking Confirm and continue button");
        let confirm = page.button(CONFIRM_LABEL).await?;
        confirm.wait_enabled().await?;
        confirm.click().await?;
        sleep(self.settings.settle).await;

        self.reporter.progress("waiting for Allow button");
        let allow = self.poll_allow_button(&page).await?;
        allow.wait_visible().await?;
        allow.click().await?;

        self.persist_credential(session).await;
        Ok(())
    }

    async fn poll_allow_button<P: ConsentPage>(&self, page: &P) -> Result<P::Button> {
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            match page.try_button(ALLOW_LABEL).await {
                Ok(Some(button)) => {
                    tracing::debug!(attempts, "Found Allow button");
                    return Ok(button);
                }
                Ok(None) => tracing::trace!(attempts, "Allow button not rendered yet"),
                Err(e) if e.is_closed_pipe() => return Err(e),
                Err(e) => tracing::debug!(attempts, "Allow button lookup failed: {}", e),
            }

            if let Some(max) = self.settings.max_allow_attempts {
                if attempts >= max {
                    return Err(LoginError::AllowButtonNotFound { attempts });
                }
            }

            sleep(self.settings.poll_interval).await;
        }
    }

    async fn persist_credential(&self, session: &mut L::Session) {
        self.reporter.progress("saving cookies");

        let jar = match session.cookies().await {
            Ok(jar) => jar,
            Err(e) => {
                self.reporter
                    .warning(&format!("Failed to read browser cookies: {}", e));
                return;
            }
        };

        match self.store.save(&jar) {
            Ok(true) => tracing::info!("Saved {} cookie", SESSION_COOKIE_NAME),
            Ok(false) => tracing::debug!("Consent flow produced no {} cookie", SESSION_COOKIE_NAME),
            Err(e) => self.reporter.warning(&format!(
                "Failed to save {} cookie: {}",
                SESSION_COOKIE_NAME, e
            )),
        }
    }
}
