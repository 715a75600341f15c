// Chrome DevTools Protocol driver
use super::{BrowserLauncher, BrowserSession, ConsentButton, ConsentPage};
use crate::error::{LoginError, Result};
use crate::models::SessionCookie;
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::CookieParam;
use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, BrowserConfig, Element, Page};
use futures::StreamExt;
use serde_json::Value;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};

/// Spacing of the short readiness checks inside one bounded wait
const READINESS_POLL_MS: u64 = 100;

/// `Network.setCookies` accepts a subset of what `Network.getCookies` returns
const COOKIE_PARAM_FIELDS: &[&str] = &[
    "name",
    "value",
    "domain",
    "path",
    "secure",
    "httpOnly",
    "sameSite",
    "expires",
    "priority",
    "sourceScheme",
    "sourcePort",
];

const IS_ENABLED_JS: &str = "function() { return !this.disabled; }";
const IS_VISIBLE_JS: &str = "function() { \
    const rect = this.getBoundingClientRect(); \
    const style = window.getComputedStyle(this); \
    return rect.width > 0 && rect.height > 0 \
        && style.visibility !== 'hidden' && style.display !== 'none'; \
}";

impl From<CdpError> for LoginError {
    fn from(err: CdpError) -> Self {
        match err {
            CdpError::Timeout => LoginError::Timeout,
            CdpError::Io(e) if e.kind() == std::io::ErrorKind::BrokenPipe => LoginError::ClosedPipe,
            other => LoginError::from_automation_message(other.to_string()),
        }
    }
}

/// Launches a local Chromium through chromiumoxide
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    executable: Option<PathBuf>,
    request_timeout: Duration,
    element_timeout: Duration,
}

impl ChromiumLauncher {
    pub fn new(
        executable: Option<PathBuf>,
        request_timeout: Duration,
        element_timeout: Duration,
    ) -> Self {
        Self {
            executable,
            request_timeout,
            element_timeout,
        }
    }

    fn profile_dir() -> PathBuf {
        std::env::temp_dir().join(format!(
            "aws-federated-headless-login-{}",
            std::process::id()
        ))
    }

    fn config(&self, headless: bool, profile_dir: &Path) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(self.request_timeout)
            .user_data_dir(profile_dir);

        if !headless {
            builder = builder.with_head();
        }

        if let Some(executable) = &self.executable {
            builder = builder.chrome_executable(executable);
        }

        builder.build().map_err(LoginError::BrowserLaunch)
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    type Session = ChromiumSession;

    async fn launch(&self, headless: bool) -> Result<ChromiumSession> {
        let profile_dir = Self::profile_dir();
        let config = self.config(headless, &profile_dir)?;

        tracing::debug!(headless, "Launching browser");
        let (browser, handler) = Browser::launch(config).await.map_err(|e| match e {
            CdpError::Ws(e) => LoginError::BrowserConnect(e.to_string()),
            other => LoginError::BrowserLaunch(other.to_string()),
        })?;

        // The handler drives the websocket; the browser is unusable without it
        let handler = tokio::spawn(drain_events(handler));

        Ok(ChromiumSession {
            browser,
            handler,
            profile_dir,
            element_timeout: self.element_timeout,
        })
    }
}

pub struct ChromiumSession {
    browser: Browser,
    handler: JoinHandle<()>,
    profile_dir: PathBuf,
    element_timeout: Duration,
}

/// Pump the CDP event stream until the connection closes
///
/// Per-message errors, such as events from a newer protocol revision that do
/// not deserialize, leave the connection usable and are skipped.
async fn drain_events<S, E>(mut events: S)
where
    S: futures::Stream<Item = std::result::Result<(), E>> + Unpin,
    E: std::fmt::Display,
{
    while let Some(event) = events.next().await {
        if let Err(e) = event {
            tracing::debug!("Skipping browser event: {}", e);
        }
    }
    tracing::debug!("Browser event stream closed");
}

fn to_cookie_param(cookie: &SessionCookie) -> Result<CookieParam> {
    let mut value = serde_json::to_value(cookie)?;

    if let Value::Object(fields) = &mut value {
        fields.retain(|key, field| {
            COOKIE_PARAM_FIELDS.contains(&key.as_str()) && field.as_str() != Some("")
        });
        if cookie.is_session_cookie() {
            fields.remove("expires");
        }
    }

    Ok(serde_json::from_value(value)?)
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    type Page = ChromiumPage;

    async fn set_cookies(&mut self, cookies: Vec<SessionCookie>) -> Result<()> {
        let params = cookies
            .iter()
            .map(to_cookie_param)
            .collect::<Result<Vec<_>>>()?;
        self.browser.set_cookies(params).await?;
        Ok(())
    }

    async fn open(&mut self, url: &str) -> Result<ChromiumPage> {
        let page = self.browser.new_page(url).await?;
        Ok(ChromiumPage {
            page,
            element_timeout: self.element_timeout,
        })
    }

    async fn cookies(&mut self) -> Result<Vec<SessionCookie>> {
        let cookies = self.browser.get_cookies().await?;

        let mut jar = Vec::with_capacity(cookies.len());
        for cookie in &cookies {
            jar.push(serde_json::from_value(serde_json::to_value(cookie)?)?);
        }
        Ok(jar)
    }

    async fn close(&mut self) -> Result<()> {
        let closed = self.browser.close().await;
        if closed.is_ok() {
            if let Err(e) = self.browser.wait().await {
                tracing::debug!("Failed to reap browser process: {}", e);
            }
        }
        self.handler.abort();

        if let Err(e) = std::fs::remove_dir_all(&self.profile_dir) {
            tracing::debug!(
                "Failed to remove browser profile {}: {}",
                self.profile_dir.display(),
                e
            );
        }

        closed?;
        Ok(())
    }
}

pub struct ChromiumPage {
    page: Page,
    element_timeout: Duration,
}

#[async_trait]
impl ConsentPage for ChromiumPage {
    type Button = ChromiumButton;

    async fn button(&self, label: &str) -> Result<ChromiumButton> {
        wait_until(self.element_timeout, move || async move {
            self.try_button(label).await.map_err(|e| {
                tracing::trace!("Lookup of {:?} button failed: {}", label, e);
                e
            })
        })
        .await
    }

    async fn try_button(&self, label: &str) -> Result<Option<ChromiumButton>> {
        for element in self.page.find_elements("button").await? {
            let text = element.inner_text().await?.unwrap_or_default();
            if text.contains(label) {
                return Ok(Some(ChromiumButton {
                    element,
                    element_timeout: self.element_timeout,
                }));
            }
        }
        Ok(None)
    }
}

pub struct ChromiumButton {
    element: Element,
    element_timeout: Duration,
}

impl ChromiumButton {
    async fn check(&self, function: &str) -> Result<bool> {
        let returns = self.element.call_js_fn(function, false).await?;
        Ok(returns.result.value == Some(Value::Bool(true)))
    }

    async fn wait_for(&self, function: &str) -> Result<()> {
        wait_until(self.element_timeout, move || async move {
            Ok(self.check(function).await?.then_some(()))
        })
        .await
    }
}

#[async_trait]
impl ConsentButton for ChromiumButton {
    async fn wait_enabled(&self) -> Result<()> {
        self.wait_for(IS_ENABLED_JS).await
    }

    async fn wait_visible(&self) -> Result<()> {
        self.wait_for(IS_VISIBLE_JS).await
    }

    async fn click(&self) -> Result<()> {
        self.element.click().await?;
        Ok(())
    }
}

/// Repeat `probe` until it yields a value or `limit` passes
///
/// Probe errors count as "not yet" except for a closed pipe, which ends the
/// wait at once.
async fn wait_until<T, F, Fut>(limit: Duration, mut probe: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let waiting = async {
        loop {
            match probe().await {
                Ok(Some(value)) => return Ok(value),
                Ok(None) => {}
                Err(e) if e.is_closed_pipe() => return Err(e),
                Err(_) => {}
            }
            sleep(Duration::from_millis(READINESS_POLL_MS)).await;
        }
    };

    timeout(limit, waiting)
        .await
        .map_err(|_| LoginError::Timeout)?
}
