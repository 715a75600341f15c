use crate::browser::{ChromiumLauncher, LoginFlow};
use crate::config::Config;
use crate::env;
use crate::error::Result;
use crate::extractor;
use crate::status::{StatusReporter, TerminalReporter};
use std::time::Duration;
use tokio::io::BufReader;

const SUCCESS_MESSAGE: &str = "Logged in successfully";

/// Sign in, reporting every outcome (a bad config file included) on the status line
pub async fn execute(config: Result<Config>, show: bool) -> i32 {
    let reporter = TerminalReporter::stdout();

    let config = match config {
        Ok(config) => config,
        Err(e) => return conclude(Err(e), &reporter),
    };

    let code = conclude(run(&config, show, &reporter).await, &reporter);

    if code == 0 {
        // Leave the final status line on screen before the shell prompt returns
        tokio::time::sleep(Duration::from_millis(config.automation.settle_ms)).await;
    }

    code
}

async fn run(config: &Config, show: bool, reporter: &dyn StatusReporter) -> Result<()> {
    reporter.progress("reading url from stdin");
    let url = extractor::read_authorization_url(BufReader::new(tokio::io::stdin())).await?;

    if show && !env::display_available() {
        reporter.warning("No display detected, the browser window may not open");
    }

    let store = config.credential_store();

    let launcher = ChromiumLauncher::new(
        config.browser.executable.clone(),
        config.request_timeout(),
        config.element_timeout(),
    );

    LoginFlow::new(&launcher, &store, reporter, config.automation_settings(!show))
        .run(&url)
        .await
}

/// Report the outcome of a run and pick the exit code
///
/// A consumer that closed our stdout is not a failure: exit 0 without output.
pub fn conclude(result: Result<()>, reporter: &dyn StatusReporter) -> i32 {
    match result {
        Ok(()) => {
            reporter.success(SUCCESS_MESSAGE);
            0
        }
        Err(e) if e.is_closed_pipe() => {
            tracing::debug!("Output closed by reader, exiting");
            0
        }
        Err(e) => {
            tracing::error!("Login failed: {}", e);
            reporter.failure(&format!("Fatal Panic and Exit. Error: {}", e));
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoginError;
    use crate::status::RecordingReporter;

    #[test]
    fn test_success_reports_and_exits_zero() {
        let reporter = RecordingReporter::default();
        assert_eq!(conclude(Ok(()), &reporter), 0);
        assert_eq!(reporter.messages("success"), vec![SUCCESS_MESSAGE.to_string()]);
    }

    #[test]
    fn test_timeout_exits_one_with_message() {
        let reporter = RecordingReporter::default();
        assert_eq!(conclude(Err(LoginError::Timeout), &reporter), 1);

        let failures = reporter.messages("failure");
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains("Timed out"));
    }

    #[test]
    fn test_closed_pipe_exits_zero_silently() {
        let reporter = RecordingReporter::default();
        let err = LoginError::from_automation_message("write on closed pipe");
        assert_eq!(conclude(Err(err), &reporter), 0);
        assert!(reporter.events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_other_errors_are_fatal() {
        let reporter = RecordingReporter::default();
        let err = LoginError::BrowserLaunch("could not find chrome".to_string());
        assert_eq!(conclude(Err(err), &reporter), 1);
        assert!(reporter.messages("failure")[0].contains("could not find chrome"));

        let reporter = RecordingReporter::default();
        assert_eq!(conclude(Err(LoginError::NoAuthorizationUrl), &reporter), 1);
    }

    #[test]
    fn test_config_error_is_reported_as_fatal() {
        let reporter = RecordingReporter::default();
        let result = Config::parse("[automation]\npoll_interval_ms = \"fast\"\n").map(|_| ());

        assert_eq!(conclude(result, &reporter), 1);
        let failures = reporter.messages("failure");
        assert_eq!(failures.len(), 1);
        assert!(failures[0].starts_with("Fatal Panic and Exit. Error: Configuration error"));
    }
}
