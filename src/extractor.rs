// Device authorization URL extraction from AWS CLI output
use crate::error::{LoginError, Result};
use regex::Regex;
use std::sync::LazyLock;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// `aws sso login --no-browser` prints the complete verification URL on its own line
static AUTHORIZATION_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https.*user_code=([A-Z]{4}-?){2}").expect("authorization URL pattern is valid")
});

pub fn is_authorization_url(line: &str) -> bool {
    AUTHORIZATION_URL.is_match(line)
}

/// Read lines until the first one carrying a device authorization URL
///
/// Lines before the URL (the CLI's instructions, the bare user code) are
/// skipped, including lines that are not valid UTF-8. Reaching end of input
/// without a match is an error rather than an indefinite wait.
pub async fn read_authorization_url<R>(mut reader: R) -> Result<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Err(LoginError::NoAuthorizationUrl);
        }

        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);
        if is_authorization_url(line) {
            tracing::debug!("Found device authorization URL: {}", line);
            return Ok(line.to_string());
        }
        tracing::trace!("Skipping input line: {}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AWS_CLI_OUTPUT: &str = "\
Attempting to automatically open the SSO authorization page in your default browser.
If the browser does not open or you wish to use a different device to authorize this request, open the following URL:

https://device.sso.us-east-1.amazonaws.com/

Then enter the code:

ABCD-EFGH
https://device.sso.us-east-1.amazonaws.com/?user_code=ABCD-EFGH
https://device.sso.us-east-1.amazonaws.com/?user_code=WXYZ-QRST
";

    #[test]
    fn test_matches_device_authorization_url() {
        assert!(is_authorization_url(
            "https://device.sso.us-east-1.amazonaws.com/?user_code=ABCD-EFGH"
        ));
        assert!(is_authorization_url(
            "https://device.sso.eu-west-1.amazonaws.com/?user_code=ABCDEFGH"
        ));
    }

    #[test]
    fn test_rejects_other_lines() {
        assert!(!is_authorization_url("https://example.com/foo"));
        assert!(!is_authorization_url("https://device.sso.us-east-1.amazonaws.com/"));
        assert!(!is_authorization_url(
            "https://device.sso.us-east-1.amazonaws.com/?user_code=abcd-efgh"
        ));
        assert!(!is_authorization_url(
            "https://device.sso.us-east-1.amazonaws.com/?user_code=ABC-EFGH"
        ));
        assert!(!is_authorization_url(
            "Open https://device.sso.us-east-1.amazonaws.com/?user_code=ABCD-EFGH"
        ));
        assert!(!is_authorization_url(
            "http://device.sso.us-east-1.amazonaws.com/?user_code=ABCD-EFGH"
        ));
    }

    #[tokio::test]
    async fn test_returns_first_matching_line() {
        let url = read_authorization_url(AWS_CLI_OUTPUT.as_bytes())
            .await
            .unwrap();
        assert_eq!(
            url,
            "https://device.sso.us-east-1.amazonaws.com/?user_code=ABCD-EFGH"
        );
    }

    #[tokio::test]
    async fn test_strips_crlf_terminators() {
        let input = "noise\r\nhttps://device.sso.us-east-1.amazonaws.com/?user_code=ABCD-EFGH\r\n";
        let url = read_authorization_url(input.as_bytes()).await.unwrap();
        assert!(url.ends_with("ABCD-EFGH"));
    }

    #[tokio::test]
    async fn test_skips_lines_that_are_not_utf8() {
        let input = b"Code: \xff\xfe\nhttps://device.sso.us-east-1.amazonaws.com/?user_code=ABCD-EFGH\n";
        let url = read_authorization_url(&input[..]).await.unwrap();
        assert_eq!(
            url,
            "https://device.sso.us-east-1.amazonaws.com/?user_code=ABCD-EFGH"
        );
    }

    #[tokio::test]
    async fn test_last_line_without_terminator() {
        let input = "noise\nhttps://device.sso.us-east-1.amazonaws.com/?user_code=ABCDEFGH";
        let url = read_authorization_url(input.as_bytes()).await.unwrap();
        assert!(url.ends_with("ABCDEFGH"));
    }

    #[tokio::test]
    async fn test_exhausted_input_is_an_error() {
        let input = "https://example.com/foo\nhttps://device.sso.us-east-1.amazonaws.com/\n";
        let err = read_authorization_url(input.as_bytes()).await.unwrap_err();
        assert!(matches!(err, LoginError::NoAuthorizationUrl));

        let err = read_authorization_url(&b""[..]).await.unwrap_err();
        assert!(matches!(err, LoginError::NoAuthorizationUrl));
    }
}
