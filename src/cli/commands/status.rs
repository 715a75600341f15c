use crate::config::Config;
use crate::models::SessionCookie;
use serde_json::json;

/// Print the saved cookie's state; exit code 0 only for a usable cookie
pub fn execute(config: &Config, json: bool) -> i32 {
    let store = config.credential_store();
    let loaded = store.load();

    let (line, value, code) = describe(loaded.cookie.as_ref(), loaded.warning.as_deref());

    if json {
        println!("{}", value);
    } else {
        println!("{}", line);
        if let Some(path) = store.path() {
            println!("  Cookie file: {}", path.display());
        }
    }

    code
}

fn describe(
    cookie: Option<&SessionCookie>,
    warning: Option<&str>,
) -> (String, serde_json::Value, i32) {
    match cookie {
        Some(cookie) if cookie.is_expired() => (
            "Saved session expired".to_string(),
            json!({ "active": false, "reason": "expired" }),
            1,
        ),
        Some(cookie) => (
            format!("Saved session found (expires: {})", cookie.expiration_display()),
            json!({
                "active": true,
                "domain": cookie.domain,
                "expires_at": cookie.expires_at().map(|at| at.to_rfc3339()),
            }),
            0,
        ),
        None => match warning {
            Some(warning) => (
                format!("Saved session unreadable: {}", warning),
                json!({ "active": false, "reason": "unreadable" }),
                1,
            ),
            None => (
                "No saved session".to_string(),
                json!({ "active": false, "reason": "no_session" }),
                1,
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SESSION_COOKIE_NAME;
    use chrono::{Duration, Utc};

    #[test]
    fn test_no_session() {
        let (line, value, code) = describe(None, None);
        assert_eq!(line, "No saved session");
        assert_eq!(value["reason"], "no_session");
        assert_eq!(code, 1);
    }

    #[test]
    fn test_unreadable_session() {
        let (_, value, code) = describe(None, Some("bad base64"));
        assert_eq!(value["reason"], "unreadable");
        assert_eq!(code, 1);
    }

    #[test]
    fn test_active_and_expired_sessions() {
        let mut cookie = SessionCookie::new(SESSION_COOKIE_NAME, "token");
        cookie.expires = Some((Utc::now() + Duration::hours(8)).timestamp() as f64);
        let (_, value, code) = describe(Some(&cookie), None);
        assert_eq!(value["active"], true);
        assert!(value["expires_at"].is_string());
        assert_eq!(code, 0);

        cookie.expires = Some((Utc::now() - Duration::hours(1)).timestamp() as f64);
        let (_, value, code) = describe(Some(&cookie), None);
        assert_eq!(value["reason"], "expired");
        assert_eq!(code, 1);
    }
}
