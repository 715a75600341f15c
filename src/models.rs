use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the IAM Identity Center session cookie
pub const SESSION_COOKIE_NAME: &str = "x-amz-sso_authn";

/// Browser cookie as reported by the DevTools `Network.getCookies` call
///
/// Field names follow the CDP camelCase wire names. Attributes this type does
/// not model explicitly are kept in `extra` so a saved cookie can be handed
/// back to the browser unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCookie {
    pub name: String,

    pub value: String,

    #[serde(default)]
    pub domain: String,

    #[serde(default)]
    pub path: String,

    /// Seconds since the Unix epoch; -1 or absent for session cookies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<f64>,

    #[serde(default)]
    pub http_only: bool,

    #[serde(default)]
    pub secure: bool,

    #[serde(default)]
    pub session: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionCookie {
    #[cfg(test)]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            path: String::new(),
            expires: None,
            http_only: false,
            secure: false,
            session: false,
            same_site: None,
            extra: Map::new(),
        }
    }

    pub fn is_identity_center_session(&self) -> bool {
        self.name == SESSION_COOKIE_NAME
    }

    /// A cookie without a positive expiry only lives as long as the browser
    pub fn is_session_cookie(&self) -> bool {
        self.session || self.expires.map_or(true, |e| e <= 0.0)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        if self.is_session_cookie() {
            return None;
        }
        let expires = self.expires?;
        DateTime::from_timestamp(expires.trunc() as i64, 0)
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at().is_some_and(|at| Utc::now() >= at)
    }

    /// Format expiration time as human-readable string
    pub fn expiration_display(&self) -> String {
        let Some(at) = self.expires_at() else {
            return "end of browser session".to_string();
        };

        let mins = (at - Utc::now()).num_minutes();
        if mins >= 60 * 24 {
            format!("{}d {}h", mins / (60 * 24), (mins / 60) % 24)
        } else if mins >= 60 {
            let hours = mins / 60;
            let remaining_mins = mins % 60;
            if remaining_mins > 0 {
                format!("{}h {}m", hours, remaining_mins)
            } else {
                format!("{}h", hours)
            }
        } else if mins > 0 {
            format!("{} minutes", mins)
        } else {
            "EXPIRED".to_string()
        }
    }
}
