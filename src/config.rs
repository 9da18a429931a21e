use crate::cookies::SameSite;
use crate::errors::CookieError;
use serde::Deserialize;

/// One day, in seconds.
const DEFAULT_EXPIRE: i64 = 86_400;
const DEFAULT_PATH: &str = "/";

/// Cookie store configuration. Provides the defaults used when a call does not
/// supply its own [`CookieOptions`](crate::cookies::CookieOptions).
///
/// Can be loaded from JSON; missing fields take their default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CookieConfig {
    /// Number of seconds a cookie stays valid after it has been set
    pub default_expire: i64,
    /// Path scope, "/" means the whole site
    pub default_path: String,
    /// Domain scope, empty means host-only
    pub default_domain: String,
    /// Only send the cookie over HTTPS
    pub secure: bool,
    /// Hide the cookie from client-side scripts
    pub http_only: bool,
    /// SameSite policy, not emitted when `None`
    pub same_site: Option<SameSite>,
    /// When true, `delete()` also sends an expired cookie to the client instead of
    /// only dropping the key from the current request.
    pub expire_on_delete: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            default_expire: DEFAULT_EXPIRE,
            default_path: DEFAULT_PATH.to_string(),
            default_domain: String::new(),
            secure: false,
            http_only: false,
            same_site: None,
            expire_on_delete: false,
        }
    }
}

impl CookieConfig {
    /// Parses a configuration from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, CookieError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = CookieConfig::from_json(r#"{"secure": true, "same_site": "Strict"}"#).unwrap();
        assert!(cfg.secure);
        assert_eq!(cfg.same_site, Some(SameSite::Strict));
        assert_eq!(cfg.default_expire, 86_400);
        assert_eq!(cfg.default_path, "/");
        assert!(!cfg.expire_on_delete);
    }

    #[test]
    fn bad_json_is_an_error() {
        assert!(matches!(CookieConfig::from_json("{"), Err(CookieError::Serialize(_))));
    }
}
