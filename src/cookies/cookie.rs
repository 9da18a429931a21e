//! Cookie record and its `Set-Cookie` rendering.
//!
//! A [`CookieEntry`] is what [`CookieStore`](crate::cookies::CookieStore) hands to a
//! [`CookieSink`](crate::cookies::CookieSink). Rendering follows RFC 6265:
//!
//! ```text
//! name=value; Expires=Sun, 06 Nov 1994 08:49:37 GMT; Path=/; Domain=example.com; Secure; HttpOnly
//! ```
//!
//! An empty domain means a host-only cookie, so no `Domain` attribute is written.

use crate::config::CookieConfig;
use crate::errors::CookieError;
use http::HeaderValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, UtcOffset};
use url::Url;

/// IMF-fixdate, the preferred HTTP date format.
const HTTP_DATE: &[BorrowedFormatItem<'static>] = format_description!(
    "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
);

/// SameSite policy of a cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Per-call cookie attributes.
///
/// `CookieOptions::default()` carries the stock defaults: one day expiry, path `/`,
/// host-only, not secure, not http-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    /// Seconds from now until the cookie expires. Negative values produce an expiry in the past.
    pub expire: i64,
    pub domain: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<SameSite>,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self::from(&CookieConfig::default())
    }
}

impl From<&CookieConfig> for CookieOptions {
    fn from(config: &CookieConfig) -> Self {
        Self {
            expire: config.default_expire,
            domain: config.default_domain.clone(),
            path: config.default_path.clone(),
            secure: config.secure,
            http_only: config.http_only,
            same_site: config.same_site,
        }
    }
}

impl CookieOptions {
    pub fn expire(mut self, seconds: i64) -> Self {
        self.expire = seconds;
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    /// Scopes the cookie to the directory of `url` and marks it secure on https.
    ///
    /// The path is the RFC 6265 default-path: everything up to, but not including,
    /// the last `/`, or `/` if that leaves nothing.
    pub fn scoped_to(mut self, url: &Url) -> Self {
        self.path = url
            .path()
            .rsplit_once('/')
            .map_or("/", |(a, _)| if a.is_empty() { "/" } else { a })
            .to_string();
        self.secure = url.scheme() == "https";
        self
    }
}

/// A cookie as emitted in a `Set-Cookie` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieEntry {
    /// Cookie name (case-sensitive, RFC 6265 token).
    pub name: String,

    /// Wire value, already encoded.
    pub value: String,

    /// Absolute expiration timestamp.
    pub expires: OffsetDateTime,

    /// Optional `Max-Age` in seconds. Only written when set.
    pub max_age: Option<i64>,

    /// Path scoping (e.g. `"/"`). Omitted when empty.
    pub path: String,

    /// Domain scoping. Host-only when empty.
    pub domain: String,

    /// If `true`, cookie is sent only over HTTPS.
    pub secure: bool,

    /// If `true`, cookie is blocked from access by client-side scripts.
    pub http_only: bool,

    pub same_site: Option<SameSite>,
}

impl CookieEntry {
    /// Builds an entry from `options`, resolving the relative expiry against `now`.
    pub fn new(
        name: &str,
        value: String,
        options: &CookieOptions,
        now: OffsetDateTime,
    ) -> Result<Self, CookieError> {
        validate_name(name)?;

        let expires = now
            .checked_add(Duration::seconds(options.expire))
            .ok_or_else(|| {
                CookieError::InvalidHeader(format!("expiry of {}s is out of range", options.expire))
            })?;

        Ok(Self {
            name: name.to_string(),
            value,
            expires,
            max_age: None,
            path: options.path.clone(),
            domain: options.domain.clone(),
            secure: options.secure,
            http_only: options.http_only,
            same_site: options.same_site,
        })
    }

    /// Builds an empty cookie that makes the client discard `name` right away.
    pub fn expired(name: &str, options: &CookieOptions) -> Result<Self, CookieError> {
        validate_name(name)?;

        Ok(Self {
            name: name.to_string(),
            value: String::new(),
            expires: OffsetDateTime::UNIX_EPOCH,
            max_age: Some(0),
            path: options.path.clone(),
            domain: options.domain.clone(),
            secure: options.secure,
            http_only: options.http_only,
            same_site: options.same_site,
        })
    }

    /// Renders the `Set-Cookie` header value.
    pub fn to_header_value(&self) -> Result<HeaderValue, CookieError> {
        check_attribute("value", &self.value)?;
        check_attribute("path", &self.path)?;
        check_attribute("domain", &self.domain)?;

        HeaderValue::from_str(&self.render()?)
            .map_err(|e| CookieError::InvalidHeader(e.to_string()))
    }

    fn render(&self) -> Result<String, CookieError> {
        let expires = http_date(self.expires)?;
        let mut out = format!("{}={}; Expires={}", self.name, self.value, expires);
        if let Some(max_age) = self.max_age {
            out.push_str(&format!("; Max-Age={}", max_age));
        }
        if !self.path.is_empty() {
            out.push_str(&format!("; Path={}", self.path));
        }
        if !self.domain.is_empty() {
            out.push_str(&format!("; Domain={}", self.domain));
        }
        if let Some(same_site) = self.same_site {
            out.push_str(&format!("; SameSite={}", same_site.as_str()));
        }
        if self.secure {
            out.push_str("; Secure");
        }
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        Ok(out)
    }
}

impl fmt::Display for CookieEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render().map_err(|_| fmt::Error)?)
    }
}

/// Formats `ts` as an IMF-fixdate in GMT.
pub fn http_date(ts: OffsetDateTime) -> Result<String, CookieError> {
    ts.to_offset(UtcOffset::UTC)
        .format(HTTP_DATE)
        .map_err(|e| CookieError::InvalidHeader(format!("cannot format expiry {}: {}", ts, e)))
}

/// Cookie names must be RFC 6265 cookie-name tokens: visible ASCII without separators.
pub fn validate_name(name: &str) -> Result<(), CookieError> {
    let valid = !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_graphic()
                && !matches!(
                    b,
                    b'(' | b')' | b'<' | b'>' | b'@' | b',' | b';' | b':' | b'\\' | b'"'
                        | b'/' | b'[' | b']' | b'?' | b'=' | b'{' | b'}'
                )
        });

    if valid {
        Ok(())
    } else {
        Err(CookieError::InvalidName(name.to_string()))
    }
}

/// Attribute values are US-ASCII and may not break out of their `; ` slot.
fn check_attribute(what: &str, v: &str) -> Result<(), CookieError> {
    if v.bytes().any(|b| !b.is_ascii() || b == b';' || b.is_ascii_control()) {
        return Err(CookieError::InvalidHeader(format!(
            "{} contains a forbidden character: {:?}",
            what, v
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ts: i64) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(ts).unwrap()
    }

    #[test]
    fn http_date_is_imf_fixdate() {
        assert_eq!(http_date(at(784111777)).unwrap(), "Sun, 06 Nov 1994 08:49:37 GMT");
        assert_eq!(
            http_date(OffsetDateTime::UNIX_EPOCH).unwrap(),
            "Thu, 01 Jan 1970 00:00:00 GMT"
        );
    }

    #[test]
    fn header_value_uses_the_same_rendering() {
        let entry = CookieEntry::new("sid", "abc".into(), &CookieOptions::default(), at(0)).unwrap();
        assert_eq!(entry.to_header_value().unwrap().to_str().unwrap(), entry.to_string());
        assert!(entry.to_string().contains("Expires=Fri, 02 Jan 1970 00:00:00 GMT"));
    }

    #[test]
    fn default_options() {
        let o = CookieOptions::default();
        assert_eq!(o.expire, 86_400);
        assert_eq!(o.path, "/");
        assert_eq!(o.domain, "");
        assert!(!o.secure);
        assert!(!o.http_only);
        assert!(o.same_site.is_none());
    }

    #[test]
    fn scoped_to_url() {
        let url = Url::parse("https://example.com/shop/cart/view?x=1").unwrap();
        let o = CookieOptions::default().scoped_to(&url);
        assert_eq!(o.path, "/shop/cart");
        assert!(o.secure);

        let url = Url::parse("http://example.com/index.html").unwrap();
        let o = CookieOptions::default().scoped_to(&url);
        assert_eq!(o.path, "/");
        assert!(!o.secure);
    }

    #[test]
    fn renders_minimal_cookie() {
        let entry =
            CookieEntry::new("sid", "abc".into(), &CookieOptions::default(), at(0)).unwrap();
        assert_eq!(entry.to_string(), "sid=abc; Expires=Fri, 02 Jan 1970 00:00:00 GMT; Path=/");
    }

    #[test]
    fn renders_all_attributes() {
        let opts = CookieOptions::default()
            .expire(60)
            .domain("example.com")
            .path("/app")
            .secure(true)
            .http_only(true)
            .same_site(SameSite::Lax);
        let entry = CookieEntry::new("sid", "abc".into(), &opts, at(784111717)).unwrap();

        assert_eq!(
            entry.to_string(),
            "sid=abc; Expires=Sun, 06 Nov 1994 08:49:37 GMT; Path=/app; Domain=example.com; SameSite=Lax; Secure; HttpOnly"
        );
        assert!(entry.to_header_value().is_ok());
    }

    #[test]
    fn expired_entry_has_max_age_zero() {
        let entry = CookieEntry::expired("sid", &CookieOptions::default()).unwrap();
        assert_eq!(
            entry.to_string(),
            "sid=; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0; Path=/"
        );
    }

    #[test]
    fn rejects_bad_names() {
        for name in ["", "a b", "a=b", "a;b", "ü", "a\tb"] {
            assert!(
                matches!(validate_name(name), Err(CookieError::InvalidName(_))),
                "{:?} should be rejected",
                name
            );
        }
        assert!(validate_name("__Host-session.id").is_ok());
    }

    #[test]
    fn rejects_attribute_injection() {
        let opts = CookieOptions::default().path("/; Domain=evil.test");
        let entry = CookieEntry::new("sid", "x".into(), &opts, at(0)).unwrap();
        assert!(matches!(entry.to_header_value(), Err(CookieError::InvalidHeader(_))));
    }

    #[test]
    fn rejects_non_ascii_attributes() {
        for opts in [
            CookieOptions::default().path("/café"),
            CookieOptions::default().domain("bücher.example"),
        ] {
            let entry = CookieEntry::new("sid", "x".into(), &opts, at(0)).unwrap();
            assert!(matches!(entry.to_header_value(), Err(CookieError::InvalidHeader(_))));
        }
    }

    #[test]
    fn expiry_overflow_is_an_error() {
        let opts = CookieOptions::default().expire(i64::MAX);
        assert!(matches!(
            CookieEntry::new("sid", "x".into(), &opts, at(0)),
            Err(CookieError::InvalidHeader(_))
        ));
    }
}
