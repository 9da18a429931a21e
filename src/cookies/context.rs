//! Per-request cookie context.
//!
//! A [`RequestContext`] bundles the two collaborators a cookie operation needs:
//! - [`IncomingCookies`]: the cookies the client sent, parsed once from the request
//!   `Cookie` header(s) and mutable for the rest of the request.
//! - a [`CookieSink`]: where `Set-Cookie` headers go. It refuses new headers once
//!   the response has started going out.
//!
//! The context is owned by a single request and is not synchronized.
//!
//! ```rust,no_run
//! use gosub_cookies::cookies::{CookieStore, RequestContext};
//!
//! let mut ctx = RequestContext::from_request(&http::HeaderMap::new());
//! let store = CookieStore::default();
//! store.set(&mut ctx, "username", &"Awilum", Default::default());
//! ```

use std::any::Any;
use std::collections::HashMap;

use http::header::{COOKIE, SET_COOKIE};
use http::HeaderMap;

use crate::cookies::CookieEntry;
use crate::errors::CookieError;

/// Cookies received with the current request, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncomingCookies {
    entries: HashMap<String, String>,
}

impl IncomingCookies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses all `Cookie` headers in `headers`.
    ///
    /// Pairs without `=` or with bytes that are not UTF-8 are skipped, surrounding
    /// double quotes are stripped and the first occurrence of a name wins.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut cookies = Self::new();

        for header in headers.get_all(COOKIE) {
            for part in header.as_bytes().split(|b| *b == b';') {
                let Ok(part) = std::str::from_utf8(part) else {
                    log::debug!("Skipping non-UTF-8 cookie pair");
                    continue;
                };

                if let Some((name, value)) = part.split_once('=') {
                    let name = name.trim();
                    if name.is_empty() {
                        continue;
                    }
                    let value = value.trim();
                    let value = value
                        .strip_prefix('"')
                        .and_then(|v| v.strip_suffix('"'))
                        .unwrap_or(value);

                    cookies
                        .entries
                        .entry(name.to_string())
                        .or_insert_with(|| value.to_string());
                }
            }
        }

        cookies
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, raw: impl Into<String>) {
        self.entries.insert(name.into(), raw.into());
    }

    /// Removes `name`, returning the raw value it held.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.remove(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All cookie names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut v: Vec<String> = self.entries.keys().cloned().collect();
        v.sort_unstable();
        v
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for IncomingCookies {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Outbound side of a request: accepts `Set-Cookie` headers until the response is sent.
///
/// `as_any` / `as_any_mut` let callers downcast to the concrete sink to read back
/// what was queued.
pub trait CookieSink: Send {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Queues a `Set-Cookie` header for `cookie`.
    ///
    /// Must fail with [`CookieError::HeadersSent`] once headers can no longer be added.
    fn append_set_cookie(&mut self, cookie: &CookieEntry) -> Result<(), CookieError>;

    /// Returns true when the response has already gone out.
    fn is_sent(&self) -> bool;
}

/// Default sink that collects `Set-Cookie` headers into a [`HeaderMap`].
#[derive(Debug, Clone, Default)]
pub struct ResponseCookies {
    headers: HeaderMap,
    sent: bool,
}

impl ResponseCookies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the response as sent. Every later append fails.
    pub fn finalize(&mut self) {
        self.sent = true;
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Rendered `Set-Cookie` values in the order they were queued.
    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect()
    }

    pub fn into_headers(self) -> HeaderMap {
        self.headers
    }
}

impl CookieSink for ResponseCookies {
    fn as_any(&self) -> &dyn Any { self }
    fn as_any_mut(&mut self) -> &mut dyn Any { self }

    fn append_set_cookie(&mut self, cookie: &CookieEntry) -> Result<(), CookieError> {
        if self.sent {
            return Err(CookieError::HeadersSent);
        }

        let value = cookie.to_header_value()?;
        self.headers.append(SET_COOKIE, value);
        Ok(())
    }

    fn is_sent(&self) -> bool {
        self.sent
    }
}

/// Cookie state for a single request/response exchange.
pub struct RequestContext {
    incoming: IncomingCookies,
    sink: Box<dyn CookieSink>,
}

impl RequestContext {
    pub fn new(incoming: IncomingCookies, sink: Box<dyn CookieSink>) -> Self {
        Self { incoming, sink }
    }

    /// Context for a request with the given headers, answered through a fresh [`ResponseCookies`].
    pub fn from_request(headers: &HeaderMap) -> Self {
        Self::new(IncomingCookies::from_headers(headers), Box::new(ResponseCookies::new()))
    }

    pub fn incoming(&self) -> &IncomingCookies {
        &self.incoming
    }

    pub fn incoming_mut(&mut self) -> &mut IncomingCookies {
        &mut self.incoming
    }

    pub fn sink(&self) -> &dyn CookieSink {
        self.sink.as_ref()
    }

    pub fn sink_mut(&mut self) -> &mut dyn CookieSink {
        self.sink.as_mut()
    }

    /// The sink as a [`ResponseCookies`], if that is what backs this context.
    pub fn response_cookies(&self) -> Option<&ResponseCookies> {
        self.sink.as_any().downcast_ref::<ResponseCookies>()
    }

    pub fn response_cookies_mut(&mut self) -> Option<&mut ResponseCookies> {
        self.sink.as_any_mut().downcast_mut::<ResponseCookies>()
    }

    /// Splits the context, returning the sink so the caller can read queued headers.
    pub fn into_parts(self) -> (IncomingCookies, Box<dyn CookieSink>) {
        (self.incoming, self.sink)
    }
}
