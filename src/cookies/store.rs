//! Cookie store operations.
//!
//! [`CookieStore`] is stateless apart from its configuration and clock. Every
//! operation works on the [`RequestContext`] it is given.
//!
//! # Failure signalling
//! The plain operations never return errors:
//! - `set` returns `false` when the header could not be queued (response already
//!   sent, bad name, unserializable value).
//! - `get` returns `Value::Bool(false)` when the cookie is absent or does not decode.
//!   A cookie that really holds `false` reads the same way.
//!
//! Use [`CookieStore::try_set`] and [`CookieStore::lookup`] where the caller needs
//! to tell those cases apart.
//!
//! # Deleting
//! `delete` only drops the key from the current request's view. The client keeps
//! its cookie unless [`CookieConfig::expire_on_delete`] is set or the caller uses
//! [`CookieStore::expire`].

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;

use crate::config::CookieConfig;
use crate::cookies::codec;
use crate::cookies::{CookieEntry, CookieOptions, RequestContext};
use crate::errors::CookieError;

/// Outcome of a tagged cookie read.
#[derive(Debug, Clone, PartialEq)]
pub enum CookieValue {
    /// The request carries no cookie with this name.
    Absent,
    /// The cookie exists but its raw value does not decode.
    Corrupt(String),
    /// The decoded value.
    Present(Value),
}

impl CookieValue {
    pub fn is_present(&self) -> bool {
        matches!(self, CookieValue::Present(_))
    }

    /// Collapses to the value, or `None` for absent and corrupt cookies.
    pub fn into_value(self) -> Option<Value> {
        match self {
            CookieValue::Present(v) => Some(v),
            _ => None,
        }
    }
}

/// Set, read and delete serialized cookies on a [`RequestContext`].
#[derive(Debug, Clone)]
pub struct CookieStore {
    config: CookieConfig,
    clock: fn() -> OffsetDateTime,
}

impl Default for CookieStore {
    fn default() -> Self {
        Self::new(CookieConfig::default())
    }
}

impl CookieStore {
    pub fn new(config: CookieConfig) -> Self {
        Self {
            config,
            clock: OffsetDateTime::now_utc,
        }
    }

    /// Replaces the clock used to resolve relative expiry times.
    pub fn with_clock(mut self, clock: fn() -> OffsetDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &CookieConfig {
        &self.config
    }

    /// Options built from this store's configuration.
    pub fn options(&self) -> CookieOptions {
        CookieOptions::from(&self.config)
    }

    /// Serializes `value` and queues it as cookie `key`.
    ///
    /// Returns `false` if the header could not be queued. The reason is logged.
    pub fn set<T: Serialize + ?Sized>(
        &self,
        ctx: &mut RequestContext,
        key: &str,
        value: &T,
        options: CookieOptions,
    ) -> bool {
        match self.try_set(ctx, key, value, options) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Cookie[{}]: cannot set cookie: {}", key, e);
                false
            }
        }
    }

    /// Like [`set`](Self::set), but reports why the cookie was not queued.
    ///
    /// On success the encoded value also replaces `key` in the request's local view.
    pub fn try_set<T: Serialize + ?Sized>(
        &self,
        ctx: &mut RequestContext,
        key: &str,
        value: &T,
        options: CookieOptions,
    ) -> Result<(), CookieError> {
        let raw = codec::encode(value)?;
        let entry = CookieEntry::new(key, raw, &options, (self.clock)())?;

        ctx.sink_mut().append_set_cookie(&entry)?;
        log::debug!("Cookie[{}]: queued, expires {}", key, entry.expires);

        ctx.incoming_mut().insert(key, entry.value);
        Ok(())
    }

    /// Reads cookie `key`, returning `false` if it is absent or undecodable.
    pub fn get(&self, ctx: &RequestContext, key: &str) -> Value {
        self.lookup(ctx, key).into_value().unwrap_or(Value::Bool(false))
    }

    /// Tagged read which keeps absent, corrupt and stored-`false` cookies apart.
    pub fn lookup(&self, ctx: &RequestContext, key: &str) -> CookieValue {
        let Some(raw) = ctx.incoming().get(key) else {
            return CookieValue::Absent;
        };

        match codec::decode(raw) {
            Ok(v) => CookieValue::Present(v),
            Err(e) => {
                log::debug!("Cookie[{}]: corrupt value: {}", key, e);
                CookieValue::Corrupt(raw.to_string())
            }
        }
    }

    /// Reads cookie `key` into `T`. Absent, corrupt and mismatched values give `None`.
    pub fn get_as<T: DeserializeOwned>(&self, ctx: &RequestContext, key: &str) -> Option<T> {
        let raw = ctx.incoming().get(key)?;
        codec::decode_as(raw).ok()
    }

    /// Drops `key` from the current request.
    ///
    /// The client-side cookie survives unless `expire_on_delete` is configured.
    pub fn delete(&self, ctx: &mut RequestContext, key: &str) {
        if ctx.incoming_mut().remove(key).is_some() {
            log::debug!("Cookie[{}]: removed from request", key);
        }

        if self.config.expire_on_delete {
            self.expire(ctx, key, self.options());
        }
    }

    /// Queues an already-expired, empty cookie so the client discards `key`.
    ///
    /// `options` must carry the same path and domain the cookie was set with.
    pub fn expire(&self, ctx: &mut RequestContext, key: &str, options: CookieOptions) -> bool {
        let result = CookieEntry::expired(key, &options)
            .and_then(|entry| ctx.sink_mut().append_set_cookie(&entry));

        match result {
            Ok(()) => {
                log::debug!("Cookie[{}]: expiry queued", key);
                true
            }
            Err(e) => {
                log::warn!("Cookie[{}]: cannot expire cookie: {}", key, e);
                false
            }
        }
    }
}
