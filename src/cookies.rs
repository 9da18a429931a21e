//! Cookies: [`CookieStore`], the per-request [`RequestContext`] and the value codec.

pub mod codec;
mod context;
mod cookie;
mod store;

pub use cookie::http_date;
pub use cookie::CookieEntry;
pub use cookie::CookieOptions;
pub use cookie::SameSite;

pub use context::CookieSink;
pub use context::IncomingCookies;
pub use context::RequestContext;
pub use context::ResponseCookies;

pub use store::CookieStore;
pub use store::CookieValue;
