pub mod config;
pub mod cookies;
pub mod errors;

pub use config::CookieConfig;
pub use cookies::*;
pub use errors::CookieError;
