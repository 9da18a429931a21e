#[derive(Debug, thiserror::Error)]
pub enum CookieError {
    #[error("Response headers already sent")]
    HeadersSent,

    #[error("Invalid cookie name: {0:?}")]
    InvalidName(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    #[error("Serialize error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Decode error: {0}")]
    Decode(String),
}
