use thiserror::Error;

// --------------------------------------------------------------------------------------------------------------

/// Everything that can go wrong talking to the Maxeon cloud.
///
/// Note what is NOT here: HTTP 404. A missing resource on a GET degrades to
/// that resource's demo payload inside the client and never surfaces as an
/// error.
#[derive(Error, Debug)]
pub enum MaxeonError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("no access token available: {0}")]
    Token(String),

    #[error("no systems registered on the account")]
    NoSystems,

    /// Write payload failed local validation; nothing was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

pub type MaxeonResult<T> = Result<T, MaxeonError>;
