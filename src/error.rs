use std::time::Duration;
use thiserror::Error;

/// Failure of a single page fetch (primary or fallback client)
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("fetch worker pool is closed")]
    PoolClosed,
}

/// Why a holiday source could not produce a list for today
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source has no usable data (e.g. the local table failed to load)
    #[error("holiday source unavailable: {0}")]
    Unavailable(String),

    #[error("holiday fetch failed: {0}")]
    Fetch(#[from] FetchError),
}

/// Internal errors while turning a holiday into a toast
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("toast template store is empty")]
    NoToasts,

    #[error("toast template has no {{holiday}} placeholder: {0:?}")]
    MissingPlaceholder(String),
}

/// Errors from the Telegram Bot API client
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("telegram api error {code:?}: {description}")]
    Api {
        code: Option<i64>,
        description: String,
    },
}
