#![forbid(unsafe_code)]

use pagefx_core::storage::StorageError;
use pagefx_core::{DomError, ElementId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PageError>;

/// Faults raised while handling a page event or timer.
///
/// None of these stop the page: the runtime logs the fault and keeps running
/// the remaining handlers.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("document error: {0}")]
    Dom(#[from] DomError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("required element missing: {what}")]
    MissingElement { what: String },

    #[error("counter {element} has no usable target: {raw:?}")]
    InvalidTarget { element: ElementId, raw: Option<String> },

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("host error: {message}")]
    Host { message: String },
}

impl PageError {
    #[must_use]
    pub fn missing(what: impl Into<String>) -> Self {
        Self::MissingElement { what: what.into() }
    }

    /// Faults that degrade one feature without indicating a broken page
    /// (bad counter markup, unavailable storage). Logged at `warn`.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidTarget { .. } | Self::Storage(_))
    }

    #[must_use]
    pub fn host(message: impl Into<String>) -> Self {
        Self::Host {
            message: message.into(),
        }
    }
}
