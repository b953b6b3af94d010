use std::time::Duration;

use thiserror::Error;

/// Everything a `shorten` or `resolve` call can fail with.
///
/// The store itself never rejects a lookup; `NotFound`, `Cancelled` and
/// `Timeout` are produced by the client handle from the reply (or the lack
/// of one).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShortenError {
    /// A required argument was empty. Detected before talking to the store.
    #[error("{field} missing")]
    MissingInput { field: &'static str },

    /// No mapping exists for the requested code.
    #[error("no URL found for code {code}")]
    NotFound { code: String },

    /// The caller cancelled the request scope before a reply arrived.
    #[error("request cancelled")]
    Cancelled,

    /// The request scope's deadline passed before a reply arrived.
    #[error("request timed out after {after:?}")]
    Timeout { after: Duration },

    /// Every freshly generated code collided with an existing one.
    #[error("could not find a free code after {attempts} attempts")]
    CodeSpaceExhausted { attempts: u32 },

    /// The store task has stopped and no longer accepts requests.
    #[error("mapping store is not running")]
    StoreClosed,
}

pub type Result<T> = std::result::Result<T, ShortenError>;
