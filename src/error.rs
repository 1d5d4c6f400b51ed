//! Gateway error types

use thiserror::Error;

/// Gateway error type
#[derive(Error, Debug)]
pub enum Error {
    /// A submitted option code is not in the fixed mapping table
    #[error("invalid {field} option: {code}")]
    UnknownOption { field: &'static str, code: String },

    /// Formatted sends are refused while the identity carries the debug marker
    #[error("sending of message in the debug mode is forbidden")]
    DebugSuppressed,

    /// A link supplied for a button could not be parsed
    #[error("error while parsing link {link:?}: {reason}")]
    InvalidLink { link: String, reason: String },

    /// Delivery error
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// Session error
    #[error("Session error: {0}")]
    Session(String),
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;
