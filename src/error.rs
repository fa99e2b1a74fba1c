//! Error types and result handling for source operations.
//!
//! Every fallible operation in this crate returns [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`.
//!
//! # Error Categories
//!
//! - **Network Errors**: Connection issues, timeouts, transport failures
//! - **Parse Errors**: Unexpected HTML, dates or payload shapes
//! - **Source Errors**: HTTP status failures with the source that produced them
//! - **API Errors**: Messages reported in a GraphQL `errors` array
//! - **Config Errors**: Invalid rate limits or client settings
//! - **Not Found**: Missing sources, pages or ids
//!
//! # Examples
//!
//! ```rust
//! use multisrc::prelude::*;
//! use multisrc::error::{Error, Result};
//!
//! # async fn example() -> Result<()> {
//! let sources = Sources::new();
//!
//! match sources.search("nonexistent").from_source("invalid").await {
//!     Ok(results) => println!("Found {} results", results.len()),
//!     Err(Error::NotFound(msg)) => println!("Source not found: {}", msg),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

/// Type alias for Results with this crate's [`enum@Error`].
///
/// # Examples
///
/// ```rust
/// use multisrc::{Error, Result};
///
/// fn example_with_error() -> Result<()> {
///     Err(Error::parse("Something went wrong"))
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all source operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Transport errors from the HTTP client (timeouts, DNS, TLS).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The received data could not be interpreted.
    ///
    /// ```rust
    /// use multisrc::Error;
    ///
    /// let error = Error::parse("Missing chapter holder id");
    /// ```
    #[error("Parse error: {0}")]
    Parse(String),

    /// Source-specific errors with contextual information.
    ///
    /// * `src` - The identifier of the source that encountered the error
    /// * `message` - What went wrong
    ///
    /// ```rust
    /// use multisrc::Error;
    ///
    /// let error = Error::source("momonohanascan", "HTTP 503 Service Unavailable");
    /// ```
    #[error("Source error [{src}]: {message}")]
    Source { src: String, message: String },

    /// An error reported by a GraphQL endpoint in its `errors` array.
    ///
    /// The message is the `message` field of the first reported error.
    #[error("API error: {0}")]
    Api(String),

    /// Invalid configuration, such as a rate limit with zero permits.
    #[error("Config error: {0}")]
    Config(String),

    /// A requested resource (source, chapter, pages) does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The remote side kept answering 429 after every retry.
    ///
    /// `retry_after` carries the `Retry-After` header in seconds when present.
    #[error("Rate limited, retry after {retry_after:?} seconds")]
    RateLimit { retry_after: Option<u64> },

    /// The operation is not offered by this source.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Creates a parse error with the given message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// Creates a source-specific error with source ID and message.
    pub fn source(src: impl Into<String>, msg: impl Into<String>) -> Self {
        Error::Source {
            src: src.into(),
            message: msg.into(),
        }
    }

    /// Creates an API error from a GraphQL error message.
    ///
    /// ```rust
    /// use multisrc::Error;
    ///
    /// let error = Error::api("Work not found");
    /// assert_eq!(error.to_string(), "API error: Work not found");
    /// ```
    pub fn api(msg: impl Into<String>) -> Self {
        Error::Api(msg.into())
    }

    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Creates a not found error with the given message.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    /// Creates a rate limit error with optional retry-after time in seconds.
    pub fn rate_limit(retry_after: Option<u64>) -> Self {
        Error::RateLimit { retry_after }
    }

    /// Creates an unsupported-operation error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Error::Unsupported(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_error_names_the_source() {
        let error = Error::source("fenixscanlator", "HTTP 500");
        assert_eq!(error.to_string(), "Source error [fenixscanlator]: HTTP 500");
    }

    #[test]
    fn json_errors_convert() {
        let err: Error = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, Error::Json(_)));
    }
}
