//! Custom error types for the lurescan risk engine.
//!
//! Only input validation ever reaches the caller of `score_url`. Everything
//! else here is used by the thin clients, configuration loading and the CLI.

use std::path::PathBuf;

/// Rejection of a raw input before any rule or probe runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Empty or whitespace-only input
    #[error("input is empty: a URL is required")]
    Empty,

    /// The normalized input is not a syntactically valid absolute URL
    #[error("'{input}' is not a valid URL: {reason}")]
    InvalidSyntax { input: String, reason: String },

    /// Only web URLs can be scored
    #[error("unsupported URL scheme '{scheme}' (expected http or https)")]
    UnsupportedScheme { scheme: String },

    /// The URL parsed but names no host
    #[error("URL has no host")]
    MissingHost,

    /// The host is neither an IP literal nor a dotted domain name
    #[error("invalid host '{host}'")]
    InvalidHost { host: String },
}

/// Typed failure of the single page fetch or the TLS check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    /// Certificate or handshake failure
    #[error("TLS failure: {0}")]
    Tls(String),

    #[error("request failed: {0}")]
    Other(String),
}

/// The main error type for lurescan operations.
#[derive(Debug, thiserror::Error)]
pub enum LureError {
    /// I/O error (file read/write, sockets, etc.)
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input rejected before scoring
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration rejected at startup
    #[error("invalid configuration: {}", .problems.join("; "))]
    Config { problems: Vec<String> },

    /// HTTP client construction or request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// WHOIS protocol error
    #[error("WHOIS query to {server} failed: {message}")]
    Whois { server: String, message: String },

    /// A lookup answered with something other than data
    #[error("{service} lookup for '{host}' failed: {message}")]
    Lookup {
        service: &'static str,
        host: String,
        message: String,
    },

    /// Tokio task join error
    #[error("Async task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

/// Result type alias using LureError
pub type LureResult<T> = Result<T, LureError>;

impl LureError {
    /// Create an I/O error with path context
    pub fn io(source: std::io::Error, path: impl Into<Option<PathBuf>>) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn whois(server: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Whois {
            server: server.into(),
            message: message.into(),
        }
    }

    pub fn lookup(service: &'static str, host: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Lookup {
            service,
            host: host.into(),
            message: message.into(),
        }
    }
}

/// Convert from raw I/O errors (without path context)
impl From<std::io::Error> for LureError {
    fn from(source: std::io::Error) -> Self {
        Self::Io { path: None, source }
    }
}
