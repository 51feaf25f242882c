//! Error types for the client.
//!
//! # Design
//! Two failure classes are kept apart. [`ValidationError`] is raised while a
//! request is being assembled, before any network I/O, and is always fixed by
//! changing the call. [`Error::Api`] is raised after a completed round trip
//! whose status was not 2xx and whose body carried the API's error envelope;
//! it keeps every error record in the order the server sent them so callers
//! can inspect codes and decide which ones to tolerate.
//!
//! Transport failures (DNS, connect, timeout) are passed through as
//! `ureq::Error` without being rewrapped.

use thiserror::Error;

use crate::document::ErrorRecord;

pub type Result<T> = std::result::Result<T, Error>;

/// Parameter misuse detected locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("`{key}` is not a filter of {resource}")]
    UnknownFilter { resource: String, key: String },

    #[error("`{value}` is not an accepted value for filter `{key}` (expected one of {allowed:?})")]
    InvalidFilterValue {
        key: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("`{key}` needs at least one value")]
    EmptyValues { key: String },

    #[error("`{name}` is not a relationship of {resource}")]
    UnknownRelationship { resource: String, name: String },

    #[error("unknown resource type `{resource_type}`")]
    UnknownResourceType { resource_type: String },

    #[error("`{field}` is not a field of {resource_type}")]
    UnknownField { resource_type: String, field: String },

    #[error("`{key}` is not sortable on {resource}")]
    UnknownSort { resource: String, key: String },

    #[error("{resource} does not accept exists[{key}]")]
    UnknownExists { resource: String, key: String },

    #[error("{key}={value} is out of range (1..={max})")]
    LimitOutOfRange { key: String, value: u32, max: u32 },

    #[error("relationship `{name}` of {resource} does not accept a limit")]
    LimitNotSupported { resource: String, name: String },

    #[error("{method} is not supported on {path}")]
    MethodNotAllowed { method: String, path: String },

    #[error("request type `{found}` does not match endpoint type `{expected}`")]
    TypeMismatch { expected: String, found: String },

    #[error("request id {found:?} does not match endpoint id `{expected}`")]
    IdMismatch {
        expected: String,
        found: Option<String>,
    },

    #[error("value `{value}` for `{key}` contains ','")]
    SeparatorInValue { key: String, value: String },
}

/// Invalid client configuration or credentials.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable `{0}`")]
    MissingVar(&'static str),

    #[error("invalid value for `{name}`: {reason}")]
    InvalidValue { name: &'static str, reason: String },

    #[error("failed to read private key {path}: {source}")]
    KeyFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid base url: {0}")]
    BaseUrl(#[from] url::ParseError),
}

/// Errors returned by endpoint operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The server answered with a non-2xx status and an error envelope.
    #[error("API error (HTTP {status}): {}", summarize(.errors))]
    Api { status: u16, errors: Vec<ErrorRecord> },

    /// The server answered with a non-2xx status and no parseable envelope.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error(transparent)]
    Transport(#[from] ureq::Error),

    #[error("failed to sign bearer token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A `links.next` URL outside the configured scheme, host and port.
    #[error("refusing to follow next link to another origin: {url}")]
    ForeignLink { url: String },

    /// A `links.next` URL that was already fetched in this pagination run.
    #[error("next link {url} was already visited")]
    PaginationLoop { url: String },

    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),
}

impl Error {
    /// Server-reported error records, empty for every other variant.
    pub fn api_errors(&self) -> &[ErrorRecord] {
        match self {
            Error::Api { errors, .. } => errors,
            _ => &[],
        }
    }

    pub fn has_error_code(&self, code: &str) -> bool {
        self.api_errors().iter().any(|e| e.code == code)
    }

    /// HTTP status of a completed but unsuccessful round trip.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } | Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

fn summarize(errors: &[ErrorRecord]) -> String {
    errors
        .iter()
        .map(|e| format!("{} ({})", e.title, e.code))
        .collect::<Vec<_>>()
        .join("; ")
}
