//! Typed, chainable client for the App Store Connect REST API.
//!
//! # Overview
//! A [`Connection`] owns the API key and a cached bearer token and hands out
//! [`Endpoint`] builders, one per resource path. Endpoints accumulate query
//! parameters (`filter`, `include`, `fields`, `limit`, `sort`, `exists`),
//! validating each against a declarative resource catalog, then run one
//! terminal operation (`get`, `create`, `update`, `delete`) that performs a
//! single HTTP round trip and returns a [`Document`] or an [`Error`].
//!
//! # Design
//! - Resources are data ([`schema`]), not one generated type per resource.
//! - Requests and responses are plain data ([`http`]); a [`Transport`]
//!   executes them, so everything up to the network call is deterministic.
//! - Local misuse is a [`ValidationError`] raised before any I/O; server
//!   failures are [`Error::Api`] with every error record in server order;
//!   transport failures pass through as `ureq::Error`.
//! - No retries anywhere.

pub mod auth;
pub mod config;
pub mod connection;
pub mod document;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod naming;
pub mod query;
pub mod response;
pub mod schema;
pub mod transport;

#[cfg(test)]
mod testing;

pub use auth::{Credentials, Token, TokenSigner};
pub use config::ClientConfig;
pub use connection::Connection;
pub use document::{
    Attributes, Data, Document, ErrorDocument, ErrorRecord, ErrorSource, Relationship, RelationshipData,
    RequestDocument, Resource, ResourceIdentifier,
};
pub use endpoint::Endpoint;
pub use error::{ConfigError, Error, Result, ValidationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use query::{QueryParams, QueryValues, SortDirection};
pub use schema::ResourceSchema;
pub use transport::{Transport, UreqTransport};
