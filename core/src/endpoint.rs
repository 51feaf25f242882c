//! Chainable endpoint builder and its terminal operations.
//!
//! # Design
//! An `Endpoint` is a resource path plus pending query parameters. Each
//! configuration call validates its input against the resource's
//! [`ResourceSchema`] and returns the updated builder, so misuse surfaces as a
//! [`ValidationError`] before any network I/O:
//!
//! ```no_run
//! # use appstore_connect::{Connection, SortDirection};
//! # fn run(connection: &Connection) -> appstore_connect::Result<()> {
//! let apps = connection
//!     .apps()
//!     .filter("bundle_id", ["com.example.one", "com.example.two"])?
//!     .include("builds")?
//!     .limit_related("builds", 10)?
//!     .sort(&[("name", SortDirection::Ascending)])?
//!     .get()?;
//! # Ok(())
//! # }
//! ```
//!
//! Repeated calls for the same parameter key overwrite the earlier value;
//! nothing is merged. `fields()` does not require the related type to be
//! listed in `include()`: the server is the one that rejects that mismatch.
//!
//! Each terminal operation (`get`, `create`, `update`, `delete`) consumes the
//! builder and performs exactly one round trip. Only `get` sends the query
//! string; `create` and `update` ignore accumulated parameters.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::connection::Connection;
use crate::document::{Data, Document, RequestDocument};
use crate::error::{ConfigError, Error, Result, ValidationError};
use crate::http::{HttpMethod, HttpRequest};
use crate::naming::snake_to_camel;
use crate::query::{QueryParams, QueryValues, SortDirection};
use crate::response::{parse_document, parse_empty};
use crate::schema::{self, ResourceSchema, PRIMARY_LIMIT_MAX};

type Validated<T> = std::result::Result<T, ValidationError>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Collection,
    Instance(String),
    /// Collection of a parent's related resources (`/v1/apps/{id}/builds`).
    Related,
}

#[derive(Debug, Clone)]
pub struct Endpoint<'c> {
    connection: &'c Connection,
    schema: &'static ResourceSchema,
    segments: Vec<String>,
    target: Target,
    params: QueryParams,
}

impl<'c> Endpoint<'c> {
    pub(crate) fn collection(connection: &'c Connection, schema: &'static ResourceSchema) -> Self {
        Self {
            connection,
            schema,
            segments: path_segments(schema.path),
            target: Target::Collection,
            params: QueryParams::new(),
        }
    }

    pub(crate) fn instance(connection: &'c Connection, schema: &'static ResourceSchema, id: &str) -> Self {
        let mut segments = path_segments(schema.path);
        segments.push(id.to_string());
        Self {
            connection,
            schema,
            segments,
            target: Target::Instance(id.to_string()),
            params: QueryParams::new(),
        }
    }

    pub(crate) fn related(
        connection: &'c Connection,
        parent: &'static ResourceSchema,
        parent_id: &str,
        relationship: &str,
        schema: &'static ResourceSchema,
    ) -> Self {
        let mut segments = path_segments(parent.path);
        segments.push(parent_id.to_string());
        segments.push(relationship.to_string());
        Self {
            connection,
            schema,
            segments,
            target: Target::Related,
            params: QueryParams::new(),
        }
    }

    pub fn schema(&self) -> &'static ResourceSchema {
        self.schema
    }

    /// Path relative to the base URL, e.g. `/v1/apps/123`.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    pub fn id(&self) -> Option<&str> {
        match &self.target {
            Target::Instance(id) => Some(id),
            _ => None,
        }
    }

    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    /// Pending parameters as `(key, value)` pairs, before percent-encoding.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.params.to_pairs()
    }

    // -----------------------------------------------------------------------
    // Parameter accumulation
    // -----------------------------------------------------------------------

    /// `filter[<key>]=v1,v2`. `key` is snake_case (`bundle_id`); dotted
    /// paths such as `pre_release_version.version` are accepted. Values are
    /// joined with `,` on the wire, so a value containing `,` is rejected.
    pub fn filter(mut self, key: &str, values: impl QueryValues) -> Validated<Self> {
        let wire = snake_to_camel(key);
        let filter = self
            .schema
            .filter(&wire)
            .ok_or_else(|| ValidationError::UnknownFilter {
                resource: self.schema.resource_type.to_string(),
                key: wire.clone(),
            })?;
        let values = non_empty(format!("filter[{wire}]"), values.into_values())?;
        if let Some(bad) = values.iter().find(|v| v.contains(',')) {
            return Err(ValidationError::SeparatorInValue {
                key: format!("filter[{wire}]"),
                value: bad.clone(),
            });
        }
        if let Some(allowed) = filter.values {
            if let Some(bad) = values.iter().find(|v| !allowed.contains(&v.as_str())) {
                return Err(ValidationError::InvalidFilterValue {
                    key: wire,
                    value: bad.clone(),
                    allowed: allowed.iter().map(|a| a.to_string()).collect(),
                });
            }
        }
        self.params.set_filter(&wire, values);
        Ok(self)
    }

    /// `include=rel1,rel2`; every name must be a relationship of this resource.
    pub fn include(mut self, relationships: impl QueryValues) -> Validated<Self> {
        let names = non_empty("include".to_string(), relationships.into_values())?;
        let mut wire_names = Vec::with_capacity(names.len());
        for name in names {
            let wire = snake_to_camel(&name);
            if self.schema.relationship(&wire).is_none() {
                return Err(self.unknown_relationship(wire));
            }
            wire_names.push(wire);
        }
        self.params.set_include(wire_names);
        Ok(self)
    }

    /// `fields[<resource_type>]=f1,f2`. `resource_type` is the wire type
    /// (`builds`, `betaTesters`, ...). It is not checked against `include`.
    pub fn fields(mut self, resource_type: &str, fields: impl QueryValues) -> Validated<Self> {
        let target = schema::lookup(resource_type).ok_or_else(|| ValidationError::UnknownResourceType {
            resource_type: resource_type.to_string(),
        })?;
        let names = non_empty(format!("fields[{resource_type}]"), fields.into_values())?;
        let mut wire_names = Vec::with_capacity(names.len());
        for name in names {
            let wire = snake_to_camel(&name);
            if !target.has_field(&wire) {
                return Err(ValidationError::UnknownField {
                    resource_type: target.resource_type.to_string(),
                    field: wire,
                });
            }
            wire_names.push(wire);
        }
        self.params.set_fields(target.resource_type, wire_names);
        Ok(self)
    }

    /// Page size of the primary data, `1..=200`.
    pub fn limit(mut self, n: u32) -> Validated<Self> {
        check_limit("limit", n, PRIMARY_LIMIT_MAX)?;
        self.params.set_limit(n);
        Ok(self)
    }

    /// `limit[<relationship>]`, bounded by the relationship's own ceiling.
    pub fn limit_related(mut self, relationship: &str, n: u32) -> Validated<Self> {
        let wire = snake_to_camel(relationship);
        let rel = self
            .schema
            .relationship(&wire)
            .ok_or_else(|| self.unknown_relationship(wire.clone()))?;
        let max = rel.limit_max.ok_or_else(|| ValidationError::LimitNotSupported {
            resource: self.schema.resource_type.to_string(),
            name: wire.clone(),
        })?;
        let key = format!("limit[{wire}]");
        check_limit(&key, n, max)?;
        self.params.set_related_limit(&wire, n);
        Ok(self)
    }

    /// `sort=a,-b`; keys are encoded in the order given.
    pub fn sort(mut self, keys: &[(&str, SortDirection)]) -> Validated<Self> {
        if keys.is_empty() {
            return Err(ValidationError::EmptyValues {
                key: "sort".to_string(),
            });
        }
        let mut wire_keys = Vec::with_capacity(keys.len());
        for (attr, direction) in keys {
            let wire = snake_to_camel(attr);
            if !self.schema.is_sortable(&wire) {
                return Err(ValidationError::UnknownSort {
                    resource: self.schema.resource_type.to_string(),
                    key: wire,
                });
            }
            wire_keys.push((wire, *direction));
        }
        self.params.set_sort(wire_keys);
        Ok(self)
    }

    /// `exists[<relationship>]=true|false`.
    pub fn exists(mut self, relationship: &str, present: bool) -> Validated<Self> {
        let wire = snake_to_camel(relationship);
        if !self.schema.accepts_exists(&wire) {
            return Err(ValidationError::UnknownExists {
                resource: self.schema.resource_type.to_string(),
                key: wire,
            });
        }
        self.params.set_exists(&wire, present);
        Ok(self)
    }

    // -----------------------------------------------------------------------
    // Request construction
    // -----------------------------------------------------------------------

    pub fn build_get(&self) -> Result<HttpRequest> {
        self.ensure_supported(HttpMethod::Get)?;
        let mut url = self.url()?;
        if !self.params.is_empty() {
            url.query_pairs_mut().extend_pairs(self.params.to_pairs());
        }
        Ok(HttpRequest {
            method: HttpMethod::Get,
            url: url.into(),
            headers: self.connection.default_headers(),
            body: None,
        })
    }

    pub fn build_create<A: Serialize>(&self, body: &RequestDocument<A>) -> Result<HttpRequest> {
        self.ensure_supported(HttpMethod::Post)?;
        self.ensure_type(body)?;
        self.json_request(HttpMethod::Post, body)
    }

    pub fn build_update<A: Serialize>(&self, body: &RequestDocument<A>) -> Result<HttpRequest> {
        self.ensure_supported(HttpMethod::Patch)?;
        self.ensure_type(body)?;
        if body.data.id.as_deref() != self.id() {
            return Err(ValidationError::IdMismatch {
                expected: self.id().unwrap_or_default().to_string(),
                found: body.data.id.clone(),
            }
            .into());
        }
        self.json_request(HttpMethod::Patch, body)
    }

    pub fn build_delete(&self) -> Result<HttpRequest> {
        self.ensure_supported(HttpMethod::Delete)?;
        Ok(HttpRequest {
            method: HttpMethod::Delete,
            url: self.url()?.into(),
            headers: self.connection.default_headers(),
            body: None,
        })
    }

    // -----------------------------------------------------------------------
    // Terminal operations
    // -----------------------------------------------------------------------

    /// `GET` with the accumulated query; attributes stay untyped.
    pub fn get(self) -> Result<Document> {
        self.get_as()
    }

    /// `GET` with attributes deserialized into `A`.
    #[instrument(level = "debug", skip(self), fields(path = %self.path()))]
    pub fn get_as<A: DeserializeOwned>(self) -> Result<Document<A>> {
        let request = self.build_get()?;
        let response = self.connection.execute(request)?;
        parse_document(response)
    }

    /// `GET` every page by following `links.next`, merging `data` and
    /// `included`. One round trip per page; `meta` comes from the last page.
    ///
    /// Next links must stay on the configured origin, and a link that was
    /// already fetched ends the run with [`Error::PaginationLoop`].
    #[instrument(level = "debug", skip(self), fields(path = %self.path()))]
    pub fn get_all(self) -> Result<Document> {
        let connection = self.connection;
        let request = self.build_get()?;
        let mut visited = HashSet::from([request.url.clone()]);
        let mut page: Document = parse_document(connection.execute(request)?)?;
        let mut data = Vec::new();
        let mut included = Vec::new();
        let mut pages = 1usize;
        let meta = loop {
            let next = page.next_url().map(str::to_string);
            included.append(&mut page.included);
            let meta = page.meta.take();
            data.extend(page.into_resources());
            match next {
                Some(url) => {
                    if !visited.insert(url.clone()) {
                        warn!(url = %url, pages, "next link repeats an earlier page");
                        return Err(Error::PaginationLoop { url });
                    }
                    page = parse_document(connection.fetch(&url)?)?;
                    pages += 1;
                }
                None => break meta,
            }
        };
        debug!(pages, resources = data.len(), "fetched all pages");
        Ok(Document {
            data: Some(Data::Many(data)),
            included,
            links: None,
            meta,
        })
    }

    /// `POST` the request document. Accumulated query parameters are ignored.
    #[instrument(level = "debug", skip_all, fields(path = %self.path()))]
    pub fn create<A: Serialize>(self, body: &RequestDocument<A>) -> Result<Document> {
        self.warn_ignored_params(HttpMethod::Post);
        let request = self.build_create(body)?;
        parse_document(self.connection.execute(request)?)
    }

    /// `PATCH` the request document. Accumulated query parameters are ignored.
    #[instrument(level = "debug", skip_all, fields(path = %self.path()))]
    pub fn update<A: Serialize>(self, body: &RequestDocument<A>) -> Result<Document> {
        self.warn_ignored_params(HttpMethod::Patch);
        let request = self.build_update(body)?;
        parse_document(self.connection.execute(request)?)
    }

    /// `DELETE` the resource. Success is any 2xx; the body is ignored.
    #[instrument(level = "debug", skip(self), fields(path = %self.path()))]
    pub fn delete(self) -> Result<()> {
        let request = self.build_delete()?;
        parse_empty(self.connection.execute(request)?)
    }

    // -----------------------------------------------------------------------

    fn url(&self) -> Result<Url> {
        let mut url = self.connection.base_url().clone();
        url.path_segments_mut()
            .map_err(|()| ConfigError::InvalidValue {
                name: "base_url",
                reason: "cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(self.segments.iter());
        Ok(url)
    }

    fn json_request<A: Serialize>(&self, method: HttpMethod, body: &RequestDocument<A>) -> Result<HttpRequest> {
        let body = serde_json::to_string(body).map_err(Error::Serialization)?;
        let mut headers = self.connection.default_headers();
        headers.push(("Content-Type".to_string(), "application/json".to_string()));
        Ok(HttpRequest {
            method,
            url: self.url()?.into(),
            headers,
            body: Some(body),
        })
    }

    fn ensure_supported(&self, method: HttpMethod) -> Validated<()> {
        let supported = match self.target {
            Target::Collection => self.schema.supports(&method, false),
            Target::Instance(_) => self.schema.supports(&method, true),
            Target::Related => method == HttpMethod::Get,
        };
        if supported {
            Ok(())
        } else {
            Err(ValidationError::MethodNotAllowed {
                method: method.to_string(),
                path: self.path(),
            })
        }
    }

    fn ensure_type<A>(&self, body: &RequestDocument<A>) -> Validated<()> {
        if body.data.resource_type != self.schema.resource_type {
            return Err(ValidationError::TypeMismatch {
                expected: self.schema.resource_type.to_string(),
                found: body.data.resource_type.clone(),
            });
        }
        Ok(())
    }

    fn warn_ignored_params(&self, method: HttpMethod) {
        if !self.params.is_empty() {
            warn!(%method, count = self.params.len(), "query parameters are not sent with this method");
        }
    }

    fn unknown_relationship(&self, name: String) -> ValidationError {
        ValidationError::UnknownRelationship {
            resource: self.schema.resource_type.to_string(),
            name,
        }
    }
}

fn path_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(key: String, values: Vec<String>) -> Validated<Vec<String>> {
    if values.is_empty() {
        return Err(ValidationError::EmptyValues { key });
    }
    Ok(values)
}

fn check_limit(key: &str, n: u32, max: u32) -> Validated<()> {
    if (1..=max).contains(&n) {
        Ok(())
    } else {
        Err(ValidationError::LimitOutOfRange {
            key: key.to_string(),
            value: n,
            max,
        })
    }
}
