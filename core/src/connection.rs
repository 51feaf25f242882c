//! The connection: credential owner, token cache and endpoint factory.
//!
//! # Design
//! A `Connection` is the only holder of mutable state in the crate: the
//! cached bearer token behind a `Mutex`. Signing happens under the lock, so
//! concurrent callers sharing one connection never sign twice for the same
//! expiry window and each request leaves with a token that is valid for at
//! least the configured refresh margin. Separate connections share nothing.
//!
//! Factory methods only build [`Endpoint`] values; no I/O happens until a
//! terminal operation runs.

use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::SystemTime;

use tracing::{debug, trace, warn};
use url::Url;

use crate::auth::{Credentials, Token, TokenSigner};
use crate::config::ClientConfig;
use crate::endpoint::Endpoint;
use crate::error::{Error, Result, ValidationError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::schema::{self, ResourceSchema};
use crate::transport::{Transport, UreqTransport};

pub struct Connection {
    config: ClientConfig,
    base_url: Url,
    signer: TokenSigner,
    token: Mutex<Option<Token>>,
    transport: Box<dyn Transport>,
}

impl Connection {
    /// Connect with the default blocking transport.
    pub fn new(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(credentials, config, transport)
    }

    /// Credentials and configuration from the environment.
    pub fn from_env() -> Result<Self> {
        Self::new(Credentials::from_env()?, ClientConfig::from_env()?)
    }

    pub fn with_transport(
        credentials: Credentials,
        config: ClientConfig,
        transport: impl Transport + 'static,
    ) -> Result<Self> {
        config.validate()?;
        let base_url = config.parsed_base_url()?;
        let signer = TokenSigner::new(&credentials)?;
        debug!(base_url = %base_url, key_id = credentials.key_id(), "connection created");
        Ok(Self {
            config,
            base_url,
            signer,
            token: Mutex::new(None),
            transport: Box::new(transport),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// A currently valid bearer token, signing a new one when none is cached
    /// or the cached one expires within the refresh margin.
    pub fn bearer_token(&self) -> Result<String> {
        let mut cached = self.token.lock().unwrap_or_else(PoisonError::into_inner);
        let now = SystemTime::now();
        if let Some(token) = cached.as_ref() {
            if token.is_fresh(now, self.config.token_refresh_margin) {
                return Ok(token.as_str().to_string());
            }
        }
        let token = self.signer.sign(now, self.config.token_lifetime)?;
        debug!(lifetime_secs = self.config.token_lifetime.as_secs(), "signed new bearer token");
        let value = token.as_str().to_string();
        *cached = Some(token);
        Ok(value)
    }

    /// Attach the bearer token and perform one round trip.
    pub fn execute(&self, mut request: HttpRequest) -> Result<HttpResponse> {
        let token = self.bearer_token()?;
        request
            .headers
            .push(("Authorization".to_string(), format!("Bearer {token}")));
        debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.execute(&request)?;
        trace!(status = response.status, bytes = response.body.len(), "received response");
        Ok(response)
    }

    /// `GET` an absolute URL handed out by the server (pagination cursors).
    ///
    /// The URL must share scheme, host and port with the configured base URL;
    /// anything else is refused before a token is attached.
    pub(crate) fn fetch(&self, url: &str) -> Result<HttpResponse> {
        if !self.same_origin(url) {
            warn!(url, "next link points outside the configured API");
            return Err(Error::ForeignLink { url: url.to_string() });
        }
        self.execute(HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: self.default_headers(),
            body: None,
        })
    }

    fn same_origin(&self, url: &str) -> bool {
        Url::parse(url).is_ok_and(|link| {
            link.scheme() == self.base_url.scheme()
                && link.host_str() == self.base_url.host_str()
                && link.port_or_known_default() == self.base_url.port_or_known_default()
        })
    }

    pub(crate) fn default_headers(&self) -> Vec<(String, String)> {
        vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), self.config.user_agent.clone()),
        ]
    }

    // -----------------------------------------------------------------------
    // Generic factories
    // -----------------------------------------------------------------------

    /// Collection endpoint for any cataloged resource type.
    pub fn endpoint(&self, resource_type: &str) -> std::result::Result<Endpoint<'_>, ValidationError> {
        Ok(self.collection(lookup(resource_type)?))
    }

    /// Instance endpoint for any cataloged resource type.
    pub fn endpoint_for(
        &self,
        resource_type: &str,
        id: &str,
    ) -> std::result::Result<Endpoint<'_>, ValidationError> {
        Ok(self.instance(lookup(resource_type)?, id))
    }

    /// Related-collection endpoint, e.g. `/v1/apps/{id}/builds`.
    pub fn related(
        &self,
        resource_type: &str,
        id: &str,
        relationship: &str,
    ) -> std::result::Result<Endpoint<'_>, ValidationError> {
        let parent = lookup(resource_type)?;
        let wire = crate::naming::snake_to_camel(relationship);
        let rel = parent
            .relationship(&wire)
            .ok_or_else(|| ValidationError::UnknownRelationship {
                resource: parent.resource_type.to_string(),
                name: wire.clone(),
            })?;
        let target = lookup(rel.related_type)?;
        Ok(Endpoint::related(self, parent, id, rel.name, target))
    }

    pub fn collection(&self, schema: &'static ResourceSchema) -> Endpoint<'_> {
        Endpoint::collection(self, schema)
    }

    pub fn instance(&self, schema: &'static ResourceSchema, id: &str) -> Endpoint<'_> {
        Endpoint::instance(self, schema, id)
    }

    // -----------------------------------------------------------------------
    // Resource accessors
    // -----------------------------------------------------------------------

    pub fn apps(&self) -> Endpoint<'_> {
        self.collection(&schema::APPS)
    }

    pub fn app(&self, id: &str) -> Endpoint<'_> {
        self.instance(&schema::APPS, id)
    }

    /// Builds of one app (`/v1/apps/{id}/builds`).
    pub fn app_builds(&self, app_id: &str) -> Endpoint<'_> {
        Endpoint::related(self, &schema::APPS, app_id, "builds", &schema::BUILDS)
    }

    pub fn app_beta_groups(&self, app_id: &str) -> Endpoint<'_> {
        Endpoint::related(self, &schema::APPS, app_id, "betaGroups", &schema::BETA_GROUPS)
    }

    pub fn builds(&self) -> Endpoint<'_> {
        self.collection(&schema::BUILDS)
    }

    pub fn build(&self, id: &str) -> Endpoint<'_> {
        self.instance(&schema::BUILDS, id)
    }

    pub fn beta_groups(&self) -> Endpoint<'_> {
        self.collection(&schema::BETA_GROUPS)
    }

    pub fn beta_group(&self, id: &str) -> Endpoint<'_> {
        self.instance(&schema::BETA_GROUPS, id)
    }

    pub fn beta_group_beta_testers(&self, group_id: &str) -> Endpoint<'_> {
        Endpoint::related(
            self,
            &schema::BETA_GROUPS,
            group_id,
            "betaTesters",
            &schema::BETA_TESTERS,
        )
    }

    pub fn beta_testers(&self) -> Endpoint<'_> {
        self.collection(&schema::BETA_TESTERS)
    }

    pub fn beta_tester(&self, id: &str) -> Endpoint<'_> {
        self.instance(&schema::BETA_TESTERS, id)
    }

    pub fn beta_tester_invitations(&self) -> Endpoint<'_> {
        self.collection(&schema::BETA_TESTER_INVITATIONS)
    }

    pub fn bundle_ids(&self) -> Endpoint<'_> {
        self.collection(&schema::BUNDLE_IDS)
    }

    pub fn bundle_id(&self, id: &str) -> Endpoint<'_> {
        self.instance(&schema::BUNDLE_IDS, id)
    }

    pub fn users(&self) -> Endpoint<'_> {
        self.collection(&schema::USERS)
    }

    pub fn user(&self, id: &str) -> Endpoint<'_> {
        self.instance(&schema::USERS, id)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("base_url", &self.base_url.as_str())
            .field("signer", &self.signer)
            .finish_non_exhaustive()
    }
}

fn lookup(resource_type: &str) -> std::result::Result<&'static ResourceSchema, ValidationError> {
    schema::lookup(resource_type).ok_or_else(|| ValidationError::UnknownResourceType {
        resource_type: resource_type.to_string(),
    })
}
