//! Credentials and signed bearer tokens.
//!
//! # Design
//! The API authenticates each request with a short-lived ES256 JWT signed by
//! an API key: header `kid` = key id, claims `iss` = issuer id, `aud` =
//! `appstoreconnect-v1`, `iat`/`exp` bounding a lifetime of at most twenty
//! minutes. The PEM key is parsed once when the signer is built so a bad key
//! fails at connection construction rather than on the first request.

use std::fmt;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Error};

pub const AUDIENCE: &str = "appstoreconnect-v1";

/// API key material. Immutable once constructed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    issuer_id: String,
    key_id: String,
    private_key: String,
}

impl Credentials {
    /// `private_key` is the PEM (PKCS#8) content of the downloaded `.p8` file.
    pub fn new(
        issuer_id: impl Into<String>,
        key_id: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        Self {
            issuer_id: issuer_id.into(),
            key_id: key_id.into(),
            private_key: private_key.into(),
        }
    }

    pub fn from_key_file(
        issuer_id: impl Into<String>,
        key_id: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let private_key = std::fs::read_to_string(path).map_err(|source| ConfigError::KeyFile {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::new(issuer_id, key_id, private_key))
    }

    /// Reads `ASC_ISSUER_ID`, `ASC_KEY_ID` and either `ASC_PRIVATE_KEY`
    /// (PEM content) or `ASC_PRIVATE_KEY_PATH`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let issuer_id = require_var("ASC_ISSUER_ID")?;
        let key_id = require_var("ASC_KEY_ID")?;
        if let Ok(pem) = std::env::var("ASC_PRIVATE_KEY") {
            return Ok(Self::new(issuer_id, key_id, pem));
        }
        let path = require_var("ASC_PRIVATE_KEY_PATH")?;
        Self::from_key_file(issuer_id, key_id, path)
    }

    pub fn issuer_id(&self) -> &str {
        &self.issuer_id
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("issuer_id", &self.issuer_id)
            .field("key_id", &self.key_id)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

fn require_var(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

/// JWT claims sent with every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub iat: u64,
    pub exp: u64,
    pub aud: String,
}

/// A signed bearer token and the instant it stops being accepted.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    value: String,
    expires_at: SystemTime,
}

impl Token {
    pub fn new(value: String, expires_at: SystemTime) -> Self {
        Self { value, expires_at }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> SystemTime {
        self.expires_at
    }

    /// Usable at `now` for at least `margin` more.
    pub fn is_fresh(&self, now: SystemTime, margin: Duration) -> bool {
        now + margin < self.expires_at
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Signs tokens for one set of credentials.
#[derive(Clone)]
pub struct TokenSigner {
    issuer_id: String,
    header: Header,
    key: EncodingKey,
}

impl TokenSigner {
    pub fn new(credentials: &Credentials) -> Result<Self, Error> {
        let key = EncodingKey::from_ec_pem(credentials.private_key.as_bytes())?;
        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some(credentials.key_id.clone());
        Ok(Self {
            issuer_id: credentials.issuer_id.clone(),
            header,
            key,
        })
    }

    pub fn sign(&self, now: SystemTime, lifetime: Duration) -> Result<Token, Error> {
        let iat = now.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
        let claims = Claims {
            iss: self.issuer_id.clone(),
            iat,
            exp: iat + lifetime.as_secs(),
            aud: AUDIENCE.to_string(),
        };
        let value = jsonwebtoken::encode(&self.header, &claims, &self.key)?;
        Ok(Token::new(value, UNIX_EPOCH + Duration::from_secs(claims.exp)))
    }
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner")
            .field("issuer_id", &self.issuer_id)
            .field("kid", &self.header.kid)
            .finish_non_exhaustive()
    }
}
