//! Credential validation and the connection admission gate.

use async_trait::async_trait;
use axum_extra::headers::Cookie;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use log::warn;
use thiserror::Error;

use super::claims::Claims;

/// Name of the cookie carrying the bearer credential.
pub const AUTH_COOKIE: &str = "auth_token";

/// Identity resolved from a validated credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

/// Why a connection attempt was refused admission.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdmissionError {
    /// The handshake carried no credential cookie.
    #[error("connection attempt carries no credential")]
    MissingCredential,

    /// The credential was rejected, or validating it failed.
    #[error("credential rejected")]
    Unauthorized,
}

/// Resolves a bearer credential to a user identity.
///
/// `Ok(None)` means the credential is invalid: a clean rejection, never an
/// error. `Err` is reserved for transport-level failures while validating,
/// which admission treats the same as an invalid credential.
#[async_trait]
pub trait TokenValidator: Send + Sync {
    async fn validate_token(&self, credential: &str) -> anyhow::Result<Option<AuthenticatedUser>>;
}

/// JWT-backed validator keyed by a shared secret.
pub struct JwtValidator {
    decoding: DecodingKey,
    encoding: EncodingKey,
    validation: Validation,
}

impl JwtValidator {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Mint a token for local development and tests.
    pub fn issue_token(&self, user_id: &str, ttl_secs: i64) -> anyhow::Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + Duration::seconds(ttl_secs)).timestamp(),
            iat: Some(now.timestamp()),
            email: None,
            name: None,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }
}

#[async_trait]
impl TokenValidator for JwtValidator {
    async fn validate_token(&self, credential: &str) -> anyhow::Result<Option<AuthenticatedUser>> {
        match decode::<Claims>(credential, &self.decoding, &self.validation) {
            Ok(data) => Ok(Some(AuthenticatedUser {
                user_id: data.claims.sub,
            })),
            Err(_) => Ok(None),
        }
    }
}

/// Run the admission gate over a connection's handshake cookies.
///
/// Invoked before the transport accepts the connection. Fail closed: a
/// validator error is indistinguishable from an invalid credential.
pub async fn admit(
    cookies: Option<&Cookie>,
    validator: &dyn TokenValidator,
) -> Result<AuthenticatedUser, AdmissionError> {
    let credential = cookies
        .and_then(|jar| jar.get(AUTH_COOKIE))
        .ok_or(AdmissionError::MissingCredential)?;

    match validator.validate_token(credential).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(AdmissionError::Unauthorized),
        Err(err) => {
            warn!("credential validation failed, rejecting connection: {err:#}");
            Err(AdmissionError::Unauthorized)
        }
    }
}
