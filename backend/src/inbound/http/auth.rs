//! Bearer token authentication for HTTP handlers.
//!
//! Tokens are issued elsewhere; this service only verifies them with a
//! configured public key and turns the claims into a [`CallerIdentity`].
//! Handlers take an [`Authenticated`] argument and gate on roles with
//! [`Authenticated::require_role`], keeping the use cases role agnostic.

use std::str::FromStr;

use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tracing::{debug, error};

use crate::domain::{CallerIdentity, Error, Role, UserId};

const BEARER_PREFIX: &str = "Bearer ";

/// Verification settings for incoming bearer tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwtSettings {
    /// PEM-encoded public key, or the shared secret for `HS*` algorithms.
    pub public_key_pem: String,
    /// Algorithm name as written in the JOSE header, e.g. `RS256`.
    pub algorithm: String,
    /// Expected `iss` claim; unchecked when absent.
    pub issuer: Option<String>,
    /// Expected `aud` claim; unchecked when absent.
    pub audience: Option<String>,
}

/// Raised when [`JwtSettings`] cannot produce a verifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JwtConfigError {
    #[error("unsupported JWT algorithm: {algorithm}")]
    UnsupportedAlgorithm { algorithm: String },
    #[error("invalid JWT verification key for {algorithm:?}: {message}")]
    InvalidKey { algorithm: Algorithm, message: String },
}

/// Verifies bearer tokens and extracts the caller identity.
#[derive(Clone)]
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("algorithms", &self.validation.algorithms)
            .field("issuer", &self.validation.iss)
            .field("audience", &self.validation.aud)
            .finish_non_exhaustive()
    }
}

fn decoding_key(algorithm: Algorithm, pem: &str) -> Result<DecodingKey, JwtConfigError> {
    let bytes = pem.as_bytes();
    let key = match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
            return Ok(DecodingKey::from_secret(bytes));
        }
        Algorithm::RS256
        | Algorithm::RS384
        | Algorithm::RS512
        | Algorithm::PS256
        | Algorithm::PS384
        | Algorithm::PS512 => DecodingKey::from_rsa_pem(bytes),
        Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(bytes),
        Algorithm::EdDSA => DecodingKey::from_ed_pem(bytes),
    };
    key.map_err(|err| JwtConfigError::InvalidKey {
        algorithm,
        message: err.to_string(),
    })
}

impl JwtVerifier {
    /// Build a verifier from settings.
    ///
    /// # Errors
    ///
    /// Returns [`JwtConfigError`] when the algorithm name is unknown or the
    /// key does not parse for that algorithm family.
    pub fn new(settings: &JwtSettings) -> Result<Self, JwtConfigError> {
        let algorithm = Algorithm::from_str(settings.algorithm.trim()).map_err(|_| {
            JwtConfigError::UnsupportedAlgorithm {
                algorithm: settings.algorithm.clone(),
            }
        })?;
        let key = decoding_key(algorithm, &settings.public_key_pem)?;

        let mut validation = Validation::new(algorithm);
        validation.set_required_spec_claims(&["sub"]);
        if let Some(issuer) = &settings.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &settings.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Ok(Self { key, validation })
    }

    /// Verify a raw token and build the caller identity it asserts.
    ///
    /// # Errors
    ///
    /// Returns an `unauthorized` error for bad signatures, expired tokens,
    /// mismatched issuer or audience, and blank subjects.
    pub fn verify(&self, token: &str) -> Result<CallerIdentity, Error> {
        let claims = jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|err| {
                debug!(error = %err, "bearer token rejected");
                Error::unauthorized("Invalid or expired token")
            })?
            .claims;

        let user_id = UserId::new(claims.sub)
            .map_err(|_| Error::unauthorized("Token missing 'sub' claim"))?;
        let roles = claims.roles.map(RolesClaim::into_roles).unwrap_or_default();
        Ok(CallerIdentity::new(user_id, roles))
    }

    /// Read the `Authorization` header and verify its bearer token.
    ///
    /// # Errors
    ///
    /// Returns an `unauthorized` error when the header is absent, not a
    /// bearer credential, or carries a token [`JwtVerifier::verify`] rejects.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<CallerIdentity, Error> {
        let token = bearer_token(headers)?;
        self.verify(token)
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, Error> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("Missing authorization header"))?;
    header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("Invalid authorization header"))
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    roles: Option<RolesClaim>,
}

/// Identity providers emit either a single role string or a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RolesClaim {
    One(String),
    Many(Vec<String>),
}

impl RolesClaim {
    fn into_roles(self) -> Vec<Role> {
        let raw = match self {
            Self::One(role) => vec![role],
            Self::Many(roles) => roles,
        };
        raw.iter()
            .map(|value| {
                let Ok(role) = value.parse::<Role>();
                role
            })
            .collect()
    }
}

/// Extractor yielding the verified caller of the current request.
///
/// Requires a `web::Data<JwtVerifier>` in the application data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated(CallerIdentity);

impl Authenticated {
    /// The verified caller.
    pub fn identity(&self) -> &CallerIdentity {
        &self.0
    }

    /// Ensure the caller holds `role`, or fail with `403 Forbidden`.
    pub fn require_role(&self, role: &Role) -> Result<&CallerIdentity, Error> {
        if self.0.has_role(role) {
            Ok(&self.0)
        } else {
            let role = role.as_str().to_lowercase();
            Err(Error::forbidden(format!(
                "Only {role} callers may perform this action"
            )))
        }
    }
}

impl FromRequest for Authenticated {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(verifier) = req.app_data::<web::Data<JwtVerifier>>() else {
            error!("JwtVerifier missing from application data");
            return ready(Err(Error::internal("authentication is not configured")));
        };
        ready(verifier.authenticate(req.headers()).map(Self))
    }
}
