//! Identity tokens.
//!
//! Customers sign in with an external identity provider, which issues HS256 JWTs signed with a key shared with this
//! server. [`IdentityClaims`] is an actix extractor: any handler that takes it as an argument requires a valid token,
//! read from the `Authorization: Bearer` header or, failing that, from the `__session` cookie.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpMessage, HttpRequest};
use jwt_compact::{
    alg::{Hs256, Hs256Key},
    AlgorithmExt,
    TimeOptions,
    UntrustedToken,
};
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

pub const SESSION_COOKIE: &str = "__session";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    #[serde(alias = "sub")]
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

pub struct TokenVerifier {
    key: Hs256Key,
    time_options: TimeOptions,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        Self { key: Hs256Key::new(config.identity_secret.reveal().as_bytes()), time_options: TimeOptions::default() }
    }

    /// Checks the signature and expiry of `token`. Tokens without an expiry are rejected.
    pub fn verify(&self, token: &str) -> Result<IdentityClaims, AuthError> {
        let untrusted = UntrustedToken::new(token).map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
        let token = Hs256
            .validator::<IdentityClaims>(&self.key)
            .validate(&untrusted)
            .map_err(|e| AuthError::ValidationError(e.to_string()))?;
        token.claims().validate_expiration(&self.time_options).map_err(|e| AuthError::ValidationError(e.to_string()))?;
        let claims = token.claims().custom.clone();
        if claims.uid.trim().is_empty() {
            return Err(AuthError::ValidationError("The token does not name a user".into()));
        }
        Ok(claims)
    }
}

fn token_from_request(req: &HttpRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    bearer.or_else(|| req.cookie(SESSION_COOKIE).map(|c| c.value().to_string()).filter(|v| !v.is_empty()))
}

fn claims_from_request(req: &HttpRequest) -> Result<IdentityClaims, ServerError> {
    if let Some(claims) = req.extensions().get::<IdentityClaims>() {
        return Ok(claims.clone());
    }
    let verifier = req.app_data::<web::Data<TokenVerifier>>().ok_or_else(|| {
        error!("🔐️ No token verifier has been registered with the server");
        ServerError::ConfigurationError("Identity tokens cannot be verified".into())
    })?;
    let token = token_from_request(req).ok_or(AuthError::MissingToken)?;
    let claims = verifier.verify(&token).map_err(|e| {
        debug!("🔐️ Rejected identity token. {e}");
        e
    })?;
    trace!("🔐️ Identity token accepted for {}", claims.uid);
    req.extensions_mut().insert(claims.clone());
    Ok(claims)
}

impl FromRequest for IdentityClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(claims_from_request(req))
    }
}
