//! Bearer token verification and route guards.
//!
//! Tokens are issued elsewhere; this side only checks the HS256 signature
//! and reads the `username` and `isAdmin` claims.

use actix_web::{http::header, HttpRequest};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    #[serde(rename = "isAdmin", default)]
    pub is_admin: bool,
}

pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // `exp` is checked when present but not required
        validation.required_spec_claims.clear();

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Option<Claims> {
        match decode::<Claims>(token, &self.key, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::debug!("Rejected bearer token: {}", e);
                None
            }
        }
    }

    /// Claims of the caller, if a valid bearer token was sent
    pub fn current_user(&self, req: &HttpRequest) -> Option<Claims> {
        let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
        let token = value
            .strip_prefix("Bearer ")
            .or_else(|| value.strip_prefix("bearer "))?;
        self.verify(token.trim())
    }

    pub fn ensure_logged_in(&self, req: &HttpRequest) -> Result<Claims, ApiError> {
        self.current_user(req).ok_or(ApiError::Unauthorized)
    }

    pub fn ensure_admin(&self, req: &HttpRequest) -> Result<Claims, ApiError> {
        match self.current_user(req) {
            Some(claims) if claims.is_admin => Ok(claims),
            _ => Err(ApiError::Unauthorized),
        }
    }

    /// The caller must be `username` or an admin
    pub fn ensure_self_or_admin(
        &self,
        req: &HttpRequest,
        username: &str,
    ) -> Result<Claims, ApiError> {
        match self.current_user(req) {
            Some(claims) if claims.is_admin || claims.username == username => Ok(claims),
            _ => Err(ApiError::Unauthorized),
        }
    }
}
