use std::collections::HashSet;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::AppConfig, errors::ApiError, models::User};

/// Claims
///
/// The identity claim embedded in every access token. Signed with the server
/// secret at login and treated as authoritative for the lifetime of a request;
/// handlers do not re-check it against the store unless they explicitly
/// re-fetch (e.g. the profile lookup).
///
/// No expiration claim is set or enforced: a validly-signed token is accepted
/// regardless of age. Known weakness, preserved from the API contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's UUID.
    pub sub: Uuid,
    pub email: String,
    pub username: String,
    pub is_admin: bool,
}

impl From<&User> for Claims {
    fn from(user: &User) -> Self {
        Claims {
            sub: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            is_admin: user.is_admin,
        }
    }
}

/// issue_token
///
/// Produces the opaque signed credential encoding the identity claim.
pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, ApiError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("failed to sign access token: {e}")))
}

/// decode_token
///
/// Verifies the signature and structural validity of a credential and returns
/// the embedded claim. Expiration is deliberately not validated — the tokens
/// carry no `exp` claim.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, ApiError> {
    let mut validation = Validation::default();
    validation.validate_exp = false;
    validation.required_spec_claims = HashSet::new();

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::Unauthenticated("Failed to authenticate token".to_string()))
}

/// AuthUser
///
/// The resolved identity of an authenticated request: the decoded claim, made
/// available to handlers as a function argument. This is guard one of the
/// authorization gate — any handler taking `AuthUser` only runs for requests
/// carrying a validly-signed credential.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    // Allows the extractor to pull the AppConfig (for the JWT secret).
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        // Credential transport: the Authorization header, optionally prefixed
        // with the "Bearer " scheme.
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthenticated("No token provided".to_string()))?;

        let token = auth_header.strip_prefix("Bearer ").unwrap_or(auth_header);

        let claims = decode_token(token, &config.jwt_secret)?;

        Ok(AuthUser(claims))
    }
}

/// AdminUser
///
/// Guard two of the authorization gate: runs guard one, then requires the
/// identity's admin flag. Non-admins are rejected with 403 — authentication
/// has already succeeded at that point, the identity just lacks rights.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;

        if !claims.is_admin {
            return Err(ApiError::Forbidden("Action Forbidden".to_string()));
        }

        Ok(AdminUser(claims))
    }
}
