// rest_api/src/auth.rs

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use models::AdminProfile;

use crate::{ApiError, AppState};

const TOKEN_LIFETIME_HOURS: i64 = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: usize,
}

pub fn create_token(admin: &AdminProfile, secret: &[u8]) -> Result<String, ApiError> {
    let claims = Claims {
        sub: admin.id.clone(),
        email: admin.email.clone(),
        exp: (Utc::now() + chrono::Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp() as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
        .map_err(|e| ApiError::Internal(format!("failed to sign token: {}", e)))
}

pub fn decode_token(token: &str, secret: &[u8]) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::Unauthorized("invalid or expired session token".to_string()))
}

/// Extractor guarding the admin routes. Missing or invalid bearer tokens are
/// rejected before any data access happens; the client redirects to login.
pub struct AdminAuth(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("malformed authorization header".to_string()))?;
        let claims = decode_token(token, &state.jwt_secret)?;
        Ok(AdminAuth(claims))
    }
}
