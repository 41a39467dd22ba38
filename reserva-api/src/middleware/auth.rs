use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use reserva_core::user::{User, UserRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::{AppState, AuthConfig};

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::Authentication("Malformed subject claim".to_string()))
    }

    pub fn is_vendor(&self) -> bool {
        self.role == UserRole::Vendor.as_str()
    }

    pub fn is_customer(&self) -> bool {
        self.role == UserRole::Customer.as_str()
    }
}

pub fn issue_token(auth: &AuthConfig, user: &User) -> Result<String, AppError> {
    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        role: user.role.as_str().to_string(),
        exp: (Utc::now() + Duration::seconds(auth.expiration as i64)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token encoding failed: {}", e)))
}

pub fn decode_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Authentication(e.to_string()))
}

// ============================================================================
// Authentication Middleware
// ============================================================================

/// Any valid token: used for the chat surface, which both roles share.
pub async fn auth_middleware(
    State(state): State<AppState>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let claims =
        decode_token(&state.auth.secret, bearer.token()).map_err(|_| StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Customer-only surface: booking creation, history, reviews, favorites.
pub async fn customer_auth_middleware(
    State(state): State<AppState>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let claims =
        decode_token(&state.auth.secret, bearer.token()).map_err(|_| StatusCode::UNAUTHORIZED)?;

    if !claims.is_customer() {
        return Err(StatusCode::FORBIDDEN);
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Vendor-only surface: listing/unit management, booking transitions,
/// analytics.
pub async fn vendor_auth_middleware(
    State(state): State<AppState>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let claims =
        decode_token(&state.auth.secret, bearer.token()).map_err(|_| StatusCode::UNAUTHORIZED)?;

    if !claims.is_vendor() {
        return Err(StatusCode::FORBIDDEN);
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(role: UserRole) -> User {
        User::new(
            "Ada".to_string(),
            "ada@example.com".to_string(),
            "+15550100".to_string(),
            role,
            "hash".to_string(),
            "salt".to_string(),
        )
    }

    #[test]
    fn test_token_round_trip() {
        let auth = AuthConfig {
            secret: "test-secret".to_string(),
            expiration: 3600,
        };
        let user = sample_user(UserRole::Vendor);

        let token = issue_token(&auth, &user).unwrap();
        let claims = decode_token(&auth.secret, &token).unwrap();

        assert_eq!(claims.user_id().unwrap(), user.id);
        assert_eq!(claims.email, user.email);
        assert!(claims.is_vendor());
        assert!(!claims.is_customer());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let auth = AuthConfig {
            secret: "test-secret".to_string(),
            expiration: 3600,
        };
        let token = issue_token(&auth, &sample_user(UserRole::Customer)).unwrap();

        assert!(decode_token("other-secret", &token).is_err());
    }
}
