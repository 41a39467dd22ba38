use axum::{extract::State, routing::post, Json, Router};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use constant_time_eq::constant_time_eq;
use rand::Rng;
use reserva_core::user::{User, UserRole};
use reserva_shared::pii::Masked;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::{decode_token, issue_token};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub user_id: Uuid,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: Masked<String>,
    pub phone: Masked<String>,
    pub role: UserRole,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: Masked::new(user.email.clone()),
            phone: Masked::new(user.phone.clone()),
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
}

// ============================================================================
// Password handling
// ============================================================================

pub fn generate_salt() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    BASE64.encode(bytes)
}

/// SHA-256 over salt-then-password, base64-encoded.
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    BASE64.encode(hasher.finalize())
}

/// Constant-time comparison so verification timing leaks nothing.
pub fn verify_password(salt: &str, password: &str, expected_hash: &str) -> bool {
    let computed = hash_password(salt, password);
    constant_time_eq(computed.as_bytes(), expected_hash.as_bytes())
}

fn generate_refresh_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    BASE64.encode(bytes)
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(axum::http::StatusCode, Json<AuthResponse>), AppError> {
    if req.name.trim().is_empty()
        || req.email.trim().is_empty()
        || req.phone.trim().is_empty()
        || req.password.is_empty()
    {
        return Err(AppError::Validation("All fields are required".to_string()));
    }

    let role = match req.role.as_deref() {
        None => UserRole::Customer,
        Some(raw) => UserRole::parse(raw)
            .ok_or_else(|| AppError::Validation(format!("Unknown role: {}", raw)))?,
    };

    let existing = state
        .users
        .find_by_email(req.email.trim())
        .await
        .map_err(AppError::repo)?;
    if existing.is_some() {
        return Err(AppError::Validation(
            "User already exists with this email".to_string(),
        ));
    }

    let salt = generate_salt();
    let user = User::new(
        req.name.trim().to_string(),
        req.email.trim().to_string(),
        req.phone.trim().to_string(),
        role,
        hash_password(&salt, &req.password),
        salt,
    );

    state.users.create_user(&user).await.map_err(AppError::repo)?;
    tracing::info!("Registered {} account {}", role.as_str(), user.id);

    let access_token = issue_token(&state.auth, &user)?;
    let refresh_token = generate_refresh_token();
    state
        .redis
        .store_refresh_token(
            user.id,
            &refresh_token,
            state.business_rules.refresh_token_ttl_seconds,
        )
        .await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(AuthResponse {
            user: UserResponse::from(&user),
            access_token,
            refresh_token,
        }),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = state
        .users
        .find_by_email(req.email.trim())
        .await
        .map_err(AppError::repo)?
        .ok_or_else(|| AppError::Authentication("Invalid credentials".to_string()))?;

    if !verify_password(&user.password_salt, &req.password, &user.password_hash) {
        return Err(AppError::Authentication("Invalid credentials".to_string()));
    }

    let access_token = issue_token(&state.auth, &user)?;
    let refresh_token = generate_refresh_token();
    state
        .redis
        .store_refresh_token(
            user.id,
            &refresh_token,
            state.business_rules.refresh_token_ttl_seconds,
        )
        .await?;

    Ok(Json(AuthResponse {
        user: UserResponse::from(&user),
        access_token,
        refresh_token,
    }))
}

async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<AccessTokenResponse>, AppError> {
    let stored = state
        .redis
        .get_refresh_token(req.user_id)
        .await?
        .ok_or_else(|| AppError::Authentication("Refresh token expired".to_string()))?;

    if !constant_time_eq(stored.as_bytes(), req.refresh_token.as_bytes()) {
        return Err(AppError::Authentication("Invalid refresh token".to_string()));
    }

    let user = state
        .users
        .find_by_id(req.user_id)
        .await
        .map_err(AppError::repo)?
        .ok_or_else(|| AppError::Authentication("Account no longer exists".to_string()))?;

    let access_token = issue_token(&state.auth, &user)?;
    Ok(Json(AccessTokenResponse { access_token }))
}

async fn logout(
    State(state): State<AppState>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let claims = decode_token(&state.auth.secret, bearer.token())?;
    let user_id = claims.user_id()?;

    state.redis.delete_refresh_token(user_id).await?;

    Ok(Json(json!({ "message": "Logged out" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_round_trip() {
        let salt = generate_salt();
        let hash = hash_password(&salt, "hunter2");

        assert!(verify_password(&salt, "hunter2", &hash));
        assert!(!verify_password(&salt, "hunter3", &hash));

        // Same password under another salt hashes differently
        let other_salt = generate_salt();
        assert_ne!(hash, hash_password(&other_salt, "hunter2"));
    }

    #[test]
    fn test_refresh_tokens_are_unique() {
        assert_ne!(generate_refresh_token(), generate_refresh_token());
    }
}
