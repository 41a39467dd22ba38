use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Customer,
    Vendor,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Customer => "CUSTOMER",
            UserRole::Vendor => "VENDOR",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CUSTOMER" => Some(UserRole::Customer),
            "VENDOR" => Some(UserRole::Vendor),
            _ => None,
        }
    }
}

/// An account on either side of the marketplace.
///
/// `password_hash` is SHA-256 over salt-then-password; the salt is random
/// per user and stored alongside.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: UserRole,
    pub password_hash: String,
    pub password_salt: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        name: String,
        email: String,
        phone: String,
        role: UserRole,
        password_hash: String,
        password_salt: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            phone,
            role,
            password_hash,
            password_salt,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Slim projection used by the chat user directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}
