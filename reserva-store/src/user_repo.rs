use async_trait::async_trait;
use reserva_core::repository::{RepoError, UserRepository};
use reserva_core::user::{User, UserRole};
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    phone: String,
    role: String,
    password_hash: String,
    password_salt: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

fn row_to_user(row: UserRow) -> Result<User, RepoError> {
    let role = UserRole::parse(&row.role)
        .ok_or_else(|| format!("unknown role in users table: {}", row.role))?;

    Ok(User {
        id: row.id,
        name: row.name,
        email: row.email,
        phone: row.phone,
        role,
        password_hash: row.password_hash,
        password_salt: row.password_salt,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create_user(&self, user: &User) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, phone, role, password_hash, password_salt, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .bind(&user.password_salt)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, phone, role, password_hash, password_salt, created_at, updated_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, phone, role, password_hash, password_salt, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_user).transpose()
    }
}
