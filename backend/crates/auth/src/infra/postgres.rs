//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::error::conversions::unique_violation;
use kernel::pagination::PageRequest;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::user::{Profile, User};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    confirmation_code::ConfirmationCode, email::Email, user_id::UserId, user_name::UserName,
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

const USER_COLUMNS: &str = r#"
    user_id,
    username,
    email,
    role,
    is_superuser,
    first_name,
    last_name,
    bio,
    confirmation_code,
    confirmation_code_expires_at,
    created_at,
    updated_at
"#;

/// PostgreSQL-backed user repository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Drop confirmation codes past their expiry
    pub async fn cleanup_expired_codes(&self) -> AuthResult<u64> {
        let cleared = sqlx::query(
            r#"
            UPDATE users SET
                confirmation_code = NULL,
                confirmation_code_expires_at = NULL
            WHERE confirmation_code_expires_at < NOW()
            "#,
        )
        .execute(&self.pool)
        .await?
        .rows_affected();

        tracing::info!(codes_cleared = cleared, "Cleared expired confirmation codes");

        Ok(cleared)
    }
}

/// Map uniqueness violations to the field that clashed
fn map_write_error(err: sqlx::Error) -> AuthError {
    match unique_violation(&err) {
        Some("users_email_key") => AuthError::EmailTaken,
        Some(_) => AuthError::UserNameTaken,
        None => AuthError::Database(err),
    }
}

/// `ILIKE` substring pattern with wildcards in the needle escaped
fn contains_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgUserRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                username,
                email,
                role,
                is_superuser,
                first_name,
                last_name,
                bio,
                confirmation_code,
                confirmation_code_expires_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(user.role.code())
        .bind(user.is_superuser)
        .bind(&user.profile.first_name)
        .bind(&user.profile.last_name)
        .bind(&user.profile.bio)
        .bind(user.confirmation_code.as_ref().map(|c| c.as_str()))
        .bind(user.confirmation_code_expires_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        tracing::debug!(user_id = %user.user_id, "User row inserted");

        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_username(&self, username: &UserName) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> AuthResult<(Vec<User>, u64)> {
        let pattern = search.map(contains_pattern);

        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE ($1::TEXT IS NULL OR username ILIKE $1)",
        )
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE ($1::TEXT IS NULL OR username ILIKE $1)
            ORDER BY username
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(pattern.as_deref())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let users = rows
            .into_iter()
            .map(|r| r.into_user())
            .collect::<AuthResult<Vec<_>>>()?;

        Ok((users, count.max(0) as u64))
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                username = $2,
                email = $3,
                role = $4,
                first_name = $5,
                last_name = $6,
                bio = $7,
                updated_at = $8
            WHERE user_id = $1
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(user.role.code())
        .bind(&user.profile.first_name)
        .bind(&user.profile.last_name)
        .bind(&user.profile.bio)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<bool> {
        let deleted = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn store_confirmation_code(
        &self,
        user_id: &UserId,
        code: &ConfirmationCode,
        expires_at: DateTime<Utc>,
    ) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                confirmation_code = $2,
                confirmation_code_expires_at = $3,
                updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(code.as_str())
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn consume_confirmation_code(
        &self,
        user_id: &UserId,
        code: &ConfirmationCode,
    ) -> AuthResult<bool> {
        let consumed = sqlx::query(
            r#"
            UPDATE users SET
                confirmation_code = NULL,
                confirmation_code_expires_at = NULL,
                updated_at = NOW()
            WHERE user_id = $1 AND confirmation_code = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(code.as_str())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if consumed == 0 {
            tracing::warn!(user_id = %user_id, "Confirmation code already consumed or rotated");
        }

        Ok(consumed == 1)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    username: String,
    email: String,
    role: String,
    is_superuser: bool,
    first_name: String,
    last_name: String,
    bio: String,
    confirmation_code: Option<String>,
    confirmation_code_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let role = UserRole::from_code(&self.role)
            .ok_or_else(|| AuthError::Internal(format!("Invalid role in database: {}", self.role)))?;

        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            username: UserName::from_db(self.username),
            email: Email::from_db(self.email),
            role,
            is_superuser: self.is_superuser,
            profile: Profile {
                first_name: self.first_name,
                last_name: self.last_name,
                bio: self.bio,
            },
            confirmation_code: self.confirmation_code.map(ConfirmationCode::from_db),
            confirmation_code_expires_at: self.confirmation_code_expires_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
