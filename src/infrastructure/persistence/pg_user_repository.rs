//! PostgreSQL implementation of user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::User;
use crate::domain::plan::PlanType;
use crate::domain::repositories::UserRepository;
use crate::domain::session::OAuthProfile;
use crate::error::AppError;

const USER_COLUMNS: &str = "id, email, name, image, plan, locale, timezone, created_at";

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: Option<String>,
    image: Option<String>,
    plan: String,
    locale: String,
    timezone: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let plan = r.plan.parse::<PlanType>().map_err(|e| {
            AppError::internal("Corrupt user record", json!({ "reason": e.to_string() }))
        })?;

        Ok(User {
            id: r.id,
            email: r.email,
            name: r.name,
            image: r.image,
            plan,
            locale: r.locale,
            timezone: r.timezone,
            created_at: r.created_at,
        })
    }
}

/// PostgreSQL repository for user accounts.
pub struct PgUserRepository {
    pool: Arc<PgPool>,
}

impl PgUserRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn user_not_found(id: Uuid) -> AppError {
    AppError::not_found("User not found", json!({ "id": id }))
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn upsert_from_profile(&self, profile: &OAuthProfile) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, email, name, image)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO UPDATE SET
                name       = COALESCE(EXCLUDED.name, users.name),
                image      = COALESCE(EXCLUDED.image, users.image),
                updated_at = NOW()
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&profile.email)
        .bind(&profile.name)
        .bind(&profile.image)
        .fetch_one(self.pool.as_ref())
        .await?;

        row.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn update_preferences(
        &self,
        id: Uuid,
        locale: &str,
        timezone: &str,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET locale = $2, timezone = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(locale)
        .bind(timezone)
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(id));
        }
        Ok(())
    }

    async fn set_plan(&self, id: Uuid, plan: PlanType) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET plan = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(plan.as_str())
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(id));
        }
        Ok(())
    }

    async fn list(&self, limit: i64) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }
}
