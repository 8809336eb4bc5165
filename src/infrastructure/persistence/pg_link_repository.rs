//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{Link, LinkFilter, LinkListQuery, LinkPatch, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

const LINK_COLUMNS: &str = "id, slug, original_url, title, description, tags, user_id, \
     is_active, expires_at, password_hash, click_count, last_click_at, created_at, updated_at";

#[derive(FromRow)]
struct LinkRow {
    id: i64,
    slug: String,
    original_url: String,
    title: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
    user_id: Uuid,
    is_active: bool,
    expires_at: Option<DateTime<Utc>>,
    password_hash: Option<String>,
    click_count: i64,
    last_click_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        Link {
            id: r.id,
            slug: r.slug,
            original_url: r.original_url,
            title: r.title,
            description: r.description,
            tags: r.tags,
            user_id: r.user_id,
            is_active: r.is_active,
            expires_at: r.expires_at,
            password_hash: r.password_hash,
            click_count: r.click_count,
            last_click_at: r.last_click_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// PostgreSQL repository for link storage and retrieval.
///
/// Slug uniqueness is enforced by the `links_slug_key` constraint.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

/// Escapes `%`, `_` and `\` so user input matches literally inside `ILIKE`.
fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &LinkFilter) {
    if let Some(search) = filter.search.as_deref() {
        let pattern = like_pattern(search);
        qb.push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR original_url ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR slug ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(tag) = filter.tag.as_deref() {
        qb.push(" AND ")
            .push_bind(tag.to_string())
            .push(" = ANY(tags)");
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            r#"
            INSERT INTO links
                (slug, original_url, title, description, tags, user_id, expires_at, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {LINK_COLUMNS}
            "#
        ))
        .bind(new_link.slug)
        .bind(new_link.original_url)
        .bind(new_link.title)
        .bind(new_link.description)
        .bind(new_link.tags)
        .bind(new_link.user_id)
        .bind(new_link.expires_at)
        .bind(new_link.password_hash)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM links WHERE slug = $1)")
            .bind(slug)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(exists)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        query: LinkListQuery,
    ) -> Result<Vec<Link>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE user_id = "
        ));
        qb.push_bind(user_id);
        push_filter(&mut qb, &query.filter);

        let direction = if query.descending { "DESC" } else { "ASC" };
        qb.push(format!(
            " ORDER BY {} {direction} NULLS LAST, id {direction}",
            query.sort.column()
        ));
        qb.push(" LIMIT ")
            .push_bind(query.limit)
            .push(" OFFSET ")
            .push_bind(query.offset);

        let rows = qb
            .build_query_as::<LinkRow>()
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Link::from).collect())
    }

    async fn count_for_user(&self, user_id: Uuid, filter: LinkFilter) -> Result<i64, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM links WHERE user_id = ");
        qb.push_bind(user_id);
        push_filter(&mut qb, &filter);

        let count: i64 = qb
            .build_query_scalar::<i64>()
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn update(
        &self,
        slug: &str,
        user_id: Uuid,
        patch: LinkPatch,
    ) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            r#"
            UPDATE links SET
                original_url  = COALESCE($3, original_url),
                title         = COALESCE($4, title),
                description   = COALESCE($5, description),
                tags          = COALESCE($6, tags),
                is_active     = COALESCE($7, is_active),
                expires_at    = CASE WHEN $8::boolean THEN $9::timestamptz ELSE expires_at END,
                password_hash = CASE WHEN $10::boolean THEN $11::text ELSE password_hash END,
                updated_at    = NOW()
            WHERE slug = $1 AND user_id = $2
            RETURNING {LINK_COLUMNS}
            "#
        ))
        .bind(slug)
        .bind(user_id)
        .bind(patch.original_url)
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.tags)
        .bind(patch.is_active)
        .bind(patch.expires_at.is_some())
        .bind(patch.expires_at.flatten())
        .bind(patch.password_hash.is_some())
        .bind(patch.password_hash.flatten())
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn delete(&self, slug: &str, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM links WHERE slug = $1 AND user_id = $2")
            .bind(slug)
            .bind(user_id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn record_click(&self, link_id: i64) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE links
            SET click_count = click_count + 1,
                last_click_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(link_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("docs"), "%docs%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
