use link_shortener::domain::entities::{LinkFilter, LinkListQuery, LinkPatch, LinkSort, NewLink};
use link_shortener::domain::repositories::{LinkRepository, UserRepository};
use link_shortener::domain::session::OAuthProfile;
use link_shortener::error::AppError;
use link_shortener::infrastructure::persistence::{PgLinkRepository, PgUserRepository};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

async fn create_test_user(pool: &PgPool, email: &str) -> Uuid {
    let repo = PgUserRepository::new(Arc::new(pool.clone()));
    repo.upsert_from_profile(&OAuthProfile {
        provider: "google".to_string(),
        email: email.to_string(),
        name: None,
        image: None,
    })
    .await
    .unwrap()
    .id
}

fn new_link(slug: &str, user_id: Uuid) -> NewLink {
    NewLink {
        slug: slug.to_string(),
        original_url: format!("https://example.com/{slug}"),
        title: None,
        description: None,
        tags: vec![],
        user_id,
        expires_at: None,
        password_hash: None,
    }
}

fn page(filter: LinkFilter) -> LinkListQuery {
    LinkListQuery {
        filter,
        sort: LinkSort::CreatedAt,
        descending: true,
        offset: 0,
        limit: 10,
    }
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_create_and_find_link(pool: PgPool) {
    let user_id = create_test_user(&pool, "ann@example.com").await;
    let repo = PgLinkRepository::new(Arc::new(pool));

    let mut link = new_link("abc123", user_id);
    link.tags = vec!["rust".to_string()];
    let created = repo.create(link).await.unwrap();

    assert_eq!(created.slug, "abc123");
    assert!(created.is_active);
    assert_eq!(created.click_count, 0);
    assert_eq!(created.tags, vec!["rust".to_string()]);

    let found = repo.find_by_slug("abc123").await.unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert!(repo.slug_exists("abc123").await.unwrap());
    assert!(!repo.slug_exists("ABC123").await.unwrap());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_slug_is_conflict(pool: PgPool) {
    let user_id = create_test_user(&pool, "ann@example.com").await;
    let repo = PgLinkRepository::new(Arc::new(pool));

    repo.create(new_link("dup", user_id)).await.unwrap();
    let result = repo.create(new_link("dup", user_id)).await;

    assert!(matches!(result.unwrap_err(), AppError::Conflict { .. }));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_list_filters_and_counts(pool: PgPool) {
    let ann = create_test_user(&pool, "ann@example.com").await;
    let bob = create_test_user(&pool, "bob@example.com").await;
    let repo = PgLinkRepository::new(Arc::new(pool));

    let mut docs = new_link("docs", ann);
    docs.title = Some("Rust 100% Docs".to_string());
    docs.tags = vec!["rust".to_string()];
    repo.create(docs).await.unwrap();
    repo.create(new_link("other", ann)).await.unwrap();
    repo.create(new_link("bobs", bob)).await.unwrap();

    assert_eq!(repo.count_for_user(ann, LinkFilter::default()).await.unwrap(), 2);

    let search = LinkFilter {
        search: Some("100%".to_string()),
        tag: None,
    };
    let links = repo.list_for_user(ann, page(search.clone())).await.unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].slug, "docs");
    assert_eq!(repo.count_for_user(ann, search).await.unwrap(), 1);

    let tag = LinkFilter {
        search: None,
        tag: Some("rust".to_string()),
    };
    assert_eq!(repo.count_for_user(ann, tag).await.unwrap(), 1);

    let all = repo.list_for_user(ann, page(LinkFilter::default())).await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|l| l.user_id == ann));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_update_is_scoped_to_owner(pool: PgPool) {
    let ann = create_test_user(&pool, "ann@example.com").await;
    let bob = create_test_user(&pool, "bob@example.com").await;
    let repo = PgLinkRepository::new(Arc::new(pool));

    let mut link = new_link("mine", ann);
    link.password_hash = Some("$2b$12$hash".to_string());
    repo.create(link).await.unwrap();

    let patch = LinkPatch {
        title: Some("Renamed".to_string()),
        password_hash: Some(None),
        ..Default::default()
    };

    assert!(repo.update("mine", bob, patch.clone()).await.unwrap().is_none());

    let updated = repo.update("mine", ann, patch).await.unwrap().unwrap();
    assert_eq!(updated.title.as_deref(), Some("Renamed"));
    assert!(updated.password_hash.is_none());
    assert_eq!(updated.original_url, "https://example.com/mine");
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_record_click_and_delete(pool: PgPool) {
    let ann = create_test_user(&pool, "ann@example.com").await;
    let repo = PgLinkRepository::new(Arc::new(pool));

    let link = repo.create(new_link("clicky", ann)).await.unwrap();
    repo.record_click(link.id).await.unwrap();
    repo.record_click(link.id).await.unwrap();

    let found = repo.find_by_slug("clicky").await.unwrap().unwrap();
    assert_eq!(found.click_count, 2);
    assert!(found.last_click_at.is_some());

    assert!(repo.delete("clicky", ann).await.unwrap());
    assert!(!repo.delete("clicky", ann).await.unwrap());
    assert!(repo.find_by_slug("clicky").await.unwrap().is_none());
}
