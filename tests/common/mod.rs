#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{Duration, Utc};
use link_shortener::application::services::{AuthService, LinkService, SessionSettings};
use link_shortener::domain::entities::{
    Link, LinkFilter, LinkListQuery, LinkPatch, LinkSort, NewLink, User,
};
use link_shortener::domain::identity::{AuthorizationRequest, IdentityProvider, IdentityProviders};
use link_shortener::domain::plan::PlanType;
use link_shortener::domain::repositories::{LinkRepository, UserRepository};
use link_shortener::domain::session::OAuthProfile;
use link_shortener::error::AppError;
use link_shortener::routes::{RateLimit, router};
use link_shortener::state::AppState;
use link_shortener::utils::slug_generator::SeededSource;
use link_shortener::utils::urls::ShortUrls;
use serde_json::json;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::Arc;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Link storage backed by a vector, mirroring the PostgreSQL semantics the
/// services rely on (unique slugs, owner scoping, NULLS LAST title sort).
#[derive(Default)]
pub struct InMemoryLinks {
    links: Mutex<Vec<Link>>,
}

impl InMemoryLinks {
    pub fn get(&self, slug: &str) -> Option<Link> {
        self.links
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.slug == slug)
            .cloned()
    }

    /// Mutates a stored link in place, e.g. to backdate `expires_at`.
    pub fn edit(&self, slug: &str, f: impl FnOnce(&mut Link)) {
        let mut links = self.links.lock().unwrap();
        let link = links.iter_mut().find(|l| l.slug == slug).unwrap();
        f(link);
    }

    pub fn len(&self) -> usize {
        self.links.lock().unwrap().len()
    }
}

fn compare(sort: LinkSort, a: &Link, b: &Link) -> Ordering {
    match sort {
        LinkSort::CreatedAt => a.created_at.cmp(&b.created_at),
        LinkSort::ClickCount => a.click_count.cmp(&b.click_count),
        LinkSort::Title => a.title.cmp(&b.title),
    }
    .then(a.id.cmp(&b.id))
}

#[async_trait]
impl LinkRepository for InMemoryLinks {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut links = self.links.lock().unwrap();
        if links.iter().any(|l| l.slug == new_link.slug) {
            return Err(AppError::conflict(
                "Slug already taken",
                json!({ "slug": new_link.slug }),
            ));
        }

        let now = Utc::now() + Duration::milliseconds(links.len() as i64);
        let link = Link {
            id: links.len() as i64 + 1,
            slug: new_link.slug,
            original_url: new_link.original_url,
            title: new_link.title,
            description: new_link.description,
            tags: new_link.tags,
            user_id: new_link.user_id,
            is_active: true,
            expires_at: new_link.expires_at,
            password_hash: new_link.password_hash,
            click_count: 0,
            last_click_at: None,
            created_at: now,
            updated_at: now,
        };
        links.push(link.clone());
        Ok(link)
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, AppError> {
        Ok(self.get(slug).is_some())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Link>, AppError> {
        Ok(self.get(slug))
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        query: LinkListQuery,
    ) -> Result<Vec<Link>, AppError> {
        let mut owned: Vec<Link> = self
            .links
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.user_id == user_id && query.filter.matches(l))
            .cloned()
            .collect();

        owned.sort_by(|a, b| {
            let ord = compare(query.sort, a, b);
            if query.descending { ord.reverse() } else { ord }
        });

        Ok(owned
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect())
    }

    async fn count_for_user(&self, user_id: Uuid, filter: LinkFilter) -> Result<i64, AppError> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.user_id == user_id && filter.matches(l))
            .count() as i64)
    }

    async fn update(
        &self,
        slug: &str,
        user_id: Uuid,
        patch: LinkPatch,
    ) -> Result<Option<Link>, AppError> {
        let mut links = self.links.lock().unwrap();
        let Some(link) = links
            .iter_mut()
            .find(|l| l.slug == slug && l.user_id == user_id)
        else {
            return Ok(None);
        };

        if let Some(url) = patch.original_url {
            link.original_url = url;
        }
        if let Some(title) = patch.title {
            link.title = Some(title);
        }
        if let Some(description) = patch.description {
            link.description = Some(description);
        }
        if let Some(tags) = patch.tags {
            link.tags = tags;
        }
        if let Some(active) = patch.is_active {
            link.is_active = active;
        }
        if let Some(expires_at) = patch.expires_at {
            link.expires_at = expires_at;
        }
        if let Some(hash) = patch.password_hash {
            link.password_hash = hash;
        }
        link.updated_at = Utc::now();

        Ok(Some(link.clone()))
    }

    async fn delete(&self, slug: &str, user_id: Uuid) -> Result<bool, AppError> {
        let mut links = self.links.lock().unwrap();
        let before = links.len();
        links.retain(|l| !(l.slug == slug && l.user_id == user_id));
        Ok(links.len() < before)
    }

    async fn record_click(&self, link_id: i64) -> Result<(), AppError> {
        let mut links = self.links.lock().unwrap();
        if let Some(link) = links.iter_mut().find(|l| l.id == link_id) {
            link.click_count += 1;
            link.last_click_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// User storage keyed by id.
#[derive(Default)]
pub struct InMemoryUsers {
    users: Mutex<HashMap<Uuid, User>>,
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn upsert_from_profile(&self, profile: &OAuthProfile) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.values_mut().find(|u| u.email == profile.email) {
            user.name = profile.name.clone().or(user.name.take());
            user.image = profile.image.clone().or(user.image.take());
            return Ok(user.clone());
        }

        let user = User {
            id: Uuid::new_v4(),
            email: profile.email.clone(),
            name: profile.name.clone(),
            image: profile.image.clone(),
            plan: PlanType::Free,
            locale: "en".to_string(),
            timezone: "UTC".to_string(),
            created_at: Utc::now(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update_preferences(
        &self,
        id: Uuid,
        locale: &str,
        timezone: &str,
    ) -> Result<(), AppError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("User not found", json!({})))?;
        user.locale = locale.to_string();
        user.timezone = timezone.to_string();
        Ok(())
    }

    async fn set_plan(&self, id: Uuid, plan: PlanType) -> Result<(), AppError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("User not found", json!({})))?;
        user.plan = plan;
        Ok(())
    }

    async fn list(&self, limit: i64) -> Result<Vec<User>, AppError> {
        let mut users: Vec<User> = self.users.lock().unwrap().values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        users.truncate(limit as usize);
        Ok(users)
    }
}

/// OAuth provider that accepts a single scripted code.
pub struct StubProvider;

impl StubProvider {
    pub const STATE: &'static str = "state-4f1c";
    pub const VERIFIER: &'static str = "verifier-9a7e";
    pub const CODE: &'static str = "code-granted";
    pub const EMAIL: &'static str = "oauth@example.com";
}

#[async_trait]
impl IdentityProvider for StubProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    fn authorization_request(&self) -> AuthorizationRequest {
        AuthorizationRequest {
            url: format!("https://accounts.example.com/authorize?state={}", Self::STATE),
            state: Self::STATE.to_string(),
            pkce_verifier: Self::VERIFIER.to_string(),
        }
    }

    async fn exchange(&self, code: &str, pkce_verifier: &str) -> Result<OAuthProfile, AppError> {
        if code != Self::CODE || pkce_verifier != Self::VERIFIER {
            return Err(AppError::unauthorized("Sign-in was not completed", json!({})));
        }
        Ok(OAuthProfile {
            provider: "google".to_string(),
            email: Self::EMAIL.to_string(),
            name: Some("OAuth User".to_string()),
            image: Some("https://example.com/avatar.png".to_string()),
        })
    }
}

/// A running app over in-memory storage.
pub struct TestApp {
    pub server: TestServer,
    pub links: Arc<InMemoryLinks>,
    pub users: Arc<InMemoryUsers>,
    pub auth: Arc<AuthService>,
}

pub fn session_settings() -> SessionSettings {
    SessionSettings {
        secret: TEST_SECRET.to_string(),
        max_age: Duration::days(30),
        default_locale: "ru".to_string(),
        default_timezone: "Asia/Dushanbe".to_string(),
    }
}

pub fn create_test_app() -> TestApp {
    let links = Arc::new(InMemoryLinks::default());
    let users = Arc::new(InMemoryUsers::default());

    let link_service = Arc::new(LinkService::new(
        links.clone(),
        users.clone(),
        Arc::new(SeededSource::new(42)),
        ShortUrls::new("injo.me", false),
    ));
    let auth = Arc::new(AuthService::new(users.clone(), session_settings()));

    let providers = IdentityProviders::new().register(Arc::new(StubProvider));
    let state = AppState::new(link_service, auth.clone(), Arc::new(providers));
    let server = TestServer::new(router(state, RateLimit::Disabled)).unwrap();

    TestApp {
        server,
        links,
        users,
        auth,
    }
}

impl TestApp {
    /// Signs in `email` on the FREE plan and returns the user and token.
    pub async fn sign_in(&self, email: &str) -> (User, String) {
        let signed_in = self
            .auth
            .sign_in(&OAuthProfile {
                provider: "google".to_string(),
                email: email.to_string(),
                name: Some("Test User".to_string()),
                image: None,
            })
            .await
            .unwrap();
        (signed_in.user, signed_in.token)
    }

    /// Signs in `email` and moves the account to `plan`.
    pub async fn sign_in_with_plan(&self, email: &str, plan: PlanType) -> (User, String) {
        let (user, token) = self.sign_in(email).await;
        self.users.set_plan(user.id, plan).await.unwrap();
        (user, token)
    }
}
