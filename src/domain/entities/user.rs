//! User entity created on first OAuth sign-in.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::plan::PlanType;

/// An account known to the service.
///
/// Users are keyed by email: signing in again with the same provider
/// identity updates `name` and `image` but keeps the plan.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub plan: PlanType,
    pub locale: String,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
}
