//! Subscription plans and the quotas attached to them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Subscription tier of a user.
///
/// Serialized in upper case (`"FREE"`, `"PRO"`, ...), which is also the
/// representation stored in the `users.plan` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanType {
    #[default]
    Free,
    Pro,
    Business,
    Enterprise,
}

impl PlanType {
    pub const ALL: [PlanType; 4] = [Self::Free, Self::Pro, Self::Business, Self::Enterprise];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "FREE",
            Self::Pro => "PRO",
            Self::Business => "BUSINESS",
            Self::Enterprise => "ENTERPRISE",
        }
    }

    /// Feature matrix for this plan.
    pub fn limits(self) -> PlanLimits {
        match self {
            Self::Free => PlanLimits {
                max_links: Some(5),
                custom_slug: false,
                password_protection: false,
                analytics_days: 7,
                qr_customization: false,
            },
            Self::Pro => PlanLimits {
                max_links: Some(100),
                custom_slug: true,
                password_protection: true,
                analytics_days: 30,
                qr_customization: true,
            },
            Self::Business => PlanLimits {
                max_links: Some(1000),
                custom_slug: true,
                password_protection: true,
                analytics_days: 90,
                qr_customization: true,
            },
            Self::Enterprise => PlanLimits {
                max_links: None,
                custom_slug: true,
                password_protection: true,
                analytics_days: 365,
                qr_customization: true,
            },
        }
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown plan name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown plan '{0}'")]
pub struct UnknownPlan(pub String);

impl FromStr for PlanType {
    type Err = UnknownPlan;

    /// Parses a plan name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|plan| plan.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownPlan(s.to_string()))
    }
}

/// Quotas and feature flags of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanLimits {
    /// Maximum number of links; `None` means unlimited.
    pub max_links: Option<u32>,
    pub custom_slug: bool,
    pub password_protection: bool,
    /// Days of click history kept for analytics.
    pub analytics_days: u32,
    pub qr_customization: bool,
}

/// Returns true if a user on `plan` who already owns `current_links` links may create another.
pub fn can_create_link(plan: PlanType, current_links: u64) -> bool {
    match plan.limits().max_links {
        None => true,
        Some(max) => current_links < u64::from(max),
    }
}

pub fn can_use_custom_slug(plan: PlanType) -> bool {
    plan.limits().custom_slug
}

pub fn can_use_password_protection(plan: PlanType) -> bool {
    plan.limits().password_protection
}
