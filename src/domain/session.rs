//! Signed-in identity: provider profiles, token claims and session views.
//!
//! The OAuth handshake itself is performed by the provider library. This
//! module starts where it ends: with an [`OAuthProfile`] whose email has
//! already been verified by the provider.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::User;
use crate::domain::plan::PlanType;

/// Identity handed over by the OAuth provider after a successful callback.
#[derive(Debug, Clone, PartialEq)]
pub struct OAuthProfile {
    pub provider: String,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
}

/// Claims carried by the HS256 session token.
///
/// `plan` falls back to [`PlanType::Free`] when absent so tokens minted
/// before plans existed stay valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub plan: PlanType,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    /// Builds claims for `user`, valid for `max_age` from `issued_at`.
    pub fn for_user(user: &User, issued_at: DateTime<Utc>, max_age: Duration) -> Self {
        Self {
            sub: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            image: user.image.clone(),
            plan: user.plan,
            iat: issued_at.timestamp(),
            exp: (issued_at + max_age).timestamp(),
        }
    }

    /// Shapes the claims into the session view exposed to handlers and clients.
    pub fn into_session(self) -> Session {
        let expires = Utc
            .timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        Session {
            user: SessionUser {
                id: self.sub,
                email: self.email,
                name: self.name,
                image: self.image,
                plan: self.plan,
            },
            expires,
        }
    }
}

/// User fields exposed through the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub plan: PlanType,
}

/// An authenticated session, resolved from a verified token.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: SessionUser,
    pub expires: DateTime<Utc>,
}
