//! Google sign-in via the authorization code flow with PKCE.

use anyhow::{Context, Result};
use async_trait::async_trait;
use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use serde::Deserialize;
use serde_json::json;

use crate::domain::identity::{AuthorizationRequest, IdentityProvider};
use crate::domain::session::OAuthProfile;
use crate::error::AppError;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const SCOPES: [&str; 3] = ["openid", "email", "profile"];

type GoogleClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// OAuth client credentials registered in the Google Cloud console.
#[derive(Debug, Clone)]
pub struct GoogleSettings {
    pub client_id: String,
    pub client_secret: String,
    /// Must match an authorized redirect URI, e.g.
    /// `https://injo.me/api/auth/callback/google`.
    pub redirect_url: String,
}

/// Google OpenID Connect provider.
pub struct GoogleProvider {
    client: GoogleClient,
    http: reqwest::Client,
}

/// Claims returned by the userinfo endpoint.
#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    email: String,
    #[serde(default)]
    email_verified: bool,
    name: Option<String>,
    picture: Option<String>,
}

impl GoogleUserInfo {
    fn into_profile(self) -> Result<OAuthProfile, AppError> {
        if !self.email_verified {
            return Err(AppError::unauthorized(
                "Email not verified",
                json!({ "provider": "google", "email": self.email }),
            ));
        }

        Ok(OAuthProfile {
            provider: "google".to_string(),
            email: self.email,
            name: self.name,
            image: self.picture,
        })
    }
}

fn upstream(stage: &'static str, e: impl std::fmt::Display) -> AppError {
    tracing::warn!(provider = "google", stage, error = %e, "OAuth request failed");
    AppError::unavailable(
        "Sign-in provider unavailable",
        json!({ "provider": "google", "stage": stage }),
    )
}

impl GoogleProvider {
    /// Builds the provider client.
    ///
    /// # Errors
    ///
    /// Returns an error if `redirect_url` is not an absolute URL or the HTTP
    /// client cannot be created.
    pub fn new(settings: GoogleSettings) -> Result<Self> {
        let client = BasicClient::new(ClientId::new(settings.client_id))
            .set_client_secret(ClientSecret::new(settings.client_secret))
            .set_auth_uri(AuthUrl::new(AUTH_URL.to_string())?)
            .set_token_uri(TokenUrl::new(TOKEN_URL.to_string())?)
            .set_redirect_uri(
                RedirectUrl::new(settings.redirect_url).context("Invalid OAuth redirect URL")?,
            );

        // The token endpoint must not be followed across redirects.
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("Failed to build OAuth HTTP client")?;

        Ok(Self { client, http })
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    fn authorization_request(&self) -> AuthorizationRequest {
        let (challenge, verifier) = PkceCodeChallenge::new_random_sha256();

        let (url, state) = self
            .client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(SCOPES.map(|s| Scope::new(s.to_string())))
            .add_extra_param("prompt", "consent")
            .add_extra_param("access_type", "offline")
            .set_pkce_challenge(challenge)
            .url();

        AuthorizationRequest {
            url: url.to_string(),
            state: state.secret().clone(),
            pkce_verifier: verifier.secret().clone(),
        }
    }

    async fn exchange(&self, code: &str, pkce_verifier: &str) -> Result<OAuthProfile, AppError> {
        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier.to_string()))
            .request_async(&self.http)
            .await
            .map_err(|e| {
                tracing::warn!(provider = "google", error = %e, "authorization code rejected");
                AppError::unauthorized(
                    "Sign-in was not completed",
                    json!({ "provider": "google" }),
                )
            })?;

        let info: GoogleUserInfo = self
            .http
            .get(USERINFO_URL)
            .bearer_auth(token.access_token().secret())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| upstream("userinfo", e))?
            .json()
            .await
            .map_err(|e| upstream("userinfo", e))?;

        info.into_profile()
    }
}
