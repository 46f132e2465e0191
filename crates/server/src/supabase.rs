//! Thin client for the Supabase Auth (GoTrue) REST API.
//!
//! Only the endpoints the API needs are wrapped: sign-up, the password and
//! refresh-token grants, logout, and admin user deletion (used to roll back a
//! sign-up whose local user row could not be written).

use serde::{Deserialize, Serialize};
use shared_types::{AppError, SessionTokens};
use uuid::Uuid;

use crate::config::env_nonempty;

#[derive(Debug, thiserror::Error)]
pub enum SupabaseError {
    #[error("Supabase request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Supabase API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Supabase service role key is not configured")]
    MissingServiceKey,
    #[error("unexpected Supabase response: {0}")]
    InvalidResponse(String),
}

impl SupabaseError {
    /// True for 400/401 answers to a credential grant.
    pub fn is_credential_rejection(&self) -> bool {
        matches!(self, SupabaseError::Api { status, .. } if *status == 400 || *status == 401)
    }
}

impl From<SupabaseError> for AppError {
    fn from(err: SupabaseError) -> Self {
        match &err {
            SupabaseError::Api { status: 429, .. } => {
                AppError::rate_limited("Too many authentication attempts")
            }
            SupabaseError::Api { status, message } if (400..500).contains(status) => {
                AppError::bad_request(message.clone())
            }
            _ => AppError::external("Authentication provider unavailable").with_detail(&err),
        }
    }
}

/// A Supabase auth user, as returned inside auth responses.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Session payload returned by the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub user: AuthUser,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl From<AuthSession> for SessionTokens {
    fn from(s: AuthSession) -> Self {
        SessionTokens {
            access_token: s.access_token,
            refresh_token: s.refresh_token,
            expires_in: s.expires_in,
            token_type: s.token_type,
        }
    }
}

/// Sign-up answers with a session when email confirmation is disabled, or
/// with the bare user object when it is enabled.
#[derive(Debug, Deserialize)]
struct SignUpBody {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    user: Option<AuthUser>,
    #[serde(default)]
    id: Option<Uuid>,
}

/// Result of a sign-up call.
#[derive(Debug, Clone)]
pub struct SignUpResult {
    pub user_id: Uuid,
    pub session: Option<SessionTokens>,
}

impl SignUpBody {
    fn into_result(self) -> Result<SignUpResult, SupabaseError> {
        let user_id = self
            .user
            .as_ref()
            .map(|u| u.id)
            .or(self.id)
            .ok_or_else(|| SupabaseError::InvalidResponse("sign-up response has no user id".into()))?;

        let session = match (self.access_token, self.refresh_token) {
            (Some(access_token), Some(refresh_token)) => Some(SessionTokens {
                access_token,
                refresh_token,
                expires_in: self.expires_in.unwrap_or_default(),
                token_type: self.token_type.unwrap_or_else(default_token_type),
            }),
            _ => None,
        };

        Ok(SignUpResult { user_id, session })
    }
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SignUpPayload<'a> {
    email: &'a str,
    password: &'a str,
    data: serde_json::Value,
}

/// Pull a human message out of a GoTrue error body. GoTrue has used
/// `error_description`, `msg` and `message` across versions.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|k| v.get(*k).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

/// Supabase Auth REST client.
pub struct SupabaseAuth {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    service_role_key: Option<String>,
}

impl SupabaseAuth {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>, service_role_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            service_role_key,
        }
    }

    /// Build from `SUPABASE_URL`, `SUPABASE_ANON_KEY` and the optional
    /// `SUPABASE_SERVICE_ROLE_KEY`. `None` when the first two are missing.
    pub fn from_env() -> Option<Self> {
        let url = env_nonempty("SUPABASE_URL")?;
        let anon = env_nonempty("SUPABASE_ANON_KEY")?;
        Some(Self::new(url, anon, env_nonempty("SUPABASE_SERVICE_ROLE_KEY")))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, SupabaseError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(SupabaseError::Api {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }

    #[tracing::instrument(skip(self, password, metadata))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: serde_json::Value,
    ) -> Result<SignUpResult, SupabaseError> {
        let response = self
            .http
            .post(self.url("signup"))
            .header("apikey", &self.anon_key)
            .json(&SignUpPayload { email, password, data: metadata })
            .send()
            .await?;
        let body: SignUpBody = Self::check(response).await?.json().await?;
        body.into_result()
    }

    #[tracing::instrument(skip(self, password))]
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, SupabaseError> {
        let response = self
            .http
            .post(self.url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&Credentials { email, password })
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    #[tracing::instrument(skip_all)]
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, SupabaseError> {
        let response = self
            .http
            .post(self.url("token"))
            .query(&[("grant_type", "refresh_token")])
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Revoke the session behind `access_token`.
    #[tracing::instrument(skip_all)]
    pub async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError> {
        let response = self
            .http
            .post(self.url("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Delete an auth user. Requires the service role key.
    #[tracing::instrument(skip(self))]
    pub async fn admin_delete_user(&self, user_id: Uuid) -> Result<(), SupabaseError> {
        let key = self
            .service_role_key
            .as_deref()
            .ok_or(SupabaseError::MissingServiceKey)?;
        let response = self
            .http
            .delete(self.url(&format!("admin/users/{user_id}")))
            .header("apikey", key)
            .bearer_auth(key)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
