use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audience Supabase stamps on access tokens for signed-in users.
pub const SUPABASE_AUDIENCE: &str = "authenticated";

/// Claims carried in a Supabase access token. Only the fields the API
/// reads are modelled; the rest are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseClaims {
    /// Supabase auth user id, equal to `users.id`.
    pub sub: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    /// Postgres role, `authenticated` for signed-in users.
    #[serde(default)]
    pub role: Option<String>,
    pub aud: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("SUPABASE_JWT_SECRET is not configured")]
    MissingSecret,
    #[error(transparent)]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

fn jwt_secret() -> Option<String> {
    std::env::var("SUPABASE_JWT_SECRET")
        .ok()
        .filter(|s| !s.is_empty())
}

/// Validate a Supabase access token (HS256, audience `authenticated`)
/// using `SUPABASE_JWT_SECRET`.
pub fn validate_access_token(token: &str) -> Result<SupabaseClaims, TokenError> {
    let secret = jwt_secret().ok_or(TokenError::MissingSecret)?;
    validate_with_secret(token, &secret)
}

/// Validate against an explicit secret.
pub fn validate_with_secret(token: &str, secret: &str) -> Result<SupabaseClaims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[SUPABASE_AUDIENCE]);
    validation.set_required_spec_claims(&["exp", "sub", "aud"]);

    let data = decode::<SupabaseClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}
