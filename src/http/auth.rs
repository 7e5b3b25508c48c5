use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use pasetors::claims::{Claims, ClaimsValidationRules};
use pasetors::keys::SymmetricKey;
use pasetors::token::UntrustedToken;
use pasetors::{local, version4::V4, Local};

use crate::http::AppError;
use crate::AppState;

/// Verified caller identity minted by the external auth provider. This is
/// the provider's view of the caller, not a local user row; handlers resolve
/// it against the users table themselves.
#[derive(Debug, Clone)]
pub struct Identity {
    pub token_identifier: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub picture_url: Option<String>,
}

const TOKEN_ISSUER: &str = "quill-auth";

#[axum::async_trait]
impl FromRequestParts<AppState> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("invalid Authorization header"))?;

        let claims = decrypt_claims(token, &state.identity_key)
            .ok_or_else(|| AppError::unauthorized("invalid identity token"))?;

        let token_identifier = claims
            .get_claim("sub")
            .and_then(|value| value.as_str())
            .ok_or_else(|| AppError::unauthorized("invalid identity token"))?
            .to_string();

        Ok(Identity {
            token_identifier,
            name: optional_claim(&claims, "name"),
            email: optional_claim(&claims, "email"),
            picture_url: optional_claim(&claims, "picture"),
        })
    }
}

fn decrypt_claims(token: &str, key_bytes: &[u8; 32]) -> Option<Claims> {
    let key = SymmetricKey::<V4>::from(key_bytes).ok()?;
    let mut rules = ClaimsValidationRules::new();
    rules.validate_issuer_with(TOKEN_ISSUER);

    let untrusted = UntrustedToken::<Local, V4>::try_from(token).ok()?;
    let trusted = local::decrypt(&key, &untrusted, &rules, None, None).ok()?;
    trusted.payload_claims().cloned()
}

fn optional_claim(claims: &Claims, name: &str) -> Option<String> {
    claims
        .get_claim(name)
        .and_then(|value| value.as_str())
        .map(|value| value.to_string())
}
