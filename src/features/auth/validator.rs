use super::model::AuthenticatedUser;
use crate::core::error::AppError;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::jwks::JwksClient;

/// Verifies Google ID tokens issued for this application's OAuth client
pub struct JwtValidator {
    jwks_client: Arc<JwksClient>,
    issuers: Vec<String>,
    audience: String,
    leeway: u64,
}

/// Claims of a Google ID token; `iss`, `aud` and `exp` are checked by jsonwebtoken
#[derive(Debug, Clone, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<bool>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        // Unverified addresses are not shown to other users
        let email = claims.email.filter(|_| claims.email_verified != Some(false));
        Self {
            sub: claims.sub,
            email,
            name: claims.name,
            picture: claims.picture,
        }
    }
}

impl JwtValidator {
    pub fn new(
        jwks_client: Arc<JwksClient>,
        issuers: Vec<String>,
        audience: String,
        leeway: Duration,
    ) -> Self {
        Self {
            jwks_client,
            issuers,
            audience,
            leeway: leeway.as_secs(),
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(self.issuers.as_slice());
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = self.leeway;
        validation
    }

    pub async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let header = decode_header(token).map_err(|e| AppError::Auth(e.to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(AppError::Auth(format!(
                "Unsupported algorithm: {:?}. Only RS256 is allowed",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| AppError::Auth("Missing kid in token header".to_string()))?;

        let decoding_key = self.jwks_client.get_key(&kid).await.map_err(|e| {
            tracing::warn!("Signing key lookup failed for kid {}: {}", kid, e);
            AppError::Auth(e.to_string())
        })?;

        let token_data = decode::<Claims>(token, &decoding_key, &self.validation())
            .map_err(|e| AppError::Auth(e.to_string()))?;

        Ok(token_data.claims.into())
    }
}
