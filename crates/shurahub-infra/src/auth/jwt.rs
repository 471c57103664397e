//! HS256 session-token verification.
//!
//! Tokens come from the `user-session` cookie. A token is accepted when its
//! signature, expiry and audience check out; its `sub` claim is the user id.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use shurahub_core::identity::IdentityResolver;
use shurahub_types::config::AuthSettings;
use shurahub_types::error::IdentityError;

#[derive(Debug, Deserialize)]
struct SessionClaims {
    #[serde(default)]
    sub: Option<String>,
}

/// Verifies session tokens against a shared HS256 secret.
///
/// Does NOT derive Debug so the decoding key never reaches a log line.
pub struct JwtIdentityResolver {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityResolver {
    pub fn new(secret: &SecretString, audience: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[audience]);
        Self {
            key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation,
        }
    }

    /// Build a resolver when the secret variable named in `settings` is set.
    ///
    /// `None` means every connection is a guest.
    pub fn from_settings<F>(settings: &AuthSettings, lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup(&settings.jwt_secret_env).filter(|s| !s.trim().is_empty())?;
        Some(Self::new(&SecretString::from(secret), &settings.audience))
    }
}

impl IdentityResolver for JwtIdentityResolver {
    fn verify(&self, token: &str) -> Result<String, IdentityError> {
        let data = decode::<SessionClaims>(token, &self.key, &self.validation)
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

        match data.claims.sub {
            Some(sub) if !sub.is_empty() => Ok(sub),
            _ => Err(IdentityError::MissingSubject),
        }
    }
}
