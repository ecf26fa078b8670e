use std::time::Duration;

use anyhow::Context;
use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{
    auth::claims::{Claims, TokenKind},
    config::JwtConfig,
    state::AppState,
};

/// Holds JWT signing and verification keys with config data.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Option<Duration>,
}

impl From<&JwtConfig> for JwtKeys {
    fn from(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            // Out-of-range values saturate so that signing fails instead of wrapping.
            ttl: cfg.ttl_minutes.map(|m| {
                let secs = u64::try_from(m)
                    .ok()
                    .and_then(|m| m.checked_mul(60))
                    .unwrap_or(u64::MAX);
                Duration::from_secs(secs)
            }),
        }
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::from(&state.config.jwt)
    }
}

impl JwtKeys {
    fn sign(&self, sub: String, kind: TokenKind) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = match self.ttl {
            Some(ttl) => {
                let exp = TimeDuration::try_from(ttl)
                    .ok()
                    .and_then(|ttl| now.checked_add(ttl))
                    .context("token ttl out of range")?;
                Some(exp.unix_timestamp() as usize)
            }
            None => None,
        };
        let claims = Claims {
            sub,
            iat: now.unix_timestamp() as usize,
            exp,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            kind,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(sub = %claims.sub, kind = ?kind, "jwt signed");
        Ok(token)
    }

    pub fn sign_user(&self, user_id: Uuid) -> anyhow::Result<String> {
        self.sign(user_id.to_string(), TokenKind::User)
    }

    /// The subject is the admin email; credentials never go into the payload.
    pub fn sign_admin(&self, email: &str) -> anyhow::Result<String> {
        self.sign(email.to_string(), TokenKind::Admin)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        match self.ttl {
            Some(_) => validation.set_required_spec_claims(&["exp"]),
            None => validation.required_spec_claims.clear(),
        }
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(sub = %data.claims.sub, kind = ?data.claims.kind, "jwt verified");
        Ok(data.claims)
    }

    /// Verifies a user token and returns the user id it was issued for.
    pub fn verify_user(&self, token: &str) -> anyhow::Result<Uuid> {
        let claims = self.verify(token)?;
        if claims.kind != TokenKind::User {
            anyhow::bail!("not a user token");
        }
        Ok(claims.sub.parse::<Uuid>()?)
    }
}
