use anyhow::Context;
use serde::Deserialize;
use subtle::ConstantTimeEq;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    /// `None` issues tokens without an `exp` claim.
    pub ttl_minutes: Option<i64>,
}

/// The single operator account checked by `/admin`.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
}

impl AdminConfig {
    /// Constant-time in the content of both fields; only lengths can leak.
    pub fn matches(&self, email: &str, password: &str) -> bool {
        let email_ok = self.email.as_bytes().ct_eq(email.as_bytes());
        let password_ok = self.password.as_bytes().ct_eq(password.as_bytes());
        (email_ok & password_ok).into()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// Empty host puts the mailer in no-op mode.
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_starttls: bool,
    pub smtp_email: String,
    pub smtp_password: String,
    pub brand: String,
}

/// Ten years.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365 * 10;

/// Unset, empty or `0` disables expiry.
fn parse_ttl_minutes(raw: Option<&str>) -> anyhow::Result<Option<i64>> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    let minutes = raw
        .parse::<i64>()
        .with_context(|| format!("JWT_TTL_MINUTES is not an integer: {raw}"))?;
    match minutes {
        0 => Ok(None),
        1..=MAX_TTL_MINUTES => Ok(Some(minutes)),
        _ => anyhow::bail!("JWT_TTL_MINUTES must be between 0 and {MAX_TTL_MINUTES}, got {minutes}"),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub admin: Option<AdminConfig>,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "storefront-auth".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "storefront-users".into()),
            ttl_minutes: parse_ttl_minutes(std::env::var("JWT_TTL_MINUTES").ok().as_deref())?,
        };

        let admin = match (std::env::var("ADMIN_EMAIL"), std::env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) if !email.is_empty() && !password.is_empty() => {
                Some(AdminConfig { email, password })
            }
            _ => None,
        };

        let mail = MailConfig {
            smtp_host: std::env::var("SMTP_HOST").unwrap_or_default(),
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(465),
            smtp_starttls: std::env::var("SMTP_STARTTLS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            smtp_email: std::env::var("SMTP_EMAIL").unwrap_or_default(),
            smtp_password: std::env::var("SMTP_PASS").unwrap_or_default(),
            brand: std::env::var("MAIL_BRAND").unwrap_or_else(|_| "TrendifyNow".into()),
        };

        Ok(Self {
            database_url,
            jwt,
            admin,
            mail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_parsing() {
        assert_eq!(parse_ttl_minutes(None).unwrap(), None);
        assert_eq!(parse_ttl_minutes(Some("")).unwrap(), None);
        assert_eq!(parse_ttl_minutes(Some("0")).unwrap(), None);
        assert_eq!(parse_ttl_minutes(Some("60")).unwrap(), Some(60));
        assert_eq!(
            parse_ttl_minutes(Some(&MAX_TTL_MINUTES.to_string())).unwrap(),
            Some(MAX_TTL_MINUTES)
        );
    }

    #[test]
    fn ttl_out_of_range_is_a_config_error() {
        assert!(parse_ttl_minutes(Some("-5")).is_err());
        assert!(parse_ttl_minutes(Some("1000000000000")).is_err());
        assert!(parse_ttl_minutes(Some("forever")).is_err());
    }

    #[test]
    fn admin_matches_only_exact_pair() {
        let admin = AdminConfig {
            email: "admin@shop.test".into(),
            password: "hunter22".into(),
        };
        assert!(admin.matches("admin@shop.test", "hunter22"));
        assert!(!admin.matches("Admin@shop.test", "hunter22"));
        assert!(!admin.matches("admin@shop.test", "hunter2"));
        assert!(!admin.matches("", ""));
    }
}
