use anyhow::Context;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, Message},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
};
use tracing::{info, warn};

use crate::config::MailConfig;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_html(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()>;
}

/// Subject and HTML body of the password reset mail.
pub fn password_reset_email(brand: &str, temp_password: &str) -> (String, String) {
    let subject = format!("Password Reset - {brand}");
    let html = format!(
        r#"
<h3>Password Reset</h3>
<p>Your temporary password is: <b>{temp_password}</b></p>
<p>Please login using this password and change your password immediately.</p>
"#
    );
    (subject, html)
}

/// SMTP mailer, or a logging no-op when no host is configured.
pub struct SmtpMailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Option<Mailbox>,
}

impl SmtpMailer {
    pub fn new(cfg: &MailConfig) -> anyhow::Result<Self> {
        if cfg.smtp_host.trim().is_empty() {
            warn!("SMTP_HOST not configured; mail runs in no-op mode");
            return Ok(Self {
                transport: None,
                from: None,
            });
        }

        let from = cfg
            .smtp_email
            .parse::<Mailbox>()
            .context("SMTP_EMAIL is not a valid address")?;

        let builder = if cfg.smtp_starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.smtp_host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.smtp_host)
        }
        .context("configure SMTP transport")?
        .port(cfg.smtp_port);

        let transport = builder
            .credentials(Credentials::new(
                cfg.smtp_email.clone(),
                cfg.smtp_password.clone(),
            ))
            .build();

        Ok(Self {
            transport: Some(transport),
            from: Some(from),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_html(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()> {
        let (Some(transport), Some(from)) = (&self.transport, &self.from) else {
            info!(to, subject, "no-op mailer; skipping send");
            return Ok(());
        };

        let to = to
            .parse::<Mailbox>()
            .with_context(|| format!("invalid recipient {to}"))?;
        let email = Message::builder()
            .from(from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())
            .context("build email")?;

        transport.send(email).await.context("smtp send")?;
        info!(subject, "email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_email_carries_password_and_brand() {
        let (subject, html) = password_reset_email("TrendifyNow", "Ab3dE5gH");
        assert_eq!(subject, "Password Reset - TrendifyNow");
        assert!(html.contains("<b>Ab3dE5gH</b>"));
    }

    #[tokio::test]
    async fn empty_host_is_noop() {
        let mailer = SmtpMailer::new(&MailConfig {
            smtp_host: String::new(),
            smtp_port: 465,
            smtp_starttls: false,
            smtp_email: String::new(),
            smtp_password: String::new(),
            brand: "Shop".into(),
        })
        .unwrap();
        mailer
            .send_html("someone@example.com", "hi", "<p>hi</p>")
            .await
            .unwrap();
    }

    #[test]
    fn configured_host_requires_sender_address() {
        let res = SmtpMailer::new(&MailConfig {
            smtp_host: "smtp.example.com".into(),
            smtp_port: 465,
            smtp_starttls: false,
            smtp_email: "not an address".into(),
            smtp_password: "x".into(),
            brand: "Shop".into(),
        });
        assert!(res.is_err());
    }
}
