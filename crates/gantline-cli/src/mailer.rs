//! HTML digest delivery over authenticated STARTTLS submission
//!
//! Delivery is attempted once; failures are reported, never retried.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;
use tracing::info;

/// Environment variable holding the sender address
pub const ENV_SENDER: &str = "GMAIL_USER";
/// Environment variable holding the sender secret
pub const ENV_PASSWORD: &str = "GMAIL_PASS";
/// Environment variable holding the recipient address
pub const ENV_RECIPIENT: &str = "RECIPIENT_EMAIL";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Missing mail setting {0}")]
    MissingSetting(&'static str),

    #[error("Invalid address '{address}': {reason}")]
    Address { address: String, reason: String },

    #[error("Could not build message: {0}")]
    Build(String),

    #[error("Error sending email: {0}")]
    Transport(String),
}

/// Everything needed to submit one message
#[derive(Clone)]
pub struct MailSettings {
    pub sender: String,
    pub password: String,
    pub recipient: String,
    pub host: String,
    pub port: u16,
}

impl std::fmt::Debug for MailSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailSettings")
            .field("sender", &self.sender)
            .field("password", &"<redacted>")
            .field("recipient", &self.recipient)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

impl MailSettings {
    /// Validate that all three credentials are present and non-blank
    pub fn from_parts(
        sender: Option<String>,
        password: Option<String>,
        recipient: Option<String>,
        host: String,
        port: u16,
    ) -> Result<Self, MailError> {
        fn required(value: Option<String>, name: &'static str) -> Result<String, MailError> {
            value
                .filter(|v| !v.trim().is_empty())
                .ok_or(MailError::MissingSetting(name))
        }

        Ok(Self {
            sender: required(sender, ENV_SENDER)?,
            password: required(password, ENV_PASSWORD)?,
            recipient: required(recipient, ENV_RECIPIENT)?,
            host,
            port,
        })
    }
}

fn mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.trim().parse().map_err(|e: lettre::address::AddressError| MailError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

/// Build an HTML message
pub fn compose(sender: &str, recipient: &str, subject: &str, html: String) -> Result<Message, MailError> {
    Message::builder()
        .from(mailbox(sender)?)
        .to(mailbox(recipient)?)
        .subject(subject)
        .header(ContentType::TEXT_HTML)
        .body(html)
        .map_err(|e| MailError::Build(e.to_string()))
}

/// SMTP submission client
pub struct Mailer {
    transport: SmtpTransport,
    settings: MailSettings,
}

impl Mailer {
    pub fn new(settings: MailSettings) -> Result<Self, MailError> {
        let creds = Credentials::new(settings.sender.clone(), settings.password.clone());

        let transport = SmtpTransport::starttls_relay(&settings.host)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .port(settings.port)
            .credentials(creds)
            .build();

        Ok(Self { transport, settings })
    }

    pub fn send_html(&self, subject: &str, html: String) -> Result<(), MailError> {
        let message = compose(&self.settings.sender, &self.settings.recipient, subject, html)?;

        info!(host = %self.settings.host, port = self.settings.port, "connecting to mail server");
        self.transport
            .send(&message)
            .map_err(|e| MailError::Transport(e.to_string()))?;
        info!(recipient = %self.settings.recipient, "email sent");
        Ok(())
    }

    pub fn recipient(&self) -> &str {
        &self.settings.recipient
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(sender: Option<&str>, password: Option<&str>, recipient: Option<&str>) -> Result<MailSettings, MailError> {
        MailSettings::from_parts(
            sender.map(String::from),
            password.map(String::from),
            recipient.map(String::from),
            "smtp.gmail.com".into(),
            587,
        )
    }

    #[test]
    fn all_settings_required() {
        assert!(settings(Some("a@example.com"), Some("secret"), Some("b@example.com")).is_ok());
        assert!(matches!(
            settings(None, Some("secret"), Some("b@example.com")),
            Err(MailError::MissingSetting(ENV_SENDER))
        ));
        assert!(matches!(
            settings(Some("a@example.com"), Some("  "), Some("b@example.com")),
            Err(MailError::MissingSetting(ENV_PASSWORD))
        ));
        assert!(matches!(
            settings(Some("a@example.com"), Some("secret"), None),
            Err(MailError::MissingSetting(ENV_RECIPIENT))
        ));
    }

    #[test]
    fn debug_hides_password() {
        let s = settings(Some("a@example.com"), Some("secret"), Some("b@example.com")).unwrap();
        assert!(!format!("{s:?}").contains("secret"));
    }

    #[test]
    fn composes_html_message() {
        let message = compose(
            "planner@example.com",
            "team@example.com",
            "Gantt Task Summary - 2025-06-12",
            "<html><body>hi</body></html>".into(),
        )
        .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("Subject: Gantt Task Summary - 2025-06-12"));
        assert!(raw.contains("To: team@example.com"));
        assert!(raw.contains("text/html"));
    }

    #[test]
    fn rejects_bad_address() {
        let err = compose("not an address", "team@example.com", "s", String::new()).unwrap_err();
        assert!(matches!(err, MailError::Address { .. }));
    }
}
