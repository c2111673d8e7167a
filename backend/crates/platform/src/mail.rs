//! Outbound mail
//!
//! `Mailer` is the port the application layer talks to. Two adapters:
//! - [`LogMailer`]: writes a tracing event instead of delivering (development)
//! - [`HttpMailer`]: POSTs the message as JSON to a mail relay API

use serde::Serialize;

/// A plain-text message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Mail delivery failure
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Mail relay unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Mail relay rejected message with status {0}")]
    Rejected(u16),
}

/// Mail sender trait
#[trait_variant::make(Mailer: Send)]
pub trait LocalMailer {
    /// Deliver one message. No retries.
    async fn send(&self, message: &MailMessage) -> Result<(), MailError>;
}

/// Mailer that only logs recipient and subject
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        // Body is not logged: it carries the confirmation code.
        tracing::info!(
            to = %message.to,
            from = %message.from,
            subject = %message.subject,
            "Mail send stub"
        );
        Ok(())
    }
}

/// Mailer backed by an HTTP relay
#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpMailer {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Mailer for HttpMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), to = %message.to, "Mail relay rejected message");
            return Err(MailError::Rejected(status.as_u16()));
        }

        tracing::debug!(to = %message.to, "Mail delivered to relay");
        Ok(())
    }
}

/// Either adapter, chosen at startup
#[derive(Debug, Clone)]
pub enum AnyMailer {
    Log(LogMailer),
    Http(HttpMailer),
}

impl AnyMailer {
    /// `Http` when a relay endpoint is configured, otherwise `Log`
    pub fn from_endpoint(endpoint: Option<String>) -> Self {
        match endpoint {
            Some(url) if !url.trim().is_empty() => AnyMailer::Http(HttpMailer::new(url)),
            _ => AnyMailer::Log(LogMailer),
        }
    }
}

impl Mailer for AnyMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        match self {
            AnyMailer::Log(m) => Mailer::send(m, message).await,
            AnyMailer::Http(m) => Mailer::send(m, message).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> MailMessage {
        MailMessage {
            from: "noreply@yamdb.local".into(),
            to: "alice@example.com".into(),
            subject: "Confirmation code".into(),
            text: "123456".into(),
        }
    }

    #[tokio::test]
    async fn test_log_mailer_always_succeeds() {
        assert!(Mailer::send(&LogMailer, &message()).await.is_ok());
    }

    #[tokio::test]
    async fn test_any_mailer_dispatches_to_log() {
        let mailer = AnyMailer::from_endpoint(None);
        assert!(Mailer::send(&mailer, &message()).await.is_ok());
    }

    #[test]
    fn test_any_mailer_selection() {
        assert!(matches!(AnyMailer::from_endpoint(None), AnyMailer::Log(_)));
        assert!(matches!(
            AnyMailer::from_endpoint(Some("  ".into())),
            AnyMailer::Log(_)
        ));
        match AnyMailer::from_endpoint(Some("http://relay.local/send".into())) {
            AnyMailer::Http(m) => assert_eq!(m.endpoint(), "http://relay.local/send"),
            other => panic!("expected http mailer, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_http_mailer_unreachable_is_transport_error() {
        // Port 9 (discard) on loopback is closed in test environments
        let mailer = HttpMailer::new("http://127.0.0.1:9/send");
        let err = Mailer::send(&mailer, &message()).await.unwrap_err();
        assert!(matches!(err, MailError::Transport(_)));
    }

    #[test]
    fn test_message_serializes_as_relay_payload() {
        let json = serde_json::to_value(message()).unwrap();
        assert_eq!(json["to"], "alice@example.com");
        assert_eq!(json["text"], "123456");
    }
}
