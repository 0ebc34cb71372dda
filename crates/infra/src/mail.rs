//! Mail transports: SMTP (lettre) and an in-memory recorder for dev/test.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use movequote_notify::{MailError, MailTransport, OutboundEmail};

/// SMTP transport over TLS, with optional credentials.
pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
}

impl SmtpMailTransport {
    pub fn new(host: &str, credentials: Option<(String, String)>) -> Result<Self, MailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .map_err(|e| MailError::Transport(format!("smtp relay {host}: {e}")))?;
        if let Some((user, pass)) = credentials {
            builder = builder.credentials(Credentials::new(user, pass));
        }
        Ok(Self {
            transport: builder.build(),
            host: host.to_string(),
        })
    }
}

fn mailbox(addr: &str) -> Result<Mailbox, MailError> {
    addr.parse()
        .map_err(|e| MailError::InvalidAddress(format!("{addr}: {e}")))
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        let mut builder = Message::builder()
            .from(mailbox(&email.from)?)
            .to(mailbox(&email.to)?)
            .subject(email.subject.clone());
        if let Some(bcc) = &email.bcc {
            builder = builder.bcc(mailbox(bcc)?);
        }

        let message = builder
            .header(ContentType::TEXT_HTML)
            .body(email.html_body.clone())
            .map_err(|e| MailError::Transport(format!("building message: {e}")))?;

        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| MailError::Transport(e.to_string()))
    }

    async fn verify(&self) -> Result<(), MailError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(MailError::Transport(format!(
                "smtp server {} refused the connection probe",
                self.host
            ))),
            Err(e) => Err(MailError::Transport(e.to_string())),
        }
    }
}

/// Recording transport for dev/test: keeps every outbound email in memory
/// and can be switched to fail, to exercise the best-effort notification
/// path.
#[derive(Debug, Default)]
pub struct InMemoryMailTransport {
    sent: Mutex<Vec<OutboundEmail>>,
    fail_sends: AtomicBool,
}

impl InMemoryMailTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl MailTransport for InMemoryMailTransport {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(MailError::Transport(
                "in-memory transport set to fail".to_string(),
            ));
        }
        self.sent
            .lock()
            .map_err(|_| MailError::Transport("lock poisoned".to_string()))?
            .push(email.clone());
        Ok(())
    }

    async fn verify(&self) -> Result<(), MailError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> OutboundEmail {
        OutboundEmail {
            from: "noreply@movequote.test".to_string(),
            to: "ada@example.com".to_string(),
            bcc: Some("ops@movequote.test".to_string()),
            subject: "Your Order Details".to_string(),
            html_body: "<p>hi</p>".to_string(),
        }
    }

    #[tokio::test]
    async fn recording_transport_captures_sends() {
        let transport = InMemoryMailTransport::new();
        transport.send(&email()).await.unwrap();

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ada@example.com");
    }

    #[tokio::test]
    async fn recording_transport_can_be_forced_to_fail() {
        let transport = InMemoryMailTransport::new();
        transport.set_fail_sends(true);
        assert!(transport.send(&email()).await.is_err());
        assert!(transport.sent().is_empty());

        transport.set_fail_sends(false);
        transport.send(&email()).await.unwrap();
        assert_eq!(transport.sent().len(), 1);
    }
}
