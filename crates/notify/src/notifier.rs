use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use movequote_orders::Order;

use crate::email::{OutboundEmail, render_order_email};

/// Mail dispatch failure. Surfaced as a warning after a successful save;
/// never fatal to the submission.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MailError {
    #[error("invalid mail address: {0}")]
    InvalidAddress(String),

    #[error("mail transport error: {0}")]
    Transport(String),
}

/// Outbound mail seam. Implemented by the SMTP transport and by the
/// in-memory recording transport used in dev/test.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError>;

    /// Reachability probe, run once at process start. Failure is logged,
    /// not fatal.
    async fn verify(&self) -> Result<(), MailError>;
}

#[async_trait]
impl<T> MailTransport for Arc<T>
where
    T: MailTransport + ?Sized,
{
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        (**self).send(email).await
    }

    async fn verify(&self) -> Result<(), MailError> {
        (**self).verify().await
    }
}

/// Renders an order summary and dispatches it to the customer, with the
/// operator address blind-copied.
#[derive(Clone)]
pub struct Notifier {
    transport: Arc<dyn MailTransport>,
    from: String,
    operator_bcc: String,
}

impl Notifier {
    pub fn new(
        transport: Arc<dyn MailTransport>,
        from: impl Into<String>,
        operator_bcc: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            from: from.into(),
            operator_bcc: operator_bcc.into(),
        }
    }

    /// Send the order confirmation. Call only after the order is persisted.
    pub async fn notify(&self, order: &Order) -> Result<(), MailError> {
        let email = OutboundEmail {
            from: self.from.clone(),
            to: order.customer.email.clone(),
            bcc: Some(self.operator_bcc.clone()),
            subject: "Your Order Details".to_string(),
            html_body: render_order_email(order),
        };
        self.transport.send(&email).await
    }

    /// Probe the underlying transport once at startup; log the outcome.
    pub async fn verify_transport(&self) {
        match self.transport.verify().await {
            Ok(()) => tracing::info!("mail transport is ready to send"),
            Err(e) => tracing::warn!("mail transport verification failed: {e}"),
        }
    }
}
