//! `movequote-notify` — order confirmation email rendering and dispatch.
//!
//! Notification is best-effort: it runs only after the order is persisted,
//! and a delivery failure never reverses the committed order.

pub mod email;
pub mod notifier;

pub use email::{OutboundEmail, render_order_email};
pub use notifier::{MailError, MailTransport, Notifier};
