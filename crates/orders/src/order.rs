use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use movequote_core::{DomainError, ItemId, OrderId, round3};

/// Contact details submitted with an order. All fields are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub message: String,
}

impl CustomerDetails {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let details = Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            address: address.into(),
            message: message.into(),
        };

        for (label, value) in [
            ("name", &details.name),
            ("email", &details.email),
            ("phone", &details.phone),
            ("address", &details.address),
            ("message", &details.message),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::validation(format!("{label} is required")));
            }
        }

        // Minimal structural check; the mail transport re-validates the
        // address when the notification is built.
        if !looks_like_email(&details.email) {
            return Err(DomainError::validation("email is not a valid address"));
        }

        Ok(details)
    }
}

fn looks_like_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !s.chars().any(char::is_whitespace)
        && !domain.contains('@')
}

/// A resolved, normalized selection embedded in a persisted order.
///
/// Carries a snapshot of the item's name and a derived volume; both are
/// immune to later catalog changes. The catalog reference is non-owning —
/// the item may no longer exist when the order is read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub item_id: ItemId,
    pub name: String,
    pub quantity: u32,
    /// `round3(catalog volume * quantity)`, derived at resolution time.
    pub volume: f64,
}

/// A customer order: contact details plus at least one line item.
///
/// Immutable once persisted; there is no update, cancel, or fulfil operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub submitted_at: DateTime<Utc>,
    pub customer: CustomerDetails,
    pub lines: Vec<OrderLineItem>,
}

impl Order {
    pub fn new(
        id: OrderId,
        submitted_at: DateTime<Utc>,
        customer: CustomerDetails,
        lines: Vec<OrderLineItem>,
    ) -> Result<Self, DomainError> {
        if lines.is_empty() {
            return Err(DomainError::invariant("an order must have at least one line item"));
        }

        Ok(Self {
            id,
            submitted_at,
            customer,
            lines,
        })
    }

    /// Grand total volume: sum of line volumes, rounded to 3 decimals.
    pub fn total_volume(&self) -> f64 {
        round3(self.lines.iter().map(|l| l.volume).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer() -> CustomerDetails {
        CustomerDetails::new(
            "Ada Lovelace",
            "ada@example.com",
            "+44 20 7946 0000",
            "12 Analytical Way, London",
            "Moving next month",
        )
        .unwrap()
    }

    fn line(name: &str, quantity: u32, volume: f64) -> OrderLineItem {
        OrderLineItem {
            item_id: ItemId::new(),
            name: name.to_string(),
            quantity,
            volume,
        }
    }

    #[test]
    fn customer_details_reject_empty_fields() {
        for (name, email, phone, address, message) in [
            ("", "a@b.co", "1", "addr", "msg"),
            ("n", "  ", "1", "addr", "msg"),
            ("n", "a@b.co", "", "addr", "msg"),
            ("n", "a@b.co", "1", " ", "msg"),
            ("n", "a@b.co", "1", "addr", ""),
        ] {
            let err = CustomerDetails::new(name, email, phone, address, message).unwrap_err();
            match err {
                DomainError::Validation(_) => {}
                _ => panic!("expected Validation error"),
            }
        }
    }

    #[test]
    fn customer_details_reject_malformed_email() {
        for bad in ["plainaddress", "@no-local.com", "user@", "user@nodot", "a b@x.com"] {
            let err = CustomerDetails::new("n", bad, "1", "addr", "msg").unwrap_err();
            match err {
                DomainError::Validation(msg) => assert!(msg.contains("email"), "{bad}: {msg}"),
                _ => panic!("expected Validation error for {bad}"),
            }
        }
    }

    #[test]
    fn order_requires_at_least_one_line() {
        let err = Order::new(OrderId::new(), Utc::now(), customer(), vec![]).unwrap_err();
        match err {
            DomainError::InvariantViolation(_) => {}
            _ => panic!("expected InvariantViolation"),
        }
    }

    #[test]
    fn total_volume_sums_and_rounds() {
        let order = Order::new(
            OrderId::new(),
            Utc::now(),
            customer(),
            vec![line("Box-S", 3, 3.0), line("Sofa", 1, 2.4)],
        )
        .unwrap();
        assert_eq!(order.total_volume(), 5.4);
    }
}
