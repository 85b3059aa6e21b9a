use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db_types::OrderStatusType;

/// A filter for order searches. Empty fields match everything, so the default filter returns every order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderQueryFilter {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<OrderStatusType>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl OrderQueryFilter {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() &&
            self.phone.is_none() &&
            self.status.is_none() &&
            self.since.is_none() &&
            self.until.is_none()
    }

    pub fn with_email(mut self, email: String) -> Self {
        self.email = Some(email);
        self
    }

    pub fn with_phone(mut self, phone: String) -> Self {
        self.phone = Some(phone);
        self
    }

    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.status = Some(status);
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }
}

impl std::fmt::Display for OrderQueryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "All orders.");
        }
        let mut terms = Vec::new();
        if let Some(email) = &self.email {
            terms.push(format!("email: {email}"));
        }
        if let Some(phone) = &self.phone {
            terms.push(format!("phone: {phone}"));
        }
        if let Some(status) = &self.status {
            terms.push(format!("status: {status}"));
        }
        if let Some(since) = &self.since {
            terms.push(format!("since: {since}"));
        }
        if let Some(until) = &self.until {
            terms.push(format!("until: {until}"));
        }
        write!(f, "Orders where {}.", terms.join(", "))
    }
}
