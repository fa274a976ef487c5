//! Account entity - platform identity a player is tied to

use chrono::{DateTime, Utc};

use crate::domain::value_objects::AccountId;

/// A registered user of the platform. Every account owns exactly one
/// [`Player`](crate::domain::entities::Player).
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: AccountId::new(),
            username: username.into(),
            first_name: String::new(),
            last_name: String::new(),
            email: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = first.into();
        self.last_name = last.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Display name, falling back to the username when no real name is set
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}
