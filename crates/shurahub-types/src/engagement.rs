//! Landing-page engagement: feedback submissions and analytics events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shortest accepted feedback message, in characters.
pub const MIN_FEEDBACK_CHARS: usize = 4;

/// Shortest accepted analytics event name, in characters.
pub const MIN_EVENT_NAME_CHARS: usize = 2;

/// A feedback form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub email: Option<String>,
    pub message: String,
    pub category: Option<String>,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Feedback {
    /// Validate a submission. The message is stored trimmed.
    pub fn new(
        email: Option<String>,
        message: &str,
        category: Option<String>,
        user_id: Option<String>,
    ) -> Result<Self, String> {
        let message = message.trim();
        if message.chars().count() < MIN_FEEDBACK_CHARS {
            return Err(format!(
                "message must be at least {MIN_FEEDBACK_CHARS} characters"
            ));
        }
        if let Some(email) = email.as_deref() {
            if !looks_like_email(email) {
                return Err(format!("invalid email address: '{email}'"));
            }
        }
        Ok(Self {
            email,
            message: message.to_string(),
            category,
            user_id,
            created_at: Utc::now(),
        })
    }
}

/// A named analytics event with free-form metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub event_name: String,
    /// Always a JSON value; an empty object when the client sent none.
    pub event_data: serde_json::Value,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AnalyticsEvent {
    pub fn new(
        event_name: &str,
        metadata: Option<serde_json::Value>,
        user_id: Option<String>,
    ) -> Result<Self, String> {
        if event_name.chars().count() < MIN_EVENT_NAME_CHARS {
            return Err(format!(
                "event_name must be at least {MIN_EVENT_NAME_CHARS} characters"
            ));
        }
        Ok(Self {
            event_name: event_name.to_string(),
            event_data: metadata.unwrap_or_else(|| serde_json::json!({})),
            user_id,
            created_at: Utc::now(),
        })
    }
}

fn looks_like_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !s.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
