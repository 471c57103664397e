//! Connection-scoped identity for a debate session.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who is on the other end of a connection.
///
/// An authenticated account always wins over a visitor identifier when both
/// are available. `Anonymous` sessions can still debate; their debates are
/// simply not logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Identity {
    Authenticated { user_id: String },
    Visitor { visitor_id: String },
    Anonymous,
}

impl Identity {
    /// Pick the identity for a connection from the resolved account and the
    /// client-supplied visitor id. Blank values are treated as absent.
    pub fn resolve(account: Option<String>, visitor_id: Option<String>) -> Self {
        let non_blank = |s: String| if s.trim().is_empty() { None } else { Some(s) };
        match (account.and_then(non_blank), visitor_id.and_then(non_blank)) {
            (Some(user_id), _) => Identity::Authenticated { user_id },
            (None, Some(visitor_id)) => Identity::Visitor { visitor_id },
            (None, None) => Identity::Anonymous,
        }
    }

    /// The identifier stored alongside a debate, if any.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Identity::Authenticated { user_id } => Some(user_id),
            Identity::Visitor { visitor_id } => Some(visitor_id),
            Identity::Anonymous => None,
        }
    }

    /// Mode flag reported to the client in the acknowledgement frame.
    ///
    /// Only a verified account is `authenticated`. A visitor id alone still
    /// reports `guest`, even though its debates are logged under that id.
    pub fn mode(&self) -> SessionMode {
        match self {
            Identity::Authenticated { .. } => SessionMode::Authenticated,
            _ => SessionMode::Guest,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Authenticated { user_id } => write!(f, "user {user_id}"),
            Identity::Visitor { visitor_id } => write!(f, "visitor {visitor_id}"),
            Identity::Anonymous => write!(f, "guest"),
        }
    }
}

/// Mode flag carried by the acknowledgement frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    Guest,
    Authenticated,
}
