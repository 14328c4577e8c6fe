//! User identity and access checks.
//!
//! On-demand actions ask an [`AccessControl`] collaborator whether the user
//! may proceed; a denial is reported to the user with the collaborator's
//! message unchanged.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The authenticated user an operation runs for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub email: String,
}

/// Outcome of an access check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessCheck {
    pub has_access: bool,
    pub message: String,
}

impl AccessCheck {
    pub fn granted() -> Self {
        Self {
            has_access: true,
            message: String::new(),
        }
    }

    pub fn denied(message: impl Into<String>) -> Self {
        Self {
            has_access: false,
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait AccessControl: Send + Sync {
    async fn check_user_access(&self, user_id: &str, email: &str) -> AccessCheck;
}

pub const DEFAULT_DENIED_MESSAGE: &str =
    "Your account does not have access to this feature. Contact support to upgrade.";

/// Access policy read from the `[access]` config section.
///
/// An empty allow-list grants everyone access. Emails compare
/// case-insensitively.
#[derive(Debug, Clone)]
pub struct ConfigAccess {
    allowed_emails: Vec<String>,
    denied_message: String,
}

impl ConfigAccess {
    pub fn new(allowed_emails: Vec<String>, denied_message: Option<String>) -> Self {
        Self {
            allowed_emails: allowed_emails
                .into_iter()
                .map(|e| e.trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
            denied_message: denied_message.unwrap_or_else(|| DEFAULT_DENIED_MESSAGE.to_string()),
        }
    }

    pub fn allow_all() -> Self {
        Self::new(Vec::new(), None)
    }
}

#[async_trait]
impl AccessControl for ConfigAccess {
    async fn check_user_access(&self, user_id: &str, email: &str) -> AccessCheck {
        if self.allowed_emails.is_empty() {
            return AccessCheck::granted();
        }
        let email = email.trim().to_lowercase();
        if self.allowed_emails.iter().any(|e| *e == email) {
            AccessCheck::granted()
        } else {
            tracing::info!(user_id, "access denied");
            AccessCheck::denied(self.denied_message.clone())
        }
    }
}
