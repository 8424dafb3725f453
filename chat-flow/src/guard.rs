use tracing::warn;

use crate::event::{Event, Reply};

pub const ACCESS_DENIED: &str = "Access denied";

/// Outcome of an authorization check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
}

/// Lets exactly one configured identity through.
///
/// The identity is fixed at construction and compared with exact string equality.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    allowed: String,
}

impl AccessGuard {
    pub fn allow_only(identity: impl Into<String>) -> Self {
        Self {
            allowed: identity.into(),
        }
    }

    pub fn allowed_identity(&self) -> &str {
        &self.allowed
    }

    pub fn authorize(&self, requester: &str) -> Access {
        if requester == self.allowed {
            Access::Allow
        } else {
            Access::Deny
        }
    }

    /// Denial rendered on the channel the event came in on: a plain reply for
    /// commands, an alert for button presses.
    pub fn denial(&self, event: &Event) -> Reply {
        warn!(user_id = %event.user_id, "rejected event from unauthorized user");
        if event.is_callback() {
            Reply::alert(ACCESS_DENIED)
        } else {
            Reply::text(ACCESS_DENIED)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_only() {
        let guard = AccessGuard::allow_only("123");
        assert_eq!(guard.authorize("123"), Access::Allow);
        assert_eq!(guard.authorize("999"), Access::Deny);
        assert_eq!(guard.authorize("1234"), Access::Deny);
        assert_eq!(guard.authorize(" 123"), Access::Deny);
    }

    #[test]
    fn denial_matches_arrival_channel() {
        let guard = AccessGuard::allow_only("123");
        assert_eq!(
            guard.denial(&Event::command("999", "search", "dune")),
            Reply::text(ACCESS_DENIED)
        );
        assert_eq!(
            guard.denial(&Event::callback("999", "add_1")),
            Reply::alert(ACCESS_DENIED)
        );
    }
}
