use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use uuid::Uuid;

/// A single user login session: who it belongs to, when it was created, and
/// whether it has been explicitly ended.
struct AuthSession {
    user_id: String,
    created: DateTime<Utc>,
    active: bool,
}

/// Tracks operator login sessions for the HTTP API, separate from the
/// in-memory scan-discovery state tracked per chat. Opaque UUIDv4 tokens,
/// 6-hour sliding-free TTL from creation.
pub struct AuthSessionManager {
    sessions: DashMap<String, AuthSession>,
    ttl: Duration,
}

impl AuthSessionManager {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            ttl: Duration::hours(6),
        }
    }

    /// Creates a new session and returns its UUIDv4 token.
    pub fn create_session(&self, user_id: &str) -> String {
        let token = Uuid::new_v4().to_string();
        self.sessions.insert(
            token.clone(),
            AuthSession {
                user_id: user_id.to_string(),
                created: Utc::now(),
                active: true,
            },
        );
        token
    }

    /// True if the token exists, is still marked active, and hasn't expired.
    pub fn validate_session(&self, token: &str) -> bool {
        let Some(mut entry) = self.sessions.get_mut(token) else {
            return false;
        };
        if Utc::now() - entry.created > self.ttl {
            entry.active = false;
            return false;
        }
        entry.active
    }

    pub fn end_session(&self, token: &str) {
        if let Some(mut entry) = self.sessions.get_mut(token) {
            entry.active = false;
        }
    }

    pub fn get_user_id(&self, token: &str) -> Option<String> {
        let entry = self.sessions.get(token)?;
        if entry.active && Utc::now() - entry.created <= self.ttl {
            Some(entry.user_id.clone())
        } else {
            None
        }
    }

    /// Drops inactive or expired sessions from memory.
    pub fn cleanup_expired(&self) {
        let now = Utc::now();
        self.sessions
            .retain(|_, s| s.active && now - s.created <= self.ttl);
    }
}

impl Default for AuthSessionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_validate_session() {
        let mgr = AuthSessionManager::new();
        let token = mgr.create_session("operator");
        assert!(mgr.validate_session(&token));
        assert_eq!(mgr.get_user_id(&token).as_deref(), Some("operator"));
    }

    #[test]
    fn test_unknown_token_is_invalid() {
        let mgr = AuthSessionManager::new();
        assert!(!mgr.validate_session("not-a-real-token"));
        assert!(mgr.get_user_id("not-a-real-token").is_none());
    }

    #[test]
    fn test_end_session_invalidates_it() {
        let mgr = AuthSessionManager::new();
        let token = mgr.create_session("operator");
        mgr.end_session(&token);
        assert!(!mgr.validate_session(&token));
    }

    #[test]
    fn test_expired_session_is_invalid() {
        let mgr = AuthSessionManager::new();
        let token = Uuid::new_v4().to_string();
        mgr.sessions.insert(
            token.clone(),
            AuthSession {
                user_id: "operator".to_string(),
                created: Utc::now() - Duration::hours(7),
                active: true,
            },
        );
        assert!(!mgr.validate_session(&token));
    }

    #[test]
    fn test_cleanup_expired_removes_stale_sessions() {
        let mgr = AuthSessionManager::new();
        let stale = Uuid::new_v4().to_string();
        mgr.sessions.insert(
            stale.clone(),
            AuthSession {
                user_id: "operator".to_string(),
                created: Utc::now() - Duration::hours(7),
                active: true,
            },
        );
        let fresh = mgr.create_session("operator2");
        mgr.cleanup_expired();
        assert!(mgr.sessions.get(&stale).is_none());
        assert!(mgr.sessions.get(&fresh).is_some());
    }
}
