//! Authenticated actor as seen by the gateway.
//!
//! Sessions are owned by an external provider (sign-in, refresh and sign-out
//! all happen elsewhere). The gateway only reads the current one per call.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};
use std::fmt;
use tokio::sync::RwLock;

pub const ADMIN_ROLE: &str = "admin";

#[derive(Clone)]
pub struct Session {
    pub user_id: String,
    pub role: String,
    pub access_token: Secret<String>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        user_id: impl Into<String>,
        role: impl Into<String>,
        access_token: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            role: role.into(),
            access_token: Secret::new(access_token.into()),
            expires_at,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }

    /// Informational only; the provider is responsible for refreshing.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub(crate) fn bearer_token(&self) -> &str {
        self.access_token.expose_secret()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("role", &self.role)
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Source of the current session, injected into the gateway.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Returns the active session, or `None` when nobody is signed in.
    async fn current_session(&self) -> Option<Session>;
}

/// Session provider backed by an in-memory slot.
#[derive(Default)]
pub struct StaticSessionProvider {
    session: RwLock<Option<Session>>,
}

impl StaticSessionProvider {
    pub fn new(session: Option<Session>) -> Self {
        Self {
            session: RwLock::new(session),
        }
    }

    pub async fn sign_in(&self, session: Session) {
        *self.session.write().await = Some(session);
    }

    pub async fn sign_out(&self) {
        *self.session.write().await = None;
    }
}

#[async_trait]
impl SessionProvider for StaticSessionProvider {
    async fn current_session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }
}
