//! Session Cache
//!
//! Short-TTL Redis cache mapping a username to a previously resolved user
//! snapshot, saving a database round trip per authenticated request. The
//! cache is not authoritative: a Redis failure degrades to a database
//! lookup, and concurrent misses are not de-duplicated (the underlying
//! lookup is idempotent and cheap).

use async_trait::async_trait;
use log::warn;
use redis::{aio::ConnectionManager, AsyncCommands};

use crate::models::User;
use crate::service::user::UserStore;
use crate::utils::error::AppResult;

/// Snapshot lifetime in seconds
const DEFAULT_TTL_SECONDS: u64 = 900;

/// Cache-aside resolution of usernames to user snapshots.
///
/// Dyn-compatible so the auth middleware can run without Redis in tests.
#[async_trait]
pub trait UserCache: Send + Sync {
    /// Resolve a username to a user snapshot, loading through `users` on a
    /// miss. `None` when no such account exists.
    async fn resolve(&self, username: &str, users: &dyn UserStore) -> AppResult<Option<User>>;

    /// Drop the cached snapshot for a username
    async fn invalidate(&self, username: &str);
}

/// Cache-aside store for resolved users
#[derive(Clone)]
pub struct SessionCache {
    conn: ConnectionManager,
    ttl_seconds: u64,
}

impl SessionCache {
    /// Create a session cache over an established Redis connection
    pub fn new(conn: ConnectionManager) -> Self {
        Self {
            conn,
            ttl_seconds: DEFAULT_TTL_SECONDS,
        }
    }

    /// Override the snapshot TTL
    pub fn with_ttl(conn: ConnectionManager, ttl_seconds: u64) -> Self {
        Self { conn, ttl_seconds }
    }
}

#[async_trait]
impl UserCache for SessionCache {
    /// Returns the cached snapshot when present and unexpired; otherwise
    /// loads from the credential store, stores a copy with the configured
    /// TTL, and returns it.
    async fn resolve(&self, username: &str, users: &dyn UserStore) -> AppResult<Option<User>> {
        let key = cache_key(username);
        let mut conn = self.conn.clone();

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(json)) => match serde_json::from_str::<User>(&json) {
                Ok(user) => return Ok(Some(user)),
                Err(e) => warn!("Discarding undecodable session cache entry {}: {}", key, e),
            },
            Ok(None) => {}
            Err(e) => warn!("Session cache read failed for {}: {}", key, e),
        }

        let Some(record) = users.find_by_username(username).await? else {
            return Ok(None);
        };
        let user = User::from(record);

        match serde_json::to_string(&user) {
            Ok(json) => {
                if let Err(e) = conn
                    .set_ex::<_, _, ()>(&key, json, self.ttl_seconds)
                    .await
                {
                    warn!("Session cache write failed for {}: {}", key, e);
                }
            }
            Err(e) => warn!("Failed to serialize user snapshot for {}: {}", key, e),
        }

        Ok(Some(user))
    }

    /// Called after profile mutations (confirmation, avatar change) so the
    /// next authenticated request sees fresh state instead of waiting out
    /// the TTL.
    async fn invalidate(&self, username: &str) {
        let key = cache_key(username);
        let mut conn = self.conn.clone();
        if let Err(e) = conn.del::<_, ()>(&key).await {
            warn!("Session cache invalidation failed for {}: {}", key, e);
        }
    }
}

fn cache_key(username: &str) -> String {
    format!("user:{}", username)
}
