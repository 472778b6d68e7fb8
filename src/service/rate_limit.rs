//! Rate Limiter
//!
//! Fixed-window request counting backed by Redis. Each (client key, route)
//! pair gets a counter with an expiry equal to the window length; requests
//! beyond the limit are rejected until the window rolls over.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::config::RateLimitConfig;
use crate::utils::error::{AppError, AppResult};

/// Per-client, per-route request admission.
///
/// Dyn-compatible so protected routes can run without Redis in tests.
#[async_trait]
pub trait RequestLimiter: Send + Sync {
    /// Count one request against `(client_key, route)` and reject the
    /// overflow.
    async fn check(&self, client_key: &str, route: &str) -> AppResult<()>;
}

/// Fixed-window counter over a shared Redis store
#[derive(Clone)]
pub struct RateLimiter {
    conn: ConnectionManager,
    max_requests: u32,
    window_seconds: u64,
}

impl RateLimiter {
    /// Create a rate limiter over an established Redis connection
    pub fn new(conn: ConnectionManager, config: &RateLimitConfig) -> Self {
        Self {
            conn,
            max_requests: config.max_requests,
            window_seconds: config.window_seconds,
        }
    }
}

#[async_trait]
impl RequestLimiter for RateLimiter {
    /// Increment and expiry run in one MULTI/EXEC block, and the expiry
    /// uses `NX` so only the hit that opens a window sets it. A counter can
    /// therefore never survive its window, even if the client disconnects
    /// mid-request.
    async fn check(&self, client_key: &str, route: &str) -> AppResult<()> {
        let key = window_key(client_key, route);
        let mut conn = self.conn.clone();

        let (count,): (i64,) = window_commands(&key, self.window_seconds)
            .query_async(&mut conn)
            .await?;

        if count > self.max_requests as i64 {
            let ttl: i64 = conn.ttl(&key).await.unwrap_or(self.window_seconds as i64);
            return Err(AppError::RateLimited {
                retry_after: ttl.max(1) as u64,
            });
        }

        Ok(())
    }
}

/// Atomic increment-and-expire for one window counter
fn window_commands(key: &str, window_seconds: u64) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic()
        .incr(key, 1)
        .cmd("EXPIRE")
        .arg(key)
        .arg(window_seconds as i64)
        .arg("NX")
        .ignore();
    pipe
}

fn window_key(client_key: &str, route: &str) -> String {
    format!("rate:{}:{}", client_key, route)
}
