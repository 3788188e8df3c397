//! Standalone topology router.
//!
//! Routes all commands to a single Redis server through a connection pool.
//! Commands that change per-connection state only affect whichever pooled
//! connection carried them.

use tracing::{debug, trace};

use crate::command::Command;
use crate::config::ConnectionConfig;
use crate::connection::pool::ConnectionPool;
use crate::error::Result;
use crate::resp::types::RespValue;
use crate::router::Router;

/// Router for a single server, spreading concurrent callers over pooled
/// connections.
pub struct StandaloneRouter {
    pool: ConnectionPool,
}

impl StandaloneRouter {
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            pool: ConnectionPool::new(config),
        }
    }

    pub fn pool_idle_count(&self) -> usize {
        self.pool.idle_count()
    }

    pub fn pool_available(&self) -> usize {
        self.pool.available()
    }
}

/// Commands whose effect is bound to the connection that carries them.
fn is_connection_scoped(cmd: &Command) -> bool {
    match cmd.name() {
        "AUTH" | "SELECT" | "READONLY" | "READWRITE" | "QUIT" => true,
        "CLIENT" => cmd.args().get(1).is_some_and(|sub| {
            [&b"SETNAME"[..], b"TRACKING", b"CACHING"]
                .iter()
                .any(|name| sub.eq_ignore_ascii_case(name))
        }),
        _ => false,
    }
}

impl Router for StandaloneRouter {
    async fn execute(&self, cmd: &Command) -> Result<RespValue> {
        let mut guard = self.pool.get().await?;
        if is_connection_scoped(cmd) {
            debug!(
                command = %cmd.display_name(),
                "connection state change sent through the pool; later commands may not see it"
            );
        } else {
            trace!(command = %cmd.display_name(), "pooled execute");
        }
        guard.conn()?.execute(cmd).await
    }
}

// ── Tests ──────────────────────────────────────────────────────────
