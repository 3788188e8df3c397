//! Single-connection router.
//!
//! All commands go over one connection, one at a time, so connection
//! state set by `AUTH`, `CLIENT SETNAME` or `READONLY` applies to every
//! later command. If the connection becomes unusable (a cancelled
//! request, an I/O failure, `QUIT`) it is replaced on next use; the new
//! connection only carries the state from the configured handshake.

use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

use crate::command::Command;
use crate::config::ConnectionConfig;
use crate::connection::pool::create_connection;
use crate::connection::tcp::RedisConnection;
use crate::error::Result;
use crate::resp::types::RespValue;
use crate::router::Router;

pub struct DedicatedRouter {
    conn: Mutex<Option<RedisConnection>>,
    config: ConnectionConfig,
}

impl DedicatedRouter {
    /// Connects lazily on the first command.
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            conn: Mutex::new(None),
            config,
        }
    }

    /// Connect now instead of on first use.
    pub async fn connect(config: ConnectionConfig) -> Result<Self> {
        let conn = create_connection(&config).await?;
        debug!(addr = %config.primary_addr(), "dedicated connection ready");
        Ok(Self {
            conn: Mutex::new(Some(conn)),
            config,
        })
    }

    /// Whether a usable connection is currently held.
    pub async fn is_connected(&self) -> bool {
        self.conn
            .lock()
            .await
            .as_ref()
            .is_some_and(RedisConnection::is_reusable)
    }
}

impl Router for DedicatedRouter {
    async fn execute(&self, cmd: &Command) -> Result<RespValue> {
        let mut slot = self.conn.lock().await;
        let conn = match slot.take() {
            Some(conn) if conn.is_reusable() => slot.insert(conn),
            stale => {
                if stale.is_some() {
                    warn!(
                        addr = %self.config.primary_addr(),
                        "replacing unusable dedicated connection; connection state is reset"
                    );
                }
                slot.insert(create_connection(&self.config).await?)
            }
        };
        trace!(command = %cmd.display_name(), "dedicated execute");
        conn.execute(cmd).await
    }
}

// ── Tests ──────────────────────────────────────────────────────────
