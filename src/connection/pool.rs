//! Connection pool behind [`StandaloneRouter`](crate::router::StandaloneRouter).
//!
//! A semaphore caps the number of checked-out connections; idle ones wait
//! in a deque guarded by a `parking_lot` mutex, so [`PoolGuard`] can hand a
//! connection back from `Drop`.
//!
//! Only reusable connections go back to the deque. One whose caller was
//! cancelled mid-request still has a reply in flight, and one that sent
//! `QUIT` is closed; both are dropped.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex as SyncMutex;
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::debug;

use crate::config::ConnectionConfig;
use crate::connection::tcp::RedisConnection;
use crate::error::{Result, RsedisError};

pub struct ConnectionPool {
    idle: SyncMutex<VecDeque<RedisConnection>>,
    /// One permit per connection that may be checked out.
    semaphore: Semaphore,
    config: ConnectionConfig,
    max_size: usize,
    idle_timeout: Duration,
}

impl ConnectionPool {
    pub fn new(config: ConnectionConfig) -> Self {
        let max_size = config.pool_size.max(1);
        let idle_timeout = Duration::from_millis(config.idle_timeout_ms);
        Self {
            idle: SyncMutex::new(VecDeque::with_capacity(max_size)),
            semaphore: Semaphore::new(max_size),
            config,
            max_size,
            idle_timeout,
        }
    }

    /// Check out a connection, opening a new one when no idle connection
    /// is fresh enough. Waits while `pool_size` connections are out.
    pub async fn get(&self) -> Result<PoolGuard<'_>> {
        let permit = self.semaphore.acquire().await.map_err(|_| {
            RsedisError::Connection(std::io::Error::new(
                std::io::ErrorKind::Other,
                "pool semaphore closed",
            ))
        })?;

        let conn = {
            let mut idle = self.idle.lock();
            self.take_healthy_connection(&mut idle)
        };

        let conn = match conn {
            Some(c) => c,
            None => create_connection(&self.config).await?,
        };

        Ok(PoolGuard {
            conn: Some(conn),
            pool: self,
            _permit: permit,
        })
    }

    /// Number of currently idle connections.
    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }

    /// Available permits (roughly `pool_size - checked_out`).
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Most recently used first; stale ones are dropped on the way.
    fn take_healthy_connection(
        &self,
        idle: &mut VecDeque<RedisConnection>,
    ) -> Option<RedisConnection> {
        while let Some(conn) = idle.pop_back() {
            if conn.last_used.elapsed() > self.idle_timeout {
                debug!("dropping idle connection past idle timeout");
                continue;
            }
            return Some(conn);
        }
        None
    }

    fn return_connection(&self, conn: RedisConnection) {
        if !conn.is_reusable() {
            debug!("discarding connection with an unread reply or after QUIT");
            return;
        }
        if conn.last_used.elapsed() > self.idle_timeout {
            return;
        }
        let mut idle = self.idle.lock();
        if idle.len() < self.max_size {
            idle.push_back(conn);
        }
    }
}

/// Open a connection and run the handshake for `config`.
///
/// `rediss://` is refused: without TLS support the handshake would send
/// credentials in plaintext.
pub async fn create_connection(config: &ConnectionConfig) -> Result<RedisConnection> {
    if config.tls {
        return Err(RsedisError::invalid(
            "TLS connections (rediss://) are not supported; use redis://",
        ));
    }

    let addr = config.primary_addr();
    let timeout = Duration::from_millis(config.connect_timeout_ms);
    let mut conn =
        RedisConnection::connect_timeout_with_max_buf(&addr, timeout, config.max_buffer_size)
            .await?;
    conn.set_read_timeout(config.read_timeout_ms);
    conn.init(config).await?;
    Ok(conn)
}

/// A checked-out connection. Dropping the guard releases the permit and
/// offers the connection back to the pool.
pub struct PoolGuard<'a> {
    conn: Option<RedisConnection>,
    pool: &'a ConnectionPool,
    _permit: SemaphorePermit<'a>,
}

impl PoolGuard<'_> {
    pub fn conn(&mut self) -> Result<&mut RedisConnection> {
        self.conn.as_mut().ok_or_else(|| {
            RsedisError::Connection(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "connection already taken from guard",
            ))
        })
    }
}

impl Drop for PoolGuard<'_> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.return_connection(conn);
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────
