//! TCP transport: a single RESP connection with its handshake, and the
//! pool that shares them between callers.

pub mod pool;
pub mod tcp;

pub use pool::{create_connection, ConnectionPool, PoolGuard};
pub use tcp::RedisConnection;
