//! Typed command surfaces, implemented together by
//! [`RedisClient`](crate::client::RedisClient).
//!
//! Single-result commands are `async` and resolve to `Result<T>` or
//! `Result<Option<T>>` (`None` when the server reports nothing there).
//! Multi-result commands validate their arguments immediately and return
//! a [`ValueStream`](crate::client::ValueStream) that sends the command
//! when first polled.

pub mod connection;
pub mod sorted_set;

pub use connection::ConnectionCommands;
pub use sorted_set::SortedSetCommands;

use bytes::Bytes;

use crate::command::Command;

/// `name key`
pub(crate) fn keyed(name: &'static str, key: Bytes) -> Command {
    let mut cmd = Command::new(name);
    cmd.arg(key);
    cmd
}

/// `numkeys key [key ...]`
pub(crate) fn append_numkeys(cmd: &mut Command, keys: Vec<Bytes>) {
    cmd.arg_uint(keys.len() as u64);
    for key in keys {
        cmd.arg(key);
    }
}
