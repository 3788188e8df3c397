//! Typed async Redis client for connection and sorted-set commands.
//!
//! A [`RedisClient`] pairs a [`Router`](router::Router), which delivers a
//! [`Command`] and returns the raw reply, with a [`RedisCodec`], which maps
//! keys and values to bytes. Commands are grouped in the
//! [`ConnectionCommands`] and [`SortedSetCommands`] traits.
//!
//! ```no_run
//! use futures::TryStreamExt;
//! use rsedis::{Range, RedisClient, SortedSetCommands, StringCodec};
//!
//! # async fn run() -> rsedis::Result<()> {
//! let client = RedisClient::from_url("redis://127.0.0.1:6379", StringCodec)?;
//! let board = "board".to_string();
//! client.zadd(&board, 42.0, &"alice".to_string()).await?;
//! let top: Vec<String> = client
//!     .zrevrangebyscore(&board, &Range::unbounded())?
//!     .try_collect()
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod args;
pub mod client;
pub mod codec;
pub mod command;
pub mod commands;
pub mod config;
pub mod connection;
pub mod error;
pub(crate) mod output;
pub mod resp;
pub mod router;
pub mod scan;
pub mod types;

pub use args::{
    Aggregate, BlockTimeout, ClientType, KillArgs, ScanArgs, TrackingArgs, UnblockType, ZAddArgs,
    ZAggregateArgs, ZStoreArgs,
};
pub use client::{RedisClient, ValueStream};
pub use codec::{BytesCodec, RedisCodec, StringCodec};
pub use command::Command;
pub use commands::{ConnectionCommands, SortedSetCommands};
pub use config::{ConnectionConfig, ProtocolVersion};
pub use error::{FailureClass, RedisErrorKind, Result, RsedisError};
pub use router::{DedicatedRouter, Router, StandaloneRouter};
pub use scan::zscan_stream;
pub use types::{
    Boundary, KeyValue, Limit, Range, ReplicaInfo, Role, ScanCursor, ScanState, ScoredValue,
    ScoredValueScanCursor,
};
