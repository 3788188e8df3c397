//! Async TCP connection to a Redis server.
//!
//! Wraps a `tokio::net::TcpStream` with an integrated read buffer and
//! RESP parser for streaming request/response I/O.

use std::time::{Duration, Instant};

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, trace};

use crate::command::Command;
use crate::config::{ConnectionConfig, ProtocolVersion, DEFAULT_MAX_BUF_SIZE};
use crate::error::{Result, RsedisError};
use crate::resp::parser::parse;
use crate::resp::types::RespValue;
use crate::resp::writer::encode_command;

/// Default initial read buffer capacity (64 KB).
const DEFAULT_BUF_CAPACITY: usize = 64 * 1024;

/// A single async connection to a Redis server.
pub struct RedisConnection {
    stream: TcpStream,
    /// Data read from the socket but not yet consumed by the parser.
    buf: BytesMut,
    max_buf_size: usize,
    read_timeout: Option<Duration>,
    /// Set while a request is on the wire and its reply has not been read.
    /// Stays set if the caller gives up half way, which poisons the connection.
    awaiting_reply: bool,
    /// Set after `QUIT`.
    closed: bool,
    /// Timestamp of last successful I/O (for idle checks).
    pub last_used: Instant,
}

impl RedisConnection {
    /// Connect to `addr` (e.g. "127.0.0.1:6379").
    pub async fn connect(addr: &str) -> Result<Self> {
        Self::connect_with_max_buf(addr, DEFAULT_MAX_BUF_SIZE).await
    }

    pub async fn connect_with_max_buf(addr: &str, max_buf_size: usize) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true).ok();
        debug!(%addr, "connected");
        Ok(Self {
            stream,
            buf: BytesMut::with_capacity(DEFAULT_BUF_CAPACITY),
            max_buf_size,
            read_timeout: None,
            awaiting_reply: false,
            closed: false,
            last_used: Instant::now(),
        })
    }

    pub async fn connect_timeout(addr: &str, timeout: Duration) -> Result<Self> {
        Self::connect_timeout_with_max_buf(addr, timeout, DEFAULT_MAX_BUF_SIZE).await
    }

    pub async fn connect_timeout_with_max_buf(
        addr: &str,
        timeout: Duration,
        max_buf_size: usize,
    ) -> Result<Self> {
        match tokio::time::timeout(timeout, Self::connect_with_max_buf(addr, max_buf_size)).await {
            Ok(result) => result,
            Err(_) => Err(RsedisError::Timeout(format!(
                "connection to {addr} timed out after {timeout:?}"
            ))),
        }
    }

    /// Per-reply read timeout in milliseconds; 0 disables it.
    pub fn set_read_timeout(&mut self, millis: u64) {
        self.read_timeout = (millis > 0).then(|| Duration::from_millis(millis));
    }

    /// Whether the connection can carry another request: no reply is
    /// outstanding and `QUIT` has not been sent.
    pub fn is_reusable(&self) -> bool {
        !self.awaiting_reply && !self.closed
    }

    /// Send raw bytes to the server.
    pub async fn send_raw(&mut self, data: &[u8]) -> Result<()> {
        self.stream.write_all(data).await?;
        self.last_used = Instant::now();
        Ok(())
    }

    /// Read and parse one complete RESP value, skipping RESP3 push frames.
    ///
    /// Freezes the read buffer to `Bytes` before parsing so bulk strings
    /// are sliced, not copied.
    pub async fn read_response(&mut self) -> Result<RespValue> {
        loop {
            if !self.buf.is_empty() {
                let snapshot = self.buf.split().freeze();
                let parsed = parse(&snapshot);
                let consumed = match &parsed {
                    Ok(Some((_, consumed))) => *consumed,
                    _ => 0,
                };
                // Put back whatever the parser did not consume.
                self.buf.extend_from_slice(&snapshot[consumed..]);
                match parsed? {
                    Some((value, _)) if value.is_push() => {
                        trace!(kind = ?value, "skipping push frame");
                        continue;
                    }
                    Some((value, _)) => {
                        self.last_used = Instant::now();
                        return Ok(value);
                    }
                    None => {}
                }
            }
            self.fill_buf().await?;
        }
    }

    /// Read more bytes from the socket, growing the buffer up to its limit.
    async fn fill_buf(&mut self) -> Result<()> {
        if self.buf.capacity() - self.buf.len() < 4096 {
            let new_cap = (self.buf.capacity() * 2).max(DEFAULT_BUF_CAPACITY);
            if new_cap > self.max_buf_size {
                if self.buf.capacity() >= self.max_buf_size {
                    return Err(RsedisError::Protocol(format!(
                        "RESP message too large: buffer would exceed {} bytes",
                        self.max_buf_size
                    )));
                }
                self.buf.reserve(self.max_buf_size - self.buf.capacity());
            } else {
                self.buf.reserve(new_cap - self.buf.capacity());
            }
        }
        let n = self.stream.read_buf(&mut self.buf).await?;
        if n == 0 {
            return Err(RsedisError::Connection(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "connection closed by server",
            )));
        }
        Ok(())
    }

    /// Send one command and wait for its reply.
    ///
    /// The read deadline is the configured read timeout plus the command's
    /// blocking time; a command that may block forever has no deadline.
    pub async fn execute(&mut self, cmd: &Command) -> Result<RespValue> {
        let deadline = match (self.read_timeout, cmd.blocking_timeout()) {
            (_, Some(blocking)) if blocking.is_zero() => None,
            (Some(read), Some(blocking)) => read.checked_add(blocking),
            (read, _) => read,
        };
        let reply = self.round_trip(&cmd.encode(), deadline).await?;
        if cmd.name() == "QUIT" {
            debug!("connection closed by QUIT");
            self.closed = true;
        }
        Ok(reply)
    }

    /// Send a command given as string arguments and read the reply.
    pub async fn execute_str(&mut self, args: &[&str]) -> Result<RespValue> {
        let read_timeout = self.read_timeout;
        self.round_trip(&encode_command(args), read_timeout).await
    }

    async fn round_trip(&mut self, wire: &[u8], deadline: Option<Duration>) -> Result<RespValue> {
        if self.closed {
            return Err(RsedisError::Connection(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "connection was closed with QUIT",
            )));
        }
        self.awaiting_reply = true;
        self.send_raw(wire).await?;
        let reply = match deadline {
            Some(limit) => tokio::time::timeout(limit, self.read_response())
                .await
                .map_err(|_| RsedisError::Timeout(format!("no reply within {limit:?}")))??,
            None => self.read_response().await?,
        };
        self.awaiting_reply = false;
        Ok(reply)
    }

    /// Authenticate with `AUTH [username] password`.
    pub async fn auth(&mut self, username: Option<&str>, password: &str) -> Result<()> {
        let response = match username {
            Some(user) => self.execute_str(&["AUTH", user, password]).await?,
            None => self.execute_str(&["AUTH", password]).await?,
        };
        expect_ok("AUTH", response)
    }

    /// Select a database index. Database 0 is the default and sends nothing.
    pub async fn select_db(&mut self, db: u16) -> Result<()> {
        if db == 0 {
            return Ok(());
        }
        let db_str = db.to_string();
        let response = self.execute_str(&["SELECT", &db_str]).await?;
        expect_ok("SELECT", response)
    }

    /// Upgrade to RESP3, authenticating and naming the connection in the
    /// same round trip.
    pub async fn hello3(
        &mut self,
        username: Option<&str>,
        password: Option<&str>,
        client_name: Option<&str>,
    ) -> Result<RespValue> {
        let mut args: Vec<&str> = vec!["HELLO", "3"];
        if let Some(pass) = password {
            args.extend(["AUTH", username.unwrap_or("default"), pass]);
        }
        if let Some(name) = client_name {
            args.extend(["SETNAME", name]);
        }
        let response = self.execute_str(&args).await?;
        if let Some(msg) = response.as_error_msg() {
            return Err(RsedisError::redis(msg));
        }
        Ok(response)
    }

    /// Run the connection handshake described by `config`.
    ///
    /// RESP3 sends `HELLO 3` (with `AUTH` and `SETNAME`); RESP2 sends
    /// `AUTH`, then `CLIENT SETNAME`. `SELECT` follows in both cases.
    pub async fn init(&mut self, config: &ConnectionConfig) -> Result<()> {
        let username = config.username.as_deref();
        let password = config.password.as_deref();
        let client_name = config.client_name.as_deref();

        match config.protocol {
            ProtocolVersion::Resp3 => {
                self.hello3(username, password, client_name).await?;
            }
            ProtocolVersion::Resp2 => {
                if let Some(pass) = password {
                    self.auth(username, pass).await?;
                }
                if let Some(name) = client_name {
                    let response = self.execute_str(&["CLIENT", "SETNAME", name]).await?;
                    expect_ok("CLIENT SETNAME", response)?;
                }
            }
        }
        self.select_db(config.db).await?;
        debug!(protocol = ?config.protocol, db = config.db, "handshake complete");
        Ok(())
    }
}

fn expect_ok(command: &str, response: RespValue) -> Result<()> {
    match response {
        RespValue::SimpleString(ref s) if s == "OK" => Ok(()),
        RespValue::Error(msg) | RespValue::BulkError(msg) => Err(RsedisError::redis(msg)),
        other => Err(RsedisError::Protocol(format!(
            "unexpected {command} response: {}",
            other.type_name()
        ))),
    }
}

// ── Tests ──────────────────────────────────────────────────────────
