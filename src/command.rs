//! A single Redis command: name plus binary-safe arguments.
//!
//! Built by the typed command methods, handed to a [`Router`](crate::router::Router)
//! and encoded on the wire by [`encode_command`].

use std::time::Duration;

use bytes::Bytes;
use itoa::Buffer;

use crate::error::{Result, RsedisError};
use crate::resp::writer::encode_command;

/// One logical request.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    name: &'static str,
    /// Full argument vector, starting with the command name.
    args: Vec<Bytes>,
    /// Server-side blocking time (`BZPOPMIN` and friends). `Some(ZERO)`
    /// means the server may block indefinitely.
    blocking: Option<Duration>,
}

impl Command {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            args: vec![Bytes::from_static(name.as_bytes())],
            blocking: None,
        }
    }

    /// Append one argument.
    pub fn arg(&mut self, arg: impl Into<Bytes>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    pub fn arg_int(&mut self, n: i64) -> &mut Self {
        let mut digits = Buffer::new();
        self.arg(Bytes::copy_from_slice(digits.format(n).as_bytes()))
    }

    pub fn arg_uint(&mut self, n: u64) -> &mut Self {
        let mut digits = Buffer::new();
        self.arg(Bytes::copy_from_slice(digits.format(n).as_bytes()))
    }

    /// Append a score, rejecting NaN.
    pub fn arg_score(&mut self, score: f64) -> Result<&mut Self> {
        let encoded = format_score(score)?;
        Ok(self.arg(encoded))
    }

    /// Mark the command as blocking on the server for up to `timeout`.
    pub fn blocking(&mut self, timeout: Duration) -> &mut Self {
        self.blocking = Some(timeout);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Name of the command including the subcommand for container
    /// commands such as `CLIENT KILL`. Used for logging.
    pub fn display_name(&self) -> String {
        match (self.name, self.args.get(1)) {
            ("CLIENT", Some(sub)) => format!("CLIENT {}", String::from_utf8_lossy(sub)),
            _ => self.name.to_string(),
        }
    }

    /// All arguments, including the command name at index 0.
    pub fn args(&self) -> &[Bytes] {
        &self.args
    }

    pub fn blocking_timeout(&self) -> Option<Duration> {
        self.blocking
    }

    /// RESP wire encoding.
    pub fn encode(&self) -> Vec<u8> {
        encode_command(&self.args)
    }
}

/// Wire spelling of a score: shortest round-trip decimal, `+inf` / `-inf`.
pub(crate) fn format_score(score: f64) -> Result<String> {
    if score.is_nan() {
        return Err(RsedisError::invalid("score must not be NaN"));
    }
    Ok(if score == f64::INFINITY {
        "+inf".to_string()
    } else if score == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        score.to_string()
    })
}

// ── Tests ──────────────────────────────────────────────────────────
