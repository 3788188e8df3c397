use std::io;

use thiserror::Error;

// ── Failure taxonomy ───────────────────────────────────────────────
//
//  RsedisError
//  ├── InvalidArgument      rejected before anything is sent
//  ├── Redis { kind }       server error reply          ┐
//  ├── Protocol             malformed RESP              ├ protocol failures
//  ├── Type                 reply shape does not match  ┘
//  ├── Connection           socket I/O                  ┐ transport failures
//  └── Timeout              connect / read deadline     ┘

/// Structured Redis error kinds for programmatic matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedisErrorKind {
    /// Generic ERR
    Err,
    /// WRONGTYPE Operation against a key holding the wrong kind of value
    WrongType,
    /// NOAUTH Authentication required
    NoAuth,
    /// WRONGPASS invalid username-password pair
    WrongPass,
    /// MOVED slot host:port  (cluster)
    Moved { slot: u16, addr: String },
    /// ASK slot host:port  (cluster)
    Ask { slot: u16, addr: String },
    /// CLUSTERDOWN
    ClusterDown,
    /// LOADING Redis is loading the dataset in memory
    Loading,
    /// READONLY You can't write against a read only replica
    ReadOnly,
    /// NOSCRIPT No matching script
    NoScript,
    /// BUSY Redis is busy running a script
    Busy,
    /// TRYAGAIN
    TryAgain,
    /// Any other Redis error prefix
    Other(String),
}

impl RedisErrorKind {
    /// Classify a Redis error message (e.g. "WRONGTYPE Operation against…").
    pub fn from_error_msg(msg: &str) -> Self {
        if let Some(rest) = msg.strip_prefix("MOVED ") {
            return match parse_redirect(rest) {
                Some((slot, addr)) => Self::Moved { slot, addr },
                None => Self::Other("MOVED".to_string()),
            };
        }
        if let Some(rest) = msg.strip_prefix("ASK ") {
            return match parse_redirect(rest) {
                Some((slot, addr)) => Self::Ask { slot, addr },
                None => Self::Other("ASK".to_string()),
            };
        }

        let prefix = msg.split_whitespace().next().unwrap_or("UNKNOWN");
        match prefix {
            "ERR" => Self::Err,
            "WRONGTYPE" => Self::WrongType,
            "NOAUTH" => Self::NoAuth,
            "WRONGPASS" => Self::WrongPass,
            "CLUSTERDOWN" => Self::ClusterDown,
            "LOADING" => Self::Loading,
            "READONLY" => Self::ReadOnly,
            "NOSCRIPT" => Self::NoScript,
            "BUSY" => Self::Busy,
            "TRYAGAIN" => Self::TryAgain,
            other => Self::Other(other.to_string()),
        }
    }
}

fn parse_redirect(rest: &str) -> Option<(u16, String)> {
    let (slot, addr) = rest.split_once(' ')?;
    Some((slot.parse().ok()?, addr.to_string()))
}

/// Coarse failure class, used by callers that only care where a call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Caller input was rejected before submission.
    InvalidArgument,
    /// The server answered with an error, or the reply could not be decoded.
    Protocol,
    /// The connection failed or timed out.
    Transport,
}

/// All error variants for rsedis.
#[derive(Debug, Error)]
pub enum RsedisError {
    /// Malformed or empty caller input, detected before any I/O.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Redis returned an error reply.
    #[error("redis error: {message}")]
    Redis {
        kind: RedisErrorKind,
        message: String,
    },
    /// RESP protocol parse errors
    #[error("protocol error: {0}")]
    Protocol(String),
    /// The reply does not have the shape the command expects
    #[error("type error: {0}")]
    Type(String),
    /// TCP / IO level errors
    #[error("connection error: {0}")]
    Connection(#[from] io::Error),
    /// Connect or read deadline exceeded
    #[error("timeout: {0}")]
    Timeout(String),
}

impl RsedisError {
    /// Create a Redis error from a raw error message, auto-parsing the kind.
    pub fn redis(msg: impl Into<String>) -> Self {
        let message = msg.into();
        let kind = RedisErrorKind::from_error_msg(&message);
        Self::Redis { kind, message }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Which part of the round trip failed.
    pub fn class(&self) -> FailureClass {
        match self {
            Self::InvalidArgument(_) => FailureClass::InvalidArgument,
            Self::Redis { .. } | Self::Protocol(_) | Self::Type(_) => FailureClass::Protocol,
            Self::Connection(_) | Self::Timeout(_) => FailureClass::Transport,
        }
    }

    /// The server-side error kind, if this is an error reply.
    pub fn redis_kind(&self) -> Option<&RedisErrorKind> {
        match self {
            Self::Redis { kind, .. } => Some(kind),
            _ => None,
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        self.class() == FailureClass::InvalidArgument
    }

    pub fn is_transport(&self) -> bool {
        self.class() == FailureClass::Transport
    }
}

pub type Result<T> = std::result::Result<T, RsedisError>;

// ── Tests ──────────────────────────────────────────────────────────
