//! Optional argument bundles for commands with modifiers.
//!
//! Each bundle validates its own flag combinations and appends its wire
//! form to a [`Command`]. Invalid combinations surface as
//! `InvalidArgument` before anything is sent.

use std::time::Duration;

use bytes::Bytes;

use crate::command::Command;
use crate::error::{Result, RsedisError};

// ── ZADD ───────────────────────────────────────────────────────────

/// `ZADD` modifiers: `NX`, `XX`, `GT`, `LT`, `CH`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZAddArgs {
    nx: bool,
    xx: bool,
    gt: bool,
    lt: bool,
    ch: bool,
}

impl ZAddArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only add new members.
    pub fn nx(mut self) -> Self {
        self.nx = true;
        self
    }

    /// Only update existing members.
    pub fn xx(mut self) -> Self {
        self.xx = true;
        self
    }

    /// Only update when the new score is greater.
    pub fn gt(mut self) -> Self {
        self.gt = true;
        self
    }

    /// Only update when the new score is less.
    pub fn lt(mut self) -> Self {
        self.lt = true;
        self
    }

    /// Count changed members, not only added ones.
    pub fn ch(mut self) -> Self {
        self.ch = true;
        self
    }

    pub(crate) fn append_to(&self, cmd: &mut Command) -> Result<()> {
        if self.nx && self.xx {
            return Err(RsedisError::invalid("ZADD: NX and XX are mutually exclusive"));
        }
        if self.gt && self.lt {
            return Err(RsedisError::invalid("ZADD: GT and LT are mutually exclusive"));
        }
        if self.nx && (self.gt || self.lt) {
            return Err(RsedisError::invalid("ZADD: NX cannot be combined with GT or LT"));
        }
        for (set, flag) in [
            (self.nx, "NX"),
            (self.xx, "XX"),
            (self.gt, "GT"),
            (self.lt, "LT"),
            (self.ch, "CH"),
        ] {
            if set {
                cmd.arg(flag);
            }
        }
        Ok(())
    }
}

// ── ZUNION / ZINTER ────────────────────────────────────────────────

/// How scores of a member present in several inputs are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Sum,
    Min,
    Max,
}

impl Aggregate {
    fn as_str(self) -> &'static str {
        match self {
            Self::Sum => "SUM",
            Self::Min => "MIN",
            Self::Max => "MAX",
        }
    }
}

/// `WEIGHTS` and `AGGREGATE` for `ZUNION`, `ZINTER` and their `STORE`
/// variants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZAggregateArgs {
    weights: Option<Vec<f64>>,
    aggregate: Option<Aggregate>,
}

/// Same modifiers, used with `ZUNIONSTORE` / `ZINTERSTORE`.
pub type ZStoreArgs = ZAggregateArgs;

impl ZAggregateArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// One multiplication factor per input key, in key order.
    pub fn weights(mut self, weights: impl IntoIterator<Item = f64>) -> Self {
        self.weights = Some(weights.into_iter().collect());
        self
    }

    pub fn sum(self) -> Self {
        self.aggregate(Aggregate::Sum)
    }

    pub fn min(self) -> Self {
        self.aggregate(Aggregate::Min)
    }

    pub fn max(self) -> Self {
        self.aggregate(Aggregate::Max)
    }

    pub fn aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregate = Some(aggregate);
        self
    }

    pub(crate) fn append_to(&self, cmd: &mut Command, key_count: usize) -> Result<()> {
        if let Some(weights) = &self.weights {
            if weights.len() != key_count {
                return Err(RsedisError::invalid(format!(
                    "{} weights given for {key_count} keys",
                    weights.len()
                )));
            }
            cmd.arg("WEIGHTS");
            for &weight in weights {
                cmd.arg_score(weight)?;
            }
        }
        if let Some(aggregate) = self.aggregate {
            cmd.arg("AGGREGATE").arg(aggregate.as_str());
        }
        Ok(())
    }
}

// ── SCAN ───────────────────────────────────────────────────────────

/// `MATCH` / `COUNT` for `ZSCAN`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanArgs {
    pattern: Option<Bytes>,
    count: Option<u64>,
}

impl ScanArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Glob-style member filter.
    pub fn matches(mut self, pattern: impl Into<Bytes>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Page size hint. Must be positive.
    pub fn limit(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    pub(crate) fn append_to(&self, cmd: &mut Command) -> Result<()> {
        if let Some(pattern) = &self.pattern {
            cmd.arg("MATCH").arg(pattern.clone());
        }
        match self.count {
            Some(0) => return Err(RsedisError::invalid("SCAN COUNT must be positive")),
            Some(count) => {
                cmd.arg("COUNT").arg_uint(count);
            }
            None => {}
        }
        Ok(())
    }
}

// ── CLIENT KILL ────────────────────────────────────────────────────

/// Client kind filter for `CLIENT KILL TYPE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientType {
    Normal,
    Master,
    Replica,
    PubSub,
}

impl ClientType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Master => "master",
            Self::Replica => "replica",
            Self::PubSub => "pubsub",
        }
    }
}

/// Filters for the `CLIENT KILL <filter> <value> ...` form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KillArgs {
    addr: Option<String>,
    laddr: Option<String>,
    id: Option<u64>,
    client_type: Option<ClientType>,
    user: Option<String>,
    skipme: Option<bool>,
    maxage: Option<u64>,
}

impl KillArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remote `ip:port` of the client.
    pub fn addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = Some(addr.into());
        self
    }

    /// Local `ip:port` the client connected to.
    pub fn laddr(mut self, laddr: impl Into<String>) -> Self {
        self.laddr = Some(laddr.into());
        self
    }

    pub fn id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn client_type(mut self, client_type: ClientType) -> Self {
        self.client_type = Some(client_type);
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn skipme(mut self, skip: bool) -> Self {
        self.skipme = Some(skip);
        self
    }

    /// Only clients connected for at least `secs` seconds.
    pub fn maxage(mut self, secs: u64) -> Self {
        self.maxage = Some(secs);
        self
    }

    fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub(crate) fn append_to(&self, cmd: &mut Command) -> Result<()> {
        if self.is_empty() {
            return Err(RsedisError::invalid("CLIENT KILL needs at least one filter"));
        }
        if let Some(addr) = &self.addr {
            cmd.arg("ADDR").arg(addr.clone());
        }
        if let Some(laddr) = &self.laddr {
            cmd.arg("LADDR").arg(laddr.clone());
        }
        if let Some(id) = self.id {
            cmd.arg("ID").arg_uint(id);
        }
        if let Some(client_type) = self.client_type {
            cmd.arg("TYPE").arg(client_type.as_str());
        }
        if let Some(user) = &self.user {
            cmd.arg("USER").arg(user.clone());
        }
        if let Some(skip) = self.skipme {
            cmd.arg("SKIPME").arg(if skip { "yes" } else { "no" });
        }
        if let Some(maxage) = self.maxage {
            cmd.arg("MAXAGE").arg_uint(maxage);
        }
        Ok(())
    }
}

// ── CLIENT TRACKING ────────────────────────────────────────────────

/// Options for `CLIENT TRACKING ON|OFF`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingArgs {
    enabled: bool,
    redirect: Option<u64>,
    prefixes: Vec<Bytes>,
    bcast: bool,
    optin: bool,
    optout: bool,
    noloop: bool,
}

impl TrackingArgs {
    pub fn enabled() -> Self {
        Self::with_state(true)
    }

    pub fn disabled() -> Self {
        Self::with_state(false)
    }

    fn with_state(enabled: bool) -> Self {
        Self {
            enabled,
            redirect: None,
            prefixes: Vec::new(),
            bcast: false,
            optin: false,
            optout: false,
            noloop: false,
        }
    }

    /// Send invalidation messages to another connection.
    pub fn redirect(mut self, client_id: u64) -> Self {
        self.redirect = Some(client_id);
        self
    }

    /// Key prefixes to track in broadcasting mode.
    pub fn prefixes<P: Into<Bytes>>(mut self, prefixes: impl IntoIterator<Item = P>) -> Self {
        self.prefixes.extend(prefixes.into_iter().map(Into::into));
        self
    }

    pub fn bcast(mut self) -> Self {
        self.bcast = true;
        self
    }

    pub fn optin(mut self) -> Self {
        self.optin = true;
        self
    }

    pub fn optout(mut self) -> Self {
        self.optout = true;
        self
    }

    /// Skip invalidations for keys this connection modified itself.
    pub fn noloop(mut self) -> Self {
        self.noloop = true;
        self
    }

    pub(crate) fn append_to(&self, cmd: &mut Command) -> Result<()> {
        if self.optin && self.optout {
            return Err(RsedisError::invalid(
                "CLIENT TRACKING: OPTIN and OPTOUT are mutually exclusive",
            ));
        }
        if !self.prefixes.is_empty() && !self.bcast {
            return Err(RsedisError::invalid(
                "CLIENT TRACKING: PREFIX requires BCAST",
            ));
        }
        cmd.arg(if self.enabled { "ON" } else { "OFF" });
        if let Some(id) = self.redirect {
            cmd.arg("REDIRECT").arg_uint(id);
        }
        for prefix in &self.prefixes {
            cmd.arg("PREFIX").arg(prefix.clone());
        }
        for (set, flag) in [
            (self.bcast, "BCAST"),
            (self.optin, "OPTIN"),
            (self.optout, "OPTOUT"),
            (self.noloop, "NOLOOP"),
        ] {
            if set {
                cmd.arg(flag);
            }
        }
        Ok(())
    }
}

// ── CLIENT UNBLOCK ─────────────────────────────────────────────────

/// How `CLIENT UNBLOCK` wakes the blocked client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnblockType {
    /// As if the blocking timeout elapsed.
    #[default]
    Timeout,
    /// With an `-UNBLOCKED` error.
    Error,
}

impl UnblockType {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "TIMEOUT",
            Self::Error => "ERROR",
        }
    }
}

// ── Blocking timeouts ──────────────────────────────────────────────

/// Server-side blocking time for `BZPOPMIN` / `BZPOPMAX`.
///
/// Zero blocks indefinitely. Fractional seconds are carried with
/// millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockTimeout(Repr);

#[derive(Debug, Clone, Copy, PartialEq)]
enum Repr {
    Secs(u64),
    Fractional(f64),
}

impl BlockTimeout {
    pub fn secs(secs: u64) -> Self {
        Self(Repr::Secs(secs))
    }

    /// Negative or non-finite values are rejected when the command is built.
    pub fn secs_f64(secs: f64) -> Self {
        Self(Repr::Fractional(secs))
    }

    /// Block until data arrives.
    pub fn forever() -> Self {
        Self::secs(0)
    }

    /// Wire argument plus the duration the transport must wait on top of
    /// its normal read timeout.
    pub(crate) fn resolve(&self) -> Result<(String, Duration)> {
        match self.0 {
            Repr::Secs(secs) => {
                if secs > MAX_BLOCK_SECS {
                    return Err(out_of_range(secs));
                }
                Ok((secs.to_string(), Duration::from_secs(secs)))
            }
            Repr::Fractional(secs) => {
                if !secs.is_finite() || secs < 0.0 {
                    return Err(RsedisError::invalid(format!(
                        "blocking timeout must be a finite, non-negative number of seconds, got {secs}"
                    )));
                }
                if secs > MAX_BLOCK_SECS as f64 {
                    return Err(out_of_range(secs));
                }
                let mut millis = (secs * 1000.0).round() as u64;
                // A positive timeout must not turn into "block forever".
                if millis == 0 && secs > 0.0 {
                    millis = 1;
                }
                Ok((format_millis(millis), Duration::from_millis(millis)))
            }
        }
    }
}

impl From<Duration> for BlockTimeout {
    fn from(timeout: Duration) -> Self {
        Self::secs_f64(timeout.as_secs_f64())
    }
}

/// Largest timeout the server accepts: its millisecond form must fit in
/// a signed 64-bit integer.
const MAX_BLOCK_SECS: u64 = i64::MAX as u64 / 1000;

fn out_of_range(secs: impl std::fmt::Display) -> RsedisError {
    RsedisError::invalid(format!(
        "blocking timeout of {secs} seconds exceeds the maximum of {MAX_BLOCK_SECS}"
    ))
}

/// Decimal seconds with at most three fractional digits.
fn format_millis(millis: u64) -> String {
    let (secs, frac) = (millis / 1000, millis % 1000);
    if frac == 0 {
        return secs.to_string();
    }
    let frac = format!("{frac:03}");
    format!("{secs}.{}", frac.trim_end_matches('0'))
}

// ── Tests ──────────────────────────────────────────────────────────
