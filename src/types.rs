//! Value types shared by the command traits: scored members, key/value
//! pairs, score and lex ranges, `LIMIT` clauses and scan cursors.

use bytes::{BufMut, Bytes, BytesMut};

use crate::command::format_score;
use crate::error::{Result, RsedisError};

/// A sorted-set member together with its score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredValue<V> {
    pub score: f64,
    pub value: V,
}

impl<V> ScoredValue<V> {
    pub fn new(score: f64, value: V) -> Self {
        Self { score, value }
    }
}

/// A value tagged with the key it came from (blocking pops).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue<K, V> {
    pub key: K,
    pub value: V,
}

impl<K, V> KeyValue<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }
}

// ── Ranges ─────────────────────────────────────────────────────────

/// One end of a [`Range`].
#[derive(Debug, Clone, PartialEq)]
pub enum Boundary<T> {
    Including(T),
    Excluding(T),
    Unbounded,
}

impl<T> Boundary<T> {
    fn value(&self) -> Option<&T> {
        match self {
            Self::Including(v) | Self::Excluding(v) => Some(v),
            Self::Unbounded => None,
        }
    }
}

/// A score range (`Range<f64>`) or lex range (`Range<V>`).
///
/// ```
/// use rsedis::{Boundary, Range};
///
/// let all: Range<f64> = Range::unbounded();
/// let closed = Range::inclusive(1.0, 5.0);
/// let above_two = Range::new(Boundary::Excluding(2.0), Boundary::Unbounded);
/// # let _ = (all, closed, above_two);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Range<T> {
    lower: Boundary<T>,
    upper: Boundary<T>,
}

impl<T> Range<T> {
    pub fn new(lower: Boundary<T>, upper: Boundary<T>) -> Self {
        Self { lower, upper }
    }

    /// Both ends included.
    pub fn inclusive(lower: T, upper: T) -> Self {
        Self::new(Boundary::Including(lower), Boundary::Including(upper))
    }

    pub fn unbounded() -> Self {
        Self::new(Boundary::Unbounded, Boundary::Unbounded)
    }

    pub fn lower(&self) -> &Boundary<T> {
        &self.lower
    }

    pub fn upper(&self) -> &Boundary<T> {
        &self.upper
    }
}

impl Range<f64> {
    /// Wire form `[min, max]`: `x`, `(x`, `-inf` / `+inf`.
    ///
    /// Rejects NaN and ranges whose lower end lies above the upper end.
    pub(crate) fn score_bounds(&self) -> Result<[String; 2]> {
        if let (Some(lo), Some(hi)) = (self.lower.value(), self.upper.value()) {
            if lo > hi {
                return Err(RsedisError::invalid(format!(
                    "score range lower bound {lo} is above upper bound {hi}"
                )));
            }
        }
        Ok([
            encode_score_boundary(&self.lower, "-inf")?,
            encode_score_boundary(&self.upper, "+inf")?,
        ])
    }
}

fn encode_score_boundary(boundary: &Boundary<f64>, unbounded: &str) -> Result<String> {
    match boundary {
        Boundary::Including(v) => format_score(*v),
        Boundary::Excluding(v) => Ok(format!("({}", format_score(*v)?)),
        Boundary::Unbounded => Ok(unbounded.to_string()),
    }
}

/// Wire form `[min, max]` of a lex range: `[v`, `(v`, `-` / `+`.
///
/// Bounds are compared in byte order after encoding.
pub(crate) fn lex_bounds<V>(range: &Range<V>, encode: impl Fn(&V) -> Bytes) -> Result<[Bytes; 2]> {
    let lower = range.lower.value().map(&encode);
    let upper = range.upper.value().map(&encode);
    if let (Some(lo), Some(hi)) = (&lower, &upper) {
        if lo > hi {
            return Err(RsedisError::invalid(
                "lex range lower bound sorts after upper bound",
            ));
        }
    }
    Ok([
        encode_lex_boundary(&range.lower, lower, b'-'),
        encode_lex_boundary(&range.upper, upper, b'+'),
    ])
}

fn encode_lex_boundary<V>(boundary: &Boundary<V>, raw: Option<Bytes>, unbounded: u8) -> Bytes {
    let (marker, raw) = match (boundary, raw) {
        (Boundary::Including(_), Some(raw)) => (b'[', raw),
        (Boundary::Excluding(_), Some(raw)) => (b'(', raw),
        _ => return Bytes::copy_from_slice(&[unbounded]),
    };
    let mut buf = BytesMut::with_capacity(raw.len() + 1);
    buf.put_u8(marker);
    buf.put_slice(&raw);
    buf.freeze()
}

// ── LIMIT ──────────────────────────────────────────────────────────

/// `LIMIT offset count` clause. A negative count returns everything
/// from `offset` on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Limit {
    bounds: Option<(u64, i64)>,
}

impl Limit {
    pub fn new(offset: u64, count: i64) -> Self {
        Self {
            bounds: Some((offset, count)),
        }
    }

    /// No `LIMIT` clause at all.
    pub fn unlimited() -> Self {
        Self { bounds: None }
    }

    pub fn offset(&self) -> Option<u64> {
        self.bounds.map(|(offset, _)| offset)
    }

    pub fn count(&self) -> Option<i64> {
        self.bounds.map(|(_, count)| count)
    }

    pub fn is_limited(&self) -> bool {
        self.bounds.is_some()
    }
}

// ── Scan cursors ───────────────────────────────────────────────────

/// Where a scan stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Nothing fetched yet.
    Fresh,
    InProgress,
    /// The server returned cursor `0`; no more pages.
    Done,
}

/// Opaque resumable cursor for `ZSCAN`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanCursor {
    cursor: String,
    finished: bool,
}

impl ScanCursor {
    pub fn initial() -> Self {
        Self {
            cursor: "0".to_string(),
            finished: false,
        }
    }

    /// Resume from a cursor string returned by an earlier page.
    pub fn of(cursor: impl Into<String>) -> Self {
        Self {
            cursor: cursor.into(),
            finished: false,
        }
    }

    /// Successor cursor as returned by the server.
    pub(crate) fn from_reply(cursor: String) -> Self {
        let finished = cursor == "0";
        Self { cursor, finished }
    }

    pub fn cursor(&self) -> &str {
        &self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn state(&self) -> ScanState {
        if self.finished {
            ScanState::Done
        } else if self.cursor == "0" {
            ScanState::Fresh
        } else {
            ScanState::InProgress
        }
    }

    /// The cursor argument to send, if this cursor may be resumed.
    pub(crate) fn resume_arg(&self) -> Result<&str> {
        if self.finished {
            return Err(RsedisError::invalid("scan cursor is already finished"));
        }
        if self.cursor.is_empty() || !self.cursor.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RsedisError::invalid(format!(
                "malformed scan cursor: {:?}",
                self.cursor
            )));
        }
        Ok(&self.cursor)
    }
}

impl Default for ScanCursor {
    fn default() -> Self {
        Self::initial()
    }
}

/// One `ZSCAN` page plus the cursor to continue from.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredValueScanCursor<V> {
    cursor: ScanCursor,
    values: Vec<ScoredValue<V>>,
}

impl<V> ScoredValueScanCursor<V> {
    pub(crate) fn new(cursor: ScanCursor, values: Vec<ScoredValue<V>>) -> Self {
        Self { cursor, values }
    }

    /// Successor cursor; pass it to `zscan_cursor` for the next page.
    pub fn cursor(&self) -> &ScanCursor {
        &self.cursor
    }

    pub fn values(&self) -> &[ScoredValue<V>] {
        &self.values
    }

    pub fn is_finished(&self) -> bool {
        self.cursor.is_finished()
    }

    pub fn into_parts(self) -> (ScanCursor, Vec<ScoredValue<V>>) {
        (self.cursor, self.values)
    }
}

// ── ROLE ───────────────────────────────────────────────────────────

/// A replica as listed in a master's `ROLE` reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicaInfo {
    pub host: String,
    pub port: u16,
    pub offset: i64,
}

/// Parsed `ROLE` reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Master {
        offset: i64,
        replicas: Vec<ReplicaInfo>,
    },
    Replica {
        master_host: String,
        master_port: u16,
        /// `connect`, `connecting`, `sync`, `connected` or `handshake`.
        state: String,
        offset: i64,
    },
    Sentinel {
        masters: Vec<String>,
    },
}

// ── Tests ──────────────────────────────────────────────────────────
