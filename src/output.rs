//! Reply decoding: from a raw [`RespValue`] to the shape a command
//! promises.
//!
//! Codec-independent helpers live here; member/key decoding through a
//! [`RedisCodec`](crate::codec::RedisCodec) happens at the call site.
//! Any mismatch between reply and expected shape is a `Type` error.

use bytes::Bytes;

use crate::error::{Result, RsedisError};
use crate::resp::parser::parse_float;
use crate::resp::types::RespValue;
use crate::types::{ReplicaInfo, Role, ScanCursor};

/// Turn error replies into `Err` and strip RESP3 attributes.
pub(crate) fn into_result(value: RespValue) -> Result<RespValue> {
    match value {
        RespValue::Error(msg) | RespValue::BulkError(msg) => Err(RsedisError::redis(msg)),
        RespValue::Attribute { data, .. } => into_result(*data),
        other => Ok(other),
    }
}

fn unexpected(expected: &str, got: &RespValue) -> RsedisError {
    RsedisError::Type(format!("expected {expected}, got {}", got.type_name()))
}

fn utf8(raw: Bytes, what: &str) -> Result<String> {
    String::from_utf8(raw.to_vec())
        .map_err(|_| RsedisError::Protocol(format!("{what} is not valid UTF-8")))
}

/// Status or text reply (`+OK`, bulk text, RESP3 verbatim text).
pub(crate) fn status(value: RespValue) -> Result<String> {
    match value {
        RespValue::SimpleString(s) => Ok(s),
        RespValue::VerbatimString { data, .. } => Ok(data),
        RespValue::BulkString(raw) => utf8(raw, "status reply"),
        other => Err(unexpected("status", &other)),
    }
}

pub(crate) fn integer(value: RespValue) -> Result<i64> {
    match value {
        RespValue::Integer(n) => Ok(n),
        RespValue::BulkString(ref raw) => std::str::from_utf8(raw)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| unexpected("integer", &value)),
        other => Err(unexpected("integer", &other)),
    }
}

pub(crate) fn optional_integer(value: RespValue) -> Result<Option<i64>> {
    match value {
        RespValue::Null => Ok(None),
        other => integer(other).map(Some),
    }
}

/// Score reply: RESP3 double, or a RESP2 bulk string such as `"1.5"` / `"inf"`.
pub(crate) fn double(value: RespValue) -> Result<f64> {
    match value {
        RespValue::Double(d) => Ok(d),
        RespValue::Integer(n) => Ok(n as f64),
        RespValue::BulkString(ref raw) => parse_float(raw).ok_or_else(|| unexpected("score", &value)),
        RespValue::SimpleString(ref s) => {
            parse_float(s.as_bytes()).ok_or_else(|| unexpected("score", &value))
        }
        other => Err(unexpected("score", &other)),
    }
}

pub(crate) fn optional_double(value: RespValue) -> Result<Option<f64>> {
    match value {
        RespValue::Null => Ok(None),
        other => double(other).map(Some),
    }
}

/// Payload of a bulk reply.
pub(crate) fn bytes(value: RespValue) -> Result<Bytes> {
    match value {
        RespValue::Null => Err(unexpected("bulk string", &RespValue::Null)),
        other => {
            let name = other.type_name();
            other
                .into_bytes()
                .ok_or_else(|| RsedisError::Type(format!("expected bulk string, got {name}")))
        }
    }
}

pub(crate) fn optional_bytes(value: RespValue) -> Result<Option<Bytes>> {
    match value {
        RespValue::Null => Ok(None),
        other => bytes(other).map(Some),
    }
}

/// Elements of a multi-bulk reply. A null array counts as empty.
pub(crate) fn elements(value: RespValue) -> Result<Vec<RespValue>> {
    match value {
        RespValue::Null => Ok(Vec::new()),
        other => {
            let name = other.type_name();
            other
                .into_elements()
                .ok_or_else(|| RsedisError::Type(format!("expected array, got {name}")))
        }
    }
}

/// Member payloads of a plain member list.
pub(crate) fn members(value: RespValue) -> Result<Vec<Bytes>> {
    elements(value)?.into_iter().map(bytes).collect()
}

/// `(member, score)` pairs from a `WITHSCORES`-style reply.
///
/// Accepts the RESP2 flat layout `[m1, s1, m2, s2]` and the RESP3 nested
/// layout `[[m1, s1], [m2, s2]]`.
pub(crate) fn scored_pairs(value: RespValue) -> Result<Vec<(Bytes, f64)>> {
    let items = elements(value)?;
    let nested = items
        .first()
        .is_some_and(|first| matches!(first, RespValue::Array(_)));

    if nested {
        return items
            .into_iter()
            .map(|pair| {
                let mut pair = elements(pair)?.into_iter();
                match (pair.next(), pair.next(), pair.next()) {
                    (Some(member), Some(score), None) => Ok((bytes(member)?, double(score)?)),
                    _ => Err(RsedisError::Type(
                        "scored pair must have exactly two elements".into(),
                    )),
                }
            })
            .collect();
    }

    if items.len() % 2 != 0 {
        return Err(RsedisError::Type(format!(
            "scored reply has odd element count {}",
            items.len()
        )));
    }
    let mut pairs = Vec::with_capacity(items.len() / 2);
    let mut iter = items.into_iter();
    while let (Some(member), Some(score)) = (iter.next(), iter.next()) {
        pairs.push((bytes(member)?, double(score)?));
    }
    Ok(pairs)
}

/// Single-pair reply (`ZPOPMIN key`, `ZRANDMEMBER key 1 WITHSCORES`).
pub(crate) fn optional_scored_pair(value: RespValue) -> Result<Option<(Bytes, f64)>> {
    let mut pairs = scored_pairs(value)?;
    match pairs.len() {
        0 => Ok(None),
        1 => Ok(pairs.pop()),
        n => Err(RsedisError::Type(format!("expected at most one scored pair, got {n}"))),
    }
}

/// `BZPOPMIN` / `BZPOPMAX` reply: `[key, member, score]`, or null on timeout.
pub(crate) fn blocking_pop(value: RespValue) -> Result<Option<(Bytes, Bytes, f64)>> {
    if value.is_null() {
        return Ok(None);
    }
    let mut items = elements(value)?.into_iter();
    match (items.next(), items.next(), items.next(), items.next()) {
        (Some(key), Some(member), Some(score), None) => {
            Ok(Some((bytes(key)?, bytes(member)?, double(score)?)))
        }
        _ => Err(RsedisError::Type(
            "blocking pop reply must have three elements".into(),
        )),
    }
}

/// `ZMSCORE` reply: one optional score per requested member.
pub(crate) fn optional_doubles(value: RespValue) -> Result<Vec<Option<f64>>> {
    elements(value)?.into_iter().map(optional_double).collect()
}

/// `ZSCAN` reply: `[cursor, [member, score, ...]]`.
pub(crate) fn scan_page(value: RespValue) -> Result<(ScanCursor, Vec<(Bytes, f64)>)> {
    let mut items = elements(value)?.into_iter();
    match (items.next(), items.next(), items.next()) {
        (Some(cursor), Some(page), None) => {
            let cursor = utf8(bytes(cursor)?, "scan cursor")?;
            Ok((ScanCursor::from_reply(cursor), scored_pairs(page)?))
        }
        _ => Err(RsedisError::Type(
            "scan reply must be [cursor, elements]".into(),
        )),
    }
}

// ── ROLE ───────────────────────────────────────────────────────────

fn text(value: RespValue) -> Result<String> {
    utf8(bytes(value)?, "text field")
}

fn port(value: RespValue) -> Result<u16> {
    let n = integer(value)?;
    u16::try_from(n).map_err(|_| RsedisError::Type(format!("port out of range: {n}")))
}

fn missing(field: &str) -> RsedisError {
    RsedisError::Type(format!("ROLE reply is missing {field}"))
}

pub(crate) fn role(value: RespValue) -> Result<Role> {
    let mut items = elements(value)?.into_iter();
    let kind = text(items.next().ok_or_else(|| missing("role name"))?)?;
    match kind.as_str() {
        "master" => {
            let offset = integer(items.next().ok_or_else(|| missing("offset"))?)?;
            let replicas = match items.next() {
                Some(list) => elements(list)?
                    .into_iter()
                    .map(replica_info)
                    .collect::<Result<_>>()?,
                None => Vec::new(),
            };
            Ok(Role::Master { offset, replicas })
        }
        "slave" | "replica" => {
            let master_host = text(items.next().ok_or_else(|| missing("master host"))?)?;
            let master_port = port(items.next().ok_or_else(|| missing("master port"))?)?;
            let state = text(items.next().ok_or_else(|| missing("replication state"))?)?;
            let offset = integer(items.next().ok_or_else(|| missing("offset"))?)?;
            Ok(Role::Replica {
                master_host,
                master_port,
                state,
                offset,
            })
        }
        "sentinel" => {
            let masters = match items.next() {
                Some(list) => elements(list)?
                    .into_iter()
                    .map(text)
                    .collect::<Result<_>>()?,
                None => Vec::new(),
            };
            Ok(Role::Sentinel { masters })
        }
        other => Err(RsedisError::Type(format!("unknown role: {other}"))),
    }
}

fn replica_info(value: RespValue) -> Result<ReplicaInfo> {
    let mut fields = elements(value)?.into_iter();
    let host = text(fields.next().ok_or_else(|| missing("replica host"))?)?;
    let port = port(fields.next().ok_or_else(|| missing("replica port"))?)?;
    let offset = integer(fields.next().ok_or_else(|| missing("replica offset"))?)?;
    Ok(ReplicaInfo { host, port, offset })
}

// ── Tests ──────────────────────────────────────────────────────────
