//! Shared helpers for integration tests.
//!
//! [`MockRedis`] is an in-process RESP2 server that keeps sorted sets in
//! memory and understands the subset of commands the tests exercise. It
//! records every command it receives so tests can assert on wire traffic.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use rsedis::resp::parse_slice;
use rsedis::resp::types::RespValue;
use rsedis::{
    ConnectionConfig, DedicatedRouter, RedisClient, StandaloneRouter, StringCodec,
};

/// Members kept sorted by score, then member bytes.
type ZSet = Vec<(Bytes, f64)>;

#[derive(Default)]
struct State {
    zsets: HashMap<Bytes, ZSet>,
    received: Vec<Vec<String>>,
}

pub struct MockRedis {
    addr: String,
    state: Arc<Mutex<State>>,
    connections: Arc<AtomicUsize>,
}

impl MockRedis {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let state = Arc::new(Mutex::new(State::default()));
        let connections = Arc::new(AtomicUsize::new(0));
        let next_id = Arc::new(AtomicI64::new(1));

        let (shared, counter) = (state.clone(), connections.clone());
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let id = next_id.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(serve(socket, shared.clone(), id));
            }
        });

        Self {
            addr,
            state,
            connections,
        }
    }

    pub fn url(&self) -> String {
        format!("redis://{}", self.addr)
    }

    pub fn config(&self) -> ConnectionConfig {
        ConnectionConfig::from_url(&self.url()).unwrap()
    }

    pub fn client(&self) -> RedisClient<StandaloneRouter, StringCodec> {
        RedisClient::from_url(&self.url(), StringCodec).unwrap()
    }

    pub fn dedicated(&self) -> RedisClient<DedicatedRouter, StringCodec> {
        RedisClient::dedicated(self.config(), StringCodec)
    }

    /// Every command received so far, across all connections.
    pub fn received(&self) -> Vec<Vec<String>> {
        self.state.lock().received.clone()
    }

    /// Received commands whose name matches `name`.
    pub fn received_named(&self, name: &str) -> Vec<Vec<String>> {
        self.received()
            .into_iter()
            .filter(|cmd| cmd.first().is_some_and(|n| n.eq_ignore_ascii_case(name)))
            .collect()
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

pub fn s(v: &str) -> String {
    v.to_string()
}

// ── Connection loop ────────────────────────────────────────────────

async fn serve(mut socket: TcpStream, state: Arc<Mutex<State>>, id: i64) {
    let mut session = Session { id, name: None };
    let mut pending = Vec::new();
    let mut chunk = vec![0u8; 16 * 1024];

    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        pending.extend_from_slice(&chunk[..n]);

        let mut out = Vec::new();
        let mut close = false;
        loop {
            let (frame, used) = match parse_slice(&pending) {
                Ok(Some(parsed)) => parsed,
                Ok(None) => break,
                Err(_) => return,
            };
            pending.drain(..used);
            let args = match frame {
                RespValue::Array(items) => items
                    .into_iter()
                    .filter_map(RespValue::into_bytes)
                    .collect::<Vec<_>>(),
                _ => return,
            };
            let (reply, quit) = handle(&state, &mut session, &args);
            encode(&reply, &mut out);
            if quit {
                close = true;
                break;
            }
        }

        if socket.write_all(&out).await.is_err() || close {
            return;
        }
    }
}

struct Session {
    id: i64,
    name: Option<Bytes>,
}

fn encode(value: &RespValue, out: &mut Vec<u8>) {
    match value {
        RespValue::SimpleString(s) => out.extend_from_slice(format!("+{s}\r\n").as_bytes()),
        RespValue::Error(e) => out.extend_from_slice(format!("-{e}\r\n").as_bytes()),
        RespValue::Integer(n) => out.extend_from_slice(format!(":{n}\r\n").as_bytes()),
        RespValue::BulkString(b) => {
            out.extend_from_slice(format!("${}\r\n", b.len()).as_bytes());
            out.extend_from_slice(b);
            out.extend_from_slice(b"\r\n");
        }
        RespValue::Null => out.extend_from_slice(b"$-1\r\n"),
        RespValue::Array(items) => {
            out.extend_from_slice(format!("*{}\r\n", items.len()).as_bytes());
            for item in items {
                encode(item, out);
            }
        }
        other => panic!("mock server cannot encode {other:?}"),
    }
}

// ── Command handling ───────────────────────────────────────────────

fn ok() -> RespValue {
    RespValue::SimpleString("OK".into())
}

fn err(msg: &str) -> RespValue {
    RespValue::Error(msg.to_string())
}

fn text(arg: &Bytes) -> String {
    String::from_utf8_lossy(arg).into_owned()
}

fn score_reply(score: f64) -> RespValue {
    RespValue::bulk(score.to_string())
}

fn parse_score(arg: &Bytes) -> Option<f64> {
    match text(arg).as_str() {
        "+inf" | "inf" => Some(f64::INFINITY),
        "-inf" => Some(f64::NEG_INFINITY),
        other => other.parse().ok(),
    }
}

/// `x`, `(x`, `-inf`, `+inf` → (value, exclusive)
fn parse_bound(arg: &Bytes) -> Option<(f64, bool)> {
    match arg.strip_prefix(b"(") {
        Some(rest) => parse_score(&Bytes::copy_from_slice(rest)).map(|v| (v, true)),
        None => parse_score(arg).map(|v| (v, false)),
    }
}

fn above(score: f64, (bound, exclusive): (f64, bool)) -> bool {
    if exclusive {
        score > bound
    } else {
        score >= bound
    }
}

fn below(score: f64, (bound, exclusive): (f64, bool)) -> bool {
    if exclusive {
        score < bound
    } else {
        score <= bound
    }
}

fn sort(zset: &mut ZSet) {
    zset.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
}

fn flatten(items: impl IntoIterator<Item = (Bytes, f64)>, with_scores: bool) -> RespValue {
    let mut out = Vec::new();
    for (member, score) in items {
        out.push(RespValue::BulkString(member));
        if with_scores {
            out.push(score_reply(score));
        }
    }
    RespValue::Array(out)
}

fn has_flag(args: &[Bytes], flag: &str) -> bool {
    args.iter().any(|a| a.eq_ignore_ascii_case(flag.as_bytes()))
}

/// `LIMIT offset count` if present.
fn limit(args: &[Bytes]) -> Option<(usize, i64)> {
    let pos = args.iter().position(|a| a.eq_ignore_ascii_case(b"LIMIT"))?;
    let offset = text(args.get(pos + 1)?).parse().ok()?;
    let count = text(args.get(pos + 2)?).parse().ok()?;
    Some((offset, count))
}

fn apply_limit(items: Vec<(Bytes, f64)>, limit: Option<(usize, i64)>) -> Vec<(Bytes, f64)> {
    match limit {
        None => items,
        Some((offset, count)) if count < 0 => items.into_iter().skip(offset).collect(),
        Some((offset, count)) => items.into_iter().skip(offset).take(count as usize).collect(),
    }
}

fn handle(state: &Mutex<State>, session: &mut Session, args: &[Bytes]) -> (RespValue, bool) {
    let mut state = state.lock();
    state.received.push(args.iter().map(text).collect());

    let Some(name) = args.first() else {
        return (err("ERR empty command"), false);
    };
    let name = text(name).to_ascii_uppercase();
    let reply = match name.as_str() {
        "PING" => match args.get(1) {
            Some(msg) => RespValue::BulkString(msg.clone()),
            None => RespValue::SimpleString("PONG".into()),
        },
        "ECHO" => RespValue::BulkString(args[1].clone()),
        "AUTH" => match args.last().map(text).as_deref() {
            Some("secret") => ok(),
            _ => err("WRONGPASS invalid username-password pair or user is disabled."),
        },
        "SELECT" => ok(),
        "QUIT" => return (ok(), true),
        "CLIENT" => client_command(session, &args[1..]),
        _ => zset_command(&mut state.zsets, &name, args),
    };
    (reply, false)
}

fn client_command(session: &mut Session, args: &[Bytes]) -> RespValue {
    let sub = args.first().map(text).unwrap_or_default().to_ascii_uppercase();
    match sub.as_str() {
        "SETNAME" => {
            session.name = args.get(1).cloned();
            ok()
        }
        "GETNAME" => session
            .name
            .clone()
            .map(RespValue::BulkString)
            .unwrap_or(RespValue::Null),
        "ID" => RespValue::Integer(session.id),
        _ => err("ERR unknown CLIENT subcommand"),
    }
}

fn zset_command(zsets: &mut HashMap<Bytes, ZSet>, name: &str, args: &[Bytes]) -> RespValue {
    match name {
        "ZADD" => zadd(zsets, args),
        "ZCARD" => RespValue::Integer(zsets.get(&args[1]).map_or(0, |z| z.len() as i64)),
        "ZSCORE" => zsets
            .get(&args[1])
            .and_then(|z| z.iter().find(|(m, _)| *m == args[2]))
            .map_or(RespValue::Null, |(_, score)| score_reply(*score)),
        "ZREM" => {
            let Some(zset) = zsets.get_mut(&args[1]) else {
                return RespValue::Integer(0);
            };
            let before = zset.len();
            zset.retain(|(m, _)| !args[2..].contains(m));
            RespValue::Integer((before - zset.len()) as i64)
        }
        "ZRANGE" | "ZREVRANGE" => {
            let mut items = zsets.get(&args[1]).cloned().unwrap_or_default();
            if name == "ZREVRANGE" {
                items.reverse();
            }
            let len = items.len() as i64;
            let index = |arg: &Bytes| {
                let i: i64 = text(arg).parse().unwrap_or(0);
                if i < 0 {
                    (len + i).max(0)
                } else {
                    i
                }
            };
            let (start, stop) = (index(&args[2]), index(&args[3]).min(len - 1));
            let picked = if start > stop {
                Vec::new()
            } else {
                items[start as usize..=stop as usize].to_vec()
            };
            flatten(picked, has_flag(&args[4..], "WITHSCORES"))
        }
        "ZRANGEBYSCORE" | "ZREVRANGEBYSCORE" => {
            let reverse = name == "ZREVRANGEBYSCORE";
            let (min_arg, max_arg) = if reverse {
                (&args[3], &args[2])
            } else {
                (&args[2], &args[3])
            };
            let (Some(min), Some(max)) = (parse_bound(min_arg), parse_bound(max_arg)) else {
                return err("ERR min or max is not a float");
            };
            let mut items: Vec<_> = zsets
                .get(&args[1])
                .map(|z| {
                    z.iter()
                        .filter(|(_, s)| above(*s, min) && below(*s, max))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            if reverse {
                items.reverse();
            }
            let items = apply_limit(items, limit(&args[4..]));
            flatten(items, has_flag(&args[4..], "WITHSCORES"))
        }
        "ZSCAN" => zscan(zsets, args),
        "ZUNIONSTORE" => {
            let count: usize = text(&args[2]).parse().unwrap_or(0);
            let mut union: HashMap<Bytes, f64> = HashMap::new();
            for key in &args[3..3 + count] {
                for (member, score) in zsets.get(key).into_iter().flatten() {
                    *union.entry(member.clone()).or_insert(0.0) += score;
                }
            }
            let mut stored: ZSet = union.into_iter().collect();
            sort(&mut stored);
            let len = stored.len() as i64;
            if stored.is_empty() {
                zsets.remove(&args[1]);
            } else {
                zsets.insert(args[1].clone(), stored);
            }
            RespValue::Integer(len)
        }
        "BZPOPMIN" => {
            let keys = &args[1..args.len() - 1];
            for key in keys {
                if let Some(zset) = zsets.get_mut(key) {
                    if !zset.is_empty() {
                        let (member, score) = zset.remove(0);
                        if zset.is_empty() {
                            zsets.remove(key);
                        }
                        return RespValue::Array(vec![
                            RespValue::BulkString(key.clone()),
                            RespValue::BulkString(member),
                            score_reply(score),
                        ]);
                    }
                }
            }
            RespValue::Null
        }
        _ => err(&format!("ERR unknown command '{name}'")),
    }
}

fn zadd(zsets: &mut HashMap<Bytes, ZSet>, args: &[Bytes]) -> RespValue {
    let key = args[1].clone();
    let mut i = 2;
    let (mut nx, mut xx, mut gt, mut lt, mut ch, mut incr) = (false, false, false, false, false, false);
    while let Some(arg) = args.get(i) {
        match text(arg).to_ascii_uppercase().as_str() {
            "NX" => nx = true,
            "XX" => xx = true,
            "GT" => gt = true,
            "LT" => lt = true,
            "CH" => ch = true,
            "INCR" => incr = true,
            _ => break,
        }
        i += 1;
    }
    let pairs = &args[i..];
    if pairs.is_empty() || pairs.len() % 2 != 0 {
        return err("ERR syntax error");
    }

    let zset = zsets.entry(key).or_default();
    let (mut added, mut changed) = (0, 0);
    let mut incr_result = None;
    for pair in pairs.chunks(2) {
        let Some(score) = parse_score(&pair[0]) else {
            return err("ERR value is not a valid float");
        };
        let member = pair[1].clone();
        let existing = zset.iter().position(|(m, _)| *m == member);
        if (nx && existing.is_some()) || (xx && existing.is_none()) {
            continue;
        }
        let old = existing.map(|p| zset[p].1);
        let new = if incr { old.unwrap_or(0.0) + score } else { score };
        if let Some(old) = old {
            if (gt && new <= old) || (lt && new >= old) {
                continue;
            }
        }
        incr_result = Some(new);
        match existing {
            Some(pos) => {
                if zset[pos].1 != new {
                    zset[pos].1 = new;
                    changed += 1;
                }
            }
            None => {
                zset.push((member, new));
                added += 1;
            }
        }
    }
    sort(zset);

    if incr {
        return incr_result.map_or(RespValue::Null, score_reply);
    }
    RespValue::Integer(if ch { added + changed } else { added })
}

fn zscan(zsets: &HashMap<Bytes, ZSet>, args: &[Bytes]) -> RespValue {
    let Ok(offset) = text(&args[2]).parse::<usize>() else {
        return err("ERR invalid cursor");
    };
    let opts = &args[3..];
    let mut count = 10;
    let mut prefix: Option<Bytes> = None;
    for pair in opts.chunks(2) {
        match (text(&pair[0]).to_ascii_uppercase().as_str(), pair.get(1)) {
            ("COUNT", Some(n)) => count = text(n).parse().unwrap_or(10),
            ("MATCH", Some(p)) => {
                prefix = Some(Bytes::copy_from_slice(p.strip_suffix(b"*").unwrap_or(&p[..])))
            }
            _ => return err("ERR syntax error"),
        }
    }

    let zset = zsets.get(&args[1]).cloned().unwrap_or_default();
    let end = (offset + count).min(zset.len());
    let page = zset
        .get(offset.min(end)..end)
        .unwrap_or_default()
        .iter()
        .filter(|(m, _)| prefix.as_ref().map_or(true, |p| m.starts_with(p)))
        .cloned();
    let next = if end >= zset.len() { 0 } else { end };
    RespValue::Array(vec![RespValue::bulk(next.to_string()), flatten(page, true)])
}
