//! Connection configuration and URL parsing.
//!
//! Supported URL forms:
//! - `redis://[user:pass@]host[:port][/db][?protocol=3&client_name=name]`
//! - `rediss://…` (parsed, but TLS connections are refused at connect time)

use crate::error::{Result, RsedisError};

/// Default Redis port.
pub const DEFAULT_PORT: u16 = 6379;

/// Default maximum read buffer size (512 MB).
pub const DEFAULT_MAX_BUF_SIZE: usize = 512 * 1024 * 1024;

/// RESP dialect negotiated during the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProtocolVersion {
    #[default]
    Resp2,
    /// Negotiated with `HELLO 3`.
    Resp3,
}

/// Full connection configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    /// Optional username (Redis 6+ ACL).
    pub username: Option<String>,
    pub password: Option<String>,
    /// Database index selected after connecting.
    pub db: u16,
    pub tls: bool,
    pub protocol: ProtocolVersion,
    /// Sent with `CLIENT SETNAME` (or `HELLO … SETNAME`) on every new connection.
    pub client_name: Option<String>,
    /// Connection pool size.
    pub pool_size: usize,
    pub connect_timeout_ms: u64,
    /// Read/response timeout in milliseconds (0 = no timeout).
    ///
    /// Blocking commands get their own blocking time added on top.
    pub read_timeout_ms: u64,
    /// Pooled connections idle longer than this are dropped.
    pub idle_timeout_ms: u64,
    /// Maximum read buffer size per connection in bytes.
    pub max_buffer_size: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            username: None,
            password: None,
            db: 0,
            tls: false,
            protocol: ProtocolVersion::Resp2,
            client_name: None,
            pool_size: 8,
            connect_timeout_ms: 5000,
            read_timeout_ms: 30_000,
            idle_timeout_ms: 300_000,
            max_buffer_size: DEFAULT_MAX_BUF_SIZE,
        }
    }
}

impl ConnectionConfig {
    /// Parse a Redis URL into a ConnectionConfig.
    pub fn from_url(url: &str) -> Result<Self> {
        let mut config = Self::default();

        let (scheme, rest) = url
            .split_once("://")
            .ok_or_else(|| invalid(format!("invalid URL, missing ://: {url}")))?;

        match scheme {
            "redis" => {}
            "rediss" => config.tls = true,
            _ => return Err(invalid(format!("unknown URL scheme: {scheme}"))),
        }

        let (rest, query) = match rest.split_once('?') {
            Some((before, q)) => (before, Some(q)),
            None => (rest, None),
        };

        let (host_part, db_part) = split_path(rest);
        if let Some(db_str) = db_part {
            config.db = db_str
                .parse()
                .map_err(|_| invalid(format!("invalid db number: {db_str}")))?;
        }

        let host_port = match host_part.rsplit_once('@') {
            Some((userinfo, hp)) => {
                parse_userinfo(&mut config, userinfo);
                hp
            }
            None => host_part,
        };
        let (host, port) = parse_host_port(host_port)?;
        config.host = host;
        config.port = port;

        if let Some(query) = query {
            parse_query(&mut config, query)?;
        }

        Ok(config)
    }

    /// Return the primary address as "host:port".
    pub fn primary_addr(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

fn invalid(msg: String) -> RsedisError {
    RsedisError::InvalidArgument(msg)
}

// ── URL parsing helpers ────────────────────────────────────────────

/// Split `rest` into (before_path, Some(path)) or (rest, None).
fn split_path(rest: &str) -> (&str, Option<&str>) {
    match rest.split_once('/') {
        Some((before, after)) if !after.is_empty() => (before, Some(after)),
        Some((before, _)) => (before, None),
        None => (rest, None),
    }
}

/// Parse `user:pass`, `:pass` or a bare password into config.
fn parse_userinfo(config: &mut ConnectionConfig, userinfo: &str) {
    let (user, pass) = userinfo.split_once(':').unwrap_or(("", userinfo));
    if !user.is_empty() {
        config.username = Some(user.to_string());
    }
    if !pass.is_empty() {
        config.password = Some(pass.to_string());
    }
}

/// Parse `host[:port]` or `[ipv6]:port`.
fn parse_host_port(s: &str) -> Result<(String, u16)> {
    let (host, port) = if let Some(inner) = s.strip_prefix('[') {
        let (host, after) = inner
            .split_once(']')
            .ok_or_else(|| invalid(format!("unclosed IPv6 bracket: {s}")))?;
        let port = match after.strip_prefix(':') {
            Some(p) => parse_port(p)?,
            None => DEFAULT_PORT,
        };
        (host.to_string(), port)
    } else {
        match s.rsplit_once(':') {
            // Bare IPv6 without brackets: everything is the host.
            Some((h, _)) if h.contains(':') => (s.to_string(), DEFAULT_PORT),
            Some((h, p)) => (h.to_string(), parse_port(p)?),
            None => (s.to_string(), DEFAULT_PORT),
        }
    };

    if host.is_empty() {
        return Ok(("127.0.0.1".to_string(), port));
    }
    Ok((host, port))
}

fn parse_port(p: &str) -> Result<u16> {
    p.parse().map_err(|_| invalid(format!("invalid port: {p}")))
}

/// `protocol=2|3|resp2|resp3` and `client_name=…`; unknown keys are errors.
fn parse_query(config: &mut ConnectionConfig, query: &str) -> Result<()> {
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        match key {
            "protocol" => {
                config.protocol = match value.to_ascii_lowercase().as_str() {
                    "2" | "resp2" => ProtocolVersion::Resp2,
                    "3" | "resp3" => ProtocolVersion::Resp3,
                    other => return Err(invalid(format!("invalid protocol: {other}"))),
                }
            }
            "client_name" if !value.is_empty() => config.client_name = Some(value.to_string()),
            "client_name" => return Err(invalid("empty client_name".to_string())),
            other => return Err(invalid(format!("unknown URL parameter: {other}"))),
        }
    }
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────
