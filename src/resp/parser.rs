//! Streaming RESP2/RESP3 parser.
//!
//! [`parse`] reads one frame from the front of a buffer and returns
//! `Ok(Some((value, bytes_consumed)))`, `Ok(None)` when the frame is not
//! complete yet, or `Err(Protocol(…))` on malformed input.
//!
//! Bulk strings are sliced out of the ref-counted `Bytes` buffer, so large
//! payloads are never copied.

use bytes::Bytes;
use memchr::memchr;

use crate::error::{Result, RsedisError};
use crate::resp::types::RespValue;

/// Parse one RESP value from the front of `buf`.
pub fn parse(buf: &Bytes) -> Result<Option<(RespValue, usize)>> {
    let mut reader = Reader { buf, pos: 0 };
    match reader.value() {
        Ok(value) => Ok(Some((value, reader.pos))),
        Err(Halt::Incomplete) => Ok(None),
        Err(Halt::Invalid(e)) => Err(e),
    }
}

/// Convenience wrapper: parse from a byte slice (copies into `Bytes` first).
pub fn parse_slice(buf: &[u8]) -> Result<Option<(RespValue, usize)>> {
    parse(&Bytes::copy_from_slice(buf))
}

/// Why the reader stopped before producing a value.
enum Halt {
    Incomplete,
    Invalid(RsedisError),
}

type Step<T> = std::result::Result<T, Halt>;

fn invalid<T>(msg: impl Into<String>) -> Step<T> {
    Err(Halt::Invalid(RsedisError::Protocol(msg.into())))
}

struct Reader<'a> {
    buf: &'a Bytes,
    pos: usize,
}

impl<'a> Reader<'a> {
    fn value(&mut self) -> Step<RespValue> {
        let Some(&marker) = self.buf.get(self.pos) else {
            return Err(Halt::Incomplete);
        };
        self.pos += 1;

        match marker {
            b'+' => Ok(RespValue::SimpleString(self.text_line("simple string")?)),
            b'-' => Ok(RespValue::Error(self.text_line("error")?)),
            b':' => Ok(RespValue::Integer(self.int_line()?)),
            b'$' => match self.length()? {
                None => Ok(RespValue::Null),
                Some(len) => Ok(RespValue::BulkString(self.blob(len, "bulk string")?)),
            },
            b'*' => match self.length()? {
                None => Ok(RespValue::Null),
                Some(count) => Ok(RespValue::Array(self.values(count)?)),
            },
            b'_' => {
                if !self.line()?.is_empty() {
                    return invalid("null type not terminated by \\r\\n");
                }
                Ok(RespValue::Null)
            }
            b'#' => match self.line()? {
                b"t" => Ok(RespValue::Boolean(true)),
                b"f" => Ok(RespValue::Boolean(false)),
                other => invalid(format!("invalid boolean value: {other:?}")),
            },
            b',' => self.double(),
            b'(' => self.big_number(),
            b'!' => {
                let len = self.required_length("bulk error")?;
                let raw = self.blob(len, "bulk error")?;
                Ok(RespValue::BulkError(utf8(raw.to_vec(), "bulk error")?))
            }
            b'=' => self.verbatim(),
            b'%' => {
                let count = self.required_length("map")?;
                Ok(RespValue::Map(self.pairs(count)?))
            }
            b'~' => {
                let count = self.required_length("set")?;
                Ok(RespValue::Set(self.values(count)?))
            }
            b'>' => self.push(),
            b'|' => {
                let count = self.required_length("attribute")?;
                let attributes = self.pairs(count)?;
                let data = Box::new(self.value()?);
                Ok(RespValue::Attribute { data, attributes })
            }
            other => invalid(format!("unknown RESP type byte: 0x{other:02x}")),
        }
    }

    /// Bytes up to the next `\r\n`; the cursor moves past the terminator.
    fn line(&mut self) -> Step<&'a [u8]> {
        let buf: &'a Bytes = self.buf;
        let start = self.pos;
        let Some(offset) = memchr(b'\r', &buf[start..]) else {
            return Err(Halt::Incomplete);
        };
        let cr = start + offset;
        match buf.get(cr + 1) {
            None => Err(Halt::Incomplete),
            Some(b'\n') => {
                self.pos = cr + 2;
                Ok(&buf[start..cr])
            }
            Some(_) => invalid("expected \\n after \\r"),
        }
    }

    fn text_line(&mut self, what: &str) -> Step<String> {
        let line = self.line()?;
        utf8(line.to_vec(), what)
    }

    fn int_line(&mut self) -> Step<i64> {
        let line = self.line()?;
        parse_int(line)
    }

    /// Length header of a bulk/aggregate; `None` for the RESP2 `-1` null.
    fn length(&mut self) -> Step<Option<usize>> {
        let n = self.int_line()?;
        if n < 0 {
            return Ok(None);
        }
        usize::try_from(n)
            .map(Some)
            .or_else(|_| invalid(format!("length out of range: {n}")))
    }

    fn required_length(&mut self, what: &str) -> Step<usize> {
        match self.length()? {
            Some(n) => Ok(n),
            None => invalid(format!("negative {what} length")),
        }
    }

    /// `len` payload bytes followed by `\r\n`, sliced without copying.
    fn blob(&mut self, len: usize, what: &str) -> Step<Bytes> {
        let start = self.pos;
        let end = start.checked_add(len).ok_or(Halt::Incomplete)?;
        if self.buf.len() < end + 2 {
            return Err(Halt::Incomplete);
        }
        if &self.buf[end..end + 2] != b"\r\n" {
            return invalid(format!("{what} not terminated by \\r\\n"));
        }
        self.pos = end + 2;
        Ok(self.buf.slice(start..end))
    }

    fn values(&mut self, count: usize) -> Step<Vec<RespValue>> {
        // Cap the pre-allocation: `count` comes off the wire.
        let mut out = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            out.push(self.value()?);
        }
        Ok(out)
    }

    fn pairs(&mut self, count: usize) -> Step<Vec<(RespValue, RespValue)>> {
        let mut out = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            let key = self.value()?;
            let val = self.value()?;
            out.push((key, val));
        }
        Ok(out)
    }

    fn double(&mut self) -> Step<RespValue> {
        let line = self.line()?;
        match parse_float(line) {
            Some(d) => Ok(RespValue::Double(d)),
            None => invalid(format!(
                "invalid double: {}",
                String::from_utf8_lossy(line)
            )),
        }
    }

    fn big_number(&mut self) -> Step<RespValue> {
        let s = self.text_line("big number")?;
        let digits = s.strip_prefix(['+', '-']).unwrap_or(&s);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return invalid(format!("invalid big number: {s}"));
        }
        Ok(RespValue::BigNumber(s))
    }

    /// `=<len>\r\n<enc>:<data>\r\n` where `<enc>` is exactly three bytes.
    fn verbatim(&mut self) -> Step<RespValue> {
        let len = self.required_length("verbatim string")?;
        let content = self.blob(len, "verbatim string")?;
        if content.len() < 4 || content[3] != b':' {
            return invalid("verbatim string missing encoding prefix");
        }
        let encoding = utf8(content[..3].to_vec(), "verbatim encoding")?;
        let data = utf8(content[4..].to_vec(), "verbatim string")?;
        Ok(RespValue::VerbatimString { encoding, data })
    }

    /// `><count>\r\n<kind><elements>…`
    fn push(&mut self) -> Step<RespValue> {
        let count = self.required_length("push")?;
        if count == 0 {
            return invalid("push message must have at least one element (kind)");
        }
        let kind = match self.value()? {
            RespValue::SimpleString(s) => s,
            RespValue::BulkString(b) => utf8(b.to_vec(), "push kind")?,
            other => {
                return invalid(format!(
                    "push kind must be a string, got {}",
                    other.type_name()
                ))
            }
        };
        let data = self.values(count - 1)?;
        Ok(RespValue::Push { kind, data })
    }
}

fn utf8(raw: Vec<u8>, what: &str) -> Step<String> {
    String::from_utf8(raw).or_else(|e| invalid(format!("invalid UTF-8 in {what}: {e}")))
}

/// Parse a signed decimal integer without allocating.
fn parse_int(bytes: &[u8]) -> Step<i64> {
    let (negative, digits) = match bytes.split_first() {
        Some((b'-', rest)) => (true, rest),
        Some((b'+', rest)) => (false, rest),
        _ => (false, bytes),
    };
    if digits.is_empty() {
        return invalid("integer has no digits");
    }

    let mut magnitude: u64 = 0;
    for &b in digits {
        if !b.is_ascii_digit() {
            return invalid(format!("invalid byte in integer: 0x{b:02x}"));
        }
        magnitude = match magnitude
            .checked_mul(10)
            .and_then(|m| m.checked_add(u64::from(b - b'0')))
        {
            Some(m) => m,
            None => return invalid("integer overflow"),
        };
    }

    let value = if negative {
        // i64::MIN has no positive counterpart, so go through i128.
        i64::try_from(-(magnitude as i128)).ok()
    } else {
        i64::try_from(magnitude).ok()
    };
    value.map_or_else(|| invalid("integer overflow"), Ok)
}

/// Parse a RESP double or a Redis score string (`inf`, `+inf`, `-inf`, `nan`).
pub(crate) fn parse_float(bytes: &[u8]) -> Option<f64> {
    let s = std::str::from_utf8(bytes).ok()?;
    match s {
        "inf" | "+inf" => Some(f64::INFINITY),
        "-inf" => Some(f64::NEG_INFINITY),
        "nan" => Some(f64::NAN),
        _ => s.parse::<f64>().ok(),
    }
}

// ── Tests ──────────────────────────────────────────────────────────
