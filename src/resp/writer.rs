//! RESP command serializer.
//!
//! Encodes command arguments into the RESP bulk string array wire format:
//! `*<N>\r\n$<len>\r\narg1\r\n$<len>\r\narg2\r\n…`

use itoa::Buffer;

/// Encode a command (list of arguments) into RESP wire format.
///
/// Each argument is treated as a binary-safe bulk string, so `&str`,
/// `&[u8]` and `Bytes` arguments all work.
///
/// # Example
/// ```
/// let bytes = rsedis::resp::encode_command(&["ZSCORE", "board", "alice"]);
/// assert_eq!(bytes, b"*3\r\n$6\r\nZSCORE\r\n$5\r\nboard\r\n$5\r\nalice\r\n");
/// ```
pub fn encode_command<A: AsRef<[u8]>>(args: &[A]) -> Vec<u8> {
    // '*' + digits + \r\n, then '$' + digits + \r\n + data + \r\n per arg
    let cap = 13 + args
        .iter()
        .map(|a| 1 + 10 + 2 + a.as_ref().len() + 2)
        .sum::<usize>();

    let mut buf = Vec::with_capacity(cap);
    let mut digits = Buffer::new();

    buf.push(b'*');
    buf.extend_from_slice(digits.format(args.len()).as_bytes());
    buf.extend_from_slice(b"\r\n");

    for arg in args {
        let arg = arg.as_ref();
        buf.push(b'$');
        buf.extend_from_slice(digits.format(arg.len()).as_bytes());
        buf.extend_from_slice(b"\r\n");
        buf.extend_from_slice(arg);
        buf.extend_from_slice(b"\r\n");
    }

    buf
}

// ── Tests ──────────────────────────────────────────────────────────
