use bytes::Bytes;

/// One decoded reply frame. RESP2 frames map onto the first six
/// variants; the rest only appear on RESP3 connections.
#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
    /// `+OK`
    SimpleString(String),
    /// `-ERR message`
    Error(String),
    /// `:1000`
    Integer(i64),
    /// `$6 foobar`, zero-copy slice of the read buffer
    BulkString(Bytes),
    /// `*2 ...`
    Array(Vec<RespValue>),
    /// `$-1`, `*-1` or RESP3 `_`
    Null,
    /// `,3.14`
    Double(f64),
    /// `#t` / `#f`
    Boolean(bool),
    /// `%N`, key/value pairs in wire order
    Map(Vec<(RespValue, RespValue)>),
    /// `~N`
    Set(Vec<RespValue>),
    /// `=15 txt:Some string`
    VerbatimString { encoding: String, data: String },
    /// `(3492890328409238509324850943850943825024385`
    BigNumber(String),
    /// `!21 SYNTAX invalid syntax`
    BulkError(String),
    /// `>N`, out-of-band message such as a tracking invalidation
    Push { kind: String, data: Vec<RespValue> },
    /// `|N`, metadata attached to the reply that follows it
    Attribute {
        data: Box<RespValue>,
        attributes: Vec<(RespValue, RespValue)>,
    },
}

impl RespValue {
    /// Bulk-string helper, mostly for building expected replies.
    pub fn bulk(data: impl Into<Bytes>) -> Self {
        Self::BulkString(data.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_push(&self) -> bool {
        matches!(self, Self::Push { .. })
    }

    /// Message of a simple or bulk error.
    pub fn as_error_msg(&self) -> Option<&str> {
        match self {
            Self::Error(msg) | Self::BulkError(msg) => Some(msg),
            _ => None,
        }
    }

    /// Binary payload of string-like values.
    ///
    /// Verbatim strings drop their encoding prefix.
    pub fn into_bytes(self) -> Option<Bytes> {
        match self {
            Self::BulkString(b) => Some(b),
            Self::SimpleString(s) => Some(Bytes::from(s)),
            Self::VerbatimString { data, .. } => Some(Bytes::from(data)),
            _ => None,
        }
    }

    /// Elements of aggregate values. RESP3 sets count as arrays here.
    pub fn into_elements(self) -> Option<Vec<RespValue>> {
        match self {
            Self::Array(a) | Self::Set(a) => Some(a),
            _ => None,
        }
    }

    /// Frame kind, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::SimpleString(_) => "simple_string",
            Self::Error(_) => "error",
            Self::Integer(_) => "integer",
            Self::BulkString(_) => "bulk_string",
            Self::Array(_) => "array",
            Self::Null => "null",
            Self::Double(_) => "double",
            Self::Boolean(_) => "boolean",
            Self::Map(_) => "map",
            Self::Set(_) => "set",
            Self::VerbatimString { .. } => "verbatim_string",
            Self::BigNumber(_) => "big_number",
            Self::BulkError(_) => "bulk_error",
            Self::Push { .. } => "push",
            Self::Attribute { .. } => "attribute",
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────
