//! Pluggable encoding of caller keys and values.
//!
//! A codec turns keys and values into binary-safe command arguments and
//! turns reply payloads back into them. Decoding failures are protocol
//! errors: the server sent something the caller's types cannot hold.

use bytes::Bytes;

use crate::error::{Result, RsedisError};

/// Encode/decode caller key and value types.
pub trait RedisCodec: Send + Sync + 'static {
    type Key: Clone + Send + Sync + 'static;
    type Value: Clone + Send + Sync + 'static;

    fn encode_key(&self, key: &Self::Key) -> Bytes;
    fn decode_key(&self, raw: Bytes) -> Result<Self::Key>;
    fn encode_value(&self, value: &Self::Value) -> Bytes;
    fn decode_value(&self, raw: Bytes) -> Result<Self::Value>;
}

/// UTF-8 strings for both keys and values.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringCodec;

impl StringCodec {
    fn decode(raw: Bytes) -> Result<String> {
        String::from_utf8(raw.to_vec())
            .map_err(|e| RsedisError::Protocol(format!("reply is not valid UTF-8: {e}")))
    }
}

impl RedisCodec for StringCodec {
    type Key = String;
    type Value = String;

    fn encode_key(&self, key: &String) -> Bytes {
        Bytes::copy_from_slice(key.as_bytes())
    }

    fn decode_key(&self, raw: Bytes) -> Result<String> {
        Self::decode(raw)
    }

    fn encode_value(&self, value: &String) -> Bytes {
        Bytes::copy_from_slice(value.as_bytes())
    }

    fn decode_value(&self, raw: Bytes) -> Result<String> {
        Self::decode(raw)
    }
}

/// Raw bytes, passed through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesCodec;

impl RedisCodec for BytesCodec {
    type Key = Bytes;
    type Value = Bytes;

    fn encode_key(&self, key: &Bytes) -> Bytes {
        key.clone()
    }

    fn decode_key(&self, raw: Bytes) -> Result<Bytes> {
        Ok(raw)
    }

    fn encode_value(&self, value: &Bytes) -> Bytes {
        value.clone()
    }

    fn decode_value(&self, raw: Bytes) -> Result<Bytes> {
        Ok(raw)
    }
}
