//! The command dispatcher.
//!
//! [`RedisClient`] turns typed calls into [`Command`]s, hands them to a
//! [`Router`] and decodes the reply. It holds nothing but shared handles
//! to the router and the codec, so clones are cheap and share the
//! underlying connections.

use std::sync::Arc;

use bytes::Bytes;
use futures::future;
use futures::stream::{self, BoxStream, StreamExt};
use tracing::trace;

use crate::codec::RedisCodec;
use crate::command::Command;
use crate::config::ConnectionConfig;
use crate::error::{Result, RsedisError};
use crate::output;
use crate::resp::types::RespValue;
use crate::router::{DedicatedRouter, Router, StandaloneRouter};
use crate::types::ScoredValue;

/// Lazily produced multi-element result.
///
/// The command is sent on first poll. If an element fails to decode, the
/// error is the last item of the stream.
pub type ValueStream<T> = BoxStream<'static, Result<T>>;

pub struct RedisClient<R, C> {
    router: Arc<R>,
    codec: Arc<C>,
}

impl<R, C> Clone for RedisClient<R, C> {
    fn clone(&self) -> Self {
        Self {
            router: Arc::clone(&self.router),
            codec: Arc::clone(&self.codec),
        }
    }
}

impl<C: RedisCodec> RedisClient<StandaloneRouter, C> {
    /// Pooled client for a `redis://` URL.
    pub fn from_url(url: &str, codec: C) -> Result<Self> {
        Ok(Self::with_config(ConnectionConfig::from_url(url)?, codec))
    }

    pub fn with_config(config: ConnectionConfig, codec: C) -> Self {
        Self::new(StandaloneRouter::new(config), codec)
    }
}

impl<C: RedisCodec> RedisClient<DedicatedRouter, C> {
    /// Client bound to a single connection, for connection-scoped state
    /// such as `CLIENT SETNAME`, `READONLY` or `CLIENT TRACKING`.
    pub fn dedicated(config: ConnectionConfig, codec: C) -> Self {
        Self::new(DedicatedRouter::new(config), codec)
    }
}

impl<R, C> RedisClient<R, C>
where
    R: Router + 'static,
    C: RedisCodec,
{
    pub fn new(router: R, codec: C) -> Self {
        Self::from_shared(Arc::new(router), Arc::new(codec))
    }

    pub fn from_shared(router: Arc<R>, codec: Arc<C>) -> Self {
        Self { router, codec }
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Send one command; error replies become `Err`.
    pub(crate) async fn dispatch(&self, cmd: Command) -> Result<RespValue> {
        trace!(
            command = %cmd.display_name(),
            args = cmd.args().len() - 1,
            "dispatch"
        );
        let reply = self.router.execute(&cmd).await?;
        output::into_result(reply)
    }

    pub(crate) async fn status_of(&self, cmd: Command) -> Result<String> {
        output::status(self.dispatch(cmd).await?)
    }

    pub(crate) async fn integer_of(&self, cmd: Command) -> Result<i64> {
        output::integer(self.dispatch(cmd).await?)
    }

    /// Stream a multi-element reply. `split` pulls the raw items out of the
    /// reply, `decode` turns each one into a caller value.
    pub(crate) fn stream<I, T, S, D>(&self, cmd: Command, split: S, decode: D) -> ValueStream<T>
    where
        I: Send + 'static,
        T: Send + 'static,
        S: FnOnce(RespValue) -> Result<Vec<I>> + Send + 'static,
        D: Fn(&C, I) -> Result<T> + Send + 'static,
    {
        let client = self.clone();
        let codec = Arc::clone(&self.codec);
        stream::once(async move { client.dispatch(cmd).await.and_then(split) })
            .flat_map(|items| match items {
                Ok(items) => stream::iter(items).map(Ok::<I, RsedisError>).left_stream(),
                Err(err) => stream::iter([Err::<I, RsedisError>(err)]).right_stream(),
            })
            .map(move |item| item.and_then(|raw| decode(&*codec, raw)))
            .scan(false, |failed, item| {
                if *failed {
                    return future::ready(None);
                }
                *failed = item.is_err();
                future::ready(Some(item))
            })
            .boxed()
    }

    /// Stream of members.
    pub(crate) fn value_stream(&self, cmd: Command) -> ValueStream<C::Value> {
        self.stream(cmd, output::members, |codec: &C, raw| codec.decode_value(raw))
    }

    /// Stream of members paired with their scores.
    pub(crate) fn scored_stream(&self, cmd: Command) -> ValueStream<ScoredValue<C::Value>> {
        self.stream(cmd, output::scored_pairs, |codec: &C, (raw, score)| {
            Ok(ScoredValue::new(score, codec.decode_value(raw)?))
        })
    }

    pub(crate) fn scored_value(&self, raw: Bytes, score: f64) -> Result<ScoredValue<C::Value>> {
        Ok(ScoredValue::new(score, self.codec.decode_value(raw)?))
    }

    /// Encode a variadic key list, rejecting an empty one.
    pub(crate) fn encode_keys(&self, keys: &[C::Key], command: &str) -> Result<Vec<Bytes>> {
        if keys.is_empty() {
            return Err(RsedisError::invalid(format!("{command} needs at least one key")));
        }
        Ok(keys.iter().map(|k| self.codec.encode_key(k)).collect())
    }
}

// ── Tests ──────────────────────────────────────────────────────────
