//! Whole-set iteration over `ZSCAN`.

use futures::stream::{self, StreamExt, TryStreamExt};

use crate::args::ScanArgs;
use crate::client::{RedisClient, ValueStream};
use crate::codec::RedisCodec;
use crate::commands::SortedSetCommands;
use crate::error::RsedisError;
use crate::router::Router;
use crate::types::{ScanCursor, ScoredValue};

/// Walk every `ZSCAN` page of `key`, yielding members as pages arrive.
///
/// The next page is only requested once the previous one has been
/// consumed. A failed page ends the stream after yielding the error.
/// Members added or removed during the walk may or may not show up; a
/// member present for the whole walk is yielded at least once.
pub fn zscan_stream<R, C>(
    client: &RedisClient<R, C>,
    key: C::Key,
    args: Option<ScanArgs>,
) -> ValueStream<ScoredValue<C::Value>>
where
    R: Router + 'static,
    C: RedisCodec,
{
    let client = client.clone();
    stream::try_unfold(Some(ScanCursor::initial()), move |cursor| {
        let client = client.clone();
        let key = key.clone();
        let args = args.clone();
        async move {
            let Some(cursor) = cursor else {
                return Ok::<_, RsedisError>(None);
            };
            let page = match &args {
                Some(args) => client.zscan_cursor_with_args(&key, &cursor, args).await?,
                None => client.zscan_cursor(&key, &cursor).await?,
            };
            let (next, values) = page.into_parts();
            let next = (!next.is_finished()).then_some(next);
            let values = stream::iter(values.into_iter().map(Ok::<_, RsedisError>));
            Ok(Some((values, next)))
        }
    })
    .try_flatten()
    .boxed()
}

// ── Tests ──────────────────────────────────────────────────────────
