//! Sorted-set commands.
//!
//! Range queries return members in the order the server sends them:
//! ascending by score (ties by member bytes) for the forward commands,
//! descending for the `zrev*` ones. Nothing is re-sorted client-side.
//!
//! Variadic key or member lists keep the caller's order (the first key of
//! `zdiff` is the base set) and an empty list is rejected before anything
//! is sent.

use std::future::Future;

use bytes::Bytes;

use crate::args::{BlockTimeout, ScanArgs, ZAddArgs, ZAggregateArgs, ZStoreArgs};
use crate::client::{RedisClient, ValueStream};
use crate::codec::RedisCodec;
use crate::command::Command;
use crate::commands::{append_numkeys, keyed};
use crate::error::{Result, RsedisError};
use crate::output;
use crate::router::Router;
use crate::types::{
    lex_bounds, KeyValue, Limit, Range, ScanCursor, ScoredValue, ScoredValueScanCursor,
};

pub trait SortedSetCommands<K, V>: Send + Sync {
    // ── blocking pops ──────────────────────────────────────────────

    /// Pop the lowest-scored member from the first non-empty key, waiting
    /// up to `timeout`. `None` when the timeout elapses.
    fn bzpopmin(
        &self,
        timeout: BlockTimeout,
        keys: &[K],
    ) -> impl Future<Output = Result<Option<KeyValue<K, ScoredValue<V>>>>> + Send;

    /// Highest-scored counterpart of [`bzpopmin`](Self::bzpopmin).
    fn bzpopmax(
        &self,
        timeout: BlockTimeout,
        keys: &[K],
    ) -> impl Future<Output = Result<Option<KeyValue<K, ScoredValue<V>>>>> + Send;

    // ── ZADD ───────────────────────────────────────────────────────

    /// Add one member. Returns the number of members added.
    fn zadd(&self, key: &K, score: f64, member: &V) -> impl Future<Output = Result<i64>> + Send;

    fn zadd_values(
        &self,
        key: &K,
        values: &[ScoredValue<V>],
    ) -> impl Future<Output = Result<i64>> + Send;

    /// With `CH` the count includes updated members.
    fn zadd_with_args(
        &self,
        key: &K,
        args: &ZAddArgs,
        score: f64,
        member: &V,
    ) -> impl Future<Output = Result<i64>> + Send;

    fn zadd_values_with_args(
        &self,
        key: &K,
        args: &ZAddArgs,
        values: &[ScoredValue<V>],
    ) -> impl Future<Output = Result<i64>> + Send;

    /// `ZADD ... INCR`: the new score.
    fn zaddincr(
        &self,
        key: &K,
        score: f64,
        member: &V,
    ) -> impl Future<Output = Result<Option<f64>>> + Send;

    /// `None` when `NX`/`XX`/`GT`/`LT` suppressed the update.
    fn zaddincr_with_args(
        &self,
        key: &K,
        args: &ZAddArgs,
        score: f64,
        member: &V,
    ) -> impl Future<Output = Result<Option<f64>>> + Send;

    // ── counting ───────────────────────────────────────────────────

    fn zcard(&self, key: &K) -> impl Future<Output = Result<i64>> + Send;

    fn zcount(&self, key: &K, range: &Range<f64>) -> impl Future<Output = Result<i64>> + Send;

    fn zlexcount(&self, key: &K, range: &Range<V>) -> impl Future<Output = Result<i64>> + Send;

    // ── set algebra ────────────────────────────────────────────────

    /// Members of the first key not present in any other.
    fn zdiff(&self, keys: &[K]) -> Result<ValueStream<V>>;

    fn zdiff_with_scores(&self, keys: &[K]) -> Result<ValueStream<ScoredValue<V>>>;

    fn zdiffstore(
        &self,
        destination: &K,
        keys: &[K],
    ) -> impl Future<Output = Result<i64>> + Send;

    fn zinter(&self, keys: &[K]) -> Result<ValueStream<V>>;

    fn zinter_with_args(&self, args: &ZAggregateArgs, keys: &[K]) -> Result<ValueStream<V>>;

    fn zinter_with_scores(&self, keys: &[K]) -> Result<ValueStream<ScoredValue<V>>>;

    fn zinter_with_scores_and_args(
        &self,
        args: &ZAggregateArgs,
        keys: &[K],
    ) -> Result<ValueStream<ScoredValue<V>>>;

    /// Cardinality of the intersection, without materializing it.
    fn zintercard(&self, keys: &[K]) -> impl Future<Output = Result<i64>> + Send;

    /// Stops counting at `limit` (0 means no limit).
    fn zintercard_with_limit(
        &self,
        limit: u64,
        keys: &[K],
    ) -> impl Future<Output = Result<i64>> + Send;

    fn zinterstore(
        &self,
        destination: &K,
        keys: &[K],
    ) -> impl Future<Output = Result<i64>> + Send;

    fn zinterstore_with_args(
        &self,
        destination: &K,
        args: &ZStoreArgs,
        keys: &[K],
    ) -> impl Future<Output = Result<i64>> + Send;

    fn zunion(&self, keys: &[K]) -> Result<ValueStream<V>>;

    fn zunion_with_args(&self, args: &ZAggregateArgs, keys: &[K]) -> Result<ValueStream<V>>;

    fn zunion_with_scores(&self, keys: &[K]) -> Result<ValueStream<ScoredValue<V>>>;

    fn zunion_with_scores_and_args(
        &self,
        args: &ZAggregateArgs,
        keys: &[K],
    ) -> Result<ValueStream<ScoredValue<V>>>;

    /// Store the union at `destination`; returns its cardinality.
    fn zunionstore(
        &self,
        destination: &K,
        keys: &[K],
    ) -> impl Future<Output = Result<i64>> + Send;

    fn zunionstore_with_args(
        &self,
        destination: &K,
        args: &ZStoreArgs,
        keys: &[K],
    ) -> impl Future<Output = Result<i64>> + Send;

    // ── scores and ranks ───────────────────────────────────────────

    fn zincrby(
        &self,
        key: &K,
        amount: f64,
        member: &V,
    ) -> impl Future<Output = Result<f64>> + Send;

    /// One entry per requested member, `None` for missing ones.
    fn zmscore(
        &self,
        key: &K,
        members: &[V],
    ) -> impl Future<Output = Result<Vec<Option<f64>>>> + Send;

    fn zscore(&self, key: &K, member: &V) -> impl Future<Output = Result<Option<f64>>> + Send;

    /// Zero-based rank in ascending order.
    fn zrank(&self, key: &K, member: &V) -> impl Future<Output = Result<Option<i64>>> + Send;

    fn zrevrank(&self, key: &K, member: &V) -> impl Future<Output = Result<Option<i64>>> + Send;

    // ── pops and random members ────────────────────────────────────

    fn zpopmin(&self, key: &K) -> impl Future<Output = Result<Option<ScoredValue<V>>>> + Send;

    fn zpopmin_count(&self, key: &K, count: u64) -> Result<ValueStream<ScoredValue<V>>>;

    fn zpopmax(&self, key: &K) -> impl Future<Output = Result<Option<ScoredValue<V>>>> + Send;

    fn zpopmax_count(&self, key: &K, count: u64) -> Result<ValueStream<ScoredValue<V>>>;

    fn zrandmember(&self, key: &K) -> impl Future<Output = Result<Option<V>>> + Send;

    /// A negative `count` allows repeated members.
    fn zrandmember_count(&self, key: &K, count: i64) -> impl Future<Output = Result<Vec<V>>> + Send;

    fn zrandmember_with_scores(
        &self,
        key: &K,
    ) -> impl Future<Output = Result<Option<ScoredValue<V>>>> + Send;

    fn zrandmember_count_with_scores(
        &self,
        key: &K,
        count: i64,
    ) -> impl Future<Output = Result<Vec<ScoredValue<V>>>> + Send;

    // ── ranges ─────────────────────────────────────────────────────

    /// Members by rank, `start..=stop`; negative indexes count from the end.
    fn zrange(&self, key: &K, start: i64, stop: i64) -> Result<ValueStream<V>>;

    fn zrange_with_scores(
        &self,
        key: &K,
        start: i64,
        stop: i64,
    ) -> Result<ValueStream<ScoredValue<V>>>;

    fn zrangebylex(&self, key: &K, range: &Range<V>) -> Result<ValueStream<V>>;

    fn zrangebylex_limit(&self, key: &K, range: &Range<V>, limit: &Limit)
        -> Result<ValueStream<V>>;

    fn zrangebyscore(&self, key: &K, range: &Range<f64>) -> Result<ValueStream<V>>;

    fn zrangebyscore_limit(
        &self,
        key: &K,
        range: &Range<f64>,
        limit: &Limit,
    ) -> Result<ValueStream<V>>;

    fn zrangebyscore_with_scores(
        &self,
        key: &K,
        range: &Range<f64>,
    ) -> Result<ValueStream<ScoredValue<V>>>;

    fn zrangebyscore_with_scores_limit(
        &self,
        key: &K,
        range: &Range<f64>,
        limit: &Limit,
    ) -> Result<ValueStream<ScoredValue<V>>>;

    fn zrevrange(&self, key: &K, start: i64, stop: i64) -> Result<ValueStream<V>>;

    fn zrevrange_with_scores(
        &self,
        key: &K,
        start: i64,
        stop: i64,
    ) -> Result<ValueStream<ScoredValue<V>>>;

    fn zrevrangebylex(&self, key: &K, range: &Range<V>) -> Result<ValueStream<V>>;

    fn zrevrangebylex_limit(
        &self,
        key: &K,
        range: &Range<V>,
        limit: &Limit,
    ) -> Result<ValueStream<V>>;

    fn zrevrangebyscore(&self, key: &K, range: &Range<f64>) -> Result<ValueStream<V>>;

    fn zrevrangebyscore_limit(
        &self,
        key: &K,
        range: &Range<f64>,
        limit: &Limit,
    ) -> Result<ValueStream<V>>;

    fn zrevrangebyscore_with_scores(
        &self,
        key: &K,
        range: &Range<f64>,
    ) -> Result<ValueStream<ScoredValue<V>>>;

    fn zrevrangebyscore_with_scores_limit(
        &self,
        key: &K,
        range: &Range<f64>,
        limit: &Limit,
    ) -> Result<ValueStream<ScoredValue<V>>>;

    /// `ZRANGESTORE dst src min max BYLEX [LIMIT]`; returns the stored count.
    fn zrangestorebylex(
        &self,
        destination: &K,
        source: &K,
        range: &Range<V>,
        limit: &Limit,
    ) -> impl Future<Output = Result<i64>> + Send;

    fn zrangestorebyscore(
        &self,
        destination: &K,
        source: &K,
        range: &Range<f64>,
        limit: &Limit,
    ) -> impl Future<Output = Result<i64>> + Send;

    fn zrevrangestorebylex(
        &self,
        destination: &K,
        source: &K,
        range: &Range<V>,
        limit: &Limit,
    ) -> impl Future<Output = Result<i64>> + Send;

    fn zrevrangestorebyscore(
        &self,
        destination: &K,
        source: &K,
        range: &Range<f64>,
        limit: &Limit,
    ) -> impl Future<Output = Result<i64>> + Send;

    // ── removal ────────────────────────────────────────────────────

    fn zrem(&self, key: &K, members: &[V]) -> impl Future<Output = Result<i64>> + Send;

    fn zremrangebylex(&self, key: &K, range: &Range<V>) -> impl Future<Output = Result<i64>> + Send;

    fn zremrangebyrank(
        &self,
        key: &K,
        start: i64,
        stop: i64,
    ) -> impl Future<Output = Result<i64>> + Send;

    fn zremrangebyscore(
        &self,
        key: &K,
        range: &Range<f64>,
    ) -> impl Future<Output = Result<i64>> + Send;

    // ── ZSCAN ──────────────────────────────────────────────────────

    /// First page of an incremental scan.
    fn zscan(&self, key: &K) -> impl Future<Output = Result<ScoredValueScanCursor<V>>> + Send;

    fn zscan_with_args(
        &self,
        key: &K,
        args: &ScanArgs,
    ) -> impl Future<Output = Result<ScoredValueScanCursor<V>>> + Send;

    /// Next page after `cursor`. A finished cursor is rejected.
    fn zscan_cursor(
        &self,
        key: &K,
        cursor: &ScanCursor,
    ) -> impl Future<Output = Result<ScoredValueScanCursor<V>>> + Send;

    fn zscan_cursor_with_args(
        &self,
        key: &K,
        cursor: &ScanCursor,
        args: &ScanArgs,
    ) -> impl Future<Output = Result<ScoredValueScanCursor<V>>> + Send;
}

// ── Command builders ───────────────────────────────────────────────

/// Direction of a range command.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Order {
    Forward,
    Reverse,
}

fn append_limit(cmd: &mut Command, limit: &Limit) {
    if let (Some(offset), Some(count)) = (limit.offset(), limit.count()) {
        cmd.arg("LIMIT").arg_uint(offset).arg_int(count);
    }
}

/// `min max`, or `max min` for reverse commands.
fn append_bounds<T: Into<Bytes>>(cmd: &mut Command, [lower, upper]: [T; 2], order: Order) {
    match order {
        Order::Forward => cmd.arg(lower).arg(upper),
        Order::Reverse => cmd.arg(upper).arg(lower),
    };
}

fn non_empty<T>(items: &[T], what: &str) -> Result<()> {
    if items.is_empty() {
        return Err(RsedisError::invalid(format!("{what} needs at least one member")));
    }
    Ok(())
}

impl<R, C> RedisClient<R, C>
where
    R: Router + 'static,
    C: RedisCodec,
{
    fn key(&self, key: &C::Key) -> Bytes {
        self.codec().encode_key(key)
    }

    fn member(&self, member: &C::Value) -> Bytes {
        self.codec().encode_value(member)
    }

    async fn bzpop(
        &self,
        name: &'static str,
        timeout: BlockTimeout,
        keys: &[C::Key],
    ) -> Result<Option<KeyValue<C::Key, ScoredValue<C::Value>>>> {
        let keys = self.encode_keys(keys, name)?;
        let (timeout_arg, wait) = timeout.resolve()?;
        let mut cmd = Command::new(name);
        for key in keys {
            cmd.arg(key);
        }
        cmd.arg(timeout_arg).blocking(wait);

        match output::blocking_pop(self.dispatch(cmd).await?)? {
            None => Ok(None),
            Some((key, member, score)) => Ok(Some(KeyValue::new(
                self.codec().decode_key(key)?,
                self.scored_value(member, score)?,
            ))),
        }
    }

    /// `ZADD key [flags] [INCR] score member [score member ...]`
    fn zadd_command(
        &self,
        key: &C::Key,
        args: Option<&ZAddArgs>,
        incr: bool,
        values: &[(f64, &C::Value)],
    ) -> Result<Command> {
        non_empty(values, "ZADD")?;
        let mut cmd = keyed("ZADD", self.key(key));
        if let Some(args) = args {
            args.append_to(&mut cmd)?;
        }
        if incr {
            cmd.arg("INCR");
        }
        for &(score, member) in values {
            cmd.arg_score(score)?;
            cmd.arg(self.member(member));
        }
        Ok(cmd)
    }

    async fn zadd_pairs(
        &self,
        key: &C::Key,
        args: Option<&ZAddArgs>,
        values: &[ScoredValue<C::Value>],
    ) -> Result<i64> {
        let pairs: Vec<_> = values.iter().map(|sv| (sv.score, &sv.value)).collect();
        let cmd = self.zadd_command(key, args, false, &pairs)?;
        self.integer_of(cmd).await
    }

    async fn zadd_incr(
        &self,
        key: &C::Key,
        args: Option<&ZAddArgs>,
        score: f64,
        member: &C::Value,
    ) -> Result<Option<f64>> {
        let cmd = self.zadd_command(key, args, true, &[(score, member)])?;
        output::optional_double(self.dispatch(cmd).await?)
    }

    /// `ZUNION|ZINTER|ZDIFF numkeys key... [WEIGHTS ...] [AGGREGATE ...] [WITHSCORES]`
    fn combine_command(
        &self,
        name: &'static str,
        args: Option<&ZAggregateArgs>,
        keys: &[C::Key],
        with_scores: bool,
    ) -> Result<Command> {
        let keys = self.encode_keys(keys, name)?;
        let key_count = keys.len();
        let mut cmd = Command::new(name);
        append_numkeys(&mut cmd, keys);
        if let Some(args) = args {
            args.append_to(&mut cmd, key_count)?;
        }
        if with_scores {
            cmd.arg("WITHSCORES");
        }
        Ok(cmd)
    }

    /// `ZUNIONSTORE|ZINTERSTORE|ZDIFFSTORE dest numkeys key... [WEIGHTS ...] [AGGREGATE ...]`
    async fn store_combined(
        &self,
        name: &'static str,
        destination: &C::Key,
        args: Option<&ZStoreArgs>,
        keys: &[C::Key],
    ) -> Result<i64> {
        let keys = self.encode_keys(keys, name)?;
        let key_count = keys.len();
        let mut cmd = keyed(name, self.key(destination));
        append_numkeys(&mut cmd, keys);
        if let Some(args) = args {
            args.append_to(&mut cmd, key_count)?;
        }
        self.integer_of(cmd).await
    }

    async fn zintercard_command(&self, limit: Option<u64>, keys: &[C::Key]) -> Result<i64> {
        let keys = self.encode_keys(keys, "ZINTERCARD")?;
        let mut cmd = Command::new("ZINTERCARD");
        append_numkeys(&mut cmd, keys);
        if let Some(limit) = limit {
            cmd.arg("LIMIT").arg_uint(limit);
        }
        self.integer_of(cmd).await
    }

    /// `ZRANGE|ZREVRANGE key start stop [WITHSCORES]`
    fn rank_range_command(
        &self,
        name: &'static str,
        key: &C::Key,
        start: i64,
        stop: i64,
        with_scores: bool,
    ) -> Command {
        let mut cmd = keyed(name, self.key(key));
        cmd.arg_int(start).arg_int(stop);
        if with_scores {
            cmd.arg("WITHSCORES");
        }
        cmd
    }

    /// `ZRANGEBYSCORE key min max` / `ZREVRANGEBYSCORE key max min`, then
    /// `[WITHSCORES] [LIMIT offset count]`.
    fn score_range_command(
        &self,
        key: &C::Key,
        range: &Range<f64>,
        order: Order,
        with_scores: bool,
        limit: &Limit,
    ) -> Result<Command> {
        let name = match order {
            Order::Forward => "ZRANGEBYSCORE",
            Order::Reverse => "ZREVRANGEBYSCORE",
        };
        let bounds = range.score_bounds()?;
        let mut cmd = keyed(name, self.key(key));
        append_bounds(&mut cmd, bounds, order);
        if with_scores {
            cmd.arg("WITHSCORES");
        }
        append_limit(&mut cmd, limit);
        Ok(cmd)
    }

    fn lex_bounds(&self, range: &Range<C::Value>) -> Result<[Bytes; 2]> {
        lex_bounds(range, |v| self.member(v))
    }

    fn lex_range_command(
        &self,
        key: &C::Key,
        range: &Range<C::Value>,
        order: Order,
        limit: &Limit,
    ) -> Result<Command> {
        let name = match order {
            Order::Forward => "ZRANGEBYLEX",
            Order::Reverse => "ZREVRANGEBYLEX",
        };
        let bounds = self.lex_bounds(range)?;
        let mut cmd = keyed(name, self.key(key));
        append_bounds(&mut cmd, bounds, order);
        append_limit(&mut cmd, limit);
        Ok(cmd)
    }

    /// `ZRANGESTORE dst src min max BYSCORE|BYLEX [REV] [LIMIT offset count]`
    async fn range_store<T: Into<Bytes>>(
        &self,
        destination: &C::Key,
        source: &C::Key,
        bounds: [T; 2],
        by: &'static str,
        order: Order,
        limit: &Limit,
    ) -> Result<i64> {
        let mut cmd = keyed("ZRANGESTORE", self.key(destination));
        cmd.arg(self.key(source));
        append_bounds(&mut cmd, bounds, order);
        cmd.arg(by);
        if order == Order::Reverse {
            cmd.arg("REV");
        }
        append_limit(&mut cmd, limit);
        self.integer_of(cmd).await
    }

    async fn zpop_one(&self, name: &'static str, key: &C::Key) -> Result<Option<ScoredValue<C::Value>>> {
        let reply = self.dispatch(keyed(name, self.key(key))).await?;
        output::optional_scored_pair(reply)?
            .map(|(raw, score)| self.scored_value(raw, score))
            .transpose()
    }

    fn zpop_many(&self, name: &'static str, key: &C::Key, count: u64) -> ValueStream<ScoredValue<C::Value>> {
        let mut cmd = keyed(name, self.key(key));
        cmd.arg_uint(count);
        self.scored_stream(cmd)
    }

    async fn rank_of(&self, name: &'static str, key: &C::Key, member: &C::Value) -> Result<Option<i64>> {
        let mut cmd = keyed(name, self.key(key));
        cmd.arg(self.member(member));
        output::optional_integer(self.dispatch(cmd).await?)
    }

    async fn scan_page(
        &self,
        key: &C::Key,
        cursor: &ScanCursor,
        args: Option<&ScanArgs>,
    ) -> Result<ScoredValueScanCursor<C::Value>> {
        let mut cmd = keyed("ZSCAN", self.key(key));
        cmd.arg(cursor.resume_arg()?.to_owned());
        if let Some(args) = args {
            args.append_to(&mut cmd)?;
        }
        let (next, page) = output::scan_page(self.dispatch(cmd).await?)?;
        let values = page
            .into_iter()
            .map(|(raw, score)| self.scored_value(raw, score))
            .collect::<Result<Vec<_>>>()?;
        Ok(ScoredValueScanCursor::new(next, values))
    }
}

impl<R, C> SortedSetCommands<C::Key, C::Value> for RedisClient<R, C>
where
    R: Router + 'static,
    C: RedisCodec,
{
    async fn bzpopmin(
        &self,
        timeout: BlockTimeout,
        keys: &[C::Key],
    ) -> Result<Option<KeyValue<C::Key, ScoredValue<C::Value>>>> {
        self.bzpop("BZPOPMIN", timeout, keys).await
    }

    async fn bzpopmax(
        &self,
        timeout: BlockTimeout,
        keys: &[C::Key],
    ) -> Result<Option<KeyValue<C::Key, ScoredValue<C::Value>>>> {
        self.bzpop("BZPOPMAX", timeout, keys).await
    }

    async fn zadd(&self, key: &C::Key, score: f64, member: &C::Value) -> Result<i64> {
        let cmd = self.zadd_command(key, None, false, &[(score, member)])?;
        self.integer_of(cmd).await
    }

    async fn zadd_values(&self, key: &C::Key, values: &[ScoredValue<C::Value>]) -> Result<i64> {
        self.zadd_pairs(key, None, values).await
    }

    async fn zadd_with_args(
        &self,
        key: &C::Key,
        args: &ZAddArgs,
        score: f64,
        member: &C::Value,
    ) -> Result<i64> {
        let cmd = self.zadd_command(key, Some(args), false, &[(score, member)])?;
        self.integer_of(cmd).await
    }

    async fn zadd_values_with_args(
        &self,
        key: &C::Key,
        args: &ZAddArgs,
        values: &[ScoredValue<C::Value>],
    ) -> Result<i64> {
        self.zadd_pairs(key, Some(args), values).await
    }

    async fn zaddincr(&self, key: &C::Key, score: f64, member: &C::Value) -> Result<Option<f64>> {
        self.zadd_incr(key, None, score, member).await
    }

    async fn zaddincr_with_args(
        &self,
        key: &C::Key,
        args: &ZAddArgs,
        score: f64,
        member: &C::Value,
    ) -> Result<Option<f64>> {
        self.zadd_incr(key, Some(args), score, member).await
    }

    async fn zcard(&self, key: &C::Key) -> Result<i64> {
        self.integer_of(keyed("ZCARD", self.key(key))).await
    }

    async fn zcount(&self, key: &C::Key, range: &Range<f64>) -> Result<i64> {
        let [min, max] = range.score_bounds()?;
        let mut cmd = keyed("ZCOUNT", self.key(key));
        cmd.arg(min).arg(max);
        self.integer_of(cmd).await
    }

    async fn zlexcount(&self, key: &C::Key, range: &Range<C::Value>) -> Result<i64> {
        let [min, max] = self.lex_bounds(range)?;
        let mut cmd = keyed("ZLEXCOUNT", self.key(key));
        cmd.arg(min).arg(max);
        self.integer_of(cmd).await
    }

    fn zdiff(&self, keys: &[C::Key]) -> Result<ValueStream<C::Value>> {
        let cmd = self.combine_command("ZDIFF", None, keys, false)?;
        Ok(self.value_stream(cmd))
    }

    fn zdiff_with_scores(&self, keys: &[C::Key]) -> Result<ValueStream<ScoredValue<C::Value>>> {
        let cmd = self.combine_command("ZDIFF", None, keys, true)?;
        Ok(self.scored_stream(cmd))
    }

    async fn zdiffstore(&self, destination: &C::Key, keys: &[C::Key]) -> Result<i64> {
        self.store_combined("ZDIFFSTORE", destination, None, keys).await
    }

    fn zinter(&self, keys: &[C::Key]) -> Result<ValueStream<C::Value>> {
        let cmd = self.combine_command("ZINTER", None, keys, false)?;
        Ok(self.value_stream(cmd))
    }

    fn zinter_with_args(
        &self,
        args: &ZAggregateArgs,
        keys: &[C::Key],
    ) -> Result<ValueStream<C::Value>> {
        let cmd = self.combine_command("ZINTER", Some(args), keys, false)?;
        Ok(self.value_stream(cmd))
    }

    fn zinter_with_scores(&self, keys: &[C::Key]) -> Result<ValueStream<ScoredValue<C::Value>>> {
        let cmd = self.combine_command("ZINTER", None, keys, true)?;
        Ok(self.scored_stream(cmd))
    }

    fn zinter_with_scores_and_args(
        &self,
        args: &ZAggregateArgs,
        keys: &[C::Key],
    ) -> Result<ValueStream<ScoredValue<C::Value>>> {
        let cmd = self.combine_command("ZINTER", Some(args), keys, true)?;
        Ok(self.scored_stream(cmd))
    }

    async fn zintercard(&self, keys: &[C::Key]) -> Result<i64> {
        self.zintercard_command(None, keys).await
    }

    async fn zintercard_with_limit(&self, limit: u64, keys: &[C::Key]) -> Result<i64> {
        self.zintercard_command(Some(limit), keys).await
    }

    async fn zinterstore(&self, destination: &C::Key, keys: &[C::Key]) -> Result<i64> {
        self.store_combined("ZINTERSTORE", destination, None, keys).await
    }

    async fn zinterstore_with_args(
        &self,
        destination: &C::Key,
        args: &ZStoreArgs,
        keys: &[C::Key],
    ) -> Result<i64> {
        self.store_combined("ZINTERSTORE", destination, Some(args), keys)
            .await
    }

    fn zunion(&self, keys: &[C::Key]) -> Result<ValueStream<C::Value>> {
        let cmd = self.combine_command("ZUNION", None, keys, false)?;
        Ok(self.value_stream(cmd))
    }

    fn zunion_with_args(
        &self,
        args: &ZAggregateArgs,
        keys: &[C::Key],
    ) -> Result<ValueStream<C::Value>> {
        let cmd = self.combine_command("ZUNION", Some(args), keys, false)?;
        Ok(self.value_stream(cmd))
    }

    fn zunion_with_scores(&self, keys: &[C::Key]) -> Result<ValueStream<ScoredValue<C::Value>>> {
        let cmd = self.combine_command("ZUNION", None, keys, true)?;
        Ok(self.scored_stream(cmd))
    }

    fn zunion_with_scores_and_args(
        &self,
        args: &ZAggregateArgs,
        keys: &[C::Key],
    ) -> Result<ValueStream<ScoredValue<C::Value>>> {
        let cmd = self.combine_command("ZUNION", Some(args), keys, true)?;
        Ok(self.scored_stream(cmd))
    }

    async fn zunionstore(&self, destination: &C::Key, keys: &[C::Key]) -> Result<i64> {
        self.store_combined("ZUNIONSTORE", destination, None, keys).await
    }

    async fn zunionstore_with_args(
        &self,
        destination: &C::Key,
        args: &ZStoreArgs,
        keys: &[C::Key],
    ) -> Result<i64> {
        self.store_combined("ZUNIONSTORE", destination, Some(args), keys)
            .await
    }

    async fn zincrby(&self, key: &C::Key, amount: f64, member: &C::Value) -> Result<f64> {
        let mut cmd = keyed("ZINCRBY", self.key(key));
        cmd.arg_score(amount)?;
        cmd.arg(self.member(member));
        output::double(self.dispatch(cmd).await?)
    }

    async fn zmscore(&self, key: &C::Key, members: &[C::Value]) -> Result<Vec<Option<f64>>> {
        non_empty(members, "ZMSCORE")?;
        let mut cmd = keyed("ZMSCORE", self.key(key));
        for member in members {
            cmd.arg(self.member(member));
        }
        output::optional_doubles(self.dispatch(cmd).await?)
    }

    async fn zscore(&self, key: &C::Key, member: &C::Value) -> Result<Option<f64>> {
        let mut cmd = keyed("ZSCORE", self.key(key));
        cmd.arg(self.member(member));
        output::optional_double(self.dispatch(cmd).await?)
    }

    async fn zrank(&self, key: &C::Key, member: &C::Value) -> Result<Option<i64>> {
        self.rank_of("ZRANK", key, member).await
    }

    async fn zrevrank(&self, key: &C::Key, member: &C::Value) -> Result<Option<i64>> {
        self.rank_of("ZREVRANK", key, member).await
    }

    async fn zpopmin(&self, key: &C::Key) -> Result<Option<ScoredValue<C::Value>>> {
        self.zpop_one("ZPOPMIN", key).await
    }

    fn zpopmin_count(&self, key: &C::Key, count: u64) -> Result<ValueStream<ScoredValue<C::Value>>> {
        Ok(self.zpop_many("ZPOPMIN", key, count))
    }

    async fn zpopmax(&self, key: &C::Key) -> Result<Option<ScoredValue<C::Value>>> {
        self.zpop_one("ZPOPMAX", key).await
    }

    fn zpopmax_count(&self, key: &C::Key, count: u64) -> Result<ValueStream<ScoredValue<C::Value>>> {
        Ok(self.zpop_many("ZPOPMAX", key, count))
    }

    async fn zrandmember(&self, key: &C::Key) -> Result<Option<C::Value>> {
        let reply = self.dispatch(keyed("ZRANDMEMBER", self.key(key))).await?;
        output::optional_bytes(reply)?
            .map(|raw| self.codec().decode_value(raw))
            .transpose()
    }

    async fn zrandmember_count(&self, key: &C::Key, count: i64) -> Result<Vec<C::Value>> {
        let mut cmd = keyed("ZRANDMEMBER", self.key(key));
        cmd.arg_int(count);
        output::members(self.dispatch(cmd).await?)?
            .into_iter()
            .map(|raw| self.codec().decode_value(raw))
            .collect()
    }

    async fn zrandmember_with_scores(&self, key: &C::Key) -> Result<Option<ScoredValue<C::Value>>> {
        let mut cmd = keyed("ZRANDMEMBER", self.key(key));
        cmd.arg_int(1).arg("WITHSCORES");
        output::optional_scored_pair(self.dispatch(cmd).await?)?
            .map(|(raw, score)| self.scored_value(raw, score))
            .transpose()
    }

    async fn zrandmember_count_with_scores(
        &self,
        key: &C::Key,
        count: i64,
    ) -> Result<Vec<ScoredValue<C::Value>>> {
        let mut cmd = keyed("ZRANDMEMBER", self.key(key));
        cmd.arg_int(count).arg("WITHSCORES");
        output::scored_pairs(self.dispatch(cmd).await?)?
            .into_iter()
            .map(|(raw, score)| self.scored_value(raw, score))
            .collect()
    }

    fn zrange(&self, key: &C::Key, start: i64, stop: i64) -> Result<ValueStream<C::Value>> {
        Ok(self.value_stream(self.rank_range_command("ZRANGE", key, start, stop, false)))
    }

    fn zrange_with_scores(
        &self,
        key: &C::Key,
        start: i64,
        stop: i64,
    ) -> Result<ValueStream<ScoredValue<C::Value>>> {
        Ok(self.scored_stream(self.rank_range_command("ZRANGE", key, start, stop, true)))
    }

    fn zrangebylex(&self, key: &C::Key, range: &Range<C::Value>) -> Result<ValueStream<C::Value>> {
        self.zrangebylex_limit(key, range, &Limit::unlimited())
    }

    fn zrangebylex_limit(
        &self,
        key: &C::Key,
        range: &Range<C::Value>,
        limit: &Limit,
    ) -> Result<ValueStream<C::Value>> {
        let cmd = self.lex_range_command(key, range, Order::Forward, limit)?;
        Ok(self.value_stream(cmd))
    }

    fn zrangebyscore(&self, key: &C::Key, range: &Range<f64>) -> Result<ValueStream<C::Value>> {
        self.zrangebyscore_limit(key, range, &Limit::unlimited())
    }

    fn zrangebyscore_limit(
        &self,
        key: &C::Key,
        range: &Range<f64>,
        limit: &Limit,
    ) -> Result<ValueStream<C::Value>> {
        let cmd = self.score_range_command(key, range, Order::Forward, false, limit)?;
        Ok(self.value_stream(cmd))
    }

    fn zrangebyscore_with_scores(
        &self,
        key: &C::Key,
        range: &Range<f64>,
    ) -> Result<ValueStream<ScoredValue<C::Value>>> {
        self.zrangebyscore_with_scores_limit(key, range, &Limit::unlimited())
    }

    fn zrangebyscore_with_scores_limit(
        &self,
        key: &C::Key,
        range: &Range<f64>,
        limit: &Limit,
    ) -> Result<ValueStream<ScoredValue<C::Value>>> {
        let cmd = self.score_range_command(key, range, Order::Forward, true, limit)?;
        Ok(self.scored_stream(cmd))
    }

    fn zrevrange(&self, key: &C::Key, start: i64, stop: i64) -> Result<ValueStream<C::Value>> {
        Ok(self.value_stream(self.rank_range_command("ZREVRANGE", key, start, stop, false)))
    }

    fn zrevrange_with_scores(
        &self,
        key: &C::Key,
        start: i64,
        stop: i64,
    ) -> Result<ValueStream<ScoredValue<C::Value>>> {
        Ok(self.scored_stream(self.rank_range_command("ZREVRANGE", key, start, stop, true)))
    }

    fn zrevrangebylex(
        &self,
        key: &C::Key,
        range: &Range<C::Value>,
    ) -> Result<ValueStream<C::Value>> {
        self.zrevrangebylex_limit(key, range, &Limit::unlimited())
    }

    fn zrevrangebylex_limit(
        &self,
        key: &C::Key,
        range: &Range<C::Value>,
        limit: &Limit,
    ) -> Result<ValueStream<C::Value>> {
        let cmd = self.lex_range_command(key, range, Order::Reverse, limit)?;
        Ok(self.value_stream(cmd))
    }

    fn zrevrangebyscore(&self, key: &C::Key, range: &Range<f64>) -> Result<ValueStream<C::Value>> {
        self.zrevrangebyscore_limit(key, range, &Limit::unlimited())
    }

    fn zrevrangebyscore_limit(
        &self,
        key: &C::Key,
        range: &Range<f64>,
        limit: &Limit,
    ) -> Result<ValueStream<C::Value>> {
        let cmd = self.score_range_command(key, range, Order::Reverse, false, limit)?;
        Ok(self.value_stream(cmd))
    }

    fn zrevrangebyscore_with_scores(
        &self,
        key: &C::Key,
        range: &Range<f64>,
    ) -> Result<ValueStream<ScoredValue<C::Value>>> {
        self.zrevrangebyscore_with_scores_limit(key, range, &Limit::unlimited())
    }

    fn zrevrangebyscore_with_scores_limit(
        &self,
        key: &C::Key,
        range: &Range<f64>,
        limit: &Limit,
    ) -> Result<ValueStream<ScoredValue<C::Value>>> {
        let cmd = self.score_range_command(key, range, Order::Reverse, true, limit)?;
        Ok(self.scored_stream(cmd))
    }

    async fn zrangestorebylex(
        &self,
        destination: &C::Key,
        source: &C::Key,
        range: &Range<C::Value>,
        limit: &Limit,
    ) -> Result<i64> {
        let bounds = self.lex_bounds(range)?;
        self.range_store(destination, source, bounds, "BYLEX", Order::Forward, limit)
            .await
    }

    async fn zrangestorebyscore(
        &self,
        destination: &C::Key,
        source: &C::Key,
        range: &Range<f64>,
        limit: &Limit,
    ) -> Result<i64> {
        let bounds = range.score_bounds()?;
        self.range_store(destination, source, bounds, "BYSCORE", Order::Forward, limit)
            .await
    }

    async fn zrevrangestorebylex(
        &self,
        destination: &C::Key,
        source: &C::Key,
        range: &Range<C::Value>,
        limit: &Limit,
    ) -> Result<i64> {
        let bounds = self.lex_bounds(range)?;
        self.range_store(destination, source, bounds, "BYLEX", Order::Reverse, limit)
            .await
    }

    async fn zrevrangestorebyscore(
        &self,
        destination: &C::Key,
        source: &C::Key,
        range: &Range<f64>,
        limit: &Limit,
    ) -> Result<i64> {
        let bounds = range.score_bounds()?;
        self.range_store(destination, source, bounds, "BYSCORE", Order::Reverse, limit)
            .await
    }

    async fn zrem(&self, key: &C::Key, members: &[C::Value]) -> Result<i64> {
        non_empty(members, "ZREM")?;
        let mut cmd = keyed("ZREM", self.key(key));
        for member in members {
            cmd.arg(self.member(member));
        }
        self.integer_of(cmd).await
    }

    async fn zremrangebylex(&self, key: &C::Key, range: &Range<C::Value>) -> Result<i64> {
        let [min, max] = self.lex_bounds(range)?;
        let mut cmd = keyed("ZREMRANGEBYLEX", self.key(key));
        cmd.arg(min).arg(max);
        self.integer_of(cmd).await
    }

    async fn zremrangebyrank(&self, key: &C::Key, start: i64, stop: i64) -> Result<i64> {
        let mut cmd = keyed("ZREMRANGEBYRANK", self.key(key));
        cmd.arg_int(start).arg_int(stop);
        self.integer_of(cmd).await
    }

    async fn zremrangebyscore(&self, key: &C::Key, range: &Range<f64>) -> Result<i64> {
        let [min, max] = range.score_bounds()?;
        let mut cmd = keyed("ZREMRANGEBYSCORE", self.key(key));
        cmd.arg(min).arg(max);
        self.integer_of(cmd).await
    }

    async fn zscan(&self, key: &C::Key) -> Result<ScoredValueScanCursor<C::Value>> {
        self.scan_page(key, &ScanCursor::initial(), None).await
    }

    async fn zscan_with_args(
        &self,
        key: &C::Key,
        args: &ScanArgs,
    ) -> Result<ScoredValueScanCursor<C::Value>> {
        self.scan_page(key, &ScanCursor::initial(), Some(args)).await
    }

    async fn zscan_cursor(
        &self,
        key: &C::Key,
        cursor: &ScanCursor,
    ) -> Result<ScoredValueScanCursor<C::Value>> {
        self.scan_page(key, cursor, None).await
    }

    async fn zscan_cursor_with_args(
        &self,
        key: &C::Key,
        cursor: &ScanCursor,
        args: &ScanArgs,
    ) -> Result<ScoredValueScanCursor<C::Value>> {
        self.scan_page(key, cursor, Some(args)).await
    }
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Aggregate;
    use crate::codec::StringCodec;
    use crate::resp::types::RespValue;
    use crate::router::mock::MockRouter;
    use crate::types::Boundary;
    use futures::{StreamExt, TryStreamExt};
    use std::time::Duration;

    fn client() -> RedisClient<MockRouter, StringCodec> {
        RedisClient::new(MockRouter::new(), StringCodec)
    }

    fn s(v: &str) -> String {
        v.to_string()
    }

    fn flat(items: &[&str]) -> RespValue {
        RespValue::Array(items.iter().map(|i| RespValue::bulk(i.to_string())).collect())
    }

    #[tokio::test]
    async fn zadd_forms() {
        let client = client();
        client
            .router()
            .reply(RespValue::Integer(1))
            .reply(RespValue::Integer(2))
            .reply(RespValue::Integer(1));

        assert_eq!(client.zadd(&s("board"), 1.5, &s("alice")).await.unwrap(), 1);
        let values = [ScoredValue::new(1.0, s("a")), ScoredValue::new(f64::INFINITY, s("b"))];
        assert_eq!(client.zadd_values(&s("board"), &values).await.unwrap(), 2);
        let args = ZAddArgs::new().xx().gt().ch();
        assert_eq!(
            client
                .zadd_with_args(&s("board"), &args, 3.0, &s("a"))
                .await
                .unwrap(),
            1
        );

        assert_eq!(
            client.router().sent(),
            vec![
                vec!["ZADD", "board", "1.5", "alice"],
                vec!["ZADD", "board", "1", "a", "+inf", "b"],
                vec!["ZADD", "board", "XX", "GT", "CH", "3", "a"],
            ]
        );
    }

    #[tokio::test]
    async fn zadd_rejects_bad_input_without_sending() {
        let client = client();
        assert!(client
            .zadd(&s("k"), f64::NAN, &s("m"))
            .await
            .unwrap_err()
            .is_invalid_argument());
        assert!(client
            .zadd_values(&s("k"), &[])
            .await
            .unwrap_err()
            .is_invalid_argument());
        let args = ZAddArgs::new().nx().xx();
        assert!(client
            .zadd_with_args(&s("k"), &args, 1.0, &s("m"))
            .await
            .unwrap_err()
            .is_invalid_argument());
        assert!(client.router().sent().is_empty());
    }

    #[tokio::test]
    async fn zaddincr_suppressed_update_is_none() {
        let client = client();
        client
            .router()
            .reply(RespValue::bulk("4.5"))
            .reply(RespValue::Null);
        assert_eq!(
            client.zaddincr(&s("k"), 2.0, &s("m")).await.unwrap(),
            Some(4.5)
        );
        let args = ZAddArgs::new().nx();
        assert_eq!(
            client
                .zaddincr_with_args(&s("k"), &args, 2.0, &s("m"))
                .await
                .unwrap(),
            None
        );
        assert_eq!(
            client.router().sent(),
            vec![
                vec!["ZADD", "k", "INCR", "2", "m"],
                vec!["ZADD", "k", "NX", "INCR", "2", "m"],
            ]
        );
    }

    #[tokio::test]
    async fn counts_encode_bounds() {
        let client = client();
        client
            .router()
            .reply(RespValue::Integer(3))
            .reply(RespValue::Integer(2));
        let scores = Range::new(Boundary::Excluding(1.0), Boundary::Unbounded);
        assert_eq!(client.zcount(&s("k"), &scores).await.unwrap(), 3);
        let lex = Range::new(Boundary::Including(s("a")), Boundary::Excluding(s("c")));
        assert_eq!(client.zlexcount(&s("k"), &lex).await.unwrap(), 2);
        assert_eq!(
            client.router().sent(),
            vec![
                vec!["ZCOUNT", "k", "(1", "+inf"],
                vec!["ZLEXCOUNT", "k", "[a", "(c"],
            ]
        );
    }

    #[tokio::test]
    async fn inverted_range_is_rejected() {
        let client = client();
        let err = client
            .zcount(&s("k"), &Range::inclusive(5.0, 1.0))
            .await
            .unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(client
            .zrangebylex(&s("k"), &Range::inclusive(s("z"), s("a")))
            .err()
            .unwrap()
            .is_invalid_argument());
        assert!(client.router().sent().is_empty());
    }

    #[tokio::test]
    async fn zscore_present_and_absent() {
        let client = client();
        client
            .router()
            .reply(RespValue::bulk("2.5"))
            .reply(RespValue::Null)
            .reply(RespValue::Double(f64::NEG_INFINITY));
        assert_eq!(client.zscore(&s("k"), &s("a")).await.unwrap(), Some(2.5));
        assert_eq!(client.zscore(&s("k"), &s("b")).await.unwrap(), None);
        assert_eq!(
            client.zscore(&s("k"), &s("c")).await.unwrap(),
            Some(f64::NEG_INFINITY)
        );
    }

    #[tokio::test]
    async fn zmscore_keeps_positions() {
        let client = client();
        client.router().reply(RespValue::Array(vec![
            RespValue::bulk("1"),
            RespValue::Null,
            RespValue::bulk("3"),
        ]));
        let scores = client
            .zmscore(&s("k"), &[s("a"), s("x"), s("c")])
            .await
            .unwrap();
        assert_eq!(scores, vec![Some(1.0), None, Some(3.0)]);
        assert!(client
            .zmscore(&s("k"), &[])
            .await
            .unwrap_err()
            .is_invalid_argument());
    }

    #[tokio::test]
    async fn ranks() {
        let client = client();
        client
            .router()
            .reply(RespValue::Integer(0))
            .reply(RespValue::Null);
        assert_eq!(client.zrank(&s("k"), &s("a")).await.unwrap(), Some(0));
        assert_eq!(client.zrevrank(&s("k"), &s("zz")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn zrange_with_scores_preserves_server_order() {
        let client = client();
        client.router().reply(flat(&["a", "1", "b", "2", "c", "2"]));
        let items: Vec<_> = client
            .zrange_with_scores(&s("k"), 0, -1)
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(
            items,
            vec![
                ScoredValue::new(1.0, s("a")),
                ScoredValue::new(2.0, s("b")),
                ScoredValue::new(2.0, s("c")),
            ]
        );
        assert_eq!(
            client.router().sent(),
            vec![vec!["ZRANGE", "k", "0", "-1", "WITHSCORES"]]
        );
    }

    #[tokio::test]
    async fn reverse_score_range_sends_max_first() {
        let client = client();
        client.router().reply(flat(&["c", "b"]));
        let range = Range::new(Boundary::Including(1.0), Boundary::Excluding(5.0));
        let items: Vec<String> = client
            .zrevrangebyscore_limit(&s("k"), &range, &Limit::new(0, 2))
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(items, vec!["c", "b"]);
        assert_eq!(
            client.router().sent(),
            vec![vec!["ZREVRANGEBYSCORE", "k", "(5", "1", "LIMIT", "0", "2"]]
        );
    }

    #[tokio::test]
    async fn score_range_with_scores_and_limit() {
        let client = client();
        client.router().reply(flat(&["a", "1.5"]));
        let items: Vec<_> = client
            .zrangebyscore_with_scores_limit(&s("k"), &Range::unbounded(), &Limit::new(1, -1))
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(items, vec![ScoredValue::new(1.5, s("a"))]);
        assert_eq!(
            client.router().sent(),
            vec![vec![
                "ZRANGEBYSCORE",
                "k",
                "-inf",
                "+inf",
                "WITHSCORES",
                "LIMIT",
                "1",
                "-1"
            ]]
        );
    }

    #[tokio::test]
    async fn reverse_lex_range() {
        let client = client();
        client.router().reply(flat(&["c"]));
        let range = Range::new(Boundary::Unbounded, Boundary::Including(s("c")));
        let items: Vec<String> = client
            .zrevrangebylex(&s("k"), &range)
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(items, vec!["c"]);
        assert_eq!(
            client.router().sent(),
            vec![vec!["ZREVRANGEBYLEX", "k", "[c", "-"]]
        );
    }

    #[tokio::test]
    async fn set_algebra_reject_empty_keys_without_sending() {
        let client = client();
        assert!(client.zdiff(&[]).err().unwrap().is_invalid_argument());
        assert!(client.zunion_with_scores(&[]).err().unwrap().is_invalid_argument());
        assert!(client.zinter(&[]).err().unwrap().is_invalid_argument());
        assert!(client
            .zunionstore(&s("dst"), &[])
            .await
            .unwrap_err()
            .is_invalid_argument());
        assert!(client
            .zintercard(&[])
            .await
            .unwrap_err()
            .is_invalid_argument());
        assert!(client.router().sent().is_empty());
    }

    #[tokio::test]
    async fn zdiff_keeps_key_order() {
        let client = client();
        client.router().reply(flat(&["only-in-a"]));
        let items: Vec<String> = client
            .zdiff(&[s("a"), s("b"), s("c")])
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(items, vec!["only-in-a"]);
        assert_eq!(
            client.router().sent(),
            vec![vec!["ZDIFF", "3", "a", "b", "c"]]
        );
    }

    #[tokio::test]
    async fn aggregate_args() {
        let client = client();
        client
            .router()
            .reply(flat(&["m", "6"]))
            .reply(RespValue::Integer(4));
        let args = ZAggregateArgs::new().weights([2.0, 1.0]).max();
        let items: Vec<_> = client
            .zunion_with_scores_and_args(&args, &[s("a"), s("b")])
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(items, vec![ScoredValue::new(6.0, s("m"))]);

        let store = ZStoreArgs::new().aggregate(Aggregate::Min);
        assert_eq!(
            client
                .zinterstore_with_args(&s("dst"), &store, &[s("a"), s("b")])
                .await
                .unwrap(),
            4
        );
        assert_eq!(
            client.router().sent(),
            vec![
                vec!["ZUNION", "2", "a", "b", "WEIGHTS", "2", "1", "AGGREGATE", "MAX", "WITHSCORES"],
                vec!["ZINTERSTORE", "dst", "2", "a", "b", "AGGREGATE", "MIN"],
            ]
        );
    }

    #[tokio::test]
    async fn weight_count_must_match_keys() {
        let client = client();
        let args = ZAggregateArgs::new().weights([1.0]);
        assert!(client
            .zinter_with_args(&args, &[s("a"), s("b")])
            .err()
            .unwrap()
            .is_invalid_argument());
    }

    #[tokio::test]
    async fn zintercard_with_limit() {
        let client = client();
        client.router().reply(RespValue::Integer(2));
        assert_eq!(
            client
                .zintercard_with_limit(2, &[s("a"), s("b")])
                .await
                .unwrap(),
            2
        );
        assert_eq!(
            client.router().sent(),
            vec![vec!["ZINTERCARD", "2", "a", "b", "LIMIT", "2"]]
        );
    }

    #[tokio::test]
    async fn bzpopmin_returns_key_and_member() {
        let client = client();
        client.router().reply(flat(&["q2", "job", "7"]));
        let popped = client
            .bzpopmin(BlockTimeout::secs_f64(0.5), &[s("q1"), s("q2")])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(popped.key, "q2");
        assert_eq!(popped.value, ScoredValue::new(7.0, s("job")));

        let sent = client.router().sent_commands();
        assert_eq!(sent[0].blocking_timeout(), Some(Duration::from_millis(500)));
        assert_eq!(
            client.router().sent(),
            vec![vec!["BZPOPMIN", "q1", "q2", "0.5"]]
        );
    }

    #[tokio::test]
    async fn bzpopmax_timeout_is_none() {
        let client = client();
        client.router().reply(RespValue::Null);
        assert!(client
            .bzpopmax(BlockTimeout::secs(1), &[s("q")])
            .await
            .unwrap()
            .is_none());
        assert!(client
            .bzpopmax(BlockTimeout::secs_f64(-1.0), &[s("q")])
            .await
            .unwrap_err()
            .is_invalid_argument());
        assert!(client
            .bzpopmax(BlockTimeout::secs(1), &[])
            .await
            .unwrap_err()
            .is_invalid_argument());
    }

    #[tokio::test]
    async fn pops() {
        let client = client();
        client
            .router()
            .reply(flat(&["a", "1"]))
            .reply(RespValue::Array(vec![]))
            .reply(flat(&["z", "9", "y", "8"]));
        assert_eq!(
            client.zpopmin(&s("k")).await.unwrap(),
            Some(ScoredValue::new(1.0, s("a")))
        );
        assert_eq!(client.zpopmax(&s("empty")).await.unwrap(), None);
        let popped: Vec<_> = client
            .zpopmax_count(&s("k"), 2)
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(popped.len(), 2);
        assert_eq!(popped[0].value, "z");
        assert_eq!(
            client.router().sent()[2],
            vec!["ZPOPMAX", "k", "2"]
        );
    }

    #[tokio::test]
    async fn zrandmember_forms() {
        let client = client();
        client
            .router()
            .reply(RespValue::Null)
            .reply(flat(&["a", "a"]))
            .reply(flat(&["b", "2"]))
            .reply(RespValue::Array(vec![
                RespValue::Array(vec![RespValue::bulk("c"), RespValue::Double(3.0)]),
            ]));
        assert_eq!(client.zrandmember(&s("empty")).await.unwrap(), None);
        assert_eq!(
            client.zrandmember_count(&s("k"), -2).await.unwrap(),
            vec!["a", "a"]
        );
        assert_eq!(
            client.zrandmember_with_scores(&s("k")).await.unwrap(),
            Some(ScoredValue::new(2.0, s("b")))
        );
        assert_eq!(
            client
                .zrandmember_count_with_scores(&s("k"), 1)
                .await
                .unwrap(),
            vec![ScoredValue::new(3.0, s("c"))]
        );
        let sent = client.router().sent();
        assert_eq!(sent[1], vec!["ZRANDMEMBER", "k", "-2"]);
        assert_eq!(sent[2], vec!["ZRANDMEMBER", "k", "1", "WITHSCORES"]);
    }

    #[tokio::test]
    async fn range_store_forms() {
        let client = client();
        client
            .router()
            .reply(RespValue::Integer(2))
            .reply(RespValue::Integer(1));
        let lex = Range::new(Boundary::Including(s("a")), Boundary::Unbounded);
        assert_eq!(
            client
                .zrangestorebylex(&s("dst"), &s("src"), &lex, &Limit::unlimited())
                .await
                .unwrap(),
            2
        );
        assert_eq!(
            client
                .zrevrangestorebyscore(
                    &s("dst"),
                    &s("src"),
                    &Range::inclusive(1.0, 3.0),
                    &Limit::new(0, 1)
                )
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            client.router().sent(),
            vec![
                vec!["ZRANGESTORE", "dst", "src", "[a", "+", "BYLEX"],
                vec!["ZRANGESTORE", "dst", "src", "3", "1", "BYSCORE", "REV", "LIMIT", "0", "1"],
            ]
        );
    }

    #[tokio::test]
    async fn removals() {
        let client = client();
        client
            .router()
            .reply(RespValue::Integer(2))
            .reply(RespValue::Integer(1))
            .reply(RespValue::Integer(3))
            .reply(RespValue::Integer(0));
        assert_eq!(client.zrem(&s("k"), &[s("a"), s("b")]).await.unwrap(), 2);
        assert_eq!(
            client
                .zremrangebylex(&s("k"), &Range::new(Boundary::Unbounded, Boundary::Excluding(s("m"))))
                .await
                .unwrap(),
            1
        );
        assert_eq!(client.zremrangebyrank(&s("k"), 0, -1).await.unwrap(), 3);
        assert_eq!(
            client
                .zremrangebyscore(&s("k"), &Range::inclusive(f64::NEG_INFINITY, 0.0))
                .await
                .unwrap(),
            0
        );
        assert_eq!(
            client.router().sent(),
            vec![
                vec!["ZREM", "k", "a", "b"],
                vec!["ZREMRANGEBYLEX", "k", "-", "(m"],
                vec!["ZREMRANGEBYRANK", "k", "0", "-1"],
                vec!["ZREMRANGEBYSCORE", "k", "-inf", "0"],
            ]
        );
        assert!(client
            .zrem(&s("k"), &[])
            .await
            .unwrap_err()
            .is_invalid_argument());
    }

    #[tokio::test]
    async fn zscan_pages() {
        let client = client();
        client
            .router()
            .reply(RespValue::Array(vec![
                RespValue::bulk("17"),
                flat(&["a", "1"]),
            ]))
            .reply(RespValue::Array(vec![RespValue::bulk("0"), flat(&["b", "2"])]));

        let first = client
            .zscan_with_args(&s("k"), &ScanArgs::new().matches("*").limit(10))
            .await
            .unwrap();
        assert!(!first.is_finished());
        assert_eq!(first.values(), &[ScoredValue::new(1.0, s("a"))]);

        let last = client.zscan_cursor(&s("k"), first.cursor()).await.unwrap();
        assert!(last.is_finished());
        assert!(client
            .zscan_cursor(&s("k"), last.cursor())
            .await
            .unwrap_err()
            .is_invalid_argument());

        assert_eq!(
            client.router().sent(),
            vec![
                vec!["ZSCAN", "k", "0", "MATCH", "*", "COUNT", "10"],
                vec!["ZSCAN", "k", "17"],
            ]
        );
    }

    #[tokio::test]
    async fn server_error_surfaces_in_stream() {
        let client = client();
        client.router().reply(RespValue::Error(
            "WRONGTYPE Operation against a key holding the wrong kind of value".into(),
        ));
        let items: Vec<_> = client.zrange(&s("k"), 0, -1).unwrap().collect().await;
        assert_eq!(items.len(), 1);
        assert_eq!(
            items[0].as_ref().unwrap_err().redis_kind(),
            Some(&crate::error::RedisErrorKind::WrongType)
        );
    }
}
