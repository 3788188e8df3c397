//! Connection management: `AUTH`, `CLIENT *`, `ECHO`, `PING`, `ROLE`,
//! `READONLY` / `READWRITE` and `QUIT`.
//!
//! Most of these change state on the connection they travel on. With a
//! pooled router the next command may use a different connection; use a
//! client built on [`DedicatedRouter`](crate::router::DedicatedRouter)
//! when that matters.

use std::future::Future;

use crate::args::{KillArgs, TrackingArgs, UnblockType};
use crate::client::RedisClient;
use crate::codec::RedisCodec;
use crate::command::Command;
use crate::error::Result;
use crate::output;
use crate::router::Router;
use crate::types::Role;

pub trait ConnectionCommands<K, V>: Send + Sync {
    /// `AUTH password`
    ///
    /// Authenticates only the connection the command travels on. Through a
    /// pooled client, set credentials in the connection config instead, or
    /// use [`RedisClient::dedicated`].
    fn auth(&self, password: &str) -> impl Future<Output = Result<String>> + Send;

    /// `AUTH username password` (ACL users). Connection-scoped like
    /// [`auth`](Self::auth).
    fn auth_with_username(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<String>> + Send;

    /// `CLIENT CACHING YES|NO`, for tracking in `OPTIN` / `OPTOUT` mode.
    fn client_caching(&self, enabled: bool) -> impl Future<Output = Result<String>> + Send;

    /// Name set with `CLIENT SETNAME`, `None` if unnamed.
    fn client_getname(&self) -> impl Future<Output = Result<Option<K>>> + Send;

    /// Client id receiving tracking redirects; `-1` when not redirecting,
    /// `0` when tracking is off.
    fn client_getredir(&self) -> impl Future<Output = Result<i64>> + Send;

    fn client_id(&self) -> impl Future<Output = Result<i64>> + Send;

    /// Legacy `CLIENT KILL ip:port`.
    fn client_kill(&self, addr: &str) -> impl Future<Output = Result<String>> + Send;

    /// Filtered `CLIENT KILL`; returns the number of clients closed.
    fn client_kill_with(&self, args: &KillArgs) -> impl Future<Output = Result<i64>> + Send;

    fn client_list(&self) -> impl Future<Output = Result<String>> + Send;

    /// Suspend all clients for `timeout_ms` milliseconds.
    fn client_pause(&self, timeout_ms: u64) -> impl Future<Output = Result<String>> + Send;

    /// Names the carrying connection. A pooled client does not keep the
    /// name; see [`RedisClient::dedicated`] or `ConnectionConfig::client_name`.
    fn client_setname(&self, name: &K) -> impl Future<Output = Result<String>> + Send;

    /// Tracking state belongs to one connection, so pair this with
    /// [`RedisClient::dedicated`].
    fn client_tracking(&self, args: &TrackingArgs) -> impl Future<Output = Result<String>> + Send;

    /// Wake a client blocked in a blocking command. Returns 1 if it was
    /// blocked, 0 otherwise.
    fn client_unblock(
        &self,
        id: i64,
        kind: UnblockType,
    ) -> impl Future<Output = Result<i64>> + Send;

    fn echo(&self, message: &V) -> impl Future<Output = Result<V>> + Send;

    fn role(&self) -> impl Future<Output = Result<Role>> + Send;

    fn ping(&self) -> impl Future<Output = Result<String>> + Send;

    /// Allow reads from a cluster replica on this connection. Only sticks
    /// on a [`RedisClient::dedicated`] client.
    fn readonly(&self) -> impl Future<Output = Result<String>> + Send;

    fn readwrite(&self) -> impl Future<Output = Result<String>> + Send;

    /// Ask the server to close the connection. The connection is never
    /// reused afterwards; a pooled client just drops one pooled connection.
    fn quit(&self) -> impl Future<Output = Result<String>> + Send;
}

fn client_sub(sub: &'static str) -> Command {
    let mut cmd = Command::new("CLIENT");
    cmd.arg(sub);
    cmd
}

impl<R, C> ConnectionCommands<C::Key, C::Value> for RedisClient<R, C>
where
    R: Router + 'static,
    C: RedisCodec,
{
    async fn auth(&self, password: &str) -> Result<String> {
        let mut cmd = Command::new("AUTH");
        cmd.arg(password.to_owned());
        self.status_of(cmd).await
    }

    async fn auth_with_username(&self, username: &str, password: &str) -> Result<String> {
        let mut cmd = Command::new("AUTH");
        cmd.arg(username.to_owned()).arg(password.to_owned());
        self.status_of(cmd).await
    }

    async fn client_caching(&self, enabled: bool) -> Result<String> {
        let mut cmd = client_sub("CACHING");
        cmd.arg(if enabled { "YES" } else { "NO" });
        self.status_of(cmd).await
    }

    async fn client_getname(&self) -> Result<Option<C::Key>> {
        let reply = self.dispatch(client_sub("GETNAME")).await?;
        output::optional_bytes(reply)?
            .map(|raw| self.codec().decode_key(raw))
            .transpose()
    }

    async fn client_getredir(&self) -> Result<i64> {
        self.integer_of(client_sub("GETREDIR")).await
    }

    async fn client_id(&self) -> Result<i64> {
        self.integer_of(client_sub("ID")).await
    }

    async fn client_kill(&self, addr: &str) -> Result<String> {
        let mut cmd = client_sub("KILL");
        cmd.arg(addr.to_owned());
        self.status_of(cmd).await
    }

    async fn client_kill_with(&self, args: &KillArgs) -> Result<i64> {
        let mut cmd = client_sub("KILL");
        args.append_to(&mut cmd)?;
        self.integer_of(cmd).await
    }

    async fn client_list(&self) -> Result<String> {
        self.status_of(client_sub("LIST")).await
    }

    async fn client_pause(&self, timeout_ms: u64) -> Result<String> {
        let mut cmd = client_sub("PAUSE");
        cmd.arg_uint(timeout_ms);
        self.status_of(cmd).await
    }

    async fn client_setname(&self, name: &C::Key) -> Result<String> {
        let mut cmd = client_sub("SETNAME");
        cmd.arg(self.codec().encode_key(name));
        self.status_of(cmd).await
    }

    async fn client_tracking(&self, args: &TrackingArgs) -> Result<String> {
        let mut cmd = client_sub("TRACKING");
        args.append_to(&mut cmd)?;
        self.status_of(cmd).await
    }

    async fn client_unblock(&self, id: i64, kind: UnblockType) -> Result<i64> {
        let mut cmd = client_sub("UNBLOCK");
        cmd.arg_int(id).arg(kind.as_str());
        self.integer_of(cmd).await
    }

    async fn echo(&self, message: &C::Value) -> Result<C::Value> {
        let mut cmd = Command::new("ECHO");
        cmd.arg(self.codec().encode_value(message));
        let raw = output::bytes(self.dispatch(cmd).await?)?;
        self.codec().decode_value(raw)
    }

    async fn role(&self) -> Result<Role> {
        output::role(self.dispatch(Command::new("ROLE")).await?)
    }

    async fn ping(&self) -> Result<String> {
        self.status_of(Command::new("PING")).await
    }

    async fn readonly(&self) -> Result<String> {
        self.status_of(Command::new("READONLY")).await
    }

    async fn readwrite(&self) -> Result<String> {
        self.status_of(Command::new("READWRITE")).await
    }

    async fn quit(&self) -> Result<String> {
        self.status_of(Command::new("QUIT")).await
    }
}

// ── Tests ──────────────────────────────────────────────────────────
