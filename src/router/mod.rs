pub mod dedicated;
pub mod standalone;

pub use dedicated::DedicatedRouter;
pub use standalone::StandaloneRouter;

use crate::command::Command;
use crate::error::Result;
use crate::resp::types::RespValue;

/// Transport behind the command dispatcher.
///
/// Submits one command and returns the one decoded reply frame. Error
/// replies come back as `Ok(RespValue::Error(..))`; `Err` is reserved for
/// transport and protocol failures.
pub trait Router: Send + Sync {
    fn execute(
        &self,
        cmd: &Command,
    ) -> impl std::future::Future<Output = Result<RespValue>> + Send;
}
