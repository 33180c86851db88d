//! Script-invocation bridge.
//!
//! The host supplies an implementation of [`ScriptRuntime`] that can import a
//! script module by path, and of [`ModuleHandle`] for the loaded module.
//! Both are assumed asynchronous and ordered per call.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Failure reported by the script bridge.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    #[error("Script exception: {0}")]
    Exception(String),

    #[error("Call cancelled")]
    Cancelled,

    #[error("Script runtime disconnected")]
    Disconnected,

    #[error("{0}")]
    Other(String),
}

/// Loads script modules.
#[async_trait]
pub trait ScriptRuntime: Send + Sync {
    /// Import the module at `path`.
    async fn import_module(&self, path: &str) -> Result<Arc<dyn ModuleHandle>, ScriptError>;
}

/// A loaded, disposable script module.
#[async_trait]
pub trait ModuleHandle: Send + Sync {
    /// Invoke the exported member `identifier` with `args`.
    async fn invoke(&self, identifier: &str, args: &[Value]) -> Result<Value, ScriptError>;

    /// Invoke `identifier`, aborting when `cancellation` fires.
    ///
    /// The provided implementation stops waiting on the call once the token
    /// is cancelled. Bridges that can abort the script side should override it.
    async fn invoke_with_cancellation(
        &self,
        identifier: &str,
        cancellation: &CancellationToken,
        args: &[Value],
    ) -> Result<Value, ScriptError> {
        tokio::select! {
            biased;
            _ = cancellation.cancelled() => Err(ScriptError::Cancelled),
            result = self.invoke(identifier, args) => result,
        }
    }

    /// Release the module.
    async fn dispose(&self) -> Result<(), ScriptError>;
}
