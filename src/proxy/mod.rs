//! Per-component script proxy.
//!
//! A [`ComponentScriptProxy`] imports its component's script module on first
//! use and forwards named invocations to it.

pub mod exports;
pub mod import;

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

pub use import::{import_component_script, ImportState};

use crate::bridge::{ModuleHandle, ScriptRuntime};
use crate::component::{Component, ComponentIdentity, UnitResolver};
use crate::error::{Error, Result};
use crate::formatter::PathFormatterResolver;
use import::{import_script_for, ImportCell};

/// Lazily imported script module of component `C`.
///
/// The module is imported at most once per proxy, even under concurrent first
/// use, and is released by [`dispose`](Self::dispose).
pub struct ComponentScriptProxy<C: Component> {
    runtime: Arc<dyn ScriptRuntime>,
    formatters: Arc<dyn PathFormatterResolver>,
    units: Arc<dyn UnitResolver>,
    module: ImportCell,
    _component: PhantomData<fn() -> C>,
}

impl<C: Component> ComponentScriptProxy<C> {
    /// Create a proxy. Nothing is imported until the first call.
    pub fn new(
        runtime: Arc<dyn ScriptRuntime>,
        formatters: Arc<dyn PathFormatterResolver>,
        units: Arc<dyn UnitResolver>,
    ) -> Self {
        Self {
            runtime,
            formatters,
            units,
            module: ImportCell::new(),
            _component: PhantomData,
        }
    }

    /// Identity of the component this proxy serves.
    pub fn component(&self) -> ComponentIdentity {
        ComponentIdentity::of::<C>()
    }

    /// Current import state.
    pub async fn state(&self) -> ImportState {
        self.module.state().await
    }

    /// The loaded module, importing it if needed.
    pub async fn module(&self) -> Result<Arc<dyn ModuleHandle>> {
        self.module.get_or_import(|| self.import()).await
    }

    fn import(&self) -> impl Future<Output = Result<Arc<dyn ModuleHandle>>> + Send + 'static {
        let runtime = Arc::clone(&self.runtime);
        let formatters = Arc::clone(&self.formatters);
        let units = Arc::clone(&self.units);

        async move {
            import_script_for(
                &ComponentIdentity::of::<C>(),
                runtime.as_ref(),
                formatters.as_ref(),
                units.as_ref(),
            )
            .await
        }
    }

    /// Invoke `identifier` and deserialize its result.
    pub async fn invoke<T: DeserializeOwned>(&self, identifier: &str, args: &[Value]) -> Result<T> {
        let module = self.module().await?;
        let value = module.invoke(identifier, args).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Invoke `identifier`, passing `cancellation` through to the bridge.
    ///
    /// Cancelling affects only this call; the cached import is untouched.
    pub async fn invoke_with_cancellation<T: DeserializeOwned>(
        &self,
        identifier: &str,
        cancellation: &CancellationToken,
        args: &[Value],
    ) -> Result<T> {
        let module = self.module().await?;
        let value = module
            .invoke_with_cancellation(identifier, cancellation, args)
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Invoke `identifier`, discarding any result.
    pub async fn invoke_void(&self, identifier: &str, args: &[Value]) -> Result<()> {
        let module = self.module().await?;
        module.invoke(identifier, args).await?;
        Ok(())
    }

    /// Invoke `identifier` with cancellation, discarding any result.
    pub async fn invoke_void_with_cancellation(
        &self,
        identifier: &str,
        cancellation: &CancellationToken,
        args: &[Value],
    ) -> Result<()> {
        let module = self.module().await?;
        module
            .invoke_with_cancellation(identifier, cancellation, args)
            .await?;
        Ok(())
    }

    /// Release the module if one was imported.
    ///
    /// Does not start an import. An import still in flight is awaited and its
    /// module released; calls waiting on it, and all later calls, fail with
    /// [`Error::Disposed`]. Safe to call repeatedly.
    pub async fn dispose(&self) -> Result<()> {
        match self.module.take_for_dispose().await {
            Some(module) => {
                log::debug!("Disposing script module for {}", ComponentIdentity::of::<C>());
                module.dispose().await.map_err(Error::from)
            }
            None => Ok(()),
        }
    }
}

impl<C: Component> Drop for ComponentScriptProxy<C> {
    fn drop(&mut self) {
        let Some(orphan) = self.module.take_orphan() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let Some(module) = orphan.into_module().await else {
                        return;
                    };
                    if let Err(e) = module.dispose().await {
                        log::warn!("Failed to dispose dropped script module: {}", e);
                    }
                });
            }
            Err(_) => {
                log::warn!(
                    "Script module for {} dropped outside a runtime without dispose()",
                    ComponentIdentity::of::<C>()
                );
            }
        }
    }
}

impl<C: Component> std::fmt::Debug for ComponentScriptProxy<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentScriptProxy")
            .field("component", &ComponentIdentity::of::<C>())
            .finish()
    }
}
