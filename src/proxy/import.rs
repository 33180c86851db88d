//! Single-flight module import.
//!
//! State machine for a proxy's module:
//! NOT_STARTED -> IN_FLIGHT -> READY | FAILED -> DISPOSED
//!
//! The first caller spawns the import as its own task and every caller,
//! including the first, waits on a watch channel for the outcome. Dropping a
//! waiting caller never cancels the import. Failed outcomes are cached like
//! successful ones.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use crate::bridge::{ModuleHandle, ScriptRuntime};
use crate::component::{Component, ComponentIdentity, UnitResolver};
use crate::error::{Error, Result};
use crate::formatter::PathFormatterResolver;

/// Outcome of a module import.
pub(crate) type ImportOutcome = Result<Arc<dyn ModuleHandle>>;

type OutcomeReceiver = watch::Receiver<Option<ImportOutcome>>;

/// Observable import state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportState {
    /// No caller has needed the module yet
    NotStarted,
    /// The module is being imported
    InFlight,
    /// The import finished successfully
    Ready,
    /// The import failed; the failure is replayed to every caller
    Failed,
    /// The module was released
    Disposed,
}

impl std::fmt::Display for ImportState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "NOT_STARTED"),
            Self::InFlight => write!(f, "IN_FLIGHT"),
            Self::Ready => write!(f, "READY"),
            Self::Failed => write!(f, "FAILED"),
            Self::Disposed => write!(f, "DISPOSED"),
        }
    }
}

enum Slot {
    NotStarted,
    InFlight(OutcomeReceiver),
    Completed(ImportOutcome),
    Disposed,
}

impl Slot {
    fn state(&self) -> ImportState {
        match self {
            Slot::NotStarted => ImportState::NotStarted,
            Slot::InFlight(_) => ImportState::InFlight,
            Slot::Completed(Ok(_)) => ImportState::Ready,
            Slot::Completed(Err(_)) => ImportState::Failed,
            Slot::Disposed => ImportState::Disposed,
        }
    }
}

/// Wait for the import task behind `rx`. `None` if the task ended without
/// publishing, which only happens when it panicked.
async fn published(rx: &mut OutcomeReceiver) -> Option<ImportOutcome> {
    match rx.wait_for(Option::is_some).await {
        Ok(outcome) => outcome.clone(),
        Err(_) => None,
    }
}

/// Module left behind by a proxy dropped without `dispose()`.
pub(crate) enum Orphan {
    Ready(Arc<dyn ModuleHandle>),
    Pending(OutcomeReceiver),
}

impl Orphan {
    /// The handle to release, once the import (if any) has settled.
    pub(crate) async fn into_module(self) -> Option<Arc<dyn ModuleHandle>> {
        match self {
            Orphan::Ready(module) => Some(module),
            Orphan::Pending(mut rx) => published(&mut rx).await.and_then(|outcome| outcome.ok()),
        }
    }
}

/// Memoized, single-flight module handle.
pub(crate) struct ImportCell {
    slot: Mutex<Slot>,
}

impl ImportCell {
    pub(crate) fn new() -> Self {
        Self {
            slot: Mutex::new(Slot::NotStarted),
        }
    }

    pub(crate) async fn state(&self) -> ImportState {
        self.slot.lock().await.state()
    }

    /// Return the cached outcome, joining or starting the import as needed.
    ///
    /// The import runs on a spawned task, so it completes and is cached even
    /// if every caller waiting on it is dropped. Callers still waiting when
    /// the cell is disposed get [`Error::Disposed`]. Must be called from
    /// within a tokio runtime.
    pub(crate) async fn get_or_import<F, Fut>(&self, load: F) -> ImportOutcome
    where
        F: Fn() -> Fut,
        Fut: Future<Output = ImportOutcome> + Send + 'static,
    {
        loop {
            let mut rx = {
                let mut slot = self.slot.lock().await;
                match &*slot {
                    Slot::Completed(outcome) => return outcome.clone(),
                    Slot::Disposed => return Err(Error::Disposed),
                    Slot::InFlight(rx) => rx.clone(),
                    Slot::NotStarted => {
                        let (tx, rx) = watch::channel(None);
                        let import = load();
                        tokio::spawn(async move {
                            let outcome = import.await;
                            let _ = tx.send(Some(outcome));
                        });
                        *slot = Slot::InFlight(rx.clone());
                        rx
                    }
                }
            };

            let outcome = published(&mut rx).await;

            let mut slot = self.slot.lock().await;
            match &*slot {
                Slot::Completed(cached) => return cached.clone(),
                Slot::Disposed => return Err(Error::Disposed),
                Slot::InFlight(current) if current.same_channel(&rx) => match outcome {
                    Some(outcome) => {
                        *slot = Slot::Completed(outcome.clone());
                        return outcome;
                    }
                    None => {
                        log::warn!("Module import task ended without an outcome; retrying");
                        *slot = Slot::NotStarted;
                    }
                },
                _ => {}
            }
        }
    }

    /// Move the cell to `Disposed` and hand back the handle to release.
    ///
    /// Never starts an import. The cell is marked `Disposed` before an
    /// in-flight import settles, so callers waiting on that import fail
    /// instead of receiving a handle about to be released. Returns `None`
    /// when there is nothing to release.
    pub(crate) async fn take_for_dispose(&self) -> Option<Arc<dyn ModuleHandle>> {
        let mut rx = {
            let mut slot = self.slot.lock().await;
            match std::mem::replace(&mut *slot, Slot::Disposed) {
                Slot::Completed(Ok(module)) => return Some(module),
                Slot::InFlight(rx) => rx,
                Slot::NotStarted | Slot::Disposed | Slot::Completed(Err(_)) => return None,
            }
        };

        match published(&mut rx).await {
            Some(Ok(module)) => Some(module),
            _ => None,
        }
    }

    /// Detach whatever module the cell holds. Used when dropping a proxy.
    pub(crate) fn take_orphan(&mut self) -> Option<Orphan> {
        match std::mem::replace(self.slot.get_mut(), Slot::Disposed) {
            Slot::Completed(Ok(module)) => Some(Orphan::Ready(module)),
            Slot::InFlight(rx) => Some(Orphan::Pending(rx)),
            Slot::NotStarted | Slot::Disposed | Slot::Completed(Err(_)) => None,
        }
    }
}

/// Resolve the script path of component `C` and import it.
///
/// The path produced by the resolved formatter is handed to the runtime
/// verbatim.
pub async fn import_component_script<C: Component>(
    runtime: &dyn ScriptRuntime,
    formatters: &dyn PathFormatterResolver,
    units: &dyn UnitResolver,
) -> Result<Arc<dyn ModuleHandle>> {
    import_script_for(&ComponentIdentity::of::<C>(), runtime, formatters, units).await
}

pub(crate) async fn import_script_for(
    component: &ComponentIdentity,
    runtime: &dyn ScriptRuntime,
    formatters: &dyn PathFormatterResolver,
    units: &dyn UnitResolver,
) -> Result<Arc<dyn ModuleHandle>> {
    let formatter = formatters.resolve_path_formatter(component).ok_or_else(|| {
        Error::Configuration(
            "Unable to resolve script path since there is no matching path formatter and the default formatter is not defined."
                .to_string(),
        )
    })?;

    let is_external = units.is_external_unit(component)?;
    let path = formatter.format(component.unit_name(), component.name(), is_external);

    log::debug!("Importing script module {} for {}", path, component);
    let module = runtime.import_module(&path).await.map_err(|e| {
        log::warn!("Failed to import script module {}: {}", path, e);
        Error::from(e)
    })?;

    Ok(module)
}
