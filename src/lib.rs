//! Component Scripts - per-component script module resolution and lazy invocation.
//!
//! Each UI component may ship a script module. This crate resolves the
//! module's path through a layered formatter registry, imports it once on
//! first use through a host-provided script bridge, and forwards typed
//! invocations to it.

mod defaults;
pub mod error;

pub mod bridge;
pub mod component;
pub mod config;
pub mod formatter;
pub mod proxy;
pub mod services;

pub use error::{Error, Result};

pub use bridge::{ModuleHandle, ScriptError, ScriptRuntime};
pub use component::{
    Component, ComponentDescriptor, ComponentIdentity, EntryUnitResolver, UnitIdentity,
    UnitResolver,
};
pub use config::ScriptOptions;
pub use formatter::registry::FormatterLayer;
pub use formatter::{default_formatter, FormatterRegistry, PathFormatter, PathFormatterResolver};
pub use proxy::{import_component_script, ComponentScriptProxy, ImportState};
pub use services::{
    add_component_scripts, add_component_scripts_with, ScriptScope, ScriptServices,
    ScriptServicesBuilder,
};

pub use tokio_util::sync::CancellationToken;

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
