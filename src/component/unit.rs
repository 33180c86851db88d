//! Defining-unit resolution.
//!
//! A unit is the crate that defines a component. Components defined outside
//! the application's entry unit serve their scripts from a packaged asset
//! root instead of the application root.

use std::fmt;

use crate::component::identity::ComponentIdentity;
use crate::error::{Error, Result};

/// Full identity of a code unit (crate name and version).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnitIdentity {
    name: String,
    version: String,
}

impl UnitIdentity {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Short unit name, as passed to path formatters.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for UnitIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// Identity of the crate invoking the macro, for use as the entry unit.
#[macro_export]
macro_rules! entry_unit {
    () => {
        $crate::UnitIdentity::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    };
}

/// Answers whether a component belongs to the application's entry unit.
pub trait UnitResolver: Send + Sync {
    /// Full identity string of the application's entry unit.
    fn entry_unit(&self) -> Result<String>;

    /// Full identity string of the unit defining `component`.
    fn component_unit(&self, component: &ComponentIdentity) -> String {
        component.unit().to_string()
    }

    /// True iff the component's unit differs from the entry unit.
    fn is_external_unit(&self, component: &ComponentIdentity) -> Result<bool> {
        Ok(self.entry_unit()? != self.component_unit(component))
    }
}

/// Unit resolver backed by a fixed entry unit.
#[derive(Debug, Clone, Default)]
pub struct EntryUnitResolver {
    entry: Option<UnitIdentity>,
}

impl EntryUnitResolver {
    pub fn new(entry: UnitIdentity) -> Self {
        Self { entry: Some(entry) }
    }

    /// A resolver with no entry unit. Every externality query fails.
    pub fn unset() -> Self {
        Self { entry: None }
    }
}

impl UnitResolver for EntryUnitResolver {
    fn entry_unit(&self) -> Result<String> {
        self.entry
            .as_ref()
            .map(|unit| unit.to_string())
            .ok_or_else(|| Error::Configuration("No entry unit configured".to_string()))
    }
}
