//! Layered registry of path formatters.
//!
//! Resolution order is fixed by specificity, never by insertion order:
//! component > namespace > unit > default.

use std::any::TypeId;
use std::collections::HashMap;

use crate::component::{Component, ComponentIdentity};
use crate::config::ScriptOptions;
use crate::formatter::{default_formatter, PathFormatter};

/// Source of the formatter for a component.
pub trait PathFormatterResolver: Send + Sync {
    /// Resolve the formatter that applies to `component`, if any.
    fn resolve_path_formatter(&self, component: &ComponentIdentity) -> Option<PathFormatter>;
}

/// Which registry layer supplied a formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatterLayer {
    Component,
    Namespace,
    Unit,
    Default,
}

impl std::fmt::Display for FormatterLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Component => write!(f, "COMPONENT"),
            Self::Namespace => write!(f, "NAMESPACE"),
            Self::Unit => write!(f, "UNIT"),
            Self::Default => write!(f, "DEFAULT"),
        }
    }
}

/// Formatter rules keyed by component type, namespace, and defining unit,
/// plus one default that is always present.
#[derive(Debug, Clone)]
pub struct FormatterRegistry {
    /// Formatters by exact component type
    components: HashMap<TypeId, PathFormatter>,
    /// Formatters by exact namespace
    namespaces: HashMap<String, PathFormatter>,
    /// Formatters by full unit identity (`name@version`)
    units: HashMap<String, PathFormatter>,
    /// Fallback formatter
    default: PathFormatter,
}

impl FormatterRegistry {
    /// Create a registry holding only the built-in default formatter.
    pub fn new() -> Self {
        Self::with_options(&ScriptOptions::default())
    }

    /// Create a registry from options: the default formatter uses the
    /// configured prefix, asset root and suffix, and the option templates are
    /// registered as namespace and unit formatters.
    pub fn with_options(options: &ScriptOptions) -> Self {
        let mut registry = Self {
            components: HashMap::new(),
            namespaces: HashMap::new(),
            units: HashMap::new(),
            default: default_formatter(options),
        };

        for (namespace, template) in &options.namespaces {
            registry.map_namespace(namespace.clone(), PathFormatter::template(template.clone()));
        }
        for (unit, template) in &options.units {
            registry.map_unit(unit.clone(), PathFormatter::template(template.clone()));
        }

        registry
    }

    /// Register the formatter for an exact unit identity (`name@version`).
    pub fn map_unit(&mut self, unit: impl Into<String>, formatter: impl Into<PathFormatter>) -> &mut Self {
        self.units.insert(unit.into(), formatter.into());
        self
    }

    /// Register the formatter for an exact namespace.
    pub fn map_namespace(
        &mut self,
        namespace: impl Into<String>,
        formatter: impl Into<PathFormatter>,
    ) -> &mut Self {
        self.namespaces.insert(namespace.into(), formatter.into());
        self
    }

    /// Register the formatter for component type `C`.
    pub fn map_component<C: Component>(&mut self, formatter: impl Into<PathFormatter>) -> &mut Self {
        self.components.insert(TypeId::of::<C>(), formatter.into());
        self
    }

    /// Replace the fallback formatter.
    pub fn map_default(&mut self, formatter: impl Into<PathFormatter>) -> &mut Self {
        self.default = formatter.into();
        self
    }

    /// The current fallback formatter.
    pub fn default_formatter(&self) -> &PathFormatter {
        &self.default
    }

    /// Resolve the most specific formatter for component type `C`.
    pub fn resolve<C: Component>(&self) -> PathFormatter {
        self.resolve_for(&ComponentIdentity::of::<C>())
    }

    /// Resolve the most specific formatter for `component`.
    pub fn resolve_for(&self, component: &ComponentIdentity) -> PathFormatter {
        let (layer, formatter) = self.resolve_layer(component);
        log::trace!("Resolved {} formatter for {}", layer, component);
        formatter.clone()
    }

    /// Resolve the formatter and report which layer supplied it.
    pub fn resolve_layer(&self, component: &ComponentIdentity) -> (FormatterLayer, &PathFormatter) {
        if let Some(formatter) = self.components.get(&component.type_id()) {
            return (FormatterLayer::Component, formatter);
        }
        if let Some(formatter) = self.namespaces.get(component.namespace()) {
            return (FormatterLayer::Namespace, formatter);
        }
        if let Some(formatter) = self.units.get(&component.unit().to_string()) {
            return (FormatterLayer::Unit, formatter);
        }
        (FormatterLayer::Default, &self.default)
    }
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PathFormatterResolver for FormatterRegistry {
    fn resolve_path_formatter(&self, component: &ComponentIdentity) -> Option<PathFormatter> {
        Some(self.resolve_for(component))
    }
}
