//! Component identity.
//!
//! Components name themselves through the [`Component`] trait instead of
//! being discovered by reflection. The [`component!`](crate::component!)
//! macro fills the descriptor in from the call site.

use std::any::TypeId;
use std::fmt;

use crate::component::unit::UnitIdentity;

/// Static description of a component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentDescriptor {
    /// Component name (e.g., "Widget")
    pub name: &'static str,
    /// Enclosing namespace (e.g., "app::pages")
    pub namespace: &'static str,
    /// Short name of the defining unit
    pub unit_name: &'static str,
    /// Version of the defining unit
    pub unit_version: &'static str,
}

/// A UI component with an optional associated script module.
pub trait Component: Send + Sync + 'static {
    /// Describe this component.
    fn descriptor() -> ComponentDescriptor;
}

/// Implement [`Component`] for a type using the caller's module path and
/// crate metadata.
///
/// ```
/// use component_scripts::{component, ComponentIdentity};
///
/// pub struct Counter;
/// component!(Counter);
///
/// let id = ComponentIdentity::of::<Counter>();
/// assert_eq!(id.name(), "Counter");
/// ```
#[macro_export]
macro_rules! component {
    ($ty:ident) => {
        $crate::component!($ty, stringify!($ty));
    };
    ($ty:ident, $name:expr) => {
        impl $crate::Component for $ty {
            fn descriptor() -> $crate::ComponentDescriptor {
                $crate::ComponentDescriptor {
                    name: $name,
                    namespace: module_path!(),
                    unit_name: env!("CARGO_PKG_NAME"),
                    unit_version: env!("CARGO_PKG_VERSION"),
                }
            }
        }
    };
}

/// Identity of a component type: its descriptor plus its `TypeId`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentIdentity {
    type_id: TypeId,
    descriptor: ComponentDescriptor,
}

impl ComponentIdentity {
    /// Identity of component type `C`.
    pub fn of<C: Component>() -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            descriptor: C::descriptor(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    pub fn namespace(&self) -> &'static str {
        self.descriptor.namespace
    }

    pub fn unit_name(&self) -> &'static str {
        self.descriptor.unit_name
    }

    /// Full identity of the defining unit.
    pub fn unit(&self) -> UnitIdentity {
        UnitIdentity::new(self.descriptor.unit_name, self.descriptor.unit_version)
    }

    pub fn descriptor(&self) -> &ComponentDescriptor {
        &self.descriptor
    }
}

impl fmt::Debug for ComponentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentIdentity")
            .field("name", &self.descriptor.name)
            .field("namespace", &self.descriptor.namespace)
            .field("unit", &self.unit().to_string())
            .finish()
    }
}

impl fmt::Display for ComponentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.descriptor.namespace, self.descriptor.name)
    }
}
