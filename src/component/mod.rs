//! Component identity and defining-unit resolution.

pub mod identity;
pub mod unit;

pub use identity::{Component, ComponentDescriptor, ComponentIdentity};
pub use unit::{EntryUnitResolver, UnitIdentity, UnitResolver};
