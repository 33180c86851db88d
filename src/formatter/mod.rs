//! Script path formatting.

pub mod registry;

use std::fmt;
use std::sync::Arc;

pub use registry::{FormatterRegistry, PathFormatterResolver};

use crate::config::ScriptOptions;

type FormatFn = dyn Fn(&str, &str, bool) -> String + Send + Sync;

/// Pure function from `(unit_name, component_name, is_external_unit)` to a
/// script path.
///
/// Cloning shares the underlying function.
#[derive(Clone)]
pub struct PathFormatter {
    inner: Arc<FormatFn>,
}

impl PathFormatter {
    /// Wrap a formatting function.
    pub fn new<F>(formatter: F) -> Self
    where
        F: Fn(&str, &str, bool) -> String + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(formatter),
        }
    }

    /// Formatter that substitutes `{unit}` and `{component}` in `template`.
    pub fn template(template: impl Into<String>) -> Self {
        let template = template.into();
        Self::new(move |unit, component, _| {
            template
                .replace("{unit}", unit)
                .replace("{component}", component)
        })
    }

    /// Produce the script path for a component.
    pub fn format(&self, unit_name: &str, component_name: &str, is_external_unit: bool) -> String {
        (self.inner)(unit_name, component_name, is_external_unit)
    }

    /// Whether both formatters share the same function.
    pub fn ptr_eq(&self, other: &PathFormatter) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<F> From<F> for PathFormatter
where
    F: Fn(&str, &str, bool) -> String + Send + Sync + 'static,
{
    fn from(formatter: F) -> Self {
        PathFormatter::new(formatter)
    }
}

impl fmt::Debug for PathFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathFormatter")
            .field("ptr", &Arc::as_ptr(&self.inner).cast::<()>())
            .finish()
    }
}

/// Built-in fallback formatter.
///
/// Local components resolve to `{prefix}{component}{suffix}`; components from
/// an external unit resolve under the packaged asset root,
/// `{prefix}{asset_root}/{unit}/{component}{suffix}`.
pub fn default_formatter(options: &ScriptOptions) -> PathFormatter {
    let prefix = options.path_prefix.clone();
    let asset_root = options.asset_root.clone();
    let suffix = options.script_suffix.clone();

    PathFormatter::new(move |unit, component, is_external_unit| {
        if is_external_unit {
            format!("{prefix}{asset_root}/{unit}/{component}{suffix}")
        } else {
            format!("{prefix}{component}{suffix}")
        }
    })
}
