//! Registration of the component script services.
//!
//! Configure the formatter registry once at startup, then hand out proxies:
//! fresh ones from [`ScriptServices::proxy`], or one per component type from
//! a request-scoped [`ScriptScope`].

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::bridge::ScriptRuntime;
use crate::component::{Component, EntryUnitResolver, UnitIdentity, UnitResolver};
use crate::config::ScriptOptions;
use crate::error::{Error, Result};
use crate::formatter::FormatterRegistry;
use crate::proxy::ComponentScriptProxy;

/// Register the script services with the default formatter registry.
pub fn add_component_scripts(
    runtime: Arc<dyn ScriptRuntime>,
    units: Arc<dyn UnitResolver>,
) -> ScriptServices {
    ScriptServices::builder(runtime).unit_resolver(units).build()
}

/// Register the script services, letting `configure` map formatters first.
pub fn add_component_scripts_with<F>(
    runtime: Arc<dyn ScriptRuntime>,
    units: Arc<dyn UnitResolver>,
    configure: F,
) -> ScriptServices
where
    F: FnOnce(&mut FormatterRegistry),
{
    ScriptServices::builder(runtime)
        .unit_resolver(units)
        .configure(configure)
        .build()
}

/// Builder for [`ScriptServices`].
pub struct ScriptServicesBuilder {
    runtime: Arc<dyn ScriptRuntime>,
    units: Option<Arc<dyn UnitResolver>>,
    registry: FormatterRegistry,
}

impl ScriptServicesBuilder {
    /// Use a custom unit resolver.
    pub fn unit_resolver(mut self, units: Arc<dyn UnitResolver>) -> Self {
        self.units = Some(units);
        self
    }

    /// Use an [`EntryUnitResolver`] for `entry`.
    pub fn entry_unit(self, entry: UnitIdentity) -> Self {
        self.unit_resolver(Arc::new(EntryUnitResolver::new(entry)))
    }

    /// Rebuild the registry from `options`, discarding earlier mappings.
    pub fn options(mut self, options: &ScriptOptions) -> Self {
        self.registry = FormatterRegistry::with_options(options);
        self
    }

    /// Map formatters on the registry.
    pub fn configure<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(&mut FormatterRegistry),
    {
        configure(&mut self.registry);
        self
    }

    /// Freeze the registry and build the services.
    ///
    /// Without a unit resolver, every import fails with a configuration error.
    pub fn build(self) -> ScriptServices {
        let units: Arc<dyn UnitResolver> = match self.units {
            Some(units) => units,
            None => {
                log::warn!("No entry unit configured; script imports will fail");
                Arc::new(EntryUnitResolver::unset())
            }
        };

        ScriptServices {
            runtime: self.runtime,
            formatters: Arc::new(self.registry),
            units,
        }
    }
}

/// Shared script configuration and proxy factory.
#[derive(Clone)]
pub struct ScriptServices {
    runtime: Arc<dyn ScriptRuntime>,
    formatters: Arc<FormatterRegistry>,
    units: Arc<dyn UnitResolver>,
}

impl ScriptServices {
    pub fn builder(runtime: Arc<dyn ScriptRuntime>) -> ScriptServicesBuilder {
        ScriptServicesBuilder {
            runtime,
            units: None,
            registry: FormatterRegistry::new(),
        }
    }

    /// The frozen formatter registry.
    pub fn formatters(&self) -> &FormatterRegistry {
        &self.formatters
    }

    pub fn unit_resolver(&self) -> &Arc<dyn UnitResolver> {
        &self.units
    }

    /// A new proxy for component `C`.
    pub fn proxy<C: Component>(&self) -> ComponentScriptProxy<C> {
        ComponentScriptProxy::new(
            Arc::clone(&self.runtime),
            self.formatters.clone(),
            Arc::clone(&self.units),
        )
    }

    /// A new request scope.
    pub fn scope(&self) -> ScriptScope {
        ScriptScope {
            services: self.clone(),
            proxies: Mutex::new(HashMap::new()),
        }
    }
}

/// Type-erased proxy held by a scope.
#[async_trait]
trait ScopedProxy: Send + Sync {
    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    async fn dispose(&self) -> Result<()>;
}

#[async_trait]
impl<C: Component> ScopedProxy for ComponentScriptProxy<C> {
    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    async fn dispose(&self) -> Result<()> {
        ComponentScriptProxy::dispose(self).await
    }
}

/// Request scope holding one proxy per component type.
pub struct ScriptScope {
    services: ScriptServices,
    proxies: Mutex<HashMap<TypeId, Arc<dyn ScopedProxy>>>,
}

impl ScriptScope {
    /// The scope's proxy for component `C`, created on first request.
    pub fn proxy<C: Component>(&self) -> Arc<ComponentScriptProxy<C>> {
        let mut proxies = match self.proxies.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(existing) = proxies.get(&TypeId::of::<C>()) {
            if let Ok(proxy) = Arc::clone(existing).as_any().downcast::<ComponentScriptProxy<C>>() {
                return proxy;
            }
        }

        let proxy = Arc::new(self.services.proxy::<C>());
        proxies.insert(TypeId::of::<C>(), proxy.clone());
        proxy
    }

    /// Number of component types with a proxy in this scope.
    pub fn len(&self) -> usize {
        match self.proxies.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// End the scope, disposing every proxy it handed out.
    ///
    /// All proxies are disposed even if some fail; the first failure is
    /// returned.
    pub async fn dispose(self) -> Result<()> {
        let proxies: Vec<Arc<dyn ScopedProxy>> = match self.proxies.into_inner() {
            Ok(map) => map.into_values().collect(),
            Err(poisoned) => poisoned.into_inner().into_values().collect(),
        };

        let mut first_error: Option<Error> = None;
        for proxy in proxies {
            if let Err(e) = proxy.dispose().await {
                log::warn!("Failed to dispose scoped script proxy: {}", e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
