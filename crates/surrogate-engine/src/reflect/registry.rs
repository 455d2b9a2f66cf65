//! Type registry: the cache of synthesized proxy types.
//!
//! Lookups go to the dynamic module. A miss takes a per-name build cell, so
//! concurrent first requests for the same name run exactly one build and all
//! observe its result; requests for different names build in parallel. A
//! failed build publishes nothing and leaves the name free for a retry.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use tracing::debug;

use super::dynamic_module::{DynamicModule, DynamicModuleInfo};
use crate::error::ProxyResult;
use crate::object::TypeRef;

/// Process-lifetime cache from derived names to synthesized types
#[derive(Debug)]
pub struct TypeRegistry {
    module: DynamicModule,
    pending: DashMap<String, Arc<OnceCell<TypeRef>>>,
    builds: AtomicUsize,
}

impl TypeRegistry {
    /// Create an empty registry backed by a module named `module_name`
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module: DynamicModule::new(module_name),
            pending: DashMap::new(),
            builds: AtomicUsize::new(0),
        }
    }

    /// Look up an already built type
    pub fn try_get(&self, name: &str) -> Option<TypeRef> {
        self.module.get_type(name)
    }

    /// Build and register a type under `name`.
    ///
    /// Defining a name twice is a `DuplicateDefinition` error; use
    /// [`get_or_build`](Self::get_or_build) unless the name is known to be free.
    pub fn define<F>(&self, name: &str, build: F) -> ProxyResult<TypeRef>
    where
        F: FnOnce() -> ProxyResult<TypeRef>,
    {
        let ty = build()?;
        self.module.define_type(name, ty.clone())?;
        self.builds.fetch_add(1, Ordering::Relaxed);
        Ok(ty)
    }

    /// Return the type registered under `name`, building it on first use
    pub fn get_or_build<F>(&self, name: &str, build: F) -> ProxyResult<TypeRef>
    where
        F: FnOnce() -> ProxyResult<TypeRef>,
    {
        if let Some(ty) = self.try_get(name) {
            debug!(name, "proxy type cache hit");
            return Ok(ty);
        }

        let cell = self
            .pending
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        let ty = cell.get_or_try_init(|| match self.try_get(name) {
            Some(ty) => Ok(ty),
            None => self.define(name, build),
        })?;
        Ok(ty.clone())
    }

    /// Number of builds performed
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.module.len()
    }

    /// True when nothing has been built
    pub fn is_empty(&self) -> bool {
        self.module.is_empty()
    }

    /// Registered names, sorted
    pub fn type_names(&self) -> Vec<String> {
        self.module.type_names()
    }

    /// Backing module
    pub fn module(&self) -> &DynamicModule {
        &self.module
    }

    /// Backing module info
    pub fn info(&self) -> DynamicModuleInfo {
        self.module.get_info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProxyError;
    use crate::object::TypeBuilder;
    use std::sync::Barrier;
    use std::thread;

    fn build_a() -> ProxyResult<TypeRef> {
        TypeBuilder::class("Demo", "A$Proxy").build()
    }

    #[test]
    fn test_get_or_build_caches() {
        let registry = TypeRegistry::new("test");
        let a = registry.get_or_build("Demo.A$Proxy", build_a).unwrap();
        let b = registry.get_or_build("Demo.A$Proxy", build_a).unwrap();
        assert!(a.same_type(&b));
        assert_eq!(registry.build_count(), 1);
        assert_eq!(registry.type_names(), vec!["Demo.A$Proxy".to_string()]);
    }

    #[test]
    fn test_define_twice_fails() {
        let registry = TypeRegistry::new("test");
        registry.define("Demo.A$Proxy", build_a).unwrap();
        let err = registry.define("Demo.A$Proxy", build_a).unwrap_err();
        assert!(matches!(err, ProxyError::DuplicateDefinition { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_failed_build_publishes_nothing() {
        let registry = TypeRegistry::new("test");
        let err = registry
            .get_or_build("Demo.A$Proxy", || Err(ProxyError::raise("boom")))
            .unwrap_err();
        assert_eq!(err, ProxyError::Raised("boom".to_string()));
        assert!(registry.try_get("Demo.A$Proxy").is_none());

        registry.get_or_build("Demo.A$Proxy", build_a).unwrap();
        assert_eq!(registry.build_count(), 1);
    }

    #[test]
    fn test_concurrent_first_requests_build_once() {
        let registry = Arc::new(TypeRegistry::new("test"));
        let barrier = Arc::new(Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    registry.get_or_build("Demo.A$Proxy", build_a).unwrap()
                })
            })
            .collect();

        let types: Vec<TypeRef> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(registry.build_count(), 1);
        assert!(types.iter().all(|t| t.same_type(&types[0])));
    }
}
