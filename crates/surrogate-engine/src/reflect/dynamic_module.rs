//! Dynamic Module
//!
//! The in-memory module that owns synthesized types. A name can be defined
//! exactly once; a second definition is a `DuplicateDefinition` error, so
//! callers look a name up before defining it.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::{ProxyError, ProxyResult};
use crate::object::TypeRef;

/// Base ID for dynamic modules
pub const DYNAMIC_MODULE_BASE: usize = 0x40000000;

static NEXT_MODULE_ID: AtomicUsize = AtomicUsize::new(0);

/// A module of synthesized types
#[derive(Debug)]
pub struct DynamicModule {
    id: usize,
    name: String,
    types: RwLock<FxHashMap<String, TypeRef>>,
}

/// Module information for introspection
#[derive(Debug, Clone)]
pub struct DynamicModuleInfo {
    /// Module ID
    pub id: usize,
    /// Module name
    pub name: String,
    /// Number of defined types
    pub type_count: usize,
    /// Defined type names, sorted
    pub type_names: Vec<String>,
}

impl DynamicModule {
    /// Create an empty module
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: DYNAMIC_MODULE_BASE + NEXT_MODULE_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            types: RwLock::new(FxHashMap::default()),
        }
    }

    /// Unique module ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Module name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Define `ty` under `name`
    pub fn define_type(&self, name: &str, ty: TypeRef) -> ProxyResult<()> {
        let mut types = self.types.write();
        if types.contains_key(name) {
            return Err(ProxyError::DuplicateDefinition {
                module: self.name.clone(),
                name: name.to_string(),
            });
        }
        types.insert(name.to_string(), ty);
        Ok(())
    }

    /// Get a type by name
    pub fn get_type(&self, name: &str) -> Option<TypeRef> {
        self.types.read().get(name).cloned()
    }

    /// Check if a name is defined
    pub fn contains(&self, name: &str) -> bool {
        self.types.read().contains_key(name)
    }

    /// Number of defined types
    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    /// True when nothing has been defined
    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }

    /// Defined type names, sorted
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Get module info
    pub fn get_info(&self) -> DynamicModuleInfo {
        let type_names = self.type_names();
        DynamicModuleInfo {
            id: self.id,
            name: self.name.clone(),
            type_count: type_names.len(),
            type_names,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::TypeBuilder;

    #[test]
    fn test_define_and_get() {
        let module = DynamicModule::new("test");
        assert!(module.id() >= DYNAMIC_MODULE_BASE);
        assert!(module.is_empty());

        let ty = TypeBuilder::class("Demo", "A").build().unwrap();
        module.define_type("Demo.A$Proxy", ty.clone()).unwrap();

        assert!(module.contains("Demo.A$Proxy"));
        assert!(module.get_type("Demo.A$Proxy").unwrap().same_type(&ty));
        assert!(module.get_type("missing").is_none());
    }

    #[test]
    fn test_duplicate_definition() {
        let module = DynamicModule::new("test");
        let ty = TypeBuilder::class("Demo", "A").build().unwrap();
        module.define_type("Demo.A$Proxy", ty.clone()).unwrap();

        let result = module.define_type("Demo.A$Proxy", ty);
        assert!(matches!(
            result,
            Err(ProxyError::DuplicateDefinition { ref module, .. }) if module == "test"
        ));
        assert_eq!(module.len(), 1);
    }

    #[test]
    fn test_module_info() {
        let module = DynamicModule::new("mymodule");
        module
            .define_type("b", TypeBuilder::class("Demo", "B").build().unwrap())
            .unwrap();
        module
            .define_type("a", TypeBuilder::class("Demo", "A").build().unwrap())
            .unwrap();

        let info = module.get_info();
        assert_eq!(info.name, "mymodule");
        assert_eq!(info.type_count, 2);
        assert_eq!(info.type_names, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_module_ids_are_unique() {
        let a = DynamicModule::new("a");
        let b = DynamicModule::new("b");
        assert_ne!(a.id(), b.id());
    }
}
