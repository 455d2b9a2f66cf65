//! Interface map resolution for a source type.
//!
//! Every method the proxy might forward is listed once, in
//! `instance_methods` order, together with the interface methods it
//! satisfies. A method may satisfy several interfaces; each association is
//! forwarded separately.

use crate::error::ProxyResult;
use crate::object::{MethodRef, TypeDescriptor, TypeRef};

/// `target` satisfies `interface_method` of `interface`
#[derive(Debug, Clone)]
pub struct InterfaceMapEntry {
    /// Implemented interface
    pub interface: TypeRef,
    /// Abstract interface method
    pub interface_method: MethodRef,
    /// Concrete method of the source type
    pub target: MethodRef,
}

/// A source method and the interface entries it participates in
#[derive(Debug, Clone)]
pub struct MappedMethod {
    /// Source method
    pub method: MethodRef,
    /// Interface methods satisfied by `method` (possibly none)
    pub entries: Vec<InterfaceMapEntry>,
}

impl MappedMethod {
    /// Satisfies at least one interface method
    pub fn is_interface_member(&self) -> bool {
        !self.entries.is_empty()
    }
}

/// Resolve every instance method of `source` and its interface associations.
///
/// Explicit implementations declared privately on a base type are not part
/// of the instance method view; they are appended after it.
pub fn resolve(source: &TypeDescriptor) -> ProxyResult<Vec<MappedMethod>> {
    let mut methods: Vec<MappedMethod> = source
        .instance_methods()
        .into_iter()
        .map(|method| MappedMethod {
            method,
            entries: Vec::new(),
        })
        .collect();

    for interface in source.all_interfaces() {
        let mapping = source.interface_map(&interface)?;
        let pairs = mapping
            .interface_methods
            .iter()
            .zip(&mapping.target_methods);
        for (interface_method, target) in pairs {
            let entry = InterfaceMapEntry {
                interface: interface.clone(),
                interface_method: interface_method.clone(),
                target: target.clone(),
            };
            match methods.iter_mut().find(|m| m.method.id() == target.id()) {
                Some(mapped) => mapped.entries.push(entry),
                None => methods.push(MappedMethod {
                    method: target.clone(),
                    entries: vec![entry],
                }),
            }
        }
    }

    Ok(methods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{types, MethodBuilder, TypeBuilder, Value};

    fn writer(name: &str) -> TypeRef {
        TypeBuilder::interface("Demo", name)
            .with_method(MethodBuilder::new("write").param("value", types::string()))
            .build()
            .unwrap()
    }

    fn write_impl(name: &str) -> MethodBuilder {
        MethodBuilder::new(name)
            .param("value", types::string())
            .native(|_, _| Ok(Value::Null))
    }

    #[test]
    fn test_shared_public_method_collects_both_entries() {
        let a = writer("IWriterA");
        let b = writer("IWriterB");
        let ty = TypeBuilder::class("Demo", "Shared")
            .implements(&a)
            .implements(&b)
            .with_method(write_impl("write"))
            .build()
            .unwrap();

        let mapped = resolve(&ty).unwrap();
        let write = mapped.iter().find(|m| m.method.name() == "write").unwrap();
        assert_eq!(write.entries.len(), 2);
        assert!(write.entries[0].interface.same_type(&a));
        assert!(write.entries[1].interface.same_type(&b));
    }

    #[test]
    fn test_explicit_impls_are_separate_entries() {
        let a = writer("IWriterA");
        let b = writer("IWriterB");
        let ty = TypeBuilder::class("Demo", "Split")
            .implements(&a)
            .implements(&b)
            .with_method(write_impl("Demo.IWriterA.write").private())
            .with_method(write_impl("Demo.IWriterB.write").private())
            .explicit_impl(&a.declared_methods()[0], "Demo.IWriterA.write")
            .explicit_impl(&b.declared_methods()[0], "Demo.IWriterB.write")
            .build()
            .unwrap();

        let mapped = resolve(&ty).unwrap();
        let explicit: Vec<_> = mapped.iter().filter(|m| m.is_interface_member()).collect();
        assert_eq!(explicit.len(), 2);
        assert!(explicit.iter().all(|m| m.entries.len() == 1));
        assert!(explicit.iter().all(|m| !m.method.is_public()));
    }

    #[test]
    fn test_base_private_explicit_impl_is_appended() {
        let a = writer("IWriterA");
        let base = TypeBuilder::class("Demo", "Base")
            .implements(&a)
            .with_method(write_impl("Demo.IWriterA.write").private())
            .explicit_impl(&a.declared_methods()[0], "Demo.IWriterA.write")
            .build()
            .unwrap();
        let derived = TypeBuilder::class("Demo", "Derived")
            .extends(&base)
            .build()
            .unwrap();

        assert!(derived
            .instance_methods()
            .iter()
            .all(|m| m.name() != "Demo.IWriterA.write"));
        let mapped = resolve(&derived).unwrap();
        let last = mapped.last().unwrap();
        assert_eq!(last.method.name(), "Demo.IWriterA.write");
        assert_eq!(last.entries.len(), 1);
    }

    #[test]
    fn test_plain_methods_have_no_entries() {
        let ty = TypeBuilder::class("Demo", "Plain")
            .with_method(write_impl("write"))
            .build()
            .unwrap();
        let mapped = resolve(&ty).unwrap();
        assert!(mapped.iter().all(|m| !m.is_interface_member()));
        // write plus the two root methods
        assert_eq!(mapped.len(), 3);
    }
}
