//! Proxy type construction.
//!
//! `ProxyTypeBuilder` turns a source type into a [`ProxyTypeDescriptor`]: the
//! backing field, the wrapper contract accessor, the constructor, the
//! interface list and one forwarding method per eligible (method, interface
//! entry) pair. `finalize` seals the result into an ordinary
//! [`TypeDescriptor`](crate::object::TypeDescriptor).
//!
//! Methods are skipped when they are declared on the root object type or
//! are non-public without satisfying any interface. Properties are not
//! forwarded.

use std::sync::Arc;

use tracing::debug;

use super::contract;
use super::emit::{BodyEmitter, EmittedBody, Instruction};
use super::forwarding::{ForwardingMethod, MethodForwardingSynthesizer};
use super::interface_map;
use crate::config::ProxyConfig;
use crate::defaults::BACKING_FIELD_NAME;
use crate::error::{ProxyError, ProxyResult};
use crate::object::{
    FieldDescriptor, MethodBody, MethodBuilder, MethodRef, TypeBuilder, TypeKind, TypeRef,
};

/// Index of the backing field in every proxy type
pub const BACKING_FIELD: u16 = 0;

/// A proxy type under construction
#[derive(Debug)]
pub struct ProxyTypeDescriptor {
    /// Derived type name
    pub name: String,
    /// Source type being wrapped
    pub source: TypeRef,
    /// `Surrogate.ObjectProxy[source]`
    pub contract: TypeRef,
    /// Interfaces implemented, contract first
    pub interfaces: Vec<TypeRef>,
    /// Field holding the wrapped instance
    pub backing_field: FieldDescriptor,
    /// Constructor body: cast the argument and store it
    pub constructor: Arc<EmittedBody>,
    /// Accessor body: load the field, box value types
    pub accessor: Arc<EmittedBody>,
    /// Generated forwards, in synthesis order
    pub forwards: Vec<ForwardingMethod>,
}

impl ProxyTypeDescriptor {
    /// Names of every generated forward
    pub fn forward_names(&self) -> Vec<&str> {
        self.forwards.iter().map(|f| f.resolved.name.as_str()).collect()
    }

    /// Seal into a type descriptor
    pub fn finalize(self) -> ProxyResult<TypeRef> {
        let get_object = contract::accessor(&self.contract)?;
        let accessor_name = contract::accessor_name(&self.contract);

        let mut builder = TypeBuilder::class("", &self.name)
            .with_field(self.backing_field)
            .with_constructor(
                MethodBuilder::new(".ctor")
                    .param("value", &self.source)
                    .body(MethodBody::Emitted(self.constructor)),
            )
            .with_method(
                MethodBuilder::new(accessor_name.clone())
                    .private()
                    .as_virtual()
                    .returns(&self.source)
                    .body(MethodBody::Emitted(self.accessor)),
            )
            .explicit_impl(&get_object, &accessor_name)
            .sealed();
        for iface in &self.interfaces {
            builder = builder.implements(iface);
        }

        let mut overrides: Vec<(MethodRef, String)> = Vec::new();
        for forward in self.forwards {
            if let Some(interface_method) = forward.implements {
                overrides.push((interface_method, forward.resolved.name.clone()));
            }
            builder = builder.with_method(forward.builder);
        }
        for (interface_method, name) in &overrides {
            builder = builder.explicit_impl(interface_method, name);
        }

        builder.build()
    }
}

/// Builds the proxy type for one source type
pub struct ProxyTypeBuilder<'a> {
    source: TypeRef,
    name: String,
    config: &'a ProxyConfig,
}

impl<'a> ProxyTypeBuilder<'a> {
    /// Prepare a build of `source` under the derived `name`
    pub fn new(source: &TypeRef, name: impl Into<String>, config: &'a ProxyConfig) -> Self {
        Self {
            source: source.clone(),
            name: name.into(),
            config,
        }
    }

    /// Check that `source` can be wrapped
    pub fn check_source(source: &TypeRef) -> ProxyResult<()> {
        let reason = match source.kind() {
            TypeKind::Class | TypeKind::ValueType | TypeKind::Object => return Ok(()),
            TypeKind::Interface => "interfaces have no instances to wrap",
            TypeKind::Primitive(_) => "primitive types cannot be wrapped",
        };
        Err(ProxyError::InvalidProxyTarget {
            type_name: source.full_name(),
            reason: reason.to_string(),
        })
    }

    fn emit(&self, name: &str, param_count: usize, f: impl FnOnce(&mut BodyEmitter)) -> ProxyResult<EmittedBody> {
        let mut il = BodyEmitter::new(name, param_count);
        if !self.config.validate_bodies {
            il = il.without_validation();
        }
        f(&mut il);
        il.build()
    }

    /// Declare every member of the proxy type
    pub fn build(self) -> ProxyResult<ProxyTypeDescriptor> {
        Self::check_source(&self.source)?;
        debug!(source = %self.source, proxy = %self.name, "building proxy type");

        let contract = contract::construct(&self.source)?;
        let mut interfaces = vec![contract.clone()];
        interfaces.extend(self.source.all_interfaces());

        let backing_field = FieldDescriptor::new(BACKING_FIELD_NAME, self.source.clone())
            .private()
            .init_only();

        // _object = (T) value
        let constructor = self.emit(".ctor", 1, |il| {
            il.emit(Instruction::LoadThis);
            il.emit(Instruction::LoadArg(0));
            il.emit_unbox(&self.source);
            il.emit(Instruction::StoreField(BACKING_FIELD));
            il.emit(Instruction::Return);
        })?;

        // return _object
        let accessor = self.emit(&contract::accessor_name(&contract), 0, |il| {
            il.emit(Instruction::LoadThis);
            il.emit(Instruction::LoadField(BACKING_FIELD));
            il.emit_box(&self.source);
            il.emit(Instruction::Return);
        })?;

        let mut synthesizer = MethodForwardingSynthesizer::new(BACKING_FIELD);
        if !self.config.validate_bodies {
            synthesizer = synthesizer.without_validation();
        }

        let mut forwards = Vec::new();
        for mapped in interface_map::resolve(&self.source)? {
            let method = &mapped.method;
            if mapped.is_interface_member() {
                for entry in &mapped.entries {
                    forwards.extend(synthesizer.synthesize(method, Some(entry))?);
                }
                continue;
            }
            if !method.is_public() || method.declaring().is_root() {
                continue;
            }
            if self.config.honor_ignore_marker && method.metadata().excluded_from_forwarding() {
                debug!(method = %method.signature(), "ignoring marked method");
                continue;
            }
            forwards.extend(synthesizer.synthesize(method, None)?);
        }

        debug!(
            proxy = %self.name,
            forwards = forwards.len(),
            interfaces = interfaces.len(),
            "declared proxy members"
        );

        Ok(ProxyTypeDescriptor {
            name: self.name,
            source: self.source,
            contract,
            interfaces,
            backing_field,
            constructor: Arc::new(constructor),
            accessor: Arc::new(accessor),
            forwards,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{types, ProxyAttribute, Value, Visibility};

    fn writer(name: &str) -> TypeRef {
        TypeBuilder::interface("Demo", name)
            .with_method(MethodBuilder::new("write").param("value", types::string()))
            .build()
            .unwrap()
    }

    fn model() -> TypeRef {
        let a = writer("IWriterA");
        let b = writer("IWriterB");
        TypeBuilder::class("Demo", "TestModel")
            .implements(&a)
            .implements(&b)
            .with_method(
                MethodBuilder::new("Demo.IWriterA.write")
                    .private()
                    .param("value", types::string())
                    .native(|_, _| Ok(Value::Null)),
            )
            .with_method(
                MethodBuilder::new("Demo.IWriterB.write")
                    .private()
                    .param("value", types::string())
                    .native(|_, _| Ok(Value::Null)),
            )
            .with_method(
                MethodBuilder::new("Run0")
                    .attribute(ProxyAttribute::MethodName("run_proxy".into()))
                    .native(|_, _| Ok(Value::Null)),
            )
            .with_method(
                MethodBuilder::new("Hidden")
                    .attribute(ProxyAttribute::Ignore)
                    .native(|_, _| Ok(Value::Null)),
            )
            .with_method(
                MethodBuilder::new("helper")
                    .private()
                    .native(|_, _| Ok(Value::Null)),
            )
            .explicit_impl(&a.declared_methods()[0], "Demo.IWriterA.write")
            .explicit_impl(&b.declared_methods()[0], "Demo.IWriterB.write")
            .build()
            .unwrap()
    }

    #[test]
    fn test_members_declared() {
        let source = model();
        let config = ProxyConfig::default();
        let desc = ProxyTypeBuilder::new(&source, "Demo.TestModel$Proxy", &config)
            .build()
            .unwrap();

        let mut names = desc.forward_names();
        names.sort_unstable();
        assert_eq!(
            names,
            vec!["Demo.IWriterA.write", "Demo.IWriterB.write", "Hidden", "run_proxy"]
        );
        assert_eq!(desc.interfaces.len(), 3);
        assert!(contract::is_contract(&desc.interfaces[0]));
        assert_eq!(desc.backing_field.name, "_object");
        assert_eq!(desc.backing_field.visibility, Visibility::Private);
        assert!(desc.backing_field.init_only);
    }

    #[test]
    fn test_ignore_marker_is_configurable() {
        let source = model();
        let config = ProxyConfig {
            honor_ignore_marker: true,
            ..ProxyConfig::default()
        };
        let desc = ProxyTypeBuilder::new(&source, "Demo.TestModel$Proxy", &config)
            .build()
            .unwrap();
        assert!(!desc.forward_names().contains(&"Hidden"));
    }

    #[test]
    fn test_finalized_type_layout() {
        let source = model();
        let config = ProxyConfig::default();
        let ty = ProxyTypeBuilder::new(&source, "Demo.TestModel$Proxy", &config)
            .build()
            .unwrap()
            .finalize()
            .unwrap();

        assert_eq!(ty.full_name(), "Demo.TestModel$Proxy");
        assert!(ty.is_sealed());
        assert!(ty.base().map(|b| b.is_root()).unwrap_or(false));
        assert_eq!(ty.constructor().unwrap().parameters().len(), 1);
        assert_eq!(ty.fields().len(), 1);
        // accessor + explicit contract impl, plus one explicit impl per interface entry
        assert_eq!(ty.explicit_impls().len(), 3);
        let accessor = ty
            .declared_methods()
            .iter()
            .find(|m| m.name() == "Surrogate.ObjectProxy[Demo.TestModel].get_object")
            .unwrap();
        assert!(!accessor.is_public());
    }

    #[test]
    fn test_constructor_and_accessor_bodies() {
        let source = model();
        let config = ProxyConfig::default();
        let desc = ProxyTypeBuilder::new(&source, "Demo.TestModel$Proxy", &config)
            .build()
            .unwrap();
        assert_eq!(
            desc.constructor.disassemble(),
            vec![
                "IL_0000: ldarg.this",
                "IL_0001: ldarg 0",
                "IL_0002: castclass Demo.TestModel",
                "IL_0003: stfld 0",
                "IL_0004: ret",
            ]
        );
        assert_eq!(desc.accessor.len(), 3);
    }

    #[test]
    fn test_value_type_source_boxes_and_unboxes() {
        let point = TypeBuilder::value_type("Demo", "Point")
            .with_method(
                MethodBuilder::new("length")
                    .returns(types::int())
                    .native(|_, _| Ok(Value::Int(5))),
            )
            .build()
            .unwrap();
        let config = ProxyConfig::default();
        let desc = ProxyTypeBuilder::new(&point, "Demo.Point$Proxy", &config)
            .build()
            .unwrap();
        assert!(desc.constructor.disassemble()[2].ends_with("unbox.any Demo.Point"));
        assert!(desc.accessor.disassemble()[2].ends_with("box Demo.Point"));
        assert!(desc.forwards[0].body.disassemble()[2].ends_with("call Demo.Point::length"));
    }

    #[test]
    fn test_interface_source_rejected() {
        let config = ProxyConfig::default();
        let err = ProxyTypeBuilder::new(&writer("IWriterA"), "x", &config)
            .build()
            .unwrap_err();
        assert!(matches!(err, ProxyError::InvalidProxyTarget { .. }));
    }
}
