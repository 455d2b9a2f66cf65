//! Method forwarding synthesis.
//!
//! Each forward re-declares the source method's generic parameters (with
//! their constraints, by position), parameters and return type, and gets a
//! body of the form:
//!
//! ```text
//! ldarg.this
//! ldfld _object
//! ldarg 0 .. ldarg n-1
//! call | callvirt <source method>
//! [stloc 0; ldloc 0]
//! ret
//! ```

use std::sync::Arc;

use tracing::trace;

use super::emit::{BodyEmitter, EmittedBody, Instruction};
use super::interface_map::InterfaceMapEntry;
use super::naming::{self, ResolvedName};
use crate::error::ProxyResult;
use crate::object::{types, MethodBody, MethodBuilder, MethodRef};

/// A synthesized forwarding method, ready to be added to the proxy type
pub struct ForwardingMethod {
    /// Name and accessibility on the proxy
    pub resolved: ResolvedName,
    /// Method being forwarded to
    pub source: MethodRef,
    /// Interface method this forward implements, if any
    pub implements: Option<MethodRef>,
    /// Emitted body
    pub body: Arc<EmittedBody>,
    /// Declaration for the proxy type
    pub builder: MethodBuilder,
}

impl std::fmt::Debug for ForwardingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForwardingMethod")
            .field("name", &self.resolved.name)
            .field("source", &self.source.signature())
            .field("explicit", &self.resolved.explicit)
            .finish()
    }
}

/// Builds forwarding methods over one backing field
#[derive(Debug)]
pub struct MethodForwardingSynthesizer {
    backing_field: u16,
    validate: bool,
    defined: Vec<(String, MethodRef)>,
}

impl MethodForwardingSynthesizer {
    /// Create a synthesizer loading the wrapped instance from field `backing_field`
    pub fn new(backing_field: u16) -> Self {
        Self {
            backing_field,
            validate: true,
            defined: Vec::new(),
        }
    }

    /// Skip stack validation of emitted bodies
    pub fn without_validation(mut self) -> Self {
        self.validate = false;
        self
    }

    fn is_defined(&self, name: &str, source: &MethodRef) -> bool {
        self.defined
            .iter()
            .any(|(n, m)| n == name && m.signature_matches(source))
    }

    /// Synthesize the forward of `source`, optionally satisfying `entry`.
    ///
    /// Returns `None` when an implicit forward with the same name and
    /// signature already exists and there is no interface to qualify the
    /// name with (a base method hidden by a derived one).
    pub fn synthesize(
        &mut self,
        source: &MethodRef,
        entry: Option<&InterfaceMapEntry>,
    ) -> ProxyResult<Option<ForwardingMethod>> {
        let mut resolved = naming::resolve(source, entry);
        if self.is_defined(&resolved.name, source) {
            match entry {
                Some(entry) => resolved = ResolvedName::qualified(entry),
                None => {
                    trace!(method = %source.signature(), "skipping hidden method");
                    return Ok(None);
                }
            }
        }

        // Explicit forwards call through the interface so the wrapped
        // instance's own interface map picks the implementation.
        let callee = match entry {
            Some(entry) if resolved.explicit => entry.interface_method.clone(),
            _ => source.clone(),
        };
        let body = Arc::new(self.emit_body(&resolved.name, source, &callee)?);

        let mut builder = MethodBuilder::new(resolved.name.clone())
            .visibility(resolved.visibility)
            .generic_parameters(source.generic_parameters().to_vec())
            .parameters(source.parameters().to_vec())
            .returns(source.return_type().clone())
            .body(MethodBody::Emitted(body.clone()));
        // An override of a root object method keeps the root slot, so the
        // proxy's own `to_string` is the forward.
        match root_slot_of(source) {
            Some(root) if !resolved.explicit => builder = builder.overrides(&root),
            _ if resolved.is_virtual => builder = builder.as_virtual(),
            _ => {}
        }

        trace!(
            forward = %resolved.name,
            source = %source.signature(),
            explicit = resolved.explicit,
            "synthesized forward"
        );

        self.defined.push((resolved.name.clone(), source.clone()));
        Ok(Some(ForwardingMethod {
            resolved,
            source: source.clone(),
            implements: entry.map(|e| e.interface_method.clone()),
            body,
            builder,
        }))
    }

    fn emit_body(&self, name: &str, source: &MethodRef, callee: &MethodRef) -> ProxyResult<EmittedBody> {
        let param_count = source.parameters().len();
        let mut il = BodyEmitter::new(name, param_count);
        if !self.validate {
            il = il.without_validation();
        }

        il.emit(Instruction::LoadThis);
        il.emit(Instruction::LoadField(self.backing_field));
        for i in 0..param_count {
            il.emit(Instruction::LoadArg(i as u16));
        }
        il.emit_call(callee, true);

        if !source.returns_void() {
            let result = il.declare_local(source.return_type().clone());
            il.emit(Instruction::StoreLocal(result));
            il.emit(Instruction::LoadLocal(result));
        }
        il.emit(Instruction::Return);
        il.build()
    }
}

/// Root object method whose vtable slot `source` occupies
fn root_slot_of(source: &MethodRef) -> Option<MethodRef> {
    if !source.is_virtual() || source.declaring().is_root() {
        return None;
    }
    types::object()
        .declared_methods()
        .iter()
        .find(|m| m.slot() == source.slot())
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{types, ProxyAttribute, SigType, TypeBuilder, TypeRef, Value};
    use crate::reflect::interface_map;

    fn model() -> TypeRef {
        let iface = TypeBuilder::interface("Demo", "IWriterA")
            .with_method(MethodBuilder::new("write").param("value", types::string()))
            .build()
            .unwrap();
        TypeBuilder::class("Demo", "Model")
            .implements(&iface)
            .with_method(
                MethodBuilder::new("Demo.IWriterA.write")
                    .private()
                    .param("value", types::string())
                    .native(|_, _| Ok(Value::Null)),
            )
            .with_method(
                MethodBuilder::new("Run0")
                    .attribute(ProxyAttribute::MethodName("run_proxy".into()))
                    .generic("T", vec![types::string()])
                    .native(|_, _| Ok(Value::Null)),
            )
            .with_method(
                MethodBuilder::new("Run4")
                    .returns(types::int())
                    .native(|_, _| Ok(Value::Int(4))),
            )
            .with_method(
                MethodBuilder::new("Run0_2")
                    .generic("T", vec![])
                    .param_ref("t", SigType::Generic(0))
                    .returns_ref(SigType::Generic(0))
                    .native(|_, call| Ok(call.arg(0)?.clone())),
            )
            .explicit_impl(&iface.declared_methods()[0], "Demo.IWriterA.write")
            .build()
            .unwrap()
    }

    fn method(ty: &TypeRef, name: &str) -> MethodRef {
        ty.instance_methods()
            .into_iter()
            .find(|m| m.name() == name)
            .unwrap()
    }

    #[test]
    fn test_void_forward_shape() {
        let ty = model();
        let mut synth = MethodForwardingSynthesizer::new(0);
        let fwd = synth.synthesize(&method(&ty, "Run0"), None).unwrap().unwrap();
        assert_eq!(fwd.resolved.name, "run_proxy");
        assert_eq!(
            fwd.body.disassemble(),
            vec![
                "IL_0000: ldarg.this",
                "IL_0001: ldfld 0",
                "IL_0002: callvirt Demo.Model::Run0",
                "IL_0003: ret",
            ]
        );
        assert!(fwd.implements.is_none());
    }

    #[test]
    fn test_value_forward_stores_result_in_local() {
        let ty = model();
        let mut synth = MethodForwardingSynthesizer::new(0);
        let fwd = synth.synthesize(&method(&ty, "Run4"), None).unwrap().unwrap();
        assert_eq!(fwd.body.locals.len(), 1);
        assert!(fwd.body.disassemble().iter().any(|l| l.ends_with("stloc 0")));
    }

    #[test]
    fn test_by_ref_forward_loads_every_argument() {
        let ty = model();
        let mut synth = MethodForwardingSynthesizer::new(0);
        let fwd = synth.synthesize(&method(&ty, "Run0_2"), None).unwrap().unwrap();
        assert_eq!(fwd.body.param_count, 1);
        assert!(fwd.body.disassemble().iter().any(|l| l.ends_with("ldarg 0")));
    }

    #[test]
    fn test_explicit_forward_calls_interface_method() {
        let ty = model();
        let mapped = interface_map::resolve(&ty).unwrap();
        let explicit = mapped.iter().find(|m| m.is_interface_member()).unwrap();
        let mut synth = MethodForwardingSynthesizer::new(0);
        let fwd = synth
            .synthesize(&explicit.method, Some(&explicit.entries[0]))
            .unwrap()
            .unwrap();
        assert_eq!(fwd.resolved.name, "Demo.IWriterA.write");
        assert!(fwd.resolved.explicit);
        assert!(fwd
            .body
            .disassemble()
            .iter()
            .any(|l| l.ends_with("callvirt Demo.IWriterA::write")));
        assert!(fwd.implements.is_some());
    }

    #[test]
    fn test_root_override_keeps_root_slot() {
        let root = types::object();
        let to_string = root
            .declared_methods()
            .iter()
            .find(|m| m.name() == "to_string")
            .unwrap();
        let named = TypeBuilder::class("Demo", "Named")
            .with_method(
                MethodBuilder::new("to_string")
                    .overrides(to_string)
                    .returns(types::string())
                    .native(|_, _| Ok(Value::string("custom"))),
            )
            .with_method(
                MethodBuilder::new("Run")
                    .as_virtual()
                    .native(|_, _| Ok(Value::Null)),
            )
            .build()
            .unwrap();

        let mut synth = MethodForwardingSynthesizer::new(0);
        let fwd = synth
            .synthesize(&named.declared_methods()[0], None)
            .unwrap()
            .unwrap();
        let proxy = TypeBuilder::class("Demo", "Named$Proxy")
            .with_method(fwd.builder)
            .build()
            .unwrap();
        assert_eq!(proxy.declared_methods()[0].slot(), to_string.slot());
        assert_eq!(proxy.public_methods_named("to_string").len(), 1);

        // Other virtual sources get a slot of their own
        let fwd = synth
            .synthesize(&named.declared_methods()[1], None)
            .unwrap()
            .unwrap();
        let proxy = TypeBuilder::class("Demo", "Named$Proxy")
            .with_method(fwd.builder)
            .build()
            .unwrap();
        let run = &proxy.declared_methods()[0];
        assert!(run.is_virtual());
        assert_ne!(run.slot(), named.declared_methods()[1].slot());
    }

    #[test]
    fn test_hidden_duplicate_is_skipped() {
        let ty = model();
        let run4 = method(&ty, "Run4");
        let mut synth = MethodForwardingSynthesizer::new(0);
        assert!(synth.synthesize(&run4, None).unwrap().is_some());
        assert!(synth.synthesize(&run4, None).unwrap().is_none());
    }
}
