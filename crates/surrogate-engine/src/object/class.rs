//! Type descriptors
//!
//! A `TypeDescriptor` is the runtime description of a class, value type or
//! interface: its base type, implemented interfaces, fields, methods and
//! explicit interface implementations. Descriptors are immutable once built
//! and shared as [`TypeRef`]. Synthesized proxy types use the same
//! representation, so dispatch treats original and generated types alike.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rustc_hash::FxHashSet;

use super::method::{DeclaringType, MethodBuilder, MethodDescriptor, MethodRef, Visibility};
use crate::error::{ProxyError, ProxyResult};

/// Global counter for type IDs
static NEXT_TYPE_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of a type descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u64);

impl TypeId {
    fn next() -> Self {
        TypeId(NEXT_TYPE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Built-in primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// No value
    Void,
    /// Boolean
    Bool,
    /// 64-bit integer
    Int,
    /// 64-bit float
    Float,
    /// String
    Str,
    /// Type handle
    TypeHandle,
    /// Deferred result
    Deferred,
    /// Lazy sequence
    Sequence,
}

impl Primitive {
    /// Type name
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Void => "void",
            Primitive::Bool => "bool",
            Primitive::Int => "int",
            Primitive::Float => "float",
            Primitive::Str => "string",
            Primitive::TypeHandle => "type",
            Primitive::Deferred => "Deferred",
            Primitive::Sequence => "Sequence",
        }
    }

    /// Whether null is a valid value of this type
    pub fn is_reference(self) -> bool {
        matches!(
            self,
            Primitive::Str | Primitive::TypeHandle | Primitive::Deferred | Primitive::Sequence
        )
    }
}

/// Type kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// The universal root object type
    Object,
    /// Built-in primitive
    Primitive(Primitive),
    /// Reference type
    Class,
    /// Value type (methods dispatch directly)
    ValueType,
    /// Interface (abstract methods only)
    Interface,
}

/// Type identity: nominal, or a generic definition applied to arguments
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKey {
    /// A named, non-generic type
    Named(TypeId),
    /// A constructed generic type
    Constructed(TypeId, Vec<TypeKey>),
}

/// A field of a type
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field name
    pub name: String,
    /// Field type
    pub ty: TypeRef,
    /// Accessibility
    pub visibility: Visibility,
    /// May only be assigned once, during construction
    pub init_only: bool,
}

impl FieldDescriptor {
    /// Create a public, mutable field
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            visibility: Visibility::Public,
            init_only: false,
        }
    }

    /// Mark as private
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    /// Mark as init-only
    pub fn init_only(mut self) -> Self {
        self.init_only = true;
        self
    }
}

/// An explicit interface implementation: `interface_method` is served by `target`
#[derive(Debug, Clone)]
pub struct MethodImpl {
    /// Interface method being implemented
    pub interface_method: MethodRef,
    /// Method on the implementing type
    pub target: MethodRef,
}

/// Ordered correspondence between an interface's methods and their implementations
#[derive(Debug, Clone)]
pub struct InterfaceMapping {
    /// The mapped interface
    pub interface: TypeRef,
    /// Interface methods in declaration order
    pub interface_methods: Vec<MethodRef>,
    /// Implementing method for each interface method, same order
    pub target_methods: Vec<MethodRef>,
}

impl InterfaceMapping {
    /// Implementation of `interface_method`, if it belongs to this interface
    pub fn target_for(&self, interface_method: &MethodDescriptor) -> Option<&MethodRef> {
        self.interface_methods
            .iter()
            .position(|m| m.same_member(interface_method))
            .map(|i| &self.target_methods[i])
    }
}

/// Runtime description of a type
pub struct TypeDescriptor {
    id: TypeId,
    key: TypeKey,
    namespace: Option<String>,
    name: String,
    full_name: String,
    kind: TypeKind,
    base: Option<TypeRef>,
    interfaces: Vec<TypeRef>,
    generic_parameters: Vec<String>,
    type_arguments: Vec<TypeRef>,
    fields: Vec<FieldDescriptor>,
    constructor: Option<MethodRef>,
    methods: Vec<MethodRef>,
    explicit_impls: Vec<MethodImpl>,
    sealed: bool,
}

/// Shared handle to a type descriptor
pub type TypeRef = Arc<TypeDescriptor>;

impl TypeDescriptor {
    /// Unique type ID
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Type identity
    pub fn key(&self) -> TypeKey {
        self.key.clone()
    }

    /// Whether both descriptors denote the same type
    pub fn same_type(&self, other: &TypeDescriptor) -> bool {
        self.key == other.key
    }

    /// Namespace, if any
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Simple name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace-qualified name, with type arguments for constructed types
    pub fn full_name(&self) -> String {
        self.full_name.clone()
    }

    /// Type kind
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Check for the root object type
    pub fn is_root(&self) -> bool {
        self.kind == TypeKind::Object
    }

    /// Check for an interface
    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    /// Check for a value type
    pub fn is_value_type(&self) -> bool {
        self.kind == TypeKind::ValueType
    }

    /// Check for `void`
    pub fn is_void(&self) -> bool {
        self.kind == TypeKind::Primitive(Primitive::Void)
    }

    /// Cannot be extended
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Base type (None for the root, primitives and interfaces)
    pub fn base(&self) -> Option<&TypeRef> {
        self.base.as_ref()
    }

    /// Directly declared interfaces
    pub fn interfaces(&self) -> &[TypeRef] {
        &self.interfaces
    }

    /// Generic parameter names of a generic definition
    pub fn generic_parameters(&self) -> &[String] {
        &self.generic_parameters
    }

    /// Type arguments of a constructed type
    pub fn type_arguments(&self) -> &[TypeRef] {
        &self.type_arguments
    }

    /// Declared fields
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Index and descriptor of the field named `name`
    pub fn find_field(&self, name: &str) -> Option<(usize, &FieldDescriptor)> {
        self.fields.iter().enumerate().find(|(_, f)| f.name == name)
    }

    /// Constructor, if any
    pub fn constructor(&self) -> Option<&MethodRef> {
        self.constructor.as_ref()
    }

    /// Methods declared on this type
    pub fn declared_methods(&self) -> &[MethodRef] {
        &self.methods
    }

    /// Explicit interface implementations declared on this type
    pub fn explicit_impls(&self) -> &[MethodImpl] {
        &self.explicit_impls
    }

    /// This type followed by its base chain
    pub fn ancestors(&self) -> impl Iterator<Item = &TypeDescriptor> {
        std::iter::successors(Some(self), |t| t.base.as_deref())
    }

    /// Every interface implemented, transitively, declared order first
    pub fn all_interfaces(&self) -> Vec<TypeRef> {
        fn add(out: &mut Vec<TypeRef>, iface: &TypeRef) {
            if out.iter().any(|i| i.same_type(iface)) {
                return;
            }
            out.push(iface.clone());
            for parent in iface.interfaces() {
                add(out, parent);
            }
        }

        let mut out = Vec::new();
        for ty in self.ancestors() {
            for iface in &ty.interfaces {
                add(&mut out, iface);
            }
        }
        out
    }

    /// Whether a value of this type can be used where `target` is expected
    pub fn is_assignable_to(&self, target: &TypeDescriptor) -> bool {
        if self.same_type(target) {
            return true;
        }
        match target.kind {
            TypeKind::Object => !self.is_void(),
            TypeKind::Interface => self.all_interfaces().iter().any(|i| i.same_type(target)),
            TypeKind::Class | TypeKind::ValueType => self.ancestors().any(|t| t.same_type(target)),
            TypeKind::Primitive(_) => false,
        }
    }

    /// All instance methods, most-derived first; overridden and inherited
    /// private methods are left out
    pub fn instance_methods(&self) -> Vec<MethodRef> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        for (depth, ty) in self.ancestors().enumerate() {
            for method in &ty.methods {
                if depth > 0 && method.visibility() == Visibility::Private {
                    continue;
                }
                if seen.insert(method.slot()) {
                    out.push(method.clone());
                }
            }
        }
        out
    }

    /// Public instance methods named `name`
    pub fn public_methods_named(&self, name: &str) -> Vec<MethodRef> {
        self.instance_methods()
            .into_iter()
            .filter(|m| m.is_public() && m.name() == name)
            .collect()
    }

    /// Map `iface`'s methods to the methods implementing them on this type
    pub fn interface_map(&self, iface: &TypeDescriptor) -> ProxyResult<InterfaceMapping> {
        let interface = self
            .all_interfaces()
            .into_iter()
            .find(|i| i.same_type(iface))
            .ok_or_else(|| ProxyError::InterfaceNotImplemented {
                type_name: self.full_name(),
                interface: iface.full_name(),
            })?;

        let instance_methods = self.instance_methods();
        let mut targets = Vec::with_capacity(interface.methods.len());
        for im in &interface.methods {
            let target = self
                .ancestors()
                .find_map(|ty| ty.implementation_of(im, &instance_methods))
                .ok_or_else(|| ProxyError::UnsatisfiedInterface {
                    type_name: self.full_name(),
                    interface: interface.full_name(),
                    method: im.name().to_string(),
                })?;
            targets.push(target);
        }

        Ok(InterfaceMapping {
            interface_methods: interface.methods.clone(),
            target_methods: targets,
            interface,
        })
    }

    /// Implementation of `interface_method` contributed by this level of the
    /// hierarchy: an explicit implementation first, then a matching public
    /// method. A public match resolves to its most-derived override in
    /// `instance_methods`.
    fn implementation_of(
        &self,
        interface_method: &MethodDescriptor,
        instance_methods: &[MethodRef],
    ) -> Option<MethodRef> {
        if let Some(mi) = self
            .explicit_impls
            .iter()
            .find(|mi| mi.interface_method.same_member(interface_method))
        {
            return Some(mi.target.clone());
        }
        let declared = self.methods.iter().find(|m| {
            m.is_public()
                && m.name() == interface_method.name()
                && m.signature_matches(interface_method)
        })?;
        Some(
            instance_methods
                .iter()
                .find(|m| m.slot() == declared.slot())
                .unwrap_or(declared)
                .clone(),
        )
    }

    /// Implementation that runs when `method` is dispatched on an instance of this type
    pub fn resolve_override(&self, method: &MethodRef) -> ProxyResult<MethodRef> {
        if method.declaring().is_interface() {
            let iface = self
                .all_interfaces()
                .into_iter()
                .find(|i| i.key == method.declaring().key)
                .ok_or_else(|| ProxyError::InterfaceNotImplemented {
                    type_name: self.full_name(),
                    interface: method.declaring().full_name.clone(),
                })?;
            let mapping = self.interface_map(&iface)?;
            return mapping
                .target_for(method)
                .cloned()
                .ok_or_else(|| ProxyError::MethodNotFound {
                    type_name: self.full_name(),
                    name: method.name().to_string(),
                });
        }
        if !method.is_virtual() {
            return Ok(method.clone());
        }
        Ok(self
            .ancestors()
            .find_map(|ty| ty.methods.iter().find(|m| m.slot() == method.slot()))
            .cloned()
            .unwrap_or_else(|| method.clone()))
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("id", &self.id)
            .field("full_name", &self.full_name)
            .field("kind", &self.kind)
            .field("methods", &self.methods.len())
            .finish()
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.same_type(other)
    }
}

impl Eq for TypeDescriptor {}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name)
    }
}

/// Builder for type descriptors
///
/// # Example
///
/// ```ignore
/// let model = TypeBuilder::class("Demo", "TestModel")
///     .implements(&writer)
///     .with_method(MethodBuilder::new("Run4").returns(types::int()).native(|_, _| Ok(Value::Int(4))))
///     .build()?;
/// ```
pub struct TypeBuilder {
    namespace: Option<String>,
    name: String,
    kind: TypeKind,
    base: Option<TypeRef>,
    interfaces: Vec<TypeRef>,
    generic_parameters: Vec<String>,
    definition: Option<TypeRef>,
    type_arguments: Vec<TypeRef>,
    fields: Vec<FieldDescriptor>,
    constructor: Option<MethodBuilder>,
    methods: Vec<MethodBuilder>,
    explicit_impls: Vec<(MethodRef, String)>,
    sealed: bool,
}

impl TypeBuilder {
    fn with_kind(namespace: &str, name: &str, kind: TypeKind) -> Self {
        Self {
            namespace: (!namespace.is_empty()).then(|| namespace.to_string()),
            name: name.to_string(),
            kind,
            base: None,
            interfaces: Vec::new(),
            generic_parameters: Vec::new(),
            definition: None,
            type_arguments: Vec::new(),
            fields: Vec::new(),
            constructor: None,
            methods: Vec::new(),
            explicit_impls: Vec::new(),
            sealed: false,
        }
    }

    /// Start a reference type (base defaults to the root object type)
    pub fn class(namespace: &str, name: &str) -> Self {
        Self::with_kind(namespace, name, TypeKind::Class)
    }

    /// Start a value type
    pub fn value_type(namespace: &str, name: &str) -> Self {
        Self::with_kind(namespace, name, TypeKind::ValueType).sealed()
    }

    /// Start an interface
    pub fn interface(namespace: &str, name: &str) -> Self {
        Self::with_kind(namespace, name, TypeKind::Interface)
    }

    /// Start a constructed type from a generic definition and its arguments
    pub fn construct(definition: &TypeRef, type_arguments: Vec<TypeRef>) -> Self {
        let mut builder = Self::with_kind(
            definition.namespace().unwrap_or(""),
            definition.name(),
            definition.kind(),
        );
        builder.definition = Some(definition.clone());
        builder.type_arguments = type_arguments;
        builder.interfaces = definition.interfaces().to_vec();
        builder
    }

    /// Set the base type
    pub fn extends(mut self, base: &TypeRef) -> Self {
        self.base = Some(base.clone());
        self
    }

    /// Declare an implemented interface
    pub fn implements(mut self, iface: &TypeRef) -> Self {
        self.interfaces.push(iface.clone());
        self
    }

    /// Declare a type-level generic parameter (generic definitions only)
    pub fn generic_parameter(mut self, name: &str) -> Self {
        self.generic_parameters.push(name.to_string());
        self
    }

    /// Add a field
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Set the constructor
    pub fn with_constructor(mut self, ctor: MethodBuilder) -> Self {
        self.constructor = Some(ctor);
        self
    }

    /// Add a method
    pub fn with_method(mut self, method: MethodBuilder) -> Self {
        self.methods.push(method);
        self
    }

    /// Implement `interface_method` explicitly with the declared method named `target`
    pub fn explicit_impl(mut self, interface_method: &MethodRef, target: &str) -> Self {
        self.explicit_impls
            .push((interface_method.clone(), target.to_string()));
        self
    }

    /// Forbid subtypes
    pub fn sealed(mut self) -> Self {
        self.sealed = true;
        self
    }

    /// Validate and produce the descriptor
    pub fn build(self) -> ProxyResult<TypeRef> {
        let id = TypeId::next();
        let simple = match &self.namespace {
            Some(ns) => format!("{}.{}", ns, self.name),
            None => self.name.clone(),
        };
        let full_name = if self.type_arguments.is_empty() {
            simple
        } else {
            let args: Vec<String> = self.type_arguments.iter().map(|t| t.full_name()).collect();
            format!("{}[{}]", simple, args.join(","))
        };

        if self.name.is_empty() {
            return Err(invalid(&full_name, "type name cannot be empty"));
        }

        let key = match &self.definition {
            Some(def) => {
                if def.generic_parameters().len() != self.type_arguments.len() {
                    return Err(invalid(
                        &full_name,
                        format!(
                            "expected {} type argument(s), got {}",
                            def.generic_parameters().len(),
                            self.type_arguments.len()
                        ),
                    ));
                }
                TypeKey::Constructed(def.id(), self.type_arguments.iter().map(|t| t.key()).collect())
            }
            None => TypeKey::Named(id),
        };

        let base = match self.kind {
            TypeKind::Class | TypeKind::ValueType => {
                let base = self.base.clone().unwrap_or_else(types::object);
                if base.is_sealed() {
                    return Err(invalid(&full_name, format!("cannot extend sealed type '{}'", base)));
                }
                if !matches!(base.kind(), TypeKind::Class | TypeKind::Object) {
                    return Err(invalid(&full_name, format!("cannot extend '{}'", base)));
                }
                Some(base)
            }
            _ => {
                if self.base.is_some() {
                    return Err(invalid(&full_name, "only classes and value types have a base type"));
                }
                None
            }
        };

        if let Some(iface) = self.interfaces.iter().find(|i| !i.is_interface()) {
            return Err(invalid(&full_name, format!("'{}' is not an interface", iface)));
        }

        let declaring = DeclaringType {
            id,
            key: key.clone(),
            full_name: full_name.clone(),
            kind: self.kind,
        };

        let is_interface = self.kind == TypeKind::Interface;
        let mut methods: Vec<MethodRef> = Vec::with_capacity(self.methods.len());
        for builder in self.methods {
            let builder = if is_interface && !builder.is_abstract() {
                builder.as_abstract()
            } else {
                builder
            };
            if !is_interface && !builder.has_body() {
                return Err(ProxyError::InvalidTypeDefinition {
                    type_name: full_name,
                    reason: format!("method '{}' has no body", builder.name()),
                });
            }
            let method = builder.finish(declaring.clone())?;
            if methods
                .iter()
                .any(|m| m.name() == method.name() && m.signature_matches(&method))
            {
                return Err(ProxyError::InvalidTypeDefinition {
                    type_name: full_name,
                    reason: format!("duplicate method '{}'", method.signature()),
                });
            }
            methods.push(Arc::new(method));
        }

        let constructor = match self.constructor {
            Some(ctor) => Some(Arc::new(ctor.finish(declaring.clone())?)),
            None => None,
        };

        let mut explicit_impls = Vec::with_capacity(self.explicit_impls.len());
        for (interface_method, target_name) in self.explicit_impls {
            let target = methods
                .iter()
                .find(|m| m.name() == target_name && m.signature_matches(&interface_method))
                .cloned()
                .ok_or_else(|| ProxyError::InvalidTypeDefinition {
                    type_name: full_name.clone(),
                    reason: format!(
                        "explicit implementation '{}' of '{}.{}' is not declared",
                        target_name,
                        interface_method.declaring().full_name,
                        interface_method.name()
                    ),
                })?;
            explicit_impls.push(MethodImpl {
                interface_method,
                target,
            });
        }

        let ty = Arc::new(TypeDescriptor {
            id,
            key,
            namespace: self.namespace,
            name: self.name,
            full_name,
            kind: self.kind,
            base,
            interfaces: self.interfaces,
            generic_parameters: self.generic_parameters,
            type_arguments: self.type_arguments,
            fields: self.fields,
            constructor,
            methods,
            explicit_impls,
            sealed: self.sealed,
        });

        if !ty.is_interface() {
            let interfaces = ty.all_interfaces();
            for mi in &ty.explicit_impls {
                let declared = interfaces
                    .iter()
                    .any(|i| i.key == mi.interface_method.declaring().key);
                if !declared {
                    return Err(ProxyError::InvalidTypeDefinition {
                        type_name: ty.full_name(),
                        reason: format!(
                            "'{}' is not an implemented interface",
                            mi.interface_method.declaring().full_name
                        ),
                    });
                }
            }
            // A type must fully implement every interface it declares
            for iface in &interfaces {
                ty.interface_map(iface)?;
            }
        }

        Ok(ty)
    }
}

fn invalid(full_name: &str, reason: impl Into<String>) -> ProxyError {
    ProxyError::InvalidTypeDefinition {
        type_name: full_name.to_string(),
        reason: reason.into(),
    }
}

/// Predefined types
pub mod types {
    use std::sync::Arc;

    use once_cell::sync::Lazy;

    use super::{Primitive, TypeDescriptor, TypeId, TypeKey, TypeKind, TypeRef};
    use crate::object::method::{DeclaringType, MethodBuilder};
    use crate::object::value::Value;

    fn primitive(p: Primitive) -> TypeRef {
        let id = TypeId::next();
        Arc::new(TypeDescriptor {
            id,
            key: TypeKey::Named(id),
            namespace: None,
            name: p.name().to_string(),
            full_name: p.name().to_string(),
            kind: TypeKind::Primitive(p),
            base: None,
            interfaces: Vec::new(),
            generic_parameters: Vec::new(),
            type_arguments: Vec::new(),
            fields: Vec::new(),
            constructor: None,
            methods: Vec::new(),
            explicit_impls: Vec::new(),
            sealed: true,
        })
    }

    fn root() -> TypeRef {
        let id = TypeId::next();
        let declaring = DeclaringType {
            id,
            key: TypeKey::Named(id),
            full_name: "object".to_string(),
            kind: TypeKind::Object,
        };
        let builders = [
            MethodBuilder::new("to_string")
                .as_virtual()
                .returns(string())
                .native(|this, _| Ok(Value::string(this.class().full_name()))),
            MethodBuilder::new("get_hash_code")
                .as_virtual()
                .returns(int())
                .native(|this, _| Ok(Value::Int(this.address() as i64))),
        ];
        let methods = builders
            .into_iter()
            .filter_map(|b| b.finish(declaring.clone()).ok())
            .map(Arc::new)
            .collect();
        Arc::new(TypeDescriptor {
            id,
            key: TypeKey::Named(id),
            namespace: None,
            name: "object".to_string(),
            full_name: "object".to_string(),
            kind: TypeKind::Object,
            base: None,
            interfaces: Vec::new(),
            generic_parameters: Vec::new(),
            type_arguments: Vec::new(),
            fields: Vec::new(),
            constructor: None,
            methods,
            explicit_impls: Vec::new(),
            sealed: false,
        })
    }

    static OBJECT: Lazy<TypeRef> = Lazy::new(root);
    static VOID: Lazy<TypeRef> = Lazy::new(|| primitive(Primitive::Void));
    static BOOL: Lazy<TypeRef> = Lazy::new(|| primitive(Primitive::Bool));
    static INT: Lazy<TypeRef> = Lazy::new(|| primitive(Primitive::Int));
    static FLOAT: Lazy<TypeRef> = Lazy::new(|| primitive(Primitive::Float));
    static STRING: Lazy<TypeRef> = Lazy::new(|| primitive(Primitive::Str));
    static TYPE_HANDLE: Lazy<TypeRef> = Lazy::new(|| primitive(Primitive::TypeHandle));
    static DEFERRED: Lazy<TypeRef> = Lazy::new(|| primitive(Primitive::Deferred));
    static SEQUENCE: Lazy<TypeRef> = Lazy::new(|| primitive(Primitive::Sequence));

    /// The universal root object type
    pub fn object() -> TypeRef {
        OBJECT.clone()
    }

    /// `void`
    pub fn void() -> TypeRef {
        VOID.clone()
    }

    /// `bool`
    pub fn bool() -> TypeRef {
        BOOL.clone()
    }

    /// `int`
    pub fn int() -> TypeRef {
        INT.clone()
    }

    /// `float`
    pub fn float() -> TypeRef {
        FLOAT.clone()
    }

    /// `string`
    pub fn string() -> TypeRef {
        STRING.clone()
    }

    /// Type handle
    pub fn type_handle() -> TypeRef {
        TYPE_HANDLE.clone()
    }

    /// Deferred result
    pub fn deferred() -> TypeRef {
        DEFERRED.clone()
    }

    /// Lazy sequence
    pub fn sequence() -> TypeRef {
        SEQUENCE.clone()
    }
}
