//! Method descriptors: signatures, generic parameters, bodies.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::class::{TypeId, TypeKey, TypeKind, TypeRef};
use super::metadata::{MemberMetadata, ProxyAttribute};
use super::value::{ObjectRef, Value};
use crate::error::{ProxyError, ProxyResult};
use crate::reflect::emit::EmittedBody;

/// Global counter for method IDs
static NEXT_METHOD_ID: AtomicU64 = AtomicU64::new(1);

/// Global counter for vtable slot IDs
static NEXT_SLOT_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of a method descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodId(u64);

impl MethodId {
    fn next() -> Self {
        MethodId(NEXT_METHOD_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Virtual table slot; an override shares the slot of the method it overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(u64);

impl SlotId {
    fn next() -> Self {
        SlotId(NEXT_SLOT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Member accessibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    /// Accessible everywhere
    #[default]
    Public,
    /// Accessible to subtypes
    Protected,
    /// Accessible within the defining assembly
    Internal,
    /// Accessible only to the declaring type
    Private,
}

impl Visibility {
    /// Check for public visibility
    pub fn is_public(self) -> bool {
        self == Visibility::Public
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Internal => "internal",
            Visibility::Private => "private",
        };
        f.write_str(s)
    }
}

/// A type as it appears in a method signature
#[derive(Debug, Clone)]
pub enum SigType {
    /// A concrete type
    Type(TypeRef),
    /// The method's own generic parameter at this position
    Generic(usize),
    /// A by-reference slot of the inner type
    ByRef(Box<SigType>),
}

impl SigType {
    /// By-reference wrapper around `inner`
    pub fn by_ref(inner: impl Into<SigType>) -> Self {
        SigType::ByRef(Box::new(inner.into()))
    }

    /// Check for the `void` return type
    pub fn is_void(&self) -> bool {
        matches!(self, SigType::Type(t) if t.is_void())
    }

    /// Check for a by-reference slot
    pub fn is_by_ref(&self) -> bool {
        matches!(self, SigType::ByRef(_))
    }

    /// Concrete type after substituting method type arguments (by-ref stripped)
    pub fn resolve(&self, type_args: &[TypeRef]) -> Option<TypeRef> {
        match self {
            SigType::Type(t) => Some(t.clone()),
            SigType::Generic(i) => type_args.get(*i).cloned(),
            SigType::ByRef(inner) => inner.resolve(type_args),
        }
    }

    /// Structural equality; concrete types compare by identity
    pub fn same(&self, other: &SigType) -> bool {
        match (self, other) {
            (SigType::Type(a), SigType::Type(b)) => a.same_type(b),
            (SigType::Generic(a), SigType::Generic(b)) => a == b,
            (SigType::ByRef(a), SigType::ByRef(b)) => a.same(b),
            _ => false,
        }
    }

    /// Render using the generic parameter names of the owning method
    pub fn display(&self, generics: &[GenericParameter]) -> String {
        match self {
            SigType::Type(t) => t.full_name(),
            SigType::Generic(i) => generics
                .get(*i)
                .map(|g| g.name.clone())
                .unwrap_or_else(|| format!("!!{}", i)),
            SigType::ByRef(inner) => format!("ref {}", inner.display(generics)),
        }
    }
}

impl From<TypeRef> for SigType {
    fn from(t: TypeRef) -> Self {
        SigType::Type(t)
    }
}

impl From<&TypeRef> for SigType {
    fn from(t: &TypeRef) -> Self {
        SigType::Type(t.clone())
    }
}

/// A generic parameter declared on a method
#[derive(Debug, Clone)]
pub struct GenericParameter {
    /// Parameter name (e.g. `T`)
    pub name: String,
    /// Position in the generic parameter list
    pub position: usize,
    /// Types every argument must be assignable to
    pub constraints: Vec<TypeRef>,
}

impl GenericParameter {
    /// First constraint `argument` violates, if any
    pub fn violated_constraint(&self, argument: &TypeRef) -> Option<&TypeRef> {
        self.constraints
            .iter()
            .find(|c| !argument.is_assignable_to(c))
    }

    /// Whether both parameters carry the same constraint set, in order
    pub fn same_constraints(&self, other: &GenericParameter) -> bool {
        self.constraints.len() == other.constraints.len()
            && self
                .constraints
                .iter()
                .zip(&other.constraints)
                .all(|(a, b)| a.same_type(b))
    }
}

/// A method parameter
#[derive(Debug, Clone)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Parameter type
    pub ty: SigType,
}

/// Snapshot of the type a method is declared on
#[derive(Debug, Clone)]
pub struct DeclaringType {
    /// Declaring type ID
    pub id: TypeId,
    /// Declaring type identity
    pub key: TypeKey,
    /// Declaring type full name
    pub full_name: String,
    /// Declaring type kind
    pub kind: TypeKind,
}

impl DeclaringType {
    /// Methods of value types dispatch directly
    pub fn is_value_type(&self) -> bool {
        self.kind == TypeKind::ValueType
    }

    /// Declared on the universal root object type
    pub fn is_root(&self) -> bool {
        self.kind == TypeKind::Object
    }

    /// Declared on an interface
    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }
}

/// Native method implementation
pub type NativeFn =
    Arc<dyn Fn(&ObjectRef, &mut Invocation<'_>) -> ProxyResult<Value> + Send + Sync>;

/// How a method executes
#[derive(Clone)]
pub enum MethodBody {
    /// Rust closure
    Native(NativeFn),
    /// Instruction body produced by the emitter
    Emitted(Arc<EmittedBody>),
    /// No body (interface members)
    Abstract,
}

impl fmt::Debug for MethodBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodBody::Native(_) => f.write_str("Native"),
            MethodBody::Emitted(body) => write!(f, "Emitted({} instructions)", body.len()),
            MethodBody::Abstract => f.write_str("Abstract"),
        }
    }
}

/// Arguments of one call, as seen by a method body
pub struct Invocation<'a> {
    method: &'a MethodDescriptor,
    type_args: &'a [TypeRef],
    args: &'a mut [Value],
}

impl<'a> Invocation<'a> {
    pub(crate) fn new(
        method: &'a MethodDescriptor,
        type_args: &'a [TypeRef],
        args: &'a mut [Value],
    ) -> Self {
        Self {
            method,
            type_args,
            args,
        }
    }

    /// Method being executed
    pub fn method(&self) -> &MethodDescriptor {
        self.method
    }

    /// Bound generic type arguments
    pub fn type_args(&self) -> &[TypeRef] {
        self.type_args
    }

    /// Generic type argument at `index`
    pub fn type_arg(&self, index: usize) -> Option<&TypeRef> {
        self.type_args.get(index)
    }

    /// All arguments
    pub fn args(&self) -> &[Value] {
        &*self.args
    }

    /// Argument at `index`
    pub fn arg(&self, index: usize) -> ProxyResult<&Value> {
        self.args.get(index).ok_or_else(|| ProxyError::ArgumentCount {
            method: self.method.name.clone(),
            expected: index + 1,
            got: self.args.len(),
        })
    }

    /// Overwrite the argument at `index` (visible to the caller for by-ref parameters)
    pub fn set_arg(&mut self, index: usize, value: Value) -> ProxyResult<()> {
        let got = self.args.len();
        let slot = self.args.get_mut(index).ok_or_else(|| ProxyError::ArgumentCount {
            method: self.method.name.clone(),
            expected: index + 1,
            got,
        })?;
        *slot = value;
        Ok(())
    }
}

/// A method of a type
#[derive(Debug)]
pub struct MethodDescriptor {
    id: MethodId,
    slot: SlotId,
    name: String,
    declaring: DeclaringType,
    visibility: Visibility,
    is_virtual: bool,
    is_abstract: bool,
    generic_parameters: Vec<GenericParameter>,
    parameters: Vec<Parameter>,
    return_type: SigType,
    metadata: MemberMetadata,
    body: MethodBody,
}

/// Shared handle to a method descriptor
pub type MethodRef = Arc<MethodDescriptor>;

impl MethodDescriptor {
    /// Unique method ID
    pub fn id(&self) -> MethodId {
        self.id
    }

    /// Virtual table slot
    pub fn slot(&self) -> SlotId {
        self.slot
    }

    /// Method name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type this method is declared on
    pub fn declaring(&self) -> &DeclaringType {
        &self.declaring
    }

    /// Accessibility
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Check for public visibility
    pub fn is_public(&self) -> bool {
        self.visibility.is_public()
    }

    /// Dispatched through the virtual table
    pub fn is_virtual(&self) -> bool {
        self.is_virtual
    }

    /// Has no body
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Generic parameters in declaration order
    pub fn generic_parameters(&self) -> &[GenericParameter] {
        &self.generic_parameters
    }

    /// Number of generic parameters
    pub fn generic_arity(&self) -> usize {
        self.generic_parameters.len()
    }

    /// Parameters in declaration order
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Return type
    pub fn return_type(&self) -> &SigType {
        &self.return_type
    }

    /// Check for a `void` return
    pub fn returns_void(&self) -> bool {
        self.return_type.is_void()
    }

    /// Forwarding metadata
    pub fn metadata(&self) -> &MemberMetadata {
        &self.metadata
    }

    /// Method body
    pub fn body(&self) -> &MethodBody {
        &self.body
    }

    /// Any by-reference parameter or return
    pub fn has_by_ref(&self) -> bool {
        self.return_type.is_by_ref() || self.parameters.iter().any(|p| p.ty.is_by_ref())
    }

    /// Same generic arity, parameter types and return type
    pub fn signature_matches(&self, other: &MethodDescriptor) -> bool {
        self.generic_arity() == other.generic_arity()
            && self.parameters.len() == other.parameters.len()
            && self
                .parameters
                .iter()
                .zip(&other.parameters)
                .all(|(a, b)| a.ty.same(&b.ty))
            && self.return_type.same(&other.return_type)
    }

    /// Same member of the same type, even across separately built descriptors
    pub fn same_member(&self, other: &MethodDescriptor) -> bool {
        self.id == other.id
            || (self.declaring.key == other.declaring.key
                && self.name == other.name
                && self.signature_matches(other))
    }

    /// Validate generic type arguments against arity and constraints
    pub fn bind_generic(&self, type_args: &[TypeRef]) -> ProxyResult<()> {
        if type_args.len() != self.generic_parameters.len() {
            return Err(ProxyError::GenericArity {
                method: self.name.clone(),
                expected: self.generic_parameters.len(),
                got: type_args.len(),
            });
        }
        for (param, arg) in self.generic_parameters.iter().zip(type_args) {
            if let Some(constraint) = param.violated_constraint(arg) {
                return Err(ProxyError::ConstraintViolation {
                    method: self.name.clone(),
                    parameter: param.name.clone(),
                    argument: arg.full_name(),
                    constraint: constraint.full_name(),
                });
            }
        }
        Ok(())
    }

    /// Validate argument count and per-parameter conformance
    pub fn check_arguments(&self, type_args: &[TypeRef], args: &[Value]) -> ProxyResult<()> {
        if args.len() != self.parameters.len() {
            return Err(ProxyError::ArgumentCount {
                method: self.name.clone(),
                expected: self.parameters.len(),
                got: args.len(),
            });
        }
        for (index, (param, arg)) in self.parameters.iter().zip(args).enumerate() {
            if let Some(ty) = param.ty.resolve(type_args) {
                if !arg.conforms_to(&ty) {
                    return Err(ProxyError::ArgumentType {
                        method: self.name.clone(),
                        index,
                        expected: ty.full_name(),
                        got: arg.type_name(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Human-readable signature, e.g. `int Run4()` or `void Run0<T : Demo.Program>()`
    pub fn signature(&self) -> String {
        let generics = &self.generic_parameters;
        let mut out = format!("{} {}", self.return_type.display(generics), self.name);
        if !generics.is_empty() {
            let list: Vec<String> = generics
                .iter()
                .map(|g| {
                    if g.constraints.is_empty() {
                        g.name.clone()
                    } else {
                        let cs: Vec<String> = g.constraints.iter().map(|c| c.full_name()).collect();
                        format!("{} : {}", g.name, cs.join(", "))
                    }
                })
                .collect();
            out.push_str(&format!("<{}>", list.join(", ")));
        }
        let params: Vec<String> = self
            .parameters
            .iter()
            .map(|p| format!("{} {}", p.ty.display(generics), p.name))
            .collect();
        out.push_str(&format!("({})", params.join(", ")));
        out
    }
}

/// Builder for method descriptors
pub struct MethodBuilder {
    name: String,
    slot: Option<SlotId>,
    visibility: Visibility,
    is_virtual: bool,
    is_abstract: bool,
    generic_parameters: Vec<GenericParameter>,
    parameters: Vec<Parameter>,
    return_type: Option<SigType>,
    metadata: MemberMetadata,
    body: MethodBody,
    errors: Vec<ProxyError>,
}

impl MethodBuilder {
    /// Start a public, non-virtual method returning `void`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slot: None,
            visibility: Visibility::Public,
            is_virtual: false,
            is_abstract: false,
            generic_parameters: Vec::new(),
            parameters: Vec::new(),
            return_type: None,
            metadata: MemberMetadata::new(),
            body: MethodBody::Abstract,
            errors: Vec::new(),
        }
    }

    /// Name of the method being built
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set visibility
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Mark as private
    pub fn private(self) -> Self {
        self.visibility(Visibility::Private)
    }

    /// Mark as protected
    pub fn protected(self) -> Self {
        self.visibility(Visibility::Protected)
    }

    /// Mark as internal
    pub fn internal(self) -> Self {
        self.visibility(Visibility::Internal)
    }

    /// Mark as virtual (new slot)
    pub fn as_virtual(mut self) -> Self {
        self.is_virtual = true;
        self
    }

    /// Mark as abstract (interface members)
    pub fn as_abstract(mut self) -> Self {
        self.is_abstract = true;
        self.is_virtual = true;
        self.body = MethodBody::Abstract;
        self
    }

    /// Override a virtual method of a base type (shares its slot)
    pub fn overrides(mut self, base: &MethodRef) -> Self {
        self.slot = Some(base.slot());
        self.is_virtual = true;
        self
    }

    /// Declare a generic parameter with its constraints
    pub fn generic(mut self, name: impl Into<String>, constraints: Vec<TypeRef>) -> Self {
        let position = self.generic_parameters.len();
        self.generic_parameters.push(GenericParameter {
            name: name.into(),
            position,
            constraints,
        });
        self
    }

    /// Append a by-value parameter
    pub fn param(mut self, name: impl Into<String>, ty: impl Into<SigType>) -> Self {
        self.parameters.push(Parameter {
            name: name.into(),
            ty: ty.into(),
        });
        self
    }

    /// Append a by-reference parameter
    pub fn param_ref(self, name: impl Into<String>, ty: impl Into<SigType>) -> Self {
        self.param(name, SigType::by_ref(ty))
    }

    /// Set the return type
    pub fn returns(mut self, ty: impl Into<SigType>) -> Self {
        self.return_type = Some(ty.into());
        self
    }

    /// Return by reference
    pub fn returns_ref(self, ty: impl Into<SigType>) -> Self {
        self.returns(SigType::by_ref(ty))
    }

    /// Attach forwarding metadata
    pub fn attribute(mut self, attribute: ProxyAttribute) -> Self {
        if let Err(e) = self.metadata.push(&self.name, attribute) {
            self.errors.push(e);
        }
        self
    }

    /// Implement with a Rust closure
    pub fn native<F>(mut self, f: F) -> Self
    where
        F: Fn(&ObjectRef, &mut Invocation<'_>) -> ProxyResult<Value> + Send + Sync + 'static,
    {
        self.body = MethodBody::Native(Arc::new(f));
        self
    }

    pub(crate) fn body(mut self, body: MethodBody) -> Self {
        self.body = body;
        self
    }

    pub(crate) fn generic_parameters(mut self, generics: Vec<GenericParameter>) -> Self {
        self.generic_parameters = generics;
        self
    }

    pub(crate) fn parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = parameters;
        self
    }

    pub(crate) fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub(crate) fn has_body(&self) -> bool {
        !matches!(self.body, MethodBody::Abstract)
    }

    /// Produce the descriptor for a method declared on `declaring`
    pub(crate) fn finish(self, declaring: DeclaringType) -> ProxyResult<MethodDescriptor> {
        if let Some(err) = self.errors.into_iter().next() {
            return Err(err);
        }
        if self.name.is_empty() {
            return Err(ProxyError::InvalidTypeDefinition {
                type_name: declaring.full_name,
                reason: "method name cannot be empty".to_string(),
            });
        }
        let arity = self.generic_parameters.len();
        let signature_types = self
            .parameters
            .iter()
            .map(|p| &p.ty)
            .chain(self.return_type.iter());
        for ty in signature_types {
            if let Some(index) = generic_index(ty) {
                if index >= arity {
                    return Err(ProxyError::InvalidTypeDefinition {
                        type_name: declaring.full_name,
                        reason: format!(
                            "method '{}' references generic parameter {} but declares {}",
                            self.name, index, arity
                        ),
                    });
                }
            }
        }
        Ok(MethodDescriptor {
            id: MethodId::next(),
            slot: self.slot.unwrap_or_else(SlotId::next),
            name: self.name,
            declaring,
            visibility: self.visibility,
            is_virtual: self.is_virtual,
            is_abstract: self.is_abstract,
            generic_parameters: self.generic_parameters,
            parameters: self.parameters,
            return_type: self
                .return_type
                .unwrap_or_else(|| SigType::Type(super::class::types::void())),
            metadata: self.metadata,
            body: self.body,
        })
    }
}

fn generic_index(ty: &SigType) -> Option<usize> {
    match ty {
        SigType::Type(_) => None,
        SigType::Generic(i) => Some(*i),
        SigType::ByRef(inner) => generic_index(inner),
    }
}
