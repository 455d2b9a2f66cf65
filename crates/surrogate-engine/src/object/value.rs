//! Runtime values passed to and returned from methods.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::class::{types, Primitive, TypeDescriptor, TypeKind, TypeRef};
use super::deferred::{Deferred, Sequence};
use crate::error::{ProxyError, ProxyResult};

/// A Rust type that publishes a runtime type descriptor
pub trait Reflect: Any + Send + Sync {
    /// Descriptor describing instances of this type
    fn reflect_type() -> TypeRef;
}

/// Reference to a live object: its runtime type plus a shared payload
#[derive(Clone)]
pub struct ObjectRef {
    class: TypeRef,
    data: Arc<dyn Any + Send + Sync>,
}

impl ObjectRef {
    /// Wrap a value as an instance of `class`
    pub fn new<T: Any + Send + Sync>(class: TypeRef, value: T) -> Self {
        Self {
            class,
            data: Arc::new(value),
        }
    }

    /// Wrap an already shared value as an instance of `class`
    pub fn from_arc<T: Any + Send + Sync>(class: TypeRef, value: Arc<T>) -> Self {
        Self { class, data: value }
    }

    /// Wrap a value whose type publishes its own descriptor
    pub fn reflect<T: Reflect>(value: T) -> Self {
        Self::new(T::reflect_type(), value)
    }

    /// Wrap a shared value whose type publishes its own descriptor
    pub fn reflect_arc<T: Reflect>(value: Arc<T>) -> Self {
        Self::from_arc(T::reflect_type(), value)
    }

    /// Runtime type of this object
    pub fn class(&self) -> &TypeRef {
        &self.class
    }

    /// Borrow the payload as `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.data.downcast_ref::<T>()
    }

    /// Share the payload as `T`
    pub fn downcast_arc<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.data.clone().downcast::<T>().ok()
    }

    /// Borrow the payload as `T`, or fail with an invalid-receiver error
    pub fn expect_payload<T: Any>(&self) -> ProxyResult<&T> {
        self.downcast_ref::<T>().ok_or_else(|| ProxyError::InvalidReceiver {
            expected: std::any::type_name::<T>().to_string(),
            got: self.class.full_name(),
        })
    }

    /// Shared payload, untyped
    pub fn payload(&self) -> &Arc<dyn Any + Send + Sync> {
        &self.data
    }

    /// Address of the payload, used as object identity
    pub fn address(&self) -> usize {
        Arc::as_ptr(&self.data) as *const () as usize
    }

    /// Whether both references point to the same object
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        self.address() == other.address()
    }

    /// Whether this object is an instance of `ty`
    pub fn is_instance_of(&self, ty: &TypeDescriptor) -> bool {
        self.class.is_assignable_to(ty)
    }

    /// Call the public method `name` through the late-bound path
    pub fn invoke(&self, name: &str, type_args: &[TypeRef], args: Vec<Value>) -> ProxyResult<Value> {
        crate::reflect::binder::invoke_late(self, name, type_args, args)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:#x}", self.class.full_name(), self.address())
    }
}

/// A runtime value
#[derive(Debug, Clone)]
pub enum Value {
    /// Null reference (also the result of a void call)
    Null,
    /// Boolean
    Bool(bool),
    /// 64-bit integer
    Int(i64),
    /// 64-bit float
    Float(f64),
    /// Immutable string
    Str(Arc<str>),
    /// Object reference
    Object(ObjectRef),
    /// Type handle
    Type(TypeRef),
    /// Deferred result handle
    Deferred(Deferred),
    /// Lazy sequence handle
    Sequence(Sequence),
}

impl Value {
    /// Build a string value
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::Str(Arc::from(s.as_ref()))
    }

    /// Check for null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Integer payload
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Boolean payload
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    /// Object payload
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Type payload
    pub fn as_type(&self) -> Option<&TypeRef> {
        match self {
            Value::Type(t) => Some(t),
            _ => None,
        }
    }

    /// Deferred payload
    pub fn as_deferred(&self) -> Option<&Deferred> {
        match self {
            Value::Deferred(d) => Some(d),
            _ => None,
        }
    }

    /// Sequence payload
    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Value::Sequence(s) => Some(s),
            _ => None,
        }
    }

    /// Runtime type name, for diagnostics
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(_) => types::bool().full_name(),
            Value::Int(_) => types::int().full_name(),
            Value::Float(_) => types::float().full_name(),
            Value::Str(_) => types::string().full_name(),
            Value::Object(o) => o.class().full_name(),
            Value::Type(_) => types::type_handle().full_name(),
            Value::Deferred(_) => types::deferred().full_name(),
            Value::Sequence(_) => types::sequence().full_name(),
        }
    }

    /// Whether this value can be stored in a slot of type `ty`
    pub fn conforms_to(&self, ty: &TypeDescriptor) -> bool {
        match ty.kind() {
            TypeKind::Object => true,
            TypeKind::Primitive(p) => match (p, self) {
                (Primitive::Void, _) => false,
                (Primitive::Bool, Value::Bool(_))
                | (Primitive::Int, Value::Int(_))
                | (Primitive::Float, Value::Float(_))
                | (Primitive::Float, Value::Int(_))
                | (Primitive::Str, Value::Str(_))
                | (Primitive::TypeHandle, Value::Type(_))
                | (Primitive::Deferred, Value::Deferred(_))
                | (Primitive::Sequence, Value::Sequence(_)) => true,
                (p, Value::Null) => p.is_reference(),
                _ => false,
            },
            TypeKind::ValueType => matches!(self, Value::Object(o) if o.is_instance_of(ty)),
            TypeKind::Class | TypeKind::Interface => match self {
                Value::Null => true,
                Value::Object(o) => o.is_instance_of(ty),
                _ => false,
            },
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Type(a), Value::Type(b)) => a.same_type(b),
            (Value::Deferred(a), Value::Deferred(b)) => a.ptr_eq(b),
            (Value::Sequence(a), Value::Sequence(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<ObjectRef> for Value {
    fn from(o: ObjectRef) -> Self {
        Value::Object(o)
    }
}

impl From<Deferred> for Value {
    fn from(d: Deferred) -> Self {
        Value::Deferred(d)
    }
}

impl From<Sequence> for Value {
    fn from(s: Sequence) -> Self {
        Value::Sequence(s)
    }
}

impl From<TypeRef> for Value {
    fn from(t: TypeRef) -> Self {
        Value::Type(t)
    }
}
