//! Runtime object model
//!
//! Descriptors for types and methods, runtime values, and the handles that
//! wrapped methods return (deferred results and lazy sequences).

pub mod class;
pub mod deferred;
pub mod instance;
pub mod metadata;
pub mod method;
pub mod value;

pub use class::{
    types, FieldDescriptor, InterfaceMapping, MethodImpl, Primitive, TypeBuilder, TypeDescriptor,
    TypeId, TypeKey, TypeKind, TypeRef,
};
pub use deferred::{Deferred, Sequence};
pub use instance::FieldStorage;
pub use metadata::{MemberMetadata, ProxyAttribute};
pub use method::{
    DeclaringType, GenericParameter, Invocation, MethodBody, MethodBuilder, MethodDescriptor,
    MethodId, MethodRef, NativeFn, Parameter, SigType, SlotId, Visibility,
};
pub use value::{ObjectRef, Reflect, Value};
