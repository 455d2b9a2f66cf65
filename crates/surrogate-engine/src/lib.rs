//! Surrogate Engine
//!
//! Runtime synthesis of forwarding proxy types:
//! - **Object model**: type and method descriptors, runtime values (`object` module)
//! - **Reflect**: instruction emission, interpretation, and the proxy
//!   synthesis pipeline (`reflect` module)
//!
//! Given a type `T` and a live instance of it, the engine builds a type
//! `T$Proxy` that stores the instance, implements `Surrogate.ObjectProxy[T]`
//! and every interface of `T`, and forwards each eligible method to the
//! instance. The type is built once per source type and reused.
//!
//! # Example
//!
//! ```rust,ignore
//! use surrogate_engine::{create_proxy, types, MethodBuilder, ObjectRef, TypeBuilder, Value};
//!
//! let model = TypeBuilder::class("Demo", "TestModel")
//!     .with_method(MethodBuilder::new("Run4").returns(types::int()).native(|_, _| Ok(Value::Int(4))))
//!     .build()?;
//!
//! let proxy = create_proxy(&ObjectRef::new(model, ()))?;
//! assert_eq!(proxy.call("Run4", vec![])?, Value::Int(4));
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![cfg_attr(test, allow(clippy::bool_assert_comparison))]

// ============================================================================
// Core Modules
// ============================================================================

/// Engine configuration
pub mod config;

/// Default constants
pub mod defaults;

/// Error types
pub mod error;

/// Object model: descriptors and runtime values
pub mod object;

/// Emission, dispatch and proxy synthesis
pub mod reflect;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{ConfigError, ProxyConfig};
pub use error::{ProxyError, ProxyResult};
pub use object::{
    types, Deferred, FieldDescriptor, Invocation, MemberMetadata, MethodBuilder, MethodDescriptor,
    MethodRef, ObjectRef, ProxyAttribute, Reflect, Sequence, SigType, TypeBuilder, TypeDescriptor,
    TypeKind, TypeRef, Value, Visibility,
};
pub use reflect::{
    InterfaceView, MethodHandle, ObjectProxy, ProxyFactory, ProxyObject, TypeRegistry, TypedProxy,
};

/// Wrap `instance` using the process-wide [`ProxyFactory`]
pub fn create_proxy(instance: &ObjectRef) -> ProxyResult<ProxyObject> {
    ProxyFactory::global().create_proxy(instance)
}
