//! Proxy synthesis and execution
//!
//! Emission, interpretation and dispatch of method bodies, plus the
//! pipeline that builds proxy types:
//!
//! `ProxyFactory` → `TypeRegistry` → `ProxyTypeBuilder` →
//! (`interface_map`, `naming`, `MethodForwardingSynthesizer`, `BodyEmitter`)

pub mod binder;
pub mod contract;
pub mod dispatch;
pub mod dynamic_module;
pub mod emit;
pub mod factory;
pub mod forwarding;
pub mod interface_map;
pub mod interpreter;
pub mod naming;
pub mod proxy;
pub mod registry;
pub mod type_builder;

pub use dynamic_module::{DynamicModule, DynamicModuleInfo};
pub use emit::{BodyEmitter, CallTarget, EmittedBody, Instruction};
pub use factory::ProxyFactory;
pub use forwarding::{ForwardingMethod, MethodForwardingSynthesizer};
pub use interface_map::{InterfaceMapEntry, MappedMethod};
pub use naming::ResolvedName;
pub use proxy::{InterfaceView, MethodHandle, ObjectProxy, ProxyObject, TypedProxy};
pub use registry::TypeRegistry;
pub use type_builder::{ProxyTypeBuilder, ProxyTypeDescriptor};
