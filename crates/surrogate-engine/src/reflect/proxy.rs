//! Proxy instances and the ways of calling them.
//!
//! | Path                        | Binding                         | By-ref parameters |
//! |-----------------------------|---------------------------------|-------------------|
//! | `ProxyObject::invoke`       | late, by name and call shape    | rejected          |
//! | `InterfaceView::invoke`     | late, through an interface map  | rejected          |
//! | `MethodHandle::invoke`      | static, resolved once           | written back      |

use std::any::Any;
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

use super::{binder, contract, dispatch};
use crate::defaults::{CONTRACT_NAME, CONTRACT_NAMESPACE};
use crate::error::{ProxyError, ProxyResult};
use crate::object::{MethodRef, ObjectRef, Reflect, TypeRef, Value};

/// The wrapper contract: access to the wrapped instance, typed as `T`
pub trait ObjectProxy<T: ?Sized> {
    /// The wrapped instance
    fn object(&self) -> ProxyResult<Arc<T>>;
}

/// An instance of a synthesized proxy type
#[derive(Debug, Clone)]
pub struct ProxyObject {
    instance: ObjectRef,
    source: TypeRef,
}

impl ProxyObject {
    pub(crate) fn new(instance: ObjectRef, source: TypeRef) -> Self {
        Self { instance, source }
    }

    /// The proxy instance itself
    pub fn instance(&self) -> &ObjectRef {
        &self.instance
    }

    /// The synthesized proxy type
    pub fn proxy_type(&self) -> &TypeRef {
        self.instance.class()
    }

    /// The type the proxy was built for
    pub fn source_type(&self) -> &TypeRef {
        &self.source
    }

    /// The wrapped instance, read through the contract accessor
    pub fn wrapped_instance(&self) -> ProxyResult<ObjectRef> {
        let contract = self
            .proxy_type()
            .interfaces()
            .iter()
            .find(|i| contract::is_contract(i))
            .ok_or_else(|| ProxyError::InterfaceNotImplemented {
                type_name: self.proxy_type().full_name(),
                interface: format!("{}.{}[{}]", CONTRACT_NAMESPACE, CONTRACT_NAME, self.source),
            })?;
        let get_object = contract::accessor(contract)?;
        match dispatch::invoke_virtual(&get_object, &self.instance, &[], &mut [])? {
            Value::Object(obj) => Ok(obj),
            other => Err(ProxyError::InvalidReceiver {
                expected: self.source.full_name(),
                got: other.type_name(),
            }),
        }
    }

    /// Call a public method by name through the late-bound path
    pub fn invoke(&self, name: &str, type_args: &[TypeRef], args: Vec<Value>) -> ProxyResult<Value> {
        binder::invoke_late(&self.instance, name, type_args, args)
    }

    /// Call a non-generic public method by name
    pub fn call(&self, name: &str, args: Vec<Value>) -> ProxyResult<Value> {
        self.invoke(name, &[], args)
    }

    /// View the proxy through one of its interfaces
    pub fn as_interface(&self, interface: &TypeRef) -> ProxyResult<InterfaceView> {
        InterfaceView::new(self.instance.clone(), interface)
    }

    /// Statically resolve the public method `name` of the proxy type
    pub fn method(&self, name: &str) -> ProxyResult<MethodHandle> {
        let mut found = self.proxy_type().public_methods_named(name);
        match found.len() {
            0 => Err(ProxyError::MethodNotFound {
                type_name: self.proxy_type().full_name(),
                name: name.to_string(),
            }),
            1 => Ok(MethodHandle::new(found.remove(0))),
            _ => Err(ProxyError::AmbiguousMatch {
                type_name: self.proxy_type().full_name(),
                name: name.to_string(),
            }),
        }
    }
}

impl ObjectProxy<dyn Any + Send + Sync> for ProxyObject {
    fn object(&self) -> ProxyResult<Arc<dyn Any + Send + Sync>> {
        Ok(self.wrapped_instance()?.payload().clone())
    }
}

/// An object seen through one interface it implements
#[derive(Debug, Clone)]
pub struct InterfaceView {
    target: ObjectRef,
    interface: TypeRef,
}

impl InterfaceView {
    /// View `target` through `interface`
    pub fn new(target: ObjectRef, interface: &TypeRef) -> ProxyResult<Self> {
        let implemented = target
            .class()
            .all_interfaces()
            .iter()
            .any(|i| i.same_type(interface));
        if !interface.is_interface() || !implemented {
            return Err(ProxyError::InterfaceNotImplemented {
                type_name: target.class().full_name(),
                interface: interface.full_name(),
            });
        }
        Ok(Self {
            target,
            interface: interface.clone(),
        })
    }

    /// The viewed interface
    pub fn interface(&self) -> &TypeRef {
        &self.interface
    }

    /// The object behind the view
    pub fn target(&self) -> &ObjectRef {
        &self.target
    }

    fn interface_method(&self, name: &str, type_args: &[TypeRef], args: &[Value]) -> ProxyResult<MethodRef> {
        let mut scope = vec![self.interface.clone()];
        scope.extend(self.interface.all_interfaces());
        let candidates: Vec<MethodRef> = scope
            .iter()
            .flat_map(|i| i.declared_methods().iter().cloned())
            .filter(|m| {
                m.name() == name
                    && m.generic_arity() == type_args.len()
                    && m.parameters().len() == args.len()
            })
            .collect();
        match candidates.as_slice() {
            [] => Err(ProxyError::MethodNotFound {
                type_name: self.interface.full_name(),
                name: name.to_string(),
            }),
            [method] if method.has_by_ref() => Err(ProxyError::ByRefBinding {
                method: method.signature(),
            }),
            [method] => Ok(method.clone()),
            _ => Err(ProxyError::AmbiguousMatch {
                type_name: self.interface.full_name(),
                name: name.to_string(),
            }),
        }
    }

    /// Call an interface method by name; dispatch goes through the target's interface map
    pub fn invoke(&self, name: &str, type_args: &[TypeRef], mut args: Vec<Value>) -> ProxyResult<Value> {
        let method = self.interface_method(name, type_args, &args)?;
        dispatch::invoke_virtual(&method, &self.target, type_args, &mut args)
    }

    /// Call a non-generic interface method by name
    pub fn call(&self, name: &str, args: Vec<Value>) -> ProxyResult<Value> {
        self.invoke(name, &[], args)
    }
}

/// A statically resolved method, optionally closed over generic arguments
#[derive(Debug, Clone)]
pub struct MethodHandle {
    method: MethodRef,
    type_args: Vec<TypeRef>,
}

impl MethodHandle {
    /// Handle to `method` with no generic arguments bound
    pub fn new(method: MethodRef) -> Self {
        Self {
            method,
            type_args: Vec::new(),
        }
    }

    /// The resolved method
    pub fn method(&self) -> &MethodRef {
        &self.method
    }

    /// Bound generic arguments
    pub fn type_args(&self) -> &[TypeRef] {
        &self.type_args
    }

    /// Close the method over `type_args`, checking arity and constraints now
    pub fn make_generic(&self, type_args: Vec<TypeRef>) -> ProxyResult<MethodHandle> {
        self.method.bind_generic(&type_args)?;
        Ok(Self {
            method: self.method.clone(),
            type_args,
        })
    }

    /// Invoke on `target`; by-reference arguments are written back into `args`
    pub fn invoke(&self, target: &ObjectRef, args: &mut [Value]) -> ProxyResult<Value> {
        dispatch::invoke_virtual(&self.method, target, &self.type_args, args)
    }
}

/// A proxy whose wrapped instance is the Rust value `T`
pub struct TypedProxy<T: Reflect> {
    proxy: ProxyObject,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Reflect> TypedProxy<T> {
    pub(crate) fn new(proxy: ProxyObject) -> Self {
        Self {
            proxy,
            _marker: PhantomData,
        }
    }

    /// The untyped proxy
    pub fn proxy(&self) -> &ProxyObject {
        &self.proxy
    }

    /// Discard the type information
    pub fn into_inner(self) -> ProxyObject {
        self.proxy
    }
}

impl<T: Reflect> ObjectProxy<T> for TypedProxy<T> {
    fn object(&self) -> ProxyResult<Arc<T>> {
        let obj = self.proxy.wrapped_instance()?;
        obj.downcast_arc::<T>().ok_or_else(|| ProxyError::InvalidReceiver {
            expected: std::any::type_name::<T>().to_string(),
            got: obj.class().full_name(),
        })
    }
}

impl<T: Reflect> Deref for TypedProxy<T> {
    type Target = ProxyObject;

    fn deref(&self) -> &ProxyObject {
        &self.proxy
    }
}

impl<T: Reflect> Clone for TypedProxy<T> {
    fn clone(&self) -> Self {
        Self::new(self.proxy.clone())
    }
}

impl<T: Reflect> std::fmt::Debug for TypedProxy<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TypedProxy").field(&self.proxy).finish()
    }
}
