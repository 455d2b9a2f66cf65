//! Late binding: resolve a method by name and call shape at call time.
//!
//! This is the dynamically-typed front door used by `ObjectRef::invoke` and
//! `ProxyObject::invoke`. Arguments are passed by value, so methods with
//! by-reference parameters or returns cannot be bound here; they must be
//! called through a [`MethodHandle`](super::proxy::MethodHandle).

use tracing::trace;

use super::dispatch;
use crate::error::{ProxyError, ProxyResult};
use crate::object::{MethodRef, ObjectRef, TypeDescriptor, TypeRef, Value};

/// Resolve the public instance method of `ty` named `name` that accepts
/// `type_args` and `args`
pub fn bind(
    ty: &TypeDescriptor,
    name: &str,
    type_args: &[TypeRef],
    args: &[Value],
) -> ProxyResult<MethodRef> {
    let named = ty.public_methods_named(name);
    if named.is_empty() {
        return Err(ProxyError::MethodNotFound {
            type_name: ty.full_name(),
            name: name.to_string(),
        });
    }

    let mut candidates: Vec<MethodRef> = named
        .iter()
        .filter(|m| m.generic_arity() == type_args.len() && m.parameters().len() == args.len())
        .cloned()
        .collect();

    if candidates.len() > 1 {
        candidates.retain(|m| {
            m.bind_generic(type_args).is_ok() && m.check_arguments(type_args, args).is_ok()
        });
    }

    let method = match candidates.len() {
        1 => candidates.remove(0),
        // A single overload by that name reports its own arity or argument error
        0 if named.len() == 1 => named[0].clone(),
        0 => {
            return Err(ProxyError::MethodNotFound {
                type_name: ty.full_name(),
                name: format!("{}`{}({} args)", name, type_args.len(), args.len()),
            })
        }
        _ => {
            return Err(ProxyError::AmbiguousMatch {
                type_name: ty.full_name(),
                name: name.to_string(),
            })
        }
    };

    if method.has_by_ref() {
        return Err(ProxyError::ByRefBinding {
            method: method.signature(),
        });
    }
    Ok(method)
}

/// Bind `name` against the receiver's runtime type and invoke it virtually
pub fn invoke_late(
    receiver: &ObjectRef,
    name: &str,
    type_args: &[TypeRef],
    mut args: Vec<Value>,
) -> ProxyResult<Value> {
    let method = bind(receiver.class(), name, type_args, &args)?;
    trace!(
        receiver = %receiver.class(),
        method = %method.signature(),
        "late-bound call"
    );
    dispatch::invoke_virtual(&method, receiver, type_args, &mut args)
}
