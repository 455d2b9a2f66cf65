//! Method invocation: statically resolved, virtual, and body execution.

use tracing::trace;

use super::interpreter;
use crate::error::{ProxyError, ProxyResult};
use crate::object::{Invocation, MethodBody, MethodRef, ObjectRef, TypeRef, Value};

/// Check that `receiver` is an instance of the type declaring `method`
fn check_receiver(method: &MethodRef, receiver: &ObjectRef) -> ProxyResult<()> {
    let declaring = method.declaring();
    if declaring.is_root() || declaring.is_interface() {
        return Ok(());
    }
    if receiver.class().ancestors().any(|t| t.key() == declaring.key) {
        Ok(())
    } else {
        Err(ProxyError::InvalidReceiver {
            expected: declaring.full_name.clone(),
            got: receiver.class().full_name(),
        })
    }
}

/// Run `method` itself on `receiver`, without virtual resolution
pub fn invoke_direct(
    method: &MethodRef,
    receiver: &ObjectRef,
    type_args: &[TypeRef],
    args: &mut [Value],
) -> ProxyResult<Value> {
    check_receiver(method, receiver)?;
    invoke_method(method, receiver, type_args, args)
}

/// Run the most-derived implementation of `method` for `receiver`'s runtime type
pub fn invoke_virtual(
    method: &MethodRef,
    receiver: &ObjectRef,
    type_args: &[TypeRef],
    args: &mut [Value],
) -> ProxyResult<Value> {
    check_receiver(method, receiver)?;
    let target = receiver.class().resolve_override(method)?;
    if target.id() != method.id() {
        trace!(
            method = method.name(),
            resolved = %target.declaring().full_name,
            "resolved override"
        );
    }
    invoke_method(&target, receiver, type_args, args)
}

/// Validate generic and regular arguments, then execute the body
pub fn invoke_method(
    method: &MethodRef,
    receiver: &ObjectRef,
    type_args: &[TypeRef],
    args: &mut [Value],
) -> ProxyResult<Value> {
    method.bind_generic(type_args)?;
    method.check_arguments(type_args, args)?;
    match method.body() {
        MethodBody::Native(f) => {
            let mut invocation = Invocation::new(method, type_args, args);
            f(receiver, &mut invocation)
        }
        MethodBody::Emitted(body) => {
            let mut invocation = Invocation::new(method, type_args, args);
            interpreter::execute(body, receiver, &mut invocation)
        }
        MethodBody::Abstract => Err(ProxyError::AbstractCall {
            method: method.name().to_string(),
        }),
    }
}
