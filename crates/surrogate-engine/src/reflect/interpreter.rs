//! Executes emitted method bodies.
//!
//! A frame holds the receiver, the caller's argument slice, the bound generic
//! arguments, locals and an operand stack. Loading a by-reference argument
//! pushes its address; when that address is passed to a call, the callee's
//! final value is written back into the caller's slot.

use super::dispatch;
use super::emit::{CallTarget, EmittedBody, Instruction};
use crate::error::{ProxyError, ProxyResult};
use crate::object::{FieldStorage, Invocation, ObjectRef, TypeRef, Value};

/// Operand stack entry
#[derive(Debug, Clone)]
enum Slot {
    Value(Value),
    ArgAddress(usize),
}

struct Frame<'f, 'a> {
    body: &'f EmittedBody,
    this: &'f ObjectRef,
    invocation: &'f mut Invocation<'a>,
    type_args: Vec<TypeRef>,
    by_ref: Vec<bool>,
    locals: Vec<Value>,
    stack: Vec<Slot>,
}

impl<'f, 'a> Frame<'f, 'a> {
    fn fault(&self, reason: impl Into<String>) -> ProxyError {
        ProxyError::InvalidBody {
            method: self.body.name.clone(),
            reason: reason.into(),
        }
    }

    fn pop(&mut self) -> ProxyResult<Slot> {
        self.stack.pop().ok_or_else(|| self.fault("stack underflow"))
    }

    fn resolve(&self, slot: Slot) -> ProxyResult<Value> {
        match slot {
            Slot::Value(v) => Ok(v),
            Slot::ArgAddress(i) => self.invocation.arg(i).cloned(),
        }
    }

    fn pop_value(&mut self) -> ProxyResult<Value> {
        let slot = self.pop()?;
        self.resolve(slot)
    }

    fn pop_object(&mut self) -> ProxyResult<ObjectRef> {
        match self.pop_value()? {
            Value::Object(o) => Ok(o),
            other => Err(ProxyError::InvalidReceiver {
                expected: "object".to_string(),
                got: other.type_name(),
            }),
        }
    }

    fn checked(&self, value: Value, ty: &TypeRef) -> ProxyResult<Value> {
        if value.conforms_to(ty) {
            Ok(value)
        } else {
            Err(ProxyError::InvalidReceiver {
                expected: ty.full_name(),
                got: value.type_name(),
            })
        }
    }

    fn call(&mut self, target: &CallTarget, is_virtual: bool) -> ProxyResult<()> {
        let count = target.method.parameters().len();
        if self.stack.len() < count + 1 {
            return Err(self.fault("stack underflow at call"));
        }
        let slots = self.stack.split_off(self.stack.len() - count);
        let receiver = self.pop_object()?;

        let mut args = Vec::with_capacity(count);
        for slot in &slots {
            args.push(self.resolve(slot.clone())?);
        }

        let type_args: &[TypeRef] = if target.forward_type_args {
            &self.type_args
        } else {
            &[]
        };
        let result = if is_virtual {
            dispatch::invoke_virtual(&target.method, &receiver, type_args, &mut args)?
        } else {
            dispatch::invoke_direct(&target.method, &receiver, type_args, &mut args)?
        };

        for (slot, value) in slots.iter().zip(args) {
            if let Slot::ArgAddress(i) = slot {
                self.invocation.set_arg(*i, value)?;
            }
        }
        if !target.method.returns_void() {
            self.stack.push(Slot::Value(result));
        }
        Ok(())
    }

    fn run(&mut self) -> ProxyResult<Value> {
        let body = self.body;
        for instruction in body.instructions() {
            match instruction {
                Instruction::LoadThis => {
                    self.stack.push(Slot::Value(Value::Object(self.this.clone())));
                }
                Instruction::LoadArg(n) => {
                    let i = *n as usize;
                    if self.by_ref.get(i).copied().unwrap_or(false) {
                        self.stack.push(Slot::ArgAddress(i));
                    } else {
                        let value = self.invocation.arg(i)?.clone();
                        self.stack.push(Slot::Value(value));
                    }
                }
                Instruction::LoadField(n) => {
                    let obj = self.pop_object()?;
                    let value = obj.expect_payload::<FieldStorage>()?.get(*n as usize)?;
                    self.stack.push(Slot::Value(value));
                }
                Instruction::StoreField(n) => {
                    let value = self.pop_value()?;
                    let obj = self.pop_object()?;
                    obj.expect_payload::<FieldStorage>()?.init(*n as usize, value)?;
                }
                Instruction::Call(target) => self.call(target, false)?,
                Instruction::CallVirtual(target) => self.call(target, true)?,
                Instruction::Box(ty) | Instruction::UnboxAny(ty) | Instruction::CastClass(ty) => {
                    let value = self.pop_value()?;
                    let value = self.checked(value, ty)?;
                    self.stack.push(Slot::Value(value));
                }
                Instruction::StoreLocal(n) => {
                    let value = self.pop_value()?;
                    let index = *n as usize;
                    if index >= self.locals.len() {
                        return Err(self.fault(format!("local {} is not declared", n)));
                    }
                    self.locals[index] = value;
                }
                Instruction::LoadLocal(n) => {
                    let value = self
                        .locals
                        .get(*n as usize)
                        .cloned()
                        .ok_or_else(|| self.fault(format!("local {} is not declared", n)))?;
                    self.stack.push(Slot::Value(value));
                }
                Instruction::Return => {
                    return match self.stack.pop() {
                        Some(slot) => self.resolve(slot),
                        None => Ok(Value::Null),
                    };
                }
            }
        }
        Err(self.fault("execution fell off the end of the body"))
    }
}

/// Execute `body` for `this` with the arguments of `invocation`
pub fn execute(
    body: &EmittedBody,
    this: &ObjectRef,
    invocation: &mut Invocation<'_>,
) -> ProxyResult<Value> {
    let type_args = invocation.type_args().to_vec();
    let by_ref = invocation
        .method()
        .parameters()
        .iter()
        .map(|p| p.ty.is_by_ref())
        .collect();
    let mut frame = Frame {
        body,
        this,
        invocation,
        type_args,
        by_ref,
        locals: vec![Value::Null; body.locals.len()],
        stack: Vec::with_capacity(body.max_stack),
    };
    frame.run()
}
