//! Instruction emission for synthesized method bodies
//!
//! `BodyEmitter` is the instruction-level layer under the forwarding
//! synthesizer. It tracks operand stack depth while emitting so a body can be
//! validated before it is attached to a method.
//!
//! ## Instructions
//!
//! | Instruction   | Stack effect         | Description                                   |
//! |---------------|----------------------|-----------------------------------------------|
//! | `LoadThis`    | → this               | Push the receiver                             |
//! | `LoadArg`     | → arg                | Push an argument (its address if by-ref)      |
//! | `LoadField`   | obj → value          | Read a field                                  |
//! | `StoreField`  | obj, value →         | Initialize a field                            |
//! | `Call`        | this, args → [ret]   | Call the named method directly                |
//! | `CallVirtual` | this, args → [ret]   | Call the most-derived override                |
//! | `Box`         | value → value        | Box a value-type payload                      |
//! | `UnboxAny`    | value → value        | Unbox, checking the value type                |
//! | `CastClass`   | value → value        | Reference cast, checking the type             |
//! | `StoreLocal`  | value →              | Pop into a local                              |
//! | `LoadLocal`   | → value              | Push a local                                  |
//! | `Return`      | [value] →            | Return the top of stack, or nothing           |

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{ProxyError, ProxyResult};
use crate::object::{MethodRef, SigType, TypeRef};

/// Global counter for emitted body IDs
static NEXT_BODY_ID: AtomicUsize = AtomicUsize::new(1);

/// Generate a unique body ID
fn generate_body_id() -> usize {
    NEXT_BODY_ID.fetch_add(1, Ordering::Relaxed)
}

/// Target of a call instruction
#[derive(Debug, Clone)]
pub struct CallTarget {
    /// Method to call
    pub method: MethodRef,
    /// Pass the executing frame's generic arguments through to the callee
    pub forward_type_args: bool,
}

/// A single instruction
#[derive(Debug, Clone)]
pub enum Instruction {
    /// Push the receiver
    LoadThis,
    /// Push argument `n`
    LoadArg(u16),
    /// Pop an object, push field `n`
    LoadField(u16),
    /// Pop a value and an object, initialize field `n`
    StoreField(u16),
    /// Direct call
    Call(CallTarget),
    /// Virtual or interface call
    CallVirtual(CallTarget),
    /// Box a value-type payload
    Box(TypeRef),
    /// Unbox a value-type payload
    UnboxAny(TypeRef),
    /// Checked reference cast
    CastClass(TypeRef),
    /// Pop into local `n`
    StoreLocal(u16),
    /// Push local `n`
    LoadLocal(u16),
    /// Return
    Return,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::LoadThis => write!(f, "ldarg.this"),
            Instruction::LoadArg(n) => write!(f, "ldarg {}", n),
            Instruction::LoadField(n) => write!(f, "ldfld {}", n),
            Instruction::StoreField(n) => write!(f, "stfld {}", n),
            Instruction::Call(t) => write!(f, "call {}::{}", t.method.declaring().full_name, t.method.name()),
            Instruction::CallVirtual(t) => {
                write!(f, "callvirt {}::{}", t.method.declaring().full_name, t.method.name())
            }
            Instruction::Box(t) => write!(f, "box {}", t),
            Instruction::UnboxAny(t) => write!(f, "unbox.any {}", t),
            Instruction::CastClass(t) => write!(f, "castclass {}", t),
            Instruction::StoreLocal(n) => write!(f, "stloc {}", n),
            Instruction::LoadLocal(n) => write!(f, "ldloc {}", n),
            Instruction::Return => write!(f, "ret"),
        }
    }
}

/// A validated instruction body
#[derive(Debug, Clone)]
pub struct EmittedBody {
    /// Unique body ID
    pub id: usize,
    /// Name of the method the body belongs to
    pub name: String,
    /// Number of declared parameters
    pub param_count: usize,
    /// Declared locals
    pub locals: Vec<SigType>,
    /// Maximum operand stack depth
    pub max_stack: usize,
    instructions: Vec<Instruction>,
}

impl EmittedBody {
    /// Instructions in order
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Instruction count
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// True for an empty body
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// One instruction per line
    pub fn disassemble(&self) -> Vec<String> {
        self.instructions
            .iter()
            .enumerate()
            .map(|(i, ins)| format!("IL_{:04}: {}", i, ins))
            .collect()
    }
}

/// Builder for method bodies
#[derive(Debug)]
pub struct BodyEmitter {
    name: String,
    param_count: usize,
    instructions: Vec<Instruction>,
    locals: Vec<SigType>,
    depth: usize,
    max_depth: usize,
    errors: Vec<String>,
    validate: bool,
}

impl BodyEmitter {
    /// Create an emitter for a method with `param_count` parameters
    pub fn new(name: impl Into<String>, param_count: usize) -> Self {
        Self {
            name: name.into(),
            param_count,
            instructions: Vec::with_capacity(16),
            locals: Vec::new(),
            depth: 0,
            max_depth: 0,
            errors: Vec::new(),
            validate: true,
        }
    }

    /// Skip stack validation in `build`
    pub fn without_validation(mut self) -> Self {
        self.validate = false;
        self
    }

    fn push(&mut self, n: usize) {
        self.depth += n;
        self.max_depth = self.max_depth.max(self.depth);
    }

    fn pop(&mut self, n: usize) {
        if self.depth < n {
            self.errors.push(format!(
                "stack underflow at instruction {}",
                self.instructions.len()
            ));
            self.depth = 0;
        } else {
            self.depth -= n;
        }
    }

    /// Emit one instruction, tracking its stack effect
    pub fn emit(&mut self, instruction: Instruction) {
        match &instruction {
            Instruction::LoadThis | Instruction::LoadLocal(_) => self.push(1),
            Instruction::LoadArg(n) => {
                if *n as usize >= self.param_count {
                    self.errors.push(format!("argument {} out of range", n));
                }
                self.push(1);
            }
            Instruction::LoadField(_)
            | Instruction::Box(_)
            | Instruction::UnboxAny(_)
            | Instruction::CastClass(_) => {
                self.pop(1);
                self.push(1);
            }
            Instruction::StoreField(_) => self.pop(2),
            Instruction::StoreLocal(n) => {
                if *n as usize >= self.locals.len() {
                    self.errors.push(format!("local {} is not declared", n));
                }
                self.pop(1);
            }
            Instruction::Call(target) | Instruction::CallVirtual(target) => {
                self.pop(target.method.parameters().len() + 1);
                if !target.method.returns_void() {
                    self.push(1);
                }
            }
            Instruction::Return => {
                if self.depth > 1 {
                    self.errors.push(format!(
                        "stack not balanced at return: {} values remaining",
                        self.depth
                    ));
                }
                self.depth = 0;
            }
        }
        self.instructions.push(instruction);
    }

    /// Declare a local, returning its index
    pub fn declare_local(&mut self, ty: SigType) -> u16 {
        self.locals.push(ty);
        (self.locals.len() - 1) as u16
    }

    /// Emit a call to `method`: direct for value-type declaring types,
    /// virtual otherwise
    pub fn emit_call(&mut self, method: &MethodRef, forward_type_args: bool) {
        let target = CallTarget {
            method: method.clone(),
            forward_type_args,
        };
        if method.declaring().is_value_type() {
            self.emit(Instruction::Call(target));
        } else {
            self.emit(Instruction::CallVirtual(target));
        }
    }

    /// Box the top of stack if `ty` is a value type
    pub fn emit_box(&mut self, ty: &TypeRef) {
        if ty.is_value_type() {
            self.emit(Instruction::Box(ty.clone()));
        }
    }

    /// Convert the top of stack to `ty`: unbox for value types, cast otherwise
    pub fn emit_unbox(&mut self, ty: &TypeRef) {
        if ty.is_value_type() {
            self.emit(Instruction::UnboxAny(ty.clone()));
        } else {
            self.emit(Instruction::CastClass(ty.clone()));
        }
    }

    /// Validate and produce the body
    pub fn build(mut self) -> ProxyResult<EmittedBody> {
        if self.validate {
            if !matches!(self.instructions.last(), Some(Instruction::Return)) {
                self.errors.push("body does not end with a return".to_string());
            }
            if !self.errors.is_empty() {
                return Err(ProxyError::InvalidBody {
                    method: self.name,
                    reason: self.errors.join("; "),
                });
            }
        }
        Ok(EmittedBody {
            id: generate_body_id(),
            name: self.name,
            param_count: self.param_count,
            locals: self.locals,
            max_stack: self.max_depth,
            instructions: self.instructions,
        })
    }
}
