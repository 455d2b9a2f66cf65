//! Shared fixtures for integration tests.
//!
//! `TestModel` mirrors the demo model: a renamed constrained generic method,
//! a by-ref generic, void and value methods, deferred results, lazy
//! sequences, and two explicitly implemented writer interfaces.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use surrogate_engine::{
    types, Deferred, MethodBuilder, ObjectRef, ProxyAttribute, Reflect, Sequence, SigType,
    TypeBuilder, TypeRef, Value,
};

static LOGGING: Once = Once::new();

/// Install a test-writer subscriber honoring `RUST_LOG`
pub fn init_test_logging() {
    LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Program / SubProgram: generic constraint fixtures
// ============================================================================

/// `Demo.Program`
pub static PROGRAM: Lazy<TypeRef> = Lazy::new(|| {
    TypeBuilder::class("Demo", "Program")
        .build()
        .expect("Program type")
});

/// `Demo.SubProgram : Demo.Program`
pub static SUB_PROGRAM: Lazy<TypeRef> = Lazy::new(|| {
    TypeBuilder::class("Demo", "SubProgram")
        .extends(&PROGRAM)
        .build()
        .expect("SubProgram type")
});

/// `Demo.Unrelated`
pub static UNRELATED: Lazy<TypeRef> = Lazy::new(|| {
    TypeBuilder::class("Demo", "Unrelated")
        .build()
        .expect("Unrelated type")
});

// ============================================================================
// Writer interfaces
// ============================================================================

/// `Demo.IWriterA { void write(string value) }`
pub static WRITER_A: Lazy<TypeRef> = Lazy::new(|| writer("IWriterA"));

/// `Demo.IWriterB { void write(string value) }`
pub static WRITER_B: Lazy<TypeRef> = Lazy::new(|| writer("IWriterB"));

fn writer(name: &str) -> TypeRef {
    TypeBuilder::interface("Demo", name)
        .with_method(MethodBuilder::new("write").param("value", types::string()))
        .build()
        .expect("writer interface")
}

// ============================================================================
// TestModel
// ============================================================================

/// Payload of `Demo.TestModel` instances
#[derive(Debug, Default)]
pub struct TestModel {
    output: Mutex<Vec<String>>,
    run1_calls: AtomicUsize,
}

impl TestModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines written so far
    pub fn output(&self) -> Vec<String> {
        self.output.lock().clone()
    }

    /// Number of `Run1` executions
    pub fn run1_calls(&self) -> usize {
        self.run1_calls.load(Ordering::SeqCst)
    }

    fn write(&self, line: impl Into<String>) {
        self.output.lock().push(line.into());
    }
}

fn model(this: &ObjectRef) -> surrogate_engine::ProxyResult<&TestModel> {
    this.expect_payload::<TestModel>()
}

fn shared(this: &ObjectRef) -> surrogate_engine::ProxyResult<Arc<TestModel>> {
    this.downcast_arc::<TestModel>()
        .ok_or_else(|| surrogate_engine::ProxyError::raise("not a TestModel"))
}

static TEST_MODEL: Lazy<TypeRef> = Lazy::new(|| {
    let write_a = WRITER_A.declared_methods()[0].clone();
    let write_b = WRITER_B.declared_methods()[0].clone();

    TypeBuilder::class("Demo", "TestModel")
        .implements(&WRITER_A)
        .implements(&WRITER_B)
        .with_method(
            MethodBuilder::new("Run0")
                .attribute(ProxyAttribute::MethodName("run_proxy".into()))
                .generic("T", vec![PROGRAM.clone()])
                .native(|this, call| {
                    let ty = call.type_arg(0).map(|t| t.full_name()).unwrap_or_default();
                    model(this)?.write(ty);
                    Ok(Value::Null)
                }),
        )
        .with_method(
            MethodBuilder::new("Run0_1")
                .generic("T", vec![])
                .returns(SigType::Generic(0))
                .native(|_, _| Ok(Value::Null)),
        )
        .with_method(
            MethodBuilder::new("Run0_2")
                .generic("T", vec![])
                .param_ref("t", SigType::Generic(0))
                .returns_ref(SigType::Generic(0))
                .native(|_, call| {
                    // ints are bumped so the write-back is observable
                    if let Some(n) = call.arg(0)?.as_int() {
                        call.set_arg(0, Value::Int(n + 1))?;
                    }
                    Ok(call.arg(0)?.clone())
                }),
        )
        .with_method(MethodBuilder::new("Run1").native(|this, _| {
            let m = model(this)?;
            m.run1_calls.fetch_add(1, Ordering::SeqCst);
            m.write("Run1");
            Ok(Value::Null)
        }))
        .with_method(MethodBuilder::new("Run2").native(|this, _| {
            let m = shared(this)?;
            Deferred::spawn(move || {
                m.write("Run2");
                Value::Null
            });
            Ok(Value::Null)
        }))
        .with_method(
            MethodBuilder::new("Run3")
                .returns(types::deferred())
                .native(|this, _| {
                    model(this)?.write("Run3");
                    Ok(Value::Deferred(Deferred::completed(Value::Null)))
                }),
        )
        .with_method(
            MethodBuilder::new("Run3_1")
                .returns(types::deferred())
                .native(|this, _| {
                    let m = shared(this)?;
                    Ok(Value::Deferred(Deferred::spawn(move || {
                        m.write("Run3_1");
                        Value::Null
                    })))
                }),
        )
        .with_method(
            MethodBuilder::new("Run4")
                .returns(types::int())
                .native(|_, _| Ok(Value::Int(4))),
        )
        .with_method(
            MethodBuilder::new("Run5")
                .returns(types::deferred())
                .native(|_, _| Ok(Value::Deferred(Deferred::completed(Value::Int(5))))),
        )
        .with_method(
            MethodBuilder::new("Run6")
                .returns(types::deferred())
                .native(|_, _| {
                    Ok(Value::Deferred(Deferred::spawn(|| {
                        std::thread::sleep(Duration::from_millis(1));
                        Value::Int(6)
                    })))
                }),
        )
        .with_method(
            MethodBuilder::new("Run7")
                .returns(types::sequence())
                .native(|_, _| Ok(Value::Sequence(Sequence::new(std::iter::once(Value::Int(7)))))),
        )
        .with_method(
            MethodBuilder::new("Run7_1")
                .returns(types::deferred())
                .native(|_, _| {
                    let seq = Sequence::new(std::iter::once(Value::Int(7)));
                    Ok(Value::Deferred(Deferred::completed(Value::Sequence(seq))))
                }),
        )
        .with_method(
            MethodBuilder::new("Run8")
                .returns(types::sequence())
                .native(|_, _| Ok(Value::Sequence(Sequence::new(std::iter::once(Value::Int(8)))))),
        )
        .with_method(
            MethodBuilder::new("Demo.IWriterA.write")
                .private()
                .param("value", types::string())
                .native(|this, call| {
                    let value = call.arg(0)?.as_str().unwrap_or_default().to_string();
                    model(this)?.write(format!("A:{}", value));
                    Ok(Value::Null)
                }),
        )
        .with_method(
            MethodBuilder::new("Demo.IWriterB.write")
                .private()
                .param("value", types::string())
                .native(|this, call| {
                    let value = call.arg(0)?.as_str().unwrap_or_default().to_string();
                    model(this)?.write(format!("B:{}", value));
                    Ok(Value::Null)
                }),
        )
        .with_method(
            MethodBuilder::new("secret")
                .private()
                .returns(types::int())
                .native(|_, _| Ok(Value::Int(-1))),
        )
        .explicit_impl(&write_a, "Demo.IWriterA.write")
        .explicit_impl(&write_b, "Demo.IWriterB.write")
        .build()
        .expect("TestModel type")
});

impl Reflect for TestModel {
    fn reflect_type() -> TypeRef {
        TEST_MODEL.clone()
    }
}

/// A fresh `TestModel` instance and its shared payload
pub fn test_model() -> (ObjectRef, Arc<TestModel>) {
    let payload = Arc::new(TestModel::new());
    (ObjectRef::reflect_arc(payload.clone()), payload)
}

/// Find a declared or inherited method of `ty` by name
pub fn method_named(ty: &TypeRef, name: &str) -> surrogate_engine::MethodRef {
    ty.instance_methods()
        .into_iter()
        .find(|m| m.name() == name)
        .unwrap_or_else(|| panic!("{} has no method {}", ty, name))
}
