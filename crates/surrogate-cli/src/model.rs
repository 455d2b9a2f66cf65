//! The demonstration model wrapped by `surrogate demo` and `surrogate inspect`.

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use surrogate_engine::{
    types, Deferred, Invocation, MethodBuilder, MethodRef, ObjectRef, ProxyAttribute, ProxyError,
    ProxyResult, Reflect, Sequence, SigType, TypeBuilder, TypeRef, Value,
};

/// Descriptors making up the demo model
#[derive(Debug, Clone)]
pub struct DemoTypes {
    /// `Demo.Program`, the constraint of `Run0`
    pub program: TypeRef,
    /// `Demo.IWriterA`
    pub writer_a: TypeRef,
    /// `Demo.IWriterB`
    pub writer_b: TypeRef,
    /// `Demo.TestModel`
    pub model: TypeRef,
}

static DEMO_TYPES: Lazy<ProxyResult<DemoTypes>> = Lazy::new(describe);

/// The demo descriptors, built on first use
pub fn demo_types() -> ProxyResult<DemoTypes> {
    DEMO_TYPES.clone()
}

fn writer(name: &str) -> ProxyResult<TypeRef> {
    TypeBuilder::interface("Demo", name)
        .with_method(MethodBuilder::new("write").param("value", types::string()))
        .build()
}

/// Lines written by the model, in the order they happened
#[derive(Debug, Default)]
pub struct DemoModel {
    journal: Mutex<Vec<String>>,
}

impl DemoModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn journal(&self) -> Vec<String> {
        self.journal.lock().clone()
    }

    pub fn contains(&self, line: &str) -> bool {
        self.journal.lock().iter().any(|l| l == line)
    }

    fn write(&self, line: impl Into<String>) {
        self.journal.lock().push(line.into());
    }
}

fn model(this: &ObjectRef) -> ProxyResult<Arc<DemoModel>> {
    this.downcast_arc::<DemoModel>()
        .ok_or_else(|| ProxyError::raise("receiver is not a DemoModel"))
}

fn writer_impl(
    prefix: &'static str,
) -> impl Fn(&ObjectRef, &mut Invocation<'_>) -> ProxyResult<Value> + Send + Sync + 'static {
    move |this, call| {
        let value = call.arg(0)?.as_str().unwrap_or_default().to_string();
        model(this)?.write(format!("{}:{}", prefix, value));
        Ok(Value::Null)
    }
}

fn first_method(iface: &TypeRef) -> ProxyResult<MethodRef> {
    iface
        .declared_methods()
        .first()
        .cloned()
        .ok_or_else(|| ProxyError::raise(format!("{} declares no methods", iface)))
}

fn describe() -> ProxyResult<DemoTypes> {
    let program = TypeBuilder::class("Demo", "Program").build()?;
    let writer_a = writer("IWriterA")?;
    let writer_b = writer("IWriterB")?;
    let write_a = first_method(&writer_a)?;
    let write_b = first_method(&writer_b)?;

    let model = TypeBuilder::class("Demo", "TestModel")
        .implements(&writer_a)
        .implements(&writer_b)
        .with_method(
            MethodBuilder::new("Run0")
                .attribute(ProxyAttribute::MethodName("run_proxy".into()))
                .generic("T", vec![program.clone()])
                .native(|this, call| {
                    let ty = call.type_arg(0).map(|t| t.full_name()).unwrap_or_default();
                    model(this)?.write(format!("Run0<{}>", ty));
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
                    if let Some(n) = call.arg(0)?.as_int() {
                        call.set_arg(0, Value::Int(n * 2))?;
                    }
                    Ok(call.arg(0)?.clone())
                }),
        )
        .with_method(MethodBuilder::new("Run1").native(|this, _| {
            model(this)?.write("Run1");
            Ok(Value::Null)
        }))
        .with_method(MethodBuilder::new("Run2").native(|this, _| {
            let m = model(this)?;
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
                    let m = model(this)?;
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
                        std::thread::sleep(Duration::from_millis(10));
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
                .native(|_, _| {
                    let mut yielded = false;
                    Ok(Value::Sequence(Sequence::from_fn(move || {
                        if yielded {
                            return None;
                        }
                        yielded = true;
                        Some(Value::Int(8))
                    })))
                }),
        )
        .with_method(
            MethodBuilder::new("Demo.IWriterA.write")
                .private()
                .param("value", types::string())
                .native(writer_impl("A")),
        )
        .with_method(
            MethodBuilder::new("Demo.IWriterB.write")
                .private()
                .param("value", types::string())
                .native(writer_impl("B")),
        )
        .explicit_impl(&write_a, "Demo.IWriterA.write")
        .explicit_impl(&write_b, "Demo.IWriterB.write")
        .build()?;

    Ok(DemoTypes {
        program,
        writer_a,
        writer_b,
        model,
    })
}

impl Reflect for DemoModel {
    fn reflect_type() -> TypeRef {
        // demo_types() reports a failed build; the root type keeps this infallible
        demo_types()
            .map(|t| t.model)
            .unwrap_or_else(|_| types::object())
    }
}
