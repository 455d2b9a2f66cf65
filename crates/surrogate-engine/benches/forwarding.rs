use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use surrogate_engine::{
    types, MethodBuilder, ObjectRef, ProxyConfig, ProxyFactory, TypeBuilder, TypeRef, Value,
};

fn calculator() -> TypeRef {
    TypeBuilder::class("Bench", "Calculator")
        .with_method(
            MethodBuilder::new("answer")
                .returns(types::int())
                .native(|_, _| Ok(Value::Int(42))),
        )
        .with_method(
            MethodBuilder::new("add")
                .param("a", types::int())
                .param("b", types::int())
                .returns(types::int())
                .native(|_, call| {
                    let a = call.arg(0)?.as_int().unwrap_or_default();
                    let b = call.arg(1)?.as_int().unwrap_or_default();
                    Ok(Value::Int(a + b))
                }),
        )
        .build()
        .unwrap()
}

fn bench_dispatch(c: &mut Criterion) {
    let instance = ObjectRef::new(calculator(), ());
    let factory = ProxyFactory::new(ProxyConfig::default());
    let proxy = factory.create_proxy(&instance).unwrap();

    let mut group = c.benchmark_group("dispatch");

    group.bench_function(BenchmarkId::new("late_bound", "direct"), |b| {
        b.iter(|| instance.invoke(black_box("answer"), &[], vec![]).unwrap());
    });
    group.bench_function(BenchmarkId::new("late_bound", "forwarded"), |b| {
        b.iter(|| proxy.call(black_box("answer"), vec![]).unwrap());
    });

    let handle = proxy.method("add").unwrap();
    group.bench_function(BenchmarkId::new("handle", "forwarded"), |b| {
        b.iter(|| {
            let mut args = [Value::Int(black_box(2)), Value::Int(3)];
            handle.invoke(proxy.instance(), &mut args).unwrap()
        });
    });

    group.finish();
}

fn bench_synthesis(c: &mut Criterion) {
    let source = calculator();
    let instance = ObjectRef::new(source, ());

    c.bench_function("synthesize_proxy_type", |b| {
        b.iter(|| {
            let factory = ProxyFactory::new(ProxyConfig::default());
            factory.create_proxy(black_box(&instance)).unwrap()
        });
    });

    let cached = ProxyFactory::new(ProxyConfig::default());
    cached.create_proxy(&instance).unwrap();
    c.bench_function("create_proxy_cached", |b| {
        b.iter(|| cached.create_proxy(black_box(&instance)).unwrap());
    });
}

criterion_group!(benches, bench_dispatch, bench_synthesis);
criterion_main!(benches);
