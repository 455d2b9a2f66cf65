//! `surrogate demo`: wrap the demo model and call every forward.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use surrogate_engine::{ObjectProxy, ProxyConfig, ProxyFactory, Value};

use crate::model::{demo_types, DemoModel};
use crate::output::{describe_value, StyledOutput};

const WAIT: Duration = Duration::from_secs(5);

fn step(out: &mut StyledOutput, label: &str, value: &str) {
    out.field(label, value, 22);
}

fn await_value(value: &Value) -> anyhow::Result<Value> {
    let deferred = value
        .as_deferred()
        .with_context(|| format!("expected a deferred result, got {}", describe_value(value)))?;
    deferred
        .wait_timeout(WAIT)
        .context("deferred result did not complete in time")
}

fn drain(value: &Value) -> anyhow::Result<String> {
    let seq = value
        .as_sequence()
        .with_context(|| format!("expected a sequence, got {}", describe_value(value)))?;
    let items: Vec<String> = seq.drain().iter().map(describe_value).collect();
    Ok(format!("[{}]", items.join(", ")))
}

pub fn execute(config: ProxyConfig, out: &mut StyledOutput) -> anyhow::Result<()> {
    let types = demo_types()?;
    let factory = ProxyFactory::new(config);
    let payload = Arc::new(DemoModel::new());
    let proxy = factory.create_typed(payload.clone())?;

    out.heading(&format!("{} -> {}", proxy.source_type(), proxy.proxy_type()));

    proxy.invoke("run_proxy", &[types.program.clone()], vec![])?;
    step(out, "run_proxy<Program>", "ok");

    let result = proxy.invoke("Run0_1", &[types.program.clone()], vec![])?;
    step(out, "Run0_1<Program>", &describe_value(&result));

    // by-ref forwards are only reachable through a resolved handle
    let handle = proxy
        .method("Run0_2")?
        .make_generic(vec![surrogate_engine::types::int()])?;
    let mut args = [Value::Int(21)];
    let result = handle.invoke(proxy.instance(), &mut args)?;
    step(
        out,
        "Run0_2<int>(ref 21)",
        &format!("{} (ref now {})", describe_value(&result), describe_value(&args[0])),
    );

    proxy.call("Run1", vec![])?;
    step(out, "Run1", "ok");

    proxy.call("Run2", vec![])?;
    let deadline = Instant::now() + WAIT;
    while !payload.contains("Run2") {
        if Instant::now() >= deadline {
            bail!("Run2 did not run in time");
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    step(out, "Run2", "ok");

    await_value(&proxy.call("Run3", vec![])?)?;
    step(out, "Run3", "ok");
    await_value(&proxy.call("Run3_1", vec![])?)?;
    step(out, "Run3_1", "ok");

    let result = proxy.call("Run4", vec![])?;
    step(out, "Run4", &describe_value(&result));

    let result = await_value(&proxy.call("Run5", vec![])?)?;
    step(out, "Run5", &describe_value(&result));
    let result = await_value(&proxy.call("Run6", vec![])?)?;
    step(out, "Run6", &describe_value(&result));

    step(out, "Run7", &drain(&proxy.call("Run7", vec![])?)?);
    let inner = await_value(&proxy.call("Run7_1", vec![])?)?;
    step(out, "Run7_1", &drain(&inner)?);
    step(out, "Run8", &drain(&proxy.call("Run8", vec![])?)?);

    proxy.as_interface(&types.writer_a)?.call("write", vec![Value::string("hello")])?;
    proxy.as_interface(&types.writer_b)?.call("write", vec![Value::string("hello")])?;
    step(out, "IWriterA/IWriterB.write", "ok");

    let same = Arc::ptr_eq(&proxy.object()?, &payload);
    step(out, "get_object", if same { "same instance" } else { "different instance" });
    if !same {
        bail!("proxy does not wrap the original instance");
    }

    out.newline();
    out.heading("Journal");
    for line in payload.journal() {
        out.plain("  ");
        out.plain(&line);
        out.newline();
    }
    out.newline();
    out.success("done");
    out.newline();
    out.flush();
    Ok(())
}
