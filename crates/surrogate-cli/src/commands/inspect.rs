//! `surrogate inspect`: print the layout of the synthesized demo proxy type.

use serde::Serialize;
use surrogate_engine::object::MethodBody;
use surrogate_engine::{MethodRef, ProxyConfig, ProxyFactory, TypeRef};

use crate::model::demo_types;
use crate::output::StyledOutput;

#[derive(Debug, Serialize)]
pub struct ProxyLayout {
    pub name: String,
    pub source: String,
    pub module: String,
    pub sealed: bool,
    pub interfaces: Vec<String>,
    pub fields: Vec<FieldLayout>,
    pub constructor: Option<MethodLayout>,
    pub methods: Vec<MethodLayout>,
}

#[derive(Debug, Serialize)]
pub struct FieldLayout {
    pub name: String,
    pub ty: String,
    pub visibility: String,
    pub init_only: bool,
}

#[derive(Debug, Serialize)]
pub struct MethodLayout {
    pub name: String,
    pub signature: String,
    pub visibility: String,
    pub is_virtual: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implements: Option<String>,
    pub body: Vec<String>,
}

fn method_layout(ty: &TypeRef, method: &MethodRef) -> MethodLayout {
    let implements = ty
        .explicit_impls()
        .iter()
        .find(|i| i.target.id() == method.id())
        .map(|i| {
            format!(
                "{}.{}",
                i.interface_method.declaring().full_name,
                i.interface_method.name()
            )
        });
    let body = match method.body() {
        MethodBody::Emitted(body) => body.disassemble(),
        _ => Vec::new(),
    };
    MethodLayout {
        name: method.name().to_string(),
        signature: method.signature(),
        visibility: method.visibility().to_string(),
        is_virtual: method.is_virtual(),
        implements,
        body,
    }
}

/// Layout of the proxy type `factory` builds for the demo model
pub fn layout(factory: &ProxyFactory) -> anyhow::Result<ProxyLayout> {
    let source = demo_types()?.model;
    let ty = factory.proxy_type_for(&source)?;

    Ok(ProxyLayout {
        name: ty.full_name(),
        source: source.full_name(),
        module: factory.registry().module().name().to_string(),
        sealed: ty.is_sealed(),
        interfaces: ty.interfaces().iter().map(|i| i.full_name()).collect(),
        fields: ty
            .fields()
            .iter()
            .map(|f| FieldLayout {
                name: f.name.clone(),
                ty: f.ty.full_name(),
                visibility: f.visibility.to_string(),
                init_only: f.init_only,
            })
            .collect(),
        constructor: ty.constructor().map(|c| method_layout(&ty, c)),
        methods: ty
            .declared_methods()
            .iter()
            .map(|m| method_layout(&ty, m))
            .collect(),
    })
}

pub fn execute(config: ProxyConfig, json: bool, out: &mut StyledOutput) -> anyhow::Result<()> {
    let factory = ProxyFactory::new(config);
    let layout = layout(&factory)?;

    if json {
        out.plain(&serde_json::to_string_pretty(&layout)?);
        out.newline();
        out.flush();
        return Ok(());
    }

    out.heading(&layout.name);
    out.field("source", &layout.source, 12);
    out.field("module", &layout.module, 12);
    out.field("sealed", &layout.sealed.to_string(), 12);
    out.field("interfaces", &layout.interfaces.join(", "), 12);
    for field in &layout.fields {
        let flags = if field.init_only { " init-only" } else { "" };
        out.field(
            "field",
            &format!("{} {} {}{}", field.visibility, field.ty, field.name, flags),
            12,
        );
    }

    out.newline();
    for method in layout.constructor.iter().chain(&layout.methods) {
        out.info(&method.visibility);
        if method.is_virtual {
            out.plain(" virtual");
        }
        out.plain(" ");
        out.bold(&method.signature);
        if let Some(implements) = &method.implements {
            out.plain(&format!("  implements {}", implements));
        }
        out.newline();
        for line in &method.body {
            out.plain("    ");
            out.plain(line);
            out.newline();
        }
    }
    out.flush();
    Ok(())
}
