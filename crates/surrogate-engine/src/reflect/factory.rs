//! Proxy creation entry point.

use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::debug;

use super::dispatch;
use super::proxy::{ProxyObject, TypedProxy};
use super::registry::TypeRegistry;
use super::type_builder::ProxyTypeBuilder;
use crate::config::ProxyConfig;
use crate::error::{ProxyError, ProxyResult};
use crate::object::{FieldStorage, ObjectRef, Reflect, TypeRef, Value};

static GLOBAL: Lazy<ProxyFactory> = Lazy::new(|| ProxyFactory::new(ProxyConfig::default()));

/// Creates proxies, building each proxy type once per source type
#[derive(Debug, Clone)]
pub struct ProxyFactory {
    config: ProxyConfig,
    registry: Arc<TypeRegistry>,
}

impl ProxyFactory {
    /// Create a factory with its own registry
    pub fn new(config: ProxyConfig) -> Self {
        let registry = Arc::new(TypeRegistry::new(config.module_name.clone()));
        Self { config, registry }
    }

    /// Create a factory sharing `registry`
    pub fn with_registry(config: ProxyConfig, registry: Arc<TypeRegistry>) -> Self {
        Self { config, registry }
    }

    /// The process-wide factory, created with the default configuration on first use
    pub fn global() -> &'static ProxyFactory {
        &GLOBAL
    }

    /// Active configuration
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Type registry
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// The proxy type for `source`, built on first request
    pub fn proxy_type_for(&self, source: &TypeRef) -> ProxyResult<TypeRef> {
        ProxyTypeBuilder::check_source(source)?;
        let name = self.config.derived_name(&source.full_name());
        self.registry.get_or_build(&name, || {
            let ty = ProxyTypeBuilder::new(source, name.as_str(), &self.config)
                .build()?
                .finalize()?;
            debug!(proxy = %ty, methods = ty.declared_methods().len(), "built proxy type");
            Ok(ty)
        })
    }

    /// Wrap `instance`, using its runtime type as the source type
    pub fn create_proxy(&self, instance: &ObjectRef) -> ProxyResult<ProxyObject> {
        self.create_proxy_as(instance.class(), instance)
    }

    /// Wrap `instance` as `declared`; the root object type stands for the
    /// instance's runtime type
    pub fn create_proxy_as(&self, declared: &TypeRef, instance: &ObjectRef) -> ProxyResult<ProxyObject> {
        let source = if declared.is_root() {
            instance.class().clone()
        } else {
            declared.clone()
        };
        if !instance.is_instance_of(&source) {
            return Err(ProxyError::InvalidReceiver {
                expected: source.full_name(),
                got: instance.class().full_name(),
            });
        }

        let proxy_type = self.proxy_type_for(&source)?;
        let ctor = proxy_type
            .constructor()
            .filter(|c| {
                c.parameters().len() == 1
                    && c.parameters()[0]
                        .ty
                        .resolve(&[])
                        .map(|t| t.same_type(&source))
                        .unwrap_or(false)
            })
            .cloned()
            .ok_or_else(|| ProxyError::ConstructorMismatch {
                type_name: proxy_type.full_name(),
                expected: source.full_name(),
            })?;

        let object = ObjectRef::new(proxy_type.clone(), FieldStorage::new(proxy_type.fields()));
        dispatch::invoke_direct(&ctor, &object, &[], &mut [Value::Object(instance.clone())])?;
        Ok(ProxyObject::new(object, source))
    }

    /// Wrap a Rust value whose type publishes its descriptor
    pub fn create_typed<T: Reflect>(&self, value: Arc<T>) -> ProxyResult<TypedProxy<T>> {
        let instance = ObjectRef::reflect_arc(value);
        let proxy = self.create_proxy_as(&T::reflect_type(), &instance)?;
        Ok(TypedProxy::new(proxy))
    }
}

impl Default for ProxyFactory {
    fn default() -> Self {
        Self::new(ProxyConfig::default())
    }
}
