//! The generic wrapper contract `Surrogate.ObjectProxy[T]`.
//!
//! Every proxy type implements the contract constructed over its source
//! type. The contract declares a single accessor, `get_object`, returning the
//! wrapped instance typed as `T`.

use once_cell::sync::Lazy;

use crate::defaults::{CONTRACT_ACCESSOR, CONTRACT_NAME, CONTRACT_NAMESPACE};
use crate::error::{ProxyError, ProxyResult};
use crate::object::{types, MethodBuilder, MethodRef, TypeBuilder, TypeKey, TypeRef};

static DEFINITION: Lazy<Option<TypeRef>> = Lazy::new(|| {
    TypeBuilder::interface(CONTRACT_NAMESPACE, CONTRACT_NAME)
        .generic_parameter("T")
        .with_method(MethodBuilder::new(CONTRACT_ACCESSOR).returns(types::object()))
        .build()
        .ok()
});

/// The open generic definition `Surrogate.ObjectProxy`
pub fn definition() -> ProxyResult<TypeRef> {
    DEFINITION
        .as_ref()
        .cloned()
        .ok_or_else(|| ProxyError::InvalidTypeDefinition {
            type_name: format!("{}.{}", CONTRACT_NAMESPACE, CONTRACT_NAME),
            reason: "wrapper contract failed to build".to_string(),
        })
}

/// `Surrogate.ObjectProxy[source]`
///
/// Constructed types compare structurally, so every call yields a type equal
/// to the one a proxy was built with.
pub fn construct(source: &TypeRef) -> ProxyResult<TypeRef> {
    let definition = definition()?;
    TypeBuilder::construct(&definition, vec![source.clone()])
        .with_method(MethodBuilder::new(CONTRACT_ACCESSOR).returns(source))
        .build()
}

/// The `get_object` method of a constructed contract
pub fn accessor(contract: &TypeRef) -> ProxyResult<MethodRef> {
    contract
        .declared_methods()
        .iter()
        .find(|m| m.name() == CONTRACT_ACCESSOR)
        .cloned()
        .ok_or_else(|| ProxyError::MethodNotFound {
            type_name: contract.full_name(),
            name: CONTRACT_ACCESSOR.to_string(),
        })
}

/// Whether `ty` is some construction of the wrapper contract
pub fn is_contract(ty: &TypeRef) -> bool {
    match definition() {
        Ok(def) => matches!(ty.key(), TypeKey::Constructed(id, _) if id == def.id()),
        Err(_) => false,
    }
}

/// Proxy types name their accessor after the contract: `<contract>.get_object`
pub fn accessor_name(contract: &TypeRef) -> String {
    format!("{}.{}", contract.full_name(), CONTRACT_ACCESSOR)
}
