//! Names and accessibility of generated forwarding methods.

use super::interface_map::InterfaceMapEntry;
use crate::object::{MethodDescriptor, Visibility};

/// Name and accessibility chosen for one forwarding method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    /// Method name on the proxy type
    pub name: String,
    /// Accessibility on the proxy type
    pub visibility: Visibility,
    /// Dispatched through the virtual table
    pub is_virtual: bool,
    /// Reachable only through the interface it implements
    pub explicit: bool,
}

impl ResolvedName {
    /// Interface-qualified, private form for `entry`
    pub fn qualified(entry: &InterfaceMapEntry) -> Self {
        ResolvedName {
            name: qualified_name(entry),
            visibility: Visibility::Private,
            is_virtual: true,
            explicit: true,
        }
    }
}

/// `<interface full name>.<interface method name>`
pub fn qualified_name(entry: &InterfaceMapEntry) -> String {
    format!(
        "{}.{}",
        entry.interface.full_name(),
        entry.interface_method.name()
    )
}

/// Resolve the forwarding name of `method`, optionally satisfying `entry`.
///
/// A method that is not public can only be exposed as an explicit,
/// interface-qualified implementation. Anything else keeps its rename
/// (`MethodName`/`Name`) or its original name, and its accessibility.
pub fn resolve(method: &MethodDescriptor, entry: Option<&InterfaceMapEntry>) -> ResolvedName {
    match entry {
        Some(entry) if !method.is_public() => ResolvedName::qualified(entry),
        _ => ResolvedName {
            name: method
                .metadata()
                .rename_to()
                .unwrap_or(method.name())
                .to_string(),
            visibility: method.visibility(),
            is_virtual: method.is_virtual() || entry.is_some(),
            explicit: false,
        },
    }
}
