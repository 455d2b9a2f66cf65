//! Forwarding metadata attached to method descriptors.
//!
//! Attributes are inert declarations read by the proxy builder. A method may
//! carry at most one rename (`MethodName` or `Name`); `Ignore` is only
//! consulted when `ProxyConfig::honor_ignore_marker` is set, and
//! `PropertyName` is recorded but never acted upon.

use crate::error::{ProxyError, ProxyResult};

/// A declarative attribute on a method
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyAttribute {
    /// Rename the implicit forward of this method
    MethodName(String),
    /// General rename; behaves like `MethodName`
    Name(String),
    /// Exclude from forwarding (inert unless configured)
    Ignore,
    /// Rename a forwarded property (properties are not forwarded)
    PropertyName(String),
}

impl ProxyAttribute {
    fn rename(&self) -> Option<&str> {
        match self {
            ProxyAttribute::MethodName(name) | ProxyAttribute::Name(name) => Some(name.as_str()),
            _ => None,
        }
    }

    fn validate(&self) -> ProxyResult<()> {
        match self {
            ProxyAttribute::MethodName(name)
            | ProxyAttribute::Name(name)
            | ProxyAttribute::PropertyName(name)
                if name.trim().is_empty() =>
            {
                Err(ProxyError::InvalidMetadata(
                    "attribute name cannot be empty".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }
}

/// The forwarding record of one method: `{rename_to, excluded_from_forwarding}`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberMetadata {
    attributes: Vec<ProxyAttribute>,
}

impl MemberMetadata {
    /// Create empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an attribute, rejecting empty names and a second rename
    pub fn push(&mut self, method: &str, attribute: ProxyAttribute) -> ProxyResult<()> {
        attribute.validate()?;
        if attribute.rename().is_some() && self.rename_to().is_some() {
            return Err(ProxyError::DuplicateMetadata {
                method: method.to_string(),
            });
        }
        self.attributes.push(attribute);
        Ok(())
    }

    /// Override name for the implicit forward, if any
    pub fn rename_to(&self) -> Option<&str> {
        self.attributes.iter().find_map(ProxyAttribute::rename)
    }

    /// Whether the method carries the ignore marker
    pub fn excluded_from_forwarding(&self) -> bool {
        self.attributes.contains(&ProxyAttribute::Ignore)
    }

    /// All attached attributes in declaration order
    pub fn attributes(&self) -> &[ProxyAttribute] {
        &self.attributes
    }

    /// True when no attribute is attached
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_name_and_name_both_rename() {
        let mut a = MemberMetadata::new();
        a.push("Run0", ProxyAttribute::MethodName("run_proxy".into())).unwrap();
        assert_eq!(a.rename_to(), Some("run_proxy"));

        let mut b = MemberMetadata::new();
        b.push("Run0", ProxyAttribute::Name("run_proxy".into())).unwrap();
        assert_eq!(b.rename_to(), Some("run_proxy"));
    }

    #[test]
    fn test_second_rename_rejected() {
        let mut meta = MemberMetadata::new();
        meta.push("Run0", ProxyAttribute::Name("a".into())).unwrap();
        let err = meta
            .push("Run0", ProxyAttribute::MethodName("b".into()))
            .unwrap_err();
        assert!(matches!(err, ProxyError::DuplicateMetadata { .. }));
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut meta = MemberMetadata::new();
        assert!(meta.push("Run0", ProxyAttribute::Name("  ".into())).is_err());
        assert!(meta.is_empty());
    }

    #[test]
    fn test_property_name_does_not_rename() {
        let mut meta = MemberMetadata::new();
        meta.push("Run0", ProxyAttribute::PropertyName("p".into())).unwrap();
        meta.push("Run0", ProxyAttribute::Ignore).unwrap();
        assert_eq!(meta.rename_to(), None);
        assert!(meta.excluded_from_forwarding());
    }
}
