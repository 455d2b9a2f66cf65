//! Field storage for instances of synthesized types.

use once_cell::sync::OnceCell;

use super::class::FieldDescriptor;
use super::value::Value;
use crate::error::{ProxyError, ProxyResult};

/// Field slots of an object whose type was built at run time.
///
/// Every slot is written at most once; synthesized types only declare
/// init-only fields.
#[derive(Debug)]
pub struct FieldStorage {
    names: Vec<String>,
    slots: Box<[OnceCell<Value>]>,
}

impl FieldStorage {
    /// Allocate empty slots for `fields`
    pub fn new(fields: &[FieldDescriptor]) -> Self {
        Self {
            names: fields.iter().map(|f| f.name.clone()).collect(),
            slots: fields.iter().map(|_| OnceCell::new()).collect(),
        }
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when the type declares no fields
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn name(&self, index: usize) -> String {
        self.names
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("#{}", index))
    }

    /// Read the slot at `index`
    pub fn get(&self, index: usize) -> ProxyResult<Value> {
        self.slots
            .get(index)
            .and_then(OnceCell::get)
            .cloned()
            .ok_or_else(|| ProxyError::FieldNotInitialized {
                field: self.name(index),
            })
    }

    /// Initialize the slot at `index`
    pub fn init(&self, index: usize, value: Value) -> ProxyResult<()> {
        let slot = self
            .slots
            .get(index)
            .ok_or_else(|| ProxyError::FieldNotInitialized {
                field: self.name(index),
            })?;
        slot.set(value)
            .map_err(|_| ProxyError::FieldAlreadyInitialized {
                field: self.name(index),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::class::types;

    #[test]
    fn test_init_once() {
        let storage = FieldStorage::new(&[FieldDescriptor::new("_object", types::object())]);
        assert!(matches!(
            storage.get(0),
            Err(ProxyError::FieldNotInitialized { .. })
        ));
        storage.init(0, Value::Int(1)).unwrap();
        assert_eq!(storage.get(0).unwrap(), Value::Int(1));

        let err = storage.init(0, Value::Int(2)).unwrap_err();
        assert_eq!(
            err,
            ProxyError::FieldAlreadyInitialized {
                field: "_object".to_string()
            }
        );
        assert_eq!(storage.get(0).unwrap(), Value::Int(1));
    }

    #[test]
    fn test_out_of_range() {
        let storage = FieldStorage::new(&[]);
        assert!(storage.is_empty());
        assert!(storage.get(3).is_err());
        assert!(storage.init(3, Value::Null).is_err());
    }
}
