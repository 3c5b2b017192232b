//! Shared helpers for converter tests.

use crate::converter::ConversionError;
use crate::info::TypeDesc;
use crate::mapper::ObjectMapper;
use crate::registry::TypeRegistry;
use crate::value::Value;

pub(crate) struct Harness {
    pub mapper: ObjectMapper,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(|_| {})
    }

    pub fn with(setup: impl FnOnce(&mut TypeRegistry)) -> Self {
        let mut registry = TypeRegistry::new();
        setup(&mut registry);
        Self {
            mapper: ObjectMapper::standard(registry),
        }
    }

    pub fn deserialize(&self, value: Value, datatype: TypeDesc) -> Result<Value, ConversionError> {
        self.mapper.deserialize(&value, &datatype)
    }

    pub fn serialize(&self, value: Value, datatype: TypeDesc) -> Result<Value, ConversionError> {
        self.mapper.serialize(&value, &datatype)
    }
}
