use super::definition::OperationSchema;
use crate::error::SchemaError;
use ahash::AHashMap;

/// The set of operations available for the selected environment and interface.
///
/// The registry is only ever replaced wholesale. Anything holding an operation
/// name from before a `load` must look it up again.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    operations: Vec<OperationSchema>,
    index: AHashMap<String, usize>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole registry. On error the previous contents are kept.
    pub fn load(&mut self, operations: Vec<OperationSchema>) -> Result<(), SchemaError> {
        let mut index = AHashMap::with_capacity(operations.len());
        for (position, operation) in operations.iter().enumerate() {
            operation.validate()?;
            if index.insert(operation.name.clone(), position).is_some() {
                return Err(SchemaError::DuplicateOperation(operation.name.clone()));
            }
        }
        log::info!("Loaded {} operation schemas", operations.len());
        self.operations = operations;
        self.index = index;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&OperationSchema> {
        self.index.get(name).map(|&i| &self.operations[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Operation names in backend order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.operations.iter().map(|op| op.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &OperationSchema> {
        self.operations.iter()
    }

    pub fn clear(&mut self) {
        self.operations.clear();
        self.index.clear();
    }
}
