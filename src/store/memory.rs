//! In-memory storage for testing.
//!
//! Thread-safe implementation of the [`Storage`] trait backed by
//! `RwLock`s. State is lost when the storage is dropped.

use std::sync::RwLock;

use crate::error::Result;
use crate::model::{GoalRegistry, Question, SchemaDescriptor};
use crate::store::Storage;

/// In-memory storage for tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    bank: RwLock<Vec<Question>>,
    registry: RwLock<Option<GoalRegistry>>,
    schema: RwLock<Option<SchemaDescriptor>>,
}

impl MemoryStorage {
    /// Create a new empty in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage pre-seeded with a registry, its mirrored schema,
    /// and a bank.
    pub fn seeded(registry: GoalRegistry, bank: Vec<Question>) -> Self {
        let schema = SchemaDescriptor::from_registry(&registry);
        Self {
            bank: RwLock::new(bank),
            registry: RwLock::new(Some(registry)),
            schema: RwLock::new(Some(schema)),
        }
    }
}

impl Storage for MemoryStorage {
    fn read_bank(&self) -> Result<Vec<Question>> {
        Ok(self.bank.read().unwrap().clone())
    }

    fn write_bank(&self, questions: &[Question]) -> Result<()> {
        *self.bank.write().unwrap() = questions.to_vec();
        Ok(())
    }

    fn read_registry(&self) -> Result<Option<GoalRegistry>> {
        Ok(self.registry.read().unwrap().clone())
    }

    fn write_registry(&self, registry: &GoalRegistry) -> Result<()> {
        *self.registry.write().unwrap() = Some(registry.clone());
        Ok(())
    }

    fn read_schema(&self) -> Result<Option<SchemaDescriptor>> {
        Ok(self.schema.read().unwrap().clone())
    }

    fn write_schema(&self, schema: &SchemaDescriptor) -> Result<()> {
        *self.schema.write().unwrap() = Some(schema.clone());
        Ok(())
    }
}
