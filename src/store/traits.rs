//! Persistence adapter trait for the three backing artifacts.
//!
//! The engine never assumes a concrete file format beyond "ordered list of
//! question records" for the bank and "set of goal strings" for the
//! registry and schema. `write_*` implementations must provide atomic
//! replace semantics: a reader never observes a partially written file.

use std::sync::Arc;

use crate::error::Result;
use crate::model::{GoalRegistry, Question, SchemaDescriptor};

/// Storage backend for the bank, registry, and schema artifacts.
///
/// `read_registry`/`read_schema` return `Ok(None)` when the artifact has
/// never been written, letting the caller distinguish "not yet
/// initialized" from "legitimately empty".
pub trait Storage: Send + Sync {
    /// Read the full ordered question bank. Missing bank reads as empty.
    fn read_bank(&self) -> Result<Vec<Question>>;

    /// Replace the question bank atomically.
    fn write_bank(&self, questions: &[Question]) -> Result<()>;

    /// Read the goal registry, or `None` if never written.
    fn read_registry(&self) -> Result<Option<GoalRegistry>>;

    /// Replace the goal registry atomically.
    fn write_registry(&self, registry: &GoalRegistry) -> Result<()>;

    /// Read the goal schema descriptor, or `None` if never written.
    fn read_schema(&self) -> Result<Option<SchemaDescriptor>>;

    /// Replace the goal schema descriptor atomically.
    fn write_schema(&self, schema: &SchemaDescriptor) -> Result<()>;
}

/// Blanket implementation for Arc-wrapped storages.
///
/// Allows sharing one storage between the question store, the goal
/// manager, and tests.
impl<T: Storage + ?Sized> Storage for Arc<T> {
    fn read_bank(&self) -> Result<Vec<Question>> {
        (**self).read_bank()
    }

    fn write_bank(&self, questions: &[Question]) -> Result<()> {
        (**self).write_bank(questions)
    }

    fn read_registry(&self) -> Result<Option<GoalRegistry>> {
        (**self).read_registry()
    }

    fn write_registry(&self, registry: &GoalRegistry) -> Result<()> {
        (**self).write_registry(registry)
    }

    fn read_schema(&self) -> Result<Option<SchemaDescriptor>> {
        (**self).read_schema()
    }

    fn write_schema(&self, schema: &SchemaDescriptor) -> Result<()> {
        (**self).write_schema(schema)
    }
}
