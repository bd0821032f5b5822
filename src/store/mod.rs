//! Persistence and caching for the question bank and goal artifacts.

pub mod cache;
pub mod file;
pub mod memory;
pub mod question_store;
pub mod traits;

pub use cache::{CachedPool, PoolCache};
pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use question_store::{BankSummary, QuestionStore};
pub use traits::Storage;
