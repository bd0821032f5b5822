//! Quizbank - quiz generation over a consistent file-backed question bank
//!
//! Quizbank generates quizzes per learning goal through two strategies:
//! retrieval (TF-IDF ranking of existing bank questions) and templates
//! (parameterized formula questions synthesized on demand). Goal
//! registration and removal keep three artifacts consistent on disk: the
//! question bank, the goal registry, and the schema descriptor that
//! request validation consumes.

pub mod config;
pub mod engine;
pub mod error;
pub mod generate;
pub mod goals;
pub mod model;
pub mod store;
pub mod validate;

pub use config::{default_data_dir, quizbank_home, Config};
pub use engine::Engine;
pub use error::{QuizError, Result};
pub use generate::{
    Dispatcher, Formula, Generator, QuestionTemplate, RetrievalGenerator, TemplateGenerator,
};
pub use goals::{GoalManager, GoalMutation};
pub use model::{
    Difficulty, GenerationMode, GenerationRequest, GoalRegistry, Question, QuestionType, Quiz,
    SchemaDescriptor,
};
pub use store::{BankSummary, FileStorage, MemoryStorage, QuestionStore, Storage};
