//! The engine facade wiring storage, the question store, the generation
//! dispatcher, and the goal manager into one handle.
//!
//! Opening the engine against an empty data directory seeds the registry
//! and schema from the configured goal list, so a fresh deployment can
//! generate immediately. Nothing else reads the config's goal list; after
//! seeding, the registry file is the authority.

use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::generate::Dispatcher;
use crate::goals::{GoalManager, GoalMutation};
use crate::model::{GenerationRequest, GoalRegistry, Question, Quiz, SchemaDescriptor};
use crate::store::{BankSummary, FileStorage, QuestionStore, Storage};

/// One open quizbank instance over a data directory.
pub struct Engine {
    store: Arc<QuestionStore>,
    dispatcher: Dispatcher,
    goals: GoalManager,
}

impl Engine {
    /// Open the engine over `data_dir` with the given config.
    pub fn open(data_dir: impl AsRef<Path>, config: &Config) -> Result<Self> {
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(data_dir.as_ref())?);
        Self::with_storage(storage, config)
    }

    /// Open the engine over an existing storage backend.
    pub fn with_storage(storage: Arc<dyn Storage>, config: &Config) -> Result<Self> {
        if storage.read_registry()?.is_none() {
            let registry = GoalRegistry::with_goals(
                config.supported.goals.iter().cloned(),
                config.goals.min_questions,
            );
            storage.write_registry(&registry)?;
            storage.write_schema(&SchemaDescriptor::from_registry(&registry))?;
            tracing::info!(goals = ?config.supported.goals, "seeded goal registry");
        }

        let store = Arc::new(QuestionStore::new(
            Arc::clone(&storage),
            config.cache.ttl(),
            config.cache.max_size,
            config.supported.difficulties.clone(),
        ));
        let dispatcher = Dispatcher::new(Arc::clone(&store), Arc::clone(&storage), config);
        let goals = GoalManager::new(
            Arc::clone(&storage),
            Arc::clone(&store),
            config.goals.min_questions,
            config.supported.difficulties.clone(),
        );

        Ok(Self {
            store,
            dispatcher,
            goals,
        })
    }

    /// Generate one quiz.
    pub fn generate(&self, request: &GenerationRequest) -> Result<Quiz> {
        self.dispatcher.generate(request)
    }

    /// Register a goal (or append to an existing one).
    pub fn add_goal(&self, goal: &str, questions: &[Question]) -> Result<GoalMutation> {
        self.goals.add(goal, questions)
    }

    /// Deregister an empty goal.
    pub fn remove_goal(&self, goal: &str) -> Result<GoalMutation> {
        self.goals.remove(goal)
    }

    /// The registered goals, sorted.
    pub fn goals(&self) -> Result<Vec<String>> {
        self.goals.goals()
    }

    /// The current validated question pool.
    pub fn questions(&self) -> Result<Arc<Vec<Question>>> {
        self.store.load()
    }

    /// Question counts by goal and type.
    pub fn summary(&self) -> Result<BankSummary> {
        self.store.summary()
    }

    /// Whether the persisted registry and schema mirror each other.
    pub fn artifacts_consistent(&self) -> Result<bool> {
        self.goals.artifacts_consistent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, GenerationMode};
    use tempfile::TempDir;

    fn questions(goal: &str, n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| {
                Question::short_answer(
                    goal,
                    format!("Engine test question {i}?"),
                    "an answer",
                    Difficulty::Beginner,
                    "general",
                )
            })
            .collect()
    }

    #[test]
    fn test_open_seeds_registry_from_config() {
        let dir = TempDir::new().unwrap();
        let engine = Engine::open(dir.path(), &Config::default()).unwrap();
        assert_eq!(engine.goals().unwrap(), ["Amazon SDE", "CAT", "GATE AE"]);
        assert!(engine.artifacts_consistent().unwrap());

        // Reopening keeps the persisted registry, not a reseed.
        drop(engine);
        let mut config = Config::default();
        config.supported.goals = vec!["Something Else".to_string()];
        let engine = Engine::open(dir.path(), &config).unwrap();
        assert_eq!(engine.goals().unwrap(), ["Amazon SDE", "CAT", "GATE AE"]);
    }

    #[test]
    fn test_full_lifecycle_against_files() {
        let dir = TempDir::new().unwrap();
        let engine = Engine::open(dir.path(), &Config::default()).unwrap();

        // Seed the default goal and generate in both modes.
        engine.add_goal("GATE AE", &questions("GATE AE", 10)).unwrap();
        let quiz = engine
            .generate(&GenerationRequest::new("GATE AE", 5))
            .unwrap();
        assert_eq!(quiz.questions.len(), 5);

        let templated = engine
            .generate(&GenerationRequest::new("GATE AE", 3).with_mode(GenerationMode::Template))
            .unwrap();
        assert_eq!(templated.questions.len(), 3);

        // Template mode serves every seeded goal, even with an empty bank.
        let cat = engine
            .generate(&GenerationRequest::new("CAT", 2).with_mode(GenerationMode::Template))
            .unwrap();
        assert_eq!(cat.questions.len(), 2);
        assert!(cat.questions.iter().all(|q| q.goal == "CAT"));

        // Register a second goal, then query the summary.
        engine
            .add_goal("Amazon SDE", &questions("Amazon SDE", 10))
            .unwrap();
        let summary = engine.summary().unwrap();
        assert_eq!(summary.total, 20);
        assert_eq!(summary.by_goal["Amazon SDE"], 10);

        // Unregistered goals stay rejected at the request boundary.
        let err = engine
            .generate(&GenerationRequest::new("UPSC", 3))
            .unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn test_state_survives_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let engine = Engine::open(dir.path(), &Config::default()).unwrap();
            engine
                .add_goal("Amazon SDE", &questions("Amazon SDE", 10))
                .unwrap();
        }

        let engine = Engine::open(dir.path(), &Config::default()).unwrap();
        assert_eq!(engine.goals().unwrap(), ["Amazon SDE", "CAT", "GATE AE"]);
        assert_eq!(engine.summary().unwrap().by_goal["Amazon SDE"], 10);

        let quiz = engine
            .generate(&GenerationRequest::new("Amazon SDE", 4))
            .unwrap();
        assert_eq!(quiz.questions.len(), 4);
    }
}
