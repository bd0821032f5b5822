//! Goal lifecycle: registration and removal, keeping the bank, the
//! registry, and the schema descriptor consistent.
//!
//! The manager is the sole writer of the registry and schema files, and
//! the only path that appends questions for a goal transition. Mutations
//! run under one exclusive lock and follow a fixed write order: bank
//! append first, then registry, then schema. A crash between the append
//! and the registry write leaves orphan bank entries, which the store
//! keeps countable so re-running the same add completes the
//! registration; a schema-write failure rolls the registry back so the
//! two artifacts never diverge on disk.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use crate::error::{QuizError, Result};
use crate::model::{Difficulty, GoalRegistry, Question, SchemaDescriptor};
use crate::store::{QuestionStore, Storage};
use crate::validate::{validate_goal_name, validate_question};

/// The outcome of a goal mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalMutation {
    /// A new goal was registered, with `appended` questions written.
    Added { appended: usize },
    /// The goal already existed; `appended` questions were added to it.
    Appended { appended: usize },
    /// The goal was deregistered.
    Removed,
}

/// Serialized add/remove operations over the goal artifacts.
pub struct GoalManager {
    storage: Arc<dyn Storage>,
    store: Arc<QuestionStore>,
    /// One mutation at a time. Held across every registry/schema write.
    mutation_lock: Mutex<()>,
    /// Threshold used when no registry file exists yet.
    default_min_questions: usize,
    difficulties: Vec<Difficulty>,
}

impl GoalManager {
    pub fn new(
        storage: Arc<dyn Storage>,
        store: Arc<QuestionStore>,
        default_min_questions: usize,
        difficulties: Vec<Difficulty>,
    ) -> Self {
        Self {
            storage,
            store,
            mutation_lock: Mutex::new(()),
            default_min_questions,
            difficulties,
        }
    }

    /// Register `goal`, seeding it with `questions`, or append the
    /// questions when the goal is already registered.
    ///
    /// A new goal must reach the registry's minimum question count,
    /// counting both the provided questions and any bank entries already
    /// under that goal (the residue of a previously interrupted add).
    /// The threshold check happens before any write: a rejected add
    /// leaves every file byte-identical.
    pub fn add(&self, goal: &str, questions: &[Question]) -> Result<GoalMutation> {
        validate_goal_name(goal)?;
        // Full validation against a singleton goal set: every question
        // must be shaped correctly and tagged with the goal being added.
        let allowed: BTreeSet<String> = BTreeSet::from([goal.to_string()]);
        for q in questions {
            validate_question(q, &allowed, &self.difficulties)?;
        }

        let _guard = self.mutation_lock.lock().unwrap();
        let mut registry = self.read_registry()?;

        if registry.contains(goal) {
            self.store.append(questions)?;
            tracing::info!(goal, appended = questions.len(), "appended to existing goal");
            return Ok(GoalMutation::Appended {
                appended: questions.len(),
            });
        }

        let existing = self.store.count_for_goal(goal)?;
        let total = existing + questions.len();
        if total < registry.min_questions {
            return Err(QuizError::insufficient_questions(
                goal,
                total,
                registry.min_questions,
            ));
        }

        // Bank first: an interrupt after this point leaves replayable
        // orphans, never a registered goal with a missing bank.
        self.store.append(questions)?;
        registry.add(goal);
        self.storage.write_registry(&registry)?;
        self.finish_schema_write(&mut registry, goal, true)?;

        self.store.invalidate();
        tracing::info!(goal, appended = questions.len(), existing, "goal registered");
        Ok(GoalMutation::Added {
            appended: questions.len(),
        })
    }

    /// Deregister `goal`.
    ///
    /// Refused while the bank still holds questions under it; callers
    /// must drain or migrate those first.
    pub fn remove(&self, goal: &str) -> Result<GoalMutation> {
        let _guard = self.mutation_lock.lock().unwrap();
        let mut registry = self.read_registry()?;

        if !registry.contains(goal) {
            return Err(QuizError::validation(format!(
                "goal '{goal}' is not registered"
            )));
        }
        let count = self.store.count_for_goal(goal)?;
        if count > 0 {
            return Err(QuizError::goal_in_use(goal, count));
        }

        registry.remove(goal);
        self.storage.write_registry(&registry)?;
        self.finish_schema_write(&mut registry, goal, false)?;

        self.store.invalidate();
        tracing::info!(goal, "goal removed");
        Ok(GoalMutation::Removed)
    }

    /// The registered goals, sorted.
    pub fn goals(&self) -> Result<Vec<String>> {
        Ok(self.read_registry()?.goals.into_iter().collect())
    }

    /// Whether the persisted schema mirrors the persisted registry.
    pub fn artifacts_consistent(&self) -> Result<bool> {
        let registry = self.read_registry()?;
        let schema = self
            .storage
            .read_schema()?
            .unwrap_or_default();
        Ok(schema.mirrors(&registry))
    }

    fn read_registry(&self) -> Result<GoalRegistry> {
        Ok(self.storage.read_registry()?.unwrap_or_else(|| {
            GoalRegistry::with_goals(Vec::<String>::new(), self.default_min_questions)
        }))
    }

    /// Write the schema mirroring `registry`; on failure, undo the
    /// registry change for `goal` (`added` says which direction) so the
    /// two files stay consistent, then surface the original error.
    fn finish_schema_write(
        &self,
        registry: &mut GoalRegistry,
        goal: &str,
        added: bool,
    ) -> Result<()> {
        let schema = SchemaDescriptor::from_registry(registry);
        if let Err(err) = self.storage.write_schema(&schema) {
            if added {
                registry.remove(goal);
            } else {
                registry.add(goal);
            }
            if let Err(rollback_err) = self.storage.write_registry(registry) {
                tracing::error!(
                    goal,
                    error = %rollback_err,
                    "registry rollback failed after schema write failure; \
                     artifacts may be inconsistent until the next mutation"
                );
            }
            return Err(err);
        }
        Ok(())
    }
}
