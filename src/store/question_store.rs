//! The question store: a read-mostly, validated view of the bank.
//!
//! The store owns the pool cache exclusively. Generators receive an
//! immutable `Arc` snapshot per call and never touch the cache directly.
//! Bank entries that fail structural validation are logged and excluded
//! from the pool, never fatal: one bad record must not take the bank
//! down.
//!
//! Goal membership is deliberately not enforced here. Orphan entries
//! (goal present in the bank but not in the registry) are the safe crash
//! residue of a goal-add that stopped after the bank append; they must
//! stay countable so the add can be replayed, and request validation
//! against the schema keeps them unreachable through generation.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;

use crate::error::Result;
use crate::model::{Difficulty, Question};
use crate::store::{PoolCache, Storage};
use crate::validate::validate_structure;

/// Cached, validated access to the question bank.
pub struct QuestionStore {
    storage: Arc<dyn Storage>,
    cache: PoolCache,
    /// Serializes reloads so concurrent cache misses do one rebuild.
    reload_lock: Mutex<()>,
    /// Exclusive lock over the bank file's read-modify-write sequence.
    write_lock: Mutex<()>,
    difficulties: Vec<Difficulty>,
}

impl QuestionStore {
    /// Create a store over `storage` with the given cache bounds.
    pub fn new(
        storage: Arc<dyn Storage>,
        cache_ttl: Duration,
        cache_max_size: usize,
        difficulties: Vec<Difficulty>,
    ) -> Self {
        Self {
            storage,
            cache: PoolCache::new(cache_ttl, cache_max_size),
            reload_lock: Mutex::new(()),
            write_lock: Mutex::new(()),
            difficulties,
        }
    }

    /// Return the current pool, reloading from the backing bank when the
    /// cache is empty or expired.
    ///
    /// Concurrent callers during a reload block on the reload lock and
    /// then pick up the freshly installed snapshot; nobody ever observes
    /// a partially populated pool.
    pub fn load(&self) -> Result<Arc<Vec<Question>>> {
        if let Some(pool) = self.cache.get() {
            return Ok(pool);
        }

        let _guard = self.reload_lock.lock().unwrap();
        // Another caller may have finished the reload while we waited.
        if let Some(pool) = self.cache.get() {
            return Ok(pool);
        }

        let started = self.cache.begin();
        let raw = self.storage.read_bank()?;
        let total = raw.len();

        let mut pool = Vec::with_capacity(total);
        for (index, question) in raw.into_iter().enumerate() {
            match validate_structure(&question, &self.difficulties) {
                Ok(()) => pool.push(question),
                Err(err) => {
                    tracing::warn!(index, error = %err, "excluding invalid bank entry");
                }
            }
        }
        tracing::debug!(total, valid = pool.len(), "reloaded question pool");

        let snapshot = Arc::new(pool);
        self.cache.install(Arc::clone(&snapshot), started);
        Ok(snapshot)
    }

    /// Validate and append questions to the backing bank, then invalidate
    /// the cache.
    ///
    /// The whole read-modify-write runs under the store's exclusive bank
    /// lock; the write itself is atomic replace, so readers see either
    /// the old or the new bank.
    pub fn append(&self, questions: &[Question]) -> Result<()> {
        for question in questions {
            validate_structure(question, &self.difficulties)?;
        }

        let _guard = self.write_lock.lock().unwrap();
        let mut bank = self.storage.read_bank()?;
        bank.extend_from_slice(questions);
        self.storage.write_bank(&bank)?;
        self.cache.invalidate();

        tracing::info!(appended = questions.len(), total = bank.len(), "bank appended");
        Ok(())
    }

    /// Number of bank entries for `goal`, from the current pool.
    pub fn count_for_goal(&self, goal: &str) -> Result<usize> {
        let pool = self.load()?;
        Ok(pool.iter().filter(|q| q.goal == goal).count())
    }

    /// The distinct goals with at least one question in the bank.
    pub fn goals_present(&self) -> Result<BTreeSet<String>> {
        let pool = self.load()?;
        Ok(pool.iter().map(|q| q.goal.clone()).collect())
    }

    /// Drop the cached pool unconditionally. The next `load()` reloads.
    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    /// Question counts by goal and by type, for health reporting.
    pub fn summary(&self) -> Result<BankSummary> {
        let pool = self.load()?;
        let mut by_goal: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
        for q in pool.iter() {
            *by_goal.entry(q.goal.clone()).or_insert(0) += 1;
            *by_type.entry(q.kind.as_str().to_string()).or_insert(0) += 1;
        }
        Ok(BankSummary {
            total: pool.len(),
            by_goal,
            by_type,
        })
    }
}

/// Question counts for health reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankSummary {
    /// Total valid questions in the pool.
    pub total: usize,
    /// Count per goal.
    pub by_goal: BTreeMap<String, usize>,
    /// Count per question type.
    pub by_type: BTreeMap<String, usize>,
}
