//! Core value types for quizbank.
//!
//! Questions are immutable values once loaded or generated; the registry
//! and schema descriptor are the two goal artifacts that must mirror each
//! other at every point observable outside a goal mutation.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Question type: multiple-choice or short-answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Mcq,
    ShortAnswer,
}

impl QuestionType {
    /// The wire name of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mcq => "mcq",
            Self::ShortAnswer => "short_answer",
        }
    }
}

/// Difficulty tier of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// All difficulty tiers, in ascending order.
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    /// The wire name of this tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

/// Option letters for multiple-choice questions, in option order.
pub const OPTION_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

/// Number of options a multiple-choice question must carry.
pub const MCQ_OPTION_COUNT: usize = 4;

/// A single quiz question.
///
/// Invariants (enforced by [`crate::validate`]): `options` has exactly
/// four entries iff `kind` is `Mcq` and is empty otherwise; an MCQ
/// `answer` is formatted `"<letter>. <option text>"` and matches one of
/// the options after stripping the letter prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// The goal (exam track) this question belongs to.
    pub goal: String,
    /// Question type.
    #[serde(rename = "type")]
    pub kind: QuestionType,
    /// The question text.
    pub question: String,
    /// Answer options. Exactly four for MCQ, empty for short answer.
    #[serde(default)]
    pub options: Vec<String>,
    /// The answer text.
    pub answer: String,
    /// Difficulty tier.
    pub difficulty: Difficulty,
    /// Topic label, e.g. "algebra".
    #[serde(default = "default_topic")]
    pub topic: String,
}

fn default_topic() -> String {
    "general".to_string()
}

impl Question {
    /// Create a short-answer question.
    pub fn short_answer(
        goal: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
        difficulty: Difficulty,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            goal: goal.into(),
            kind: QuestionType::ShortAnswer,
            question: question.into(),
            options: Vec::new(),
            answer: answer.into(),
            difficulty,
            topic: topic.into(),
        }
    }

    /// Create a multiple-choice question.
    pub fn mcq(
        goal: impl Into<String>,
        question: impl Into<String>,
        options: Vec<String>,
        answer: impl Into<String>,
        difficulty: Difficulty,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            goal: goal.into(),
            kind: QuestionType::Mcq,
            question: question.into(),
            options,
            answer: answer.into(),
            difficulty,
            topic: topic.into(),
        }
    }

    /// The answer text with any leading `"<letter>. "` prefix stripped.
    pub fn answer_body(&self) -> &str {
        strip_letter_prefix(&self.answer)
    }
}

/// Strip a leading `"<letter>. "` option prefix from a string, if present.
///
/// `"B. 0.22"` becomes `"0.22"`; text without the prefix is returned
/// unchanged.
pub fn strip_letter_prefix(text: &str) -> &str {
    let mut chars = text.chars();
    if let Some(first) = chars.next() {
        if OPTION_LETTERS.contains(&first.to_ascii_uppercase()) {
            if let Some(rest) = text[first.len_utf8()..].strip_prefix(". ") {
                return rest;
            }
        }
    }
    text
}

/// Which generation strategy serves a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Rank and select existing bank questions by TF-IDF relevance.
    Retrieval,
    /// Synthesize new questions from parameterized formula templates.
    Template,
}

impl GenerationMode {
    /// The wire name of this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retrieval => "retrieval",
            Self::Template => "template",
        }
    }
}

/// A request for one quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The goal to generate for. Must be a registered goal.
    pub goal: String,
    /// Optional difficulty filter.
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    /// Optional topic filter.
    #[serde(default)]
    pub topic: Option<String>,
    /// Number of questions requested (bounded by config, default max 10).
    pub count: usize,
    /// Generation mode. Defaults to the configured mode when absent.
    #[serde(default)]
    pub mode: Option<GenerationMode>,
}

impl GenerationRequest {
    /// Create a request for `count` questions under `goal`.
    pub fn new(goal: impl Into<String>, count: usize) -> Self {
        Self {
            goal: goal.into(),
            difficulty: None,
            topic: None,
            count,
            mode: None,
        }
    }

    /// Set the difficulty filter.
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    /// Set the topic filter.
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Set the generation mode.
    pub fn with_mode(mut self, mode: GenerationMode) -> Self {
        self.mode = Some(mode);
        self
    }
}

/// A generated quiz.
///
/// May hold fewer questions than requested when the pool is insufficient;
/// an empty quiz is a valid "no matching questions" result, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    /// Opaque identifier, unique within (and across) process lifetimes.
    pub quiz_id: String,
    /// The goal this quiz was generated for.
    pub goal: String,
    /// The generated questions, in rank order.
    pub questions: Vec<Question>,
    /// When the quiz was generated.
    pub created_at: DateTime<Utc>,
}

impl Quiz {
    /// Assemble a quiz with a fresh identifier.
    pub fn new(goal: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            quiz_id: format!("quiz_{}", Uuid::new_v4()),
            goal: goal.into(),
            questions,
            created_at: Utc::now(),
        }
    }

    /// Whether this quiz matched zero questions.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// The set of registered goals plus the minimum-question threshold a new
/// goal must meet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalRegistry {
    /// Registered goal names, sorted.
    pub goals: BTreeSet<String>,
    /// Minimum total questions required to register a new goal.
    pub min_questions: usize,
}

impl Default for GoalRegistry {
    fn default() -> Self {
        Self {
            goals: BTreeSet::new(),
            min_questions: 10,
        }
    }
}

impl GoalRegistry {
    /// Create a registry from an initial goal list.
    pub fn with_goals<I, S>(goals: I, min_questions: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            goals: goals.into_iter().map(Into::into).collect(),
            min_questions,
        }
    }

    /// Whether `goal` is registered.
    pub fn contains(&self, goal: &str) -> bool {
        self.goals.contains(goal)
    }

    /// Register a goal. Returns false if it was already present.
    pub fn add(&mut self, goal: impl Into<String>) -> bool {
        self.goals.insert(goal.into())
    }

    /// Deregister a goal. Returns false if it was absent.
    pub fn remove(&mut self, goal: &str) -> bool {
        self.goals.remove(goal)
    }
}

/// A JSON-schema-shaped mirror of the registry's goal set, consumed by
/// request validation.
///
/// Serializes as `{"properties": {"goal": {"type": "string", "enum":
/// [..]}}}` so external request validators can use it directly.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    pub properties: SchemaProperties,
}

/// Property constraints of the schema descriptor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaProperties {
    pub goal: GoalConstraint,
}

/// The enumerated goal constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalConstraint {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "enum")]
    pub allowed: Vec<String>,
}

impl Default for GoalConstraint {
    fn default() -> Self {
        Self {
            kind: "string".to_string(),
            allowed: Vec::new(),
        }
    }
}

impl SchemaDescriptor {
    /// Build the descriptor mirroring a registry's goal set.
    pub fn from_registry(registry: &GoalRegistry) -> Self {
        Self {
            properties: SchemaProperties {
                goal: GoalConstraint {
                    kind: "string".to_string(),
                    allowed: registry.goals.iter().cloned().collect(),
                },
            },
        }
    }

    /// The allowed goal names, sorted.
    pub fn goals(&self) -> &[String] {
        &self.properties.goal.allowed
    }

    /// Whether `goal` satisfies the enumerated constraint.
    pub fn allows(&self, goal: &str) -> bool {
        self.properties.goal.allowed.iter().any(|g| g == goal)
    }

    /// Whether this descriptor mirrors `registry` exactly.
    pub fn mirrors(&self, registry: &GoalRegistry) -> bool {
        self.properties.goal.allowed.len() == registry.goals.len()
            && self
                .properties
                .goal
                .allowed
                .iter()
                .all(|g| registry.goals.contains(g))
    }
}
