//! Quiz generation: the generator contract, its two variants, and the
//! dispatcher that selects between them.

pub mod retrieval;
pub mod template;

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::model::{
    Difficulty, GenerationMode, GenerationRequest, Question, Quiz, SchemaDescriptor,
};
use crate::store::{QuestionStore, Storage};
use crate::validate::validate_request;

pub use retrieval::RetrievalGenerator;
pub use template::{Formula, QuestionTemplate, TemplateGenerator};

/// The shared generation capability.
///
/// Implementations receive an immutable pool snapshot per call and return
/// a finite, validated question sequence. They never touch the cache or
/// the backing files.
pub trait Generator: Send + Sync {
    fn generate(&self, request: &GenerationRequest, pool: &[Question]) -> Result<Vec<Question>>;
}

/// Selects the retrieval or template generator per request.
///
/// Mode comes from the request, defaulting to the configured mode. This
/// is the only place the mode branch lives.
pub struct Dispatcher {
    store: Arc<QuestionStore>,
    storage: Arc<dyn Storage>,
    retrieval: RetrievalGenerator,
    template: TemplateGenerator,
    default_mode: GenerationMode,
    difficulties: Vec<Difficulty>,
    max_count: usize,
}

impl Dispatcher {
    /// Create a dispatcher over a store and its storage, configured with
    /// the process-wide defaults.
    pub fn new(store: Arc<QuestionStore>, storage: Arc<dyn Storage>, config: &Config) -> Self {
        Self {
            store,
            storage,
            retrieval: RetrievalGenerator::new(),
            template: TemplateGenerator::builtin(),
            default_mode: config.generation.default_mode,
            difficulties: config.supported.difficulties.clone(),
            max_count: config.generation.max_questions,
        }
    }

    /// Replace the template set (e.g. templates for additional goals).
    pub fn with_templates(mut self, template: TemplateGenerator) -> Self {
        self.template = template;
        self
    }

    /// Validate the request, load the pool, and delegate to the selected
    /// generator.
    ///
    /// The pool is one immutable snapshot, so a quiz never mixes pre- and
    /// post-mutation bank states. An empty result is a valid quiz with
    /// zero questions, not an error.
    pub fn generate(&self, request: &GenerationRequest) -> Result<Quiz> {
        let schema = self
            .storage
            .read_schema()?
            .unwrap_or_else(SchemaDescriptor::default);
        validate_request(request, &schema, &self.difficulties, self.max_count)?;

        let pool = self.store.load()?;
        let mode = request.mode.unwrap_or(self.default_mode);
        let questions = match mode {
            GenerationMode::Retrieval => self.retrieval.generate(request, &pool)?,
            GenerationMode::Template => self.template.generate(request, &pool)?,
        };

        tracing::debug!(
            goal = %request.goal,
            mode = mode.as_str(),
            requested = request.count,
            returned = questions.len(),
            "generated quiz"
        );
        Ok(Quiz::new(&request.goal, questions))
    }
}
