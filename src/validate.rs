//! Pure validation for questions, requests, and goal names.
//!
//! Everything here is total and side-effect-free: no file system access,
//! no mutation of the candidate. Structural checks (shape of one question)
//! are separated from goal-membership checks because the question store
//! must keep structurally valid "orphan" entries countable while a goal
//! registration is in flight; only the request boundary enforces goal
//! membership for generation.

use std::collections::BTreeSet;

use crate::error::{QuizError, Result};
use crate::model::{
    Difficulty, GenerationRequest, Question, QuestionType, SchemaDescriptor, MCQ_OPTION_COUNT,
};

/// Validate the structural shape of a question, ignoring goal membership.
///
/// Fails when: the question or answer text is empty; the difficulty is not
/// in `known_difficulties`; an MCQ does not have exactly four options or
/// its answer does not match one of them after stripping the letter
/// prefix; a short-answer question carries options.
pub fn validate_structure(q: &Question, known_difficulties: &[Difficulty]) -> Result<()> {
    if q.question.trim().is_empty() {
        return Err(QuizError::validation("question text is empty"));
    }
    if q.answer.trim().is_empty() {
        return Err(QuizError::validation("answer is empty"));
    }
    if !known_difficulties.contains(&q.difficulty) {
        return Err(QuizError::validation(format!(
            "difficulty '{}' is not supported",
            q.difficulty.as_str()
        )));
    }

    match q.kind {
        QuestionType::Mcq => {
            if q.options.len() != MCQ_OPTION_COUNT {
                return Err(QuizError::validation(format!(
                    "mcq question must have exactly {} options, found {}",
                    MCQ_OPTION_COUNT,
                    q.options.len()
                )));
            }
            let answer = q.answer_body().trim();
            let matches_option = q
                .options
                .iter()
                .any(|opt| crate::model::strip_letter_prefix(opt).trim() == answer);
            if !matches_option {
                return Err(QuizError::validation(
                    "mcq answer does not match any option",
                ));
            }
        }
        QuestionType::ShortAnswer => {
            if !q.options.is_empty() {
                return Err(QuizError::validation(
                    "short-answer question must not carry options",
                ));
            }
        }
    }

    Ok(())
}

/// Validate a question fully: structure plus goal membership.
pub fn validate_question(
    q: &Question,
    known_goals: &BTreeSet<String>,
    known_difficulties: &[Difficulty],
) -> Result<()> {
    validate_structure(q, known_difficulties)?;
    if !known_goals.contains(&q.goal) {
        return Err(QuizError::validation(format!(
            "goal '{}' is not registered",
            q.goal
        )));
    }
    Ok(())
}

/// Validate a goal name for registration.
pub fn validate_goal_name(goal: &str) -> Result<()> {
    let trimmed = goal.trim();
    if trimmed.len() < 3 {
        return Err(QuizError::validation(
            "goal must be at least 3 characters long",
        ));
    }
    if trimmed != goal {
        return Err(QuizError::validation(
            "goal must not have leading or trailing whitespace",
        ));
    }
    Ok(())
}

/// Validate a generation request against the goal schema and count bounds.
pub fn validate_request(
    req: &GenerationRequest,
    schema: &SchemaDescriptor,
    known_difficulties: &[Difficulty],
    max_count: usize,
) -> Result<()> {
    if !schema.allows(&req.goal) {
        return Err(QuizError::validation(format!(
            "goal must be one of {:?}",
            schema.goals()
        )));
    }
    if req.count < 1 || req.count > max_count {
        return Err(QuizError::validation(format!(
            "count must be between 1 and {}, got {}",
            max_count, req.count
        )));
    }
    if let Some(difficulty) = req.difficulty {
        if !known_difficulties.contains(&difficulty) {
            return Err(QuizError::validation(format!(
                "difficulty '{}' is not supported",
                difficulty.as_str()
            )));
        }
    }
    Ok(())
}
