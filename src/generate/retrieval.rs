//! TF-IDF retrieval over the question pool.
//!
//! Each candidate's text (question + topic) becomes a term-frequency
//! inverse-document-frequency vector over the filtered pool; candidates
//! are ranked by cosine similarity against a query vector built from the
//! request's topic, or the goal name when no topic is given.
//!
//! The computation is stateless per call. The bank is small and changes
//! on every goal mutation, so no index is persisted across requests;
//! recomputing the vector space each time keeps invalidation trivial.

use std::collections::HashMap;

use crate::error::Result;
use crate::generate::Generator;
use crate::model::{GenerationRequest, Question};

/// Common English stopwords dropped during preprocessing.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "been", "but", "by", "can", "do", "does", "for",
    "from", "had", "has", "have", "if", "in", "into", "is", "it", "its", "no", "not", "of", "on",
    "or", "such", "that", "the", "their", "then", "there", "these", "they", "this", "to", "was",
    "were", "what", "which", "will", "with",
];

/// Lowercase, strip punctuation, tokenize, and drop stopwords and
/// non-alphabetic tokens.
fn preprocess(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect();
    cleaned
        .split_whitespace()
        .filter(|token| token.chars().all(|c| c.is_alphabetic()))
        .filter(|token| !STOPWORDS.contains(token))
        .map(str::to_string)
        .collect()
}

/// Term counts for one document.
fn term_counts(tokens: &[String]) -> HashMap<&str, f64> {
    let mut counts: HashMap<&str, f64> = HashMap::new();
    for token in tokens {
        *counts.entry(token.as_str()).or_insert(0.0) += 1.0;
    }
    counts
}

/// Smoothed inverse document frequency over the document set.
fn idf_weights<'a>(documents: &'a [Vec<String>]) -> HashMap<&'a str, f64> {
    let n = documents.len() as f64;
    let mut df: HashMap<&str, f64> = HashMap::new();
    for tokens in documents {
        let mut seen: Vec<&str> = tokens.iter().map(String::as_str).collect();
        seen.sort_unstable();
        seen.dedup();
        for term in seen {
            *df.entry(term).or_insert(0.0) += 1.0;
        }
    }
    df.into_iter()
        .map(|(term, count)| (term, ((1.0 + n) / (1.0 + count)).ln() + 1.0))
        .collect()
}

/// Weighted vector for one document: tf * idf per term.
fn weigh(tokens: &[String], idf: &HashMap<&str, f64>) -> HashMap<String, f64> {
    term_counts(tokens)
        .into_iter()
        .filter_map(|(term, tf)| idf.get(term).map(|w| (term.to_string(), tf * w)))
        .collect()
}

/// Cosine similarity of two sparse vectors. Zero when either is empty.
fn cosine(a: &HashMap<String, f64>, b: &HashMap<String, f64>) -> f64 {
    let dot: f64 = a
        .iter()
        .filter_map(|(term, wa)| b.get(term).map(|wb| wa * wb))
        .sum();
    let norm_a: f64 = a.values().map(|w| w * w).sum::<f64>().sqrt();
    let norm_b: f64 = b.values().map(|w| w * w).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Retrieval-mode generator: ranks existing pool questions by relevance.
#[derive(Debug, Default)]
pub struct RetrievalGenerator;

impl RetrievalGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Generator for RetrievalGenerator {
    /// Rank the filtered pool and take the top `count` distinct
    /// questions, without replacement.
    ///
    /// Ties (including the all-zero cold start, when the query shares no
    /// terms with any candidate) break deterministically by original bank
    /// order. A pool smaller than `count` is returned whole; an empty
    /// pool yields an empty sequence, not an error.
    fn generate(&self, request: &GenerationRequest, pool: &[Question]) -> Result<Vec<Question>> {
        let filtered: Vec<(usize, &Question)> = pool
            .iter()
            .enumerate()
            .filter(|(_, q)| q.goal == request.goal)
            .filter(|(_, q)| request.difficulty.map_or(true, |d| q.difficulty == d))
            .filter(|(_, q)| {
                request
                    .topic
                    .as_deref()
                    .map_or(true, |t| q.topic.eq_ignore_ascii_case(t))
            })
            .collect();

        if filtered.is_empty() {
            return Ok(Vec::new());
        }

        let documents: Vec<Vec<String>> = filtered
            .iter()
            .map(|(_, q)| preprocess(&format!("{} {}", q.question, q.topic)))
            .collect();
        let idf = idf_weights(&documents);

        let query_text = request.topic.as_deref().unwrap_or(&request.goal);
        let query = weigh(&preprocess(query_text), &idf);

        let mut scored: Vec<(f64, usize, &Question)> = filtered
            .iter()
            .zip(&documents)
            .map(|(&(bank_index, q), tokens)| {
                let score = cosine(&query, &weigh(tokens, &idf));
                (score, bank_index, q)
            })
            .collect();

        // Score descending, then bank order ascending for determinism.
        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });

        Ok(scored
            .into_iter()
            .take(request.count)
            .map(|(_, _, q)| q.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;

    fn question(text: &str, topic: &str, difficulty: Difficulty) -> Question {
        Question::short_answer("GATE AE", text, "an answer", difficulty, topic)
    }

    fn sample_pool() -> Vec<Question> {
        vec![
            question(
                "What limits the thrust of a turbojet engine?",
                "propulsion",
                Difficulty::Beginner,
            ),
            question(
                "Define the lift coefficient of an airfoil.",
                "aerodynamics",
                Difficulty::Beginner,
            ),
            question(
                "How does exhaust velocity affect engine thrust?",
                "propulsion",
                Difficulty::Beginner,
            ),
            question(
                "State the Euler buckling load formula.",
                "structures",
                Difficulty::Intermediate,
            ),
        ]
    }

    #[test]
    fn test_preprocess_drops_noise() {
        let tokens = preprocess("What is the Lift-Coefficient, at 4 degrees?");
        assert!(tokens.contains(&"liftcoefficient".to_string()));
        assert!(tokens.contains(&"degrees".to_string()));
        // Stopwords and the numeric token are gone.
        assert!(!tokens.iter().any(|t| t == "the" || t == "is" || t == "4"));
    }

    #[test]
    fn test_topic_query_ranks_matching_questions_first() {
        let generator = RetrievalGenerator::new();
        let request = GenerationRequest::new("GATE AE", 2).with_topic("propulsion");
        let selected = generator.generate(&request, &sample_pool()).unwrap();
        assert_eq!(selected.len(), 2);
        for q in &selected {
            assert_eq!(q.topic, "propulsion");
        }
    }

    #[test]
    fn test_determinism() {
        let generator = RetrievalGenerator::new();
        let pool = sample_pool();
        let request = GenerationRequest::new("GATE AE", 3);
        let first = generator.generate(&request, &pool).unwrap();
        let second = generator.generate(&request, &pool).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_short_pool_returns_all_without_padding() {
        let generator = RetrievalGenerator::new();
        let request = GenerationRequest::new("GATE AE", 5).with_topic("propulsion");
        let selected = generator.generate(&request, &sample_pool()).unwrap();
        // Only two propulsion questions exist; no padding, no error.
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_empty_pool_returns_empty() {
        let generator = RetrievalGenerator::new();
        let request = GenerationRequest::new("GATE AE", 5).with_topic("thermodynamics");
        let selected = generator.generate(&request, &sample_pool()).unwrap();
        assert!(selected.is_empty());
    }

    #[test]
    fn test_all_zero_scores_fall_back_to_bank_order() {
        let generator = RetrievalGenerator::new();
        let pool = vec![
            question("Alpha question text?", "alpha", Difficulty::Beginner),
            question("Beta question text?", "beta", Difficulty::Beginner),
            question("Gamma question text?", "gamma", Difficulty::Beginner),
        ];
        // The goal name shares no terms with any candidate.
        let request = GenerationRequest::new("GATE AE", 2);
        let selected = generator.generate(&request, &pool).unwrap();
        assert_eq!(selected[0].question, "Alpha question text?");
        assert_eq!(selected[1].question, "Beta question text?");
    }

    #[test]
    fn test_selection_is_without_replacement() {
        let generator = RetrievalGenerator::new();
        let pool = sample_pool();
        let request = GenerationRequest::new("GATE AE", 4);
        let selected = generator.generate(&request, &pool).unwrap();
        let mut texts: Vec<&str> = selected.iter().map(|q| q.question.as_str()).collect();
        texts.sort_unstable();
        texts.dedup();
        assert_eq!(texts.len(), selected.len());
    }

    #[test]
    fn test_difficulty_filter() {
        let generator = RetrievalGenerator::new();
        let request =
            GenerationRequest::new("GATE AE", 10).with_difficulty(Difficulty::Intermediate);
        let selected = generator.generate(&request, &sample_pool()).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].topic, "structures");
    }
}
