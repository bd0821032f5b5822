//! Template-mode generation: synthesize questions from parameterized
//! formulas.
//!
//! A template binds a formula to (goal, difficulty, topic). Generation
//! samples the formula's parameters once, then renders the question text
//! and computes the answer from that same parameter set; the answer is
//! never re-derived from the rendered text. Numeric answers use the fixed
//! decimal precision the formula declares, so they are reproducible and
//! comparable.
//!
//! Parameters are integer draws. Formulas needing a fractional constant
//! sample it in tenths or hundredths and scale at render time; formulas
//! choosing among fixed phrasings sample an index into a constant list.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{QuizError, Result};
use crate::generate::Generator;
use crate::model::{Difficulty, GenerationRequest, Question, QuestionType};
use crate::validate::validate_structure;

/// Operations a balanced BST answers in logarithmic time.
const BST_OPERATIONS: [&str; 3] = ["searching", "insertion", "deletion"];
/// Adjacency representations of a graph.
const GRAPH_STRUCTURES: [&str; 2] = ["list", "matrix"];
/// Sorts with O(n log n) average-case time.
const SORT_ALGORITHMS: [&str; 2] = ["Merge", "Quick"];
/// Die events with probability 3/6.
const DIE_EVENTS: [&str; 2] = ["a prime number", "an even number"];

/// Parameters sampled for one question instance.
///
/// Named integer draws; both the rendered text and the computed answer
/// derive from these values and nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampledParams(Vec<(&'static str, i64)>);

impl SampledParams {
    fn new(values: Vec<(&'static str, i64)>) -> Self {
        Self(values)
    }

    /// Look up a parameter by name. Formula code only asks for names it
    /// sampled itself, so a miss is a programming error.
    pub(crate) fn get(&self, name: &str) -> i64 {
        self.0
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
            .unwrap_or_else(|| panic!("formula asked for unsampled parameter '{name}'"))
    }
}

/// The formulas templates can instantiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formula {
    /// Roots of a quadratic with integer roots by construction.
    QuadraticRoots,
    /// Jet engine thrust from mass flow rate and exhaust velocity.
    JetThrust,
    /// Thin-airfoil lift coefficient at a small angle of attack (MCQ).
    LiftCoefficient,
    /// Maximum bending moment of a simply supported beam, center load.
    BeamBendingMoment,
    /// Compressor outlet stagnation temperature from the pressure ratio.
    CompressorOutletTemp,
    /// Load factor of a steady coordinated turn (MCQ).
    TurnLoadFactor,
    /// Eigenvalue sum of a 2x2 diagonal matrix.
    EigenvalueSum,
    /// Maximum shear stress of a solid circular shaft under torque.
    ShaftShearStress,
    /// Circular-orbit velocity at a given altitude (MCQ).
    OrbitalVelocity,
    /// Specific heat at constant volume from cp and gamma (MCQ).
    SpecificHeatCv,
    /// Time complexity of a balanced-BST operation (MCQ).
    BstComplexity,
    /// Space complexity of a graph adjacency representation (MCQ).
    GraphSpaceComplexity,
    /// Maximum node count of a binary tree of a given height.
    BinaryTreeNodes,
    /// Average-case complexity of an O(n log n) sort (MCQ).
    SortComplexity,
    /// The CAP theorem expansion (MCQ, no parameters).
    CapTheorem,
    /// Simple interest on a principal.
    SimpleInterest,
    /// Linear equation with an integer solution by construction (MCQ).
    LinearEquation,
    /// Area of a triangle from base and height.
    TriangleArea,
    /// Probability of a die event.
    DieProbability,
}

impl Formula {
    /// Question type this formula produces.
    pub fn kind(&self) -> QuestionType {
        match self {
            Self::LiftCoefficient
            | Self::TurnLoadFactor
            | Self::OrbitalVelocity
            | Self::SpecificHeatCv
            | Self::BstComplexity
            | Self::GraphSpaceComplexity
            | Self::SortComplexity
            | Self::CapTheorem
            | Self::LinearEquation => QuestionType::Mcq,
            _ => QuestionType::ShortAnswer,
        }
    }

    /// Draw parameters from bounded ranges. Sampling never retries, so a
    /// template cannot hang a request.
    pub(crate) fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SampledParams {
        match self {
            Self::QuadraticRoots => {
                // Sample the roots, derive the coefficients; keeps the
                // answer exact without symbolic solving.
                let a = rng.gen_range(1..=3);
                let r1 = rng.gen_range(-5..=5);
                let r2 = rng.gen_range(-5..=5);
                SampledParams::new(vec![("a", a), ("r1", r1), ("r2", r2)])
            }
            Self::JetThrust => SampledParams::new(vec![
                ("m", rng.gen_range(40..=60)),
                ("v", rng.gen_range(300..=700)),
            ]),
            Self::LiftCoefficient => {
                SampledParams::new(vec![("angle", rng.gen_range(2..=8))])
            }
            Self::BeamBendingMoment => SampledParams::new(vec![
                ("length", rng.gen_range(2..=10)),
                ("load", rng.gen_range(5..=50)),
            ]),
            Self::CompressorOutletTemp => SampledParams::new(vec![
                ("pr_tenths", rng.gen_range(11..=13)),
                ("temp", rng.gen_range(280..=320)),
            ]),
            Self::TurnLoadFactor => SampledParams::new(vec![
                ("radius", rng.gen_range(500..=1500)),
                ("velocity", rng.gen_range(50..=100)),
            ]),
            Self::EigenvalueSum => SampledParams::new(vec![
                ("a", rng.gen_range(1..=4)),
                ("b", rng.gen_range(1..=4)),
            ]),
            Self::ShaftShearStress => SampledParams::new(vec![
                ("diameter", rng.gen_range(20..=50)),
                ("torque", rng.gen_range(100..=500)),
            ]),
            Self::OrbitalVelocity => {
                SampledParams::new(vec![("altitude", rng.gen_range(300..=600))])
            }
            Self::SpecificHeatCv => SampledParams::new(vec![
                ("cp", rng.gen_range(1000..=1200)),
                ("gamma_hundredths", rng.gen_range(130..=150)),
            ]),
            Self::BstComplexity => SampledParams::new(vec![(
                "operation",
                rng.gen_range(0..BST_OPERATIONS.len() as i64),
            )]),
            Self::GraphSpaceComplexity => SampledParams::new(vec![(
                "structure",
                rng.gen_range(0..GRAPH_STRUCTURES.len() as i64),
            )]),
            Self::BinaryTreeNodes => {
                SampledParams::new(vec![("height", rng.gen_range(2..=5))])
            }
            Self::SortComplexity => SampledParams::new(vec![(
                "algorithm",
                rng.gen_range(0..SORT_ALGORITHMS.len() as i64),
            )]),
            Self::CapTheorem => SampledParams::new(Vec::new()),
            Self::SimpleInterest => SampledParams::new(vec![
                ("principal", rng.gen_range(500..=2000)),
                ("rate", rng.gen_range(2..=9)),
                ("years", rng.gen_range(1..=4)),
            ]),
            Self::LinearEquation => {
                // Sample the solution, derive the constant, so the answer
                // is an exact integer.
                let a = rng.gen_range(2..=5);
                let b = rng.gen_range(1..=9);
                let x = rng.gen_range(1..=5);
                SampledParams::new(vec![("a", a), ("b", b), ("x", x)])
            }
            Self::TriangleArea => SampledParams::new(vec![
                ("base", rng.gen_range(4..=9)),
                ("height", rng.gen_range(5..=11)),
            ]),
            Self::DieProbability => SampledParams::new(vec![(
                "event",
                rng.gen_range(0..DIE_EVENTS.len() as i64),
            )]),
        }
    }

    /// Render the question text from sampled parameters.
    pub(crate) fn render(&self, params: &SampledParams) -> String {
        match self {
            Self::QuadraticRoots => {
                let (a, b, c) = quadratic_coefficients(params);
                format!("Solve {a}x\u{b2} + {b}x + {c} = 0 for x (round to 2 decimal places).")
            }
            Self::JetThrust => format!(
                "The thrust of a jet engine with mass flow rate {} kg/s and exhaust velocity \
                 {} m/s is (in kN, to two decimal places):",
                params.get("m"),
                params.get("v")
            ),
            Self::LiftCoefficient => format!(
                "The lift coefficient of a thin airfoil at {}\u{b0} angle of attack is \
                 (to two decimal places):",
                params.get("angle")
            ),
            Self::BeamBendingMoment => format!(
                "A simply supported beam (length {} m, point load {} kN at center) has \
                 maximum bending moment in kNm (to two decimal places):",
                params.get("length"),
                params.get("load")
            ),
            Self::CompressorOutletTemp => format!(
                "A compressor stage has a stagnation pressure ratio of {:.1}. If the inlet \
                 stagnation temperature is {} K, the outlet stagnation temperature is \
                 (in K, \u{3b3} = 1.4, to two decimal places):",
                params.get("pr_tenths") as f64 / 10.0,
                params.get("temp")
            ),
            Self::TurnLoadFactor => format!(
                "For an aircraft in a steady, level, coordinated turn at a turn radius of \
                 {} m and velocity {} m/s, the load factor is (to two decimal places):",
                params.get("radius"),
                params.get("velocity")
            ),
            Self::EigenvalueSum => format!(
                "The sum of the eigenvalues of the matrix [[{}, 0], [0, {}]] is \
                 (to one decimal place):",
                params.get("a"),
                params.get("b")
            ),
            Self::ShaftShearStress => format!(
                "A solid circular shaft of diameter {} mm is subjected to a torque of {} Nm. \
                 The maximum shear stress is (in MPa, to two decimal places):",
                params.get("diameter"),
                params.get("torque")
            ),
            Self::OrbitalVelocity => format!(
                "The orbital velocity of a satellite in a circular orbit at {} km altitude is \
                 (in km/s, to two decimal places, R = 6371 km, \u{3bc} = 398600 km\u{b3}/s\u{b2}):",
                params.get("altitude")
            ),
            Self::SpecificHeatCv => format!(
                "For an ideal gas with specific heat at constant pressure {} J/kg\u{b7}K and \
                 specific heat ratio {:.2}, the specific heat at constant volume is \
                 (in J/kg\u{b7}K, to one decimal place):",
                params.get("cp"),
                params.get("gamma_hundredths") as f64 / 100.0
            ),
            Self::BstComplexity => format!(
                "What is the time complexity of {} in a balanced binary search tree?",
                BST_OPERATIONS[params.get("operation") as usize]
            ),
            Self::GraphSpaceComplexity => format!(
                "What is the space complexity of an adjacency {} representation of a graph \
                 with V vertices and E edges?",
                GRAPH_STRUCTURES[params.get("structure") as usize]
            ),
            Self::BinaryTreeNodes => format!(
                "What is the maximum number of nodes in a binary tree of height {}?",
                params.get("height")
            ),
            Self::SortComplexity => format!(
                "What is the time complexity of {} sort in the average case?",
                SORT_ALGORITHMS[params.get("algorithm") as usize]
            ),
            Self::CapTheorem => {
                "What does the CAP theorem stand for in distributed systems?".to_string()
            }
            Self::SimpleInterest => format!(
                "What is the simple interest on ${} at {}% per annum for {} years?",
                params.get("principal"),
                params.get("rate"),
                params.get("years")
            ),
            Self::LinearEquation => {
                let (a, b) = (params.get("a"), params.get("b"));
                let c = a * params.get("x") + b;
                format!("Solve for x: {a}x + {b} = {c}.")
            }
            Self::TriangleArea => format!(
                "Find the area of a triangle with base {} cm and height {} cm.",
                params.get("base"),
                params.get("height")
            ),
            Self::DieProbability => format!(
                "The probability of rolling {} with a fair six-sided die is \
                 (to two decimal places):",
                DIE_EVENTS[params.get("event") as usize]
            ),
        }
    }

    /// Compute the exact answer from the same sampled parameters, at the
    /// formula's declared precision.
    pub(crate) fn answer(&self, params: &SampledParams) -> String {
        match self {
            Self::QuadraticRoots => {
                let mut roots = [params.get("r1") as f64, params.get("r2") as f64];
                roots.sort_by(f64::total_cmp);
                if roots[0] == roots[1] {
                    format!("{:.2}", roots[0])
                } else {
                    format!("{:.2}, {:.2}", roots[0], roots[1])
                }
            }
            Self::JetThrust => {
                let thrust = params.get("m") as f64 * params.get("v") as f64 / 1000.0;
                format!("{thrust:.2}")
            }
            Self::LiftCoefficient => {
                format!("B. {:.2}", lift_coefficient(params.get("angle")))
            }
            Self::BeamBendingMoment => {
                let moment = params.get("load") as f64 * params.get("length") as f64 / 4.0;
                format!("{moment:.2}")
            }
            Self::CompressorOutletTemp => {
                let pr = params.get("pr_tenths") as f64 / 10.0;
                let outlet = params.get("temp") as f64 * pr.powf((1.4 - 1.0) / 1.4);
                format!("{outlet:.2}")
            }
            Self::TurnLoadFactor => {
                format!(
                    "B. {:.2}",
                    load_factor(params.get("radius"), params.get("velocity"))
                )
            }
            Self::EigenvalueSum => {
                format!("{:.1}", (params.get("a") + params.get("b")) as f64)
            }
            Self::ShaftShearStress => {
                format!(
                    "{:.2}",
                    shear_stress_mpa(params.get("diameter"), params.get("torque"))
                )
            }
            Self::OrbitalVelocity => {
                format!("B. {:.2}", orbital_velocity(params.get("altitude")))
            }
            Self::SpecificHeatCv => {
                format!(
                    "B. {:.1}",
                    specific_heat_cv(params.get("cp"), params.get("gamma_hundredths"))
                )
            }
            Self::BstComplexity => "B. O(log n)".to_string(),
            Self::GraphSpaceComplexity => {
                if GRAPH_STRUCTURES[params.get("structure") as usize] == "list" {
                    "B. O(V + E)".to_string()
                } else {
                    "C. O(V\u{b2})".to_string()
                }
            }
            Self::BinaryTreeNodes => {
                format!("{}", (1i64 << params.get("height")) - 1)
            }
            Self::SortComplexity => "B. O(n log n)".to_string(),
            Self::CapTheorem => {
                "A. Consistency, Availability, Partition tolerance".to_string()
            }
            Self::SimpleInterest => {
                let interest = params.get("principal") as f64
                    * params.get("rate") as f64
                    * params.get("years") as f64
                    / 100.0;
                format!("${interest:.2}")
            }
            Self::LinearEquation => format!("B. {}", params.get("x")),
            Self::TriangleArea => {
                let area = 0.5 * params.get("base") as f64 * params.get("height") as f64;
                format!("{area:.2}")
            }
            Self::DieProbability => {
                // Three primes and three evens on a d6.
                format!("{:.2}", 3.0 / 6.0)
            }
        }
    }

    /// Answer options for MCQ formulas; empty for short answers.
    pub(crate) fn options(&self, params: &SampledParams) -> Vec<String> {
        match self {
            Self::LiftCoefficient => {
                let angle = params.get("angle");
                // Distractors from adjacent angles; offsets are distinct
                // so the values never collide with the correct one.
                vec![
                    format!("A. {:.2}", lift_coefficient(angle + 1)),
                    format!("B. {:.2}", lift_coefficient(angle)),
                    format!("C. {:.2}", lift_coefficient((angle - 1).max(1))),
                    format!("D. {:.2}", lift_coefficient(angle + 2)),
                ]
            }
            Self::TurnLoadFactor => {
                let n = load_factor(params.get("radius"), params.get("velocity"));
                vec![
                    format!("A. {:.2}", n - 0.2),
                    format!("B. {n:.2}"),
                    format!("C. {:.2}", n + 0.2),
                    format!("D. {:.2}", n + 0.4),
                ]
            }
            Self::OrbitalVelocity => {
                let v = orbital_velocity(params.get("altitude"));
                vec![
                    format!("A. {:.2}", v - 0.2),
                    format!("B. {v:.2}"),
                    format!("C. {:.2}", v + 0.2),
                    format!("D. {:.2}", v + 0.4),
                ]
            }
            Self::SpecificHeatCv => {
                let cv = specific_heat_cv(params.get("cp"), params.get("gamma_hundredths"));
                vec![
                    format!("A. {:.1}", cv - 50.0),
                    format!("B. {cv:.1}"),
                    format!("C. {:.1}", cv + 50.0),
                    format!("D. {:.1}", cv + 100.0),
                ]
            }
            Self::BstComplexity => vec![
                "A. O(1)".to_string(),
                "B. O(log n)".to_string(),
                "C. O(n)".to_string(),
                "D. O(n log n)".to_string(),
            ],
            Self::GraphSpaceComplexity => vec![
                "A. O(V)".to_string(),
                "B. O(V + E)".to_string(),
                "C. O(V\u{b2})".to_string(),
                "D. O(E\u{b2})".to_string(),
            ],
            Self::SortComplexity => vec![
                "A. O(n)".to_string(),
                "B. O(n log n)".to_string(),
                "C. O(n\u{b2})".to_string(),
                "D. O(log n)".to_string(),
            ],
            Self::CapTheorem => vec![
                "A. Consistency, Availability, Partition tolerance".to_string(),
                "B. Consistency, Accuracy, Performance".to_string(),
                "C. Concurrency, Availability, Performance".to_string(),
                "D. Consistency, Atomicity, Partition tolerance".to_string(),
            ],
            Self::LinearEquation => {
                let x = params.get("x");
                vec![
                    format!("A. {}", x - 1),
                    format!("B. {x}"),
                    format!("C. {}", x + 1),
                    format!("D. {}", x + 2),
                ]
            }
            _ => Vec::new(),
        }
    }
}

/// Expand (a, r1, r2) into the coefficients of a(x - r1)(x - r2).
fn quadratic_coefficients(params: &SampledParams) -> (i64, i64, i64) {
    let a = params.get("a");
    let r1 = params.get("r1");
    let r2 = params.get("r2");
    (a, -a * (r1 + r2), a * r1 * r2)
}

/// Thin-airfoil theory: cl = 2 * pi * alpha, alpha in radians.
fn lift_coefficient(angle_deg: i64) -> f64 {
    2.0 * PI * (angle_deg as f64) * PI / 180.0
}

/// Load factor of a coordinated turn: n = sqrt(1 + (v^2 / g r)^2).
fn load_factor(radius_m: i64, velocity_ms: i64) -> f64 {
    let v = velocity_ms as f64;
    let r = radius_m as f64;
    (1.0 + (v * v / (9.81 * r)).powi(2)).sqrt()
}

/// Torsion of a solid circular shaft: tau = 16 T / (pi d^3), in MPa.
fn shear_stress_mpa(diameter_mm: i64, torque_nm: i64) -> f64 {
    let d = diameter_mm as f64 / 1000.0;
    (16.0 * torque_nm as f64) / (PI * d.powi(3)) / 1e6
}

/// Circular-orbit velocity: v = sqrt(mu / (R + h)), in km/s.
fn orbital_velocity(altitude_km: i64) -> f64 {
    (398_600.0 / (6371.0 + altitude_km as f64)).sqrt()
}

/// cv = cp / gamma, with gamma sampled in hundredths.
fn specific_heat_cv(cp: i64, gamma_hundredths: i64) -> f64 {
    cp as f64 / (gamma_hundredths as f64 / 100.0)
}

/// A formula bound to the (goal, difficulty, topic) it can serve.
#[derive(Debug, Clone)]
pub struct QuestionTemplate {
    /// The goal this template serves.
    pub goal: String,
    /// Difficulty of the questions it produces.
    pub difficulty: Difficulty,
    /// Topic label; `None` is a wildcard matching any requested topic.
    pub topic: Option<String>,
    /// The formula to instantiate.
    pub formula: Formula,
}

impl QuestionTemplate {
    /// Create a template bound to a concrete topic.
    pub fn new(
        goal: impl Into<String>,
        difficulty: Difficulty,
        topic: impl Into<String>,
        formula: Formula,
    ) -> Self {
        Self {
            goal: goal.into(),
            difficulty,
            topic: Some(topic.into()),
            formula,
        }
    }

    /// Whether this template can serve the request's filters.
    fn matches(&self, request: &GenerationRequest) -> bool {
        if self.goal != request.goal {
            return false;
        }
        if let Some(difficulty) = request.difficulty {
            if self.difficulty != difficulty {
                return false;
            }
        }
        if let (Some(requested), Some(topic)) = (request.topic.as_deref(), self.topic.as_deref()) {
            if !topic.eq_ignore_ascii_case(requested) {
                return false;
            }
        }
        true
    }

    /// Instantiate one question from this template.
    fn instantiate<R: Rng + ?Sized>(&self, rng: &mut R) -> (Question, SampledParams) {
        let params = self.formula.sample(rng);
        let question = Question {
            goal: self.goal.clone(),
            kind: self.formula.kind(),
            question: self.formula.render(&params),
            options: self.formula.options(&params),
            answer: self.formula.answer(&params),
            difficulty: self.difficulty,
            topic: self.topic.clone().unwrap_or_else(|| "general".to_string()),
        };
        (question, params)
    }
}

/// Template-mode generator.
#[derive(Debug, Clone)]
pub struct TemplateGenerator {
    templates: Vec<QuestionTemplate>,
}

impl TemplateGenerator {
    /// Create a generator over an explicit template set.
    pub fn new(templates: Vec<QuestionTemplate>) -> Self {
        Self { templates }
    }

    /// The built-in formula templates for the stock goals.
    pub fn builtin() -> Self {
        use Difficulty::{Advanced, Beginner, Intermediate};
        use Formula::*;

        Self::new(vec![
            QuestionTemplate::new("GATE AE", Beginner, "algebra", QuadraticRoots),
            QuestionTemplate::new("GATE AE", Beginner, "propulsion", JetThrust),
            QuestionTemplate::new("GATE AE", Intermediate, "aerodynamics", LiftCoefficient),
            QuestionTemplate::new("GATE AE", Beginner, "structures", BeamBendingMoment),
            QuestionTemplate::new("GATE AE", Intermediate, "propulsion", CompressorOutletTemp),
            QuestionTemplate::new("GATE AE", Advanced, "flight mechanics", TurnLoadFactor),
            QuestionTemplate::new("GATE AE", Advanced, "mathematics", EigenvalueSum),
            QuestionTemplate::new("GATE AE", Intermediate, "mechanics", ShaftShearStress),
            QuestionTemplate::new("GATE AE", Intermediate, "space dynamics", OrbitalVelocity),
            QuestionTemplate::new("GATE AE", Beginner, "thermodynamics", SpecificHeatCv),
            QuestionTemplate::new("Amazon SDE", Intermediate, "data structures", BstComplexity),
            QuestionTemplate::new(
                "Amazon SDE",
                Advanced,
                "data structures",
                GraphSpaceComplexity,
            ),
            QuestionTemplate::new("Amazon SDE", Intermediate, "data structures", BinaryTreeNodes),
            QuestionTemplate::new("Amazon SDE", Intermediate, "algorithms", SortComplexity),
            QuestionTemplate::new("Amazon SDE", Advanced, "system design", CapTheorem),
            QuestionTemplate::new("CAT", Beginner, "interest", SimpleInterest),
            QuestionTemplate::new("CAT", Intermediate, "algebra", LinearEquation),
            QuestionTemplate::new("CAT", Intermediate, "geometry", TriangleArea),
            QuestionTemplate::new("CAT", Intermediate, "probability", DieProbability),
        ])
    }

    /// Generate with an explicit RNG, for deterministic tests.
    ///
    /// Each question is generated independently; duplicate parameter
    /// draws within one quiz are acceptable. Multiple matching templates
    /// are chosen among uniformly at random.
    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        request: &GenerationRequest,
        rng: &mut R,
    ) -> Result<Vec<Question>> {
        let matching: Vec<&QuestionTemplate> = self
            .templates
            .iter()
            .filter(|t| t.matches(request))
            .collect();
        if matching.is_empty() {
            return Err(QuizError::no_template(&request.goal));
        }

        let mut questions = Vec::with_capacity(request.count);
        for _ in 0..request.count {
            let template = matching[rng.gen_range(0..matching.len())];
            let (question, _) = template.instantiate(rng);
            // A structurally invalid question here is a template-authoring
            // defect, not caller input.
            validate_structure(&question, &Difficulty::ALL).map_err(|err| {
                QuizError::internal(format!(
                    "template for goal '{}' produced an invalid question: {err}",
                    template.goal
                ))
            })?;
            questions.push(question);
        }
        Ok(questions)
    }
}

impl Generator for TemplateGenerator {
    fn generate(&self, request: &GenerationRequest, _pool: &[Question]) -> Result<Vec<Question>> {
        let mut rng = StdRng::from_entropy();
        self.generate_with_rng(request, &mut rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GenerationMode;

    fn seeded_rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    fn template_request(goal: &str, count: usize) -> GenerationRequest {
        GenerationRequest::new(goal, count).with_mode(GenerationMode::Template)
    }

    #[test]
    fn test_generates_requested_count() {
        let generator = TemplateGenerator::builtin();
        let mut rng = seeded_rng(7);
        let questions = generator
            .generate_with_rng(&template_request("GATE AE", 5), &mut rng)
            .unwrap();
        assert_eq!(questions.len(), 5);
        for q in &questions {
            assert_eq!(q.goal, "GATE AE");
            validate_structure(q, &Difficulty::ALL).unwrap();
        }
    }

    #[test]
    fn test_every_builtin_template_yields_valid_questions() {
        let generator = TemplateGenerator::builtin();
        for (i, template) in generator.templates.iter().enumerate() {
            let mut rng = seeded_rng(i as u64);
            for _ in 0..20 {
                let (question, _) = template.instantiate(&mut rng);
                validate_structure(&question, &Difficulty::ALL)
                    .unwrap_or_else(|err| panic!("template {i} ({:?}): {err}", template.formula));
            }
        }
    }

    #[test]
    fn test_builtin_covers_all_stock_goals() {
        let generator = TemplateGenerator::builtin();
        for goal in ["GATE AE", "Amazon SDE", "CAT"] {
            let mut rng = seeded_rng(21);
            let questions = generator
                .generate_with_rng(&template_request(goal, 8), &mut rng)
                .unwrap();
            assert_eq!(questions.len(), 8);
            for q in &questions {
                assert_eq!(q.goal, goal);
            }
        }
    }

    #[test]
    fn test_no_matching_template_errors() {
        let generator = TemplateGenerator::builtin();
        let mut rng = seeded_rng(7);
        let request = GenerationRequest::new("UPSC", 3);
        let err = generator.generate_with_rng(&request, &mut rng).unwrap_err();
        assert_eq!(err.kind(), "no_template");
    }

    #[test]
    fn test_topic_filter_selects_single_template() {
        let generator = TemplateGenerator::builtin();
        let mut rng = seeded_rng(11);
        let request = template_request("GATE AE", 4)
            .with_topic("propulsion")
            .with_difficulty(Difficulty::Beginner);
        let questions = generator.generate_with_rng(&request, &mut rng).unwrap();
        for q in &questions {
            assert_eq!(q.topic, "propulsion");
            assert!(q.question.contains("mass flow rate"));
        }
    }

    #[test]
    fn test_difficulty_filter() {
        let generator = TemplateGenerator::builtin();
        let mut rng = seeded_rng(3);
        let request = template_request("GATE AE", 6).with_difficulty(Difficulty::Advanced);
        let questions = generator.generate_with_rng(&request, &mut rng).unwrap();
        for q in &questions {
            assert_eq!(q.difficulty, Difficulty::Advanced);
        }
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let generator = TemplateGenerator::builtin();
        let request = template_request("GATE AE", 6);
        let first = generator
            .generate_with_rng(&request, &mut seeded_rng(42))
            .unwrap();
        let second = generator
            .generate_with_rng(&request, &mut seeded_rng(42))
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_answer_recomputed_from_params_matches() {
        // The correctness invariant: rendered text and answer come from
        // one shared parameter set.
        let template = QuestionTemplate::new(
            "GATE AE",
            Difficulty::Beginner,
            "propulsion",
            Formula::JetThrust,
        );
        let mut rng = seeded_rng(99);
        for _ in 0..50 {
            let (question, params) = template.instantiate(&mut rng);
            let recomputed =
                format!("{:.2}", params.get("m") as f64 * params.get("v") as f64 / 1000.0);
            assert_eq!(question.answer, recomputed);
        }
    }

    #[test]
    fn test_quadratic_answer_matches_rendered_coefficients() {
        let template = QuestionTemplate::new(
            "GATE AE",
            Difficulty::Beginner,
            "algebra",
            Formula::QuadraticRoots,
        );
        let mut rng = seeded_rng(5);
        for _ in 0..50 {
            let (question, params) = template.instantiate(&mut rng);
            let (a, b, c) = quadratic_coefficients(&params);
            // The rendered text embeds exactly these coefficients.
            assert!(question.question.contains(&format!("{a}x")));
            assert!(question.question.contains(&format!("{b}x")));
            assert!(question.question.contains(&format!("+ {c} =")));
            // And the stated roots satisfy the equation.
            for root in question.answer.split(", ") {
                let x: f64 = root.parse().unwrap();
                let residual = a as f64 * x * x + b as f64 * x + c as f64;
                assert!(residual.abs() < 1e-6, "root {x} does not satisfy equation");
            }
        }
    }

    #[test]
    fn test_mcq_template_produces_valid_shape() {
        let template = QuestionTemplate::new(
            "GATE AE",
            Difficulty::Intermediate,
            "aerodynamics",
            Formula::LiftCoefficient,
        );
        let mut rng = seeded_rng(13);
        for _ in 0..20 {
            let (question, params) = template.instantiate(&mut rng);
            assert_eq!(question.options.len(), 4);
            assert_eq!(
                question.answer,
                format!("B. {:.2}", lift_coefficient(params.get("angle")))
            );
            validate_structure(&question, &Difficulty::ALL).unwrap();
        }
    }

    #[test]
    fn test_choice_parameter_keeps_text_and_answer_aligned() {
        // The adjacency-representation answer depends on the sampled
        // choice; text and answer must come from the same draw.
        let template = QuestionTemplate::new(
            "Amazon SDE",
            Difficulty::Advanced,
            "data structures",
            Formula::GraphSpaceComplexity,
        );
        let mut rng = seeded_rng(17);
        for _ in 0..30 {
            let (question, _) = template.instantiate(&mut rng);
            if question.question.contains("adjacency matrix") {
                assert_eq!(question.answer, "C. O(V\u{b2})");
            } else {
                assert!(question.question.contains("adjacency list"));
                assert_eq!(question.answer, "B. O(V + E)");
            }
        }
    }

    #[test]
    fn test_fixed_answer_template() {
        let template = QuestionTemplate::new(
            "Amazon SDE",
            Difficulty::Advanced,
            "system design",
            Formula::CapTheorem,
        );
        let mut rng = seeded_rng(29);
        let (question, _) = template.instantiate(&mut rng);
        assert_eq!(question.options.len(), 4);
        assert_eq!(
            question.answer,
            "A. Consistency, Availability, Partition tolerance"
        );
        validate_structure(&question, &Difficulty::ALL).unwrap();
    }

    #[test]
    fn test_linear_equation_solution_satisfies_rendered_equation() {
        let template = QuestionTemplate::new(
            "CAT",
            Difficulty::Intermediate,
            "algebra",
            Formula::LinearEquation,
        );
        let mut rng = seeded_rng(31);
        for _ in 0..50 {
            let (question, params) = template.instantiate(&mut rng);
            let (a, b, x) = (params.get("a"), params.get("b"), params.get("x"));
            assert!(question.question.contains(&format!("{a}x + {b} = {}", a * x + b)));
            assert_eq!(question.answer, format!("B. {x}"));
        }
    }

    #[test]
    fn test_wildcard_topic_template_matches_any_topic() {
        let wildcard = QuestionTemplate {
            goal: "GATE AE".to_string(),
            difficulty: Difficulty::Beginner,
            topic: None,
            formula: Formula::JetThrust,
        };
        let generator = TemplateGenerator::new(vec![wildcard]);
        let mut rng = seeded_rng(1);
        let request = template_request("GATE AE", 2).with_topic("anything at all");
        let questions = generator.generate_with_rng(&request, &mut rng).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].topic, "general");
    }
}
