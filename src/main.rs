//! Quizbank CLI entry point.
//!
//! A thin wrapper over [`quizbank::Engine`]; all business rules live in
//! the library.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use quizbank::config::default_data_dir;
use quizbank::{
    Config, Difficulty, Engine, GenerationMode, GenerationRequest, GoalMutation, Question,
    QuizError, Result,
};

/// Quiz generation over a consistent file-backed question bank
#[derive(Parser)]
#[command(name = "quizbank")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Data directory (default: ~/.quizbank/data)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a quiz for a registered goal
    Generate {
        /// The goal to generate for
        goal: String,
        /// Number of questions
        #[arg(long, short, default_value_t = 5)]
        count: usize,
        /// Difficulty filter
        #[arg(long, value_enum)]
        difficulty: Option<DifficultyArg>,
        /// Topic filter
        #[arg(long)]
        topic: Option<String>,
        /// Generation mode (default from config)
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
    },

    /// Manage goals
    Goal {
        #[command(subcommand)]
        command: GoalCommands,
    },

    /// List questions in the bank
    Questions {
        /// Restrict to one goal
        #[arg(long)]
        goal: Option<String>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
    },

    /// Report bank counts and artifact consistency
    Check {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum GoalCommands {
    /// Register a goal, seeding it from a JSON question file
    Add {
        /// The goal name
        name: String,
        /// Path to a JSON array of questions
        #[arg(long)]
        questions: Option<PathBuf>,
    },
    /// Deregister an empty goal
    Remove {
        /// The goal name
        name: String,
    },
    /// List registered goals
    List,
}

#[derive(Clone, Copy, ValueEnum)]
enum DifficultyArg {
    Beginner,
    Intermediate,
    Advanced,
}

impl From<DifficultyArg> for Difficulty {
    fn from(arg: DifficultyArg) -> Self {
        match arg {
            DifficultyArg::Beginner => Difficulty::Beginner,
            DifficultyArg::Intermediate => Difficulty::Intermediate,
            DifficultyArg::Advanced => Difficulty::Advanced,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Retrieval,
    Template,
}

impl From<ModeArg> for GenerationMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Retrieval => GenerationMode::Retrieval,
            ModeArg::Template => GenerationMode::Template,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let data_dir = cli
        .data_dir
        .or_else(default_data_dir)
        .ok_or_else(|| QuizError::config("cannot determine a data directory; pass --data-dir"))?;
    let config = Config::load(Some(data_dir.as_path()))?;
    let engine = Engine::open(&data_dir, &config)?;

    match cli.command {
        Commands::Generate {
            goal,
            count,
            difficulty,
            topic,
            mode,
            json,
        } => {
            let mut request = GenerationRequest::new(goal, count);
            if let Some(d) = difficulty {
                request = request.with_difficulty(d.into());
            }
            if let Some(t) = topic {
                request = request.with_topic(t);
            }
            if let Some(m) = mode {
                request = request.with_mode(m.into());
            }

            let quiz = engine.generate(&request)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&quiz)?);
            } else {
                println!("{} ({} questions)", quiz.quiz_id, quiz.questions.len());
                for (i, q) in quiz.questions.iter().enumerate() {
                    println!("\n{}. [{}] {}", i + 1, q.difficulty.as_str(), q.question);
                    for opt in &q.options {
                        println!("   {opt}");
                    }
                    println!("   answer: {}", q.answer);
                }
            }
        }

        Commands::Goal { command } => match command {
            GoalCommands::Add { name, questions } => {
                let seed = match questions {
                    Some(path) => read_questions(&path)?,
                    None => Vec::new(),
                };
                match engine.add_goal(&name, &seed)? {
                    GoalMutation::Added { appended } => {
                        println!("registered goal '{name}' with {appended} question(s)");
                    }
                    GoalMutation::Appended { appended } => {
                        println!("appended {appended} question(s) to goal '{name}'");
                    }
                    GoalMutation::Removed => unreachable!("add never removes"),
                }
            }
            GoalCommands::Remove { name } => {
                engine.remove_goal(&name)?;
                println!("removed goal '{name}'");
            }
            GoalCommands::List => {
                for goal in engine.goals()? {
                    println!("{goal}");
                }
            }
        },

        Commands::Questions { goal, json } => {
            let pool = engine.questions()?;
            let selected: Vec<&Question> = pool
                .iter()
                .filter(|q| goal.as_deref().map_or(true, |g| q.goal == g))
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&selected)?);
            } else {
                for q in selected {
                    println!(
                        "[{}] [{}] [{}] {}",
                        q.goal,
                        q.difficulty.as_str(),
                        q.topic,
                        q.question
                    );
                }
            }
        }

        Commands::Check { json } => {
            let summary = engine.summary()?;
            let consistent = engine.artifacts_consistent()?;
            if json {
                let report = serde_json::json!({
                    "total": summary.total,
                    "by_goal": summary.by_goal,
                    "by_type": summary.by_type,
                    "artifacts_consistent": consistent,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("questions: {}", summary.total);
                for (goal, count) in &summary.by_goal {
                    println!("  {goal}: {count}");
                }
                println!(
                    "artifacts: {}",
                    if consistent { "consistent" } else { "INCONSISTENT" }
                );
            }
        }
    }

    Ok(())
}

fn read_questions(path: &PathBuf) -> Result<Vec<Question>> {
    let content = fs::read_to_string(path).map_err(|e| QuizError::persistence(path, e))?;
    Ok(serde_json::from_str(&content)?)
}
