use crate::command::Executor;
use crate::env::Environment;
use crate::lexer;
use crate::parser::{self, Stage};
use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// Outcome of running one input line.
///
/// `Exit` is a sentinel distinct from every string output, including the
/// empty string; the REPL terminates when it sees one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineResult {
    /// Final threaded stdin of the pipeline (empty when no stage produced
    /// output), or the literal parse-failure sentinel.
    Output(String),
    /// An `exit` stage was reached somewhere in the pipeline.
    Exit,
}

/// Returned in place of output when stage splitting finds an empty stage.
pub const PARSE_ERROR: &str = "error while parsing";

/// A line-oriented command interpreter with bash-like quoting, variable
/// substitution and pipelines.
///
/// The interpreter owns its [`Environment`] for the whole session; variable
/// assignments persist across lines.
///
/// Example
/// ```
/// use pipeshell::{Interpreter, PipelineResult};
/// let mut sh = Interpreter::new();
/// let result = sh.execute_pipeline("echo hello world").unwrap();
/// assert_eq!(result, PipelineResult::Output("hello world".to_string()));
/// ```
pub struct Interpreter {
    env: Environment,
}

impl Interpreter {
    /// Create an interpreter whose environment is captured from the process.
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
        }
    }

    /// Create an interpreter over a caller-provided environment.
    pub fn with_env(env: Environment) -> Self {
        Self { env }
    }

    /// The session environment.
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Execute one input line as a pipeline.
    ///
    /// The line is split into stages on unquoted `|`; each stage is
    /// variable-substituted, tokenized and quote-stripped, then classified.
    /// Assignments mutate the environment without touching the threaded
    /// stdin, an `exit` stage short-circuits with [`PipelineResult::Exit`],
    /// and every other stage is dispatched through [`Executor::lookup`] with
    /// the previous stage's output as its input.
    ///
    /// A pipeline containing an empty stage (consecutive or boundary pipes)
    /// yields [`PARSE_ERROR`] as its output without executing anything.
    /// Executor failures propagate as `Err` and abort the remaining stages.
    pub fn execute_pipeline(&mut self, line: &str) -> Result<PipelineResult> {
        let stages: Vec<Stage> = lexer::split_stages(line)
            .iter()
            .map(|stage| parser::parse_stage(&parser::substitute_variables(stage, &self.env)))
            .collect();

        if stages.contains(&Stage::Empty) {
            return Ok(PipelineResult::Output(PARSE_ERROR.to_string()));
        }

        let mut stdin: Option<String> = None;
        for stage in stages {
            match stage {
                Stage::Assignment { name, value } => self.env.set_var(name, value),
                Stage::Exit => return Ok(PipelineResult::Exit),
                Stage::Command(argv) => {
                    let output =
                        Executor::lookup(&argv[0]).execute(&argv, stdin.as_deref(), &self.env)?;
                    stdin = Some(output);
                }
                Stage::Empty => unreachable!("empty stages rejected above"),
            }
        }
        Ok(PipelineResult::Output(stdin.unwrap_or_default()))
    }

    /// Interactive read–eval–print loop.
    ///
    /// Reads lines with rustyline, prints each pipeline's output (or an
    /// execution failure's message) and keeps going until an `exit` stage,
    /// Ctrl-C or end of input.
    pub fn repl(&mut self) -> rustyline::Result<()> {
        let mut rl = DefaultEditor::new()?;
        loop {
            match rl.readline("$ ") {
                Ok(line) => {
                    rl.add_history_entry(line.as_str())?;
                    match self.execute_pipeline(&line) {
                        Ok(PipelineResult::Exit) => break,
                        Ok(PipelineResult::Output(output)) => println!("{}", output),
                        Err(err) => println!("{}", err),
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => {
                    println!("Error: {:?}", err);
                    break;
                }
            }
        }
        Ok(())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
