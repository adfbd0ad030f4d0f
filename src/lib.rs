//! A line-oriented command interpreter with bash-like quoting and pipelines.
//!
//! One input line is split into a pipeline of commands on unquoted `|`,
//! each stage has its `$NAME` references expanded and its quotes resolved,
//! and the stages run in order with each stage's textual output threaded
//! into the next stage's input. A small set of builtins (`echo`, `cat`,
//! `wc`, `pwd`, `grep`) runs in-process; any other command name launches
//! an external program.
//!
//! The main entry point is [`Interpreter`], whose `execute_pipeline` runs a
//! single line and whose `repl` drives an interactive session. The public
//! modules [`lexer`], [`parser`] and [`env`] expose the quoting state
//! machine, the substitution pass and the environment store for use on
//! their own.

mod builtin;
pub mod command;
pub mod env;
mod external;
mod interpreter;
pub mod lexer;
pub mod parser;

pub use env::Environment;
pub use interpreter::{Interpreter, PARSE_ERROR, PipelineResult};
