use crate::builtin;
use crate::env::Environment;
use crate::external;
use anyhow::Result;

/// The closed set of executors the pipeline engine can dispatch to.
///
/// The first token of a stage selects a variant through [`Executor::lookup`]:
/// the five builtin names map to in-process implementations, anything else
/// falls back to [`Executor::External`], which spawns an out-of-process
/// program.
///
/// Every variant implements the same capability: `execute(args, stdin) ->
/// output`, where `stdin` is the previous stage's output (or nothing, for the
/// first stage) and the returned string is handed to the next stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Executor {
    Echo,
    Cat,
    Wc,
    Pwd,
    Grep,
    External,
}

impl Executor {
    /// Resolve a command name to an executor variant.
    pub fn lookup(name: &str) -> Executor {
        match name {
            "echo" => Executor::Echo,
            "cat" => Executor::Cat,
            "wc" => Executor::Wc,
            "pwd" => Executor::Pwd,
            "grep" => Executor::Grep,
            _ => Executor::External,
        }
    }

    /// Run the executor on a full argument vector.
    ///
    /// Builtins receive `argv[1..]` as their arguments; the external variant
    /// receives the whole vector as the child's argv, with no re-splitting or
    /// re-quoting. Errors carry a human-readable message and abort the rest
    /// of the pipeline.
    pub fn execute(
        self,
        argv: &[String],
        stdin: Option<&str>,
        env: &Environment,
    ) -> Result<String> {
        let args = &argv[1..];
        match self {
            Executor::Echo => builtin::echo(args),
            Executor::Cat => builtin::cat(args, stdin),
            Executor::Wc => builtin::wc(args, stdin),
            Executor::Pwd => builtin::pwd(env),
            Executor::Grep => builtin::grep(args, stdin),
            Executor::External => external::run(argv, stdin, env),
        }
    }
}
