use std::collections::HashMap;
use std::env as stdenv;
use std::path::PathBuf;

/// Name→value store threaded through the pipeline engine.
///
/// The environment is owned by one interpreter session: the variable
/// substitutor reads it, assignment stages mutate it, and spawned external
/// processes inherit its variables and working directory. It is never reset
/// between input lines.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Session variables, seeded from the process environment at startup.
    pub vars: HashMap<String, String>,
    /// Working directory reported by `pwd` and used for spawning externals.
    pub current_dir: PathBuf,
}

impl Environment {
    /// Capture the current process state into a fresh session environment.
    pub fn new() -> Self {
        Self {
            vars: stdenv::vars().collect(),
            current_dir: stdenv::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// An environment with no variables, rooted at the current directory.
    ///
    /// Mostly useful in tests, where lookups must not be satisfied by
    /// whatever the host process happens to have exported.
    pub fn empty() -> Self {
        Self {
            vars: HashMap::new(),
            current_dir: stdenv::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Value of a session variable, if set.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    /// Set or override a session variable.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
