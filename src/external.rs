//! Out-of-process command execution.
//!
//! The external executor receives the full token list as argv, resolves the
//! program against the session's `PATH`, and runs it synchronously: the
//! threaded stdin is written to the child, its stdout becomes the next
//! stage's input, and its stderr is captured for diagnostics.

use crate::env::Environment;
use anyhow::{Context, Result, anyhow};
use std::borrow::Cow;
use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Spawn `argv[0]` with the remaining tokens as arguments.
///
/// The child sees the session environment's variables and working directory,
/// so assignments made earlier in the session are visible to it. Failure
/// modes: unresolvable program (`<name> command not found`) and nonzero exit
/// status (`<name> error: <stderr>`). On success the child's stdout is
/// returned with trailing whitespace stripped.
pub fn run(argv: &[String], stdin: Option<&str>, env: &Environment) -> Result<String> {
    let name = &argv[0];
    let search_paths = env.get_var("PATH").unwrap_or_default();
    let program = find_command_path(OsStr::new(&search_paths), Path::new(name))
        .ok_or_else(|| anyhow!("{} command not found", name))?
        .into_owned();

    let mut child = Command::new(program)
        .args(&argv[1..])
        .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .current_dir(&env.current_dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("{}: failed to spawn", name))?;

    if let Some(input) = stdin {
        let mut child_stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("{}: no stdin handle", name))?;
        child_stdin
            .write_all(input.as_bytes())
            .with_context(|| format!("{}: failed to write stdin", name))?;
        // Dropping the handle closes the pipe so the child sees EOF.
    } else {
        drop(child.stdin.take());
    }

    let output = child
        .wait_with_output()
        .with_context(|| format!("{}: failed to wait", name))?;

    if !output.status.success() {
        return Err(anyhow!(
            "{} error: {}",
            name,
            String::from_utf8_lossy(&output.stderr)
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout)
        .trim_end()
        .to_string())
}

/// Resolve a command path the way a shell would.
///
/// Absolute paths and multi-component relative paths are checked directly;
/// a `./`-prefixed path is checked against the current directory; a single
/// bare component is searched for in each directory of `search_paths`.
/// An empty path never resolves.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return existing(path).map(Cow::Borrowed);
    }

    let search_in_current_dir = cfg!(not(unix)) || path.starts_with("./");
    if search_in_current_dir && path.exists() {
        return Some(Cow::Borrowed(path));
    }

    let mut components = path.components();
    let first = components.next();
    let second = components.next();
    match (first, second) {
        (None, None) => None,
        (Some(only), None) => find_in_path(search_paths, only.as_os_str()).map(Cow::Owned),
        _ => existing(path).map(Cow::Borrowed),
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_paths)
        .map(|dir| dir.join(cmd))
        .find(|candidate| candidate.exists())
}

fn existing(path: &Path) -> Option<&Path> {
    if path.exists() { Some(path) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    #[cfg(unix)]
    fn absolute_path_resolves_when_existing() {
        let path = Path::new("/bin/sh");
        let found = find_command_path(OsStr::new("/bin"), path).expect("find /bin/sh");
        assert_eq!(found.as_ref(), path);
    }

    #[test]
    #[cfg(unix)]
    fn absolute_path_missing_is_none() {
        assert!(find_command_path(OsStr::new("/bin"), Path::new("/bin/nonexisting")).is_none());
    }

    #[test]
    #[cfg(unix)]
    fn single_component_searched_in_path() {
        let found = find_command_path(OsStr::new("/bin"), Path::new("sh"))
            .expect("find sh via PATH search");
        assert!(found.as_ref().ends_with("sh"));
        assert!(found.as_ref().starts_with("/bin"));
    }

    #[test]
    fn single_component_missing_is_none() {
        assert!(find_command_path(OsStr::new("/bin"), Path::new("nonexisting")).is_none());
    }

    #[test]
    fn empty_path_is_none() {
        assert!(find_command_path(OsStr::new("/bin"), Path::new("")).is_none());
    }

    #[test]
    #[cfg(unix)]
    fn runs_program_and_strips_trailing_whitespace() {
        let env = Environment::new();
        let out = run(&strings(&["sh", "-c", "echo abc"]), None, &env).unwrap();
        assert_eq!(out, "abc");
    }

    #[test]
    #[cfg(unix)]
    fn feeds_threaded_stdin_to_child() {
        let env = Environment::new();
        let out = run(&strings(&["sh", "-c", "cat"]), Some("piped text"), &env).unwrap();
        assert_eq!(out, "piped text");
    }

    #[test]
    #[cfg(unix)]
    fn nonzero_exit_reports_stderr() {
        let env = Environment::new();
        let err = run(
            &strings(&["sh", "-c", "echo boom >&2; exit 3"]),
            None,
            &env,
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("sh error:"), "got: {}", msg);
        assert!(msg.contains("boom"), "got: {}", msg);
    }

    #[test]
    fn unknown_program_reports_not_found() {
        let env = Environment::new();
        let err = run(&strings(&["no_such_program_pipeshell"]), None, &env).unwrap_err();
        assert_eq!(
            err.to_string(),
            "no_such_program_pipeshell command not found"
        );
    }

    #[test]
    #[cfg(unix)]
    fn child_sees_session_variables() {
        let mut env = Environment::new();
        env.set_var("PIPESHELL_TEST_VAR", "visible");
        let out = run(
            &strings(&["sh", "-c", "printf %s \"$PIPESHELL_TEST_VAR\""]),
            None,
            &env,
        )
        .unwrap();
        assert_eq!(out, "visible");
    }
}
