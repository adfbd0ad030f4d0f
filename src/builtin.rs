//! In-process command implementations.
//!
//! Each builtin is a plain function `(args, stdin) -> Result<String>`: it
//! consumes the previous stage's output and returns the text handed to the
//! next stage. File arguments are read eagerly; nothing here streams.

use crate::env::Environment;
use anyhow::{Context, Result, anyhow};
use argh::{EarlyExit, FromArgs};
use regex::RegexBuilder;
use std::fmt::Write as _;
use std::fs;

/// Write the arguments separated by single spaces. No trailing newline is
/// added; the REPL prints one when it shows the pipeline result.
pub fn echo(args: &[String]) -> Result<String> {
    Ok(args.join(" "))
}

/// Concatenate file contents, or pass the piped input through unchanged when
/// no files are named.
pub fn cat(args: &[String], stdin: Option<&str>) -> Result<String> {
    if args.is_empty() {
        return Ok(stdin.unwrap_or_default().to_string());
    }
    let mut output = String::new();
    for fname in args {
        let contents =
            fs::read_to_string(fname).map_err(|e| anyhow!("cat error: {}: {}", fname, e))?;
        output.push_str(&contents);
    }
    Ok(output)
}

/// Count lines, words and bytes.
///
/// Without file arguments the piped input is counted and must be non-empty.
/// With files, one `lines words bytes` row is emitted per file followed by a
/// `total` row. Line counting differs between the two modes on purpose: piped
/// input counts newline-separated segments (`"abc"` is one line), files count
/// the lines a reader would iterate.
pub fn wc(args: &[String], stdin: Option<&str>) -> Result<String> {
    if args.is_empty() {
        let input = match stdin {
            Some(s) if !s.is_empty() => s,
            _ => return Err(anyhow!("no input given to wc")),
        };
        let lines = input.split('\n').count();
        let words = input.split_whitespace().count();
        let bytes = input.len();
        return Ok(format!("{} {} {}", lines, words, bytes));
    }

    let mut output = String::new();
    let (mut total_lines, mut total_words, mut total_bytes) = (0, 0, 0);
    for fname in args {
        let contents =
            fs::read_to_string(fname).map_err(|e| anyhow!("wc error: {}: {}", fname, e))?;
        let lines = contents.lines().count();
        let words = contents.split_whitespace().count();
        let bytes = contents.len();
        total_lines += lines;
        total_words += words;
        total_bytes += bytes;
        writeln!(output, "{} {} {}", lines, words, bytes)?;
    }
    write!(output, "total {} {} {}", total_lines, total_words, total_bytes)?;
    Ok(output)
}

/// Report the session's working directory.
pub fn pwd(env: &Environment) -> Result<String> {
    Ok(env.current_dir.to_string_lossy().into_owned())
}

#[derive(FromArgs)]
/// print lines matching a pattern
struct Grep {
    #[argh(positional)]
    /// the pattern to search for (a regular expression)
    pattern: String,

    #[argh(positional, greedy)]
    /// files to search. If none provided, reads the piped input.
    files: Vec<String>,

    #[argh(switch, short = 'w')]
    /// match only whole words (using non-word characters as boundaries)
    word_regexp: bool,

    #[argh(switch, short = 'i')]
    /// ignore case distinctions
    ignore_case: bool,

    #[argh(option, short = 'A', default = "0")]
    /// print NUM lines of trailing context after matching lines
    after_context: usize,
}

impl Grep {
    /// Scan one source and append the matching lines (plus any trailing
    /// context) to `output`, each line newline-terminated and prefixed with
    /// `name:` when a file name is given.
    fn scan(&self, contents: &str, file_name: Option<&str>, re: &regex::Regex, output: &mut String) {
        let lines: Vec<&str> = contents.lines().collect();
        if lines.is_empty() {
            return;
        }

        let mut to_print = vec![false; lines.len()];
        for (i, line) in lines.iter().enumerate() {
            if re.is_match(line) {
                let end = (i + self.after_context + 1).min(lines.len());
                for flag in &mut to_print[i..end] {
                    *flag = true;
                }
            }
        }

        let prefix = file_name
            .map(|name| format!("{}:", name))
            .unwrap_or_default();
        let mut last_printed: Option<usize> = None;
        for (i, line) in lines.iter().enumerate() {
            if !to_print[i] {
                continue;
            }
            if self.after_context > 0 && last_printed.is_some_and(|last| i > last + 1) {
                output.push_str("--\n");
            }
            output.push_str(&prefix);
            output.push_str(line);
            output.push('\n');
            last_printed = Some(i);
        }
    }
}

/// Search the piped input or the named files for a regex pattern.
///
/// Flags are parsed with argh: `-i` ignore case, `-w` whole words only,
/// `-A NUM` trailing context lines. `--help` output is returned as the
/// command's result rather than treated as a failure.
pub fn grep(args: &[String], stdin: Option<&str>) -> Result<String> {
    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
    let grep = match Grep::from_args(&["grep"], &arg_refs) {
        Ok(grep) => grep,
        Err(EarlyExit { output, status }) => {
            return if status.is_err() {
                Err(anyhow!("{}", output))
            } else {
                Ok(output)
            };
        }
    };

    let pattern = if grep.word_regexp {
        format!(r"\b({})\b", grep.pattern)
    } else {
        grep.pattern.clone()
    };
    let re = RegexBuilder::new(&pattern)
        .case_insensitive(grep.ignore_case)
        .build()
        .with_context(|| format!("invalid regex pattern: {}", pattern))?;

    let mut output = String::new();
    if grep.files.is_empty() {
        grep.scan(stdin.unwrap_or_default(), None, &re, &mut output);
    } else {
        for file_name in &grep.files {
            let contents = fs::read_to_string(file_name)
                .map_err(|e| anyhow!("grep error: {}: {}", file_name, e))?;
            grep.scan(&contents, Some(file_name), &re, &mut output);
        }
    }
    Ok(output)
}
