//! Variable substitution and per-stage parsing.
//!
//! A stage arrives here as one `|`-delimited slice of the input line. It is
//! substituted first (so `$NAME` can introduce new words), then split into
//! tokens, quote-stripped, and classified as an assignment, an exit directive
//! or a dispatchable command.

use crate::env::Environment;
use crate::lexer::{self, QuoteState};
use regex::Regex;
use std::sync::OnceLock;

/// One classified pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// No tokens at all, the artifact of consecutive or boundary pipes.
    /// The engine treats a pipeline containing one of these as malformed.
    Empty,
    /// A single `NAME=VALUE` token; mutates the environment, produces no
    /// output and leaves the threaded stdin untouched.
    Assignment { name: String, value: String },
    /// The single token `exit`; terminates the whole session.
    Exit,
    /// Anything else: an argument vector ready for executor dispatch.
    Command(Vec<String>),
}

fn assignment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([a-zA-Z_]\w*)=(.*)$").expect("valid assignment regex"))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Expand every `$NAME` reference in `input` against `env`.
///
/// Single forward pass with an index cursor; each step consumes at least one
/// input character. Single-quoted regions are copied verbatim. In unquoted
/// and double-quoted regions, `$` followed by one or more word characters is
/// replaced by the variable's value, or by nothing when the variable is
/// unset. A `$` with no word character after it stays literal, so `$` and
/// `$$` survive unchanged.
pub fn substitute_variables(input: &str, env: &Environment) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut state = QuoteState::Unquoted;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        state = state.next(c);
        if state == QuoteState::SingleQuoted || c != '$' {
            out.push(c);
            i += 1;
            continue;
        }
        let mut end = i + 1;
        while end < chars.len() && is_word_char(chars[end]) {
            end += 1;
        }
        if end == i + 1 {
            // Bare dollar, nothing to expand.
            out.push('$');
            i += 1;
        } else {
            let name: String = chars[i + 1..end].iter().collect();
            if let Some(value) = env.get_var(&name) {
                out.push_str(&value);
            }
            i = end;
        }
    }
    out
}

/// Tokenize and classify one already-substituted stage.
pub fn parse_stage(stage: &str) -> Stage {
    let tokens: Vec<String> = lexer::split_tokens(stage)
        .iter()
        .map(|t| lexer::strip_quotes(t))
        .collect();

    if tokens.is_empty() {
        return Stage::Empty;
    }
    if tokens.len() == 1 {
        if let Some(captures) = assignment_pattern().captures(&tokens[0]) {
            return Stage::Assignment {
                name: captures[1].to_string(),
                value: captures[2].to_string(),
            };
        }
        if tokens[0] == "exit" {
            return Stage::Exit;
        }
    }
    Stage::Command(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with(pairs: &[(&str, &str)]) -> Environment {
        let mut env = Environment::empty();
        for (k, v) in pairs {
            env.set_var(*k, *v);
        }
        env
    }

    #[test]
    fn substitute_no_variables() {
        let env = env_with(&[("a", "1"), ("b", "2")]);
        assert_eq!(substitute_variables("string", &env), "string");
        assert_eq!(substitute_variables("", &env), "");
    }

    #[test]
    fn substitute_dollar_without_name_is_literal() {
        let env = env_with(&[("a", "1")]);
        assert_eq!(substitute_variables("string$", &env), "string$");
        assert_eq!(substitute_variables("$", &env), "$");
        assert_eq!(substitute_variables("$$", &env), "$$");
    }

    #[test]
    fn substitute_existing_variables() {
        let env = env_with(&[("a", "1"), ("b", "2")]);
        assert_eq!(substitute_variables("$a$b", &env), "12");
        assert_eq!(substitute_variables("$b", &env), "2");
        assert_eq!(substitute_variables("$a", &env), "1");
    }

    #[test]
    fn substitute_skips_single_quoted_regions() {
        let env = env_with(&[("a", "1"), ("abc", "3")]);
        assert_eq!(substitute_variables("'$a'", &env), "'$a'");
        assert_eq!(substitute_variables("'$abc'", &env), "'$abc'");
    }

    #[test]
    fn substitute_expands_inside_double_quotes() {
        let env = env_with(&[("a", "1"), ("b", "2")]);
        assert_eq!(substitute_variables("\"$b\"", &env), "\"2\"");
        assert_eq!(substitute_variables("\"$a\"", &env), "\"1\"");
        assert_eq!(substitute_variables("\"$a$b\"", &env), "\"12\"");
    }

    #[test]
    fn substitute_unset_becomes_empty() {
        let env = Environment::empty();
        assert_eq!(substitute_variables("$asd", &env), "");
        assert_eq!(substitute_variables("abc$abc", &env), "abc");
        assert_eq!(
            substitute_variables("a\"$asd\"b\"$assd\"c", &env),
            "a\"\"b\"\"c"
        );
    }

    #[test]
    fn substitute_mixed_quote_regions() {
        let env = env_with(&[("x", "9")]);
        assert_eq!(substitute_variables("'$x' $x \"$x\"", &env), "'$x' 9 \"9\"");
    }

    #[test]
    fn classify_assignment() {
        assert_eq!(
            parse_stage("a=5"),
            Stage::Assignment {
                name: "a".to_string(),
                value: "5".to_string(),
            }
        );
        assert_eq!(
            parse_stage("_5=3"),
            Stage::Assignment {
                name: "_5".to_string(),
                value: "3".to_string(),
            }
        );
        assert_eq!(
            parse_stage("_=3"),
            Stage::Assignment {
                name: "_".to_string(),
                value: "3".to_string(),
            }
        );
    }

    #[test]
    fn classify_assignment_value_keeps_everything_after_equals() {
        assert_eq!(
            parse_stage("a=5=6"),
            Stage::Assignment {
                name: "a".to_string(),
                value: "5=6".to_string(),
            }
        );
        assert_eq!(
            parse_stage("msg=\"hello world\""),
            Stage::Assignment {
                name: "msg".to_string(),
                value: "hello world".to_string(),
            }
        );
    }

    #[test]
    fn classify_non_assignments() {
        assert_eq!(parse_stage("asd"), Stage::Command(vec!["asd".to_string()]));
        assert_eq!(parse_stage("5=3"), Stage::Command(vec!["5=3".to_string()]));
        // Two tokens are never an assignment, even if the first one matches.
        assert_eq!(
            parse_stage("a=5 b=6"),
            Stage::Command(vec!["a=5".to_string(), "b=6".to_string()])
        );
    }

    #[test]
    fn classify_exit() {
        assert_eq!(parse_stage("exit"), Stage::Exit);
        assert_eq!(
            parse_stage("exit exit"),
            Stage::Command(vec!["exit".to_string(), "exit".to_string()])
        );
        assert_eq!(
            parse_stage("asdlj"),
            Stage::Command(vec!["asdlj".to_string()])
        );
    }

    #[test]
    fn classify_empty() {
        assert_eq!(parse_stage(""), Stage::Empty);
    }

    #[test]
    fn classify_strips_quotes_from_tokens() {
        assert_eq!(
            parse_stage("echo \"a b\" 'c'"),
            Stage::Command(vec![
                "echo".to_string(),
                "a b".to_string(),
                "c".to_string()
            ])
        );
    }

    #[test]
    fn quoted_empty_token_survives_as_empty_string() {
        assert_eq!(parse_stage("''"), Stage::Command(vec![String::new()]));
    }

    #[test]
    fn quoted_exit_is_still_exit_after_stripping() {
        // Quote removal happens before classification, mirroring the way a
        // shell treats 'exit' and exit identically.
        assert_eq!(parse_stage("'exit'"), Stage::Exit);
    }
}
