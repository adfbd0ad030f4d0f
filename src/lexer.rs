//! Quote-aware lexical analysis for a single input line.
//!
//! Everything in this module is built on one primitive: a tri-state quote
//! tracker folded over the line left to right. On top of it sit the unquoted
//! scanner (positions of a character class outside quotes), the two splitters
//! (pipe-level and token-level) and the quote stripper.

/// Quoting state at a position in a line.
///
/// `SingleQuoted` means an opening `'` was seen and not yet closed,
/// `DoubleQuoted` the same for `"`. The state after a prefix depends only on
/// that prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteState {
    Unquoted,
    SingleQuoted,
    DoubleQuoted,
}

impl QuoteState {
    /// State after consuming one more character.
    ///
    /// The matching quote closes its region; the other quote kind inside an
    /// open region is an ordinary character.
    pub fn next(self, c: char) -> QuoteState {
        match (self, c) {
            (QuoteState::SingleQuoted, '\'') => QuoteState::Unquoted,
            (QuoteState::DoubleQuoted, '"') => QuoteState::Unquoted,
            (QuoteState::Unquoted, '\'') => QuoteState::SingleQuoted,
            (QuoteState::Unquoted, '"') => QuoteState::DoubleQuoted,
            (state, _) => state,
        }
    }
}

/// Byte offsets of all characters matching `pred` that sit in an unquoted
/// region of `line`.
///
/// Single pass, carrying only the running [`QuoteState`]. Matches inside a
/// quoted region are skipped entirely. An empty input yields an empty vector.
pub fn find_unquoted(line: &str, pred: impl Fn(char) -> bool) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut state = QuoteState::Unquoted;
    for (idx, c) in line.char_indices() {
        state = state.next(c);
        if state == QuoteState::Unquoted && pred(c) {
            positions.push(idx);
        }
    }
    positions
}

/// Split a full input line into pipeline stages on unquoted `|`.
///
/// Every field is preserved: `a||b` gives three pieces with an empty middle,
/// `a|` gives a trailing empty piece. Pieces are trimmed of surrounding
/// whitespace but keep their quote characters untouched. An empty line has
/// no stages at all.
pub fn split_stages(line: &str) -> Vec<String> {
    if line.is_empty() {
        return Vec::new();
    }
    let mut stages = Vec::new();
    let mut start = 0;
    for idx in find_unquoted(line, |c| c == '|') {
        stages.push(line[start..idx].trim().to_string());
        start = idx + 1;
    }
    stages.push(line[start..].trim().to_string());
    stages
}

/// Split one stage into argument tokens on unquoted whitespace.
///
/// Unlike [`split_stages`], runs of whitespace merge into a single separator
/// and no empty token is ever produced. Tokens keep their quote characters;
/// stripping happens per token in [`strip_quotes`].
pub fn split_tokens(stage: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut start = 0;
    for idx in find_unquoted(stage, char::is_whitespace) {
        if idx > start {
            tokens.push(stage[start..idx].to_string());
        }
        let sep_len = stage[idx..].chars().next().map_or(1, char::len_utf8);
        start = idx + sep_len;
    }
    if start < stage.len() {
        tokens.push(stage[start..].to_string());
    }
    tokens
}

/// Remove the quote characters that open or close a quoted region, keeping
/// quote characters that appear inside a region of the other kind.
///
/// `'"'` yields a literal `"`; adjacent quoted segments concatenate, so
/// `"ab""cd"` yields `abcd`. A dangling opening quote is removed and the
/// rest of the token is kept literally.
pub fn strip_quotes(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    let mut state = QuoteState::Unquoted;
    for c in token.chars() {
        let is_quote = c == '\'' || c == '"';
        if is_quote && state == QuoteState::Unquoted {
            // Opening quote: toggles the state, never part of the content.
            state = state.next(c);
            continue;
        }
        state = state.next(c);
        if is_quote && state == QuoteState::Unquoted {
            // Closing quote of the currently open region.
            continue;
        }
        out.push(c);
    }
    out
}
