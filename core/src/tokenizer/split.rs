//! Whitespace splitting that keeps double-quoted runs together.

use std::ops::Range;

/// Splits a command line into raw arguments.
///
/// Whitespace outside double quotes separates arguments. Quotes are kept in
/// the argument text, so every argument is a verbatim slice of `line`.
///
/// # Examples
///
/// ```
/// use command_grammar_core::split_command_line;
///
/// assert_eq!(
///     split_command_line(r#"copy "my file.txt" --to=C:\out"#),
///     vec!["copy", r#""my file.txt""#, r"--to=C:\out"],
/// );
/// ```
pub fn split_command_line(line: &str) -> Vec<String> {
    token_spans(line)
        .into_iter()
        .map(|span| line[span].to_string())
        .collect()
}

/// Byte ranges of the arguments [`split_command_line`] would produce.
pub(crate) fn token_spans(line: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;
    let mut in_quotes = false;

    for (i, c) in line.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
            start.get_or_insert(i);
        } else if c.is_whitespace() && !in_quotes {
            if let Some(s) = start.take() {
                spans.push(s..i);
            }
        } else {
            start.get_or_insert(i);
        }
    }
    if let Some(s) = start {
        spans.push(s..line.len());
    }
    spans
}
