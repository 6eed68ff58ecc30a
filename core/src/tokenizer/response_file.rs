//! `@file` expansion.

use std::io;
use std::path::Path;

use super::split::split_command_line;

/// Reads a response file and splits it into raw arguments.
pub(crate) fn read_response_file(path: impl AsRef<Path>) -> io::Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_response_text(&text))
}

/// Trims each line, drops blank and `#` comment lines, and splits the rest.
pub(crate) fn parse_response_text(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(split_command_line)
        .collect()
}
