use std::fmt;

use serde::Serialize;

use crate::SymbolId;

/// Lexical classification of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Command,
    Option,
    Argument,
    Directive,
    DoubleDash,
    Unparsed,
}

/// One lexical unit of input.
///
/// `position` is the index of the raw argument the token came from after
/// response-file expansion; tokens split from one argument (`--opt=value`,
/// bundled short options) share a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub value: String,
    pub kind: TokenKind,
    /// Symbol the token was attributed to, if any.
    pub symbol: Option<SymbolId>,
    pub position: usize,
}

impl Token {
    pub fn new(value: impl Into<String>, kind: TokenKind, symbol: Option<SymbolId>, position: usize) -> Self {
        Self {
            value: value.into(),
            kind,
            symbol,
            position,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}
