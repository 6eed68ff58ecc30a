//! Lexing of raw input into classified [`Token`]s.
//!
//! The tokenizer knows the symbol tree, so it can tell option and command
//! spellings apart from plain values and keep track of the command path as
//! subcommands appear. It also expands `@file` response files, splits
//! `--opt=value` style tokens and unbundles `-abc` into `-a -b -c`.

mod response_file;
mod split;

use std::collections::{HashMap, VecDeque};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::config::{ParserConfiguration, Replacement};
use crate::token::{Token, TokenKind};
use crate::{SymbolId, SymbolTree};

pub use split::split_command_line;
pub(crate) use split::token_spans;

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[([^\s:\[\]]+)(?::(.*))?\]$").expect("directive pattern is valid")
});

/// Splits `[key]` / `[key:value]` into its key and optional value.
pub(crate) fn parse_directive(text: &str) -> Option<(&str, Option<&str>)> {
    let caps = DIRECTIVE.captures(text)?;
    let key = caps.get(1)?.as_str();
    let value = caps.get(2).map(|m| m.as_str());
    Some((key, value))
}

/// Output of [`tokenize`].
#[derive(Debug, Clone, Default)]
pub struct Tokenization {
    pub tokens: Vec<Token>,
    /// Response-file and replacer diagnostics.
    pub errors: Vec<String>,
}

/// Lexes `args` against `tree`.
pub fn tokenize(args: &[String], tree: &SymbolTree, config: &ParserConfiguration) -> Tokenization {
    let mut tokenizer = Tokenizer::new(tree, config);
    tokenizer.run(args);
    debug!(
        tokens = tokenizer.tokens.len(),
        errors = tokenizer.errors.len(),
        "Tokenized input"
    );
    Tokenization {
        tokens: tokenizer.tokens,
        errors: tokenizer.errors,
    }
}

enum Expansion {
    Tokens(Vec<String>),
    Dropped,
    Keep,
}

struct Tokenizer<'a> {
    tree: &'a SymbolTree,
    config: &'a ParserConfiguration,
    tokens: Vec<Token>,
    errors: Vec<String>,
    known: HashMap<String, (TokenKind, SymbolId)>,
    path: Vec<SymbolId>,
    position: usize,
    in_directives: bool,
    seen_ordinary: bool,
    after_double_dash: bool,
}

impl<'a> Tokenizer<'a> {
    fn new(tree: &'a SymbolTree, config: &'a ParserConfiguration) -> Self {
        let path = vec![tree.root()];
        Self {
            tree,
            config,
            tokens: Vec::new(),
            errors: Vec::new(),
            known: tree.valid_tokens(&path),
            path,
            position: 0,
            in_directives: true,
            seen_ordinary: false,
            after_double_dash: false,
        }
    }

    fn run(&mut self, args: &[String]) {
        let mut queue: VecDeque<(String, usize)> = args.iter().map(|a| (a.clone(), 0)).collect();

        while let Some((arg, depth)) = queue.pop_front() {
            if self.after_double_dash {
                let kind = if self.config.settings.legacy_double_dash {
                    TokenKind::Unparsed
                } else {
                    TokenKind::Argument
                };
                self.emit(arg, kind, None);
                self.position += 1;
                continue;
            }

            if self.in_directives {
                let is_directive = parse_directive(&arg)
                    .is_some_and(|(key, _)| self.config.settings.accepts_directive(key));
                if is_directive {
                    self.emit(arg, TokenKind::Directive, None);
                    self.position += 1;
                    continue;
                }
            }

            if arg.len() > 1 && arg.starts_with('@') {
                match self.expand(&arg[1..], depth) {
                    Expansion::Tokens(replacement) => {
                        for item in replacement.into_iter().rev() {
                            queue.push_front((item, depth + 1));
                        }
                        continue;
                    }
                    Expansion::Dropped => continue,
                    Expansion::Keep => {}
                }
            }

            self.in_directives = false;
            if arg == "--" {
                self.emit(arg, TokenKind::DoubleDash, None);
                self.after_double_dash = true;
            } else {
                self.classify(&arg);
            }
            self.seen_ordinary = true;
            self.position += 1;
        }
    }

    fn expand(&mut self, target: &str, depth: usize) -> Expansion {
        if let Some(replacer) = &self.config.token_replacer {
            match replacer(target) {
                Replacement::Tokens(tokens) => return Expansion::Tokens(tokens),
                Replacement::Error(message) => {
                    self.errors.push(message);
                    return Expansion::Dropped;
                }
                Replacement::Unchanged => {}
            }
        }
        if !self.config.settings.response_files {
            return Expansion::Keep;
        }

        let messages = &self.config.messages;
        let max_depth = self.config.settings.max_response_file_depth;
        if depth >= max_depth {
            self.errors
                .push(messages.response_file_too_deep(target, max_depth));
            return Expansion::Dropped;
        }
        match response_file::read_response_file(target) {
            Ok(tokens) => {
                debug!(path = target, count = tokens.len(), "Expanded response file");
                Expansion::Tokens(tokens)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.errors.push(messages.response_file_not_found(target));
                Expansion::Dropped
            }
            Err(e) => {
                self.errors
                    .push(messages.response_file_unreadable(target, &e.to_string()));
                Expansion::Dropped
            }
        }
    }

    fn classify(&mut self, arg: &str) {
        if !self.seen_ordinary && self.tree.symbol(self.tree.root()).has_alias(arg) {
            self.emit(arg, TokenKind::Command, Some(self.tree.root()));
            return;
        }

        if let Some(&(kind, symbol)) = self.known.get(arg) {
            if let Some(option) = self.pending_greedy_option() {
                self.emit(arg, TokenKind::Argument, Some(option));
                return;
            }
            self.emit(arg, kind, Some(symbol));
            if kind == TokenKind::Command {
                self.path.push(symbol);
                self.known = self.tree.valid_tokens(&self.path);
            }
            return;
        }

        if self.try_split(arg) {
            return;
        }
        if self.config.settings.enable_bundling && self.can_unbundle(arg) && self.try_unbundle(arg) {
            return;
        }

        let owner = self.pending_greedy_option();
        self.emit(arg, TokenKind::Argument, owner);
    }

    /// `--opt=value`, `--opt:value`, `/opt value`.
    fn try_split(&mut self, arg: &str) -> bool {
        let Some((index, delimiter)) = arg
            .char_indices()
            .find(|&(_, c)| c == '=' || c == ':' || c.is_whitespace())
        else {
            return false;
        };
        let (name, rest) = (&arg[..index], &arg[index + delimiter.len_utf8()..]);
        let Some(&(TokenKind::Option, option)) = self.known.get(name) else {
            return false;
        };
        self.emit(name, TokenKind::Option, Some(option));
        if !rest.is_empty() {
            self.emit(rest, TokenKind::Argument, Some(option));
        }
        true
    }

    fn can_unbundle(&self, arg: &str) -> bool {
        arg.chars().count() > 2
            && arg.starts_with('-')
            && !arg.starts_with("--")
            && self.pending_greedy_option().is_none()
    }

    /// Expands `-abc`. Returns `false`, emitting nothing, when the token has
    /// to stay intact.
    fn try_unbundle(&mut self, arg: &str) -> bool {
        let body = &arg[1..];
        let mut pending: Vec<Token> = Vec::new();
        let mut last_option: Option<SymbolId> = None;

        for (i, c) in body.char_indices() {
            let rest = &body[i + c.len_utf8()..];

            if let Some(previous) = last_option {
                if c == '=' || c == ':' {
                    pending.push(self.token(rest, TokenKind::Argument, Some(previous)));
                    return self.commit(pending);
                }
            }

            let candidate = format!("-{c}");
            match self.known.get(&candidate) {
                Some(&(TokenKind::Option, option)) => {
                    pending.push(self.token(candidate, TokenKind::Option, Some(option)));
                    last_option = Some(option);
                    if self.option_is_greedy(option) && !rest.is_empty() {
                        let value = rest.strip_prefix(|c: char| c == '=' || c == ':').unwrap_or(rest);
                        pending.push(self.token(value, TokenKind::Argument, Some(option)));
                        return self.commit(pending);
                    }
                }
                _ => {
                    let Some(previous) = last_option else {
                        return false;
                    };
                    if !self.option_takes_value(previous) {
                        return false;
                    }
                    pending.push(self.token(&body[i..], TokenKind::Argument, Some(previous)));
                    return self.commit(pending);
                }
            }
        }
        self.commit(pending)
    }

    fn commit(&mut self, pending: Vec<Token>) -> bool {
        self.tokens.extend(pending);
        true
    }

    /// The previous token, if it is an option that must take a value.
    fn pending_greedy_option(&self) -> Option<SymbolId> {
        let last = self.tokens.last()?;
        if last.kind != TokenKind::Option {
            return None;
        }
        let option = last.symbol?;
        self.option_is_greedy(option).then_some(option)
    }

    fn option_is_greedy(&self, option: SymbolId) -> bool {
        self.option_argument(option).is_some_and(|a| a.is_greedy())
    }

    fn option_takes_value(&self, option: SymbolId) -> bool {
        self.option_argument(option)
            .is_some_and(|a| a.arity.maximum > 0 && !a.is_flag())
    }

    fn option_argument(&self, option: SymbolId) -> Option<&'a crate::symbol::ArgumentSymbol> {
        let tree = self.tree;
        let argument = tree.value_argument(option)?;
        tree.symbol(argument).as_argument()
    }

    fn token(&self, value: impl Into<String>, kind: TokenKind, symbol: Option<SymbolId>) -> Token {
        Token::new(value, kind, symbol, self.position)
    }

    fn emit(&mut self, value: impl Into<String>, kind: TokenKind, symbol: Option<SymbolId>) {
        let token = self.token(value, kind, symbol);
        self.tokens.push(token);
    }
}
