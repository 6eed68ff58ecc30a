//! Matching of classified tokens against the symbol tree.
//!
//! A single left-to-right pass that keeps the current command and, for it,
//! the index of the next argument that may still take tokens. Value
//! production and arity checks happen afterwards, in the post pass.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::config::ParserConfiguration;
use crate::result::{ResultArena, ResultId, ResultKind};
use crate::token::{Token, TokenKind};
use crate::tokenizer::parse_directive;
use crate::value::parse_bool;
use crate::{SymbolId, SymbolTree};

pub(crate) struct MatchOutcome {
    pub tokens: Vec<Token>,
    pub arena: ResultArena,
    /// Command results from the root to the innermost command.
    pub path: Vec<ResultId>,
    pub unmatched: Vec<Token>,
    pub unparsed: Vec<Token>,
    pub directives: BTreeMap<String, Vec<String>>,
}

pub(crate) fn match_tokens(
    tree: &SymbolTree,
    config: &ParserConfiguration,
    tokens: Vec<Token>,
) -> MatchOutcome {
    let mut arena = ResultArena::default();
    let root = arena.add(ResultKind::Command, tree.root(), None);
    let mut matcher = Matcher {
        tree,
        config,
        tokens,
        index: 0,
        arena,
        path: vec![root],
        symbol_path: vec![tree.root()],
        argument_index: 0,
        unmatched: Vec::new(),
        unparsed: Vec::new(),
        directives: BTreeMap::new(),
    };
    matcher.run();
    debug!(
        command = %tree.symbol(*matcher.symbol_path.last().unwrap_or(&tree.root())).name(),
        unmatched = matcher.unmatched.len(),
        "Matched tokens"
    );
    MatchOutcome {
        tokens: matcher.tokens,
        arena: matcher.arena,
        path: matcher.path,
        unmatched: matcher.unmatched,
        unparsed: matcher.unparsed,
        directives: matcher.directives,
    }
}

struct Matcher<'a> {
    tree: &'a SymbolTree,
    config: &'a ParserConfiguration,
    tokens: Vec<Token>,
    index: usize,
    arena: ResultArena,
    path: Vec<ResultId>,
    symbol_path: Vec<SymbolId>,
    /// Next argument of the current command that may take a token.
    argument_index: usize,
    unmatched: Vec<Token>,
    unparsed: Vec<Token>,
    directives: BTreeMap<String, Vec<String>>,
}

impl Matcher<'_> {
    fn run(&mut self) {
        while self.index < self.tokens.len() {
            let token = &self.tokens[self.index];
            match token.kind {
                TokenKind::Directive => {
                    if let Some((key, value)) = parse_directive(&token.value) {
                        let values = self.directives.entry(key.to_string()).or_default();
                        if let Some(value) = value {
                            values.push(value.to_string());
                        }
                    }
                    self.index += 1;
                }
                TokenKind::DoubleDash => self.index += 1,
                TokenKind::Unparsed => {
                    self.unparsed.push(token.clone());
                    self.index += 1;
                }
                TokenKind::Command => self.match_command(),
                TokenKind::Option => self.match_option(),
                TokenKind::Argument => self.match_argument(),
            }
        }
    }

    fn current(&self) -> ResultId {
        *self.path.last().unwrap_or(&ResultId(0))
    }

    fn current_symbol(&self) -> SymbolId {
        *self.symbol_path.last().unwrap_or(&self.tree.root())
    }

    fn match_command(&mut self) {
        let token = &self.tokens[self.index];
        let root = self.tree.root();
        let Some(symbol) = token.symbol else {
            return self.match_argument();
        };

        if symbol == root && self.path.len() == 1 {
            let root_result = self.arena.get_mut(self.path[0]);
            if root_result.identifier.is_none() {
                root_result.identifier = Some(token.clone());
                root_result.identifier_count = 1;
                self.index += 1;
                return;
            }
        }
        if self.tree.subcommands(self.current_symbol()).any(|c| c == symbol) {
            self.descend(symbol);
            self.index += 1;
        } else {
            self.match_argument();
        }
    }

    fn descend(&mut self, command: SymbolId) {
        let token = &mut self.tokens[self.index];
        token.kind = TokenKind::Command;
        token.symbol = Some(command);
        let identifier = token.clone();

        let result = self
            .arena
            .add(ResultKind::Command, command, Some(self.current()));
        let node = self.arena.get_mut(result);
        node.identifier = Some(identifier);
        node.identifier_count = 1;

        self.path.push(result);
        self.symbol_path.push(command);
        self.argument_index = 0;
        debug!(command = %self.tree.symbol(command).name(), "Entered command");
    }

    fn match_option(&mut self) {
        let token = &self.tokens[self.index];
        let Some(option) = token.symbol else {
            return self.match_argument();
        };
        let identifier = token.clone();
        let result = self.option_result(option);
        let node = self.arena.get_mut(result);
        if node.identifier.is_none() {
            node.identifier = Some(identifier);
        }
        node.identifier_count += 1;
        self.index += 1;
        self.consume_option_values(option, result);
    }

    fn option_result(&mut self, option: SymbolId) -> ResultId {
        if let Some(existing) = self.arena.find(option) {
            return existing;
        }
        let result = self
            .arena
            .add(ResultKind::Option, option, Some(self.current()));
        if let Some(argument) = self.tree.value_argument(option) {
            self.arena
                .add(ResultKind::Argument, argument, Some(result));
        }
        result
    }

    /// Takes following argument tokens for the option, up to its maximum.
    fn consume_option_values(&mut self, option: SymbolId, result: ResultId) {
        let Some(argument_symbol) = self.tree.value_argument(option) else {
            return;
        };
        let Some(argument) = self.tree.symbol(argument_symbol).as_argument() else {
            return;
        };
        let Some(argument_result) = self.arena.option_argument(result) else {
            return;
        };

        while let Some(next) = self.tokens.get(self.index) {
            if next.kind != TokenKind::Argument {
                break;
            }
            let attributed = next.symbol == Some(option);
            if next.symbol.is_some() && !attributed {
                break;
            }
            let taken = self.arena.get(argument_result).tokens.len();
            if taken >= argument.arity.maximum {
                if !attributed {
                    break;
                }
                let surplus = next.clone();
                self.arena.get_mut(result).excess.push(surplus);
                self.index += 1;
                continue;
            }
            if argument.is_flag() && !attributed && parse_bool(&next.value).is_none() {
                break;
            }

            let token = &mut self.tokens[self.index];
            token.symbol = Some(argument_symbol);
            let token = token.clone();
            self.arena.get_mut(argument_result).tokens.push(token);
            self.index += 1;
        }
    }

    fn match_argument(&mut self) {
        let command = self.current_symbol();
        let arguments: Vec<SymbolId> = self.tree.arguments(command).collect();

        while let Some(&argument) = arguments.get(self.argument_index) {
            let Some(maximum) = self
                .tree
                .symbol(argument)
                .as_argument()
                .map(|a| a.arity.maximum)
            else {
                self.argument_index += 1;
                continue;
            };
            let result = match self.arena.find(argument) {
                Some(existing) => existing,
                None => self
                    .arena
                    .add(ResultKind::Argument, argument, Some(self.current())),
            };
            if self.arena.get(result).tokens.len() < maximum {
                self.assign(result, argument);
                return;
            }
            self.argument_index += 1;
        }

        if self.config.settings.enable_positional_options && self.match_positional_option() {
            return;
        }

        let token = &mut self.tokens[self.index];
        token.symbol = None;
        trace!(token = %token.value, "Unmatched token");
        self.unmatched.push(token.clone());
        self.index += 1;
    }

    fn assign(&mut self, result: ResultId, symbol: SymbolId) {
        let token = &mut self.tokens[self.index];
        token.kind = TokenKind::Argument;
        token.symbol = Some(symbol);
        let token = token.clone();
        self.arena.get_mut(result).tokens.push(token);
        self.index += 1;
    }

    /// Gives a bare value to the first option of the current command that
    /// has not been named explicitly and still takes values.
    fn match_positional_option(&mut self) -> bool {
        let command = self.current_symbol();
        let options: Vec<SymbolId> = self.tree.options(command).collect();
        for option in options {
            let Some(argument_symbol) = self.tree.value_argument(option) else {
                continue;
            };
            let Some(maximum) = self
                .tree
                .symbol(argument_symbol)
                .as_argument()
                .map(|a| a.arity.maximum)
            else {
                continue;
            };
            if maximum == 0 {
                continue;
            }

            let result = match self.arena.find(option) {
                Some(existing) => {
                    let named = self.arena.get(existing).identifier.is_some();
                    let full = self
                        .arena
                        .option_argument(existing)
                        .is_none_or(|a| self.arena.get(a).tokens.len() >= maximum);
                    if named || full {
                        continue;
                    }
                    existing
                }
                None => {
                    if self.named_later(option) {
                        continue;
                    }
                    self.option_result(option)
                }
            };
            let Some(argument_result) = self.arena.option_argument(result) else {
                continue;
            };
            self.assign(argument_result, argument_symbol);
            return true;
        }
        false
    }

    /// Whether `option` is named explicitly before the next command token.
    fn named_later(&self, option: SymbolId) -> bool {
        self.tokens[self.index + 1..]
            .iter()
            .take_while(|t| t.kind != TokenKind::Command)
            .any(|t| t.kind == TokenKind::Option && t.symbol == Some(option))
    }
}
