//! The post pass run after matching.
//!
//! Walks the command path from the root to the innermost command. For each
//! command it produces argument values (releasing tokens a parser declined
//! to the following arguments), creates implicit results for defaults,
//! reports missing and surplus values and runs validators. Requirements are
//! only enforced for the innermost command, except for recursive options.

use std::collections::HashSet;

use tracing::trace;

use crate::config::ParserConfiguration;
use crate::context::SymbolContext;
use crate::resolver::{Resolver, ValueCache};
use crate::result::{ParseError, ResultArena, ResultId, ResultKind};
use crate::symbol::{ArgumentSymbol, Validator};
use crate::token::Token;
use crate::{SymbolId, SymbolTree};

pub(crate) fn run(
    tree: &SymbolTree,
    config: &ParserConfiguration,
    arena: &mut ResultArena,
    cache: &ValueCache,
    path: &[ResultId],
    unmatched: &mut Vec<Token>,
) -> Vec<ParseError> {
    let mut checks = Checks {
        tree,
        config,
        arena,
        cache,
        unmatched,
        errors: Vec::new(),
        visited: HashSet::new(),
    };

    for (depth, &command) in path.iter().enumerate() {
        let complete = depth + 1 == path.len();
        checks.arguments(command, complete);
        checks.options(command, complete);
    }
    if let Some(&innermost) = path.last() {
        checks.innermost_command(innermost);
        if config.settings.treat_unmatched_tokens_as_errors {
            let messages: Vec<String> = checks
                .unmatched
                .iter()
                .map(|t| config.messages.unrecognized_command_or_argument(&t.value))
                .collect();
            for message in messages {
                checks.push(Some(innermost), message);
            }
        }
    }
    checks.errors
}

struct Checks<'a> {
    tree: &'a SymbolTree,
    config: &'a ParserConfiguration,
    arena: &'a mut ResultArena,
    cache: &'a ValueCache,
    unmatched: &'a mut Vec<Token>,
    errors: Vec<ParseError>,
    visited: HashSet<ResultId>,
}

impl<'a> Checks<'a> {
    fn resolver(&self) -> Resolver<'_> {
        Resolver::new(self.tree, self.config, self.arena, self.cache)
    }

    /// Adds a diagnostic unless the node already carries the same message.
    fn push(&mut self, result: Option<ResultId>, message: String) {
        let duplicate = self
            .errors
            .iter()
            .any(|e| e.result == result && e.message == message);
        if !duplicate {
            self.errors.push(ParseError::new(message, result));
        }
    }

    fn extend(&mut self, result: ResultId, messages: Vec<String>) {
        for message in messages {
            self.push(Some(result), message);
        }
    }

    fn argument_symbol(&self, symbol: SymbolId) -> Option<&'a ArgumentSymbol> {
        self.tree.symbol(symbol).as_argument()
    }

    fn run_validators(&self, result: ResultId, tokens: Vec<Token>, validators: &[Validator]) -> Vec<String> {
        if validators.is_empty() {
            return Vec::new();
        }
        let mut context = SymbolContext::new(self.resolver(), result, tokens, false);
        for validator in validators {
            validator(&mut context);
        }
        context.finish().0
    }

    fn arguments(&mut self, command: ResultId, complete: bool) {
        let command_symbol = self.arena.get(command).symbol;
        let declared: Vec<SymbolId> = self.tree.arguments(command_symbol).collect();

        for (position, &symbol) in declared.iter().enumerate() {
            let Some(argument) = self.argument_symbol(symbol) else {
                continue;
            };
            let (arity, has_default) = (argument.arity, argument.has_default());

            let result = match self.arena.find(symbol) {
                Some(existing) => existing,
                None if has_default || (complete && arity.minimum > 0) => {
                    let created = self.arena.add(ResultKind::Argument, symbol, Some(command));
                    self.arena.get_mut(created).implicit = has_default;
                    created
                }
                None => continue,
            };
            if !self.visited.insert(result) {
                continue;
            }

            let resolution = self.resolver().resolve(result);
            if let Some(take) = resolution.take {
                self.release(result, take, command, &declared[position + 1..]);
            }

            let count = self.arena.get(result).tokens.len();
            if count < arity.minimum && !(has_default && count == 0) {
                if complete || count > 0 {
                    let name = self.tree.symbol(command_symbol).name().to_string();
                    let message = self.config.messages.required_argument_missing_for_command(&name);
                    self.push(Some(result), message);
                }
                continue;
            }
            if !resolution.errors.is_empty() {
                self.extend(result, resolution.errors);
                continue;
            }

            let tokens = self.arena.get(result).tokens.clone();
            let validators = self
                .argument_symbol(symbol)
                .map(|a| a.validators.as_slice())
                .unwrap_or_default();
            let messages = self.run_validators(result, tokens, validators);
            self.extend(result, messages);
        }
    }

    /// Moves tokens past `take` to the following arguments, in order. What
    /// none of them can hold becomes unmatched.
    fn release(&mut self, result: ResultId, take: usize, command: ResultId, following: &[SymbolId]) {
        let node = self.arena.get_mut(result);
        if take >= node.tokens.len() {
            return;
        }
        let mut released = node.tokens.split_off(take);
        trace!(released = released.len(), "Released tokens to following arguments");

        for &symbol in following {
            if released.is_empty() {
                break;
            }
            let Some(maximum) = self.argument_symbol(symbol).map(|a| a.arity.maximum) else {
                continue;
            };
            let target = match self.arena.find(symbol) {
                Some(existing) => existing,
                None => self.arena.add(ResultKind::Argument, symbol, Some(command)),
            };
            let node = self.arena.get_mut(target);
            let room = maximum.saturating_sub(node.tokens.len()).min(released.len());
            if room == 0 {
                continue;
            }
            let rest = released.split_off(room);
            for mut token in std::mem::replace(&mut released, rest) {
                token.symbol = Some(symbol);
                node.tokens.push(token);
            }
            node.implicit = false;
            self.cache.invalidate(target);
        }

        for mut token in released {
            token.symbol = None;
            let at = self
                .unmatched
                .partition_point(|t| t.position <= token.position);
            self.unmatched.insert(at, token);
        }
    }

    fn options(&mut self, command: ResultId, complete: bool) {
        let command_symbol = self.arena.get(command).symbol;
        let declared: Vec<SymbolId> = self.tree.options(command_symbol).collect();

        for symbol in declared {
            let Some(option) = self.tree.symbol(symbol).as_option() else {
                continue;
            };
            let has_default = self
                .argument_symbol(option.argument)
                .is_some_and(ArgumentSymbol::has_default);

            let result = match self.arena.find(symbol) {
                Some(existing) => existing,
                None if !(complete || option.recursive) => continue,
                None if option.required && !has_default => {
                    let name = self.tree.symbol(symbol).name().to_string();
                    let message = self.config.messages.required_option_missing(&name);
                    self.push(Some(command), message);
                    continue;
                }
                None if has_default => {
                    let created = self.arena.add(ResultKind::Option, symbol, Some(command));
                    let argument = self
                        .arena
                        .add(ResultKind::Argument, option.argument, Some(created));
                    self.arena.get_mut(created).implicit = true;
                    self.arena.get_mut(argument).implicit = true;
                    created
                }
                None => continue,
            };
            if self.visited.insert(result) {
                self.option(result, symbol);
            }
        }
    }

    fn option(&mut self, result: ResultId, symbol: SymbolId) {
        let Some(option) = self.tree.symbol(symbol).as_option() else {
            return;
        };
        let Some(argument) = self.argument_symbol(option.argument) else {
            return;
        };
        let Some(argument_result) = self.arena.option_argument(result) else {
            return;
        };
        let name = self.tree.symbol(symbol).name().to_string();
        let messages = &self.config.messages;

        let count = self.arena.get(argument_result).tokens.len();
        let excess = self.arena.get(result).excess.len();
        if count < argument.arity.minimum && !(argument.has_default() && count == 0) {
            let message = messages.required_argument_missing_for_option(&name);
            self.push(Some(result), message);
            return;
        }
        if excess > 0 {
            let found = count + excess;
            let message = if argument.arity.maximum == 1 {
                messages.expects_one_argument(&name, found)
            } else {
                messages.expects_fewer_arguments(&name, argument.arity.maximum, found)
            };
            self.push(Some(result), message);
            return;
        }

        let resolution = self.resolver().resolve(argument_result);
        if !resolution.errors.is_empty() {
            self.extend(argument_result, resolution.errors);
            return;
        }

        let tokens = self.arena.get(argument_result).tokens.clone();
        let argument_errors = self.run_validators(argument_result, tokens.clone(), &argument.validators);
        self.extend(argument_result, argument_errors);
        let option_errors = self.run_validators(result, tokens, &option.validators);
        self.extend(result, option_errors);
    }

    fn innermost_command(&mut self, command: ResultId) {
        let symbol = self.arena.get(command).symbol;
        let Some(definition) = self.tree.command(symbol) else {
            return;
        };
        if definition.subcommand_required {
            let message = self.config.messages.required_command_missing();
            self.push(Some(command), message);
        }
        let messages = self.run_validators(command, Vec::new(), &definition.validators);
        self.extend(command, messages);
    }
}
