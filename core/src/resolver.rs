//! Lazy value production for argument results.
//!
//! A value is produced on first request and memoized for the rest of the
//! parse: by the custom parser if one is declared, otherwise by the default
//! factory when no tokens were given, otherwise by converting the tokens
//! with the argument's value type.

use std::cell::RefCell;
use std::collections::HashMap;

use tracing::trace;

use crate::config::ParserConfiguration;
use crate::context::SymbolContext;
use crate::result::{ResultArena, ResultId, ResultKind};
use crate::symbol::ArgumentSymbol;
use crate::{SymbolTree, Value, ValueType};

/// Outcome of producing one argument's value.
#[derive(Debug, Clone, Default)]
pub(crate) struct Resolution {
    pub value: Option<Value>,
    pub errors: Vec<String>,
    /// Number of tokens kept when the rest were released to later arguments.
    pub take: Option<usize>,
}

#[derive(Debug)]
enum Slot {
    InProgress,
    Done(Resolution),
}

/// Per-parse memo of resolved argument values.
#[derive(Debug, Default)]
pub(crate) struct ValueCache(RefCell<HashMap<ResultId, Slot>>);

impl ValueCache {
    /// Forgets a node whose tokens changed.
    pub(crate) fn invalidate(&self, id: ResultId) {
        self.0.borrow_mut().remove(&id);
    }
}

/// Read-only view used to resolve values and to run hooks.
#[derive(Clone, Copy)]
pub(crate) struct Resolver<'r> {
    pub tree: &'r SymbolTree,
    pub config: &'r ParserConfiguration,
    pub arena: &'r ResultArena,
    cache: &'r ValueCache,
}

impl<'r> Resolver<'r> {
    pub(crate) fn new(
        tree: &'r SymbolTree,
        config: &'r ParserConfiguration,
        arena: &'r ResultArena,
        cache: &'r ValueCache,
    ) -> Self {
        Self {
            tree,
            config,
            arena,
            cache,
        }
    }

    /// Resolves an argument result, computing it at most once.
    ///
    /// A request for a node that is already being resolved yields an empty
    /// resolution.
    pub(crate) fn resolve(&self, id: ResultId) -> Resolution {
        match self.cache.0.borrow().get(&id) {
            Some(Slot::Done(resolution)) => return resolution.clone(),
            Some(Slot::InProgress) => return Resolution::default(),
            None => {}
        }
        self.cache.0.borrow_mut().insert(id, Slot::InProgress);
        let resolution = self.compute(id);
        self.cache
            .0
            .borrow_mut()
            .insert(id, Slot::Done(resolution.clone()));
        resolution
    }

    /// Value of the result for `symbol`; options answer with their argument's value.
    pub(crate) fn value_of(&self, result: ResultId) -> Option<Value> {
        let target = match self.arena.get(result).kind {
            ResultKind::Argument => result,
            ResultKind::Option => self.arena.option_argument(result)?,
            ResultKind::Command => return None,
        };
        self.resolve(target).value
    }

    /// First result whose symbol answers to `name`.
    pub(crate) fn find_by_name(&self, name: &str) -> Option<ResultId> {
        self.arena.ids().find(|id| {
            let symbol = self.tree.symbol(self.arena.get(*id).symbol);
            symbol.name() == name || symbol.has_alias(name)
        })
    }

    fn compute(&self, id: ResultId) -> Resolution {
        let node = self.arena.get(id);
        let Some(argument) = self.tree.symbol(node.symbol).as_argument() else {
            return Resolution::default();
        };
        let tokens = node.tokens.clone();

        if tokens.is_empty() {
            if let Some(factory) = &argument.default {
                let mut context = SymbolContext::new(*self, id, Vec::new(), false);
                let value = factory(&mut context);
                let (errors, _) = context.finish();
                return Resolution {
                    value: if errors.is_empty() { Some(value) } else { None },
                    errors,
                    take: None,
                };
            }
        }

        if let Some(parser) = &argument.parser {
            let mut context = SymbolContext::new(*self, id, tokens, argument.option.is_none());
            let value = parser(&mut context);
            let (errors, take) = context.finish();
            trace!(argument = %self.tree.symbol(node.symbol).name(), ?take, "Ran custom parser");
            return Resolution {
                value: if errors.is_empty() { value } else { None },
                errors,
                take,
            };
        }

        if tokens.is_empty() {
            let value = if argument.option.is_some() && argument.is_flag() {
                Some(Value::Bool(true))
            } else if argument.arity.is_multiple() {
                Some(Value::List(Vec::new()))
            } else {
                None
            };
            return Resolution {
                value,
                ..Default::default()
            };
        }

        self.convert(id, argument, &tokens)
    }

    fn convert(&self, id: ResultId, argument: &ArgumentSymbol, tokens: &[crate::Token]) -> Resolution {
        let messages = &self.config.messages;
        let mut values = Vec::with_capacity(tokens.len());
        let mut errors = Vec::new();
        let mut take = None;

        for (i, token) in tokens.iter().enumerate() {
            if !argument.allowed_values.is_empty()
                && !argument.allowed_values.iter().any(|v| v == &token.value)
            {
                errors.push(messages.unrecognized_argument(&token.value, &argument.allowed_values));
                continue;
            }
            match argument.value_type.convert(&token.value) {
                Some(value) => values.push(value),
                None if argument.arity.is_multiple() && self.has_following_argument(id) => {
                    take = Some(i);
                    break;
                }
                None => {
                    if let ValueType::Enum(names) = &argument.value_type {
                        errors.push(messages.unrecognized_argument(&token.value, names));
                        break;
                    }
                    let (kind, name) = self.owner_label(id);
                    errors.push(messages.cannot_parse_argument(
                        &token.value,
                        kind,
                        name,
                        argument.value_type.name(),
                    ));
                    break;
                }
            }
        }

        if !errors.is_empty() {
            return Resolution {
                value: None,
                errors,
                take,
            };
        }
        let value = if argument.arity.is_multiple() {
            Some(Value::List(values))
        } else {
            values.into_iter().next()
        };
        Resolution {
            value,
            errors,
            take,
        }
    }

    /// Whether a later positional argument of the same command exists.
    pub(crate) fn has_following_argument(&self, id: ResultId) -> bool {
        let node = self.arena.get(id);
        let Some(parent) = node.parent else {
            return false;
        };
        let command = self.arena.get(parent);
        if command.kind != ResultKind::Command {
            return false;
        }
        self.tree
            .arguments(command.symbol)
            .skip_while(|a| *a != node.symbol)
            .nth(1)
            .is_some()
    }

    fn owner_label(&self, id: ResultId) -> (&'static str, &'r str) {
        let symbol = self.tree.symbol(self.arena.get(id).symbol);
        match symbol.as_argument().and_then(|a| a.option) {
            Some(option) => ("option", self.tree.symbol(option).name()),
            None => ("argument", symbol.name()),
        }
    }
}
