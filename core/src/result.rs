//! The result tree produced by matching.
//!
//! Results live in an arena addressed by [`ResultId`]; the parent link is an
//! index and children are index lists. Each symbol gets at most one result
//! per parse, so an option reused under several commands is satisfied once.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::SymbolId;
use crate::token::Token;

/// Index of a node in a parse's result tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ResultId(pub(crate) usize);

impl ResultId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResultKind {
    Command,
    Option,
    Argument,
}

/// A matched (or implicitly created) symbol.
#[derive(Debug, Clone)]
pub struct SymbolResult {
    pub(crate) kind: ResultKind,
    pub(crate) symbol: SymbolId,
    pub(crate) parent: Option<ResultId>,
    pub(crate) children: Vec<ResultId>,
    pub(crate) tokens: Vec<Token>,
    pub(crate) identifier: Option<Token>,
    pub(crate) identifier_count: usize,
    pub(crate) implicit: bool,
    /// Values given to a repeated option after its argument was full.
    pub(crate) excess: Vec<Token>,
}

impl SymbolResult {
    pub fn kind(&self) -> ResultKind {
        self.kind
    }

    pub fn symbol(&self) -> SymbolId {
        self.symbol
    }

    pub fn parent(&self) -> Option<ResultId> {
        self.parent
    }

    pub fn children(&self) -> &[ResultId] {
        &self.children
    }

    /// Tokens assigned to this node. Only argument results carry values.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The command or option token that produced this node.
    pub fn identifier(&self) -> Option<&Token> {
        self.identifier.as_ref()
    }

    /// How many times the option or command token appeared.
    pub fn identifier_count(&self) -> usize {
        self.identifier_count
    }

    /// Created without any input, to hold a default value.
    pub fn is_implicit(&self) -> bool {
        self.implicit
    }
}

/// A parse-time diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseError {
    pub message: String,
    /// Node the diagnostic is attached to, if any.
    pub result: Option<ResultId>,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>, result: Option<ResultId>) -> Self {
        Self {
            message: message.into(),
            result,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ResultArena {
    nodes: Vec<SymbolResult>,
    by_symbol: HashMap<SymbolId, ResultId>,
}

impl ResultArena {
    pub(crate) fn add(&mut self, kind: ResultKind, symbol: SymbolId, parent: Option<ResultId>) -> ResultId {
        let id = ResultId(self.nodes.len());
        self.nodes.push(SymbolResult {
            kind,
            symbol,
            parent,
            children: Vec::new(),
            tokens: Vec::new(),
            identifier: None,
            identifier_count: 0,
            implicit: false,
            excess: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        self.by_symbol.insert(symbol, id);
        id
    }

    pub(crate) fn get(&self, id: ResultId) -> &SymbolResult {
        &self.nodes[id.0]
    }

    pub(crate) fn get_mut(&mut self, id: ResultId) -> &mut SymbolResult {
        &mut self.nodes[id.0]
    }

    pub(crate) fn find(&self, symbol: SymbolId) -> Option<ResultId> {
        self.by_symbol.get(&symbol).copied()
    }

    pub(crate) fn ids(&self) -> impl Iterator<Item = ResultId> + '_ {
        (0..self.nodes.len()).map(ResultId)
    }

    /// The argument result below an option result.
    pub(crate) fn option_argument(&self, option: ResultId) -> Option<ResultId> {
        self.get(option)
            .children
            .iter()
            .copied()
            .find(|c| self.get(*c).kind == ResultKind::Argument)
    }

    /// `id` followed by every node below it, depth first in creation order.
    pub(crate) fn subtree(&self, id: ResultId) -> Vec<ResultId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.get(next).children.iter().rev().copied());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_links_parent_and_children() {
        let mut arena = ResultArena::default();
        let root = arena.add(ResultKind::Command, SymbolId(0), None);
        let option = arena.add(ResultKind::Option, SymbolId(1), Some(root));
        let argument = arena.add(ResultKind::Argument, SymbolId(2), Some(option));
        let sub = arena.add(ResultKind::Command, SymbolId(3), Some(root));

        assert_eq!(arena.get(argument).parent(), Some(option));
        assert_eq!(arena.get(root).children(), &[option, sub]);
        assert_eq!(arena.option_argument(option), Some(argument));
        assert_eq!(arena.find(SymbolId(3)), Some(sub));
        assert_eq!(arena.subtree(root), vec![root, option, argument, sub]);
    }
}
