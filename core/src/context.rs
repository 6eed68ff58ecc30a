//! The context handed to custom parsers, default factories and validators.

use crate::resolver::Resolver;
use crate::result::{ResultId, SymbolResult};
use crate::token::Token;
use crate::value::FromValue;
use crate::{Symbol, SymbolId};

/// A view of one result while a hook runs.
///
/// Hooks read the node's tokens, report errors with
/// [`add_error`](SymbolContext::add_error) and may look up other results and
/// their values. Values of other nodes are produced on demand and memoized
/// for the rest of the parse.
///
/// # Examples
///
/// ```
/// use command_grammar_core::*;
///
/// let mut tree = SymbolTree::new("app").unwrap();
/// let root = tree.root();
/// tree.add_argument(
///     root,
///     ArgumentSpec::new("port", ValueType::Integer).validator(|ctx| {
///         if ctx.value::<i64>(ctx.symbol_id()).is_some_and(|p| p > 65535) {
///             ctx.add_error("port out of range");
///         }
///     }),
/// )
/// .unwrap();
///
/// let result = tree.parse("70000");
/// assert_eq!(result.errors()[0].message, "port out of range");
/// ```
pub struct SymbolContext<'r> {
    resolver: Resolver<'r>,
    result: ResultId,
    tokens: Vec<Token>,
    errors: Vec<String>,
    take: Option<usize>,
    can_take: bool,
}

impl<'r> SymbolContext<'r> {
    pub(crate) fn new(resolver: Resolver<'r>, result: ResultId, tokens: Vec<Token>, can_take: bool) -> Self {
        Self {
            resolver,
            result,
            tokens,
            errors: Vec::new(),
            take: None,
            can_take,
        }
    }

    pub(crate) fn finish(self) -> (Vec<String>, Option<usize>) {
        (self.errors, self.take)
    }

    /// The symbol this hook belongs to.
    pub fn symbol(&self) -> &'r Symbol {
        self.resolver
            .tree
            .symbol(self.resolver.arena.get(self.result).symbol)
    }

    pub fn symbol_id(&self) -> SymbolId {
        self.resolver.arena.get(self.result).symbol
    }

    /// The node this hook is running for.
    pub fn result(&self) -> &'r SymbolResult {
        self.resolver.arena.get(self.result)
    }

    pub fn result_id(&self) -> ResultId {
        self.result
    }

    /// Tokens assigned to the node, after any [`only_take`](Self::only_take).
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// The first error reported so far.
    pub fn error_message(&self) -> Option<&str> {
        self.errors.first().map(String::as_str)
    }

    /// Keeps the first `count` tokens and releases the rest to the
    /// following arguments of the same command.
    ///
    /// # Panics
    ///
    /// Panics when called twice in one parser run, or from the parser of an
    /// option's argument.
    pub fn only_take(&mut self, count: usize) {
        if !self.can_take {
            panic!(
                "only_take is not supported for '{}'",
                self.symbol().name()
            );
        }
        if self.take.is_some() {
            panic!(
                "only_take was already called for '{}'",
                self.symbol().name()
            );
        }
        let count = count.min(self.tokens.len());
        self.tokens.truncate(count);
        self.take = Some(count);
    }

    pub fn parent(&self) -> Option<&'r SymbolResult> {
        let parent = self.result().parent?;
        Some(self.resolver.arena.get(parent))
    }

    /// The result matched for `symbol`, if it was part of this parse.
    pub fn find_result_for(&self, symbol: SymbolId) -> Option<&'r SymbolResult> {
        let id = self.resolver.arena.find(symbol)?;
        Some(self.resolver.arena.get(id))
    }

    /// The first result whose symbol is called `name` (any alias).
    pub fn find_result_by_name(&self, name: &str) -> Option<&'r SymbolResult> {
        let id = self.resolver.find_by_name(name)?;
        Some(self.resolver.arena.get(id))
    }

    /// Value of another option or argument.
    ///
    /// Returns `None` when the symbol was not parsed, has no value, cannot
    /// be read as `T`, or is the node currently being resolved.
    pub fn value<T: FromValue>(&self, symbol: SymbolId) -> Option<T> {
        let id = self.resolver.arena.find(symbol)?;
        let value = self.resolver.value_of(id)?;
        T::from_value(&value)
    }

    pub fn value_by_name<T: FromValue>(&self, name: &str) -> Option<T> {
        let id = self.resolver.find_by_name(name)?;
        let value = self.resolver.value_of(id)?;
        T::from_value(&value)
    }
}
