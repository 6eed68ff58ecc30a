//! The outcome of one parse.

use std::collections::BTreeMap;
use std::fmt;

use crate::completion::{self, CompletionItem};
use crate::config::ParserConfiguration;
use crate::error::ValueError;
use crate::report::ParseReport;
use crate::resolver::{Resolver, ValueCache};
use crate::result::{ParseError, ResultArena, ResultId, ResultKind, SymbolResult};
use crate::token::Token;
use crate::value::FromValue;
use crate::{SymbolId, SymbolKind, SymbolTree, Value};

/// Raw input as given to the parser.
#[derive(Debug, Clone)]
pub(crate) enum Input {
    Line(String),
    Args(Vec<String>),
}

/// Everything a parse produced: the token list, the result tree, the
/// diagnostics and the tokens nothing matched.
///
/// Values are produced lazily the first time they are asked for, then kept
/// for the lifetime of the result. Parsing the same input again produces
/// fresh values.
///
/// # Examples
///
/// ```
/// use command_grammar_core::*;
///
/// let mut tree = SymbolTree::new("greet").unwrap();
/// let root = tree.root();
/// let name = tree
///     .add_option(root, OptionSpec::value(["-n", "--name"], ValueType::String))
///     .unwrap();
/// let times = tree
///     .add_argument(root, ArgumentSpec::new("times", ValueType::Integer))
///     .unwrap();
///
/// let result = tree.parse("--name Ada 3");
/// assert!(result.errors().is_empty());
/// assert_eq!(result.value::<String>(name).unwrap(), Some("Ada".to_string()));
/// assert_eq!(result.required_value::<i64>(times).unwrap(), 3);
/// ```
pub struct ParseResult<'a> {
    pub(crate) tree: &'a SymbolTree,
    pub(crate) config: &'a ParserConfiguration,
    pub(crate) input: Input,
    pub(crate) tokens: Vec<Token>,
    pub(crate) arena: ResultArena,
    pub(crate) cache: ValueCache,
    pub(crate) path: Vec<ResultId>,
    pub(crate) errors: Vec<ParseError>,
    pub(crate) unmatched: Vec<Token>,
    pub(crate) unparsed: Vec<Token>,
    pub(crate) directives: BTreeMap<String, Vec<String>>,
}

impl<'a> ParseResult<'a> {
    pub fn tree(&self) -> &'a SymbolTree {
        self.tree
    }

    pub fn configuration(&self) -> &'a ParserConfiguration {
        self.config
    }

    /// Every token in input order, labeled with the symbol it matched.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Tokens no symbol accepted, in input order.
    pub fn unmatched_tokens(&self) -> &[Token] {
        &self.unmatched
    }

    /// Tokens after `--` when `legacy_double_dash` is set.
    pub fn unparsed_tokens(&self) -> &[Token] {
        &self.unparsed
    }

    pub fn directives(&self) -> &BTreeMap<String, Vec<String>> {
        &self.directives
    }

    /// Values given to the directive `key`, or `None` if it was not present.
    pub fn directive(&self, key: &str) -> Option<&[String]> {
        self.directives.get(key).map(Vec::as_slice)
    }

    pub fn root(&self) -> &SymbolResult {
        self.arena.get(self.path[0])
    }

    /// The innermost command reached.
    pub fn command_result(&self) -> &SymbolResult {
        self.arena.get(self.innermost())
    }

    pub(crate) fn innermost(&self) -> ResultId {
        *self.path.last().unwrap_or(&self.path[0])
    }

    /// Commands from the root to the innermost one.
    pub fn command_path(&self) -> Vec<SymbolId> {
        self.path.iter().map(|id| self.arena.get(*id).symbol).collect()
    }

    /// Returns the result node for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not come from this parse.
    pub fn result(&self, id: ResultId) -> &SymbolResult {
        self.arena.get(id)
    }

    /// The result matched or created for `symbol`.
    pub fn find_result_for(&self, symbol: SymbolId) -> Option<&SymbolResult> {
        self.arena.find(symbol).map(|id| self.arena.get(id))
    }

    /// Whether `symbol`'s value comes from a default rather than input.
    pub fn is_implicit(&self, symbol: SymbolId) -> bool {
        self.find_result_for(symbol).is_some_and(SymbolResult::is_implicit)
    }

    /// Errors attached to `result`.
    pub fn errors_for(&self, result: ResultId) -> impl Iterator<Item = &ParseError> + '_ {
        self.errors.iter().filter(move |e| e.result == Some(result))
    }

    /// Typed value of an option or argument.
    ///
    /// `Ok(None)` means the symbol was not given and has no default.
    ///
    /// # Errors
    ///
    /// [`ValueError::Invalid`] with the node's first message when its value
    /// could not be produced, [`ValueError::RequiredMissing`] for a required
    /// option or argument without a value, [`ValueError::TypeMismatch`] when
    /// the value does not read as `T`.
    pub fn value<T: FromValue>(&self, symbol: SymbolId) -> Result<Option<T>, ValueError> {
        let declared = self
            .tree
            .get(symbol)
            .ok_or_else(|| ValueError::UnknownName(format!("#{}", symbol.index())))?;
        if declared.is_command() {
            return Err(ValueError::NotAValue(declared.name().to_string()));
        }

        let Some(value) = self.raw_value(symbol)? else {
            if self.is_required(symbol) {
                return Err(ValueError::RequiredMissing(declared.name().to_string()));
            }
            return Ok(None);
        };
        T::from_value(&value)
            .map(Some)
            .ok_or_else(|| ValueError::TypeMismatch {
                symbol: declared.name().to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Like [`value`](Self::value), finding the symbol by name on the parsed
    /// command path. Option names match any alias.
    pub fn value_by_name<T: FromValue>(&self, name: &str) -> Result<Option<T>, ValueError> {
        let symbol = self
            .symbol_by_name(name)
            .ok_or_else(|| ValueError::UnknownName(name.to_string()))?;
        self.value(symbol)
    }

    /// Like [`value`](Self::value), but a missing value is an error.
    pub fn required_value<T: FromValue>(&self, symbol: SymbolId) -> Result<T, ValueError> {
        self.value(symbol)?.ok_or_else(|| {
            ValueError::RequiredMissing(self.tree.symbol(symbol).name().to_string())
        })
    }

    /// The input as one line: the original string, or the arguments joined
    /// with spaces.
    pub fn command_line_text(&self) -> String {
        match &self.input {
            Input::Line(line) => line.clone(),
            Input::Args(args) => args.join(" "),
        }
    }

    /// Completions at byte `position` of [`command_line_text`](Self::command_line_text),
    /// or at its end.
    pub fn completions(&self, position: Option<usize>) -> Vec<CompletionItem> {
        completion::complete(self, position)
    }

    /// A serializable summary of this parse.
    pub fn report(&self) -> ParseReport {
        ParseReport::from_result(self)
    }

    pub(crate) fn resolver(&self) -> Resolver<'_> {
        Resolver::new(self.tree, self.config, &self.arena, &self.cache)
    }

    pub(crate) fn arena(&self) -> &ResultArena {
        &self.arena
    }

    /// The produced value, or the first error of the node.
    fn raw_value(&self, symbol: SymbolId) -> Result<Option<Value>, ValueError> {
        let Some(result) = self.arena.find(symbol) else {
            return Ok(None);
        };
        let target = match self.arena.get(result).kind {
            ResultKind::Argument => result,
            ResultKind::Option => match self.arena.option_argument(result) {
                Some(argument) => argument,
                None => return Ok(None),
            },
            ResultKind::Command => return Ok(None),
        };

        let name = self.tree.symbol(symbol).name();
        let node = self.arena.get(target);
        if let Some(argument) = self.tree.symbol(node.symbol).as_argument() {
            let starved = node.tokens.is_empty()
                && argument.arity().minimum > 0
                && !argument.has_default()
                && !argument.has_custom_parser();
            if starved {
                return Err(ValueError::RequiredMissing(name.to_string()));
            }
        }

        let invalid = |message: &str| ValueError::Invalid {
            symbol: name.to_string(),
            message: message.to_string(),
        };
        if let Some(error) = self
            .errors
            .iter()
            .find(|e| e.result == Some(target) || e.result == Some(result))
        {
            return Err(invalid(&error.message));
        }
        let resolution = self.resolver().resolve(target);
        if let Some(message) = resolution.errors.first() {
            return Err(invalid(message));
        }
        Ok(resolution.value)
    }

    fn is_required(&self, symbol: SymbolId) -> bool {
        match self.tree.symbol(symbol).kind() {
            SymbolKind::Option(option) => option.is_required(),
            SymbolKind::Argument(argument) => argument.arity().minimum > 0,
            SymbolKind::Command(_) => false,
        }
    }

    fn symbol_by_name(&self, name: &str) -> Option<SymbolId> {
        self.command_path().into_iter().find_map(|command| {
            self.tree.children(command).iter().copied().find(|child| {
                let symbol = self.tree.symbol(*child);
                match symbol.kind() {
                    SymbolKind::Command(_) => false,
                    SymbolKind::Option(_) => {
                        symbol.has_alias(name) || symbol.name().trim_start_matches('-') == name
                    }
                    SymbolKind::Argument(_) => symbol.name() == name,
                }
            })
        })
    }
}

impl fmt::Debug for ParseResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseResult")
            .field("tokens", &self.tokens)
            .field("errors", &self.errors)
            .field("unmatched", &self.unmatched)
            .field("directives", &self.directives)
            .finish_non_exhaustive()
    }
}
