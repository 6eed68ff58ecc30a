//! Symbol definitions: commands, options and arguments.
//!
//! Symbols live in a [`SymbolTree`](crate::SymbolTree) arena and are
//! addressed by [`SymbolId`]. The variant data is a tagged union
//! ([`SymbolKind`]); custom parsers, default factories, validators and
//! completion delegates are stored as shared closures so one tree can be
//! parsed from several threads at once.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::completion::{CompletionContext, CompletionItem};
use crate::context::SymbolContext;
use crate::{Arity, DefinitionError, Value, ValueType};

/// Index of a symbol inside its [`SymbolTree`](crate::SymbolTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SymbolId(pub(crate) usize);

impl SymbolId {
    /// Position of the symbol in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Produces a value from an argument's tokens, or reports errors.
pub type CustomParser = Arc<dyn Fn(&mut SymbolContext<'_>) -> Option<Value> + Send + Sync>;
/// Produces the value of an argument that received no tokens.
pub type DefaultFactory = Arc<dyn Fn(&mut SymbolContext<'_>) -> Value + Send + Sync>;
/// Inspects a produced result and may add error messages.
pub type Validator = Arc<dyn Fn(&mut SymbolContext<'_>) + Send + Sync>;
/// Computes completions for an argument from the current parse.
pub type CompletionDelegate =
    Arc<dyn Fn(&CompletionContext<'_, '_>) -> Vec<CompletionItem> + Send + Sync>;

/// A declared grammar element.
pub struct Symbol {
    pub(crate) name: String,
    pub(crate) aliases: Vec<String>,
    pub(crate) description: Option<String>,
    pub(crate) hidden: bool,
    pub(crate) kind: SymbolKind,
}

/// Variant data of a [`Symbol`].
pub enum SymbolKind {
    Command(CommandSymbol),
    Option(OptionSymbol),
    Argument(ArgumentSymbol),
}

pub struct CommandSymbol {
    pub(crate) children: Vec<SymbolId>,
    pub(crate) subcommand_required: bool,
    pub(crate) validators: Vec<Validator>,
}

pub struct OptionSymbol {
    /// Implicit argument carrying the option's arity, type and hooks.
    pub(crate) argument: SymbolId,
    pub(crate) required: bool,
    pub(crate) recursive: bool,
    pub(crate) validators: Vec<Validator>,
}

pub struct ArgumentSymbol {
    pub(crate) arity: Arity,
    pub(crate) value_type: ValueType,
    pub(crate) parser: Option<CustomParser>,
    pub(crate) default: Option<DefaultFactory>,
    pub(crate) validators: Vec<Validator>,
    pub(crate) allowed_values: Vec<String>,
    pub(crate) completions: Vec<String>,
    pub(crate) completion_delegate: Option<CompletionDelegate>,
    /// Owning option for implicit option arguments.
    pub(crate) option: Option<SymbolId>,
}

impl Symbol {
    /// Canonical name. Always a member of [`aliases`](Symbol::aliases).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every spelling this symbol answers to.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn kind(&self) -> &SymbolKind {
        &self.kind
    }

    /// Returns `true` if `alias` is one of this symbol's aliases.
    pub fn has_alias(&self, alias: &str) -> bool {
        self.aliases.iter().any(|a| a == alias)
    }

    pub fn is_command(&self) -> bool {
        matches!(self.kind, SymbolKind::Command(_))
    }

    pub fn is_option(&self) -> bool {
        matches!(self.kind, SymbolKind::Option(_))
    }

    pub fn is_argument(&self) -> bool {
        matches!(self.kind, SymbolKind::Argument(_))
    }

    pub(crate) fn as_command(&self) -> Option<&CommandSymbol> {
        match &self.kind {
            SymbolKind::Command(c) => Some(c),
            _ => None,
        }
    }

    pub(crate) fn as_option(&self) -> Option<&OptionSymbol> {
        match &self.kind {
            SymbolKind::Option(o) => Some(o),
            _ => None,
        }
    }

    pub(crate) fn as_argument(&self) -> Option<&ArgumentSymbol> {
        match &self.kind {
            SymbolKind::Argument(a) => Some(a),
            _ => None,
        }
    }

    /// Label used in diagnostics: `command`, `option` or `argument`.
    pub(crate) fn kind_label(&self) -> &'static str {
        match self.kind {
            SymbolKind::Command(_) => "command",
            SymbolKind::Option(_) => "option",
            SymbolKind::Argument(_) => "argument",
        }
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Symbol")
            .field("kind", &self.kind_label())
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("hidden", &self.hidden)
            .finish()
    }
}

impl CommandSymbol {
    /// Declared children in declaration order.
    pub fn children(&self) -> &[SymbolId] {
        &self.children
    }

    pub fn is_subcommand_required(&self) -> bool {
        self.subcommand_required
    }
}

impl OptionSymbol {
    pub fn argument(&self) -> SymbolId {
        self.argument
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Options that apply to the declaring command and all of its descendants.
    pub fn is_recursive(&self) -> bool {
        self.recursive
    }
}

impl ArgumentSymbol {
    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub fn has_custom_parser(&self) -> bool {
        self.parser.is_some()
    }

    pub fn allowed_values(&self) -> &[String] {
        &self.allowed_values
    }

    /// Option that owns this implicit argument, if any.
    pub fn owning_option(&self) -> Option<SymbolId> {
        self.option
    }

    /// Flags consume a following token only when it reads as a boolean.
    pub(crate) fn is_flag(&self) -> bool {
        self.value_type == ValueType::Bool && self.arity.maximum <= 1
    }

    /// Whether the argument must be given a value right after its option.
    pub(crate) fn is_greedy(&self) -> bool {
        self.arity.minimum > 0 && self.value_type != ValueType::Bool
    }
}

/// Checks an alias: non-empty, no whitespace anywhere.
pub(crate) fn validate_alias(alias: &str) -> Result<(), DefinitionError> {
    if alias.is_empty() || alias.chars().any(char::is_whitespace) {
        return Err(DefinitionError::InvalidAlias(alias.to_string()));
    }
    Ok(())
}

/// Builder value for a command.
///
/// # Examples
///
/// ```
/// use command_grammar_core::{CommandSpec, SymbolTree};
///
/// let mut tree = SymbolTree::new("git").unwrap();
/// let remove = tree
///     .add_command(tree.root(), CommandSpec::new("remove").alias("rm"))
///     .unwrap();
/// assert_eq!(tree.symbol(remove).name(), "remove");
/// assert!(tree.symbol(remove).has_alias("rm"));
/// ```
#[derive(Default)]
pub struct CommandSpec {
    pub(crate) name: String,
    pub(crate) aliases: Vec<String>,
    pub(crate) description: Option<String>,
    pub(crate) hidden: bool,
    pub(crate) subcommand_required: bool,
    pub(crate) validators: Vec<Validator>,
}

impl CommandSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Adds an alternate spelling.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Reports an error when this command is the innermost one parsed.
    pub fn subcommand_required(mut self) -> Self {
        self.subcommand_required = true;
        self
    }

    pub fn validator(mut self, validator: impl Fn(&mut SymbolContext<'_>) + Send + Sync + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }
}

/// Builder value for an argument, or for the implicit argument of an option.
///
/// When no arity is set it is derived from the value type: `ZeroOrOne` for
/// boolean options, `ExactlyOne` otherwise.
#[derive(Default)]
pub struct ArgumentSpec {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) hidden: bool,
    pub(crate) arity: Option<Arity>,
    pub(crate) value_type: ValueType,
    pub(crate) parser: Option<CustomParser>,
    pub(crate) default: Option<DefaultFactory>,
    pub(crate) validators: Vec<Validator>,
    pub(crate) allowed_values: Vec<String>,
    pub(crate) completions: Vec<String>,
    pub(crate) completion_delegate: Option<CompletionDelegate>,
}

impl ArgumentSpec {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            ..Default::default()
        }
    }

    pub fn arity(mut self, arity: Arity) -> Self {
        self.arity = Some(arity);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn parser(
        mut self,
        parser: impl Fn(&mut SymbolContext<'_>) -> Option<Value> + Send + Sync + 'static,
    ) -> Self {
        self.parser = Some(Arc::new(parser));
        self
    }

    pub fn default_value(
        mut self,
        factory: impl Fn(&mut SymbolContext<'_>) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.default = Some(Arc::new(factory));
        self
    }

    pub fn validator(mut self, validator: impl Fn(&mut SymbolContext<'_>) + Send + Sync + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Restricts token values to the given set.
    pub fn from_among<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values.extend(values.into_iter().map(Into::into));
        self
    }

    /// Static completion suggestions.
    pub fn completions<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.completions.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn completion_delegate(
        mut self,
        delegate: impl Fn(&CompletionContext<'_, '_>) -> Vec<CompletionItem> + Send + Sync + 'static,
    ) -> Self {
        self.completion_delegate = Some(Arc::new(delegate));
        self
    }

    pub(crate) fn into_symbol(self, option: Option<SymbolId>) -> Symbol {
        let arity = self.arity.unwrap_or(match (&self.value_type, option) {
            (ValueType::Bool, Some(_)) => Arity::ZERO_OR_ONE,
            _ => Arity::EXACTLY_ONE,
        });
        Symbol {
            aliases: vec![self.name.clone()],
            name: self.name,
            description: self.description,
            hidden: self.hidden,
            kind: SymbolKind::Argument(ArgumentSymbol {
                arity,
                value_type: self.value_type,
                parser: self.parser,
                default: self.default,
                validators: self.validators,
                allowed_values: self.allowed_values,
                completions: self.completions,
                completion_delegate: self.completion_delegate,
                option,
            }),
        }
    }
}

/// Builder value for an option.
///
/// The canonical name is the longest alias.
///
/// # Examples
///
/// ```
/// use command_grammar_core::{OptionSpec, SymbolTree, ValueType};
///
/// let mut tree = SymbolTree::new("app").unwrap();
/// let output = tree
///     .add_option(tree.root(), OptionSpec::value(["-o", "--output"], ValueType::Path))
///     .unwrap();
/// assert_eq!(tree.symbol(output).name(), "--output");
/// ```
pub struct OptionSpec {
    pub(crate) aliases: Vec<String>,
    pub(crate) description: Option<String>,
    pub(crate) hidden: bool,
    pub(crate) required: bool,
    pub(crate) recursive: bool,
    pub(crate) validators: Vec<Validator>,
    pub(crate) argument: ArgumentSpec,
}

impl OptionSpec {
    /// Boolean option (`ZeroOrOne` arity).
    pub fn flag<I, S>(aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::value(aliases, ValueType::Bool)
    }

    /// Option carrying a value of `value_type`.
    pub fn value<I, S>(aliases: I, value_type: ValueType) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            aliases: aliases.into_iter().map(Into::into).collect(),
            description: None,
            hidden: false,
            required: false,
            recursive: false,
            validators: Vec::new(),
            argument: ArgumentSpec::new(String::new(), value_type),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Makes the option visible from every descendant command.
    pub fn recursive(mut self) -> Self {
        self.recursive = true;
        self
    }

    pub fn validator(mut self, validator: impl Fn(&mut SymbolContext<'_>) + Send + Sync + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Adjusts the implicit argument (arity, parser, default, completions).
    pub fn with_argument(mut self, configure: impl FnOnce(ArgumentSpec) -> ArgumentSpec) -> Self {
        self.argument = configure(self.argument);
        self
    }

    pub(crate) fn canonical_name(&self) -> Result<String, DefinitionError> {
        if self.aliases.is_empty() {
            return Err(DefinitionError::NoAliases);
        }
        for alias in &self.aliases {
            validate_alias(alias)?;
        }
        let mut longest = &self.aliases[0];
        for alias in &self.aliases[1..] {
            if alias.chars().count() > longest.chars().count() {
                longest = alias;
            }
        }
        Ok(longest.clone())
    }
}
