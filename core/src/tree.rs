//! The symbol tree arena.

use std::collections::HashMap;

use crate::symbol::{CommandSymbol, OptionSymbol, validate_alias};
use crate::token::TokenKind;
use crate::{
    ArgumentSpec, CommandSpec, DefinitionError, OptionSpec, Symbol, SymbolId, SymbolKind,
};

/// Immutable-after-construction grammar: a root command with nested
/// commands, options and arguments.
///
/// Children are stored by id, so one option or argument may be attached
/// under several commands. The tree is only read while parsing and can be
/// shared across threads.
///
/// # Examples
///
/// ```
/// use command_grammar_core::*;
///
/// let mut tree = SymbolTree::new("app").unwrap();
/// let root = tree.root();
/// let verbose = tree
///     .add_option(root, OptionSpec::flag(["-v", "--verbose"]).recursive())
///     .unwrap();
/// let run = tree.add_command(root, CommandSpec::new("run")).unwrap();
/// tree.add_argument(run, ArgumentSpec::new("script", ValueType::Path)).unwrap();
///
/// assert_eq!(tree.subcommands(root).collect::<Vec<_>>(), vec![run]);
/// assert_eq!(tree.options(root).collect::<Vec<_>>(), vec![verbose]);
/// assert!(validate_tree(&tree).is_empty());
/// ```
pub struct SymbolTree {
    symbols: Vec<Symbol>,
    parents: Vec<Vec<SymbolId>>,
    root: SymbolId,
}

impl SymbolTree {
    /// Creates a tree whose root command is `name`.
    pub fn new(name: impl Into<String>) -> Result<Self, DefinitionError> {
        Self::with_root(CommandSpec::new(name))
    }

    /// Creates a tree from a full root command spec.
    pub fn with_root(spec: CommandSpec) -> Result<Self, DefinitionError> {
        let mut tree = Self {
            symbols: Vec::new(),
            parents: Vec::new(),
            root: SymbolId(0),
        };
        tree.root = tree.push(command_symbol(spec)?);
        Ok(tree)
    }

    pub fn root(&self) -> SymbolId {
        self.root
    }

    /// Returns the symbol for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this tree.
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0]
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterates every symbol id in creation order.
    pub fn ids(&self) -> impl Iterator<Item = SymbolId> + '_ {
        (0..self.symbols.len()).map(SymbolId)
    }

    /// Commands that list `id` as a child.
    pub fn parents(&self, id: SymbolId) -> &[SymbolId] {
        &self.parents[id.0]
    }

    /// Adds a subcommand under `parent`.
    pub fn add_command(
        &mut self,
        parent: SymbolId,
        spec: CommandSpec,
    ) -> Result<SymbolId, DefinitionError> {
        self.require_command(parent)?;
        let id = self.push(command_symbol(spec)?);
        self.link(parent, id);
        Ok(id)
    }

    /// Adds an option under `parent`.
    pub fn add_option(
        &mut self,
        parent: SymbolId,
        spec: OptionSpec,
    ) -> Result<SymbolId, DefinitionError> {
        self.require_command(parent)?;
        let name = spec.canonical_name()?;
        let OptionSpec {
            aliases,
            description,
            hidden,
            required,
            recursive,
            validators,
            mut argument,
        } = spec;
        if let Some(arity) = argument.arity {
            crate::Arity::new(arity.minimum, arity.maximum)?;
        }
        if argument.name.is_empty() {
            argument.name = name.trim_start_matches('-').to_string();
        }
        if argument.name.is_empty() {
            argument.name = name.clone();
        }

        let option_id = SymbolId(self.symbols.len());
        let argument_id = SymbolId(self.symbols.len() + 1);
        self.push(Symbol {
            name,
            aliases,
            description,
            hidden,
            kind: SymbolKind::Option(OptionSymbol {
                argument: argument_id,
                required,
                recursive,
                validators,
            }),
        });
        self.push(argument.into_symbol(Some(option_id)));
        self.link(parent, option_id);
        Ok(option_id)
    }

    /// Adds a positional argument under `parent`.
    pub fn add_argument(
        &mut self,
        parent: SymbolId,
        spec: ArgumentSpec,
    ) -> Result<SymbolId, DefinitionError> {
        self.require_command(parent)?;
        validate_alias(&spec.name)?;
        if let Some(arity) = spec.arity {
            crate::Arity::new(arity.minimum, arity.maximum)?;
        }
        let id = self.push(spec.into_symbol(None));
        self.link(parent, id);
        Ok(id)
    }

    /// Attaches an existing symbol under another command.
    ///
    /// Used to reuse one option or argument under several commands. A
    /// command cannot be attached under itself or one of its descendants.
    pub fn attach(&mut self, parent: SymbolId, child: SymbolId) -> Result<(), DefinitionError> {
        self.require_command(parent)?;
        let symbol = self
            .get(child)
            .ok_or(DefinitionError::UnknownSymbol(child))?;
        if let Some(argument) = symbol.as_argument() {
            if argument.option.is_some() {
                return Err(DefinitionError::OptionArgument(symbol.name.clone()));
            }
        }
        if symbol.is_command() && (child == parent || self.is_descendant(parent, child)) {
            return Err(DefinitionError::Cycle(symbol.name.clone()));
        }
        if self.children(parent).contains(&child) {
            return Ok(());
        }
        self.link(parent, child);
        Ok(())
    }

    /// Declared children of a command, in declaration order.
    pub fn children(&self, command: SymbolId) -> &[SymbolId] {
        match self.symbol(command).as_command() {
            Some(c) => &c.children,
            None => &[],
        }
    }

    pub fn subcommands(&self, command: SymbolId) -> impl Iterator<Item = SymbolId> + '_ {
        self.children(command)
            .iter()
            .copied()
            .filter(|id| self.symbol(*id).is_command())
    }

    pub fn options(&self, command: SymbolId) -> impl Iterator<Item = SymbolId> + '_ {
        self.children(command)
            .iter()
            .copied()
            .filter(|id| self.symbol(*id).is_option())
    }

    pub fn arguments(&self, command: SymbolId) -> impl Iterator<Item = SymbolId> + '_ {
        self.children(command)
            .iter()
            .copied()
            .filter(|id| self.symbol(*id).is_argument())
    }

    /// The value-carrying argument of an option, or the argument itself.
    pub fn value_argument(&self, id: SymbolId) -> Option<SymbolId> {
        match self.symbol(id).kind() {
            SymbolKind::Option(o) => Some(o.argument),
            SymbolKind::Argument(_) => Some(id),
            SymbolKind::Command(_) => None,
        }
    }

    /// Options visible at the end of `path` (root first): the innermost
    /// command's own options followed by recursive options of its ancestors.
    pub fn visible_options(&self, path: &[SymbolId]) -> Vec<SymbolId> {
        let Some((&innermost, ancestors)) = path.split_last() else {
            return Vec::new();
        };
        let mut options: Vec<SymbolId> = self.options(innermost).collect();
        for &ancestor in ancestors.iter().rev() {
            for option in self.options(ancestor) {
                let recursive = self
                    .symbol(option)
                    .as_option()
                    .is_some_and(|o| o.recursive);
                if recursive && !options.contains(&option) {
                    options.push(option);
                }
            }
        }
        options
    }

    /// Aliases recognised as command or option tokens at the end of `path`.
    pub(crate) fn valid_tokens(&self, path: &[SymbolId]) -> HashMap<String, (TokenKind, SymbolId)> {
        let mut tokens = HashMap::new();
        let Some(&innermost) = path.last() else {
            return tokens;
        };
        for option in self.visible_options(path) {
            for alias in self.symbol(option).aliases() {
                tokens
                    .entry(alias.clone())
                    .or_insert((TokenKind::Option, option));
            }
        }
        for command in self.subcommands(innermost) {
            for alias in self.symbol(command).aliases() {
                tokens.insert(alias.clone(), (TokenKind::Command, command));
            }
        }
        tokens
    }

    /// Finds a child command of `parent` by alias.
    pub fn find_subcommand(&self, parent: SymbolId, alias: &str) -> Option<SymbolId> {
        self.subcommands(parent)
            .find(|id| self.symbol(*id).has_alias(alias))
    }

    /// Finds a visible option by alias at the end of `path`.
    pub fn find_option(&self, path: &[SymbolId], alias: &str) -> Option<SymbolId> {
        self.visible_options(path)
            .into_iter()
            .find(|id| self.symbol(*id).has_alias(alias))
    }

    pub(crate) fn command(&self, id: SymbolId) -> Option<&CommandSymbol> {
        self.symbol(id).as_command()
    }

    /// Returns `true` if `candidate` is reachable below `ancestor`.
    pub(crate) fn is_descendant(&self, candidate: SymbolId, ancestor: SymbolId) -> bool {
        let mut stack: Vec<SymbolId> = self.subcommands(ancestor).collect();
        let mut seen = vec![false; self.symbols.len()];
        while let Some(id) = stack.pop() {
            if id == candidate {
                return true;
            }
            if std::mem::replace(&mut seen[id.0], true) {
                continue;
            }
            stack.extend(self.subcommands(id));
        }
        false
    }

    fn require_command(&self, id: SymbolId) -> Result<(), DefinitionError> {
        let symbol = self.get(id).ok_or(DefinitionError::UnknownSymbol(id))?;
        if !symbol.is_command() {
            return Err(DefinitionError::NotACommand(symbol.name.clone()));
        }
        Ok(())
    }

    fn push(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len());
        self.symbols.push(symbol);
        self.parents.push(Vec::new());
        id
    }

    fn link(&mut self, parent: SymbolId, child: SymbolId) {
        if let SymbolKind::Command(command) = &mut self.symbols[parent.0].kind {
            command.children.push(child);
        }
        self.parents[child.0].push(parent);
    }
}

impl std::fmt::Debug for SymbolTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbolTree")
            .field("root", &self.symbol(self.root).name)
            .field("symbols", &self.symbols.len())
            .finish()
    }
}

fn command_symbol(spec: CommandSpec) -> Result<Symbol, DefinitionError> {
    let CommandSpec {
        name,
        aliases,
        description,
        hidden,
        subcommand_required,
        validators,
    } = spec;
    validate_alias(&name)?;
    let mut all = vec![name.clone()];
    for alias in aliases {
        validate_alias(&alias)?;
        if !all.contains(&alias) {
            all.push(alias);
        }
    }
    Ok(Symbol {
        name,
        aliases: all,
        description,
        hidden,
        kind: SymbolKind::Command(CommandSymbol {
            children: Vec::new(),
            subcommand_required,
            validators,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Arity, ValueType};

    #[test]
    fn test_rejects_invalid_command_names() {
        assert_eq!(
            SymbolTree::new("").unwrap_err(),
            DefinitionError::InvalidAlias(String::new())
        );
        let mut tree = SymbolTree::new("app").unwrap();
        let root = tree.root();
        assert!(matches!(
            tree.add_command(root, CommandSpec::new("two words")),
            Err(DefinitionError::InvalidAlias(_))
        ));
        assert!(matches!(
            tree.add_option(root, OptionSpec::flag(["-x", " "])),
            Err(DefinitionError::InvalidAlias(_))
        ));
    }

    #[test]
    fn test_children_only_on_commands() {
        let mut tree = SymbolTree::new("app").unwrap();
        let root = tree.root();
        let arg = tree
            .add_argument(root, ArgumentSpec::new("file", ValueType::Path))
            .unwrap();
        assert_eq!(
            tree.add_command(arg, CommandSpec::new("x")).unwrap_err(),
            DefinitionError::NotACommand("file".into())
        );
    }

    #[test]
    fn test_attach_rejects_cycles() {
        let mut tree = SymbolTree::new("app").unwrap();
        let root = tree.root();
        let outer = tree.add_command(root, CommandSpec::new("outer")).unwrap();
        let inner = tree.add_command(outer, CommandSpec::new("inner")).unwrap();

        assert_eq!(
            tree.attach(inner, outer),
            Err(DefinitionError::Cycle("outer".into()))
        );
        assert_eq!(
            tree.attach(outer, outer),
            Err(DefinitionError::Cycle("outer".into()))
        );
        assert_eq!(
            tree.attach(inner, root),
            Err(DefinitionError::Cycle("app".into()))
        );
    }

    #[test]
    fn test_attach_reuses_option_under_second_command() {
        let mut tree = SymbolTree::new("app").unwrap();
        let root = tree.root();
        let a = tree.add_command(root, CommandSpec::new("a")).unwrap();
        let b = tree.add_command(root, CommandSpec::new("b")).unwrap();
        let shared = tree
            .add_option(a, OptionSpec::value(["--name"], ValueType::String))
            .unwrap();
        tree.attach(b, shared).unwrap();

        assert_eq!(tree.parents(shared), &[a, b]);
        assert_eq!(tree.options(b).collect::<Vec<_>>(), vec![shared]);
    }

    #[test]
    fn test_option_argument_inherits_name_and_arity() {
        let mut tree = SymbolTree::new("app").unwrap();
        let root = tree.root();
        let opt = tree
            .add_option(root, OptionSpec::value(["-n", "--count"], ValueType::Integer))
            .unwrap();
        let arg = tree.value_argument(opt).unwrap();
        assert_eq!(tree.symbol(arg).name(), "count");
        assert_eq!(
            tree.symbol(arg).as_argument().unwrap().arity(),
            Arity::EXACTLY_ONE
        );
    }

    #[test]
    fn test_visible_options_include_recursive_ancestors() {
        let mut tree = SymbolTree::new("app").unwrap();
        let root = tree.root();
        let global = tree
            .add_option(root, OptionSpec::flag(["--debug"]).recursive())
            .unwrap();
        let local = tree.add_option(root, OptionSpec::flag(["--local"])).unwrap();
        let sub = tree.add_command(root, CommandSpec::new("sub")).unwrap();
        let own = tree.add_option(sub, OptionSpec::flag(["--own"])).unwrap();

        let visible = tree.visible_options(&[root, sub]);
        assert_eq!(visible, vec![own, global]);
        assert!(!visible.contains(&local));
    }

    #[test]
    fn test_debug_summarizes_tree() {
        let mut tree = SymbolTree::new("app").unwrap();
        let root = tree.root();
        tree.add_option(root, OptionSpec::flag(["--debug"])).unwrap();

        let text = format!("{tree:?}");
        assert_eq!(text, r#"SymbolTree { root: "app", symbols: 3 }"#);
    }
}
