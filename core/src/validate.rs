//! Symbol tree validation.
//!
//! A separate pass over a finished [`SymbolTree`] that catches ambiguities
//! the construction methods cannot see locally: two children of one command
//! answering to the same alias, a command reachable from itself, or a
//! command requiring a subcommand while declaring none.
//!
//! # Examples
//!
//! ```
//! use command_grammar_core::*;
//!
//! let mut tree = SymbolTree::new("git").unwrap();
//! let root = tree.root();
//! tree.add_option(root, OptionSpec::flag(["-v", "--verbose"])).unwrap();
//! assert!(validate_tree(&tree).is_empty());
//!
//! // Invalid: two options answering to -v
//! tree.add_option(root, OptionSpec::flag(["-v", "--version"])).unwrap();
//! assert!(!validate_tree(&tree).is_empty());
//! ```

use std::collections::HashMap;

use thiserror::Error;

use crate::{SymbolId, SymbolTree};

/// Tree validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Two symbols visible from one command share an alias.
    #[error("duplicate alias '{alias}' in command '{command}'")]
    DuplicateAlias { command: String, alias: String },
    /// A command path loops back onto itself.
    #[error("subcommand cycle detected at path: {0}")]
    SubcommandCycle(String),
    /// A command requires a subcommand but declares none.
    #[error("command '{0}' requires a subcommand but declares none")]
    MissingSubcommands(String),
}

/// Validates every command reachable from the root.
///
/// Returns all problems found; an empty list means the tree is valid.
pub fn validate_tree(tree: &SymbolTree) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut path = vec![tree.root()];
    validate_command(tree, &mut path, &mut errors);
    errors
}

fn validate_command(tree: &SymbolTree, path: &mut Vec<SymbolId>, errors: &mut Vec<ValidationError>) {
    let Some(&command) = path.last() else {
        return;
    };
    let name = tree.symbol(command).name().to_string();

    let has_subcommands = tree.subcommands(command).next().is_some();
    if let Some(c) = tree.command(command) {
        if c.is_subcommand_required() && !has_subcommands {
            errors.push(ValidationError::MissingSubcommands(name.clone()));
        }
    }

    let mut seen: HashMap<&str, SymbolId> = HashMap::new();
    let visible = tree
        .visible_options(path)
        .into_iter()
        .chain(tree.subcommands(command));
    for id in visible {
        for alias in tree.symbol(id).aliases() {
            match seen.get(alias.as_str()) {
                Some(&other) if other != id => {
                    errors.push(ValidationError::DuplicateAlias {
                        command: name.clone(),
                        alias: alias.clone(),
                    });
                }
                _ => {
                    seen.insert(alias.as_str(), id);
                }
            }
        }
    }

    let subcommands: Vec<SymbolId> = tree.subcommands(command).collect();
    for sub in subcommands {
        if path.contains(&sub) {
            let cycle_path = path
                .iter()
                .chain(std::iter::once(&sub))
                .map(|id| tree.symbol(*id).name())
                .collect::<Vec<_>>()
                .join(" ");
            errors.push(ValidationError::SubcommandCycle(cycle_path));
            continue;
        }
        path.push(sub);
        validate_command(tree, path, errors);
        path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CommandSpec, OptionSpec, ValueType};

    #[test]
    fn test_accepts_valid_tree() {
        let mut tree = SymbolTree::new("git").unwrap();
        let root = tree.root();
        tree.add_option(root, OptionSpec::flag(["-v", "--verbose"]).recursive())
            .unwrap();
        let commit = tree.add_command(root, CommandSpec::new("commit")).unwrap();
        tree.add_option(commit, OptionSpec::value(["-m", "--message"], ValueType::String))
            .unwrap();

        assert!(validate_tree(&tree).is_empty());
    }

    #[test]
    fn test_rejects_recursive_option_shadowed_by_local_alias() {
        let mut tree = SymbolTree::new("git").unwrap();
        let root = tree.root();
        tree.add_option(root, OptionSpec::flag(["-v", "--verbose"]).recursive())
            .unwrap();
        let commit = tree.add_command(root, CommandSpec::new("commit")).unwrap();
        tree.add_option(commit, OptionSpec::flag(["-v", "--verify"]))
            .unwrap();

        assert_eq!(
            validate_tree(&tree),
            vec![ValidationError::DuplicateAlias {
                command: "commit".into(),
                alias: "-v".into()
            }]
        );
    }

    #[test]
    fn test_rejects_subcommand_and_option_sharing_alias() {
        let mut tree = SymbolTree::new("app").unwrap();
        let root = tree.root();
        tree.add_command(root, CommandSpec::new("run")).unwrap();
        tree.add_option(root, OptionSpec::flag(["run"])).unwrap();

        let errors = validate_tree(&tree);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ValidationError::DuplicateAlias { .. }));
    }

    #[test]
    fn test_rejects_required_subcommand_without_children() {
        let tree = SymbolTree::with_root(CommandSpec::new("app").subcommand_required()).unwrap();
        assert_eq!(
            validate_tree(&tree),
            vec![ValidationError::MissingSubcommands("app".into())]
        );
    }

    #[test]
    fn test_shared_option_is_not_a_duplicate() {
        let mut tree = SymbolTree::new("app").unwrap();
        let root = tree.root();
        let sub = tree.add_command(root, CommandSpec::new("sub")).unwrap();
        let shared = tree
            .add_option(root, OptionSpec::flag(["--shared"]).recursive())
            .unwrap();
        tree.attach(sub, shared).unwrap();

        assert!(validate_tree(&tree).is_empty());
    }
}
