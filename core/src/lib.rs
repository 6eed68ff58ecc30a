//! Command-line grammar engine: symbol trees, tokenizing, matching, value
//! resolution and completion.
//!
//! This crate models a command-line grammar as a tree of symbols and
//! parses input against it:
//!
//! - [`SymbolTree`]: an arena of commands, options and arguments built
//!   from [`CommandSpec`], [`OptionSpec`] and [`ArgumentSpec`] values, or
//!   loaded from a grammar file ([`CommandDefinition`]).
//! - [`Parser`]: tokenizes a command line (response files, directives,
//!   `--opt=value` splitting, short-option bundling) and matches the tokens
//!   against the tree, producing a [`ParseResult`].
//! - [`ParseResult`]: the result tree, diagnostics and unmatched tokens,
//!   with lazily produced typed values ([`ParseResult::value`]) and
//!   completions ([`ParseResult::completions`]).
//!
//! Parse problems never surface as Rust errors: they are collected as
//! [`ParseError`]s on the result. Building an invalid tree fails with a
//! [`DefinitionError`]; [`validate_tree`] catches ambiguities across a
//! finished tree.
//!
//! # Example
//!
//! ```
//! use command_grammar_core::*;
//!
//! let mut tree = SymbolTree::new("git").unwrap();
//! let root = tree.root();
//! tree.add_option(root, OptionSpec::flag(["-v", "--verbose"]).recursive())
//!     .unwrap();
//! let commit = tree.add_command(root, CommandSpec::new("commit")).unwrap();
//! let message = tree
//!     .add_option(commit, OptionSpec::value(["-m", "--message"], ValueType::String))
//!     .unwrap();
//! assert!(validate_tree(&tree).is_empty());
//!
//! let result = tree.parse("git commit -v -m initial");
//! assert!(result.errors().is_empty());
//! assert_eq!(result.value::<String>(message).unwrap().as_deref(), Some("initial"));
//!
//! let labels: Vec<String> = tree
//!     .parse("git com")
//!     .completions(None)
//!     .into_iter()
//!     .map(|item| item.label)
//!     .collect();
//! assert_eq!(labels, vec!["commit"]);
//! ```

mod arity;
mod checks;
mod completion;
mod config;
mod context;
mod definition;
mod error;
mod matcher;
mod messages;
mod parse_result;
mod parser;
mod report;
mod resolver;
mod result;
mod symbol;
mod token;
mod tokenizer;
mod tree;
mod validate;
mod value;

pub use arity::Arity;
pub use completion::{CompletionContext, CompletionItem, CompletionKind};
pub use config::{ParserConfiguration, ParserSettings, Replacement, TokenReplacer};
pub use context::SymbolContext;
pub use definition::{
    ArgumentDefinition, ArityDefinition, CommandDefinition, OptionDefinition, TypeName,
};
pub use error::{ConfigError, DefinitionError, Result, ValueError};
pub use messages::{DefaultMessages, Messages};
pub use parse_result::ParseResult;
pub use parser::Parser;
pub use report::ParseReport;
pub use result::{ParseError, ResultId, ResultKind, SymbolResult};
pub use symbol::{
    ArgumentSpec, ArgumentSymbol, CommandSpec, CommandSymbol, CompletionDelegate, CustomParser,
    DefaultFactory, OptionSpec, OptionSymbol, Symbol, SymbolId, SymbolKind, Validator,
};
pub use token::{Token, TokenKind};
pub use tokenizer::{Tokenization, split_command_line, tokenize};
pub use tree::SymbolTree;
pub use validate::{ValidationError, validate_tree};
pub use value::{FromValue, Value, ValueType};
