//! Parse entry points.

use tracing::debug;

use crate::checks;
use crate::config::ParserConfiguration;
use crate::matcher;
use crate::parse_result::{Input, ParseResult};
use crate::resolver::ValueCache;
use crate::result::ParseError;
use crate::tokenizer::{split_command_line, tokenize};
use crate::SymbolTree;

/// Parses input against a symbol tree with a given configuration.
///
/// A parser borrows both and holds no other state, so one tree and one
/// configuration can back any number of parses, from any number of threads.
///
/// # Examples
///
/// ```
/// use command_grammar_core::*;
///
/// let mut tree = SymbolTree::new("app").unwrap();
/// let root = tree.root();
/// let all = tree.add_option(root, OptionSpec::flag(["-a", "--all"])).unwrap();
///
/// let config = ParserConfiguration::new(ParserSettings {
///     treat_unmatched_tokens_as_errors: false,
///     ..Default::default()
/// });
/// let result = Parser::new(&tree, &config).parse("-a extra");
/// assert!(result.errors().is_empty());
/// assert_eq!(result.unmatched_tokens()[0].value, "extra");
/// assert_eq!(result.value::<bool>(all).unwrap(), Some(true));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Parser<'a> {
    tree: &'a SymbolTree,
    config: &'a ParserConfiguration,
}

impl<'a> Parser<'a> {
    pub fn new(tree: &'a SymbolTree, config: &'a ParserConfiguration) -> Self {
        Self { tree, config }
    }

    /// Parses a command line, splitting it on whitespace outside quotes.
    pub fn parse(&self, line: &str) -> ParseResult<'a> {
        let args = split_command_line(line);
        self.run(Input::Line(line.to_string()), args)
    }

    /// Parses already split arguments.
    pub fn parse_args<I, S>(&self, args: I) -> ParseResult<'a>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        self.run(Input::Args(args.clone()), args)
    }

    fn run(&self, input: Input, args: Vec<String>) -> ParseResult<'a> {
        let tokenization = tokenize(&args, self.tree, self.config);
        let mut errors: Vec<ParseError> = tokenization
            .errors
            .into_iter()
            .map(|message| ParseError::new(message, None))
            .collect();

        let mut outcome = matcher::match_tokens(self.tree, self.config, tokenization.tokens);
        let cache = ValueCache::default();
        errors.extend(checks::run(
            self.tree,
            self.config,
            &mut outcome.arena,
            &cache,
            &outcome.path,
            &mut outcome.unmatched,
        ));
        debug!(
            tokens = outcome.tokens.len(),
            errors = errors.len(),
            unmatched = outcome.unmatched.len(),
            "Parsed input"
        );

        ParseResult {
            tree: self.tree,
            config: self.config,
            input,
            tokens: outcome.tokens,
            arena: outcome.arena,
            cache,
            path: outcome.path,
            errors,
            unmatched: outcome.unmatched,
            unparsed: outcome.unparsed,
            directives: outcome.directives,
        }
    }
}

impl SymbolTree {
    /// Parses `line` with the default configuration.
    pub fn parse(&self, line: &str) -> ParseResult<'_> {
        Parser::new(self, ParserConfiguration::shared_default()).parse(line)
    }

    /// Parses pre-split arguments with the default configuration.
    pub fn parse_args<I, S>(&self, args: I) -> ParseResult<'_>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Parser::new(self, ParserConfiguration::shared_default()).parse_args(args)
    }
}
