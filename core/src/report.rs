//! Serializable summary of a parse.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::parse_result::ParseResult;
use crate::result::ResultKind;
use crate::Value;

/// A flat, serializable view of a [`ParseResult`].
///
/// Options are keyed by canonical name and arguments by name. A symbol
/// whose value could not be produced is listed with `null`.
///
/// # Examples
///
/// ```
/// use command_grammar_core::*;
///
/// let mut tree = SymbolTree::new("app").unwrap();
/// let root = tree.root();
/// tree.add_option(root, OptionSpec::flag(["-v", "--verbose"])).unwrap();
///
/// let report = tree.parse("app -v").report();
/// assert_eq!(report.command_path, vec!["app"]);
/// assert_eq!(report.options["--verbose"], Some(Value::Bool(true)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseReport {
    pub command_path: Vec<String>,
    pub options: BTreeMap<String, Option<Value>>,
    pub arguments: BTreeMap<String, Option<Value>>,
    pub errors: Vec<String>,
    pub unmatched_tokens: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unparsed_tokens: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub directives: BTreeMap<String, Vec<String>>,
}

impl ParseReport {
    pub fn from_result(result: &ParseResult<'_>) -> Self {
        let tree = result.tree();
        let arena = result.arena();
        let resolver = result.resolver();

        let mut options = BTreeMap::new();
        let mut arguments = BTreeMap::new();
        for id in arena.ids() {
            let node = arena.get(id);
            let symbol = tree.symbol(node.symbol);
            match node.kind {
                ResultKind::Option => {
                    options.insert(symbol.name().to_string(), resolver.value_of(id));
                }
                ResultKind::Argument if symbol.as_argument().is_some_and(|a| a.option.is_none()) => {
                    arguments.insert(symbol.name().to_string(), resolver.value_of(id));
                }
                _ => {}
            }
        }

        Self {
            command_path: result
                .command_path()
                .into_iter()
                .map(|id| tree.symbol(id).name().to_string())
                .collect(),
            options,
            arguments,
            errors: result.errors().iter().map(|e| e.message.clone()).collect(),
            unmatched_tokens: result
                .unmatched_tokens()
                .iter()
                .map(|t| t.value.clone())
                .collect(),
            unparsed_tokens: result
                .unparsed_tokens()
                .iter()
                .map(|t| t.value.clone())
                .collect(),
            directives: result.directives().clone(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ParseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "command: {}", self.command_path.join(" "))?;
        for (name, value) in &self.options {
            writeln!(f, "option {name} = {}", display(value))?;
        }
        for (name, value) in &self.arguments {
            writeln!(f, "argument {name} = {}", display(value))?;
        }
        for (key, values) in &self.directives {
            writeln!(f, "directive [{key}] {}", values.join(", "))?;
        }
        if !self.unmatched_tokens.is_empty() {
            writeln!(f, "unmatched: {}", self.unmatched_tokens.join(" "))?;
        }
        if !self.unparsed_tokens.is_empty() {
            writeln!(f, "unparsed: {}", self.unparsed_tokens.join(" "))?;
        }
        for error in &self.errors {
            writeln!(f, "error: {error}")?;
        }
        Ok(())
    }
}

fn display(value: &Option<Value>) -> String {
    match value {
        Some(value) => value.to_display_string(),
        None => "<none>".to_string(),
    }
}
