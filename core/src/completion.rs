//! Completion suggestions for a partially typed command line.
//!
//! The engine finds the result the cursor belongs to (the innermost
//! command, or an option still waiting for a value) and collects candidates
//! from it: subcommand names, visible option aliases and argument values.
//! Candidates are filtered by the word under the cursor and ordered by
//! where that word occurs in them.

use serde::Serialize;
use tracing::debug;

use crate::parse_result::ParseResult;
use crate::parser::Parser;
use crate::result::{ResultId, ResultKind};
use crate::tokenizer::token_spans;
use crate::{SymbolId, ValueType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompletionKind {
    /// A command name or option alias.
    Keyword,
    /// An argument value.
    Value,
}

/// One suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionItem {
    pub label: String,
    pub kind: CompletionKind,
    /// Key used for ordering; defaults to the label.
    pub sort_text: String,
    /// Text to insert when it differs from the label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insert_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl CompletionItem {
    /// A value suggestion.
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            sort_text: label.clone(),
            label,
            kind: CompletionKind::Value,
            insert_text: None,
            detail: None,
        }
    }

    pub fn keyword(label: impl Into<String>) -> Self {
        Self {
            kind: CompletionKind::Keyword,
            ..Self::new(label)
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_insert_text(mut self, text: impl Into<String>) -> Self {
        self.insert_text = Some(text.into());
        self
    }

    pub fn with_sort_text(mut self, text: impl Into<String>) -> Self {
        self.sort_text = text.into();
        self
    }
}

/// What a completion delegate sees.
pub struct CompletionContext<'p, 'a> {
    parse_result: &'p ParseResult<'a>,
    word_to_complete: String,
    position: usize,
}

impl<'p, 'a> CompletionContext<'p, 'a> {
    pub fn parse_result(&self) -> &'p ParseResult<'a> {
        self.parse_result
    }

    /// The partial word at the cursor; empty after whitespace.
    pub fn word_to_complete(&self) -> &str {
        &self.word_to_complete
    }

    /// Cursor byte offset in the command line text.
    pub fn position(&self) -> usize {
        self.position
    }
}

pub(crate) fn complete(result: &ParseResult<'_>, position: Option<usize>) -> Vec<CompletionItem> {
    let text = result.command_line_text();
    let mut position = position.unwrap_or(text.len()).min(text.len());
    while !text.is_char_boundary(position) {
        position -= 1;
    }

    let span = token_spans(&text)
        .into_iter()
        .find(|span| span.start <= position && position <= span.end);
    let (word, word_end) = match span {
        Some(span) => (text[span.clone()].to_string(), span.end),
        None => (String::new(), position),
    };

    if text[word_end..].trim().is_empty() {
        return complete_at(result, word, position);
    }
    debug!(replayed = %&text[..word_end], "Replaying truncated input for completion");
    let replayed = Parser::new(result.tree(), result.configuration()).parse(&text[..word_end]);
    complete_at(&replayed, word, position)
}

fn complete_at(result: &ParseResult<'_>, word: String, position: usize) -> Vec<CompletionItem> {
    let context = CompletionContext {
        parse_result: result,
        word_to_complete: word,
        position,
    };
    let anchor = proximate(result, &context.word_to_complete);
    debug!(anchor = anchor.index(), word = %context.word_to_complete, "Completing");

    let arena = result.arena();
    let node = arena.get(anchor);
    let mut items = match node.kind {
        ResultKind::Option => result
            .tree()
            .value_argument(node.symbol)
            .map(|argument| argument_completions(&context, argument))
            .unwrap_or_default(),
        _ => command_completions(&context),
    };
    filter_and_sort(&mut items, &context.word_to_complete);
    items
}

/// The option still expecting a value, or else the innermost command.
fn proximate(result: &ParseResult<'_>, word: &str) -> ResultId {
    let arena = result.arena();
    let innermost = result.innermost();
    let command_position = arena.get(innermost).identifier.as_ref().map(|t| t.position);

    let mut best: Option<(usize, ResultId)> = None;
    for id in arena.subtree(innermost) {
        let node = arena.get(id);
        if node.kind != ResultKind::Option || node.implicit {
            continue;
        }
        let Some(identifier) = &node.identifier else {
            continue;
        };
        if command_position.is_some_and(|p| identifier.position < p) {
            continue;
        }
        if !accepts_value(result, id, word) {
            continue;
        }
        if best.is_none_or(|(p, _)| identifier.position >= p) {
            best = Some((identifier.position, id));
        }
    }
    best.map_or(innermost, |(_, id)| id)
}

/// Whether an option result can still take the word being typed.
fn accepts_value(result: &ParseResult<'_>, option: ResultId, word: &str) -> bool {
    let arena = result.arena();
    let Some(argument_result) = arena.option_argument(option) else {
        return false;
    };
    let argument_node = arena.get(argument_result);
    let Some(argument) = result.tree().symbol(argument_node.symbol).as_argument() else {
        return false;
    };
    if argument.is_flag() || argument.arity.maximum == 0 {
        return false;
    }
    let tokens = &argument_node.tokens;
    if !word.is_empty() && tokens.last().is_some_and(|t| t.value == word) {
        return true;
    }
    tokens.len() < argument.arity.maximum
}

fn command_completions(context: &CompletionContext<'_, '_>) -> Vec<CompletionItem> {
    let result = context.parse_result;
    let tree = result.tree();
    let arena = result.arena();
    let path = result.command_path();
    let Some(&command) = path.last() else {
        return Vec::new();
    };

    let mut items = Vec::new();
    for subcommand in tree.subcommands(command) {
        let symbol = tree.symbol(subcommand);
        if symbol.is_hidden() {
            continue;
        }
        for alias in symbol.aliases() {
            let mut item = CompletionItem::keyword(alias);
            item.detail = symbol.description().map(str::to_string);
            items.push(item);
        }
    }

    for option in tree.visible_options(&path) {
        let symbol = tree.symbol(option);
        if symbol.is_hidden() || option_saturated(context, option) {
            continue;
        }
        for alias in symbol.aliases() {
            let mut item = CompletionItem::keyword(alias);
            item.detail = symbol.description().map(str::to_string);
            items.push(item);
        }
    }

    for argument in tree.arguments(command) {
        let Some(maximum) = tree.symbol(argument).as_argument().map(|a| a.arity.maximum) else {
            continue;
        };
        let open = match arena.find(argument) {
            None => true,
            Some(id) => {
                let node = arena.get(id);
                node.implicit
                    || node.tokens.len() < maximum
                    || node.tokens.iter().any(|t| t.value == context.word_to_complete)
            }
        };
        if open {
            items.extend(argument_completions(context, argument));
        }
    }
    items
}

fn option_saturated(context: &CompletionContext<'_, '_>, option: SymbolId) -> bool {
    let result = context.parse_result;
    let arena = result.arena();
    let Some(id) = arena.find(option) else {
        return false;
    };
    if arena.get(id).implicit {
        return false;
    }
    let Some(argument_result) = arena.option_argument(id) else {
        return true;
    };
    let node = arena.get(argument_result);
    let Some(argument) = result.tree().symbol(node.symbol).as_argument() else {
        return true;
    };
    argument.is_flag() || node.tokens.len() >= argument.arity.maximum
}

fn argument_completions(context: &CompletionContext<'_, '_>, argument: SymbolId) -> Vec<CompletionItem> {
    let symbol = context.parse_result.tree().symbol(argument);
    let Some(definition) = symbol.as_argument() else {
        return Vec::new();
    };
    if let Some(delegate) = &definition.completion_delegate {
        return delegate(context);
    }

    let mut labels: Vec<String> = definition
        .completions
        .iter()
        .chain(&definition.allowed_values)
        .cloned()
        .collect();
    match &definition.value_type {
        ValueType::Enum(names) => labels.extend(names.iter().cloned()),
        ValueType::Bool => labels.extend(["true".to_string(), "false".to_string()]),
        _ => {}
    }
    labels.into_iter().map(CompletionItem::new).collect()
}

/// Keeps items containing `word` (case-insensitively), drops repeated
/// labels and orders by match position, then label.
fn filter_and_sort(items: &mut Vec<CompletionItem>, word: &str) {
    let needle = word.to_lowercase();
    items.retain(|item| item.label.to_lowercase().contains(&needle));

    let mut seen = std::collections::HashSet::new();
    items.retain(|item| seen.insert(item.label.clone()));

    let rank = |item: &CompletionItem| item.sort_text.to_lowercase().find(&needle).unwrap_or(usize::MAX);
    items.sort_by(|a, b| rank(a).cmp(&rank(b)).then_with(|| a.label.cmp(&b.label)));
}
