//! Declarative grammar files.
//!
//! A [`CommandDefinition`] describes a symbol tree as plain data so it can
//! be kept in a JSON or YAML file and turned into a [`SymbolTree`] with
//! [`build`](CommandDefinition::build). Hooks (custom parsers, validators,
//! completion delegates) have no file form; textual defaults become default
//! factories.
//!
//! # Example YAML
//!
//! ```yaml
//! name: deploy
//! options:
//!   - aliases: [-v, --verbose]
//!     recursive: true
//! subcommands:
//!   - name: push
//!     options:
//!       - aliases: [-e, --env]
//!         type: enum
//!         values: [staging, production]
//!         default: staging
//!     arguments:
//!       - name: services
//!         arity: { min: 1 }
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::FileFormat;
use crate::error::Result;
use crate::{
    Arity, ArgumentSpec, CommandSpec, DefinitionError, OptionSpec, SymbolId, SymbolTree, Value,
    ValueType,
};

/// Value type name as written in grammar files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TypeName {
    Bool,
    #[default]
    String,
    Integer,
    Float,
    Path,
    /// One of the definition's `values`.
    Enum,
}

/// Arity bounds; a missing `max` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArityDefinition {
    #[serde(default)]
    pub min: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
}

impl ArityDefinition {
    fn to_arity(self) -> std::result::Result<Arity, DefinitionError> {
        Arity::new(self.min, self.max.unwrap_or(Arity::UNBOUNDED))
    }
}

/// A command in a grammar file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub subcommand_required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<ArgumentDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<CommandDefinition>,
}

/// An option in a grammar file. Options are flags unless a `type` is given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionDefinition {
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub recursive: bool,
    #[serde(rename = "type", default = "flag_type")]
    pub type_name: TypeName,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arity: Option<ArityDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub completions: Vec<String>,
}

/// A positional argument in a grammar file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(rename = "type", default)]
    pub type_name: TypeName,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arity: Option<ArityDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub completions: Vec<String>,
}

fn flag_type() -> TypeName {
    TypeName::Bool
}

fn value_type(type_name: TypeName, values: &[String]) -> ValueType {
    match type_name {
        TypeName::Bool => ValueType::Bool,
        TypeName::String => ValueType::String,
        TypeName::Integer => ValueType::Integer,
        TypeName::Float => ValueType::Float,
        TypeName::Path => ValueType::Path,
        TypeName::Enum => ValueType::Enum(values.to_vec()),
    }
}

impl CommandDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            description: None,
            hidden: false,
            subcommand_required: false,
            options: Vec::new(),
            arguments: Vec::new(),
            subcommands: Vec::new(),
        }
    }

    /// Loads a definition from a `.json`, `.yaml` or `.yml` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = FileFormat::from_path(path)?;
        let reader = BufReader::new(std::fs::File::open(path)?);
        let definition = match format {
            FileFormat::Json => serde_json::from_reader(reader)?,
            FileFormat::Yaml => serde_yaml::from_reader(reader)?,
        };
        Ok(definition)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = FileFormat::from_path(path)?;
        let writer = BufWriter::new(std::fs::File::create(path)?);
        match format {
            FileFormat::Json => serde_json::to_writer_pretty(writer, self)?,
            FileFormat::Yaml => serde_yaml::to_writer(writer, self)?,
        }
        Ok(())
    }

    /// Builds the symbol tree this definition describes.
    ///
    /// # Errors
    ///
    /// Any [`DefinitionError`] raised while adding the symbols, or
    /// [`InvalidDefault`](DefinitionError::InvalidDefault) for a default
    /// that does not convert to its declared type.
    pub fn build(&self) -> std::result::Result<SymbolTree, DefinitionError> {
        let mut tree = SymbolTree::with_root(self.command_spec())?;
        let root = tree.root();
        self.add_children(&mut tree, root)?;
        Ok(tree)
    }

    fn command_spec(&self) -> CommandSpec {
        let mut spec = CommandSpec::new(&self.name);
        for alias in &self.aliases {
            spec = spec.alias(alias);
        }
        if let Some(description) = &self.description {
            spec = spec.description(description);
        }
        if self.hidden {
            spec = spec.hidden();
        }
        if self.subcommand_required {
            spec = spec.subcommand_required();
        }
        spec
    }

    fn add_children(&self, tree: &mut SymbolTree, command: SymbolId) -> std::result::Result<(), DefinitionError> {
        for option in &self.options {
            tree.add_option(command, option.to_spec()?)?;
        }
        for argument in &self.arguments {
            tree.add_argument(command, argument.to_spec()?)?;
        }
        for subcommand in &self.subcommands {
            let child = tree.add_command(command, subcommand.command_spec())?;
            subcommand.add_children(tree, child)?;
        }
        Ok(())
    }
}

impl OptionDefinition {
    fn to_spec(&self) -> std::result::Result<OptionSpec, DefinitionError> {
        let value_type = value_type(self.type_name, &self.values);
        let mut spec = OptionSpec::value(self.aliases.iter().cloned(), value_type.clone());
        if let Some(description) = &self.description {
            spec = spec.description(description);
        }
        if self.hidden {
            spec = spec.hidden();
        }
        if self.required {
            spec = spec.required();
        }
        if self.recursive {
            spec = spec.recursive();
        }

        let name = spec.canonical_name().unwrap_or_default();
        let arity = match self.arity {
            Some(arity) => Some(arity.to_arity()?),
            None => None,
        };
        let default_arity = if value_type == ValueType::Bool {
            Arity::ZERO_OR_ONE
        } else {
            Arity::EXACTLY_ONE
        };
        let default = match &self.default {
            Some(text) => Some(convert_default(&name, &value_type, arity.unwrap_or(default_arity), text)?),
            None => None,
        };

        let allowed = self.allowed_values.clone();
        let completions = self.completions.clone();
        Ok(spec.with_argument(|mut argument| {
            if let Some(arity) = arity {
                argument = argument.arity(arity);
            }
            if let Some(value) = default {
                argument = argument.default_value(move |_| value.clone());
            }
            argument.from_among(allowed).completions(completions)
        }))
    }
}

impl ArgumentDefinition {
    fn to_spec(&self) -> std::result::Result<ArgumentSpec, DefinitionError> {
        let value_type = value_type(self.type_name, &self.values);
        let mut spec = ArgumentSpec::new(&self.name, value_type.clone())
            .from_among(self.allowed_values.iter().cloned())
            .completions(self.completions.iter().cloned());
        if let Some(description) = &self.description {
            spec = spec.description(description);
        }
        if self.hidden {
            spec = spec.hidden();
        }
        let arity = match self.arity {
            Some(arity) => arity.to_arity()?,
            None => Arity::EXACTLY_ONE,
        };
        spec = spec.arity(arity);
        if let Some(text) = &self.default {
            let value = convert_default(&self.name, &value_type, arity, text)?;
            spec = spec.default_value(move |_| value.clone());
        }
        Ok(spec)
    }
}

/// Converts a default written in a grammar file with the declared type.
fn convert_default(
    symbol: &str,
    value_type: &ValueType,
    arity: Arity,
    default: &serde_json::Value,
) -> std::result::Result<Value, DefinitionError> {
    let texts: Vec<String> = match default {
        serde_json::Value::Array(items) => items.iter().map(scalar_text).collect(),
        other => vec![scalar_text(other)],
    };
    let invalid = |text: &str| DefinitionError::InvalidDefault {
        symbol: symbol.to_string(),
        value: text.to_string(),
        expected: value_type.name(),
    };

    let mut values = Vec::with_capacity(texts.len());
    for text in &texts {
        values.push(value_type.convert(text).ok_or_else(|| invalid(text))?);
    }
    if arity.is_multiple() {
        return Ok(Value::List(values));
    }
    match values.len() {
        1 => Ok(values.remove(0)),
        _ => Err(invalid(&texts.join(" "))),
    }
}

fn scalar_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
