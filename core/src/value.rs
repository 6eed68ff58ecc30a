//! Dynamic argument values and their declared types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Declared type of the values an argument accepts.
///
/// Drives token conversion and the default completions of an argument
/// (`true`/`false` for [`Bool`](ValueType::Bool), the declared names for
/// [`Enum`](ValueType::Enum)).
///
/// # Examples
///
/// ```
/// use command_grammar_core::{Value, ValueType};
///
/// assert_eq!(ValueType::Integer.convert("42"), Some(Value::Int(42)));
/// assert_eq!(ValueType::Integer.convert("forty-two"), None);
///
/// let color = ValueType::Enum(vec!["Red".into(), "Green".into()]);
/// assert_eq!(color.convert("red"), Some(Value::Str("Red".into())));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// `true` / `false`, case-insensitive.
    Bool,
    /// Raw token text (the default).
    #[default]
    String,
    /// Signed 64-bit integer.
    Integer,
    /// 64-bit float.
    Float,
    /// File-system path.
    Path,
    /// One of a fixed set of names, matched case-insensitively.
    Enum(Vec<String>),
}

impl ValueType {
    /// Human-readable type name used in conversion diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::String => "string",
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::Path => "path",
            ValueType::Enum(_) => "enum",
        }
    }

    /// Converts one token's text, returning `None` when it does not parse.
    pub fn convert(&self, text: &str) -> Option<Value> {
        match self {
            ValueType::Bool => parse_bool(text).map(Value::Bool),
            ValueType::String => Some(Value::Str(text.to_string())),
            ValueType::Integer => text.parse::<i64>().ok().map(Value::Int),
            ValueType::Float => text.parse::<f64>().ok().map(Value::Float),
            ValueType::Path => Some(Value::Path(PathBuf::from(text))),
            ValueType::Enum(names) => names
                .iter()
                .find(|name| name.eq_ignore_ascii_case(text))
                .map(|name| Value::Str(name.clone())),
        }
    }
}

pub(crate) fn parse_bool(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// A value produced for an argument result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Path(PathBuf),
    List(Vec<Value>),
}

impl Value {
    /// Renders the value the way it would be typed on a command line.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Str(s) => s.clone(),
            Value::Path(p) => p.display().to_string(),
            Value::List(items) => items
                .iter()
                .map(Value::to_display_string)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<PathBuf> for Value {
    fn from(value: PathBuf) -> Self {
        Value::Path(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

/// Typed extraction from a [`Value`].
///
/// # Examples
///
/// ```
/// use command_grammar_core::{FromValue, Value};
///
/// let list = Value::List(vec![Value::Int(1), Value::Int(2)]);
/// assert_eq!(Vec::<i64>::from_value(&list), Some(vec![1, 2]));
/// assert_eq!(i32::from_value(&Value::Int(7)), Some(7));
/// assert_eq!(String::from_value(&Value::Int(7)), None);
/// ```
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

macro_rules! from_int_value {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::Int(i) => <$ty>::try_from(*i).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

from_int_value!(i8, i16, i32, u8, u16, u32, u64, usize);

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(s) => Some(s.clone()),
            Value::Path(p) => Some(p.display().to_string()),
            _ => None,
        }
    }
}

impl FromValue for PathBuf {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Path(p) => Some(p.clone()),
            Value::Str(s) => Some(PathBuf::from(s)),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            single => T::from_value(single).map(|item| vec![item]),
        }
    }
}
