//! Parser configuration.
//!
//! [`ParserSettings`] holds the plain switches and can be stored as YAML or
//! JSON. [`ParserConfiguration`] adds the runtime-only hooks: the token
//! replacer and the message catalogue.
//!
//! # Example YAML
//!
//! ```yaml
//! enable_bundling: true
//! treat_unmatched_tokens_as_errors: true
//! enable_positional_options: false
//! enable_directives: true
//! directives:
//!   - parse
//!   - suggest
//! response_files: true
//! max_response_file_depth: 32
//! legacy_double_dash: false
//! ```

use std::fmt;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::messages::{DefaultMessages, Messages};

/// Serializable parser switches.
///
/// # Examples
///
/// ```
/// use command_grammar_core::ParserSettings;
///
/// let settings: ParserSettings = serde_yaml::from_str("enable_bundling: false").unwrap();
/// assert!(!settings.enable_bundling);
/// assert!(settings.treat_unmatched_tokens_as_errors);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserSettings {
    /// Expand `-abc` into `-a -b -c`.
    pub enable_bundling: bool,
    /// Report every unmatched token as an error.
    pub treat_unmatched_tokens_as_errors: bool,
    /// Match bare values to options by declaration order.
    pub enable_positional_options: bool,
    /// Recognise leading `[key]` / `[key:value]` tokens.
    pub enable_directives: bool,
    /// Accepted directive keys; empty accepts any well-formed key.
    pub directives: Vec<String>,
    /// Expand `@file` tokens.
    pub response_files: bool,
    /// Deepest allowed chain of response files referencing each other.
    pub max_response_file_depth: usize,
    /// Keep tokens after `--` out of matching entirely.
    pub legacy_double_dash: bool,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            enable_bundling: true,
            treat_unmatched_tokens_as_errors: true,
            enable_positional_options: false,
            enable_directives: true,
            directives: Vec::new(),
            response_files: true,
            max_response_file_depth: 32,
            legacy_double_dash: false,
        }
    }
}

impl ParserSettings {
    /// Loads settings from a `.yaml`/`.yml` or `.json` file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](ConfigError::IoError) if the file cannot be read,
    /// a parse error for malformed content, or
    /// [`UnsupportedFormat`](ConfigError::UnsupportedFormat) for other
    /// extensions.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = FileFormat::from_path(path)?;
        let reader = BufReader::new(std::fs::File::open(path)?);
        let settings = match format {
            FileFormat::Json => serde_json::from_reader(reader)?,
            FileFormat::Yaml => serde_yaml::from_reader(reader)?,
        };
        Ok(settings)
    }

    /// Saves the settings, choosing the format from the extension.
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

    /// Returns `true` if `key` may be lexed as a directive.
    pub fn accepts_directive(&self, key: &str) -> bool {
        self.enable_directives && (self.directives.is_empty() || self.directives.iter().any(|d| d == key))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FileFormat {
    Json,
    Yaml,
}

impl FileFormat {
    pub(crate) fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(FileFormat::Json),
            Some("yaml") | Some("yml") => Ok(FileFormat::Yaml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

/// Outcome of a custom token replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replacement {
    /// Not handled; the built-in response-file rule applies.
    Unchanged,
    /// Replace the token with zero or more tokens.
    Tokens(Vec<String>),
    /// Drop the token and report this message.
    Error(String),
}

/// Hook consulted for every `@`-prefixed token, receiving the text after `@`.
pub type TokenReplacer = Arc<dyn Fn(&str) -> Replacement + Send + Sync>;

/// Settings plus runtime hooks used by a parse.
#[derive(Clone)]
pub struct ParserConfiguration {
    pub settings: ParserSettings,
    pub token_replacer: Option<TokenReplacer>,
    pub messages: Arc<dyn Messages>,
}

static SHARED_DEFAULT: LazyLock<ParserConfiguration> = LazyLock::new(ParserConfiguration::default);

impl ParserConfiguration {
    pub fn new(settings: ParserSettings) -> Self {
        Self {
            settings,
            token_replacer: None,
            messages: Arc::new(DefaultMessages),
        }
    }

    /// A process-wide default configuration.
    pub fn shared_default() -> &'static ParserConfiguration {
        &SHARED_DEFAULT
    }

    pub fn with_token_replacer(
        mut self,
        replacer: impl Fn(&str) -> Replacement + Send + Sync + 'static,
    ) -> Self {
        self.token_replacer = Some(Arc::new(replacer));
        self
    }

    pub fn with_messages(mut self, messages: impl Messages + 'static) -> Self {
        self.messages = Arc::new(messages);
        self
    }
}

impl Default for ParserConfiguration {
    fn default() -> Self {
        Self::new(ParserSettings::default())
    }
}

impl fmt::Debug for ParserConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserConfiguration")
            .field("settings", &self.settings)
            .field("token_replacer", &self.token_replacer.is_some())
            .finish()
    }
}
