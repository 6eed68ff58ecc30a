//! Diagnostic message formatting.
//!
//! Every parse-time diagnostic is rendered through a [`Messages`]
//! implementation carried by the
//! [`ParserConfiguration`](crate::ParserConfiguration). Override individual
//! methods to localize or reword messages.

/// Formats parse diagnostics. Every method has an English default.
pub trait Messages: Send + Sync {
    fn unrecognized_command_or_argument(&self, token: &str) -> String {
        format!("Unrecognized command or argument '{token}'.")
    }

    fn required_argument_missing_for_command(&self, command: &str) -> String {
        format!("Required argument missing for command: '{command}'.")
    }

    fn required_argument_missing_for_option(&self, option: &str) -> String {
        format!("Required argument missing for option: '{option}'.")
    }

    fn required_option_missing(&self, option: &str) -> String {
        format!("Option '{option}' is required.")
    }

    fn required_command_missing(&self) -> String {
        "Required command was not provided.".to_string()
    }

    fn expects_one_argument(&self, option: &str, found: usize) -> String {
        format!("Option '{option}' expects a single argument but {found} were provided.")
    }

    fn expects_fewer_arguments(&self, option: &str, maximum: usize, found: usize) -> String {
        format!("Option '{option}' expects, at most, {maximum} arguments but {found} were provided.")
    }

    fn cannot_parse_argument(&self, value: &str, kind: &str, symbol: &str, type_name: &str) -> String {
        format!("Cannot parse argument '{value}' for {kind} '{symbol}' as expected type '{type_name}'.")
    }

    fn unrecognized_argument(&self, value: &str, allowed: &[String]) -> String {
        let listed = allowed
            .iter()
            .map(|v| format!("\n\t'{v}'"))
            .collect::<String>();
        format!("Argument '{value}' not recognized. Must be one of:{listed}")
    }

    fn response_file_not_found(&self, path: &str) -> String {
        format!("Response file not found '{path}'.")
    }

    fn response_file_unreadable(&self, path: &str, error: &str) -> String {
        format!("Error reading response file '{path}': {error}")
    }

    fn response_file_too_deep(&self, path: &str, depth: usize) -> String {
        format!("Response file nesting exceeds the maximum depth of {depth} at '{path}'.")
    }
}

/// The built-in English catalogue.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMessages;

impl Messages for DefaultMessages {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecognized_argument_lists_allowed_values() {
        let msg = DefaultMessages.unrecognized_argument("purple", &["red".into(), "green".into()]);
        assert_eq!(
            msg,
            "Argument 'purple' not recognized. Must be one of:\n\t'red'\n\t'green'"
        );
    }

    #[test]
    fn test_override_single_message() {
        struct Terse;
        impl Messages for Terse {
            fn unrecognized_command_or_argument(&self, token: &str) -> String {
                format!("?? {token}")
            }
        }
        assert_eq!(Terse.unrecognized_command_or_argument("x"), "?? x");
        assert_eq!(
            Terse.required_option_missing("--name"),
            "Option '--name' is required."
        );
    }
}
