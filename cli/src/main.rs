use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use command_grammar_core::{
    CommandDefinition, CompletionItem, ParseReport, ParserConfiguration, ParserSettings,
    SymbolTree, validate_tree,
};

/// Output format for reports and completions.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
    Text,
}

#[derive(Debug, Parser)]
#[command(name = "grammar")]
#[command(about = "Check command-line grammars and run input against them")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate one or more grammar files.
    Validate(ValidateArgs),
    /// Parse a command line against a grammar and print the result.
    Parse(ParseArgs),
    /// List completions for a partially typed command line.
    Complete(CompleteArgs),
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Grammar files (.json, .yaml or .yml).
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Grammar file (.json, .yaml or .yml).
    grammar: PathBuf,
    /// Parser settings file.
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Command line to parse as one string.
    #[arg(long, conflicts_with = "args")]
    line: Option<String>,
    /// Output format.
    #[arg(long, default_value = "text")]
    format: CliOutputFormat,
    /// Arguments to parse, given after `--`.
    #[arg(last = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct CompleteArgs {
    /// Grammar file (.json, .yaml or .yml).
    grammar: PathBuf,
    /// Parser settings file.
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Partially typed command line.
    #[arg(long)]
    line: String,
    /// Cursor byte offset; defaults to the end of the line.
    #[arg(long)]
    position: Option<usize>,
    /// Output format.
    #[arg(long, default_value = "text")]
    format: CliOutputFormat,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Validate(args) => run_validate(args),
        Command::Parse(args) => run_parse(args),
        Command::Complete(args) => run_complete(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let mut failures = 0;
    for path in &args.inputs {
        let tree = match load_tree(path) {
            Ok(tree) => tree,
            Err(err) => {
                eprintln!("{err}");
                failures += 1;
                continue;
            }
        };
        let problems = validate_tree(&tree);
        if problems.is_empty() {
            println!(
                "'{}': grammar '{}' is valid ({} symbols).",
                path.display(),
                tree.symbol(tree.root()).name(),
                tree.len()
            );
        } else {
            for problem in &problems {
                eprintln!("'{}': {problem}", path.display());
            }
            failures += 1;
        }
    }

    if failures > 0 {
        return Err(format!("{failures} of {} grammar file(s) invalid", args.inputs.len()));
    }
    Ok(())
}

fn run_parse(args: ParseArgs) -> Result<(), String> {
    let tree = load_tree(&args.grammar)?;
    let config = load_config(args.settings.as_deref())?;
    let parser = command_grammar_core::Parser::new(&tree, &config);
    let result = match &args.line {
        Some(line) => parser.parse(line),
        None => parser.parse_args(&args.args),
    };

    let report = result.report();
    print!("{}", format_report(&report, args.format)?);
    if !report.is_success() {
        return Err(format!("{} parse error(s)", report.errors.len()));
    }
    Ok(())
}

fn run_complete(args: CompleteArgs) -> Result<(), String> {
    let tree = load_tree(&args.grammar)?;
    let config = load_config(args.settings.as_deref())?;
    let result = command_grammar_core::Parser::new(&tree, &config).parse(&args.line);
    let items = result.completions(args.position);
    print!("{}", format_completions(&items, args.format)?);
    Ok(())
}

fn load_tree(path: &Path) -> Result<SymbolTree, String> {
    let definition = CommandDefinition::load(path)
        .map_err(|err| format!("Failed to load grammar '{}': {err}", path.display()))?;
    definition
        .build()
        .map_err(|err| format!("Invalid grammar '{}': {err}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<ParserConfiguration, String> {
    let settings = match path {
        Some(path) => ParserSettings::load(path)
            .map_err(|err| format!("Failed to load settings '{}': {err}", path.display()))?,
        None => ParserSettings::default(),
    };
    Ok(ParserConfiguration::new(settings))
}

fn format_report(report: &ParseReport, format: CliOutputFormat) -> Result<String, String> {
    match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(report)
            .map(|raw| format!("{raw}\n"))
            .map_err(|err| format!("Failed to serialize report: {err}")),
        CliOutputFormat::Yaml => serde_yaml::to_string(report)
            .map_err(|err| format!("Failed to serialize report: {err}")),
        CliOutputFormat::Text => Ok(report.to_string()),
    }
}

fn format_completions(items: &[CompletionItem], format: CliOutputFormat) -> Result<String, String> {
    match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(items)
            .map(|raw| format!("{raw}\n"))
            .map_err(|err| format!("Failed to serialize completions: {err}")),
        CliOutputFormat::Yaml => serde_yaml::to_string(items)
            .map_err(|err| format!("Failed to serialize completions: {err}")),
        CliOutputFormat::Text => Ok(items
            .iter()
            .map(|item| match &item.detail {
                Some(detail) => format!("{}\t{detail}\n", item.label),
                None => format!("{}\n", item.label),
            })
            .collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::{CliOutputFormat, format_completions};
    use command_grammar_core::CompletionItem;

    #[test]
    fn test_text_completions_one_per_line() {
        let items = vec![
            CompletionItem::keyword("push").with_detail("Push services"),
            CompletionItem::keyword("--verbose"),
        ];
        let text = format_completions(&items, CliOutputFormat::Text).unwrap();
        assert_eq!(text, "push\tPush services\n--verbose\n");
    }

    #[test]
    fn test_json_completions_skip_empty_fields() {
        let items = vec![CompletionItem::new("staging")];
        let json = format_completions(&items, CliOutputFormat::Json).unwrap();
        assert!(json.contains("\"label\": \"staging\""));
        assert!(!json.contains("insert_text"));
    }
}
