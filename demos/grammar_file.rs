//! Grammar file example: load a YAML grammar, parse input that uses a
//! response file and directives, and print the parse report as JSON.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p command-grammar-demos --example grammar_file
//! ```

use std::io::Write;

use command_grammar_core::{CommandDefinition, Parser, ParserConfiguration, ParserSettings};

const GRAMMAR: &str = r#"
name: deploy
description: Ship services to an environment
options:
  - aliases: [-v, --verbose]
    recursive: true
subcommands:
  - name: push
    options:
      - aliases: [-e, --env]
        type: enum
        values: [staging, production]
        default: staging
      - aliases: [--retries]
        type: integer
        default: 3
    arguments:
      - name: services
        arity: { min: 1 }
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let definition: CommandDefinition = serde_yaml::from_str(GRAMMAR)?;
    let tree = definition.build()?;

    let mut response_file = tempfile::NamedTempFile::new()?;
    writeln!(response_file, "# services to ship")?;
    writeln!(response_file, "web")?;
    writeln!(response_file, "worker --retries 5")?;

    let config = ParserConfiguration::new(ParserSettings {
        directives: vec!["dry-run".to_string()],
        ..Default::default()
    });
    let parser = Parser::new(&tree, &config);
    let args = vec![
        "[dry-run]".to_string(),
        "deploy".to_string(),
        "push".to_string(),
        "-e".to_string(),
        "production".to_string(),
        format!("@{}", response_file.path().display()),
    ];
    let result = parser.parse_args(args);

    println!("dry run: {}", result.directive("dry-run").is_some());
    println!("{}", serde_json::to_string_pretty(&result.report())?);
    Ok(())
}
