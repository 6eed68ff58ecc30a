//! Shell integration example: parse a git-like command line and offer
//! completions as the user types.
//!
//! Builds the grammar in code, with a custom parser for a `host:port`
//! argument, a command validator and a completion delegate that answers
//! from the current parse.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p command-grammar-demos --example shell_completion
//! ```

use command_grammar_core::{
    Arity, ArgumentSpec, CommandSpec, CompletionItem, OptionSpec, SymbolTree, Value, ValueType,
};

fn build_tree() -> Result<SymbolTree, Box<dyn std::error::Error>> {
    let mut tree = SymbolTree::new("vcs")?;
    let root = tree.root();
    let verbose = tree.add_option(
        root,
        OptionSpec::flag(["-v", "--verbose"])
            .description("Print more output")
            .recursive(),
    )?;

    let remote = tree.add_command(
        root,
        CommandSpec::new("remote").description("Manage remote servers"),
    )?;
    tree.add_argument(
        remote,
        ArgumentSpec::new("address", ValueType::String).parser(|ctx| {
            let text = ctx.tokens().first()?.value.clone();
            let Some((host, port)) = text.rsplit_once(':') else {
                ctx.add_error(format!("'{text}' is not host:port"));
                return None;
            };
            match port.parse::<u16>() {
                Ok(port) => Some(Value::List(vec![
                    Value::Str(host.to_string()),
                    Value::Int(i64::from(port)),
                ])),
                Err(_) => {
                    ctx.add_error(format!("port '{port}' out of range"));
                    None
                }
            }
        }),
    )?;

    let checkout = tree.add_command(
        root,
        CommandSpec::new("checkout")
            .alias("co")
            .description("Switch branches")
            .validator(move |ctx| {
                if ctx.value::<bool>(verbose) == Some(true) {
                    ctx.add_error("checkout is always quiet");
                }
            }),
    )?;
    tree.add_option(
        checkout,
        OptionSpec::value(["--depth"], ValueType::Integer)
            .with_argument(|a| a.default_value(|_| Value::Int(1))),
    )?;
    tree.add_argument(
        checkout,
        ArgumentSpec::new("branch", ValueType::String)
            .arity(Arity::ZERO_OR_ONE)
            .completion_delegate(|ctx| {
                let prefix = ctx.word_to_complete().to_string();
                ["main", "maintenance", "feature/login"]
                    .into_iter()
                    .map(|b| CompletionItem::new(b).with_detail(format!("branch matching '{prefix}'")))
                    .collect()
            }),
    )?;
    Ok(tree)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let tree = build_tree()?;

    println!("=== Parsing ===");
    for line in ["vcs co main --depth 5", "vcs remote example.org:70000", "vcs -v checkout"] {
        let result = tree.parse(line);
        println!("{line}");
        print!("{}", result.report());
        println!();
    }

    println!("=== Completing ===");
    for line in ["vcs ", "vcs co ma", "vcs checkout --de"] {
        let labels: Vec<String> = tree
            .parse(line)
            .completions(None)
            .into_iter()
            .map(|item| item.label)
            .collect();
        println!("{line:<20} -> {}", labels.join(", "));
    }

    Ok(())
}
