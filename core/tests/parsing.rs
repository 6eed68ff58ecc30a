use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use command_grammar_core::*;

fn messages(result: &ParseResult<'_>) -> Vec<String> {
    result.errors().iter().map(|e| e.message.clone()).collect()
}

fn unmatched(result: &ParseResult<'_>) -> Vec<String> {
    result
        .unmatched_tokens()
        .iter()
        .map(|t| t.value.clone())
        .collect()
}

#[test]
fn test_tokens_keep_input_order() {
    let mut tree = SymbolTree::new("app").unwrap();
    let root = tree.root();
    tree.add_option(root, OptionSpec::flag(["-a"])).unwrap();
    tree.add_option(root, OptionSpec::flag(["-b"])).unwrap();
    tree.add_option(root, OptionSpec::value(["--name"], ValueType::String))
        .unwrap();
    tree.add_argument(
        root,
        ArgumentSpec::new("files", ValueType::Path).arity(Arity::ZERO_OR_MORE),
    )
    .unwrap();

    let result = tree.parse("app -ab --name=x file1 -- -z");
    let values: Vec<&str> = result.tokens().iter().map(|t| t.value.as_str()).collect();
    assert_eq!(values, vec!["app", "-a", "-b", "--name", "x", "file1", "--", "-z"]);

    let positions: Vec<usize> = result.tokens().iter().map(|t| t.position).collect();
    assert!(positions.windows(2).all(|w| w[0] <= w[1]));
    assert!(result.errors().is_empty());
}

#[test]
fn test_argument_arity_is_enforced() {
    let mut tree = SymbolTree::new("app").unwrap();
    let root = tree.root();
    let one = tree
        .add_argument(root, ArgumentSpec::new("one", ValueType::String))
        .unwrap();

    let result = tree.parse("a b");
    assert_eq!(result.find_result_for(one).unwrap().tokens().len(), 1);
    assert_eq!(unmatched(&result), vec!["b"]);
    assert_eq!(messages(&result), vec!["Unrecognized command or argument 'b'."]);

    let result = tree.parse("");
    assert_eq!(
        messages(&result),
        vec!["Required argument missing for command: 'app'."]
    );
    assert_eq!(
        result.value::<String>(one),
        Err(ValueError::RequiredMissing("one".into()))
    );
}

#[test]
fn test_bundled_flags_match_separate_flags() {
    let mut tree = SymbolTree::new("app").unwrap();
    let root = tree.root();
    let flags: Vec<SymbolId> = ["-x", "-y", "-z"]
        .into_iter()
        .map(|alias| tree.add_option(root, OptionSpec::flag([alias])).unwrap())
        .collect();

    let bundled = tree.parse("-xyz");
    let separate = tree.parse("-x -y -z");
    for &flag in &flags {
        assert_eq!(bundled.value::<bool>(flag).unwrap(), Some(true));
        assert_eq!(separate.value::<bool>(flag).unwrap(), Some(true));
    }
    assert_eq!(bundled.root().children().len(), separate.root().children().len());
    assert!(bundled.errors().is_empty());

    let invalid = tree.parse("-xqz");
    assert_eq!(unmatched(&invalid), vec!["-xqz"]);
    assert!(invalid.find_result_for(flags[0]).is_none());
}

#[test]
fn test_mixed_token_run_splits_between_arguments() {
    let mut tree = SymbolTree::new("app").unwrap();
    let root = tree.root();
    let ints = tree
        .add_argument(
            root,
            ArgumentSpec::new("ints", ValueType::Integer).arity(Arity::ZERO_OR_MORE),
        )
        .unwrap();
    let strings = tree
        .add_argument(
            root,
            ArgumentSpec::new("strings", ValueType::String).arity(Arity::ZERO_OR_MORE),
        )
        .unwrap();

    let result = tree.parse("1 2 3 one two");
    assert!(result.errors().is_empty(), "{:?}", result.errors());
    assert_eq!(result.value::<Vec<i64>>(ints).unwrap(), Some(vec![1, 2, 3]));
    assert_eq!(
        result.value::<Vec<String>>(strings).unwrap(),
        Some(vec!["one".to_string(), "two".to_string()])
    );
}

#[test]
fn test_conversion_error_without_following_argument() {
    let mut tree = SymbolTree::new("app").unwrap();
    let root = tree.root();
    let ints = tree
        .add_argument(
            root,
            ArgumentSpec::new("ints", ValueType::Integer).arity(Arity::ONE_OR_MORE),
        )
        .unwrap();

    let result = tree.parse("1 x");
    assert_eq!(
        messages(&result),
        vec!["Cannot parse argument 'x' for argument 'ints' as expected type 'integer'."]
    );
    assert!(matches!(
        result.value::<Vec<i64>>(ints),
        Err(ValueError::Invalid { .. })
    ));
}

#[test]
fn test_default_factory_runs_once_per_parse() {
    let counter = Arc::new(AtomicI64::new(0));
    let mut tree = SymbolTree::new("app").unwrap();
    let root = tree.root();
    let factory_counter = Arc::clone(&counter);
    let count = tree
        .add_option(
            root,
            OptionSpec::value(["--count"], ValueType::Integer).with_argument(|a| {
                a.default_value(move |_| Value::Int(factory_counter.fetch_add(1, Ordering::SeqCst) + 1))
            }),
        )
        .unwrap();

    let first = tree.parse("");
    assert_eq!(first.value::<i64>(count).unwrap(), Some(1));
    assert_eq!(first.value::<i64>(count).unwrap(), Some(1));
    assert!(first.is_implicit(count));

    let second = tree.parse("");
    assert_eq!(second.value::<i64>(count).unwrap(), Some(2));
    assert_eq!(counter.load(Ordering::SeqCst), 2);

    let explicit = tree.parse("--count 10");
    assert_eq!(explicit.value::<i64>(count).unwrap(), Some(10));
    assert!(!explicit.is_implicit(count));
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[test]
fn test_response_files_expand_recursively() {
    let dir = tempfile::tempdir().unwrap();
    let inner = dir.path().join("inner.rsp");
    let outer = dir.path().join("outer.rsp");
    std::fs::write(&inner, "# values\nx y\n").unwrap();
    std::fs::write(&outer, format!("--name\n@{}\n", inner.display())).unwrap();

    let mut tree = SymbolTree::new("app").unwrap();
    let root = tree.root();
    let name = tree
        .add_option(root, OptionSpec::value(["--name"], ValueType::String))
        .unwrap();
    let rest = tree
        .add_argument(
            root,
            ArgumentSpec::new("rest", ValueType::String).arity(Arity::ZERO_OR_MORE),
        )
        .unwrap();

    let result = tree.parse_args([format!("@{}", outer.display())]);
    assert!(result.errors().is_empty(), "{:?}", result.errors());
    assert_eq!(result.value::<String>(name).unwrap(), Some("x".into()));
    assert_eq!(result.value::<Vec<String>>(rest).unwrap(), Some(vec!["y".into()]));
}

#[test]
fn test_only_take_zero_hands_all_tokens_on() {
    let mut tree = SymbolTree::new("app").unwrap();
    let root = tree.root();
    let first = tree
        .add_argument(
            root,
            ArgumentSpec::new("first", ValueType::String)
                .arity(Arity::ZERO_OR_MORE)
                .parser(|ctx| {
                    ctx.only_take(0);
                    Some(Value::List(Vec::new()))
                }),
        )
        .unwrap();
    let second = tree
        .add_argument(
            root,
            ArgumentSpec::new("second", ValueType::String).arity(Arity::ZERO_OR_MORE),
        )
        .unwrap();

    let result = tree.parse("a b c");
    assert!(result.errors().is_empty(), "{:?}", result.errors());
    assert!(result.find_result_for(first).unwrap().tokens().is_empty());
    assert_eq!(
        result.value::<Vec<String>>(second).unwrap(),
        Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
    );
}

#[test]
#[should_panic(expected = "only_take was already called")]
fn test_only_take_twice_panics() {
    let mut tree = SymbolTree::new("app").unwrap();
    let root = tree.root();
    tree.add_argument(
        root,
        ArgumentSpec::new("first", ValueType::String)
            .arity(Arity::ZERO_OR_MORE)
            .parser(|ctx| {
                ctx.only_take(1);
                ctx.only_take(0);
                None
            }),
    )
    .unwrap();
    tree.parse("a b");
}

#[test]
fn test_directives_must_come_first() {
    let mut tree = SymbolTree::new("app").unwrap();
    let root = tree.root();
    tree.add_option(root, OptionSpec::flag(["-y"])).unwrap();

    let late = tree.parse("-y [parse]");
    assert!(late.directive("parse").is_none());
    assert_eq!(unmatched(&late), vec!["[parse]"]);

    let early = tree.parse("[parse] [env:A=1] [env:B=2] -y");
    assert_eq!(early.directive("parse"), Some(&[][..]));
    assert_eq!(
        early.directive("env"),
        Some(&["A=1".to_string(), "B=2".to_string()][..])
    );
    assert!(early.errors().is_empty());
}

#[test]
fn test_required_option_only_checked_for_innermost_command() {
    let mut tree = SymbolTree::new("app").unwrap();
    let root = tree.root();
    tree.add_option(
        root,
        OptionSpec::value(["--token"], ValueType::String).required(),
    )
    .unwrap();
    tree.add_command(root, CommandSpec::new("sub")).unwrap();

    assert!(tree.parse("sub").errors().is_empty());
    assert_eq!(
        messages(&tree.parse("")),
        vec!["Option '--token' is required."]
    );
}

#[test]
fn test_required_recursive_option_applies_to_subcommands() {
    let mut tree = SymbolTree::new("app").unwrap();
    let root = tree.root();
    tree.add_option(
        root,
        OptionSpec::value(["--token"], ValueType::String)
            .required()
            .recursive(),
    )
    .unwrap();
    tree.add_command(root, CommandSpec::new("sub")).unwrap();

    assert_eq!(
        messages(&tree.parse("sub")),
        vec!["Option '--token' is required."]
    );
    assert!(tree.parse("sub --token t").errors().is_empty());
}

#[test]
fn test_shared_option_is_satisfied_once() {
    let mut tree = SymbolTree::new("app").unwrap();
    let root = tree.root();
    let shared = tree
        .add_option(
            root,
            OptionSpec::value(["--shared"], ValueType::String).required(),
        )
        .unwrap();
    let sub = tree.add_command(root, CommandSpec::new("sub")).unwrap();
    tree.attach(sub, shared).unwrap();

    let result = tree.parse("--shared x sub");
    assert!(result.errors().is_empty(), "{:?}", result.errors());
    assert_eq!(result.value::<String>(shared).unwrap(), Some("x".into()));

    let result = tree.parse("sub --shared y");
    assert!(result.errors().is_empty(), "{:?}", result.errors());
    assert_eq!(result.value::<String>(shared).unwrap(), Some("y".into()));
}

#[test]
fn test_repeated_validator_messages_collapse() {
    let mut tree = SymbolTree::new("app").unwrap();
    let root = tree.root();
    tree.add_argument(
        root,
        ArgumentSpec::new("word", ValueType::String)
            .validator(|ctx| ctx.add_error("too short"))
            .validator(|ctx| ctx.add_error("too short")),
    )
    .unwrap();

    assert_eq!(messages(&tree.parse("a")), vec!["too short"]);
}

#[test]
fn test_custom_parser_error_surfaces_on_retrieval() {
    let mut tree = SymbolTree::new("app").unwrap();
    let root = tree.root();
    let port = tree
        .add_option(
            root,
            OptionSpec::value(["--port"], ValueType::Integer).with_argument(|a| {
                a.parser(|ctx| {
                    let text = ctx.tokens().first().map(|t| t.value.clone()).unwrap_or_default();
                    match text.parse::<u16>() {
                        Ok(port) => Some(Value::Int(i64::from(port))),
                        Err(_) => {
                            ctx.add_error(format!("'{text}' is not a port"));
                            ctx.add_error("second message");
                            None
                        }
                    }
                })
            }),
        )
        .unwrap();

    let result = tree.parse("--port 99999");
    assert_eq!(messages(&result)[0], "'99999' is not a port");
    assert_eq!(
        result.value::<i64>(port),
        Err(ValueError::Invalid {
            symbol: "--port".into(),
            message: "'99999' is not a port".into(),
        })
    );

    assert_eq!(tree.parse("--port 8080").value::<u16>(port).unwrap(), Some(8080));
}

#[test]
fn test_parser_can_read_sibling_values() {
    let mut tree = SymbolTree::new("app").unwrap();
    let root = tree.root();
    tree.add_option(
        root,
        OptionSpec::value(["--base"], ValueType::Integer)
            .with_argument(|a| a.default_value(|_| Value::Int(10))),
    )
    .unwrap();
    let offset = tree
        .add_argument(
            root,
            ArgumentSpec::new("offset", ValueType::Integer).parser(|ctx| {
                let base: i64 = ctx.value_by_name("--base")?;
                let offset: i64 = ctx.tokens().first()?.value.parse().ok()?;
                Some(Value::Int(base + offset))
            }),
        )
        .unwrap();

    let result = tree.parse("--base 100 5");
    assert_eq!(result.value::<i64>(offset).unwrap(), Some(105));
}

#[test]
fn test_surplus_option_values_are_reported() {
    let mut tree = SymbolTree::new("app").unwrap();
    let root = tree.root();
    let name = tree
        .add_option(root, OptionSpec::value(["--name"], ValueType::String))
        .unwrap();

    let result = tree.parse("--name a --name b");
    assert_eq!(
        messages(&result),
        vec!["Option '--name' expects a single argument but 2 were provided."]
    );
    assert_eq!(result.find_result_for(name).unwrap().identifier_count(), 2);

    let result = tree.parse("--name");
    assert_eq!(
        messages(&result),
        vec!["Required argument missing for option: '--name'."]
    );
}

#[test]
fn test_option_values_beyond_maximum_fall_through() {
    let mut tree = SymbolTree::new("app").unwrap();
    let root = tree.root();
    let pair = tree
        .add_option(
            root,
            OptionSpec::value(["--pair"], ValueType::String)
                .with_argument(|a| a.arity(Arity::new(2, 2).unwrap())),
        )
        .unwrap();
    let rest = tree
        .add_argument(root, ArgumentSpec::new("rest", ValueType::String))
        .unwrap();

    let result = tree.parse("--pair a b c");
    assert!(result.errors().is_empty(), "{:?}", result.errors());
    assert_eq!(
        result.value::<Vec<String>>(pair).unwrap(),
        Some(vec!["a".to_string(), "b".to_string()])
    );
    assert_eq!(result.value::<String>(rest).unwrap(), Some("c".into()));
}

#[test]
fn test_allowed_values_are_listed_in_error() {
    let mut tree = SymbolTree::new("app").unwrap();
    let root = tree.root();
    tree.add_option(
        root,
        OptionSpec::value(["--color"], ValueType::String)
            .with_argument(|a| a.from_among(["red", "green"])),
    )
    .unwrap();

    assert_eq!(
        messages(&tree.parse("--color purple")),
        vec!["Argument 'purple' not recognized. Must be one of:\n\t'red'\n\t'green'"]
    );
    assert!(tree.parse("--color red").errors().is_empty());
}

#[test]
fn test_sibling_command_is_not_accepted_after_descent() {
    let mut tree = SymbolTree::new("app").unwrap();
    let root = tree.root();
    let a = tree.add_command(root, CommandSpec::new("a")).unwrap();
    tree.add_command(root, CommandSpec::new("b")).unwrap();

    let result = tree.parse("a b");
    assert_eq!(result.command_path(), vec![root, a]);
    assert_eq!(unmatched(&result), vec!["b"]);
}

#[test]
fn test_double_dash_keeps_option_spellings_as_values() {
    let mut tree = SymbolTree::new("app").unwrap();
    let root = tree.root();
    let name = tree
        .add_option(root, OptionSpec::value(["--name"], ValueType::String))
        .unwrap();
    let rest = tree
        .add_argument(
            root,
            ArgumentSpec::new("rest", ValueType::String).arity(Arity::ZERO_OR_MORE),
        )
        .unwrap();

    let result = tree.parse("-- --name");
    assert!(result.errors().is_empty());
    assert_eq!(result.value::<String>(name).unwrap(), None);
    assert_eq!(
        result.value::<Vec<String>>(rest).unwrap(),
        Some(vec!["--name".to_string()])
    );

    let config = ParserConfiguration::new(ParserSettings {
        legacy_double_dash: true,
        ..Default::default()
    });
    let legacy = Parser::new(&tree, &config).parse("-- --name");
    assert_eq!(legacy.unparsed_tokens()[0].value, "--name");
    assert_eq!(legacy.value::<Vec<String>>(rest).unwrap(), None);
}

#[test]
fn test_positional_options() {
    let mut tree = SymbolTree::new("app").unwrap();
    let root = tree.root();
    let first = tree
        .add_option(root, OptionSpec::value(["--first"], ValueType::String))
        .unwrap();
    let second = tree
        .add_option(root, OptionSpec::value(["--second"], ValueType::String))
        .unwrap();
    let config = ParserConfiguration::new(ParserSettings {
        enable_positional_options: true,
        ..Default::default()
    });
    let parser = Parser::new(&tree, &config);

    let result = parser.parse("x y");
    assert!(result.errors().is_empty(), "{:?}", result.errors());
    assert_eq!(result.value::<String>(first).unwrap(), Some("x".into()));
    assert_eq!(result.value::<String>(second).unwrap(), Some("y".into()));

    let result = parser.parse("y --first x");
    assert!(result.errors().is_empty(), "{:?}", result.errors());
    assert_eq!(result.value::<String>(first).unwrap(), Some("x".into()));
    assert_eq!(result.value::<String>(second).unwrap(), Some("y".into()));

    assert_eq!(unmatched(&tree.parse("x y")), vec!["x", "y"]);
}

#[test]
fn test_boolean_flag_takes_explicit_value() {
    let mut tree = SymbolTree::new("app").unwrap();
    let root = tree.root();
    let verbose = tree
        .add_option(root, OptionSpec::flag(["--verbose"]))
        .unwrap();

    assert_eq!(tree.parse("--verbose false").value::<bool>(verbose).unwrap(), Some(false));
    assert_eq!(tree.parse("--verbose").value::<bool>(verbose).unwrap(), Some(true));
    assert_eq!(tree.parse("").value::<bool>(verbose).unwrap(), None);
}

#[test]
fn test_subcommand_required() {
    let mut tree =
        SymbolTree::with_root(CommandSpec::new("app").subcommand_required()).unwrap();
    let root = tree.root();
    tree.add_command(root, CommandSpec::new("run")).unwrap();

    assert_eq!(
        messages(&tree.parse("")),
        vec!["Required command was not provided."]
    );
    assert!(tree.parse("run").errors().is_empty());
}

#[test]
fn test_command_validator_sees_option_values() {
    let mut tree = SymbolTree::new("app").unwrap();
    let root = tree.root();
    let min = tree
        .add_option(root, OptionSpec::value(["--min"], ValueType::Integer))
        .unwrap();
    let max = tree
        .add_option(root, OptionSpec::value(["--max"], ValueType::Integer))
        .unwrap();
    tree.add_command(
        root,
        CommandSpec::new("check").validator(move |ctx| {
            let low: Option<i64> = ctx.value(min);
            let high: Option<i64> = ctx.value(max);
            if let (Some(low), Some(high)) = (low, high) {
                if low > high {
                    ctx.add_error("--min must not exceed --max");
                }
            }
        }),
    )
    .unwrap();

    assert_eq!(
        messages(&tree.parse("--min 5 --max 1 check")),
        vec!["--min must not exceed --max"]
    );
    assert!(tree.parse("--min 1 --max 5 check").errors().is_empty());
}

#[test]
fn test_value_retrieval_errors() {
    let mut tree = SymbolTree::new("app").unwrap();
    let root = tree.root();
    let name = tree
        .add_option(root, OptionSpec::value(["-n", "--name"], ValueType::String))
        .unwrap();

    let result = tree.parse("-n joe");
    assert_eq!(result.value_by_name::<String>("name").unwrap(), Some("joe".into()));
    assert_eq!(result.value_by_name::<String>("-n").unwrap(), Some("joe".into()));
    assert!(matches!(
        result.value::<i64>(name),
        Err(ValueError::TypeMismatch { .. })
    ));
    assert_eq!(
        result.value_by_name::<String>("missing"),
        Err(ValueError::UnknownName("missing".into()))
    );
    assert_eq!(
        result.value::<String>(root),
        Err(ValueError::NotAValue("app".into()))
    );

    let empty = tree.parse("");
    assert_eq!(empty.value::<String>(name).unwrap(), None);
    assert_eq!(
        empty.required_value::<String>(name),
        Err(ValueError::RequiredMissing("--name".into()))
    );
}

#[test]
fn test_unmatched_tokens_need_not_be_errors() {
    let tree = SymbolTree::new("app").unwrap();
    let config = ParserConfiguration::new(ParserSettings {
        treat_unmatched_tokens_as_errors: false,
        ..Default::default()
    });
    let result = Parser::new(&tree, &config).parse("stray");
    assert!(result.errors().is_empty());
    assert_eq!(unmatched(&result), vec!["stray"]);
}

#[test]
fn test_custom_messages() {
    struct Terse;
    impl Messages for Terse {
        fn unrecognized_command_or_argument(&self, token: &str) -> String {
            format!("what is {token}?")
        }
    }

    let tree = SymbolTree::new("app").unwrap();
    let config = ParserConfiguration::default().with_messages(Terse);
    let result = Parser::new(&tree, &config).parse("huh");
    assert_eq!(messages(&result), vec!["what is huh?"]);
}

#[test]
fn test_missing_response_file_is_a_parse_error() {
    let tree = SymbolTree::new("app").unwrap();
    let result = tree.parse("@/definitely/missing.rsp");
    assert_eq!(
        messages(&result),
        vec!["Response file not found '/definitely/missing.rsp'."]
    );
    assert!(result.errors()[0].result.is_none());
}

#[test]
fn test_parses_concurrently_from_threads() {
    let mut tree = SymbolTree::new("app").unwrap();
    let root = tree.root();
    let count = tree
        .add_argument(root, ArgumentSpec::new("count", ValueType::Integer))
        .unwrap();

    std::thread::scope(|scope| {
        for i in 0..4_i64 {
            let tree = &tree;
            scope.spawn(move || {
                let result = tree.parse(&i.to_string());
                assert_eq!(result.value::<i64>(count).unwrap(), Some(i));
            });
        }
    });
}

#[test]
fn test_default_factory_wins_over_parser_without_tokens() {
    let mut tree = SymbolTree::new("app").unwrap();
    let root = tree.root();
    let level = tree
        .add_option(
            root,
            OptionSpec::value(["--level"], ValueType::Integer).with_argument(|a| {
                a.default_value(|_| Value::Int(5)).parser(|ctx| {
                    let text = &ctx.tokens().first()?.value;
                    text.parse::<i64>().ok().map(|n| Value::Int(n * 10))
                })
            }),
        )
        .unwrap();

    let implicit = tree.parse("");
    assert!(implicit.errors().is_empty(), "{:?}", implicit.errors());
    assert!(implicit.is_implicit(level));
    assert_eq!(implicit.value::<i64>(level).unwrap(), Some(5));

    let explicit = tree.parse("--level 7");
    assert!(!explicit.is_implicit(level));
    assert_eq!(explicit.value::<i64>(level).unwrap(), Some(70));
}

#[test]
fn test_enum_mismatch_lists_allowed_values() {
    let mut tree = SymbolTree::new("app").unwrap();
    let root = tree.root();
    let env = tree
        .add_option(
            root,
            OptionSpec::value(
                ["--env"],
                ValueType::Enum(vec!["staging".into(), "production".into()]),
            ),
        )
        .unwrap();

    let result = tree.parse("--env dev");
    assert_eq!(
        messages(&result),
        vec!["Argument 'dev' not recognized. Must be one of:\n\t'staging'\n\t'production'"]
    );
    assert!(result.value::<String>(env).is_err());

    let ok = tree.parse("--env PRODUCTION");
    assert_eq!(ok.value::<String>(env).unwrap().as_deref(), Some("production"));
}

#[test]
fn test_command_spelling_after_value_option_is_a_value() {
    let mut tree = SymbolTree::new("app").unwrap();
    let root = tree.root();
    let name = tree
        .add_option(root, OptionSpec::value(["--name"], ValueType::String))
        .unwrap();
    let run = tree.add_command(root, CommandSpec::new("run")).unwrap();

    let as_value = tree.parse("--name run");
    assert!(as_value.errors().is_empty(), "{:?}", as_value.errors());
    assert_eq!(as_value.value::<String>(name).unwrap().as_deref(), Some("run"));
    assert_eq!(as_value.command_path(), vec![root]);

    let both = tree.parse("--name run run");
    assert_eq!(both.value::<String>(name).unwrap().as_deref(), Some("run"));
    assert_eq!(both.command_path(), vec![root, run]);
}

#[test]
fn test_released_tokens_keep_input_order_among_unmatched() {
    let mut tree = SymbolTree::new("app").unwrap();
    let root = tree.root();
    tree.add_argument(
        root,
        ArgumentSpec::new("first", ValueType::String)
            .arity(Arity::ZERO_OR_MORE)
            .parser(|ctx| {
                ctx.only_take(1);
                Some(Value::List(Vec::new()))
            }),
    )
    .unwrap();
    tree.add_command(root, CommandSpec::new("run")).unwrap();

    let result = tree.parse("a b run zzz");
    assert_eq!(unmatched(&result), vec!["b", "zzz"]);
}
