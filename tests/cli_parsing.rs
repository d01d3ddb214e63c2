use clap::Parser;
use std::path::PathBuf;

use thicket::cli::commands::solve::ReportFormatArg;
use thicket::cli::{Cli, Commands};
use thicket::StrategyKind;

#[test]
fn test_parse_solve_with_defaults() {
    let cli =
        Cli::try_parse_from(["thicket", "solve", "How many handshakes among 5 people?"]).unwrap();

    assert!(!cli.json);
    assert!(cli.config.is_none());
    match cli.command {
        Commands::Solve(args) => {
            assert_eq!(args.problem, "How many handshakes among 5 people?");
            assert!(args.strategy.is_none());
            assert!(args.amplitude.is_none());
            assert!(args.branching_factor.is_none());
            assert!(args.beam_width.is_none());
            assert!(!args.no_report);
            assert!(args.report_format.is_none());
        }
        other => panic!("Wrong command: {other:?}"),
    }
}

#[test]
fn test_parse_solve_with_every_option() {
    let cli = Cli::try_parse_from([
        "thicket",
        "solve",
        "p",
        "--strategy",
        "depth-first-beam",
        "--branching-factor",
        "4",
        "--beam-width",
        "2",
        "--amplitude",
        "6",
        "--model",
        "qwen2.5-7b",
        "--no-report",
        "--report-format",
        "yaml",
    ])
    .unwrap();

    match cli.command {
        Commands::Solve(args) => {
            assert_eq!(args.strategy, Some(StrategyKind::DepthFirstBeam));
            assert_eq!(args.branching_factor, Some(4));
            assert_eq!(args.beam_width, Some(2));
            assert_eq!(args.amplitude, Some(6));
            assert_eq!(args.model.as_deref(), Some("qwen2.5-7b"));
            assert!(args.no_report);
            assert_eq!(args.report_format, Some(ReportFormatArg::Yaml));
        }
        other => panic!("Wrong command: {other:?}"),
    }
}

#[test]
fn test_parse_strategy_short_names() {
    for (name, expected) in [
        ("bfs", StrategyKind::BreadthFirst),
        ("breadth-first", StrategyKind::BreadthFirst),
        ("beam", StrategyKind::DepthFirstBeam),
        ("DFS", StrategyKind::DepthFirstBeam),
    ] {
        let cli = Cli::try_parse_from(["thicket", "solve", "p", "-s", name]).unwrap();
        match cli.command {
            Commands::Solve(args) => assert_eq!(args.strategy, Some(expected), "{name}"),
            other => panic!("Wrong command: {other:?}"),
        }
    }
}

#[test]
fn test_parse_rejects_unknown_strategy() {
    assert!(Cli::try_parse_from(["thicket", "solve", "p", "--strategy", "greedy"]).is_err());
}

#[test]
fn test_parse_rejects_non_numeric_parameters() {
    assert!(Cli::try_parse_from(["thicket", "solve", "p", "--beam-width", "two"]).is_err());
    assert!(Cli::try_parse_from(["thicket", "solve", "p", "--amplitude", "-1"]).is_err());
}

#[test]
fn test_parse_solve_requires_problem() {
    assert!(Cli::try_parse_from(["thicket", "solve"]).is_err());
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "thicket",
        "check",
        "--json",
        "--config",
        "custom.yaml",
        "-v",
    ])
    .unwrap();

    assert!(cli.json);
    assert!(cli.verbose);
    assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));
    assert!(matches!(cli.command, Commands::Check));
}

#[test]
fn test_parse_init_force() {
    let cli = Cli::try_parse_from(["thicket", "init", "--force"]).unwrap();
    match cli.command {
        Commands::Init(args) => {
            assert!(args.force);
            assert_eq!(args.path, PathBuf::from("."));
        }
        other => panic!("Wrong command: {other:?}"),
    }
}

#[test]
fn test_parse_config_command() {
    let cli = Cli::try_parse_from(["thicket", "config"]).unwrap();
    assert!(matches!(cli.command, Commands::Config));
}
