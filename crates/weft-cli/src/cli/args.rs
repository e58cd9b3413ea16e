//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` so the same definition can be composed
//! into several commands.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Grammar file or directory (positional).
pub fn grammar_path_arg() -> Arg {
    Arg::new("grammar_path")
        .value_name("GRAMMAR")
        .value_parser(value_parser!(PathBuf))
        .help("Grammar file or directory (use \"-\" for stdin)")
}

/// Inline grammar text (-g/--grammar-text).
pub fn grammar_text_arg() -> Arg {
    Arg::new("grammar_text")
        .short('g')
        .long("grammar-text")
        .value_name("TEXT")
        .conflicts_with("grammar_path")
        .help("Inline grammar text")
}

/// Transform-override files (-t/--transform), repeatable.
pub fn transform_arg() -> Arg {
    Arg::new("transform")
        .short('t')
        .long("transform")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .action(ArgAction::Append)
        .help("Transform-override file (repeatable)")
}

/// Grammar to show (--grammar).
pub fn goal_arg() -> Arg {
    Arg::new("goal")
        .long("grammar")
        .value_name("NAME")
        .help("Grammar to show (default: the last one declared)")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize diagnostics")
}

/// Treat warnings as errors (--strict).
pub fn strict_arg() -> Arg {
    Arg::new("strict")
        .long("strict")
        .action(ArgAction::SetTrue)
        .help("Treat warnings as errors")
}

/// Output format (--format).
pub fn format_arg() -> Arg {
    Arg::new("format")
        .long("format")
        .value_name("FORMAT")
        .default_value("text")
        .value_parser(["text", "json"])
        .help("Output format")
}

/// Write output to file (-o/--output).
pub fn output_file_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Write output to file")
}

/// Binary bundle encoding (--binary).
pub fn binary_arg() -> Arg {
    Arg::new("binary")
        .long("binary")
        .action(ArgAction::SetTrue)
        .help("Write a compact binary bundle instead of JSON")
}

/// Synthesize types named by overrides (--create-missing-types).
pub fn create_missing_types_arg() -> Arg {
    Arg::new("create_missing_types")
        .long("create-missing-types")
        .action(ArgAction::SetTrue)
        .help("Create data types that transform overrides construct but no grammar derives")
}

/// Parser fuel limit (--fuel).
pub fn fuel_arg() -> Arg {
    Arg::new("fuel")
        .long("fuel")
        .value_name("N")
        .default_value("1000000")
        .value_parser(value_parser!(u32))
        .help("Parser execution fuel limit")
}
