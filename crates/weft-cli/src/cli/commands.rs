//! Command builders for the CLI.
//!
//! Every command reads the same inputs: a grammar file, directory or inline
//! text plus optional transform-override files. Output flags are added per
//! command.

use clap::Command;

use super::args::*;

/// Add the grammar and override inputs shared by every command.
fn with_input_args(cmd: Command) -> Command {
    cmd.arg(grammar_path_arg())
        .arg(grammar_text_arg())
        .arg(transform_arg())
        .arg(create_missing_types_arg())
        .arg(fuel_arg().hide(true))
        .arg(color_arg())
}

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("weft")
        .about("Derive rule sets, type models and transforms from grammars")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(check_command())
        .subcommand(rules_command())
        .subcommand(types_command())
        .subcommand(transform_command())
        .subcommand(dump_command())
}

/// Validate grammars and transform overrides.
pub fn check_command() -> Command {
    let cmd = Command::new("check")
        .about("Validate grammars and transform overrides")
        .override_usage(
            "\
  weft check <GRAMMAR> [-t <FILE>]...
  weft check -g <TEXT>",
        )
        .after_help(
            r#"EXAMPLES:
  weft check expr.grammar                     # one grammar file
  weft check grammars/                        # every .grammar and .transform file
  weft check expr.grammar -t expr.transform   # with overrides
  weft check -g 'grammar G { S = "x" ; }'     # inline grammar"#,
        )
        .arg(strict_arg());

    with_input_args(cmd)
}

/// Print the rule set of one grammar.
pub fn rules_command() -> Command {
    let cmd = Command::new("rules")
        .about("Print the resolved rule set of a grammar")
        .after_help(
            r#"EXAMPLES:
  weft rules expr.grammar                     # last grammar declared
  weft rules grammars/ --grammar Expr         # a named grammar"#,
        )
        .arg(goal_arg());

    with_input_args(cmd)
}

/// Print the type model.
pub fn types_command() -> Command {
    let cmd = Command::new("types")
        .about("Print the derived type model")
        .after_help(
            r#"EXAMPLES:
  weft types expr.grammar                     # every namespace
  weft types expr.grammar --grammar Expr      # one namespace
  weft types expr.grammar --format json"#,
        )
        .arg(goal_arg())
        .arg(format_arg());

    with_input_args(cmd)
}

/// Print the transform model.
pub fn transform_command() -> Command {
    let cmd = Command::new("transform")
        .about("Print the transform model, with overrides merged")
        .after_help(
            r#"EXAMPLES:
  weft transform expr.grammar                     # generated transforms
  weft transform expr.grammar -t expr.transform   # with overrides
  weft transform expr.grammar > expr.transform    # start an override file"#,
        )
        .arg(goal_arg())
        .arg(format_arg());

    with_input_args(cmd)
}

/// Write every derived artifact as one bundle.
pub fn dump_command() -> Command {
    let cmd = Command::new("dump")
        .about("Write rule sets, type model and transform model as one bundle")
        .after_help(
            r#"EXAMPLES:
  weft dump expr.grammar                      # JSON to stdout
  weft dump expr.grammar -o expr.json
  weft dump expr.grammar --binary -o expr.bin"#,
        )
        .arg(output_file_arg())
        .arg(binary_arg());

    with_input_args(cmd)
}
