//! Dispatch logic: extract params from ArgMatches and convert to command args.

use std::path::PathBuf;

use clap::ArgMatches;

use super::ColorChoice;
use crate::commands::check::CheckArgs;
use crate::commands::dump::DumpArgs;
use crate::commands::rules::RulesArgs;
use crate::commands::run_common::{InputArgs, OutputFormat};
use crate::commands::transform::TransformArgs;
use crate::commands::types::TypesArgs;

/// Inputs shared by every command.
pub struct InputParams {
    pub grammar_path: Option<PathBuf>,
    pub grammar_text: Option<String>,
    pub transforms: Vec<PathBuf>,
    pub create_missing_types: bool,
    pub fuel: u32,
    pub color: ColorChoice,
}

impl InputParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            grammar_path: m.get_one::<PathBuf>("grammar_path").cloned(),
            grammar_text: m.get_one::<String>("grammar_text").cloned(),
            transforms: m
                .get_many::<PathBuf>("transform")
                .map(|paths| paths.cloned().collect())
                .unwrap_or_default(),
            create_missing_types: m.get_flag("create_missing_types"),
            fuel: m.get_one::<u32>("fuel").copied().unwrap_or(1_000_000),
            color: parse_color(m),
        }
    }
}

impl From<InputParams> for InputArgs {
    fn from(p: InputParams) -> Self {
        Self {
            grammar_path: p.grammar_path,
            grammar_text: p.grammar_text,
            transforms: p.transforms,
            create_missing_types: p.create_missing_types,
            fuel: p.fuel,
            color: p.color.should_colorize(),
        }
    }
}

pub struct CheckParams {
    pub input: InputParams,
    pub strict: bool,
}

impl CheckParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            input: InputParams::from_matches(m),
            strict: m.get_flag("strict"),
        }
    }
}

impl From<CheckParams> for CheckArgs {
    fn from(p: CheckParams) -> Self {
        Self {
            input: p.input.into(),
            strict: p.strict,
        }
    }
}

pub struct RulesParams {
    pub input: InputParams,
    pub goal: Option<String>,
}

impl RulesParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            input: InputParams::from_matches(m),
            goal: m.get_one::<String>("goal").cloned(),
        }
    }
}

impl From<RulesParams> for RulesArgs {
    fn from(p: RulesParams) -> Self {
        Self {
            input: p.input.into(),
            goal: p.goal,
        }
    }
}

pub struct TypesParams {
    pub input: InputParams,
    pub goal: Option<String>,
    pub format: OutputFormat,
}

impl TypesParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            input: InputParams::from_matches(m),
            goal: m.get_one::<String>("goal").cloned(),
            format: parse_format(m),
        }
    }
}

impl From<TypesParams> for TypesArgs {
    fn from(p: TypesParams) -> Self {
        Self {
            input: p.input.into(),
            goal: p.goal,
            format: p.format,
        }
    }
}

pub struct TransformParams {
    pub input: InputParams,
    pub goal: Option<String>,
    pub format: OutputFormat,
}

impl TransformParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            input: InputParams::from_matches(m),
            goal: m.get_one::<String>("goal").cloned(),
            format: parse_format(m),
        }
    }
}

impl From<TransformParams> for TransformArgs {
    fn from(p: TransformParams) -> Self {
        Self {
            input: p.input.into(),
            goal: p.goal,
            format: p.format,
        }
    }
}

pub struct DumpParams {
    pub input: InputParams,
    pub output: Option<PathBuf>,
    pub binary: bool,
}

impl DumpParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            input: InputParams::from_matches(m),
            output: m.get_one::<PathBuf>("output").cloned(),
            binary: m.get_flag("binary"),
        }
    }
}

impl From<DumpParams> for DumpArgs {
    fn from(p: DumpParams) -> Self {
        Self {
            input: p.input.into(),
            output: p.output,
            binary: p.binary,
        }
    }
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

fn parse_format(m: &ArgMatches) -> OutputFormat {
    match m.get_one::<String>("format").map(|s| s.as_str()) {
        Some("json") => OutputFormat::Json,
        _ => OutputFormat::Text,
    }
}
