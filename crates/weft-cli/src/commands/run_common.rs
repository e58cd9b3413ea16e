//! Shared logic for every command: loading, analysis and grammar selection.

use std::path::PathBuf;

use weft_compiler::grammar::GrammarId;
use weft_compiler::{Workbench, WorkbenchBuilder, WorkbenchParsed};

use super::loader::load_sources;

/// Grammar and override inputs common to all commands.
pub struct InputArgs {
    pub grammar_path: Option<PathBuf>,
    pub grammar_text: Option<String>,
    pub transforms: Vec<PathBuf>,
    pub create_missing_types: bool,
    pub fuel: u32,
    pub color: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Load and analyze every input, exiting on fatal errors.
pub fn load_workbench(input: &InputArgs) -> Workbench {
    let source_map = load_sources(input).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });

    WorkbenchBuilder::new(source_map)
        .with_parse_fuel(input.fuel)
        .with_create_missing_types(input.create_missing_types)
        .parse()
        .and_then(WorkbenchParsed::analyze)
        .unwrap_or_else(|e| {
            eprintln!("error: {e}");
            std::process::exit(1);
        })
}

/// Exit with rendered diagnostics when any error was reported; print warnings otherwise.
pub fn require_valid(workbench: &Workbench, color: bool) {
    let diagnostics = workbench.diagnostics();
    if !workbench.is_valid() {
        eprint!("{}", diagnostics.render_colored(workbench.source_map(), color));
        std::process::exit(1);
    }
    if diagnostics.has_warnings() {
        eprint!("{}", diagnostics.render_colored(workbench.source_map(), color));
    }
}

/// Grammar named by `--grammar`, or the workbench's goal grammar.
pub fn resolve_goal(workbench: &Workbench, name: Option<&str>) -> GrammarId {
    let id = match name {
        Some(name) => workbench.find_grammar(name),
        None => workbench.goal_grammar(),
    };
    id.unwrap_or_else(|| {
        match name {
            Some(name) => eprintln!("error: grammar `{name}` is not defined or is ambiguous"),
            None => eprintln!("error: no grammar declared"),
        }
        std::process::exit(1);
    })
}

/// Pretty JSON followed by a newline.
pub fn to_json(value: &impl serde::Serialize) -> String {
    let mut out = serde_json::to_string_pretty(value).expect("serialization should not fail");
    out.push('\n');
    out
}
