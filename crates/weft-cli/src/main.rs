mod cli;
mod commands;

use cli::{CheckParams, DumpParams, RulesParams, TransformParams, TypesParams, build_cli};

fn main() {
    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("check", m)) => {
            let params = CheckParams::from_matches(m);
            commands::check::run(params.into());
        }
        Some(("rules", m)) => {
            let params = RulesParams::from_matches(m);
            commands::rules::run(params.into());
        }
        Some(("types", m)) => {
            let params = TypesParams::from_matches(m);
            commands::types::run(params.into());
        }
        Some(("transform", m)) => {
            let params = TransformParams::from_matches(m);
            commands::transform::run(params.into());
        }
        Some(("dump", m)) => {
            let params = DumpParams::from_matches(m);
            commands::dump::run(params.into());
        }
        _ => unreachable!("clap should have caught this"),
    }
}
