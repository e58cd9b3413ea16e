use super::run_common::{InputArgs, load_workbench};

pub struct CheckArgs {
    pub input: InputArgs,
    pub strict: bool,
}

pub fn run(args: CheckArgs) {
    let workbench = load_workbench(&args.input);
    let diagnostics = workbench.diagnostics();

    let is_valid = if args.strict {
        !diagnostics.has_errors() && !diagnostics.has_warnings()
    } else {
        workbench.is_valid()
    };

    if !is_valid {
        eprint!(
            "{}",
            diagnostics.render_colored(workbench.source_map(), args.input.color)
        );
        std::process::exit(1);
    }

    // Silent on success (like cargo check)
}
