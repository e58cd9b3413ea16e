use super::run_common::{InputArgs, load_workbench, require_valid, resolve_goal};

pub struct RulesArgs {
    pub input: InputArgs,
    pub goal: Option<String>,
}

pub fn run(args: RulesArgs) {
    let workbench = load_workbench(&args.input);
    require_valid(&workbench, args.input.color);

    let id = resolve_goal(&workbench, args.goal.as_deref());
    print!("{}", workbench.dump_rules(id));
}
