use super::run_common::{
    InputArgs, OutputFormat, load_workbench, require_valid, resolve_goal, to_json,
};

pub struct TransformArgs {
    pub input: InputArgs,
    pub goal: Option<String>,
    pub format: OutputFormat,
}

pub fn run(args: TransformArgs) {
    let workbench = load_workbench(&args.input);
    require_valid(&workbench, args.input.color);
    let model = workbench.transform_model();

    let output = match args.goal.as_deref() {
        Some(name) => {
            let id = resolve_goal(&workbench, Some(name));
            match args.format {
                // printed in override syntax, ready to be edited and passed back with -t
                OutputFormat::Text => workbench.dump_transforms(id),
                OutputFormat::Json => {
                    let grammar = workbench.grammars().get(id).qualified_name();
                    to_json(&model.unit(&grammar))
                }
            }
        }
        None => match args.format {
            OutputFormat::Text => workbench.dump_all_transforms(),
            OutputFormat::Json => to_json(model),
        },
    };
    print!("{output}");
}
