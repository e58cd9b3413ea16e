use super::run_common::{
    InputArgs, OutputFormat, load_workbench, require_valid, resolve_goal, to_json,
};

pub struct TypesArgs {
    pub input: InputArgs,
    pub goal: Option<String>,
    pub format: OutputFormat,
}

pub fn run(args: TypesArgs) {
    let workbench = load_workbench(&args.input);
    require_valid(&workbench, args.input.color);
    let model = workbench.type_model();

    let output = match args.goal.as_deref() {
        Some(name) => {
            let id = resolve_goal(&workbench, Some(name));
            match args.format {
                OutputFormat::Text => workbench.dump_types(id),
                OutputFormat::Json => {
                    let namespace = workbench.grammars().get(id).qualified_name();
                    to_json(&model.namespace(&namespace))
                }
            }
        }
        None => match args.format {
            OutputFormat::Text => workbench.dump_all_types(),
            OutputFormat::Json => to_json(model),
        },
    };
    print!("{output}");
}
