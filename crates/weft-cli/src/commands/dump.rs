use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use super::run_common::{InputArgs, load_workbench, require_valid};

pub struct DumpArgs {
    pub input: InputArgs,
    pub output: Option<PathBuf>,
    pub binary: bool,
}

pub fn run(args: DumpArgs) {
    let workbench = load_workbench(&args.input);
    require_valid(&workbench, args.input.color);

    let bundle = workbench.bundle();
    let bytes = if args.binary {
        bundle.to_binary()
    } else {
        let mut json = bundle.to_json_pretty();
        json.push('\n');
        json.into_bytes()
    };

    let result = match &args.output {
        Some(path) => fs::write(path, &bytes)
            .map_err(|e| format!("failed to write '{}': {}", path.display(), e)),
        None => io::stdout()
            .write_all(&bytes)
            .map_err(|e| format!("failed to write output: {}", e)),
    };
    if let Err(msg) = result {
        eprintln!("error: {}", msg);
        std::process::exit(1);
    }
}
