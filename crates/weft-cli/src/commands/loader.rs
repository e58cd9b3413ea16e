//! Loading grammar and transform-override sources into a [`SourceMap`].

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use weft_compiler::SourceMap;

use super::run_common::InputArgs;

pub const GRAMMAR_EXT: &str = "grammar";
pub const TRANSFORM_EXT: &str = "transform";

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("grammar is required: use a positional argument or -g/--grammar-text")]
    MissingGrammar,

    #[error("failed to read '{}': {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to read stdin: {0}")]
    Stdin(io::Error),

    #[error("no .grammar files found in workspace '{}'", .0.display())]
    EmptyWorkspace(PathBuf),
}

/// Grammar sources first, then override files in command-line order.
pub fn load_sources(input: &InputArgs) -> Result<SourceMap, LoadError> {
    let mut map = SourceMap::new();

    match (input.grammar_text.as_deref(), input.grammar_path.as_deref()) {
        (Some(text), _) => {
            map.add_one_liner(text);
        }
        (None, Some(path)) if path.as_os_str() == "-" => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).map_err(LoadError::Stdin)?;
            map.add_stdin(&buf);
        }
        (None, Some(path)) if path.is_dir() => load_workspace(&mut map, path)?,
        (None, Some(path)) => {
            let content = read(path)?;
            map.add_file(&path.to_string_lossy(), &content);
        }
        (None, None) => return Err(LoadError::MissingGrammar),
    }

    for path in &input.transforms {
        let content = read(path)?;
        map.add_transform_file(&path.to_string_lossy(), &content);
    }

    Ok(map)
}

/// Every `.grammar` file of a directory, then every `.transform` file, each sorted by path.
fn load_workspace(map: &mut SourceMap, dir: &Path) -> Result<(), LoadError> {
    let grammars = files_with_extension(dir, GRAMMAR_EXT)?;
    if grammars.is_empty() {
        return Err(LoadError::EmptyWorkspace(dir.to_owned()));
    }
    for path in grammars {
        let content = read(&path)?;
        map.add_file(&path.to_string_lossy(), &content);
    }
    for path in files_with_extension(dir, TRANSFORM_EXT)? {
        let content = read(&path)?;
        map.add_transform_file(&path.to_string_lossy(), &content);
    }
    Ok(())
}

fn files_with_extension(dir: &Path, ext: &str) -> Result<Vec<PathBuf>, LoadError> {
    let entries = fs::read_dir(dir).map_err(|source| LoadError::Read {
        path: dir.to_owned(),
        source,
    })?;
    let mut paths: Vec<_> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == ext))
        .collect();
    paths.sort();
    Ok(paths)
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_owned(),
        source,
    })
}
