use std::fs;
use std::path::PathBuf;

use weft_compiler::{SourceKind, SourceLanguage};

use super::loader::{LoadError, load_sources};
use super::run_common::InputArgs;

fn input(grammar_path: Option<PathBuf>, grammar_text: Option<&str>) -> InputArgs {
    InputArgs {
        grammar_path,
        grammar_text: grammar_text.map(str::to_owned),
        transforms: Vec::new(),
        create_missing_types: false,
        fuel: 1_000_000,
        color: false,
    }
}

#[test]
fn inline_text() {
    let map = load_sources(&input(None, Some("grammar G { S = 'x' ; }"))).unwrap();

    assert_eq!(map.len(), 1);
    let source = map.iter().next().unwrap();
    assert_eq!(source.kind, &SourceKind::OneLiner);
    assert_eq!(source.content, "grammar G { S = 'x' ; }");
}

#[test]
fn single_file_with_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let grammar = dir.path().join("expr.grammar");
    let overrides = dir.path().join("expr.transform");
    fs::write(&grammar, "grammar Expr { S = 'x' ; }").unwrap();
    fs::write(&overrides, "transform Expr { }").unwrap();

    let mut args = input(Some(grammar), None);
    args.transforms.push(overrides);
    let map = load_sources(&args).unwrap();

    let languages: Vec<_> = map.iter().map(|s| s.language).collect();
    assert_eq!(languages, [SourceLanguage::Grammar, SourceLanguage::Transform]);
}

#[test]
fn workspace_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("b.grammar"), "grammar B { }").unwrap();
    fs::write(dir.path().join("a.grammar"), "grammar A { }").unwrap();
    fs::write(dir.path().join("a.transform"), "transform A { }").unwrap();
    fs::write(dir.path().join("notes.txt"), "not a grammar").unwrap();

    let map = load_sources(&input(Some(dir.path().to_owned()), None)).unwrap();

    let loaded: Vec<_> = map
        .iter()
        .map(|s| (s.content.to_owned(), s.language))
        .collect();
    assert_eq!(
        loaded,
        [
            ("grammar A { }".to_owned(), SourceLanguage::Grammar),
            ("grammar B { }".to_owned(), SourceLanguage::Grammar),
            ("transform A { }".to_owned(), SourceLanguage::Transform),
        ]
    );
}

#[test]
fn empty_workspace() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.transform"), "transform A { }").unwrap();

    let err = load_sources(&input(Some(dir.path().to_owned()), None)).unwrap_err();
    assert!(matches!(err, LoadError::EmptyWorkspace(_)));
}

#[test]
fn missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.grammar");

    let err = load_sources(&input(Some(path.clone()), None)).unwrap_err();
    assert!(matches!(err, LoadError::Read { path: ref p, .. } if *p == path));
    assert!(err.to_string().starts_with("failed to read '"));
}

#[test]
fn grammar_is_required() {
    let err = load_sources(&input(None, None)).unwrap_err();

    insta::assert_snapshot!(
        err.to_string(),
        @"grammar is required: use a positional argument or -g/--grammar-text"
    );
}
