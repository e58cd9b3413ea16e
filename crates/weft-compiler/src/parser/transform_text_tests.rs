use indoc::indoc;

use super::ast::{RuleBody, TransformFile, TransformRuleDecl};
use super::{ParseLimits, parse_transform};
use crate::{Diagnostics, SourceId};

fn parse(source: &str) -> (TransformFile, Diagnostics) {
    parse_transform(source, SourceId(0), ParseLimits::default()).expect("no fatal error")
}

fn show(rule: &TransformRuleDecl) -> String {
    match &rule.body {
        RuleBody::Create {
            type_name,
            assignments,
            ..
        } => {
            let mut out = format!("{} : {type_name}() {{", rule.rule);
            for assignment in assignments {
                out.push_str(&format!(" {} := {}", assignment.property, assignment.expr));
            }
            out.push_str(" }");
            out
        }
        RuleBody::Expr { expr, .. } => format!("{} : {expr}", rule.rule),
    }
}

#[test]
fn scopes_blocks_and_directives() {
    let (file, diagnostics) = parse(indoc! {r#"
        #override-default-transform
        transform Loose { }
        namespace demo
        #create-missing-types
        transform Expressions {
            #override-default-transform
        }
        transform other.Lib { }
    "#});

    assert!(diagnostics.is_empty());
    assert!(file.directives.override_default_transform);
    assert!(!file.directives.create_missing_types);
    assert_eq!(file.scopes.len(), 2);

    assert_eq!(file.scopes[0].namespace, None);
    assert_eq!(file.scopes[0].blocks[0].grammar, "Loose");

    let scope = &file.scopes[1];
    assert_eq!(scope.namespace.as_ref().map(ToString::to_string).as_deref(), Some("demo"));
    assert!(scope.directives.create_missing_types);
    let grammars: Vec<_> = scope.blocks.iter().map(|b| b.grammar.as_str()).collect();
    assert_eq!(grammars, ["Expressions", "other.Lib"]);
    assert!(scope.blocks[0].directives.override_default_transform);
    assert!(!scope.blocks[1].directives.override_default_transform);
}

#[test]
fn rule_bodies() {
    let (file, diagnostics) = parse(indoc! {r#"
        transform Expressions {
            S : Node() {
                left := child[0]
                $value := with(child[1]) children.items
            }
            E : Empty() { }
            A : child[0] as Base
            U : when { 0 == $alternative -> child[0] 1 == $alternative -> tuple { x := children } else -> $nothing } as U
            P : (with(child[0]) $self) as String
            L : $self as String
        }
    "#});

    assert!(diagnostics.is_empty());
    let res: Vec<_> = file.scopes[0].blocks[0].rules.iter().map(show).collect();
    insta::assert_snapshot!(res.join("\n"), @r"
    S : Node() { left := child[0] $value := with(child[1]) children.items }
    E : Empty() { }
    A : child[0] as Base
    U : when { 0 == $alternative -> child[0] 1 == $alternative -> tuple { x := children } else -> $nothing } as U
    P : (with(child[0]) $self) as String
    L : $self as String
    ");
}

#[test]
fn with_body_absorbs_cast() {
    let (file, _) = parse("transform G { A : with(child[0]) $self as T }");
    let res = show(&file.scopes[0].blocks[0].rules[0]);
    insta::assert_snapshot!(res, @"A : with(child[0]) $self as T");
    let RuleBody::Expr { expr, .. } = &file.scopes[0].blocks[0].rules[0].body else {
        panic!("expected an expression body");
    };
    assert!(matches!(expr, weft_core::Expr::With { .. }));
}

#[test]
fn bad_expression_recovers_at_next_rule() {
    let (file, diagnostics) = parse("transform G { A : foo B : $self }");

    let messages: Vec<_> = diagnostics.iter().map(ToString::to_string).collect();
    assert_eq!(
        messages,
        ["error at 18..21: expected an expression: `foo` is not an expression"]
    );
    let rules: Vec<_> = file.scopes[0].blocks[0].rules.iter().map(show).collect();
    assert_eq!(rules, ["B : $self"]);
}

#[test]
fn unknown_directive() {
    let (file, diagnostics) = parse("#bogus transform G { }");

    let messages: Vec<_> = diagnostics.iter().map(ToString::to_string).collect();
    assert_eq!(messages, ["error at 0..6: unknown directive: #bogus"]);
    assert_eq!(file.scopes[0].blocks.len(), 1);
}

#[test]
fn unclosed_block() {
    let (_, diagnostics) = parse("transform G { A : $self");

    let messages: Vec<_> = diagnostics.iter().map(ToString::to_string).collect();
    assert_eq!(
        messages,
        ["error at 12..23: missing closing `}` (related: transform block starts here at 12..13)"]
    );
}
