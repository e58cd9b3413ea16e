use weft_core::{QualifiedName, TransformOrigin};

use crate::Workbench;

const GRAMMAR: &str = r#"namespace App; grammar G { S = a b ; leaf a = "[a-z]+" ; leaf b = "[0-9]+" ; }"#;

fn apply(overrides: &str) -> (Workbench, Vec<String>) {
    let mut workbench = Workbench::expect_valid(GRAMMAR);
    workbench.apply_overrides(overrides).unwrap();
    let messages = workbench
        .diagnostics()
        .iter()
        .map(ToString::to_string)
        .collect();
    (workbench, messages)
}

fn grammar() -> QualifiedName {
    QualifiedName::parse("App.G")
}

#[test]
fn user_rule_replaces_generated_rule() {
    let (workbench, messages) = apply("namespace App; transform G { S : S() { b := child[1] } }");
    assert!(messages.is_empty(), "{messages:?}");

    let id = workbench.find_grammar("App.G").unwrap();
    insta::assert_snapshot!(workbench.dump_transforms(id), @r"
    namespace App
      transform G {
        S : S() {
          b := child[1]
        }
        a : $self as String
        b : $self as String
      }
    ");
    let rule = workbench.transform_model().find(&grammar(), "S").unwrap();
    assert_eq!(rule.origin, TransformOrigin::User);
}

#[test]
fn baseline_is_untouched() {
    let (workbench, _) = apply("transform App.G { S : S() { b := child[1] } }");

    let baseline = workbench
        .baseline_transform_model()
        .find(&grammar(), "S")
        .unwrap();
    assert_eq!(baseline.origin, TransformOrigin::Generated);
    assert_eq!(
        baseline.construction.to_string(),
        "S() {\n      a := child[0]\n      b := child[1]\n    }"
    );
}

#[test]
fn unknown_grammar() {
    let (workbench, messages) = apply("transform H { }");

    assert_eq!(messages, ["error at 10..11: grammar `H` is not defined"]);
    assert!(!workbench.is_valid());
}

#[test]
fn unknown_rule() {
    let (_, messages) = apply("transform App.G { z : child[0] }");

    assert_eq!(
        messages,
        ["error at 18..19: rule `z` is not defined in the grammar"]
    );
}

#[test]
fn unknown_type_keeps_baseline() {
    let (workbench, messages) = apply("transform App.G { S : T() { } }");

    assert_eq!(messages, ["error at 22..23: type `T` is not defined"]);
    let rule = workbench.transform_model().find(&grammar(), "S").unwrap();
    assert_eq!(rule.origin, TransformOrigin::Generated);
}

#[test]
fn unknown_property_is_a_warning() {
    let (workbench, messages) = apply("transform App.G { S : S() { c := child[0] } }");

    assert_eq!(messages, ["warning at 28..29: unknown property: `c` on `S`"]);
    assert!(workbench.is_valid());
}

#[test]
fn override_default_requires_every_rule() {
    let (workbench, messages) =
        apply("transform App.G { #override-default-transform S : S() { } }");

    assert_eq!(
        messages,
        [
            "error at 10..15: no transform rule for `a`",
            "error at 10..15: no transform rule for `b`",
        ]
    );
    let unit = workbench.transform_model().unit(&grammar()).unwrap();
    assert_eq!(unit.rules.len(), 1);
}

#[test]
fn override_default_with_missing_types_generates_rules() {
    let (workbench, messages) = apply(
        "transform App.G { #override-default-transform #create-missing-types S : S() { } }",
    );

    assert_eq!(
        messages,
        [
            "info at 10..15: generated transform rule for `a`",
            "info at 10..15: generated transform rule for `b`",
        ]
    );
    assert!(workbench.is_valid());
    let rule = workbench.transform_model().find(&grammar(), "a").unwrap();
    assert_eq!(rule.origin, TransformOrigin::Synthesized);
}

#[test]
fn missing_type_is_created() {
    let (workbench, messages) = apply(
        "transform App.G { #create-missing-types S : Pair() { left := child[0] as String right := children } }",
    );

    assert_eq!(messages, ["info at 44..48: created type `Pair`"]);
    let id = workbench.find_grammar("App.G").unwrap();
    insta::assert_snapshot!(workbench.dump_types(id), @r"
    namespace App.G
      datatype S {
        a: String #0
        b: String #1
      }
      datatype Pair {
        left: String #0
        right: List<Any> #1
      }
    ");
}

#[test]
fn reapplying_merges_over_baseline() {
    let mut workbench = Workbench::expect_valid(GRAMMAR);
    workbench
        .apply_overrides("transform App.G { S : S() { b := child[1] } }")
        .unwrap();
    workbench
        .apply_overrides("transform App.G { a : child[0] }")
        .unwrap();

    assert!(workbench.is_valid());
    let unit = workbench.transform_model().unit(&grammar()).unwrap();
    assert_eq!(unit.get("S").unwrap().origin, TransformOrigin::User);
    assert_eq!(unit.get("a").unwrap().construction.to_string(), "child[0]");
    assert_eq!(unit.get("b").unwrap().origin, TransformOrigin::Generated);
}

#[test]
fn created_types_stay_out_of_the_baseline() {
    let (workbench, _) = apply(
        "transform App.G { #create-missing-types S : Pair() { left := child[0] as String } }",
    );

    let merged = workbench.type_model().namespace(&grammar()).unwrap();
    assert!(merged.contains("Pair"));
    let baseline = workbench.baseline_type_model().namespace(&grammar()).unwrap();
    assert!(!baseline.contains("Pair"));
    assert!(workbench.baseline_transform_model().unit(&grammar()).is_some());
}

#[test]
fn dumped_transforms_read_back_as_overrides() {
    let mut workbench = Workbench::expect_valid(GRAMMAR);
    let id = workbench.find_grammar("App.G").unwrap();
    let dumped = workbench.dump_transforms(id);

    workbench.apply_overrides(&dumped).unwrap();

    assert!(workbench.diagnostics().is_empty());
    let unit = workbench.transform_model().unit(&grammar()).unwrap();
    let baseline = workbench.baseline_transform_model().unit(&grammar()).unwrap();
    for (name, rule) in &unit.rules {
        assert_eq!(rule.origin, TransformOrigin::User, "{name}");
        assert_eq!(rule.construction, baseline.rules[name].construction, "{name}");
    }
    assert_eq!(workbench.dump_transforms(id), dumped);
}
