use weft_core::{ModelBundle, QualifiedName};

use crate::shot_error;
use crate::{Error, SourceMap, Workbench, WorkbenchBuilder, WorkbenchConfig};

#[test]
fn staged_pipeline() {
    let parsed = WorkbenchBuilder::one_liner("grammar G { S = a ; leaf a = \"x\" ; }")
        .parse()
        .unwrap();
    assert_eq!(parsed.grammars().len(), 1);
    assert!(parsed.diagnostics().is_empty());

    let workbench = parsed.analyze().unwrap();
    assert!(workbench.is_valid());
    assert_eq!(workbench.rule_sets().count(), 1);
}

#[test]
fn sources_from_several_files() {
    let mut map = SourceMap::new();
    map.add_file("lib.grammar", "grammar Lib { e = a ; leaf a = \"x\" ; }");
    map.add_file("main.grammar", "grammar Main { S = Lib::e ';' ; }");
    map.add_transform_file("main.transform", "transform Main { S : S() { e := child[0] } }");

    let workbench = WorkbenchBuilder::new(map).parse().unwrap().analyze().unwrap();
    assert!(workbench.is_valid(), "{}", workbench.dump_diagnostics());

    let main = workbench.find_grammar("Main").unwrap();
    let lib = workbench.find_grammar("Lib").unwrap();
    assert_eq!(workbench.goal_grammar(), Some(main));
    assert_eq!(workbench.dependencies().dependencies(main).collect::<Vec<_>>(), [lib]);
    let rule = workbench
        .transform_model()
        .find(&QualifiedName::parse("Main"), "S")
        .unwrap();
    assert_eq!(rule.construction.to_string(), "S() {\n      e := child[0]\n    }");
}

#[test]
fn default_goal_selects_grammar() {
    let workbench = WorkbenchBuilder::one_liner("grammar A { x = 'x' ; } grammar B { y = 'y' ; }")
        .with_default_goal("A")
        .parse()
        .unwrap()
        .analyze()
        .unwrap();

    assert_eq!(workbench.goal_grammar(), workbench.find_grammar("A"));
}

#[test]
fn models_follow_declaration_order() {
    let workbench =
        Workbench::expect_valid("grammar Main { S = Lib::e ; } grammar Lib { e = a a ; leaf a = \"x\" ; }");

    let namespaces: Vec<_> = workbench
        .type_model()
        .namespaces
        .keys()
        .map(ToString::to_string)
        .collect();
    assert_eq!(namespaces, ["Main", "Lib"]);
    let rule_sets: Vec<_> = workbench.rule_sets().map(|r| r.grammar.to_string()).collect();
    assert_eq!(rule_sets, ["Main", "Lib"]);
}

#[test]
fn create_missing_types_from_config() {
    let mut map = SourceMap::one_liner("grammar G { S = a ; leaf a = \"x\" ; }");
    map.add_transform_one_liner("transform G { S : P() { x := child[0] } }");

    let workbench = WorkbenchBuilder::new(map)
        .with_create_missing_types(true)
        .parse()
        .unwrap()
        .analyze()
        .unwrap();

    let messages: Vec<_> = workbench.diagnostics().iter().map(ToString::to_string).collect();
    assert_eq!(messages, ["info at 18..19: created type `P`"]);
    assert!(workbench.is_valid());
}

#[test]
fn fuel_exhaustion_aborts() {
    let result = WorkbenchBuilder::one_liner("grammar G { A = 'a' ; }")
        .with_parse_fuel(3)
        .parse();

    assert!(matches!(result, Err(Error::ExecFuelExhausted)));
}

#[test]
fn bundle_round_trip() {
    let workbench = Workbench::expect_valid("grammar G { S = a b? ; leaf a = \"x\" ; b = 'b' | S ; }");
    let bundle = workbench.bundle();

    assert_eq!(ModelBundle::from_json(&bundle.to_json()).unwrap(), bundle);
    assert_eq!(ModelBundle::from_binary(&bundle.to_binary()).unwrap(), bundle);
}

#[test]
fn undefined_rule_is_invalid() {
    shot_error!("grammar G { S = a ; }", @"error at 16..17: rule `a` is not defined");
}

#[test]
fn rendered_diagnostics_point_at_source() {
    let workbench = Workbench::expect("grammar G { S = a ; }");

    let rendered = workbench.dump_diagnostics();
    assert!(rendered.contains("rule `a` is not defined"), "{rendered}");
    assert!(rendered.contains("grammar G { S = a ; }"), "{rendered}");
}

#[test]
fn recursion_limit_from_config() {
    let source = "grammar G { A = ((((((('a'))))))) ; }";
    let result = WorkbenchBuilder::one_liner(source)
        .with_parse_recursion_limit(4)
        .parse();
    assert!(matches!(result, Err(Error::RecursionLimitExceeded)));

    let config = WorkbenchConfig {
        parse_max_depth: 4,
        ..WorkbenchConfig::default()
    };
    let result = WorkbenchBuilder::one_liner(source).with_config(config).parse();
    assert!(matches!(result, Err(Error::RecursionLimitExceeded)));
}

#[test]
fn bundle_json_is_keyed_by_grammar_name() {
    let workbench = Workbench::expect_valid("namespace App; grammar G { S = 'x' ; }");
    let json: serde_json::Value = serde_json::from_str(&workbench.bundle().to_json()).unwrap();

    assert_eq!(json["rule_sets"].as_array().unwrap().len(), 1);
    assert!(json["types"]["namespaces"]["App.G"].is_object());
    assert!(json["transforms"]["units"]["App.G"].is_object());
}
