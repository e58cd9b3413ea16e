use crate::Workbench;
use crate::shot_rules;

#[test]
fn declared_rules_then_pseudo_rules() {
    shot_rules!(r#"
        grammar G {
            S = a 'b'? c ;
            leaf a = "[a-z]+" ;
            leaf c = "[0-9]+" ;
            skip ws = " +" ;
        }
    "#, @r#"
    grammar G
      S = a §S§opt1 c ;
      leaf a = "[a-z]+" ;
      leaf c = "[0-9]+" ;
      skip ws = " +" ;
      §S§opt1 = 'b'? ;
    terminals
      "[a-z]+"
      "[0-9]+"
      " +"
      'b'
    "#);
}

#[test]
fn leaf_rule_becomes_one_pattern() {
    shot_rules!(r#"
        grammar G {
            leaf num = "[0-9]+" ('.' "[0-9]+")? ;
            S = num ;
        }
    "#, @r#"
    grammar G
      leaf num = "[0-9]+((\.[0-9]+))?" ;
      S = num ;
    terminals
      "[0-9]+((\.[0-9]+))?"
    "#);
}

#[test]
fn embedded_grammars_are_listed() {
    shot_rules!(r#"
        grammar Lib { e = 'e' ; }
        grammar G { S = Lib::e ';' ; }
    "#, @r"
    grammar G
      S = §S§embedded1 ';' ;
      §S§embedded1 = Lib::e ;
    embedded
      Lib
    terminals
      ';'
    ");
}

#[test]
fn lookups() {
    let workbench = Workbench::expect_valid(
        r#"grammar G { S = a ('x' | 'y') ; leaf a = "[a-z]+" 'z' ; }"#,
    );
    let id = workbench.goal_grammar().unwrap();
    let rules = workbench.rule_set(id).unwrap();

    let declared: Vec<_> = rules.all_resolved_rules().map(|r| r.name.as_str()).collect();
    assert_eq!(declared, ["S", "a"]);
    let pseudo: Vec<_> = rules.pseudo_rules().map(|r| r.name.as_str()).collect();
    assert_eq!(pseudo, ["§S§group1", "§S§choice1"]);

    assert!(rules.find_non_terminal_rule("a").unwrap().is_leaf);
    assert!(rules.find_non_terminal_rule("§S§choice1").unwrap().synthesized);
    assert!(rules.find_non_terminal_rule("b").is_none());
    assert!(rules.find_terminal_rule("[a-z]+z").unwrap().is_pattern);
    assert!(rules.find_terminal_rule("x").is_some());
    assert!(rules.find_terminal_rule("z").is_none());
}
