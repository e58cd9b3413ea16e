use weft_core::QualifiedName;

use super::{Grammar, GrammarBuilder, GrammarSet, Lookup, RuleItem, RuleVariant};
use crate::Diagnostics;

fn grammar(namespace: &str, name: &str) -> Grammar {
    GrammarBuilder::new(QualifiedName::parse(namespace), name)
        .finish()
        .unwrap()
}

fn qn(text: &str) -> QualifiedName {
    QualifiedName::parse(text)
}

#[test]
fn duplicate_grammar_is_dropped() {
    let mut set = GrammarSet::new();
    let mut diagnostics = Diagnostics::new();

    assert!(set.add(grammar("a", "G"), &mut diagnostics).is_some());
    assert!(set.add(grammar("b", "G"), &mut diagnostics).is_some());
    assert!(set.add(grammar("a", "G"), &mut diagnostics).is_none());

    assert_eq!(set.len(), 2);
    let messages: Vec<_> = diagnostics.iter().map(ToString::to_string).collect();
    assert_eq!(messages, ["error: grammar `a.G` is already defined"]);
}

#[test]
fn lookup_prefers_exact_then_local_then_suffix() {
    let mut set = GrammarSet::new();
    let mut diagnostics = Diagnostics::new();
    let a_g = set.add(grammar("a", "G"), &mut diagnostics).unwrap();
    let b_g = set.add(grammar("b", "G"), &mut diagnostics).unwrap();
    let lib = set.add(grammar("x.y", "Lib"), &mut diagnostics).unwrap();

    assert_eq!(set.lookup(&qn("a.G"), &qn("b")), Lookup::Found(a_g));
    assert_eq!(set.lookup(&qn("G"), &qn("b")), Lookup::Found(b_g));
    assert_eq!(set.lookup(&qn("Lib"), &qn("a")), Lookup::Found(lib));
    assert_eq!(set.lookup(&qn("y.Lib"), &qn("a")), Lookup::Found(lib));
    assert_eq!(set.lookup(&qn("G"), &qn("c")), Lookup::Ambiguous(vec![a_g, b_g]));
    assert_eq!(set.lookup(&qn("H"), &qn("a")), Lookup::NotFound);
}

#[test]
fn link_resolves_extends_and_embedded() {
    let mut set = GrammarSet::new();
    let mut diagnostics = Diagnostics::new();
    let base = set.add(grammar("demo", "Base"), &mut diagnostics).unwrap();

    let mut b = GrammarBuilder::new(qn("demo"), "Derived");
    b.extends(qn("Base"), None);
    b.extends(qn("Missing"), None);
    let rule = b.add_rule("S", false, false, RuleVariant::Normal, None);
    let embedded = b.item(
        rule,
        RuleItem::Embedded {
            grammar: super::GrammarRef::new(qn("demo.Base"), None),
            goal: "value".into(),
        },
        None,
    );
    b.set_rhs(rule, embedded).unwrap();
    let derived = set.add(b.finish().unwrap(), &mut diagnostics).unwrap();

    set.link(&mut diagnostics);

    let derived = set.get(derived);
    assert_eq!(derived.extends[0].target, Some(base));
    assert_eq!(derived.extends[1].target, None);
    let RuleItem::Embedded { grammar, .. } = derived.item(embedded) else {
        panic!("expected an embedded item");
    };
    assert_eq!(grammar.target, Some(base));

    let messages: Vec<_> = diagnostics.iter().map(ToString::to_string).collect();
    assert_eq!(messages, ["error: grammar `Missing` is not defined"]);
}
