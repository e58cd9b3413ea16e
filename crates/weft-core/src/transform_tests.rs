use crate::{
    Assignment, Construction, Expr, QualifiedName, TransformModel, TransformOrigin, TransformRule,
    TransformUnit, WhenBranch,
};

fn rule(name: &str, construction: Construction) -> TransformRule {
    TransformRule {
        rule: name.to_owned(),
        construction,
        origin: TransformOrigin::Generated,
    }
}

fn sample_unit() -> TransformUnit {
    let grammar = QualifiedName::parse("test.G");
    let mut unit = TransformUnit::new(grammar.clone(), grammar);
    unit.insert(rule(
        "S",
        Construction::SubtypeDispatch {
            type_name: "S".to_owned(),
        },
    ));
    unit.insert(rule(
        "A",
        Construction::CreateObject {
            type_name: "A".to_owned(),
            assignments: vec![
                Assignment::new("a", Expr::ChildAt(0)),
                Assignment::new("x", Expr::with(Expr::ChildAt(1), Expr::Children)),
            ],
        },
    ));
    unit.insert(rule(
        "U",
        Construction::UnionDispatch {
            type_name: "U".to_owned(),
            branches: vec![
                WhenBranch {
                    alternative: 0,
                    expr: Expr::ChildAt(0),
                },
                WhenBranch {
                    alternative: 1,
                    expr: Expr::Tuple(vec![Assignment::new("b", Expr::ChildAt(0))]),
                },
            ],
            otherwise: Expr::Nothing,
        },
    ));
    unit.insert(rule("ID", Construction::LeafString));
    unit.insert(rule("§A§opt1", Construction::PassThrough(Expr::ChildAt(0))));
    unit
}

#[test]
fn display_model() {
    let mut model = TransformModel::new();
    model.insert_unit(sample_unit());
    insta::assert_snapshot!(model.to_string(), @r"
    namespace test
      transform G {
        S : child[0] as S
        A : A() {
          a := child[0]
          x := with(child[1]) children
        }
        U : when { 0 == $alternative -> child[0] 1 == $alternative -> tuple { b := child[0] } else -> $nothing } as U
        ID : $self as String
        §A§opt1 : child[0]
      }
    ");
}

#[test]
fn insert_replaces_in_place() {
    let mut unit = sample_unit();
    let mut user = rule("A", Construction::PassThrough(Expr::SelfRef));
    user.origin = TransformOrigin::User;
    unit.insert(user);

    let names: Vec<_> = unit.rules.keys().map(String::as_str).collect();
    assert_eq!(names, ["S", "A", "U", "ID", "§A§opt1"]);
    assert_eq!(unit.get("A").unwrap().origin, TransformOrigin::User);
}

#[test]
fn find_by_grammar_and_rule() {
    let mut model = TransformModel::new();
    model.insert_unit(sample_unit());
    let grammar = QualifiedName::parse("test.G");
    let found = model.find(&grammar, "U").unwrap();
    assert_eq!(found.construction.type_name(), Some("U"));
    assert!(model.find(&grammar, "missing").is_none());
    assert!(model.find(&QualifiedName::parse("test.H"), "U").is_none());
}

#[test]
fn empty_object_prints_on_one_line() {
    let construction = Construction::CreateObject {
        type_name: "Empty".to_owned(),
        assignments: vec![],
    };
    assert_eq!(construction.to_string(), "Empty() {}");
}

#[test]
fn cast_of_with_is_parenthesized() {
    let expr = Expr::cast(Expr::with(Expr::ChildAt(0), Expr::ChildAt(1)), "T");
    assert_eq!(expr.to_string(), "(with(child[0]) child[1]) as T");
}

#[test]
fn from_expr_recognizes_dispatch_forms() {
    assert_eq!(
        Construction::from_expr(Expr::cast(Expr::ChildAt(0), "S")),
        Construction::SubtypeDispatch {
            type_name: "S".to_owned()
        }
    );
    assert_eq!(
        Construction::from_expr(Expr::cast(Expr::SelfRef, "String")),
        Construction::LeafString
    );

    let when = Expr::When {
        branches: vec![WhenBranch {
            alternative: 0,
            expr: Expr::ChildAt(0),
        }],
        otherwise: Box::new(Expr::Nothing),
    };
    assert!(matches!(
        Construction::from_expr(Expr::cast(when, "U")),
        Construction::UnionDispatch { ref type_name, ref branches, .. }
            if type_name == "U" && branches.len() == 1
    ));
}

#[test]
fn from_expr_passes_other_values_through() {
    let cast = Expr::cast(Expr::SelfRef, "Name");
    assert_eq!(
        Construction::from_expr(cast.clone()),
        Construction::PassThrough(cast)
    );
    assert_eq!(
        Construction::from_expr(Expr::ChildAt(1)),
        Construction::PassThrough(Expr::ChildAt(1))
    );
    assert_eq!(Construction::PassThrough(Expr::ChildAt(1)).type_name(), None);
}
