use weft_core::QualifiedName;

use crate::Workbench;
use crate::shot_transforms;

#[test]
fn supertype_dispatches_to_members() {
    shot_transforms!(r#"
        namespace App;
        grammar G {
            S = A | B ;
            A = 'a' x ;
            B = 'b' x x ;
            leaf x = "[a-z]+" ;
        }
    "#, @r"
    namespace App
      transform G {
        S : child[0] as S
        A : A() {
          x := child[1]
        }
        B : B() {
          x := child[1]
          x2 := child[2]
        }
        x : $self as String
      }
    ");
}

#[test]
fn group_becomes_tuple() {
    shot_transforms!(r#"
        namespace App;
        grammar G {
            S = ('b' 'c' 'd') ;
            T = (b c d) ;
            leaf b = "b" ;
            leaf c = "c" ;
            leaf d = "d" ;
        }
    "#, @r"
    namespace App
      transform G {
        S : S() {}
        T : T() {
          $group := with(child[0]) tuple { b := child[0] c := child[1] d := child[2] }
        }
        b : $self as String
        c : $self as String
        d : $self as String
      }
    ");
}

#[test]
fn union_dispatches_on_alternative() {
    shot_transforms!(r#"
        namespace App;
        grammar G {
            S = a | S1 ;
            S1 = S a ;
            leaf a = "[a-z]+" ;
        }
    "#, @r"
    namespace App
      transform G {
        S : when { 0 == $alternative -> child[0] 1 == $alternative -> child[0] else -> $nothing } as S
        S1 : S1() {
          S := child[0]
          a := child[1]
        }
        a : $self as String
      }
    ");
}

#[test]
fn pseudo_rules_pass_values_through() {
    shot_transforms!(r#"
        namespace App;
        grammar G {
            S = name (',' name)* ;
            leaf name = "[a-z]+" ;
        }
    "#, @r"
    namespace App
      transform G {
        S : S() {
          name := child[0]
          name2 := with(child[1]) children
        }
        name : $self as String
        §S§multi1 : children
        §S§group1 : with(child[0]) child[1]
      }
    ");
}

#[test]
fn primitive_passes_first_child() {
    shot_transforms!(r#"
        namespace App;
        grammar G { op = '+' | '-' ; }
    "#, @r"
    namespace App
      transform G {
        op : child[0]
      }
    ");
}

#[test]
fn derivation_is_deterministic() {
    let source = r#"grammar G { S = a (',' a)* b? ; leaf a = "a" ; b = 'x' | S ; }"#;

    assert_eq!(
        Workbench::expect_valid_transforms(source),
        Workbench::expect_valid_transforms(source)
    );
}

#[test]
fn parenthesized_sub_choice_dispatches_to_subtypes() {
    let source = "namespace App; grammar G { S = A | (B | C) ; A = a a ; B = a a a ; C = a 'c' a ; leaf a = 'a' ; }";
    let workbench = Workbench::expect_valid(source);
    let unit = workbench
        .transform_model()
        .unit(&QualifiedName::parse("App.G"))
        .unwrap();

    assert_eq!(unit.get("S").unwrap().construction.to_string(), "child[0] as S");
    assert_eq!(
        unit.get("C").unwrap().construction.to_string(),
        "C() {\n      a := child[0]\n      a2 := child[2]\n    }"
    );
}
