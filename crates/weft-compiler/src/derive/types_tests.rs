use crate::Workbench;
use crate::shot_types;

#[test]
fn supertype_links_members() {
    shot_types!(r#"
        grammar G {
            S = A | B ;
            A = 'a' x ;
            B = 'b' x x ;
            x = "[a-z]+" ;
        }
    "#, @r"
    namespace G
      datatype S {
        subtypes A, B
      }
      datatype A : S {
        x: X #1
      }
      datatype B : S {
        x: X #1
        x2: X #2
      }
      primitive X = String
    ");
}

#[test]
fn group_of_literals_has_no_property() {
    shot_types!(r#"
        grammar G {
            S = ('b' 'c' 'd') ;
            T = (b c d) ;
            leaf b = "b" ;
            leaf c = "c" ;
            leaf d = "d" ;
        }
    "#, @r"
    namespace G
      datatype S {
      }
      datatype T {
        $group: tuple { b: String #0 c: String #1 d: String #2 } #0
      }
    ");
}

#[test]
fn mixed_choice_is_union() {
    shot_types!(r#"
        grammar G {
            S = a | S1 ;
            S1 = S a ;
            leaf a = "[a-z]+" ;
        }
    "#, @r"
    namespace G
      union S {
        String
        S1
      }
      datatype S1 {
        S: S #0
        a: String #1
      }
    ");
}

#[test]
fn optional_and_list_properties() {
    shot_types!(r#"
        grammar G {
            S = name args? ;
            args = '(' [name / ',']* ')' ;
            leaf name = "[a-z]+" ;
        }
    "#, @r"
    namespace G
      datatype S {
        name: String #0
        args: Args? #1
      }
      datatype Args {
        name: List<String> #1
      }
    ");
}

#[test]
fn embedded_goal_type_is_imported() {
    shot_types!(r#"
        grammar Lib { e = a ; leaf a = "x" ; }
        grammar G { S = Lib::e ';' ; }
    "#, @r"
    namespace G
      import Lib
      datatype S {
        e: Lib.E #0
      }
    ");
}

#[test]
fn embedded_leaf_goal_is_string() {
    shot_types!(r#"
        grammar Lib { leaf e = "x" ; }
        grammar G { S = Lib::e ; }
    "#, @r"
    namespace G
      datatype S {
        e: String #0
      }
    ");
}

#[test]
fn derivation_is_deterministic() {
    let source = r#"grammar G { S = A | B ; A = 'a' x ; B = x? ; leaf x = "x" ; }"#;

    assert_eq!(
        Workbench::expect_valid_types(source),
        Workbench::expect_valid_types(source)
    );
}

#[test]
fn parenthesized_sub_choice_joins_supertype() {
    shot_types!(r#"
        grammar G {
            S = A | (B | C) ;
            A = a a ;
            B = a a a ;
            C = a 'c' a ;
            leaf a = 'a' ;
        }
    "#, @r"
    namespace G
      datatype S {
        subtypes A, B, C
      }
      datatype A : S {
        a: String #0
        a2: String #1
      }
      datatype B : S {
        a: String #0
        a2: String #1
        a3: String #2
      }
      datatype C : S {
        a: String #0
        a2: String #2
      }
    ");
}

#[test]
fn mutually_recursive_choices_have_no_supertype_cycle() {
    shot_types!(r#"
        grammar G {
            S = A | B ;
            A = S | B ;
            B = b b ;
            leaf b = 'b' ;
        }
    "#, @r"
    namespace G
      union S {
        A
        B
      }
      union A {
        S
        B
      }
      datatype B {
        b: String #0
        b2: String #1
      }
    ");
}

#[test]
fn type_derivation_is_deterministic() {
    let source = r#"grammar G { S = a (',' a)* (b c)? ; leaf a = "a" ; b = 'x' | S ; c = T | S ; T = a S ; }"#;

    let first = Workbench::expect_valid(source);
    let second = Workbench::expect_valid(source);
    assert_eq!(first.type_model(), second.type_model());
    assert_eq!(
        Workbench::expect_valid_types(source),
        Workbench::expect_valid_types(source)
    );
}
