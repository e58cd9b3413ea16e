use crate::{IndexPath, QualifiedName};

#[test]
fn qualified_name_parse_and_display() {
    let name = QualifiedName::parse("net.example.Expr");
    assert_eq!(name.parts().len(), 3);
    assert_eq!(name.last(), Some("Expr"));
    assert_eq!(name.parent().to_string(), "net.example");
    assert_eq!(name.to_string(), "net.example.Expr");
}

#[test]
fn qualified_name_drops_empty_segments() {
    let name = QualifiedName::parse(".a..b.");
    assert_eq!(name.to_string(), "a.b");
    assert!(QualifiedName::parse("").is_empty());
}

#[test]
fn qualified_name_child_and_parent_of_simple() {
    let name = QualifiedName::parse("G");
    assert!(!name.is_qualified());
    assert!(name.parent().is_empty());
    assert_eq!(QualifiedName::default().child("G"), name);
}

#[test]
fn qualified_name_serializes_as_string() {
    let name = QualifiedName::parse("a.b");
    let json = serde_json::to_string(&name).unwrap();
    assert_eq!(json, r#""a.b""#);
    let back: QualifiedName = serde_json::from_str(&json).unwrap();
    assert_eq!(back, name);
}

#[test]
fn index_path_children() {
    let root = IndexPath::root();
    let nested = root.child(2).child(0);
    assert_eq!(nested.to_string(), "[0,2,0]");
    assert_eq!(nested.last(), 0);
    assert_eq!(nested.depth(), 3);
    assert_eq!(root.child(2).last(), 2);
}
