//! Structural type model derived from a grammar.
//!
//! One namespace per grammar. Declared rules map to primitive, data or union
//! types; anonymous constructs stay inline as tuple, list and union expressions.

use std::fmt::{self, Write};

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::QualifiedName;

/// Reference to a named type in some namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    pub namespace: QualifiedName,
    pub name: String,
}

impl TypeRef {
    pub fn new(namespace: QualifiedName, name: impl Into<String>) -> Self {
        Self {
            namespace,
            name: name.into(),
        }
    }

    /// Name as seen from `scope`: simple inside its own namespace, qualified elsewhere.
    pub fn display_in(&self, scope: &QualifiedName) -> String {
        if &self.namespace == scope || self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}.{}", self.namespace, self.name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeExpr {
    String,
    Named(TypeRef),
    List(Box<TypeExpr>),
    Tuple(Vec<Property>),
    Union(Vec<TypeExpr>),
    /// Value of an alternative that matched nothing.
    Nothing,
    /// Type could not be inferred.
    Any,
}

impl TypeExpr {
    pub fn render(&self, scope: &QualifiedName) -> String {
        let mut out = String::new();
        self.write_to(&mut out, scope)
            .expect("String write never fails");
        out
    }

    fn write_to(&self, w: &mut impl Write, scope: &QualifiedName) -> fmt::Result {
        match self {
            TypeExpr::String => w.write_str("String"),
            TypeExpr::Named(r) => w.write_str(&r.display_in(scope)),
            TypeExpr::List(element) => {
                w.write_str("List<")?;
                element.write_to(w, scope)?;
                w.write_char('>')
            }
            TypeExpr::Tuple(properties) => {
                w.write_str("tuple {")?;
                for property in properties {
                    w.write_char(' ')?;
                    property.write_to(w, scope)?;
                }
                w.write_str(" }")
            }
            TypeExpr::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        w.write_str(" | ")?;
                    }
                    member.write_to(w, scope)?;
                }
                Ok(())
            }
            TypeExpr::Nothing => w.write_str("Nothing"),
            TypeExpr::Any => w.write_str("Any"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub ty: TypeExpr,
    pub nullable: bool,
    /// Child position of the grammar item this property was derived from.
    pub declared_index: u32,
}

impl Property {
    fn write_to(&self, w: &mut impl Write, scope: &QualifiedName) -> fmt::Result {
        write!(w, "{}: ", self.name)?;
        self.ty.write_to(w, scope)?;
        if self.nullable {
            w.write_char('?')?;
        }
        write!(w, " #{}", self.declared_index)
    }
}

/// Named alias of the string primitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimitiveType {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataType {
    pub name: String,
    pub properties: Vec<Property>,
    pub supertypes: Vec<TypeRef>,
    pub subtypes: Vec<TypeRef>,
}

impl DataType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn add_supertype(&mut self, ty: TypeRef) {
        if !self.supertypes.contains(&ty) {
            self.supertypes.push(ty);
        }
    }

    pub fn add_subtype(&mut self, ty: TypeRef) {
        if !self.subtypes.contains(&ty) {
            self.subtypes.push(ty);
        }
    }
}

/// Alternatives of a choice, one member per alternative ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnionType {
    pub name: String,
    pub members: Vec<TypeExpr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeDecl {
    Primitive(PrimitiveType),
    Data(DataType),
    Union(UnionType),
}

impl TypeDecl {
    pub fn name(&self) -> &str {
        match self {
            TypeDecl::Primitive(t) => &t.name,
            TypeDecl::Data(t) => &t.name,
            TypeDecl::Union(t) => &t.name,
        }
    }

    pub fn as_data(&self) -> Option<&DataType> {
        match self {
            TypeDecl::Data(t) => Some(t),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TypeNamespace {
    pub name: QualifiedName,
    pub imports: IndexSet<QualifiedName>,
    pub types: IndexMap<String, TypeDecl>,
}

impl TypeNamespace {
    pub fn new(name: QualifiedName) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    pub fn get(&self, name: &str) -> Option<&TypeDecl> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Adds a declaration. Returns `false` if the name was already taken.
    pub fn declare(&mut self, decl: TypeDecl) -> bool {
        let name = decl.name().to_owned();
        if self.types.contains_key(&name) {
            return false;
        }
        self.types.insert(name, decl);
        true
    }

    pub fn data_type_mut(&mut self, name: &str) -> Option<&mut DataType> {
        match self.types.get_mut(name) {
            Some(TypeDecl::Data(t)) => Some(t),
            _ => None,
        }
    }

    pub fn add_import(&mut self, namespace: QualifiedName) {
        if namespace != self.name {
            self.imports.insert(namespace);
        }
    }

    pub fn type_ref(&self, name: &str) -> TypeRef {
        TypeRef::new(self.name.clone(), name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TypeModel {
    pub namespaces: IndexMap<QualifiedName, TypeNamespace>,
}

impl TypeModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn namespace(&self, name: &QualifiedName) -> Option<&TypeNamespace> {
        self.namespaces.get(name)
    }

    pub fn namespace_mut(&mut self, name: &QualifiedName) -> Option<&mut TypeNamespace> {
        self.namespaces.get_mut(name)
    }

    /// Inserts or replaces the namespace with the same name.
    pub fn insert_namespace(&mut self, namespace: TypeNamespace) {
        self.namespaces.insert(namespace.name.clone(), namespace);
    }

    pub fn find(&self, ty: &TypeRef) -> Option<&TypeDecl> {
        self.namespaces.get(&ty.namespace)?.get(&ty.name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeNamespace> {
        self.namespaces.values()
    }
}

fn write_refs(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    refs: &[TypeRef],
    scope: &QualifiedName,
) -> fmt::Result {
    if refs.is_empty() {
        return Ok(());
    }
    let names: Vec<_> = refs.iter().map(|r| r.display_in(scope)).collect();
    writeln!(f, "    {label} {}", names.join(", "))
}

impl fmt::Display for TypeNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "namespace {}", self.name)?;
        for import in &self.imports {
            writeln!(f, "  import {import}")?;
        }
        let scope = &self.name;
        for decl in self.types.values() {
            match decl {
                TypeDecl::Primitive(t) => writeln!(f, "  primitive {} = String", t.name)?,
                TypeDecl::Data(t) => {
                    write!(f, "  datatype {}", t.name)?;
                    if !t.supertypes.is_empty() {
                        let names: Vec<_> =
                            t.supertypes.iter().map(|r| r.display_in(scope)).collect();
                        write!(f, " : {}", names.join(", "))?;
                    }
                    writeln!(f, " {{")?;
                    write_refs(f, "subtypes", &t.subtypes, scope)?;
                    for property in &t.properties {
                        let mut line = String::new();
                        property.write_to(&mut line, scope)?;
                        writeln!(f, "    {line}")?;
                    }
                    writeln!(f, "  }}")?;
                }
                TypeDecl::Union(t) => {
                    writeln!(f, "  union {} {{", t.name)?;
                    for member in &t.members {
                        writeln!(f, "    {}", member.render(scope))?;
                    }
                    writeln!(f, "  }}")?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for TypeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, namespace) in self.namespaces.values().enumerate() {
            if i > 0 {
                f.write_char('\n')?;
            }
            write!(f, "{namespace}")?;
        }
        Ok(())
    }
}
