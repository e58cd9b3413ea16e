//! Transform model: per-rule construction of semantic values.
//!
//! Expressions are evaluated against a parse-tree node (`$self`). The printed
//! form is the transform override syntax, so a dumped model can be edited and
//! fed back as an override.

use std::fmt::{self, Write};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::QualifiedName;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    /// `child[i]`
    ChildAt(u32),
    /// `children`
    Children,
    /// `children.items`: list elements without separators.
    ChildrenItems,
    /// `with(inner) body`: evaluate `body` with `inner` as `$self`.
    With { inner: Box<Expr>, body: Box<Expr> },
    /// `when { i == $alternative -> e ... else -> e }`
    When {
        branches: Vec<WhenBranch>,
        otherwise: Box<Expr>,
    },
    /// `tuple { f := e ... }`
    Tuple(Vec<Assignment>),
    /// `$self`
    SelfRef,
    /// `$nothing`
    Nothing,
    /// `e as T`
    Cast { expr: Box<Expr>, type_name: String },
}

impl Expr {
    pub fn with(inner: Expr, body: Expr) -> Self {
        Expr::With {
            inner: Box::new(inner),
            body: Box::new(body),
        }
    }

    pub fn cast(expr: Expr, type_name: impl Into<String>) -> Self {
        Expr::Cast {
            expr: Box::new(expr),
            type_name: type_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub property: String,
    pub expr: Expr,
}

impl Assignment {
    pub fn new(property: impl Into<String>, expr: Expr) -> Self {
        Self {
            property: property.into(),
            expr,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhenBranch {
    /// 0-based ordinal of the alternative matched during parsing.
    pub alternative: u32,
    pub expr: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Construction {
    CreateObject {
        type_name: String,
        assignments: Vec<Assignment>,
    },
    PassThrough(Expr),
    SubtypeDispatch {
        type_name: String,
    },
    UnionDispatch {
        type_name: String,
        branches: Vec<WhenBranch>,
        otherwise: Expr,
    },
    LeafString,
}

pub const STRING_TYPE: &str = "String";

impl Construction {
    /// Recognize the printed forms of the dispatch and leaf constructions.
    ///
    /// `child[0] as T` is a subtype dispatch, `when {..} as T` a union
    /// dispatch and `$self as String` a leaf string; anything else passes
    /// its value through.
    pub fn from_expr(expr: Expr) -> Self {
        match expr {
            Expr::Cast { expr, type_name } => match *expr {
                Expr::ChildAt(0) => Construction::SubtypeDispatch { type_name },
                Expr::When {
                    branches,
                    otherwise,
                } => Construction::UnionDispatch {
                    type_name,
                    branches,
                    otherwise: *otherwise,
                },
                Expr::SelfRef if type_name == STRING_TYPE => Construction::LeafString,
                expr => Construction::PassThrough(Expr::Cast {
                    expr: Box::new(expr),
                    type_name,
                }),
            },
            expr => Construction::PassThrough(expr),
        }
    }

    /// Type constructed or dispatched over, if the construction names one.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Construction::CreateObject { type_name, .. }
            | Construction::SubtypeDispatch { type_name }
            | Construction::UnionDispatch { type_name, .. } => Some(type_name),
            Construction::PassThrough(_) | Construction::LeafString => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformOrigin {
    /// Derived from the grammar.
    Generated,
    /// Supplied in an override fragment.
    User,
    /// Generated on demand for a rule an override scope left out.
    Synthesized,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformRule {
    /// Grammar rule the construction applies to.
    pub rule: String,
    pub construction: Construction,
    pub origin: TransformOrigin,
}

/// Transform rules of one grammar.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransformUnit {
    pub grammar: QualifiedName,
    /// Type namespace the constructed types live in.
    pub type_namespace: QualifiedName,
    pub rules: IndexMap<String, TransformRule>,
}

impl TransformUnit {
    pub fn new(grammar: QualifiedName, type_namespace: QualifiedName) -> Self {
        Self {
            grammar,
            type_namespace,
            rules: IndexMap::new(),
        }
    }

    pub fn get(&self, rule: &str) -> Option<&TransformRule> {
        self.rules.get(rule)
    }

    /// Inserts a rule, replacing any rule for the same grammar rule in place.
    pub fn insert(&mut self, rule: TransformRule) {
        self.rules.insert(rule.rule.clone(), rule);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransformModel {
    pub units: IndexMap<QualifiedName, TransformUnit>,
}

impl TransformModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unit(&self, grammar: &QualifiedName) -> Option<&TransformUnit> {
        self.units.get(grammar)
    }

    pub fn insert_unit(&mut self, unit: TransformUnit) {
        self.units.insert(unit.grammar.clone(), unit);
    }

    /// Construction rule for `rule` in `grammar`.
    pub fn find(&self, grammar: &QualifiedName, rule: &str) -> Option<&TransformRule> {
        self.units.get(grammar)?.get(rule)
    }
}

fn write_assignments(f: &mut impl Write, assignments: &[Assignment]) -> fmt::Result {
    for assignment in assignments {
        write!(f, " {} := {}", assignment.property, assignment.expr)?;
    }
    Ok(())
}

fn write_when(f: &mut impl Write, branches: &[WhenBranch], otherwise: &Expr) -> fmt::Result {
    f.write_str("when {")?;
    for branch in branches {
        write!(f, " {} == $alternative -> {}", branch.alternative, branch.expr)?;
    }
    write!(f, " else -> {otherwise} }}")
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::ChildAt(i) => write!(f, "child[{i}]"),
            Expr::Children => f.write_str("children"),
            Expr::ChildrenItems => f.write_str("children.items"),
            Expr::With { inner, body } => write!(f, "with({inner}) {body}"),
            Expr::When {
                branches,
                otherwise,
            } => write_when(f, branches, otherwise),
            Expr::Tuple(fields) => {
                f.write_str("tuple {")?;
                write_assignments(f, fields)?;
                f.write_str(" }")
            }
            Expr::SelfRef => f.write_str("$self"),
            Expr::Nothing => f.write_str("$nothing"),
            Expr::Cast { expr, type_name } => {
                // `with` bodies extend to the right, so the cast must not be absorbed
                if matches!(**expr, Expr::With { .. }) {
                    write!(f, "({expr}) as {type_name}")
                } else {
                    write!(f, "{expr} as {type_name}")
                }
            }
        }
    }
}

impl fmt::Display for Construction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Construction::CreateObject {
                type_name,
                assignments,
            } => {
                write!(f, "{type_name}() {{")?;
                for assignment in assignments {
                    write!(f, "\n      {} := {}", assignment.property, assignment.expr)?;
                }
                if !assignments.is_empty() {
                    f.write_str("\n    ")?;
                }
                f.write_char('}')
            }
            Construction::PassThrough(expr) => write!(f, "{expr}"),
            Construction::SubtypeDispatch { type_name } => write!(f, "child[0] as {type_name}"),
            Construction::UnionDispatch {
                type_name,
                branches,
                otherwise,
            } => {
                write_when(f, branches, otherwise)?;
                write!(f, " as {type_name}")
            }
            Construction::LeafString => write!(f, "$self as {STRING_TYPE}"),
        }
    }
}

impl fmt::Display for TransformUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.grammar.last().unwrap_or_default();
        writeln!(f, "  transform {name} {{")?;
        for rule in self.rules.values() {
            writeln!(f, "    {} : {}", rule.rule, rule.construction)?;
        }
        writeln!(f, "  }}")
    }
}

impl fmt::Display for TransformModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut current: Option<QualifiedName> = None;
        for unit in self.units.values() {
            let namespace = unit.grammar.parent();
            if current.as_ref() != Some(&namespace) {
                if !namespace.is_empty() {
                    writeln!(f, "namespace {namespace}")?;
                }
                current = Some(namespace);
            }
            write!(f, "{unit}")?;
        }
        Ok(())
    }
}
