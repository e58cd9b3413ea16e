//! Shape classification shared by the type and transform derivers.
//!
//! Every declared rule is classified once into a [`RuleShape`]. Values are
//! described relative to a parse node: [`Value::Child`] steps into the `i`-th
//! structural child, [`Value::Node`] is the value of the node itself. The type
//! deriver turns values into type expressions and the transform deriver into
//! expressions, so both stay in step.

use indexmap::{IndexMap, IndexSet};
use weft_core::QualifiedName;
use weft_core::utils::{numbered_name, to_pascal_case};

use crate::grammar::GrammarId;
use crate::normalize::{GraphItem, GraphItemId, GraphRuleId, RuleGraph};

/// Value of a parse node, before stepping into children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeValue {
    /// Matched text.
    Text,
    /// The value constructed by a declared rule.
    Rule(GraphRuleId),
    /// The goal rule of another grammar.
    Embedded {
        grammar: Option<GrammarId>,
        grammar_name: QualifiedName,
        goal: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Node(NodeValue),
    Child(u32, Box<Value>),
    Optional(Box<Value>),
    Children { element: Box<Value>, separated: bool },
    Tuple(Vec<Field>),
    /// One value per alternative ordinal of a choice.
    Alternatives(Vec<(u32, Value)>),
    Nothing,
}

impl Value {
    fn child(index: usize, value: Value) -> Value {
        Value::Child(index as u32, Box::new(value))
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            Value::Optional(_) => true,
            Value::Child(_, inner) => inner.is_nullable(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: Value,
    pub nullable: bool,
    /// Structural child index of the item the field derives from.
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleShape {
    Leaf,
    /// A string with no structure of its own.
    Primitive,
    Data(Vec<Field>),
    /// A choice over data rules; the members become subtypes.
    Supertype(Vec<GraphRuleId>),
    Union(Vec<(u32, Value)>),
}

/// Shapes and type names of a rule graph's declared rules.
#[derive(Debug, Clone, Default)]
pub struct Shapes {
    shapes: IndexMap<GraphRuleId, RuleShape>,
    type_names: IndexMap<GraphRuleId, String>,
    pseudo_values: IndexMap<GraphRuleId, Value>,
}

impl Shapes {
    pub fn classify(graph: &RuleGraph) -> Self {
        let mut classifier = Classifier {
            graph,
            states: vec![State::Pending; graph.rules().len()],
        };

        let mut shapes = IndexMap::new();
        for id in graph.declared() {
            if graph.rule(id).is_skip {
                continue;
            }
            shapes.insert(id, classifier.classify(id));
        }
        classifier.break_supertype_cycles(&mut shapes);

        let mut pseudo_values = IndexMap::new();
        for id in graph.rule_ids() {
            if graph.rule(id).is_pseudo() && !graph.is_inside_token_rule(id) {
                let rhs = graph.rule(id).rhs;
                let value = classifier.construct_value(rhs).unwrap_or(Value::Nothing);
                pseudo_values.insert(id, value);
            }
        }

        let type_names = type_names(graph, &shapes);
        tracing::debug!(rules = shapes.len(), "classified rule shapes");
        Self {
            shapes,
            type_names,
            pseudo_values,
        }
    }

    /// Shape of a declared, non-skip rule.
    pub fn shape(&self, id: GraphRuleId) -> Option<&RuleShape> {
        self.shapes.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (GraphRuleId, &RuleShape)> {
        self.shapes.iter().map(|(&id, shape)| (id, shape))
    }

    /// Type name of a declared rule that produces a type.
    pub fn type_name(&self, id: GraphRuleId) -> Option<&str> {
        self.type_names.get(&id).map(String::as_str)
    }

    /// Value a pseudo-rule passes through to its parent.
    pub fn pseudo_value(&self, id: GraphRuleId) -> Option<&Value> {
        self.pseudo_values.get(&id)
    }
}

/// Pascal-cased rule names, numbered when two rules collide.
fn type_names(
    graph: &RuleGraph,
    shapes: &IndexMap<GraphRuleId, RuleShape>,
) -> IndexMap<GraphRuleId, String> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    let mut names = IndexMap::new();
    for (&id, shape) in shapes {
        if matches!(shape, RuleShape::Leaf) {
            continue;
        }
        let base = to_pascal_case(&graph.rule(id).name);
        let count = counts.entry(base.clone()).or_insert(0);
        *count += 1;
        names.insert(id, numbered_name(&base, *count));
    }
    names
}

#[derive(Debug, Clone)]
enum State {
    Pending,
    InProgress,
    Done(RuleShape),
}

struct Classifier<'g> {
    graph: &'g RuleGraph,
    states: Vec<State>,
}

impl Classifier<'_> {
    fn classify(&mut self, id: GraphRuleId) -> RuleShape {
        match &self.states[id.index()] {
            State::Done(shape) => return shape.clone(),
            // Callers treat an in-progress rule as a deferred named reference.
            State::InProgress => return RuleShape::Data(Vec::new()),
            State::Pending => {}
        }
        self.states[id.index()] = State::InProgress;

        let rule = self.graph.rule(id);
        let shape = if rule.is_leaf {
            RuleShape::Leaf
        } else {
            self.classify_rhs(rule.rhs)
        };

        tracing::trace!(rule = %rule.name, ?shape, "classified rule");
        self.states[id.index()] = State::Done(shape.clone());
        shape
    }

    fn is_in_progress(&self, id: GraphRuleId) -> bool {
        matches!(self.states[id.index()], State::InProgress)
    }

    fn classify_rhs(&mut self, rhs: GraphItemId) -> RuleShape {
        match self.graph.item(rhs) {
            GraphItem::Choice { alternatives, .. } => self.classify_choice(alternatives),
            GraphItem::Terminal(_) => RuleShape::Primitive,
            GraphItem::NonTerminal { .. } if self.is_primitive(rhs) => RuleShape::Primitive,
            GraphItem::NonTerminal { .. } => {
                RuleShape::Data(self.single_field(rhs).into_iter().collect())
            }
            GraphItem::Concatenation(items) => RuleShape::Data(self.fields(items)),
            GraphItem::Empty => RuleShape::Data(Vec::new()),
            GraphItem::Optional(_)
            | GraphItem::Group(_)
            | GraphItem::List { .. }
            | GraphItem::SeparatedList { .. }
            | GraphItem::Embedded { .. } => {
                let field = self.construct_value(rhs).map(|value| Field {
                    name: self.construct_name(rhs),
                    nullable: value.is_nullable(),
                    value,
                    index: 0,
                });
                RuleShape::Data(field.into_iter().collect())
            }
        }
    }

    fn classify_choice(&mut self, alternatives: &[GraphItemId]) -> RuleShape {
        let flattened = self.flatten_choice(alternatives);

        if flattened.iter().all(|&alt| self.is_primitive(alt)) {
            return RuleShape::Primitive;
        }

        let mut members = Vec::new();
        let mut all_data = true;
        for &alt in &flattened {
            match self.declared_target(alt) {
                Some(target) if self.is_data_like(target) => {
                    if !members.contains(&target) {
                        members.push(target);
                    }
                }
                _ => {
                    all_data = false;
                    break;
                }
            }
        }
        if all_data {
            return RuleShape::Supertype(members);
        }

        self.union_of(alternatives)
    }

    fn union_of(&mut self, alternatives: &[GraphItemId]) -> RuleShape {
        RuleShape::Union(
            alternatives
                .iter()
                .enumerate()
                .map(|(i, &alt)| (i as u32, self.alternative_value(alt)))
                .collect(),
        )
    }

    /// Alternatives with lifted sub-choices spliced in.
    fn flatten_choice(&self, alternatives: &[GraphItemId]) -> Vec<GraphItemId> {
        let mut flattened = Vec::new();
        for &alt in alternatives {
            match self.sub_choice(alt) {
                Some(inner) => flattened.extend(self.flatten_choice(inner)),
                None => flattened.push(alt),
            }
        }
        flattened
    }

    /// Alternatives of a lifted choice, seen through a parenthesized group.
    fn sub_choice(&self, item: GraphItemId) -> Option<&[GraphItemId]> {
        let target = self.pseudo_target(item)?;
        match self.graph.item(self.graph.rule(target).rhs) {
            GraphItem::Choice { alternatives, .. } => Some(alternatives.as_slice()),
            GraphItem::Group(content) => match self.graph.item(*content) {
                GraphItem::Choice { alternatives, .. } => Some(alternatives.as_slice()),
                _ => self.sub_choice(*content),
            },
            _ => None,
        }
    }

    /// Demote supertypes that would become their own ancestor to unions.
    ///
    /// A choice member met while in progress is accepted as data, so mutually
    /// recursive choices can end up as supertypes of each other. Rules on such
    /// a cycle fall back to unions, and so does every supertype left with a
    /// member that is no longer data.
    fn break_supertype_cycles(&mut self, shapes: &mut IndexMap<GraphRuleId, RuleShape>) {
        let mut demoted: Vec<GraphRuleId> = shapes
            .keys()
            .copied()
            .filter(|&id| reaches_itself(id, shapes))
            .collect();

        while !demoted.is_empty() {
            for &id in &demoted {
                let shape = match self.graph.item(self.graph.rule(id).rhs) {
                    GraphItem::Choice { alternatives, .. } => {
                        let alternatives = alternatives.clone();
                        self.union_of(&alternatives)
                    }
                    _ => RuleShape::Data(Vec::new()),
                };
                tracing::trace!(rule = %self.graph.rule(id).name, "supertype cycle, using a union");
                self.states[id.index()] = State::Done(shape.clone());
                shapes.insert(id, shape);
            }

            demoted = shapes
                .iter()
                .filter_map(|(&id, shape)| match shape {
                    RuleShape::Supertype(members)
                        if members.iter().any(|member| {
                            !matches!(
                                shapes.get(member),
                                Some(RuleShape::Data(_) | RuleShape::Supertype(_))
                            )
                        }) =>
                    {
                        Some(id)
                    }
                    _ => None,
                })
                .collect();
        }
    }

    fn pseudo_target(&self, item: GraphItemId) -> Option<GraphRuleId> {
        self.graph
            .target(item)
            .filter(|&target| self.graph.rule(target).is_pseudo())
    }

    fn declared_target(&self, item: GraphItemId) -> Option<GraphRuleId> {
        self.graph.target(item).filter(|&target| {
            let rule = self.graph.rule(target);
            !rule.is_pseudo() && !rule.is_skip
        })
    }

    fn is_data_like(&mut self, id: GraphRuleId) -> bool {
        if self.is_in_progress(id) {
            return true;
        }
        matches!(
            self.classify(id),
            RuleShape::Data(_) | RuleShape::Supertype(_)
        )
    }

    /// Whether an item only ever yields text.
    fn is_primitive(&mut self, item: GraphItemId) -> bool {
        match self.graph.item(item) {
            GraphItem::Terminal(_) | GraphItem::Empty => true,
            GraphItem::NonTerminal { target: None, .. } => true,
            GraphItem::NonTerminal {
                target: Some(target),
                ..
            } => {
                let target = *target;
                let rule = self.graph.rule(target);
                if rule.is_leaf || rule.is_skip {
                    return true;
                }
                if rule.is_pseudo() {
                    return match self.graph.item(rule.rhs) {
                        GraphItem::Choice { alternatives, .. } => {
                            let alternatives = alternatives.clone();
                            alternatives.iter().all(|&alt| self.is_primitive(alt))
                        }
                        _ => false,
                    };
                }
                if self.is_in_progress(target) {
                    return false;
                }
                matches!(self.classify(target), RuleShape::Primitive | RuleShape::Leaf)
            }
            GraphItem::Concatenation(items) => {
                let items = items.clone();
                self.fields(&items).is_empty()
            }
            _ => false,
        }
    }

    /// Value of the node at `item`, or `None` when it carries no information.
    fn item_value(&mut self, item: GraphItemId) -> Option<Value> {
        match self.graph.item(item) {
            GraphItem::Terminal(terminal) if terminal.is_pattern => {
                Some(Value::Node(NodeValue::Text))
            }
            GraphItem::Terminal(_) | GraphItem::Empty => None,
            GraphItem::NonTerminal { target, .. } => {
                let target = (*target)?;
                let rule = self.graph.rule(target);
                if rule.is_skip {
                    None
                } else if rule.is_leaf {
                    Some(Value::Node(NodeValue::Text))
                } else if rule.is_pseudo() {
                    self.construct_value(rule.rhs)
                } else {
                    Some(Value::Node(NodeValue::Rule(target)))
                }
            }
            GraphItem::Concatenation(items) => {
                let items = items.clone();
                let fields = self.fields(&items);
                (!fields.is_empty()).then_some(Value::Tuple(fields))
            }
            _ => self.construct_value(item),
        }
    }

    /// Value of an optional, group, list, choice or embedded node.
    fn construct_value(&mut self, item: GraphItemId) -> Option<Value> {
        match self.graph.item(item).clone() {
            GraphItem::Optional(inner) => {
                let value = self.item_value(inner)?;
                Some(Value::Optional(Box::new(Value::child(0, value))))
            }
            GraphItem::Group(content) => self.group_value(content),
            GraphItem::List { item, .. } => {
                let element = self.item_value(item)?;
                Some(Value::Children {
                    element: Box::new(element),
                    separated: false,
                })
            }
            GraphItem::SeparatedList { item, .. } => {
                let element = self.item_value(item)?;
                Some(Value::Children {
                    element: Box::new(element),
                    separated: true,
                })
            }
            GraphItem::Choice { alternatives, .. } => {
                if alternatives.iter().all(|&alt| self.is_primitive(alt)) {
                    return Some(Value::child(0, Value::Node(NodeValue::Text)));
                }
                Some(Value::Alternatives(
                    alternatives
                        .iter()
                        .enumerate()
                        .map(|(i, &alt)| (i as u32, self.alternative_value(alt)))
                        .collect(),
                ))
            }
            GraphItem::Embedded {
                grammar,
                grammar_name,
                goal,
            } => Some(Value::child(
                0,
                Value::Node(NodeValue::Embedded {
                    grammar,
                    grammar_name,
                    goal,
                }),
            )),
            GraphItem::Terminal(_)
            | GraphItem::NonTerminal { .. }
            | GraphItem::Concatenation(_)
            | GraphItem::Empty => self.item_value(item),
        }
    }

    /// A group with exactly one information-bearing child degenerates to it.
    fn group_value(&mut self, content: GraphItemId) -> Option<Value> {
        match self.graph.item(content) {
            GraphItem::Concatenation(items) => {
                let items = items.clone();
                let mut fields = self.fields(&items);
                match fields.len() {
                    0 => None,
                    1 => Some(Value::child(0, fields.remove(0).value)),
                    _ => Some(Value::child(0, Value::Tuple(fields))),
                }
            }
            _ => {
                let value = self.item_value(content)?;
                Some(Value::child(0, value))
            }
        }
    }

    /// Value of one alternative, evaluated against the choice node.
    fn alternative_value(&mut self, alt: GraphItemId) -> Value {
        match self.graph.item(alt) {
            GraphItem::Terminal(_) => Value::child(0, Value::Node(NodeValue::Text)),
            GraphItem::Concatenation(items) => {
                let items = items.clone();
                let fields = self.fields(&items);
                if fields.is_empty() {
                    Value::Nothing
                } else {
                    Value::Tuple(fields)
                }
            }
            _ => self
                .item_value(alt)
                .map_or(Value::Nothing, |value| Value::child(0, value)),
        }
    }

    fn single_field(&mut self, item: GraphItemId) -> Option<Field> {
        let value = self.item_value(item)?;
        Some(Field {
            name: self.field_name(item),
            nullable: value.is_nullable(),
            value: Value::child(0, value),
            index: 0,
        })
    }

    /// One field per information-bearing item of a sequence.
    fn fields(&mut self, items: &[GraphItemId]) -> Vec<Field> {
        let mut counts: IndexMap<String, usize> = IndexMap::new();
        let mut fields = Vec::new();
        for (i, &item) in items.iter().enumerate() {
            let Some(value) = self.item_value(item) else {
                continue;
            };
            let base = self.field_name(item);
            let count = counts.entry(base.clone()).or_insert(0);
            *count += 1;
            fields.push(Field {
                name: numbered_name(&base, *count),
                nullable: value.is_nullable(),
                value: Value::child(i, value),
                index: i as u32,
            });
        }
        fields
    }

    fn field_name(&mut self, item: GraphItemId) -> String {
        match self.graph.item(item) {
            GraphItem::Terminal(_) | GraphItem::Empty => "$value".to_owned(),
            GraphItem::NonTerminal { name, target } => match target {
                Some(target) if self.graph.rule(*target).is_pseudo() => {
                    let rhs = self.graph.rule(*target).rhs;
                    self.construct_name(rhs)
                }
                _ => name.clone(),
            },
            GraphItem::Concatenation(_) => "$group".to_owned(),
            _ => self.construct_name(item),
        }
    }

    fn construct_name(&mut self, item: GraphItemId) -> String {
        match self.graph.item(item) {
            GraphItem::Optional(inner)
            | GraphItem::List { item: inner, .. }
            | GraphItem::SeparatedList { item: inner, .. } => {
                let inner = *inner;
                self.field_name(inner)
            }
            GraphItem::Group(content) => {
                let content = *content;
                match self.graph.item(content) {
                    GraphItem::Concatenation(items) => {
                        let items = items.clone();
                        let fields = self.fields(&items);
                        match fields.as_slice() {
                            [single] => single.name.clone(),
                            _ => "$group".to_owned(),
                        }
                    }
                    _ => self.field_name(content),
                }
            }
            GraphItem::Choice { .. } => "$choice".to_owned(),
            GraphItem::Embedded { goal, .. } => goal.clone(),
            GraphItem::Terminal(_)
            | GraphItem::NonTerminal { .. }
            | GraphItem::Concatenation(_)
            | GraphItem::Empty => self.field_name(item),
        }
    }
}

/// Whether `start` is among the transitive members of its own supertype shape.
fn reaches_itself(start: GraphRuleId, shapes: &IndexMap<GraphRuleId, RuleShape>) -> bool {
    let mut seen = IndexSet::new();
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        let Some(RuleShape::Supertype(members)) = shapes.get(&id) else {
            continue;
        };
        for &member in members {
            if member == start {
                return true;
            }
            if seen.insert(member) {
                stack.push(member);
            }
        }
    }
    false
}
