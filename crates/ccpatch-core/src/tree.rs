//! Arena-backed syntax tree
//!
//! Every node lives in one flat arena owned by [`SyntaxTree`] and is addressed
//! by a [`NodeId`]. Parent and child links are plain ids, so replacing a
//! subtree swaps the id held in its parent's slot and marks the old node
//! detached. Detached nodes stay in the arena (ids are never reused) but are
//! no longer reachable from the root.
//!
//! Nodes parsed from the input remember the byte span they occupy. The
//! generator copies that text verbatim and only substitutes children, which is
//! what keeps untouched code byte-identical.

use crate::span::Span;
use std::fmt;

/// Index of a node in its tree's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Fieldless mirror of [`Node`], used for dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,
    Function,
    Block,
    ReturnStatement,
    CallExpression,
    MemberExpression,
    ArrayExpression,
    ConditionalExpression,
    ObjectExpression,
    Parenthesized,
    StringLiteral,
    NullLiteral,
    BooleanLiteral,
    Opaque,
}

/// `key: value` entry of an object literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub key: String,
    pub value: NodeId,
}

impl Property {
    pub fn new(key: impl Into<String>, value: NodeId) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Syntax tree node
///
/// Only the shapes the patch rules look at are modeled. Everything else is an
/// [`Node::Opaque`] region whose children are the modeled nodes nested inside
/// it, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Program {
        body: Vec<NodeId>,
    },
    /// Declarations, expressions, arrows and methods alike
    Function {
        name: Option<String>,
        params: Vec<NodeId>,
        /// A [`Node::Block`], or an expression for concise arrow bodies
        body: NodeId,
    },
    Block {
        statements: Vec<NodeId>,
    },
    ReturnStatement {
        argument: Option<NodeId>,
    },
    CallExpression {
        callee: NodeId,
        arguments: Vec<NodeId>,
    },
    /// Non-computed `object.property` access
    MemberExpression {
        object: NodeId,
        property: String,
    },
    /// `None` entries are holes (`[a, , b]`)
    ArrayExpression {
        elements: Vec<Option<NodeId>>,
    },
    ConditionalExpression {
        test: NodeId,
        consequent: NodeId,
        alternate: NodeId,
    },
    ObjectExpression {
        properties: Vec<Property>,
    },
    Parenthesized {
        expression: NodeId,
    },
    StringLiteral {
        value: String,
    },
    NullLiteral,
    BooleanLiteral {
        value: bool,
    },
    Opaque {
        children: Vec<NodeId>,
    },
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Program { .. } => NodeKind::Program,
            Node::Function { .. } => NodeKind::Function,
            Node::Block { .. } => NodeKind::Block,
            Node::ReturnStatement { .. } => NodeKind::ReturnStatement,
            Node::CallExpression { .. } => NodeKind::CallExpression,
            Node::MemberExpression { .. } => NodeKind::MemberExpression,
            Node::ArrayExpression { .. } => NodeKind::ArrayExpression,
            Node::ConditionalExpression { .. } => NodeKind::ConditionalExpression,
            Node::ObjectExpression { .. } => NodeKind::ObjectExpression,
            Node::Parenthesized { .. } => NodeKind::Parenthesized,
            Node::StringLiteral { .. } => NodeKind::StringLiteral,
            Node::NullLiteral => NodeKind::NullLiteral,
            Node::BooleanLiteral { .. } => NodeKind::BooleanLiteral,
            Node::Opaque { .. } => NodeKind::Opaque,
        }
    }

    /// Child ids in source order
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Node::Program { body } => body.clone(),
            Node::Function { params, body, .. } => {
                let mut children = params.clone();
                children.push(*body);
                children
            }
            Node::Block { statements } => statements.clone(),
            Node::ReturnStatement { argument } => argument.iter().copied().collect(),
            Node::CallExpression { callee, arguments } => {
                let mut children = vec![*callee];
                children.extend(arguments.iter().copied());
                children
            }
            Node::MemberExpression { object, .. } => vec![*object],
            Node::ArrayExpression { elements } => elements.iter().flatten().copied().collect(),
            Node::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => vec![*test, *consequent, *alternate],
            Node::ObjectExpression { properties } => {
                properties.iter().map(|property| property.value).collect()
            }
            Node::Parenthesized { expression } => vec![*expression],
            Node::Opaque { children } => children.clone(),
            Node::StringLiteral { .. } | Node::NullLiteral | Node::BooleanLiteral { .. } => {
                Vec::new()
            }
        }
    }

    fn child_slots_mut(&mut self) -> Vec<&mut NodeId> {
        match self {
            Node::Program { body } => body.iter_mut().collect(),
            Node::Function { params, body, .. } => {
                params.iter_mut().chain(std::iter::once(body)).collect()
            }
            Node::Block { statements } => statements.iter_mut().collect(),
            Node::ReturnStatement { argument } => argument.iter_mut().collect(),
            Node::CallExpression { callee, arguments } => {
                std::iter::once(callee).chain(arguments.iter_mut()).collect()
            }
            Node::MemberExpression { object, .. } => vec![object],
            Node::ArrayExpression { elements } => elements.iter_mut().flatten().collect(),
            Node::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => vec![test, consequent, alternate],
            Node::ObjectExpression { properties } => properties
                .iter_mut()
                .map(|property| &mut property.value)
                .collect(),
            Node::Parenthesized { expression } => vec![expression],
            Node::Opaque { children } => children.iter_mut().collect(),
            Node::StringLiteral { .. } | Node::NullLiteral | Node::BooleanLiteral { .. } => {
                Vec::new()
            }
        }
    }
}

/// Where a node's text comes from when the tree is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Parsed from the input; printed from its source span
    Source,
    /// Built or restructured by a rule; printed from its structure
    Synthetic,
}

#[derive(Debug, Clone)]
struct NodeData {
    node: Node,
    parent: Option<NodeId>,
    span: Span,
    origin: Origin,
    detached: bool,
    replaced_by: Option<NodeId>,
}

/// Parsed program, mutated in place by the patch rules
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    source: String,
    nodes: Vec<NodeData>,
    root: NodeId,
    revision: u64,
    recovered_errors: usize,
    /// Sorted offsets of expression statements that sit in a statement list
    statement_starts: Vec<usize>,
}

impl SyntaxTree {
    /// Tree over `source` whose root is an empty program
    pub(crate) fn new(source: String) -> Self {
        let span = Span::new(0, source.len());
        let mut tree = Self {
            source,
            nodes: Vec::new(),
            root: NodeId(0),
            revision: 0,
            recovered_errors: 0,
            statement_starts: Vec::new(),
        };
        tree.root = tree.push(Node::Program { body: Vec::new() }, span, Origin::Source);
        tree
    }

    pub(crate) fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    pub(crate) fn set_recovered_errors(&mut self, count: usize) {
        self.recovered_errors = count;
    }

    pub(crate) fn set_statement_starts(&mut self, mut starts: Vec<usize>) {
        starts.sort_unstable();
        starts.dedup();
        self.statement_starts = starts;
    }

    /// True when an expression statement in a statement list begins at `offset`
    ///
    /// Text printed there must not start with `[` or `(` right after a line
    /// that lacks a semicolon.
    pub(crate) fn starts_statement(&self, offset: usize) -> bool {
        self.statement_starts.binary_search(&offset).is_ok()
    }

    /// Add a node to the arena and adopt its children
    pub(crate) fn push(&mut self, node: Node, span: Span, origin: Origin) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        for child in node.children() {
            self.nodes[child.index()].parent = Some(id);
        }
        self.nodes.push(NodeData {
            node,
            parent: None,
            span,
            origin,
            detached: false,
            replaced_by: None,
        });
        id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of arena slots, detached nodes included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()].node
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind()
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    pub fn origin(&self, id: NodeId) -> Origin {
        self.nodes[id.index()].origin
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    /// False once the node has been replaced or removed from its parent
    pub fn is_attached(&self, id: NodeId) -> bool {
        !self.nodes[id.index()].detached
    }

    /// Bumped on every structural mutation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of syntax error regions the parser recovered from
    pub fn recovered_errors(&self) -> usize {
        self.recovered_errors
    }

    /// Source text of a parsed node, `None` for synthesized ones
    pub fn source_text(&self, id: NodeId) -> Option<&str> {
        match self.origin(id) {
            Origin::Source => self.source.get(self.span(id).range()),
            Origin::Synthetic => None,
        }
    }

    /// Parent chain from the nearest ancestor up to the root
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&ancestor| self.parent(ancestor))
    }

    /// Nearest ancestor of the given kind
    pub fn enclosing(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.ancestors(id).find(|&ancestor| self.kind(ancestor) == kind)
    }

    /// Look through any number of wrapping parentheses
    pub fn skip_parens(&self, mut id: NodeId) -> NodeId {
        while let Node::Parenthesized { expression } = self.node(id) {
            id = *expression;
        }
        id
    }

    /// Follow replacements to the node currently occupying `id`'s slot
    pub fn resolve(&self, mut id: NodeId) -> NodeId {
        while let Some(next) = self.nodes[id.index()].replaced_by {
            id = next;
        }
        id
    }

    pub fn string_value(&self, id: NodeId) -> Option<&str> {
        match self.node(id) {
            Node::StringLiteral { value } => Some(value),
            _ => None,
        }
    }

    pub fn function_name(&self, id: NodeId) -> Option<&str> {
        match self.node(id) {
            Node::Function { name, .. } => name.as_deref(),
            _ => None,
        }
    }

    /// Allocate a synthesized, unattached node
    pub fn alloc(&mut self, node: Node) -> NodeId {
        self.push(node, Span::default(), Origin::Synthetic)
    }

    pub fn string_literal(&mut self, value: impl Into<String>) -> NodeId {
        self.alloc(Node::StringLiteral {
            value: value.into(),
        })
    }

    pub fn null_literal(&mut self) -> NodeId {
        self.alloc(Node::NullLiteral)
    }

    pub fn boolean_literal(&mut self, value: bool) -> NodeId {
        self.alloc(Node::BooleanLiteral { value })
    }

    pub fn empty_array(&mut self) -> NodeId {
        self.alloc(Node::ArrayExpression {
            elements: Vec::new(),
        })
    }

    pub fn object(&mut self, properties: Vec<Property>) -> NodeId {
        self.alloc(Node::ObjectExpression { properties })
    }

    pub fn return_statement(&mut self, argument: Option<NodeId>) -> NodeId {
        self.alloc(Node::ReturnStatement { argument })
    }

    /// Put `replacement` into the slot `target` occupies
    ///
    /// The replacement inherits the target's span so the enclosing source text
    /// is spliced at the right place. `target` becomes detached and records
    /// where it went, which lets an ongoing walk pick up the replacement.
    pub fn replace(&mut self, target: NodeId, replacement: NodeId) {
        if target == replacement {
            return;
        }
        debug_assert!(self.is_attached(target), "replacing detached node {target}");
        debug_assert!(
            self.parent(replacement).is_none() && replacement != self.root,
            "replacement {replacement} is already attached"
        );

        let parent = self.parent(target);
        match parent {
            Some(parent) => {
                if let Some(slot) = self.nodes[parent.index()]
                    .node
                    .child_slots_mut()
                    .into_iter()
                    .find(|slot| **slot == target)
                {
                    *slot = replacement;
                }
            }
            None => self.root = replacement,
        }

        let span = self.span(target);
        let new = &mut self.nodes[replacement.index()];
        new.parent = parent;
        new.span = span;

        let old = &mut self.nodes[target.index()];
        old.detached = true;
        old.parent = None;
        old.replaced_by = Some(replacement);

        self.revision += 1;
    }

    /// Remove `element` from `array`, keeping the other elements in order
    ///
    /// Returns false when `element` is not a direct element of `array`.
    pub fn remove_element(&mut self, array: NodeId, element: NodeId) -> bool {
        let Node::ArrayExpression { elements } = &mut self.nodes[array.index()].node else {
            return false;
        };
        let Some(position) = elements.iter().position(|slot| *slot == Some(element)) else {
            return false;
        };
        elements.remove(position);

        // The separators no longer line up with the source text
        self.nodes[array.index()].origin = Origin::Synthetic;

        let old = &mut self.nodes[element.index()];
        old.detached = true;
        old.parent = None;

        self.revision += 1;
        true
    }

    /// Replace a function's whole body with a block of `statements`
    ///
    /// Returns the new block, or `None` if `function` is not a function.
    pub fn replace_function_body(
        &mut self,
        function: NodeId,
        statements: Vec<NodeId>,
    ) -> Option<NodeId> {
        let Node::Function { body, .. } = self.node(function) else {
            return None;
        };
        let body = *body;
        let block = self.alloc(Node::Block { statements });
        self.replace(body, block);
        Some(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// `[a, b]` built by hand, with `a` and `b` as string literals
    fn pair_array() -> (SyntaxTree, NodeId, NodeId, NodeId) {
        let mut tree = SyntaxTree::new("[\"a\", \"b\"]".to_string());
        let a = tree.push(
            Node::StringLiteral { value: "a".into() },
            Span::new(1, 4),
            Origin::Source,
        );
        let b = tree.push(
            Node::StringLiteral { value: "b".into() },
            Span::new(6, 9),
            Origin::Source,
        );
        let array = tree.push(
            Node::ArrayExpression {
                elements: vec![Some(a), Some(b)],
            },
            Span::new(0, 10),
            Origin::Source,
        );
        let program = tree.push(
            Node::Program { body: vec![array] },
            Span::new(0, 10),
            Origin::Source,
        );
        tree.set_root(program);
        (tree, array, a, b)
    }

    #[test]
    fn test_push_adopts_children() {
        let (tree, array, a, b) = pair_array();
        assert_eq!(tree.parent(a), Some(array));
        assert_eq!(tree.parent(b), Some(array));
        assert_eq!(tree.parent(array), Some(tree.root()));
        assert_eq!(tree.parent(tree.root()), None);
    }

    #[test]
    fn test_ancestors_and_enclosing() {
        let (tree, array, a, _) = pair_array();
        let chain: Vec<_> = tree.ancestors(a).collect();
        assert_eq!(chain, vec![array, tree.root()]);
        assert_eq!(tree.enclosing(a, NodeKind::ArrayExpression), Some(array));
        assert_eq!(tree.enclosing(a, NodeKind::Function), None);
    }

    #[test]
    fn test_replace_swaps_slot_and_inherits_span() {
        let (mut tree, array, a, b) = pair_array();
        let revision = tree.revision();
        let null = tree.null_literal();
        tree.replace(a, null);

        assert_eq!(
            tree.node(array),
            &Node::ArrayExpression {
                elements: vec![Some(null), Some(b)]
            }
        );
        assert_eq!(tree.parent(null), Some(array));
        assert_eq!(tree.span(null), Span::new(1, 4));
        assert!(!tree.is_attached(a));
        assert_eq!(tree.resolve(a), null);
        assert!(tree.revision() > revision);
    }

    #[test]
    fn test_remove_element_keeps_order() {
        let (mut tree, array, a, b) = pair_array();
        assert!(tree.remove_element(array, a));
        assert_eq!(
            tree.node(array),
            &Node::ArrayExpression {
                elements: vec![Some(b)]
            }
        );
        assert_eq!(tree.origin(array), Origin::Synthetic);
        assert!(!tree.is_attached(a));
        assert!(!tree.remove_element(array, a));
    }

    #[test]
    fn test_replace_root() {
        let (mut tree, _, _, _) = pair_array();
        let old_root = tree.root();
        let program = tree.alloc(Node::Program { body: Vec::new() });
        tree.replace(old_root, program);
        assert_eq!(tree.root(), program);
        assert!(!tree.is_attached(old_root));
    }

    #[test]
    fn test_skip_parens() {
        let mut tree = SyntaxTree::new(String::new());
        let inner = tree.null_literal();
        let once = tree.alloc(Node::Parenthesized { expression: inner });
        let twice = tree.alloc(Node::Parenthesized { expression: once });
        assert_eq!(tree.skip_parens(twice), inner);
        assert_eq!(tree.skip_parens(inner), inner);
    }
}
