//! JavaScript parsing
//!
//! Parsing is delegated to tree-sitter's JavaScript grammar. The concrete
//! syntax tree it produces is lowered into the arena [`SyntaxTree`]: the node
//! kinds the patch rules inspect become typed [`Node`]s, and every other
//! construct becomes an [`Node::Opaque`] region that the generator reproduces
//! verbatim. Constructs that contain nothing typed are not materialized at all.
//!
//! The grammar recovers from local syntax errors. A file is only rejected when
//! not a single top-level statement survived recovery.

pub(crate) mod literals;

use crate::span::Span;
use crate::tree::{Node, NodeId, Origin, SyntaxTree};
use thiserror::Error;
use tracing::{debug, warn};

/// Failure to produce a usable syntax tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Failed to load the JavaScript grammar: {0}")]
    Grammar(String),

    #[error("Parser produced no syntax tree")]
    NoTree,

    #[error("Unrecoverable syntax error at line {line}, column {column}")]
    Unrecoverable { line: usize, column: usize },
}

/// Parse JavaScript source into a [`SyntaxTree`]
pub fn parse(source: &str) -> Result<SyntaxTree, ParseError> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_javascript::LANGUAGE.into())
        .map_err(|e| ParseError::Grammar(e.to_string()))?;
    let parsed = parser.parse(source, None).ok_or(ParseError::NoTree)?;
    let root = parsed.root_node();

    if root.has_error() && !has_clean_statement(root) {
        let (line, column) = first_error(root)
            .map(|node| {
                let point = node.start_position();
                (point.row + 1, point.column + 1)
            })
            .unwrap_or((1, 1));
        return Err(ParseError::Unrecoverable { line, column });
    }

    let mut lowering = Lowering::new(source);
    let body = lowering.lower_children(root);
    let mut tree = lowering.tree;
    tree.set_statement_starts(lowering.statement_starts);
    let program = tree.push(
        Node::Program { body },
        Span::new(0, source.len()),
        Origin::Source,
    );
    tree.set_root(program);

    let errors = if root.has_error() { count_errors(root) } else { 0 };
    tree.set_recovered_errors(errors);
    if errors > 0 {
        warn!(
            errors,
            "recovered from syntax errors; affected regions are kept verbatim"
        );
    }
    debug!(nodes = tree.len(), bytes = source.len(), "parsed source");
    Ok(tree)
}

/// True when at least one top-level statement parsed without errors
fn has_clean_statement(root: tree_sitter::Node<'_>) -> bool {
    let mut cursor = root.walk();
    let found = root.named_children(&mut cursor).any(|child| {
        !child.is_extra() && !child.has_error() && child.kind() != "hash_bang_line"
    });
    found
}

fn count_errors(root: tree_sitter::Node<'_>) -> usize {
    let mut count = 0;
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            count += 1;
            continue;
        }
        if node.has_error() {
            let mut cursor = node.walk();
            stack.extend(node.children(&mut cursor));
        }
    }
    count
}

fn first_error(root: tree_sitter::Node<'_>) -> Option<tree_sitter::Node<'_>> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<_> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    None
}

const FUNCTION_KINDS: &[&str] = &[
    "function_declaration",
    "function_expression",
    "function",
    "generator_function_declaration",
    "generator_function",
    "arrow_function",
    "method_definition",
];

/// True when `node` belongs to a `?.` chain; such calls and members stay opaque
fn in_optional_chain(mut node: tree_sitter::Node<'_>) -> bool {
    loop {
        if node.child_by_field_name("optional_chain").is_some() {
            return true;
        }
        let next = match node.kind() {
            "member_expression" | "subscript_expression" => node.child_by_field_name("object"),
            "call_expression" => node.child_by_field_name("function"),
            _ => None,
        };
        match next {
            Some(inner) => node = inner,
            None => return false,
        }
    }
}

/// Parents whose statements follow one another, where a missing semicolon
/// lets the next line continue the previous expression
const STATEMENT_LISTS: &[&str] = &[
    "program",
    "statement_block",
    "switch_case",
    "switch_default",
    "class_static_block",
];

/// Converts tree-sitter nodes into arena nodes
struct Lowering<'s> {
    source: &'s str,
    tree: SyntaxTree,
    statement_starts: Vec<usize>,
}

impl<'s> Lowering<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            tree: SyntaxTree::new(source.to_string()),
            statement_starts: Vec::new(),
        }
    }

    fn text(&self, node: tree_sitter::Node<'_>) -> &'s str {
        &self.source[node.byte_range()]
    }

    fn span(node: tree_sitter::Node<'_>) -> Span {
        Span::new(node.start_byte(), node.end_byte())
    }

    /// Lower a node that fills a slot of its parent; always materialized
    fn lower(&mut self, node: tree_sitter::Node<'_>) -> NodeId {
        let lowered = match self.lower_typed(node) {
            Some(typed) => typed,
            None => Node::Opaque {
                children: self.lower_children(node),
            },
        };
        self.tree.push(lowered, Self::span(node), Origin::Source)
    }

    /// Lower a nested node, dropping untyped regions with nothing typed inside
    fn lower_nested(&mut self, node: tree_sitter::Node<'_>) -> Option<NodeId> {
        let lowered = match self.lower_typed(node) {
            Some(typed) => typed,
            None => {
                let children = self.lower_children(node);
                if children.is_empty() {
                    return None;
                }
                Node::Opaque { children }
            }
        };
        Some(self.tree.push(lowered, Self::span(node), Origin::Source))
    }

    fn lower_children(&mut self, node: tree_sitter::Node<'_>) -> Vec<NodeId> {
        let mut cursor = node.walk();
        let children: Vec<_> = node
            .named_children(&mut cursor)
            .filter(|child| !child.is_extra())
            .collect();
        children
            .into_iter()
            .filter_map(|child| self.lower_nested(child))
            .collect()
    }

    /// Typed node for `node`, or `None` if it is not a modeled shape
    fn lower_typed(&mut self, node: tree_sitter::Node<'_>) -> Option<Node> {
        if node.kind() == "expression_statement"
            && node
                .parent()
                .is_some_and(|parent| STATEMENT_LISTS.contains(&parent.kind()))
        {
            self.statement_starts.push(node.start_byte());
        }
        match node.kind() {
            "string" => Some(Node::StringLiteral {
                value: literals::unescape(self.text(node)),
            }),
            "null" => Some(Node::NullLiteral),
            "true" => Some(Node::BooleanLiteral { value: true }),
            "false" => Some(Node::BooleanLiteral { value: false }),
            "call_expression" => self.lower_call(node),
            "member_expression" => self.lower_member(node),
            "array" => Some(self.lower_array(node)),
            "ternary_expression" => self.lower_conditional(node),
            "parenthesized_expression" => {
                let mut cursor = node.walk();
                let inner = node
                    .named_children(&mut cursor)
                    .find(|child| !child.is_extra())?;
                Some(Node::Parenthesized {
                    expression: self.lower(inner),
                })
            }
            kind if FUNCTION_KINDS.contains(&kind) => self.lower_function(node),
            _ => None,
        }
    }

    fn lower_call(&mut self, node: tree_sitter::Node<'_>) -> Option<Node> {
        if in_optional_chain(node) {
            return None;
        }
        let function = node.child_by_field_name("function")?;
        let arguments = node.child_by_field_name("arguments")?;
        // Tagged templates carry a template string instead of an argument list
        if arguments.kind() != "arguments" {
            return None;
        }
        let callee = self.lower(function);
        let mut cursor = arguments.walk();
        let argument_nodes: Vec<_> = arguments
            .named_children(&mut cursor)
            .filter(|child| !child.is_extra())
            .collect();
        let arguments = argument_nodes
            .into_iter()
            .map(|argument| self.lower(argument))
            .collect();
        Some(Node::CallExpression { callee, arguments })
    }

    fn lower_member(&mut self, node: tree_sitter::Node<'_>) -> Option<Node> {
        if in_optional_chain(node) {
            return None;
        }
        let object = node.child_by_field_name("object")?;
        let property = node.child_by_field_name("property")?;
        if !matches!(
            property.kind(),
            "property_identifier" | "private_property_identifier"
        ) {
            return None;
        }
        let property = self.text(property).to_string();
        Some(Node::MemberExpression {
            object: self.lower(object),
            property,
        })
    }

    fn lower_array(&mut self, node: tree_sitter::Node<'_>) -> Node {
        let mut cursor = node.walk();
        let tokens: Vec<_> = node
            .children(&mut cursor)
            .filter(|child| !child.is_extra())
            .collect();

        let mut elements = Vec::new();
        let mut pending = None;
        for token in tokens {
            match token.kind() {
                "[" => {}
                // A comma with nothing before it since the last one is a hole
                "," => elements.push(pending.take()),
                "]" => {
                    if let Some(element) = pending.take() {
                        elements.push(Some(element));
                    }
                }
                _ => pending = Some(self.lower(token)),
            }
        }
        if let Some(element) = pending {
            elements.push(Some(element));
        }
        Node::ArrayExpression { elements }
    }

    fn lower_conditional(&mut self, node: tree_sitter::Node<'_>) -> Option<Node> {
        let test = node.child_by_field_name("condition")?;
        let consequent = node.child_by_field_name("consequence")?;
        let alternate = node.child_by_field_name("alternative")?;
        Some(Node::ConditionalExpression {
            test: self.lower(test),
            consequent: self.lower(consequent),
            alternate: self.lower(alternate),
        })
    }

    fn lower_function(&mut self, node: tree_sitter::Node<'_>) -> Option<Node> {
        let body = node.child_by_field_name("body")?;
        let name = node
            .child_by_field_name("name")
            .map(|name| self.text(name).to_string());

        let params = match node.child_by_field_name("parameters") {
            Some(parameters) => self.lower_children(parameters),
            None => node
                .child_by_field_name("parameter")
                .and_then(|parameter| self.lower_nested(parameter))
                .into_iter()
                .collect(),
        };

        let body = if body.kind() == "statement_block" {
            let statements = self.lower_children(body);
            self.tree.push(
                Node::Block { statements },
                Self::span(body),
                Origin::Source,
            )
        } else {
            self.lower(body)
        };

        Some(Node::Function { name, params, body })
    }
}
