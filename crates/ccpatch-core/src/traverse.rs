//! Depth-first traversal with in-place mutation
//!
//! [`walk`] visits every attached node in pre-order, children in source
//! order, and hands each one to the matching [`Visitor`] method through a
//! [`Path`]. The callback's [`Flow`] decides whether to descend, skip the
//! subtree, or abort the walk.
//!
//! Callbacks may mutate the tree through the path. A replaced node is
//! followed by a visit of its replacement; if an ancestor of the current node
//! was replaced, the walk drops the detached subtree and resumes at the
//! replacement; removed array elements are never visited.

use crate::tree::{Node, NodeId, NodeKind, SyntaxTree};

/// Decision returned by a visitor callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    /// Descend into the node's children
    #[default]
    Continue,
    /// Leave the node's children unvisited and move on to its siblings
    Skip,
    /// Abort the whole walk
    Stop,
}

/// How a walk ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Finished,
    Stopped,
}

/// Per-kind callbacks; kinds without a callback are walked through
pub trait Visitor {
    fn visit_string_literal(&mut self, _path: &mut Path<'_>) -> Flow {
        Flow::Continue
    }

    fn visit_call_expression(&mut self, _path: &mut Path<'_>) -> Flow {
        Flow::Continue
    }

    fn visit_member_expression(&mut self, _path: &mut Path<'_>) -> Flow {
        Flow::Continue
    }

    fn visit_function(&mut self, _path: &mut Path<'_>) -> Flow {
        Flow::Continue
    }

    fn visit_array_expression(&mut self, _path: &mut Path<'_>) -> Flow {
        Flow::Continue
    }

    fn visit_conditional_expression(&mut self, _path: &mut Path<'_>) -> Flow {
        Flow::Continue
    }
}

/// Cursor handed to visitor callbacks
///
/// Borrows the tree mutably for the duration of one callback only.
pub struct Path<'t> {
    tree: &'t mut SyntaxTree,
    node: NodeId,
}

impl<'t> Path<'t> {
    fn new(tree: &'t mut SyntaxTree, node: NodeId) -> Self {
        Self { tree, node }
    }

    /// Id of the current node; follows [`Path::replace_with`]
    pub fn id(&self) -> NodeId {
        self.node
    }

    pub fn node(&self) -> &Node {
        self.tree.node(self.node)
    }

    pub fn kind(&self) -> NodeKind {
        self.tree.kind(self.node)
    }

    pub fn tree(&self) -> &SyntaxTree {
        self.tree
    }

    /// Mutable tree access, for building replacement nodes
    pub fn tree_mut(&mut self) -> &mut SyntaxTree {
        self.tree
    }

    /// Nearest enclosing function of any form
    pub fn enclosing_function(&self) -> Option<NodeId> {
        self.tree.enclosing(self.node, NodeKind::Function)
    }

    /// Nearest enclosing array literal
    pub fn enclosing_array(&self) -> Option<NodeId> {
        self.tree.enclosing(self.node, NodeKind::ArrayExpression)
    }

    /// Replace the current node with `replacement`, which becomes current
    pub fn replace_with(&mut self, replacement: NodeId) {
        self.tree.replace(self.node, replacement);
        self.node = replacement;
    }

    /// Remove the current node from `array` if it is one of its elements
    ///
    /// Parentheses between the array and the node are looked through, so
    /// `[(x)]` counts `x` as an element. Returns false, leaving the tree
    /// untouched, when the node is not a direct element.
    pub fn remove_from_array(&mut self, array: NodeId) -> bool {
        let mut element = self.node;
        while let Some(parent) = self.tree.parent(element) {
            if parent == array {
                return self.tree.remove_element(array, element);
            }
            if self.tree.kind(parent) != NodeKind::Parenthesized {
                return false;
            }
            element = parent;
        }
        false
    }
}

fn dispatch<V: Visitor + ?Sized>(visitor: &mut V, path: &mut Path<'_>) -> Flow {
    match path.kind() {
        NodeKind::StringLiteral => visitor.visit_string_literal(path),
        NodeKind::CallExpression => visitor.visit_call_expression(path),
        NodeKind::MemberExpression => visitor.visit_member_expression(path),
        NodeKind::Function => visitor.visit_function(path),
        NodeKind::ArrayExpression => visitor.visit_array_expression(path),
        NodeKind::ConditionalExpression => visitor.visit_conditional_expression(path),
        NodeKind::Program
        | NodeKind::Block
        | NodeKind::ReturnStatement
        | NodeKind::ObjectExpression
        | NodeKind::Parenthesized
        | NodeKind::NullLiteral
        | NodeKind::BooleanLiteral
        | NodeKind::Opaque => Flow::Continue,
    }
}

/// A node whose children are being walked
struct Frame {
    node: NodeId,
    /// Children as they were when the node was entered
    children: Vec<NodeId>,
    next: usize,
}

/// Walk `tree` depth-first, pre-order, dispatching to `visitor`
pub fn walk<V: Visitor + ?Sized>(tree: &mut SyntaxTree, visitor: &mut V) -> Completion {
    let mut stack: Vec<Frame> = Vec::new();
    let mut pending = Some(tree.root());
    let mut revision = tree.revision();

    loop {
        if let Some(id) = pending.take() {
            let mut path = Path::new(tree, id);
            let flow = dispatch(visitor, &mut path);
            let current = path.id();

            match flow {
                Flow::Stop => return Completion::Stopped,
                Flow::Skip => {}
                Flow::Continue if current != id => {
                    // Replaced in place; the replacement gets its own visit
                    pending = Some(current);
                    continue;
                }
                Flow::Continue => {
                    if tree.is_attached(id) {
                        stack.push(Frame {
                            node: id,
                            children: tree.node(id).children(),
                            next: 0,
                        });
                    }
                }
            }
        }

        if tree.revision() != revision {
            revision = tree.revision();
            if let Some(restart) = unwind_detached(tree, &mut stack) {
                pending = Some(restart);
                continue;
            }
        }

        let Some(frame) = stack.last_mut() else {
            break;
        };
        let Some(&child) = frame.children.get(frame.next) else {
            stack.pop();
            continue;
        };
        frame.next += 1;

        let child = tree.resolve(child);
        if tree.is_attached(child) && tree.parent(child) == Some(frame.node) {
            pending = Some(child);
        }
    }

    Completion::Finished
}

/// Drop frames whose node was detached by a mutation
///
/// The parent frame is rewound by one slot so the replacement, if any, is
/// visited next. Returns the new root when the root itself was replaced.
fn unwind_detached(tree: &SyntaxTree, stack: &mut Vec<Frame>) -> Option<NodeId> {
    let position = stack
        .iter()
        .position(|frame| !tree.is_attached(frame.node))?;
    stack.truncate(position);
    match stack.last_mut() {
        Some(parent) => {
            parent.next = parent.next.saturating_sub(1);
            None
        }
        None => Some(tree.root()),
    }
}
