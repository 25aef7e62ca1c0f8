//! "esc to interrupt" hint removal
//!
//! The hint is rendered through `X.createElement(type, props, ...children)`
//! calls carrying one of [`INTERRUPT_HINTS`] among their children. Calls that
//! sit directly in an array are dropped from it; others become `null`, which
//! renders nothing. A conditional that picks an array of such calls is
//! replaced by an empty array as a whole.

use super::{Rule, RuleName, RuleResult};
use crate::traverse::{walk, Flow, Path, Visitor};
use crate::tree::{Node, NodeId, SyntaxTree};
use tracing::info;

/// Child strings that mark an element as part of the interrupt hint
pub const INTERRUPT_HINTS: [&str; 2] = ["esc", "to interrupt"];

const ELEMENT_FACTORY: &str = "createElement";

/// Removes every element that renders the interrupt hint
#[derive(Debug, Clone, Copy, Default)]
pub struct EscInterruptRemoval;

impl Rule for EscInterruptRemoval {
    fn name(&self) -> RuleName {
        RuleName::EscInterruptRemoval
    }

    fn apply<'t>(&self, tree: &'t mut SyntaxTree) -> RuleResult<'t> {
        let mut visitor = EscVisitor::default();
        walk(tree, &mut visitor);
        RuleResult {
            tree,
            was_modified: visitor.edits > 0,
            edits: visitor.edits,
        }
    }
}

/// `X.createElement(type, props, ...)` with a hint string among the children
fn is_hint_element(tree: &SyntaxTree, id: NodeId) -> bool {
    let Node::CallExpression { callee, arguments } = tree.node(tree.skip_parens(id)) else {
        return false;
    };
    let Node::MemberExpression { property, .. } = tree.node(tree.skip_parens(*callee)) else {
        return false;
    };
    property == ELEMENT_FACTORY
        && arguments.iter().skip(2).any(|argument| {
            tree.string_value(tree.skip_parens(*argument))
                .is_some_and(|value| INTERRUPT_HINTS.contains(&value))
        })
}

#[derive(Default)]
struct EscVisitor {
    edits: usize,
}

impl Visitor for EscVisitor {
    fn visit_call_expression(&mut self, path: &mut Path<'_>) -> Flow {
        if !is_hint_element(path.tree(), path.id()) {
            return Flow::Continue;
        }
        self.edits += 1;

        if let Some(array) = path.enclosing_array() {
            if path.remove_from_array(array) {
                info!("removed interrupt hint element from array");
                return Flow::Skip;
            }
        }

        info!("replaced interrupt hint element with null");
        let null = path.tree_mut().null_literal();
        path.replace_with(null);
        Flow::Continue
    }

    fn visit_conditional_expression(&mut self, path: &mut Path<'_>) -> Flow {
        let Node::ConditionalExpression { consequent, .. } = path.node() else {
            return Flow::Continue;
        };
        let tree = path.tree();
        let Node::ArrayExpression { elements } = tree.node(tree.skip_parens(*consequent)) else {
            return Flow::Continue;
        };
        let matches = elements
            .iter()
            .flatten()
            .any(|element| is_hint_element(tree, *element));
        if !matches {
            return Flow::Continue;
        }

        info!("replaced conditional interrupt hint with empty array");
        let empty = path.tree_mut().empty_array();
        path.replace_with(empty);
        self.edits += 1;
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::tree::NodeKind;
    use rstest::rstest;

    fn first_call(tree: &SyntaxTree) -> NodeId {
        let mut stack = vec![tree.root()];
        while let Some(id) = stack.pop() {
            if tree.kind(id) == NodeKind::CallExpression {
                return id;
            }
            stack.extend(tree.node(id).children().into_iter().rev());
        }
        panic!("no call in tree");
    }

    #[rstest]
    #[case(r#"a.createElement("div", null, "esc");"#, true)]
    #[case(r#"a.createElement(T, {}, x, "to interrupt");"#, true)]
    #[case(r#"(a.createElement)(T, null, ("esc"));"#, true)]
    #[case(r#"a.createElement("esc", null, "other");"#, false)]
    #[case(r#"a.createElement("div", "esc");"#, false)]
    #[case(r#"createElement("div", null, "esc");"#, false)]
    #[case(r#"a.h("div", null, "esc");"#, false)]
    #[case(r#"a.createElement("div", null, "Esc");"#, false)]
    fn test_hint_element_shape(#[case] source: &str, #[case] expected: bool) {
        let tree = parse(source).unwrap();
        assert_eq!(is_hint_element(&tree, first_call(&tree)), expected);
    }
}
