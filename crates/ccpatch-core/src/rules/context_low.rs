//! Context-low warning removal

use super::{Rule, RuleName, RuleResult};
use crate::traverse::{walk, Flow, Path, Visitor};
use crate::tree::SyntaxTree;
use tracing::{debug, info};

/// Warning shown when the context window runs low; emptied wherever it appears
pub const CONTEXT_LOW_MESSAGE: &str = "Context low · Run /compact to compact & continue";

/// Prefix of the remaining-context indicator; its function is made to return null
pub const AUTO_COMPACT_MARKER: &str = "Context left until auto-compact: ";

/// Empties every context-low warning and disables the first remaining-context
/// indicator
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextLowRemoval;

impl Rule for ContextLowRemoval {
    fn name(&self) -> RuleName {
        RuleName::ContextLowRemoval
    }

    fn apply<'t>(&self, tree: &'t mut SyntaxTree) -> RuleResult<'t> {
        let mut visitor = ContextLowVisitor::default();
        walk(tree, &mut visitor);
        if visitor.emptied > 0 {
            info!(count = visitor.emptied, "emptied context-low messages");
        }
        let edits = visitor.emptied + visitor.indicators;
        RuleResult {
            tree,
            was_modified: edits > 0,
            edits,
        }
    }
}

#[derive(Default)]
struct ContextLowVisitor {
    emptied: usize,
    indicators: usize,
}

impl Visitor for ContextLowVisitor {
    fn visit_string_literal(&mut self, path: &mut Path<'_>) -> Flow {
        match path.tree().string_value(path.id()) {
            Some(CONTEXT_LOW_MESSAGE) => {
                let empty = path.tree_mut().string_literal("");
                path.replace_with(empty);
                self.emptied += 1;
                Flow::Continue
            }
            Some(AUTO_COMPACT_MARKER) => {
                let Some(function) = path.enclosing_function() else {
                    debug!("auto-compact marker is not inside a function");
                    return Flow::Continue;
                };
                info!(
                    function = path.tree().function_name(function).unwrap_or("<anonymous>"),
                    "disabling remaining-context indicator"
                );
                let tree = path.tree_mut();
                let null = tree.null_literal();
                let statement = tree.return_statement(Some(null));
                tree.replace_function_body(function, vec![statement]);
                self.indicators += 1;
                Flow::Stop
            }
            _ => Flow::Continue,
        }
    }
}
