//! Validation bypass
//!
//! Finds the function that produces the model-name validation error and makes
//! it report success unconditionally.

use super::{Rule, RuleName, RuleResult};
use crate::traverse::{walk, Flow, Path, Visitor};
use crate::tree::{Property, SyntaxTree};
use tracing::{debug, info};

/// Error message that identifies the validation function
pub const DEFAULT_VALIDATION_MESSAGE: &str = "Model name cannot be empty";

/// Replaces the body of the first function containing the validation message
/// with `return { valid: true };`
#[derive(Debug, Clone)]
pub struct ValidationBypass {
    message: String,
}

impl ValidationBypass {
    /// Match a different validation message
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Default for ValidationBypass {
    fn default() -> Self {
        Self::with_message(DEFAULT_VALIDATION_MESSAGE)
    }
}

impl Rule for ValidationBypass {
    fn name(&self) -> RuleName {
        RuleName::ValidationBypass
    }

    fn apply<'t>(&self, tree: &'t mut SyntaxTree) -> RuleResult<'t> {
        let mut visitor = BypassVisitor {
            message: &self.message,
            edits: 0,
        };
        walk(tree, &mut visitor);
        RuleResult {
            tree,
            was_modified: visitor.edits > 0,
            edits: visitor.edits,
        }
    }
}

struct BypassVisitor<'r> {
    message: &'r str,
    edits: usize,
}

impl Visitor for BypassVisitor<'_> {
    fn visit_string_literal(&mut self, path: &mut Path<'_>) -> Flow {
        if path.tree().string_value(path.id()) != Some(self.message) {
            return Flow::Continue;
        }
        info!(message = self.message, "found validation message");

        let Some(function) = path.enclosing_function() else {
            debug!("validation message is not inside a function");
            return Flow::Continue;
        };
        info!(
            function = path.tree().function_name(function).unwrap_or("<anonymous>"),
            "replacing validation function body"
        );

        let tree = path.tree_mut();
        let valid = tree.boolean_literal(true);
        let result = tree.object(vec![Property::new("valid", valid)]);
        let statement = tree.return_statement(Some(result));
        tree.replace_function_body(function, vec![statement]);
        self.edits += 1;

        Flow::Stop
    }
}
