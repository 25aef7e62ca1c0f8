//! ccpatch structural patch engine
//!
//! Parses a bundled JavaScript file, applies a selection of fixed rewrite
//! rules to its syntax tree and prints the result back to source:
//!
//! - `validationPatch` makes the model-name validation function always succeed
//! - `contextLowPatch` removes the context-low warning and its indicator
//! - `escInterruptPatch` removes the "esc to interrupt" hint elements
//!
//! # Example
//!
//! ```
//! let source = r#"function check(x) { if (!x) return "Model name cannot be empty"; }"#;
//! let outcome = ccpatch_core::apply_rules(source, &["validationPatch"]).unwrap();
//! assert!(outcome.was_modified);
//! assert_eq!(outcome.output, "function check(x) { return { valid: true }; }");
//! ```

pub mod codegen;
pub mod parser;
pub mod patcher;
pub mod rules;
pub mod span;
pub mod traverse;
pub mod tree;

pub use codegen::generate;
pub use parser::{parse, ParseError};
pub use patcher::{resolve_rules, PatchError, PatchOutcome, Patcher, RuleReport};
pub use rules::{Rule, RuleName, RuleResult, UnknownRule};
pub use span::Span;
pub use traverse::{walk, Completion, Flow, Path, Visitor};
pub use tree::{Node, NodeId, NodeKind, Origin, Property, SyntaxTree};

/// Apply the named rules to `source`
///
/// Rule names are resolved before anything is parsed, so an unknown name fails
/// fast. The output is the input itself unless a rule changed something.
pub fn apply_rules<S: AsRef<str>>(
    source: &str,
    rule_names: &[S],
) -> Result<PatchOutcome, PatchError> {
    Patcher::from_names(rule_names)?.run(source)
}
