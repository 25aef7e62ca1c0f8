//! Patch orchestration
//!
//! A [`Patcher`] holds an ordered selection of rules and runs them one after
//! another over a single shared tree. Text is only regenerated when at least
//! one rule changed something; otherwise the input comes back untouched.

use crate::codegen::generate;
use crate::parser::{parse, ParseError};
use crate::rules::{Rule, RuleName};
use crate::tree::SyntaxTree;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

/// Patch run failures
#[derive(Error, Debug)]
pub enum PatchError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(
        "Unknown rule name(s): {} (available: {})",
        .names.join(", "),
        RuleName::available()
    )]
    UnknownRules { names: Vec<String> },
}

/// What one rule did during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleReport {
    pub rule: RuleName,
    pub modified: bool,
    pub edits: usize,
}

/// Result of patching a source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    /// Patched text, or the input itself when nothing changed
    pub output: String,
    pub was_modified: bool,
    /// One entry per applied rule, in application order
    pub report: Vec<RuleReport>,
}

/// Resolve rule names, preserving order and dropping duplicates
///
/// Every unknown name is reported at once.
pub fn resolve_rules<S: AsRef<str>>(names: &[S]) -> Result<Vec<RuleName>, PatchError> {
    let mut rules = Vec::new();
    let mut unknown = Vec::new();
    for name in names {
        match name.as_ref().parse::<RuleName>() {
            Ok(rule) if !rules.contains(&rule) => rules.push(rule),
            Ok(_) => {}
            Err(err) => unknown.push(err.0),
        }
    }
    if unknown.is_empty() {
        Ok(rules)
    } else {
        Err(PatchError::UnknownRules { names: unknown })
    }
}

/// Runs a fixed sequence of rules
pub struct Patcher {
    rules: Vec<Box<dyn Rule>>,
}

impl Patcher {
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    /// Default-configured rules for `names`, in the given order
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, PatchError> {
        let rules = resolve_rules(names)?
            .iter()
            .map(RuleName::rule)
            .collect();
        Ok(Self::new(rules))
    }

    /// Names of the configured rules, in application order
    pub fn rule_names(&self) -> Vec<RuleName> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Apply every rule to `tree` in order
    pub fn apply(&self, tree: &mut SyntaxTree) -> Vec<RuleReport> {
        let mut report = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            let name = rule.name();
            debug!(rule = %name, "applying rule");
            let result = rule.apply(tree);
            if result.was_modified {
                info!(rule = %name, edits = result.edits, "rule modified the tree");
            } else {
                info!(rule = %name, "rule target not found; nothing to change");
            }
            report.push(RuleReport {
                rule: name,
                modified: result.was_modified,
                edits: result.edits,
            });
        }
        report
    }

    /// Parse `source`, apply every rule and regenerate text if anything changed
    pub fn run(&self, source: &str) -> Result<PatchOutcome, PatchError> {
        let mut tree = parse(source)?;
        let report = self.apply(&mut tree);
        let was_modified = report.iter().any(|entry| entry.modified);

        let output = if was_modified {
            generate(&tree)
        } else {
            source.to_string()
        };

        Ok(PatchOutcome {
            output,
            was_modified,
            report,
        })
    }
}
