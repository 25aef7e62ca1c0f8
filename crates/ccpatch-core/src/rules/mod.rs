//! Patch rules
//!
//! Each rule is a [`Visitor`](crate::traverse::Visitor) over the shared
//! [`SyntaxTree`] that recognizes one known code shape and rewrites it. Rules
//! never fail: a rule whose target is absent leaves the tree untouched and
//! reports `was_modified: false`.

mod context_low;
mod esc_interrupt;
mod validation;

pub use context_low::{ContextLowRemoval, AUTO_COMPACT_MARKER, CONTEXT_LOW_MESSAGE};
pub use esc_interrupt::{EscInterruptRemoval, INTERRUPT_HINTS};
pub use validation::{ValidationBypass, DEFAULT_VALIDATION_MESSAGE};

use crate::tree::SyntaxTree;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Outcome of one rule application
///
/// `tree` is the same tree that was passed in, handed back for chaining.
#[derive(Debug)]
pub struct RuleResult<'t> {
    pub tree: &'t mut SyntaxTree,
    pub was_modified: bool,
    /// Number of individual rewrites performed
    pub edits: usize,
}

/// A single pattern-to-transform rewrite
pub trait Rule {
    fn name(&self) -> RuleName;

    fn apply<'t>(&self, tree: &'t mut SyntaxTree) -> RuleResult<'t>;
}

/// Names of the available rules, as used in configuration and on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleName {
    #[serde(rename = "validationPatch")]
    ValidationBypass,
    #[serde(rename = "contextLowPatch")]
    ContextLowRemoval,
    #[serde(rename = "escInterruptPatch")]
    EscInterruptRemoval,
}

impl RuleName {
    /// Every rule, in the order they are listed and applied by default
    pub const ALL: [RuleName; 3] = [
        RuleName::ValidationBypass,
        RuleName::ContextLowRemoval,
        RuleName::EscInterruptRemoval,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleName::ValidationBypass => "validationPatch",
            RuleName::ContextLowRemoval => "contextLowPatch",
            RuleName::EscInterruptRemoval => "escInterruptPatch",
        }
    }

    /// One-line summary for menus and `--help` style listings
    pub fn description(&self) -> &'static str {
        match self {
            RuleName::ValidationBypass => "Skip model name validation",
            RuleName::ContextLowRemoval => "Remove the context-low warning",
            RuleName::EscInterruptRemoval => "Remove the \"esc to interrupt\" hint",
        }
    }

    /// The rule with its default configuration
    pub fn rule(&self) -> Box<dyn Rule> {
        match self {
            RuleName::ValidationBypass => Box::new(ValidationBypass::default()),
            RuleName::ContextLowRemoval => Box::new(ContextLowRemoval),
            RuleName::EscInterruptRemoval => Box::new(EscInterruptRemoval),
        }
    }

    /// Comma-separated list of every rule name
    pub fn available() -> String {
        RuleName::ALL
            .iter()
            .map(RuleName::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for RuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rule name that matches none of [`RuleName::ALL`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown rule '{0}'")]
pub struct UnknownRule(pub String);

impl FromStr for RuleName {
    type Err = UnknownRule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        RuleName::ALL
            .into_iter()
            .find(|rule| rule.as_str() == name)
            .ok_or_else(|| UnknownRule(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("validationPatch", RuleName::ValidationBypass)]
    #[case("contextLowPatch", RuleName::ContextLowRemoval)]
    #[case(" escInterruptPatch ", RuleName::EscInterruptRemoval)]
    fn test_parse_rule_name(#[case] input: &str, #[case] expected: RuleName) {
        assert_eq!(input.parse::<RuleName>(), Ok(expected));
    }

    #[test]
    fn test_parse_unknown_rule_name() {
        assert_eq!(
            "ValidationPatch".parse::<RuleName>(),
            Err(UnknownRule("ValidationPatch".to_string()))
        );
    }

    #[test]
    fn test_display_round_trips() {
        for rule in RuleName::ALL {
            assert_eq!(rule.to_string().parse::<RuleName>(), Ok(rule));
            assert_eq!(rule.rule().name(), rule);
        }
    }

    #[test]
    fn test_available_lists_all() {
        assert_eq!(
            RuleName::available(),
            "validationPatch, contextLowPatch, escInterruptPatch"
        );
    }
}
