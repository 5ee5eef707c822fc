//! Rule matching for frame collapsing.

pub mod rule;
pub mod rule_set;

pub use rule::{Rule, RuleKind};
pub use rule_set::RuleSet;
