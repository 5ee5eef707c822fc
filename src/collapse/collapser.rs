//! Single-pass reduction of a frame sequence into collapsed groups.
//!
//! Example, with the built-in rules:
//! ```text
//! com.app.Service.handle(Service.java:42)       com.app.Service.handle(Service.java:42)
//! sun.reflect.GeneratedMethodAccessor1.invoke   -- Reflection <2 lines>
//! java.lang.reflect.Method.invoke          =>   -- Spring
//! org.springframework.aop.AopUtils.invoke       com.app.Main.main(Main.java:7)
//! com.app.Main.main(Main.java:7)
//! ```

use crate::rules::{Rule, RuleSet};
use crate::trace::Frame;
use log::trace;
use std::fmt;
use std::sync::Arc;

/// Either a frame printed as-is or a run of consecutive frames matched by one rule
#[derive(Debug, Clone)]
pub enum CollapsedGroup {
    Raw(Frame),
    Collapsed { rule: Arc<Rule>, count: usize },
}

impl CollapsedGroup {
    /// Number of input frames this group stands for
    pub fn count(&self) -> usize {
        match self {
            Self::Raw(_) => 1,
            Self::Collapsed { count, .. } => *count,
        }
    }

    pub fn rule(&self) -> Option<&Arc<Rule>> {
        match self {
            Self::Raw(_) => None,
            Self::Collapsed { rule, .. } => Some(rule),
        }
    }

    pub fn is_collapsed(&self) -> bool {
        matches!(self, Self::Collapsed { .. })
    }

    /// True when this group is a collapsed run of exactly `rule`
    fn is_run_of(&self, rule: &Arc<Rule>) -> bool {
        matches!(self, Self::Collapsed { rule: current, .. } if Arc::ptr_eq(current, rule))
    }
}

/// Raw groups print the frame; collapsed ones print `\t<name>` or `\t<name>\t<N lines>`
impl fmt::Display for CollapsedGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw(frame) => write!(f, "{}", frame),
            Self::Collapsed { rule, count } if *count > 1 => {
                write!(f, "\t{}\t<{} lines>", rule.name(), count)
            }
            Self::Collapsed { rule, .. } => write!(f, "\t{}", rule.name()),
        }
    }
}

/// Collapse consecutive frames matched by the same rule
///
/// **Public** - main entry point for frame reduction
///
/// # Arguments
/// * `frames` - Frames in their original order
/// * `rules` - Rules to match against, first registered wins
///
/// # Returns
/// Groups in input order. The counts sum to `frames.len()` and no two
/// adjacent groups are collapsed runs of the same rule.
pub fn collapse(frames: &[Frame], rules: &RuleSet) -> Vec<CollapsedGroup> {
    let mut groups: Vec<CollapsedGroup> = Vec::with_capacity(frames.len());

    for frame in frames {
        let Some(rule) = rules.match_frame(frame) else {
            groups.push(CollapsedGroup::Raw(frame.clone()));
            continue;
        };

        if let Some(CollapsedGroup::Collapsed { rule: current, count }) = groups.last_mut() {
            if Arc::ptr_eq(current, rule) {
                *count += 1;
                continue;
            }
        }
        groups.push(CollapsedGroup::Collapsed {
            rule: Arc::clone(rule),
            count: 1,
        });
    }

    trace!("Collapsed {} frames into {} groups", frames.len(), groups.len());

    groups
}

/// Check the merge invariant over a group sequence
pub fn is_fully_merged(groups: &[CollapsedGroup]) -> bool {
    groups.windows(2).all(|pair| match pair[1].rule() {
        Some(rule) => !pair[0].is_run_of(rule),
        None => true,
    })
}
