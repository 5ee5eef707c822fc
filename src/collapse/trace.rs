//! Collapsed form of a whole cause chain.

use super::collapser::{collapse, CollapsedGroup};
use crate::rules::RuleSet;
use crate::trace::{identity, Throwable};
use log::debug;

/// Frame data of one throwable after collapsing
#[derive(Debug, Clone)]
pub enum TraceBody {
    /// The throwable carried no stack trace
    NoStackTrace,
    /// The stack trace was captured but has no frames
    EmptyStackTrace,
    Groups(Vec<CollapsedGroup>),
}

/// One throwable of a chain, linked to its cause
#[derive(Debug, Clone)]
pub struct Trace {
    pub description: String,
    pub body: TraceBody,
    pub cause: Option<Box<Trace>>,
}

impl Trace {
    /// Collapse a throwable and its cause chain
    ///
    /// The chain is walked iteratively. A cause whose identity was already
    /// rendered, the root included, ends the chain. The one exception is a
    /// root that is directly its own cause: it gets a single cause section.
    pub fn build(throwable: &dyn Throwable, rules: &RuleSet) -> Self {
        let root_id = identity(throwable);
        let mut causes: Vec<Trace> = Vec::new();
        let mut visited: Vec<*const ()> = vec![root_id];

        let mut next = throwable.cause();
        while let Some(cause) = next {
            let id = identity(cause);
            let direct_self_cause = causes.is_empty() && id == root_id;
            if visited.contains(&id) && !direct_self_cause {
                debug!("Cause chain revisits '{}', stopping", cause.description());
                break;
            }
            if !direct_self_cause {
                visited.push(id);
            }
            causes.push(Self::single(cause, rules));
            next = cause.cause();
        }

        let mut root = Self::single(throwable, rules);
        root.cause = causes.into_iter().rev().fold(None, |inner: Option<Box<Trace>>, mut link| {
            link.cause = inner;
            Some(Box::new(link))
        });
        root
    }

    /// Collapse one throwable, ignoring its cause
    pub fn single(throwable: &dyn Throwable, rules: &RuleSet) -> Self {
        let body = match throwable.frames() {
            None => TraceBody::NoStackTrace,
            Some([]) => TraceBody::EmptyStackTrace,
            Some(frames) => TraceBody::Groups(collapse(frames, rules)),
        };
        Self {
            description: throwable.description(),
            body,
            cause: None,
        }
    }

    /// This trace followed by every cause
    pub fn chain(&self) -> impl Iterator<Item = &Trace> {
        std::iter::successors(Some(self), |trace| trace.cause.as_deref())
    }

    pub fn causes(&self) -> impl Iterator<Item = &Trace> {
        self.chain().skip(1)
    }

    pub fn groups(&self) -> &[CollapsedGroup] {
        match &self.body {
            TraceBody::Groups(groups) => groups,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{Frame, RaisedError};
    use std::cell::Cell;

    /// Error whose cause is itself
    struct SelfCaused {
        frames: Vec<Frame>,
    }

    impl Throwable for SelfCaused {
        fn description(&self) -> String {
            "com.app.LoopException: again".to_string()
        }

        fn frames(&self) -> Option<&[Frame]> {
            Some(&self.frames)
        }

        fn cause(&self) -> Option<&dyn Throwable> {
            Some(self)
        }
    }

    #[test]
    fn test_chain_order() {
        let err = RaisedError::new("A")
            .with_frames(vec![Frame::at("com.app.A", "a", "A.java", 1)])
            .with_cause(RaisedError::new("B").with_cause(RaisedError::new("C").without_frames()));

        let trace = Trace::build(&err, &RuleSet::default());
        let descriptions: Vec<&str> = trace.chain().map(|t| t.description.as_str()).collect();

        assert_eq!(descriptions, vec!["A", "B", "C"]);
        assert_eq!(trace.groups().len(), 1);
        assert!(matches!(trace.causes().next().unwrap().body, TraceBody::EmptyStackTrace));
        assert!(matches!(trace.causes().nth(1).unwrap().body, TraceBody::NoStackTrace));
    }

    #[test]
    fn test_self_cause_included_once() {
        let err = SelfCaused {
            frames: vec![Frame::at("com.app.Loop", "spin", "Loop.java", 3)],
        };
        let trace = Trace::build(&err, &RuleSet::default());
        assert_eq!(trace.causes().count(), 1);
    }

    /// Error whose cause is set after construction, so chains can loop
    struct Linked<'a> {
        name: &'static str,
        cause: Cell<Option<&'a Linked<'a>>>,
    }

    impl<'a> Linked<'a> {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                cause: Cell::new(None),
            }
        }
    }

    impl Throwable for Linked<'_> {
        fn description(&self) -> String {
            self.name.to_string()
        }

        fn frames(&self) -> Option<&[Frame]> {
            Some(&[])
        }

        fn cause(&self) -> Option<&dyn Throwable> {
            self.cause.get().map(|cause| cause as &dyn Throwable)
        }
    }

    #[test]
    fn test_two_cycle_stops_at_root() {
        let a = Linked::new("A");
        let b = Linked::new("B");
        a.cause.set(Some(&b));
        b.cause.set(Some(&a));

        let trace = Trace::build(&a, &RuleSet::default());
        let descriptions: Vec<&str> = trace.chain().map(|t| t.description.as_str()).collect();
        assert_eq!(descriptions, vec!["A", "B"]);
    }

    #[test]
    fn test_cycle_below_root_stops_at_first_repeat() {
        let a = Linked::new("A");
        let b = Linked::new("B");
        let c = Linked::new("C");
        a.cause.set(Some(&b));
        b.cause.set(Some(&c));
        c.cause.set(Some(&b));

        let trace = Trace::build(&a, &RuleSet::default());
        let descriptions: Vec<&str> = trace.chain().map(|t| t.description.as_str()).collect();
        assert_eq!(descriptions, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_self_caused_cause_included_once() {
        struct Outer {
            inner: SelfCaused,
        }

        impl Throwable for Outer {
            fn description(&self) -> String {
                "com.app.Outer".to_string()
            }

            fn frames(&self) -> Option<&[Frame]> {
                None
            }

            fn cause(&self) -> Option<&dyn Throwable> {
                Some(&self.inner)
            }
        }

        let err = Outer {
            inner: SelfCaused { frames: Vec::new() },
        };
        let trace = Trace::build(&err, &RuleSet::default());
        let causes: Vec<&Trace> = trace.causes().collect();
        assert_eq!(causes.len(), 1);
        assert_eq!(causes[0].description, "com.app.LoopException: again");
    }
}
