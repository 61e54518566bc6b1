use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

use crate::{Diagram, ElementId, ElementKind, Point};

pub const COLLABORATION_ERROR: &str = "flow elements must be children of pools/participants";

const TOOLTIP_OFFSET: f64 = 5.0;
const TOOLTIP_TIMEOUT_MS: u64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TooltipKind {
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tooltip {
    pub position: Point,
    pub kind: TooltipKind,
    pub timeout_ms: u64,
    pub message: String,
}

impl Tooltip {
    pub fn error(position: Point, message: impl Into<String>) -> Self {
        Self {
            position,
            kind: TooltipKind::Error,
            timeout_ms: TOOLTIP_TIMEOUT_MS,
            message: message.into(),
        }
    }
}

/// Receiver of user-facing modeling hints.
#[cfg_attr(test, mockall::automock)]
pub trait FeedbackSink {
    fn show(&self, tooltip: Tooltip);
}

/// Sink that keeps every tooltip it receives.
#[derive(Debug, Default)]
pub struct FeedbackLog {
    tooltips: RefCell<Vec<Tooltip>>,
}

impl FeedbackLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tooltips(&self) -> Vec<Tooltip> {
        self.tooltips.borrow().clone()
    }
}

impl FeedbackSink for FeedbackLog {
    fn show(&self, tooltip: Tooltip) {
        self.tooltips.borrow_mut().push(tooltip);
    }
}

/// A create or move the rules refused.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedDrop {
    pub shape: ElementId,
    pub target: ElementId,
    pub position: Point,
}

/// Explains rejected drops to the user.
pub struct ModelingFeedback {
    sink: Rc<dyn FeedbackSink>,
}

impl ModelingFeedback {
    pub fn new(sink: Rc<dyn FeedbackSink>) -> Self {
        Self { sink }
    }

    /// Show a tooltip for `rejected` if there is something to explain.
    /// Returns whether one was shown.
    pub fn on_rejected(&self, diagram: &Diagram, rejected: &RejectedDrop) -> bool {
        let onto_collaboration = diagram.is(&rejected.target, ElementKind::Collaboration);
        let flow_node = diagram
            .kind_of(&rejected.shape)
            .is_some_and(|kind| kind.is_flow_node());
        if !onto_collaboration || !flow_node {
            return false;
        }

        tracing::debug!("Rejected drop of {} onto {}", rejected.shape, rejected.target);
        let position = rejected
            .position
            .translate(Point::new(TOOLTIP_OFFSET, TOOLTIP_OFFSET));
        self.sink.show(Tooltip::error(position, COLLABORATION_ERROR));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::{self, ShapeAttrs};
    use mockall::predicate::eq;

    fn collaboration_diagram() -> (Diagram, ElementId) {
        let mut diagram = Diagram::empty();
        let root = factory::create_root(&mut diagram, ElementKind::Collaboration).unwrap();
        diagram.set_root(Some(root.clone()));
        (diagram, root)
    }

    #[test]
    fn test_tooltip_for_flow_node_on_collaboration() {
        let (mut diagram, root) = collaboration_diagram();
        let task = factory::create_element(&mut diagram, ShapeAttrs::new(ElementKind::Task)).unwrap();

        let mut sink = MockFeedbackSink::new();
        sink.expect_show()
            .with(eq(Tooltip::error(Point::new(105.0, 205.0), COLLABORATION_ERROR)))
            .times(1)
            .return_const(());
        let feedback = ModelingFeedback::new(Rc::new(sink));

        assert!(feedback.on_rejected(
            &diagram,
            &RejectedDrop {
                shape: task,
                target: root,
                position: Point::new(100.0, 200.0),
            }
        ));
    }

    #[test]
    fn test_no_tooltip_for_other_rejections() {
        let (mut diagram, root) = collaboration_diagram();
        let note =
            factory::create_element(&mut diagram, ShapeAttrs::new(ElementKind::TextAnnotation)).unwrap();

        let mut sink = MockFeedbackSink::new();
        sink.expect_show().never();
        let feedback = ModelingFeedback::new(Rc::new(sink));

        assert!(!feedback.on_rejected(
            &diagram,
            &RejectedDrop {
                shape: note,
                target: root,
                position: Point::default(),
            }
        ));
    }

    #[test]
    fn test_feedback_log_keeps_tooltips() {
        let log = FeedbackLog::new();
        log.show(Tooltip::error(Point::default(), "nope"));
        assert_eq!(log.tooltips().len(), 1);
        assert_eq!(log.tooltips()[0].timeout_ms, 2000);
    }
}
