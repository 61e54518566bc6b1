//! Modeling rules consulted by behaviors and the modeler facade.

use crate::{Diagram, ElementKind, Point};

/// Distance from a host's border within which a drop counts as attaching.
const ATTACH_BORDER: f64 = 15.0;

/// Outcome of dropping a shape onto a possible host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachRule {
    /// Attach the shape to the host's boundary.
    Attach,
    /// Place the shape inside the target as a child.
    Drop,
    Reject,
}

/// Which connections may exist between two elements.
pub trait ConnectionRules {
    fn can_connect_sequence_flow(&self, diagram: &Diagram, source: &str, target: &str) -> bool;

    fn can_connect_message_flow(&self, diagram: &Diagram, source: &str, target: &str) -> bool;

    fn can_connect_association(&self, diagram: &Diagram, source: &str, target: &str) -> bool {
        diagram.is(source, ElementKind::TextAnnotation)
            || diagram.is(target, ElementKind::TextAnnotation)
    }

    /// Preferred connection kind between the two, if any is allowed.
    fn connection_kind(&self, diagram: &Diagram, source: &str, target: &str) -> Option<ElementKind> {
        if self.can_connect_association(diagram, source, target) {
            Some(ElementKind::Association)
        } else if self.can_connect_sequence_flow(diagram, source, target) {
            Some(ElementKind::SequenceFlow)
        } else if self.can_connect_message_flow(diagram, source, target) {
            Some(ElementKind::MessageFlow)
        } else {
            None
        }
    }
}

/// Where shapes may be created, dropped and attached.
pub trait PlacementRules {
    /// Whether a `kind` shape may be placed into `target`.
    fn can_create(&self, diagram: &Diagram, kind: ElementKind, target: &str) -> bool;

    /// How a `kind` shape dropped at `position` onto `target` is placed.
    fn can_attach(
        &self,
        diagram: &Diagram,
        kind: ElementKind,
        target: &str,
        position: Option<Point>,
    ) -> AttachRule;
}

/// The standard BPMN rule set.
#[derive(Debug, Clone, Copy, Default)]
pub struct BpmnRules;

impl BpmnRules {
    pub fn new() -> Self {
        Self
    }
}

impl PlacementRules for BpmnRules {
    fn can_create(&self, diagram: &Diagram, kind: ElementKind, target: &str) -> bool {
        let Some(target_kind) = diagram.kind_of(target) else {
            return false;
        };
        match kind {
            ElementKind::Participant => target_kind.is_root(),
            ElementKind::BoundaryEvent => false,
            kind if kind.is_flow_node() => {
                target_kind.is_flow_container()
                    || target_kind == ElementKind::Participant
                    || target_kind == ElementKind::SequenceFlow
            }
            ElementKind::TextAnnotation => {
                target_kind.is_root()
                    || target_kind.is_flow_container()
                    || target_kind == ElementKind::Participant
            }
            _ => false,
        }
    }

    /// Events dropped near the border of an activity attach to it; without a
    /// position any allowed drop attaches.
    fn can_attach(
        &self,
        diagram: &Diagram,
        kind: ElementKind,
        target: &str,
        position: Option<Point>,
    ) -> AttachRule {
        let attachable = matches!(
            kind,
            ElementKind::IntermediateThrowEvent | ElementKind::BoundaryEvent
        );
        let Some(host) = diagram.get(target) else {
            return AttachRule::Reject;
        };
        if !attachable || !host.kind.is_activity() {
            return if self.can_create(diagram, kind, target) {
                AttachRule::Drop
            } else {
                AttachRule::Reject
            };
        }

        let on_border = position.map_or(true, |point| {
            let bounds = host.bounds;
            let inside_inner = point.x > bounds.x + ATTACH_BORDER
                && point.x < bounds.x + bounds.width - ATTACH_BORDER
                && point.y > bounds.y + ATTACH_BORDER
                && point.y < bounds.y + bounds.height - ATTACH_BORDER;
            let inside_outer = point.x >= bounds.x - ATTACH_BORDER
                && point.x <= bounds.x + bounds.width + ATTACH_BORDER
                && point.y >= bounds.y - ATTACH_BORDER
                && point.y <= bounds.y + bounds.height + ATTACH_BORDER;
            inside_outer && !inside_inner
        });

        if on_border {
            AttachRule::Attach
        } else if self.can_create(diagram, kind, target) {
            AttachRule::Drop
        } else {
            AttachRule::Reject
        }
    }
}

impl ConnectionRules for BpmnRules {
    fn can_connect_sequence_flow(&self, diagram: &Diagram, source: &str, target: &str) -> bool {
        let (Some(source_kind), Some(target_kind)) = (diagram.kind_of(source), diagram.kind_of(target))
        else {
            return false;
        };
        source_kind.is_flow_node()
            && target_kind.is_flow_node()
            && source_kind != ElementKind::EndEvent
            && !matches!(target_kind, ElementKind::StartEvent | ElementKind::BoundaryEvent)
            && diagram.participant_of(source) == diagram.participant_of(target)
    }

    fn can_connect_message_flow(&self, diagram: &Diagram, source: &str, target: &str) -> bool {
        let endpoint = |id: &str| {
            diagram
                .kind_of(id)
                .is_some_and(|kind| kind.is_flow_node() || kind == ElementKind::Participant)
        };
        if !endpoint(source) || !endpoint(target) {
            return false;
        }
        match (diagram.participant_of(source), diagram.participant_of(target)) {
            (Some(source_pool), Some(target_pool)) => source_pool != target_pool,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::{self, ShapeAttrs};
    use crate::{Bounds, ElementId};

    fn place(diagram: &mut Diagram, kind: ElementKind, parent: &str, bounds: Bounds) -> ElementId {
        let id = factory::create_element(diagram, ShapeAttrs::new(kind)).unwrap();
        diagram.add_child(parent, &id, None).unwrap();
        diagram.element_mut(&id).unwrap().bounds = bounds;
        id
    }

    #[test]
    fn test_sequence_flow_within_process() {
        let mut diagram = Diagram::new();
        let start = place(&mut diagram, ElementKind::StartEvent, "Process_1", Bounds::default());
        let task = place(&mut diagram, ElementKind::Task, "Process_1", Bounds::default());
        let rules = BpmnRules::new();

        assert!(rules.can_connect_sequence_flow(&diagram, &start, &task));
        assert!(!rules.can_connect_sequence_flow(&diagram, &task, &start));
        assert!(!rules.can_connect_message_flow(&diagram, &start, &task));
        assert_eq!(
            rules.connection_kind(&diagram, &start, &task),
            Some(ElementKind::SequenceFlow)
        );
    }

    #[test]
    fn test_message_flow_between_pools() {
        let mut diagram = Diagram::new();
        let pool_a = place(&mut diagram, ElementKind::Participant, "Process_1", Bounds::default());
        let pool_b = place(&mut diagram, ElementKind::Participant, "Process_1", Bounds::default());
        let task_a = place(&mut diagram, ElementKind::Task, &pool_a, Bounds::default());
        let task_b = place(&mut diagram, ElementKind::Task, &pool_b, Bounds::default());
        let rules = BpmnRules::new();

        assert!(!rules.can_connect_sequence_flow(&diagram, &task_a, &task_b));
        assert!(rules.can_connect_message_flow(&diagram, &task_a, &task_b));
        assert!(rules.can_connect_message_flow(&diagram, &task_a, &pool_b));
        assert!(!rules.can_connect_message_flow(&diagram, &task_a, &pool_a));
    }

    #[test]
    fn test_text_annotation_uses_association() {
        let mut diagram = Diagram::new();
        let task = place(&mut diagram, ElementKind::Task, "Process_1", Bounds::default());
        let note = place(&mut diagram, ElementKind::TextAnnotation, "Process_1", Bounds::default());

        assert_eq!(
            BpmnRules.connection_kind(&diagram, &task, &note),
            Some(ElementKind::Association)
        );
    }

    #[test]
    fn test_attach_on_border_only() {
        let mut diagram = Diagram::new();
        let task = place(
            &mut diagram,
            ElementKind::Task,
            "Process_1",
            Bounds::new(100.0, 100.0, 100.0, 80.0),
        );
        let sub_process = place(
            &mut diagram,
            ElementKind::SubProcess,
            "Process_1",
            Bounds::new(300.0, 100.0, 350.0, 200.0),
        );
        let rules = BpmnRules::new();
        let event = ElementKind::IntermediateThrowEvent;

        assert_eq!(rules.can_attach(&diagram, event, &task, Some(Point::new(150.0, 180.0))), AttachRule::Attach);
        assert_eq!(rules.can_attach(&diagram, event, &task, Some(Point::new(150.0, 140.0))), AttachRule::Reject);
        assert_eq!(
            rules.can_attach(&diagram, event, &sub_process, Some(Point::new(450.0, 200.0))),
            AttachRule::Drop
        );
        assert_eq!(rules.can_attach(&diagram, event, &sub_process, None), AttachRule::Attach);
        assert_eq!(
            rules.can_attach(&diagram, ElementKind::Task, &task, None),
            AttachRule::Reject
        );
    }

    #[test]
    fn test_can_create() {
        let diagram = Diagram::new();
        let rules = BpmnRules::new();

        assert!(rules.can_create(&diagram, ElementKind::Task, "Process_1"));
        assert!(rules.can_create(&diagram, ElementKind::Participant, "Process_1"));
        assert!(!rules.can_create(&diagram, ElementKind::SequenceFlow, "Process_1"));
        assert!(!rules.can_create(&diagram, ElementKind::BoundaryEvent, "Process_1"));
    }
}
