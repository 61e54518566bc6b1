mod common;

use bpmn_core::{ModelerConfig, ModelerError};
use bpmn_domain::behaviors::feedback::COLLABORATION_ERROR;
use bpmn_domain::{
    modeling, AttachRule, BpmnRules, Bounds, ConnectionRules, Diagram, ElementId, ElementKind,
    FeedbackLog, Modeler, PlacementRules, Point, ShapeAttrs, Tooltip,
};
use common::{children, modeler, place, process, promote};
use std::rc::Rc;

fn outgoing(modeler: &Modeler, id: &ElementId) -> Vec<ElementId> {
    modeler.diagram().element(id).unwrap().outgoing.clone()
}

#[test]
fn test_delete_cascades_and_undo_restores_everything() {
    let mut modeler = modeler();
    let start = place(&mut modeler, ElementKind::StartEvent, 100.0, 100.0, &process());
    let task = place(&mut modeler, ElementKind::Task, 250.0, 100.0, &process());
    let end = place(&mut modeler, ElementKind::EndEvent, 400.0, 100.0, &process());
    let incoming =
        modeling::connect(&mut modeler, &start, &task, ElementKind::SequenceFlow, None).unwrap();
    let outgoing_flow =
        modeling::connect(&mut modeler, &task, &end, ElementKind::SequenceFlow, None).unwrap();
    let boundary = modeler
        .place(
            ShapeAttrs::new(ElementKind::IntermediateThrowEvent),
            Point::new(250.0, 140.0),
            &task,
        )
        .unwrap();
    let before = modeler.diagram().clone();

    modeling::delete_shape(&mut modeler, &task).unwrap();

    let diagram = modeler.diagram();
    for removed in [&task, &incoming, &outgoing_flow, &boundary] {
        assert_eq!(diagram.element(removed).unwrap().parent, None);
        assert!(!diagram.is_attached(removed));
    }
    assert!(diagram.element(&start).unwrap().outgoing.is_empty());
    assert!(diagram.element(&end).unwrap().incoming.is_empty());
    assert_eq!(children(&modeler, &process()), vec![start.clone(), end.clone()]);
    assert_eq!(
        modeler.diagram().object(&process()).unwrap().contents,
        vec![start, end]
    );
    let after_delete = modeler.diagram().clone();

    modeler.undo().unwrap();
    assert_eq!(*modeler.diagram(), before);

    modeler.redo().unwrap();
    assert_eq!(*modeler.diagram(), after_delete);
}

#[test]
fn test_delete_root_is_refused() {
    let mut modeler = modeler();

    let err = modeling::delete_shape(&mut modeler, &process()).unwrap_err();

    assert!(matches!(err, ModelerError::Validation(_)));
    assert!(!modeler.can_undo());
}

#[test]
fn test_deleting_last_participant_restores_process() {
    let mut modeler = modeler();
    let (participant, collaboration) = promote(&mut modeler);

    modeling::delete_shape(&mut modeler, &participant).unwrap();

    let diagram = modeler.diagram();
    let root = diagram.root().unwrap();
    assert_eq!(root.kind, ElementKind::Process);
    assert_ne!(root.id, process());
    let definitions = diagram.object(diagram.definitions_id()).unwrap();
    assert!(definitions.contents.contains(&root.id));
    assert!(!definitions.contents.contains(&collaboration));

    modeler.undo().unwrap();
    let diagram = modeler.diagram();
    assert_eq!(diagram.root_id(), Some(&collaboration));
    assert_eq!(diagram.element(&participant).unwrap().parent, Some(collaboration.clone()));
    assert!(diagram.object(&collaboration).unwrap().contents.contains(&participant));
}

#[test]
fn test_deleting_one_of_two_participants_keeps_collaboration() {
    let mut modeler = modeler();
    let (first, collaboration) = promote(&mut modeler);
    let second = modeler.create_participant(true).unwrap();
    modeling::create_shape(&mut modeler, &second, Point::new(350.0, 500.0), &collaboration, false)
        .unwrap();

    modeling::delete_shape(&mut modeler, &first).unwrap();

    assert_eq!(modeler.diagram().root_id(), Some(&collaboration));
    assert_eq!(children(&modeler, &collaboration), vec![second]);
}

#[test]
fn test_append_places_and_connects_new_task() {
    let mut modeler = modeler();
    let task = place(&mut modeler, ElementKind::Task, 100.0, 100.0, &process());
    let next = modeler.create_element(ShapeAttrs::new(ElementKind::Task)).unwrap();

    let appended = modeling::append_shape(&mut modeler, &task, &next, None, None).unwrap();
    assert_eq!(appended, next);

    let diagram = modeler.diagram();
    assert_eq!(diagram.element(&next).unwrap().bounds, Bounds::new(230.0, 60.0, 100.0, 80.0));
    assert_eq!(diagram.element(&next).unwrap().parent, Some(process()));

    let connections = outgoing(&modeler, &task);
    assert_eq!(connections.len(), 1);
    let flow = diagram.element(&connections[0]).unwrap();
    assert_eq!(flow.kind, ElementKind::SequenceFlow);
    assert_eq!(flow.target, Some(next.clone()));
    assert_eq!(flow.parent, Some(process()));
    assert_eq!(flow.waypoints, vec![Point::new(100.0, 100.0), Point::new(280.0, 100.0)]);

    let object = diagram.object(&flow.id).unwrap();
    assert_eq!(object.source_ref, Some(task.clone()));
    assert_eq!(object.target_ref, Some(next.clone()));
    assert_eq!(object.parent, Some(process()));

    modeler.undo().unwrap();
    assert_eq!(modeler.diagram().element(&next).unwrap().parent, None);
    assert!(outgoing(&modeler, &task).is_empty());
}

#[test]
fn test_append_text_annotation_uses_association() {
    let mut modeler = modeler();
    let task = place(&mut modeler, ElementKind::Task, 100.0, 100.0, &process());
    let note = modeler
        .create_element(ShapeAttrs::new(ElementKind::TextAnnotation))
        .unwrap();

    modeling::append_shape(&mut modeler, &task, &note, None, None).unwrap();

    let diagram = modeler.diagram();
    assert_eq!(diagram.element(&note).unwrap().bounds, Bounds::new(125.0, -20.0, 100.0, 30.0));
    let connections = outgoing(&modeler, &task);
    assert_eq!(connections.len(), 1);
    assert!(diagram.is(&connections[0], ElementKind::Association));
}

#[test]
fn test_append_with_explicit_position() {
    let mut modeler = modeler();
    let task = place(&mut modeler, ElementKind::Task, 100.0, 100.0, &process());
    let end = modeler.create_element(ShapeAttrs::new(ElementKind::EndEvent)).unwrap();

    modeling::append_shape(&mut modeler, &task, &end, Some(Point::new(300.0, 250.0)), None)
        .unwrap();

    assert_eq!(
        modeler.diagram().element(&end).unwrap().center(),
        Point::new(300.0, 250.0)
    );
}

#[test]
fn test_create_on_sequence_flow_splits_it() {
    let mut modeler = modeler();
    let start = place(&mut modeler, ElementKind::StartEvent, 100.0, 100.0, &process());
    let end = place(&mut modeler, ElementKind::EndEvent, 400.0, 100.0, &process());
    let flow = modeling::connect(&mut modeler, &start, &end, ElementKind::SequenceFlow, None).unwrap();
    let task = modeler.create_element(ShapeAttrs::new(ElementKind::Task)).unwrap();

    modeling::create_shape(&mut modeler, &task, Point::new(250.0, 100.0), &flow, false).unwrap();

    let diagram = modeler.diagram();
    let task_shape = diagram.element(&task).unwrap();
    assert_eq!(task_shape.parent, Some(process()));
    assert_eq!(task_shape.incoming, vec![flow.clone()]);
    assert_eq!(task_shape.outgoing.len(), 1);

    let split = diagram.element(&task_shape.outgoing[0]).unwrap();
    assert_eq!(split.kind, ElementKind::SequenceFlow);
    assert_eq!(split.target, Some(end.clone()));
    assert_eq!(diagram.element(&end).unwrap().incoming, vec![split.id.clone()]);
    assert_eq!(diagram.element(&flow).unwrap().target, Some(task.clone()));
    assert_eq!(diagram.object(&flow).unwrap().target_ref, Some(task.clone()));

    modeler.undo().unwrap();
    let diagram = modeler.diagram();
    assert_eq!(diagram.element(&flow).unwrap().target, Some(end.clone()));
    assert_eq!(diagram.object(&flow).unwrap().target_ref, Some(end.clone()));
    assert_eq!(diagram.element(&end).unwrap().incoming, vec![flow]);
    assert_eq!(diagram.element(&task).unwrap().parent, None);
}

#[test]
fn test_sequence_flow_across_pools_becomes_message_flow() {
    let mut modeler = modeler();
    let (pool_a, collaboration) = promote(&mut modeler);
    let pool_b = modeler.create_participant(true).unwrap();
    modeling::create_shape(&mut modeler, &pool_b, Point::new(350.0, 500.0), &collaboration, false)
        .unwrap();

    let first = place(&mut modeler, ElementKind::Task, 150.0, 200.0, &pool_a);
    let second = place(&mut modeler, ElementKind::Task, 350.0, 200.0, &pool_a);
    let flow =
        modeling::connect(&mut modeler, &first, &second, ElementKind::SequenceFlow, None).unwrap();
    assert_eq!(modeler.diagram().element(&flow).unwrap().parent, Some(pool_a.clone()));

    modeler
        .move_elements(vec![second.clone()], Point::new(0.0, 300.0), Some(&pool_b))
        .unwrap();

    let diagram = modeler.diagram();
    assert_eq!(diagram.element(&second).unwrap().parent, Some(pool_b.clone()));
    let pool_b_process = diagram.object(&pool_b).unwrap().process_ref.clone();
    assert_eq!(diagram.object(&second).unwrap().parent, pool_b_process);
    assert_eq!(diagram.element(&flow).unwrap().parent, None);

    let connections = outgoing(&modeler, &first);
    assert_eq!(connections.len(), 1);
    let message_flow = diagram.element(&connections[0]).unwrap();
    assert_eq!(message_flow.kind, ElementKind::MessageFlow);
    assert_eq!(message_flow.target, Some(second.clone()));
    assert_eq!(message_flow.parent, Some(collaboration.clone()));
    assert_eq!(diagram.object(&message_flow.id).unwrap().parent, Some(collaboration));

    modeler.undo().unwrap();
    let diagram = modeler.diagram();
    assert_eq!(outgoing(&modeler, &first), vec![flow.clone()]);
    assert_eq!(diagram.element(&flow).unwrap().kind, ElementKind::SequenceFlow);
    assert_eq!(diagram.element(&flow).unwrap().parent, Some(pool_a.clone()));
    assert_eq!(diagram.element(&second).unwrap().parent, Some(pool_a));
    assert_eq!(diagram.object(&second).unwrap().parent, Some(process()));
}

#[test]
fn test_rejected_drop_on_collaboration_shows_tooltip() {
    let log = Rc::new(FeedbackLog::new());
    let mut modeler = Modeler::with_collaborators(
        Diagram::new(),
        ModelerConfig::with_defaults(),
        Rc::new(BpmnRules::new()),
        log.clone(),
    );
    let (_, collaboration) = promote(&mut modeler);
    let undo_depth = modeler.stack().undo_depth();

    let err = modeler
        .place(ShapeAttrs::new(ElementKind::Task), Point::new(100.0, 100.0), &collaboration)
        .unwrap_err();

    assert!(matches!(err, ModelerError::Validation(_)));
    assert_eq!(
        log.tooltips(),
        vec![Tooltip::error(Point::new(105.0, 105.0), COLLABORATION_ERROR)]
    );
    assert_eq!(modeler.stack().undo_depth(), undo_depth);
}

#[test]
fn test_moving_task_onto_collaboration_is_rejected() {
    let log = Rc::new(FeedbackLog::new());
    let mut modeler = Modeler::with_collaborators(
        Diagram::new(),
        ModelerConfig::with_defaults(),
        Rc::new(BpmnRules::new()),
        log.clone(),
    );
    let (participant, collaboration) = promote(&mut modeler);
    let task = place(&mut modeler, ElementKind::Task, 150.0, 200.0, &participant);

    let result = modeler.move_elements(vec![task.clone()], Point::new(0.0, 400.0), Some(&collaboration));

    assert!(result.is_err());
    assert_eq!(log.tooltips().len(), 1);
    assert_eq!(log.tooltips()[0].message, COLLABORATION_ERROR);
    assert_eq!(modeler.diagram().element(&task).unwrap().parent, Some(participant));
}

#[test]
fn test_no_tooltip_with_feedback_disabled() {
    let log = Rc::new(FeedbackLog::new());
    let mut config = ModelerConfig::with_defaults();
    config.feedback = false;
    let mut modeler =
        Modeler::with_collaborators(Diagram::new(), config, Rc::new(BpmnRules::new()), log.clone());
    let (_, collaboration) = promote(&mut modeler);

    let result =
        modeler.place(ShapeAttrs::new(ElementKind::Task), Point::new(100.0, 100.0), &collaboration);

    assert!(result.is_err());
    assert!(log.tooltips().is_empty());
}

#[test]
fn test_moving_container_into_its_descendant_is_rejected() {
    let mut modeler = modeler();
    let outer = place(&mut modeler, ElementKind::SubProcess, 300.0, 200.0, &process());
    let inner = place(&mut modeler, ElementKind::SubProcess, 300.0, 200.0, &outer);
    let before = modeler.diagram().clone();
    let undo_depth = modeler.stack().undo_depth();

    let err = modeler
        .move_elements(vec![outer.clone()], Point::new(0.0, 0.0), Some(&inner))
        .unwrap_err();
    assert!(matches!(err, ModelerError::Validation(_)));
    assert_eq!(*modeler.diagram(), before);
    assert_eq!(modeler.stack().undo_depth(), undo_depth);

    let err = modeler
        .move_elements(vec![outer.clone()], Point::new(10.0, 0.0), Some(&outer))
        .unwrap_err();
    assert!(matches!(err, ModelerError::Validation(_)));

    // the command itself refuses too, without the facade's rule check
    let err =
        modeling::move_shapes(&mut modeler, vec![outer.clone()], Point::new(0.0, 0.0), Some(&inner))
            .unwrap_err();
    assert!(matches!(err, ModelerError::Validation(_)));
    assert_eq!(modeler.diagram().element(&outer).unwrap().parent, Some(process()));
    assert_eq!(children(&modeler, &inner), Vec::<ElementId>::new());
    assert_eq!(modeler.diagram().descendants(&outer), vec![inner]);
    assert_eq!(modeler.stack().undo_depth(), undo_depth);
}

/// Standard rules, except that sub-processes may not be placed anywhere.
struct FlatProcessRules;

impl ConnectionRules for FlatProcessRules {
    fn can_connect_sequence_flow(&self, diagram: &Diagram, source: &str, target: &str) -> bool {
        BpmnRules.can_connect_sequence_flow(diagram, source, target)
    }

    fn can_connect_message_flow(&self, diagram: &Diagram, source: &str, target: &str) -> bool {
        BpmnRules.can_connect_message_flow(diagram, source, target)
    }
}

impl PlacementRules for FlatProcessRules {
    fn can_create(&self, diagram: &Diagram, kind: ElementKind, target: &str) -> bool {
        kind != ElementKind::SubProcess && BpmnRules.can_create(diagram, kind, target)
    }

    fn can_attach(
        &self,
        diagram: &Diagram,
        kind: ElementKind,
        target: &str,
        position: Option<Point>,
    ) -> AttachRule {
        if kind == ElementKind::SubProcess {
            return AttachRule::Reject;
        }
        BpmnRules.can_attach(diagram, kind, target, position)
    }
}

#[test]
fn test_injected_rules_decide_placement() {
    let mut modeler = Modeler::with_collaborators(
        Diagram::new(),
        ModelerConfig::with_defaults(),
        Rc::new(FlatProcessRules),
        Rc::new(FeedbackLog::new()),
    );

    let err = modeler
        .place(ShapeAttrs::new(ElementKind::SubProcess), Point::new(300.0, 200.0), &process())
        .unwrap_err();
    assert!(matches!(err, ModelerError::Validation(_)));
    assert!(children(&modeler, &process()).is_empty());

    let task = modeler
        .place(ShapeAttrs::new(ElementKind::Task), Point::new(100.0, 100.0), &process())
        .unwrap();
    assert_eq!(children(&modeler, &process()), vec![task]);
}
