#![allow(dead_code)]

use bpmn_core::ModelerConfig;
use bpmn_domain::modeling;
use bpmn_domain::{Diagram, ElementId, ElementKind, Modeler, Point, ShapeAttrs};

pub fn modeler() -> Modeler {
    Modeler::new(Diagram::new(), ModelerConfig::with_defaults())
}

pub fn process() -> ElementId {
    ElementId::new("Process_1")
}

/// Create a new `kind` shape centered at (x, y) below `parent`.
pub fn place(modeler: &mut Modeler, kind: ElementKind, x: f64, y: f64, parent: &ElementId) -> ElementId {
    let shape = modeler.create_element(ShapeAttrs::new(kind)).unwrap();
    modeling::create_shape(modeler, &shape, Point::new(x, y), parent, false).unwrap()
}

/// Drop a participant without a process onto the process root.
/// Returns the participant and the new collaboration root.
pub fn promote(modeler: &mut Modeler) -> (ElementId, ElementId) {
    let participant = modeler.create_participant(false).unwrap();
    modeling::create_shape(modeler, &participant, Point::new(350.0, 200.0), &process(), false)
        .unwrap();
    let collaboration = modeler.diagram().root_id().cloned().unwrap();
    (participant, collaboration)
}

pub fn children(modeler: &Modeler, id: &ElementId) -> Vec<ElementId> {
    modeler.diagram().element(id).unwrap().children.clone()
}
