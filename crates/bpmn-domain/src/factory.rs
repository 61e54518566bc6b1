//! Construction of detached elements.
//!
//! Everything built here is registered in the [`Diagram`] but not attached to
//! the canvas; the `shape.create` and `connection.create` commands do that.

use bpmn_core::ModelerResult;

use crate::{BusinessObject, Diagram, Element, ElementId, ElementKind};

/// Attributes for a new shape or connection.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeAttrs {
    pub kind: ElementKind,
    pub id: Option<ElementId>,
    pub name: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub attached_to_ref: Option<ElementId>,
    pub cancel_activity: Option<bool>,
    pub process_ref: Option<ElementId>,
}

impl ShapeAttrs {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            id: None,
            name: None,
            width: None,
            height: None,
            attached_to_ref: None,
            cancel_activity: None,
            process_ref: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<ElementId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}

/// Register a detached element built from `attrs` and return its id.
pub fn create_element(diagram: &mut Diagram, attrs: ShapeAttrs) -> ModelerResult<ElementId> {
    let id = attrs
        .id
        .clone()
        .unwrap_or_else(|| ElementId::generate(attrs.kind));

    let mut element = Element::new(id.clone(), attrs.kind);
    if let Some(width) = attrs.width {
        element.bounds.width = width;
    }
    if let Some(height) = attrs.height {
        element.bounds.height = height;
    }

    let mut object = BusinessObject::new(id.clone(), attrs.kind);
    object.name = attrs.name;
    object.attached_to_ref = attrs.attached_to_ref;
    object.cancel_activity = attrs.cancel_activity;
    object.process_ref = attrs.process_ref;

    diagram.register(element, object)?;
    tracing::trace!("Registered {} {}", attrs.kind, id);
    Ok(id)
}

/// New canvas root of the given kind.
pub fn create_root(diagram: &mut Diagram, kind: ElementKind) -> ModelerResult<ElementId> {
    create_element(diagram, ShapeAttrs::new(kind))
}

/// A participant, optionally with a fresh process of its own.
pub fn create_participant(diagram: &mut Diagram, with_process: bool) -> ModelerResult<ElementId> {
    let mut attrs = ShapeAttrs::new(ElementKind::Participant);
    if with_process {
        let process = ElementId::generate(ElementKind::Process);
        diagram.register_object(BusinessObject::new(process.clone(), ElementKind::Process))?;
        attrs.process_ref = Some(process);
    }
    create_element(diagram, attrs)
}

/// Boundary event that will be attached to `host`.
pub fn create_boundary_event(diagram: &mut Diagram, host: &ElementId) -> ModelerResult<ElementId> {
    let mut attrs = ShapeAttrs::new(ElementKind::BoundaryEvent);
    attrs.attached_to_ref = Some(host.clone());
    attrs.cancel_activity = Some(true);
    create_element(diagram, attrs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_element_is_detached() {
        let mut diagram = Diagram::new();
        let id = create_element(&mut diagram, ShapeAttrs::new(ElementKind::Task).with_name("Review")).unwrap();

        let element = diagram.element(&id).unwrap();
        assert_eq!(element.bounds.width, 100.0);
        assert_eq!(element.parent, None);
        assert_eq!(diagram.object(&id).unwrap().name.as_deref(), Some("Review"));
        assert!(!diagram.is_attached(&id));
    }

    #[test]
    fn test_participant_with_process() {
        let mut diagram = Diagram::new();
        let participant = create_participant(&mut diagram, true).unwrap();

        let process = diagram.object(&participant).unwrap().process_ref.clone().unwrap();
        assert!(diagram.is(&process, ElementKind::Process));
        assert!(diagram.get(&process).is_none());

        let bare = create_participant(&mut diagram, false).unwrap();
        assert!(diagram.object(&bare).unwrap().process_ref.is_none());
    }

    #[test]
    fn test_boundary_event_refs() {
        let mut diagram = Diagram::new();
        let host = ElementId::new("Task_1");
        let event = create_boundary_event(&mut diagram, &host).unwrap();

        let object = diagram.object(&event).unwrap();
        assert_eq!(object.attached_to_ref, Some(host));
        assert_eq!(object.cancel_activity, Some(true));
    }
}
