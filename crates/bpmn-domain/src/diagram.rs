use bpmn_core::{ModelerError, ModelerResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::collections;
use crate::{BusinessObject, Element, ElementId, ElementKind};

const DEFINITIONS_ID: &str = "Definitions_1";
const PROCESS_ID: &str = "Process_1";

/// In-memory BPMN diagram: the canvas tree of shapes and connections plus the
/// semantic tree of business objects, keyed by a shared id.
///
/// Elements may be registered without being attached to the canvas; only
/// elements reachable from the root are part of the rendered diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    definitions: ElementId,
    root: Option<ElementId>,
    elements: BTreeMap<ElementId, Element>,
    objects: BTreeMap<ElementId, BusinessObject>,
}

/// Diagram interchange plane, derived from the canvas tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramPlane {
    pub bpmn_element: Option<ElementId>,
    pub plane_elements: Vec<ElementId>,
}

impl Diagram {
    /// Definitions holding a single, empty process as canvas root.
    pub fn new() -> Self {
        let mut diagram = Self::empty();
        let process = ElementId::new(PROCESS_ID);
        let mut object = BusinessObject::new(process.clone(), ElementKind::Process);
        object.parent = Some(diagram.definitions.clone());
        if let Some(definitions) = diagram.objects.get_mut(DEFINITIONS_ID) {
            definitions.contents.push(process.clone());
        }
        diagram.objects.insert(process.clone(), object);
        diagram
            .elements
            .insert(process.clone(), Element::new(process.clone(), ElementKind::Process));
        diagram.root = Some(process);
        diagram
    }

    /// Bare definitions without any root.
    pub fn empty() -> Self {
        let definitions = ElementId::new(DEFINITIONS_ID);
        let mut objects = BTreeMap::new();
        objects.insert(
            definitions.clone(),
            BusinessObject::new(definitions.clone(), ElementKind::Definitions),
        );
        Self {
            definitions,
            root: None,
            elements: BTreeMap::new(),
            objects,
        }
    }

    pub fn from_json(json: &str) -> ModelerResult<Self> {
        let diagram: Self = serde_json::from_str(json)?;
        if !diagram.objects.contains_key(diagram.definitions.as_str()) {
            return Err(ModelerError::Validation(format!(
                "definitions {} has no business object",
                diagram.definitions
            )));
        }
        Ok(diagram)
    }

    pub fn to_json(&self) -> ModelerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn definitions_id(&self) -> &ElementId {
        &self.definitions
    }

    pub fn root_id(&self) -> Option<&ElementId> {
        self.root.as_ref()
    }

    pub fn root(&self) -> ModelerResult<&Element> {
        let root = self
            .root
            .as_ref()
            .ok_or_else(|| ModelerError::NotFound("canvas root".to_string()))?;
        self.element(root)
    }

    /// Replace the canvas root, returning the previous one.
    pub fn set_root(&mut self, root: Option<ElementId>) -> Option<ElementId> {
        std::mem::replace(&mut self.root, root)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn element(&self, id: &str) -> ModelerResult<&Element> {
        self.elements
            .get(id)
            .ok_or_else(|| ModelerError::NotFound(format!("element {}", id)))
    }

    pub fn element_mut(&mut self, id: &str) -> ModelerResult<&mut Element> {
        self.elements
            .get_mut(id)
            .ok_or_else(|| ModelerError::NotFound(format!("element {}", id)))
    }

    pub fn get_object(&self, id: &str) -> Option<&BusinessObject> {
        self.objects.get(id)
    }

    pub fn object(&self, id: &str) -> ModelerResult<&BusinessObject> {
        self.objects
            .get(id)
            .ok_or_else(|| ModelerError::NotFound(format!("business object {}", id)))
    }

    pub fn object_mut(&mut self, id: &str) -> ModelerResult<&mut BusinessObject> {
        self.objects
            .get_mut(id)
            .ok_or_else(|| ModelerError::NotFound(format!("business object {}", id)))
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    pub fn objects(&self) -> impl Iterator<Item = &BusinessObject> {
        self.objects.values()
    }

    /// Kind of the element or, for shapeless objects, of the business object.
    pub fn kind_of(&self, id: &str) -> Option<ElementKind> {
        self.elements
            .get(id)
            .map(|element| element.kind)
            .or_else(|| self.objects.get(id).map(|object| object.kind))
    }

    pub fn is(&self, id: &str, kind: ElementKind) -> bool {
        self.kind_of(id) == Some(kind)
    }

    /// Add a detached element together with its business object.
    pub fn register(&mut self, element: Element, object: BusinessObject) -> ModelerResult<()> {
        if element.id != object.id {
            return Err(ModelerError::Validation(format!(
                "element {} and business object {} must share an id",
                element.id, object.id
            )));
        }
        if self.elements.contains_key(element.id.as_str()) {
            return Err(ModelerError::Validation(format!(
                "element {} already exists",
                element.id
            )));
        }
        self.register_object(object)?;
        self.elements.insert(element.id.clone(), element);
        Ok(())
    }

    /// Add a business object that has no shape of its own, e.g. the process
    /// behind a participant.
    pub fn register_object(&mut self, object: BusinessObject) -> ModelerResult<()> {
        if self.objects.contains_key(object.id.as_str()) {
            return Err(ModelerError::Validation(format!(
                "business object {} already exists",
                object.id
            )));
        }
        self.objects.insert(object.id.clone(), object);
        Ok(())
    }

    /// Attach `child` below `parent` on the canvas. Returns the child's index.
    pub fn add_child(
        &mut self,
        parent: &str,
        child: &str,
        index: Option<usize>,
    ) -> ModelerResult<usize> {
        let child_id = self.element(child)?.id.clone();
        let parent_id = self.element(parent)?.id.clone();
        let index = collections::add(&mut self.element_mut(parent)?.children, child_id, index);
        self.element_mut(child)?.parent = Some(parent_id);
        Ok(index)
    }

    /// Detach `child` from `parent`, returning the index it had.
    pub fn remove_child(&mut self, parent: &str, child: &str) -> ModelerResult<Option<usize>> {
        let child_id = self.element(child)?.id.clone();
        let index = collections::remove(&mut self.element_mut(parent)?.children, &child_id);
        let element = self.element_mut(child)?;
        if element.parent.as_deref() == Some(parent) {
            element.parent = None;
        }
        Ok(index)
    }

    /// Put `child` into the containment list of `parent` in the semantic tree.
    pub fn add_content(
        &mut self,
        parent: &str,
        child: &str,
        index: Option<usize>,
    ) -> ModelerResult<usize> {
        let child_id = self.object(child)?.id.clone();
        let parent_id = self.object(parent)?.id.clone();
        let index = collections::add(&mut self.object_mut(parent)?.contents, child_id, index);
        self.object_mut(child)?.parent = Some(parent_id);
        Ok(index)
    }

    /// Take `child` out of the containment list of `parent`.
    pub fn remove_content(&mut self, parent: &str, child: &str) -> ModelerResult<Option<usize>> {
        let child_id = self.object(child)?.id.clone();
        let index = collections::remove(&mut self.object_mut(parent)?.contents, &child_id);
        let object = self.object_mut(child)?;
        if object.parent.as_deref() == Some(parent) {
            object.parent = None;
        }
        Ok(index)
    }

    /// Canvas parents of `id`, nearest first.
    pub fn ancestors(&self, id: &str) -> Vec<ElementId> {
        let mut ancestors = Vec::new();
        let mut current = self.elements.get(id).and_then(|element| element.parent.clone());
        while let Some(parent) = current {
            if ancestors.contains(&parent) {
                break;
            }
            current = self.elements.get(parent.as_str()).and_then(|element| element.parent.clone());
            ancestors.push(parent);
        }
        ancestors
    }

    /// All canvas descendants of `id` in depth-first order, excluding `id`.
    pub fn descendants(&self, id: &str) -> Vec<ElementId> {
        let mut result = Vec::new();
        let mut seen = HashSet::new();
        let mut stack: Vec<ElementId> = self
            .elements
            .get(id)
            .map(|element| element.children.iter().rev().cloned().collect())
            .unwrap_or_default();
        while let Some(next) = stack.pop() {
            // a malformed tree may loop back; visit each element once
            if next.as_str() == id || !seen.insert(next.clone()) {
                continue;
            }
            if let Some(element) = self.elements.get(next.as_str()) {
                stack.extend(element.children.iter().rev().cloned());
            }
            result.push(next);
        }
        result
    }

    /// Whether `id` is the root or hangs below it.
    pub fn is_attached(&self, id: &str) -> bool {
        let Some(root) = self.root.as_ref() else {
            return false;
        };
        root.as_str() == id || self.ancestors(id).contains(root)
    }

    /// The participant `id` lives in, if any; a participant is its own.
    pub fn participant_of(&self, id: &str) -> Option<ElementId> {
        if self.is(id, ElementKind::Participant) {
            return self.elements.get(id).map(|element| element.id.clone());
        }
        self.ancestors(id)
            .into_iter()
            .find(|ancestor| self.is(ancestor, ElementKind::Participant))
    }

    pub fn plane(&self) -> DiagramPlane {
        DiagramPlane {
            bpmn_element: self.root.clone(),
            plane_elements: self
                .root
                .as_ref()
                .map(|root| self.descendants(root))
                .unwrap_or_default(),
        }
    }
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(diagram: &mut Diagram, id: &str) -> ElementId {
        let id = ElementId::new(id);
        diagram
            .register(
                Element::new(id.clone(), ElementKind::Task),
                BusinessObject::new(id.clone(), ElementKind::Task),
            )
            .unwrap();
        id
    }

    #[test]
    fn test_new_diagram_has_process_root() {
        let diagram = Diagram::new();
        let root = diagram.root().unwrap();

        assert_eq!(root.kind, ElementKind::Process);
        assert_eq!(
            diagram.object(&root.id).unwrap().parent.as_ref(),
            Some(diagram.definitions_id())
        );
        assert!(diagram.is_attached(&root.id));
    }

    #[test]
    fn test_add_and_remove_child() {
        let mut diagram = Diagram::new();
        let a = task(&mut diagram, "Task_a");
        let b = task(&mut diagram, "Task_b");
        assert!(!diagram.is_attached(&a));

        diagram.add_child("Process_1", &a, None).unwrap();
        assert_eq!(diagram.add_child("Process_1", &b, Some(0)).unwrap(), 0);
        assert_eq!(diagram.root().unwrap().children, vec![b.clone(), a.clone()]);
        assert!(diagram.is_attached(&a));

        assert_eq!(diagram.remove_child("Process_1", &b).unwrap(), Some(0));
        assert_eq!(diagram.element(&b).unwrap().parent, None);
        assert_eq!(diagram.plane().plane_elements, vec![a]);
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut diagram = Diagram::new();
        task(&mut diagram, "Task_a");
        let err = diagram
            .register(
                Element::new(ElementId::new("Task_a"), ElementKind::Task),
                BusinessObject::new(ElementId::new("Task_a"), ElementKind::Task),
            )
            .unwrap_err();
        assert!(matches!(err, ModelerError::Validation(_)));
    }

    #[test]
    fn test_descendants_and_participant_of() {
        let mut diagram = Diagram::new();
        let pool = ElementId::new("Participant_1");
        diagram
            .register(
                Element::new(pool.clone(), ElementKind::Participant),
                BusinessObject::new(pool.clone(), ElementKind::Participant),
            )
            .unwrap();
        let inner = task(&mut diagram, "Task_inner");
        diagram.add_child("Process_1", &pool, None).unwrap();
        diagram.add_child(&pool, &inner, None).unwrap();

        assert_eq!(diagram.descendants("Process_1"), vec![pool.clone(), inner.clone()]);
        assert_eq!(diagram.participant_of(&inner), Some(pool.clone()));
        assert_eq!(diagram.participant_of(&pool), Some(pool));
        assert_eq!(diagram.participant_of("Process_1"), None);
    }

    #[test]
    fn test_descendants_stop_at_cycles() {
        let mut diagram = Diagram::new();
        let outer = task(&mut diagram, "Task_outer");
        let inner = task(&mut diagram, "Task_inner");
        diagram.add_child("Process_1", &outer, None).unwrap();
        diagram.add_child(&outer, &inner, None).unwrap();
        diagram.add_child(&inner, &outer, None).unwrap();

        assert_eq!(diagram.descendants(&outer), vec![inner.clone()]);
        assert_eq!(diagram.descendants(&inner), vec![outer]);
    }

    #[test]
    fn test_json_snapshot() {
        let mut diagram = Diagram::new();
        let a = task(&mut diagram, "Task_a");
        diagram.add_child("Process_1", &a, None).unwrap();

        let restored = Diagram::from_json(&diagram.to_json().unwrap()).unwrap();
        assert_eq!(restored, diagram);
    }
}
