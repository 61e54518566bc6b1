use serde::{Deserialize, Serialize};

use crate::{ElementId, ElementKind};

/// Semantic BPMN element behind a shape.
///
/// `contents` is the containment list of the object: `rootElements` of the
/// definitions, `participants` and `messageFlows` of a collaboration,
/// `flowElements` of a process or sub process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessObject {
    pub id: ElementId,
    pub kind: ElementKind,
    pub name: Option<String>,
    pub parent: Option<ElementId>,
    #[serde(default)]
    pub contents: Vec<ElementId>,
    pub process_ref: Option<ElementId>,
    pub attached_to_ref: Option<ElementId>,
    pub cancel_activity: Option<bool>,
    pub source_ref: Option<ElementId>,
    pub target_ref: Option<ElementId>,
}

impl BusinessObject {
    pub fn new(id: ElementId, kind: ElementKind) -> Self {
        Self {
            id,
            kind,
            name: None,
            parent: None,
            contents: Vec::new(),
            process_ref: None,
            attached_to_ref: None,
            cancel_activity: None,
            source_ref: None,
            target_ref: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn is(&self, kind: ElementKind) -> bool {
        self.kind == kind
    }
}
