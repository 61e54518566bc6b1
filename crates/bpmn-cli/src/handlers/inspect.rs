use bpmn_domain::{DiagramPlane, ElementId, ElementKind};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::context::load_diagram;
use crate::output;

#[derive(Debug, Serialize)]
pub struct DiagramSummary {
    pub definitions: ElementId,
    pub root: Option<ElementId>,
    pub root_kind: Option<ElementKind>,
    /// Elements reachable from the root, by type name.
    pub elements: BTreeMap<String, usize>,
    pub detached: usize,
    pub plane: DiagramPlane,
}

pub fn handle(path: &str) -> anyhow::Result<()> {
    let diagram = match load_diagram(path) {
        Ok(diagram) => diagram,
        Err(err) => output::output_error(&format!("{:#}", err)),
    };

    let mut elements = BTreeMap::new();
    let mut detached = 0;
    for element in diagram.elements() {
        if diagram.is_attached(&element.id) {
            *elements.entry(element.kind.type_name()).or_insert(0) += 1;
        } else {
            detached += 1;
        }
    }

    output::output_success(DiagramSummary {
        definitions: diagram.definitions_id().clone(),
        root: diagram.root_id().cloned(),
        root_kind: diagram.root_id().and_then(|root| diagram.kind_of(root)),
        elements,
        detached,
        plane: diagram.plane(),
    })
}
