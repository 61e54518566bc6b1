use serde::{Deserialize, Serialize};

use crate::{Bounds, ElementId, ElementKind, Point};

/// A shape or connection on the canvas.
///
/// Shapes carry `bounds`; connections carry `source`, `target` and
/// `waypoints`. Both take part in the parent/children tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    pub bounds: Bounds,
    pub parent: Option<ElementId>,
    #[serde(default)]
    pub children: Vec<ElementId>,
    pub host: Option<ElementId>,
    #[serde(default)]
    pub attachers: Vec<ElementId>,
    #[serde(default)]
    pub incoming: Vec<ElementId>,
    #[serde(default)]
    pub outgoing: Vec<ElementId>,
    pub source: Option<ElementId>,
    pub target: Option<ElementId>,
    #[serde(default)]
    pub waypoints: Vec<Point>,
}

impl Element {
    pub fn new(id: ElementId, kind: ElementKind) -> Self {
        let (width, height) = kind.default_size();
        Self {
            id,
            kind,
            bounds: Bounds::new(0.0, 0.0, width, height),
            parent: None,
            children: Vec::new(),
            host: None,
            attachers: Vec::new(),
            incoming: Vec::new(),
            outgoing: Vec::new(),
            source: None,
            target: None,
            waypoints: Vec::new(),
        }
    }

    pub fn is_connection(&self) -> bool {
        self.kind.is_connection()
    }

    pub fn center(&self) -> Point {
        self.bounds.center()
    }

    /// Incoming and outgoing connections, without duplicates.
    pub fn connections(&self) -> Vec<ElementId> {
        let mut connections = self.incoming.clone();
        for id in &self.outgoing {
            if !connections.contains(id) {
                connections.push(id.clone());
            }
        }
        connections
    }
}
