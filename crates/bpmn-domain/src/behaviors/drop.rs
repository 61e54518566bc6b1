use bpmn_core::{Dispatcher, ModelerResult, DEFAULT_PRIORITY};
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::commands::{ModelingScope, ModelingStack, ELEMENTS_MOVE};
use crate::modeling;
use crate::rules::ConnectionRules;
use crate::{Diagram, ElementId, ElementKind};

/// Repairs connections after elements were moved across pool boundaries.
///
/// Sequence flows that now cross pools become message flows where allowed;
/// message flows that now stay within one pool become sequence flows where
/// allowed. Anything else that became invalid is removed.
pub struct DropBehavior {
    rules: Rc<dyn ConnectionRules>,
}

impl DropBehavior {
    pub fn new(rules: Rc<dyn ConnectionRules>) -> Self {
        Self { rules }
    }

    pub fn register(self, stack: &mut ModelingStack) {
        let rules = self.rules;
        stack
            .interceptors()
            .post_execute(ELEMENTS_MOVE, DEFAULT_PRIORITY, move |scope| {
                fix_connections(scope, rules.as_ref())
            });
    }
}

fn fix_connections(scope: &mut ModelingScope<'_>, rules: &dyn ConnectionRules) -> ModelerResult<()> {
    let connections = moved_connections(scope.model(), &scope.context().shapes);

    for connection in connections {
        let diagram = scope.model();
        let Some(element) = diagram.get(&connection) else {
            continue;
        };
        if element.parent.is_none() {
            continue;
        }
        let (Some(source), Some(target)) = (element.source.clone(), element.target.clone()) else {
            continue;
        };
        let waypoints = element.waypoints.clone();

        let replacement = match element.kind {
            ElementKind::SequenceFlow if !rules.can_connect_sequence_flow(diagram, &source, &target) => {
                Some(rules
                    .can_connect_message_flow(diagram, &source, &target)
                    .then_some(ElementKind::MessageFlow))
            }
            ElementKind::MessageFlow if !rules.can_connect_message_flow(diagram, &source, &target) => {
                Some(rules
                    .can_connect_sequence_flow(diagram, &source, &target)
                    .then_some(ElementKind::SequenceFlow))
            }
            _ => None,
        };
        let Some(replacement) = replacement else {
            continue;
        };

        tracing::debug!("Replacing invalid connection {} with {:?}", connection, replacement);
        modeling::remove_connection(scope, &connection)?;
        if let Some(kind) = replacement {
            modeling::connect(scope, &source, &target, kind, Some(waypoints))?;
        }
    }
    Ok(())
}

/// Connections touching the moved shapes or anything inside them.
fn moved_connections(diagram: &Diagram, shapes: &[ElementId]) -> BTreeSet<ElementId> {
    let mut connections = BTreeSet::new();
    for shape in shapes {
        let mut closure = diagram.descendants(shape);
        closure.push(shape.clone());
        for id in closure {
            let Some(element) = diagram.get(&id) else {
                continue;
            };
            if element.is_connection() {
                connections.insert(id);
            } else {
                connections.extend(element.connections());
            }
        }
    }
    connections
}
