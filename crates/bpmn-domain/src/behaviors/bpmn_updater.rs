//! Keeps the semantic model in line with the canvas.
//!
//! Runs as low-priority execute hooks, after every other behavior has
//! finished touching the canvas, and reverts first on undo. Each update
//! stashes what it replaced in the context extras.

use bpmn_core::ModelerResult;
use serde::{Deserialize, Serialize};

use crate::commands::{
    ModelingStack, CONNECTION_CREATE, CONNECTION_DELETE, CONNECTION_RECONNECT_END, SHAPE_ATTACH,
    SHAPE_CREATE, SHAPE_DELETE, SHAPE_MOVE,
};
use crate::{Diagram, ElementId, ElementKind, ModelingContext};

/// Lower than any behavior, so the updater sees the final canvas state.
pub const UPDATER_PRIORITY: i32 = 500;

const SEMANTIC_PARENT: &str = "semanticParent";
const PROCESS_ATTACHED: &str = "processAttached";
const ATTACHED_TO_REF: &str = "oldAttachedToRef";
const CONNECTION_REFS: &str = "oldConnectionRefs";

const SEMANTIC_COMMANDS: [&str; 5] = [
    SHAPE_CREATE,
    SHAPE_DELETE,
    SHAPE_MOVE,
    CONNECTION_CREATE,
    CONNECTION_DELETE,
];

/// Where a business object was before the updater moved it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SemanticLink {
    parent: Option<ElementId>,
    index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ConnectionRefs {
    source_ref: Option<ElementId>,
    target_ref: Option<ElementId>,
}

pub struct BpmnUpdater;

impl BpmnUpdater {
    pub fn register(self, stack: &mut ModelingStack) {
        let interceptors = stack.interceptors();

        interceptors.execute(SEMANTIC_COMMANDS, UPDATER_PRIORITY, update_semantic_parent);
        interceptors.revert(SEMANTIC_COMMANDS, UPDATER_PRIORITY, revert_semantic_parent);

        interceptors.execute(SHAPE_CREATE, UPDATER_PRIORITY, attach_participant_process);
        interceptors.revert(SHAPE_CREATE, UPDATER_PRIORITY, detach_participant_process);

        interceptors.execute([SHAPE_CREATE, SHAPE_ATTACH], UPDATER_PRIORITY, update_attached_to_ref);
        interceptors.revert([SHAPE_CREATE, SHAPE_ATTACH], UPDATER_PRIORITY, revert_attached_to_ref);

        interceptors.execute(
            [CONNECTION_CREATE, CONNECTION_RECONNECT_END],
            UPDATER_PRIORITY,
            update_connection_refs,
        );
        interceptors.revert(
            [CONNECTION_CREATE, CONNECTION_RECONNECT_END],
            UPDATER_PRIORITY,
            revert_connection_refs,
        );
    }
}

fn subject(context: &ModelingContext) -> Option<ElementId> {
    context.shape.clone().or_else(|| context.connection.clone())
}

/// Business object that semantically contains children of `shape`.
///
/// Participants delegate to their process; shapes that are no container
/// delegate to their own parent.
pub fn semantic_container(diagram: &Diagram, shape: &str) -> Option<ElementId> {
    let mut current = diagram.get(shape).map(|element| element.id.clone());
    while let Some(id) = current {
        match diagram.kind_of(&id) {
            Some(ElementKind::Participant) => {
                return diagram.get_object(&id).and_then(|object| object.process_ref.clone());
            }
            Some(kind) if kind.is_flow_container() || kind == ElementKind::Collaboration => {
                return Some(id);
            }
            _ => current = diagram.get(&id).and_then(|element| element.parent.clone()),
        }
    }
    None
}

fn update_semantic_parent(diagram: &mut Diagram, context: &mut ModelingContext) -> ModelerResult<()> {
    let Some(id) = subject(context) else {
        return Ok(());
    };
    let old_parent = diagram.object(&id)?.parent.clone();
    let new_parent = diagram
        .element(&id)?
        .parent
        .clone()
        .and_then(|parent| semantic_container(diagram, &parent));

    if old_parent == new_parent {
        context.unstash(SEMANTIC_PARENT);
        return Ok(());
    }

    let index = match &old_parent {
        Some(old_parent) => diagram.remove_content(old_parent, &id)?,
        None => None,
    };
    if let Some(new_parent) = &new_parent {
        diagram.add_content(new_parent, &id, None)?;
    }
    tracing::trace!("Semantic parent of {}: {:?} -> {:?}", id, old_parent, new_parent);
    context.stash(
        SEMANTIC_PARENT,
        &SemanticLink {
            parent: old_parent,
            index,
        },
    )
}

fn revert_semantic_parent(diagram: &mut Diagram, context: &ModelingContext) -> ModelerResult<()> {
    let (Some(id), Some(link)) = (subject(context), context.stashed::<SemanticLink>(SEMANTIC_PARENT)?)
    else {
        return Ok(());
    };
    if let Some(current) = diagram.object(&id)?.parent.clone() {
        diagram.remove_content(&current, &id)?;
    }
    if let Some(parent) = &link.parent {
        diagram.add_content(parent, &id, link.index)?;
    }
    Ok(())
}

/// A participant's process becomes a root element of the definitions.
fn attach_participant_process(
    diagram: &mut Diagram,
    context: &mut ModelingContext,
) -> ModelerResult<()> {
    context.unstash(PROCESS_ATTACHED);
    let Some(shape) = context.shape.clone() else {
        return Ok(());
    };
    if !diagram.is(&shape, ElementKind::Participant) {
        return Ok(());
    }
    let Some(process) = diagram.object(&shape)?.process_ref.clone() else {
        return Ok(());
    };
    if diagram.object(&process)?.parent.is_some() {
        return Ok(());
    }

    let definitions = diagram.definitions_id().clone();
    diagram.add_content(&definitions, &process, None)?;
    context.stash(PROCESS_ATTACHED, &process)
}

fn detach_participant_process(diagram: &mut Diagram, context: &ModelingContext) -> ModelerResult<()> {
    let Some(process) = context.stashed::<ElementId>(PROCESS_ATTACHED)? else {
        return Ok(());
    };
    let definitions = diagram.definitions_id().clone();
    diagram.remove_content(&definitions, &process)?;
    Ok(())
}

/// Boundary events reference the business object of their host.
fn update_attached_to_ref(diagram: &mut Diagram, context: &mut ModelingContext) -> ModelerResult<()> {
    context.unstash(ATTACHED_TO_REF);
    let Some(shape) = context.shape.clone() else {
        return Ok(());
    };
    if !diagram.is(&shape, ElementKind::BoundaryEvent) {
        return Ok(());
    }
    let Some(host) = diagram.element(&shape)?.host.clone() else {
        return Ok(());
    };

    let object = diagram.object_mut(&shape)?;
    let old = object.attached_to_ref.replace(host);
    context.stash(ATTACHED_TO_REF, &old)
}

fn revert_attached_to_ref(diagram: &mut Diagram, context: &ModelingContext) -> ModelerResult<()> {
    let (Some(shape), Some(old)) = (
        &context.shape,
        context.stashed::<Option<ElementId>>(ATTACHED_TO_REF)?,
    ) else {
        return Ok(());
    };
    diagram.object_mut(shape)?.attached_to_ref = old;
    Ok(())
}

fn update_connection_refs(diagram: &mut Diagram, context: &mut ModelingContext) -> ModelerResult<()> {
    let Some(connection) = context.connection.clone() else {
        return Ok(());
    };
    let element = diagram.element(&connection)?;
    let (source, target) = (element.source.clone(), element.target.clone());

    let object = diagram.object_mut(&connection)?;
    let old = ConnectionRefs {
        source_ref: std::mem::replace(&mut object.source_ref, source),
        target_ref: std::mem::replace(&mut object.target_ref, target),
    };
    context.stash(CONNECTION_REFS, &old)
}

fn revert_connection_refs(diagram: &mut Diagram, context: &ModelingContext) -> ModelerResult<()> {
    let (Some(connection), Some(old)) = (
        &context.connection,
        context.stashed::<ConnectionRefs>(CONNECTION_REFS)?,
    ) else {
        return Ok(());
    };
    let object = diagram.object_mut(connection)?;
    object.source_ref = old.source_ref;
    object.target_ref = old.target_ref;
    Ok(())
}
