use bpmn_core::{Dispatcher, ModelerResult, DEFAULT_PRIORITY};

use crate::commands::{ModelingScope, ModelingStack, SHAPE_CREATE};
use crate::modeling;
use crate::{Diagram, ElementId, ElementKind, ModelingContext, Point};

const OLD_PROCESS_REF: &str = "oldProcessRef";

/// Turns a process diagram into a collaboration when a participant is
/// created on the process root.
///
/// The participant lands on a new collaboration root, takes over the process
/// as its process reference and receives all existing process children.
pub struct CreateParticipantBehavior;

impl CreateParticipantBehavior {
    pub fn register(self, stack: &mut ModelingStack) {
        let interceptors = stack.interceptors();
        interceptors.pre_execute(SHAPE_CREATE, DEFAULT_PRIORITY, promote_process_root);
        interceptors.execute(SHAPE_CREATE, DEFAULT_PRIORITY, assign_process_ref);
        interceptors.revert(SHAPE_CREATE, DEFAULT_PRIORITY, restore_process_ref);
        interceptors.post_execute(SHAPE_CREATE, DEFAULT_PRIORITY, wrap_process_children);
    }
}

fn promote_process_root(scope: &mut ModelingScope<'_>) -> ModelerResult<()> {
    let context = scope.context();
    let (Some(shape), Some(parent)) = (context.shape.clone(), context.parent.clone()) else {
        return Ok(());
    };
    let diagram = scope.model();
    if !diagram.is(&parent, ElementKind::Process) || !diagram.is(&shape, ElementKind::Participant) {
        return Ok(());
    }

    // detaches the process root
    let collaboration = modeling::make_collaboration(scope)?;
    tracing::debug!("Promoted {} to collaboration {}", parent, collaboration);

    let context = scope.context_mut()?;
    context.parent = Some(collaboration);
    context.process_root = Some(parent);
    Ok(())
}

fn assign_process_ref(diagram: &mut Diagram, context: &mut ModelingContext) -> ModelerResult<()> {
    let (Some(shape), Some(process)) = (context.shape.clone(), context.process_root.clone()) else {
        return Ok(());
    };
    let old = diagram.object_mut(&shape)?.process_ref.replace(process);
    context.stash(OLD_PROCESS_REF, &old)
}

fn restore_process_ref(diagram: &mut Diagram, context: &ModelingContext) -> ModelerResult<()> {
    let (Some(shape), Some(_)) = (&context.shape, &context.process_root) else {
        return Ok(());
    };
    let old = context
        .stashed::<Option<ElementId>>(OLD_PROCESS_REF)?
        .flatten();
    diagram.object_mut(shape)?.process_ref = old;
    Ok(())
}

fn wrap_process_children(scope: &mut ModelingScope<'_>) -> ModelerResult<()> {
    let context = scope.context();
    let (Some(shape), Some(process_root)) = (context.shape.clone(), context.process_root.clone())
    else {
        return Ok(());
    };

    // the process root is already detached at this point
    let children = scope.model().element(&process_root)?.children.clone();
    if children.is_empty() {
        return Ok(());
    }
    modeling::move_shapes(scope, children, Point::default(), Some(&shape))
}
