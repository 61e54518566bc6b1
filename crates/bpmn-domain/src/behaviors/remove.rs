use bpmn_core::{Dispatcher, ModelerResult, DEFAULT_PRIORITY};

use crate::commands::{ModelingScope, ModelingStack, SHAPE_DELETE};
use crate::modeling;
use crate::{ElementId, ElementKind};

const COLLABORATION_ROOT: &str = "collaborationRoot";

/// Turns the diagram back into a process once its last participant is deleted.
pub struct RemoveBehavior;

impl RemoveBehavior {
    pub fn register(self, stack: &mut ModelingStack) {
        let interceptors = stack.interceptors();
        interceptors.pre_execute(SHAPE_DELETE, DEFAULT_PRIORITY, remember_collaboration);
        interceptors.post_execute(SHAPE_DELETE, DEFAULT_PRIORITY, restore_process);
    }
}

fn remember_collaboration(scope: &mut ModelingScope<'_>) -> ModelerResult<()> {
    let Some(shape) = scope.context().shape.clone() else {
        return Ok(());
    };
    let diagram = scope.model();
    if !diagram.is(&shape, ElementKind::Participant) {
        return Ok(());
    }
    let Some(parent) = diagram.element(&shape)?.parent.clone() else {
        return Ok(());
    };
    if diagram.is(&parent, ElementKind::Collaboration) {
        scope.context_mut()?.stash(COLLABORATION_ROOT, &parent)?;
    }
    Ok(())
}

fn restore_process(scope: &mut ModelingScope<'_>) -> ModelerResult<()> {
    let Some(collaboration) = scope.context().stashed::<ElementId>(COLLABORATION_ROOT)? else {
        return Ok(());
    };
    let diagram = scope.model();
    if diagram.root_id() != Some(&collaboration) {
        return Ok(());
    }
    let has_participants = diagram
        .element(&collaboration)?
        .children
        .iter()
        .any(|child| diagram.is(child, ElementKind::Participant));
    if has_participants {
        return Ok(());
    }

    let process = modeling::make_process(scope)?;
    tracing::debug!("Last participant removed, {} is the new root", process);
    Ok(())
}
