use bpmn_core::{Dispatcher, ModelerResult, DEFAULT_PRIORITY};

use crate::commands::{ModelingScope, ModelingStack, SHAPE_CREATE};
use crate::factory;
use crate::ElementKind;

/// Replaces an intermediate throw event dropped onto a host with a boundary
/// event attached to that host.
pub struct CreateBoundaryEventBehavior;

impl CreateBoundaryEventBehavior {
    pub fn register(self, stack: &mut ModelingStack) {
        stack
            .interceptors()
            .pre_execute(SHAPE_CREATE, DEFAULT_PRIORITY, morph_to_boundary_event);
    }
}

fn morph_to_boundary_event(scope: &mut ModelingScope<'_>) -> ModelerResult<()> {
    let context = scope.context();
    let (Some(shape), Some(host)) = (context.shape.clone(), context.host.clone()) else {
        return Ok(());
    };
    if !scope.model().is(&shape, ElementKind::IntermediateThrowEvent) {
        return Ok(());
    }

    let boundary_event = factory::create_boundary_event(scope.model_mut(), &host)?;
    tracing::debug!("Morphing {} into {} on {}", shape, boundary_event, host);
    scope.context_mut()?.shape = Some(boundary_event);
    Ok(())
}
