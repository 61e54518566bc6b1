use bpmn_core::{Dispatcher, ModelerError, ModelerResult, DEFAULT_PRIORITY};
use std::rc::Rc;

use crate::commands::{ModelingScope, ModelingStack, SHAPE_CREATE};
use crate::modeling;
use crate::rules::ConnectionRules;
use crate::{ElementId, ElementKind};

const INSERT_FLOW: &str = "insertFlow";

/// Splits a sequence flow when a flow node is dropped onto it.
///
/// The shape goes into the flow's parent, the flow is reconnected to end at
/// the shape, and a new sequence flow continues to the old target.
pub struct CreateOnFlowBehavior {
    rules: Rc<dyn ConnectionRules>,
}

impl CreateOnFlowBehavior {
    pub fn new(rules: Rc<dyn ConnectionRules>) -> Self {
        Self { rules }
    }

    pub fn register(self, stack: &mut ModelingStack) {
        let interceptors = stack.interceptors();
        interceptors.pre_execute(SHAPE_CREATE, DEFAULT_PRIORITY, redirect_to_flow_parent);

        let rules = self.rules;
        interceptors.post_execute(SHAPE_CREATE, DEFAULT_PRIORITY, move |scope| {
            split_flow(scope, rules.as_ref())
        });
    }
}

fn redirect_to_flow_parent(scope: &mut ModelingScope<'_>) -> ModelerResult<()> {
    let context = scope.context();
    let (Some(shape), Some(parent)) = (context.shape.clone(), context.parent.clone()) else {
        return Ok(());
    };
    if context.host.is_some() {
        return Ok(());
    }

    let diagram = scope.model();
    if !diagram.is(&parent, ElementKind::SequenceFlow) {
        return Ok(());
    }
    let insertable = diagram
        .kind_of(&shape)
        .is_some_and(|kind| kind.is_flow_node() && kind != ElementKind::BoundaryEvent);
    if !insertable {
        return Err(ModelerError::Validation(format!(
            "{} cannot be placed on {}",
            shape, parent
        )));
    }
    let flow_parent = diagram
        .element(&parent)?
        .parent
        .clone()
        .ok_or_else(|| ModelerError::Validation(format!("{} is not on the canvas", parent)))?;

    let context = scope.context_mut()?;
    context.stash(INSERT_FLOW, &parent)?;
    context.parent = Some(flow_parent);
    Ok(())
}

fn split_flow(scope: &mut ModelingScope<'_>, rules: &dyn ConnectionRules) -> ModelerResult<()> {
    let context = scope.context();
    let Some(flow) = context.stashed::<ElementId>(INSERT_FLOW)? else {
        return Ok(());
    };
    let Some(shape) = context.shape.clone() else {
        return Ok(());
    };
    let old_target = scope
        .model()
        .element(&flow)?
        .target
        .clone()
        .ok_or_else(|| ModelerError::Validation(format!("{} has no target", flow)))?;

    tracing::debug!("Inserting {} into {}", shape, flow);
    modeling::reconnect_end(scope, &flow, &shape, None)?;
    if rules.can_connect_sequence_flow(scope.model(), &shape, &old_target) {
        modeling::connect(scope, &shape, &old_target, ElementKind::SequenceFlow, None)?;
    }
    Ok(())
}
