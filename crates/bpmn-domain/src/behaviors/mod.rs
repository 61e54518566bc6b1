//! BPMN-specific interceptors on top of the core modeling commands.

use bpmn_core::ModelerConfig;
use std::rc::Rc;

use crate::commands::ModelingStack;
use crate::rules::ConnectionRules;

pub mod append;
pub mod bpmn_updater;
pub mod create_boundary_event;
pub mod create_on_flow;
pub mod create_participant;
pub mod drop;
pub mod feedback;
pub mod remove;

pub use append::AppendBehavior;
pub use bpmn_updater::{BpmnUpdater, UPDATER_PRIORITY};
pub use create_boundary_event::CreateBoundaryEventBehavior;
pub use create_on_flow::CreateOnFlowBehavior;
pub use create_participant::CreateParticipantBehavior;
pub use drop::DropBehavior;
pub use feedback::{FeedbackLog, FeedbackSink, ModelingFeedback, RejectedDrop, Tooltip};
pub use remove::RemoveBehavior;

/// Install every BPMN behavior on `stack`.
pub fn register_behaviors(
    stack: &mut ModelingStack,
    config: &ModelerConfig,
    rules: Rc<dyn ConnectionRules>,
) {
    CreateParticipantBehavior.register(stack);
    CreateBoundaryEventBehavior.register(stack);
    CreateOnFlowBehavior::new(rules.clone()).register(stack);
    AppendBehavior::new(config.effective_append_spacing()).register(stack);
    DropBehavior::new(rules).register(stack);
    RemoveBehavior.register(stack);
    BpmnUpdater.register(stack);
    tracing::debug!("Registered modeling behaviors");
}
