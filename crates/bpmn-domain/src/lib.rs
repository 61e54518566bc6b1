pub mod behaviors;
pub mod business_object;
mod collections;
pub mod commands;
pub mod context;
pub mod diagram;
pub mod element;
pub mod factory;
pub mod geometry;
pub mod id;
pub mod kind;
pub mod layout;
pub mod modeler;
pub mod modeling;
pub mod rules;

pub use behaviors::{
    register_behaviors, BpmnUpdater, FeedbackLog, FeedbackSink, ModelingFeedback, RejectedDrop,
    Tooltip,
};
pub use business_object::BusinessObject;
pub use commands::{register_handlers, ModelingScope, ModelingStack};
pub use context::{Hints, ModelingContext, Restore};
pub use diagram::{Diagram, DiagramPlane};
pub use element::Element;
pub use factory::ShapeAttrs;
pub use geometry::{Bounds, Point};
pub use id::ElementId;
pub use kind::ElementKind;
pub use modeler::Modeler;
pub use rules::{AttachRule, BpmnRules, ConnectionRules, PlacementRules};
