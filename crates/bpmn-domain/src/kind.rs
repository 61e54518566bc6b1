use serde::{Deserialize, Serialize};
use std::fmt;

/// BPMN element types known to the modeler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Definitions,
    Process,
    Collaboration,
    Participant,
    SubProcess,
    Task,
    StartEvent,
    EndEvent,
    IntermediateThrowEvent,
    IntermediateCatchEvent,
    BoundaryEvent,
    ExclusiveGateway,
    ParallelGateway,
    TextAnnotation,
    SequenceFlow,
    MessageFlow,
    Association,
}

impl ElementKind {
    /// Qualified type name, e.g. `bpmn:Task`.
    pub fn type_name(&self) -> String {
        format!("bpmn:{}", self.id_prefix())
    }

    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::Definitions => "Definitions",
            Self::Process => "Process",
            Self::Collaboration => "Collaboration",
            Self::Participant => "Participant",
            Self::SubProcess => "SubProcess",
            Self::Task => "Task",
            Self::StartEvent => "StartEvent",
            Self::EndEvent => "EndEvent",
            Self::IntermediateThrowEvent => "IntermediateThrowEvent",
            Self::IntermediateCatchEvent => "IntermediateCatchEvent",
            Self::BoundaryEvent => "BoundaryEvent",
            Self::ExclusiveGateway => "ExclusiveGateway",
            Self::ParallelGateway => "ParallelGateway",
            Self::TextAnnotation => "TextAnnotation",
            Self::SequenceFlow => "SequenceFlow",
            Self::MessageFlow => "MessageFlow",
            Self::Association => "Association",
        }
    }

    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            Self::SequenceFlow | Self::MessageFlow | Self::Association
        )
    }

    /// Kinds that can be the canvas root.
    pub fn is_root(&self) -> bool {
        matches!(self, Self::Process | Self::Collaboration)
    }

    pub fn is_activity(&self) -> bool {
        matches!(self, Self::Task | Self::SubProcess)
    }

    pub fn is_event(&self) -> bool {
        matches!(
            self,
            Self::StartEvent
                | Self::EndEvent
                | Self::IntermediateThrowEvent
                | Self::IntermediateCatchEvent
                | Self::BoundaryEvent
        )
    }

    pub fn is_gateway(&self) -> bool {
        matches!(self, Self::ExclusiveGateway | Self::ParallelGateway)
    }

    pub fn is_flow_node(&self) -> bool {
        self.is_activity() || self.is_event() || self.is_gateway()
    }

    /// Kinds whose business object holds flow elements.
    pub fn is_flow_container(&self) -> bool {
        matches!(self, Self::Process | Self::SubProcess)
    }

    /// Width and height a new shape of this kind gets.
    pub fn default_size(&self) -> (f64, f64) {
        match self {
            Self::Participant => (600.0, 250.0),
            Self::SubProcess => (350.0, 200.0),
            Self::Task => (100.0, 80.0),
            Self::ExclusiveGateway | Self::ParallelGateway => (50.0, 50.0),
            Self::TextAnnotation => (100.0, 30.0),
            kind if kind.is_event() => (36.0, 36.0),
            _ => (0.0, 0.0),
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name())
    }
}
