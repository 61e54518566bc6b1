use bpmn_core::{ModelerError, ModelerResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::{Bounds, ElementId, ElementKind, Point};

/// Context record passed through every phase of one modeling command.
///
/// Commands read their inputs from the well-known fields. Behaviors keep
/// their own revert bookkeeping in `extras`; core handlers keep theirs in
/// `restore`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelingContext {
    pub shape: Option<ElementId>,
    pub shapes: Vec<ElementId>,
    pub connection: Option<ElementId>,
    pub source: Option<ElementId>,
    pub target: Option<ElementId>,
    pub parent: Option<ElementId>,
    pub parent_index: Option<usize>,
    pub host: Option<ElementId>,
    pub position: Option<Point>,
    pub delta: Option<Point>,
    pub new_root: Option<ElementId>,
    pub old_root: Option<ElementId>,
    pub process_root: Option<ElementId>,
    pub connection_kind: Option<ElementKind>,
    pub waypoints: Option<Vec<Point>>,
    pub hints: Hints,
    pub restore: Restore,
    pub extras: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hints {
    /// The shape is dropped onto `host` and must be attached to it.
    pub attach: bool,
}

/// State captured by core handlers during execute and put back on revert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Restore {
    pub parent: Option<ElementId>,
    pub parent_index: Option<usize>,
    pub host: Option<ElementId>,
    pub host_index: Option<usize>,
    pub target: Option<ElementId>,
    pub source_index: Option<usize>,
    pub target_index: Option<usize>,
    pub bounds: Option<Bounds>,
    pub waypoints: Option<Vec<Point>>,
    pub new_root_index: Option<usize>,
    pub old_root_index: Option<usize>,
}

impl ModelingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `value` under `key` for a later phase or for revert.
    pub fn stash<T: Serialize>(&mut self, key: &str, value: &T) -> ModelerResult<()> {
        self.extras.insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    pub fn stashed<T: DeserializeOwned>(&self, key: &str) -> ModelerResult<Option<T>> {
        self.extras
            .get(key)
            .map(|value| serde_json::from_value(value.clone()))
            .transpose()
            .map_err(ModelerError::from)
    }

    pub fn unstash(&mut self, key: &str) {
        self.extras.remove(key);
    }
}

/// Borrow a mandatory context field or fail with `MissingContext`.
pub fn required<'a, T>(
    value: &'a Option<T>,
    command: &str,
    field: &'static str,
) -> ModelerResult<&'a T> {
    value
        .as_ref()
        .ok_or_else(|| ModelerError::missing(command, field))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stash_roundtrip() {
        let mut context = ModelingContext::new();
        context
            .stash("oldProcessRef", &Some(ElementId::new("Process_1")))
            .unwrap();

        let stashed: Option<Option<ElementId>> = context.stashed("oldProcessRef").unwrap();
        assert_eq!(stashed, Some(Some(ElementId::new("Process_1"))));
        assert_eq!(context.stashed::<bool>("missing").unwrap(), None);

        context.unstash("oldProcessRef");
        assert!(context.extras.is_empty());
    }

    #[test]
    fn test_stashed_with_wrong_type_fails() {
        let mut context = ModelingContext::new();
        context.stash("insertFlow", &"SequenceFlow_1").unwrap();

        let err = context.stashed::<bool>("insertFlow").unwrap_err();
        assert!(matches!(err, ModelerError::Serialization(_)));
    }

    #[test]
    fn test_required_field() {
        let context = ModelingContext {
            shape: Some(ElementId::new("Task_1")),
            ..Default::default()
        };

        assert_eq!(required(&context.shape, "shape.create", "shape").unwrap().as_str(), "Task_1");
        let err = required(&context.parent, "shape.create", "parent").unwrap_err();
        assert!(matches!(err, ModelerError::MissingContext { field: "parent", .. }));
    }

    #[test]
    fn test_deserializes_camel_case_with_defaults() {
        let context: ModelingContext =
            serde_json::from_str(r#"{"shape":"Task_1","processRoot":"Process_1"}"#).unwrap();
        assert_eq!(context.process_root, Some(ElementId::new("Process_1")));
        assert!(context.shapes.is_empty());
        assert!(!context.hints.attach);
    }
}
