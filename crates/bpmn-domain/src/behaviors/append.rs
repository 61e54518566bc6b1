use bpmn_core::{Dispatcher, ModelerResult, DEFAULT_PRIORITY};

use crate::commands::{ModelingScope, ModelingStack, SHAPE_APPEND};
use crate::context::required;
use crate::{ElementKind, Point};

/// Picks a position for appended shapes when the caller gave none: right of
/// the source for flow nodes, above it for text annotations.
pub struct AppendBehavior {
    spacing: f64,
}

impl AppendBehavior {
    pub fn new(spacing: f64) -> Self {
        Self { spacing }
    }

    pub fn register(self, stack: &mut ModelingStack) {
        let spacing = self.spacing;
        stack
            .interceptors()
            .pre_execute(SHAPE_APPEND, DEFAULT_PRIORITY, move |scope| {
                default_position(scope, spacing)
            });
    }
}

fn default_position(scope: &mut ModelingScope<'_>, spacing: f64) -> ModelerResult<()> {
    let context = scope.context();
    if context.position.is_some() {
        return Ok(());
    }
    let source = required(&context.source, SHAPE_APPEND, "source")?;
    let shape = required(&context.shape, SHAPE_APPEND, "shape")?;

    let diagram = scope.model();
    let source = diagram.element(source)?.bounds;
    let shape = diagram.element(shape)?;
    let position = if shape.kind == ElementKind::TextAnnotation {
        Point::new(
            source.x + source.width / 2.0 + 75.0,
            source.y - 50.0 - shape.bounds.height / 2.0,
        )
    } else {
        Point::new(
            source.x + source.width + spacing + shape.bounds.width / 2.0,
            source.y + source.height / 2.0,
        )
    };

    scope.context_mut()?.position = Some(position);
    Ok(())
}
