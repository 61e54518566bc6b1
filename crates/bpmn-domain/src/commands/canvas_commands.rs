use bpmn_core::{CommandHandler, ModelerResult};

use super::CANVAS_UPDATE_ROOT;
use crate::context::required;
use crate::{Diagram, ModelingContext};

/// Replace the canvas root and swap the root business objects in the
/// definitions accordingly.
pub struct UpdateCanvasRoot;

impl CommandHandler<Diagram, ModelingContext> for UpdateCanvasRoot {
    fn execute(&self, diagram: &mut Diagram, context: &mut ModelingContext) -> ModelerResult<()> {
        let new_root = required(&context.new_root, CANVAS_UPDATE_ROOT, "newRoot")?.clone();
        diagram.element(&new_root)?;
        let definitions = diagram.definitions_id().clone();

        let old_root = diagram.set_root(Some(new_root.clone()));
        tracing::debug!("Canvas root {:?} -> {}", old_root, new_root);

        context.restore.new_root_index =
            if diagram.object(&definitions)?.contents.contains(&new_root) {
                None
            } else {
                Some(diagram.add_content(&definitions, &new_root, None)?)
            };
        context.restore.old_root_index = match &old_root {
            Some(old_root) => diagram.remove_content(&definitions, old_root)?,
            None => None,
        };
        context.old_root = old_root;
        Ok(())
    }

    fn revert(&self, diagram: &mut Diagram, context: &ModelingContext) -> ModelerResult<()> {
        let new_root = required(&context.new_root, CANVAS_UPDATE_ROOT, "newRoot")?;
        let definitions = diagram.definitions_id().clone();

        diagram.set_root(context.old_root.clone());
        if context.restore.new_root_index.is_some() {
            diagram.remove_content(&definitions, new_root)?;
        }
        if let (Some(old_root), Some(index)) = (&context.old_root, context.restore.old_root_index) {
            diagram.add_content(&definitions, old_root, Some(index))?;
        }
        Ok(())
    }
}
