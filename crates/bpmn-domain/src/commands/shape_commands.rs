use bpmn_core::{CommandHandler, Dispatcher, ModelerError, ModelerResult};
use std::rc::Rc;

use super::{
    ModelingScope, ELEMENTS_MOVE, SHAPE_APPEND, SHAPE_ATTACH, SHAPE_CREATE, SHAPE_DELETE,
    SHAPE_MOVE,
};
use crate::collections;
use crate::context::required;
use crate::factory::{self, ShapeAttrs};
use crate::modeling;
use crate::rules::ConnectionRules;
use crate::{Diagram, ElementId, ModelingContext, Point};

/// Put a registered shape onto the canvas below `parent`, centered at
/// `position`, and attach it to `host` if one is given.
pub struct CreateShape;

impl CommandHandler<Diagram, ModelingContext> for CreateShape {
    fn execute(&self, diagram: &mut Diagram, context: &mut ModelingContext) -> ModelerResult<()> {
        let shape = required(&context.shape, SHAPE_CREATE, "shape")?.clone();
        let parent = required(&context.parent, SHAPE_CREATE, "parent")?.clone();
        let position = *required(&context.position, SHAPE_CREATE, "position")?;
        if context.hints.attach && context.host.is_none() {
            return Err(ModelerError::missing(SHAPE_CREATE, "host"));
        }

        let element = diagram.element(&shape)?;
        if element.is_connection() {
            return Err(ModelerError::Validation(format!(
                "{} is a connection, not a shape",
                shape
            )));
        }
        if element.parent.is_some() {
            return Err(ModelerError::Validation(format!(
                "{} is already on the canvas",
                shape
            )));
        }
        let bounds = element.bounds;

        context.restore.bounds = Some(bounds);
        diagram.element_mut(&shape)?.bounds = bounds.centered_at(position);
        diagram.add_child(&parent, &shape, context.parent_index)?;

        if let Some(host) = &context.host {
            collections::add(&mut diagram.element_mut(host)?.attachers, shape.clone(), None);
            diagram.element_mut(&shape)?.host = Some(host.clone());
        }
        Ok(())
    }

    fn revert(&self, diagram: &mut Diagram, context: &ModelingContext) -> ModelerResult<()> {
        let shape = required(&context.shape, SHAPE_CREATE, "shape")?;
        let parent = required(&context.parent, SHAPE_CREATE, "parent")?;

        if let Some(host) = &context.host {
            collections::remove(&mut diagram.element_mut(host)?.attachers, shape);
            diagram.element_mut(shape)?.host = None;
        }
        diagram.remove_child(parent, shape)?;
        if let Some(bounds) = context.restore.bounds {
            diagram.element_mut(shape)?.bounds = bounds;
        }
        Ok(())
    }
}

/// Take a shape off the canvas, together with its connections, attachers and
/// children.
pub struct DeleteShape;

impl CommandHandler<Diagram, ModelingContext> for DeleteShape {
    fn pre_execute(&self, scope: &mut ModelingScope<'_>) -> ModelerResult<()> {
        let shape = required(&scope.context().shape, SHAPE_DELETE, "shape")?.clone();
        if scope.model().root_id() == Some(&shape) {
            return Err(ModelerError::Validation(format!(
                "cannot delete the canvas root {}",
                shape
            )));
        }

        let element = scope.model().element(&shape)?.clone();
        for connection in element.connections() {
            if on_canvas(scope.model(), &connection) {
                modeling::remove_connection(scope, &connection)?;
            }
        }
        for attacher in &element.attachers {
            if on_canvas(scope.model(), attacher) {
                modeling::delete_shape(scope, attacher)?;
            }
        }
        for child in &element.children {
            if !on_canvas(scope.model(), child) {
                continue;
            }
            if scope.model().element(child)?.is_connection() {
                modeling::remove_connection(scope, child)?;
            } else {
                modeling::delete_shape(scope, child)?;
            }
        }
        Ok(())
    }

    fn execute(&self, diagram: &mut Diagram, context: &mut ModelingContext) -> ModelerResult<()> {
        let shape = required(&context.shape, SHAPE_DELETE, "shape")?.clone();
        let element = diagram.element(&shape)?;
        let parent = element
            .parent
            .clone()
            .ok_or_else(|| ModelerError::Validation(format!("{} is not on the canvas", shape)))?;
        let host = element.host.clone();

        context.restore.parent_index = diagram.remove_child(&parent, &shape)?;
        context.restore.parent = Some(parent);

        context.restore.host_index = None;
        if let Some(host) = &host {
            context.restore.host_index =
                collections::remove(&mut diagram.element_mut(host)?.attachers, &shape);
            diagram.element_mut(&shape)?.host = None;
        }
        context.restore.host = host;
        Ok(())
    }

    fn revert(&self, diagram: &mut Diagram, context: &ModelingContext) -> ModelerResult<()> {
        let shape = required(&context.shape, SHAPE_DELETE, "shape")?;
        let parent = required(&context.restore.parent, SHAPE_DELETE, "parent")?;

        diagram.add_child(parent, shape, context.restore.parent_index)?;
        if let Some(host) = &context.restore.host {
            collections::add(
                &mut diagram.element_mut(host)?.attachers,
                shape.clone(),
                context.restore.host_index,
            );
            diagram.element_mut(shape)?.host = Some(host.clone());
        }
        Ok(())
    }
}

/// Move one shape (or connection) by `delta`, optionally into a new parent.
///
/// Children and attachers follow the shape; connections touching it are laid
/// out again.
pub struct MoveShape;

impl CommandHandler<Diagram, ModelingContext> for MoveShape {
    fn execute(&self, diagram: &mut Diagram, context: &mut ModelingContext) -> ModelerResult<()> {
        let shape = required(&context.shape, SHAPE_MOVE, "shape")?.clone();
        let delta = *required(&context.delta, SHAPE_MOVE, "delta")?;

        let element = diagram.element(&shape)?;
        let old_parent = element
            .parent
            .clone()
            .ok_or_else(|| ModelerError::Validation(format!("{} is not on the canvas", shape)))?;
        if let Some(new_parent) = &context.parent {
            if *new_parent == shape || diagram.ancestors(new_parent).contains(&shape) {
                return Err(ModelerError::Validation(format!(
                    "cannot move {} into its own subtree",
                    shape
                )));
            }
        }

        if element.is_connection() {
            let waypoints = element.waypoints.clone();
            let moved = waypoints.iter().map(|point| point.translate(delta)).collect();
            context.restore.waypoints = Some(waypoints);
            diagram.element_mut(&shape)?.waypoints = moved;
        } else {
            let bounds = element.bounds;
            context.restore.bounds = Some(bounds);
            diagram.element_mut(&shape)?.bounds = bounds.translate(delta);
        }

        context.restore.parent = None;
        context.restore.parent_index = None;
        if let Some(new_parent) = context.parent.clone() {
            if new_parent != old_parent {
                context.restore.parent_index = diagram.remove_child(&old_parent, &shape)?;
                context.restore.parent = Some(old_parent);
                diagram.add_child(&new_parent, &shape, context.parent_index)?;
            }
        }
        Ok(())
    }

    fn post_execute(&self, scope: &mut ModelingScope<'_>) -> ModelerResult<()> {
        let context = scope.context();
        let shape = required(&context.shape, SHAPE_MOVE, "shape")?.clone();
        let delta = *required(&context.delta, SHAPE_MOVE, "delta")?;

        let element = scope.model().element(&shape)?.clone();
        if element.is_connection() {
            return Ok(());
        }

        // attachers stay in the parent of their host
        for attacher in &element.attachers {
            move_one(scope, attacher, delta, element.parent.clone())?;
        }
        if delta.is_zero() {
            return Ok(());
        }
        for child in &element.children {
            if !scope.model().element(child)?.is_connection() {
                move_one(scope, child, delta, None)?;
            }
        }
        for connection in element.connections() {
            modeling::layout_connection(scope, &connection)?;
        }
        Ok(())
    }

    fn revert(&self, diagram: &mut Diagram, context: &ModelingContext) -> ModelerResult<()> {
        let shape = required(&context.shape, SHAPE_MOVE, "shape")?;

        if let Some(old_parent) = &context.restore.parent {
            if let Some(current) = diagram.element(shape)?.parent.clone() {
                diagram.remove_child(&current, shape)?;
            }
            diagram.add_child(old_parent, shape, context.restore.parent_index)?;
        }

        let element = diagram.element_mut(shape)?;
        if let Some(bounds) = context.restore.bounds {
            element.bounds = bounds;
        }
        if let Some(waypoints) = &context.restore.waypoints {
            element.waypoints = waypoints.clone();
        }
        Ok(())
    }
}

fn move_one(
    scope: &mut ModelingScope<'_>,
    shape: &ElementId,
    delta: Point,
    parent: Option<ElementId>,
) -> ModelerResult<()> {
    let context = ModelingContext {
        shape: Some(shape.clone()),
        delta: Some(delta),
        parent,
        ..Default::default()
    };
    scope.dispatch(SHAPE_MOVE, context)
}

/// Move a selection of elements as a whole.
///
/// Only the top-level members of `shapes` are moved directly; nested members
/// and attachers of moved hosts come along with their parent or host.
pub struct MoveElements;

impl CommandHandler<Diagram, ModelingContext> for MoveElements {
    fn execute(&self, _diagram: &mut Diagram, context: &mut ModelingContext) -> ModelerResult<()> {
        required(&context.delta, ELEMENTS_MOVE, "delta")?;
        Ok(())
    }

    fn post_execute(&self, scope: &mut ModelingScope<'_>) -> ModelerResult<()> {
        let context = scope.context();
        let delta = *required(&context.delta, ELEMENTS_MOVE, "delta")?;
        let parent = context.parent.clone();
        let shapes = top_level(scope.model(), &context.shapes);

        tracing::trace!("Moving {} top-level element(s)", shapes.len());
        for shape in &shapes {
            move_one(scope, shape, delta, parent.clone())?;
        }
        Ok(())
    }

    fn revert(&self, _diagram: &mut Diagram, _context: &ModelingContext) -> ModelerResult<()> {
        Ok(())
    }
}

/// Members of `shapes` with no ancestor or host inside `shapes`.
pub fn top_level(diagram: &Diagram, shapes: &[ElementId]) -> Vec<ElementId> {
    shapes
        .iter()
        .filter(|shape| {
            let nested = diagram
                .ancestors(shape)
                .iter()
                .any(|ancestor| shapes.contains(ancestor));
            let hosted = diagram
                .get(shape)
                .and_then(|element| element.host.as_ref())
                .is_some_and(|host| shapes.contains(host));
            !nested && !hosted
        })
        .cloned()
        .collect()
}

/// Create a shape next to `source` and connect it.
///
/// Pre-execute creates the shape and registers the connection element;
/// post-execute puts the connection onto the canvas. The default position is
/// left to interceptors.
pub struct AppendShape {
    pub rules: Rc<dyn ConnectionRules>,
}

impl CommandHandler<Diagram, ModelingContext> for AppendShape {
    fn pre_execute(&self, scope: &mut ModelingScope<'_>) -> ModelerResult<()> {
        let context = scope.context();
        let source = required(&context.source, SHAPE_APPEND, "source")?.clone();
        let shape = required(&context.shape, SHAPE_APPEND, "shape")?.clone();
        let position = *required(&context.position, SHAPE_APPEND, "position")?;
        let connection_kind = context.connection_kind;
        let parent = match &context.parent {
            Some(parent) => parent.clone(),
            None => scope.model().element(&source)?.parent.clone().ok_or_else(|| {
                ModelerError::Validation(format!("{} is not on the canvas", source))
            })?,
        };

        let shape = modeling::create_shape(scope, &shape, position, &parent, false)?;
        let kind = match connection_kind {
            Some(kind) => kind,
            None => self
                .rules
                .connection_kind(scope.model(), &source, &shape)
                .ok_or_else(|| {
                    ModelerError::Validation(format!("cannot connect {} to {}", source, shape))
                })?,
        };
        let connection = factory::create_element(scope.model_mut(), ShapeAttrs::new(kind))?;

        let context = scope.context_mut()?;
        context.shape = Some(shape);
        context.parent = Some(parent);
        context.connection = Some(connection);
        context.connection_kind = Some(kind);
        Ok(())
    }

    fn execute(&self, _diagram: &mut Diagram, _context: &mut ModelingContext) -> ModelerResult<()> {
        Ok(())
    }

    fn post_execute(&self, scope: &mut ModelingScope<'_>) -> ModelerResult<()> {
        let context = scope.context();
        let source = required(&context.source, SHAPE_APPEND, "source")?.clone();
        let shape = required(&context.shape, SHAPE_APPEND, "shape")?.clone();
        let connection = required(&context.connection, SHAPE_APPEND, "connection")?.clone();

        modeling::add_connection(scope, &connection, &source, &shape, None)
    }

    fn revert(&self, _diagram: &mut Diagram, _context: &ModelingContext) -> ModelerResult<()> {
        Ok(())
    }
}

/// Attach a shape to a new host, or detach it when `host` is unset.
pub struct AttachShape;

impl CommandHandler<Diagram, ModelingContext> for AttachShape {
    fn execute(&self, diagram: &mut Diagram, context: &mut ModelingContext) -> ModelerResult<()> {
        let shape = required(&context.shape, SHAPE_ATTACH, "shape")?.clone();
        let old_host = diagram.element(&shape)?.host.clone();

        context.restore.host_index = match &old_host {
            Some(old_host) => collections::remove(&mut diagram.element_mut(old_host)?.attachers, &shape),
            None => None,
        };
        context.restore.host = old_host;

        if let Some(host) = &context.host {
            collections::add(&mut diagram.element_mut(host)?.attachers, shape.clone(), None);
        }
        diagram.element_mut(&shape)?.host = context.host.clone();
        Ok(())
    }

    fn revert(&self, diagram: &mut Diagram, context: &ModelingContext) -> ModelerResult<()> {
        let shape = required(&context.shape, SHAPE_ATTACH, "shape")?;

        if let Some(host) = &context.host {
            collections::remove(&mut diagram.element_mut(host)?.attachers, shape);
        }
        if let Some(old_host) = &context.restore.host {
            collections::add(
                &mut diagram.element_mut(old_host)?.attachers,
                shape.clone(),
                context.restore.host_index,
            );
        }
        diagram.element_mut(shape)?.host = context.restore.host.clone();
        Ok(())
    }
}

fn on_canvas(diagram: &Diagram, id: &str) -> bool {
    diagram
        .get(id)
        .is_some_and(|element| element.parent.is_some())
}
