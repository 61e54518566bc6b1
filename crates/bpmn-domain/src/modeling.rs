//! High-level modeling operations.
//!
//! Every helper is generic over a [`Dispatcher`], so the same call works on the
//! command stack for a top-level action and on a [`Scope`](bpmn_core::Scope)
//! for a nested one.

use bpmn_core::{Dispatcher, ModelerError, ModelerResult};

use crate::commands::{
    CANVAS_UPDATE_ROOT, CONNECTION_CREATE, CONNECTION_DELETE, CONNECTION_LAYOUT,
    CONNECTION_RECONNECT_END, ELEMENTS_MOVE, SHAPE_APPEND, SHAPE_ATTACH, SHAPE_CREATE,
    SHAPE_DELETE,
};
use crate::factory::{self, ShapeAttrs};
use crate::{Diagram, ElementId, ElementKind, ModelingContext, Point};

/// Place the registered, detached `shape` centered at `position`.
///
/// With `attach`, `target` is the host and the shape goes into the host's
/// parent. Returns the id of the shape that ended up on the canvas, which
/// differs from `shape` when a behavior replaced it.
pub fn create_shape<D>(
    dispatcher: &mut D,
    shape: &ElementId,
    position: Point,
    target: &ElementId,
    attach: bool,
) -> ModelerResult<ElementId>
where
    D: Dispatcher<Diagram, ModelingContext> + ?Sized,
{
    let mut context = ModelingContext {
        shape: Some(shape.clone()),
        position: Some(position),
        ..Default::default()
    };
    if attach {
        context.parent = dispatcher.model().element(target)?.parent.clone();
        context.host = Some(target.clone());
        context.hints.attach = true;
    } else {
        context.parent = Some(target.clone());
    }

    dispatcher.dispatch(SHAPE_CREATE, context)?;
    Ok(last_shape(dispatcher).unwrap_or_else(|| shape.clone()))
}

/// Create `shape` next to `source` and connect the two.
pub fn append_shape<D>(
    dispatcher: &mut D,
    source: &ElementId,
    shape: &ElementId,
    position: Option<Point>,
    connection_kind: Option<ElementKind>,
) -> ModelerResult<ElementId>
where
    D: Dispatcher<Diagram, ModelingContext> + ?Sized,
{
    let context = ModelingContext {
        source: Some(source.clone()),
        shape: Some(shape.clone()),
        position,
        connection_kind,
        ..Default::default()
    };
    dispatcher.dispatch(SHAPE_APPEND, context)?;
    Ok(last_shape(dispatcher).unwrap_or_else(|| shape.clone()))
}

/// Move `shapes` by `delta`, optionally into a new parent.
pub fn move_shapes<D>(
    dispatcher: &mut D,
    shapes: Vec<ElementId>,
    delta: Point,
    target: Option<&ElementId>,
) -> ModelerResult<()>
where
    D: Dispatcher<Diagram, ModelingContext> + ?Sized,
{
    let context = ModelingContext {
        shapes,
        delta: Some(delta),
        parent: target.cloned(),
        ..Default::default()
    };
    dispatcher.dispatch(ELEMENTS_MOVE, context)
}

pub fn delete_shape<D>(dispatcher: &mut D, shape: &ElementId) -> ModelerResult<()>
where
    D: Dispatcher<Diagram, ModelingContext> + ?Sized,
{
    let context = ModelingContext {
        shape: Some(shape.clone()),
        ..Default::default()
    };
    dispatcher.dispatch(SHAPE_DELETE, context)
}

/// Attach `shape` to `host`, or detach it from its current host with `None`.
pub fn attach_shape<D>(
    dispatcher: &mut D,
    shape: &ElementId,
    host: Option<&ElementId>,
) -> ModelerResult<()>
where
    D: Dispatcher<Diagram, ModelingContext> + ?Sized,
{
    let context = ModelingContext {
        shape: Some(shape.clone()),
        host: host.cloned(),
        ..Default::default()
    };
    dispatcher.dispatch(SHAPE_ATTACH, context)
}

/// Create a new connection of `kind` from `source` to `target`.
pub fn connect<D>(
    dispatcher: &mut D,
    source: &ElementId,
    target: &ElementId,
    kind: ElementKind,
    waypoints: Option<Vec<Point>>,
) -> ModelerResult<ElementId>
where
    D: Dispatcher<Diagram, ModelingContext> + ?Sized,
{
    if !kind.is_connection() {
        return Err(ModelerError::Validation(format!("{} is not a connection", kind)));
    }
    let connection = factory::create_element(dispatcher.model_mut(), ShapeAttrs::new(kind))?;
    add_connection(dispatcher, &connection, source, target, waypoints)?;
    Ok(connection)
}

/// Put the registered, detached `connection` onto the canvas.
pub fn add_connection<D>(
    dispatcher: &mut D,
    connection: &ElementId,
    source: &ElementId,
    target: &ElementId,
    waypoints: Option<Vec<Point>>,
) -> ModelerResult<()>
where
    D: Dispatcher<Diagram, ModelingContext> + ?Sized,
{
    let parent = connection_parent(dispatcher.model(), connection, source)?;
    let context = ModelingContext {
        connection: Some(connection.clone()),
        source: Some(source.clone()),
        target: Some(target.clone()),
        parent: Some(parent),
        waypoints,
        ..Default::default()
    };
    dispatcher.dispatch(CONNECTION_CREATE, context)
}

pub fn remove_connection<D>(dispatcher: &mut D, connection: &ElementId) -> ModelerResult<()>
where
    D: Dispatcher<Diagram, ModelingContext> + ?Sized,
{
    let context = ModelingContext {
        connection: Some(connection.clone()),
        ..Default::default()
    };
    dispatcher.dispatch(CONNECTION_DELETE, context)
}

/// Let `connection` end at `target` instead.
pub fn reconnect_end<D>(
    dispatcher: &mut D,
    connection: &ElementId,
    target: &ElementId,
    waypoints: Option<Vec<Point>>,
) -> ModelerResult<()>
where
    D: Dispatcher<Diagram, ModelingContext> + ?Sized,
{
    let context = ModelingContext {
        connection: Some(connection.clone()),
        target: Some(target.clone()),
        waypoints,
        ..Default::default()
    };
    dispatcher.dispatch(CONNECTION_RECONNECT_END, context)
}

pub fn layout_connection<D>(dispatcher: &mut D, connection: &ElementId) -> ModelerResult<()>
where
    D: Dispatcher<Diagram, ModelingContext> + ?Sized,
{
    let context = ModelingContext {
        connection: Some(connection.clone()),
        ..Default::default()
    };
    dispatcher.dispatch(CONNECTION_LAYOUT, context)
}

/// Replace the canvas root with a new, empty collaboration.
pub fn make_collaboration<D>(dispatcher: &mut D) -> ModelerResult<ElementId>
where
    D: Dispatcher<Diagram, ModelingContext> + ?Sized,
{
    let root = factory::create_root(dispatcher.model_mut(), ElementKind::Collaboration)?;
    update_root(dispatcher, &root)?;
    Ok(root)
}

/// Replace the canvas root with a new, empty process.
pub fn make_process<D>(dispatcher: &mut D) -> ModelerResult<ElementId>
where
    D: Dispatcher<Diagram, ModelingContext> + ?Sized,
{
    let root = factory::create_root(dispatcher.model_mut(), ElementKind::Process)?;
    update_root(dispatcher, &root)?;
    Ok(root)
}

pub fn update_root<D>(dispatcher: &mut D, root: &ElementId) -> ModelerResult<()>
where
    D: Dispatcher<Diagram, ModelingContext> + ?Sized,
{
    let context = ModelingContext {
        new_root: Some(root.clone()),
        ..Default::default()
    };
    dispatcher.dispatch(CANVAS_UPDATE_ROOT, context)
}

/// Message flows live on the root; everything else next to its source.
fn connection_parent(
    diagram: &Diagram,
    connection: &ElementId,
    source: &ElementId,
) -> ModelerResult<ElementId> {
    let parent = if diagram.is(connection, ElementKind::MessageFlow) {
        diagram.root_id().cloned()
    } else {
        diagram.element(source)?.parent.clone()
    };
    parent.ok_or_else(|| ModelerError::Validation(format!("{} is not on the canvas", source)))
}

fn last_shape<D>(dispatcher: &D) -> Option<ElementId>
where
    D: Dispatcher<Diagram, ModelingContext> + ?Sized,
{
    dispatcher.last_context().and_then(|context| context.shape.clone())
}
