use bpmn_core::{CommandHandler, ModelerError, ModelerResult};

use super::{CONNECTION_CREATE, CONNECTION_DELETE, CONNECTION_LAYOUT, CONNECTION_RECONNECT_END};
use crate::collections;
use crate::context::required;
use crate::layout;
use crate::{Diagram, ModelingContext};

/// Put a registered connection onto the canvas between `source` and `target`.
pub struct CreateConnection;

impl CommandHandler<Diagram, ModelingContext> for CreateConnection {
    fn execute(&self, diagram: &mut Diagram, context: &mut ModelingContext) -> ModelerResult<()> {
        let connection = required(&context.connection, CONNECTION_CREATE, "connection")?.clone();
        let source = required(&context.source, CONNECTION_CREATE, "source")?.clone();
        let target = required(&context.target, CONNECTION_CREATE, "target")?.clone();
        let parent = required(&context.parent, CONNECTION_CREATE, "parent")?.clone();

        let element = diagram.element(&connection)?;
        if !element.is_connection() {
            return Err(ModelerError::Validation(format!(
                "{} is not a connection",
                connection
            )));
        }
        if element.parent.is_some() {
            return Err(ModelerError::Validation(format!(
                "{} is already on the canvas",
                connection
            )));
        }
        context.restore.waypoints = Some(element.waypoints.clone());

        let waypoints = match &context.waypoints {
            Some(waypoints) => waypoints.clone(),
            None => layout::connection_waypoints(diagram, &source, &target)?,
        };
        let element = diagram.element_mut(&connection)?;
        element.source = Some(source.clone());
        element.target = Some(target.clone());
        element.waypoints = waypoints;

        diagram.add_child(&parent, &connection, context.parent_index)?;
        collections::add(&mut diagram.element_mut(&source)?.outgoing, connection.clone(), None);
        collections::add(&mut diagram.element_mut(&target)?.incoming, connection, None);
        Ok(())
    }

    fn revert(&self, diagram: &mut Diagram, context: &ModelingContext) -> ModelerResult<()> {
        let connection = required(&context.connection, CONNECTION_CREATE, "connection")?;
        let source = required(&context.source, CONNECTION_CREATE, "source")?;
        let target = required(&context.target, CONNECTION_CREATE, "target")?;
        let parent = required(&context.parent, CONNECTION_CREATE, "parent")?;

        collections::remove(&mut diagram.element_mut(target)?.incoming, connection);
        collections::remove(&mut diagram.element_mut(source)?.outgoing, connection);
        diagram.remove_child(parent, connection)?;

        let element = diagram.element_mut(connection)?;
        element.source = None;
        element.target = None;
        element.waypoints = context.restore.waypoints.clone().unwrap_or_default();
        Ok(())
    }
}

/// Take a connection off the canvas. It keeps its ends so it can be restored.
pub struct DeleteConnection;

impl CommandHandler<Diagram, ModelingContext> for DeleteConnection {
    fn execute(&self, diagram: &mut Diagram, context: &mut ModelingContext) -> ModelerResult<()> {
        let connection = required(&context.connection, CONNECTION_DELETE, "connection")?.clone();
        let element = diagram.element(&connection)?;
        let parent = element.parent.clone().ok_or_else(|| {
            ModelerError::Validation(format!("{} is not on the canvas", connection))
        })?;
        let source = element.source.clone();
        let target = element.target.clone();

        context.restore.parent_index = diagram.remove_child(&parent, &connection)?;
        context.restore.parent = Some(parent);
        context.restore.source_index = match &source {
            Some(source) => collections::remove(&mut diagram.element_mut(source)?.outgoing, &connection),
            None => None,
        };
        context.restore.target_index = match &target {
            Some(target) => collections::remove(&mut diagram.element_mut(target)?.incoming, &connection),
            None => None,
        };
        Ok(())
    }

    fn revert(&self, diagram: &mut Diagram, context: &ModelingContext) -> ModelerResult<()> {
        let connection = required(&context.connection, CONNECTION_DELETE, "connection")?;
        let parent = required(&context.restore.parent, CONNECTION_DELETE, "parent")?;

        diagram.add_child(parent, connection, context.restore.parent_index)?;
        let element = diagram.element(connection)?;
        let source = element.source.clone();
        let target = element.target.clone();
        if let Some(source) = &source {
            collections::add(
                &mut diagram.element_mut(source)?.outgoing,
                connection.clone(),
                context.restore.source_index,
            );
        }
        if let Some(target) = &target {
            collections::add(
                &mut diagram.element_mut(target)?.incoming,
                connection.clone(),
                context.restore.target_index,
            );
        }
        Ok(())
    }
}

/// Move the target end of a connection to another shape.
pub struct ReconnectEnd;

impl CommandHandler<Diagram, ModelingContext> for ReconnectEnd {
    fn execute(&self, diagram: &mut Diagram, context: &mut ModelingContext) -> ModelerResult<()> {
        let connection =
            required(&context.connection, CONNECTION_RECONNECT_END, "connection")?.clone();
        let new_target = required(&context.target, CONNECTION_RECONNECT_END, "target")?.clone();

        let element = diagram.element(&connection)?;
        let source = element
            .source
            .clone()
            .ok_or_else(|| ModelerError::missing(CONNECTION_RECONNECT_END, "source"))?;
        let old_target = element
            .target
            .clone()
            .ok_or_else(|| ModelerError::missing(CONNECTION_RECONNECT_END, "target"))?;
        context.restore.waypoints = Some(element.waypoints.clone());

        context.restore.target_index =
            collections::remove(&mut diagram.element_mut(&old_target)?.incoming, &connection);
        context.restore.target = Some(old_target);
        collections::add(
            &mut diagram.element_mut(&new_target)?.incoming,
            connection.clone(),
            None,
        );

        let waypoints = match &context.waypoints {
            Some(waypoints) => waypoints.clone(),
            None => layout::connection_waypoints(diagram, &source, &new_target)?,
        };
        let element = diagram.element_mut(&connection)?;
        element.target = Some(new_target);
        element.waypoints = waypoints;
        Ok(())
    }

    fn revert(&self, diagram: &mut Diagram, context: &ModelingContext) -> ModelerResult<()> {
        let connection = required(&context.connection, CONNECTION_RECONNECT_END, "connection")?;
        let new_target = required(&context.target, CONNECTION_RECONNECT_END, "target")?;
        let old_target = required(&context.restore.target, CONNECTION_RECONNECT_END, "target")?;

        collections::remove(&mut diagram.element_mut(new_target)?.incoming, connection);
        collections::add(
            &mut diagram.element_mut(old_target)?.incoming,
            connection.clone(),
            context.restore.target_index,
        );

        let element = diagram.element_mut(connection)?;
        element.target = Some(old_target.clone());
        if let Some(waypoints) = &context.restore.waypoints {
            element.waypoints = waypoints.clone();
        }
        Ok(())
    }
}

/// Recompute the waypoints of a connection from its current ends.
pub struct LayoutConnection;

impl CommandHandler<Diagram, ModelingContext> for LayoutConnection {
    fn execute(&self, diagram: &mut Diagram, context: &mut ModelingContext) -> ModelerResult<()> {
        let connection = required(&context.connection, CONNECTION_LAYOUT, "connection")?.clone();
        let element = diagram.element(&connection)?;
        let source = required(&element.source, CONNECTION_LAYOUT, "source")?.clone();
        let target = required(&element.target, CONNECTION_LAYOUT, "target")?.clone();
        context.restore.waypoints = Some(element.waypoints.clone());

        let waypoints = layout::connection_waypoints(diagram, &source, &target)?;
        diagram.element_mut(&connection)?.waypoints = waypoints;
        Ok(())
    }

    fn revert(&self, diagram: &mut Diagram, context: &ModelingContext) -> ModelerResult<()> {
        let connection = required(&context.connection, CONNECTION_LAYOUT, "connection")?;
        if let Some(waypoints) = &context.restore.waypoints {
            diagram.element_mut(connection)?.waypoints = waypoints.clone();
        }
        Ok(())
    }
}
