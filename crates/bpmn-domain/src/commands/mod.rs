//! Core modeling commands.
//!
//! Each handler performs one primitive change on the [`Diagram`] and stashes
//! what it replaced in [`ModelingContext::restore`]. Cascades (deleting
//! children, moving attachers along) are dispatched as nested commands so they
//! share the undo entry of the command that caused them.

use bpmn_core::{CommandStack, Scope};
use std::rc::Rc;

use crate::rules::ConnectionRules;
use crate::{Diagram, ModelingContext};

pub mod canvas_commands;
pub mod connection_commands;
pub mod shape_commands;

pub use canvas_commands::*;
pub use connection_commands::*;
pub use shape_commands::*;

pub const CANVAS_UPDATE_ROOT: &str = "canvas.updateRoot";
pub const SHAPE_CREATE: &str = "shape.create";
pub const SHAPE_DELETE: &str = "shape.delete";
pub const SHAPE_MOVE: &str = "shape.move";
pub const ELEMENTS_MOVE: &str = "elements.move";
pub const SHAPE_APPEND: &str = "shape.append";
pub const SHAPE_ATTACH: &str = "shape.attach";
pub const CONNECTION_CREATE: &str = "connection.create";
pub const CONNECTION_DELETE: &str = "connection.delete";
pub const CONNECTION_RECONNECT_END: &str = "connection.reconnectEnd";
pub const CONNECTION_LAYOUT: &str = "connection.layout";

pub type ModelingStack = CommandStack<Diagram, ModelingContext>;
pub type ModelingScope<'a> = Scope<'a, Diagram, ModelingContext>;

/// Register every core modeling handler on `stack`.
pub fn register_handlers(stack: &mut ModelingStack, rules: Rc<dyn ConnectionRules>) {
    stack.register_handler(CANVAS_UPDATE_ROOT, UpdateCanvasRoot);
    stack.register_handler(SHAPE_CREATE, CreateShape);
    stack.register_handler(SHAPE_DELETE, DeleteShape);
    stack.register_handler(SHAPE_MOVE, MoveShape);
    stack.register_handler(ELEMENTS_MOVE, MoveElements);
    stack.register_handler(SHAPE_APPEND, AppendShape { rules });
    stack.register_handler(SHAPE_ATTACH, AttachShape);
    stack.register_handler(CONNECTION_CREATE, CreateConnection);
    stack.register_handler(CONNECTION_DELETE, DeleteConnection);
    stack.register_handler(CONNECTION_RECONNECT_END, ReconnectEnd);
    stack.register_handler(CONNECTION_LAYOUT, LayoutConnection);
}
