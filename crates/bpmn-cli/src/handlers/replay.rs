//! `replay`: apply a JSON script of modeling operations.
//!
//! A script is an array of operations tagged by `op`. Elements created by the
//! script may be given an alias with `as`; later operations can refer to an
//! element either by alias or by its diagram id.
//!
//! ```json
//! [
//!   { "op": "create", "kind": "Task", "x": 100, "y": 100, "target": "Process_1", "as": "task" },
//!   { "op": "append", "source": "task", "kind": "EndEvent", "as": "end" },
//!   { "op": "undo" }
//! ]
//! ```

use anyhow::Context as _;
use bpmn_domain::{modeling, Diagram, ElementId, ElementKind, Modeler, Point, ShapeAttrs};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::cli::ReplayArgs;
use crate::context::CliContext;
use crate::output;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ScriptOp {
    /// Place a new shape, attaching or dropping it the way the rules decide.
    Create {
        kind: ElementKind,
        x: f64,
        y: f64,
        target: String,
        name: Option<String>,
        #[serde(rename = "as")]
        alias: Option<String>,
    },
    Append {
        source: String,
        kind: ElementKind,
        x: Option<f64>,
        y: Option<f64>,
        connection: Option<ElementKind>,
        #[serde(rename = "as")]
        alias: Option<String>,
    },
    Move {
        shapes: Vec<String>,
        dx: f64,
        dy: f64,
        target: Option<String>,
    },
    Delete {
        shape: String,
    },
    Attach {
        shape: String,
        host: Option<String>,
    },
    Connect {
        source: String,
        target: String,
        #[serde(default = "default_connection")]
        kind: ElementKind,
        #[serde(rename = "as")]
        alias: Option<String>,
    },
    Undo,
    Redo,
}

fn default_connection() -> ElementKind {
    ElementKind::SequenceFlow
}

impl ScriptOp {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Append { .. } => "append",
            Self::Move { .. } => "move",
            Self::Delete { .. } => "delete",
            Self::Attach { .. } => "attach",
            Self::Connect { .. } => "connect",
            Self::Undo => "undo",
            Self::Redo => "redo",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReplaySummary {
    pub steps: usize,
    pub aliases: BTreeMap<String, ElementId>,
    pub root: Option<ElementId>,
    pub can_undo: bool,
    pub can_redo: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagram: Option<Diagram>,
}

pub fn handle(args: ReplayArgs) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&args.script)
        .with_context(|| format!("Failed to read script {}", args.script))?;
    let script: Vec<ScriptOp> = match serde_json::from_str(&content) {
        Ok(script) => script,
        Err(err) => output::output_error(&format!("Invalid script {}: {}", args.script, err)),
    };

    let mut ctx = CliContext::load(args.diagram.as_deref(), args.config.as_deref())?;
    let mut replay = Replay::new(&mut ctx.modeler);
    for (index, op) in script.iter().enumerate() {
        tracing::debug!("Step {}: {}", index + 1, op.name());
        if let Err(err) = replay.apply(op) {
            return output::output_error(&format!(
                "Step {} ({}) failed: {}",
                index + 1,
                op.name(),
                err
            ));
        }
    }
    let aliases = replay.aliases().clone();

    let diagram = match &args.output {
        Some(path) => {
            ctx.save(path)?;
            None
        }
        None => Some(ctx.modeler.diagram().clone()),
    };
    output::output_success(ReplaySummary {
        steps: script.len(),
        aliases,
        root: ctx.modeler.diagram().root_id().cloned(),
        can_undo: ctx.modeler.can_undo(),
        can_redo: ctx.modeler.can_redo(),
        diagram,
    })
}

/// Applies script operations to a modeler, tracking aliases.
pub struct Replay<'a> {
    modeler: &'a mut Modeler,
    aliases: BTreeMap<String, ElementId>,
}

impl<'a> Replay<'a> {
    pub fn new(modeler: &'a mut Modeler) -> Self {
        Self {
            modeler,
            aliases: BTreeMap::new(),
        }
    }

    pub fn apply(&mut self, op: &ScriptOp) -> anyhow::Result<()> {
        match op {
            ScriptOp::Create {
                kind,
                x,
                y,
                target,
                name,
                alias,
            } => {
                let target = self.resolve(target);
                let position = Point::new(*x, *y);
                let created = if *kind == ElementKind::Participant {
                    // the first participant takes over the process root
                    let with_process = self
                        .modeler
                        .diagram()
                        .root_id()
                        .is_some_and(|root| self.modeler.diagram().is(root, ElementKind::Collaboration));
                    let participant = self.modeler.create_participant(with_process)?;
                    modeling::create_shape(self.modeler, &participant, position, &target, false)?
                } else {
                    let mut attrs = ShapeAttrs::new(*kind);
                    attrs.name = name.clone();
                    self.modeler.place(attrs, position, &target)?
                };
                self.remember(alias, created);
            }
            ScriptOp::Append {
                source,
                kind,
                x,
                y,
                connection,
                alias,
            } => {
                let source = self.resolve(source);
                let position = match (x, y) {
                    (Some(x), Some(y)) => Some(Point::new(*x, *y)),
                    (None, None) => None,
                    _ => anyhow::bail!("append needs both x and y or neither"),
                };
                let shape = self.modeler.create_element(ShapeAttrs::new(*kind))?;
                let created =
                    modeling::append_shape(self.modeler, &source, &shape, position, *connection)?;
                self.remember(alias, created);
            }
            ScriptOp::Move {
                shapes,
                dx,
                dy,
                target,
            } => {
                let shapes = shapes.iter().map(|shape| self.resolve(shape)).collect();
                let target = target.as_deref().map(|target| self.resolve(target));
                self.modeler
                    .move_elements(shapes, Point::new(*dx, *dy), target.as_ref())?;
            }
            ScriptOp::Delete { shape } => {
                let shape = self.resolve(shape);
                if self.modeler.diagram().element(&shape)?.is_connection() {
                    modeling::remove_connection(self.modeler, &shape)?;
                } else {
                    modeling::delete_shape(self.modeler, &shape)?;
                }
            }
            ScriptOp::Attach { shape, host } => {
                let shape = self.resolve(shape);
                let host = host.as_deref().map(|host| self.resolve(host));
                modeling::attach_shape(self.modeler, &shape, host.as_ref())?;
            }
            ScriptOp::Connect {
                source,
                target,
                kind,
                alias,
            } => {
                let source = self.resolve(source);
                let target = self.resolve(target);
                let created = modeling::connect(self.modeler, &source, &target, *kind, None)?;
                self.remember(alias, created);
            }
            ScriptOp::Undo => self.modeler.undo()?,
            ScriptOp::Redo => self.modeler.redo()?,
        }
        Ok(())
    }

    pub fn aliases(&self) -> &BTreeMap<String, ElementId> {
        &self.aliases
    }

    fn resolve(&self, reference: &str) -> ElementId {
        self.aliases
            .get(reference)
            .cloned()
            .unwrap_or_else(|| ElementId::new(reference))
    }

    fn remember(&mut self, alias: &Option<String>, id: ElementId) {
        if let Some(alias) = alias {
            self.aliases.insert(alias.clone(), id);
        }
    }
}
