use bpmn_core::{
    Dispatcher, LogEntry, Loggable, ModelerConfig, ModelerError, ModelerResult, StackObserver,
};
use std::rc::Rc;

use crate::behaviors::{register_behaviors, FeedbackLog, FeedbackSink, ModelingFeedback, RejectedDrop};
use crate::commands::{register_handlers, top_level, ModelingStack};
use crate::factory::{self, ShapeAttrs};
use crate::modeling;
use crate::rules::{AttachRule, BpmnRules, ConnectionRules, PlacementRules};
use crate::{Diagram, ElementId, ModelingContext, Point};

/// A diagram together with its command stack, handlers and behaviors.
pub struct Modeler {
    stack: ModelingStack,
    placement: Rc<dyn PlacementRules>,
    feedback: Option<ModelingFeedback>,
    config: ModelerConfig,
}

impl Modeler {
    pub fn new(diagram: Diagram, config: ModelerConfig) -> Self {
        Self::with_collaborators(
            diagram,
            config,
            Rc::new(BpmnRules::new()),
            Rc::new(FeedbackLog::new()),
        )
    }

    /// Build a modeler whose behaviors and placement checks consult `rules`.
    pub fn with_collaborators<R>(
        diagram: Diagram,
        config: ModelerConfig,
        rules: Rc<R>,
        sink: Rc<dyn FeedbackSink>,
    ) -> Self
    where
        R: ConnectionRules + PlacementRules + 'static,
    {
        let connections: Rc<dyn ConnectionRules> = rules.clone();
        let mut stack = ModelingStack::with_history_limit(diagram, config.history_limit);
        register_handlers(&mut stack, connections.clone());
        register_behaviors(&mut stack, &config, connections);
        let feedback = config.feedback.then(|| ModelingFeedback::new(sink));

        Self {
            stack,
            placement: rules,
            feedback,
            config,
        }
    }

    pub fn diagram(&self) -> &Diagram {
        self.stack.model()
    }

    pub fn into_diagram(self) -> Diagram {
        self.stack.into_model()
    }

    pub fn config(&self) -> &ModelerConfig {
        &self.config
    }

    pub fn stack(&self) -> &ModelingStack {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut ModelingStack {
        &mut self.stack
    }

    pub fn subscribe(&mut self, observer: Rc<dyn StackObserver>) {
        self.stack.subscribe(observer);
    }

    pub fn execute(&mut self, command: &str, context: ModelingContext) -> ModelerResult<()> {
        self.stack.execute(command, context)
    }

    pub fn undo(&mut self) -> ModelerResult<()> {
        self.stack.undo()
    }

    pub fn redo(&mut self) -> ModelerResult<()> {
        self.stack.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.stack.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.stack.can_redo()
    }

    pub fn journal(&self) -> &[LogEntry] {
        self.stack.get_logs()
    }

    /// Register a detached element; nothing is recorded for undo.
    pub fn create_element(&mut self, attrs: ShapeAttrs) -> ModelerResult<ElementId> {
        factory::create_element(self.stack.model_mut(), attrs)
    }

    /// Register a detached participant, optionally owning a fresh process.
    pub fn create_participant(&mut self, with_process: bool) -> ModelerResult<ElementId> {
        factory::create_participant(self.stack.model_mut(), with_process)
    }

    /// Create a new element at `position` on `target` the way an interactive
    /// drop would: attaching, dropping or rejecting according to the rules.
    pub fn place(
        &mut self,
        attrs: ShapeAttrs,
        position: Point,
        target: &ElementId,
    ) -> ModelerResult<ElementId> {
        let kind = attrs.kind;
        let rule = self
            .placement
            .can_attach(self.diagram(), kind, target, Some(position));
        let shape = self.create_element(attrs)?;

        match rule {
            AttachRule::Attach => modeling::create_shape(self, &shape, position, target, true),
            AttachRule::Drop => modeling::create_shape(self, &shape, position, target, false),
            AttachRule::Reject => Err(self.reject(shape, target, position)),
        }
    }

    /// Move `shapes` by `delta`, into `target` if given, unless the rules
    /// forbid the new parent.
    pub fn move_elements(
        &mut self,
        shapes: Vec<ElementId>,
        delta: Point,
        target: Option<&ElementId>,
    ) -> ModelerResult<()> {
        if let Some(target) = target {
            for shape in top_level(self.diagram(), &shapes) {
                let kind = self.diagram().element(&shape)?.kind;
                let into_itself =
                    *target == shape || self.diagram().ancestors(target).contains(&shape);
                let allowed = !into_itself
                    && (kind.is_connection()
                        || self.placement.can_create(self.diagram(), kind, target));
                if !allowed {
                    let position = self.diagram().element(&shape)?.center().translate(delta);
                    return Err(self.reject(shape, target, position));
                }
            }
        }
        modeling::move_shapes(self, shapes, delta, target)
    }

    /// Explain a refused drop and build the error describing it.
    fn reject(&self, shape: ElementId, target: &ElementId, position: Point) -> ModelerError {
        let message = format!("cannot place {} onto {}", shape, target);
        if let Some(feedback) = &self.feedback {
            feedback.on_rejected(
                self.diagram(),
                &RejectedDrop {
                    shape,
                    target: target.clone(),
                    position,
                },
            );
        }
        tracing::debug!("{}", message);
        ModelerError::Validation(message)
    }
}

impl Dispatcher<Diagram, ModelingContext> for Modeler {
    fn dispatch(&mut self, command: &str, context: ModelingContext) -> ModelerResult<()> {
        self.stack.execute(command, context)
    }

    fn model(&self) -> &Diagram {
        self.stack.model()
    }

    fn model_mut(&mut self) -> &mut Diagram {
        self.stack.model_mut()
    }

    fn last_context(&self) -> Option<&ModelingContext> {
        self.stack.last_context()
    }
}
