use super::Scope;
use crate::ModelerResult;

/// Core implementation of a named command.
///
/// `execute` must stash everything `revert` needs into the context before it
/// mutates the model. Nested commands may only be dispatched from
/// `pre_execute` and `post_execute`.
pub trait CommandHandler<M, C> {
    fn pre_execute(&self, _scope: &mut Scope<'_, M, C>) -> ModelerResult<()> {
        Ok(())
    }

    fn execute(&self, model: &mut M, context: &mut C) -> ModelerResult<()>;

    fn post_execute(&self, _scope: &mut Scope<'_, M, C>) -> ModelerResult<()> {
        Ok(())
    }

    fn revert(&self, model: &mut M, context: &C) -> ModelerResult<()>;
}
