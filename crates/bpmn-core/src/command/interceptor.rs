use std::cmp::Reverse;
use std::rc::Rc;

use super::Scope;
use crate::ModelerResult;

/// Priority given to interceptors that do not care about ordering.
pub const DEFAULT_PRIORITY: i32 = 1000;

pub(crate) type ScopedHook<M, C> = Rc<dyn Fn(&mut Scope<'_, M, C>) -> ModelerResult<()>>;
pub(crate) type ExecuteHook<M, C> = Rc<dyn Fn(&mut M, &mut C) -> ModelerResult<()>>;
pub(crate) type RevertHook<M, C> = Rc<dyn Fn(&mut M, &C) -> ModelerResult<()>>;

/// Which commands an interceptor applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    All,
    Only(Vec<String>),
}

impl Commands {
    pub fn matches(&self, command: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(names) => names.iter().any(|name| name == command),
        }
    }
}

impl From<&str> for Commands {
    fn from(name: &str) -> Self {
        Self::Only(vec![name.to_string()])
    }
}

impl From<&[&str]> for Commands {
    fn from(names: &[&str]) -> Self {
        Self::Only(names.iter().map(|name| name.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Commands {
    fn from(names: [&str; N]) -> Self {
        Self::Only(names.iter().map(|name| name.to_string()).collect())
    }
}

impl From<Vec<String>> for Commands {
    fn from(names: Vec<String>) -> Self {
        Self::Only(names)
    }
}

struct Registration<H> {
    commands: Commands,
    priority: i32,
    order: u64,
    hook: H,
}

impl<H> Registration<H> {
    fn sort_key(&self) -> (Reverse<i32>, u64) {
        (Reverse(self.priority), self.order)
    }
}

/// Keeps `list` sorted by descending priority, then registration order.
fn insert_sorted<H>(list: &mut Vec<Registration<H>>, registration: Registration<H>) {
    let key = registration.sort_key();
    let pos = list
        .binary_search_by(|existing| existing.sort_key().cmp(&key))
        .unwrap_or_else(|p| p);
    list.insert(pos, registration);
}

fn matching<H: Clone>(list: &[Registration<H>], command: &str) -> Vec<H> {
    list.iter()
        .filter(|registration| registration.commands.matches(command))
        .map(|registration| registration.hook.clone())
        .collect()
}

/// Registry of phase hooks keyed by command name.
///
/// Pre-execute, execute and post-execute hooks run in descending priority,
/// ties in registration order. Revert hooks unwind in the exact reverse:
/// ascending priority, later registrations first.
pub struct InterceptorRegistry<M, C> {
    pre_execute: Vec<Registration<ScopedHook<M, C>>>,
    execute: Vec<Registration<ExecuteHook<M, C>>>,
    post_execute: Vec<Registration<ScopedHook<M, C>>>,
    revert: Vec<Registration<RevertHook<M, C>>>,
    next_order: u64,
}

impl<M, C> InterceptorRegistry<M, C> {
    pub fn new() -> Self {
        Self {
            pre_execute: Vec::new(),
            execute: Vec::new(),
            post_execute: Vec::new(),
            revert: Vec::new(),
            next_order: 0,
        }
    }

    /// Runs before the handler's own pre-execute. The context is writable.
    pub fn pre_execute<F>(&mut self, commands: impl Into<Commands>, priority: i32, hook: F)
    where
        F: Fn(&mut Scope<'_, M, C>) -> ModelerResult<()> + 'static,
    {
        let registration = self.registration(commands.into(), priority, Rc::new(hook) as ScopedHook<M, C>);
        insert_sorted(&mut self.pre_execute, registration);
    }

    /// Runs after the handler's execute, and again on redo.
    pub fn execute<F>(&mut self, commands: impl Into<Commands>, priority: i32, hook: F)
    where
        F: Fn(&mut M, &mut C) -> ModelerResult<()> + 'static,
    {
        let registration = self.registration(commands.into(), priority, Rc::new(hook) as ExecuteHook<M, C>);
        insert_sorted(&mut self.execute, registration);
    }

    /// Runs after the handler's post-execute. The context is read-only.
    pub fn post_execute<F>(&mut self, commands: impl Into<Commands>, priority: i32, hook: F)
    where
        F: Fn(&mut Scope<'_, M, C>) -> ModelerResult<()> + 'static,
    {
        let registration = self.registration(commands.into(), priority, Rc::new(hook) as ScopedHook<M, C>);
        insert_sorted(&mut self.post_execute, registration);
    }

    /// Runs on undo, before the handler's revert.
    pub fn revert<F>(&mut self, commands: impl Into<Commands>, priority: i32, hook: F)
    where
        F: Fn(&mut M, &C) -> ModelerResult<()> + 'static,
    {
        let registration = self.registration(commands.into(), priority, Rc::new(hook) as RevertHook<M, C>);
        insert_sorted(&mut self.revert, registration);
    }

    pub fn len(&self) -> usize {
        self.pre_execute.len() + self.execute.len() + self.post_execute.len() + self.revert.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn registration<H>(&mut self, commands: Commands, priority: i32, hook: H) -> Registration<H> {
        let order = self.next_order;
        self.next_order += 1;
        Registration {
            commands,
            priority,
            order,
            hook,
        }
    }

    pub(crate) fn pre_execute_hooks(&self, command: &str) -> Vec<ScopedHook<M, C>> {
        matching(&self.pre_execute, command)
    }

    pub(crate) fn execute_hooks(&self, command: &str) -> Vec<ExecuteHook<M, C>> {
        matching(&self.execute, command)
    }

    pub(crate) fn post_execute_hooks(&self, command: &str) -> Vec<ScopedHook<M, C>> {
        matching(&self.post_execute, command)
    }

    pub(crate) fn revert_hooks(&self, command: &str) -> Vec<RevertHook<M, C>> {
        let mut hooks = matching(&self.revert, command);
        hooks.reverse();
        hooks
    }
}

impl<M, C> Default for InterceptorRegistry<M, C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    fn run_execute(registry: &InterceptorRegistry<(), ()>, command: &str) {
        for hook in registry.execute_hooks(command) {
            hook(&mut (), &mut ()).unwrap();
        }
    }

    fn run_revert(registry: &InterceptorRegistry<(), ()>, command: &str) {
        for hook in registry.revert_hooks(command) {
            hook(&mut (), &()).unwrap();
        }
    }

    fn push(log: &Log, label: &'static str) -> impl Fn(&mut (), &mut ()) -> ModelerResult<()> {
        let log = log.clone();
        move |_, _| {
            log.borrow_mut().push(label);
            Ok(())
        }
    }

    #[test]
    fn test_priority_then_registration_order() {
        let log: Log = Rc::default();
        let mut registry = InterceptorRegistry::new();

        registry.execute("shape.create", DEFAULT_PRIORITY, push(&log, "default-1"));
        registry.execute("shape.create", 500, push(&log, "low"));
        registry.execute("shape.create", 1500, push(&log, "high"));
        registry.execute("shape.create", DEFAULT_PRIORITY, push(&log, "default-2"));

        run_execute(&registry, "shape.create");
        assert_eq!(*log.borrow(), vec!["high", "default-1", "default-2", "low"]);
    }

    #[test]
    fn test_revert_unwinds_in_reverse() {
        let log: Log = Rc::default();
        let mut registry = InterceptorRegistry::new();

        for (label, priority) in [("r1", DEFAULT_PRIORITY), ("r2", DEFAULT_PRIORITY), ("low", 10)] {
            let log = log.clone();
            registry.revert("shape.create", priority, move |_: &mut (), _: &()| {
                log.borrow_mut().push(label);
                Ok(())
            });
        }

        run_revert(&registry, "shape.create");
        assert_eq!(*log.borrow(), vec!["low", "r2", "r1"]);
    }

    #[test]
    fn test_command_filters() {
        let log: Log = Rc::default();
        let mut registry = InterceptorRegistry::new();

        registry.execute("shape.create", DEFAULT_PRIORITY, push(&log, "create"));
        registry.execute(["shape.move", "shape.delete"], DEFAULT_PRIORITY, push(&log, "move-or-delete"));
        registry.execute(Commands::All, DEFAULT_PRIORITY, push(&log, "global"));

        run_execute(&registry, "shape.delete");
        assert_eq!(*log.borrow(), vec!["move-or-delete", "global"]);

        log.borrow_mut().clear();
        run_execute(&registry, "connection.create");
        assert_eq!(*log.borrow(), vec!["global"]);
        assert_eq!(registry.len(), 3);
    }
}
