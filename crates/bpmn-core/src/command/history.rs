//! Undo/redo history of command transactions.
//!
//! Each history entry is a [`Transaction`]: the tree of invocations produced by
//! one top-level command, stored as an arena. Undo and redo never recurse
//! through the tree; they walk the transaction's chronological execution list
//! backwards or forwards.

use std::collections::VecDeque;

use super::Phase;

/// One command invocation inside a transaction.
#[derive(Debug, Clone)]
pub struct InvocationRecord<C> {
    command: String,
    context: Option<C>,
    parent: Option<usize>,
    spawned_in: Option<Phase>,
    children: Vec<usize>,
}

impl<C> InvocationRecord<C> {
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Final context of the invocation; absent only while it is still running.
    pub fn context(&self) -> Option<&C> {
        self.context.as_ref()
    }

    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Phase of the parent invocation that dispatched this one.
    pub fn spawned_in(&self) -> Option<Phase> {
        self.spawned_in
    }

    pub fn children(&self) -> &[usize] {
        &self.children
    }
}

/// Invocation tree of one top-level command; the root is record `0`.
#[derive(Debug, Clone)]
pub struct Transaction<C> {
    records: Vec<InvocationRecord<C>>,
    executed: Vec<usize>,
}

impl<C> Transaction<C> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            executed: Vec::new(),
        }
    }

    pub fn root(&self) -> Option<&InvocationRecord<C>> {
        self.records.first()
    }

    pub fn record(&self, index: usize) -> Option<&InvocationRecord<C>> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[InvocationRecord<C>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record indices in the order their execute phase ran.
    pub fn execution_order(&self) -> &[usize] {
        &self.executed
    }

    /// Command names in the order their execute phase ran.
    pub fn executed_commands(&self) -> Vec<&str> {
        self.executed
            .iter()
            .filter_map(|&index| self.records.get(index))
            .map(|record| record.command.as_str())
            .collect()
    }

    pub(crate) fn open(&mut self, command: &str, parent: Option<(usize, Phase)>) -> usize {
        let index = self.records.len();
        self.records.push(InvocationRecord {
            command: command.to_string(),
            context: None,
            parent: parent.map(|(parent, _)| parent),
            spawned_in: parent.map(|(_, phase)| phase),
            children: Vec::new(),
        });
        if let Some(parent) = parent.and_then(|(parent, _)| self.records.get_mut(parent)) {
            parent.children.push(index);
        }
        index
    }

    pub(crate) fn mark_executed(&mut self, index: usize) {
        self.executed.push(index);
    }

    pub(crate) fn close(&mut self, index: usize, context: C) {
        if let Some(record) = self.records.get_mut(index) {
            record.context = Some(context);
        }
    }

    pub(crate) fn split_record_mut(&mut self, index: usize) -> Option<(&str, &mut C)> {
        self.records
            .get_mut(index)
            .and_then(|record| record.context.as_mut().map(|context| (record.command.as_str(), context)))
    }
}

impl<C> Default for Transaction<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Linear undo/redo history of transactions.
///
/// Pushing a new transaction clears the redo side; there are no branching
/// timelines. With a limit set, the oldest undo entries are evicted.
#[derive(Debug)]
pub struct History<C> {
    /// Most recent = back of deque.
    undo_stack: VecDeque<Transaction<C>>,

    /// Most recent = back of deque.
    redo_stack: VecDeque<Transaction<C>>,

    limit: Option<usize>,
}

impl<C> History<C> {
    pub fn new() -> Self {
        Self::with_limit(None)
    }

    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            limit,
        }
    }

    /// Record a freshly executed transaction. A zero limit keeps nothing and
    /// hands the transaction back.
    pub fn push(&mut self, transaction: Transaction<C>) -> Option<Transaction<C>> {
        // Any new action clears the redo history
        self.redo_stack.clear();
        if self.limit == Some(0) {
            return Some(transaction);
        }
        self.push_undo(transaction);
        None
    }

    pub fn pop_undo(&mut self) -> Option<Transaction<C>> {
        self.undo_stack.pop_back()
    }

    pub fn pop_redo(&mut self) -> Option<Transaction<C>> {
        self.redo_stack.pop_back()
    }

    /// Park an undone transaction for redo.
    pub fn push_redo(&mut self, transaction: Transaction<C>) {
        self.redo_stack.push_back(transaction);
    }

    /// Put a redone transaction back without touching the redo side.
    pub fn push_undo(&mut self, transaction: Transaction<C>) {
        self.undo_stack.push_back(transaction);
        if let Some(limit) = self.limit {
            while self.undo_stack.len() > limit {
                self.undo_stack.pop_front();
            }
        }
    }

    pub fn peek_undo(&self) -> Option<&Transaction<C>> {
        self.undo_stack.back()
    }

    pub fn peek_redo(&self) -> Option<&Transaction<C>> {
        self.redo_stack.back()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
}

impl<C> Default for History<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transaction(command: &str) -> Transaction<()> {
        let mut transaction = Transaction::new();
        let root = transaction.open(command, None);
        transaction.mark_executed(root);
        transaction.close(root, ());
        transaction
    }

    #[test]
    fn test_basic_undo() {
        let mut history = History::new();

        history.push(transaction("shape.create"));
        assert!(history.can_undo());
        assert!(!history.can_redo());

        let restored = history.pop_undo();
        assert!(restored.is_some());
        assert!(!history.can_undo());
    }

    #[test]
    fn test_redo_cleared_on_new_action() {
        let mut history = History::new();

        history.push(transaction("shape.create"));
        history.push_redo(transaction("shape.move"));
        assert!(history.can_redo());

        history.push(transaction("shape.delete"));
        assert!(!history.can_redo());
        assert_eq!(history.undo_depth(), 2);
    }

    #[test]
    fn test_push_undo_keeps_redo() {
        let mut history = History::new();

        history.push_redo(transaction("shape.move"));
        history.push_undo(transaction("shape.create"));
        assert!(history.can_redo());
        assert!(history.can_undo());
    }

    #[test]
    fn test_limit_evicts_oldest() {
        let mut history = History::with_limit(Some(2));

        history.push(transaction("a"));
        history.push(transaction("b"));
        history.push(transaction("c"));

        assert_eq!(history.undo_depth(), 2);
        let newest = history.pop_undo().unwrap();
        assert_eq!(newest.root().unwrap().command(), "c");
        let older = history.pop_undo().unwrap();
        assert_eq!(older.root().unwrap().command(), "b");
    }

    #[test]
    fn test_zero_limit_keeps_nothing() {
        let mut history = History::with_limit(Some(0));

        history.push_redo(transaction("a"));
        let returned = history.push(transaction("b")).unwrap();

        assert_eq!(returned.root().unwrap().command(), "b");
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(history.push(transaction("c")).is_some());
    }

    #[test]
    fn test_clear() {
        let mut history = History::new();

        history.push(transaction("a"));
        history.push_redo(transaction("b"));
        history.clear();

        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_transaction_tree_links() {
        let mut tx: Transaction<()> = Transaction::new();
        let root = tx.open("shape.create", None);
        let before = tx.open("canvas.updateRoot", Some((root, Phase::PreExecute)));
        tx.mark_executed(before);
        tx.close(before, ());
        tx.mark_executed(root);
        let after = tx.open("elements.move", Some((root, Phase::PostExecute)));
        tx.mark_executed(after);
        tx.close(after, ());
        tx.close(root, ());

        assert_eq!(tx.root().unwrap().children(), &[before, after]);
        assert_eq!(tx.record(after).unwrap().parent(), Some(root));
        assert_eq!(tx.record(before).unwrap().spawned_in(), Some(Phase::PreExecute));
        assert_eq!(
            tx.executed_commands(),
            vec!["canvas.updateRoot", "shape.create", "elements.move"]
        );
    }
}
