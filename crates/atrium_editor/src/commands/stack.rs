//! Undo/redo command stack with transaction support.
//!
//! History and redo are disjoint bounded stacks. The only transitions are
//! execute (push history, clear redo), undo (history to redo) and redo
//! (redo to history). A command whose `undo` or redo fails is dropped, so it
//! can never sit in both stacks.

use std::collections::VecDeque;
use std::time::SystemTime;

use atrium_event::{EventBus, EventKind};
use parking_lot::Mutex;

use super::command::{run_guarded, Command, CommandError, CommandResult};
use crate::events::{CommandExecuted, CommandRedone, CommandUndone};

/// Snapshot of a command for display and events
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandInfo {
    pub description: String,
    pub timestamp: SystemTime,
}

impl CommandInfo {
    fn of(cmd: &dyn Command) -> Self {
        Self {
            description: cmd.description().to_string(),
            timestamp: cmd.timestamp(),
        }
    }
}

/// A group of commands executed as a single undoable unit.
struct Transaction {
    name: String,
    started: SystemTime,
    commands: Vec<Box<dyn Command>>,
}

impl Transaction {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            started: SystemTime::now(),
            commands: Vec::new(),
        }
    }
}

#[derive(Clone, Copy)]
enum Replay {
    Execute,
    Undo,
}

/// Replay `steps` to put a transaction back where it was. Every step that
/// fails is logged; returns how many did.
fn compensate<'a>(
    transaction: &str,
    steps: impl Iterator<Item = &'a mut Box<dyn Command>>,
    replay: Replay,
) -> usize {
    let mut stuck = 0;
    for step in steps {
        let result = match replay {
            Replay::Execute => run_guarded(|| step.execute()),
            Replay::Undo => run_guarded(|| step.undo()),
        };
        if let Err(err) = result {
            log::warn!(
                "Transaction '{}': could not restore '{}': {}",
                transaction,
                step.description(),
                err
            );
            stuck += 1;
        }
    }
    stuck
}

fn partially_applied(err: CommandError, stuck: usize) -> CommandError {
    if stuck == 0 {
        err
    } else {
        CommandError::Other(format!("{err}; {stuck} step(s) could not be restored"))
    }
}

/// Command that replays a committed transaction.
///
/// A failing step in either direction restores the steps already replayed,
/// so the group is always all applied or all reverted unless a restore fails
/// too.
struct TransactionCommand(Transaction);

impl TransactionCommand {
    fn batch(name: impl Into<String>, commands: Vec<Box<dyn Command>>) -> Option<Box<dyn Command>> {
        if commands.is_empty() {
            return None;
        }
        let mut transaction = Transaction::new(name);
        transaction.commands = commands;
        Some(Box::new(Self(transaction)))
    }
}

impl Command for TransactionCommand {
    fn description(&self) -> &str {
        &self.0.name
    }

    fn timestamp(&self) -> SystemTime {
        self.0.started
    }

    fn execute(&mut self) -> CommandResult {
        let Transaction { name, commands, .. } = &mut self.0;
        for index in 0..commands.len() {
            if let Err(err) = run_guarded(|| commands[index].execute()) {
                let stuck = compensate(name, commands[..index].iter_mut().rev(), Replay::Undo);
                return Err(partially_applied(err, stuck));
            }
        }
        Ok(())
    }

    fn undo(&mut self) -> CommandResult {
        let Transaction { name, commands, .. } = &mut self.0;
        for index in (0..commands.len()).rev() {
            if let Err(err) = run_guarded(|| commands[index].undo()) {
                // Reapply what was already reverted, oldest first
                let stuck = compensate(name, commands[index + 1..].iter_mut(), Replay::Execute);
                return Err(partially_applied(err, stuck));
            }
        }
        Ok(())
    }
}

fn apply(cmd: &mut Box<dyn Command>) -> bool {
    match run_guarded(|| cmd.execute()) {
        Ok(()) => true,
        Err(err) => {
            log::warn!("Command '{}' failed: {}", cmd.description(), err);
            false
        }
    }
}

fn revert(cmd: &mut Box<dyn Command>) -> bool {
    match run_guarded(|| cmd.undo()) {
        Ok(()) => true,
        Err(err) => {
            log::warn!("Undo of '{}' failed, dropping it: {}", cmd.description(), err);
            false
        }
    }
}

fn reapply(cmd: &mut Box<dyn Command>) -> bool {
    match run_guarded(|| cmd.execute()) {
        Ok(()) => true,
        Err(err) => {
            log::warn!("Redo of '{}' failed, dropping it: {}", cmd.description(), err);
            false
        }
    }
}

fn publish<E: EventKind<Payload = CommandInfo>>(bus: Option<&EventBus>, info: CommandInfo) {
    if let Some(bus) = bus {
        bus.emit::<E>(info);
    }
}

/// Linear undo/redo history.
///
/// Inside a transaction no `CommandExecuted` is published per command; the
/// committed group publishes one under the transaction's name.
pub struct CommandStack {
    /// Oldest first
    history: VecDeque<Box<dyn Command>>,
    /// Most recently undone last
    redo: Vec<Box<dyn Command>>,
    max_history_size: usize,
    transaction: Option<Transaction>,
    bus: Option<EventBus>,
}

impl Default for CommandStack {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandStack {
    /// Default maximum history size.
    pub const DEFAULT_MAX_SIZE: usize = 100;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_MAX_SIZE)
    }

    pub fn with_capacity(max_history_size: usize) -> Self {
        Self {
            history: VecDeque::new(),
            redo: Vec::new(),
            max_history_size,
            transaction: None,
            bus: None,
        }
    }

    /// Publish `CommandExecuted`, `CommandUndone` and `CommandRedone` on `bus`
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Run `cmd` and record it.
    ///
    /// Returns false, recording nothing, if the command fails or panics.
    pub fn execute(&mut self, mut cmd: Box<dyn Command>) -> bool {
        if !apply(&mut cmd) {
            return false;
        }
        if let Some(info) = self.record_executed(cmd) {
            publish::<CommandExecuted>(self.bus.as_ref(), info);
        }
        true
    }

    /// Run `commands` in order as one history entry named `name`.
    ///
    /// If any of them fails the ones already run are undone and nothing is
    /// recorded. An empty batch records nothing and returns false.
    pub fn execute_batch(&mut self, name: impl Into<String>, commands: Vec<Box<dyn Command>>) -> bool {
        match TransactionCommand::batch(name, commands) {
            Some(batch) => self.execute(batch),
            None => false,
        }
    }

    /// Revert the most recent command
    pub fn undo(&mut self) -> bool {
        let Some(mut cmd) = self.take_undo() else {
            return false;
        };
        if !revert(&mut cmd) {
            return false;
        }
        let info = self.record_undone(cmd);
        publish::<CommandUndone>(self.bus.as_ref(), info);
        true
    }

    /// Re-apply the most recently undone command
    pub fn redo(&mut self) -> bool {
        let Some(mut cmd) = self.take_redo() else {
            return false;
        };
        if !reapply(&mut cmd) {
            return false;
        }
        let info = self.record_redone(cmd);
        publish::<CommandRedone>(self.bus.as_ref(), info);
        true
    }

    /// Store an executed command. Returns the info to publish, or `None`
    /// when it joined an open transaction.
    fn record_executed(&mut self, cmd: Box<dyn Command>) -> Option<CommandInfo> {
        let info = CommandInfo::of(cmd.as_ref());
        log::debug!("Executed '{}'", info.description);
        self.redo.clear();

        match self.transaction.as_mut() {
            Some(transaction) => {
                transaction.commands.push(cmd);
                None
            }
            None => {
                self.push_history(cmd);
                Some(info)
            }
        }
    }

    fn take_undo(&mut self) -> Option<Box<dyn Command>> {
        if self.transaction.is_some() {
            log::warn!("Undo ignored while a transaction is open");
            return None;
        }
        self.history.pop_back()
    }

    fn take_redo(&mut self) -> Option<Box<dyn Command>> {
        if self.transaction.is_some() {
            log::warn!("Redo ignored while a transaction is open");
            return None;
        }
        self.redo.pop()
    }

    fn record_undone(&mut self, cmd: Box<dyn Command>) -> CommandInfo {
        let info = CommandInfo::of(cmd.as_ref());
        log::debug!("Undid '{}'", info.description);
        self.redo.push(cmd);
        info
    }

    fn record_redone(&mut self, cmd: Box<dyn Command>) -> CommandInfo {
        let info = CommandInfo::of(cmd.as_ref());
        log::debug!("Redid '{}'", info.description);
        self.push_history(cmd);
        info
    }

    fn push_history(&mut self, cmd: Box<dyn Command>) {
        self.history.push_back(cmd);
        self.evict();
    }

    fn evict(&mut self) {
        while self.history.len() > self.max_history_size {
            if let Some(oldest) = self.history.pop_front() {
                log::trace!("History full, evicting '{}'", oldest.description());
            }
        }
    }

    /// Check if there are commands to undo.
    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    /// Check if there are commands to redo.
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// The command `undo` would revert next
    pub fn current_command(&self) -> Option<CommandInfo> {
        self.history.back().map(|cmd| CommandInfo::of(cmd.as_ref()))
    }

    /// History, oldest first
    pub fn history(&self) -> Vec<CommandInfo> {
        self.history.iter().map(|cmd| CommandInfo::of(cmd.as_ref())).collect()
    }

    /// Redo stack, next to redo last
    pub fn redo_stack(&self) -> Vec<CommandInfo> {
        self.redo.iter().map(|cmd| CommandInfo::of(cmd.as_ref())).collect()
    }

    pub fn history_size(&self) -> usize {
        self.history.len()
    }

    pub fn redo_size(&self) -> usize {
        self.redo.len()
    }

    pub fn max_history_size(&self) -> usize {
        self.max_history_size
    }

    /// Change the bound; shrinking evicts the oldest entries immediately
    pub fn set_max_history_size(&mut self, max: usize) {
        self.max_history_size = max;
        self.evict();
    }

    /// Forget all history. An open transaction is discarded without rollback.
    pub fn clear(&mut self) {
        self.history.clear();
        self.redo.clear();
        self.transaction = None;
    }

    /// Begin grouping executed commands into one history entry.
    ///
    /// An already open transaction is committed first.
    pub fn begin_transaction(&mut self, name: impl Into<String>) {
        if let Some(info) = self.reopen_transaction(name) {
            publish::<CommandExecuted>(self.bus.as_ref(), info);
        }
    }

    fn reopen_transaction(&mut self, name: impl Into<String>) -> Option<CommandInfo> {
        let committed = if self.transaction.is_some() {
            log::warn!("Beginning transaction while one is already open");
            self.close_transaction()
        } else {
            None
        };
        self.transaction = Some(Transaction::new(name));
        committed
    }

    /// Close the open transaction. Returns true if it recorded a history entry.
    pub fn commit_transaction(&mut self) -> bool {
        match self.close_transaction() {
            Some(info) => {
                publish::<CommandExecuted>(self.bus.as_ref(), info);
                true
            }
            None => false,
        }
    }

    fn close_transaction(&mut self) -> Option<CommandInfo> {
        let transaction = self.transaction.take()?;
        if transaction.commands.is_empty() {
            return None;
        }
        log::debug!(
            "Committed transaction '{}' ({} commands)",
            transaction.name,
            transaction.commands.len()
        );
        let cmd: Box<dyn Command> = Box::new(TransactionCommand(transaction));
        let info = CommandInfo::of(cmd.as_ref());
        self.push_history(cmd);
        Some(info)
    }

    /// Undo everything executed in the open transaction, newest first.
    ///
    /// Returns false if there was no transaction or an undo failed.
    pub fn rollback_transaction(&mut self) -> bool {
        match self.transaction.take() {
            Some(transaction) => rollback(transaction),
            None => false,
        }
    }

    /// Check if a transaction is currently open.
    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }
}

fn rollback(mut transaction: Transaction) -> bool {
    let Transaction { name, commands, .. } = &mut transaction;
    let stuck = compensate(name, commands.iter_mut().rev(), Replay::Undo);
    log::debug!("Rolled back transaction '{}'", name);
    stuck == 0
}

/// A [`CommandStack`] that can be driven from bus handlers.
///
/// The lock is held only while commands move between the stacks. Commands
/// run, and `Command*` events are published, with it released, so handlers
/// of the events a command causes may query or drive the stack again.
/// Commands executed that way while a transaction is open join it.
pub struct SharedCommandStack {
    inner: Mutex<CommandStack>,
}

impl Default for SharedCommandStack {
    fn default() -> Self {
        Self::new(CommandStack::new())
    }
}

impl SharedCommandStack {
    pub fn new(stack: CommandStack) -> Self {
        Self {
            inner: Mutex::new(stack),
        }
    }

    /// See [`CommandStack::execute`]
    pub fn execute(&self, mut cmd: Box<dyn Command>) -> bool {
        if !apply(&mut cmd) {
            return false;
        }
        let (info, bus) = {
            let mut stack = self.inner.lock();
            (stack.record_executed(cmd), stack.bus.clone())
        };
        if let Some(info) = info {
            publish::<CommandExecuted>(bus.as_ref(), info);
        }
        true
    }

    /// See [`CommandStack::execute_batch`]
    pub fn execute_batch(&self, name: impl Into<String>, commands: Vec<Box<dyn Command>>) -> bool {
        match TransactionCommand::batch(name, commands) {
            Some(batch) => self.execute(batch),
            None => false,
        }
    }

    pub fn undo(&self) -> bool {
        let taken = self.inner.lock().take_undo();
        let Some(mut cmd) = taken else {
            return false;
        };
        if !revert(&mut cmd) {
            return false;
        }
        let (info, bus) = {
            let mut stack = self.inner.lock();
            (stack.record_undone(cmd), stack.bus.clone())
        };
        publish::<CommandUndone>(bus.as_ref(), info);
        true
    }

    pub fn redo(&self) -> bool {
        let taken = self.inner.lock().take_redo();
        let Some(mut cmd) = taken else {
            return false;
        };
        if !reapply(&mut cmd) {
            return false;
        }
        let (info, bus) = {
            let mut stack = self.inner.lock();
            (stack.record_redone(cmd), stack.bus.clone())
        };
        publish::<CommandRedone>(bus.as_ref(), info);
        true
    }

    pub fn begin_transaction(&self, name: impl Into<String>) {
        let (info, bus) = {
            let mut stack = self.inner.lock();
            (stack.reopen_transaction(name), stack.bus.clone())
        };
        if let Some(info) = info {
            publish::<CommandExecuted>(bus.as_ref(), info);
        }
    }

    pub fn commit_transaction(&self) -> bool {
        let (info, bus) = {
            let mut stack = self.inner.lock();
            (stack.close_transaction(), stack.bus.clone())
        };
        match info {
            Some(info) => {
                publish::<CommandExecuted>(bus.as_ref(), info);
                true
            }
            None => false,
        }
    }

    pub fn rollback_transaction(&self) -> bool {
        let taken = self.inner.lock().transaction.take();
        taken.map_or(false, rollback)
    }

    pub fn in_transaction(&self) -> bool {
        self.inner.lock().in_transaction()
    }

    pub fn can_undo(&self) -> bool {
        self.inner.lock().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.inner.lock().can_redo()
    }

    pub fn current_command(&self) -> Option<CommandInfo> {
        self.inner.lock().current_command()
    }

    pub fn history(&self) -> Vec<CommandInfo> {
        self.inner.lock().history()
    }

    pub fn redo_stack(&self) -> Vec<CommandInfo> {
        self.inner.lock().redo_stack()
    }

    pub fn history_size(&self) -> usize {
        self.inner.lock().history_size()
    }

    pub fn redo_size(&self) -> usize {
        self.inner.lock().redo_size()
    }

    pub fn max_history_size(&self) -> usize {
        self.inner.lock().max_history_size()
    }

    pub fn set_max_history_size(&self, max: usize) {
        self.inner.lock().set_max_history_size(max);
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{CommandError, FnCommand};
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Adds `amount` to a shared counter
    fn add(counter: &Arc<Mutex<i32>>, amount: i32) -> Box<dyn Command> {
        let up = Arc::clone(counter);
        let down = Arc::clone(counter);
        Box::new(FnCommand::new(
            format!("add {amount}"),
            move || {
                *up.lock() += amount;
                Ok(())
            },
            move || {
                *down.lock() -= amount;
                Ok(())
            },
        ))
    }

    fn failing() -> Box<dyn Command> {
        Box::new(FnCommand::new(
            "fail",
            || Err(CommandError::InvalidOperation("nope".into())),
            || Ok(()),
        ))
    }

    fn descriptions(infos: Vec<CommandInfo>) -> Vec<String> {
        infos.into_iter().map(|i| i.description).collect()
    }

    #[test]
    fn test_execute_undo_round_trip() {
        let counter = Arc::new(Mutex::new(0));
        let mut stack = CommandStack::new();

        for n in 1..=5 {
            assert!(stack.execute(add(&counter, n)));
        }
        assert_eq!(*counter.lock(), 15);

        for _ in 0..5 {
            assert!(stack.undo());
        }
        assert_eq!(*counter.lock(), 0);
        assert!(!stack.undo());
        assert_eq!(stack.redo_size(), 5);
    }

    #[test]
    fn test_failing_command_not_recorded() {
        let counter = Arc::new(Mutex::new(0));
        let mut stack = CommandStack::new();
        stack.execute(add(&counter, 1));

        assert!(!stack.execute(failing()));
        assert_eq!(stack.history_size(), 1);

        let panicking = Box::new(FnCommand::new("panic", || panic!("bad"), || Ok(())));
        assert!(!stack.execute(panicking));
        assert_eq!(stack.history_size(), 1);
    }

    #[test]
    fn test_new_command_clears_redo() {
        let counter = Arc::new(Mutex::new(0));
        let mut stack = CommandStack::new();
        stack.execute(add(&counter, 1));
        stack.execute(add(&counter, 2));
        stack.undo();
        assert!(stack.can_redo());

        stack.execute(add(&counter, 10));
        assert!(!stack.can_redo());
        assert_eq!(*counter.lock(), 11);
    }

    #[test]
    fn test_redo() {
        let counter = Arc::new(Mutex::new(0));
        let mut stack = CommandStack::new();
        stack.execute(add(&counter, 3));
        stack.undo();
        assert!(stack.redo());
        assert_eq!(*counter.lock(), 3);
        assert_eq!(stack.history_size(), 1);
        assert!(!stack.redo());
    }

    #[test]
    fn test_failed_undo_drops_command() {
        let mut stack = CommandStack::new();
        stack.execute(Box::new(FnCommand::new(
            "stuck",
            || Ok(()),
            || Err(CommandError::Other("cannot undo".into())),
        )));

        assert!(!stack.undo());
        assert_eq!(stack.history_size(), 0);
        assert_eq!(stack.redo_size(), 0);
    }

    #[test]
    fn test_history_bound_evicts_oldest() {
        let counter = Arc::new(Mutex::new(0));
        let mut stack = CommandStack::with_capacity(3);
        for n in 1..=5 {
            stack.execute(add(&counter, n));
        }
        assert_eq!(descriptions(stack.history()), vec!["add 3", "add 4", "add 5"]);

        stack.set_max_history_size(2);
        assert_eq!(descriptions(stack.history()), vec!["add 4", "add 5"]);
        assert_eq!(
            stack.current_command().map(|c| c.description),
            Some("add 5".to_string())
        );
    }

    #[test]
    fn test_transaction_is_one_entry() {
        let counter = Arc::new(Mutex::new(0));
        let mut stack = CommandStack::new();

        stack.begin_transaction("batch");
        stack.execute(add(&counter, 1));
        stack.execute(add(&counter, 2));
        assert!(stack.in_transaction());
        assert!(stack.commit_transaction());

        assert_eq!(descriptions(stack.history()), vec!["batch"]);
        assert!(stack.undo());
        assert_eq!(*counter.lock(), 0);
        assert!(stack.redo());
        assert_eq!(*counter.lock(), 3);
    }

    #[test]
    fn test_rollback_transaction() {
        let counter = Arc::new(Mutex::new(0));
        let mut stack = CommandStack::new();
        stack.execute(add(&counter, 100));

        stack.begin_transaction("draft");
        stack.execute(add(&counter, 1));
        stack.execute(add(&counter, 2));
        assert!(stack.rollback_transaction());

        assert_eq!(*counter.lock(), 100);
        assert_eq!(stack.history_size(), 1);
        assert!(!stack.commit_transaction());
    }

    #[test]
    fn test_events_published() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let recorder = |tag: &'static str| {
            let log = Arc::clone(&log);
            move |info: &CommandInfo| log.lock().push(format!("{tag}:{}", info.description))
        };
        bus.on::<CommandExecuted, _>(recorder("executed"));
        bus.on::<CommandUndone, _>(recorder("undone"));
        bus.on::<CommandRedone, _>(recorder("redone"));

        let counter = Arc::new(Mutex::new(0));
        let mut stack = CommandStack::new().with_event_bus(bus);
        stack.execute(add(&counter, 1));
        stack.undo();
        stack.redo();

        assert_eq!(*log.lock(), vec!["executed:add 1", "undone:add 1", "redone:add 1"]);
    }

    fn stuck_undo() -> Box<dyn Command> {
        Box::new(FnCommand::new(
            "stuck",
            || Ok(()),
            || Err(CommandError::Other("cannot undo".into())),
        ))
    }

    #[test]
    fn test_failed_transaction_undo_keeps_group_applied() {
        let counter = Arc::new(Mutex::new(0));
        let mut stack = CommandStack::new();

        stack.begin_transaction("group");
        stack.execute(stuck_undo());
        stack.execute(add(&counter, 5));
        stack.commit_transaction();

        // "add 5" is undone first, then "stuck" fails and it is reapplied
        assert!(!stack.undo());
        assert_eq!(*counter.lock(), 5);
        assert_eq!(stack.history_size(), 0);
        assert_eq!(stack.redo_size(), 0);
    }

    #[test]
    fn test_failed_restore_is_reported() {
        let counter = Arc::new(Mutex::new(0));
        let up = Arc::clone(&counter);
        let mut once = true;
        let flaky = Box::new(FnCommand::new(
            "flaky",
            move || {
                if once {
                    once = false;
                    *up.lock() += 1;
                    Ok(())
                } else {
                    Err(CommandError::Other("gone".into()))
                }
            },
            || Ok(()),
        ));

        let mut batch = TransactionCommand::batch("group", vec![stuck_undo(), flaky]).unwrap();
        assert!(batch.execute().is_ok());

        let err = batch.undo().unwrap_err();
        assert_eq!(
            err,
            CommandError::Other("Error: cannot undo; 1 step(s) could not be restored".into())
        );
    }

    #[test]
    fn test_batch_rolls_back_on_failure() {
        let counter = Arc::new(Mutex::new(0));
        let mut stack = CommandStack::new();

        assert!(!stack.execute_batch("mixed", vec![add(&counter, 1), add(&counter, 2), failing()]));
        assert_eq!(*counter.lock(), 0);
        assert_eq!(stack.history_size(), 0);

        assert!(!stack.execute_batch("empty", Vec::new()));
        assert!(stack.execute_batch("pair", vec![add(&counter, 1), add(&counter, 2)]));
        assert_eq!(descriptions(stack.history()), vec!["pair"]);
        assert_eq!(*counter.lock(), 3);
    }

    #[test]
    fn test_transaction_publishes_one_event() {
        let bus = EventBus::new();
        let executed = Arc::new(Mutex::new(Vec::new()));
        let e = Arc::clone(&executed);
        bus.on::<CommandExecuted, _>(move |info| e.lock().push(info.description.clone()));

        let counter = Arc::new(Mutex::new(0));
        let mut stack = CommandStack::new().with_event_bus(bus);
        stack.begin_transaction("batch");
        stack.execute(add(&counter, 1));
        stack.execute(add(&counter, 2));
        assert!(executed.lock().is_empty());

        stack.commit_transaction();
        assert_eq!(*executed.lock(), vec!["batch"]);
    }

    #[test]
    fn test_shared_stack_is_usable_from_its_own_events() {
        let bus = EventBus::new();
        let shared = Arc::new(SharedCommandStack::new(
            CommandStack::new().with_event_bus(bus.clone()),
        ));
        let counter = Arc::new(Mutex::new(0));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let (s, stack) = (Arc::clone(&seen), Arc::clone(&shared));
        bus.on::<CommandExecuted, _>(move |_| s.lock().push(stack.can_undo()));
        let (s, stack) = (Arc::clone(&seen), Arc::clone(&shared));
        bus.on::<CommandUndone, _>(move |_| s.lock().push(stack.can_redo()));

        assert!(shared.execute(add(&counter, 1)));
        assert!(shared.undo());
        assert_eq!(*seen.lock(), vec![true, true]);
    }

    #[test]
    fn test_shared_stack_accepts_commands_while_one_runs() {
        let shared = Arc::new(SharedCommandStack::default());
        let counter = Arc::new(Mutex::new(0));

        let (stack, c) = (Arc::clone(&shared), Arc::clone(&counter));
        let outer = Box::new(FnCommand::new(
            "outer",
            move || {
                assert!(stack.execute(add(&c, 10)));
                Ok(())
            },
            || Ok(()),
        ));

        assert!(shared.execute(outer));
        assert_eq!(*counter.lock(), 10);
        assert_eq!(descriptions(shared.history()), vec!["add 10", "outer"]);
    }
}
