//! Undo/redo history of an editor session.
//!
//! Input handlers never replay commands themselves: they only [request](CommandLedger::request_undo)
//! undo and redo steps. [`drain_command_ledgers`] turns the pending steps into replays at one
//! fixed point of the tick, so several key presses captured in the same tick always replay in
//! the same order.

use crate::{events::post, EditorCommand, EditorConfig, UpdateRoundedPlatforms};
use bevy::{ecs::system::Command, prelude::*};
use std::collections::VecDeque;

/// Marks the entity owning an editor session and its [`CommandLedger`].
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct EditorSession;

/// Executed commands of one editor session, with the undo and redo steps waiting to be drained.
///
/// History is a single line: recording a new command forgets everything that could be redone.
#[derive(Component, Default)]
pub struct CommandLedger {
    /// Oldest at the front, most recent at the back.
    commands_to_undo: VecDeque<Box<dyn EditorCommand>>,
    /// Most recently undone at the back.
    commands_to_redo: Vec<Box<dyn EditorCommand>>,
    pending_undo_steps: usize,
    pending_redo_steps: usize,
    /// Maximum amount of commands kept for undo. `None` keeps all of them.
    depth: Option<usize>,
}

impl CommandLedger {
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a ledger forgetting its oldest command once more than `depth` are kept.
    pub fn with_depth(depth: usize) -> Self {
        Self {
            depth: Some(depth),
            ..Default::default()
        }
    }

    pub const fn depth(&self) -> Option<usize> {
        self.depth
    }

    pub fn can_undo(&self) -> bool {
        self.commands_to_undo.len() > self.pending_undo_steps
    }

    pub fn can_redo(&self) -> bool {
        self.commands_to_redo.len() > self.pending_redo_steps
    }

    /// Asks for one more command to be undone on the next drain. Does nothing if every command is
    /// already waiting to be undone.
    pub fn request_undo(&mut self) -> &mut Self {
        if self.can_undo() {
            self.pending_undo_steps += 1;
        }
        self
    }

    /// Asks for one more command to be redone on the next drain. Does nothing if every undone
    /// command is already waiting to be redone.
    pub fn request_redo(&mut self) -> &mut Self {
        if self.can_redo() {
            self.pending_redo_steps += 1;
        }
        self
    }

    /// Records a command the caller has just executed. Forgets everything that could be redone.
    pub fn add_executed_command(&mut self, command: impl EditorCommand) -> &mut Self {
        self.add_executed_boxed(Box::new(command))
    }

    pub fn add_executed_boxed(&mut self, command: Box<dyn EditorCommand>) -> &mut Self {
        self.commands_to_redo.clear();
        self.pending_redo_steps = 0;
        self.commands_to_undo.push_back(command);

        if let Some(depth) = self.depth {
            while self.commands_to_undo.len() > depth.max(self.pending_undo_steps) {
                self.commands_to_undo.pop_front();
            }
        }

        self
    }

    pub const fn pending_undo_steps(&self) -> usize {
        self.pending_undo_steps
    }

    pub const fn pending_redo_steps(&self) -> usize {
        self.pending_redo_steps
    }

    pub fn has_pending_steps(&self) -> bool {
        self.pending_undo_steps > 0 || self.pending_redo_steps > 0
    }

    pub fn undo_len(&self) -> usize {
        self.commands_to_undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.commands_to_redo.len()
    }

    /// Label of the command the next undo step replays, ignoring steps already pending.
    pub fn next_undo_label(&self) -> Option<String> {
        let index = self
            .commands_to_undo
            .len()
            .checked_sub(self.pending_undo_steps + 1)?;
        self.commands_to_undo.get(index).map(|c| c.label())
    }

    /// Label of the command the next redo step replays, ignoring steps already pending.
    pub fn next_redo_label(&self) -> Option<String> {
        let index = self
            .commands_to_redo
            .len()
            .checked_sub(self.pending_redo_steps + 1)?;
        self.commands_to_redo.get(index).map(|c| c.label())
    }

    /// Forgets the whole history, including pending steps.
    pub fn clear(&mut self) {
        self.commands_to_undo.clear();
        self.commands_to_redo.clear();
        self.pending_undo_steps = 0;
        self.pending_redo_steps = 0;
    }

    /// Replays every pending step against `world`: undo steps first, then redo steps. Returns the
    /// amount of commands replayed.
    pub fn drain(&mut self, world: &mut World) -> usize {
        let replayed = self.pending_undo_steps + self.pending_redo_steps;

        while self.pending_undo_steps > 0 {
            let command = self
                .commands_to_undo
                .pop_back()
                .expect("Pending undo steps must never exceed the undo stack");
            trace!("Undo {} on {:?}", command.label(), command.affected_entity());
            command.unexecute(world);
            self.commands_to_redo.push(command);
            self.pending_undo_steps -= 1;
            post(world, UpdateRoundedPlatforms);
        }

        while self.pending_redo_steps > 0 {
            let command = self
                .commands_to_redo
                .pop()
                .expect("Pending redo steps must never exceed the redo stack");
            trace!("Redo {} on {:?}", command.label(), command.affected_entity());
            command.execute(world);
            self.commands_to_undo.push_back(command);
            self.pending_redo_steps -= 1;
            post(world, UpdateRoundedPlatforms);
        }

        replayed
    }
}

/// Everything an editor session entity needs.
#[derive(Bundle, Default)]
pub struct EditorSessionBundle {
    pub session: EditorSession,
    pub ledger: CommandLedger,
}

impl EditorSessionBundle {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            session: EditorSession,
            ledger: config
                .history_depth
                .map_or_else(CommandLedger::new, CommandLedger::with_depth),
        }
    }
}

/// Replays the pending undo and redo steps of every session.
pub fn drain_command_ledgers(
    world: &mut World,
    sessions: &mut QueryState<(Entity, &CommandLedger), With<EditorSession>>,
) {
    let pending = sessions
        .iter(world)
        .filter(|(_, ledger)| ledger.has_pending_steps())
        .map(|(session, _)| session)
        .collect::<Vec<_>>();

    for session in pending {
        // The ledger leaves the world while its commands mutate it.
        let Some(mut ledger) = world.entity_mut(session).take::<CommandLedger>() else {
            continue;
        };
        let replayed = ledger.drain(world);
        world.entity_mut(session).insert(ledger);
        debug!("Replayed {replayed} command(s) for session {session:?}");
    }
}

/// A [`Command`] which executes an editor command and records it in a session's ledger.
pub struct ExecuteEditorCommand<C> {
    pub session: Entity,
    pub command: C,
}

impl<C: EditorCommand> Command for ExecuteEditorCommand<C> {
    fn apply(self, world: &mut World) {
        world.execute_editor_command(self.session, self.command);
    }
}

mod private {
    /// Private seal to ensure the editor extension traits cannot be implemented by crate consumers.
    pub trait EditorExtensionSeal {}
}

impl private::EditorExtensionSeal for World {}
impl<'w, 's> private::EditorExtensionSeal for Commands<'w, 's> {}

/// Extension trait for [`World`] running editor commands immediately.
pub trait EditorWorldExt: private::EditorExtensionSeal {
    /// Executes `command` and records it in the ledger of `session`.
    fn execute_editor_command<C: EditorCommand>(&mut self, session: Entity, command: C);
}

impl EditorWorldExt for World {
    fn execute_editor_command<C: EditorCommand>(&mut self, session: Entity, command: C) {
        assert!(
            self.get::<CommandLedger>(session).is_some(),
            "{session:?} is not an editor session"
        );
        trace!(
            "Execute {} on {:?}",
            command.label(),
            command.affected_entity()
        );
        command.execute(self);
        self.get_mut::<CommandLedger>(session)
            .unwrap()
            .add_executed_command(command);
    }
}

/// Extension trait for [`Commands`] deferring editor commands to the next command flush.
pub trait EditorCommandsExt: private::EditorExtensionSeal {
    /// Queues `command` to be executed and recorded in the ledger of `session`.
    fn execute_editor_command<C: EditorCommand>(&mut self, session: Entity, command: C);
}

impl<'w, 's> EditorCommandsExt for Commands<'w, 's> {
    fn execute_editor_command<C: EditorCommand>(&mut self, session: Entity, command: C) {
        self.add(ExecuteEditorCommand { session, command });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Resource, Default)]
    struct Journal(Vec<String>);

    struct Note(Entity, &'static str);

    impl EditorCommand for Note {
        fn execute(&self, world: &mut World) {
            world.resource_mut::<Journal>().0.push(format!("do {}", self.1));
        }

        fn unexecute(&self, world: &mut World) {
            world.resource_mut::<Journal>().0.push(format!("undo {}", self.1));
        }

        fn affected_entity(&self) -> Entity {
            self.0
        }
    }

    fn world() -> (World, Entity) {
        let mut world = World::new();
        world.init_resource::<Journal>();
        world.init_resource::<Events<UpdateRoundedPlatforms>>();
        let entity = world.spawn_empty().id();
        (world, entity)
    }

    #[test]
    fn empty_ledger_gates_requests() {
        let mut ledger = CommandLedger::new();
        ledger.request_undo().request_redo();
        assert!(!ledger.can_undo());
        assert!(!ledger.can_redo());
        assert_eq!(ledger.pending_undo_steps(), 0);
        assert_eq!(ledger.pending_redo_steps(), 0);
    }

    #[test]
    fn requests_never_exceed_stack() {
        let (_, entity) = world();
        let mut ledger = CommandLedger::new();
        ledger.add_executed_command(Note(entity, "a"));
        ledger.request_undo().request_undo().request_undo();
        assert_eq!(ledger.pending_undo_steps(), 1);
        assert!(!ledger.can_undo());
    }

    #[test]
    fn drain_undoes_in_lifo_order() {
        let (mut world, entity) = world();
        let mut ledger = CommandLedger::new();
        ledger
            .add_executed_command(Note(entity, "a"))
            .add_executed_command(Note(entity, "b"))
            .add_executed_command(Note(entity, "c"));

        ledger.request_undo().request_undo();
        assert_eq!(ledger.drain(&mut world), 2);
        assert_eq!(world.resource::<Journal>().0, ["undo c", "undo b"]);
        assert_eq!(ledger.undo_len(), 1);
        assert_eq!(ledger.redo_len(), 2);
        assert_eq!(world.resource::<Events<UpdateRoundedPlatforms>>().len(), 2);

        ledger.request_redo();
        ledger.drain(&mut world);
        assert_eq!(world.resource::<Journal>().0.last().unwrap(), "do b");
    }

    #[test]
    fn new_command_clears_redo_branch() {
        let (mut world, entity) = world();
        let mut ledger = CommandLedger::new();
        ledger.add_executed_command(Note(entity, "a"));
        ledger.request_undo();
        ledger.drain(&mut world);
        ledger.request_redo();
        assert_eq!(ledger.redo_len(), 1);

        ledger.add_executed_command(Note(entity, "b"));
        assert_eq!(ledger.redo_len(), 0);
        assert_eq!(ledger.pending_redo_steps(), 0);
        assert!(!ledger.can_redo());
        assert_eq!(ledger.drain(&mut world), 0);
    }

    #[test]
    fn depth_forgets_oldest_commands() {
        let (mut world, entity) = world();
        let mut ledger = CommandLedger::with_depth(2);
        for name in ["a", "b", "c"] {
            ledger.add_executed_command(Note(entity, name));
        }
        assert_eq!(ledger.undo_len(), 2);

        ledger.request_undo().request_undo().request_undo();
        ledger.drain(&mut world);
        assert_eq!(world.resource::<Journal>().0, ["undo c", "undo b"]);
    }

    #[test]
    fn labels_skip_pending_steps() {
        let (_, entity) = world();
        let mut ledger = CommandLedger::new();
        assert_eq!(ledger.next_undo_label(), None);
        ledger.add_executed_command(Note(entity, "a"));
        assert_eq!(ledger.next_undo_label().as_deref(), Some("Note"));
        ledger.request_undo();
        assert_eq!(ledger.next_undo_label(), None);
    }
}
