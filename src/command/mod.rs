//! Reversible editor commands.
//!
//! A command is created and executed once when the user acts, then handed to a
//! [`CommandLedger`](crate::CommandLedger) which replays it on undo and redo. Commands are never
//! mutated after construction; anything that must outlive one execution is stored on the
//! affected entity instead.
//!
//! Commands assume the calling UI only builds them against entities able to take them. A command
//! applied to an entity missing a required component panics.

use bevy::{ecs::world::Mut, prelude::*};

mod lifecycle;
mod traits;
mod transform;

pub use lifecycle::*;
pub use traits::*;
pub use transform::*;

/// An atomic, reversible change to the editor world.
///
/// `unexecute` must exactly undo `execute`, so that undoing and redoing any number of times lands
/// on the same world.
pub trait EditorCommand: Send + Sync + 'static {
    fn execute(&self, world: &mut World);

    fn unexecute(&self, world: &mut World);

    /// The map object this command acts on.
    fn affected_entity(&self) -> Entity;

    /// Human-readable name, for undo/redo menus and logs.
    fn label(&self) -> String {
        bevy::utils::get_short_name(std::any::type_name::<Self>())
    }
}

/// Runs a command backwards: `execute` unexecutes the inner command and the other way round.
///
/// Used for every command pair where one half is the inverse of the other (delete of add,
/// non-moving of moving...), so that the two halves cannot drift apart.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Inverse<C>(C);

impl<C: EditorCommand> Inverse<C> {
    pub fn of(command: C) -> Self {
        Self(command)
    }

    pub fn inner(&self) -> &C {
        let Self(command) = self;
        command
    }
}

impl<C: EditorCommand> EditorCommand for Inverse<C> {
    fn execute(&self, world: &mut World) {
        self.inner().unexecute(world);
    }

    fn unexecute(&self, world: &mut World) {
        self.inner().execute(world);
    }

    fn affected_entity(&self) -> Entity {
        self.inner().affected_entity()
    }
}

#[track_caller]
pub(crate) fn require<T: Component>(world: &World, entity: Entity) -> &T {
    world.get::<T>(entity).unwrap_or_else(|| {
        panic!(
            "{entity:?} has no {} component",
            bevy::utils::get_short_name(std::any::type_name::<T>())
        )
    })
}

#[track_caller]
pub(crate) fn require_mut<T: Component>(world: &mut World, entity: Entity) -> Mut<'_, T> {
    world.get_mut::<T>(entity).unwrap_or_else(|| {
        panic!(
            "{entity:?} has no {} component",
            bevy::utils::get_short_name(std::any::type_name::<T>())
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Resource, Default)]
    struct Tally(i32);

    struct Increment(Entity);

    impl EditorCommand for Increment {
        fn execute(&self, world: &mut World) {
            world.resource_mut::<Tally>().0 += 1;
        }

        fn unexecute(&self, world: &mut World) {
            world.resource_mut::<Tally>().0 -= 1;
        }

        fn affected_entity(&self) -> Entity {
            self.0
        }
    }

    #[test]
    fn inverse_swaps_directions() {
        let mut world = World::new();
        world.init_resource::<Tally>();
        let entity = world.spawn_empty().id();

        let decrement = Inverse::of(Increment(entity));
        decrement.execute(&mut world);
        assert_eq!(world.resource::<Tally>().0, -1);
        decrement.unexecute(&mut world);
        assert_eq!(world.resource::<Tally>().0, 0);
        assert_eq!(decrement.affected_entity(), entity);
    }

    #[test]
    fn label_uses_short_type_name() {
        let mut world = World::new();
        let entity = world.spawn_empty().id();
        assert_eq!(Increment(entity).label(), "Increment");
        assert_eq!(Inverse::of(Increment(entity)).label(), "Inverse<Increment>");
    }
}
