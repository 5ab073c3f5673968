use super::{require, require_mut, EditorCommand, Inverse};
use crate::{
    events::post_geometry_changed,
    linkage,
    physics::{bind_body, unbind_body},
    Appearance, EditorObjectState, MapCounters, MovingPlatform, ObjectKind, PhysicsBinding,
};
use bevy::prelude::*;

/// Brings a soft-deleted map object to life.
///
/// Clears the deleted flag, shows the object, rebuilds its physics body, shows the target marker
/// and guide line of a moving platform and counts collectible points. Unexecuting reverses each
/// step and leaves every other piece of data in place, so the object can be restored exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddObject {
    entity: Entity,
}

impl AddObject {
    pub fn new(entity: Entity) -> Self {
        Self { entity }
    }

    fn set_alive(&self, world: &mut World, alive: bool) {
        let entity = self.entity;
        let kind = *require::<ObjectKind>(world, entity);

        require_mut::<EditorObjectState>(world, entity).deleted = !alive;
        *require_mut::<Appearance>(world, entity) = appearance(alive);

        if world.get::<PhysicsBinding>(entity).is_some() {
            if alive {
                bind_body(world, entity);
            } else {
                unbind_body(world, entity);
            }
        }

        if world.get::<MovingPlatform>(entity).is_some() {
            let mock = linkage::linked(world, entity, linkage::MOCK_PLATFORM);
            let line = linkage::linked(world, entity, linkage::DASHED_LINE);
            require_mut::<EditorObjectState>(world, mock).deleted = !alive;
            *require_mut::<Appearance>(world, mock) = appearance(alive);
            *require_mut::<Appearance>(world, line) = appearance(alive);
        }

        if kind.counts_as_point() {
            let mut counters = world
                .get_resource_mut::<MapCounters>()
                .expect("No MapCounters resource found. Did you add the LevelEditorPlugin?");
            if alive {
                counters.points += 1;
            } else {
                counters.points = counters
                    .points
                    .checked_sub(1)
                    .expect("Removed a point from a map counting none");
            }
        }

        post_geometry_changed(world);
    }
}

fn appearance(alive: bool) -> Appearance {
    if alive {
        Appearance::shown()
    } else {
        Appearance::hidden()
    }
}

impl EditorCommand for AddObject {
    fn execute(&self, world: &mut World) {
        self.set_alive(world, true);
        trace!("Added {:?}", self.entity);
    }

    fn unexecute(&self, world: &mut World) {
        self.set_alive(world, false);
        trace!("Removed {:?}", self.entity);
    }

    fn affected_entity(&self) -> Entity {
        self.entity
    }
}

/// Soft-deletes a map object: the exact inverse of [`AddObject`].
pub type DeleteObject = Inverse<AddObject>;

impl DeleteObject {
    pub fn new(entity: Entity) -> Self {
        Inverse::of(AddObject::new(entity))
    }
}
