//! Geometric commands.
//!
//! Executing records the transform each touched entity had in its [`TransformHistory`]; undoing
//! writes that transform back instead of applying the opposite delta.

use super::{require, require_mut, EditorCommand};
use crate::{
    events::{post, post_geometry_changed},
    linkage, MapTransform, MovingPlatform, RefreshMapBounds, TransformHistory,
};
use bevy::prelude::*;

/// Records the transform of `entity` in its history, then applies `edit` to it.
#[track_caller]
fn edit_transform(world: &mut World, entity: Entity, edit: impl FnOnce(&mut MapTransform)) {
    let mut transform = require_mut::<MapTransform>(world, entity);
    let prior = *transform;
    edit(&mut *transform);

    let mut target = world.entity_mut(entity);
    if !target.contains::<TransformHistory>() {
        target.insert(TransformHistory::default());
    }
    target.get_mut::<TransformHistory>().unwrap().push(prior);
}

/// Writes back the transform `entity` had before the last [`edit_transform`].
#[track_caller]
fn restore_transform(world: &mut World, entity: Entity) {
    let prior = world
        .get_mut::<TransformHistory>(entity)
        .and_then(|mut history| history.pop())
        .unwrap_or_else(|| panic!("{entity:?} has no earlier transform to restore"));
    *require_mut::<MapTransform>(world, entity) = prior;
}

/// The target marker of `entity`, if it is a moving platform.
fn moving_mock(world: &World, entity: Entity) -> Option<Entity> {
    world
        .get::<MovingPlatform>(entity)
        .map(|_| linkage::linked(world, entity, linkage::MOCK_PLATFORM))
}

/// Translates an object by a fixed offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveObject {
    entity: Entity,
    delta: Vec2,
}

impl MoveObject {
    pub fn new(entity: Entity, dx: f32, dy: f32) -> Self {
        Self {
            entity,
            delta: Vec2::new(dx, dy),
        }
    }

    pub const fn delta(&self) -> Vec2 {
        self.delta
    }
}

impl EditorCommand for MoveObject {
    fn execute(&self, world: &mut World) {
        let entity = linkage::resolve(world, self.entity);
        edit_transform(world, entity, |transform| transform.center += self.delta);
        post_geometry_changed(world);
    }

    fn unexecute(&self, world: &mut World) {
        let entity = linkage::resolve(world, self.entity);
        restore_transform(world, entity);
        post_geometry_changed(world);
    }

    fn affected_entity(&self) -> Entity {
        self.entity
    }
}

/// Turns an object by a fixed angle in degrees.
///
/// The target marker of a moving platform turns along with it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotateObject {
    entity: Entity,
    angle: f32,
}

impl RotateObject {
    pub fn new(entity: Entity, angle: f32) -> Self {
        Self { entity, angle }
    }

    pub const fn angle(&self) -> f32 {
        self.angle
    }
}

impl EditorCommand for RotateObject {
    fn execute(&self, world: &mut World) {
        let entity = linkage::resolve(world, self.entity);
        edit_transform(world, entity, |transform| transform.rotation += self.angle);
        if let Some(mock) = moving_mock(world, entity) {
            edit_transform(world, mock, |transform| transform.rotation += self.angle);
        }
        post(world, RefreshMapBounds);
    }

    fn unexecute(&self, world: &mut World) {
        let entity = linkage::resolve(world, self.entity);
        restore_transform(world, entity);
        if let Some(mock) = moving_mock(world, entity) {
            restore_transform(world, mock);
        }
        post(world, RefreshMapBounds);
    }

    fn affected_entity(&self) -> Entity {
        self.entity
    }
}

/// Grows or shrinks an object and shifts its center in one step.
///
/// Dragging one edge changes both size and center; keeping both in one command makes the whole
/// drag a single undo step.
///
/// The target marker of a moving platform is a copy of the platform's shape, not of its
/// placement: it takes the same size change but keeps its center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResizeObject {
    entity: Entity,
    size: Vec2,
    offset: Vec2,
}

impl ResizeObject {
    pub fn new(entity: Entity, d_width: f32, d_height: f32) -> Self {
        Self {
            entity,
            size: Vec2::new(d_width, d_height),
            offset: Vec2::ZERO,
        }
    }

    /// Also moves the center by `(dx, dy)`.
    pub fn recentered(mut self, dx: f32, dy: f32) -> Self {
        self.offset = Vec2::new(dx, dy);
        self
    }

    pub const fn size_delta(&self) -> Vec2 {
        self.size
    }

    pub const fn center_delta(&self) -> Vec2 {
        self.offset
    }
}

#[track_caller]
fn reshape(world: &mut World, entity: Entity, size: Vec2, offset: Vec2) {
    edit_transform(world, entity, |transform| {
        transform.size += size;
        transform.center += offset;
    });
    let size = require::<MapTransform>(world, entity).size;
    debug_assert!(
        size.cmpgt(Vec2::ZERO).all(),
        "{entity:?} resized to {size:?}"
    );
}

impl EditorCommand for ResizeObject {
    fn execute(&self, world: &mut World) {
        let entity = linkage::resolve(world, self.entity);
        reshape(world, entity, self.size, self.offset);
        if let Some(mock) = moving_mock(world, entity) {
            reshape(world, mock, self.size, Vec2::ZERO);
        }
        post_geometry_changed(world);
    }

    fn unexecute(&self, world: &mut World) {
        let entity = linkage::resolve(world, self.entity);
        restore_transform(world, entity);
        if let Some(mock) = moving_mock(world, entity) {
            restore_transform(world, mock);
        }
        post_geometry_changed(world);
    }

    fn affected_entity(&self) -> Entity {
        self.entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RefreshMapBounds, UpdateRoundedPlatforms};

    fn world_with(transform: MapTransform) -> (World, Entity) {
        let mut world = World::new();
        world.init_resource::<Events<UpdateRoundedPlatforms>>();
        world.init_resource::<Events<RefreshMapBounds>>();
        let entity = world.spawn(transform).id();
        (world, entity)
    }

    #[test]
    fn resize_with_recenter_round_trips() {
        let start = MapTransform::new(Vec2::new(2., 2.), Vec2::new(1., 1.));
        let (mut world, entity) = world_with(start);

        let resize = ResizeObject::new(entity, 0.5, 0.).recentered(0.25, 0.);
        resize.execute(&mut world);
        let resized = world.get::<MapTransform>(entity).unwrap();
        assert_eq!(resized.size, Vec2::new(1.5, 1.));
        assert_eq!(resized.center, Vec2::new(2.25, 2.));

        resize.unexecute(&mut world);
        assert_eq!(*world.get::<MapTransform>(entity).unwrap(), start);
    }

    #[test]
    fn move_and_rotate_are_inverse() {
        let start = MapTransform::new(Vec2::new(-1., 4.), Vec2::new(3., 1.)).with_rotation(30.);
        let (mut world, entity) = world_with(start);

        let commands: [Box<dyn EditorCommand>; 2] = [
            Box::new(MoveObject::new(entity, 1.5, -0.75)),
            Box::new(RotateObject::new(entity, 45.)),
        ];
        for command in &commands {
            command.execute(&mut world);
            assert_ne!(*world.get::<MapTransform>(entity).unwrap(), start);
            command.unexecute(&mut world);
            assert_eq!(*world.get::<MapTransform>(entity).unwrap(), start);
        }
        assert_eq!(world.resource::<Events<RefreshMapBounds>>().len(), 4);
    }

    #[test]
    fn undo_restores_inexact_values_exactly() {
        let start = MapTransform::new(Vec2::new(0.1, 0.7), Vec2::new(0.3, 1.1)).with_rotation(12.7);
        let (mut world, entity) = world_with(start);

        let commands: [Box<dyn EditorCommand>; 3] = [
            Box::new(MoveObject::new(entity, 1000.3, 0.1)),
            Box::new(RotateObject::new(entity, 33.3)),
            Box::new(ResizeObject::new(entity, 0.7, 0.01).recentered(0.35, 0.005)),
        ];
        for command in &commands {
            command.execute(&mut world);
        }
        for command in commands.iter().rev() {
            command.unexecute(&mut world);
        }
        assert_eq!(*world.get::<MapTransform>(entity).unwrap(), start);
        assert!(world.get::<TransformHistory>(entity).unwrap().is_empty());
    }

    #[test]
    fn redo_after_undo_lands_on_same_transform() {
        let start = MapTransform::new(Vec2::new(0.1, 0.7), Vec2::ONE);
        let (mut world, entity) = world_with(start);

        let nudge = MoveObject::new(entity, 1000.3, 0.1);
        nudge.execute(&mut world);
        let moved = *world.get::<MapTransform>(entity).unwrap();
        nudge.unexecute(&mut world);
        nudge.execute(&mut world);
        assert_eq!(*world.get::<MapTransform>(entity).unwrap(), moved);
    }

    #[test]
    #[should_panic(expected = "no earlier transform")]
    fn undo_without_execute_is_fatal() {
        let (mut world, entity) = world_with(MapTransform::default());
        RotateObject::new(entity, 10.).unexecute(&mut world);
    }

    #[test]
    #[should_panic(expected = "MapTransform")]
    fn move_without_transform_is_fatal() {
        let mut world = World::new();
        let entity = world.spawn_empty().id();
        MoveObject::new(entity, 1., 0.).execute(&mut world);
    }
}
