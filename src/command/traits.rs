//! Commands toggling the behavioral traits of a platform.

use super::{require, require_mut, EditorCommand, Inverse};
use crate::{
    events::{post, post_geometry_changed},
    linkage::{self, Linkage, RespawnedParts},
    physics::rebind_with,
    Appearance, BodyType, CollisionFilter, DestroyablePlatform, EditorConfig, EditorObjectState,
    GuideLine, MapTransform, MockPlatform, MovingPlatform, ParkedTarget, ParkedTargets,
    PhysicsBinding, Platform, RotatingPlatform, TransformHistory, UpdateRoundedPlatforms,
};
use bevy::prelude::*;

#[track_caller]
fn take_trait<T: Component>(world: &mut World, entity: Entity) -> T {
    world.entity_mut(entity).take::<T>().unwrap_or_else(|| {
        panic!(
            "{entity:?} has no {} trait to remove",
            bevy::utils::get_short_name(std::any::type_name::<T>())
        )
    })
}

#[track_caller]
fn assert_lacks<T: Component>(world: &World, entity: Entity) {
    assert!(
        world.get::<T>(entity).is_none(),
        "{entity:?} already has the {} trait",
        bevy::utils::get_short_name(std::any::type_name::<T>())
    );
}

/// Swaps a plain [`Platform`] for a [`DestroyablePlatform`], rebuilding its body with the
/// destroyable collision filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MakeObjectDestroyable {
    entity: Entity,
}

impl MakeObjectDestroyable {
    pub fn new(entity: Entity) -> Self {
        Self { entity }
    }
}

impl EditorCommand for MakeObjectDestroyable {
    fn execute(&self, world: &mut World) {
        take_trait::<Platform>(world, self.entity);
        world.entity_mut(self.entity).insert(DestroyablePlatform);
        if world.get::<PhysicsBinding>(self.entity).is_some() {
            rebind_with(world, self.entity, |binding| {
                binding.filter = CollisionFilter::DESTROYABLE_PLATFORM
            });
        }
        post(world, UpdateRoundedPlatforms);
    }

    fn unexecute(&self, world: &mut World) {
        take_trait::<DestroyablePlatform>(world, self.entity);
        world.entity_mut(self.entity).insert(Platform);
        if world.get::<PhysicsBinding>(self.entity).is_some() {
            rebind_with(world, self.entity, |binding| {
                binding.filter = CollisionFilter::PLATFORM
            });
        }
        post(world, UpdateRoundedPlatforms);
    }

    fn affected_entity(&self) -> Entity {
        self.entity
    }
}

pub type MakeObjectNonDestroyable = Inverse<MakeObjectDestroyable>;

impl MakeObjectNonDestroyable {
    pub fn new(entity: Entity) -> Self {
        Inverse::of(MakeObjectDestroyable::new(entity))
    }
}

/// Turns an object into a moving platform.
///
/// Spawns the target marker and the guide line between the two, and links all three by role. The
/// object's body becomes kinematic.
///
/// Unexecuting parks the speed, the marker's transform and its undo history in the object's
/// [`ParkedTargets`] before despawning the marker and the line. Executing resumes from the last
/// parked target when there is one: the marker comes back where it was, at the platform's size,
/// and the despawned entities are mapped to their replacements in [`RespawnedParts`] so that
/// commands recorded against them still apply. Otherwise the marker goes at
/// [`EditorConfig::mock_offset`] from the object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MakeObjectMoving {
    entity: Entity,
    speed: Option<f32>,
}

impl MakeObjectMoving {
    /// Moves at the speed the object last had, or [`EditorConfig::default_speed`].
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            speed: None,
        }
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }
}

impl EditorCommand for MakeObjectMoving {
    fn execute(&self, world: &mut World) {
        let entity = self.entity;
        assert_lacks::<MovingPlatform>(world, entity);

        let config = *world
            .get_resource::<EditorConfig>()
            .expect("No EditorConfig resource found. Did you add the LevelEditorPlugin?");
        let transform = *require::<MapTransform>(world, entity);
        let alive = require::<EditorObjectState>(world, entity).is_live();
        let appearance = if alive {
            Appearance::shown()
        } else {
            Appearance::hidden()
        };
        let resting_body = world
            .get::<PhysicsBinding>(entity)
            .map_or(BodyType::Static, |binding| binding.body_type);
        let parked = world
            .get_mut::<ParkedTargets>(entity)
            .and_then(|mut parked| parked.pop());

        let speed = self
            .speed
            .or(parked.as_ref().map(|target| target.speed))
            .unwrap_or(config.default_speed);
        let marker = match &parked {
            Some(target) => MapTransform {
                size: transform.size,
                ..target.marker
            },
            None => MapTransform {
                center: transform.center + config.mock_offset,
                ..transform
            },
        };

        let mock = world
            .spawn((
                MockPlatform,
                marker,
                EditorObjectState {
                    deleted: !alive,
                    ..default()
                },
                appearance,
            ))
            .id();
        let line = world
            .spawn((
                GuideLine,
                appearance,
                Linkage::new([(linkage::PLATFORM, entity), (linkage::MOCK_PLATFORM, mock)]),
            ))
            .id();
        world.entity_mut(mock).insert(Linkage::new([
            (linkage::PLATFORM, entity),
            (linkage::DASHED_LINE, line),
        ]));

        let resumed_speed = parked.map(|target| {
            world.entity_mut(mock).insert(target.history);
            let mut respawned = world.get_resource_or_insert_with(RespawnedParts::default);
            respawned.insert(target.mock, mock);
            respawned.insert(target.line, line);
            target.speed
        });

        let mut origin = world.entity_mut(entity);
        if !origin.contains::<Linkage>() {
            origin.insert(Linkage::default());
        }
        let mut links = origin.get_mut::<Linkage>().unwrap();
        links.insert(linkage::MOCK_PLATFORM, mock);
        links.insert(linkage::DASHED_LINE, line);
        origin.insert(MovingPlatform {
            speed,
            resting_body,
            resumed_speed,
        });

        if world.get::<PhysicsBinding>(entity).is_some() {
            rebind_with(world, entity, |binding| binding.body_type = BodyType::Kinematic);
        }
        post_geometry_changed(world);
        trace!("{entity:?} moving at {speed} with marker {mock:?} and line {line:?}");
    }

    fn unexecute(&self, world: &mut World) {
        let entity = self.entity;
        // Read everything that lives on the parts before any of them goes away.
        let moving = *require::<MovingPlatform>(world, entity);
        let mock = linkage::linked(world, entity, linkage::MOCK_PLATFORM);
        let line = linkage::linked(world, entity, linkage::DASHED_LINE);
        let marker = *require::<MapTransform>(world, mock);
        let history = world
            .entity_mut(mock)
            .take::<TransformHistory>()
            .unwrap_or_default();
        // Undoing an explicit speed hands back the speed it replaced.
        let speed = match self.speed {
            Some(_) => moving.resumed_speed.unwrap_or(moving.speed),
            None => moving.speed,
        };

        let mut origin = world.entity_mut(entity);
        if !origin.contains::<ParkedTargets>() {
            origin.insert(ParkedTargets::default());
        }
        origin.get_mut::<ParkedTargets>().unwrap().push(ParkedTarget {
            speed,
            marker,
            history,
            mock,
            line,
        });

        assert!(world.despawn(mock), "target marker {mock:?} was already gone");
        assert!(world.despawn(line), "guide line {line:?} was already gone");

        let mut links = require_mut::<Linkage>(world, entity);
        links.remove(linkage::MOCK_PLATFORM);
        links.remove(linkage::DASHED_LINE);
        let unlinked = links.is_empty();
        let mut origin = world.entity_mut(entity);
        if unlinked {
            origin.remove::<Linkage>();
        }
        origin.remove::<MovingPlatform>();

        if world.get::<PhysicsBinding>(entity).is_some() {
            rebind_with(world, entity, |binding| {
                binding.body_type = moving.resting_body
            });
        }
        post_geometry_changed(world);
        trace!("{entity:?} stopped, parking speed {speed} and marker at {:?}", marker.center);
    }

    fn affected_entity(&self) -> Entity {
        self.entity
    }
}

pub type MakeObjectNonMoving = Inverse<MakeObjectMoving>;

impl MakeObjectNonMoving {
    pub fn new(entity: Entity) -> Self {
        Inverse::of(MakeObjectMoving::new(entity))
    }
}

/// Makes a platform spin, which also shows the rotation indicator on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MakeObjectRotating {
    entity: Entity,
}

impl MakeObjectRotating {
    pub fn new(entity: Entity) -> Self {
        Self { entity }
    }
}

impl EditorCommand for MakeObjectRotating {
    fn execute(&self, world: &mut World) {
        assert_lacks::<RotatingPlatform>(world, self.entity);
        world.entity_mut(self.entity).insert(RotatingPlatform);
    }

    fn unexecute(&self, world: &mut World) {
        take_trait::<RotatingPlatform>(world, self.entity);
    }

    fn affected_entity(&self) -> Entity {
        self.entity
    }
}

pub type MakeObjectNonRotating = Inverse<MakeObjectRotating>;

impl MakeObjectNonRotating {
    pub fn new(entity: Entity) -> Self {
        Inverse::of(MakeObjectRotating::new(entity))
    }
}
