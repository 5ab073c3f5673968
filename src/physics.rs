//! Physics binding of map objects.
//!
//! The editor never steps the simulation; it only creates and destroys bodies. The backend doing
//! the actual work is injected as the [`PhysicsWorld`] resource, so hosts plug in their engine and
//! tests plug in [`HeadlessPhysics`].

use crate::{MapTransform, ObjectKind};
use bevy::{prelude::*, utils::HashMap};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Opaque handle of a body living in the physics backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u64);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BodyType {
    #[default]
    Static,
    Kinematic,
    Dynamic,
}

/// Collision category and mask bits.
///
/// The bit assignments follow the object factories: every kind collides with the player, the
/// player collides with everything.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CollisionFilter {
    pub category: u16,
    pub mask: u16,
}

impl CollisionFilter {
    pub const PLAYER_BIT: u16 = 0x0001;
    pub const PLATFORM_BIT: u16 = 0x0002;
    pub const DESTROYABLE_PLATFORM_BIT: u16 = 0x0004;
    pub const FINISH_BIT: u16 = 0x0008;
    pub const POINT_BIT: u16 = 0x0010;

    pub const PLAYER: Self = Self {
        category: Self::PLAYER_BIT,
        mask: Self::PLATFORM_BIT
            | Self::DESTROYABLE_PLATFORM_BIT
            | Self::FINISH_BIT
            | Self::POINT_BIT,
    };
    pub const PLATFORM: Self = Self::touching_player(Self::PLATFORM_BIT);
    pub const DESTROYABLE_PLATFORM: Self = Self::touching_player(Self::DESTROYABLE_PLATFORM_BIT);
    pub const FINISH: Self = Self::touching_player(Self::FINISH_BIT);
    pub const POINT: Self = Self::touching_player(Self::POINT_BIT);

    const fn touching_player(category: u16) -> Self {
        Self {
            category,
            mask: Self::PLAYER_BIT,
        }
    }

    pub const fn for_kind(kind: ObjectKind) -> Self {
        match kind {
            ObjectKind::Player => Self::PLAYER,
            ObjectKind::Platform => Self::PLATFORM,
            ObjectKind::Finish => Self::FINISH,
            ObjectKind::Point => Self::POINT,
        }
    }
}

/// How the body of an object gets built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindProfile {
    /// Dynamic body that never rotates, whatever the stored body type says.
    Player,
    /// Body built straight from the stored [`PhysicsBinding`].
    Generic,
}

impl BindProfile {
    pub const fn for_kind(kind: ObjectKind) -> Self {
        match kind {
            ObjectKind::Player => BindProfile::Player,
            ObjectKind::Platform | ObjectKind::Finish | ObjectKind::Point => BindProfile::Generic,
        }
    }
}

/// Everything a backend needs to create a body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyDef {
    pub body_type: BodyType,
    pub position: Vec2,
    pub size: Vec2,
    /// Radians.
    pub angle: f32,
    pub filter: CollisionFilter,
    pub density: f32,
    pub friction: f32,
    pub sensor: bool,
    pub fixed_rotation: bool,
}

/// Physics data of a map object.
///
/// Survives soft deletion: only `body` is torn down, so that the object can be rebound
/// exactly as it was.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct PhysicsBinding {
    pub body: Option<BodyHandle>,
    pub body_type: BodyType,
    pub filter: CollisionFilter,
    pub density: f32,
    pub friction: f32,
    pub sensor: bool,
    /// Transform captured when the body was last created, used to reset a level on restart.
    pub initial: MapTransform,
}

impl PhysicsBinding {
    pub fn for_kind(kind: ObjectKind, transform: MapTransform) -> Self {
        let (body_type, density, friction, sensor) = match kind {
            ObjectKind::Player => (BodyType::Dynamic, 1., 0.2, false),
            ObjectKind::Platform => (BodyType::Static, 0., 0.6, false),
            ObjectKind::Finish | ObjectKind::Point => (BodyType::Static, 0., 0., true),
        };
        Self {
            body: None,
            body_type,
            filter: CollisionFilter::for_kind(kind),
            density,
            friction,
            sensor,
            initial: transform,
        }
    }

    pub const fn is_bound(&self) -> bool {
        self.body.is_some()
    }

    pub fn body_def(&self, profile: BindProfile, transform: &MapTransform) -> BodyDef {
        let (body_type, fixed_rotation) = match profile {
            BindProfile::Player => (BodyType::Dynamic, true),
            BindProfile::Generic => (self.body_type, false),
        };
        BodyDef {
            body_type,
            position: transform.center,
            size: transform.size,
            angle: transform.rotation.to_radians(),
            filter: self.filter,
            density: self.density,
            friction: self.friction,
            sensor: self.sensor,
            fixed_rotation,
        }
    }
}

/// A physics engine able to create and destroy bodies.
pub trait PhysicsBackend: Send + Sync + 'static {
    fn create_body(&mut self, def: &BodyDef) -> BodyHandle;

    fn destroy_body(&mut self, handle: BodyHandle);

    fn body_count(&self) -> usize;
}

/// The physics engine used by editor commands.
#[derive(Resource)]
pub struct PhysicsWorld(Box<dyn PhysicsBackend>);

impl PhysicsWorld {
    pub fn new(backend: impl PhysicsBackend) -> Self {
        Self(Box::new(backend))
    }

    pub fn create_body(&mut self, def: &BodyDef) -> BodyHandle {
        let Self(backend) = self;
        backend.create_body(def)
    }

    pub fn destroy_body(&mut self, handle: BodyHandle) {
        let Self(backend) = self;
        backend.destroy_body(handle);
    }

    pub fn body_count(&self) -> usize {
        let Self(backend) = self;
        backend.body_count()
    }
}

/// In-memory [`PhysicsBackend`] that only keeps track of which bodies exist.
#[derive(Default, Clone, Debug)]
pub struct HeadlessPhysics {
    next_handle: u64,
    bodies: HashMap<BodyHandle, BodyDef>,
}

impl HeadlessPhysics {
    pub fn get(&self, handle: BodyHandle) -> Option<&BodyDef> {
        self.bodies.get(&handle)
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

impl PhysicsBackend for HeadlessPhysics {
    fn create_body(&mut self, def: &BodyDef) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        self.bodies.insert(handle, *def);
        handle
    }

    fn destroy_body(&mut self, handle: BodyHandle) {
        let removed = self.bodies.remove(&handle);
        debug_assert!(removed.is_some(), "destroyed unknown body {handle:?}");
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

/// Creates the body of `entity` from its binding, unless it already has one.
///
/// # Panics
/// If `entity` lacks [`ObjectKind`], [`MapTransform`] or [`PhysicsBinding`], or no
/// [`PhysicsWorld`] is present.
#[track_caller]
pub fn bind_body(world: &mut World, entity: Entity) {
    let kind = *world
        .get::<ObjectKind>(entity)
        .unwrap_or_else(|| panic!("{entity:?} has no ObjectKind to pick a bind profile"));
    let transform = *world
        .get::<MapTransform>(entity)
        .unwrap_or_else(|| panic!("{entity:?} has no MapTransform to bind a body to"));
    let binding = *world
        .get::<PhysicsBinding>(entity)
        .unwrap_or_else(|| panic!("{entity:?} has no PhysicsBinding"));
    if binding.is_bound() {
        return;
    }

    let def = binding.body_def(BindProfile::for_kind(kind), &transform);
    let handle = world
        .get_resource_mut::<PhysicsWorld>()
        .expect("No PhysicsWorld resource found. Did you add the LevelEditorPlugin?")
        .create_body(&def);
    trace!("Bound {entity:?} to {handle:?}");

    let mut binding = world.get_mut::<PhysicsBinding>(entity).unwrap();
    binding.body = Some(handle);
    binding.initial = transform;
}

/// Destroys the body of `entity`, keeping the rest of its binding.
#[track_caller]
pub fn unbind_body(world: &mut World, entity: Entity) {
    let Some(handle) = world
        .get_mut::<PhysicsBinding>(entity)
        .unwrap_or_else(|| panic!("{entity:?} has no PhysicsBinding"))
        .body
        .take()
    else {
        return;
    };
    world
        .get_resource_mut::<PhysicsWorld>()
        .expect("No PhysicsWorld resource found. Did you add the LevelEditorPlugin?")
        .destroy_body(handle);
    trace!("Unbound {entity:?} from {handle:?}");
}

/// Applies `change` to the binding of `entity` and rebuilds its body if it had one.
///
/// Soft-deleted objects have no body, so only their stored binding changes.
#[track_caller]
pub fn rebind_with(world: &mut World, entity: Entity, change: impl FnOnce(&mut PhysicsBinding)) {
    let was_bound = world
        .get::<PhysicsBinding>(entity)
        .unwrap_or_else(|| panic!("{entity:?} has no PhysicsBinding"))
        .is_bound();
    if was_bound {
        unbind_body(world, entity);
    }
    let mut binding = world.get_mut::<PhysicsBinding>(entity).unwrap();
    change(&mut *binding);
    if was_bound {
        bind_body(world, entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with_platform() -> (World, Entity) {
        let mut world = World::new();
        world.insert_resource(PhysicsWorld::new(HeadlessPhysics::default()));
        let transform = MapTransform::new(Vec2::new(3., 1.), Vec2::new(2., 1.));
        let entity = world
            .spawn((
                ObjectKind::Platform,
                transform,
                PhysicsBinding::for_kind(ObjectKind::Platform, transform),
            ))
            .id();
        (world, entity)
    }

    #[test]
    fn bind_then_unbind_keeps_binding_data() {
        let (mut world, entity) = world_with_platform();
        let before = *world.get::<PhysicsBinding>(entity).unwrap();

        bind_body(&mut world, entity);
        let handle = world.get::<PhysicsBinding>(entity).unwrap().body;
        assert!(handle.is_some());

        bind_body(&mut world, entity);
        assert_eq!(world.get::<PhysicsBinding>(entity).unwrap().body, handle);

        unbind_body(&mut world, entity);
        assert_eq!(*world.get::<PhysicsBinding>(entity).unwrap(), before);
    }

    #[test]
    fn player_profile_forces_dynamic_fixed_rotation() {
        let transform = MapTransform::default();
        let mut binding = PhysicsBinding::for_kind(ObjectKind::Player, transform);
        binding.body_type = BodyType::Static;

        let def = binding.body_def(BindProfile::for_kind(ObjectKind::Player), &transform);
        assert_eq!(def.body_type, BodyType::Dynamic);
        assert!(def.fixed_rotation);
        assert_eq!(def.filter, CollisionFilter::PLAYER);
    }

    #[test]
    fn rebind_of_unbound_object_only_changes_data() {
        let (mut world, entity) = world_with_platform();
        rebind_with(&mut world, entity, |binding| {
            binding.filter = CollisionFilter::DESTROYABLE_PLATFORM
        });

        let binding = world.get::<PhysicsBinding>(entity).unwrap();
        assert!(!binding.is_bound());
        assert_eq!(binding.filter, CollisionFilter::DESTROYABLE_PLATFORM);
    }
}
