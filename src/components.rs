use crate::{BodyType, PhysicsBinding};
use bevy::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Placement, extent and orientation of a map object.
///
/// `center` is the middle of the object's box and `rotation` is in degrees. This is the
/// "positionable transform" every geometric command requires.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MapTransform {
    pub center: Vec2,
    pub size: Vec2,
    pub rotation: f32,
}

impl MapTransform {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            size,
            rotation: 0.,
        }
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Axis aligned `(min, max)` corners of the rotated box.
    pub fn aabb(&self) -> (Vec2, Vec2) {
        let half = self.size / 2.;
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let extent = Vec2::new(
            (half.x * cos).abs() + (half.y * sin).abs(),
            (half.x * sin).abs() + (half.y * cos).abs(),
        );
        (self.center - extent, self.center + extent)
    }
}

/// Which edges of an object the user is currently dragging a resize handle on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResizeFlags {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl ResizeFlags {
    pub const fn any(&self) -> bool {
        self.left || self.right || self.up || self.down
    }
}

/// Axes along which the user is currently dragging an object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DragFlags {
    pub horizontal: bool,
    pub vertical: bool,
}

/// Per-object editor flags.
///
/// Input systems own the selection, drag, resize and rotation flags. Commands own `deleted`:
/// a deleted object keeps all of its data so that the deletion can be undone, and every
/// system iterating map objects must skip it (see [`EditorObjectState::is_live`]).
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EditorObjectState {
    pub deleted: bool,
    pub selected: bool,
    pub rotating: bool,
    pub drag: DragFlags,
    pub resize: ResizeFlags,
}

impl EditorObjectState {
    pub const fn is_live(&self) -> bool {
        !self.deleted
    }

    pub const fn is_dragging(&self) -> bool {
        self.drag.horizontal || self.drag.vertical
    }

    pub const fn is_resizing(&self) -> bool {
        self.resize.any()
    }

    /// Clears every transient input flag, leaving `deleted` and `selected` alone.
    pub fn release(&mut self) {
        self.rotating = false;
        self.drag = DragFlags::default();
        self.resize = ResizeFlags::default();
    }
}

/// Whether an object is drawn and reacts to pointer input.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Appearance {
    pub visible: bool,
    pub touchable: bool,
}

impl Default for Appearance {
    fn default() -> Self {
        Self::shown()
    }
}

impl Appearance {
    pub const fn shown() -> Self {
        Self {
            visible: true,
            touchable: true,
        }
    }

    pub const fn hidden() -> Self {
        Self {
            visible: false,
            touchable: false,
        }
    }
}

/// The kinds of object a user can place on a map.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ObjectKind {
    Player,
    Platform,
    Finish,
    Point,
}

impl ObjectKind {
    /// Whether placing or removing this object changes [`MapCounters::points`](crate::MapCounters).
    pub const fn counts_as_point(&self) -> bool {
        match self {
            ObjectKind::Point => true,
            ObjectKind::Player | ObjectKind::Platform | ObjectKind::Finish => false,
        }
    }
}

/// Plain solid platform trait.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Platform;

/// Platform that breaks when the player lands on it.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DestroyablePlatform;

/// Platform travelling back and forth between its own position and its linked mock target.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct MovingPlatform {
    pub speed: f32,
    /// Body type the object had before it started moving.
    pub resting_body: BodyType,
    /// Speed of the [`ParkedTarget`] this platform resumed from, if any.
    pub resumed_speed: Option<f32>,
}

/// Platform spinning around its center. Also drives the rotation indicator decoration.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RotatingPlatform;

/// Target marker of a moving platform: a copy of the platform's shape at the far end of its path.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MockPlatform;

/// Dashed guide line drawn between a moving platform and its target marker.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GuideLine;

/// Transforms an entity had before each geometric command applied to it, most recent last.
///
/// Undoing a geometric command pops the last entry and writes it back as is, so undo never
/// accumulates rounding error.
#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct TransformHistory(Vec<MapTransform>);

impl TransformHistory {
    pub fn push(&mut self, transform: MapTransform) {
        let Self(history) = self;
        history.push(transform);
    }

    pub fn pop(&mut self) -> Option<MapTransform> {
        let Self(history) = self;
        history.pop()
    }

    pub fn last(&self) -> Option<&MapTransform> {
        let Self(history) = self;
        history.last()
    }

    pub fn len(&self) -> usize {
        let Self(history) = self;
        history.len()
    }

    pub fn is_empty(&self) -> bool {
        let Self(history) = self;
        history.is_empty()
    }
}

/// What a moving platform left behind when it stopped moving.
#[derive(Clone, Debug, PartialEq)]
pub struct ParkedTarget {
    pub speed: f32,
    /// Where the target marker was.
    pub marker: MapTransform,
    /// Undo history of the target marker.
    pub history: TransformHistory,
    /// The despawned target marker.
    pub mock: Entity,
    /// The despawned guide line.
    pub line: Entity,
}

/// Targets of a platform that stopped moving, most recent last.
///
/// Making the platform moving again resumes from the last entry: the speed carries over and the
/// target marker comes back where it was.
#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct ParkedTargets(Vec<ParkedTarget>);

impl ParkedTargets {
    pub fn push(&mut self, target: ParkedTarget) {
        let Self(targets) = self;
        targets.push(target);
    }

    pub fn pop(&mut self) -> Option<ParkedTarget> {
        let Self(targets) = self;
        targets.pop()
    }

    pub fn last(&self) -> Option<&ParkedTarget> {
        let Self(targets) = self;
        targets.last()
    }

    pub fn len(&self) -> usize {
        let Self(targets) = self;
        targets.len()
    }

    pub fn is_empty(&self) -> bool {
        let Self(targets) = self;
        targets.is_empty()
    }
}

/// Everything a freshly placed map object needs before an [`AddObject`](crate::AddObject) runs.
///
/// Objects start soft-deleted and hidden without a physics body; executing the add command
/// brings them to life.
#[derive(Bundle)]
pub struct MapObjectBundle {
    pub kind: ObjectKind,
    pub transform: MapTransform,
    pub state: EditorObjectState,
    pub appearance: Appearance,
    pub physics: PhysicsBinding,
}

impl MapObjectBundle {
    pub fn new(kind: ObjectKind, transform: MapTransform) -> Self {
        Self {
            kind,
            transform,
            state: EditorObjectState {
                deleted: true,
                ..default()
            },
            appearance: Appearance::hidden(),
            physics: PhysicsBinding::for_kind(kind, transform),
        }
    }

    /// A plain platform, ready for the traits commands to toggle.
    pub fn platform(transform: MapTransform) -> (Self, Platform) {
        (Self::new(ObjectKind::Platform, transform), Platform)
    }
}
