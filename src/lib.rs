//! bevy_level_editor is a bevy plugin holding the undoable command engine of a platformer level
//! editor.
//!
//! Every change a user makes to a map is an [`EditorCommand`]. Input systems build and execute
//! commands and record them in the [`CommandLedger`] of an [`EditorSession`]; undo and redo are
//! only requested from input and replayed once per tick by [`drain_command_ledgers`].
#![forbid(unsafe_code)] // let us try

use bevy::prelude::*;

mod command;
mod components;
mod events;
mod ledger;
pub mod linkage;
mod map;
mod physics;

pub use command::*;
pub use components::*;
pub use events::*;
pub use ledger::*;
pub use linkage::{Linkage, RespawnedParts};
pub use map::*;
pub use physics::*;

pub mod prelude {
    pub use crate::{
        AddObject, CommandLedger, DeleteObject, EditorCommand, EditorCommandsExt, EditorSession,
        EditorSessionBundle, EditorSet, EditorWorldExt, Inverse, LevelEditorPlugin,
        MakeObjectDestroyable, MakeObjectMoving, MakeObjectNonDestroyable, MakeObjectNonMoving,
        MakeObjectNonRotating, MakeObjectRotating, MapObjectBundle, MoveObject, ResizeObject,
        RotateObject,
    };
}

const DEFAULT_MOVING_SPEED: f32 = 2.;
const DEFAULT_MOCK_OFFSET: Vec2 = Vec2::new(3., 0.);

/// Editor settings, available as a [`Resource`] once the [`LevelEditorPlugin`] is added.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct EditorConfig {
    /// Speed of a platform made moving for the first time.
    pub default_speed: f32,
    /// Where the target marker of a new moving platform goes, relative to the platform.
    pub mock_offset: Vec2,
    /// Maximum amount of commands a new session keeps for undo. `None` keeps all of them.
    pub history_depth: Option<usize>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_speed: DEFAULT_MOVING_SPEED,
            mock_offset: DEFAULT_MOCK_OFFSET,
            history_depth: None,
        }
    }
}

/// Ordering of the editor inside [`Update`].
///
/// Systems recording commands go in [`EditorSet::Input`]. Undo and redo steps are replayed in
/// [`EditorSet::Drain`], after all input of the tick. Derived state is rebuilt in
/// [`EditorSet::Recompute`] from the requests posted by both.
#[derive(SystemSet, Hash, Debug, PartialEq, Eq, Clone)]
pub enum EditorSet {
    Input,
    Drain,
    Recompute,
}

/// A builder to configure the level editor for a bevy app.
#[derive(Default)]
pub struct LevelEditorPlugin {
    config: EditorConfig,
}

impl LevelEditorPlugin {
    /// Create a new instance of the builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Bounds the undo history of sessions spawned from the [`EditorConfig`].
    pub fn with_history_depth(mut self, depth: usize) -> Self {
        self.config.history_depth = Some(depth);
        self
    }

    /// Change the speed given to platforms made moving for the first time.
    pub fn with_default_speed(mut self, speed: f32) -> Self {
        self.config.default_speed = speed;
        self
    }

    /// Change where target markers of new moving platforms are placed.
    pub fn with_mock_offset(mut self, offset: Vec2) -> Self {
        self.config.mock_offset = offset;
        self
    }
}

impl Plugin for LevelEditorPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config)
            .init_resource::<MapCounters>()
            .init_resource::<MapBounds>()
            .init_resource::<RespawnedParts>()
            .add_event::<UpdateRoundedPlatforms>()
            .add_event::<RefreshMapBounds>()
            .configure_sets(
                Update,
                (EditorSet::Input, EditorSet::Drain, EditorSet::Recompute).chain(),
            )
            .add_systems(Update, drain_command_ledgers.in_set(EditorSet::Drain))
            .add_systems(Update, refresh_map_bounds.in_set(EditorSet::Recompute));

        if !app.world.contains_resource::<PhysicsWorld>() {
            app.insert_resource(PhysicsWorld::new(HeadlessPhysics::default()));
        }
    }
}
