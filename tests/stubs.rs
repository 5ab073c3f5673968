#![allow(dead_code)]

use bevy::prelude::*;
use bevy_level_editor::{
    prelude::*, BodyDef, BodyHandle, EditorConfig, MapTransform, ObjectKind, PhysicsBackend,
    PhysicsWorld,
};
use std::sync::{Arc, Mutex};

/// Calls received by a [`FakePhysics`].
#[derive(Clone, Debug, PartialEq)]
pub enum PhysicsCall {
    Create(BodyHandle, BodyDef),
    Destroy(BodyHandle),
}

/// Physics backend recording every call into a shared log.
#[derive(Default, Clone)]
pub struct FakePhysics {
    pub log: Arc<Mutex<Vec<PhysicsCall>>>,
    live: Arc<Mutex<Vec<BodyHandle>>>,
    next: u64,
}

impl FakePhysics {
    pub fn calls(&self) -> Vec<PhysicsCall> {
        self.log.lock().unwrap().clone()
    }

    pub fn live_bodies(&self) -> usize {
        self.live.lock().unwrap().len()
    }
}

impl PhysicsBackend for FakePhysics {
    fn create_body(&mut self, def: &BodyDef) -> BodyHandle {
        let handle = BodyHandle(self.next);
        self.next += 1;
        self.live.lock().unwrap().push(handle);
        self.log
            .lock()
            .unwrap()
            .push(PhysicsCall::Create(handle, *def));
        handle
    }

    fn destroy_body(&mut self, handle: BodyHandle) {
        let mut live = self.live.lock().unwrap();
        let index = live
            .iter()
            .position(|&h| h == handle)
            .expect("destroyed a body that does not exist");
        live.swap_remove(index);
        self.log.lock().unwrap().push(PhysicsCall::Destroy(handle));
    }

    fn body_count(&self) -> usize {
        self.live_bodies()
    }
}

/// Creates an app running the editor against `physics`, with one session already spawned.
pub fn create_app(physics: FakePhysics) -> (App, Entity) {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(PhysicsWorld::new(physics))
        .add_plugins(LevelEditorPlugin::new());
    let config = *app.world.resource::<EditorConfig>();
    let session = app
        .world
        .spawn(EditorSessionBundle::from_config(&config))
        .id();
    (app, session)
}

/// Spawns a map object and places it through an [`AddObject`] recorded in `session`.
pub fn place(app: &mut App, session: Entity, kind: ObjectKind, center: Vec2) -> Entity {
    let transform = MapTransform::new(center, Vec2::ONE);
    let entity = match kind {
        ObjectKind::Platform => app.world.spawn(MapObjectBundle::platform(transform)).id(),
        _ => app.world.spawn(MapObjectBundle::new(kind, transform)).id(),
    };
    app.world
        .execute_editor_command(session, AddObject::new(entity));
    entity
}

pub fn ledger(app: &App, session: Entity) -> &CommandLedger {
    app.world.get::<CommandLedger>(session).unwrap()
}

pub fn ledger_mut(app: &mut App, session: Entity) -> Mut<'_, CommandLedger> {
    app.world.get_mut::<CommandLedger>(session).unwrap()
}
