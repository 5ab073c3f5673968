//! Named, non-owning links between the parts of a composite map object.
//!
//! A moving platform is three entities: the platform itself, its target marker and the guide
//! line between them. Each part stores a [`Linkage`] naming the others by role. Roles are plain
//! strings so that new composite kinds can introduce their own without touching commands or the
//! ledger.

use bevy::{prelude::*, utils::HashMap};

/// Role of the origin platform, as seen from its marker and guide line.
pub const PLATFORM: &str = "platform";
/// Role of the target marker, as seen from its platform and guide line.
pub const MOCK_PLATFORM: &str = "mockPlatform";
/// Role of the guide line, as seen from its platform and marker.
pub const DASHED_LINE: &str = "dashedLine";

/// Role name to entity mapping. Links are weak: despawning a linked entity does not touch them.
#[derive(Component, Clone, Debug, Default, PartialEq, Eq)]
pub struct Linkage(HashMap<String, Entity>);

impl Linkage {
    pub fn new(links: impl IntoIterator<Item = (&'static str, Entity)>) -> Self {
        Self(
            links
                .into_iter()
                .map(|(role, entity)| (role.to_owned(), entity))
                .collect(),
        )
    }

    /// Links `role` to `entity`, returning the entity previously linked under that role.
    pub fn insert(&mut self, role: impl Into<String>, entity: Entity) -> Option<Entity> {
        let Self(links) = self;
        links.insert(role.into(), entity)
    }

    pub fn remove(&mut self, role: &str) -> Option<Entity> {
        let Self(links) = self;
        links.remove(role)
    }

    pub fn get(&self, role: &str) -> Option<Entity> {
        let Self(links) = self;
        links.get(role).copied()
    }

    /// Returns the entity linked under `role`.
    ///
    /// # Panics
    /// If the role is missing. A missing role means a command was applied asymmetrically and the
    /// history no longer matches the world.
    #[track_caller]
    pub fn expect(&self, role: &str) -> Entity {
        self.get(role)
            .unwrap_or_else(|| panic!("Linkage is missing the {role:?} role"))
    }

    pub fn contains(&self, role: &str) -> bool {
        let Self(links) = self;
        links.contains_key(role)
    }

    /// Iterate over all links as `(role, entity)`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Entity)> + '_ {
        let Self(links) = self;
        links.iter().map(|(role, &entity)| (role.as_str(), entity))
    }

    pub fn len(&self) -> usize {
        let Self(links) = self;
        links.len()
    }

    pub fn is_empty(&self) -> bool {
        let Self(links) = self;
        links.is_empty()
    }
}

/// Looks up `role` in the [`Linkage`] of `entity`.
///
/// # Panics
/// If `entity` has no [`Linkage`] or the role is missing.
#[track_caller]
pub fn linked(world: &World, entity: Entity, role: &str) -> Entity {
    world
        .get::<Linkage>(entity)
        .unwrap_or_else(|| panic!("{entity:?} has no Linkage, expected a {role:?} role"))
        .expect(role)
}

/// Entities standing in for despawned composite parts.
///
/// Undoing a "non-moving" spawns a fresh target marker, but commands recorded earlier still name
/// the marker that was despawned. Each respawn maps the old entity to its replacement here, and
/// commands resolve their entity through it before touching the world.
#[derive(Resource, Clone, Debug, Default, PartialEq, Eq)]
pub struct RespawnedParts(HashMap<Entity, Entity>);

impl RespawnedParts {
    pub fn insert(&mut self, despawned: Entity, respawned: Entity) {
        let Self(parts) = self;
        parts.insert(despawned, respawned);
    }

    /// Follows replacements of `entity` to the one alive now.
    pub fn resolve(&self, mut entity: Entity) -> Entity {
        let Self(parts) = self;
        // Respawns always allocate a fresh entity, so the chain cannot loop.
        while let Some(&next) = parts.get(&entity) {
            entity = next;
        }
        entity
    }

    pub fn len(&self) -> usize {
        let Self(parts) = self;
        parts.len()
    }

    pub fn is_empty(&self) -> bool {
        let Self(parts) = self;
        parts.is_empty()
    }
}

/// Resolves `entity` through the [`RespawnedParts`] of `world`, if any.
pub fn resolve(world: &World, entity: Entity) -> Entity {
    world
        .get_resource::<RespawnedParts>()
        .map_or(entity, |parts| parts.resolve(entity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_resolve_and_remove() {
        let mut world = World::new();
        let mock = world.spawn_empty().id();
        let line = world.spawn_empty().id();

        let mut linkage = Linkage::new([(MOCK_PLATFORM, mock)]);
        assert_eq!(linkage.insert(DASHED_LINE, line), None);
        assert_eq!(linkage.len(), 2);
        assert_eq!(linkage.expect(MOCK_PLATFORM), mock);
        assert!(linkage.contains(DASHED_LINE));

        assert_eq!(linkage.remove(DASHED_LINE), Some(line));
        assert_eq!(linkage.get(DASHED_LINE), None);
        assert!(!linkage.is_empty());
    }

    #[test]
    #[should_panic(expected = "mockPlatform")]
    fn missing_role_is_fatal() {
        let mut world = World::new();
        let platform = world.spawn(Linkage::default()).id();
        linked(&world, platform, MOCK_PLATFORM);
    }

    #[test]
    fn respawns_resolve_through_chains() {
        let mut world = World::new();
        let [first, second, third, other] = [(); 4].map(|_| world.spawn_empty().id());
        assert_eq!(resolve(&world, first), first);

        let mut parts = RespawnedParts::default();
        parts.insert(first, second);
        parts.insert(second, third);
        world.insert_resource(parts);

        assert_eq!(resolve(&world, first), third);
        assert_eq!(resolve(&world, second), third);
        assert_eq!(resolve(&world, other), other);
    }
}
