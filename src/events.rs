use bevy::prelude::*;

/// Asks the platform renderer to reassign rounded-corner textures.
///
/// Posted by every command that changes which platforms exist or where they are. Consumers read
/// it once per tick, so any number of posts in one tick cost a single recompute.
#[derive(Event, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateRoundedPlatforms;

/// Asks for [`MapBounds`](crate::MapBounds) to be recomputed from the live map objects.
#[derive(Event, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefreshMapBounds;

/// Posts `event` onto its queue in `world`.
///
/// # Panics
/// If the event type was never registered.
#[track_caller]
pub(crate) fn post<E: Event>(world: &mut World, event: E) {
    world
        .get_resource_mut::<Events<E>>()
        .unwrap_or_else(|| {
            panic!(
                "No event queue for {}. Did you add the LevelEditorPlugin?",
                bevy::utils::get_short_name(std::any::type_name::<E>())
            )
        })
        .send(event);
}

/// Posts both recompute requests: geometry of the map changed.
pub(crate) fn post_geometry_changed(world: &mut World) {
    post(world, UpdateRoundedPlatforms);
    post(world, RefreshMapBounds);
}
