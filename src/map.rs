use crate::{EditorObjectState, MapTransform, RefreshMapBounds};
use bevy::prelude::*;

/// Map-wide counters kept in step with placed objects.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MapCounters {
    /// Collectible points currently on the map.
    pub points: u32,
}

/// Smallest axis aligned box holding every live map object. `None` for an empty map.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct MapBounds(pub Option<Rect>);

/// Rebuilds [`MapBounds`] when at least one [`RefreshMapBounds`] arrived since the last tick.
///
/// Soft-deleted objects are skipped.
pub fn refresh_map_bounds(
    mut requests: EventReader<RefreshMapBounds>,
    mut bounds: ResMut<MapBounds>,
    objects: Query<(&MapTransform, &EditorObjectState)>,
) {
    if requests.read().count() == 0 {
        return;
    }

    let rect = objects
        .iter()
        .filter(|(_, state)| state.is_live())
        .map(|(transform, _)| {
            let (min, max) = transform.aabb();
            Rect::from_corners(min, max)
        })
        .reduce(|acc, rect| acc.union(rect));

    trace!("Map bounds now {rect:?}");
    *bounds = MapBounds(rect);
}
