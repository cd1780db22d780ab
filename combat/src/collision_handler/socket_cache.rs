use std::collections::HashMap;

use super::surface::SurfaceRegistry;
use crate::{
    scene::CollisionScene,
    types::{ElementId, Socket, SocketKey, Vec3},
};

/// World position of every tracked socket as of the last sample.
///
/// These positions are the start points of the next sweep. Slots are grouped per element so
/// the per-tick lookups borrow the socket instead of building a key.
#[derive(Clone, Debug, Default)]
pub struct SocketPositionCache {
    positions: HashMap<ElementId, HashMap<Socket, Vec3>>,
}

impl SocketPositionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the cached position of every (surface, socket) pair with its current world
    /// position. Surfaces whose element is no longer valid are skipped.
    pub fn resample(&mut self, surfaces: &SurfaceRegistry, scene: &impl CollisionScene) {
        for surface in surfaces.iter() {
            if !scene.element_is_valid(surface.element) {
                log::trace!("skipping invalid element {:?} while sampling", surface.element);
                continue;
            }

            let slots = self.positions.entry(surface.element).or_default();
            for socket in surface.sockets() {
                let Some(location) = scene.socket_location(surface.element, socket) else {
                    continue;
                };
                match slots.get_mut(socket) {
                    Some(slot) => *slot = location,
                    None => {
                        slots.insert(socket.clone(), location);
                    }
                }
            }
        }
    }

    pub fn get(&self, key: &SocketKey) -> Option<Vec3> {
        self.location(key.element, &key.socket)
    }

    #[inline]
    pub fn location(&self, element: ElementId, socket: &Socket) -> Option<Vec3> {
        self.positions.get(&element)?.get(socket).copied()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }

    pub fn len(&self) -> usize {
        self.positions.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        collision_handler::TrackedSurface,
        scene::{ElementDef, SceneWorld},
        types::Iso,
    };

    #[test]
    fn resample_overwrites_positions() {
        let mut scene = SceneWorld::new();
        let sword = scene.add_element(
            ElementDef::new(Iso::identity()).with_socket("Tip", Vec3::new(0.0, 1.0, 0.0)),
        );
        let mut registry = SurfaceRegistry::new();
        registry.replace(vec![TrackedSurface::new(
            sword,
            [Socket::Origin, Socket::named("Tip")],
        )]);

        let mut cache = SocketPositionCache::new();
        cache.resample(&registry, &scene);
        let tip = SocketKey::new(sword, Socket::named("Tip"));
        assert_eq!(cache.get(&tip), Some(Vec3::new(0.0, 1.0, 0.0)));
        assert_eq!(cache.len(), 2);

        scene.translate_element(sword, Vec3::new(2.0, 0.0, 0.0));
        cache.resample(&registry, &scene);
        assert_eq!(cache.get(&tip), Some(Vec3::new(2.0, 1.0, 0.0)));
        assert_eq!(
            cache.get(&SocketKey::new(sword, Socket::Origin)),
            Some(Vec3::new(2.0, 0.0, 0.0))
        );
    }

    #[test]
    fn invalid_elements_are_skipped() {
        let mut scene = SceneWorld::new();
        let kept = scene.add_element(ElementDef::new(Iso::identity()));
        let gone = scene.add_element(ElementDef::new(Iso::identity()));
        scene.remove_element(gone);

        let mut registry = SurfaceRegistry::new();
        registry.replace(vec![TrackedSurface::origin(gone), TrackedSurface::origin(kept)]);

        let mut cache = SocketPositionCache::new();
        cache.resample(&registry, &scene);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&SocketKey::new(gone, Socket::Origin)).is_none());
    }
}
