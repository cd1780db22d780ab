use std::collections::HashSet;

use crate::types::{ActorId, ElementId, Socket};

/// A moving element that deals damage, the sockets sampled on it, and the actors it has
/// already hit during the current activation window.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedSurface {
    pub element: ElementId,
    sockets: Vec<Socket>,
    hit_actors: HashSet<ActorId>,
}

impl TrackedSurface {
    /// Track `sockets` on `element`. With no sockets, the element's origin is sampled.
    pub fn new(element: ElementId, sockets: impl IntoIterator<Item = Socket>) -> Self {
        let mut sockets: Vec<Socket> = sockets.into_iter().collect();
        if sockets.is_empty() {
            sockets.push(Socket::Origin);
        }
        Self {
            element,
            sockets,
            hit_actors: HashSet::new(),
        }
    }

    /// Track named sockets, e.g. `["Blade01", "Blade02", "Tip"]`.
    pub fn with_socket_names(element: ElementId, names: &[&str]) -> Self {
        Self::new(element, names.iter().map(|name| Socket::named(*name)))
    }

    /// Track only the element's origin.
    pub fn origin(element: ElementId) -> Self {
        Self::new(element, std::iter::empty())
    }

    /// Never empty.
    pub fn sockets(&self) -> &[Socket] {
        &self.sockets
    }

    pub fn hit_actors(&self) -> &HashSet<ActorId> {
        &self.hit_actors
    }

    pub fn has_hit(&self, actor: ActorId) -> bool {
        self.hit_actors.contains(&actor)
    }

    /// Returns false if `actor` was already recorded.
    pub(crate) fn record_hit(&mut self, actor: ActorId) -> bool {
        self.hit_actors.insert(actor)
    }

    pub(crate) fn clear_hits(&mut self) {
        self.hit_actors.clear();
    }
}

/// The set of surfaces currently eligible for collision.
///
/// There are no incremental edits: every update replaces the whole set, which keeps the socket
/// cache and hit records from going stale.
#[derive(Clone, Debug, Default)]
pub struct SurfaceRegistry {
    surfaces: Vec<TrackedSurface>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every tracked surface. Incoming hit records are dropped.
    pub fn replace(&mut self, surfaces: Vec<TrackedSurface>) {
        self.surfaces = surfaces;
        self.clear_hits();
    }

    pub fn clear_hits(&mut self) {
        for surface in &mut self.surfaces {
            surface.clear_hits();
        }
    }

    pub fn get(&self, element: ElementId) -> Option<&TrackedSurface> {
        self.surfaces.iter().find(|s| s.element == element)
    }

    pub fn as_slice(&self) -> &[TrackedSurface] {
        &self.surfaces
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedSurface> {
        self.surfaces.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TrackedSurface> {
        self.surfaces.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}
