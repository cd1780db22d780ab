/*!
Scene root module.

The collision handler never talks to a physics engine directly. It asks a [`CollisionScene`]
for socket positions and sphere traces, so any backend can host it. This module provides the
trait and a reference backend built on rapier's parry3d:

- shapes:       collider shape definitions and their parry shapes
- broad:        swept-sphere AABB helpers used to prune colliders
- narrow_phase: thin wrapper over parry3d's shape cast (sphere vs collider)
- world:        `SceneWorld`, an in-memory scene of actors, colliders and moving elements
*/

pub mod broad;
pub mod narrow_phase;
pub mod shapes;
pub mod world;

pub use shapes::ColliderShapeDef;
pub use world::{ColliderDef, ElementDef, SceneWorld};

use crate::{
    bitmask_flags::CategoryMask,
    types::{ActorId, ClassId, ElementId, Socket, TraceHit, Vec3},
};

/// A sphere swept along a segment.
#[derive(Clone, Debug)]
pub struct SphereTrace<'a> {
    pub start: Vec3,
    pub end: Vec3,
    pub radius: f32,
    /// Only colliders whose category is in this mask can be hit.
    pub categories: CategoryMask,
    /// Prefer precise geometry over simple collision shapes when both exist.
    pub precise: bool,
    /// Actors skipped entirely.
    pub ignored_actors: &'a [ActorId],
}

/// The physics backend seen by the collision handler.
pub trait CollisionScene {
    /// False once the element is gone (destroyed, unloaded).
    fn element_is_valid(&self, element: ElementId) -> bool;

    /// World position of `socket` on `element`.
    ///
    /// `Socket::Origin` is the element's own origin. A name the element does not carry falls
    /// back to the origin too. Returns `None` only when the element is invalid.
    fn socket_location(&self, element: ElementId, socket: &Socket) -> Option<Vec3>;

    /// Every hit along the trace, ordered by time of impact. May contain several hits on the
    /// same actor when it has several colliders.
    fn sphere_trace(&self, trace: &SphereTrace<'_>) -> Vec<TraceHit>;

    fn actor_class(&self, actor: ActorId) -> Option<ClassId>;

    /// True if `class` is `ancestor` or derives from it.
    fn is_class_child_of(&self, class: ClassId, ancestor: ClassId) -> bool;
}
