//! In-memory scene of hittable actors and moving socket-carrying elements.
//!
//! This is the reference [`CollisionScene`] backend. Hosts mirror their own world into it
//! every frame (actor poses, element poses) and hand it to the collision handler.
//!
//! Design goals
//! - Deterministic: actors are iterated in id order, so traces return identical results for
//!   identical inputs.
//! - Query-only: nothing here simulates; poses are whatever the host last wrote.

use std::collections::{BTreeMap, HashMap};

use rapier3d::{
    na::Point3,
    parry::shape::{Shape, SharedShape},
};

use super::{
    CollisionScene, SphereTrace, broad,
    narrow_phase::cast_sphere_against_shape,
    shapes::{ColliderShapeDef, shape_from_def},
};
use crate::{
    bitmask_flags::CollisionCategory,
    class::ClassRegistry,
    constants::MIN_SWEEP_DISTANCE_SQ,
    types::{ActorId, ClassId, ElementId, Iso, Socket, TraceHit, Vec3},
};

/// Definition of a collider attached to an actor.
#[derive(Clone, Debug)]
pub struct ColliderDef {
    pub shape: ColliderShapeDef,
    /// Optional precise geometry, used when a trace asks for it.
    pub precise_shape: Option<ColliderShapeDef>,
    /// Pose relative to the owning actor.
    pub local_pose: Iso,
    pub category: CollisionCategory,
    pub profile_name: String,
}

impl ColliderDef {
    pub fn new(shape: ColliderShapeDef, category: CollisionCategory, profile_name: &str) -> Self {
        Self {
            shape,
            precise_shape: None,
            local_pose: Iso::identity(),
            category,
            profile_name: profile_name.to_string(),
        }
    }

    pub fn with_local_pose(mut self, local_pose: Iso) -> Self {
        self.local_pose = local_pose;
        self
    }

    pub fn with_precise_shape(mut self, precise_shape: ColliderShapeDef) -> Self {
        self.precise_shape = Some(precise_shape);
        self
    }
}

/// Definition of a moving element and the named sockets it carries.
#[derive(Clone, Debug)]
pub struct ElementDef {
    pub pose: Iso,
    /// Socket name -> offset in the element's local space.
    pub sockets: HashMap<String, Vec3>,
}

impl ElementDef {
    pub fn new(pose: Iso) -> Self {
        Self {
            pose,
            sockets: HashMap::new(),
        }
    }

    pub fn with_socket(mut self, name: &str, local_offset: Vec3) -> Self {
        self.sockets.insert(name.to_string(), local_offset);
        self
    }
}

struct SceneCollider {
    shape: SharedShape,
    precise_shape: Option<SharedShape>,
    local_pose: Iso,
    category: CollisionCategory,
    profile_name: String,
}

struct SceneActor {
    class: ClassId,
    pose: Iso,
    colliders: Vec<SceneCollider>,
}

pub struct SceneWorld {
    actors: BTreeMap<ActorId, SceneActor>,
    elements: HashMap<ElementId, ElementDef>,
    classes: ClassRegistry,
    next_actor: u64,
    next_element: u64,
}

impl Default for SceneWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneWorld {
    pub fn new() -> Self {
        Self {
            actors: BTreeMap::new(),
            elements: HashMap::new(),
            classes: ClassRegistry::new(),
            next_actor: 1,
            next_element: 1,
        }
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    pub fn classes_mut(&mut self) -> &mut ClassRegistry {
        &mut self.classes
    }

    /// Add an actor with an engine-assigned id.
    pub fn spawn_actor(&mut self, class: ClassId, pose: Iso, colliders: Vec<ColliderDef>) -> ActorId {
        while self.actors.contains_key(&ActorId(self.next_actor)) {
            self.next_actor += 1;
        }
        let id = ActorId(self.next_actor);
        self.next_actor += 1;
        self.insert_actor(id, class, pose, colliders);
        id
    }

    /// Add or replace an actor under a host-chosen id.
    ///
    /// Colliders whose shape can't be built are skipped with a warning.
    pub fn insert_actor(&mut self, id: ActorId, class: ClassId, pose: Iso, colliders: Vec<ColliderDef>) {
        let colliders = colliders
            .into_iter()
            .filter_map(|def| {
                let Some(shape) = shape_from_def(&def.shape) else {
                    log::warn!("actor {id:?}: skipping degenerate collider {:?}", def.shape);
                    return None;
                };
                let precise_shape = def.precise_shape.as_ref().and_then(shape_from_def);
                Some(SceneCollider {
                    shape,
                    precise_shape,
                    local_pose: def.local_pose,
                    category: def.category,
                    profile_name: def.profile_name,
                })
            })
            .collect();

        self.actors.insert(
            id,
            SceneActor {
                class,
                pose,
                colliders,
            },
        );
    }

    pub fn despawn_actor(&mut self, id: ActorId) -> bool {
        self.actors.remove(&id).is_some()
    }

    pub fn contains_actor(&self, id: ActorId) -> bool {
        self.actors.contains_key(&id)
    }

    pub fn set_actor_pose(&mut self, id: ActorId, pose: Iso) {
        if let Some(actor) = self.actors.get_mut(&id) {
            actor.pose = pose;
        }
    }

    pub fn actor_pose(&self, id: ActorId) -> Option<Iso> {
        self.actors.get(&id).map(|actor| actor.pose)
    }

    pub fn add_element(&mut self, def: ElementDef) -> ElementId {
        while self.elements.contains_key(&ElementId(self.next_element)) {
            self.next_element += 1;
        }
        let id = ElementId(self.next_element);
        self.next_element += 1;
        self.elements.insert(id, def);
        id
    }

    pub fn insert_element(&mut self, id: ElementId, def: ElementDef) {
        self.elements.insert(id, def);
    }

    /// Removing an element invalidates its handle; trackers skip it from then on.
    pub fn remove_element(&mut self, id: ElementId) -> bool {
        self.elements.remove(&id).is_some()
    }

    pub fn set_element_pose(&mut self, id: ElementId, pose: Iso) {
        if let Some(element) = self.elements.get_mut(&id) {
            element.pose = pose;
        }
    }

    /// Move an element by `offset` without rotating it.
    pub fn translate_element(&mut self, id: ElementId, offset: Vec3) {
        if let Some(element) = self.elements.get_mut(&id) {
            element.pose.translation.vector += offset;
        }
    }
}

impl CollisionScene for SceneWorld {
    fn element_is_valid(&self, element: ElementId) -> bool {
        self.elements.contains_key(&element)
    }

    fn socket_location(&self, element: ElementId, socket: &Socket) -> Option<Vec3> {
        let def = self.elements.get(&element)?;
        let origin = def.pose.translation.vector;
        match socket {
            Socket::Origin => Some(origin),
            Socket::Named(name) => match def.sockets.get(name) {
                Some(offset) => Some((def.pose * Point3::from(*offset)).coords),
                None => {
                    log::trace!("element {element:?} has no socket {name}, using its origin");
                    Some(origin)
                }
            },
        }
    }

    fn sphere_trace(&self, trace: &SphereTrace<'_>) -> Vec<TraceHit> {
        let swept = broad::swept_sphere_aabb(trace.start, trace.end, trace.radius, 0.0);
        let length = (trace.end - trace.start).norm();
        let mut hits = Vec::new();

        for (&actor_id, actor) in &self.actors {
            if trace.ignored_actors.contains(&actor_id) {
                continue;
            }

            for (index, collider) in actor.colliders.iter().enumerate() {
                if !trace.categories.accepts(collider.category) {
                    continue;
                }

                let shape: &dyn Shape = match (&collider.precise_shape, trace.precise) {
                    (Some(precise), true) => &**precise,
                    _ => &*collider.shape,
                };
                let pose = actor.pose * collider.local_pose;

                if !broad::aabb_intersects(&swept, &broad::shape_aabb_world(shape, &pose)) {
                    continue;
                }

                let Some(contact) =
                    cast_sphere_against_shape(trace.start, trace.end, trace.radius, shape, &pose)
                else {
                    continue;
                };

                hits.push(TraceHit {
                    actor: actor_id,
                    collider: index,
                    profile_name: collider.profile_name.clone(),
                    location: contact.location,
                    impact_point: contact.impact_point,
                    normal: contact.normal,
                    time_of_impact: contact.time_of_impact,
                    distance: if length * length > MIN_SWEEP_DISTANCE_SQ {
                        length * contact.time_of_impact
                    } else {
                        0.0
                    },
                    trace_start: trace.start,
                    trace_end: trace.end,
                    initial_overlap: contact.initial_overlap,
                });
            }
        }

        // Stable: equal times keep actor id / collider order.
        hits.sort_by(|a, b| a.time_of_impact.total_cmp(&b.time_of_impact));
        hits
    }

    fn actor_class(&self, actor: ActorId) -> Option<ClassId> {
        self.actors.get(&actor).map(|actor| actor.class)
    }

    fn is_class_child_of(&self, class: ClassId, ancestor: ClassId) -> bool {
        self.classes.is_child_of(class, ancestor)
    }
}
