/*!
Core types and math aliases shared by the collision handler, the scene backend and the
rotation assist.

This module intentionally contains no algorithms. It defines the data types exchanged
between:
- the scene (physics backend answering socket lookups and sphere traces)
- the collision handler (activation window, socket cache, sweep)
- the host (whatever drives the update loop and replicates state)

Handles (`ActorId`, `ElementId`) are opaque. The core never owns what they point to; it
only asks the scene whether they are still valid.
*/

use nalgebra as na;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;

/// Build an isometry from a translation and rotation.
#[inline]
pub fn iso_from(translation: Vec3, rotation: Quat) -> Iso {
    Iso::from_parts(
        na::Translation3::new(translation.x, translation.y, translation.z),
        rotation,
    )
}

/// Opaque handle to a hittable object in the scene.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u64);

/// Opaque handle to a moving element (a mesh, a weapon, a limb) that carries sockets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

/// Runtime type of an actor. Classes form a single-inheritance tree, see
/// [`crate::class::ClassRegistry`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(pub u32);

/// A sampled point on a moving element.
///
/// `Origin` is the sentinel used when a surface is tracked without any named socket: its
/// position is the element's own origin rather than a named attachment point.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Socket {
    Origin,
    Named(String),
}

impl Socket {
    pub fn named(name: impl Into<String>) -> Self {
        Socket::Named(name.into())
    }

    #[inline]
    pub fn is_origin(&self) -> bool {
        matches!(self, Socket::Origin)
    }
}

impl fmt::Display for Socket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Socket::Origin => f.write_str("<origin>"),
            Socket::Named(name) => f.write_str(name),
        }
    }
}

/// Unique key of a tracked socket: the element it lives on plus its name.
///
/// Two elements using the same socket names never share a cache slot.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SocketKey {
    pub element: ElementId,
    pub socket: Socket,
}

impl SocketKey {
    pub fn new(element: ElementId, socket: Socket) -> Self {
        Self { element, socket }
    }
}

/// Which part of the body or which weapon is currently dealing damage.
///
/// The host decides what each value maps to; e.g. on `PrimaryItem` it tracks the sword,
/// on `LeftLeg` the character's left foot.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollisionPart {
    #[default]
    None = 0,
    /// Sword in right hand.
    PrimaryItem = 1,
    /// Shield in left hand.
    SecondaryItem = 2,
    /// Both dual weapons.
    BothHandItems = 3,
    LeftArm = 4,
    RightArm = 5,
    LeftLeg = 6,
    RightLeg = 7,
    Custom1 = 8,
    Custom2 = 9,
    Custom3 = 10,
}

/// A single hit reported by a sphere trace.
#[derive(Clone, Debug, PartialEq)]
pub struct TraceHit {
    /// Actor owning the collider that was hit.
    pub actor: ActorId,
    /// Index of the hit collider within its actor.
    pub collider: usize,
    /// Collision profile name of the hit collider (e.g. "Pawn", "CharacterMesh").
    pub profile_name: String,
    /// Center of the swept sphere at the time of impact.
    pub location: Vec3,
    /// World-space contact point on the hit collider.
    pub impact_point: Vec3,
    /// World-space contact normal on the hit collider.
    pub normal: Vec3,
    /// Fraction (0..1) of the trace segment where the hit occurred.
    pub time_of_impact: f32,
    /// Distance travelled along the trace before the hit (meters).
    pub distance: f32,
    pub trace_start: Vec3,
    pub trace_end: Vec3,
    /// True when the sphere already overlapped the collider at `trace_start`.
    pub initial_overlap: bool,
}

/// Hit event payload: the trace result plus the moving element that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct HitEvent {
    pub hit: TraceHit,
    pub element: ElementId,
}
