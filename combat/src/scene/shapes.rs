use rapier3d::{na::Point3, parry::shape::SharedShape, prelude::UnitVector};
use serde::{Deserialize, Serialize};

use crate::types::Vec3;

/// Supported collider shapes, in the collider's local space.
///
/// Keep this intentionally small. Extend as needed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ColliderShapeDef {
    /// Infinite plane (half-space) whose outward normal is the collider's local +Y.
    Plane,

    /// Oriented cuboid with given half-extents (meters).
    Cuboid { half_extents: Vec3 },

    /// Sphere/ball (meters).
    Sphere { radius: f32 },

    /// Y-aligned capsule (meters).
    CapsuleY { radius: f32, half_height: f32 },

    /// Y-aligned cylinder (meters).
    CylinderY { radius: f32, half_height: f32 },

    /// Rounded cuboid (meters).
    ///
    /// `border_radius` rounds all edges/corners.
    RoundCuboid {
        half_extents: Vec3,
        border_radius: f32,
    },

    /// Convex hull of a point cloud. Typically used as precise geometry for meshes.
    ConvexHull { points: Vec<Vec3> },
}

/// Build a parry shape from a definition.
///
/// Returns `None` for degenerate convex hulls (fewer than four non-coplanar points).
pub fn shape_from_def(def: &ColliderShapeDef) -> Option<SharedShape> {
    let shape = match def {
        ColliderShapeDef::Plane => SharedShape::halfspace(UnitVector::new_normalize(Vec3::y())),

        ColliderShapeDef::Cuboid { half_extents } => {
            SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }

        ColliderShapeDef::Sphere { radius } => SharedShape::ball(*radius),

        ColliderShapeDef::CapsuleY {
            radius,
            half_height,
        } => SharedShape::capsule_y(*half_height, *radius),

        ColliderShapeDef::CylinderY {
            radius,
            half_height,
        } => SharedShape::cylinder(*half_height, *radius),

        ColliderShapeDef::RoundCuboid {
            half_extents,
            border_radius,
        } => SharedShape::round_cuboid(
            half_extents.x,
            half_extents.y,
            half_extents.z,
            *border_radius,
        ),

        ColliderShapeDef::ConvexHull { points } => {
            if points.len() < 4 {
                return None;
            }
            let points: Vec<Point3<f32>> = points.iter().map(|p| Point3::from(*p)).collect();
            return SharedShape::convex_hull(&points);
        }
    };
    Some(shape)
}
