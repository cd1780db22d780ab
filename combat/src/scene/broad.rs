use rapier3d::{
    na::Point3,
    parry::{bounding_volume::Aabb, shape::Shape},
};

use crate::types::{Iso, Vec3};

/// World-space AABB of a shape placed at `pose`.
#[inline]
pub fn shape_aabb_world(shape: &dyn Shape, pose: &Iso) -> Aabb {
    shape.compute_aabb(pose)
}

/// Compute a swept AABB for a sphere moving from `start` to `end`.
///
/// The resulting AABB is inflated by `skin` to conservatively include near misses.
pub fn swept_sphere_aabb(start: Vec3, end: Vec3, radius: f32, skin: f32) -> Aabb {
    let reach = radius.max(0.0) + skin.max(0.0);
    let delta = Vec3::new(reach, reach, reach);
    let mins = start.inf(&end) - delta;
    let maxs = start.sup(&end) + delta;
    Aabb {
        mins: Point3::from(mins),
        maxs: Point3::from(maxs),
    }
}

/// Test two AABBs for intersection.
pub fn aabb_intersects(a: &Aabb, b: &Aabb) -> bool {
    !(a.maxs.x < b.mins.x
        || a.mins.x > b.maxs.x
        || a.maxs.y < b.mins.y
        || a.mins.y > b.maxs.y
        || a.maxs.z < b.mins.z
        || a.mins.z > b.maxs.z)
}
