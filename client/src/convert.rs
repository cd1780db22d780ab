//! Conversions between Bevy's math types and the core's nalgebra types.

use bevy::prelude::*;
use combat::types as core;
use nalgebra::{Quaternion, Translation3};

#[inline]
pub fn vec_to_core(v: Vec3) -> core::Vec3 {
    core::Vec3::new(v.x, v.y, v.z)
}

#[inline]
pub fn vec_from_core(v: core::Vec3) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

#[inline]
pub fn quat_to_core(q: Quat) -> core::Quat {
    core::Quat::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z))
}

#[inline]
pub fn quat_from_core(q: core::Quat) -> Quat {
    let q = q.quaternion();
    Quat::from_xyzw(q.i, q.j, q.k, q.w).normalize()
}

/// Pose of a transform, ignoring scale.
pub fn iso_from_transform(transform: &Transform) -> core::Iso {
    core::Iso::from_parts(
        Translation3::new(
            transform.translation.x,
            transform.translation.y,
            transform.translation.z,
        ),
        quat_to_core(transform.rotation),
    )
}
