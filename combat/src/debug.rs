//! Debug shapes recorded by the collision handler when `debug` is enabled.
//!
//! The core has no renderer; the host drains the recorded shapes and draws them however it
//! likes (gizmos, lines, a replay file).

use crate::{
    constants::{DEBUG_HIT_SPHERE_MIN_RADIUS, DEBUG_SHAPE_LIFETIME},
    types::Vec3,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DebugShape {
    /// A traced segment, drawn as a cylinder of the trace radius.
    TraceCylinder { start: Vec3, end: Vec3, radius: f32 },
    /// Where a reported hit happened.
    HitSphere { location: Vec3, radius: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimedDebugShape {
    pub shape: DebugShape,
    /// Seconds the shape should stay visible.
    pub lifetime: f32,
}

#[derive(Clone, Debug, Default)]
pub struct DebugShapes {
    shapes: Vec<TimedDebugShape>,
}

impl DebugShapes {
    pub fn trace(&mut self, start: Vec3, end: Vec3, radius: f32) {
        self.push(DebugShape::TraceCylinder { start, end, radius });
    }

    pub fn hit(&mut self, location: Vec3, trace_radius: f32) {
        self.push(DebugShape::HitSphere {
            location,
            radius: trace_radius.max(DEBUG_HIT_SPHERE_MIN_RADIUS),
        });
    }

    fn push(&mut self, shape: DebugShape) {
        self.shapes.push(TimedDebugShape {
            shape,
            lifetime: DEBUG_SHAPE_LIFETIME,
        });
    }

    pub fn drain(&mut self) -> Vec<TimedDebugShape> {
        std::mem::take(&mut self.shapes)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}
