//! Draws the handler's debug shapes with gizmos until their lifetime runs out.

use bevy::prelude::*;
use combat::{DebugShape, TimedDebugShape};

use crate::{
    convert::vec_from_core,
    fighter::{Collision, tick_collision},
};

const TRACE_COLOR: Color = Color::srgb(0.2, 0.9, 0.2);
const HIT_COLOR: Color = Color::srgb(1.0, 0.1, 0.1);

#[derive(Resource, Default)]
struct DebugShapeBuffer(Vec<TimedDebugShape>);

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<DebugShapeBuffer>();
    app.add_systems(
        PostUpdate,
        (collect_debug_shapes.after(tick_collision), draw_debug_shapes).chain(),
    );
}

fn collect_debug_shapes(
    mut buffer: ResMut<DebugShapeBuffer>,
    mut fighters: Query<&mut Collision>,
) {
    for mut collision in &mut fighters {
        buffer.0.extend(collision.drain_debug_shapes());
    }
}

fn draw_debug_shapes(time: Res<Time>, mut buffer: ResMut<DebugShapeBuffer>, mut gizmos: Gizmos) {
    let dt = time.delta_secs();
    buffer.0.retain_mut(|timed| {
        match timed.shape {
            DebugShape::TraceCylinder { start, end, radius } => {
                let (start, end) = (vec_from_core(start), vec_from_core(end));
                gizmos.line(start, end, TRACE_COLOR);
                gizmos.sphere(Isometry3d::from_translation(start), radius, TRACE_COLOR);
                gizmos.sphere(Isometry3d::from_translation(end), radius, TRACE_COLOR);
            }
            DebugShape::HitSphere { location, radius } => {
                gizmos.sphere(
                    Isometry3d::from_translation(vec_from_core(location)),
                    radius,
                    HIT_COLOR,
                );
            }
        }
        timed.lifetime -= dt;
        timed.lifetime > 0.0
    });
}
