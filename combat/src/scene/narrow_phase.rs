use rapier3d::parry::{
    query::{self, ShapeCastOptions},
    shape::{Ball, Shape},
};

use crate::{
    constants::MIN_SWEEP_DISTANCE_SQ,
    types::{Iso, Vec3},
};

/// Contact found by [`cast_sphere_against_shape`], in world space.
#[derive(Clone, Copy, Debug)]
pub struct SphereContact {
    /// Fraction (0..1) of the segment where the hit occurs.
    pub time_of_impact: f32,
    /// Center of the sphere at the time of impact.
    pub location: Vec3,
    /// Contact point on the target shape.
    pub impact_point: Vec3,
    /// Contact normal on the target shape.
    pub normal: Vec3,
    /// The sphere already touched the shape at the segment start.
    pub initial_overlap: bool,
}

/// Cast a sphere of `radius` from `start` to `end` against a single shape placed at `pose`.
///
/// Initial penetration is reported as a hit at time 0. A segment with no length degenerates
/// to an overlap test at `start`.
pub fn cast_sphere_against_shape(
    start: Vec3,
    end: Vec3,
    radius: f32,
    shape: &dyn Shape,
    pose: &Iso,
) -> Option<SphereContact> {
    let ball = Ball::new(radius.max(0.0));
    let ball_iso = Iso::translation(start.x, start.y, start.z);
    let vel = end - start;

    if vel.norm_squared() <= MIN_SWEEP_DISTANCE_SQ {
        return overlap_sphere_with_shape(start, &ball, &ball_iso, shape, pose);
    }

    let mut opts = ShapeCastOptions::with_max_time_of_impact(1.0);
    opts.stop_at_penetration = true;

    let hit = match query::cast_shapes(
        &ball_iso,
        &vel,
        &ball as &dyn Shape,
        pose,
        &Vec3::zeros(),
        shape,
        opts,
    ) {
        Ok(Some(hit)) => hit,
        Ok(None) => return None,
        Err(unsupported) => {
            log::trace!("sphere cast unsupported against this shape: {unsupported:?}");
            return None;
        }
    };

    // Witnesses and normals come back in each shape's local space.
    let location = start + vel * hit.time_of_impact;
    let impact_point = (pose * hit.witness2).coords;
    let normal = pose.rotation * hit.normal2.into_inner();

    Some(SphereContact {
        time_of_impact: hit.time_of_impact,
        location,
        impact_point,
        normal,
        initial_overlap: hit.time_of_impact <= 0.0,
    })
}

fn overlap_sphere_with_shape(
    center: Vec3,
    ball: &Ball,
    ball_iso: &Iso,
    shape: &dyn Shape,
    pose: &Iso,
) -> Option<SphereContact> {
    let contact = match query::contact(ball_iso, ball as &dyn Shape, pose, shape, 0.0) {
        Ok(Some(contact)) => contact,
        Ok(None) => return None,
        Err(unsupported) => {
            log::trace!("sphere overlap unsupported against this shape: {unsupported:?}");
            return None;
        }
    };

    // Contact points and normals are already in world space.
    Some(SphereContact {
        time_of_impact: 0.0,
        location: center,
        impact_point: contact.point2.coords,
        normal: contact.normal2.into_inner(),
        initial_overlap: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rapier3d::parry::shape::Cuboid;

    #[test]
    fn sphere_passing_through_a_box_hits_at_its_face() {
        let cuboid = Cuboid::new(Vec3::new(0.5, 0.5, 0.5));
        let pose = Iso::identity();
        let contact = cast_sphere_against_shape(
            Vec3::new(-2.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            0.1,
            &cuboid,
            &pose,
        )
        .expect("segment crosses the box");

        // Sphere surface touches x = -0.5 when its center is at x = -0.6.
        assert!((contact.location.x - -0.6).abs() < 1e-3);
        assert!((contact.time_of_impact - 0.35).abs() < 1e-3);
        assert!(contact.normal.x < -0.99);
        assert!(!contact.initial_overlap);
    }

    #[test]
    fn sphere_missing_a_box_reports_nothing() {
        let cuboid = Cuboid::new(Vec3::new(0.5, 0.5, 0.5));
        let pose = Iso::translation(0.0, 3.0, 0.0);
        assert!(
            cast_sphere_against_shape(
                Vec3::new(-2.0, 0.0, 0.0),
                Vec3::new(2.0, 0.0, 0.0),
                0.1,
                &cuboid,
                &pose,
            )
            .is_none()
        );
    }

    #[test]
    fn starting_inside_is_an_initial_overlap() {
        let ball = Ball::new(1.0);
        let contact = cast_sphere_against_shape(
            Vec3::new(0.2, 0.0, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
            0.1,
            &ball,
            &Iso::identity(),
        )
        .expect("starts inside the ball");
        assert_eq!(contact.time_of_impact, 0.0);
        assert!(contact.initial_overlap);
    }

    #[test]
    fn stationary_sphere_reports_overlap_only() {
        let cuboid = Cuboid::new(Vec3::new(0.5, 0.5, 0.5));
        let pose = Iso::identity();
        let inside = Vec3::new(0.55, 0.0, 0.0);
        let contact = cast_sphere_against_shape(inside, inside, 0.1, &cuboid, &pose)
            .expect("sphere touches the box face");
        assert_eq!(contact.time_of_impact, 0.0);
        assert!(contact.initial_overlap);
        assert_eq!(contact.location, inside);

        let outside = Vec3::new(2.0, 0.0, 0.0);
        assert!(cast_sphere_against_shape(outside, outside, 0.1, &cuboid, &pose).is_none());
    }
}
