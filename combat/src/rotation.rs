/*!
Rotation assist: turn the owner toward a desired orientation at a capped angular rate.

The owner supplies its target through [`DesiredRotation`]; an owner that stops supplying one
simply ends the task. Typical use is a short window during an attack animation so the
character can still be aimed while committed to the swing.
*/

use crate::{config::RotationSettings, events::RotationEvents, types::Quat};

/// Capability of an owner that knows where it wants to face.
pub trait DesiredRotation {
    fn desired_rotation(&self) -> Quat;
}

/// The object a [`RotatingOwnerComponent`] rotates.
pub trait RotatingOwner {
    fn rotation(&self) -> Quat;
    fn set_rotation(&mut self, rotation: Quat);

    /// `None` when the owner cannot currently supply a target orientation.
    fn rotation_source(&self) -> Option<&dyn DesiredRotation> {
        None
    }
}

/// Rotate `current` toward `target` by at most `degrees_per_second * dt`, never overshooting.
///
/// A non-positive rate snaps straight to the target. A non-positive `dt` leaves `current`
/// unchanged.
pub fn rotate_towards_constant(current: Quat, target: Quat, dt: f32, degrees_per_second: f32) -> Quat {
    if degrees_per_second <= 0.0 {
        return target;
    }
    if dt <= 0.0 {
        return current;
    }

    let delta = current.rotation_to(&target);
    let remaining = delta.angle();
    let max_step = degrees_per_second.to_radians() * dt;
    if remaining <= max_step {
        return target;
    }
    delta.powf(max_step / remaining) * current
}

#[derive(Debug)]
pub struct RotatingOwnerComponent {
    pub settings: RotationSettings,
    pub events: RotationEvents,
    elapsed: f32,
    duration: f32,
    degrees_per_second: f32,
    running: bool,
}

impl Default for RotatingOwnerComponent {
    fn default() -> Self {
        Self::new(RotationSettings::default())
    }
}

impl RotatingOwnerComponent {
    pub fn new(settings: RotationSettings) -> Self {
        let degrees_per_second = settings.degrees_per_second;
        Self {
            settings,
            events: RotationEvents::default(),
            elapsed: 0.0,
            duration: 0.0,
            degrees_per_second,
            running: false,
        }
    }

    #[inline]
    pub fn is_rotating(&self) -> bool {
        self.running
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn degrees_per_second(&self) -> f32 {
        self.degrees_per_second
    }

    /// Rotate for `duration` seconds at up to `degrees_per_second`.
    ///
    /// Starting while already rotating restarts the clock with the new parameters and fires
    /// no event: a restart broadcasts neither `on_end` nor another `on_start`, so `on_start`
    /// counts rotations rather than calls.
    pub fn start(&mut self, duration: f32, degrees_per_second: f32) {
        self.duration = duration;
        self.degrees_per_second = degrees_per_second;
        self.elapsed = 0.0;
        if self.running {
            log::debug!("rotation restarted for {duration}s at {degrees_per_second} deg/s");
            return;
        }
        self.running = true;
        log::debug!("rotation started for {duration}s at {degrees_per_second} deg/s");
        self.events.on_start.broadcast(&());
    }

    /// Rotate for as long as it takes to turn `max_degrees` at `degrees_per_second`.
    pub fn start_with_limit(&mut self, max_degrees: f32, degrees_per_second: f32) {
        if degrees_per_second <= 0.0 {
            log::warn!("refusing to start rotation with rate {degrees_per_second} deg/s");
            return;
        }
        self.start(max_degrees / degrees_per_second, degrees_per_second);
    }

    pub fn start_default(&mut self) {
        self.start(self.settings.rotating_time, self.settings.degrees_per_second);
    }

    pub fn start_with_limit_default(&mut self) {
        self.start_with_limit(
            self.settings.max_possible_rotation,
            self.settings.degrees_per_second,
        );
    }

    /// Stop rotating. Does nothing if not rotating.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        log::debug!("rotation ended after {}s", self.elapsed);
        self.events.on_end.broadcast(&());
    }

    /// Per-frame update.
    pub fn tick(&mut self, dt: f32, owner: &mut impl RotatingOwner) {
        if !self.running {
            return;
        }
        let Some(target) = owner.rotation_source().map(|source| source.desired_rotation()) else {
            self.stop();
            return;
        };

        let next = rotate_towards_constant(owner.rotation(), target, dt, self.degrees_per_second);
        self.elapsed += dt;
        if self.elapsed <= self.duration {
            owner.set_rotation(next);
        } else {
            self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vec3;
    use approx::assert_relative_eq;
    use std::sync::{Arc, Mutex};

    struct Target(Quat);

    impl DesiredRotation for Target {
        fn desired_rotation(&self) -> Quat {
            self.0
        }
    }

    struct Pawn {
        rotation: Quat,
        target: Option<Target>,
    }

    impl Pawn {
        fn facing(target_yaw_degrees: f32) -> Self {
            Self {
                rotation: Quat::identity(),
                target: Some(Target(yaw(target_yaw_degrees))),
            }
        }
    }

    impl RotatingOwner for Pawn {
        fn rotation(&self) -> Quat {
            self.rotation
        }

        fn set_rotation(&mut self, rotation: Quat) {
            self.rotation = rotation;
        }

        fn rotation_source(&self) -> Option<&dyn DesiredRotation> {
            self.target.as_ref().map(|t| t as &dyn DesiredRotation)
        }
    }

    fn yaw(degrees: f32) -> Quat {
        Quat::from_axis_angle(&Vec3::y_axis(), degrees.to_radians())
    }

    fn counters(component: &mut RotatingOwnerComponent) -> (Arc<Mutex<u32>>, Arc<Mutex<u32>>) {
        let starts = Arc::new(Mutex::new(0));
        let ends = Arc::new(Mutex::new(0));
        let s = starts.clone();
        component.events.on_start.subscribe(move |_| *s.lock().unwrap() += 1);
        let e = ends.clone();
        component.events.on_end.subscribe(move |_| *e.lock().unwrap() += 1);
        (starts, ends)
    }

    #[test]
    fn rotate_towards_constant_caps_the_step() {
        let next = rotate_towards_constant(Quat::identity(), yaw(90.0), 0.1, 100.0);
        assert_relative_eq!(next.angle_to(&Quat::identity()), 10f32.to_radians(), epsilon = 1e-4);
        assert_relative_eq!(next.angle_to(&yaw(90.0)), 80f32.to_radians(), epsilon = 1e-4);
    }

    #[test]
    fn rotate_towards_constant_never_overshoots() {
        let next = rotate_towards_constant(Quat::identity(), yaw(5.0), 1.0, 540.0);
        assert_relative_eq!(next.angle_to(&yaw(5.0)), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn rotate_towards_constant_edge_rates() {
        let snapped = rotate_towards_constant(Quat::identity(), yaw(120.0), 0.01, 0.0);
        assert_relative_eq!(snapped.angle_to(&yaw(120.0)), 0.0, epsilon = 1e-5);

        let unchanged = rotate_towards_constant(yaw(30.0), yaw(120.0), 0.0, 540.0);
        assert_relative_eq!(unchanged.angle_to(&yaw(30.0)), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn half_turn_target_is_reachable() {
        let mut rotation = Quat::identity();
        for _ in 0..20 {
            rotation = rotate_towards_constant(rotation, yaw(180.0), 0.1, 100.0);
        }
        assert_relative_eq!(rotation.angle_to(&yaw(180.0)), 0.0, epsilon = 1e-3);
    }

    #[test]
    fn remaining_angle_never_increases_and_task_ends_on_time() {
        let mut pawn = Pawn::facing(170.0);
        let mut component = RotatingOwnerComponent::new(RotationSettings::default());
        let (_, ends) = counters(&mut component);

        let dt = 1.0 / 64.0;
        let duration = 0.25;
        component.start(duration, 180.0);

        let mut remaining = pawn.rotation.angle_to(&yaw(170.0));
        let mut t = 0.0;
        while component.is_rotating() {
            component.tick(dt, &mut pawn);
            t += dt;
            let now = pawn.rotation.angle_to(&yaw(170.0));
            assert!(now <= remaining + 1e-5);
            remaining = now;
            assert!(t <= duration + dt + 1e-6);
        }

        assert_eq!(*ends.lock().unwrap(), 1);
        // 0.25 s at 180 deg/s covers 45 degrees of the 170.
        assert_relative_eq!(remaining, 125f32.to_radians(), epsilon = 1e-3);
    }

    #[test]
    fn owner_without_target_stops_the_task() {
        let mut pawn = Pawn::facing(90.0);
        pawn.target = None;
        let mut component = RotatingOwnerComponent::default();
        let (starts, ends) = counters(&mut component);

        component.start(1.0, 540.0);
        component.tick(0.016, &mut pawn);
        assert!(!component.is_rotating());
        assert_eq!(pawn.rotation, Quat::identity());
        assert_eq!(*starts.lock().unwrap(), 1);
        assert_eq!(*ends.lock().unwrap(), 1);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut component = RotatingOwnerComponent::default();
        let (_, ends) = counters(&mut component);
        component.stop();
        component.start(1.0, 540.0);
        component.stop();
        component.stop();
        assert_eq!(*ends.lock().unwrap(), 1);
    }

    #[test]
    fn restart_while_running_resets_without_events() {
        let mut pawn = Pawn::facing(90.0);
        let mut component = RotatingOwnerComponent::default();
        let (starts, ends) = counters(&mut component);

        component.start(1.0, 540.0);
        component.tick(0.5, &mut pawn);
        component.start(2.0, 90.0);
        assert_eq!(component.elapsed(), 0.0);
        assert_eq!(component.duration(), 2.0);
        assert_eq!(component.degrees_per_second(), 90.0);
        assert_eq!(*starts.lock().unwrap(), 1);
        assert_eq!(*ends.lock().unwrap(), 0);
    }

    #[test]
    fn start_with_limit_derives_duration() {
        let mut component = RotatingOwnerComponent::new(RotationSettings::default());
        component.start_with_limit_default();
        assert!(component.is_rotating());
        assert_relative_eq!(component.duration(), 180.0 / 540.0);

        let mut refused = RotatingOwnerComponent::default();
        refused.start_with_limit(180.0, 0.0);
        assert!(!refused.is_rotating());
    }
}
