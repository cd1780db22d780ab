//! Default tuning values for the collision handler and the rotation assist.
//!
//! Distances are in meters, time in seconds, angles in degrees.

/// Radius of the sphere swept between two socket samples.
pub const DEFAULT_TRACE_RADIUS: f32 = 0.1;

/// How often the sweep runs while collision is active (seconds).
pub const DEFAULT_TRACE_INTERVAL: f32 = 0.025;

/// Smallest radius used when drawing a hit location in debug mode.
pub const DEBUG_HIT_SPHERE_MIN_RADIUS: f32 = 0.08;

/// How long debug shapes stay visible (seconds).
pub const DEBUG_SHAPE_LIFETIME: f32 = 5.0;

/// Segments shorter than this (squared, m^2) are treated as a point: the sphere is tested
/// for overlap in place instead of being cast.
pub const MIN_SWEEP_DISTANCE_SQ: f32 = 1.0e-10;

/// Default rotation assist duration (seconds).
pub const DEFAULT_ROTATION_TIME: f32 = 0.5;

/// Default rotation assist angular rate (degrees per second).
pub const DEFAULT_DEGREES_PER_SECOND: f32 = 540.0;

/// Default rotation budget used by the budgeted start (degrees).
pub const DEFAULT_MAX_POSSIBLE_ROTATION: f32 = 180.0;

/// Duration used by the rotate-owner notify window; the window's end stops it first.
pub const ROTATE_WINDOW_TIME: f32 = 10.0;

/// Upper bound on class hierarchy depth walked by `is_child_of`.
pub const MAX_CLASS_DEPTH: usize = 64;
