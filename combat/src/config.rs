/*!
Tunable settings for the collision handler and the rotation assist.

Settings are plain data: constructed in code, or loaded from a RON file so designers can tune
weapons without recompiling. Every field has a default matching [`crate::constants`].
*/

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    bitmask_flags::{CategoryMask, CollisionCategory},
    constants::{
        DEFAULT_DEGREES_PER_SECOND, DEFAULT_MAX_POSSIBLE_ROTATION, DEFAULT_ROTATION_TIME,
        DEFAULT_TRACE_INTERVAL, DEFAULT_TRACE_RADIUS,
    },
    types::{ActorId, ClassId},
};

/// Settings of a [`crate::collision_handler::CollisionHandler`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionSettings {
    /// Radius of the sphere swept between socket samples (meters).
    pub trace_radius: f32,
    /// How often the sweep runs while collision is active (seconds).
    pub trace_interval: f32,
    /// Trace against precise geometry when a collider provides it.
    pub trace_precise: bool,
    /// Categories of colliders that can be hit (e.g. `Pawn`, `WorldStatic`).
    pub collide_with: Vec<CollisionCategory>,
    /// Actors that are never hit.
    pub ignored_actors: Vec<ActorId>,
    /// Actors of these classes, or subtypes of them, are never hit (e.g. friendly AI).
    pub ignored_classes: Vec<ClassId>,
    /// Colliders using these profiles are never hit.
    ///
    /// Useful to skip a character's movement capsule ("Pawn") and only collide with its mesh
    /// ("CharacterMesh").
    pub ignored_profile_names: Vec<String>,
    /// Record debug shapes for every trace and hit.
    pub debug: bool,
}

impl Default for CollisionSettings {
    fn default() -> Self {
        Self {
            trace_radius: DEFAULT_TRACE_RADIUS,
            trace_interval: DEFAULT_TRACE_INTERVAL,
            trace_precise: false,
            collide_with: vec![CollisionCategory::Pawn],
            ignored_actors: Vec::new(),
            ignored_classes: Vec::new(),
            ignored_profile_names: Vec::new(),
            debug: false,
        }
    }
}

impl CollisionSettings {
    pub fn category_mask(&self) -> CategoryMask {
        CategoryMask::from_tags(&self.collide_with)
    }

    pub fn is_ignored_profile(&self, profile_name: &str) -> bool {
        self.ignored_profile_names
            .iter()
            .any(|name| name == profile_name)
    }
}

/// Settings of a [`crate::rotation::RotatingOwnerComponent`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationSettings {
    /// Duration used by `start_default` (seconds).
    pub rotating_time: f32,
    /// Angular rate cap (degrees per second).
    pub degrees_per_second: f32,
    /// Rotation budget used by `start_with_limit_default` (degrees).
    pub max_possible_rotation: f32,
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self {
            rotating_time: DEFAULT_ROTATION_TIME,
            degrees_per_second: DEFAULT_DEGREES_PER_SECOND,
            max_possible_rotation: DEFAULT_MAX_POSSIBLE_ROTATION,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub collision: CollisionSettings,
    pub rotation: RotationSettings,
}

/// Configuration errors.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),
}

impl CombatConfig {
    pub fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(contents)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(self, Default::default())?)
    }
}
