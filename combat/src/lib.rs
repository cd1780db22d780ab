pub mod bitmask_flags;
pub mod cadence;
pub mod class;
pub mod collision_handler;
pub mod config;
pub mod constants;
pub mod debug;
pub mod events;
pub mod notify;
pub mod rotation;
pub mod scene;
pub mod types;

pub use bitmask_flags::{BitmaskFlags, CategoryMask, CollisionCategory, FlagBitmask};
pub use collision_handler::{
    ActivationState, CollisionHandler, NetRole, StateSync, SurfaceRegistry, TrackedSurface,
};
pub use config::{CollisionSettings, CombatConfig, ConfigError, RotationSettings};
pub use constants::{
    DEFAULT_DEGREES_PER_SECOND, DEFAULT_MAX_POSSIBLE_ROTATION, DEFAULT_ROTATION_TIME,
    DEFAULT_TRACE_INTERVAL, DEFAULT_TRACE_RADIUS,
};
pub use debug::{DebugShape, TimedDebugShape};
pub use events::{CollisionEvents, ListenerId, Multicast, RotationEvents};
pub use notify::{Notify, NotifyDispatch, NotifyPhase, NotifyTarget, NotifyTrack};
pub use rotation::{DesiredRotation, RotatingOwner, RotatingOwnerComponent, rotate_towards_constant};
pub use scene::{CollisionScene, SceneWorld, SphereTrace};
pub use types::{
    ActorId, ClassId, CollisionPart, ElementId, HitEvent, Iso, Quat, Socket, SocketKey, TraceHit,
    Vec3, iso_from,
};
