//! Hosts the combat core on Bevy entities.
//!
//! A fighter carries a collision handler, a rotation assist and the notify track of the attack
//! being played. Each frame the track fires its notifies into those components, the weapon
//! elements are mirrored into the arena scene, and the handler's cadence runs against it.

use bevy::prelude::*;
use combat::{
    CollisionHandler, DesiredRotation, ElementId, NotifyTarget, NotifyTrack, RotatingOwner,
    RotatingOwnerComponent,
    notify::{
        ActivateCollisionWindow, ClearHitActorsNotify, Notify, RotateOwnerNotify,
        RotateOwnerWindow,
    },
    types::{CollisionPart, Quat as CoreQuat},
};

use crate::{
    arena::{ArenaScene, sync_actor_poses},
    convert::{iso_from_transform, quat_from_core, quat_to_core},
};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        (advance_attacks, animate_swings, tick_rotation_assist).chain(),
    );
    app.add_systems(
        PostUpdate,
        (sync_weapon_poses, tick_collision, replicate_collision_state)
            .chain()
            .after(sync_actor_poses),
    );
}

#[derive(Component, Deref, DerefMut)]
pub struct Collision(pub CollisionHandler);

#[derive(Component, Deref, DerefMut)]
pub struct RotationAssist(pub RotatingOwnerComponent);

/// Where the fighter wants to face, as a world-space point on the ground.
#[derive(Component, Debug, Default)]
pub struct Aim {
    pub point: Option<Vec3>,
}

impl Aim {
    fn rotation_from(&self, from: Vec3) -> Option<AimRotation> {
        let mut direction = self.point? - from;
        direction.y = 0.0;
        if direction.length_squared() <= 1.0e-6 {
            return None;
        }
        let facing = Transform::IDENTITY.looking_to(direction, Vec3::Y).rotation;
        Some(AimRotation(quat_to_core(facing)))
    }
}

struct AimRotation(CoreQuat);

impl DesiredRotation for AimRotation {
    fn desired_rotation(&self) -> CoreQuat {
        self.0
    }
}

/// A fighter's transform seen as a rotating owner.
struct FighterOwner<'a> {
    transform: &'a mut Transform,
    aim: Option<AimRotation>,
}

impl RotatingOwner for FighterOwner<'_> {
    fn rotation(&self) -> CoreQuat {
        quat_to_core(self.transform.rotation)
    }

    fn set_rotation(&mut self, rotation: CoreQuat) {
        self.transform.rotation = quat_from_core(rotation);
    }

    fn rotation_source(&self) -> Option<&dyn DesiredRotation> {
        self.aim.as_ref().map(|aim| aim as &dyn DesiredRotation)
    }
}

/// A weapon element attached to a fighter, mirrored into the arena scene.
#[derive(Component, Debug)]
pub struct Weapon {
    pub element: ElementId,
    pub fighter: Entity,
    /// Follows the attack's swing curve.
    pub swings: bool,
}

/// Yaw of the weapon over the attack, as `(time, degrees)` keys.
#[derive(Clone, Debug)]
pub struct SwingCurve(Vec<(f32, f32)>);

impl SwingCurve {
    fn yaw_at(&self, t: f32) -> f32 {
        let keys = &self.0;
        let Some(&(first_t, first_yaw)) = keys.first() else {
            return 0.0;
        };
        if t <= first_t {
            return first_yaw;
        }
        for pair in keys.windows(2) {
            let (t0, y0) = pair[0];
            let (t1, y1) = pair[1];
            if t <= t1 {
                let span = (t1 - t0).max(f32::EPSILON);
                return y0 + (y1 - y0) * ((t - t0) / span);
            }
        }
        keys.last().map_or(first_yaw, |&(_, yaw)| yaw)
    }
}

/// An attack: its notify timeline and how the weapon moves along it.
#[derive(Clone, Debug)]
pub struct Attack {
    pub track: NotifyTrack,
    pub swing: SwingCurve,
}

impl Attack {
    /// Quick slash and backhand; hits can land again on the way back.
    pub fn light() -> Self {
        Self {
            track: NotifyTrack::new(0.6)
                .with_instant(0.0, Notify::RotateOwner(RotateOwnerNotify::default()))
                .with_window(
                    0.1,
                    0.5,
                    Notify::ActivateCollision(ActivateCollisionWindow::default()),
                )
                .with_instant(0.3, Notify::ClearHitActors(ClearHitActorsNotify)),
            swing: SwingCurve(vec![(0.0, 70.0), (0.1, 70.0), (0.3, -70.0), (0.5, 70.0)]),
        }
    }

    /// Slow two-handed sweep; the fighter keeps turning toward the cursor while winding up.
    pub fn heavy() -> Self {
        Self {
            track: NotifyTrack::new(1.0)
                .with_window(
                    0.0,
                    0.4,
                    Notify::RotateOwnerWindow(RotateOwnerWindow {
                        degrees_per_second: 360.0,
                    }),
                )
                .with_window(
                    0.4,
                    0.7,
                    Notify::ActivateCollision(ActivateCollisionWindow {
                        part: CollisionPart::BothHandItems,
                    }),
                ),
            swing: SwingCurve(vec![(0.0, 90.0), (0.4, 100.0), (0.7, -100.0), (1.0, 30.0)]),
        }
    }
}

/// The attack currently played by a fighter, if any.
#[derive(Component, Debug, Default)]
pub struct CurrentAttack(pub Option<Attack>);

impl CurrentAttack {
    pub fn is_playing(&self) -> bool {
        self.0.as_ref().is_some_and(|attack| attack.track.is_playing())
    }
}

/// Resting yaw of weapons between attacks.
const IDLE_SWING_YAW: f32 = 30.0;

/// Start `attack` on a fighter, closing any window the previous attack left open.
pub fn play_attack(
    current: &mut CurrentAttack,
    mut attack: Attack,
    collision: &mut CollisionHandler,
    rotation: &mut RotatingOwnerComponent,
    scene: &ArenaScene,
) {
    let mut target = NotifyTarget {
        collision: Some(collision),
        rotation: Some(rotation),
    };
    if let Some(previous) = current.0.as_mut() {
        for dispatch in previous.track.stop() {
            dispatch.apply(&mut target, &scene.0);
        }
    }
    for dispatch in attack.track.play() {
        dispatch.apply(&mut target, &scene.0);
    }
    current.0 = Some(attack);
}

fn advance_attacks(
    time: Res<Time>,
    scene: Res<ArenaScene>,
    mut fighters: Query<(&mut CurrentAttack, &mut Collision, &mut RotationAssist)>,
) {
    let dt = time.delta_secs();
    for (mut current, mut collision, mut rotation) in &mut fighters {
        let Some(attack) = current.0.as_mut() else {
            continue;
        };
        let dispatches = attack.track.advance(dt);
        let mut target = NotifyTarget {
            collision: Some(&mut collision.0),
            rotation: Some(&mut rotation.0),
        };
        for dispatch in dispatches {
            dispatch.apply(&mut target, &scene.0);
        }
    }
}

fn animate_swings(
    fighters: Query<&CurrentAttack>,
    mut weapons: Query<(&Weapon, &mut Transform)>,
) {
    for (weapon, mut transform) in &mut weapons {
        if !weapon.swings {
            continue;
        }
        let Ok(current) = fighters.get(weapon.fighter) else {
            continue;
        };
        let yaw = match current.0.as_ref() {
            Some(attack) if attack.track.is_playing() => attack.swing.yaw_at(attack.track.time()),
            _ => IDLE_SWING_YAW,
        };
        transform.rotation = Quat::from_rotation_y(yaw.to_radians());
    }
}

fn tick_rotation_assist(
    time: Res<Time>,
    mut fighters: Query<(&mut RotationAssist, &mut Transform, &Aim)>,
) {
    let dt = time.delta_secs();
    for (mut rotation, mut transform, aim) in &mut fighters {
        if !rotation.is_rotating() {
            continue;
        }
        let aim = aim.rotation_from(transform.translation);
        let mut owner = FighterOwner {
            transform: &mut *transform,
            aim,
        };
        rotation.tick(dt, &mut owner);
    }
}

/// Weapons hang off their fighter; their world pose is the fighter's pose times their own.
fn sync_weapon_poses(
    mut scene: ResMut<ArenaScene>,
    fighters: Query<&Transform, Without<Weapon>>,
    weapons: Query<(&Weapon, &Transform)>,
) {
    for (weapon, local) in &weapons {
        let Ok(fighter) = fighters.get(weapon.fighter) else {
            continue;
        };
        let world = fighter.mul_transform(*local);
        scene.set_element_pose(weapon.element, iso_from_transform(&world));
    }
}

pub(crate) fn tick_collision(
    time: Res<Time>,
    scene: Res<ArenaScene>,
    mut fighters: Query<&mut Collision>,
) {
    let dt = time.delta_secs();
    for mut collision in &mut fighters {
        collision.tick(dt, &scene.0);
    }
}

/// Authority-side state changes; a networked host would ship these to observers.
fn replicate_collision_state(mut fighters: Query<(Entity, &mut Collision)>) {
    for (entity, mut collision) in &mut fighters {
        for msg in collision.drain_sync() {
            debug!("{entity:?} collision state changed: {msg:?}");
        }
    }
}
