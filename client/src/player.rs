use bevy::{prelude::*, window::PrimaryWindow};
use combat::{
    CollisionHandler, NetRole, RotatingOwnerComponent, TrackedSurface,
    scene::ElementDef,
};
use leafwing_input_manager::prelude::*;

use crate::{
    arena::{ALLY, ActorEntityMapping, ArenaActor, ArenaScene, PLAYER, character_collider},
    config::CombatSettings,
    convert::{iso_from_transform, vec_to_core},
    fighter::{Aim, Attack, Collision, CurrentAttack, RotationAssist, Weapon, play_attack},
    input::InputAction,
    messages::CombatInbox,
};

const MOVE_SPEED: f32 = 4.0;
const PLAYER_HEIGHT: f32 = 1.0;

/// Sword pivot relative to the player, and its sockets along the blade (-Z is forward).
const SWORD_PIVOT: Vec3 = Vec3::new(0.35, 0.2, -0.2);
const SWORD_LENGTH: f32 = 1.2;
const SWORD_SOCKETS: [(&str, f32); 3] = [("Base", 0.25), ("Mid", 0.7), ("Tip", 1.2)];

/// Off hand, tracked by its origin only.
const FIST_OFFSET: Vec3 = Vec3::new(-0.4, 0.1, -0.45);

#[derive(Component)]
pub struct Player;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, spawn_player);
    app.add_systems(
        Update,
        (move_player, update_aim, start_attack, draw_player_facing),
    );
}

fn spawn_player(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut scene: ResMut<ArenaScene>,
    mut mapping: ResMut<ActorEntityMapping>,
    settings: Res<CombatSettings>,
    inbox: Res<CombatInbox>,
) {
    let transform = Transform::from_xyz(0.0, PLAYER_HEIGHT, 0.0);
    let actor = scene.spawn_actor(PLAYER, iso_from_transform(&transform), vec![character_collider()]);

    let mut sword_def = ElementDef::new(iso_from_transform(&transform));
    for (name, distance) in SWORD_SOCKETS {
        sword_def = sword_def.with_socket(name, vec_to_core(Vec3::NEG_Z * distance));
    }
    let sword = scene.add_element(sword_def);
    let fist = scene.add_element(ElementDef::new(iso_from_transform(&transform)));

    let mut collision_settings = settings.collision.clone();
    collision_settings.ignored_classes.push(ALLY);
    let mut handler = CollisionHandler::new(Some(actor), collision_settings).with_role(NetRole::Authority);
    handler.set_tracked_surfaces(
        vec![
            TrackedSurface::with_socket_names(sword, &SWORD_SOCKETS.map(|(name, _)| name)),
            TrackedSurface::origin(fist),
        ],
        &scene.0,
    );
    let mut rotation = RotatingOwnerComponent::new(settings.rotation.clone());

    let player = commands
        .spawn((
            Name::new("Player"),
            Player,
            Mesh3d(meshes.add(Mesh::from(Capsule3d {
                radius: 0.4,
                half_length: 0.6,
            }))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: Color::linear_rgb(0.2, 0.9, 0.8),
                ..default()
            })),
            transform,
            ArenaActor(actor),
            Aim::default(),
            CurrentAttack::default(),
        ))
        .id();
    inbox.subscribe(player, &mut handler, &mut rotation);
    commands
        .entity(player)
        .insert((Collision(handler), RotationAssist(rotation)));
    mapping.0.insert(actor, player);

    let blade = meshes.add(Cuboid::new(0.06, 0.02, SWORD_LENGTH));
    let steel = materials.add(StandardMaterial {
        base_color: Color::srgb(0.8, 0.8, 0.85),
        metallic: 0.9,
        ..default()
    });
    commands.entity(player).with_children(|parent| {
        parent
            .spawn((
                Name::new("Sword"),
                Transform::from_translation(SWORD_PIVOT),
                Visibility::default(),
                Weapon {
                    element: sword,
                    fighter: player,
                    swings: true,
                },
            ))
            .with_children(|pivot| {
                pivot.spawn((
                    Mesh3d(blade),
                    MeshMaterial3d(steel),
                    Transform::from_translation(Vec3::NEG_Z * SWORD_LENGTH * 0.5),
                ));
            });

        parent.spawn((
            Name::new("Fist"),
            Mesh3d(meshes.add(Mesh::from(Sphere { radius: 0.12 }))),
            MeshMaterial3d(materials.add(Color::srgb(0.9, 0.75, 0.6))),
            Transform::from_translation(FIST_OFFSET),
            Weapon {
                element: fist,
                fighter: player,
                swings: false,
            },
        ));
    });
}

fn move_player(
    time: Res<Time>,
    actions: Res<ActionState<InputAction>>,
    mut player: Single<&mut Transform, With<Player>>,
) {
    let mut direction = Vec3::ZERO;
    if actions.pressed(&InputAction::MoveForward) {
        direction.z -= 1.0;
    }
    if actions.pressed(&InputAction::MoveBack) {
        direction.z += 1.0;
    }
    if actions.pressed(&InputAction::MoveLeft) {
        direction.x -= 1.0;
    }
    if actions.pressed(&InputAction::MoveRight) {
        direction.x += 1.0;
    }
    if direction == Vec3::ZERO {
        return;
    }
    player.translation += direction.normalize() * MOVE_SPEED * time.delta_secs();
}

/// Aim at the point of the ground under the cursor.
fn update_aim(
    window: Single<&Window, With<PrimaryWindow>>,
    camera: Single<(&Camera, &GlobalTransform)>,
    mut aim: Single<&mut Aim, With<Player>>,
) {
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let (camera, camera_transform) = *camera;
    let Ok(ray) = camera.viewport_to_world(camera_transform, cursor) else {
        return;
    };
    let Some(distance) = ray.intersect_plane(Vec3::ZERO, InfinitePlane3d::new(Vec3::Y)) else {
        return;
    };
    aim.point = Some(ray.get_point(distance));
}

fn start_attack(
    actions: Res<ActionState<InputAction>>,
    scene: Res<ArenaScene>,
    player: Single<
        (&mut CurrentAttack, &mut Collision, &mut RotationAssist),
        With<Player>,
    >,
) {
    let heavy = actions.just_pressed(&InputAction::HeavyAttack);
    if !heavy && !actions.just_pressed(&InputAction::Attack) {
        return;
    }

    let (mut current, mut collision, mut rotation) = player.into_inner();
    // Light attacks never interrupt; a heavy attack cancels whatever is playing.
    if current.is_playing() && !heavy {
        return;
    }
    let attack = if heavy { Attack::heavy() } else { Attack::light() };
    info!("Starting {} attack", if heavy { "heavy" } else { "light" });
    play_attack(
        &mut current,
        attack,
        &mut collision.0,
        &mut rotation.0,
        &scene,
    );
}

fn draw_player_facing(mut gizmos: Gizmos, q: Query<&GlobalTransform, With<Player>>) {
    for gt in &q {
        let (_, rot, start) = gt.to_scale_rotation_translation();

        let mut dir = rot * Vec3::NEG_Z;
        if !dir.is_finite() || dir.length_squared() <= 1.0e-8 {
            dir = Vec3::NEG_Z;
        }

        let end = start + dir.normalize() * 1.5;
        gizmos.arrow(start, end, Color::srgb(1.0, 1.0, 0.2));
    }
}
