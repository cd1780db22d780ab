use bevy::{platform::collections::HashMap, prelude::*};
use combat::{
    ActorId, ClassId, CollisionCategory, SceneWorld,
    scene::{ColliderDef, ColliderShapeDef},
};

use crate::{convert::iso_from_transform, messages::HitMessage};

pub const CHARACTER: ClassId = ClassId(1);
pub const PLAYER: ClassId = ClassId(2);
pub const TRAINING_DUMMY: ClassId = ClassId(3);
pub const ALLY: ClassId = ClassId(4);
pub const PROP: ClassId = ClassId(5);

const DUMMY_RADIUS: f32 = 0.4;
const DUMMY_HALF_HEIGHT: f32 = 0.6;
const HIT_FLASH_SECS: f32 = 0.2;

/// The collision scene every handler traces against.
#[derive(Resource, Default, Deref, DerefMut)]
pub struct ArenaScene(pub SceneWorld);

/// Used to tie a scene actor to its Bevy entity.
#[derive(Resource, Default)]
pub struct ActorEntityMapping(pub HashMap<ActorId, Entity>);

/// Entity mirrored into the scene as an actor.
#[derive(Component, Debug, Clone, Copy)]
pub struct ArenaActor(pub ActorId);

#[derive(Component, Debug)]
struct HitFlash {
    remaining: f32,
    base_color: Color,
}

pub(super) fn plugin(app: &mut App) {
    app.insert_resource(ArenaScene(arena_scene()));
    app.init_resource::<ActorEntityMapping>();
    app.add_systems(Startup, setup);
    app.add_systems(PostUpdate, (sync_actor_poses, on_hit, fade_hit_flash).chain());
}

fn arena_scene() -> SceneWorld {
    let mut scene = SceneWorld::new();
    let classes = scene.classes_mut();
    classes.register(PLAYER, CHARACTER);
    classes.register(TRAINING_DUMMY, CHARACTER);
    classes.register(ALLY, CHARACTER);
    scene
}

/// A character's capsule, standing on the ground.
pub fn character_collider() -> ColliderDef {
    ColliderDef::new(
        ColliderShapeDef::CapsuleY {
            radius: DUMMY_RADIUS,
            half_height: DUMMY_HALF_HEIGHT,
        },
        CollisionCategory::Pawn,
        "CharacterMesh",
    )
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut scene: ResMut<ArenaScene>,
    mut mapping: ResMut<ActorEntityMapping>,
) {
    info!("Arena setup");

    commands.spawn((
        Transform::from_xyz(0., 0., 0.),
        Mesh3d(meshes.add(Plane3d::default().mesh().size(30., 30.).build())),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::linear_rgb(0.2, 0.3, 0.25),
            perceptual_roughness: 1.0,
            metallic: 0.0,
            ..default()
        })),
    ));
    commands.spawn((
        PointLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0),
    ));

    let capsule = meshes.add(Mesh::from(Capsule3d {
        radius: DUMMY_RADIUS,
        half_length: DUMMY_HALF_HEIGHT,
    }));
    let center_height = DUMMY_RADIUS + DUMMY_HALF_HEIGHT;

    let dummies = [
        (TRAINING_DUMMY, Vec3::new(0.0, center_height, -2.5), Color::srgb(0.9, 0.6, 0.2)),
        (TRAINING_DUMMY, Vec3::new(2.0, center_height, -1.5), Color::srgb(0.9, 0.6, 0.2)),
        (ALLY, Vec3::new(-2.0, center_height, -1.5), Color::srgb(0.3, 0.5, 0.9)),
    ];
    for (class, translation, base_color) in dummies {
        let transform = Transform::from_translation(translation);
        let actor = scene.spawn_actor(
            class,
            iso_from_transform(&transform),
            vec![character_collider()],
        );
        let entity = commands
            .spawn((
                Name::new(format!("Dummy {}", actor.0)),
                Mesh3d(capsule.clone()),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color,
                    ..default()
                })),
                transform,
                ArenaActor(actor),
            ))
            .id();
        mapping.0.insert(actor, entity);
    }

    // A crate only hittable when the config collides with physics bodies.
    let crate_transform = Transform::from_xyz(-1.0, 0.4, -3.5);
    let actor = scene.spawn_actor(
        PROP,
        iso_from_transform(&crate_transform),
        vec![ColliderDef::new(
            ColliderShapeDef::Cuboid {
                half_extents: combat::Vec3::new(0.4, 0.4, 0.4),
            },
            CollisionCategory::PhysicsBody,
            "Prop",
        )],
    );
    let entity = commands
        .spawn((
            Name::new("Crate"),
            Mesh3d(meshes.add(Cuboid::new(0.8, 0.8, 0.8))),
            MeshMaterial3d(materials.add(Color::srgb_u8(124, 144, 255))),
            crate_transform,
            ArenaActor(actor),
        ))
        .id();
    mapping.0.insert(actor, entity);
}

pub(crate) fn sync_actor_poses(
    mut scene: ResMut<ArenaScene>,
    actors: Query<(&ArenaActor, &Transform), Changed<Transform>>,
) {
    for (actor, transform) in &actors {
        scene.set_actor_pose(actor.0, iso_from_transform(transform));
    }
}

fn on_hit(
    mut commands: Commands,
    mut hits: MessageReader<HitMessage>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    targets: Query<&MeshMaterial3d<StandardMaterial>, Without<HitFlash>>,
) {
    let mut flashed = Vec::new();
    for hit in hits.read() {
        info!(
            "{:?} hit actor {:?} with element {:?} at {:?}",
            hit.attacker, hit.event.hit.actor, hit.event.element, hit.event.hit.location
        );
        let Some(target) = hit.target else {
            continue;
        };
        if flashed.contains(&target) {
            continue;
        }
        let Ok(material) = targets.get(target) else {
            continue;
        };
        let Some(material) = materials.get_mut(&material.0) else {
            continue;
        };
        let base_color = material.base_color;
        material.base_color = Color::srgb(1.0, 0.1, 0.1);
        commands.entity(target).insert(HitFlash {
            remaining: HIT_FLASH_SECS,
            base_color,
        });
        flashed.push(target);
    }
}

fn fade_hit_flash(
    mut commands: Commands,
    time: Res<Time>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut flashing: Query<(Entity, &mut HitFlash, &MeshMaterial3d<StandardMaterial>)>,
) {
    for (entity, mut flash, material) in &mut flashing {
        flash.remaining -= time.delta_secs();
        if flash.remaining > 0.0 {
            continue;
        }
        if let Some(material) = materials.get_mut(&material.0) {
            material.base_color = flash.base_color;
        }
        commands.entity(entity).remove::<HitFlash>();
    }
}
