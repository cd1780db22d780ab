//! Bridges the core's multicast events into Bevy messages.
//!
//! Core listeners run inside the handler's tick with no access to the ECS, so they only push
//! into a shared inbox. `forward_signals` drains it once per frame into typed messages.

use std::sync::{Arc, Mutex};

use bevy::prelude::*;
use combat::{CollisionHandler, CollisionPart, HitEvent, RotatingOwnerComponent};

use crate::arena::ActorEntityMapping;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<CombatInbox>();
    app.add_message::<HitMessage>();
    app.add_message::<CollisionWindowMessage>();
    app.add_message::<RotationMessage>();
    app.add_systems(PostUpdate, forward_signals);
}

/// A fighter's weapon connected with an actor.
#[derive(Message, Debug, Clone)]
pub struct HitMessage {
    pub attacker: Entity,
    /// Bevy entity of the hit actor, if it has one.
    pub target: Option<Entity>,
    pub event: HitEvent,
}

/// A fighter's collision window opened (`Some(part)`) or closed (`None`).
#[derive(Message, Debug, Clone, Copy)]
pub struct CollisionWindowMessage {
    pub attacker: Entity,
    pub opened: Option<CollisionPart>,
}

#[derive(Message, Debug, Clone, Copy)]
pub struct RotationMessage {
    pub entity: Entity,
    pub started: bool,
}

#[derive(Debug, Clone)]
enum CombatSignal {
    Hit(Entity, HitEvent),
    Activated(Entity, CollisionPart),
    Deactivated(Entity),
    Rotation(Entity, bool),
}

#[derive(Resource, Clone, Default)]
pub struct CombatInbox(Arc<Mutex<Vec<CombatSignal>>>);

impl CombatInbox {
    fn push(&self, signal: CombatSignal) {
        if let Ok(mut queue) = self.0.lock() {
            queue.push(signal);
        }
    }

    fn drain(&self) -> Vec<CombatSignal> {
        match self.0.lock() {
            Ok(mut queue) => std::mem::take(&mut *queue),
            Err(_) => Vec::new(),
        }
    }

    /// Route every event of `entity`'s components into this inbox.
    pub fn subscribe(
        &self,
        entity: Entity,
        handler: &mut CollisionHandler,
        rotation: &mut RotatingOwnerComponent,
    ) {
        let inbox = self.clone();
        handler
            .events
            .on_hit
            .subscribe(move |event| inbox.push(CombatSignal::Hit(entity, event.clone())));
        let inbox = self.clone();
        handler
            .events
            .on_activated
            .subscribe(move |part| inbox.push(CombatSignal::Activated(entity, *part)));
        let inbox = self.clone();
        handler
            .events
            .on_deactivated
            .subscribe(move |_| inbox.push(CombatSignal::Deactivated(entity)));

        let inbox = self.clone();
        rotation
            .events
            .on_start
            .subscribe(move |_| inbox.push(CombatSignal::Rotation(entity, true)));
        let inbox = self.clone();
        rotation
            .events
            .on_end
            .subscribe(move |_| inbox.push(CombatSignal::Rotation(entity, false)));
    }
}

fn forward_signals(
    inbox: Res<CombatInbox>,
    mapping: Res<ActorEntityMapping>,
    mut hits: MessageWriter<HitMessage>,
    mut windows: MessageWriter<CollisionWindowMessage>,
    mut rotations: MessageWriter<RotationMessage>,
) {
    for signal in inbox.drain() {
        match signal {
            CombatSignal::Hit(attacker, event) => {
                let target = mapping.0.get(&event.hit.actor).copied();
                hits.write(HitMessage {
                    attacker,
                    target,
                    event,
                });
            }
            CombatSignal::Activated(attacker, part) => {
                windows.write(CollisionWindowMessage {
                    attacker,
                    opened: Some(part),
                });
            }
            CombatSignal::Deactivated(attacker) => {
                windows.write(CollisionWindowMessage {
                    attacker,
                    opened: None,
                });
            }
            CombatSignal::Rotation(entity, started) => {
                rotations.write(RotationMessage { entity, started });
            }
        }
    }
}
