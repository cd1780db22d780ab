/*!
Socket-interval sweep collision detection.

Instead of relying on continuous physics contacts, the handler samples named sockets on
moving elements (a sword's blade, a character's fist) at a fixed interval and sweeps a sphere
from each socket's previous position to its current one. Anything the sphere passes through is
reported once per activation window.

- surface:      tracked surfaces (element + sockets + hit records) and their registry
- socket_cache: last sampled world position of every tracked socket
- sweep:        the per-tick sweep, filters and hit de-duplication
- replication:  authority/observer state sync of the active flag and collision part

Lifecycle:

```text
Inactive --activate(part)--> Active --deactivate()--> Inactive
            clear hits                stop cadence
            on_activated(part)        on_deactivated()
            sample sockets (no trace)
            start cadence: every interval -> sweep, then sample
```
*/

pub mod replication;
pub mod socket_cache;
pub mod surface;
pub mod sweep;

pub use replication::{NetRole, StateSync, SyncOutbox};
pub use socket_cache::SocketPositionCache;
pub use surface::{SurfaceRegistry, TrackedSurface};

use std::collections::HashSet;

use crate::{
    cadence::RepeatingTimer,
    config::CollisionSettings,
    debug::{DebugShapes, TimedDebugShape},
    events::CollisionEvents,
    scene::CollisionScene,
    types::{ActorId, CollisionPart, ElementId, Socket},
};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ActivationState {
    #[default]
    Inactive,
    Active,
}

/// Tracks sockets on moving elements and reports what they sweep through while active.
///
/// All methods are meant to be called from the single thread that drives the host's update
/// loop. Methods that need to look at the world take the scene as a parameter; the handler never
/// owns the elements or actors it refers to.
#[derive(Debug)]
pub struct CollisionHandler {
    pub settings: CollisionSettings,
    pub events: CollisionEvents,
    owner: Option<ActorId>,
    state: ActivationState,
    collision_part: CollisionPart,
    /// False until the first sample of an activation window has been taken.
    can_trace: bool,
    /// Set by a surface replacement; the cache holds current positions, so nothing is swept
    /// until the next cadence sample.
    fresh_baseline: bool,
    surfaces: SurfaceRegistry,
    socket_cache: SocketPositionCache,
    timer: RepeatingTimer,
    outbox: SyncOutbox,
    debug_shapes: DebugShapes,
}

impl CollisionHandler {
    /// `owner` is the actor carrying this handler; it is never reported as hit.
    pub fn new(owner: Option<ActorId>, settings: CollisionSettings) -> Self {
        let timer = RepeatingTimer::new(settings.trace_interval);
        Self {
            settings,
            events: CollisionEvents::default(),
            owner,
            state: ActivationState::Inactive,
            collision_part: CollisionPart::None,
            can_trace: false,
            fresh_baseline: false,
            surfaces: SurfaceRegistry::new(),
            socket_cache: SocketPositionCache::new(),
            timer,
            outbox: SyncOutbox::new(NetRole::Authority),
            debug_shapes: DebugShapes::default(),
        }
    }

    pub fn with_role(mut self, role: NetRole) -> Self {
        self.outbox = SyncOutbox::new(role);
        self
    }

    pub fn owner(&self) -> Option<ActorId> {
        self.owner
    }

    pub fn role(&self) -> NetRole {
        self.outbox.role()
    }

    // --- Queries ---

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state == ActivationState::Active
    }

    pub fn state(&self) -> ActivationState {
        self.state
    }

    pub fn collision_part(&self) -> CollisionPart {
        self.collision_part
    }

    pub fn tracked_surfaces(&self) -> &[TrackedSurface] {
        self.surfaces.as_slice()
    }

    /// Actors hit by `element` during the current (or last) activation window.
    pub fn hit_actors(&self, element: ElementId) -> Option<&HashSet<ActorId>> {
        self.surfaces.get(element).map(TrackedSurface::hit_actors)
    }

    pub fn socket_cache(&self) -> &SocketPositionCache {
        &self.socket_cache
    }

    // --- Tracked surfaces ---

    /// Replace every tracked surface, clear all hit records and sample the new sockets right
    /// away so the next sweep starts from fresh positions.
    ///
    /// Until the next cadence sample, [`Self::sweep_and_report`] reports nothing.
    pub fn set_tracked_surfaces(&mut self, surfaces: Vec<TrackedSurface>, scene: &impl CollisionScene) {
        log::debug!("tracking {} surface(s)", surfaces.len());
        self.surfaces.replace(surfaces);
        self.socket_cache.clear();
        self.resample(scene);
        self.fresh_baseline = true;
    }

    /// Single-surface form of [`Self::set_tracked_surfaces`].
    pub fn set_tracked_surface(
        &mut self,
        element: ElementId,
        sockets: impl IntoIterator<Item = Socket>,
        scene: &impl CollisionScene,
    ) {
        self.set_tracked_surfaces(vec![TrackedSurface::new(element, sockets)], scene);
    }

    pub fn clear_hit_actors(&mut self) {
        self.surfaces.clear_hits();
    }

    // --- Activation ---

    /// Start an activation window for `part`.
    ///
    /// While already active only the part changes: hit records are kept and no event fires,
    /// so the hot body part can switch without interrupting the window.
    pub fn activate(&mut self, part: CollisionPart, scene: &impl CollisionScene) {
        self.set_collision_part(part);
        self.set_active(true, scene);
    }

    /// End the activation window. Hit records stay until the next activation.
    pub fn deactivate(&mut self) {
        if self.state == ActivationState::Inactive {
            return;
        }
        self.state = ActivationState::Inactive;
        self.end_window();
        self.outbox.mark_dirty(StateSync::Activated(false));
    }

    /// Change the collision part without touching the activation state.
    pub fn set_collision_part(&mut self, part: CollisionPart) {
        if self.collision_part != part {
            self.collision_part = part;
            self.outbox.mark_dirty(StateSync::CollisionPart(part));
        }
    }

    fn set_active(&mut self, active: bool, scene: &impl CollisionScene) {
        if active {
            if self.state == ActivationState::Active {
                return;
            }
            self.state = ActivationState::Active;
            self.begin_window(scene);
            self.outbox.mark_dirty(StateSync::Activated(true));
        } else {
            self.deactivate();
        }
    }

    fn begin_window(&mut self, scene: &impl CollisionScene) {
        log::debug!("collision activated for {:?}", self.collision_part);
        self.clear_hit_actors();
        self.events.on_activated.broadcast(&self.collision_part);

        // First loop only samples; there is no previous position to sweep from yet.
        self.can_trace = false;
        self.trace_check_loop(scene);
        self.timer.start(self.settings.trace_interval);
    }

    fn end_window(&mut self) {
        log::debug!("collision deactivated");
        self.can_trace = false;
        self.events.on_deactivated.broadcast(&());
        self.timer.cancel();
    }

    // --- Cadence ---

    /// Advance the cadence by the host's frame delta, running one sweep-then-sample pass per
    /// elapsed interval.
    pub fn tick(&mut self, dt: f32, scene: &impl CollisionScene) {
        let periods = self.timer.advance(dt);
        for _ in 0..periods {
            self.trace_check_loop(scene);
        }
    }

    fn trace_check_loop(&mut self, scene: &impl CollisionScene) {
        if self.can_trace {
            self.sweep_and_report(scene);
        }
        self.resample(scene);
        self.fresh_baseline = false;
        self.can_trace = true;
    }

    /// Sample the current world position of every tracked socket.
    pub fn resample(&mut self, scene: &impl CollisionScene) {
        self.socket_cache.resample(&self.surfaces, scene);
    }

    /// Sweep every tracked socket from its cached position to its current one and broadcast
    /// a hit event for every newly hit actor. Returns the number of hits reported.
    pub fn sweep_and_report(&mut self, scene: &impl CollisionScene) -> usize {
        if self.fresh_baseline {
            return 0;
        }
        let hits = sweep::sweep_surfaces(
            &mut self.surfaces,
            &self.socket_cache,
            &self.settings,
            self.owner,
            scene,
            &mut self.debug_shapes,
        );
        for hit in &hits {
            self.events.on_hit.broadcast(hit);
        }
        hits.len()
    }

    // --- Replication ---

    /// Messages produced by changed writes since the last drain (authority only).
    pub fn drain_sync(&mut self) -> Vec<StateSync> {
        self.outbox.drain()
    }

    /// Apply a message produced by the authority. Writes of the current value are absorbed;
    /// a changed active flag runs the same side effects as on the authority, exactly once.
    pub fn apply_sync(&mut self, msg: StateSync, scene: &impl CollisionScene) {
        match msg {
            StateSync::CollisionPart(part) => self.set_collision_part(part),
            StateSync::Activated(active) => self.set_active(active, scene),
        }
    }

    // --- Debug ---

    pub fn drain_debug_shapes(&mut self) -> Vec<TimedDebugShape> {
        self.debug_shapes.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bitmask_flags::CollisionCategory,
        scene::{ColliderDef, ColliderShapeDef, ElementDef, SceneWorld},
        types::{ClassId, HitEvent, Iso, Vec3},
    };
    use std::sync::{Arc, Mutex};

    const INTERVAL: f32 = 0.25;
    const CHARACTER: ClassId = ClassId(1);

    #[derive(Default)]
    struct Recorded {
        hits: Vec<(ActorId, ElementId)>,
        activated: Vec<CollisionPart>,
        deactivated: usize,
    }

    fn settings() -> CollisionSettings {
        CollisionSettings {
            trace_interval: INTERVAL,
            ..CollisionSettings::default()
        }
    }

    fn record(handler: &mut CollisionHandler) -> Arc<Mutex<Recorded>> {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let r = recorded.clone();
        handler.events.on_hit.subscribe(move |e: &HitEvent| {
            r.lock().unwrap().hits.push((e.hit.actor, e.element));
        });
        let r = recorded.clone();
        handler
            .events
            .on_activated
            .subscribe(move |part| r.lock().unwrap().activated.push(*part));
        let r = recorded.clone();
        handler
            .events
            .on_deactivated
            .subscribe(move |_| r.lock().unwrap().deactivated += 1);
        recorded
    }

    fn dummy(scene: &mut SceneWorld, x: f32) -> ActorId {
        scene.spawn_actor(
            CHARACTER,
            Iso::translation(x, 0.0, 0.0),
            vec![ColliderDef::new(
                ColliderShapeDef::Sphere { radius: 0.5 },
                CollisionCategory::Pawn,
                "CharacterMesh",
            )],
        )
    }

    /// Element E with a "Tip" socket, resting at x = -2 on the y = 0 line.
    fn sword(scene: &mut SceneWorld) -> ElementId {
        scene.add_element(
            ElementDef::new(Iso::translation(-2.0, 0.0, 0.0)).with_socket("Tip", Vec3::zeros()),
        )
    }

    #[test]
    fn swing_through_target_reports_exactly_once() {
        let mut scene = SceneWorld::new();
        let e = sword(&mut scene);
        let o = dummy(&mut scene, 0.0);

        let mut handler = CollisionHandler::new(None, settings());
        let recorded = record(&mut handler);
        handler.set_tracked_surface(e, [Socket::named("Tip")], &scene);

        // P0 sampled on activation, nothing traced yet.
        handler.activate(CollisionPart::PrimaryItem, &scene);
        assert!(recorded.lock().unwrap().hits.is_empty());

        // P1 on the far side of O: the P0-P1 segment passes through it.
        scene.translate_element(e, Vec3::new(4.0, 0.0, 0.0));
        handler.tick(INTERVAL, &scene);
        assert_eq!(recorded.lock().unwrap().hits, vec![(o, e)]);

        // Swing back through O within the same window: no second report.
        scene.translate_element(e, Vec3::new(-4.0, 0.0, 0.0));
        handler.tick(INTERVAL, &scene);
        assert_eq!(recorded.lock().unwrap().hits.len(), 1);
        assert!(handler.hit_actors(e).unwrap().contains(&o));
    }

    #[test]
    fn reactivation_resets_hit_eligibility() {
        let mut scene = SceneWorld::new();
        let e = sword(&mut scene);
        let o = dummy(&mut scene, 0.0);

        let mut handler = CollisionHandler::new(None, settings());
        let recorded = record(&mut handler);
        handler.set_tracked_surface(e, [Socket::named("Tip")], &scene);

        handler.activate(CollisionPart::PrimaryItem, &scene);
        scene.translate_element(e, Vec3::new(4.0, 0.0, 0.0));
        handler.tick(INTERVAL, &scene);
        handler.deactivate();

        // Hit records survive deactivation for inspection.
        assert!(handler.hit_actors(e).unwrap().contains(&o));

        handler.activate(CollisionPart::PrimaryItem, &scene);
        assert!(handler.hit_actors(e).unwrap().is_empty());
        scene.translate_element(e, Vec3::new(-4.0, 0.0, 0.0));
        handler.tick(INTERVAL, &scene);

        let recorded = recorded.lock().unwrap();
        assert_eq!(recorded.hits, vec![(o, e), (o, e)]);
        assert_eq!(recorded.deactivated, 1);
    }

    #[test]
    fn reactivating_while_active_only_switches_part() {
        let mut scene = SceneWorld::new();
        let e = sword(&mut scene);
        let o = dummy(&mut scene, 0.0);

        let mut handler = CollisionHandler::new(None, settings());
        let recorded = record(&mut handler);
        handler.set_tracked_surface(e, [Socket::named("Tip")], &scene);

        handler.activate(CollisionPart::PrimaryItem, &scene);
        scene.translate_element(e, Vec3::new(4.0, 0.0, 0.0));
        handler.tick(INTERVAL, &scene);

        handler.activate(CollisionPart::LeftLeg, &scene);
        assert_eq!(handler.collision_part(), CollisionPart::LeftLeg);
        assert!(handler.is_active());
        // Hits were not cleared a second time.
        assert!(handler.hit_actors(e).unwrap().contains(&o));
        assert_eq!(
            recorded.lock().unwrap().activated,
            vec![CollisionPart::PrimaryItem]
        );
    }

    #[test]
    fn activation_events_count_only_transitions() {
        let scene = SceneWorld::new();
        let mut handler = CollisionHandler::new(None, settings());
        let recorded = record(&mut handler);

        handler.deactivate();
        handler.activate(CollisionPart::PrimaryItem, &scene);
        handler.activate(CollisionPart::PrimaryItem, &scene);
        handler.activate(CollisionPart::SecondaryItem, &scene);
        handler.deactivate();
        handler.deactivate();
        handler.activate(CollisionPart::RightArm, &scene);

        let recorded = recorded.lock().unwrap();
        assert_eq!(
            recorded.activated,
            vec![CollisionPart::PrimaryItem, CollisionPart::RightArm]
        );
        assert_eq!(recorded.deactivated, 1);
    }

    #[test]
    fn set_tracked_surfaces_clears_hits_and_rebaselines() {
        let mut scene = SceneWorld::new();
        let e = sword(&mut scene);
        let o = dummy(&mut scene, 0.0);

        let mut handler = CollisionHandler::new(None, settings());
        let recorded = record(&mut handler);
        handler.set_tracked_surface(e, [Socket::named("Tip")], &scene);
        handler.activate(CollisionPart::PrimaryItem, &scene);
        scene.translate_element(e, Vec3::new(2.0, 0.0, 0.0));
        handler.tick(INTERVAL, &scene);
        assert!(handler.hit_actors(e).unwrap().contains(&o));

        // The sword teleports back; replacing surfaces samples the new position immediately.
        scene.translate_element(e, Vec3::new(-2.0, 0.0, 0.0));
        handler.set_tracked_surface(e, [Socket::named("Tip")], &scene);
        assert!(handler.hit_actors(e).unwrap().is_empty());
        assert_eq!(handler.sweep_and_report(&scene), 0);
        assert_eq!(recorded.lock().unwrap().hits.len(), 1);
    }

    #[test]
    fn ticks_do_nothing_while_inactive() {
        let mut scene = SceneWorld::new();
        let e = sword(&mut scene);
        dummy(&mut scene, 0.0);

        let mut handler = CollisionHandler::new(None, settings());
        let recorded = record(&mut handler);
        handler.set_tracked_surface(e, [Socket::named("Tip")], &scene);

        scene.translate_element(e, Vec3::new(4.0, 0.0, 0.0));
        handler.tick(INTERVAL, &scene);
        handler.tick(INTERVAL, &scene);
        assert!(recorded.lock().unwrap().hits.is_empty());
    }

    #[test]
    fn owner_is_never_hit() {
        let mut scene = SceneWorld::new();
        let e = sword(&mut scene);
        let owner = dummy(&mut scene, 0.0);

        let mut handler = CollisionHandler::new(Some(owner), settings());
        let recorded = record(&mut handler);
        handler.set_tracked_surface(e, [Socket::named("Tip")], &scene);
        handler.activate(CollisionPart::PrimaryItem, &scene);
        scene.translate_element(e, Vec3::new(4.0, 0.0, 0.0));
        handler.tick(INTERVAL, &scene);
        assert!(recorded.lock().unwrap().hits.is_empty());
    }

    #[test]
    fn destroyed_element_mid_window_is_skipped() {
        let mut scene = SceneWorld::new();
        let e = sword(&mut scene);
        let fist = scene.add_element(ElementDef::new(Iso::translation(-2.0, 0.3, 0.0)));
        let o = dummy(&mut scene, 0.0);

        let mut handler = CollisionHandler::new(None, settings());
        let recorded = record(&mut handler);
        handler.set_tracked_surfaces(
            vec![
                TrackedSurface::with_socket_names(e, &["Tip"]),
                TrackedSurface::origin(fist),
            ],
            &scene,
        );
        handler.activate(CollisionPart::BothHandItems, &scene);

        scene.remove_element(e);
        scene.translate_element(fist, Vec3::new(4.0, 0.0, 0.0));
        handler.tick(INTERVAL, &scene);
        assert_eq!(recorded.lock().unwrap().hits, vec![(o, fist)]);
    }

    #[test]
    fn clear_hit_actors_allows_a_second_hit_in_the_same_window() {
        let mut scene = SceneWorld::new();
        let e = sword(&mut scene);
        dummy(&mut scene, 0.0);

        let mut handler = CollisionHandler::new(None, settings());
        let recorded = record(&mut handler);
        handler.set_tracked_surface(e, [Socket::named("Tip")], &scene);
        handler.activate(CollisionPart::PrimaryItem, &scene);

        scene.translate_element(e, Vec3::new(4.0, 0.0, 0.0));
        handler.tick(INTERVAL, &scene);
        handler.clear_hit_actors();
        scene.translate_element(e, Vec3::new(-4.0, 0.0, 0.0));
        handler.tick(INTERVAL, &scene);
        assert_eq!(recorded.lock().unwrap().hits.len(), 2);
    }

    #[test]
    fn observer_mirrors_authority_side_effects_once() {
        let mut scene = SceneWorld::new();
        let e = sword(&mut scene);
        let o = dummy(&mut scene, 0.0);

        let mut authority = CollisionHandler::new(None, settings());
        let mut observer = CollisionHandler::new(None, settings()).with_role(NetRole::Observer);
        let seen = record(&mut observer);
        observer.set_tracked_surface(e, [Socket::named("Tip")], &scene);

        authority.activate(CollisionPart::RightLeg, &scene);
        authority.activate(CollisionPart::RightLeg, &scene);
        let msgs = authority.drain_sync();
        assert_eq!(
            msgs,
            vec![
                StateSync::CollisionPart(CollisionPart::RightLeg),
                StateSync::Activated(true)
            ]
        );

        // Redundant delivery is absorbed.
        for msg in msgs.iter().chain(msgs.iter()) {
            observer.apply_sync(*msg, &scene);
        }
        assert!(observer.is_active());
        assert_eq!(observer.collision_part(), CollisionPart::RightLeg);
        assert!(observer.drain_sync().is_empty());

        scene.translate_element(e, Vec3::new(4.0, 0.0, 0.0));
        observer.tick(INTERVAL, &scene);

        authority.deactivate();
        for msg in authority.drain_sync() {
            observer.apply_sync(msg, &scene);
        }
        observer.apply_sync(StateSync::Activated(false), &scene);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.activated, vec![CollisionPart::RightLeg]);
        assert_eq!(seen.deactivated, 1);
        assert_eq!(seen.hits, vec![(o, e)]);
    }

    #[test]
    fn set_collision_part_only_syncs_changes() {
        let mut handler = CollisionHandler::new(None, settings());
        handler.set_collision_part(CollisionPart::None);
        handler.set_collision_part(CollisionPart::Custom1);
        handler.set_collision_part(CollisionPart::Custom1);
        assert_eq!(
            handler.drain_sync(),
            vec![StateSync::CollisionPart(CollisionPart::Custom1)]
        );
        assert!(!handler.is_active());
    }

    #[test]
    fn long_frame_catches_up_on_missed_intervals() {
        let mut scene = SceneWorld::new();
        let e = sword(&mut scene);
        let o = dummy(&mut scene, 0.0);

        let mut handler = CollisionHandler::new(None, settings());
        let recorded = record(&mut handler);
        handler.set_tracked_surface(e, [Socket::named("Tip")], &scene);
        handler.activate(CollisionPart::PrimaryItem, &scene);

        scene.translate_element(e, Vec3::new(4.0, 0.0, 0.0));
        handler.tick(INTERVAL * 3.0, &scene);
        assert_eq!(recorded.lock().unwrap().hits, vec![(o, e)]);
    }

    #[test]
    fn held_blade_reports_an_actor_walking_into_it_once() {
        let mut scene = SceneWorld::new();
        let e = sword(&mut scene);
        let o = dummy(&mut scene, 3.0);

        let mut handler = CollisionHandler::new(None, settings());
        let recorded = record(&mut handler);
        handler.set_tracked_surface(e, [Socket::named("Tip")], &scene);
        handler.activate(CollisionPart::PrimaryItem, &scene);

        scene.set_actor_pose(o, Iso::translation(-2.0, 0.0, 0.0));
        for _ in 0..4 {
            handler.tick(INTERVAL, &scene);
        }
        assert_eq!(recorded.lock().unwrap().hits, vec![(o, e)]);
    }

    #[test]
    fn replacing_surfaces_mid_window_holds_hits_until_the_next_sample() {
        let mut scene = SceneWorld::new();
        let e = sword(&mut scene);
        let o = dummy(&mut scene, -2.0);

        let mut handler = CollisionHandler::new(None, settings());
        let recorded = record(&mut handler);
        handler.activate(CollisionPart::PrimaryItem, &scene);
        handler.set_tracked_surface(e, [Socket::named("Tip")], &scene);

        // The sword already overlaps O, but the freshly sampled baseline is not swept.
        assert_eq!(handler.sweep_and_report(&scene), 0);
        handler.tick(INTERVAL, &scene);
        assert!(recorded.lock().unwrap().hits.is_empty());

        handler.tick(INTERVAL, &scene);
        assert_eq!(recorded.lock().unwrap().hits, vec![(o, e)]);
    }
}
