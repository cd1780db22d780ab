/*!
Animation notifies: the triggers a host's animation timeline fires at marked times.

Each notify looks up the component it drives on the owner. An owner without that component
is not an error; the notify does nothing.

[`NotifyTrack`] is a minimal timeline for hosts without one: entries are `(begin, end, notify)`
and advancing the track returns the begin/end dispatches that fell inside the step, in time
order.
*/

use serde::{Deserialize, Serialize};

use crate::{
    collision_handler::CollisionHandler,
    constants::{DEFAULT_DEGREES_PER_SECOND, DEFAULT_MAX_POSSIBLE_ROTATION, ROTATE_WINDOW_TIME},
    rotation::RotatingOwnerComponent,
    scene::CollisionScene,
    types::CollisionPart,
};

/// Components of the owner a notify may drive.
#[derive(Default)]
pub struct NotifyTarget<'a> {
    pub collision: Option<&'a mut CollisionHandler>,
    pub rotation: Option<&'a mut RotatingOwnerComponent>,
}

/// Window: activate collision on begin, deactivate on end.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivateCollisionWindow {
    pub part: CollisionPart,
}

impl Default for ActivateCollisionWindow {
    fn default() -> Self {
        Self {
            part: CollisionPart::PrimaryItem,
        }
    }
}

impl ActivateCollisionWindow {
    pub fn begin(&self, handler: Option<&mut CollisionHandler>, scene: &impl CollisionScene) {
        if let Some(handler) = handler {
            handler.activate(self.part, scene);
        }
    }

    pub fn end(&self, handler: Option<&mut CollisionHandler>) {
        if let Some(handler) = handler {
            handler.deactivate();
        }
    }
}

/// Instant: forget everything hit so far in the current window.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClearHitActorsNotify;

impl ClearHitActorsNotify {
    pub fn notify(&self, handler: Option<&mut CollisionHandler>) {
        if let Some(handler) = handler {
            handler.clear_hit_actors();
        }
    }
}

/// Instant: rotate the owner by at most `max_rotation` degrees.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RotateOwnerNotify {
    pub degrees_per_second: f32,
    pub max_rotation: f32,
}

impl Default for RotateOwnerNotify {
    fn default() -> Self {
        Self {
            degrees_per_second: DEFAULT_DEGREES_PER_SECOND,
            max_rotation: DEFAULT_MAX_POSSIBLE_ROTATION,
        }
    }
}

impl RotateOwnerNotify {
    pub fn notify(&self, rotation: Option<&mut RotatingOwnerComponent>) {
        if let Some(rotation) = rotation {
            rotation.start_with_limit(self.max_rotation, self.degrees_per_second);
        }
    }
}

/// Window: rotate the owner for as long as the window lasts.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RotateOwnerWindow {
    pub degrees_per_second: f32,
}

impl Default for RotateOwnerWindow {
    fn default() -> Self {
        Self {
            degrees_per_second: DEFAULT_DEGREES_PER_SECOND,
        }
    }
}

impl RotateOwnerWindow {
    // The window end stops the rotation; the duration is only an upper bound.
    pub fn begin(&self, rotation: Option<&mut RotatingOwnerComponent>) {
        if let Some(rotation) = rotation {
            rotation.start(ROTATE_WINDOW_TIME, self.degrees_per_second);
        }
    }

    pub fn end(&self, rotation: Option<&mut RotatingOwnerComponent>) {
        if let Some(rotation) = rotation {
            rotation.stop();
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Notify {
    ActivateCollision(ActivateCollisionWindow),
    ClearHitActors(ClearHitActorsNotify),
    RotateOwner(RotateOwnerNotify),
    RotateOwnerWindow(RotateOwnerWindow),
}

impl Notify {
    /// Instant notifies only fire on begin.
    pub fn is_instant(&self) -> bool {
        matches!(self, Notify::ClearHitActors(_) | Notify::RotateOwner(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Notify::ActivateCollision(_) => "ActColl",
            Notify::ClearHitActors(_) => "ClearHitActors",
            Notify::RotateOwner(_) | Notify::RotateOwnerWindow(_) => "RotateOwner",
        }
    }

    pub fn dispatch(&self, phase: NotifyPhase, target: &mut NotifyTarget<'_>, scene: &impl CollisionScene) {
        let collision = target.collision.as_deref_mut();
        let rotation = target.rotation.as_deref_mut();
        match (self, phase) {
            (Notify::ActivateCollision(n), NotifyPhase::Begin) => n.begin(collision, scene),
            (Notify::ActivateCollision(n), NotifyPhase::End) => n.end(collision),
            (Notify::ClearHitActors(n), NotifyPhase::Begin) => n.notify(collision),
            (Notify::RotateOwner(n), NotifyPhase::Begin) => n.notify(rotation),
            (Notify::RotateOwnerWindow(n), NotifyPhase::Begin) => n.begin(rotation),
            (Notify::RotateOwnerWindow(n), NotifyPhase::End) => n.end(rotation),
            (Notify::ClearHitActors(_) | Notify::RotateOwner(_), NotifyPhase::End) => {}
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum NotifyPhase {
    // Ends sort first so back-to-back windows close before the next one opens.
    End,
    Begin,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NotifyDispatch {
    pub notify: Notify,
    pub phase: NotifyPhase,
    /// Track time the dispatch was scheduled at.
    pub time: f32,
}

impl NotifyDispatch {
    pub fn apply(&self, target: &mut NotifyTarget<'_>, scene: &impl CollisionScene) {
        log::trace!("{} {:?} at {}s", self.notify.name(), self.phase, self.time);
        self.notify.dispatch(self.phase, target, scene);
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NotifyEntry {
    pub begin: f32,
    /// Equal to `begin` for instant notifies.
    pub end: f32,
    pub notify: Notify,
}

/// A timeline of notifies over `length` seconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NotifyTrack {
    length: f32,
    looping: bool,
    entries: Vec<NotifyEntry>,
    #[serde(skip)]
    time: f32,
    #[serde(skip)]
    playing: bool,
}

impl NotifyTrack {
    pub fn new(length: f32) -> Self {
        Self {
            length,
            looping: false,
            entries: Vec::new(),
            time: 0.0,
            playing: false,
        }
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Add a window notify, clamped to the track.
    pub fn with_window(mut self, begin: f32, end: f32, notify: Notify) -> Self {
        let length = self.length.max(0.0);
        let begin = begin.max(0.0).min(length);
        let end = end.max(begin).min(length);
        self.entries.push(NotifyEntry { begin, end, notify });
        self
    }

    /// Add an instant notify, clamped to the track.
    pub fn with_instant(self, at: f32, notify: Notify) -> Self {
        self.with_window(at, at, notify)
    }

    pub fn entries(&self) -> &[NotifyEntry] {
        &self.entries
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Play from the start. Windows left open by an interrupted playback are returned closed.
    pub fn play(&mut self) -> Vec<NotifyDispatch> {
        let closed = self.stop();
        self.time = 0.0;
        self.playing = true;
        closed
    }

    /// Stop playback and close every window currently open.
    pub fn stop(&mut self) -> Vec<NotifyDispatch> {
        if !self.playing {
            return Vec::new();
        }
        self.playing = false;
        let time = self.time;
        self.entries
            .iter()
            .filter(|e| !e.notify.is_instant() && e.begin <= time && time < e.end)
            .map(|e| NotifyDispatch {
                notify: e.notify,
                phase: NotifyPhase::End,
                time,
            })
            .collect()
    }

    /// Advance playback by `dt` seconds and return the dispatches that fell inside, in order.
    pub fn advance(&mut self, dt: f32) -> Vec<NotifyDispatch> {
        let mut dispatches = Vec::new();
        if !self.playing || !(dt > 0.0) {
            return dispatches;
        }
        if !(self.length > 0.0) {
            log::warn!("notify track has no length; stopping");
            self.playing = false;
            return dispatches;
        }

        let mut remaining = dt;
        while remaining > 0.0 && self.playing {
            let step = remaining.min(self.length - self.time);
            let from = self.time;
            let to = from + step;
            let reaches_end = step >= self.length - self.time;
            self.collect(from, to, reaches_end, &mut dispatches);
            remaining -= step;

            if reaches_end {
                if self.looping {
                    self.time = 0.0;
                } else {
                    self.time = self.length;
                    self.playing = false;
                }
            } else {
                self.time = to;
            }
        }
        dispatches
    }

    /// Dispatches scheduled in `[from, to)`, or `[from, to]` on the pass that reaches the end.
    fn collect(&self, from: f32, to: f32, inclusive: bool, out: &mut Vec<NotifyDispatch>) {
        let inside = |t: f32| t >= from && (t < to || (inclusive && t <= to));
        let first = out.len();
        for entry in &self.entries {
            if inside(entry.begin) {
                out.push(NotifyDispatch {
                    notify: entry.notify,
                    phase: NotifyPhase::Begin,
                    time: entry.begin,
                });
            }
            if !entry.notify.is_instant() && inside(entry.end) {
                out.push(NotifyDispatch {
                    notify: entry.notify,
                    phase: NotifyPhase::End,
                    time: entry.end,
                });
            }
        }
        out[first..].sort_by(|a, b| a.time.total_cmp(&b.time).then(a.phase.cmp(&b.phase)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bitmask_flags::CollisionCategory,
        config::CollisionSettings,
        scene::{ColliderDef, ColliderShapeDef, ElementDef, SceneWorld},
        types::{ClassId, Iso, Socket, Vec3},
    };

    fn collision_window() -> Notify {
        Notify::ActivateCollision(ActivateCollisionWindow::default())
    }

    fn phases(dispatches: &[NotifyDispatch]) -> Vec<(&'static str, NotifyPhase)> {
        dispatches.iter().map(|d| (d.notify.name(), d.phase)).collect()
    }

    #[test]
    fn defaults_match_notify_settings() {
        assert_eq!(ActivateCollisionWindow::default().part, CollisionPart::PrimaryItem);
        assert_eq!(RotateOwnerNotify::default().degrees_per_second, 540.0);
        assert_eq!(RotateOwnerNotify::default().max_rotation, 180.0);
        assert_eq!(RotateOwnerWindow::default().degrees_per_second, 540.0);
    }

    #[test]
    fn track_dispatches_in_time_order() {
        let mut track = NotifyTrack::new(1.0)
            .with_window(0.5, 0.75, collision_window())
            .with_instant(0.25, Notify::ClearHitActors(ClearHitActorsNotify))
            .with_window(0.0, 0.5, Notify::RotateOwnerWindow(RotateOwnerWindow::default()));
        track.play();

        let first = track.advance(0.5);
        assert_eq!(
            phases(&first),
            vec![
                ("RotateOwner", NotifyPhase::Begin),
                ("ClearHitActors", NotifyPhase::Begin),
            ]
        );

        let second = track.advance(0.5);
        assert_eq!(
            phases(&second),
            vec![
                ("RotateOwner", NotifyPhase::End),
                ("ActColl", NotifyPhase::Begin),
                ("ActColl", NotifyPhase::End),
            ]
        );
        assert!(!track.is_playing());
        assert!(track.advance(0.5).is_empty());
    }

    #[test]
    fn looping_track_wraps_and_reopens_windows() {
        let mut track = NotifyTrack::new(1.0)
            .looping(true)
            .with_window(0.25, 1.0, collision_window());
        track.play();

        let dispatches = track.advance(1.5);
        assert_eq!(
            phases(&dispatches),
            vec![
                ("ActColl", NotifyPhase::Begin),
                ("ActColl", NotifyPhase::End),
                ("ActColl", NotifyPhase::Begin),
            ]
        );
        assert_eq!(track.time(), 0.5);
        assert!(track.is_playing());

        let dispatches = track.advance(1.0);
        assert_eq!(
            phases(&dispatches),
            vec![
                ("ActColl", NotifyPhase::End),
                ("ActColl", NotifyPhase::Begin),
            ]
        );
    }

    #[test]
    fn interrupted_playback_closes_open_windows() {
        let mut track = NotifyTrack::new(1.0).with_window(0.25, 0.75, collision_window());
        track.play();
        track.advance(0.5);

        let closed = track.play();
        assert_eq!(phases(&closed), vec![("ActColl", NotifyPhase::End)]);
        assert!(track.is_playing());
        assert!(track.stop().is_empty());
    }

    #[test]
    fn notifies_drive_the_owner_components() {
        let mut scene = SceneWorld::new();
        let sword = scene.add_element(
            ElementDef::new(Iso::translation(-2.0, 0.0, 0.0)).with_socket("Tip", Vec3::zeros()),
        );
        scene.spawn_actor(
            ClassId(1),
            Iso::identity(),
            vec![ColliderDef::new(
                ColliderShapeDef::Sphere { radius: 0.5 },
                CollisionCategory::Pawn,
                "CharacterMesh",
            )],
        );

        let mut handler = CollisionHandler::new(None, CollisionSettings::default());
        handler.set_tracked_surface(sword, [Socket::named("Tip")], &scene);
        let mut rotation = RotatingOwnerComponent::default();

        let mut target = NotifyTarget {
            collision: Some(&mut handler),
            rotation: Some(&mut rotation),
        };
        let window = collision_window();
        window.dispatch(NotifyPhase::Begin, &mut target, &scene);
        Notify::RotateOwner(RotateOwnerNotify::default()).dispatch(
            NotifyPhase::Begin,
            &mut target,
            &scene,
        );
        Notify::ClearHitActors(ClearHitActorsNotify).dispatch(NotifyPhase::End, &mut target, &scene);

        assert!(handler.is_active());
        assert_eq!(handler.collision_part(), CollisionPart::PrimaryItem);
        assert!(rotation.is_rotating());

        let mut target = NotifyTarget {
            collision: Some(&mut handler),
            rotation: Some(&mut rotation),
        };
        window.dispatch(NotifyPhase::End, &mut target, &scene);
        Notify::RotateOwnerWindow(RotateOwnerWindow::default()).dispatch(
            NotifyPhase::End,
            &mut target,
            &scene,
        );
        assert!(!handler.is_active());
        assert!(!rotation.is_rotating());
    }

    #[test]
    fn missing_components_are_ignored() {
        let scene = SceneWorld::new();
        let mut target = NotifyTarget::default();
        for notify in [
            collision_window(),
            Notify::ClearHitActors(ClearHitActorsNotify),
            Notify::RotateOwner(RotateOwnerNotify::default()),
            Notify::RotateOwnerWindow(RotateOwnerWindow::default()),
        ] {
            notify.dispatch(NotifyPhase::Begin, &mut target, &scene);
            notify.dispatch(NotifyPhase::End, &mut target, &scene);
        }
    }
}
