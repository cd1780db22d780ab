/*!
Fire-and-forget multicast events.

A [`Multicast`] is an ordered list of listeners. Broadcasting calls every listener in the
order it subscribed; nothing is returned to the broadcaster. Hosts that split listeners into
tiers (e.g. engine-native before scripted) just subscribe the native ones first.
*/

use crate::types::{CollisionPart, HitEvent};

/// Handle returned by [`Multicast::subscribe`], used to unsubscribe later.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<A> = Box<dyn FnMut(&A) + Send + Sync>;

pub struct Multicast<A> {
    listeners: Vec<(ListenerId, Listener<A>)>,
    next_id: u64,
}

impl<A> Default for Multicast<A> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }
}

impl<A> Multicast<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&A) + Send + Sync + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn broadcast(&mut self, args: &A) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(args);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<A> std::fmt::Debug for Multicast<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Multicast")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Events raised by the collision handler.
#[derive(Debug, Default)]
pub struct CollisionEvents {
    pub on_hit: Multicast<HitEvent>,
    pub on_activated: Multicast<CollisionPart>,
    pub on_deactivated: Multicast<()>,
}

/// Events raised by the rotation assist.
#[derive(Debug, Default)]
pub struct RotationEvents {
    pub on_start: Multicast<()>,
    pub on_end: Multicast<()>,
}
