//! State synchronisation between an authoritative collision handler and its observers.
//!
//! The authority records a [`StateSync`] message for every write that actually changes the
//! active flag or the collision part. The host ships those messages however it likes and
//! observers feed them back through `CollisionHandler::apply_sync`, which runs the same
//! one-shot side effects the authority ran.

use serde::{Deserialize, Serialize};

use crate::types::CollisionPart;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetRole {
    /// Owns the state and produces sync messages.
    #[default]
    Authority,
    /// Mirrors the authority; produces nothing.
    Observer,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateSync {
    CollisionPart(CollisionPart),
    Activated(bool),
}

/// Pending sync messages, in write order.
#[derive(Clone, Debug, Default)]
pub struct SyncOutbox {
    role: NetRole,
    pending: Vec<StateSync>,
}

impl SyncOutbox {
    pub fn new(role: NetRole) -> Self {
        Self {
            role,
            pending: Vec::new(),
        }
    }

    pub fn role(&self) -> NetRole {
        self.role
    }

    /// Record a changed value. Observers never produce messages.
    pub fn mark_dirty(&mut self, msg: StateSync) {
        if self.role == NetRole::Authority {
            self.pending.push(msg);
        }
    }

    pub fn drain(&mut self) -> Vec<StateSync> {
        std::mem::take(&mut self.pending)
    }
}
