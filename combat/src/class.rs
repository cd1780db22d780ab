use std::collections::HashMap;

use crate::{constants::MAX_CLASS_DEPTH, types::ClassId};

/// Single-inheritance class tree used to answer "is `class` a `ancestor` or a subtype of it".
///
/// Classes that were never registered have no parent and are only related to themselves.
#[derive(Clone, Debug, Default)]
pub struct ClassRegistry {
    parents: HashMap<ClassId, ClassId>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `class` as a direct subtype of `parent`. Re-registering replaces the parent.
    ///
    /// A class can't be its own parent; such a request is ignored.
    pub fn register(&mut self, class: ClassId, parent: ClassId) {
        if class == parent {
            log::warn!("class {class:?} cannot derive from itself");
            return;
        }
        self.parents.insert(class, parent);
    }

    pub fn parent_of(&self, class: ClassId) -> Option<ClassId> {
        self.parents.get(&class).copied()
    }

    /// True if `class` equals `ancestor` or derives from it.
    ///
    /// The walk is bounded so that a misconfigured cycle terminates.
    pub fn is_child_of(&self, class: ClassId, ancestor: ClassId) -> bool {
        let mut current = class;
        for _ in 0..MAX_CLASS_DEPTH {
            if current == ancestor {
                return true;
            }
            match self.parent_of(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
        false
    }
}
