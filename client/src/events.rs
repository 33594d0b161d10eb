use std::{collections::BTreeSet, vec::IntoIter};

use seer_shared::{EntityData, EntityId, Operation};

/// Events concerning a single entity
#[derive(Debug, Clone, PartialEq)]
pub enum EntityEvent {
    /// Names of the properties modified by one batched update
    Changed(BTreeSet<String>),
    /// Position or orientation changed authoritatively
    Moved,
    /// The entity started or stopped moving
    Moving(bool),
    ChildAdded(EntityId),
    ChildRemoved(EntityId),
    LocationChanged { old_location: Option<EntityId> },
    VisibilityChanged(bool),
    BeingDeleted,
    Acted(Operation),
    Hit(Operation),
    Say(EntityData),
    Noise(Operation),
    Emote(String),
    TaskAdded(String),
    TaskRemoved(String),
    TaskProgressed { task_id: String, progress: f64 },
}

/// Events emitted by a View, in the order they occurred
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// An entity was built from sight data, before its visibility is applied
    InitialSightEntity(EntityId),
    EntitySeen(EntityId),
    EntityCreated(EntityId),
    EntityDeleted(EntityId),
    Appearance(EntityId),
    Disappearance(EntityId),
    TopLevelEntityChanged(EntityId),
    /// The entity controlled by the avatar was deleted
    AvatarEntityDeleted,
    Entity(EntityId, EntityEvent),
}

impl ViewEvent {
    pub fn entity_id(&self) -> Option<&str> {
        match self {
            ViewEvent::InitialSightEntity(id)
            | ViewEvent::EntitySeen(id)
            | ViewEvent::EntityCreated(id)
            | ViewEvent::EntityDeleted(id)
            | ViewEvent::Appearance(id)
            | ViewEvent::Disappearance(id)
            | ViewEvent::TopLevelEntityChanged(id)
            | ViewEvent::Entity(id, _) => Some(id),
            ViewEvent::AvatarEntityDeleted => None,
        }
    }
}

pub struct ViewEvents {
    events: Vec<ViewEvent>,
    empty: bool,
}

impl Default for ViewEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewEvents {
    pub(crate) fn new() -> Self {
        Self {
            events: Vec::new(),
            empty: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ViewEvent> {
        self.events.iter()
    }

    pub fn has(&self, event: &ViewEvent) -> bool {
        self.events.contains(event)
    }

    /// Drains every queued event
    pub fn take(&mut self) -> IntoIter<ViewEvent> {
        self.empty = true;
        std::mem::take(&mut self.events).into_iter()
    }

    pub(crate) fn push(&mut self, event: ViewEvent) {
        self.events.push(event);
        self.empty = false;
    }

    pub(crate) fn push_entity(&mut self, entity_id: &str, event: EntityEvent) {
        self.push(ViewEvent::Entity(entity_id.to_string(), event));
    }
}
