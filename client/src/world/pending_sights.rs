use std::{
    collections::{HashMap, VecDeque},
    time::Instant,
};

use seer_shared::EntityId;

/// What to do with the Sight that will answer an outstanding LOOK
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SightAction {
    /// Apply the data and make the entity visible
    Appear,
    /// Apply the data but keep the entity hidden
    Hide,
    /// Drop the data, the entity was deleted meanwhile
    Discard,
    /// The LOOK has not been sent yet
    Queued,
}

struct PendingSight {
    action: SightAction,
    // true while the id sits in the look queue
    queued: bool,
    registered_at: Instant,
}

/// Entities requested from the server but not yet received, plus the FIFO of
/// requests held back by the in-flight cap.
///
/// An id is in the look queue exactly while its entry is marked queued. The
/// entry's action may change while it waits (a Delete turns it into
/// `Discard`), which is resolved when the id leaves the queue.
pub(crate) struct PendingSights {
    entries: HashMap<EntityId, PendingSight>,
    look_queue: VecDeque<EntityId>,
}

impl PendingSights {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            look_queue: VecDeque::new(),
        }
    }

    pub fn get(&self, entity_id: &str) -> Option<SightAction> {
        self.entries.get(entity_id).map(|entry| entry.action)
    }

    pub fn contains(&self, entity_id: &str) -> bool {
        self.entries.contains_key(entity_id)
    }

    /// True while the id waits in the look queue
    pub fn is_queued(&self, entity_id: &str) -> bool {
        self.entries.get(entity_id).is_some_and(|entry| entry.queued)
    }

    pub fn registered_at(&self, entity_id: &str) -> Option<Instant> {
        self.entries.get(entity_id).map(|entry| entry.registered_at)
    }

    /// Changes the disposition of an existing entry, returning false if
    /// there is none
    pub fn set_action(&mut self, entity_id: &str, action: SightAction) -> bool {
        match self.entries.get_mut(entity_id) {
            Some(entry) => {
                entry.action = action;
                true
            }
            None => false,
        }
    }

    /// Records a LOOK that is being sent right now
    pub fn insert_in_flight(&mut self, entity_id: &str, now: Instant) {
        self.entries.insert(
            entity_id.to_string(),
            PendingSight {
                action: SightAction::Appear,
                queued: false,
                registered_at: now,
            },
        );
    }

    /// Records a LOOK held back by the cap
    pub fn enqueue(&mut self, entity_id: &str, now: Instant) {
        self.entries.insert(
            entity_id.to_string(),
            PendingSight {
                action: SightAction::Queued,
                queued: true,
                registered_at: now,
            },
        );
        self.look_queue.push_back(entity_id.to_string());
    }

    /// Removes an entry, taking it out of the look queue if it was waiting
    pub fn remove(&mut self, entity_id: &str) -> Option<SightAction> {
        let entry = self.entries.remove(entity_id)?;
        if entry.queued {
            self.look_queue.retain(|id| id != entity_id);
        }
        Some(entry.action)
    }

    /// Takes the oldest queued id off the look queue. Its entry stays, now
    /// counted as in flight.
    pub fn pop_queued(&mut self) -> Option<EntityId> {
        while let Some(entity_id) = self.look_queue.pop_front() {
            if let Some(entry) = self.entries.get_mut(&entity_id) {
                entry.queued = false;
                return Some(entity_id);
            }
        }
        None
    }

    /// Number of entries whose LOOK has been sent
    pub fn in_flight(&self) -> usize {
        self.entries.values().filter(|entry| !entry.queued).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn queue_len(&self) -> usize {
        self.look_queue.len()
    }

    pub fn queued_ids(&self) -> impl Iterator<Item = &EntityId> {
        self.look_queue.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.look_queue.clear();
    }
}
