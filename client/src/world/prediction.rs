use std::{collections::BTreeSet, time::Instant};

use log::error;

use seer_shared::{Clock, EntityId};

use crate::{
    error::ViewError,
    events::{EntityEvent, ViewEvents},
};

/// Entities and tasks the View advances on every update
pub(crate) struct PredictionSet {
    moving: BTreeSet<EntityId>,
    progressing: BTreeSet<(EntityId, String)>,
}

impl PredictionSet {
    pub fn new() -> Self {
        Self {
            moving: BTreeSet::new(),
            progressing: BTreeSet::new(),
        }
    }

    pub fn try_add_moving(&mut self, entity_id: &str) -> Result<(), ViewError> {
        if !self.moving.insert(entity_id.to_string()) {
            return Err(ViewError::InvalidState {
                context: format!("entity '{}' is already in the prediction set", entity_id),
            });
        }
        Ok(())
    }

    pub fn try_remove_moving(&mut self, entity_id: &str) -> Result<(), ViewError> {
        if !self.moving.remove(entity_id) {
            return Err(ViewError::InvalidState {
                context: format!("entity '{}' is not in the prediction set", entity_id),
            });
        }
        Ok(())
    }

    pub fn is_moving(&self, entity_id: &str) -> bool {
        self.moving.contains(entity_id)
    }

    pub fn moving(&self) -> impl Iterator<Item = &EntityId> {
        self.moving.iter()
    }

    pub fn moving_count(&self) -> usize {
        self.moving.len()
    }

    pub fn set_task_rate(&mut self, entity_id: &str, task_id: &str, rate: f64) {
        let key = (entity_id.to_string(), task_id.to_string());
        if rate > 0.0 {
            self.progressing.insert(key);
        } else {
            self.progressing.remove(&key);
        }
    }

    pub fn progressing(&self) -> impl Iterator<Item = &(EntityId, String)> {
        self.progressing.iter()
    }

    pub fn progressing_count(&self) -> usize {
        self.progressing.len()
    }

    /// Forgets every moving or progressing record of an entity
    pub fn forget_entity(&mut self, entity_id: &str) {
        self.moving.remove(entity_id);
        self.progressing.retain(|(id, _)| id != entity_id);
    }

    pub fn clear(&mut self) {
        self.moving.clear();
        self.progressing.clear();
    }
}

/// The narrow slice of a View an Entity may reach while it is being updated
pub(crate) trait EntityHost {
    fn now(&self) -> Instant;

    fn emit(&mut self, entity_id: &str, event: EntityEvent);

    fn add_to_prediction(&mut self, entity_id: &str);

    fn remove_from_prediction(&mut self, entity_id: &str);

    fn task_rate_changed(&mut self, entity_id: &str, task_id: &str, rate: f64);
}

/// Split borrow of the View fields an Entity needs, leaving the entity map
/// free to lend out the Entity itself
pub(crate) struct ViewLink<'a> {
    pub clock: &'a dyn Clock,
    pub events: &'a mut ViewEvents,
    pub prediction: &'a mut PredictionSet,
}

impl EntityHost for ViewLink<'_> {
    fn now(&self) -> Instant {
        self.clock.now()
    }

    fn emit(&mut self, entity_id: &str, event: EntityEvent) {
        self.events.push_entity(entity_id, event);
    }

    fn add_to_prediction(&mut self, entity_id: &str) {
        if let Err(err) = self.prediction.try_add_moving(entity_id) {
            error!("{}", err);
        }
    }

    fn remove_from_prediction(&mut self, entity_id: &str) {
        if let Err(err) = self.prediction.try_remove_moving(entity_id) {
            error!("{}", err);
        }
    }

    fn task_rate_changed(&mut self, entity_id: &str, task_id: &str, rate: f64) {
        self.prediction.set_task_rate(entity_id, task_id, rate);
    }
}
