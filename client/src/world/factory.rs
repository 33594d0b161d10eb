use std::{cmp::Reverse, rc::Rc};

use seer_shared::{EntityData, TypeInfo};

use crate::world::entity::Entity;

/// Builds entities for the types it accepts. Factories are consulted in
/// descending priority order and the first one accepting the data builds
/// the entity.
pub trait Factory {
    fn accept(&self, data: &EntityData, ty: &TypeInfo) -> bool;

    /// Builds the entity for `data`. The returned entity must carry `data.id`.
    fn instantiate(&mut self, data: &EntityData, ty: Rc<TypeInfo>) -> Entity;

    fn priority(&self) -> i32 {
        0
    }
}

pub(crate) struct FactoryStore {
    factories: Vec<Box<dyn Factory>>,
}

impl FactoryStore {
    pub fn new() -> Self {
        Self {
            factories: Vec::new(),
        }
    }

    /// Keeps the list sorted by descending priority. The sort is stable, so
    /// equal priorities stay in registration order.
    pub fn register(&mut self, factory: Box<dyn Factory>) {
        self.factories.push(factory);
        self.factories.sort_by_key(|factory| Reverse(factory.priority()));
    }

    /// Builds with the first accepting factory, if any
    pub fn instantiate(&mut self, data: &EntityData, ty: &Rc<TypeInfo>) -> Option<Entity> {
        let factory = self
            .factories
            .iter_mut()
            .find(|factory| factory.accept(data, ty))?;
        Some(factory.instantiate(data, ty.clone()))
    }
}
