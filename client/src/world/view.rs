use std::{
    collections::{BTreeMap, HashMap, VecDeque},
    rc::Rc,
    time::Instant,
    vec::IntoIter,
};

use log::{debug, error, info, warn};

use seer_shared::{Clock, EntityData, EntityId, Operation, TypeInfo};

use crate::{
    config::ViewConfig,
    error::ViewError,
    events::{EntityEvent, ViewEvent, ViewEvents},
    signal::{Signal, SlotHandle},
    world::{
        entity::Entity,
        factory::{Factory, FactoryStore},
        pending_sights::{PendingSights, SightAction},
        prediction::{PredictionSet, ViewLink},
    },
};

/// Requests the View makes of the connection. The owning session forwards
/// them after each inbound operation or update.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionCommand {
    Send(Operation),
    RegisterRouterForFrom(EntityId),
    UnregisterRouterForFrom(EntityId),
}

/// Returned by [`View::notify_when_entity_seen`], used to cancel the
/// notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SightHandle {
    entity_id: EntityId,
    slot: SlotHandle,
}

impl SightHandle {
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }
}

/// The entities one avatar currently knows about.
///
/// The server reports visibility changes as discrete operations that may
/// arrive in any order. Entities that are not known yet are requested with a
/// LOOK, and each outstanding request is tracked with the [`SightAction`] to
/// apply when its Sight arrives. At most `max_pending_count` named LOOKs are
/// in flight, further requests wait in a FIFO look queue.
pub struct View {
    mind_id: EntityId,
    avatar_entity_id: EntityId,
    config: ViewConfig,
    clock: Rc<dyn Clock>,
    contents: BTreeMap<EntityId, Entity>,
    pending: PendingSights,
    notify_sights: HashMap<EntityId, Signal<Entity>>,
    prediction: PredictionSet,
    top_level: Option<EntityId>,
    factories: FactoryStore,
    events: ViewEvents,
    outgoing: VecDeque<ConnectionCommand>,
    simulation_speed: f64,
    last_update_time: Option<Instant>,
}

impl View {
    pub(crate) fn new(
        mind_id: &str,
        avatar_entity_id: &str,
        config: ViewConfig,
        clock: Rc<dyn Clock>,
    ) -> Self {
        let simulation_speed = config.simulation_speed;
        Self {
            mind_id: mind_id.to_string(),
            avatar_entity_id: avatar_entity_id.to_string(),
            config,
            clock,
            contents: BTreeMap::new(),
            pending: PendingSights::new(),
            notify_sights: HashMap::new(),
            prediction: PredictionSet::new(),
            top_level: None,
            factories: FactoryStore::new(),
            events: ViewEvents::new(),
            outgoing: VecDeque::new(),
            simulation_speed,
            last_update_time: None,
        }
    }

    // Queries

    pub fn get_entity(&self, entity_id: &str) -> Option<&Entity> {
        self.contents.get(entity_id)
    }

    /// Mutable access for observing properties or reaching an entity's
    /// behaviour. Server-driven state can only change through the View.
    pub fn get_entity_mut(&mut self, entity_id: &str) -> Option<&mut Entity> {
        self.contents.get_mut(entity_id)
    }

    pub fn try_get_entity(&self, entity_id: &str) -> Result<&Entity, ViewError> {
        self.contents
            .get(entity_id)
            .ok_or_else(|| ViewError::EntityNotFound {
                entity_id: entity_id.to_string(),
            })
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.contents.values()
    }

    pub fn entity_count(&self) -> usize {
        self.contents.len()
    }

    pub fn top_level(&self) -> Option<&Entity> {
        self.top_level
            .as_ref()
            .and_then(|entity_id| self.contents.get(entity_id))
    }

    pub fn top_level_id(&self) -> Option<&str> {
        self.top_level.as_deref()
    }

    pub fn avatar_entity_id(&self) -> &str {
        &self.avatar_entity_id
    }

    pub fn is_pending(&self, entity_id: &str) -> bool {
        self.pending.contains(entity_id)
    }

    pub fn pending_action(&self, entity_id: &str) -> Option<SightAction> {
        self.pending.get(entity_id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Named LOOKs sent but not yet answered
    pub fn in_flight_count(&self) -> usize {
        self.pending.in_flight()
    }

    /// When the entity was first requested, while it is pending
    pub fn pending_since(&self, entity_id: &str) -> Option<Instant> {
        self.pending.registered_at(entity_id)
    }

    pub fn look_queue_size(&self) -> usize {
        self.pending.queue_len()
    }

    /// Ids waiting for a free LOOK slot, oldest first
    pub fn queued_looks(&self) -> impl Iterator<Item = &EntityId> {
        self.pending.queued_ids()
    }

    pub fn is_moving(&self, entity_id: &str) -> bool {
        self.prediction.is_moving(entity_id)
    }

    pub fn moving_count(&self) -> usize {
        self.prediction.moving_count()
    }

    pub fn simulation_speed(&self) -> f64 {
        self.simulation_speed
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    // Events

    pub fn events(&self) -> &ViewEvents {
        &self.events
    }

    pub fn take_events(&mut self) -> IntoIter<ViewEvent> {
        self.events.take()
    }

    pub(crate) fn take_connection_commands(&mut self) -> Vec<ConnectionCommand> {
        self.outgoing.drain(..).collect()
    }

    // Registration

    pub fn register_factory(&mut self, factory: Box<dyn Factory>) {
        self.factories.register(factory);
    }

    /// Calls `slot` once, when `entity_id` is first seen, and requests the
    /// entity from the server. Fails if the entity is already in the View.
    pub fn try_notify_when_entity_seen(
        &mut self,
        entity_id: &str,
        slot: impl FnMut(&Entity) + 'static,
    ) -> Result<SightHandle, ViewError> {
        if self.contents.contains_key(entity_id) {
            return Err(ViewError::EntityAlreadyExists {
                entity_id: entity_id.to_string(),
            });
        }
        let handle = self
            .notify_sights
            .entry(entity_id.to_string())
            .or_default()
            .connect(slot);
        self.get_entity_from_server(entity_id);
        Ok(SightHandle {
            entity_id: entity_id.to_string(),
            slot: handle,
        })
    }

    pub fn notify_when_entity_seen(
        &mut self,
        entity_id: &str,
        slot: impl FnMut(&Entity) + 'static,
    ) -> Option<SightHandle> {
        match self.try_notify_when_entity_seen(entity_id, slot) {
            Ok(handle) => Some(handle),
            Err(err) => {
                error!("notify_when_entity_seen: {}", err);
                None
            }
        }
    }

    pub fn cancel_sight_notification(&mut self, handle: &SightHandle) -> bool {
        let Some(signal) = self.notify_sights.get_mut(&handle.entity_id) else {
            return false;
        };
        let removed = signal.disconnect(handle.slot);
        if signal.is_empty() {
            self.notify_sights.remove(&handle.entity_id);
        }
        removed
    }

    fn has_sight_subscribers(&self, entity_id: &str) -> bool {
        self.notify_sights
            .get(entity_id)
            .is_some_and(|signal| !signal.is_empty())
    }

    // Ticking

    /// Advances motion and task prediction. The first call only records the
    /// time baseline for tasks.
    pub fn update(&mut self) {
        let now = self.clock.now();
        let speed = self.simulation_speed;

        for entity_id in self.prediction.moving() {
            if let Some(entity) = self.contents.get_mut(entity_id) {
                entity.update_predicted_state(now, speed);
            }
        }

        let elapsed = match self.last_update_time {
            Some(last) => now.saturating_duration_since(last).as_secs_f64(),
            None => 0.0,
        };
        for (entity_id, task_id) in self.prediction.progressing() {
            if let Some(entity) = self.contents.get_mut(entity_id) {
                entity.update_task_progress(task_id, elapsed);
            }
        }

        self.last_update_time = Some(now);
    }

    // Requests

    /// Asks the server for an entity, unless a request is already pending.
    /// Named requests over the in-flight cap wait in the look queue. An
    /// empty id asks for the world root and is never queued.
    pub fn get_entity_from_server(&mut self, entity_id: &str) {
        if self.pending.contains(entity_id) {
            return;
        }
        if !entity_id.is_empty() && self.pending.in_flight() >= self.config.max_pending_count {
            debug!("Queueing look at '{}'", entity_id);
            self.pending.enqueue(entity_id, self.clock.now());
            return;
        }
        self.send_look_at(entity_id);
    }

    /// Sends a look that already passed the in-flight cap
    fn send_look_at(&mut self, entity_id: &str) {
        if entity_id.is_empty() {
            debug!("Sending anonymous look");
            self.send(Operation::look(&self.mind_id, None));
            return;
        }

        match self.pending.get(entity_id) {
            Some(SightAction::Queued) => {
                self.pending.set_action(entity_id, SightAction::Appear);
            }
            Some(action @ (SightAction::Discard | SightAction::Hide)) => {
                if !self.has_sight_subscribers(entity_id) {
                    debug!("Dropping look at '{}', pending action {:?}", entity_id, action);
                    self.pending.remove(entity_id);
                    self.issue_queued_look();
                    return;
                }
            }
            Some(SightAction::Appear) => {}
            None => self.pending.insert_in_flight(entity_id, self.clock.now()),
        }

        debug!("Sending look at '{}'", entity_id);
        self.send(Operation::look(&self.mind_id, Some(entity_id)));
    }

    fn issue_queued_look(&mut self) {
        if let Some(entity_id) = self.pending.pop_queued() {
            self.send_look_at(&entity_id);
        }
    }

    fn send(&mut self, op: Operation) {
        self.outgoing.push_back(ConnectionCommand::Send(op));
    }

    // Visibility operations

    pub(crate) fn sight(&mut self, data: &EntityData, ty: Rc<TypeInfo>) {
        let entity_id = data.id.clone();
        let mut visible = true;

        match self.pending.remove(&entity_id) {
            None | Some(SightAction::Appear) => {}
            Some(SightAction::Discard) => {
                debug!("Discarding sight of deleted entity '{}'", entity_id);
                self.issue_queued_look();
                return;
            }
            Some(SightAction::Hide) => visible = false,
            Some(SightAction::Queued) => {
                error!("Got sight of '{}' before its look was sent", entity_id);
            }
        }

        if self.contents.contains_key(&entity_id) {
            self.update_from_sight(data);
        } else {
            self.initial_sight(data, ty, false);
            self.events.push(ViewEvent::EntitySeen(entity_id.clone()));
        }

        if data.is_default_loc() {
            self.set_top_level_entity(&entity_id);
        }

        self.set_entity_visible(&entity_id, visible);
        self.issue_queued_look();
    }

    /// Sight of a CREATE: the entity is new to the server, not just to us
    pub(crate) fn create(&mut self, data: &EntityData, ty: Rc<TypeInfo>) {
        let entity_id = data.id.clone();
        if self.contents.contains_key(&entity_id) {
            self.events.push(ViewEvent::EntityCreated(entity_id));
            return;
        }

        let already_appeared = if self.pending.is_queued(&entity_id) {
            // no LOOK went out, so no Sight will answer it
            matches!(
                self.pending.remove(&entity_id),
                Some(SightAction::Queued | SightAction::Appear)
            )
        } else {
            let appeared = matches!(self.pending.get(&entity_id), Some(SightAction::Appear));
            self.pending.set_action(&entity_id, SightAction::Discard);
            appeared
        };

        self.initial_sight(data, ty, true);
        if data.is_default_loc() {
            self.set_top_level_entity(&entity_id);
        }

        if already_appeared {
            self.set_entity_visible(&entity_id, true);
            if let Some(entity) = self.contents.get_mut(&entity_id) {
                entity.clear_recently_created();
            }
            self.events.push(ViewEvent::EntityCreated(entity_id));
        }
    }

    pub(crate) fn appear(&mut self, entity_id: &str, stamp: Option<f64>) {
        let Some(entity) = self.contents.get_mut(entity_id) else {
            // a later appearance overrides an earlier disappearance
            if self.pending.get(entity_id) == Some(SightAction::Hide) {
                self.pending.set_action(entity_id, SightAction::Appear);
            } else {
                self.get_entity_from_server(entity_id);
            }
            return;
        };

        if entity.clear_recently_created() {
            self.events.push(ViewEvent::EntityCreated(entity_id.to_string()));
        }

        if entity.is_visible() {
            return;
        }

        let newer = match stamp {
            Some(stamp) => stamp == 0.0 || stamp > entity.stamp(),
            None => false,
        };
        if newer {
            if self.pending.contains(entity_id) {
                self.pending.set_action(entity_id, SightAction::Appear);
            } else {
                self.get_entity_from_server(entity_id);
            }
        } else {
            self.set_entity_visible(entity_id, true);
        }
    }

    pub(crate) fn disappear(&mut self, entity_id: &str) {
        if self.contents.contains_key(entity_id) {
            self.set_entity_visible(entity_id, false);
        } else if self.pending.set_action(entity_id, SightAction::Hide) {
            debug!("Entity '{}' disappeared before its sight arrived", entity_id);
        } else {
            warn!("Got disappearance for unknown entity '{}'", entity_id);
        }
    }

    /// Removes an entity deleted on the server. Its children move to its
    /// location, keeping their place in the world.
    pub(crate) fn delete_entity(&mut self, entity_id: &str) {
        let Some(entity) = self.contents.get(entity_id) else {
            if self.pending.set_action(entity_id, SightAction::Discard) {
                debug!("Entity '{}' deleted before its sight arrived", entity_id);
            } else {
                warn!("Got delete for unknown entity '{}'", entity_id);
            }
            return;
        };

        if self.pending.set_action(entity_id, SightAction::Discard) {
            debug!("Discarding outstanding sight of deleted entity '{}'", entity_id);
        }

        let new_location = entity.location().map(str::to_string);
        let orientation = entity.orientation();
        let children: Vec<EntityId> = entity.contents().to_vec();

        for child_id in children.iter().rev() {
            let transform = match (self.contents.get(entity_id), self.contents.get(child_id)) {
                (Some(deleted), Some(child)) => Some((
                    deleted.to_location_coords(&child.position()),
                    orientation * child.orientation(),
                )),
                _ => None,
            };
            self.set_location(child_id, new_location.clone());
            if let (Some((position, child_orientation)), Some(child)) =
                (transform, self.contents.get_mut(child_id))
            {
                child.set_transform(position, child_orientation);
            }
        }

        self.set_entity_visible(entity_id, false);
        self.events.push(ViewEvent::EntityDeleted(entity_id.to_string()));
        self.destroy_entity(entity_id);

        if entity_id == self.avatar_entity_id {
            self.events.push(ViewEvent::AvatarEntityDeleted);
        }
    }

    /// Forgets an entity that left our perception, without any visibility
    /// event
    pub(crate) fn unseen(&mut self, entity_id: &str) {
        if self.contents.contains_key(entity_id) {
            self.destroy_entity(entity_id);
        } else {
            debug!("Ignoring unseen for unknown entity '{}'", entity_id);
        }
    }

    /// Applies property changes from a SET
    pub(crate) fn set_entity_properties(&mut self, data: &EntityData) {
        let entity_id = data.id.as_str();
        if let Some(location) = &data.loc {
            self.set_location(entity_id, Some(location.clone()));
        }
        self.with_entity(entity_id, |entity, link| entity.set_from_data(data, link));
        if self.top_level.as_deref() == Some(entity_id) {
            self.refresh_simulation_speed();
        }
    }

    // Entity hooks

    pub(crate) fn entity_action(&mut self, entity_id: &str, op: &Operation, ty: &TypeInfo) {
        self.with_entity(entity_id, |entity, link| entity.on_action(op, ty, link));
    }

    pub(crate) fn entity_hit(&mut self, entity_id: &str, op: &Operation, ty: &TypeInfo) {
        self.with_entity(entity_id, |entity, link| entity.on_hit(op, ty, link));
    }

    pub(crate) fn entity_talk(&mut self, entity_id: &str, data: &EntityData) {
        self.with_entity(entity_id, |entity, link| entity.on_talk(data, link));
    }

    pub(crate) fn entity_sound(&mut self, entity_id: &str, op: &Operation) {
        self.with_entity(entity_id, |entity, link| entity.on_sound_action(op, link));
    }

    pub(crate) fn entity_imaginary(&mut self, entity_id: &str, op: &Operation) {
        self.with_entity(entity_id, |entity, link| entity.on_imaginary(op, link));
    }

    // Construction and teardown

    fn build_entity(&mut self, data: &EntityData, ty: Rc<TypeInfo>) -> Entity {
        match self.factories.instantiate(data, &ty) {
            Some(entity) if entity.id() == data.id => entity,
            Some(entity) => {
                error!(
                    "{}",
                    ViewError::InvalidState {
                        context: format!(
                            "factory built entity '{}' for sight of '{}'",
                            entity.id(),
                            data.id
                        ),
                    }
                );
                Entity::new(data.id.clone(), ty)
            }
            None => Entity::new(data.id.clone(), ty),
        }
    }

    fn initial_sight(&mut self, data: &EntityData, ty: Rc<TypeInfo>, from_create: bool) {
        let entity_id = data.id.clone();
        let entity = self.build_entity(data, ty);
        self.contents.insert(entity_id.clone(), entity);
        self.outgoing
            .push_back(ConnectionCommand::RegisterRouterForFrom(entity_id.clone()));

        self.with_entity(&entity_id, |entity, link| {
            entity.init(data, from_create, link)
        });
        if let Some(location) = &data.loc {
            self.set_location(&entity_id, Some(location.clone()));
        }
        if let Some(contents) = &data.contents {
            self.set_contents_from_ids(&entity_id, contents);
        }
        self.attach_waiting_children(&entity_id);

        self.events
            .push(ViewEvent::InitialSightEntity(entity_id.clone()));

        if let Some(mut signal) = self.notify_sights.remove(&entity_id) {
            if let Some(entity) = self.contents.get(&entity_id) {
                signal.emit(entity);
            }
        }
    }

    fn update_from_sight(&mut self, data: &EntityData) {
        let entity_id = data.id.as_str();
        if let Some(location) = &data.loc {
            self.set_location(entity_id, Some(location.clone()));
        }
        self.with_entity(entity_id, |entity, link| entity.set_from_data(data, link));
        if let Some(contents) = &data.contents {
            self.set_contents_from_ids(entity_id, contents);
        }
        if self.top_level.as_deref() == Some(entity_id) {
            self.refresh_simulation_speed();
        }
    }

    /// Shuts an entity down and removes it, together with everything it
    /// still contains
    fn destroy_entity(&mut self, entity_id: &str) {
        match self.contents.get(entity_id) {
            Some(entity) if !entity.is_shut_down() => {}
            _ => return,
        }

        self.with_entity(entity_id, |entity, link| entity.shutdown(link));

        let children: Vec<EntityId> = self
            .contents
            .get(entity_id)
            .map(|entity| entity.contents().iter().rev().cloned().collect())
            .unwrap_or_default();
        for child_id in children {
            self.destroy_entity(&child_id);
        }

        if let Some(entity) = self.contents.remove(entity_id) {
            if let Some(location) = entity.location() {
                self.detach_child(location, entity_id);
            }
        }
        self.prediction.forget_entity(entity_id);
        self.outgoing
            .push_back(ConnectionCommand::UnregisterRouterForFrom(entity_id.to_string()));

        if self.top_level.as_deref() == Some(entity_id) {
            self.top_level = None;
        }
    }

    /// Destroys every entity and drops all outstanding requests. Runs no
    /// visibility transitions.
    pub fn shutdown(&mut self) {
        let entity_ids: Vec<EntityId> = self.contents.keys().cloned().collect();
        for entity_id in entity_ids {
            self.destroy_entity(&entity_id);
        }
        self.pending.clear();
        self.notify_sights.clear();
        self.prediction.clear();
        self.top_level = None;
    }

    // Hierarchy

    /// Moves an entity to a new location. This is the only place
    /// containership changes.
    pub(crate) fn set_location(&mut self, entity_id: &str, new_location: Option<EntityId>) {
        let Some(entity) = self.contents.get(entity_id) else {
            return;
        };
        if entity.location() == new_location.as_deref() {
            return;
        }
        if let Some(location) = new_location.as_deref() {
            if self.is_ancestor_or_self(entity_id, location) {
                error!(
                    "{}",
                    ViewError::InvalidState {
                        context: format!(
                            "entity '{}' cannot move into its own descendant '{}'",
                            entity_id, location
                        ),
                    }
                );
                return;
            }
        }

        let was_visible = entity.is_visible();
        let old_location = self
            .contents
            .get_mut(entity_id)
            .and_then(|entity| entity.set_location_id(new_location.clone()));

        if let Some(old_location) = old_location.as_deref() {
            self.detach_child(old_location, entity_id);
        }

        let waiting = match new_location.as_deref() {
            Some(location) => !self.attach_child(location, entity_id),
            None => false,
        };
        if let Some(entity) = self.contents.get_mut(entity_id) {
            entity.set_waiting_for_parent(waiting);
        }

        self.events.push_entity(
            entity_id,
            EntityEvent::LocationChanged { old_location },
        );

        if waiting {
            if let Some(location) = new_location.as_deref() {
                debug!("Entity '{}' waits for its location '{}'", entity_id, location);
                self.get_entity_from_server(location);
            }
        }

        self.update_calculated_visibility(entity_id, was_visible);
    }

    fn is_ancestor_or_self(&self, ancestor_id: &str, entity_id: &str) -> bool {
        let mut current = Some(entity_id);
        let mut steps = 0;
        while let Some(id) = current {
            if id == ancestor_id {
                return true;
            }
            steps += 1;
            if steps > self.contents.len() {
                return false;
            }
            current = self.contents.get(id).and_then(Entity::location);
        }
        false
    }

    /// Returns false if the location is not in the View
    fn attach_child(&mut self, location_id: &str, child_id: &str) -> bool {
        let Some(location) = self.contents.get_mut(location_id) else {
            return false;
        };
        if location.add_child(child_id) {
            self.events
                .push_entity(location_id, EntityEvent::ChildAdded(child_id.to_string()));
        }
        true
    }

    fn detach_child(&mut self, location_id: &str, child_id: &str) {
        let Some(location) = self.contents.get_mut(location_id) else {
            return;
        };
        if location.remove_child(child_id) {
            self.events
                .push_entity(location_id, EntityEvent::ChildRemoved(child_id.to_string()));
        }
    }

    fn attach_waiting_children(&mut self, location_id: &str) {
        let waiting: Vec<EntityId> = self
            .contents
            .values()
            .filter(|entity| {
                entity.is_waiting_for_parent() && entity.location() == Some(location_id)
            })
            .map(|entity| entity.id().to_string())
            .collect();

        for child_id in waiting {
            let was_visible = self
                .contents
                .get(&child_id)
                .is_some_and(Entity::is_visible);
            if let Some(child) = self.contents.get_mut(&child_id) {
                child.set_waiting_for_parent(false);
            }
            self.attach_child(location_id, &child_id);
            self.update_calculated_visibility(&child_id, was_visible);
        }
    }

    /// Relocates known children into `location_id` and requests unknown ones
    fn set_contents_from_ids(&mut self, location_id: &str, contents: &[EntityId]) {
        for child_id in contents {
            match self.contents.get(child_id) {
                Some(child) if child.location() != Some(location_id) => {
                    self.set_location(child_id, Some(location_id.to_string()));
                }
                Some(_) => {}
                None => self.get_entity_from_server(child_id),
            }
        }
    }

    fn set_top_level_entity(&mut self, entity_id: &str) {
        if self.top_level.as_deref() == Some(entity_id) {
            return;
        }
        let Some(entity) = self.contents.get(entity_id) else {
            return;
        };
        if entity.location().is_some() {
            error!(
                "{}",
                ViewError::InvalidState {
                    context: format!("top-level entity '{}' has a location", entity_id),
                }
            );
            return;
        }
        if let Some(old) = self.top_level().filter(|old| old.is_visible() && old.location().is_none()) {
            error!(
                "{}",
                ViewError::InvalidState {
                    context: format!(
                        "old top-level entity '{}' is visible, but has no location",
                        old.id()
                    ),
                }
            );
        }

        info!("Top-level entity is now '{}'", entity_id);
        self.top_level = Some(entity_id.to_string());
        self.events
            .push(ViewEvent::TopLevelEntityChanged(entity_id.to_string()));
        self.refresh_simulation_speed();
    }

    fn refresh_simulation_speed(&mut self) {
        let Some(value) = self
            .top_level()
            .and_then(|entity| entity.ptr_of_property("simulation_speed"))
            .cloned()
        else {
            return;
        };
        match value.as_float() {
            Some(speed) if speed.is_finite() && speed >= 0.0 => self.simulation_speed = speed,
            _ => warn!("Ignoring invalid simulation speed {:?}", value),
        }
    }

    // Visibility

    pub(crate) fn set_entity_visible(&mut self, entity_id: &str, visible: bool) {
        let Some(entity) = self.contents.get_mut(entity_id) else {
            return;
        };
        let was_visible = entity.is_visible();
        entity.set_visible_flag(visible);
        self.update_calculated_visibility(entity_id, was_visible);
    }

    fn compute_visibility(&self, entity: &Entity) -> bool {
        if !entity.visible_flag() || entity.is_waiting_for_parent() {
            return false;
        }
        match entity.location() {
            Some(location) => self
                .contents
                .get(location)
                .is_some_and(Entity::is_visible),
            None => true,
        }
    }

    fn update_calculated_visibility(&mut self, entity_id: &str, was_visible: bool) {
        let Some(entity) = self.contents.get(entity_id) else {
            return;
        };
        let now_visible = self.compute_visibility(entity);
        let children: Vec<EntityId> = entity.contents().to_vec();
        if let Some(entity) = self.contents.get_mut(entity_id) {
            entity.set_calculated_visible(now_visible);
        }
        if now_visible == was_visible {
            return;
        }

        self.events
            .push_entity(entity_id, EntityEvent::VisibilityChanged(now_visible));
        if now_visible {
            self.events.push(ViewEvent::Appearance(entity_id.to_string()));
        } else {
            self.events
                .push(ViewEvent::Disappearance(entity_id.to_string()));
        }

        for child_id in children {
            let child_was_visible = self
                .contents
                .get(&child_id)
                .is_some_and(Entity::is_visible);
            self.update_calculated_visibility(&child_id, child_was_visible);
        }
    }

    fn with_entity<R>(
        &mut self,
        entity_id: &str,
        f: impl FnOnce(&mut Entity, &mut ViewLink<'_>) -> R,
    ) -> Option<R> {
        let entity = self.contents.get_mut(entity_id)?;
        let mut link = ViewLink {
            clock: self.clock.as_ref(),
            events: &mut self.events,
            prediction: &mut self.prediction,
        };
        Some(f(entity, &mut link))
    }
}

impl Drop for View {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View")
            .field("avatar_entity_id", &self.avatar_entity_id)
            .field("entities", &self.contents.len())
            .field("pending", &self.pending.len())
            .field("look_queue", &self.pending.queue_len())
            .field("top_level", &self.top_level)
            .finish()
    }
}
