use std::{rc::Rc, time::Instant, vec::IntoIter};

use log::{debug, info};

use seer_shared::{
    math::{orientation_to_element, point_to_element, vector_to_element},
    Clock, Connection, Element, EntityData, EntityId, Operation, OperationKind, Orientation,
    Point, SystemClock, Vector,
};

use crate::{
    avatar::{
        avatar_events::{AvatarEvent, AvatarEvents},
        world_time::WorldTime,
    },
    config::AvatarConfig,
    error::ViewError,
    router::{
        ig_router::{AvatarInternal, IGRouter, RouterContext, RouterResult},
        transfer_info::TransferInfo,
    },
    world::{
        entity::Entity,
        view::{ConnectionCommand, View},
    },
};

/// One player session inside the world.
///
/// The avatar is identified by its mind id, which addresses operations it
/// sends, and by the id of the entity it controls. It owns the [`View`] of
/// the world seen through that entity and the router feeding it.
pub struct Avatar<C: Connection> {
    mind_id: EntityId,
    entity_id: EntityId,
    is_admin: bool,
    connection: C,
    view: View,
    router: IGRouter,
    clock: Rc<dyn Clock>,
    world_time: WorldTime,
    events: AvatarEvents,
    has_character: bool,
}

impl<C: Connection> Avatar<C> {
    pub fn new(mind_id: &str, entity_id: &str, connection: C, config: AvatarConfig) -> Self {
        Self::with_clock(mind_id, entity_id, connection, config, Rc::new(SystemClock))
    }

    pub fn with_clock(
        mind_id: &str,
        entity_id: &str,
        mut connection: C,
        config: AvatarConfig,
        clock: Rc<dyn Clock>,
    ) -> Self {
        connection.register_router_for_to(entity_id);

        let view = View::new(mind_id, entity_id, config.view, clock.clone());
        let router = IGRouter::new(&config.action_type);

        Self {
            mind_id: mind_id.to_string(),
            entity_id: entity_id.to_string(),
            is_admin: false,
            connection,
            view,
            router,
            clock,
            world_time: WorldTime::new(),
            events: AvatarEvents::new(),
            has_character: false,
        }
    }

    // Accessors

    pub fn mind_id(&self) -> &str {
        &self.mind_id
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// The avatar's own entity, once seen
    pub fn entity(&self) -> Option<&Entity> {
        self.view.get_entity(&self.entity_id)
    }

    /// Admin status is a hint for the client, the server decides what an
    /// admin may do
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn set_admin(&mut self, is_admin: bool) {
        self.is_admin = is_admin;
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut View {
        &mut self.view
    }

    pub fn router(&self) -> &IGRouter {
        &self.router
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.connection
    }

    pub fn world_time(&self) -> f64 {
        self.world_time.seconds_at(self.clock.now())
    }

    pub fn events(&self) -> &AvatarEvents {
        &self.events
    }

    pub fn take_events(&mut self) -> IntoIter<AvatarEvent> {
        self.events.take()
    }

    // Driving

    /// Routes one inbound operation, then replays any operations whose
    /// types have bound meanwhile and forwards the View's requests to the
    /// connection.
    pub fn handle_operation(&mut self, op: &Operation) -> RouterResult {
        let result = self.route(op);
        self.redispatch_bound_types();
        self.after_dispatch();
        result
    }

    /// Per-tick update: replays operations whose types have bound and
    /// advances prediction
    pub fn update(&mut self) {
        self.redispatch_bound_types();
        self.view.update();
        self.after_dispatch();
    }

    fn route(&mut self, op: &Operation) -> RouterResult {
        let mut link = AvatarLink {
            now: self.clock.now(),
            world_time: &mut self.world_time,
            events: &mut self.events,
        };
        let mut ctx = RouterContext {
            view: &mut self.view,
            types: self.connection.type_service(),
            avatar: &mut link,
        };
        self.router.handle_operation(op, &mut ctx)
    }

    fn redispatch_bound_types(&mut self) {
        loop {
            let failed = self.connection.type_service().take_failed_types();
            if !failed.is_empty() {
                self.router.drop_failed(&failed);
            }

            let bound = self.connection.type_service().take_bound_types();
            let ready = self.router.take_redispatches(&bound);
            if ready.is_empty() {
                return;
            }
            for op in ready {
                debug!("Redispatching {}", op.type_name());
                self.route(&op);
            }
        }
    }

    fn after_dispatch(&mut self) {
        for command in self.view.take_connection_commands() {
            match command {
                ConnectionCommand::Send(op) => self.connection.send(op),
                ConnectionCommand::RegisterRouterForFrom(entity_id) => {
                    self.connection.register_router_for_from(&entity_id)
                }
                ConnectionCommand::UnregisterRouterForFrom(entity_id) => {
                    self.connection.unregister_router_for_from(&entity_id)
                }
            }
        }

        let has_character = self.view.get_entity(&self.entity_id).is_some();
        if has_character != self.has_character {
            self.has_character = has_character;
            if has_character {
                info!("Got character entity '{}'", self.entity_id);
                self.events
                    .push(AvatarEvent::GotCharacterEntity(self.entity_id.clone()));
            } else {
                self.events.push(AvatarEvent::CharacterEntityLost);
            }
        }
    }

    // Verbs

    /// Sends an operation on behalf of this avatar's mind
    pub fn send(&mut self, mut op: Operation) {
        op.from = Some(self.mind_id.clone());
        self.connection.send(op);
    }

    pub fn say(&mut self, message: &str) {
        let what = EntityData::default().with_attr("say", message);
        self.send(Operation::new(OperationKind::Talk).with_entity_arg(what));
    }

    /// Says something addressed to specific entities
    pub fn say_to(&mut self, message: &str, entity_ids: &[&str]) {
        let addressees: Vec<Element> = entity_ids.iter().map(|id| Element::from(*id)).collect();
        let what = EntityData::default()
            .with_attr("say", message)
            .with_attr("to", addressees);
        self.send(Operation::new(OperationKind::Talk).with_entity_arg(what));
    }

    pub fn emote(&mut self, description: &str) {
        let what = EntityData::new("emote").with_attr("description", description);
        self.send(Operation::new(OperationKind::Imaginary).with_entity_arg(what));
    }

    /// Walks the avatar to a point in its current location
    pub fn move_to_point(&mut self, position: &Point, orientation: Option<&Orientation>) {
        let mut what =
            EntityData::new(self.entity_id.clone()).with_attr("pos", point_to_element(position));
        if let Some(location) = self.entity().and_then(Entity::location) {
            what = what.with_loc(location);
        }
        if let Some(orientation) = orientation {
            what = what.with_attr("orientation", orientation_to_element(orientation));
        }
        self.send(Operation::new(OperationKind::Move).with_entity_arg(what));
    }

    pub fn move_in_direction(&mut self, velocity: &Vector, orientation: Option<&Orientation>) {
        let mut what = EntityData::new(self.entity_id.clone())
            .with_attr("velocity", vector_to_element(velocity));
        if let Some(orientation) = orientation {
            what = what.with_attr("orientation", orientation_to_element(orientation));
        }
        self.send(Operation::new(OperationKind::Move).with_entity_arg(what));
    }

    /// Moves an entity into a container
    pub fn place(
        &mut self,
        entity_id: &str,
        container_id: &str,
        position: Option<&Point>,
        orientation: Option<&Orientation>,
    ) {
        let mut what = EntityData::new(entity_id).with_loc(container_id);
        if let Some(position) = position {
            what = what.with_attr("pos", point_to_element(position));
        }
        if let Some(orientation) = orientation {
            what = what.with_attr("orientation", orientation_to_element(orientation));
        }
        self.send(Operation::new(OperationKind::Move).with_entity_arg(what));
    }

    /// Moves an entity into the avatar's inventory
    pub fn take(&mut self, entity_id: &str) {
        let container_id = self.entity_id.clone();
        self.place(entity_id, &container_id, None, None);
    }

    /// Puts an entity down next to the avatar, `offset` away from it
    pub fn drop(&mut self, entity_id: &str, offset: &Vector) -> Result<(), ViewError> {
        let avatar_entity = self.view.try_get_entity(&self.entity_id)?;
        let Some(location) = avatar_entity.location().map(str::to_string) else {
            return Err(ViewError::InvalidState {
                context: format!("avatar entity '{}' has no location", self.entity_id),
            });
        };
        let position = avatar_entity.predicted_position() + offset;
        self.place(entity_id, &location, Some(&position), None);
        Ok(())
    }

    pub fn touch(&mut self, entity_id: &str, position: Option<&Point>) {
        let mut what = EntityData::new(entity_id);
        if let Some(position) = position {
            what = what.with_attr("pos", point_to_element(position));
        }
        self.send(Operation::new(OperationKind::Touch).with_entity_arg(what));
    }

    pub fn attack(&mut self, entity_id: &str) {
        let what = EntityData::new(entity_id);
        self.send(Operation::new(OperationKind::Other("attack".to_string())).with_entity_arg(what));
    }

    /// An empty Use stops whatever the avatar is currently using
    pub fn use_stop(&mut self) {
        self.send(Operation::new(OperationKind::Use));
    }
}

impl<C: Connection> Drop for Avatar<C> {
    fn drop(&mut self) {
        self.view.shutdown();
        for command in self.view.take_connection_commands() {
            if let ConnectionCommand::UnregisterRouterForFrom(entity_id) = command {
                self.connection.unregister_router_for_from(&entity_id);
            }
        }
        self.connection.unregister_router_for_to(&self.entity_id);
    }
}

struct AvatarLink<'a> {
    now: Instant,
    world_time: &'a mut WorldTime,
    events: &'a mut AvatarEvents,
}

impl AvatarInternal for AvatarLink<'_> {
    fn update_world_time(&mut self, seconds: f64) {
        self.world_time.update(seconds, self.now);
    }

    fn logout_requested(&mut self) {
        self.events.push(AvatarEvent::LogoutRequested);
    }

    fn transfer_requested(&mut self, transfer: TransferInfo) {
        self.events.push(AvatarEvent::TransferRequested(transfer));
    }

    fn hear(&mut self, from: &str, op: &Operation) {
        self.events.push(AvatarEvent::Hear {
            from: from.to_string(),
            op: op.clone(),
        });
    }
}
