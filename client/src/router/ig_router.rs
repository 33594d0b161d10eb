use log::{debug, info, warn};

use seer_shared::{
    Element, EntityData, Operation, OperationArg, OperationKind, TypeLookup, TypeService,
};

use crate::{
    router::{transfer_info::TransferInfo, type_bound_waitlist::TypeBoundWaitlist},
    world::view_internal::ViewInternal,
};

/// Outcome of routing one inbound operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterResult {
    Handled,
    Ignored,
}

impl RouterResult {
    fn or(self, other: RouterResult) -> RouterResult {
        if self == RouterResult::Handled || other == RouterResult::Handled {
            RouterResult::Handled
        } else {
            RouterResult::Ignored
        }
    }
}

/// Session-level effects of routing
pub(crate) trait AvatarInternal {
    fn update_world_time(&mut self, seconds: f64);

    fn logout_requested(&mut self);

    fn transfer_requested(&mut self, transfer: TransferInfo);

    fn hear(&mut self, from: &str, op: &Operation);
}

/// Everything an operation may touch while it is routed
pub(crate) struct RouterContext<'a> {
    pub view: &'a mut dyn ViewInternal,
    pub types: &'a mut dyn TypeService,
    pub avatar: &'a mut dyn AvatarInternal,
}

/// Routes in-game operations addressed to an avatar into its View.
///
/// Operations that reference a type the type service has not bound yet are
/// held in a waitlist and handed back for redispatch once the type binds.
pub struct IGRouter {
    action_type: String,
    waitlist: TypeBoundWaitlist,
}

impl IGRouter {
    pub fn new(action_type: &str) -> Self {
        Self {
            action_type: action_type.to_string(),
            waitlist: TypeBoundWaitlist::new(),
        }
    }

    pub fn action_type(&self) -> &str {
        &self.action_type
    }

    /// Number of operations waiting for a type to bind
    pub fn waiting_count(&self) -> usize {
        self.waitlist.len()
    }

    pub(crate) fn handle_operation(
        &mut self,
        op: &Operation,
        ctx: &mut RouterContext<'_>,
    ) -> RouterResult {
        if let Some(seconds) = op.seconds {
            ctx.avatar.update_world_time(seconds);
        }

        match op.kind {
            OperationKind::Sight => self.handle_sight(op, ctx),
            OperationKind::Sound => self.handle_sound(op, ctx),
            OperationKind::Appearance => {
                for data in op.entity_args() {
                    if !data.has_id() {
                        warn!("Appearance argument without id");
                        continue;
                    }
                    ctx.view.appear(&data.id, data.stamp);
                }
                RouterResult::Handled
            }
            OperationKind::Disappearance => {
                for data in op.entity_args() {
                    if !data.has_id() {
                        warn!("Disappearance argument without id");
                        continue;
                    }
                    ctx.view.disappear(&data.id);
                }
                RouterResult::Handled
            }
            OperationKind::Unseen => {
                if op.args.is_empty() {
                    warn!("Got unseen with no args");
                    return RouterResult::Ignored;
                }
                for data in op.entity_args().filter(|data| data.has_id()) {
                    ctx.view.unseen(&data.id);
                }
                RouterResult::Handled
            }
            OperationKind::Logout => Self::handle_logout(op, ctx),
            _ => RouterResult::Ignored,
        }
    }

    /// Operations deferred on `bound_types`, ready to be routed again
    pub(crate) fn take_redispatches(&mut self, bound_types: &[String]) -> Vec<Operation> {
        if bound_types.is_empty() {
            return Vec::new();
        }
        self.waitlist.collect_ready(bound_types)
    }

    pub(crate) fn drop_failed(&mut self, failed_types: &[String]) {
        self.waitlist.remove_failed(failed_types);
    }

    fn defer(
        &mut self,
        types: &dyn TypeService,
        type_name: &str,
        op: Operation,
    ) -> RouterResult {
        if types.is_failed(type_name) {
            warn!("Ignoring {} of failed type '{}'", op.type_name(), type_name);
            return RouterResult::Ignored;
        }
        self.waitlist.queue(type_name, op);
        RouterResult::Handled
    }

    fn handle_sight(&mut self, sight: &Operation, ctx: &mut RouterContext<'_>) -> RouterResult {
        if sight.args.is_empty() {
            warn!("Got sight with no args");
            return RouterResult::Ignored;
        }

        let mut result = RouterResult::Ignored;
        for arg in &sight.args {
            let arg_result = match arg {
                OperationArg::Operation(op) => self.handle_sight_op(sight, op, ctx),
                OperationArg::Entity(data) => self.handle_sight_entity(sight, arg, data, ctx),
            };
            result = result.or(arg_result);
        }
        result
    }

    fn handle_sight_entity(
        &mut self,
        sight: &Operation,
        arg: &OperationArg,
        data: &EntityData,
        ctx: &mut RouterContext<'_>,
    ) -> RouterResult {
        if !data.has_id() {
            warn!("Ignoring sight of entity without id");
            return RouterResult::Ignored;
        }
        match ctx.types.type_for_data(data) {
            Some(TypeLookup::Bound(ty)) => {
                ctx.view.sight(data, ty);
                RouterResult::Handled
            }
            Some(TypeLookup::Unbound(type_name)) => {
                self.defer(&*ctx.types, &type_name, sight.with_single_arg(arg.clone()))
            }
            None => {
                warn!("Ignoring sight of entity '{}' without type", data.id);
                RouterResult::Ignored
            }
        }
    }

    fn handle_sight_op(
        &mut self,
        sight: &Operation,
        op: &Operation,
        ctx: &mut RouterContext<'_>,
    ) -> RouterResult {
        match op.kind {
            OperationKind::Set => {
                for data in op.entity_args().filter(|data| data.has_id()) {
                    if ctx.view.is_entity_visible(&data.id) {
                        ctx.view.set_entity_properties(data);
                    } else {
                        ctx.view.get_entity_from_server(&data.id);
                    }
                }
                return RouterResult::Handled;
            }
            OperationKind::Create => return self.handle_sight_create(sight, op, ctx),
            OperationKind::Delete => {
                for data in op.entity_args().filter(|data| data.has_id()) {
                    ctx.view.delete_entity(&data.id);
                }
                return RouterResult::Handled;
            }
            _ => {}
        }

        let ty = match ctx.types.type_for_operation(op) {
            TypeLookup::Bound(ty) => ty,
            TypeLookup::Unbound(type_name) => {
                let arg = OperationArg::Operation(Box::new(op.clone()));
                return self.defer(&*ctx.types, &type_name, sight.with_single_arg(arg));
            }
        };

        let mut result = RouterResult::Ignored;

        if op.kind == OperationKind::Hit {
            match op.to.as_deref() {
                Some(to) => {
                    ctx.view.entity_hit(to, op, &ty);
                    result = RouterResult::Handled;
                }
                None => warn!("Got hit with no target"),
            }
        }

        if op.kind == OperationKind::Imaginary {
            match op.from.as_deref() {
                Some(from) => ctx.view.entity_imaginary(from, op),
                None => warn!("Got imaginary with no source"),
            }
            return RouterResult::Handled;
        }

        if ty.is_a(&self.action_type) {
            match op.from.as_deref() {
                Some(from) => {
                    ctx.view.entity_action(from, op, &ty);
                    result = RouterResult::Handled;
                }
                None => warn!("Got {} action with no source", op.type_name()),
            }
        }

        result
    }

    /// Every created entity's type must be bound before any of them is
    /// built, so that a redispatch never creates an entity twice
    fn handle_sight_create(
        &mut self,
        sight: &Operation,
        create: &Operation,
        ctx: &mut RouterContext<'_>,
    ) -> RouterResult {
        let mut resolved = Vec::new();
        for data in create.entity_args() {
            if !data.has_id() {
                warn!("Ignoring create without id");
                continue;
            }
            match ctx.types.type_for_data(data) {
                Some(TypeLookup::Bound(ty)) => resolved.push((data, ty)),
                Some(TypeLookup::Unbound(type_name)) => {
                    let arg = OperationArg::Operation(Box::new(create.clone()));
                    return self.defer(&*ctx.types, &type_name, sight.with_single_arg(arg));
                }
                None => warn!("Ignoring create of '{}' without type", data.id),
            }
        }

        if resolved.is_empty() {
            return RouterResult::Ignored;
        }
        for (data, ty) in resolved {
            ctx.view.create(data, ty);
        }
        RouterResult::Handled
    }

    fn handle_sound(&mut self, sound: &Operation, ctx: &mut RouterContext<'_>) -> RouterResult {
        if sound.args.is_empty() {
            warn!("Got sound with no args");
            return RouterResult::Ignored;
        }

        let mut result = RouterResult::Ignored;
        for arg in &sound.args {
            let Some(op) = arg.as_operation() else {
                debug!("Ignoring non-operation sound argument");
                continue;
            };
            let Some(from) = op.from.as_deref().or(sound.from.as_deref()) else {
                warn!("Got sound of {} with no source", op.type_name());
                continue;
            };

            if op.kind == OperationKind::Talk {
                if let Some(data) = op.first_entity_arg() {
                    ctx.view.entity_talk(from, data);
                }
            } else {
                match ctx.types.type_for_operation(op) {
                    TypeLookup::Bound(_) => ctx.view.entity_sound(from, op),
                    TypeLookup::Unbound(type_name) => {
                        let deferred = sound.with_single_arg(arg.clone());
                        result = result.or(self.defer(&*ctx.types, &type_name, deferred));
                        continue;
                    }
                }
            }

            ctx.avatar.hear(from, op);
            result = RouterResult::Handled;
        }
        result
    }

    fn handle_logout(op: &Operation, ctx: &mut RouterContext<'_>) -> RouterResult {
        let transfer = op
            .args
            .get(1)
            .and_then(OperationArg::as_entity)
            .and_then(parse_transfer);

        match transfer {
            Some(transfer) => {
                info!(
                    "Server requested transfer to {}:{}",
                    transfer.host, transfer.port
                );
                ctx.avatar.transfer_requested(transfer);
            }
            None => {
                info!("Server requested logout");
                ctx.avatar.logout_requested();
            }
        }
        RouterResult::Handled
    }
}

fn parse_transfer(data: &EntityData) -> Option<TransferInfo> {
    let host = data.attr("teleport_host").and_then(Element::as_str)?;
    let port = data.attr("teleport_port").and_then(Element::as_int)?;
    let possess_key = data.attr("possess_key").and_then(Element::as_str)?;
    let possess_entity_id = data.attr("possess_entity_id").and_then(Element::as_str)?;
    Some(TransferInfo::new(host, port, possess_key, possess_entity_id))
}
