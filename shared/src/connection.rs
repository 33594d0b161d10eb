use crate::{objects::operation::Operation, types::type_service::TypeService};

/// Outbound side of the server connection, as seen by a session.
///
/// Routing registrations tell the connection which inbound operations belong
/// to the session: operations addressed *to* the avatar entity and operations
/// originating *from* entities the session has seen.
pub trait Connection {
    fn send(&mut self, op: Operation);

    fn register_router_for_to(&mut self, entity_id: &str);

    fn unregister_router_for_to(&mut self, entity_id: &str);

    fn register_router_for_from(&mut self, entity_id: &str);

    fn unregister_router_for_from(&mut self, entity_id: &str);

    fn type_service(&mut self) -> &mut dyn TypeService;
}
