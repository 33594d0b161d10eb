use std::{cell::RefCell, collections::BTreeSet, rc::Rc};

use seer_shared::{Connection, Operation, OperationKind, TypeRegistry, TypeService};

/// Entities a connection currently routes operations for. Shared, so it can
/// be inspected after the session owning the connection is gone.
#[derive(Debug, Default)]
pub struct RouteTable {
    pub to: BTreeSet<String>,
    pub from: BTreeSet<String>,
}

/// Connection that records everything a session sends or registers, backed
/// by an in-memory type registry
pub struct RecordingConnection {
    types: TypeRegistry,
    sent: Vec<Operation>,
    routes: Rc<RefCell<RouteTable>>,
}

impl RecordingConnection {
    pub fn new(types: TypeRegistry) -> Self {
        Self {
            types,
            sent: Vec::new(),
            routes: Rc::new(RefCell::new(RouteTable::default())),
        }
    }

    pub fn types_mut(&mut self) -> &mut TypeRegistry {
        &mut self.types
    }

    pub fn sent(&self) -> &[Operation] {
        &self.sent
    }

    pub fn take_sent(&mut self) -> Vec<Operation> {
        std::mem::take(&mut self.sent)
    }

    /// Targets of the LOOKs sent since the last take, "" for an anonymous
    /// look. Other sent operations are kept.
    pub fn take_looks(&mut self) -> Vec<String> {
        let (looks, rest): (Vec<Operation>, Vec<Operation>) = self
            .take_sent()
            .into_iter()
            .partition(|op| op.kind == OperationKind::Look);
        self.sent = rest;
        looks
            .iter()
            .map(|op| {
                op.first_entity_arg()
                    .map(|data| data.id.clone())
                    .unwrap_or_default()
            })
            .collect()
    }

    pub fn route_table(&self) -> Rc<RefCell<RouteTable>> {
        self.routes.clone()
    }

    pub fn is_routing_to(&self, entity_id: &str) -> bool {
        self.routes.borrow().to.contains(entity_id)
    }

    pub fn is_routing_from(&self, entity_id: &str) -> bool {
        self.routes.borrow().from.contains(entity_id)
    }
}

impl Connection for RecordingConnection {
    fn send(&mut self, op: Operation) {
        self.sent.push(op);
    }

    fn register_router_for_to(&mut self, entity_id: &str) {
        self.routes.borrow_mut().to.insert(entity_id.to_string());
    }

    fn unregister_router_for_to(&mut self, entity_id: &str) {
        self.routes.borrow_mut().to.remove(entity_id);
    }

    fn register_router_for_from(&mut self, entity_id: &str) {
        self.routes.borrow_mut().from.insert(entity_id.to_string());
    }

    fn unregister_router_for_from(&mut self, entity_id: &str) {
        self.routes.borrow_mut().from.remove(entity_id);
    }

    fn type_service(&mut self) -> &mut dyn TypeService {
        &mut self.types
    }
}
