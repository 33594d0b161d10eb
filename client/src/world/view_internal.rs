use std::rc::Rc;

use seer_shared::{EntityData, Operation, TypeInfo};

use crate::world::view::View;

/// What the router may do to a View while dispatching an operation
pub(crate) trait ViewInternal {
    fn is_entity_visible(&self, entity_id: &str) -> bool;

    fn sight(&mut self, data: &EntityData, ty: Rc<TypeInfo>);

    fn create(&mut self, data: &EntityData, ty: Rc<TypeInfo>);

    fn appear(&mut self, entity_id: &str, stamp: Option<f64>);

    fn disappear(&mut self, entity_id: &str);

    fn delete_entity(&mut self, entity_id: &str);

    fn unseen(&mut self, entity_id: &str);

    fn get_entity_from_server(&mut self, entity_id: &str);

    fn set_entity_properties(&mut self, data: &EntityData);

    fn entity_action(&mut self, entity_id: &str, op: &Operation, ty: &TypeInfo);

    fn entity_hit(&mut self, entity_id: &str, op: &Operation, ty: &TypeInfo);

    fn entity_talk(&mut self, entity_id: &str, data: &EntityData);

    fn entity_sound(&mut self, entity_id: &str, op: &Operation);

    fn entity_imaginary(&mut self, entity_id: &str, op: &Operation);
}

impl ViewInternal for View {
    fn is_entity_visible(&self, entity_id: &str) -> bool {
        self.get_entity(entity_id)
            .is_some_and(|entity| entity.is_visible())
    }

    fn sight(&mut self, data: &EntityData, ty: Rc<TypeInfo>) {
        View::sight(self, data, ty);
    }

    fn create(&mut self, data: &EntityData, ty: Rc<TypeInfo>) {
        View::create(self, data, ty);
    }

    fn appear(&mut self, entity_id: &str, stamp: Option<f64>) {
        View::appear(self, entity_id, stamp);
    }

    fn disappear(&mut self, entity_id: &str) {
        View::disappear(self, entity_id);
    }

    fn delete_entity(&mut self, entity_id: &str) {
        View::delete_entity(self, entity_id);
    }

    fn unseen(&mut self, entity_id: &str) {
        View::unseen(self, entity_id);
    }

    fn get_entity_from_server(&mut self, entity_id: &str) {
        View::get_entity_from_server(self, entity_id);
    }

    fn set_entity_properties(&mut self, data: &EntityData) {
        View::set_entity_properties(self, data);
    }

    fn entity_action(&mut self, entity_id: &str, op: &Operation, ty: &TypeInfo) {
        View::entity_action(self, entity_id, op, ty);
    }

    fn entity_hit(&mut self, entity_id: &str, op: &Operation, ty: &TypeInfo) {
        View::entity_hit(self, entity_id, op, ty);
    }

    fn entity_talk(&mut self, entity_id: &str, data: &EntityData) {
        View::entity_talk(self, entity_id, data);
    }

    fn entity_sound(&mut self, entity_id: &str, op: &Operation) {
        View::entity_sound(self, entity_id, op);
    }

    fn entity_imaginary(&mut self, entity_id: &str, op: &Operation) {
        View::entity_imaginary(self, entity_id, op);
    }
}
