use seer_shared::{Element, EntityData, Operation, TypeInfo};

/// Extension point for application-specific entity behaviour.
///
/// A [`Factory`](crate::Factory) attaches one to the entities it builds.
/// Every method has an empty default, so implementors only override the
/// callbacks they care about.
pub trait EntityBehaviour {
    /// The entity received its first sight data
    fn on_init(&mut self, _data: &EntityData) {}

    fn on_property_changed(&mut self, _name: &str, _value: &Element) {}

    /// The entity performed an action
    fn on_action(&mut self, _op: &Operation, _ty: &TypeInfo) {}

    /// The entity was hit by another entity
    fn on_hit(&mut self, _op: &Operation, _ty: &TypeInfo) {}

    fn on_talk(&mut self, _data: &EntityData) {}

    /// The entity is about to be removed from the view
    fn on_shutdown(&mut self) {}
}
