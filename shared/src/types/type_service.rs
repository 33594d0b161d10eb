use crate::{
    objects::{entity_data::EntityData, operation::Operation},
    types::type_info::TypeLookup,
};

/// Resolves type names into bound [`TypeInfo`](crate::TypeInfo) metadata.
///
/// Binding is asynchronous: looking up a name that is not bound yet returns
/// [`TypeLookup::Unbound`] and starts binding it. Names that finish binding, or
/// that the server reports as unknown, are handed out once through
/// [`take_bound_types`](TypeService::take_bound_types) and
/// [`take_failed_types`](TypeService::take_failed_types).
pub trait TypeService {
    fn type_by_name(&mut self, name: &str) -> TypeLookup;

    /// Type of an entity, or `None` when the data names no type
    fn type_for_data(&mut self, data: &EntityData) -> Option<TypeLookup> {
        let name = data.parent.as_deref()?;
        Some(self.type_by_name(name))
    }

    fn type_for_operation(&mut self, op: &Operation) -> TypeLookup {
        self.type_by_name(op.type_name())
    }

    fn take_bound_types(&mut self) -> Vec<String>;

    fn take_failed_types(&mut self) -> Vec<String>;

    /// Whether the server reported this type as unknown. Failed names stay
    /// unbound for good.
    fn is_failed(&self, name: &str) -> bool;
}
