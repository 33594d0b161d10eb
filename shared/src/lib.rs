//! # Seer Shared
//! Common vocabulary shared by the seer client crates: object protocol
//! values, type metadata, and the connection and clock abstractions a
//! session is driven through.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod clock;
mod connection;
pub mod math;
mod objects;
mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use connection::Connection;
pub use math::{BoundingBox, Orientation, Point, Vector};
pub use objects::{
    element::{Element, ElementError, PropertyMap},
    entity_data::{EntityData, RESERVED_ATTRIBUTES},
    operation::{Operation, OperationArg, OperationKind},
};
pub use types::{
    error::TypeError,
    type_info::{Ancestors, TypeInfo, TypeLookup},
    type_registry::{TypeDefinition, TypeRegistry},
    type_service::TypeService,
};

/// Identifier of an entity, unique within a view
pub type EntityId = String;
