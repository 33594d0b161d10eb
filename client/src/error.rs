use thiserror::Error;

use seer_shared::ElementError;

/// Errors that can occur while maintaining a View
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    /// Internal consistency check failed, processing continues
    #[error("Invalid view state: {context}")]
    InvalidState { context: String },

    /// The entity is not in the View
    #[error("Entity '{entity_id}' not found in view")]
    EntityNotFound { entity_id: String },

    /// The entity is already in the View
    #[error("Entity '{entity_id}' already exists in view")]
    EntityAlreadyExists { entity_id: String },
}

/// Errors that can occur while reading or writing Entity properties
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    /// Neither the entity nor its type chain defines the property
    #[error("Property '{name}' not found on entity '{entity_id}'")]
    PropertyNotFound { entity_id: String, name: String },

    /// A native property was set to a value of the wrong shape
    #[error("Invalid value for property '{name}' on entity '{entity_id}': {source}")]
    InvalidPropertyValue {
        entity_id: String,
        name: String,
        #[source]
        source: ElementError,
    },
}
