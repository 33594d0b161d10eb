use thiserror::Error;

/// Errors that can occur while defining or resolving types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// A definition arrived for a type that is already defined
    #[error("Type '{name}' is already defined")]
    AlreadyDefined { name: String },

    /// The type's parent chain leads back to itself
    #[error("Type '{name}' has a cyclic parent chain")]
    CyclicParent { name: String },

    /// The type is neither bound nor awaiting its parent
    #[error("Type '{name}' is unknown")]
    UnknownType { name: String },
}
