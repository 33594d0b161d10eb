pub mod error;
pub mod type_info;
pub mod type_registry;
pub mod type_service;
