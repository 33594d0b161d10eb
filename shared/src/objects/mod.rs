pub mod element;
pub mod entity_data;
pub mod operation;
