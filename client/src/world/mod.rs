pub mod behaviour;
pub mod entity;
pub mod factory;
pub mod pending_sights;
pub mod prediction;
pub mod task;
pub mod view;
pub mod view_internal;

#[cfg(test)]
mod tests;
