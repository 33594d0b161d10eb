pub mod avatar;
pub mod avatar_events;
pub mod world_time;
