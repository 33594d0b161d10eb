//! # Seer Client
//! Client-side mirror of the world one avatar perceives. The server reports
//! entity visibility as discrete, possibly out-of-order operations; this
//! crate reconciles them into a consistent View, requests what is missing,
//! and predicts motion between authoritative updates.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod avatar;
mod config;
mod error;
mod events;
mod router;
mod signal;
mod world;

pub use avatar::{
    avatar::Avatar,
    avatar_events::{AvatarEvent, AvatarEvents},
    world_time::WorldTime,
};
pub use config::{AvatarConfig, ViewConfig};
pub use error::{EntityError, ViewError};
pub use events::{EntityEvent, ViewEvent, ViewEvents};
pub use router::{
    ig_router::{IGRouter, RouterResult},
    transfer_info::TransferInfo,
};
pub use signal::{Signal, SlotHandle};
pub use world::{
    behaviour::EntityBehaviour,
    entity::{Entity, ObserverHandle, PredictedState},
    factory::Factory,
    pending_sights::SightAction,
    task::Task,
    view::{ConnectionCommand, SightHandle, View},
};
