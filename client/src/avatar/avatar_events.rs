use std::vec::IntoIter;

use seer_shared::{EntityId, Operation};

use crate::router::transfer_info::TransferInfo;

#[derive(Debug, Clone, PartialEq)]
pub enum AvatarEvent {
    /// The avatar's own entity was seen for the first time
    GotCharacterEntity(EntityId),
    /// The avatar's own entity left the view
    CharacterEntityLost,
    LogoutRequested,
    TransferRequested(TransferInfo),
    Hear { from: EntityId, op: Operation },
}

pub struct AvatarEvents {
    events: Vec<AvatarEvent>,
    empty: bool,
}

impl Default for AvatarEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl AvatarEvents {
    pub(crate) fn new() -> Self {
        Self {
            events: Vec::new(),
            empty: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AvatarEvent> {
        self.events.iter()
    }

    pub fn take(&mut self) -> IntoIter<AvatarEvent> {
        self.empty = true;
        std::mem::take(&mut self.events).into_iter()
    }

    pub(crate) fn push(&mut self, event: AvatarEvent) {
        self.events.push(event);
        self.empty = false;
    }
}
