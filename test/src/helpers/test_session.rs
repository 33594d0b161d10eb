use std::rc::Rc;

use seer_client::{Avatar, AvatarConfig, RouterResult, View, ViewConfig, ViewEvent};
use seer_shared::{ManualClock, Operation, TypeDefinition};

use super::{standard_types, RecordingConnection};

pub const MIND_ID: &str = "mind";
pub const AVATAR_ID: &str = "avatar";

/// An avatar session wired to a recording connection and a manual clock
pub struct TestSession {
    pub avatar: Avatar<RecordingConnection>,
    pub clock: ManualClock,
}

impl TestSession {
    pub fn new() -> Self {
        Self::with_view_config(ViewConfig::default())
    }

    pub fn with_max_pending(max_pending_count: usize) -> Self {
        Self::with_view_config(ViewConfig {
            max_pending_count,
            ..ViewConfig::default()
        })
    }

    pub fn with_view_config(view: ViewConfig) -> Self {
        let clock = ManualClock::new();
        let config = AvatarConfig {
            view,
            ..AvatarConfig::default()
        };
        let connection = RecordingConnection::new(standard_types());
        let avatar = Avatar::with_clock(
            MIND_ID,
            AVATAR_ID,
            connection,
            config,
            Rc::new(clock.clone()),
        );
        Self { avatar, clock }
    }

    pub fn handle(&mut self, op: Operation) -> RouterResult {
        self.avatar.handle_operation(&op)
    }

    pub fn view(&self) -> &View {
        self.avatar.view()
    }

    pub fn connection(&mut self) -> &mut RecordingConnection {
        self.avatar.connection_mut()
    }

    pub fn take_looks(&mut self) -> Vec<String> {
        self.connection().take_looks()
    }

    pub fn take_view_events(&mut self) -> Vec<ViewEvent> {
        self.avatar.view_mut().take_events().collect()
    }

    /// Defines a type on the server side and lets the session pick it up
    pub fn bind_type(&mut self, definition: TypeDefinition) {
        self.connection().types_mut().define(definition);
        self.avatar.update();
    }

    pub fn is_visible(&self, entity_id: &str) -> bool {
        self.view()
            .get_entity(entity_id)
            .is_some_and(|entity| entity.is_visible())
    }
}

impl Default for TestSession {
    fn default() -> Self {
        Self::new()
    }
}
