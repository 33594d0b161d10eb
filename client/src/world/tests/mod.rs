#![cfg(test)]

use std::rc::Rc;

use seer_shared::{Element, EntityData, ManualClock, OperationKind, TypeInfo};

use crate::{
    config::ViewConfig,
    events::ViewEvent,
    world::view::{ConnectionCommand, View},
};


const AVATAR_ID: &str = "avatar";

fn thing() -> Rc<TypeInfo> {
    Rc::new(TypeInfo::root("thing"))
}

fn view_with_cap(max_pending_count: usize) -> (View, ManualClock) {
    let clock = ManualClock::new();
    let config = ViewConfig {
        max_pending_count,
        ..ViewConfig::default()
    };
    let view = View::new("mind", AVATAR_ID, config, Rc::new(clock.clone()));
    (view, clock)
}

fn view() -> (View, ManualClock) {
    view_with_cap(ViewConfig::default().max_pending_count)
}

fn numbers(values: &[f64]) -> Element {
    Element::from(values)
}

/// Sight of an entity with no location, which becomes the top level
fn sight_root(view: &mut View, entity_id: &str) {
    view.sight(&EntityData::new(entity_id), thing());
}

fn sight_in(view: &mut View, entity_id: &str, location_id: &str) {
    view.sight(&EntityData::new(entity_id).with_loc(location_id), thing());
}

/// Ids targeted by the LOOKs sent since the last call, the anonymous look
/// shows up as ""
fn sent_looks(view: &mut View) -> Vec<String> {
    view.take_connection_commands()
        .into_iter()
        .filter_map(|command| match command {
            ConnectionCommand::Send(op) if op.kind == OperationKind::Look => Some(
                op.first_entity_arg()
                    .map(|data| data.id.clone())
                    .unwrap_or_default(),
            ),
            _ => None,
        })
        .collect()
}

fn taken_events(view: &mut View) -> Vec<ViewEvent> {
    view.take_events().collect()
}
