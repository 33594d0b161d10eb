/// ROUTER DISPATCH: inbound operations reaching the View and the session
///
/// Covers the operation classes the router reacts to and the ones it leaves
/// alone.

use seer_client::{AvatarEvent, EntityEvent, RouterResult, TransferInfo, ViewEvent};
use seer_shared::{EntityData, Operation, OperationKind};
use seer_test::{
    appearance, assert_not_visible, assert_visible, disappearance, set, sight, sight_of_op,
    thing_in, world, TestSession, AVATAR_ID,
};

fn session_with(entity_ids: &[&str]) -> TestSession {
    let mut session = TestSession::new();
    session.handle(sight(world("w")));
    for entity_id in entity_ids {
        session.handle(sight(thing_in(entity_id, "w")));
    }
    session.take_looks();
    session.take_view_events();
    session
}

#[test]
fn unrelated_operations_are_ignored() {
    let mut session = session_with(&[]);
    let touch = Operation::new(OperationKind::Touch).with_entity_arg(EntityData::new("w"));
    assert_eq!(session.handle(touch), RouterResult::Ignored);
    assert_eq!(
        session.handle(Operation::new(OperationKind::Sight)),
        RouterResult::Ignored
    );
}

#[test]
fn appearance_and_disappearance_toggle_visibility() {
    let mut session = session_with(&["rock"]);

    session.handle(disappearance("rock"));
    assert_not_visible!(session, "rock");
    assert!(session
        .take_view_events()
        .contains(&ViewEvent::Disappearance("rock".to_string())));

    session.handle(appearance("rock", None));
    assert_visible!(session, "rock");
    assert!(session.take_looks().is_empty());
}

#[test]
fn set_on_visible_entity_updates_properties() {
    let mut session = session_with(&["rock"]);

    session.handle(set(EntityData::new("rock").with_attr("mass", 12.0)));

    let rock = session.view().get_entity("rock").unwrap();
    assert_eq!(
        rock.ptr_of_property("mass").and_then(|mass| mass.as_float()),
        Some(12.0)
    );
    assert!(session.take_looks().is_empty());
}

#[test]
fn set_on_hidden_entity_looks_again() {
    let mut session = session_with(&["rock"]);
    session.handle(disappearance("rock"));

    session.handle(set(EntityData::new("rock").with_attr("mass", 12.0)));

    assert_eq!(session.take_looks(), vec!["rock"]);
    let rock = session.view().get_entity("rock").unwrap();
    assert!(rock.ptr_of_property("mass").is_none());
}

#[test]
fn set_on_unknown_entity_looks_once() {
    let mut session = session_with(&[]);

    session.handle(set(EntityData::new("ghost").with_attr("mass", 1.0)));
    session.handle(set(EntityData::new("ghost").with_attr("mass", 2.0)));

    assert_eq!(session.take_looks(), vec!["ghost"]);
}

#[test]
fn set_on_unknown_entity_respects_the_look_cap() {
    let mut session = TestSession::with_max_pending(1);
    session.handle(sight(world("w")));
    session.take_looks();

    session.handle(appearance("a", None));
    session.handle(set(EntityData::new("b").with_attr("mass", 1.0)));

    assert_eq!(session.take_looks(), vec!["a"]);
    assert_eq!(session.view().in_flight_count(), 1);
    assert_eq!(session.view().queued_looks().collect::<Vec<_>>(), vec!["b"]);
}

#[test]
fn hit_reaches_target_and_attacker() {
    let mut session = session_with(&["wolf", "sheep"]);
    let hit = Operation::new(OperationKind::Hit)
        .with_from("wolf")
        .with_to("sheep");

    assert_eq!(session.handle(sight_of_op(hit.clone())), RouterResult::Handled);

    let events = session.take_view_events();
    assert!(events.contains(&ViewEvent::Entity(
        "sheep".to_string(),
        EntityEvent::Hit(hit.clone())
    )));
    assert!(events.contains(&ViewEvent::Entity(
        "wolf".to_string(),
        EntityEvent::Acted(hit)
    )));
}

#[test]
fn imaginary_becomes_an_emote() {
    let mut session = session_with(&["bard"]);
    let imaginary = Operation::new(OperationKind::Imaginary)
        .with_from("bard")
        .with_entity_arg(EntityData::new("emote").with_attr("description", "bows"));

    session.handle(sight_of_op(imaginary));

    let events = session.take_view_events();
    assert_eq!(
        events,
        vec![ViewEvent::Entity(
            "bard".to_string(),
            EntityEvent::Emote("bows".to_string())
        )]
    );
}

#[test]
fn talk_is_said_by_the_speaker_and_heard_by_the_avatar() {
    let mut session = session_with(&["bard"]);
    let what = EntityData::default().with_attr("say", "hello");
    let talk = Operation::new(OperationKind::Talk)
        .with_from("bard")
        .with_entity_arg(what.clone());
    let sound = Operation::new(OperationKind::Sound)
        .with_from("bard")
        .with_operation_arg(talk.clone());
    session.avatar.take_events();

    assert_eq!(session.handle(sound), RouterResult::Handled);

    assert!(session.take_view_events().contains(&ViewEvent::Entity(
        "bard".to_string(),
        EntityEvent::Say(what)
    )));
    let heard: Vec<AvatarEvent> = session.avatar.take_events().collect();
    assert_eq!(
        heard,
        vec![AvatarEvent::Hear {
            from: "bard".to_string(),
            op: talk
        }]
    );
}

#[test]
fn operation_seconds_drive_world_time() {
    let mut session = session_with(&[]);
    session.handle(appearance("w", None).with_seconds(120.0));
    assert_eq!(session.avatar.world_time(), 120.0);

    session.clock.advance_secs_f64(2.0);
    assert!((session.avatar.world_time() - 122.0).abs() < 1e-9);
}

#[test]
fn plain_logout_requests_logout() {
    let mut session = session_with(&[]);
    session.avatar.take_events();

    let logout =
        Operation::new(OperationKind::Logout).with_entity_arg(EntityData::new(AVATAR_ID));
    assert_eq!(session.handle(logout), RouterResult::Handled);

    let events: Vec<AvatarEvent> = session.avatar.take_events().collect();
    assert_eq!(events, vec![AvatarEvent::LogoutRequested]);
}

#[test]
fn logout_with_teleport_details_requests_transfer() {
    let mut session = session_with(&[]);
    session.avatar.take_events();

    let destination = EntityData::default()
        .with_attr("teleport_host", "elsewhere.example")
        .with_attr("teleport_port", 6767_i64)
        .with_attr("possess_key", "secret")
        .with_attr("possess_entity_id", "avatar2");
    let logout = Operation::new(OperationKind::Logout)
        .with_entity_arg(EntityData::new(AVATAR_ID))
        .with_entity_arg(destination);
    session.handle(logout);

    let events: Vec<AvatarEvent> = session.avatar.take_events().collect();
    assert_eq!(
        events,
        vec![AvatarEvent::TransferRequested(TransferInfo::new(
            "elsewhere.example",
            6767,
            "secret",
            "avatar2"
        ))]
    );
}
