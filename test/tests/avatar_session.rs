/// AVATAR SESSION: the player's side of the conversation
///
/// Verbs are sent from the avatar's mind, the session tracks its own entity,
/// and dropping the session withdraws its routing.

use seer_client::{AvatarEvent, ViewError};
use seer_shared::{
    math::{point_from_element, point_to_element, vector_from_element},
    Element, OperationKind, Point, Vector,
};
use seer_test::{deletion, sight, thing_in, world, TestSession, AVATAR_ID, MIND_ID};

fn session_with_character() -> TestSession {
    let mut session = TestSession::new();
    session.handle(sight(world("w")));
    session.handle(sight(
        thing_in(AVATAR_ID, "w").with_attr("pos", point_to_element(&Point::new(5.0, 0.0, 0.0))),
    ));
    session.connection().take_sent();
    session
}

#[test]
fn session_routes_operations_for_its_entity() {
    let mut session = TestSession::new();
    assert!(session.connection().is_routing_to(AVATAR_ID));
    assert_eq!(session.avatar.mind_id(), MIND_ID);
    assert_eq!(session.avatar.entity_id(), AVATAR_ID);
}

#[test]
fn seeing_own_entity_is_reported_once() {
    let mut session = TestSession::new();
    session.handle(sight(world("w")));
    session.handle(sight(thing_in(AVATAR_ID, "w")));
    session.handle(sight(thing_in(AVATAR_ID, "w")));

    let events: Vec<AvatarEvent> = session.avatar.take_events().collect();
    assert_eq!(
        events,
        vec![AvatarEvent::GotCharacterEntity(AVATAR_ID.to_string())]
    );
    assert!(session.avatar.entity().is_some());
}

#[test]
fn losing_own_entity_is_reported() {
    let mut session = session_with_character();
    session.avatar.take_events();

    session.handle(deletion(AVATAR_ID));

    let events: Vec<AvatarEvent> = session.avatar.take_events().collect();
    assert_eq!(events, vec![AvatarEvent::CharacterEntityLost]);
    assert!(session
        .take_view_events()
        .contains(&seer_client::ViewEvent::AvatarEntityDeleted));
}

#[test]
fn verbs_are_sent_from_the_mind() {
    let mut session = session_with_character();

    session.avatar.say("hello");
    session.avatar.emote("waves");
    session.avatar.touch("w", None);
    session.avatar.attack("wolf");
    session.avatar.use_stop();

    let sent = session.connection().take_sent();
    let kinds: Vec<&str> = sent.iter().map(|op| op.type_name()).collect();
    assert_eq!(kinds, vec!["talk", "imaginary", "touch", "attack", "use"]);
    assert!(sent.iter().all(|op| op.from.as_deref() == Some(MIND_ID)));

    let said = sent[0].first_entity_arg().unwrap();
    assert_eq!(said.attr("say").and_then(Element::as_str), Some("hello"));
}

#[test]
fn say_to_lists_addressees() {
    let mut session = session_with_character();
    session.avatar.say_to("psst", &["bard", "wolf"]);

    let sent = session.connection().take_sent();
    let what = sent[0].first_entity_arg().unwrap();
    let addressees: Vec<&str> = what
        .attr("to")
        .and_then(Element::as_list)
        .unwrap()
        .iter()
        .filter_map(Element::as_str)
        .collect();
    assert_eq!(addressees, vec!["bard", "wolf"]);
}

#[test]
fn move_to_point_uses_current_location() {
    let mut session = session_with_character();
    session.avatar.move_to_point(&Point::new(1.0, 2.0, 0.0), None);

    let sent = session.connection().take_sent();
    assert_eq!(sent[0].kind, OperationKind::Move);
    let what = sent[0].first_entity_arg().unwrap();
    assert_eq!(what.id, AVATAR_ID);
    assert_eq!(what.loc.as_deref(), Some("w"));
    assert_eq!(
        point_from_element(what.attr("pos").unwrap()).unwrap(),
        Point::new(1.0, 2.0, 0.0)
    );
}

#[test]
fn move_in_direction_sends_velocity() {
    let mut session = session_with_character();
    session
        .avatar
        .move_in_direction(&Vector::new(0.0, 0.0, 1.5), None);

    let sent = session.connection().take_sent();
    let what = sent[0].first_entity_arg().unwrap();
    assert_eq!(what.id, AVATAR_ID);
    assert_eq!(
        vector_from_element(what.attr("velocity").unwrap()).unwrap(),
        Vector::new(0.0, 0.0, 1.5)
    );
    assert!(what.attr("orientation").is_none());
}

#[test]
fn admin_flag_is_a_local_hint() {
    let mut session = TestSession::new();
    assert!(!session.avatar.is_admin());
    session.avatar.set_admin(true);
    assert!(session.avatar.is_admin());
    assert!(session.connection().sent().is_empty());
}

#[test]
fn take_moves_entity_into_inventory() {
    let mut session = session_with_character();
    session.avatar.take("apple");

    let sent = session.connection().take_sent();
    let what = sent[0].first_entity_arg().unwrap();
    assert_eq!(what.id, "apple");
    assert_eq!(what.loc.as_deref(), Some(AVATAR_ID));
}

#[test]
fn drop_places_entity_beside_the_avatar() {
    let mut session = session_with_character();
    session
        .avatar
        .drop("apple", &Vector::new(0.0, 1.0, 0.0))
        .unwrap();

    let sent = session.connection().take_sent();
    let what = sent[0].first_entity_arg().unwrap();
    assert_eq!(what.loc.as_deref(), Some("w"));
    assert_eq!(
        point_from_element(what.attr("pos").unwrap()).unwrap(),
        Point::new(5.0, 1.0, 0.0)
    );
}

#[test]
fn drop_without_own_entity_fails() {
    let mut session = TestSession::new();
    let result = session.avatar.drop("apple", &Vector::zeros());

    assert_eq!(
        result,
        Err(ViewError::EntityNotFound {
            entity_id: AVATAR_ID.to_string()
        })
    );
    assert!(session.connection().sent().is_empty());
}

#[test]
fn dropping_the_session_withdraws_routing() {
    let mut session = session_with_character();
    session.handle(sight(thing_in("rock", "w")));
    assert!(session.connection().is_routing_from("rock"));
    let routes = session.connection().route_table();

    drop(session);

    let routes = routes.borrow();
    assert!(routes.to.is_empty());
    assert!(routes.from.is_empty());
}
