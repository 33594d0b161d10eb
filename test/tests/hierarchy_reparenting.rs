/// HIERARCHY: containment changes driven by inbound operations
///
/// Deleting a container hands its children to the container's own location
/// without moving them in the world. Children seen before their location wait
/// for it.

use std::f64::consts::FRAC_PI_2;

use seer_client::{EntityEvent, ViewEvent};
use seer_shared::{
    math::{orientation_to_element, point_to_element},
    EntityData, Orientation, Point, Vector,
};
use seer_test::{assert_visible, deletion, set, sight, thing_in, unseen, world, TestSession};

const EPSILON: f64 = 1e-9;

fn placed(entity_id: &str, location_id: &str, position: Point, orientation: Orientation) -> EntityData {
    thing_in(entity_id, location_id)
        .with_attr("pos", point_to_element(&position))
        .with_attr("orientation", orientation_to_element(&orientation))
}

#[test]
fn deleted_container_hands_children_to_its_location() {
    let mut session = TestSession::new();
    let quarter_turn = Orientation::from_axis_angle(&Vector::z_axis(), FRAC_PI_2);
    session.handle(sight(world("w")));
    session.handle(sight(placed("chest", "w", Point::new(1.0, 0.0, 0.0), quarter_turn)));
    session.handle(sight(placed(
        "coin",
        "chest",
        Point::new(1.0, 0.0, 0.0),
        Orientation::identity(),
    )));
    session.take_view_events();

    session.handle(deletion("chest"));

    let view = session.view();
    assert!(view.get_entity("chest").is_none());
    let coin = view.get_entity("coin").unwrap();
    assert_eq!(coin.location(), Some("w"));
    assert!((coin.position() - Point::new(1.0, 1.0, 0.0)).norm() < EPSILON);
    assert!(coin.orientation().angle_to(&quarter_turn) < EPSILON);
    assert_visible!(session, "coin");

    let events = session.take_view_events();
    assert!(events.contains(&ViewEvent::Entity(
        "w".to_string(),
        EntityEvent::ChildAdded("coin".to_string())
    )));
    assert!(events.contains(&ViewEvent::EntityDeleted("chest".to_string())));
}

#[test]
fn child_seen_before_its_location_waits_for_it() {
    let mut session = TestSession::new();
    session.handle(sight(world("w")));
    session.take_looks();

    session.handle(sight(thing_in("apple", "tree")));
    assert_eq!(session.take_looks(), vec!["tree"]);
    assert!(!session.is_visible("apple"));

    session.handle(sight(thing_in("tree", "w")));
    assert_visible!(session, "apple");
    assert!(session.view().get_entity("tree").unwrap().has_child("apple"));
}

#[test]
fn contents_of_a_sighted_container_are_requested() {
    let mut session = TestSession::new();
    session.handle(sight(world("w").with_contents(["rock", "tree"])));
    assert_eq!(session.take_looks(), vec!["rock", "tree"]);
}

#[test]
fn set_with_new_location_moves_entity() {
    let mut session = TestSession::new();
    session.handle(sight(world("w")));
    session.handle(sight(thing_in("bag", "w")));
    session.handle(sight(thing_in("coin", "w")));

    session.handle(set(EntityData::new("coin").with_loc("bag")));

    let view = session.view();
    assert_eq!(view.get_entity("coin").unwrap().location(), Some("bag"));
    assert!(view.get_entity("bag").unwrap().has_child("coin"));
    assert!(!view.get_entity("w").unwrap().has_child("coin"));
}

#[test]
fn unseen_container_takes_its_contents_along() {
    let mut session = TestSession::new();
    session.handle(sight(world("w")));
    session.handle(sight(thing_in("bag", "w")));
    session.handle(sight(thing_in("coin", "bag")));
    assert!(session.connection().is_routing_from("coin"));

    session.handle(unseen("bag"));

    assert!(session.view().get_entity("bag").is_none());
    assert!(session.view().get_entity("coin").is_none());
    assert!(!session.connection().is_routing_from("coin"));
    assert!(!session.connection().is_routing_from("bag"));
}
