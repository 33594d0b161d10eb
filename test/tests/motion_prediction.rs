/// MOTION PREDICTION
///
/// Between updates from the server, moving entities are extrapolated from
/// their last known velocity at the world's simulation speed.

use std::time::Duration;

use seer_shared::{
    math::{point_to_element, vector_to_element},
    EntityData, Point, Vector,
};
use seer_test::{set, sight, thing_in, world, TestSession};

const EPSILON: f64 = 1e-9;

fn walker(position: Point, velocity: Vector) -> EntityData {
    thing_in("walker", "w")
        .with_attr("pos", point_to_element(&position))
        .with_attr("velocity", vector_to_element(&velocity))
}

#[test]
fn moving_entity_is_extrapolated_each_update() {
    let mut session = TestSession::new();
    session.handle(sight(world("w")));
    session.handle(sight(walker(Point::origin(), Vector::new(0.0, 2.0, 0.0))));
    assert!(session.view().is_moving("walker"));

    session.clock.advance(Duration::from_millis(1500));
    session.avatar.update();

    let walker = session.view().get_entity("walker").unwrap();
    assert!((walker.predicted_position() - Point::new(0.0, 3.0, 0.0)).norm() < EPSILON);
    assert_eq!(walker.position(), Point::origin());
}

#[test]
fn world_simulation_speed_scales_prediction() {
    let mut session = TestSession::new();
    session.handle(sight(world("w").with_attr("simulation_speed", 0.5)));
    session.handle(sight(walker(Point::origin(), Vector::new(4.0, 0.0, 0.0))));

    session.clock.advance(Duration::from_secs(1));
    session.avatar.update();

    let walker = session.view().get_entity("walker").unwrap();
    assert!((walker.predicted_position() - Point::new(2.0, 0.0, 0.0)).norm() < EPSILON);
}

#[test]
fn authoritative_stop_replaces_prediction() {
    let mut session = TestSession::new();
    session.handle(sight(world("w")));
    session.handle(sight(walker(Point::origin(), Vector::new(1.0, 0.0, 0.0))));
    session.clock.advance(Duration::from_secs(3));
    session.avatar.update();

    session.handle(set(EntityData::new("walker")
        .with_attr("pos", point_to_element(&Point::new(2.5, 0.0, 0.0)))
        .with_attr("velocity", vector_to_element(&Vector::zeros()))));

    assert!(!session.view().is_moving("walker"));
    let walker = session.view().get_entity("walker").unwrap();
    assert_eq!(walker.predicted_position(), Point::new(2.5, 0.0, 0.0));

    session.clock.advance(Duration::from_secs(3));
    session.avatar.update();
    let walker = session.view().get_entity("walker").unwrap();
    assert_eq!(walker.predicted_position(), Point::new(2.5, 0.0, 0.0));
}
