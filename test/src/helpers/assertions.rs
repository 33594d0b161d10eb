/// Assert that the session's View holds a visible entity with this id
#[macro_export]
macro_rules! assert_visible {
    ($session:expr, $entity_id:expr) => {
        assert!(
            $session.is_visible($entity_id),
            "Entity {:?} should be visible",
            $entity_id
        );
    };
}

/// Assert that the entity is either unknown or hidden
#[macro_export]
macro_rules! assert_not_visible {
    ($session:expr, $entity_id:expr) => {
        assert!(
            !$session.is_visible($entity_id),
            "Entity {:?} should not be visible",
            $entity_id
        );
    };
}

/// Assert that the look queue and in-flight LOOKs respect the configured cap
#[macro_export]
macro_rules! assert_within_look_cap {
    ($view:expr) => {
        assert!(
            $view.in_flight_count() <= $view.config().max_pending_count,
            "{} LOOKs in flight, cap is {}",
            $view.in_flight_count(),
            $view.config().max_pending_count
        );
    };
}
