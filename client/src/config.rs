/// Contains Config properties which will be used by a View
#[derive(Clone, Debug)]
pub struct ViewConfig {
    /// Maximum number of LOOK requests for named entities in flight at once.
    /// Further requests wait in the look queue until one resolves.
    pub max_pending_count: usize,
    /// Initial rate at which world time passes, used for motion and task
    /// prediction until the top-level entity reports its own
    pub simulation_speed: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            max_pending_count: 10,
            simulation_speed: 1.0,
        }
    }
}

/// Contains Config properties which will be used by an Avatar
#[derive(Clone, Debug)]
pub struct AvatarConfig {
    pub view: ViewConfig,
    /// Name of the operation type whose descendants are routed to the
    /// acting entity's action hook
    pub action_type: String,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            view: ViewConfig::default(),
            action_type: "action".to_string(),
        }
    }
}
