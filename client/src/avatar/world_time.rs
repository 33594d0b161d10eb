use std::time::Instant;

/// Estimate of the server's world time, extrapolated from the `seconds` of
/// the last inbound operation that carried it
#[derive(Debug, Clone, Default)]
pub struct WorldTime {
    last_op_seconds: f64,
    stamp_at_last_op: Option<Instant>,
}

impl WorldTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, seconds: f64, now: Instant) {
        self.last_op_seconds = seconds;
        self.stamp_at_last_op = Some(now);
    }

    /// World time at `now`. Before any operation carried a time this is 0.
    pub fn seconds_at(&self, now: Instant) -> f64 {
        match self.stamp_at_last_op {
            Some(stamp) => {
                self.last_op_seconds + now.saturating_duration_since(stamp).as_secs_f64()
            }
            None => self.last_op_seconds,
        }
    }

    pub fn last_op_seconds(&self) -> f64 {
        self.last_op_seconds
    }
}
