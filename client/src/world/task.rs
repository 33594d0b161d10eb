use log::warn;

use seer_shared::{Element, PropertyMap};

/// A long-running activity of an entity, such as crafting or digging.
/// Progress runs from 0.0 to 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    id: String,
    name: String,
    progress: f64,
    rate: f64,
}

impl Task {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            progress: 0.0,
            rate: 0.0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Progress gained per second of world time
    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }

    /// Applies the server's description of the task. Returns true if the
    /// rate changed.
    pub(crate) fn update_from_map(&mut self, map: &PropertyMap) -> bool {
        if let Some(name) = map.get("name").and_then(Element::as_str) {
            self.name = name.to_string();
        }
        if let Some(progress) = map.get("progress") {
            match progress.as_float() {
                Some(progress) => self.progress = progress.clamp(0.0, 1.0),
                None => warn!("Task '{}' progress is not a number", self.id),
            }
        }
        let rate = match map.get("rate") {
            Some(rate) => rate.as_float().unwrap_or(0.0),
            None => 0.0,
        };
        let changed = rate != self.rate;
        self.rate = rate;
        changed
    }

    /// Advances progress by `elapsed` seconds of world time
    pub(crate) fn update_predicted_progress(&mut self, elapsed: f64) {
        if self.rate <= 0.0 || elapsed <= 0.0 || self.is_complete() {
            return;
        }
        self.progress = (self.progress + self.rate * elapsed).min(1.0);
    }
}
