use std::collections::HashMap;

use log::{debug, warn};

use seer_shared::Operation;

/// Operations held back until a type they reference is bound.
///
/// Operations are keyed by the name of the missing type. When types bind,
/// their operations come back out in arrival order, across all the types
/// bound in the same batch.
pub(crate) struct TypeBoundWaitlist {
    next_sequence: u64,
    waiting: HashMap<String, Vec<(u64, Operation)>>,
}

impl TypeBoundWaitlist {
    pub fn new() -> Self {
        Self {
            next_sequence: 0,
            waiting: HashMap::new(),
        }
    }

    pub fn queue(&mut self, type_name: &str, op: Operation) {
        debug!("Deferring {} until type '{}' is bound", op.type_name(), type_name);
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.waiting
            .entry(type_name.to_string())
            .or_default()
            .push((sequence, op));
    }

    pub fn collect_ready(&mut self, bound_types: &[String]) -> Vec<Operation> {
        let mut ready: Vec<(u64, Operation)> = bound_types
            .iter()
            .filter_map(|type_name| self.waiting.remove(type_name))
            .flatten()
            .collect();
        ready.sort_by_key(|(sequence, _)| *sequence);
        ready.into_iter().map(|(_, op)| op).collect()
    }

    /// Drops operations waiting on types that can never bind
    pub fn remove_failed(&mut self, failed_types: &[String]) -> usize {
        let mut dropped = 0;
        for type_name in failed_types {
            if let Some(ops) = self.waiting.remove(type_name) {
                warn!(
                    "Dropping {} operation(s) waiting on unbindable type '{}'",
                    ops.len(),
                    type_name
                );
                dropped += ops.len();
            }
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.waiting.values().map(Vec::len).sum()
    }

    pub fn is_waiting_on(&self, type_name: &str) -> bool {
        self.waiting.contains_key(type_name)
    }
}
