//! In-memory player progress store, keyed by connection.

use std::collections::HashMap;

use crate::domain::{ConnectionId, PlayerProgress};

#[derive(Debug, Default)]
pub struct ProgressStore {
    entries: HashMap<ConnectionId, PlayerProgress>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `connection_id` from default metrics, replacing any previous entry
    pub fn insert_default(&mut self, connection_id: ConnectionId) {
        self.entries.insert(connection_id, PlayerProgress::default());
    }

    pub fn remove(&mut self, connection_id: &ConnectionId) -> Option<PlayerProgress> {
        self.entries.remove(connection_id)
    }

    pub fn get(&self, connection_id: &ConnectionId) -> Option<&PlayerProgress> {
        self.entries.get(connection_id)
    }

    pub fn get_mut(&mut self, connection_id: &ConnectionId) -> Option<&mut PlayerProgress> {
        self.entries.get_mut(connection_id)
    }

    pub fn reset(&mut self, connection_id: &ConnectionId) {
        if let Some(progress) = self.entries.get_mut(connection_id) {
            progress.reset();
        }
    }

    pub fn reset_all(&mut self) {
        self.entries.values_mut().for_each(PlayerProgress::reset);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
