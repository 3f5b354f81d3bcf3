//! In-memory session registry
//!
//! 接続 ID → Session の本体マップと、ユーザー名 → 接続 ID の索引を持ちます。
//! 同じユーザー名での再接続は索引で O(1) に検出し、古い接続を追い出します。

use std::collections::HashMap;

use crate::domain::{ConnectionId, Role, Session, Username};

/// Result of [`SessionRegistry::join`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    /// The registered session
    pub session: Session,
    /// Older connection that held the same username and was dropped
    pub evicted: Option<ConnectionId>,
}

/// Username ↔ connection mapping with at most one live session per username
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<ConnectionId, Session>,
    by_username: HashMap<Username, ConnectionId>,
    next_seq: u64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `username` on `connection_id`.
    ///
    /// A different connection already holding `username` is removed and
    /// reported in [`JoinOutcome::evicted`]; the caller notifies and closes it.
    /// If `connection_id` already had a session (under any name) it is replaced.
    pub fn join(&mut self, username: Username, connection_id: ConnectionId, role: Role) -> JoinOutcome {
        self.remove(&connection_id);

        let evicted = match self.by_username.get(&username) {
            Some(existing) if existing != &connection_id => {
                let existing = existing.clone();
                self.sessions.remove(&existing);
                Some(existing)
            }
            _ => None,
        };

        self.next_seq += 1;
        let session = Session {
            connection_id: connection_id.clone(),
            username: username.clone(),
            role,
            joined_seq: self.next_seq,
        };
        self.by_username.insert(username, connection_id.clone());
        self.sessions.insert(connection_id, session.clone());

        JoinOutcome { session, evicted }
    }

    /// Remove the session of `connection_id`, if any.
    ///
    /// The username index is only cleared when it still points at this
    /// connection, so a stale connection closing late cannot unmap the
    /// connection that replaced it.
    pub fn remove(&mut self, connection_id: &ConnectionId) -> Option<Session> {
        let session = self.sessions.remove(connection_id)?;
        if self.by_username.get(&session.username) == Some(connection_id) {
            self.by_username.remove(&session.username);
        }
        Some(session)
    }

    pub fn get(&self, connection_id: &ConnectionId) -> Option<&Session> {
        self.sessions.get(connection_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    /// Sessions taking part in the current race
    pub fn active(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values().filter(|s| !s.role.is_spectator())
    }

    pub fn set_all_roles(&mut self, role: Role) {
        for session in self.sessions.values_mut() {
            session.role = role;
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
