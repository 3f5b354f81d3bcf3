//! Drives a [`RaceCoordinator`] in-process for unit tests.
//!
//! Commands are applied directly instead of through the spawned run loop, so
//! tests can inspect the coordinator between steps. Timer and text-fetch
//! callbacks are pulled from the loop-back channel with `pump_until` or
//! `advance`, under tokio's paused clock.

use std::{collections::HashMap, sync::Arc, time::Duration};

use serde_json::Value;
use tokio::{
    sync::mpsc::{self, UnboundedReceiver},
    time::{self, Instant},
};

use super::{command::Command, coordinator::RaceCoordinator};
use crate::{
    domain::{ConnectionId, ConnectionIdFactory, TextProvider},
    infrastructure::{
        broadcast::Outbound, dto::websocket::ClientEvent, text_provider::FixedTextProvider,
    },
};

pub(crate) fn fixed_provider(text: &str) -> Arc<dyn TextProvider> {
    Arc::new(FixedTextProvider::new(text))
}

struct Client {
    outbound: UnboundedReceiver<Outbound>,
    closed: bool,
}

pub(crate) struct Harness {
    pub coordinator: RaceCoordinator,
    commands: UnboundedReceiver<Command>,
    clients: HashMap<ConnectionId, Client>,
}

impl Harness {
    pub fn new(text_provider: Arc<dyn TextProvider>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            coordinator: RaceCoordinator::new(text_provider, tx),
            commands: rx,
            clients: HashMap::new(),
        }
    }

    pub fn connect(&mut self) -> ConnectionId {
        let connection_id = ConnectionIdFactory::generate();
        let (sender, outbound) = mpsc::unbounded_channel();
        self.coordinator.handle(Command::Connect {
            connection_id: connection_id.clone(),
            sender,
        });
        self.clients.insert(
            connection_id.clone(),
            Client {
                outbound,
                closed: false,
            },
        );
        connection_id
    }

    /// Open a connection and join as `username`.
    pub fn join(&mut self, username: &str) -> ConnectionId {
        let connection_id = self.connect();
        self.send(&connection_id, ClientEvent::JoinGame {
            username: username.to_string(),
        });
        connection_id
    }

    pub fn send(&mut self, connection_id: &ConnectionId, event: ClientEvent) {
        self.coordinator.handle(Command::Client {
            connection_id: connection_id.clone(),
            event,
        });
    }

    pub fn type_text(&mut self, connection_id: &ConnectionId, input: &str) {
        self.send(connection_id, ClientEvent::TypingUpdate {
            user_input: input.to_string(),
            text_length: None,
            error_count: Some(0),
        });
    }

    pub fn disconnect(&mut self, connection_id: &ConnectionId) {
        self.coordinator.handle(Command::Disconnect {
            connection_id: connection_id.clone(),
        });
    }

    /// Send `startGame` and run the countdown through to Playing.
    pub async fn start_race(&mut self, connection_id: &ConnectionId, time_limit_seconds: Option<u32>) {
        self.send(connection_id, ClientEvent::StartGame { time_limit_seconds });
        self.pump_until(|c| c.race.phase() == crate::domain::Phase::Playing)
            .await;
    }

    /// Apply loop-back commands until `done` holds.
    pub async fn pump_until(&mut self, mut done: impl FnMut(&RaceCoordinator) -> bool) {
        for _ in 0..10_000 {
            if done(&self.coordinator) {
                return;
            }
            let command = time::timeout(Duration::from_secs(3600), self.commands.recv())
                .await
                .expect("no command within an hour")
                .expect("command channel closed");
            self.coordinator.handle(command);
        }
        panic!("condition not reached");
    }

    /// Apply every loop-back command that arrives within `duration`.
    pub async fn advance(&mut self, duration: Duration) {
        let deadline = Instant::now() + duration;
        while let Ok(Some(command)) = time::timeout_at(deadline, self.commands.recv()).await {
            self.coordinator.handle(command);
        }
    }

    /// Drain the frames queued for `connection_id`, parsed as JSON.
    pub fn events(&mut self, connection_id: &ConnectionId) -> Vec<Value> {
        let client = self
            .clients
            .get_mut(connection_id)
            .expect("unknown test client");
        let mut events = Vec::new();
        while let Ok(frame) = client.outbound.try_recv() {
            match frame {
                Outbound::Text(json) => {
                    events.push(serde_json::from_str(&json).expect("valid json frame"))
                }
                Outbound::Close => client.closed = true,
            }
        }
        events
    }

    /// Last drained event of type `kind`.
    pub fn last_of(&mut self, connection_id: &ConnectionId, kind: &str) -> Value {
        self.events(connection_id)
            .into_iter()
            .rev()
            .find(|e| e["type"] == kind)
            .unwrap_or_else(|| panic!("no '{kind}' event"))
    }

    /// Whether the writer of `connection_id` was asked to close.
    pub fn is_closed(&mut self, connection_id: &ConnectionId) -> bool {
        let _ = self.events(connection_id);
        self.clients
            .get(connection_id)
            .is_some_and(|c| c.closed)
    }

    pub fn drain_all(&mut self) {
        let ids: Vec<_> = self.clients.keys().cloned().collect();
        for id in ids {
            let _ = self.events(&id);
        }
    }
}
