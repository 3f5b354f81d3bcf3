//! Commands processed by the coordinator task.
//!
//! Everything that can change the race arrives through this one type:
//! socket lifecycle and client events from the UI layer, timer callbacks,
//! and the result of the text fetch.

use tokio::sync::oneshot;

use crate::{
    domain::ConnectionId,
    infrastructure::{
        broadcast::OutboundSender,
        dto::{http::RaceSnapshotDto, websocket::ClientEvent},
        timer::TimerEvent,
    },
};

#[derive(Debug)]
pub enum Command {
    /// A socket was accepted; `sender` feeds its writer task
    Connect {
        connection_id: ConnectionId,
        sender: OutboundSender,
    },
    /// A socket was closed
    Disconnect { connection_id: ConnectionId },
    /// A parsed client frame
    Client {
        connection_id: ConnectionId,
        event: ClientEvent,
    },
    /// Text fetched for race `race_id`
    TextReady { race_id: u64, text: String },
    Timer(TimerEvent),
    /// Read-only view for the HTTP API
    Snapshot {
        reply: oneshot::Sender<RaceSnapshotDto>,
    },
}

impl From<TimerEvent> for Command {
    fn from(event: TimerEvent) -> Self {
        Command::Timer(event)
    }
}
