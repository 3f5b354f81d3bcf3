//! UseCase: レースコーディネータ
//!
//! レース状態・セッション・進捗を 1 つのオブジェクトにまとめ、1 つの tokio
//! タスクだけが所有します。WebSocket ハンドラ、タイマー、テキスト取得は
//! すべて [`Command`] としてチャンネル経由で届き、1 件ずつ最後まで処理されます。
//! そのためロックは不要で、各ハンドラは戻る時点で状態を整合させておく必要があります。
//!
//! - 参加・切断: `lobby.rs`
//! - レースの進行: `race.rs`

use std::sync::Arc;

use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use super::{command::Command, error::CoordinatorGone};
use crate::{
    domain::{
        ConnectionId, PlayerProgress, RaceError, RaceState, Session, TextProvider, TimeLimit,
        Username, ranking,
    },
    infrastructure::{
        broadcast::{Broadcaster, OutboundSender},
        dto::{
            http::RaceSnapshotDto,
            websocket::{ClientEvent, PlayerView, ServerEvent},
        },
        repository::{ProgressStore, SessionRegistry},
        timer::TimerService,
    },
};
use typerace_shared::time::millis_to_rfc3339;

/// Authority over the shared race
pub struct RaceCoordinator {
    pub(super) race: RaceState,
    pub(super) sessions: SessionRegistry,
    pub(super) progress: ProgressStore,
    pub(super) timers: TimerService<Command>,
    pub(super) broadcaster: Broadcaster,
    pub(super) text_provider: Arc<dyn TextProvider>,
    /// Loop-back sender for work that completes asynchronously
    pub(super) commands: mpsc::UnboundedSender<Command>,
}

impl RaceCoordinator {
    /// Create a coordinator whose asynchronous work reports back on `commands`.
    pub fn new(
        text_provider: Arc<dyn TextProvider>,
        commands: mpsc::UnboundedSender<Command>,
    ) -> Self {
        Self {
            race: RaceState::new(),
            sessions: SessionRegistry::new(),
            progress: ProgressStore::new(),
            timers: TimerService::new(commands.clone()),
            broadcaster: Broadcaster::new(),
            text_provider,
            commands,
        }
    }

    /// Spawn the coordinator task and return a handle to reach it.
    pub fn spawn(text_provider: Arc<dyn TextProvider>) -> (CoordinatorHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let coordinator = Self::new(text_provider, tx.clone());
        let task = tokio::spawn(coordinator.run(rx));
        (CoordinatorHandle { commands: tx }, task)
    }

    /// Process commands one at a time until the channel closes.
    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        tracing::info!("Race coordinator started");
        while let Some(command) = commands.recv().await {
            self.handle(command);
        }
        tracing::info!("Race coordinator stopped");
    }

    /// Apply one command. Rejected events leave the state untouched.
    pub fn handle(&mut self, command: Command) {
        let result = match command {
            Command::Connect {
                connection_id,
                sender,
            } => {
                self.connect(connection_id, sender);
                Ok(())
            }
            Command::Disconnect { connection_id } => self.disconnect(&connection_id),
            Command::Client {
                connection_id,
                event,
            } => self.dispatch(&connection_id, event),
            Command::TextReady { race_id, text } => {
                self.text_ready(race_id, text);
                Ok(())
            }
            Command::Timer(event) => self.timer_fired(event),
            Command::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
                Ok(())
            }
        };

        match result {
            Ok(()) => {}
            Err(e @ (RaceError::MalformedPayload(_) | RaceError::UnknownConnection(_))) => {
                tracing::warn!("Dropped event: {}", e);
            }
            Err(e) => tracing::debug!("Ignored event: {}", e),
        }
    }

    fn dispatch(
        &mut self,
        connection_id: &ConnectionId,
        event: ClientEvent,
    ) -> Result<(), RaceError> {
        match event {
            ClientEvent::JoinGame { username } => {
                let username = Username::new(username)?;
                self.join(connection_id, username)
            }
            ClientEvent::StartGame { time_limit_seconds } => {
                let time_limit = match time_limit_seconds {
                    Some(seconds) => TimeLimit::new(seconds)?,
                    None => TimeLimit::default(),
                };
                self.start_game(connection_id, time_limit)
            }
            ClientEvent::TypingUpdate {
                user_input,
                text_length,
                error_count,
            } => self.typing_update(
                connection_id,
                &user_input,
                error_count.unwrap_or(0),
                text_length,
            ),
            ClientEvent::TimeUp => self.time_up(connection_id),
            ClientEvent::ResetGame => {
                self.reset_game(connection_id);
                Ok(())
            }
        }
    }

    /// Sessions with their progress, in standings order.
    pub(super) fn standings(&self) -> Vec<(&Session, &PlayerProgress)> {
        let mut entries: Vec<_> = self
            .sessions
            .iter()
            .filter_map(|s| self.progress.get(&s.connection_id).map(|p| (s, p)))
            .collect();
        entries.sort_by(|(sa, pa), (sb, pb)| {
            ranking::compare_standing(pa, pb).then_with(|| sa.joined_seq.cmp(&sb.joined_seq))
        });
        entries
    }

    pub(super) fn roster(&self) -> Vec<PlayerView> {
        self.standings()
            .into_iter()
            .map(|(s, p)| PlayerView::new(s, p))
            .collect()
    }

    pub(super) fn broadcast_roster(&self) {
        self.broadcaster.broadcast_all(&ServerEvent::PlayersUpdate {
            players: self.roster(),
            phase: self.race.phase(),
            text: self.race.text().map(str::to_string),
        });
    }

    /// True when at least one player is racing and all of them are done.
    pub(super) fn all_active_finished(&self) -> bool {
        let mut active = self.sessions.active().peekable();
        if active.peek().is_none() {
            return false;
        }
        active.all(|s| {
            self.progress
                .get(&s.connection_id)
                .is_some_and(|p| p.finished)
        })
    }

    pub fn snapshot(&self) -> RaceSnapshotDto {
        let start = self.race.start_timestamp();
        RaceSnapshotDto {
            phase: self.race.phase(),
            text: self.race.text().map(str::to_string),
            start_time: start.map(|ts| ts.value()),
            started_at: start.and_then(|ts| millis_to_rfc3339(ts.value())),
            time_limit_seconds: self.race.time_limit().seconds(),
            countdown: self.race.countdown(),
            players: self.roster(),
        }
    }
}

/// Cloneable entry point to the coordinator task
#[derive(Clone, Debug)]
pub struct CoordinatorHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl CoordinatorHandle {
    pub fn connect(
        &self,
        connection_id: ConnectionId,
        sender: OutboundSender,
    ) -> Result<(), CoordinatorGone> {
        self.send(Command::Connect {
            connection_id,
            sender,
        })
    }

    pub fn disconnect(&self, connection_id: ConnectionId) -> Result<(), CoordinatorGone> {
        self.send(Command::Disconnect { connection_id })
    }

    pub fn dispatch(
        &self,
        connection_id: ConnectionId,
        event: ClientEvent,
    ) -> Result<(), CoordinatorGone> {
        self.send(Command::Client {
            connection_id,
            event,
        })
    }

    pub async fn snapshot(&self) -> Result<RaceSnapshotDto, CoordinatorGone> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Snapshot { reply })?;
        response.await.map_err(|_| CoordinatorGone)
    }

    fn send(&self, command: Command) -> Result<(), CoordinatorGone> {
        self.commands.send(command).map_err(|_| CoordinatorGone)
    }
}
