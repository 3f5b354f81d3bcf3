//! UseCase: レースの進行
//!
//! Waiting → Countdown → Playing → Finished → (reset) → Waiting
//!
//! - `startGame`: カウントダウンに入り、テキスト取得を別タスクで開始
//! - テキスト到着後にカウントダウンタイマーを開始し、0 でプレイ開始
//! - プレイ中は入力ごとに指標を更新し、1 秒ごとに CPM を再計算
//! - 全員完走または制限時間で終了

use std::sync::Arc;

use tokio::time::Instant;

use super::{command::Command, coordinator::RaceCoordinator};
use crate::{
    domain::{
        ConnectionId, Phase, RaceError, Role, TimeLimit, Timestamp,
        entity::{COUNTDOWN_PERIOD, COUNTDOWN_START, REFRESH_INTERVAL},
        text_provider::prepare_race_text,
        typing,
    },
    infrastructure::{
        dto::websocket::{PlayerProgressMessage, ServerEvent},
        timer::{TimerEvent, TimerKind},
    },
};
use typerace_shared::time::now_millis;

impl RaceCoordinator {
    pub(super) fn start_game(
        &mut self,
        connection_id: &ConnectionId,
        time_limit: TimeLimit,
    ) -> Result<(), RaceError> {
        let phase = self.race.phase();
        if !phase.accepts_start() {
            return Err(RaceError::IllegalTransition {
                action: "startGame",
                phase,
            });
        }
        let Some(session) = self.sessions.get(connection_id) else {
            return Err(RaceError::UnknownConnection(connection_id.to_string()));
        };
        if session.role.is_spectator() {
            return Err(RaceError::SpectatorViolation {
                action: "startGame",
            });
        }
        let race_id = self.race.begin_countdown(time_limit)?;

        self.timers.cancel_all();
        // 観戦者はリセットされるまで観戦者のまま
        let active: Vec<ConnectionId> = self
            .sessions
            .active()
            .map(|s| s.connection_id.clone())
            .collect();
        for id in &active {
            self.progress.reset(id);
        }
        tracing::info!(
            "Race #{} counting down ({}s limit), started by '{}'",
            race_id,
            time_limit.seconds(),
            connection_id
        );

        self.broadcast_roster();
        self.spawn_text_fetch(race_id);
        Ok(())
    }

    fn spawn_text_fetch(&self, race_id: u64) {
        let provider = Arc::clone(&self.text_provider);
        let commands = self.commands.clone();
        tokio::spawn(async move {
            let text = prepare_race_text(provider.fetch_text().await);
            if commands.send(Command::TextReady { race_id, text }).is_err() {
                tracing::debug!("Coordinator stopped before text for race #{} arrived", race_id);
            }
        });
    }

    pub(super) fn text_ready(&mut self, race_id: u64, text: String) {
        if !self.race.stage_text(race_id, text) {
            tracing::debug!("Discarding text of stale race #{}", race_id);
            return;
        }
        self.timers.start_countdown(COUNTDOWN_START, COUNTDOWN_PERIOD);
    }

    pub(super) fn timer_fired(&mut self, event: TimerEvent) -> Result<(), RaceError> {
        if !self.timers.accept(&event) {
            tracing::debug!("Ignoring superseded timer event {:?}", event);
            return Ok(());
        }
        match event {
            TimerEvent::CountdownTick { value, .. } => self.countdown_tick(value),
            TimerEvent::Deadline { .. } => {
                tracing::info!("Time limit reached for race #{}", self.race.race_id());
                self.finish_race();
                Ok(())
            }
            TimerEvent::Refresh { .. } => {
                self.refresh_metrics();
                Ok(())
            }
        }
    }

    fn countdown_tick(&mut self, value: u32) -> Result<(), RaceError> {
        self.race.tick(value)?;
        self.broadcaster
            .broadcast_all(&ServerEvent::Countdown { value });
        if value > 0 {
            return Ok(());
        }

        self.race
            .begin_playing(Timestamp::new(now_millis()), Instant::now())?;
        tracing::info!("Race #{} started", self.race.race_id());

        if let Some(event) = self.game_start_event() {
            self.broadcaster.broadcast_all(&event);
        }
        self.broadcast_roster();

        self.timers.start_deadline(self.race.time_limit().as_duration());
        self.timers.start_refresh(REFRESH_INTERVAL);
        Ok(())
    }

    /// `gameStart` for the race currently being played
    pub(super) fn game_start_event(&self) -> Option<ServerEvent> {
        let text = self.race.text()?;
        let start = self.race.start_timestamp()?;
        Some(ServerEvent::GameStart {
            text: text.to_string(),
            start_time: start.value(),
            time_limit_seconds: self.race.time_limit().seconds(),
        })
    }

    pub(super) fn typing_update(
        &mut self,
        connection_id: &ConnectionId,
        user_input: &str,
        error_count: u32,
        text_length: Option<usize>,
    ) -> Result<(), RaceError> {
        self.ensure_racing(connection_id, "typingUpdate")?;

        let Some(text) = self.race.text() else {
            return Err(RaceError::IllegalTransition {
                action: "typingUpdate",
                phase: self.race.phase(),
            });
        };
        let Some(current) = self.progress.get(connection_id) else {
            return Err(RaceError::UnknownConnection(connection_id.to_string()));
        };
        if current.finished {
            tracing::debug!("'{}' already finished, ignoring input", connection_id);
            return Ok(());
        }

        let text_chars = text.chars().count();
        if let Some(len) = text_length.filter(|&len| len != text_chars) {
            tracing::debug!(
                "Client text length {} differs from race text length {}",
                len,
                text_chars
            );
        }

        let elapsed = self.race.elapsed(Instant::now());
        let mut next = typing::update(current, user_input, text, error_count, elapsed);
        let just_finished = next.finished;
        if just_finished {
            next.position = self.race.next_position();
            next.finish_timestamp = Some(Timestamp::new(now_millis()));
        }
        if let Some(entry) = self.progress.get_mut(connection_id) {
            *entry = next.clone();
        }

        let Some(session) = self.sessions.get(connection_id) else {
            return Err(RaceError::UnknownConnection(connection_id.to_string()));
        };
        if just_finished {
            tracing::info!(
                "'{}' finished in position {} ({} cpm)",
                session.username,
                next.position,
                next.cpm
            );
            self.broadcaster.unicast(
                connection_id,
                &ServerEvent::RaceFinished {
                    position: next.position,
                    cpm: next.cpm,
                    accuracy: next.accuracy,
                    elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                },
            );
        }
        self.broadcaster
            .broadcast_all(&ServerEvent::PlayerProgress(PlayerProgressMessage::new(
                session, &next,
            )));
        self.broadcast_roster();

        self.finish_if_all_done();
        Ok(())
    }

    /// The client's own clock ran out. The player stops racing without a position.
    pub(super) fn time_up(&mut self, connection_id: &ConnectionId) -> Result<(), RaceError> {
        self.ensure_racing(connection_id, "timeUp")?;

        let Some(progress) = self.progress.get_mut(connection_id) else {
            return Err(RaceError::UnknownConnection(connection_id.to_string()));
        };
        if !progress.finished {
            progress.finished = true;
            progress.finish_timestamp = Some(Timestamp::new(now_millis()));
            tracing::info!("'{}' ran out of time", connection_id);
            self.broadcast_roster();
        }

        self.finish_if_all_done();
        Ok(())
    }

    /// Recompute CPM of unfinished players against the race clock.
    fn refresh_metrics(&mut self) {
        if self.race.phase() != Phase::Playing {
            return;
        }
        let elapsed = self.race.elapsed(Instant::now());

        let mut changed = Vec::new();
        for session in self.sessions.active() {
            let Some(progress) = self.progress.get_mut(&session.connection_id) else {
                continue;
            };
            if progress.finished {
                continue;
            }
            if typing::refresh_cpm(progress, elapsed).is_some() {
                changed.push(PlayerProgressMessage::new(session, progress));
            }
        }

        if changed.is_empty() {
            return;
        }
        for message in changed {
            self.broadcaster
                .broadcast_all(&ServerEvent::PlayerProgress(message));
        }
        self.broadcast_roster();
    }

    /// End the race once every racing player is done.
    pub(super) fn finish_if_all_done(&mut self) {
        if self.race.phase() == Phase::Playing && self.all_active_finished() {
            tracing::info!("All players finished race #{}", self.race.race_id());
            self.finish_race();
        }
    }

    fn finish_race(&mut self) {
        if let Err(e) = self.race.finish() {
            tracing::debug!("Not finishing race: {}", e);
            return;
        }
        self.timers.cancel(TimerKind::Deadline);
        self.timers.cancel(TimerKind::Refresh);

        let results = self.roster();
        tracing::info!(
            "Race #{} finished with {} players",
            self.race.race_id(),
            results.len()
        );
        self.broadcaster
            .broadcast_all(&ServerEvent::GameFinished { results });
    }

    /// Back to Waiting from any phase. Any connection may ask for it.
    pub(super) fn reset_game(&mut self, connection_id: &ConnectionId) {
        self.timers.cancel_all();
        self.race.reset();
        self.progress.reset_all();
        self.sessions.set_all_roles(Role::Active);
        tracing::info!("Race reset by '{}'", connection_id);

        self.broadcaster.broadcast_all(&ServerEvent::GameReset {
            players: self.roster(),
            phase: self.race.phase(),
        });
    }

    /// Playing, joined, and not spectating.
    fn ensure_racing(
        &self,
        connection_id: &ConnectionId,
        action: &'static str,
    ) -> Result<(), RaceError> {
        let phase = self.race.phase();
        if phase != Phase::Playing {
            return Err(RaceError::IllegalTransition { action, phase });
        }
        let Some(session) = self.sessions.get(connection_id) else {
            return Err(RaceError::UnknownConnection(connection_id.to_string()));
        };
        if session.role.is_spectator() {
            return Err(RaceError::SpectatorViolation { action });
        }
        Ok(())
    }
}
