//! Core domain models for the typing race.

use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};
use tokio::time::Instant;

use super::{
    error::RaceError,
    value_object::{ConnectionId, TimeLimit, Timestamp, Username},
};

/// First value announced by the countdown
pub const COUNTDOWN_START: u32 = 3;

/// Delay between two countdown ticks
pub const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);

/// Interval of the live CPM refresh while a race is running
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Race lifecycle stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Waiting,
    Countdown,
    Playing,
    Finished,
}

impl Phase {
    /// Whether a new race may be started from this phase
    pub fn accepts_start(self) -> bool {
        matches!(self, Phase::Waiting | Phase::Finished)
    }

    /// Whether a race is underway (joining now means spectating)
    pub fn is_in_progress(self) -> bool {
        matches!(self, Phase::Countdown | Phase::Playing)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Waiting => "waiting",
            Phase::Countdown => "countdown",
            Phase::Playing => "playing",
            Phase::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Whether a session takes part in the current race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Active,
    Spectator,
}

impl Role {
    /// Role given to a session that joins while the race is in `phase`
    pub fn for_phase(phase: Phase) -> Self {
        if phase.is_in_progress() {
            Role::Spectator
        } else {
            Role::Active
        }
    }

    pub fn is_spectator(self) -> bool {
        self == Role::Spectator
    }
}

/// A player bound to one live connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub connection_id: ConnectionId,
    pub username: Username,
    pub role: Role,
    /// Join order, used to keep roster ordering stable among equals
    pub joined_seq: u64,
}

/// Typing metrics of one session for the current race
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerProgress {
    pub correct_chars: usize,
    pub total_chars_typed: usize,
    pub cpm: u32,
    pub accuracy: u32,
    /// Percentage of the race text typed, within `0.0..=100.0`
    pub progress: f64,
    /// Error count as reported by the client
    pub error_count: u32,
    pub finished: bool,
    pub finish_timestamp: Option<Timestamp>,
    /// Finish rank, 0 while unranked
    pub position: u32,
}

impl Default for PlayerProgress {
    fn default() -> Self {
        Self {
            correct_chars: 0,
            total_chars_typed: 0,
            cpm: 0,
            accuracy: 100,
            progress: 0.0,
            error_count: 0,
            finished: false,
            finish_timestamp: None,
            position: 0,
        }
    }
}

impl PlayerProgress {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// The single shared race.
///
/// Fields are private so phase changes go through the transition methods,
/// each of which checks the phase it starts from.
#[derive(Debug, Clone)]
pub struct RaceState {
    phase: Phase,
    /// Published race text, present only while Playing or Finished
    text: Option<String>,
    /// Text fetched during Countdown, published when the race starts
    staged_text: Option<String>,
    start_timestamp: Option<Timestamp>,
    started_at: Option<Instant>,
    time_limit: TimeLimit,
    countdown: Option<u32>,
    /// Bumped on every start and reset; tags asynchronous work with its race
    race_id: u64,
    /// Positions handed out in the current race
    finishers: u32,
}

impl Default for RaceState {
    fn default() -> Self {
        Self::new()
    }
}

impl RaceState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Waiting,
            text: None,
            staged_text: None,
            start_timestamp: None,
            started_at: None,
            time_limit: TimeLimit::default(),
            countdown: None,
            race_id: 0,
            finishers: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn start_timestamp(&self) -> Option<Timestamp> {
        self.start_timestamp
    }

    pub fn time_limit(&self) -> TimeLimit {
        self.time_limit
    }

    pub fn countdown(&self) -> Option<u32> {
        self.countdown
    }

    pub fn race_id(&self) -> u64 {
        self.race_id
    }

    /// Waiting/Finished → Countdown. Returns the id of the new race.
    ///
    /// # Errors
    ///
    /// `RaceError::IllegalTransition` if a race is already underway
    pub fn begin_countdown(&mut self, time_limit: TimeLimit) -> Result<u64, RaceError> {
        if !self.phase.accepts_start() {
            return Err(self.illegal("startGame"));
        }
        self.race_id += 1;
        self.phase = Phase::Countdown;
        self.text = None;
        self.staged_text = None;
        self.start_timestamp = None;
        self.started_at = None;
        self.countdown = None;
        self.time_limit = time_limit;
        self.finishers = 0;
        Ok(self.race_id)
    }

    /// Keep the fetched text for the race `race_id`.
    ///
    /// Returns false when that race is no longer counting down, so results
    /// of a fetch that outlived its race are discarded.
    pub fn stage_text(&mut self, race_id: u64, text: String) -> bool {
        if race_id != self.race_id || self.phase != Phase::Countdown {
            return false;
        }
        self.staged_text = Some(text);
        true
    }

    pub fn has_staged_text(&self) -> bool {
        self.staged_text.is_some()
    }

    /// Record a countdown tick.
    ///
    /// # Errors
    ///
    /// `RaceError::IllegalTransition` outside Countdown
    pub fn tick(&mut self, value: u32) -> Result<(), RaceError> {
        if self.phase != Phase::Countdown {
            return Err(self.illegal("countdown"));
        }
        self.countdown = Some(value);
        Ok(())
    }

    /// Countdown → Playing, publishing the staged text.
    ///
    /// # Errors
    ///
    /// `RaceError::IllegalTransition` outside Countdown or before the text arrived
    pub fn begin_playing(&mut self, now: Timestamp, started_at: Instant) -> Result<(), RaceError> {
        if self.phase != Phase::Countdown {
            return Err(self.illegal("gameStart"));
        }
        let Some(text) = self.staged_text.take() else {
            return Err(self.illegal("gameStart"));
        };
        self.phase = Phase::Playing;
        self.text = Some(text);
        self.start_timestamp = Some(now);
        self.started_at = Some(started_at);
        self.countdown = None;
        Ok(())
    }

    /// Playing → Finished.
    ///
    /// # Errors
    ///
    /// `RaceError::IllegalTransition` outside Playing
    pub fn finish(&mut self) -> Result<(), RaceError> {
        if self.phase != Phase::Playing {
            return Err(self.illegal("finish"));
        }
        self.phase = Phase::Finished;
        Ok(())
    }

    /// Any phase → Waiting. The time limit returns to its default and any
    /// in-flight work tagged with the previous race id becomes stale.
    pub fn reset(&mut self) {
        let race_id = self.race_id + 1;
        *self = Self::new();
        self.race_id = race_id;
    }

    /// Wall-clock time since the race started, zero before it has.
    pub fn elapsed(&self, now: Instant) -> Duration {
        self.started_at
            .map(|started| now.saturating_duration_since(started))
            .unwrap_or_default()
    }

    /// Hand out the next finish position (1-based, never reused in a race).
    pub fn next_position(&mut self) -> u32 {
        self.finishers += 1;
        self.finishers
    }

    fn illegal(&self, action: &'static str) -> RaceError {
        RaceError::IllegalTransition {
            action,
            phase: self.phase,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing_race(text: &str) -> RaceState {
        let mut race = RaceState::new();
        let race_id = race.begin_countdown(TimeLimit::default()).unwrap();
        assert!(race.stage_text(race_id, text.to_string()));
        race.begin_playing(Timestamp::new(1_000), Instant::now())
            .unwrap();
        race
    }

    #[test]
    fn test_role_for_phase() {
        // テスト項目: 進行中（カウントダウン・プレイ中）の参加は観戦者になる
        // then (期待する結果):
        assert_eq!(Role::for_phase(Phase::Waiting), Role::Active);
        assert_eq!(Role::for_phase(Phase::Countdown), Role::Spectator);
        assert_eq!(Role::for_phase(Phase::Playing), Role::Spectator);
        assert_eq!(Role::for_phase(Phase::Finished), Role::Active);
    }

    #[test]
    fn test_player_progress_default() {
        // テスト項目: 進捗の初期値は正確率 100・その他 0
        // when (操作):
        let progress = PlayerProgress::default();

        // then (期待する結果):
        assert_eq!(progress.cpm, 0);
        assert_eq!(progress.accuracy, 100);
        assert_eq!(progress.progress, 0.0);
        assert_eq!(progress.position, 0);
        assert!(!progress.finished);
    }

    #[test]
    fn test_begin_countdown_from_waiting() {
        // テスト項目: Waiting から Countdown へ遷移でき、レース ID が進む
        // given (前提条件):
        let mut race = RaceState::new();

        // when (操作):
        let race_id = race.begin_countdown(TimeLimit::new(30).unwrap());

        // then (期待する結果):
        assert_eq!(race_id, Ok(1));
        assert_eq!(race.phase(), Phase::Countdown);
        assert_eq!(race.time_limit().seconds(), 30);
        assert!(race.text().is_none());
    }

    #[test]
    fn test_begin_countdown_rejected_while_underway() {
        // テスト項目: カウントダウン中・プレイ中の開始要求は拒否される
        // given (前提条件):
        let mut race = RaceState::new();
        race.begin_countdown(TimeLimit::default()).unwrap();

        // when (操作):
        let result = race.begin_countdown(TimeLimit::default());

        // then (期待する結果):
        assert_eq!(
            result,
            Err(RaceError::IllegalTransition {
                action: "startGame",
                phase: Phase::Countdown
            })
        );
        assert_eq!(race.race_id(), 1);
    }

    #[test]
    fn test_text_hidden_until_playing() {
        // テスト項目: 取得したテキストはプレイ開始まで公開されない
        // given (前提条件):
        let mut race = RaceState::new();
        let race_id = race.begin_countdown(TimeLimit::default()).unwrap();

        // when (操作):
        race.stage_text(race_id, "hello".to_string());

        // then (期待する結果):
        assert!(race.text().is_none());
        assert!(race.start_timestamp().is_none());

        race.begin_playing(Timestamp::new(42), Instant::now())
            .unwrap();
        assert_eq!(race.text(), Some("hello"));
        assert_eq!(race.start_timestamp(), Some(Timestamp::new(42)));
    }

    #[test]
    fn test_stale_text_is_discarded() {
        // テスト項目: 古いレース ID のテキストは破棄される
        // given (前提条件):
        let mut race = RaceState::new();
        let old_id = race.begin_countdown(TimeLimit::default()).unwrap();
        race.reset();
        race.begin_countdown(TimeLimit::default()).unwrap();

        // when (操作):
        let accepted = race.stage_text(old_id, "stale".to_string());

        // then (期待する結果):
        assert!(!accepted);
        assert!(!race.has_staged_text());
    }

    #[test]
    fn test_begin_playing_requires_text() {
        // テスト項目: テキスト未取得のままではプレイを開始できない
        // given (前提条件):
        let mut race = RaceState::new();
        race.begin_countdown(TimeLimit::default()).unwrap();

        // when (操作):
        let result = race.begin_playing(Timestamp::new(0), Instant::now());

        // then (期待する結果):
        assert!(result.is_err());
        assert_eq!(race.phase(), Phase::Countdown);
    }

    #[test]
    fn test_positions_are_sequential() {
        // テスト項目: 順位は 1 から連番で払い出され、新しいレースで 1 に戻る
        // given (前提条件):
        let mut race = playing_race("abc");

        // when (操作):
        let first = race.next_position();
        let second = race.next_position();

        // then (期待する結果):
        assert_eq!((first, second), (1, 2));

        race.finish().unwrap();
        race.begin_countdown(TimeLimit::default()).unwrap();
        assert_eq!(race.next_position(), 1);
    }

    #[test]
    fn test_finish_only_from_playing() {
        // テスト項目: Finished への遷移は Playing からのみ
        // given (前提条件):
        let mut race = RaceState::new();

        // then (期待する結果):
        assert!(race.finish().is_err());
        let mut race = playing_race("abc");
        assert!(race.finish().is_ok());
        assert_eq!(race.phase(), Phase::Finished);
        assert_eq!(race.text(), Some("abc"));
    }

    #[test]
    fn test_reset_clears_race() {
        // テスト項目: リセットでテキスト・開始時刻が消え、Waiting に戻る
        // given (前提条件):
        let mut race = playing_race("abc");
        let race_id = race.race_id();

        // when (操作):
        race.reset();

        // then (期待する結果):
        assert_eq!(race.phase(), Phase::Waiting);
        assert!(race.text().is_none());
        assert!(race.start_timestamp().is_none());
        assert_eq!(race.time_limit(), TimeLimit::default());
        assert!(race.race_id() > race_id);
    }

    #[test]
    fn test_elapsed_before_start_is_zero() {
        // テスト項目: 開始前の経過時間は 0
        // when (操作):
        let race = RaceState::new();

        // then (期待する結果):
        assert_eq!(race.elapsed(Instant::now()), Duration::ZERO);
    }
}
