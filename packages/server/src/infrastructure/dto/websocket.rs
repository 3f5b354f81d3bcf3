//! WebSocket message DTOs for the typing race.
//!
//! Every frame is a JSON object tagged by `type`, e.g.
//! `{"type":"joinGame","username":"alice"}`.

use serde::{Deserialize, Serialize};

use crate::domain::{Phase, PlayerProgress, Session};

/// Messages sent from a client to the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    JoinGame {
        username: String,
    },
    StartGame {
        #[serde(default)]
        time_limit_seconds: Option<u32>,
    },
    TypingUpdate {
        user_input: String,
        /// Text length as seen by the client; the server measures its own copy
        #[serde(default)]
        text_length: Option<usize>,
        #[serde(default)]
        error_count: Option<u32>,
    },
    TimeUp,
    ResetGame,
}

/// Messages sent from the server to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Join confirmation (unicast)
    GameJoined {
        phase: Phase,
        is_spectator: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Full roster
    PlayersUpdate {
        players: Vec<PlayerView>,
        phase: Phase,
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    Countdown {
        value: u32,
    },
    GameStart {
        text: String,
        /// Unix timestamp (milliseconds since epoch, UTC)
        start_time: i64,
        time_limit_seconds: u32,
    },
    PlayerProgress(PlayerProgressMessage),
    /// Personal result (unicast to the finisher)
    RaceFinished {
        position: u32,
        cpm: u32,
        accuracy: u32,
        elapsed_ms: u64,
    },
    GameFinished {
        results: Vec<PlayerView>,
    },
    GameReset {
        players: Vec<PlayerView>,
        phase: Phase,
    },
    /// Sent to a connection right before it is closed for a newer login
    DuplicateIdentity {
        message: String,
    },
}

impl ServerEvent {
    /// Event name as it appears in the `type` field
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::GameJoined { .. } => "gameJoined",
            ServerEvent::PlayersUpdate { .. } => "playersUpdate",
            ServerEvent::Countdown { .. } => "countdown",
            ServerEvent::GameStart { .. } => "gameStart",
            ServerEvent::PlayerProgress(_) => "playerProgress",
            ServerEvent::RaceFinished { .. } => "raceFinished",
            ServerEvent::GameFinished { .. } => "gameFinished",
            ServerEvent::GameReset { .. } => "gameReset",
            ServerEvent::DuplicateIdentity { .. } => "duplicateIdentity",
        }
    }
}

/// One player's live metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProgressMessage {
    pub username: String,
    pub progress: f64,
    pub cpm: u32,
    pub accuracy: u32,
    pub error_count: u32,
    pub finished: bool,
    pub position: u32,
}

impl PlayerProgressMessage {
    pub fn new(session: &Session, progress: &PlayerProgress) -> Self {
        Self {
            username: session.username.as_str().to_string(),
            progress: progress.progress,
            cpm: progress.cpm,
            accuracy: progress.accuracy,
            error_count: progress.error_count,
            finished: progress.finished,
            position: progress.position,
        }
    }
}

/// Roster entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub username: String,
    pub progress: f64,
    pub cpm: u32,
    pub accuracy: u32,
    pub error_count: u32,
    pub finished: bool,
    pub position: u32,
    pub is_spectator: bool,
}

impl PlayerView {
    pub fn new(session: &Session, progress: &PlayerProgress) -> Self {
        Self {
            username: session.username.as_str().to_string(),
            progress: progress.progress,
            cpm: progress.cpm,
            accuracy: progress.accuracy,
            error_count: progress.error_count,
            finished: progress.finished,
            position: progress.position,
            is_spectator: session.role.is_spectator(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_event_join_game() {
        // テスト項目: joinGame を型付きのイベントとして読み取れる
        // given (前提条件):
        let raw = r#"{"type":"joinGame","username":"alice"}"#;

        // when (操作):
        let event: ClientEvent = serde_json::from_str(raw).unwrap();

        // then (期待する結果):
        assert_eq!(
            event,
            ClientEvent::JoinGame {
                username: "alice".to_string()
            }
        );
    }

    #[test]
    fn test_client_event_optional_fields() {
        // テスト項目: 省略可能なフィールドがなくても読み取れる
        // then (期待する結果):
        assert_eq!(
            serde_json::from_str::<ClientEvent>(r#"{"type":"startGame"}"#).unwrap(),
            ClientEvent::StartGame {
                time_limit_seconds: None
            }
        );
        assert_eq!(
            serde_json::from_str::<ClientEvent>(
                r#"{"type":"typingUpdate","userInput":"he","errorCount":1}"#
            )
            .unwrap(),
            ClientEvent::TypingUpdate {
                user_input: "he".to_string(),
                text_length: None,
                error_count: Some(1),
            }
        );
        assert_eq!(
            serde_json::from_str::<ClientEvent>(r#"{"type":"timeUp"}"#).unwrap(),
            ClientEvent::TimeUp
        );
    }

    #[test]
    fn test_client_event_malformed_is_rejected() {
        // テスト項目: 必須フィールドの欠落や未知のイベントはエラーになる
        // then (期待する結果):
        assert!(serde_json::from_str::<ClientEvent>(r#"{"type":"joinGame"}"#).is_err());
        assert!(serde_json::from_str::<ClientEvent>(r#"{"type":"typingUpdate"}"#).is_err());
        assert!(serde_json::from_str::<ClientEvent>(r#"{"type":"fly"}"#).is_err());
        assert!(serde_json::from_str::<ClientEvent>("not json").is_err());
    }

    #[test]
    fn test_server_event_wire_format() {
        // テスト項目: 送信イベントが camelCase のフィールド名で直列化される
        // given (前提条件):
        let event = ServerEvent::GameStart {
            text: "hello".to_string(),
            start_time: 1_000,
            time_limit_seconds: 30,
        };

        // when (操作):
        let value = serde_json::to_value(&event).unwrap();

        // then (期待する結果):
        assert_eq!(
            value,
            json!({"type":"gameStart","text":"hello","startTime":1000,"timeLimitSeconds":30})
        );
        assert_eq!(event.name(), "gameStart");
    }

    #[test]
    fn test_server_event_omits_empty_optionals() {
        // テスト項目: 値のない任意フィールドは出力されない
        // given (前提条件):
        let event = ServerEvent::GameJoined {
            phase: Phase::Waiting,
            is_spectator: false,
            message: None,
        };

        // when (操作):
        let value = serde_json::to_value(&event).unwrap();

        // then (期待する結果):
        assert_eq!(
            value,
            json!({"type":"gameJoined","phase":"waiting","isSpectator":false})
        );
    }

    #[test]
    fn test_player_progress_is_flattened() {
        // テスト項目: playerProgress はペイロードのフィールドがトップレベルに並ぶ
        // given (前提条件):
        let event = ServerEvent::PlayerProgress(PlayerProgressMessage {
            username: "alice".to_string(),
            progress: 50.0,
            cpm: 120,
            accuracy: 98,
            error_count: 1,
            finished: false,
            position: 0,
        });

        // when (操作):
        let value = serde_json::to_value(&event).unwrap();

        // then (期待する結果):
        assert_eq!(value["type"], "playerProgress");
        assert_eq!(value["username"], "alice");
        assert_eq!(value["errorCount"], 1);
    }
}
