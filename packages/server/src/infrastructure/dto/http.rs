//! HTTP API response DTOs for the typing race.

use serde::{Deserialize, Serialize};

use super::websocket::PlayerView;
use crate::domain::Phase;

/// Race snapshot for the `/api/race` endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceSnapshotDto {
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>, // Unix epoch milliseconds, same as `gameStart`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>, // ISO 8601
    pub time_limit_seconds: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown: Option<u32>,
    pub players: Vec<PlayerView>,
}
