//! Value Objects for domain models.
//!
//! Value Objects are immutable objects that represent values in the domain.
//! They are compared by their value, not by identity.

use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};

use super::error::ValueObjectError;

/// Maximum username length, counted in characters.
pub const USERNAME_MAX_CHARS: usize = 32;

/// Connection identifier value object.
///
/// Identifies one live WebSocket connection. A player who reconnects gets a
/// new ConnectionId while keeping the same [`Username`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Create a new ConnectionId.
    ///
    /// # Errors
    ///
    /// Returns `ValueObjectError::ConnectionIdEmpty` for an empty string
    pub fn new(id: String) -> Result<Self, ValueObjectError> {
        if id.is_empty() {
            return Err(ValueObjectError::ConnectionIdEmpty);
        }
        Ok(Self(id))
    }

    /// Create a ConnectionId from a UUID.
    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid.to_string())
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Username value object.
///
/// The stable player identity handed over by the authentication service.
/// Surrounding whitespace is trimmed before validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    /// Create a new Username.
    ///
    /// # Arguments
    ///
    /// * `name` - The raw username string
    ///
    /// # Returns
    ///
    /// A Result containing the Username or an error if validation fails
    pub fn new(name: String) -> Result<Self, ValueObjectError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::UsernameEmpty);
        }
        let len = trimmed.chars().count();
        if len > USERNAME_MAX_CHARS {
            return Err(ValueObjectError::UsernameTooLong {
                max: USERNAME_MAX_CHARS,
                actual: len,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Race duration in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeLimit(u32);

impl TimeLimit {
    pub const MIN_SECONDS: u32 = 5;
    pub const MAX_SECONDS: u32 = 600;
    pub const DEFAULT_SECONDS: u32 = 60;

    /// Create a new TimeLimit.
    ///
    /// # Errors
    ///
    /// Returns `ValueObjectError::TimeLimitOutOfRange` outside
    /// `MIN_SECONDS..=MAX_SECONDS`
    pub fn new(seconds: u32) -> Result<Self, ValueObjectError> {
        if !(Self::MIN_SECONDS..=Self::MAX_SECONDS).contains(&seconds) {
            return Err(ValueObjectError::TimeLimitOutOfRange {
                min: Self::MIN_SECONDS,
                max: Self::MAX_SECONDS,
                actual: seconds,
            });
        }
        Ok(Self(seconds))
    }

    pub fn seconds(&self) -> u32 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.0))
    }
}

impl Default for TimeLimit {
    fn default() -> Self {
        Self(Self::DEFAULT_SECONDS)
    }
}

/// Timestamp value object.
///
/// Represents a Unix timestamp in milliseconds (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Create a new Timestamp from Unix milliseconds.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the inner i64 value.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_new_success() {
        // テスト項目: 有効な接続 ID を作成できる
        // given (前提条件):
        let id = "conn-1".to_string();

        // when (操作):
        let result = ConnectionId::new(id);

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(result.unwrap().as_str(), "conn-1");
    }

    #[test]
    fn test_connection_id_new_empty_fails() {
        // テスト項目: 空の接続 ID は作成できない
        // when (操作):
        let result = ConnectionId::new(String::new());

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), ValueObjectError::ConnectionIdEmpty);
    }

    #[test]
    fn test_username_new_trims_whitespace() {
        // テスト項目: ユーザー名の前後の空白は取り除かれる
        // given (前提条件):
        let name = "  alice \n".to_string();

        // when (操作):
        let result = Username::new(name);

        // then (期待する結果):
        assert_eq!(result.unwrap().as_str(), "alice");
    }

    #[test]
    fn test_username_new_blank_fails() {
        // テスト項目: 空白のみのユーザー名は作成できない
        // when (操作):
        let result = Username::new("   ".to_string());

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), ValueObjectError::UsernameEmpty);
    }

    #[test]
    fn test_username_new_too_long_fails() {
        // テスト項目: 33 文字以上のユーザー名は作成できない（文字数で数える）
        // given (前提条件):
        let name = "あ".repeat(33);

        // when (操作):
        let result = Username::new(name);

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            ValueObjectError::UsernameTooLong {
                max: 32,
                actual: 33
            }
        );
    }

    #[test]
    fn test_username_multibyte_within_limit() {
        // テスト項目: マルチバイト文字でも 32 文字以内なら作成できる
        // when (操作):
        let result = Username::new("あ".repeat(32));

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[test]
    fn test_time_limit_bounds() {
        // テスト項目: 制限時間は 5〜600 秒の範囲のみ受け付ける
        // then (期待する結果):
        assert_eq!(TimeLimit::new(5).unwrap().seconds(), 5);
        assert_eq!(TimeLimit::new(600).unwrap().seconds(), 600);
        assert_eq!(
            TimeLimit::new(4).unwrap_err(),
            ValueObjectError::TimeLimitOutOfRange {
                min: 5,
                max: 600,
                actual: 4
            }
        );
        assert!(TimeLimit::new(601).is_err());
    }

    #[test]
    fn test_time_limit_default_and_duration() {
        // テスト項目: デフォルトの制限時間は 60 秒
        // when (操作):
        let limit = TimeLimit::default();

        // then (期待する結果):
        assert_eq!(limit.seconds(), 60);
        assert_eq!(limit.as_duration(), Duration::from_secs(60));
    }

    #[test]
    fn test_timestamp_ordering() {
        // テスト項目: タイムスタンプは順序付けできる
        // given (前提条件):
        let ts1 = Timestamp::new(1000);
        let ts2 = Timestamp::new(2000);

        // then (期待する結果):
        assert!(ts1 < ts2);
        assert_eq!(ts2.value(), 2000);
    }
}
