//! UseCase 層のエラー定義

use thiserror::Error;

/// The coordinator task has stopped and no longer accepts commands
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("race coordinator is no longer running")]
pub struct CoordinatorGone;
