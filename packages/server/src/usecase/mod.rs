//! UseCase 層
//!
//! レースの進行を担うコーディネータを実装するレイヤー。
//! UI 層からはコマンドとして呼び出され、Domain 層と Infrastructure 層を操作します。

pub mod command;
pub mod coordinator;
pub mod error;
mod lobby;
mod race;

#[cfg(test)]
mod test_support;

pub use command::Command;
pub use coordinator::{CoordinatorHandle, RaceCoordinator};
pub use error::CoordinatorGone;
