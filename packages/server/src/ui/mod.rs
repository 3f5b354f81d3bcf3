//! UI 層: HTTP / WebSocket の入口
//!
//! ソケットの読み書きとルーティングだけを担当し、レースの状態には
//! [`CoordinatorHandle`](crate::usecase::CoordinatorHandle) 経由でのみ触れます。

mod handler;
mod runner;
mod signal;
pub mod state;

pub use runner::{router, run};
