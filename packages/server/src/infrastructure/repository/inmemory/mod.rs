//! InMemory 実装
//!
//! HashMap をインメモリ DB として使用します。コーディネータのタスクだけが
//! 所有・更新するため、ロックは持ちません。

pub mod progress;
pub mod session;

pub use progress::ProgressStore;
pub use session::{JoinOutcome, SessionRegistry};
