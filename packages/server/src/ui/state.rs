//! Shared application state.

use crate::usecase::CoordinatorHandle;

/// State handed to every axum handler
#[derive(Clone)]
pub struct AppState {
    /// Entry point to the race coordinator task
    pub coordinator: CoordinatorHandle,
}

impl AppState {
    pub fn new(coordinator: CoordinatorHandle) -> Self {
        Self { coordinator }
    }
}
