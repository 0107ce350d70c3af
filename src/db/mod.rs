//! Application state shared by the HTTP handlers
//!
//! - `user` - operator accounts used for authentication

mod user;

pub use user::{InMemoryUserStore, UserStore, UserStoreError};

use std::sync::Arc;

use crate::batch::PayslipBatch;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub batch: Arc<PayslipBatch>,
}

impl AppState {
    /// State with an empty in-memory user store
    pub fn new(batch: PayslipBatch) -> Self {
        Self::with_user_store(Arc::new(InMemoryUserStore::default()), batch)
    }

    pub fn with_user_store(users: Arc<dyn UserStore>, batch: PayslipBatch) -> Self {
        AppState {
            users,
            batch: Arc::new(batch),
        }
    }
}
