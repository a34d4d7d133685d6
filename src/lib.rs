// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod auth;
pub mod config;
pub mod error;
pub mod notify;
pub mod reviews;
pub mod run;

// ---- Re-exports for stable public API ----
pub use crate::config::Config;
pub use crate::error::{ApiError, ConfigError, NotifyError, RunError, StoreError};
pub use crate::notify::ReviewNotifier;
pub use crate::reviews::store::{SeenSet, SeenSetStore};
pub use crate::reviews::types::{Review, ReviewSource};
pub use crate::run::{run, RunResult};
