pub mod cancellation;
pub mod config;
pub mod manager;
pub mod runner;

pub use cancellation::CancellationToken;
pub use config::{BatchConfig, DEFAULT_BATCH_SIZE};
pub use manager::{ManagerError, RetentionPolicy, RunManager};
pub use runner::{BatchError, BatchRunner};
