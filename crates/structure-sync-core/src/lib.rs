pub mod config;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod mapping;
pub mod paths;
pub mod progress;
pub mod reconcile;
pub mod scanner;
pub mod task;

pub use config::{AppConfig, DuplicatePolicy};
pub use engine::{ScanResult, SyncEngine};
pub use error::{Error, FileIssue, HashError};
pub use fingerprint::{fingerprint_file, Fingerprint};
pub use mapping::FingerprintMapping;
pub use progress::{ChannelReporter, ProgressReporter, SilentReporter};
pub use reconcile::{MoveAction, SyncResult};
