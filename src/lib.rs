pub mod agent;
pub mod config;
pub mod egress;
pub mod error;
pub mod http;
pub mod recordings;
pub mod storage;

#[cfg(test)]
mod testing;

pub use agent::AgentProcess;
pub use config::Config;
pub use egress::{EgressApi, EgressJob, EgressSession, EgressStopResult, RecordingMode};
pub use error::{Error, ProviderError, Result};
pub use http::{create_router, AppState};
pub use recordings::LocalRecordings;
pub use storage::{ObjectStore, S3ObjectStore, StorageDirectory};
