use crate::egress::EgressSession;
use crate::recordings::LocalRecordings;
use crate::storage::StorageDirectory;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Recording control (one provider handle for the process)
    pub egress: Arc<EgressSession>,

    /// Recordings stored in the bucket
    pub storage: Arc<StorageDirectory>,

    /// Recordings in the local output directory
    pub recordings: LocalRecordings,
}

impl AppState {
    pub fn new(
        egress: Arc<EgressSession>,
        storage: Arc<StorageDirectory>,
        recordings: LocalRecordings,
    ) -> Self {
        Self {
            egress,
            storage,
            recordings,
        }
    }
}
