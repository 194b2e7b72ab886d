use super::client::{EgressApi, LiveKitEgressClient};
use super::messages::{EgressInfo, EgressStatus, FileInfo, S3Upload};
use super::request::{room_composite_request, RecordingMode};
use crate::config::{LiveKitConfig, StorageConfig};
use crate::error::{Error, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// A recording started by this process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EgressJob {
    pub egress_id: String,
    pub room_name: String,
    pub user_id: String,
    /// Unix seconds, taken when the start request was issued
    pub started_at: i64,
}

/// Outcome of a successful stop
#[derive(Debug, Clone, Serialize)]
pub struct EgressStopResult {
    pub egress_id: String,
    pub room_name: String,
    pub status: EgressStatus,
    /// Unix seconds, taken when the stop completed
    pub stopped_at: i64,
}

/// Provider-side view of an egress
#[derive(Debug, Clone, Serialize)]
pub struct EgressSummary {
    pub egress_id: String,
    pub room_name: String,
    pub status: EgressStatus,
    pub started_at: i64,
    pub ended_at: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error: String,
    /// Files written by the egress (empty until it completes)
    pub file_results: Vec<FileInfo>,
}

impl From<EgressInfo> for EgressSummary {
    fn from(info: EgressInfo) -> Self {
        Self {
            egress_id: info.egress_id,
            room_name: info.room_name,
            status: info.status,
            started_at: info.started_at,
            ended_at: info.ended_at,
            error: info.error,
            file_results: info.file_results,
        }
    }
}

/// Owner of the egress API handle and the table of recordings started here
///
/// The table is a cache of what this process started; the provider's own
/// listing is authoritative.
pub struct EgressSession {
    /// Provider handle, `None` once closed
    api: RwLock<Option<Arc<dyn EgressApi>>>,

    /// Upload destination attached to every recording
    upload: S3Upload,

    /// Active jobs (egress_id → job)
    active: RwLock<HashMap<String, EgressJob>>,
}

impl EgressSession {
    /// Build a session backed by the LiveKit API
    pub fn connect(livekit: &LiveKitConfig, storage: &StorageConfig) -> Result<Self> {
        let mut missing = Vec::new();
        let api_key = required(&livekit.api_key, "LIVEKIT_API_KEY", &mut missing);
        let api_secret = required(&livekit.api_secret, "LIVEKIT_API_SECRET", &mut missing);
        let url = required(&livekit.url, "LIVEKIT_URL", &mut missing);

        let (Some(api_key), Some(api_secret), Some(url)) = (api_key, api_secret, url) else {
            return Err(Error::Configuration(format!(
                "missing LiveKit settings: {}",
                missing.join(", ")
            )));
        };

        let client = LiveKitEgressClient::new(
            url,
            api_key.to_string(),
            api_secret.to_string(),
            Duration::from_secs(livekit.request_timeout_secs),
        )
        .map_err(|e| Error::Configuration(format!("failed to build LiveKit client: {}", e)))?;

        Ok(Self::with_api(Arc::new(client), upload_destination(storage)))
    }

    /// Build a session over any egress API implementation
    pub fn with_api(api: Arc<dyn EgressApi>, upload: S3Upload) -> Self {
        Self {
            api: RwLock::new(Some(api)),
            upload,
            active: RwLock::new(HashMap::new()),
        }
    }

    async fn api(&self) -> Result<Arc<dyn EgressApi>> {
        self.api.read().await.clone().ok_or(Error::Closed)
    }

    /// Start a composite recording of `room_name` stored under `user_id`
    pub async fn start(
        &self,
        room_name: &str,
        user_id: &str,
        mode: RecordingMode,
    ) -> Result<EgressJob> {
        let api = self.api().await?;
        let started_at = Utc::now().timestamp();
        let request = room_composite_request(room_name, user_id, mode, started_at, &self.upload);

        debug!("Starting composite egress: {:?}", request);

        let info = api
            .start_room_composite(&request)
            .await
            .map_err(|source| {
                Error::from_provider("start egress", source, |source| Error::EgressStart {
                    room_name: room_name.to_string(),
                    source,
                })
            })?;

        let job = EgressJob {
            egress_id: info.egress_id,
            room_name: room_name.to_string(),
            user_id: user_id.to_string(),
            started_at,
        };

        {
            let mut active = self.active.write().await;
            active.insert(job.egress_id.clone(), job.clone());
        }

        info!(
            "Composite egress started: {} (room={}, user={}, mode={:?})",
            job.egress_id, room_name, user_id, mode
        );

        Ok(job)
    }

    /// Stop an egress, whether or not this process started it
    pub async fn stop(&self, egress_id: &str) -> Result<EgressStopResult> {
        let api = self.api().await?;

        debug!("Stopping egress: {}", egress_id);

        let info = api.stop_egress(egress_id).await.map_err(|source| {
            Error::from_provider("stop egress", source, |source| Error::EgressStop {
                egress_id: egress_id.to_string(),
                source,
            })
        })?;

        let removed = {
            let mut active = self.active.write().await;
            active.remove(egress_id)
        };

        if removed.is_none() {
            warn!("Stopped egress {} was not tracked locally", egress_id);
        }

        let room_name = if info.room_name.is_empty() {
            removed.map(|job| job.room_name).unwrap_or_default()
        } else {
            info.room_name
        };

        info!("Egress stopped: {} (status={})", egress_id, info.status);

        Ok(EgressStopResult {
            egress_id: if info.egress_id.is_empty() {
                egress_id.to_string()
            } else {
                info.egress_id
            },
            room_name,
            status: info.status,
            stopped_at: Utc::now().timestamp(),
        })
    }

    /// All egresses known to the provider
    pub async fn list(&self, room_name: Option<&str>) -> Result<Vec<EgressSummary>> {
        let api = self.api().await?;

        debug!("Listing egresses (room={:?})", room_name);

        let items = api.list_egress(room_name).await.map_err(|source| {
            Error::from_provider("list egresses", source, |source| Error::EgressList { source })
        })?;

        Ok(items.into_iter().map(EgressSummary::from).collect())
    }

    /// Jobs started by this process and not yet stopped
    pub async fn active_jobs(&self) -> Vec<EgressJob> {
        let active = self.active.read().await;
        let mut jobs: Vec<EgressJob> = active.values().cloned().collect();
        jobs.sort_by(|a, b| {
            a.started_at
                .cmp(&b.started_at)
                .then_with(|| a.egress_id.cmp(&b.egress_id))
        });
        jobs
    }

    /// Release the provider handle; later calls are no-ops
    pub async fn close(&self) {
        let api = {
            let mut api = self.api.write().await;
            api.take()
        };

        if let Some(api) = api {
            api.close().await;
            info!("Egress session closed");
        }
    }

    pub async fn is_closed(&self) -> bool {
        self.api.read().await.is_none()
    }
}

fn required<'a>(
    value: &'a Option<String>,
    name: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            missing.push(name);
            None
        }
    }
}

fn upload_destination(storage: &StorageConfig) -> S3Upload {
    S3Upload {
        access_key: storage.access_key_id.clone().unwrap_or_default(),
        secret: storage.secret_access_key.clone().unwrap_or_default(),
        region: storage.region.clone(),
        bucket: storage.bucket.clone().unwrap_or_default(),
        endpoint: storage.endpoint.clone().unwrap_or_default(),
        force_path_style: true,
    }
}
