// Test doubles for the egress API and the object store
//
// Both count their calls so tests can assert which operations reached the
// provider.

#![allow(dead_code)]

use jarvis_backend::egress::{EgressInfo, EgressStatus, RoomCompositeEgressRequest, S3Upload};
use jarvis_backend::storage::ObjectPage;
use jarvis_backend::{EgressApi, ObjectStore, ProviderError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn upload() -> S3Upload {
    S3Upload {
        access_key: "AKIATEST".to_string(),
        secret: "secret".to_string(),
        region: "us-east-1".to_string(),
        bucket: "recordings".to_string(),
        endpoint: String::new(),
        force_path_style: true,
    }
}

fn rejected(status: u16, code: &str, message: &str) -> ProviderError {
    ProviderError::Rejected {
        status,
        code: code.to_string(),
        message: message.to_string(),
    }
}

/// In-memory egress service
#[derive(Default)]
pub struct MockEgressApi {
    next_id: AtomicUsize,
    running: Mutex<HashMap<String, String>>,
    start_failure: Mutex<Option<(u16, String)>>,
    lenient_stops: AtomicBool,
    pub requests: Mutex<Vec<RoomCompositeEgressRequest>>,
    pub start_calls: AtomicUsize,
    pub stop_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub close_calls: AtomicUsize,
}

impl MockEgressApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every start fail with the given status and Twirp code
    pub fn fail_starts(&self, status: u16, code: &str) {
        *self.start_failure.lock().unwrap() = Some((status, code.to_string()));
    }

    /// Accept every stop, even for ids this mock never started, and leave
    /// the room name out of the reply
    pub fn lenient_stops(&self) {
        self.lenient_stops.store(true, Ordering::SeqCst);
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EgressApi for MockEgressApi {
    async fn start_room_composite(
        &self,
        request: &RoomCompositeEgressRequest,
    ) -> Result<EgressInfo, ProviderError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        if let Some((status, code)) = self.start_failure.lock().unwrap().clone() {
            return Err(rejected(status, &code, "start refused"));
        }

        let id = format!("EG_{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.running
            .lock()
            .unwrap()
            .insert(id.clone(), request.room_name.clone());

        Ok(EgressInfo {
            egress_id: id,
            room_name: request.room_name.clone(),
            status: EgressStatus::Starting,
            ..Default::default()
        })
    }

    async fn stop_egress(&self, egress_id: &str) -> Result<EgressInfo, ProviderError> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);

        let room_name = self.running.lock().unwrap().remove(egress_id);

        if self.lenient_stops.load(Ordering::SeqCst) {
            return Ok(EgressInfo {
                egress_id: egress_id.to_string(),
                status: EgressStatus::Ending,
                ..Default::default()
            });
        }

        match room_name {
            Some(room_name) => Ok(EgressInfo {
                egress_id: egress_id.to_string(),
                room_name,
                status: EgressStatus::Ending,
                ..Default::default()
            }),
            None => Err(rejected(404, "not_found", "egress does not exist")),
        }
    }

    async fn list_egress(&self, room_name: Option<&str>) -> Result<Vec<EgressInfo>, ProviderError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let running = self.running.lock().unwrap();
        let mut items: Vec<EgressInfo> = running
            .iter()
            .filter(|(_, room)| room_name.map_or(true, |name| name == room.as_str()))
            .map(|(id, room)| EgressInfo {
                egress_id: id.clone(),
                room_name: room.clone(),
                status: EgressStatus::Active,
                ..Default::default()
            })
            .collect();
        items.sort_by(|a, b| a.egress_id.cmp(&b.egress_id));
        Ok(items)
    }

    async fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// In-memory bucket serving fixed-size listing pages
pub struct MockObjectStore {
    objects: Vec<String>,
    page_size: usize,
    list_failure: Mutex<Option<ProviderError>>,
    pub list_calls: AtomicUsize,
    pub presign_calls: AtomicUsize,
}

impl MockObjectStore {
    pub fn new(objects: &[&str], page_size: usize) -> Self {
        Self {
            objects: objects.iter().map(|o| o.to_string()).collect(),
            page_size,
            list_failure: Mutex::new(None),
            list_calls: AtomicUsize::new(0),
            presign_calls: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::new(&[], 1000)
    }

    /// Make the next listing fail
    pub fn fail_next_list(&self, error: ProviderError) {
        *self.list_failure.lock().unwrap() = Some(error);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn presign_calls(&self) -> usize {
        self.presign_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ObjectStore for MockObjectStore {
    async fn list_page(
        &self,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> Result<ObjectPage, ProviderError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.list_failure.lock().unwrap().take() {
            return Err(error);
        }

        let matching: Vec<&String> = self
            .objects
            .iter()
            .filter(|key| key.starts_with(prefix))
            .collect();
        let start: usize = continuation_token.map_or(0, |t| t.parse().unwrap());
        let end = (start + self.page_size).min(matching.len());

        Ok(ObjectPage {
            keys: matching[start..end].iter().map(|k| k.to_string()).collect(),
            next_continuation_token: (end < matching.len()).then(|| end.to_string()),
        })
    }

    fn presign_get(&self, key: &str, expires_in: Duration) -> Result<String, ProviderError> {
        self.presign_calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!(
            "https://recordings.s3.test/{}?X-Amz-Expires={}",
            key,
            expires_in.as_secs()
        ))
    }
}

pub fn rejected_error(status: u16, code: &str) -> ProviderError {
    rejected(status, code, "rejected by test")
}
