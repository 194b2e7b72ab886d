use super::messages::{
    EgressInfo, ListEgressRequest, ListEgressResponse, RoomCompositeEgressRequest,
    StopEgressRequest, TwirpError,
};
use super::token::{recording_token, DEFAULT_TTL};
use crate::error::ProviderError;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

const EGRESS_SERVICE: &str = "livekit.Egress";

/// Egress control API of the media platform
#[async_trait::async_trait]
pub trait EgressApi: Send + Sync {
    /// Start a composite recording of a room
    async fn start_room_composite(
        &self,
        request: &RoomCompositeEgressRequest,
    ) -> Result<EgressInfo, ProviderError>;

    /// Stop a running egress
    async fn stop_egress(&self, egress_id: &str) -> Result<EgressInfo, ProviderError>;

    /// List active and past egresses, optionally for one room
    async fn list_egress(&self, room_name: Option<&str>) -> Result<Vec<EgressInfo>, ProviderError>;

    /// Shutdown hook, called once by `EgressSession::close`
    ///
    /// Connection resources are released when the session drops its handle
    /// right after this returns; implementations only need to log or flush.
    async fn close(&self);
}

/// LiveKit egress client speaking Twirp/JSON
pub struct LiveKitEgressClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: String,
}

impl LiveKitEgressClient {
    pub fn new(
        url: &str,
        api_key: String,
        api_secret: String,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = http_base_url(url);

        info!("Initialized LiveKit egress client for {}", base_url);

        Ok(Self {
            http,
            base_url,
            api_key,
            api_secret,
        })
    }

    async fn call<Req, Resp>(&self, method: &str, body: &Req) -> Result<Resp, ProviderError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = format!("{}/twirp/{}/{}", self.base_url, EGRESS_SERVICE, method);
        let token = recording_token(&self.api_key, &self.api_secret, DEFAULT_TTL)?;

        debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!("{} failed with status {}: {}", method, status, text);

            let twirp: TwirpError = serde_json::from_str(&text).unwrap_or_default();
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                code: twirp.code,
                message: if twirp.msg.is_empty() { text } else { twirp.msg },
            });
        }

        serde_json::from_str(&text).map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

#[async_trait::async_trait]
impl EgressApi for LiveKitEgressClient {
    async fn start_room_composite(
        &self,
        request: &RoomCompositeEgressRequest,
    ) -> Result<EgressInfo, ProviderError> {
        self.call("StartRoomCompositeEgress", request).await
    }

    async fn stop_egress(&self, egress_id: &str) -> Result<EgressInfo, ProviderError> {
        self.call("StopEgress", &StopEgressRequest { egress_id }).await
    }

    async fn list_egress(&self, room_name: Option<&str>) -> Result<Vec<EgressInfo>, ProviderError> {
        let response: ListEgressResponse = self
            .call("ListEgress", &ListEgressRequest { room_name })
            .await?;
        Ok(response.items)
    }

    async fn close(&self) {
        // Pooled connections go away when the last handle to the client drops
        info!("Closing LiveKit egress client");
    }
}

/// LiveKit URLs are usually given as websocket URLs; the API lives on http(s)
fn http_base_url(url: &str) -> String {
    let url = url.trim_end_matches('/');
    if let Some(rest) = url.strip_prefix("wss://") {
        format!("https://{}", rest)
    } else if let Some(rest) = url.strip_prefix("ws://") {
        format!("http://{}", rest)
    } else {
        url.to_string()
    }
}
