use crate::error::ProviderError;
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lifetime of tokens minted for a single API call
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

/// LiveKit video grant (only the permissions this service needs)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoGrant {
    #[serde(default)]
    pub room_record: bool,
    #[serde(default)]
    pub room_list: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub nbf: i64,
    pub exp: i64,
    pub video: VideoGrant,
}

/// Sign an access token allowing egress control
pub fn recording_token(
    api_key: &str,
    api_secret: &str,
    ttl: Duration,
) -> Result<String, ProviderError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        iss: api_key.to_string(),
        nbf: now,
        exp: now + ttl.as_secs() as i64,
        video: VideoGrant {
            room_record: true,
            room_list: true,
        },
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(api_secret.as_bytes()),
    )
    .map_err(|e| ProviderError::Signing(e.to_string()))
}
