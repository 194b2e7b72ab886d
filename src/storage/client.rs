use crate::config::StorageConfig;
use crate::error::{Error, ProviderError, Result};
use percent_encoding::percent_decode_str;
use rusty_s3::actions::ListObjectsV2;
use rusty_s3::{Bucket, Credentials, S3Action, UrlStyle};
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

/// Lifetime of the signature on listing requests
const LIST_SIGNATURE_TTL: Duration = Duration::from_secs(60);

/// One page of a prefix listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    pub keys: Vec<String>,
    pub next_continuation_token: Option<String>,
}

/// Object storage operations used by the storage directory
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch one page of keys under `prefix`
    async fn list_page(
        &self,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> std::result::Result<ObjectPage, ProviderError>;

    /// Sign a GET URL for `key` valid for `expires_in`
    fn presign_get(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> std::result::Result<String, ProviderError>;
}

/// S3 (or S3-compatible) bucket
pub struct S3ObjectStore {
    http: reqwest::Client,
    bucket: Bucket,
    credentials: Option<Credentials>,
}

impl S3ObjectStore {
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let name = config
            .bucket
            .clone()
            .filter(|b| !b.is_empty())
            .ok_or_else(|| Error::Configuration("missing storage setting: AWS_BUCKET_NAME".into()))?;

        let (endpoint, style) = match &config.endpoint {
            Some(endpoint) if !endpoint.is_empty() => (endpoint.clone(), UrlStyle::Path),
            _ => (
                format!("https://s3.{}.amazonaws.com", config.region),
                UrlStyle::VirtualHost,
            ),
        };
        let endpoint: Url = endpoint.parse().map_err(|e| {
            Error::Configuration(format!("invalid storage endpoint {}: {}", endpoint, e))
        })?;

        let bucket = Bucket::new(endpoint, style, name, config.region.clone())
            .map_err(|e| Error::Configuration(format!("invalid bucket settings: {:?}", e)))?;

        let credentials = match (&config.access_key_id, &config.secret_access_key) {
            (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty() => {
                Some(Credentials::new(key.clone(), secret.clone()))
            }
            _ => None,
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build storage client: {}", e)))?;

        Ok(Self {
            http,
            bucket,
            credentials,
        })
    }

    fn credentials(&self) -> std::result::Result<&Credentials, ProviderError> {
        self.credentials.as_ref().ok_or_else(|| {
            ProviderError::MissingCredentials(
                "AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY must be set".into(),
            )
        })
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_page(
        &self,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> std::result::Result<ObjectPage, ProviderError> {
        let url = {
            let mut action = self.bucket.list_objects_v2(Some(self.credentials()?));
            action.with_prefix(prefix);
            if let Some(token) = continuation_token {
                action.with_continuation_token(token);
            }
            action.sign(LIST_SIGNATURE_TTL)
        };

        debug!("Listing {} (continuation={:?})", prefix, continuation_token);

        let response = self.http.get(url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!("ListObjectsV2 failed with status {}: {}", status, text);
            return Err(s3_error(status.as_u16(), &text));
        }

        let parsed = ListObjectsV2::parse_response(&text)
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        let keys = parsed
            .contents
            .iter()
            .map(|obj| decode_key(&obj.key))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(ObjectPage {
            keys,
            next_continuation_token: parsed.next_continuation_token,
        })
    }

    fn presign_get(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> std::result::Result<String, ProviderError> {
        let action = self.bucket.get_object(Some(self.credentials()?), key);
        Ok(action.sign(expires_in).to_string())
    }
}

/// Listings are requested with `encoding-type=url`, so keys come back
/// form-encoded
fn decode_key(raw: &str) -> std::result::Result<String, ProviderError> {
    let plus_decoded = raw.replace('+', " ");
    percent_decode_str(&plus_decoded)
        .decode_utf8()
        .map(|key| key.into_owned())
        .map_err(|e| ProviderError::Decode(format!("invalid object key {}: {}", raw, e)))
}

/// Build a rejection from an S3 XML error document
fn s3_error(status: u16, body: &str) -> ProviderError {
    ProviderError::Rejected {
        status,
        code: xml_element(body, "Code").unwrap_or_default().to_string(),
        message: xml_element(body, "Message")
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()),
    }
}

fn xml_element<'a>(body: &'a str, name: &str) -> Option<&'a str> {
    let open = format!("<{}>", name);
    let close = format!("</{}>", name);
    let start = body.find(&open)? + open.len();
    let end = start + body[start..].find(&close)?;
    Some(body[start..end].trim())
}
