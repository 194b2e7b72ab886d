use super::client::ObjectStore;
use crate::egress::user_prefix;
use crate::error::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Every recording key lives under this prefix
pub const SESSIONS_PREFIX: &str = "sessions/";

/// Default signed URL lifetime when nothing is configured
pub const DEFAULT_URL_EXPIRATION: Duration = Duration::from_secs(3600);

/// Media extensions surfaced to callers
const RECORDING_EXTENSIONS: &[&str] = &[".mp4", ".ogg"];

/// Per-user view over the recordings bucket
pub struct StorageDirectory {
    store: Arc<dyn ObjectStore>,
    default_expiration: Duration,
}

impl StorageDirectory {
    pub fn new(store: Arc<dyn ObjectStore>, default_expiration: Duration) -> Self {
        Self {
            store,
            default_expiration,
        }
    }

    pub fn default_expiration(&self) -> Duration {
        self.default_expiration
    }

    /// All recording keys stored for `user_id`, across every listing page
    pub async fn list_files(&self, user_id: &str) -> Result<Vec<String>> {
        let prefix = user_prefix(user_id);
        let mut files = Vec::new();
        let mut continuation: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .store
                .list_page(&prefix, continuation.as_deref())
                .await
                .map_err(|source| {
                    Error::from_provider("list files", source, |source| Error::Listing {
                        prefix: prefix.clone(),
                        source,
                    })
                })?;
            pages += 1;

            files.extend(
                page.keys
                    .into_iter()
                    .filter(|key| key.starts_with(&prefix) && is_recording(key)),
            );

            match page.next_continuation_token {
                Some(token) if !token.is_empty() => continuation = Some(token),
                _ => break,
            }
        }

        debug!(
            "Listed {} recordings for {} ({} pages)",
            files.len(),
            user_id,
            pages
        );

        Ok(files)
    }

    /// Signed GET URL for a recording key
    ///
    /// Keys outside `sessions/` are refused before the store is touched.
    /// Object existence is not checked.
    pub fn get_file_url(&self, file_key: &str, expiration_secs: Option<u64>) -> Result<String> {
        if file_key.is_empty() {
            return Err(Error::InvalidKey("file key must not be empty".into()));
        }
        if !file_key.starts_with(SESSIONS_PREFIX) {
            return Err(Error::InvalidKey(format!(
                "{} is not in the {} directory",
                file_key, SESSIONS_PREFIX
            )));
        }

        let expires_in = expiration_secs
            .map(Duration::from_secs)
            .unwrap_or(self.default_expiration);

        let url = self.store.presign_get(file_key, expires_in).map_err(|source| {
            Error::from_provider("generate file URL", source, |source| Error::UrlGeneration {
                key: file_key.to_string(),
                source,
            })
        })?;

        info!(
            "Generated URL for {} (expires in {}s)",
            file_key,
            expires_in.as_secs()
        );

        Ok(url)
    }
}

fn is_recording(key: &str) -> bool {
    RECORDING_EXTENSIONS.iter().any(|ext| key.ends_with(ext))
}
