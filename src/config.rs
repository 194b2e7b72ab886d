use anyhow::Result;
use serde::Deserialize;

/// Environment variables and the config keys they override
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("HTTP_BIND", "service.http.bind"),
    ("HTTP_PORT", "service.http.port"),
    ("LIVEKIT_API_KEY", "livekit.api_key"),
    ("LIVEKIT_API_SECRET", "livekit.api_secret"),
    ("LIVEKIT_URL", "livekit.url"),
    ("AWS_ACCESS_KEY_ID", "storage.access_key_id"),
    ("AWS_SECRET_ACCESS_KEY", "storage.secret_access_key"),
    ("AWS_REGION", "storage.region"),
    ("AWS_BUCKET_NAME", "storage.bucket"),
    ("S3_ENDPOINT", "storage.endpoint"),
    ("S3_URL_EXPIRATION", "storage.url_expiration_secs"),
    ("EGRESS_OUTPUT_DIR", "egress.output_dir"),
    ("AGENT_ENABLED", "agent.enabled"),
];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub livekit: LiveKitConfig,
    pub storage: StorageConfig,
    pub egress: EgressConfig,
    pub agent: AgentConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "jarvis-backend".to_string(),
            http: HttpConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// LiveKit server credentials
///
/// All three values are optional at load time; `EgressSession::connect`
/// refuses to start without them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LiveKitConfig {
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub url: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for LiveKitConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_secret: None,
            url: None,
            request_timeout_secs: 30,
        }
    }
}

/// Object storage bucket holding the recordings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub region: String,
    pub bucket: Option<String>,
    /// Custom S3-compatible endpoint (path-style addressing when set)
    pub endpoint: Option<String>,
    /// Default lifetime of signed download URLs
    pub url_expiration_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            access_key_id: None,
            secret_access_key: None,
            region: "us-east-1".to_string(),
            bucket: None,
            endpoint: None,
            url_expiration_secs: 3600,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EgressConfig {
    /// Directory holding locally written recordings
    pub output_dir: String,
}

impl Default for EgressConfig {
    fn default() -> Self {
        Self {
            output_dir: "/app/recordings".to_string(),
        }
    }
}

/// Voice agent worker launched next to the API
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub enabled: bool,
    pub command: String,
    pub args: Vec<String>,
    pub working_dir: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            command: "python3".to_string(),
            args: vec!["agent.py".to_string(), "dev".to_string()],
            working_dir: ".".to_string(),
        }
    }
}

impl Config {
    /// Load from an optional config file, then the process environment
    pub fn load(path: &str) -> Result<Self> {
        Self::load_from(path, std::env::vars())
    }

    /// Load from an optional config file, then the given environment variables
    pub fn load_from<I>(path: &str, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(path).required(false));

        for (name, value) in vars {
            if let Some((_, key)) = ENV_OVERRIDES.iter().find(|(var, _)| *var == name) {
                if !value.is_empty() {
                    builder = builder.set_override(*key, value)?;
                }
            }
        }

        let settings = builder.build()?;

        Ok(settings.try_deserialize()?)
    }
}
