use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// `livekit.RoomCompositeEgressRequest`
#[derive(Debug, Clone, Serialize)]
pub struct RoomCompositeEgressRequest {
    pub room_name: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub audio_only: bool,
    pub file_outputs: Vec<EncodedFileOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<EncodingOptionsPreset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advanced: Option<EncodingOptions>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EncodedFileOutput {
    pub file_type: EncodedFileType,
    pub filepath: String,
    pub s3: S3Upload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EncodedFileType {
    Mp4,
    Ogg,
}

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EncodingOptionsPreset {
    H264_720P_30,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodingOptions {
    pub audio_codec: AudioCodec,
    pub audio_bitrate: u32,
    pub audio_frequency: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioCodec {
    Opus,
}

/// Upload destination handed to the egress service
#[derive(Clone, Serialize)]
pub struct S3Upload {
    pub access_key: String,
    pub secret: String,
    pub region: String,
    pub bucket: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub endpoint: String,
    pub force_path_style: bool,
}

impl fmt::Debug for S3Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Upload")
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("endpoint", &self.endpoint)
            .field("force_path_style", &self.force_path_style)
            .finish_non_exhaustive()
    }
}

/// `livekit.StopEgressRequest`
#[derive(Debug, Serialize)]
pub struct StopEgressRequest<'a> {
    pub egress_id: &'a str,
}

/// `livekit.ListEgressRequest`
#[derive(Debug, Default, Serialize)]
pub struct ListEgressRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_name: Option<&'a str>,
}

/// `livekit.ListEgressResponse`
#[derive(Debug, Default, Deserialize)]
pub struct ListEgressResponse {
    #[serde(default)]
    pub items: Vec<EgressInfo>,
}

/// `livekit.EgressInfo`, reduced to the fields this service reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EgressInfo {
    #[serde(alias = "egressId")]
    pub egress_id: String,
    #[serde(default, alias = "roomName")]
    pub room_name: String,
    #[serde(default)]
    pub status: EgressStatus,
    #[serde(default, alias = "startedAt", deserialize_with = "int64")]
    pub started_at: i64,
    #[serde(default, alias = "endedAt", deserialize_with = "int64")]
    pub ended_at: i64,
    #[serde(default)]
    pub error: String,
    #[serde(default, alias = "fileResults")]
    pub file_results: Vec<FileInfo>,
}

/// `livekit.FileInfo`: where a file output landed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, deserialize_with = "int64")]
    pub size: i64,
}

/// `livekit.EgressStatus`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EgressStatus {
    #[default]
    Starting,
    Active,
    Ending,
    Complete,
    Failed,
    Aborted,
    LimitReached,
}

impl EgressStatus {
    const ALL: [EgressStatus; 7] = [
        EgressStatus::Starting,
        EgressStatus::Active,
        EgressStatus::Ending,
        EgressStatus::Complete,
        EgressStatus::Failed,
        EgressStatus::Aborted,
        EgressStatus::LimitReached,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EgressStatus::Starting => "EGRESS_STARTING",
            EgressStatus::Active => "EGRESS_ACTIVE",
            EgressStatus::Ending => "EGRESS_ENDING",
            EgressStatus::Complete => "EGRESS_COMPLETE",
            EgressStatus::Failed => "EGRESS_FAILED",
            EgressStatus::Aborted => "EGRESS_ABORTED",
            EgressStatus::LimitReached => "EGRESS_LIMIT_REACHED",
        }
    }
}

impl fmt::Display for EgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EgressStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// protojson writes enums by name, but numeric values are legal input too
impl<'de> Deserialize<'de> for EgressStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StatusVisitor;

        impl<'de> de::Visitor<'de> for StatusVisitor {
            type Value = EgressStatus;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an egress status name or number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<EgressStatus, E> {
                EgressStatus::ALL
                    .into_iter()
                    .find(|status| status.as_str() == v)
                    .ok_or_else(|| E::unknown_variant(v, &[]))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<EgressStatus, E> {
                EgressStatus::ALL
                    .get(v as usize)
                    .copied()
                    .ok_or_else(|| E::invalid_value(de::Unexpected::Unsigned(v), &self))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<EgressStatus, E> {
                match u64::try_from(v) {
                    Ok(v) => self.visit_u64(v),
                    Err(_) => Err(E::invalid_value(de::Unexpected::Signed(v), &self)),
                }
            }
        }

        deserializer.deserialize_any(StatusVisitor)
    }
}

/// Twirp error document
#[derive(Debug, Default, Deserialize)]
pub struct TwirpError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub msg: String,
}

/// int64 fields arrive as JSON strings from protojson and as numbers elsewhere
fn int64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Int64 {
        Number(i64),
        Text(String),
    }

    match Int64::deserialize(deserializer)? {
        Int64::Number(n) => Ok(n),
        Int64::Text(s) if s.is_empty() => Ok(0),
        Int64::Text(s) => s.parse().map_err(de::Error::custom),
    }
}
