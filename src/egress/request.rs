use super::messages::{
    AudioCodec, EncodedFileOutput, EncodedFileType, EncodingOptions, EncodingOptionsPreset,
    RoomCompositeEgressRequest, S3Upload,
};
use serde::{Deserialize, Serialize};

/// Recording mode, fixed for the whole life of an egress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingMode {
    /// Audio and video, H.264 720p30 in an MP4 container
    #[default]
    Full,
    /// Opus audio in an OGG container
    AudioOnly,
}

impl RecordingMode {
    pub fn from_audio_only(audio_only: bool) -> Self {
        if audio_only {
            RecordingMode::AudioOnly
        } else {
            RecordingMode::Full
        }
    }

    pub fn file_type(&self) -> EncodedFileType {
        match self {
            RecordingMode::Full => EncodedFileType::Mp4,
            RecordingMode::AudioOnly => EncodedFileType::Ogg,
        }
    }

    /// Extension the egress service appends to the storage key
    pub fn extension(&self) -> &'static str {
        match self {
            RecordingMode::Full => "mp4",
            RecordingMode::AudioOnly => "ogg",
        }
    }

    fn preset(&self) -> Option<EncodingOptionsPreset> {
        match self {
            RecordingMode::Full => Some(EncodingOptionsPreset::H264_720P_30),
            RecordingMode::AudioOnly => None,
        }
    }

    fn advanced(&self) -> Option<EncodingOptions> {
        match self {
            RecordingMode::Full => None,
            RecordingMode::AudioOnly => Some(EncodingOptions {
                audio_codec: AudioCodec::Opus,
                audio_bitrate: 128,
                audio_frequency: 48000,
            }),
        }
    }
}

/// Per-user storage prefix, `sessions/{user_id}/`
pub fn user_prefix(user_id: &str) -> String {
    format!("sessions/{}/", user_id)
}

/// Storage key for a recording, without extension
pub fn storage_key(user_id: &str, room_name: &str, timestamp: i64) -> String {
    format!(
        "{}recording_{}_{}",
        user_prefix(user_id),
        room_name,
        timestamp
    )
}

/// Compose the room composite egress request for one recording
pub fn room_composite_request(
    room_name: &str,
    user_id: &str,
    mode: RecordingMode,
    timestamp: i64,
    upload: &S3Upload,
) -> RoomCompositeEgressRequest {
    RoomCompositeEgressRequest {
        room_name: room_name.to_string(),
        audio_only: mode == RecordingMode::AudioOnly,
        file_outputs: vec![EncodedFileOutput {
            file_type: mode.file_type(),
            filepath: storage_key(user_id, room_name, timestamp),
            s3: upload.clone(),
        }],
        preset: mode.preset(),
        advanced: mode.advanced(),
    }
}
