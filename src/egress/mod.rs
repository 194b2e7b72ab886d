//! Recording (egress) management
//!
//! This module provides the `EgressSession` that:
//! - Owns the one LiveKit egress API handle for the process
//! - Composes room composite requests for full or audio-only recordings
//! - Tracks the recordings started by this process until they are stopped

mod client;
mod messages;
mod request;
mod session;
mod token;

pub use client::{EgressApi, LiveKitEgressClient};
pub use messages::{
    EgressInfo, EgressStatus, EncodedFileType, FileInfo, RoomCompositeEgressRequest,
    S3Upload,
};
pub use request::{room_composite_request, storage_key, user_prefix, RecordingMode};
pub use session::{EgressJob, EgressSession, EgressStopResult, EgressSummary};
