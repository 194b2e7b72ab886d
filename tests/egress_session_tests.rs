// Tests for the egress session manager
//
// These tests drive `EgressSession` against an in-memory egress API and check
// the active-job table, request composition and error mapping.

mod common;

use anyhow::Result;
use common::{upload, MockEgressApi};
use jarvis_backend::config::{LiveKitConfig, StorageConfig};
use jarvis_backend::egress::{EgressStatus, EncodedFileType};
use jarvis_backend::{EgressSession, Error, RecordingMode};
use std::sync::Arc;

fn session() -> (Arc<MockEgressApi>, EgressSession) {
    let api = Arc::new(MockEgressApi::new());
    let session = EgressSession::with_api(api.clone(), upload());
    (api, session)
}

#[tokio::test]
async fn test_start_records_active_job() -> Result<()> {
    let (_api, session) = session();

    let job = session.start("standup", "u1", RecordingMode::Full).await?;

    assert!(!job.egress_id.is_empty());
    assert_eq!(job.room_name, "standup");
    assert_eq!(job.user_id, "u1");
    assert!(job.started_at > 0);

    let active = session.active_jobs().await;
    assert_eq!(active, vec![job]);

    Ok(())
}

#[tokio::test]
async fn test_start_composes_full_request() -> Result<()> {
    let (api, session) = session();

    let job = session.start("standup", "u1", RecordingMode::Full).await?;

    let requests = api.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.room_name, "standup");
    assert!(!request.audio_only);
    assert!(request.preset.is_some());
    assert!(request.advanced.is_none());

    let output = &request.file_outputs[0];
    assert_eq!(output.file_type, EncodedFileType::Mp4);
    assert_eq!(
        output.filepath,
        format!("sessions/u1/recording_standup_{}", job.started_at)
    );
    assert_eq!(output.s3.bucket, "recordings");
    assert!(output.s3.force_path_style);

    Ok(())
}

#[tokio::test]
async fn test_start_composes_audio_only_request() -> Result<()> {
    let (api, session) = session();

    session.start("standup", "u1", RecordingMode::AudioOnly).await?;

    let requests = api.requests.lock().unwrap();
    let request = &requests[0];
    assert!(request.audio_only);
    assert!(request.preset.is_none());
    assert!(request.advanced.is_some());
    assert_eq!(request.file_outputs[0].file_type, EncodedFileType::Ogg);
    assert!(request.file_outputs[0]
        .filepath
        .starts_with("sessions/u1/recording_standup_"));

    Ok(())
}

#[tokio::test]
async fn test_concurrent_starts_for_same_room_are_independent() -> Result<()> {
    let (_api, session) = session();

    let (a, b) = tokio::join!(
        session.start("standup", "u1", RecordingMode::Full),
        session.start("standup", "u2", RecordingMode::Full),
    );
    let (a, b) = (a?, b?);

    assert_ne!(a.egress_id, b.egress_id);
    assert_eq!(session.active_jobs().await.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_failed_start_leaves_no_entry() {
    let (api, session) = session();
    api.fail_starts(400, "invalid_argument");

    let err = session
        .start("standup", "u1", RecordingMode::Full)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::EgressStart { ref room_name, .. } if room_name == "standup"));
    assert!(err.detail().contains("start refused"));
    assert!(session.active_jobs().await.is_empty());
}

#[tokio::test]
async fn test_rejected_credentials_on_start() {
    let (api, session) = session();
    api.fail_starts(401, "unauthenticated");

    let err = session
        .start("standup", "u1", RecordingMode::Full)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Credentials { .. }));
    assert!(session.active_jobs().await.is_empty());
}

#[tokio::test]
async fn test_stop_removes_active_job() -> Result<()> {
    let (_api, session) = session();
    let job = session.start("standup", "u1", RecordingMode::Full).await?;

    let result = session.stop(&job.egress_id).await?;

    assert_eq!(result.egress_id, job.egress_id);
    assert_eq!(result.room_name, "standup");
    assert_eq!(result.status, EgressStatus::Ending);
    assert!(result.stopped_at >= job.started_at);
    assert!(session.active_jobs().await.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_stop_twice_surfaces_provider_error() -> Result<()> {
    let (api, session) = session();
    let job = session.start("standup", "u1", RecordingMode::Full).await?;
    let retro = session.start("retro", "u1", RecordingMode::Full).await?;

    session.stop(&job.egress_id).await?;
    let err = session.stop(&job.egress_id).await.unwrap_err();

    match &err {
        Error::EgressStop { egress_id, source } => {
            assert_eq!(egress_id, &job.egress_id);
            assert!(source.is_not_found());
        }
        other => panic!("unexpected error: {:?}", other),
    }

    // Both stops reached the provider; the unrelated job is untouched
    assert_eq!(MockEgressApi::calls(&api.stop_calls), 2);
    assert_eq!(session.active_jobs().await, vec![retro]);

    Ok(())
}

#[tokio::test]
async fn test_stop_unknown_id_delegates_to_provider() {
    let (api, session) = session();

    let err = session.stop("EG_missing").await.unwrap_err();

    assert!(matches!(err, Error::EgressStop { .. }));
    assert_eq!(MockEgressApi::calls(&api.stop_calls), 1);
}

#[tokio::test]
async fn test_stop_untracked_id_accepted_by_provider() -> Result<()> {
    let (api, session) = session();
    let job = session.start("standup", "u1", RecordingMode::Full).await?;
    api.lenient_stops();

    let result = session.stop("EG_started_elsewhere").await?;

    assert_eq!(result.egress_id, "EG_started_elsewhere");
    assert_eq!(result.room_name, "");
    assert_eq!(result.status, EgressStatus::Ending);
    // The locally tracked job is untouched
    assert_eq!(session.active_jobs().await, vec![job]);

    Ok(())
}

#[tokio::test]
async fn test_stop_falls_back_to_local_room_name() -> Result<()> {
    let (api, session) = session();
    let job = session.start("standup", "u1", RecordingMode::Full).await?;
    api.lenient_stops();

    let result = session.stop(&job.egress_id).await?;

    assert_eq!(result.egress_id, job.egress_id);
    assert_eq!(result.room_name, "standup");
    assert!(session.active_jobs().await.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_list_reads_through_provider() -> Result<()> {
    let (api, session) = session();
    session.start("standup", "u1", RecordingMode::Full).await?;
    session.start("retro", "u2", RecordingMode::AudioOnly).await?;

    let all = session.list(None).await?;
    let standup = session.list(Some("standup")).await?;

    assert_eq!(all.len(), 2);
    assert_eq!(standup.len(), 1);
    assert_eq!(standup[0].room_name, "standup");
    assert_eq!(standup[0].status, EgressStatus::Active);
    assert_eq!(MockEgressApi::calls(&api.list_calls), 2);

    Ok(())
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let (api, session) = session();

    assert_eq!(Arc::strong_count(&api), 2);

    session.close().await;
    session.close().await;

    assert!(session.is_closed().await);
    // The session no longer holds the provider handle
    assert_eq!(Arc::strong_count(&api), 1);
    assert_eq!(MockEgressApi::calls(&api.close_calls), 1);
}

#[tokio::test]
async fn test_operations_after_close_fail() {
    let (api, session) = session();
    session.close().await;

    let err = session
        .start("standup", "u1", RecordingMode::Full)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Closed));
    assert!(matches!(session.stop("EG_1").await.unwrap_err(), Error::Closed));
    assert!(matches!(session.list(None).await.unwrap_err(), Error::Closed));
    assert_eq!(MockEgressApi::calls(&api.start_calls), 0);
}

#[test]
fn test_connect_requires_livekit_settings() {
    let err = EgressSession::connect(&LiveKitConfig::default(), &StorageConfig::default())
        .err()
        .expect("connect should fail without credentials");

    match err {
        Error::Configuration(message) => {
            assert!(message.contains("LIVEKIT_API_KEY"));
            assert!(message.contains("LIVEKIT_API_SECRET"));
            assert!(message.contains("LIVEKIT_URL"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_connect_rejects_blank_settings() {
    let livekit = LiveKitConfig {
        api_key: Some("key".into()),
        api_secret: Some("   ".into()),
        url: Some("wss://demo.livekit.cloud".into()),
        ..LiveKitConfig::default()
    };

    let err = EgressSession::connect(&livekit, &StorageConfig::default())
        .err()
        .expect("connect should fail with a blank secret");

    assert!(matches!(err, Error::Configuration(ref m) if m.contains("LIVEKIT_API_SECRET") && !m.contains("LIVEKIT_URL")));
}

#[test]
fn test_connect_with_settings() {
    let livekit = LiveKitConfig {
        api_key: Some("key".into()),
        api_secret: Some("secret".into()),
        url: Some("wss://demo.livekit.cloud".into()),
        ..LiveKitConfig::default()
    };

    assert!(EgressSession::connect(&livekit, &StorageConfig::default()).is_ok());
}
