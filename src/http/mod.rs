//! HTTP API server
//!
//! This module provides the REST API in front of the recording services:
//! - POST /egress/start - Start recording a room
//! - POST /egress/stop - Stop a recording
//! - GET /egress/list - Egresses known to the media server
//! - GET /egress/active - Egresses started by this process
//! - GET /list - Recording keys stored for a user
//! - GET /get_file_url - Signed download URL for a recording
//! - GET /recordings, GET /recordings/:id - Local recordings
//! - GET /health - Health check

mod error;
mod extract;
mod handlers;
mod routes;
mod state;

pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
