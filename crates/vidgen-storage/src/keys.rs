//! Deterministic blob key layout.
//!
//! Keys are derived from the job id alone, so a retried completion
//! sequence overwrites the same object instead of accumulating copies.

/// Blob key for a finished video artifact.
pub fn video_key(job_id: &str) -> String {
    format!("videos/{job_id}.mp4")
}

/// Playback path served by the media handler for a blob key.
pub fn public_media_path(key: &str) -> String {
    format!("/media/{key}")
}
