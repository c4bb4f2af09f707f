//! Cached media playback.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

fn content_type_for(key: &str) -> &'static str {
    match key.rsplit('.').next() {
        Some("mp4") => "video/mp4",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

/// `GET /media/{key}`
///
/// Serves the cached artifact straight from blob storage. Keys are the
/// deterministic layout written by the completion sequence.
pub async fn serve_media(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Response> {
    let bytes = state.blob.download_bytes(&key).await.map_err(|e| match e {
        vidgen_storage::StorageError::NotFound(key) => {
            ApiError::not_found(format!("media {key}"))
        }
        other => ApiError::from(other),
    })?;

    Ok((
        [(header::CONTENT_TYPE, content_type_for(&key))],
        bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_guess() {
        assert_eq!(content_type_for("videos/a.mp4"), "video/mp4");
        assert_eq!(content_type_for("thumbnails/a.jpg"), "image/jpeg");
        assert_eq!(content_type_for("weird/blob"), "application/octet-stream");
    }
}
