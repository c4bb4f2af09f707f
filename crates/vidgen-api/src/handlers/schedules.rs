//! Recurring schedule CRUD.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Deserializer};
use validator::Validate;

use vidgen_models::{next_run, Frequency, Provider, Schedule, ScheduleId, MAX_SCHEDULE_PROMPT_LENGTH};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduleRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, max = 4000, message = "prompt must be 1-4000 characters"))]
    pub prompt: String,
    pub provider: String,
    #[validate(length(min = 1, message = "model must not be empty"))]
    pub model: String,
    pub aspect_ratio: Option<String>,
    pub frequency: String,
    #[validate(range(min = 1, message = "maxRuns must be positive"))]
    pub max_runs: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScheduleRequest {
    pub name: Option<String>,
    pub prompt: Option<String>,
    pub model: Option<String>,
    pub aspect_ratio: Option<String>,
    pub frequency: Option<String>,
    pub enabled: Option<bool>,
    /// Explicit `null` clears an existing run cap; omitting the field
    /// leaves it unchanged
    #[serde(default, deserialize_with = "nullable")]
    pub max_runs: Option<Option<i64>>,
}

/// Deserialize a nullable PATCH field: an absent field stays `None`, an
/// explicit `null` becomes `Some(None)`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// `POST /api/schedules`
pub async fn create_schedule(
    State(state): State<AppState>,
    Json(body): Json<CreateScheduleRequest>,
) -> ApiResult<(StatusCode, Json<Schedule>)> {
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let provider: Provider = body
        .provider
        .parse()
        .map_err(|e: vidgen_models::UnknownProvider| ApiError::bad_request(e.to_string()))?;
    let frequency: Frequency = body
        .frequency
        .parse()
        .map_err(ApiError::BadRequest)?;

    let schedule = Schedule::new(
        body.name,
        body.prompt,
        provider,
        body.model,
        body.aspect_ratio.unwrap_or_else(|| "16:9".to_string()),
        frequency,
        body.max_runs,
    );
    state.schedules.insert(&schedule).await?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

/// `GET /api/schedules`
pub async fn list_schedules(State(state): State<AppState>) -> ApiResult<Json<Vec<Schedule>>> {
    Ok(Json(state.schedules.list().await?))
}

/// `GET /api/schedules/{id}`
pub async fn get_schedule(
    State(state): State<AppState>,
    Path(schedule_id): Path<String>,
) -> ApiResult<Json<Schedule>> {
    let schedule = state
        .schedules
        .get(&ScheduleId::from_string(schedule_id))
        .await?;
    Ok(Json(schedule))
}

/// `PATCH /api/schedules/{id}`
///
/// Accepts any subset of mutable fields. A frequency change recomputes
/// `next_run_at` from the last run (or creation) time.
pub async fn update_schedule(
    State(state): State<AppState>,
    Path(schedule_id): Path<String>,
    Json(body): Json<UpdateScheduleRequest>,
) -> ApiResult<Json<Schedule>> {
    let mut schedule = state
        .schedules
        .get(&ScheduleId::from_string(schedule_id))
        .await?;

    if let Some(name) = body.name {
        if name.trim().is_empty() {
            return Err(ApiError::Validation("name must not be empty".into()));
        }
        schedule.name = name;
    }
    if let Some(prompt) = body.prompt {
        if prompt.trim().is_empty() || prompt.len() > MAX_SCHEDULE_PROMPT_LENGTH {
            return Err(ApiError::Validation(format!(
                "prompt must be 1-{MAX_SCHEDULE_PROMPT_LENGTH} characters"
            )));
        }
        schedule.prompt = prompt;
    }
    if let Some(model) = body.model {
        if model.trim().is_empty() {
            return Err(ApiError::Validation("model must not be empty".into()));
        }
        schedule.model = model;
    }
    if let Some(aspect_ratio) = body.aspect_ratio {
        schedule.aspect_ratio = aspect_ratio;
    }
    if let Some(frequency) = body.frequency {
        let frequency: Frequency = frequency.parse().map_err(ApiError::BadRequest)?;
        if frequency != schedule.frequency {
            schedule.frequency = frequency;
            let from = schedule.last_run_at.unwrap_or(schedule.created_at);
            schedule.next_run_at = next_run(frequency, from);
        }
    }
    if let Some(enabled) = body.enabled {
        schedule.enabled = enabled;
    }
    if let Some(max_runs) = body.max_runs {
        if max_runs.is_some_and(|max| max < 1) {
            return Err(ApiError::Validation("maxRuns must be positive".into()));
        }
        schedule.max_runs = max_runs;
    }
    schedule.updated_at = Utc::now();

    state.schedules.update(&schedule).await?;
    Ok(Json(schedule))
}

/// `DELETE /api/schedules/{id}`
pub async fn delete_schedule(
    State(state): State<AppState>,
    Path(schedule_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .schedules
        .delete(&ScheduleId::from_string(schedule_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_state;
    use wiremock::MockServer;

    fn create_body(name: &str, frequency: &str) -> CreateScheduleRequest {
        CreateScheduleRequest {
            name: name.into(),
            prompt: "a red fox in the snow".into(),
            provider: "openai".into(),
            model: "sora-2".into(),
            aspect_ratio: None,
            frequency: frequency.into(),
            max_runs: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let server = MockServer::start().await;
        let state = test_state(&server.uri()).await;

        let (status, Json(created)) =
            create_schedule(State(state.clone()), Json(create_body("daily fox", "daily")))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert!(created.enabled);

        let Json(fetched) = get_schedule(
            State(state),
            Path(created.id.as_str().to_string()),
        )
        .await
        .unwrap();
        assert_eq!(fetched.name, "daily fox");
        assert_eq!(fetched.frequency, Frequency::Daily);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_frequency() {
        let server = MockServer::start().await;
        let state = test_state(&server.uri()).await;

        let err = create_schedule(State(state), Json(create_body("x", "fortnightly")))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_name() {
        let server = MockServer::start().await;
        let state = test_state(&server.uri()).await;

        let err = create_schedule(State(state), Json(create_body("", "daily")))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_patch_frequency_recomputes_next_run() {
        let server = MockServer::start().await;
        let state = test_state(&server.uri()).await;

        let (_, Json(created)) =
            create_schedule(State(state.clone()), Json(create_body("fox", "daily")))
                .await
                .unwrap();

        let patch = UpdateScheduleRequest {
            name: None,
            prompt: None,
            model: None,
            aspect_ratio: None,
            frequency: Some("hourly".into()),
            enabled: None,
            max_runs: None,
        };
        let Json(updated) = update_schedule(
            State(state),
            Path(created.id.as_str().to_string()),
            Json(patch),
        )
        .await
        .unwrap();

        assert_eq!(updated.frequency, Frequency::Hourly);
        assert_eq!(
            updated.next_run_at,
            next_run(Frequency::Hourly, updated.created_at)
        );
        assert!(updated.next_run_at < created.next_run_at);
    }

    #[test]
    fn test_patch_distinguishes_absent_from_null_max_runs() {
        let cleared: UpdateScheduleRequest =
            serde_json::from_value(serde_json::json!({"maxRuns": null})).unwrap();
        assert_eq!(cleared.max_runs, Some(None));

        let absent: UpdateScheduleRequest = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(absent.max_runs.is_none());

        let set: UpdateScheduleRequest =
            serde_json::from_value(serde_json::json!({"maxRuns": 3})).unwrap();
        assert_eq!(set.max_runs, Some(Some(3)));
    }

    #[tokio::test]
    async fn test_patch_null_clears_run_cap() {
        let server = MockServer::start().await;
        let state = test_state(&server.uri()).await;

        let mut body = create_body("capped", "daily");
        body.max_runs = Some(3);
        let (_, Json(created)) = create_schedule(State(state.clone()), Json(body))
            .await
            .unwrap();
        assert_eq!(created.max_runs, Some(3));

        let patch: UpdateScheduleRequest =
            serde_json::from_value(serde_json::json!({"maxRuns": null})).unwrap();
        let Json(updated) = update_schedule(
            State(state),
            Path(created.id.as_str().to_string()),
            Json(patch),
        )
        .await
        .unwrap();
        assert!(updated.max_runs.is_none());
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let server = MockServer::start().await;
        let state = test_state(&server.uri()).await;

        let (_, Json(created)) =
            create_schedule(State(state.clone()), Json(create_body("gone", "weekly")))
                .await
                .unwrap();

        let status = delete_schedule(
            State(state.clone()),
            Path(created.id.as_str().to_string()),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = get_schedule(State(state), Path(created.id.as_str().to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
