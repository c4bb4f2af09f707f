//! API routes.

use axum::http::HeaderValue;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::generations::{get_generation, stream_generation_events, submit_generation};
use crate::handlers::health;
use crate::handlers::media::serve_media;
use crate::handlers::providers::list_providers;
use crate::handlers::schedules::{
    create_schedule, delete_schedule, get_schedule, list_schedules, update_schedule,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let generation_routes = Router::new()
        .route("/generations", axum::routing::post(submit_generation))
        .route("/generations/:job_id", get(get_generation))
        .route(
            "/generations/:job_id/events",
            get(stream_generation_events),
        );

    let provider_routes = Router::new().route("/providers", get(list_providers));

    let schedule_routes = Router::new()
        .route(
            "/schedules",
            get(list_schedules).post(create_schedule),
        )
        .route(
            "/schedules/:schedule_id",
            get(get_schedule)
                .patch(update_schedule)
                .delete(delete_schedule),
        );

    let api_routes = Router::new()
        .merge(generation_routes)
        .merge(provider_routes)
        .merge(schedule_routes);

    let media_routes = Router::new().route("/media/*key", get(serve_media));

    let health_routes = Router::new().route("/health", get(health));

    Router::new()
        .nest("/api", api_routes)
        .merge(media_routes)
        .merge(health_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|o| o == "*") {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        layer.allow_origin(origins)
    }
}
