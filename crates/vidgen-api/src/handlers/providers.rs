//! Provider and model discovery.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use vidgen_models::{ModelDescriptor, Provider};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderListing {
    pub provider: Provider,
    pub models: Vec<ModelDescriptor>,
}

#[derive(Debug, Serialize)]
pub struct ProvidersResponse {
    pub providers: Vec<ProviderListing>,
}

/// `GET /api/providers`
///
/// Providers with at least one usable credential, each with the models
/// that credential may use. Resolution order decides which credential
/// speaks for a provider with several.
pub async fn list_providers(State(state): State<AppState>) -> ApiResult<Json<ProvidersResponse>> {
    let credentials = state.credentials.list().await?;

    let mut providers: Vec<ProviderListing> = Vec::new();
    for credential in state.registry.resolve_all(&credentials) {
        if providers.iter().any(|p| p.provider == credential.provider) {
            continue;
        }
        providers.push(ProviderListing {
            provider: credential.provider,
            models: state.registry.models_for(credential),
        });
    }

    Ok(Json(ProvidersResponse { providers }))
}
