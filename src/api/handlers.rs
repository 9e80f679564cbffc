//! API Handlers
//!
//! HTTP request handlers for each upload registry endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{RegistryError, Result};
use crate::media::{MediaUrls, Renditions};
use crate::models::{
    HealthResponse, ListUploadsQuery, ListUploadsResponse, RecordUploadRequest,
    RecordUploadResponse, RenditionsQuery, StatsResponse, UploadSignatureResponse,
};
use crate::registry::UploadRegistry;
use crate::signature::{ApiSecretSigner, SignatureCache, UploadParams};
use crate::store::SharedStore;

/// Store key written by the health check round-trip.
const HEALTH_KEY: &str = "health:last";
const HEALTH_TTL: Duration = Duration::from_secs(60);

/// Output size used for renditions when the query gives none.
const DEFAULT_RENDITION_WIDTH: u32 = 1200;
const DEFAULT_RENDITION_HEIGHT: u32 = 630;

/// Application state shared across all handlers.
///
/// Every component holds the same store handle, opened once at startup.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub signatures: Arc<SignatureCache>,
    pub registry: UploadRegistry,
    pub media: Arc<MediaUrls>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires every component onto `store` using settings from `config`.
    pub fn new(store: SharedStore, config: Config) -> Self {
        let signer = Arc::new(
            ApiSecretSigner::new(config.api_secret.clone())
                .with_algorithm(config.signature_algorithm),
        );
        let signatures = SignatureCache::new(
            store.clone(),
            signer,
            Duration::from_secs(config.signature_ttl),
        );
        let registry = UploadRegistry::new(store.clone(), config.max_stored);
        let media = MediaUrls::new(config.cloud_name.clone(), config.folder.clone());

        Self {
            store,
            signatures: Arc::new(signatures),
            registry,
            media: Arc::new(media),
            config: Arc::new(config),
        }
    }

    /// Parameters every signed upload is restricted to.
    pub fn upload_params(&self) -> UploadParams {
        UploadParams::new()
            .with("folder", self.config.folder.as_str())
            .with("use_filename", true)
            .with("unique_filename", false)
            .with("overwrite", false)
    }
}

/// Handler for GET /api/upload-signature
///
/// Returns a cached or fresh signature for the fixed upload parameters.
pub async fn upload_signature_handler(
    State(state): State<AppState>,
) -> Result<Json<UploadSignatureResponse>> {
    let params = state.upload_params();
    info!("Upload signature requested for folder '{}'", state.config.folder);

    let signed = state
        .signatures
        .get_upload_signature(&params)
        .await
        .map_err(|e| {
            error!("Could not generate upload signature: {}", e);
            e
        })?;

    Ok(Json(UploadSignatureResponse::new(
        signed,
        params,
        state.config.api_key.clone(),
        state.config.cloud_name.clone(),
    )))
}

/// Handler for POST /api/uploads
///
/// Records a successfully uploaded asset at the head of the registry.
pub async fn record_upload_handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<RecordUploadRequest>, JsonRejection>,
) -> Result<Json<RecordUploadResponse>> {
    let Json(req) = body.map_err(|rejection| {
        warn!("Rejected upload record body: {}", rejection.body_text());
        RegistryError::InvalidRequest(rejection.body_text())
    })?;
    let public_id = req.validate().map_err(|e| {
        warn!("Rejected upload record: {:?}", req.public_id);
        e
    })?;

    state.registry.record_upload(public_id).await?;

    Ok(Json(RecordUploadResponse::ok()))
}

/// Handler for GET /api/uploads
///
/// Returns one page of recent uploads, newest first.
pub async fn list_uploads_handler(
    State(state): State<AppState>,
    Query(query): Query<ListUploadsQuery>,
) -> Result<Json<ListUploadsResponse>> {
    let page = query.page();
    let uploads = state.registry.list_uploads(page).await?;

    Ok(Json(ListUploadsResponse::new(uploads, page)))
}

/// Handler for GET /api/renditions
///
/// Returns the delivery URLs for one uploaded asset.
pub async fn renditions_handler(
    State(state): State<AppState>,
    Query(query): Query<RenditionsQuery>,
) -> Result<Json<Renditions>> {
    let renditions = state.media.renditions(
        &query.public_id,
        query.width.unwrap_or(DEFAULT_RENDITION_WIDTH),
        query.height.unwrap_or(DEFAULT_RENDITION_HEIGHT),
    )?;

    Ok(Json(renditions))
}

/// Handler for GET /api/stats
///
/// Returns signature cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.signatures.stats().into())
}

/// Handler for GET /api/health
///
/// Writes and reads back a short-lived key, and builds a sample delivery URL.
pub async fn health_handler(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    let now = chrono::Utc::now().timestamp_millis().to_string();
    state.store.set_ex(HEALTH_KEY, &now, HEALTH_TTL).await?;
    let echo = state.store.get(HEALTH_KEY).await?;

    let sample_url = state
        .media
        .cached_optimised_url(&state.signatures, "pixel")
        .await?;

    Ok(Json(HealthResponse::healthy(
        state.store.backend(),
        echo,
        sample_url,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn test_state() -> AppState {
        let config = Config {
            api_secret: Some("s3cret".to_string()),
            api_key: Some("key".to_string()),
            folder: "demo".to_string(),
            ..Config::default()
        };
        AppState::new(Arc::new(MemoryStore::new()), config)
    }

    #[tokio::test]
    async fn test_record_and_list_handlers() {
        let state = test_state();

        for id in ["demo/a", "demo/b"] {
            let result =
                record_upload_handler(State(state.clone()), Ok(Json(RecordUploadRequest::new(id)))).await;
            assert!(result.is_ok());
        }

        let response = list_uploads_handler(State(state), Query(ListUploadsQuery::default()))
            .await
            .unwrap();
        assert_eq!(response.uploads, vec!["demo/b", "demo/a"]);
    }

    #[tokio::test]
    async fn test_record_invalid_request() {
        let state = test_state();

        let result =
            record_upload_handler(State(state), Ok(Json(RecordUploadRequest::default()))).await;
        assert!(matches!(result, Err(RegistryError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_upload_signature_handler_is_cached() {
        let state = test_state();

        let first = upload_signature_handler(State(state.clone())).await.unwrap();
        let second = upload_signature_handler(State(state.clone())).await.unwrap();

        assert_eq!(first.signature, second.signature);
        assert_eq!(first.timestamp, second.timestamp);
        assert_eq!(first.api_key.as_deref(), Some("key"));

        let stats = stats_handler(State(state)).await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_upload_signature_without_secret() {
        let state = AppState::new(Arc::new(MemoryStore::new()), Config::default());

        let result = upload_signature_handler(State(state)).await;
        assert!(matches!(result, Err(RegistryError::MissingSecret)));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler(State(test_state())).await.unwrap();
        assert_eq!(response.status, "healthy");
        assert_eq!(response.store, "memory");
        assert!(response.store_echo.is_some());
        assert!(response.sample_url.ends_with("demo/pixel"));
    }
}
