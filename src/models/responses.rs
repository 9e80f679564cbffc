//! Response DTOs for the upload registry API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::registry::PageRequest;
use crate::signature::{CacheStats, UploadParams, UploadSignature};

/// Response body for GET /api/upload-signature
///
/// The signed parameters are flattened alongside the signature so the
/// client can echo them back to the media service unchanged.
#[derive(Debug, Clone, Serialize)]
pub struct UploadSignatureResponse {
    pub signature: String,
    pub timestamp: i64,
    #[serde(flatten)]
    pub params: UploadParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub cloud_name: String,
}

impl UploadSignatureResponse {
    pub fn new(
        signed: UploadSignature,
        params: UploadParams,
        api_key: Option<String>,
        cloud_name: impl Into<String>,
    ) -> Self {
        Self {
            signature: signed.signature,
            timestamp: signed.timestamp,
            params,
            api_key,
            cloud_name: cloud_name.into(),
        }
    }
}

/// Response body for POST /api/uploads
#[derive(Debug, Clone, Serialize)]
pub struct RecordUploadResponse {
    pub ok: bool,
}

impl RecordUploadResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// Response body for GET /api/uploads
#[derive(Debug, Clone, Serialize)]
pub struct ListUploadsResponse {
    pub uploads: Vec<String>,
    pub offset: usize,
    pub limit: usize,
}

impl ListUploadsResponse {
    pub fn new(uploads: Vec<String>, page: PageRequest) -> Self {
        Self {
            uploads,
            offset: page.offset,
            limit: page.limit,
        }
    }
}

/// Response body for GET /api/stats
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Signature lookups answered from the store
    pub hits: u64,
    /// Signature lookups that had to compute
    pub misses: u64,
    /// Computations that failed
    pub failures: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            failures: stats.failures,
        }
    }
}

/// Response body for GET /api/health
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// Store backend name
    pub store: String,
    /// Value read back from the store round-trip
    pub store_echo: Option<String>,
    /// Sample delivery URL
    pub sample_url: String,
}

impl HealthResponse {
    pub fn healthy(store: &str, store_echo: Option<String>, sample_url: String) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            store: store.to_string(),
            store_echo,
            sample_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_response_flattens_params() {
        let params = UploadParams::new()
            .with("folder", "demo")
            .with("overwrite", false);
        let signed = UploadSignature {
            signature: "abc".to_string(),
            timestamp: 1_700_000_000,
        };
        let resp = UploadSignatureResponse::new(signed, params, None, "cloud");

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["signature"], "abc");
        assert_eq!(json["timestamp"], 1_700_000_000);
        assert_eq!(json["folder"], "demo");
        assert_eq!(json["overwrite"], false);
        assert_eq!(json["cloud_name"], "cloud");
        assert!(json.get("api_key").is_none());
    }

    #[test]
    fn test_list_uploads_serialize() {
        let resp = ListUploadsResponse::new(vec!["a".into()], PageRequest::default());
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains(r#""uploads":["a"]"#));
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let resp = StatsResponse::from(CacheStats {
            hits: 80,
            misses: 20,
            failures: 1,
        });
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy("memory", Some("1".into()), "u".into());
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
