//! Signature Cache
//!
//! Compute-once, cache-for-a-window wrapper over the shared store, and the
//! signed-upload authorization built on top of it.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{RegistryError, Result};
use crate::signature::{CacheStats, ParamValue, StatsRecorder, UploadParams, UploadSigner};
use crate::store::SharedStore;

// == Upload Signature ==
/// A signature plus the Unix timestamp that was signed with it.
///
/// Clients must send back both, together with the exact parameter set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSignature {
    pub signature: String,
    pub timestamp: i64,
}

type Gate = Arc<tokio::sync::Mutex<()>>;

/// Where a cached value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lookup {
    Hit,
    Computed,
}

// == Signature Cache ==
pub struct SignatureCache {
    store: SharedStore,
    signer: Arc<dyn UploadSigner>,
    ttl: Duration,
    /// One gate per key with a computation in flight
    in_flight: Mutex<HashMap<String, Gate>>,
    stats: StatsRecorder,
}

impl SignatureCache {
    // == Constructor ==
    pub fn new(store: SharedStore, signer: Arc<dyn UploadSigner>, ttl: Duration) -> Self {
        Self {
            store,
            signer,
            ttl,
            in_flight: Mutex::new(HashMap::new()),
            stats: StatsRecorder::new(),
        }
    }

    /// Upload signature counters. Plain `cache_string` calls are not counted.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    // == Cache String ==
    /// Returns the value cached under `key`, or runs `compute` once and caches its result.
    ///
    /// Concurrent misses on the same key wait for the first caller and then
    /// read its value, so `compute` runs at most once per window in this
    /// process. An empty cached value counts as a miss. Errors from `compute`
    /// or the store propagate and nothing is cached.
    pub async fn cache_string<F, Fut>(&self, key: &str, compute: F) -> Result<String>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<String>> + Send,
    {
        self.lookup(key, compute).await.map(|(value, _)| value)
    }

    async fn lookup<F, Fut>(&self, key: &str, compute: F) -> Result<(String, Lookup)>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<String>> + Send,
    {
        if let Some(cached) = self.cached(key).await? {
            debug!("Cache hit for {}", key);
            return Ok((cached, Lookup::Hit));
        }

        let gate = self.gate_for(key);
        let result = {
            let _guard = gate.lock().await;
            self.fill(key, compute).await
        };
        self.release_gate(key, gate);
        result
    }

    async fn cached(&self, key: &str) -> Result<Option<String>> {
        Ok(self.store.get(key).await?.filter(|value| !value.is_empty()))
    }

    async fn fill<F, Fut>(&self, key: &str, compute: F) -> Result<(String, Lookup)>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<String>> + Send,
    {
        // Another caller may have filled the key while we waited on the gate
        if let Some(cached) = self.cached(key).await? {
            return Ok((cached, Lookup::Hit));
        }

        let value = compute().await.map_err(|e| {
            warn!("Computation for {} failed: {}", key, e);
            e
        })?;

        self.store.set_ex(key, &value, self.ttl).await?;
        debug!("Cached {} for {:?}", key, self.ttl);
        Ok((value, Lookup::Computed))
    }

    fn gate_for(&self, key: &str) -> Gate {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        in_flight.entry(key.to_string()).or_default().clone()
    }

    fn release_gate(&self, key: &str, gate: Gate) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        // Only the map and our handle left: nobody else is waiting
        if Arc::strong_count(&gate) <= 2 {
            in_flight.remove(key);
        }
    }

    #[cfg(test)]
    fn gates_in_flight(&self) -> usize {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    // == Upload Signature ==
    /// Returns a cached or freshly signed authorization for `params`.
    ///
    /// On a miss the current Unix time is added as `timestamp` before signing.
    pub async fn get_upload_signature(&self, params: &UploadParams) -> Result<UploadSignature> {
        let key = params.cache_key();

        let lookup = self
            .lookup(&key, || async {
                let timestamp = chrono::Utc::now().timestamp();
                let signed = params.clone().with("timestamp", ParamValue::Int(timestamp));
                let signature = self.signer.sign(&signed)?;
                info!("Signed upload params {} at {}", params.canonical(), timestamp);
                let payload = serde_json::to_string(&UploadSignature {
                    signature,
                    timestamp,
                })?;
                Ok::<_, RegistryError>(payload)
            })
            .await;

        let raw = match lookup {
            Ok((raw, Lookup::Hit)) => {
                self.stats.record_hit();
                raw
            }
            Ok((raw, Lookup::Computed)) => {
                self.stats.record_miss();
                raw
            }
            Err(e) => {
                self.stats.record_failure();
                return Err(e);
            }
        };

        serde_json::from_str(&raw).map_err(|e| {
            RegistryError::Internal(format!("Corrupt cached signature under {}: {}", key, e))
        })
    }
}
