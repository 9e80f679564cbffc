//! Signature Module
//!
//! Signed-upload authorizations, cached per canonical parameter set.

mod cache;
mod params;
mod signer;
mod stats;


pub use cache::{SignatureCache, UploadSignature};
pub use params::{ParamValue, UploadParams, SIGNATURE_KEY_PREFIX};
pub use signer::{ApiSecretSigner, SignatureAlgorithm, UploadSigner};
pub use stats::{CacheStats, StatsRecorder};
