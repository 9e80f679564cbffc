//! Upload Signer
//!
//! Signs parameter sets with the shared API secret.

use std::fmt;
use std::str::FromStr;

use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::error::{RegistryError, Result};
use crate::signature::UploadParams;

// == Upload Signer ==
/// Produces a signature string for a parameter set. Must be pure.
pub trait UploadSigner: Send + Sync {
    fn sign(&self, params: &UploadParams) -> Result<String>;
}

// == Signature Algorithm ==
/// Digest used for upload signatures.
///
/// The media service verifies SHA-1 unless the account opts into SHA-256.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl SignatureAlgorithm {
    fn digest_hex(self, input: &[u8]) -> String {
        match self {
            SignatureAlgorithm::Sha1 => hex::encode(Sha1::digest(input)),
            SignatureAlgorithm::Sha256 => hex::encode(Sha256::digest(input)),
        }
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "").as_str() {
            "sha1" => Ok(SignatureAlgorithm::Sha1),
            "sha256" => Ok(SignatureAlgorithm::Sha256),
            other => Err(RegistryError::InvalidRequest(format!(
                "unknown signature algorithm '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureAlgorithm::Sha1 => write!(f, "sha1"),
            SignatureAlgorithm::Sha256 => write!(f, "sha256"),
        }
    }
}

// == Api Secret Signer ==
/// `hex(digest(to_sign + secret))`, the media service's request signing scheme.
#[derive(Clone, Default)]
pub struct ApiSecretSigner {
    secret: Option<String>,
    algorithm: SignatureAlgorithm,
}

impl ApiSecretSigner {
    /// Signer using the default SHA-1 digest.
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
            algorithm: SignatureAlgorithm::default(),
        }
    }

    pub fn with_algorithm(mut self, algorithm: SignatureAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}

impl fmt::Debug for ApiSecretSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSecretSigner")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl UploadSigner for ApiSecretSigner {
    fn sign(&self, params: &UploadParams) -> Result<String> {
        let secret = self.secret.as_deref().ok_or(RegistryError::MissingSecret)?;

        let payload = format!("{}{}", params.to_sign(), secret);
        Ok(self.algorithm.digest_hex(payload.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> UploadParams {
        UploadParams::new()
            .with("folder", "demo")
            .with("timestamp", 1_700_000_000)
    }

    #[test]
    fn test_sign_matches_manual_digest() {
        let signer = ApiSecretSigner::new(Some("s3cret".to_string()));

        let expected = hex::encode(Sha1::digest(b"folder=demo&timestamp=1700000000s3cret"));
        let signature = signer.sign(&params()).unwrap();
        assert_eq!(signature, expected);
        assert_eq!(signature.len(), 40);
    }

    #[test]
    fn test_sign_with_sha256() {
        let signer = ApiSecretSigner::new(Some("s3cret".to_string()))
            .with_algorithm(SignatureAlgorithm::Sha256);

        let expected = hex::encode(Sha256::digest(b"folder=demo&timestamp=1700000000s3cret"));
        let signature = signer.sign(&params()).unwrap();
        assert_eq!(signature, expected);
        assert_eq!(signature.len(), 64);
    }

    #[test]
    fn test_algorithm_from_str() {
        assert_eq!("sha1".parse::<SignatureAlgorithm>().unwrap(), SignatureAlgorithm::Sha1);
        assert_eq!("SHA-256".parse::<SignatureAlgorithm>().unwrap(), SignatureAlgorithm::Sha256);
        assert!("md5".parse::<SignatureAlgorithm>().is_err());
    }

    #[test]
    fn test_sign_is_deterministic() {
        let signer = ApiSecretSigner::new(Some("s3cret".to_string()));
        assert_eq!(signer.sign(&params()).unwrap(), signer.sign(&params()).unwrap());
    }

    #[test]
    fn test_sign_depends_on_secret() {
        let a = ApiSecretSigner::new(Some("one".to_string()));
        let b = ApiSecretSigner::new(Some("two".to_string()));
        assert_ne!(a.sign(&params()).unwrap(), b.sign(&params()).unwrap());
    }

    #[test]
    fn test_missing_secret() {
        for signer in [ApiSecretSigner::new(None), ApiSecretSigner::new(Some(String::new()))] {
            assert!(matches!(signer.sign(&params()), Err(RegistryError::MissingSecret)));
        }
    }

    #[test]
    fn test_debug_redacts_secret() {
        let signer = ApiSecretSigner::new(Some("s3cret".to_string()));
        assert!(!format!("{:?}", signer).contains("s3cret"));
    }
}
