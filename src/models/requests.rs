//! Request DTOs for the upload registry API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{RegistryError, Result};
use crate::registry::PageRequest;

/// Request body for POST /api/uploads
///
/// `publicId` is kept as raw JSON so that null, numbers, and other
/// non-strings get the same validation error as an empty string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordUploadRequest {
    #[serde(rename = "publicId", default)]
    pub public_id: Option<Value>,
}

impl RecordUploadRequest {
    pub fn new(public_id: impl Into<String>) -> Self {
        Self {
            public_id: Some(Value::String(public_id.into())),
        }
    }

    /// Returns the identifier if it is a non-empty string.
    pub fn validate(&self) -> Result<&str> {
        match &self.public_id {
            Some(Value::String(id)) if !id.trim().is_empty() => Ok(id.as_str()),
            _ => Err(RegistryError::InvalidRequest(
                "Missing or invalid publicId".to_string(),
            )),
        }
    }
}

/// Query string for GET /api/uploads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListUploadsQuery {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl ListUploadsQuery {
    pub fn page(&self) -> PageRequest {
        PageRequest::new(self.offset, self.limit)
    }
}

/// Query string for GET /api/renditions
#[derive(Debug, Clone, Deserialize)]
pub struct RenditionsQuery {
    #[serde(rename = "publicId")]
    pub public_id: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}
