//! Request and Response models for the upload registry API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{ListUploadsQuery, RecordUploadRequest, RenditionsQuery};
pub use responses::{
    HealthResponse, ListUploadsResponse, RecordUploadResponse, StatsResponse,
    UploadSignatureResponse,
};
