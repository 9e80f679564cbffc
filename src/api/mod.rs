//! API Module
//!
//! HTTP handlers and routing for the upload registry REST API.
//!
//! # Endpoints
//! - `GET /api/upload-signature` - Signed-upload authorization
//! - `GET|POST /api/uploads` - List or record uploads
//! - `GET /api/renditions` - Delivery URLs for one asset
//! - `GET /api/stats` - Signature cache statistics
//! - `GET /api/health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
