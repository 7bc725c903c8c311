//! Object storage for report photos
//!
//! MinIO/S3-compatible client plus the [`ImageStore`] abstraction the report
//! services are written against.

mod image_store;
mod minio_client;
mod sigv4;

pub use image_store::ImageStore;
pub use minio_client::MinIOClient;
