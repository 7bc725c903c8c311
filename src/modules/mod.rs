//! Modules layer - clients for external services (object storage, Gemini)

pub mod gemini;
pub mod storage;
