//! Gemini `generateContent` client used for breed suggestion

mod gemini_client;

pub use gemini_client::{GeminiClient, GenerativeModel, Part};
