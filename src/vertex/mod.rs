//! Vertex AI Gemini integration
//!
//! Typed wire format for the `generateContent` API, the HTTP client that
//! talks to the endpoint, and the single-step fallback policy on top of it.

pub mod client;
pub mod fallback;
pub mod types;

pub use client::{ByteStream, GeminiClient};
pub use fallback::{ChatService, InferenceResult, ServedBy};
pub use types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationOptions, InlineData,
    ModelTarget, Part,
};
