//! AI adapter module. Implements ClassifierGateway over the Gemini REST API.

pub mod gemini_adapter;

pub use gemini_adapter::GeminiAdapter;
