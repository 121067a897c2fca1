//! news-sentinel: fake-news screening client with API key rotation and an offline fallback.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
