//! Infrastructure adapters. Implement outbound ports.
//!
//! Gemini REST, report storage, exports, terminal UI. Map errors to DomainError.

pub mod ai;
pub mod export;
pub mod persistence;
pub mod ui;
