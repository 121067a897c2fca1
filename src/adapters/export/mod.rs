//! Export adapters. Serialize stored reports for use outside the app.

pub mod csv_utils;

pub use csv_utils::reports_to_csv;
