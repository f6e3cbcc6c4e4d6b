//! Error types surfaced to the HTTP layer.

pub mod app_error;
