//! Utilities module
//!
//! Contains error handling, payload normalization, and model output extraction

pub mod error;
pub mod extract;
pub mod logging;
pub mod payload;
