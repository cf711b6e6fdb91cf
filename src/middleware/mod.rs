//! Middleware module
//!
//! Request-level middleware applied around the handler stack

pub mod logging;
