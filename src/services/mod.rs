//! Service layer module
//!
//! Contains the task orchestrator, circuit breaker, carbon enrichment,
//! and the collaborator contracts

pub mod breaker;
pub mod carbon;
pub mod orchestrator;
pub mod store;

pub use breaker::{CircuitBreaker, Clock, SystemClock};
pub use orchestrator::{AnalysisService, ChatContext, VoiceChatInput};
pub use store::{DisabledSpeech, MemoryScanStore, ScanStore, SpeechSynthesizer};
