//! # Breathwell Core Library
//!
//! This library provides the core logic for Breathwell guided breathing
//! sessions. The CLI binary and any GUI are thin layers over it.
//!
//! ## Architecture
//!
//! - **Session Engine**: A heartbeat-driven state machine. The caller invokes
//!   `tick()` once per second (or `advance()` with a measured delta); a
//!   single heartbeat drives both the session countdown and the breath phase
//!   sequencer
//! - **Session Log**: Append-only per-user history in a key-value store
//! - **Storage**: SQLite key-value store and TOML-based configuration
//! - **Runner**: Optional tokio task that drives a session in real time
//!
//! ## Key Components
//!
//! - [`BreathingSession`]: Session controller
//! - [`SessionRunner`]: Real-time heartbeat driver
//! - [`SessionLogRecorder`]: Session log persistence
//! - [`Database`]: SQLite key-value store
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod exercise;
pub mod session;
pub mod stats;
pub mod storage;

pub use error::{ConfigError, CoreError, SessionError, StorageError};
pub use events::Event;
pub use exercise::Exercise;
pub use session::{
    BreathingPattern, BreathingSession, CompletionReason, ExerciseRef, ExerciseType, Phase,
    SessionConfig, SessionContext, SessionLogItem, SessionLogRecorder, SessionRunner,
    SessionState, SessionStatus,
};
pub use stats::LogSummary;
pub use storage::{Config, Database, KvStore, MemoryStore};
