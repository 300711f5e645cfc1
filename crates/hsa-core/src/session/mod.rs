//! Session management module
//!
//! Per-client conversation transcripts held in memory.

mod registry;
mod types;

pub use registry::{SessionHandle, SessionRegistry};
pub use types::Session;
