//! Cassette format for recording and replaying port interactions.
//!
//! Recording wraps live adapters and writes one YAML cassette per port;
//! replaying serves those interactions back so commands and tests run
//! without a reachable backend.

pub mod config;
pub mod format;
pub mod recorder;
pub mod replayer;
pub mod session;
