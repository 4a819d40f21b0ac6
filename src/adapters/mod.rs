//! Port implementations.
//!
//! - `live`: the hosted backend over HTTP and the system clock
//! - `memory`: a process-local backend for offline use and tests
//! - `recording`: wrappers capturing every call into cassettes
//! - `replaying`: cassette-backed stand-ins for deterministic runs

pub mod live;
pub mod memory;
pub mod recording;
pub mod replaying;
