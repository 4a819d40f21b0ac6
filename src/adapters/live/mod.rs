//! Live adapters talking to the hosted backend and the system clock.

pub mod auth;
pub mod clock;
pub mod http;
pub mod storage;
pub mod tables;

pub use auth::LiveAuth;
pub use clock::LiveClock;
pub use http::RestClient;
pub use storage::LiveStorage;
pub use tables::LiveTables;
