//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the application core and an
//! external system (hosted tables, object storage, auth, time).
//! Implementations live in `src/adapters/`.

pub mod auth;
pub mod clock;
pub mod storage;
pub mod tables;

pub use auth::{AuthSession, SessionUser};
pub use clock::Clock;
pub use storage::{FileObject, ObjectStorage};
pub use tables::{Embed, Filter, Order, RemoteFuture, RemoteTables, Selection, TableQuery};
