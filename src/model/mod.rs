//! Typed application models.
//!
//! Read models deserialize from camelized rows (see [`crate::camelize`]).
//! Write payloads serialize with the backend's snake_case column names.

pub mod assignment;
pub mod contract;
pub mod payment;
pub mod task;
pub mod user;

pub use assignment::{
    retain_surviving, AssignmentInterval, AssignmentRow, AssignmentStatus, IntervalIds, NewAssignmentRow,
};
pub use contract::{Contract, ContractPatch, ContractPayload, ContractStatus, ContractTaskSummary};
pub use payment::{PartyEmail, Payment, PaymentObjectType, PaymentPayload, PaymentStatus, Wallet};
pub use task::{MeasurementUnit, MilestoneItem, MilestonePatch, Task, TaskDraft, TaskPatch, TaskStatus, TaskType};
pub use user::{UserProfile, UserRole};

pub use crate::ports::storage::FileObject;
