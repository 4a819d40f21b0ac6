//! Application state store.
//!
//! `AppStore` caches what the query layer returned, one slice per entity.
//! It is an ordinary value owned by the caller and passed to commands; every
//! action takes the [`ServiceContext`](crate::context::ServiceContext) it
//! should talk to.
//!
//! All actions follow the same contract:
//!
//! - the slice's loading flag is raised for the duration of the remote call
//!   and lowered afterwards whatever the outcome
//! - failures are logged and returned, leaving the cache as it was
//! - there is no eviction and no staleness tracking

pub mod assignments;
pub mod contracts;
pub mod documents;
pub mod payments;
pub mod tasks;

use std::future::Future;

pub use assignments::AssignmentsSlice;
pub use contracts::ContractsSlice;
pub use documents::DocumentsSlice;
pub use payments::PaymentsSlice;
pub use tasks::{TaskChange, TasksSlice};

use crate::error::AppError;

/// Every slice of cached state.
#[derive(Debug, Default)]
pub struct AppStore {
    /// Projects, the selected task and measurement units.
    pub tasks: TasksSlice,
    /// Documents per task.
    pub documents: DocumentsSlice,
    /// Assignment intervals per task.
    pub assignments: AssignmentsSlice,
    /// Contracts.
    pub contracts: ContractsSlice,
    /// Payments and wallets.
    pub payments: PaymentsSlice,
}

impl AppStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True while any slice waits on the backend.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.tasks.loading
            || self.tasks.units_loading
            || self.documents.loading
            || self.assignments.loading
            || self.contracts.loading
            || self.payments.loading
    }
}

/// Runs `call` with `flag` raised, lowering it afterwards and logging failures.
pub(crate) async fn tracked<T>(
    flag: &mut bool,
    action: &'static str,
    call: impl Future<Output = Result<T, AppError>>,
) -> Result<T, AppError> {
    *flag = true;
    let result = call.await;
    *flag = false;
    if let Err(e) = &result {
        tracing::warn!(%e, action, "store action failed");
    }
    result
}

/// Replaces the element with the same key, or appends it.
pub(crate) fn upsert_by<T, K: PartialEq>(items: &mut Vec<T>, item: T, key: impl Fn(&T) -> K) {
    let k = key(&item);
    match items.iter_mut().find(|existing| key(existing) == k) {
        Some(existing) => *existing = item,
        None => items.push(item),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tracked_lowers_flag_on_error() {
        let mut flag = false;
        let result: Result<(), AppError> =
            tracked(&mut flag, "test", async { Err(AppError::Invalid("nope".into())) }).await;
        assert!(result.is_err());
        assert!(!flag);
    }

    #[test]
    fn upsert_replaces_or_appends() {
        let mut items = vec![(1, "a"), (2, "b")];
        upsert_by(&mut items, (2, "B"), |i| i.0);
        upsert_by(&mut items, (3, "c"), |i| i.0);
        assert_eq!(items, vec![(1, "a"), (2, "B"), (3, "c")]);
    }

    #[test]
    fn new_store_is_idle() {
        assert!(!AppStore::new().is_loading());
    }
}
