//! Replaying adapter for the `RemoteTables` port.

use serde_json::Value;

use super::{next_output, replay_result};
use crate::cassette::config::SharedReplayer;
use crate::ports::tables::{Filter, RemoteFuture, RemoteTables, Selection, TableQuery};

/// Serves recorded table calls in order, per method.
///
/// Inputs are not compared with the recording; the n-th `select` gets the
/// n-th recorded `select` outcome.
pub struct ReplayingTables {
    replayer: Option<SharedReplayer>,
}

impl ReplayingTables {
    /// A tables port reading from `replayer`.
    #[must_use]
    pub fn new(replayer: SharedReplayer) -> Self {
        Self { replayer: Some(replayer) }
    }

    /// A tables port with no cassette. Panics when called.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self { replayer: None }
    }

    fn serve<T: serde::de::DeserializeOwned + Send + 'static>(&self, method: &str) -> RemoteFuture<'_, T> {
        let output = next_output(self.replayer.as_ref(), "tables", method);
        Box::pin(async move { replay_result(output) })
    }
}

impl RemoteTables for ReplayingTables {
    fn select(&self, _query: &TableQuery) -> RemoteFuture<'_, Vec<Value>> {
        self.serve("select")
    }

    fn insert(&self, _table: &str, _rows: Vec<Value>, _returning: &Selection) -> RemoteFuture<'_, Vec<Value>> {
        self.serve("insert")
    }

    fn update(
        &self,
        _table: &str,
        _filters: &[Filter],
        _patch: Value,
        _returning: &Selection,
    ) -> RemoteFuture<'_, Vec<Value>> {
        self.serve("update")
    }

    fn delete(&self, _table: &str, _filters: &[Filter], _returning: &Selection) -> RemoteFuture<'_, Vec<Value>> {
        self.serve("delete")
    }

    fn rpc(&self, _function: &str, _args: Value) -> RemoteFuture<'_, Value> {
        self.serve("rpc")
    }
}
