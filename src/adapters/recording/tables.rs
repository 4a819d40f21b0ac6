//! Recording adapter for the `RemoteTables` port.

use std::sync::Arc;

use serde_json::{json, Value};

use super::record_result;
use crate::cassette::session::SharedRecorder;
use crate::ports::tables::{Filter, RemoteFuture, RemoteTables, Selection, TableQuery};

/// Records table calls while delegating to an inner implementation.
pub struct RecordingTables {
    inner: Box<dyn RemoteTables>,
    recorder: SharedRecorder,
}

impl RecordingTables {
    /// Wraps `inner`.
    pub fn new(inner: Box<dyn RemoteTables>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

impl RemoteTables for RecordingTables {
    fn select(&self, query: &TableQuery) -> RemoteFuture<'_, Vec<Value>> {
        let query = query.clone();
        let recorder = Arc::clone(&self.recorder);
        Box::pin(async move {
            let result = self.inner.select(&query).await;
            record_result(&recorder, "tables", "select", &query, &result);
            result
        })
    }

    fn insert(&self, table: &str, rows: Vec<Value>, returning: &Selection) -> RemoteFuture<'_, Vec<Value>> {
        let input = json!({ "table": table, "rows": rows, "returning": returning });
        let table = table.to_string();
        let returning = returning.clone();
        let recorder = Arc::clone(&self.recorder);
        Box::pin(async move {
            let result = self.inner.insert(&table, rows, &returning).await;
            record_result(&recorder, "tables", "insert", &input, &result);
            result
        })
    }

    fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Value,
        returning: &Selection,
    ) -> RemoteFuture<'_, Vec<Value>> {
        let input = json!({ "table": table, "filters": filters, "patch": patch, "returning": returning });
        let table = table.to_string();
        let filters = filters.to_vec();
        let returning = returning.clone();
        let recorder = Arc::clone(&self.recorder);
        Box::pin(async move {
            let result = self.inner.update(&table, &filters, patch, &returning).await;
            record_result(&recorder, "tables", "update", &input, &result);
            result
        })
    }

    fn delete(&self, table: &str, filters: &[Filter], returning: &Selection) -> RemoteFuture<'_, Vec<Value>> {
        let input = json!({ "table": table, "filters": filters, "returning": returning });
        let table = table.to_string();
        let filters = filters.to_vec();
        let returning = returning.clone();
        let recorder = Arc::clone(&self.recorder);
        Box::pin(async move {
            let result = self.inner.delete(&table, &filters, &returning).await;
            record_result(&recorder, "tables", "delete", &input, &result);
            result
        })
    }

    fn rpc(&self, function: &str, args: Value) -> RemoteFuture<'_, Value> {
        let input = json!({ "function": function, "args": args });
        let function = function.to_string();
        let recorder = Arc::clone(&self.recorder);
        Box::pin(async move {
            let result = self.inner.rpc(&function, args).await;
            record_result(&recorder, "tables", "rpc", &input, &result);
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryTables;
    use crate::cassette::recorder::CassetteRecorder;
    use std::sync::Mutex;

    #[tokio::test]
    async fn records_ok_and_err_outcomes() {
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new("/dev/null", "t", "memory")));
        let memory = MemoryTables::new();
        memory.seed("tasks", vec![json!({"id": "t1"})]);
        let tables = RecordingTables::new(Box::new(memory), Arc::clone(&recorder));

        let rows = tables.select(&TableQuery::from("tasks")).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(tables.rpc("unknown_fn", json!({})).await.is_err());

        assert_eq!(recorder.lock().unwrap().len(), 2);
    }
}
