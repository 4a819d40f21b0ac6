//! In-memory implementation of the `RemoteTables` port.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde_json::{Map, Value};

use crate::api::assignments::{TASK_ASSIGNMENT, TASK_ASSIGNMENT_INTERVALS};
use crate::api::payments::PROFILES;
use crate::api::tasks::TASKS;
use crate::api::users::SEARCH_USERS_RPC;
use crate::camelize::camelize;
use crate::error::{RemoteError, RemoteResult};
use crate::intervals::{pair_intervals, PairedInterval};
use crate::model::AssignmentRow;
use crate::ports::tables::{Filter, RemoteFuture, RemoteTables, Selection, TableQuery};

type Tables = HashMap<String, Vec<Value>>;

/// Tables held in process memory.
///
/// Clones share the same rows, so a test can keep a handle for inspection
/// while the service context owns another. Inserted rows get a uuid `id` and
/// a `created_at` timestamp when they lack them. The
/// `task_assignment_intervals` view is computed from `task_assignment` on
/// every read. No row-level security is applied.
#[derive(Clone, Default)]
pub struct MemoryTables {
    inner: Arc<Mutex<Tables>>,
}

impl MemoryTables {
    /// Empty tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends rows as-is, filling in missing ids and timestamps.
    pub fn seed(&self, table: &str, rows: impl IntoIterator<Item = Value>) {
        let mut tables = self.lock();
        let stored = tables.entry(table.to_string()).or_default();
        for mut row in rows {
            if let Value::Object(map) = &mut row {
                fill_defaults(table, map);
            }
            stored.push(row);
        }
    }

    /// Snapshot of a table's rows.
    #[must_use]
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.lock().get(table).cloned().unwrap_or_default()
    }

    fn read(&self, query: &TableQuery) -> Vec<Value> {
        let tables = self.lock();
        let source = if query.table == TASK_ASSIGNMENT_INTERVALS {
            interval_view(&tables)
        } else {
            tables.get(&query.table).cloned().unwrap_or_default()
        };

        let mut rows: Vec<Value> =
            source.into_iter().filter(|row| matches_all(row, &query.filters)).collect();
        for key in query.order.iter().rev() {
            rows.sort_by(|a, b| {
                let (x, y) = (field(a, &key.column), field(b, &key.column));
                match (x.is_null(), y.is_null()) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Greater,
                    (false, true) => Ordering::Less,
                    (false, false) if key.ascending => compare(x, y),
                    (false, false) => compare(y, x),
                }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        rows.iter().map(|row| project(&tables, row, &query.selection)).collect()
    }

    fn write_insert(&self, table: &str, rows: Vec<Value>, returning: &Selection) -> RemoteResult<Vec<Value>> {
        if table == TASK_ASSIGNMENT_INTERVALS {
            return Err(RemoteError::Unsupported(format!("{table} is a read-only view")));
        }
        let mut prepared = Vec::with_capacity(rows.len());
        for row in rows {
            let Value::Object(mut map) = row else {
                return Err(RemoteError::Decode(format!("insert into {table}: row is not an object")));
            };
            fill_defaults(table, &mut map);
            prepared.push(Value::Object(map));
        }
        let mut tables = self.lock();
        tables.entry(table.to_string()).or_default().extend(prepared.iter().cloned());
        Ok(prepared.iter().map(|row| project(&tables, row, returning)).collect())
    }

    fn write_update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: &Value,
        returning: &Selection,
    ) -> RemoteResult<Vec<Value>> {
        let Value::Object(patch) = patch else {
            return Err(RemoteError::Decode(format!("update {table}: patch is not an object")));
        };
        let mut tables = self.lock();
        let mut updated = Vec::new();
        if let Some(rows) = tables.get_mut(table) {
            for row in rows.iter_mut().filter(|row| matches_all(row, filters)) {
                if let Value::Object(map) = row {
                    for (k, v) in patch {
                        map.insert(k.clone(), v.clone());
                    }
                }
                updated.push(row.clone());
            }
        }
        Ok(updated.iter().map(|row| project(&tables, row, returning)).collect())
    }

    fn write_delete(&self, table: &str, filters: &[Filter], returning: &Selection) -> Vec<Value> {
        let mut tables = self.lock();
        let Some(rows) = tables.get_mut(table) else {
            return Vec::new();
        };
        let (removed, kept): (Vec<Value>, Vec<Value>) =
            rows.drain(..).partition(|row| matches_all(row, filters));
        *rows = kept;
        removed.iter().map(|row| project(&tables, row, returning)).collect()
    }

    fn call(&self, function: &str, args: &Value) -> RemoteResult<Value> {
        if function != SEARCH_USERS_RPC {
            return Err(RemoteError::Unsupported(format!("unknown procedure {function}")));
        }
        let needle = args.get("q").and_then(Value::as_str).unwrap_or_default().to_lowercase();
        let found: Vec<Value> = self
            .lock()
            .get(PROFILES)
            .map(|profiles| {
                profiles
                    .iter()
                    .filter(|p| {
                        p.get("email")
                            .and_then(Value::as_str)
                            .is_some_and(|email| email.to_lowercase().contains(&needle))
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(Value::Array(found))
    }
}

fn fill_defaults(table: &str, map: &mut Map<String, Value>) {
    map.entry("id").or_insert_with(|| Value::String(uuid::Uuid::new_v4().to_string()));
    map.entry("created_at").or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
    let status = match table {
        "contracts" => Some("DRAFT"),
        "payments" => Some("pending"),
        TASK_ASSIGNMENT => Some("ACTIVE"),
        _ => None,
    };
    if let Some(status) = status {
        map.entry("status").or_insert_with(|| Value::String(status.to_string()));
    }
}

fn field<'a>(row: &'a Value, column: &str) -> &'a Value {
    row.get(column).unwrap_or(&Value::Null)
}

fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn same(stored: &Value, wanted: &Value) -> bool {
    match (stored, wanted) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (a, b) => a == b || literal(a) == literal(b),
    }
}

fn matches_all(row: &Value, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| match filter {
        Filter::Eq { column, value } => same(field(row, column), value),
        Filter::In { column, values } => values.iter().any(|v| same(field(row, column), v)),
    })
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            x.as_f64().partial_cmp(&y.as_f64()).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => literal(a).cmp(&literal(b)),
    }
}

fn pick(row: &Value, columns: &[String]) -> Map<String, Value> {
    match row {
        Value::Object(map) if columns.is_empty() => map.clone(),
        _ => columns.iter().map(|c| (c.clone(), field(row, c).clone())).collect(),
    }
}

fn project(tables: &Tables, row: &Value, selection: &Selection) -> Value {
    let mut out = pick(row, &selection.columns);
    for embed in &selection.embeds {
        let key = field(row, &embed.via);
        let related = tables
            .get(&embed.table)
            .and_then(|rows| rows.iter().find(|r| !key.is_null() && same(field(r, "id"), key)))
            .map_or(Value::Null, |r| Value::Object(pick(r, &embed.columns)));
        out.insert(embed.alias.clone(), related);
    }
    Value::Object(out)
}

fn find_by_id<'a>(tables: &'a Tables, table: &str, id: &str) -> Option<&'a Value> {
    tables.get(table)?.iter().find(|r| field(r, "id").as_str() == Some(id))
}

fn text(row: Option<&Value>, column: &str) -> Value {
    row.map_or(Value::Null, |r| field(r, column).clone())
}

/// Materialises `task_assignment_intervals` from the raw rows.
fn interval_view(tables: &Tables) -> Vec<Value> {
    let rows: Vec<AssignmentRow> = tables
        .get(TASK_ASSIGNMENT)
        .map(|rows| {
            rows.iter()
                .filter_map(|row| match serde_json::from_value(camelize(row.clone())) {
                    Ok(parsed) => Some(parsed),
                    Err(e) => {
                        tracing::debug!(%e, "skipping malformed assignment row");
                        None
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    pair_intervals(&rows).iter().map(|interval| interval_row(tables, interval)).collect()
}

fn interval_row(tables: &Tables, interval: &PairedInterval) -> Value {
    let task = find_by_id(tables, TASKS, &interval.task_id);
    let user = find_by_id(tables, PROFILES, &interval.user_id);
    let creator = task
        .and_then(|t| field(t, "creator_id").as_str())
        .and_then(|id| find_by_id(tables, PROFILES, id));

    serde_json::json!({
        "active_assignment_id": interval.active_id,
        "removed_assignment_id": interval.removed_id,
        "task_id": interval.task_id,
        "task_title": text(task, "title"),
        "user_id": interval.user_id,
        "user_first_name": text(user, "first_name"),
        "user_last_name": text(user, "last_name"),
        "user_email": text(user, "email"),
        "creator_first_name": text(creator, "first_name"),
        "creator_last_name": text(creator, "last_name"),
        "creator_email": text(creator, "email"),
        "start_date": interval.start_date,
        "end_date": interval.end_date,
    })
}

impl RemoteTables for MemoryTables {
    fn select(&self, query: &TableQuery) -> RemoteFuture<'_, Vec<Value>> {
        let rows = self.read(query);
        Box::pin(async move { Ok(rows) })
    }

    fn insert(&self, table: &str, rows: Vec<Value>, returning: &Selection) -> RemoteFuture<'_, Vec<Value>> {
        let result = self.write_insert(table, rows, returning);
        Box::pin(async move { result })
    }

    fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Value,
        returning: &Selection,
    ) -> RemoteFuture<'_, Vec<Value>> {
        let result = self.write_update(table, filters, &patch, returning);
        Box::pin(async move { result })
    }

    fn delete(&self, table: &str, filters: &[Filter], returning: &Selection) -> RemoteFuture<'_, Vec<Value>> {
        let rows = self.write_delete(table, filters, returning);
        Box::pin(async move { Ok(rows) })
    }

    fn rpc(&self, function: &str, args: Value) -> RemoteFuture<'_, Value> {
        let result = self.call(function, &args);
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::tables::Embed;
    use serde_json::json;

    #[tokio::test]
    async fn insert_fills_ids_and_defaults() {
        let tables = MemoryTables::new();
        let rows = tables
            .insert("contracts", vec![json!({"title": "Walls"})], &Selection::all())
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0]["id"].is_string());
        assert!(rows[0]["created_at"].is_string());
        assert_eq!(rows[0]["status"], "DRAFT");
        assert_eq!(tables.rows("contracts").len(), 1);
    }

    #[tokio::test]
    async fn select_filters_orders_and_limits() {
        let tables = MemoryTables::new();
        tables.seed(
            "tasks",
            vec![
                json!({"id": "a", "type": "PROJECT", "start_date": "2025-03-01"}),
                json!({"id": "b", "type": "TASK", "start_date": "2025-01-01"}),
                json!({"id": "c", "type": "PROJECT", "start_date": "2025-02-01"}),
                json!({"id": "d", "type": "PROJECT", "start_date": null}),
            ],
        );
        let query = TableQuery::from("tasks")
            .select(Selection::columns(&["id"]))
            .eq("type", "PROJECT")
            .order("start_date", true);
        let rows = tables.select(&query).await.unwrap();
        assert_eq!(rows, vec![json!({"id": "c"}), json!({"id": "a"}), json!({"id": "d"})]);

        let rows = tables.select(&query.clone().limit(1)).await.unwrap();
        assert_eq!(rows, vec![json!({"id": "c"})]);
    }

    #[tokio::test]
    async fn embeds_resolve_through_foreign_key() {
        let tables = MemoryTables::new();
        tables.seed("profiles", vec![json!({"id": "u1", "email": "a@x.test"})]);
        tables.seed("payments", vec![json!({"id": "p1", "payer_id": "u1", "payee_id": "u9"})]);

        let query = TableQuery::from("payments").select(
            Selection::all()
                .embed(Embed::new("payer", "profiles", "payer_id", &["email"]))
                .embed(Embed::new("payee", "profiles", "payee_id", &["email"])),
        );
        let rows = tables.select(&query).await.unwrap();
        assert_eq!(rows[0]["payer"], json!({"email": "a@x.test"}));
        assert_eq!(rows[0]["payee"], Value::Null);
    }

    #[tokio::test]
    async fn update_and_delete_return_affected_rows() {
        let tables = MemoryTables::new();
        tables.seed("tasks", vec![json!({"id": "a", "title": "x"}), json!({"id": "b", "title": "y"})]);

        let updated = tables
            .update("tasks", &[Filter::eq("id", "a")], json!({"title": "z"}), &Selection::all())
            .await
            .unwrap();
        assert_eq!(updated[0]["title"], "z");

        let deleted = tables
            .delete("tasks", &[Filter::within("id", ["a", "missing"])], &Selection::columns(&["id"]))
            .await
            .unwrap();
        assert_eq!(deleted, vec![json!({"id": "a"})]);
        assert_eq!(tables.rows("tasks").len(), 1);
    }

    #[tokio::test]
    async fn interval_view_pairs_rows_and_joins_names() {
        let tables = MemoryTables::new();
        tables.seed("tasks", vec![json!({"id": "T1", "title": "Walls", "creator_id": "boss"})]);
        tables.seed(
            "profiles",
            vec![
                json!({"id": "U1", "email": "u1@x.test", "first_name": "Dana"}),
                json!({"id": "boss", "email": "boss@x.test"}),
            ],
        );
        tables.seed(
            TASK_ASSIGNMENT,
            vec![
                json!({"id": "r1", "task_id": "T1", "user_id": "U1", "status": "ACTIVE", "assigned_at": "2025-01-01"}),
                json!({"id": "r2", "task_id": "T1", "user_id": "U1", "status": "REMOVED", "assigned_at": "2025-01-10"}),
            ],
        );

        let rows = tables.select(&TableQuery::from(TASK_ASSIGNMENT_INTERVALS)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["active_assignment_id"], "r1");
        assert_eq!(rows[0]["removed_assignment_id"], "r2");
        assert_eq!(rows[0]["task_title"], "Walls");
        assert_eq!(rows[0]["user_first_name"], "Dana");
        assert_eq!(rows[0]["creator_email"], "boss@x.test");
        assert_eq!(rows[0]["start_date"], "2025-01-01");
        assert_eq!(rows[0]["end_date"], "2025-01-10");
    }

    #[tokio::test]
    async fn search_rpc_matches_email_substring() {
        let tables = MemoryTables::new();
        tables.seed(
            PROFILES,
            vec![json!({"id": "1", "email": "Dana@Site.test"}), json!({"id": "2", "email": "lee@other.test"})],
        );
        let found = tables.rpc(SEARCH_USERS_RPC, json!({"q": "site"})).await.unwrap();
        assert_eq!(found.as_array().map(Vec::len), Some(1));

        let err = tables.rpc("drop_everything", json!({})).await.unwrap_err();
        assert!(matches!(err, RemoteError::Unsupported(_)));
    }
}
