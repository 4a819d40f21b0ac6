//! Live adapter for the `RemoteTables` port over the service's REST dialect.

use reqwest::Method;
use serde_json::Value;

use super::http::{into_rows, RestClient};
use crate::ports::tables::{Filter, Order, RemoteFuture, RemoteTables, Selection, TableQuery};

/// Live tables client speaking `/rest/v1`.
pub struct LiveTables {
    rest: RestClient,
}

impl LiveTables {
    /// Creates a tables client sharing `rest`.
    #[must_use]
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }
}

/// Renders the `select` parameter: columns, then embeds as `alias:table!via(cols)`.
#[must_use]
pub fn select_param(selection: &Selection) -> String {
    let mut parts: Vec<String> = if selection.columns.is_empty() {
        vec!["*".to_string()]
    } else {
        selection.columns.clone()
    };
    for embed in &selection.embeds {
        let columns = if embed.columns.is_empty() { "*".to_string() } else { embed.columns.join(",") };
        parts.push(format!("{}:{}!{}({columns})", embed.alias, embed.table, embed.via));
    }
    parts.join(",")
}

fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn list_item(value: &Value) -> String {
    let raw = literal(value);
    if raw.contains([',', '(', ')', '"']) {
        format!("\"{}\"", raw.replace('"', "\\\""))
    } else {
        raw
    }
}

/// Renders one filter as a `(column, operator.value)` query pair.
#[must_use]
pub fn filter_param(filter: &Filter) -> (String, String) {
    match filter {
        Filter::Eq { column, value: Value::Null } => (column.clone(), "is.null".to_string()),
        Filter::Eq { column, value } => (column.clone(), format!("eq.{}", literal(value))),
        Filter::In { column, values } => {
            let items: Vec<String> = values.iter().map(list_item).collect();
            (column.clone(), format!("in.({})", items.join(",")))
        }
    }
}

/// Renders sort keys as the `order` parameter value.
#[must_use]
pub fn order_param(order: &[Order]) -> String {
    order
        .iter()
        .map(|o| format!("{}.{}", o.column, if o.ascending { "asc" } else { "desc" }))
        .collect::<Vec<_>>()
        .join(",")
}

/// Query pairs for a read.
#[must_use]
pub fn query_params(query: &TableQuery) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), select_param(&query.selection))];
    params.extend(query.filters.iter().map(filter_param));
    if !query.order.is_empty() {
        params.push(("order".to_string(), order_param(&query.order)));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

fn write_params(filters: &[Filter], returning: &Selection) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), select_param(returning))];
    params.extend(filters.iter().map(filter_param));
    params
}

impl RemoteTables for LiveTables {
    fn select(&self, query: &TableQuery) -> RemoteFuture<'_, Vec<Value>> {
        let path = format!("/rest/v1/{}", query.table);
        let params = query_params(query);
        Box::pin(async move {
            tracing::debug!(%path, ?params, "select");
            let request = self.rest.request(Method::GET, &path).query(&params);
            into_rows(self.rest.send_json(request).await?)
        })
    }

    fn insert(&self, table: &str, rows: Vec<Value>, returning: &Selection) -> RemoteFuture<'_, Vec<Value>> {
        let path = format!("/rest/v1/{table}");
        let params = write_params(&[], returning);
        Box::pin(async move {
            tracing::debug!(%path, rows = rows.len(), "insert");
            let request = self
                .rest
                .request(Method::POST, &path)
                .query(&params)
                .header("Prefer", "return=representation")
                .json(&rows);
            into_rows(self.rest.send_json(request).await?)
        })
    }

    fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Value,
        returning: &Selection,
    ) -> RemoteFuture<'_, Vec<Value>> {
        let path = format!("/rest/v1/{table}");
        let params = write_params(filters, returning);
        Box::pin(async move {
            tracing::debug!(%path, ?params, "update");
            let request = self
                .rest
                .request(Method::PATCH, &path)
                .query(&params)
                .header("Prefer", "return=representation")
                .json(&patch);
            into_rows(self.rest.send_json(request).await?)
        })
    }

    fn delete(&self, table: &str, filters: &[Filter], returning: &Selection) -> RemoteFuture<'_, Vec<Value>> {
        let path = format!("/rest/v1/{table}");
        let params = write_params(filters, returning);
        Box::pin(async move {
            tracing::debug!(%path, ?params, "delete");
            let request = self
                .rest
                .request(Method::DELETE, &path)
                .query(&params)
                .header("Prefer", "return=representation");
            into_rows(self.rest.send_json(request).await?)
        })
    }

    fn rpc(&self, function: &str, args: Value) -> RemoteFuture<'_, Value> {
        let path = format!("/rest/v1/rpc/{function}");
        Box::pin(async move {
            tracing::debug!(%path, "rpc");
            let request = self.rest.request(Method::POST, &path).json(&args);
            self.rest.send_json(request).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::tables::Embed;
    use serde_json::json;

    #[test]
    fn select_lists_columns_and_embeds() {
        let selection = Selection::columns(&["id", "title"]).embed(Embed::new(
            "measurement_units",
            "measurement_units",
            "measurement_unit_id",
            &["id", "title"],
        ));
        assert_eq!(
            select_param(&selection),
            "id,title,measurement_units:measurement_units!measurement_unit_id(id,title)"
        );
        assert_eq!(select_param(&Selection::all()), "*");
    }

    #[test]
    fn filters_render_operators() {
        assert_eq!(filter_param(&Filter::eq("type", "PROJECT")), ("type".into(), "eq.PROJECT".into()));
        assert_eq!(filter_param(&Filter::eq("parent_id", Value::Null)), ("parent_id".into(), "is.null".into()));
        assert_eq!(filter_param(&Filter::eq("amount", json!(5))), ("amount".into(), "eq.5".into()));
        assert_eq!(
            filter_param(&Filter::within("id", ["a1", "b,2"])),
            ("id".into(), "in.(a1,\"b,2\")".into())
        );
    }

    #[test]
    fn read_params_follow_query() {
        let query = TableQuery::from("task_assignment_intervals")
            .eq("task_id", "T1")
            .order("user_id", true)
            .order("start_date", false)
            .limit(10);
        let params = query_params(&query);
        assert_eq!(
            params,
            vec![
                ("select".to_string(), "*".to_string()),
                ("task_id".to_string(), "eq.T1".to_string()),
                ("order".to_string(), "user_id.asc,start_date.desc".to_string()),
                ("limit".to_string(), "10".to_string()),
            ]
        );
    }
}
