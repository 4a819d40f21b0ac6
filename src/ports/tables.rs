//! Remote tables port: row reads and writes against the hosted database.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RemoteResult;

/// Boxed future returned by remote ports, keeping the traits dyn-compatible.
pub type RemoteFuture<'a, T> = Pin<Box<dyn Future<Output = RemoteResult<T>> + Send + 'a>>;

/// A related row pulled in through a foreign key column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    /// Key the related row appears under in the result.
    pub alias: String,
    /// Related table.
    pub table: String,
    /// Column of the outer row holding the related row's id.
    pub via: String,
    /// Columns of the related row to return.
    pub columns: Vec<String>,
}

impl Embed {
    /// Embeds `table` under `alias`, joined through the outer column `via`.
    #[must_use]
    pub fn new(alias: &str, table: &str, via: &str, columns: &[&str]) -> Self {
        Self {
            alias: alias.to_string(),
            table: table.to_string(),
            via: via.to_string(),
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
        }
    }
}

/// Columns and embeds to return. No columns means every column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Plain columns.
    pub columns: Vec<String>,
    /// Related rows.
    pub embeds: Vec<Embed>,
}

impl Selection {
    /// Every column, no embeds.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// The given columns.
    #[must_use]
    pub fn columns(columns: &[&str]) -> Self {
        Self { columns: columns.iter().map(|c| (*c).to_string()).collect(), embeds: Vec::new() }
    }

    /// Adds an embed.
    #[must_use]
    pub fn embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }
}

/// A row filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Filter {
    /// `column = value`; a null value matches SQL NULL.
    Eq {
        /// Column name.
        column: String,
        /// Value to compare with.
        value: Value,
    },
    /// `column IN (values)`.
    In {
        /// Column name.
        column: String,
        /// Accepted values.
        values: Vec<Value>,
    },
}

impl Filter {
    /// Equality filter.
    pub fn eq(column: &str, value: impl Into<Value>) -> Self {
        Self::Eq { column: column.to_string(), value: value.into() }
    }

    /// Membership filter.
    pub fn within<I, V>(column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::In { column: column.to_string(), values: values.into_iter().map(Into::into).collect() }
    }

    /// Filtered column.
    #[must_use]
    pub fn column(&self) -> &str {
        match self {
            Self::Eq { column, .. } | Self::In { column, .. } => column,
        }
    }
}

/// A sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Column name.
    pub column: String,
    /// Ascending when true.
    pub ascending: bool,
}

/// A read against a table or view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableQuery {
    /// Table or view name.
    pub table: String,
    /// What to return.
    pub selection: Selection,
    /// Filters, combined with AND.
    pub filters: Vec<Filter>,
    /// Sort keys in priority order.
    pub order: Vec<Order>,
    /// Maximum number of rows.
    pub limit: Option<usize>,
}

impl TableQuery {
    /// Selects every column of `table`.
    #[must_use]
    pub fn from(table: &str) -> Self {
        Self {
            table: table.to_string(),
            selection: Selection::all(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    /// Sets the selection.
    #[must_use]
    pub fn select(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Adds an equality filter.
    #[must_use]
    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    /// Adds a sort key.
    #[must_use]
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order.push(Order { column: column.to_string(), ascending });
        self
    }

    /// Caps the number of rows.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Table access on the hosted backend.
///
/// Rows are JSON objects keyed by the backend's snake_case column names.
/// Writes return the affected rows projected through `returning`.
pub trait RemoteTables: Send + Sync {
    /// Reads rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects it.
    fn select(&self, query: &TableQuery) -> RemoteFuture<'_, Vec<Value>>;

    /// Inserts `rows` in one call.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects it.
    fn insert(&self, table: &str, rows: Vec<Value>, returning: &Selection) -> RemoteFuture<'_, Vec<Value>>;

    /// Applies `patch` to every row matching `filters`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects it.
    fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Value,
        returning: &Selection,
    ) -> RemoteFuture<'_, Vec<Value>>;

    /// Deletes every row matching `filters`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service rejects it.
    fn delete(&self, table: &str, filters: &[Filter], returning: &Selection) -> RemoteFuture<'_, Vec<Value>>;

    /// Calls a remote procedure.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the procedure is unknown.
    fn rpc(&self, function: &str, args: Value) -> RemoteFuture<'_, Value>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_collects_filters_and_order() {
        let q = TableQuery::from("task_assignment_intervals")
            .eq("task_id", "T1")
            .order("user_id", true)
            .order("start_date", true)
            .limit(5);

        assert_eq!(q.filters, vec![Filter::eq("task_id", "T1")]);
        assert_eq!(q.order.len(), 2);
        assert_eq!(q.order[1].column, "start_date");
        assert_eq!(q.limit, Some(5));
        assert!(q.selection.columns.is_empty());
    }

    #[test]
    fn filter_serializes_with_op_tag() {
        let f = Filter::within("id", ["a", "b"]);
        assert_eq!(
            serde_json::to_value(&f).unwrap(),
            json!({ "op": "in", "column": "id", "values": ["a", "b"] })
        );
        assert_eq!(f.column(), "id");
    }
}
