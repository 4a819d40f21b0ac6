//! Typed query functions, one per entity per operation.
//!
//! Every function takes the [`ServiceContext`](crate::context::ServiceContext),
//! issues one or more calls on its ports, and maps the snake_case rows that
//! come back into typed models through [`camelize`].

pub mod assignments;
pub mod contracts;
pub mod documents;
pub mod payments;
pub mod tasks;
pub mod users;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::camelize::camelize;
use crate::error::AppError;

/// Decodes backend rows into models.
pub(crate) fn decode_rows<T: DeserializeOwned>(
    context: &'static str,
    rows: Vec<Value>,
) -> Result<Vec<T>, AppError> {
    rows.into_iter().map(|row| decode_row(context, row)).collect()
}

/// Decodes one backend row into a model.
pub(crate) fn decode_row<T: DeserializeOwned>(
    context: &'static str,
    row: Value,
) -> Result<T, AppError> {
    serde_json::from_value(camelize(row)).map_err(|e| AppError::decode(context, &e))
}

/// Decodes the single row a by-id call must return.
pub(crate) fn decode_single<T: DeserializeOwned>(
    context: &'static str,
    entity: &'static str,
    id: &str,
    rows: Vec<Value>,
) -> Result<T, AppError> {
    let row = rows
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound { entity, id: id.to_string() })?;
    decode_row(context, row)
}

/// Serializes a write payload into a backend row.
pub(crate) fn encode_row<T: Serialize>(context: &'static str, payload: &T) -> Result<Value, AppError> {
    serde_json::to_value(payload).map_err(|e| AppError::decode(context, &e))
}
