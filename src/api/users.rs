//! Profiles, user search and the current session.

use serde_json::json;

use crate::context::ServiceContext;
use crate::error::AppError;
use crate::model::UserProfile;
use crate::ports::{SessionUser, TableQuery};

use super::{decode_row, decode_single};
use crate::api::payments::PROFILES;

/// Remote procedure doing a substring search over profile emails.
pub const SEARCH_USERS_RPC: &str = "search_users_by_email";

/// Shortest query sent to the search procedure.
pub const MIN_SEARCH_LEN: usize = 2;

/// Fetches one profile.
///
/// # Errors
///
/// Returns `NotFound` if no profile has this id, or an error if the query fails.
pub async fn fetch_profile(ctx: &ServiceContext, user_id: &str) -> Result<UserProfile, AppError> {
    let query = TableQuery::from(PROFILES).eq("id", user_id).limit(1);
    let rows = ctx.tables.select(&query).await.map_err(|e| AppError::remote("fetch_profile", e))?;
    decode_single("fetch_profile", "profile", user_id, rows)
}

/// Finds profiles whose email contains `query`.
///
/// Queries shorter than two characters return nothing without a remote call.
///
/// # Errors
///
/// Returns an error if the procedure call fails or returns something other than a list.
pub async fn search_users_by_email(
    ctx: &ServiceContext,
    query: &str,
) -> Result<Vec<UserProfile>, AppError> {
    let query = query.trim();
    if query.chars().count() < MIN_SEARCH_LEN {
        return Ok(Vec::new());
    }
    let result = ctx
        .tables
        .rpc(SEARCH_USERS_RPC, json!({ "q": query }))
        .await
        .map_err(|e| AppError::remote("search_users_by_email", e))?;
    match result {
        serde_json::Value::Array(rows) => {
            rows.into_iter().map(|r| decode_row("search_users_by_email", r)).collect()
        }
        serde_json::Value::Null => Ok(Vec::new()),
        other => Err(AppError::Decode {
            context: "search_users_by_email",
            message: format!("expected a list, got {other}"),
        }),
    }
}

/// The signed-in user, or the guest user when there is no session.
///
/// # Errors
///
/// Returns an error if the auth service cannot be reached.
pub async fn current_user(ctx: &ServiceContext) -> Result<SessionUser, AppError> {
    let user = ctx.auth.current_user().await.map_err(|e| AppError::remote("current_user", e))?;
    Ok(user.unwrap_or_else(SessionUser::guest))
}
