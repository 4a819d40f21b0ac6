//! `projectdesk users` and `projectdesk whoami` commands.

use crate::api::users::{current_user, fetch_profile, search_users_by_email};
use crate::cli::UsersCommand;
use crate::context::ServiceContext;
use crate::error::AppError;
use crate::model::UserProfile;

use super::{or_dash, render_table, Output};

/// Execute a `users` subcommand.
///
/// # Errors
///
/// Returns an error string if the search fails.
pub async fn run(ctx: &ServiceContext, command: &UsersCommand, out: Output) -> Result<String, String> {
    match command {
        UsersCommand::Search { query } => {
            let users = search_users_by_email(ctx, query).await.map_err(|e| e.to_string())?;
            out.render(&users, || profile_table(&users))
        }
    }
}

/// Execute the `whoami` command.
///
/// Prints the profile of the session user, or the session itself when the
/// user has no profile row (or is the guest).
///
/// # Errors
///
/// Returns an error string if the session or the profile cannot be loaded.
pub async fn whoami(ctx: &ServiceContext, out: Output) -> Result<String, String> {
    let user = current_user(ctx).await.map_err(|e| e.to_string())?;
    if user.is_guest() {
        return out.render(&user, || "Not signed in (guest).".to_string());
    }
    match fetch_profile(ctx, &user.id).await {
        Ok(profile) => out.render(&profile, || {
            format!("{} <{}> {}", profile.display_name(), profile.email, or_dash(profile.role.map(role_label)))
        }),
        Err(AppError::NotFound { .. }) => {
            out.render(&user, || format!("{} <{}>", user.id, or_dash(user.email.as_ref())))
        }
        Err(e) => Err(e.to_string()),
    }
}

fn role_label(role: crate::model::UserRole) -> &'static str {
    use crate::model::UserRole;
    match role {
        UserRole::Admin => "admin",
        UserRole::Manager => "manager",
        UserRole::Foreman => "foreman",
        UserRole::Worker => "worker",
    }
}

fn profile_table(users: &[UserProfile]) -> String {
    let rows: Vec<Vec<String>> = users
        .iter()
        .map(|u| {
            vec![
                u.id.clone(),
                u.email.clone(),
                u.display_name(),
                or_dash(u.role.map(role_label)),
            ]
        })
        .collect();
    render_table(&["ID", "EMAIL", "NAME", "ROLE"], &rows, "No users found.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryBackend;
    use crate::commands::test_support;
    use crate::config::ClientSettings;

    const TEXT: Output = Output { json: false };

    #[tokio::test]
    async fn whoami_prints_profile() {
        let (_backend, ctx) = test_support::context();
        let out = whoami(&ctx, TEXT).await.unwrap();
        assert_eq!(out, "Dana Levi <dana@site.test> manager");
    }

    #[tokio::test]
    async fn whoami_without_session_is_guest() {
        let ctx = ServiceContext::memory(&MemoryBackend::default(), ClientSettings::default());
        let out = whoami(&ctx, TEXT).await.unwrap();
        assert_eq!(out, "Not signed in (guest).");
    }

    #[tokio::test]
    async fn search_matches_email_substring() {
        let (_backend, ctx) = test_support::context();
        let out = run(&ctx, &UsersCommand::Search { query: "omer".into() }, TEXT).await.unwrap();
        assert!(out.contains("Omer Katz"));
        assert!(!out.contains("Dana"));

        let out = run(&ctx, &UsersCommand::Search { query: "o".into() }, TEXT).await.unwrap();
        assert_eq!(out, "No users found.");
    }
}
