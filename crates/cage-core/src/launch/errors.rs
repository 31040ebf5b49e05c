//! Launch profile error types.

use crate::errors::CageError;

/// Errors that can occur while building a launch profile.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error(
        "No tool selected{}. Pass a tool explicitly or set \"tool\" in your config file.",
        repo_suffix(.repo)
    )]
    NoToolSelected { repo: Option<String> },
}

fn repo_suffix(repo: &Option<String>) -> String {
    match repo {
        Some(repo) => format!(" for repository '{repo}'"),
        None => String::new(),
    }
}

impl CageError for LaunchError {
    fn error_code(&self) -> &'static str {
        match self {
            LaunchError::NoToolSelected { .. } => "NO_TOOL_SELECTED",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, LaunchError::NoToolSelected { .. })
    }
}
