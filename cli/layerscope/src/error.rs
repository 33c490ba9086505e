//! Error display for the CLI.

use colored::Colorize;
use layerscope_registry::{AuthError, RegistryError};

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {}", "Error:".red().bold(), err);

    if let Some(hint) = err.downcast_ref::<RegistryError>().and_then(hint) {
        eprintln!("\n{}", format!("Hint: {}", hint).yellow());
    }
}

/// Suggest a fix for errors the user can act on.
fn hint(err: &RegistryError) -> Option<&'static str> {
    match err {
        RegistryError::Disallowed { insecure: true, .. } => Some(
            "--insecure expects an explicit registry host, e.g. `register.com:5080/zendesk/alpine`.",
        ),
        RegistryError::Disallowed { insecure: false, .. } => {
            Some("References naming a registry host need --insecure.")
        }
        RegistryError::Unauthorized
        | RegistryError::AuthenticationFailed(AuthError::MissingCredentials) => {
            Some("Set LAYERSCOPE_USERNAME and LAYERSCOPE_PASSWORD for this registry.")
        }
        RegistryError::NotFound(_) => Some("Check the repository name and tag."),
        RegistryError::Transport { .. } => Some("Check your network connection and registry address."),
        _ => None,
    }
}
