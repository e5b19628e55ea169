use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::VkwallError;

pub const DEFAULT_ENV_FILE: &str = ".env";

/// Load variables from an env file without touching the process environment.
///
/// An explicitly requested file must exist; the default `./.env` is
/// optional and silently skipped when absent.
pub fn load_env_file(explicit: Option<&Path>) -> Result<HashMap<String, String>, VkwallError> {
    let (path, required) = match explicit {
        Some(p) => (p.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_ENV_FILE), false),
    };

    if !path.exists() {
        if required {
            return Err(VkwallError::config(
                "--env-file",
                format!("{} does not exist", path.display()),
            ));
        }
        tracing::debug!("No env file at {}, using process environment only", path.display());
        return Ok(HashMap::new());
    }

    let iter = dotenvy::from_path_iter(&path).map_err(|e| env_file_error(&path, e))?;
    let mut vars = HashMap::new();
    for item in iter {
        let (key, value) = item.map_err(|e| env_file_error(&path, e))?;
        vars.insert(key, value);
    }
    tracing::debug!("Loaded {} variables from {}", vars.len(), path.display());
    Ok(vars)
}

fn env_file_error(path: &Path, err: dotenvy::Error) -> VkwallError {
    VkwallError::config("--env-file", format!("{}: {err}", path.display()))
}
