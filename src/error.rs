use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum VkwallError {
    #[error("Error in setting {key}: {detail}")]
    ConfigError { key: String, detail: String },

    #[error("Cannot parse redirect URL: {0}")]
    ParseError(String),

    #[error("{}", format_remote_auth(.code, .description.as_deref()))]
    RemoteAuthError {
        code: String,
        description: Option<String>,
    },

    #[error("VK API error {code} in {method}: {message}")]
    RemoteApiError {
        method: String,
        code: i64,
        message: String,
    },

    #[error("Unexpected response from {context}: {detail}")]
    UnexpectedResponseError { context: String, detail: String },

    #[error("Transport error ({context}): {source}")]
    TransportError {
        context: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("File not found: {}", path.display())]
    NotFoundError { path: PathBuf },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

fn format_remote_auth(code: &str, description: Option<&str>) -> String {
    match description {
        Some(d) if !d.is_empty() => format!("Token endpoint returned {code}: {d}"),
        _ => format!("Token endpoint returned {code}"),
    }
}

impl VkwallError {
    pub fn config(key: impl Into<String>, detail: impl Into<String>) -> Self {
        VkwallError::ConfigError {
            key: key.into(),
            detail: detail.into(),
        }
    }

    pub fn transport(
        context: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        VkwallError::TransportError {
            context: context.into(),
            source: source.into(),
        }
    }

    pub fn unexpected(context: impl Into<String>, detail: impl Into<String>) -> Self {
        VkwallError::UnexpectedResponseError {
            context: context.into(),
            detail: detail.into(),
        }
    }

    /// Error code string for structured JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            VkwallError::ConfigError { .. } => "config_error",
            VkwallError::ParseError(_) => "parse_error",
            VkwallError::RemoteAuthError { .. } => "remote_auth_error",
            VkwallError::RemoteApiError { .. } => "remote_api_error",
            VkwallError::UnexpectedResponseError { .. } => "unexpected_response",
            VkwallError::TransportError { .. } => "transport_error",
            VkwallError::NotFoundError { .. } => "not_found",
            VkwallError::IoError(_) => "io_error",
        }
    }

    /// Produce a structured JSON error object.
    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::Map::new();
        match self {
            VkwallError::RemoteAuthError { code, .. } => {
                obj.insert("remote_code".into(), serde_json::Value::String(code.clone()));
            }
            VkwallError::RemoteApiError { method, code, .. } => {
                obj.insert("method".into(), serde_json::Value::String(method.clone()));
                obj.insert("remote_code".into(), serde_json::Value::from(*code));
            }
            VkwallError::ConfigError { key, .. } => {
                obj.insert("setting".into(), serde_json::Value::String(key.clone()));
            }
            _ => {}
        }
        obj.insert("message".into(), serde_json::Value::String(self.to_string()));
        obj.insert("code".into(), serde_json::Value::String(self.code().to_string()));
        serde_json::json!({ "error": obj })
    }
}
