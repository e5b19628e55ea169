use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::Endpoints;
use crate::error::VkwallError;
use crate::http::{self, request_error, truncate};
use crate::types::{GroupId, WallPost};

/// `{"response": ...}` or `{"error": {...}}` envelope every API method returns.
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    response: Option<T>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error_code: i64,
    #[serde(default)]
    error_msg: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadServer {
    pub upload_url: String,
}

/// One entry of the `photos.saveWallPhoto` response.
#[derive(Debug, Clone, Deserialize)]
pub struct SavedPhoto {
    pub id: i64,
    pub owner_id: i64,
}

/// Fields returned by the upload server, forwarded verbatim to `photos.saveWallPhoto`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedPhoto {
    pub photo: String,
    pub server: String,
    pub hash: String,
}

#[derive(Debug, Deserialize)]
struct PostResponse {
    #[serde(default)]
    post_id: Option<i64>,
}

/// Thin client for the versioned VK API methods this tool needs.
#[derive(Debug, Clone)]
pub struct WallApi {
    http: reqwest::Client,
    base_url: String,
    version: String,
}

impl WallApi {
    pub fn new(endpoints: &Endpoints) -> Result<Self, VkwallError> {
        Ok(Self {
            http: http::client(http::API_TIMEOUT)?,
            base_url: endpoints.api_base_url.trim_end_matches('/').to_string(),
            version: endpoints.api_version.clone(),
        })
    }

    /// Call `method` with form parameters, returning the decoded `response` field.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        token: &str,
        params: &[(&str, String)],
    ) -> Result<T, VkwallError> {
        let url = format!("{}/{method}", self.base_url);
        let mut form: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        form.push(("access_token", token));
        form.push(("v", self.version.as_str()));

        tracing::debug!("Calling {method}");
        let resp = self
            .http
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| request_error(method, e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(VkwallError::transport(
                method,
                format!("HTTP {status}: {}", truncate(&body, 200)),
            ));
        }

        let body = resp.text().await.map_err(|e| request_error(method, e))?;
        let envelope: ApiEnvelope<T> = serde_json::from_str(&body).map_err(|e| {
            VkwallError::unexpected(method, format!("{e}: {}", truncate(&body, 200)))
        })?;

        if let Some(err) = envelope.error {
            return Err(VkwallError::RemoteApiError {
                method: method.to_string(),
                code: err.error_code,
                message: err.error_msg,
            });
        }

        envelope
            .response
            .ok_or_else(|| VkwallError::unexpected(method, "neither 'response' nor 'error' present"))
    }

    pub async fn get_wall_upload_server(
        &self,
        token: &str,
        group: GroupId,
    ) -> Result<UploadServer, VkwallError> {
        self.call(
            "photos.getWallUploadServer",
            token,
            &[("group_id", group.to_string())],
        )
        .await
    }

    pub async fn save_wall_photo(
        &self,
        token: &str,
        group: GroupId,
        uploaded: &UploadedPhoto,
    ) -> Result<Vec<SavedPhoto>, VkwallError> {
        self.call(
            "photos.saveWallPhoto",
            token,
            &[
                ("group_id", group.to_string()),
                ("photo", uploaded.photo.clone()),
                ("server", uploaded.server.clone()),
                ("hash", uploaded.hash.clone()),
            ],
        )
        .await
    }

    /// Publish a new post on behalf of the community. Returns the new post id.
    pub async fn post(&self, token: &str, post: &WallPost) -> Result<i64, VkwallError> {
        let mut params = vec![
            ("owner_id", post.owner_id.to_string()),
            ("from_group", "1".to_string()),
            ("message", post.message.clone()),
        ];
        if let Some(attachments) = post.attachments_param() {
            params.push(("attachments", attachments));
        }

        let resp: PostResponse = self.call("wall.post", token, &params).await?;
        resp.post_id
            .ok_or_else(|| VkwallError::unexpected("wall.post", "response has no post_id"))
    }

    /// Replace the text (and attachments, when given) of an existing post.
    pub async fn edit(&self, token: &str, post: &WallPost) -> Result<i64, VkwallError> {
        let post_id = post.post_id.ok_or_else(|| {
            VkwallError::config("--edit", "post id is required to edit a wall post")
        })?;
        let mut params = vec![
            ("owner_id", post.owner_id.to_string()),
            ("post_id", post_id.to_string()),
            ("message", post.message.clone()),
        ];
        if let Some(attachments) = post.attachments_param() {
            params.push(("attachments", attachments));
        }

        // Older API versions answer `1` instead of an object.
        let resp: serde_json::Value = self.call("wall.edit", token, &params).await?;
        Ok(resp
            .get("post_id")
            .and_then(serde_json::Value::as_i64)
            .unwrap_or(post_id))
    }
}
