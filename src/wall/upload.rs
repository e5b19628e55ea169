use serde::Deserialize;

use crate::error::VkwallError;
use crate::http::{self, request_error, truncate};
use crate::types::{GroupId, WallAttachment};
use crate::wall::api::{UploadedPhoto, WallApi};
use crate::wall::images::{ImageFetcher, ImageSource};

const UPLOAD_FIELD: &str = "photo";
const UPLOAD_FILE_NAME: &str = "image.jpg";

/// Upload server reply. Every field is optional on the wire; absence is
/// checked explicitly before anything is saved.
#[derive(Debug, Deserialize)]
struct RawUploadResponse {
    #[serde(default)]
    photo: Option<String>,
    #[serde(default)]
    server: Option<serde_json::Value>,
    #[serde(default)]
    hash: Option<String>,
}

impl RawUploadResponse {
    fn validate(self, body: &str) -> Result<UploadedPhoto, VkwallError> {
        let photo = self.photo.filter(|p| !p.is_empty() && p != "[]");
        let server = self.server.and_then(|s| match s {
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::String(s) if !s.is_empty() => Some(s),
            _ => None,
        });
        let hash = self.hash.filter(|h| !h.is_empty());

        match (photo, server, hash) {
            (Some(photo), Some(server), Some(hash)) => Ok(UploadedPhoto {
                photo,
                server,
                hash,
            }),
            (photo, server, hash) => {
                let missing: Vec<&str> = [
                    ("photo", photo.is_none()),
                    ("server", server.is_none()),
                    ("hash", hash.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                Err(VkwallError::unexpected(
                    "photo upload server",
                    format!("missing {}: {}", missing.join(", "), truncate(body, 200)),
                ))
            }
        }
    }
}

/// Uploads photos to a community wall album.
#[derive(Debug, Clone)]
pub struct WallUploader {
    http: reqwest::Client,
}

impl WallUploader {
    pub fn new() -> Result<Self, VkwallError> {
        Ok(Self {
            http: http::client(http::UPLOAD_TIMEOUT)?,
        })
    }

    /// POST one image to the upload URL handed out by `photos.getWallUploadServer`.
    pub async fn send(&self, upload_url: &str, bytes: Vec<u8>) -> Result<UploadedPhoto, VkwallError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(UPLOAD_FILE_NAME);
        let form = reqwest::multipart::Form::new().part(UPLOAD_FIELD, part);

        let resp = self
            .http
            .post(upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| request_error("photo upload", e))?;
        let resp = resp
            .error_for_status()
            .map_err(|e| request_error("photo upload", e))?;

        // The upload server may label its JSON as text/html.
        let body = resp.text().await.map_err(|e| request_error("photo upload", e))?;
        let raw: RawUploadResponse = serde_json::from_str(&body).map_err(|e| {
            VkwallError::unexpected("photo upload server", format!("{e}: {}", truncate(&body, 200)))
        })?;
        raw.validate(&body)
    }

    /// Upload every source and return attachments in input order.
    ///
    /// Stops at the first failure. Photos already saved stay in the
    /// community album; they are not deleted.
    pub async fn upload_all(
        &self,
        api: &WallApi,
        fetcher: &ImageFetcher,
        token: &str,
        group: GroupId,
        sources: &[ImageSource],
    ) -> Result<Vec<WallAttachment>, VkwallError> {
        if sources.is_empty() {
            return Ok(Vec::new());
        }

        let server = api.get_wall_upload_server(token, group).await?;
        let mut attachments = Vec::with_capacity(sources.len());

        for (idx, source) in sources.iter().enumerate() {
            let result = self
                .upload_one(api, fetcher, token, group, &server.upload_url, source)
                .await;
            match result {
                Ok(attachment) => {
                    tracing::info!("Uploaded {source} as {attachment}");
                    attachments.push(attachment);
                }
                Err(e) => {
                    if idx > 0 {
                        tracing::warn!(
                            "Upload of {source} failed; {idx} photo(s) already saved to the \
                             community album are left in place"
                        );
                    }
                    return Err(e);
                }
            }
        }

        Ok(attachments)
    }

    async fn upload_one(
        &self,
        api: &WallApi,
        fetcher: &ImageFetcher,
        token: &str,
        group: GroupId,
        upload_url: &str,
        source: &ImageSource,
    ) -> Result<WallAttachment, VkwallError> {
        let bytes = fetcher.fetch(source).await?;
        tracing::debug!("Read {} bytes from {source}", bytes.len());

        let uploaded = self.send(upload_url, bytes).await?;
        let saved = api.save_wall_photo(token, group, &uploaded).await?;
        let photo = saved.first().ok_or_else(|| {
            VkwallError::unexpected("photos.saveWallPhoto", "no saved photo returned")
        })?;
        Ok(WallAttachment::photo(photo.owner_id, photo.id))
    }
}
