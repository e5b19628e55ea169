use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use url::Url;

use crate::error::VkwallError;
use crate::http::{self, request_error};

/// Where an image comes from. Decided once when the argument is parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    LocalPath(PathBuf),
    RemoteUrl(Url),
}

impl FromStr for ImageSource {
    type Err = VkwallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(VkwallError::config("--image", "image source is empty"));
        }
        if s.starts_with("http://") || s.starts_with("https://") {
            let url = Url::parse(s)
                .map_err(|e| VkwallError::config("--image", format!("invalid URL '{s}': {e}")))?;
            return Ok(ImageSource::RemoteUrl(url));
        }
        Ok(ImageSource::LocalPath(PathBuf::from(s)))
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::LocalPath(p) => write!(f, "{}", p.display()),
            ImageSource::RemoteUrl(u) => write!(f, "{u}"),
        }
    }
}

/// Fetches raw image bytes. No caching: every call hits the disk or network.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    http: reqwest::Client,
}

impl ImageFetcher {
    pub fn new() -> Result<Self, VkwallError> {
        Ok(Self {
            http: http::client(http::DOWNLOAD_TIMEOUT)?,
        })
    }

    pub async fn fetch(&self, source: &ImageSource) -> Result<Vec<u8>, VkwallError> {
        match source {
            ImageSource::LocalPath(path) => match tokio::fs::read(path).await {
                Ok(bytes) => Ok(bytes),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Err(VkwallError::NotFoundError { path: path.clone() })
                }
                Err(e) => Err(VkwallError::IoError(e)),
            },
            ImageSource::RemoteUrl(url) => {
                let context = format!("downloading {url}");
                let resp = self
                    .http
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(|e| request_error(&context, e))?;
                let resp = resp
                    .error_for_status()
                    .map_err(|e| request_error(&context, e))?;
                let bytes = resp.bytes().await.map_err(|e| request_error(&context, e))?;
                Ok(bytes.to_vec())
            }
        }
    }
}
