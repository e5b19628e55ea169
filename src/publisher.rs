use serde::Serialize;

use crate::config::Endpoints;
use crate::error::VkwallError;
use crate::session::{PublishIntent, Session};
use crate::types::{GroupId, WallAttachment, WallPost};
use crate::wall::{ImageFetcher, ImageSource, WallApi, WallUploader};

/// One publish action: a new post, or an edit when `edit` holds a post id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    pub message: String,
    pub images: Vec<ImageSource>,
    pub edit: Option<i64>,
}

impl PublishRequest {
    pub fn intent(&self) -> PublishIntent {
        PublishIntent {
            has_images: !self.images.is_empty(),
            editing: self.edit.is_some(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishOutcome {
    pub post_id: i64,
    pub url: String,
    pub edited: bool,
    pub attachments: Vec<WallAttachment>,
    /// `"community"` or `"user"`.
    pub token: &'static str,
}

/// Publishes to one community's wall.
#[derive(Debug, Clone)]
pub struct Publisher {
    group: GroupId,
    api: WallApi,
    uploader: WallUploader,
    fetcher: ImageFetcher,
}

impl Publisher {
    pub fn new(endpoints: &Endpoints, group: GroupId) -> Result<Self, VkwallError> {
        Ok(Self {
            group,
            api: WallApi::new(endpoints)?,
            uploader: WallUploader::new()?,
            fetcher: ImageFetcher::new()?,
        })
    }

    pub fn group(&self) -> GroupId {
        self.group
    }

    /// Pick a token, upload images (if any), then create or edit the post.
    ///
    /// The session outlives the call so a rotated refresh token stays
    /// reachable when a later step fails.
    pub async fn publish(
        &self,
        session: &mut Session<'_>,
        request: &PublishRequest,
    ) -> Result<PublishOutcome, VkwallError> {
        let token = session.acquire(request.intent()).await?;
        tracing::info!("Publishing with {} token", token.kind());

        let attachments = self
            .uploader
            .upload_all(
                &self.api,
                &self.fetcher,
                token.secret(),
                self.group,
                &request.images,
            )
            .await?;

        let post = WallPost::new(self.group, request.message.as_str())
            .with_attachments(attachments.clone());

        let (post_id, edited) = match request.edit {
            Some(post_id) => {
                let id = self.api.edit(token.secret(), &post.editing(post_id)).await?;
                (id, true)
            }
            None => (self.api.post(token.secret(), &post).await?, false),
        };

        Ok(PublishOutcome {
            post_id,
            url: self.group.post_url(post_id),
            edited,
            attachments,
            token: token.kind(),
        })
    }
}
