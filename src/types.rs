use std::fmt;
use std::str::FromStr;

use serde::Serialize;

pub const VK_WEB_URL: &str = "https://vk.com";

/// Numeric community id as shown in the community settings (no minus sign).
///
/// Always in `1..=i64::MAX`, so the negated owner id cannot overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(i64);

impl GroupId {
    pub fn new(id: i64) -> Option<Self> {
        (id > 0).then_some(Self(id))
    }

    pub fn get(self) -> i64 {
        self.0
    }

    /// Wall owner id for this community. Communities own walls under negative ids.
    pub fn owner_id(self) -> i64 {
        -self.0
    }

    /// Public link to a post on this community's wall.
    pub fn post_url(self, post_id: i64) -> String {
        format!("{VK_WEB_URL}/wall-{}_{post_id}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid community id {0:?}: expected a positive integer")]
pub struct InvalidGroupId(pub String);

impl FromStr for GroupId {
    type Err = InvalidGroupId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .ok()
            .and_then(GroupId::new)
            .ok_or_else(|| InvalidGroupId(s.to_string()))
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to an uploaded photo, in the `photo<owner_id>_<photo_id>` form the wall API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WallAttachment(String);

impl WallAttachment {
    pub fn photo(owner_id: i64, photo_id: i64) -> Self {
        Self(format!("photo{owner_id}_{photo_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WallAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A wall entry to create, or to overwrite when `post_id` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallPost {
    pub owner_id: i64,
    pub message: String,
    pub attachments: Vec<WallAttachment>,
    pub post_id: Option<i64>,
}

impl WallPost {
    pub fn new(group: GroupId, message: impl Into<String>) -> Self {
        Self {
            owner_id: group.owner_id(),
            message: message.into(),
            attachments: Vec::new(),
            post_id: None,
        }
    }

    pub fn with_attachments(mut self, attachments: Vec<WallAttachment>) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn editing(mut self, post_id: i64) -> Self {
        self.post_id = Some(post_id);
        self
    }

    /// Comma-joined attachment list, or `None` when there is nothing to attach.
    pub fn attachments_param(&self) -> Option<String> {
        if self.attachments.is_empty() {
            return None;
        }
        Some(
            self.attachments
                .iter()
                .map(WallAttachment::as_str)
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}
