use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Photo,
    Video,
    Document,
}

impl MediaKind {
    pub fn name(&self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
            MediaKind::Document => "document",
        }
    }
}

/// a single media attachment identified by the platform's file id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub kind: MediaKind,
    pub file_id: String,
    pub caption: Option<String>,
}

impl MediaItem {
    pub fn new(kind: MediaKind, file_id: impl Into<String>, caption: Option<String>) -> Self {
        Self {
            kind,
            file_id: file_id.into(),
            caption,
        }
    }
}

/// finalized broadcast content, captured once per mailing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PostContent {
    Text {
        body: String,
    },
    Photo {
        file_id: String,
        caption: Option<String>,
    },
    Video {
        file_id: String,
        caption: Option<String>,
    },
    Document {
        file_id: String,
        caption: Option<String>,
    },
    MediaGroup {
        items: Vec<MediaItem>,
    },
}

impl PostContent {
    pub fn kind_name(&self) -> &'static str {
        match self {
            PostContent::Text { .. } => "text",
            PostContent::Photo { .. } => "photo",
            PostContent::Video { .. } => "video",
            PostContent::Document { .. } => "document",
            PostContent::MediaGroup { .. } => "media group",
        }
    }

    /// the single attachment for non-group media content
    pub fn single_item(&self) -> Option<MediaItem> {
        match self {
            PostContent::Photo { file_id, caption } => Some(MediaItem::new(
                MediaKind::Photo,
                file_id.clone(),
                caption.clone(),
            )),
            PostContent::Video { file_id, caption } => Some(MediaItem::new(
                MediaKind::Video,
                file_id.clone(),
                caption.clone(),
            )),
            PostContent::Document { file_id, caption } => Some(MediaItem::new(
                MediaKind::Document,
                file_id.clone(),
                caption.clone(),
            )),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            PostContent::Text { body } => body.trim().is_empty(),
            PostContent::MediaGroup { items } => items.is_empty(),
            _ => false,
        }
    }
}

/// the caption shown for a whole media group is the last non-empty caption
/// among its items
pub fn group_caption(items: &[MediaItem]) -> Option<&str> {
    items
        .iter()
        .rev()
        .filter_map(|item| item.caption.as_deref())
        .find(|caption| !caption.trim().is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonKind {
    /// opens an external link in the browser
    Link,
    /// opens the shop web app inside the client
    InAppView,
}

/// optional interactive button attached to a broadcast post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostButton {
    pub kind: ButtonKind,
    pub label: String,
    pub target: Url,
}

#[derive(Debug)]
pub enum ButtonTargetError {
    MissingScheme(String),
    Malformed(url::ParseError),
}

impl fmt::Display for ButtonTargetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ButtonTargetError::MissingScheme(raw) => {
                write!(f, "button target must start with http:// or https://: {}", raw)
            }
            ButtonTargetError::Malformed(e) => write!(f, "button target is not a valid URL: {}", e),
        }
    }
}

impl Error for ButtonTargetError {}

/// validates an admin-supplied button target; anything that does not start
/// with http:// or https:// is rejected
pub fn parse_button_target(raw: &str) -> Result<Url, ButtonTargetError> {
    let raw = raw.trim();
    if !raw.starts_with("http://") && !raw.starts_with("https://") {
        return Err(ButtonTargetError::MissingScheme(raw.to_string()));
    }
    Url::parse(raw).map_err(ButtonTargetError::Malformed)
}
