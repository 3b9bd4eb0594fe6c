//! Attachment classification and presentation: category by content type,
//! human-readable size, and opening via the OS link opener.

use shared::domain::Attachment;
use url::Url;

use crate::{error::AttachmentOpenError, LinkOpener};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Pdf,
    Image,
    Video,
    Audio,
    Word,
    Excel,
    PowerPoint,
    GenericDocument,
}

/// Ordered substring rules over the mime type; the first match wins and
/// everything else falls back to a generic document.
pub fn category_of(mime_type: &str) -> Category {
    let mime = mime_type.to_ascii_lowercase();
    if mime.contains("pdf") {
        Category::Pdf
    } else if mime.contains("image") {
        Category::Image
    } else if mime.contains("video") {
        Category::Video
    } else if mime.contains("audio") {
        Category::Audio
    } else if mime.contains("word") || mime.contains("officedocument.wordprocessing") {
        Category::Word
    } else if mime.contains("excel") || mime.contains("officedocument.spreadsheet") {
        Category::Excel
    } else if mime.contains("powerpoint") || mime.contains("officedocument.presentation") {
        Category::PowerPoint
    } else {
        Category::GenericDocument
    }
}

/// `"{n} B"` under 1 KiB, one-decimal KB under 1 MiB, one-decimal MB
/// above.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

/// `"{size} • {subtype}"`, e.g. `"1.5 KB • pdf"`.
pub fn describe(attachment: &Attachment) -> String {
    let subtype = attachment
        .mime_type
        .as_deref()
        .and_then(|mime| mime.split('/').nth(1))
        .filter(|subtype| !subtype.is_empty())
        .unwrap_or("file");
    format!("{} • {}", format_size(attachment.size_bytes), subtype)
}

/// An attachment resolved once at ingestion: category decided, labels
/// formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAttachment {
    pub title: String,
    pub category: Category,
    pub description: String,
    pub url: Option<String>,
}

pub fn resolve(attachment: &Attachment) -> ResolvedAttachment {
    ResolvedAttachment {
        title: attachment
            .title
            .clone()
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| "File".to_string()),
        category: attachment
            .mime_type
            .as_deref()
            .map(category_of)
            .unwrap_or(Category::GenericDocument),
        description: describe(attachment),
        url: attachment.url.clone(),
    }
}

/// Open the attachment with the OS opener. All failures are non-fatal and
/// meant for a transient user-facing alert.
pub async fn open(
    attachment: &Attachment,
    opener: &dyn LinkOpener,
) -> Result<(), AttachmentOpenError> {
    let raw = attachment
        .url
        .as_deref()
        .filter(|url| !url.is_empty())
        .ok_or(AttachmentOpenError::MissingUrl)?;
    let url = Url::parse(raw).map_err(|_| AttachmentOpenError::UnsupportedScheme)?;
    if !opener.can_open(&url).await {
        return Err(AttachmentOpenError::UnsupportedScheme);
    }
    opener
        .open(&url)
        .await
        .map_err(AttachmentOpenError::OpenFailed)
}

#[cfg(test)]
#[path = "tests/attachment_tests.rs"]
mod tests;
