//! Pure transforms from raw messages to renderable form: content
//! filtering, system-message structuring, and canned templates.
//!
//! Message kind and attachment categories are resolved once at ingestion
//! ([`present`]); screens render the resulting tagged value without
//! re-inspecting raw shapes.

use std::{borrow::Cow, sync::LazyLock};

use regex::Regex;
use shared::{
    domain::{Message, MessageId, MessageKind, TemplateId, UserId},
    markup::{MarkupFragment, TagStyleTable, TextStyle, VisualTree},
};
use tracing::warn;

use crate::{attachment, MarkupRenderer, ResolvedAttachment};

/// Fixed token substituted for every email-like span.
pub const REDACTION_TOKEN: &str = "[EMAIL HIDDEN]";

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[a-z0-9._-]+@[a-z0-9._-]+\.[a-z0-9_-]+")
        .expect("email pattern is a valid regex")
});

/// Replace every email-like substring with [`REDACTION_TOKEN`]. Returns
/// the input borrowed (no allocation) when nothing matches. Idempotent:
/// the token itself contains no email shape.
pub fn filter_text(text: &str) -> Cow<'_, str> {
    EMAIL_PATTERN.replace_all(text, REDACTION_TOKEN)
}

/// Wrap bare system text in a paragraph so the renderer always receives
/// block-level markup; text that already looks like markup passes through.
pub fn system_fragment(text: &str) -> MarkupFragment {
    let trimmed = text.trim();
    if trimmed.starts_with('<') && trimmed.contains('>') {
        MarkupFragment(text.to_string())
    } else {
        MarkupFragment(format!("<p>{text}</p>"))
    }
}

static SYSTEM_STYLES: LazyLock<TagStyleTable> = LazyLock::new(|| {
    let muted = TextStyle {
        color: Some("#7A7A7A".to_string()),
        italic: true,
        centered: true,
        font_size: Some(14),
        ..TextStyle::default()
    };
    let mut table = TagStyleTable::default();
    table.insert("body", muted.clone());
    table.insert("p", muted);
    table.insert(
        "a",
        TextStyle {
            color: Some("#0E71EB".to_string()),
            underline: true,
            ..TextStyle::default()
        },
    );
    let bold = TextStyle {
        bold: true,
        ..TextStyle::default()
    };
    table.insert("b", bold.clone());
    table.insert("strong", bold);
    let italic = TextStyle {
        italic: true,
        ..TextStyle::default()
    };
    table.insert("i", italic.clone());
    table.insert("em", italic);
    table
});

/// Fixed per-tag style rules for system messages.
pub fn system_styles() -> &'static TagStyleTable {
    &SYSTEM_STYLES
}

/// Render a system message, degrading to plain text when the renderer
/// rejects the markup. Never returns an error to the caller.
pub fn render_system(renderer: &dyn MarkupRenderer, text: &str) -> VisualTree {
    let fragment = system_fragment(text);
    match renderer.render(&fragment, system_styles()) {
        Ok(tree) => tree,
        Err(err) => {
            warn!(error = %err, "system message render degraded to plain text");
            VisualTree::PlainText(text.to_string())
        }
    }
}

/// Canonical template text for a symbolic key; unknown keys produce no
/// outgoing text.
pub fn apply_template(key: &str) -> Option<&'static str> {
    TemplateId::from_key(key).map(TemplateId::canonical_text)
}

/// A message resolved for rendering: kind decided, text filtered,
/// attachments categorized.
#[derive(Debug, Clone)]
pub enum RenderableMessage {
    Regular {
        id: MessageId,
        sender_id: UserId,
        text: String,
        attachments: Vec<ResolvedAttachment>,
    },
    System {
        id: MessageId,
        fragment: MarkupFragment,
    },
}

/// Resolve a raw message once at ingestion. The original message is never
/// mutated; regular text is filtered, system text is structured.
pub fn present(message: &Message) -> RenderableMessage {
    match message.kind {
        MessageKind::Regular => RenderableMessage::Regular {
            id: message.id.clone(),
            sender_id: message.sender_id.clone(),
            text: filter_text(&message.text).into_owned(),
            attachments: message.attachments.iter().map(attachment::resolve).collect(),
        },
        MessageKind::System => RenderableMessage::System {
            id: message.id.clone(),
            fragment: system_fragment(&message.text),
        },
    }
}

#[cfg(test)]
#[path = "tests/pipeline_tests.rs"]
mod tests;
