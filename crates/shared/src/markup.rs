use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A fragment of block-level markup handed to the external renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkupFragment(pub String);

impl MarkupFragment {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Per-tag text styling consumed by the renderer alongside a fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStyle {
    pub color: Option<String>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub centered: bool,
    pub font_size: Option<u8>,
}

/// Tag name -> style rules. BTreeMap keeps iteration stable for the
/// renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagStyleTable(pub BTreeMap<String, TextStyle>);

impl TagStyleTable {
    pub fn insert(&mut self, tag: impl Into<String>, style: TextStyle) {
        self.0.insert(tag.into(), style);
    }

    pub fn get(&self, tag: &str) -> Option<&TextStyle> {
        self.0.get(tag)
    }
}

/// Opaque output of the external renderer. The core only constructs the
/// plain-text degradation node itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisualTree {
    PlainText(String),
    Rendered(Vec<VisualNode>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualNode {
    pub tag: String,
    pub text: String,
    pub style: TextStyle,
}
