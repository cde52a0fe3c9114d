//! Discord-compatible embed payload types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A rich embed as accepted by Discord-style webhook endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embed {
    /// Embed title, including the event's icon glyph.
    pub title: String,
    /// Optional longer description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Accent color as a 24-bit RGB integer.
    pub color: u32,
    /// Structured fields.
    pub fields: Vec<EmbedField>,
    /// Machine-readable timestamp (the human-formatted one is a field).
    pub timestamp: DateTime<Utc>,
}

/// A single name/value field inside an embed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedField {
    /// Field label.
    pub name: String,
    /// Field content.
    pub value: String,
    /// Whether the field renders inline next to its neighbors.
    pub inline: bool,
}

impl Embed {
    /// Start an embed with a title and accent color.
    pub fn new(title: impl Into<String>, color: u32) -> Self {
        Self {
            title: title.into(),
            description: None,
            color,
            fields: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }
}
