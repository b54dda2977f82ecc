use crate::link::MediaType;
use serde::{Deserialize, Serialize};

/// What the source provider says about the linked item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub image: String,
    /// Preview clip, not every media type exposes one
    #[serde(rename = "audio", default, skip_serializing_if = "Option::is_none")]
    pub audio_preview: Option<String>,
}

/// Open Graph fields found in a page head. Every field is optional here;
/// fetchers decide which ones are required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMeta {
    pub title: Option<String>,
    pub description: Option<String>,
    pub og_type: Option<String>,
    pub image: Option<String>,
    pub audio: Option<String>,
    pub canonical_url: Option<String>,
}

impl PageMeta {
    /// Describe which fields are present (for logging)
    pub fn describe_fields(&self) -> String {
        let mut fields = Vec::new();
        if self.title.is_some() { fields.push("title"); }
        if self.description.is_some() { fields.push("description"); }
        if self.og_type.is_some() { fields.push("type"); }
        if self.image.is_some() { fields.push("image"); }
        if self.audio.is_some() { fields.push("audio"); }
        if self.canonical_url.is_some() { fields.push("canonical_url"); }
        fields.join(",")
    }
}
