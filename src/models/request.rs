use serde::{Deserialize, Serialize};

/// Base64 payload of one uploaded image, tagged with its media type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedImagePart {
    pub mime_type: String,
    pub data: String,
}

/// The payload every fan-out call sends: image parts in upload order, then the
/// instruction as the trailing text part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub image_parts: Vec<EncodedImagePart>,
    pub instruction: String,
}

impl GenerationRequest {
    pub fn image_count(&self) -> usize {
        self.image_parts.len()
    }
}
