use crate::error::{GenerationError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub data: String, // Base64 encoded
}

/// Result of a single fan-out call.
pub type GenerationOutcome = Result<GeneratedImage>;

impl GeneratedImage {
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub fn bytes(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(self.data.as_bytes())
            .map_err(|e| GenerationError::Response(format!("invalid base64 image data: {}", e)))
    }

    pub fn file_extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}

/// The images of one successful `generate` call, in issue order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub generation_id: String,
    pub prompt: String,
    pub images: Vec<GeneratedImage>,
}

impl GenerationResult {
    pub fn data_uris(&self) -> Vec<String> {
        self.images.iter().map(GeneratedImage::to_data_uri).collect()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
