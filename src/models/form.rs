use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Quality {
    #[default]
    Standard,
    #[serde(rename = "2K")]
    TwoK,
    #[serde(rename = "4K")]
    FourK,
    #[serde(rename = "8K")]
    EightK,
}

impl Quality {
    pub const ALL: [Quality; 4] = [
        Quality::Standard,
        Quality::TwoK,
        Quality::FourK,
        Quality::EightK,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Standard => "Standard",
            Quality::TwoK => "2K",
            Quality::FourK => "4K",
            Quality::EightK => "8K",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        Quality::ALL
            .into_iter()
            .find(|quality| quality.as_str().to_ascii_uppercase() == normalized)
            .ok_or_else(|| format!("unknown quality tier: {}", s.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "3:4")]
    Portrait,
    #[serde(rename = "9:16")]
    Tall,
    #[serde(rename = "16:9")]
    Wide,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 4] = [
        AspectRatio::Square,
        AspectRatio::Portrait,
        AspectRatio::Tall,
        AspectRatio::Wide,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait => "3:4",
            AspectRatio::Tall => "9:16",
            AspectRatio::Wide => "16:9",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        AspectRatio::ALL
            .into_iter()
            .find(|ratio| ratio.as_str() == trimmed)
            .ok_or_else(|| format!("unsupported aspect ratio: {}", trimmed))
    }
}

/// Where an uploaded image's bytes live. Paths are read when the image is encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Bytes(Arc<[u8]>),
    Path(PathBuf),
}

/// A reference image as captured by the upload form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub source: ImageSource,
    pub mime_type: String,
}

impl UploadedImage {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        Self {
            source: ImageSource::Bytes(Arc::from(bytes)),
            mime_type: mime_type.into(),
        }
    }

    /// Media type is inferred from the file extension, falling back to
    /// `application/octet-stream`.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mime_type = mime_type_for_path(&path).to_string();
        Self {
            source: ImageSource::Path(path),
            mime_type,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }
}

pub fn mime_type_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        "heif" => "image/heif",
        _ => "application/octet-stream",
    }
}

/// Everything the upload form submits for one generation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormParameters {
    pub character: String,
    pub scene: String,
    pub quality: Quality,
    pub remove_background: bool,
    pub aspect_ratio: AspectRatio,
    pub images: Vec<UploadedImage>,
}

impl FormParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_character(mut self, character: impl Into<String>) -> Self {
        self.character = character.into();
        self
    }

    pub fn with_scene(mut self, scene: impl Into<String>) -> Self {
        self.scene = scene.into();
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_remove_background(mut self, remove_background: bool) -> Self {
        self.remove_background = remove_background;
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn with_image(mut self, image: UploadedImage) -> Self {
        self.images.push(image);
        self
    }

    pub fn with_images(mut self, images: impl IntoIterator<Item = UploadedImage>) -> Self {
        self.images.extend(images);
        self
    }

    /// Whitespace counts as a description; only empty text is missing.
    pub fn has_description(&self) -> bool {
        !self.character.is_empty() || !self.scene.is_empty()
    }
}
