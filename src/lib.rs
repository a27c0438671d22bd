pub mod config;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod models;
pub mod pipeline;

pub use config::{Config, GeminiConfig};
pub use error::{GenerationError, Result};
pub use gemini::{GeminiClient, GenerationTransport};
pub use models::{
    AspectRatio, EncodedImagePart, FormParameters, GeneratedImage, GenerationOutcome,
    GenerationRequest, GenerationResult, ImageSource, Quality, UploadedImage,
};
pub use pipeline::{FanOutExecutor, ImagePipeline, FAN_OUT, MAX_IMAGES};
