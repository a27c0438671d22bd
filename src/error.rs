use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("Response error: {0}")]
    Response(String),

    #[error("No image was generated. The model may have returned only text.{}", text_suffix(.text))]
    NoImageReturned {
        text: Option<String>,
        finish_reason: Option<String>,
    },

    #[error("Internal error: {0}")]
    Internal(String),

    /// Aggregate failure of a fan-out: the first call that failed, by index.
    #[error("Generation {} of {} failed: {}", .index + 1, .total, .source)]
    FanOut {
        index: usize,
        total: usize,
        #[source]
        source: Box<GenerationError>,
    },
}

fn text_suffix(text: &Option<String>) -> String {
    match text {
        Some(text) if !text.trim().is_empty() => format!(" Model said: {}", text.trim()),
        _ => String::new(),
    }
}

impl GenerationError {
    /// The underlying per-call failure, looking through aggregate wrappers.
    pub fn root(&self) -> &GenerationError {
        match self {
            GenerationError::FanOut { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self.root(), GenerationError::Validation(_))
    }

    pub fn is_no_image(&self) -> bool {
        matches!(self.root(), GenerationError::NoImageReturned { .. })
    }

    /// Message suitable for showing next to the generate button.
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::Validation(msg) => msg.clone(),
            other => format!("Failed to generate images: {}", other),
        }
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;
