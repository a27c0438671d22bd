pub mod client;

use crate::{
    error::Result,
    models::{GenerateContentResponse, GenerationRequest},
};
use async_trait::async_trait;

pub use client::GeminiClient;

/// One round trip to the image model. Implementations must be stateless per
/// call so the pipeline can issue several calls concurrently.
#[async_trait]
pub trait GenerationTransport: Send + Sync {
    async fn generate_content(&self, request: &GenerationRequest)
        -> Result<GenerateContentResponse>;

    fn model(&self) -> &str;
}
