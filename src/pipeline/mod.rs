pub mod builder;
pub mod encoder;
pub mod fanout;
pub mod prompt;
pub mod reducer;

use crate::{
    config::GeminiConfig,
    error::{GenerationError, Result},
    gemini::{GeminiClient, GenerationTransport},
    logger,
    models::{FormParameters, GeneratedImage, GenerationResult},
};
use std::sync::Arc;
use uuid::Uuid;

pub use fanout::{FanOutExecutor, FAN_OUT};

pub const MAX_IMAGES: usize = 5;

/// Turns one submitted form into four identity-preserving variants.
#[derive(Clone)]
pub struct ImagePipeline {
    transport: Arc<dyn GenerationTransport>,
    executor: FanOutExecutor,
}

impl ImagePipeline {
    pub fn new(transport: Arc<dyn GenerationTransport>) -> Self {
        Self {
            transport,
            executor: FanOutExecutor::default(),
        }
    }

    pub fn from_config(config: GeminiConfig) -> Result<Self> {
        let client = GeminiClient::new(config)?;
        Ok(Self::new(Arc::new(client)))
    }

    pub fn transport(&self) -> &Arc<dyn GenerationTransport> {
        &self.transport
    }

    pub async fn generate(&self, form: &FormParameters) -> Result<GenerationResult> {
        validate(form)?;

        let generation_id = Uuid::new_v4().to_string();
        let mut timer = logger::timer(&format!("generation {}", generation_id));

        log::info!(
            "🎨 Generation {}: {} reference image(s), quality {}, aspect ratio {}",
            generation_id,
            form.images.len(),
            form.quality,
            form.aspect_ratio
        );

        let (prompt, images) = match self.run(form, &generation_id).await {
            Ok(output) => output,
            Err(e) => {
                timer.fail();
                log::error!("❌ Generation {} failed: {}", generation_id, e);
                return Err(e);
            }
        };

        timer.stop();
        log::info!(
            "✅ Generation {} produced {} image(s) with {}",
            generation_id,
            images.len(),
            self.transport.model()
        );

        Ok(GenerationResult {
            generation_id,
            prompt,
            images,
        })
    }

    async fn run(
        &self,
        form: &FormParameters,
        generation_id: &str,
    ) -> Result<(String, Vec<GeneratedImage>)> {
        // 1. Encode the uploads
        let image_parts = encoder::encode_all(&form.images).await?;

        // 2. Compose the instruction
        let instruction = prompt::compose_for(form);
        log::debug!("Generation {} prompt: {}", generation_id, instruction);

        // 3. Build the shared request
        let request = Arc::new(builder::build(image_parts, instruction)?);

        // 4. Fan out and reduce each response
        let transport = self.transport.clone();
        let shared = request.clone();
        let images = self
            .executor
            .execute_fail_fast(move |_index| {
                let transport = transport.clone();
                let request = shared.clone();
                async move {
                    let response = transport.generate_content(&request).await?;
                    reducer::reduce(&response)
                }
            })
            .await?;

        Ok((request.instruction.clone(), images))
    }
}

/// Checks run before anything is read or sent.
pub fn validate(form: &FormParameters) -> Result<()> {
    if form.images.is_empty() {
        return Err(GenerationError::Validation("no images provided".into()));
    }
    if form.images.len() > MAX_IMAGES {
        return Err(GenerationError::Validation("too many images provided".into()));
    }
    if !form.has_description() {
        return Err(GenerationError::Validation(
            "no description provided".into(),
        ));
    }
    Ok(())
}
