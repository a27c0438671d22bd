use clap::Parser;
use faceforge::{
    logger::{self, LogLevel, LoggerConfig},
    AspectRatio, Config, FormParameters, GeminiConfig, ImagePipeline, Quality, UploadedImage,
};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "faceforge",
    version,
    about = "Generate four identity-preserving variants of the given reference images"
)]
struct Args {
    #[arg(long, default_value = "")]
    character: String,
    #[arg(long, default_value = "")]
    scene: String,
    /// Standard, 2K, 4K or 8K
    #[arg(long, default_value = "Standard")]
    quality: Quality,
    /// 1:1, 3:4, 9:16 or 16:9
    #[arg(long, default_value = "1:1")]
    aspect_ratio: AspectRatio,
    #[arg(long)]
    remove_background: bool,
    /// Reference images, one per person
    #[arg(required = true)]
    images: Vec<PathBuf>,
}

impl From<Args> for FormParameters {
    fn from(args: Args) -> Self {
        FormParameters::new()
            .with_character(args.character)
            .with_scene(args.scene)
            .with_quality(args.quality)
            .with_aspect_ratio(args.aspect_ratio)
            .with_remove_background(args.remove_background)
            .with_images(args.images.into_iter().map(UploadedImage::from_path))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let form = FormParameters::from(Args::parse());

    match dotenv::dotenv() {
        Ok(_) => log::info!("✅ .env file loaded successfully"),
        Err(_) => log::warn!("⚠️  No .env file found, using system environment variables"),
    }

    let config = Config::from_env();
    logger::init_with_config(
        LoggerConfig::development().with_level(config.log_level.unwrap_or(LogLevel::Info)),
    )?;
    logger::log_config_info(&config);

    let pipeline = ImagePipeline::from_config(config.gemini.unwrap_or_else(GeminiConfig::from_env))?;

    match pipeline.generate(&form).await {
        Ok(result) => {
            for (index, image) in result.images.iter().enumerate() {
                let filename = format!("generated-image-{}.{}", index + 1, image.file_extension());
                match image.bytes().map(|bytes| fs::write(&filename, bytes)) {
                    Ok(Ok(())) => log::info!("💾 Image saved to: {}", filename),
                    Ok(Err(e)) => log::error!("❌ Failed to save {}: {}", filename, e),
                    Err(e) => log::error!("❌ Failed to decode image {}: {}", index + 1, e),
                }
            }
            log::info!("🎉 Generation {} complete", result.generation_id);
            Ok(())
        }
        Err(e) => {
            log::error!("{}", e.user_message());
            std::process::exit(1);
        }
    }
}
