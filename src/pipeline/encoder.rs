use crate::{
    error::{GenerationError, Result},
    models::{EncodedImagePart, ImageSource, UploadedImage},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::try_join_all;

pub async fn encode(image: &UploadedImage) -> Result<EncodedImagePart> {
    let data = match &image.source {
        ImageSource::Bytes(bytes) => STANDARD.encode(bytes),
        ImageSource::Path(path) => {
            let bytes = tokio::fs::read(path).await.map_err(|e| {
                GenerationError::Encoding(format!("failed to read {}: {}", path.display(), e))
            })?;
            STANDARD.encode(bytes)
        }
    };

    Ok(EncodedImagePart {
        mime_type: image.mime_type.clone(),
        data,
    })
}

/// Encodes every image concurrently; output order matches input order.
pub async fn encode_all(images: &[UploadedImage]) -> Result<Vec<EncodedImagePart>> {
    try_join_all(images.iter().map(encode)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_encode_bytes_keeps_content_and_type() {
        let image = UploadedImage::from_bytes(vec![0u8, 1, 2, 254, 255], "image/png");
        let part = encode(&image).await.unwrap();

        assert_eq!(part.mime_type, "image/png");
        assert_eq!(part.data, "AAEC/v8=");
        assert_eq!(STANDARD.decode(&part.data).unwrap(), vec![0u8, 1, 2, 254, 255]);
    }

    #[tokio::test]
    async fn test_encode_path() {
        let path = std::env::temp_dir().join(format!("faceforge-{}.jpg", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, b"jpeg bytes").await.unwrap();

        let part = encode(&UploadedImage::from_path(&path)).await;
        let _ = tokio::fs::remove_file(&path).await;

        let part = part.unwrap();
        assert_eq!(part.mime_type, "image/jpeg");
        assert_eq!(STANDARD.decode(&part.data).unwrap(), b"jpeg bytes");
    }

    #[tokio::test]
    async fn test_unreadable_path_is_encoding_error() {
        let image = UploadedImage::from_path(PathBuf::from("/definitely/not/here.png"));
        let err = encode(&image).await.unwrap_err();
        assert!(matches!(err, GenerationError::Encoding(_)));
    }

    #[tokio::test]
    async fn test_encode_all_preserves_order() {
        let images = vec![
            UploadedImage::from_bytes(b"first".to_vec(), "image/png"),
            UploadedImage::from_bytes(b"second".to_vec(), "image/webp"),
            UploadedImage::from_bytes(b"third".to_vec(), "image/jpeg"),
        ];

        let parts = encode_all(&images).await.unwrap();
        let types: Vec<&str> = parts.iter().map(|p| p.mime_type.as_str()).collect();
        assert_eq!(types, vec!["image/png", "image/webp", "image/jpeg"]);
        assert_eq!(STANDARD.decode(&parts[1].data).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_encode_all_fails_on_any_unreadable() {
        let images = vec![
            UploadedImage::from_bytes(b"ok".to_vec(), "image/png"),
            UploadedImage::from_path("/definitely/not/here.png"),
        ];
        assert!(matches!(
            encode_all(&images).await,
            Err(GenerationError::Encoding(_))
        ));
    }
}
