use crate::{
    error::{GenerationError, Result},
    models::{EncodedImagePart, GenerationRequest},
};

pub fn build(image_parts: Vec<EncodedImagePart>, instruction: String) -> Result<GenerationRequest> {
    // Validation upstream guarantees at least one image.
    if image_parts.is_empty() {
        return Err(GenerationError::Internal(
            "generation request built without image parts".into(),
        ));
    }

    Ok(GenerationRequest {
        image_parts,
        instruction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_keeps_part_order() {
        let parts = vec![
            EncodedImagePart {
                mime_type: "image/png".into(),
                data: "AA==".into(),
            },
            EncodedImagePart {
                mime_type: "image/jpeg".into(),
                data: "BB==".into(),
            },
        ];

        let request = build(parts.clone(), "do it".into()).unwrap();
        assert_eq!(request.image_parts, parts);
        assert_eq!(request.instruction, "do it");
        assert_eq!(request.image_count(), 2);
    }

    #[test]
    fn test_build_rejects_empty_parts() {
        assert!(matches!(
            build(Vec::new(), "do it".into()),
            Err(GenerationError::Internal(_))
        ));
    }
}
