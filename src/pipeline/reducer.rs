use crate::{
    error::GenerationError,
    models::{GenerateContentResponse, GeneratedImage, GenerationOutcome},
};

/// Takes the first part carrying inline image data. Text-only responses become
/// `NoImageReturned`, keeping whatever the model said.
pub fn reduce(response: &GenerateContentResponse) -> GenerationOutcome {
    let image = response
        .parts()
        .filter_map(|part| part.inline_data.as_ref())
        .find(|inline| !inline.data.is_empty());

    if let Some(inline) = image {
        return Ok(GeneratedImage {
            mime_type: inline.mime_type.clone(),
            data: inline.data.clone(),
        });
    }

    let text: Vec<&str> = response
        .parts()
        .filter_map(|part| part.text.as_deref())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect();

    Err(GenerationError::NoImageReturned {
        text: (!text.is_empty()).then(|| text.join(" ")),
        finish_reason: response
            .finish_reason()
            .or_else(|| response.block_reason())
            .map(str::to_string),
    })
}
