//! Builds the edit instruction sent alongside the reference images.
//!
//! The instruction is an ordered list of clauses. Each [`ClauseRule`] looks at the
//! [`PromptContext`] and contributes at most one clause; present clauses are joined
//! with single spaces in the fixed order of [`RULES`].

use crate::models::{AspectRatio, FormParameters, Quality};

pub const SINGLE_IDENTITY_CLAUSE: &str = "Crucial instruction: You MUST preserve the facial identity of the character from the uploaded image. Pay close attention to the shape of the eyes, nose, mouth, and jawline to ensure the person is instantly recognizable. Adapt the angle and lighting of the face to match the new scene and character pose naturally. Only modify the rest of the image based on the following descriptions.";

pub const MULTI_IDENTITY_CLAUSE: &str = "Crucial instruction: The user has uploaded multiple images, each featuring a distinct character. In the generated scene, you MUST preserve the unique facial identity of each individual character as shown in their respective source images. Pay close attention to the shape of their eyes, nose, mouth, and jawline to ensure they are instantly recognizable. Do not merge their features. Adapt their angles and lighting to match the new scene and poses naturally. Only modify the rest of the image based on the following descriptions.";

pub const REMOVE_BACKGROUND_CLAUSE: &str = "Remove the background.";

/// The fields of a form that influence the instruction. Image bytes never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptContext<'a> {
    pub image_count: usize,
    pub remove_background: bool,
    pub character: &'a str,
    pub scene: &'a str,
    pub aspect_ratio: AspectRatio,
    pub quality: Quality,
}

impl<'a> From<&'a FormParameters> for PromptContext<'a> {
    fn from(form: &'a FormParameters) -> Self {
        Self {
            image_count: form.images.len(),
            remove_background: form.remove_background,
            character: &form.character,
            scene: &form.scene,
            aspect_ratio: form.aspect_ratio,
            quality: form.quality,
        }
    }
}

pub type ClauseRule = for<'a, 'b> fn(&'a PromptContext<'b>) -> Option<String>;

pub const RULES: [ClauseRule; 6] = [
    identity_clause,
    background_clause,
    character_clause,
    scene_clause,
    aspect_ratio_clause,
    quality_clause,
];

pub fn identity_clause(ctx: &PromptContext<'_>) -> Option<String> {
    if ctx.image_count > 1 {
        Some(MULTI_IDENTITY_CLAUSE.to_string())
    } else {
        Some(SINGLE_IDENTITY_CLAUSE.to_string())
    }
}

pub fn background_clause(ctx: &PromptContext<'_>) -> Option<String> {
    ctx.remove_background
        .then(|| REMOVE_BACKGROUND_CLAUSE.to_string())
}

pub fn character_clause(ctx: &PromptContext<'_>) -> Option<String> {
    (!ctx.character.is_empty()).then(|| format!("Character description: {}.", ctx.character))
}

pub fn scene_clause(ctx: &PromptContext<'_>) -> Option<String> {
    (!ctx.scene.is_empty()).then(|| format!("Scene, environment: {}.", ctx.scene))
}

pub fn aspect_ratio_clause(ctx: &PromptContext<'_>) -> Option<String> {
    Some(format!(
        "The final image should have an aspect ratio of {}.",
        ctx.aspect_ratio
    ))
}

pub fn quality_clause(ctx: &PromptContext<'_>) -> Option<String> {
    quality_directive(ctx.quality).map(str::to_string)
}

pub fn quality_directive(quality: Quality) -> Option<&'static str> {
    match quality {
        Quality::Standard => None,
        Quality::TwoK => Some(
            "The final image should be very high quality and highly detailed, suitable for 2K resolution.",
        ),
        Quality::FourK => Some(
            "The final image should be extremely high quality with ultra-fine details, suitable for 4K resolution.",
        ),
        Quality::EightK => Some(
            "The final image should be of the highest possible photorealistic quality and detail, as if shot on a high-end camera, suitable for 8K resolution.",
        ),
    }
}

pub fn compose(ctx: &PromptContext<'_>) -> String {
    RULES
        .iter()
        .filter_map(|rule| rule(ctx))
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

pub fn compose_for(form: &FormParameters) -> String {
    compose(&PromptContext::from(form))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UploadedImage;

    fn ctx<'a>() -> PromptContext<'a> {
        PromptContext {
            image_count: 1,
            remove_background: false,
            character: "a knight",
            scene: "",
            aspect_ratio: AspectRatio::Square,
            quality: Quality::Standard,
        }
    }

    #[test]
    fn test_compose_is_deterministic() {
        let form = FormParameters::new()
            .with_character("an astronaut")
            .with_scene("the moon")
            .with_quality(Quality::FourK)
            .with_image(UploadedImage::from_bytes(vec![1], "image/png"));

        assert_eq!(compose_for(&form), compose_for(&form.clone()));
    }

    #[test]
    fn test_background_clause_presence() {
        let without = compose(&ctx());
        assert!(!without.contains(REMOVE_BACKGROUND_CLAUSE));

        let with = compose(&PromptContext {
            remove_background: true,
            ..ctx()
        });
        assert!(with.contains(REMOVE_BACKGROUND_CLAUSE));
    }

    #[test]
    fn test_identity_clause_depends_on_image_count() {
        let single = compose(&ctx());
        let multi = compose(&PromptContext {
            image_count: 3,
            ..ctx()
        });

        assert!(single.starts_with(SINGLE_IDENTITY_CLAUSE));
        assert!(multi.starts_with(MULTI_IDENTITY_CLAUSE));
        assert!(multi.contains("Do not merge their features."));
        assert_ne!(SINGLE_IDENTITY_CLAUSE, MULTI_IDENTITY_CLAUSE);
        assert!(!single.contains(MULTI_IDENTITY_CLAUSE));
    }

    #[test]
    fn test_quality_clause_mapping() {
        assert_eq!(quality_clause(&ctx()), None);

        let mut seen = Vec::new();
        for (quality, token) in [
            (Quality::TwoK, "2K"),
            (Quality::FourK, "4K"),
            (Quality::EightK, "8K"),
        ] {
            let clause = quality_clause(&PromptContext { quality, ..ctx() }).unwrap();
            assert!(!clause.is_empty());
            assert!(clause.contains(token));
            assert!(!seen.contains(&clause));
            seen.push(clause);
        }
    }

    #[test]
    fn test_clause_order() {
        let prompt = compose(&PromptContext {
            image_count: 2,
            remove_background: true,
            character: "a knight",
            scene: "a misty forest",
            aspect_ratio: AspectRatio::Wide,
            quality: Quality::TwoK,
        });

        let positions: Vec<usize> = [
            MULTI_IDENTITY_CLAUSE,
            REMOVE_BACKGROUND_CLAUSE,
            "Character description: a knight.",
            "Scene, environment: a misty forest.",
            "aspect ratio of 16:9.",
            "suitable for 2K resolution.",
        ]
        .iter()
        .map(|needle| prompt.find(needle).unwrap())
        .collect();

        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
        assert!(prompt.ends_with("suitable for 2K resolution."));
    }

    #[test]
    fn test_empty_descriptions_are_skipped() {
        let prompt = compose(&PromptContext {
            character: "",
            scene: "a beach",
            ..ctx()
        });

        assert!(!prompt.contains("Character description"));
        assert!(prompt.contains("Scene, environment: a beach."));
        assert_eq!(prompt, prompt.trim());
    }

    #[test]
    fn test_descriptions_are_inserted_verbatim() {
        let prompt = compose(&PromptContext {
            character: "  a knight  ",
            scene: "   ",
            ..ctx()
        });

        assert!(prompt.contains("Character description:   a knight  ."));
        assert!(prompt.contains("Scene, environment:    ."));
    }
}
