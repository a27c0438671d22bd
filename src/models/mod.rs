pub mod form;
pub mod gemini;
pub mod image;
pub mod request;

pub use form::*;
pub use gemini::{GenerateContentRequest, GenerateContentResponse};
pub use image::*;
pub use request::*;
