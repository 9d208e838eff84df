use thiserror::Error;

/// Failures that can occur inside the engine.
///
/// None of these reach the public pause/resume/destroy surface; callers log
/// them and keep the placeholder or fallback path.
#[derive(Debug, Error)]
pub enum HeroError {
    #[error("invalid color value `{0}`")]
    InvalidColor(String),
    #[error("invalid options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },
    #[error("glTF decode failed: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("glTF asset has no scene")]
    EmptyScene,
    #[error("glTF buffer {0} is not embedded in the binary chunk")]
    ExternalBuffer(usize),
    #[error("glTF image {0} has no embedded data")]
    ImageData(usize),
    #[error("glTF requires unsupported extension `{0}`")]
    UnsupportedExtension(String),
    #[error("environment map decode failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("render failed: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, HeroError>;
