//! Cover image storage port.

use async_trait::async_trait;

/// An image file received with a post submission.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub original_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|mime| mime.starts_with("image/"))
    }
}

/// Transcodes uploads into web-friendly assets and stores only the result.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store a transcoded copy of `upload`; returns the derived filename.
    async fn store(&self, upload: ImageUpload) -> Result<String, ImageError>;

    /// Remove a stored asset. Missing files are not an error.
    async fn remove(&self, filename: &str) -> Result<(), ImageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("Only image files are allowed (got {0})")]
    UnsupportedType(String),

    #[error("Image exceeds the {limit} byte limit")]
    TooLarge { limit: usize },

    #[error("Could not decode image: {0}")]
    Decode(String),

    #[error("Could not encode image: {0}")]
    Encode(String),

    #[error("Image storage failed: {0}")]
    Io(String),
}
