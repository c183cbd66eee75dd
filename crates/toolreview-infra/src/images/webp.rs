//! Uploads are decoded, shrunk to the configured width and re-encoded as
//! WebP. Only the transcoded file touches the disk.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use uuid::Uuid;

use toolreview_core::ports::{ImageError, ImageStore, ImageUpload};

#[derive(Debug, Clone)]
pub struct ImageStoreConfig {
    /// Directory served under `/uploads`.
    pub root: PathBuf,
    pub max_width: u32,
    pub max_bytes: usize,
}

impl Default for ImageStoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("uploads"),
            max_width: 1200,
            max_bytes: 2 * 1024 * 1024,
        }
    }
}

impl ImageStoreConfig {
    /// Read `UPLOAD_DIR`, `IMAGE_MAX_WIDTH` and `MAX_IMAGE_BYTES`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            root: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.root),
            max_width: std::env::var("IMAGE_MAX_WIDTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_width),
            max_bytes: std::env::var("MAX_IMAGE_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_bytes),
        }
    }
}

pub struct WebpImageStore {
    config: ImageStoreConfig,
}

impl WebpImageStore {
    pub fn new(config: ImageStoreConfig) -> Self {
        Self { config }
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }
}

fn transcode(bytes: &[u8], max_width: u32) -> Result<Vec<u8>, ImageError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| ImageError::Decode(e.to_string()))?;

    let resized = if decoded.width() > max_width {
        decoded.resize(max_width, u32::MAX, FilterType::Lanczos3)
    } else {
        decoded
    };

    // The WebP encoder only takes 8-bit RGB(A).
    let rgba = DynamicImage::ImageRgba8(resized.to_rgba8());
    let mut out = Cursor::new(Vec::new());
    rgba.write_to(&mut out, ImageFormat::WebP)
        .map_err(|e| ImageError::Encode(e.to_string()))?;
    Ok(out.into_inner())
}

#[async_trait]
impl ImageStore for WebpImageStore {
    async fn store(&self, upload: ImageUpload) -> Result<String, ImageError> {
        if !upload.is_image() {
            return Err(ImageError::UnsupportedType(
                upload.content_type.unwrap_or_default(),
            ));
        }
        if upload.bytes.len() > self.config.max_bytes {
            return Err(ImageError::TooLarge {
                limit: self.config.max_bytes,
            });
        }

        let max_width = self.config.max_width;
        let encoded = tokio::task::spawn_blocking(move || transcode(&upload.bytes, max_width))
            .await
            .map_err(|e| ImageError::Encode(e.to_string()))??;

        tokio::fs::create_dir_all(&self.config.root)
            .await
            .map_err(|e| ImageError::Io(e.to_string()))?;

        let filename = format!(
            "{}-{}.webp",
            Utc::now().timestamp_millis(),
            Uuid::new_v4().simple()
        );
        tokio::fs::write(self.config.root.join(&filename), &encoded)
            .await
            .map_err(|e| ImageError::Io(e.to_string()))?;

        tracing::debug!(filename = %filename, bytes = encoded.len(), "Cover image stored");
        Ok(filename)
    }

    async fn remove(&self, filename: &str) -> Result<(), ImageError> {
        // Stored names never contain directories.
        let Some(name) = Path::new(filename).file_name() else {
            return Ok(());
        };

        match tokio::fs::remove_file(self.config.root.join(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ImageError::Io(e.to_string())),
        }
    }
}
