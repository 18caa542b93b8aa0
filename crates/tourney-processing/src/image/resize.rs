//! Contain-fit resize to PNG

use std::io::Cursor;
use std::path::Path;
use std::time::Instant;

use ::image::imageops::FilterType;
use ::image::{GenericImageView, ImageFormat, ImageReader};
use bytes::Bytes;

#[derive(Debug, thiserror::Error)]
pub enum ResizeError {
    #[error("Resize width must be greater than zero")]
    InvalidWidth,

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Image I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Resize task failed: {0}")]
    Task(String),
}

/// Output size for a contain-fit into `max_width`.
///
/// Wider sources are scaled down to exactly `max_width` with the height rounded
/// to keep the aspect ratio (never below 1px). Sources that already fit are left alone.
pub fn target_dimensions(src_width: u32, src_height: u32, max_width: u32) -> (u32, u32) {
    if src_width == 0 || src_height == 0 || src_width <= max_width {
        return (src_width, src_height);
    }
    let ratio = max_width as f64 / src_width as f64;
    let height = (src_height as f64 * ratio).round().max(1.0) as u32;
    (max_width, height)
}

pub struct ImageResizer;

impl ImageResizer {
    /// Decode `data`, contain-fit it into `width` and encode PNG.
    pub fn resize_bytes(data: &[u8], width: u32) -> Result<Bytes, ResizeError> {
        if width == 0 {
            return Err(ResizeError::InvalidWidth);
        }

        let img = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ResizeError::Decode(e.to_string()))?
            .decode()
            .map_err(|e| ResizeError::Decode(e.to_string()))?;

        let (src_width, src_height) = img.dimensions();
        let (dst_width, dst_height) = target_dimensions(src_width, src_height, width);
        let resized = if (dst_width, dst_height) == (src_width, src_height) {
            img
        } else {
            img.resize_exact(dst_width, dst_height, FilterType::Lanczos3)
        };

        let mut buffer = Vec::new();
        resized
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| ResizeError::Encode(e.to_string()))?;

        Ok(Bytes::from(buffer))
    }

    /// Resize the image at `source` to `width` as PNG.
    ///
    /// Writes to `destination` (creating its parent directory) and returns `None`,
    /// or returns the encoded bytes when no destination is given.
    pub async fn resize(
        source: &Path,
        width: u32,
        destination: Option<&Path>,
    ) -> Result<Option<Bytes>, ResizeError> {
        if width == 0 {
            return Err(ResizeError::InvalidWidth);
        }

        let start = Instant::now();
        let data = tokio::fs::read(source).await?;
        let input_bytes = data.len();

        // Decode/encode is CPU-bound; run off the async pool.
        let encoded = tokio::task::spawn_blocking(move || Self::resize_bytes(&data, width))
            .await
            .map_err(|e| ResizeError::Task(e.to_string()))??;

        tracing::debug!(
            source = %source.display(),
            width = width,
            input_bytes = input_bytes,
            output_bytes = encoded.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Image resized"
        );

        match destination {
            Some(destination) => {
                if let Some(parent) = destination.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(destination, &encoded).await?;
                Ok(None)
            }
            None => Ok(Some(encoded)),
        }
    }
}
