//! Content sniffing
//!
//! Determines the real type of a staged file from its leading bytes. Client
//! supplied filenames and `Content-Type` headers are never consulted here.

use std::path::Path;

use tokio::io::AsyncReadExt;
use tourney_core::constants::SNIFF_PREFIX_BYTES;

/// Type detected from a file's magic number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SniffedType {
    Jpeg,
    Png,
    Gif,
    Tiff,
    Webp,
    Bmp,
    /// Recognised, but not an image format the pipeline knows about
    Other(String),
    Unknown,
}

impl SniffedType {
    fn from_mime(mime: &str) -> Self {
        match mime {
            "image/jpeg" => SniffedType::Jpeg,
            "image/png" => SniffedType::Png,
            "image/gif" => SniffedType::Gif,
            "image/tiff" => SniffedType::Tiff,
            "image/webp" => SniffedType::Webp,
            "image/bmp" => SniffedType::Bmp,
            other => SniffedType::Other(other.to_string()),
        }
    }

    /// Extensions a file of this type may legitimately carry
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            SniffedType::Jpeg => &["jpg", "jpeg"],
            SniffedType::Png => &["png"],
            SniffedType::Gif => &["gif"],
            SniffedType::Tiff => &["tif", "tiff"],
            SniffedType::Webp => &["webp"],
            SniffedType::Bmp => &["bmp"],
            SniffedType::Other(_) | SniffedType::Unknown => &[],
        }
    }

    pub fn mime_type(&self) -> Option<&str> {
        match self {
            SniffedType::Jpeg => Some("image/jpeg"),
            SniffedType::Png => Some("image/png"),
            SniffedType::Gif => Some("image/gif"),
            SniffedType::Tiff => Some("image/tiff"),
            SniffedType::Webp => Some("image/webp"),
            SniffedType::Bmp => Some("image/bmp"),
            SniffedType::Other(mime) => Some(mime.as_str()),
            SniffedType::Unknown => None,
        }
    }

    pub fn is_image(&self) -> bool {
        match self {
            SniffedType::Other(mime) => mime.starts_with("image/"),
            SniffedType::Unknown => false,
            _ => true,
        }
    }
}

impl std::fmt::Display for SniffedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mime_type().unwrap_or("unknown"))
    }
}

/// Classify an in-memory prefix.
pub fn sniff_bytes(bytes: &[u8]) -> SniffedType {
    infer::get(bytes)
        .map(|kind| SniffedType::from_mime(kind.mime_type()))
        .unwrap_or(SniffedType::Unknown)
}

/// Read at most [`SNIFF_PREFIX_BYTES`] from `path` and classify them.
pub async fn sniff(path: &Path) -> std::io::Result<SniffedType> {
    let file = tokio::fs::File::open(path).await?;
    let mut prefix = Vec::with_capacity(SNIFF_PREFIX_BYTES);
    file.take(SNIFF_PREFIX_BYTES as u64)
        .read_to_end(&mut prefix)
        .await?;

    let sniffed = sniff_bytes(&prefix);
    tracing::debug!(
        path = %path.display(),
        prefix_bytes = prefix.len(),
        detected = %sniffed,
        "Sniffed file content"
    );
    Ok(sniffed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];

    #[test]
    fn test_sniff_known_image_signatures() {
        assert_eq!(sniff_bytes(PNG_MAGIC), SniffedType::Png);
        assert_eq!(sniff_bytes(JPEG_MAGIC), SniffedType::Jpeg);
        assert_eq!(sniff_bytes(b"GIF89a\x01\x00\x01\x00"), SniffedType::Gif);
        assert_eq!(
            sniff_bytes(&[0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00]),
            SniffedType::Tiff
        );
    }

    #[test]
    fn test_sniff_plain_text_is_unknown() {
        assert_eq!(sniff_bytes(b"just some text, not an image"), SniffedType::Unknown);
        assert_eq!(sniff_bytes(&[]), SniffedType::Unknown);
    }

    #[test]
    fn test_sniff_non_image_format_is_other() {
        let sniffed = sniff_bytes(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        assert_eq!(sniffed, SniffedType::Other("application/pdf".to_string()));
        assert!(!sniffed.is_image());
        assert!(sniffed.extensions().is_empty());
    }

    #[test]
    fn test_extensions_and_mime() {
        assert_eq!(SniffedType::Jpeg.extensions(), &["jpg", "jpeg"]);
        assert_eq!(SniffedType::Tiff.mime_type(), Some("image/tiff"));
        assert_eq!(SniffedType::Unknown.mime_type(), None);
    }

    #[tokio::test]
    async fn test_sniff_ignores_extension() {
        let dir = tempdir().unwrap();
        let fake = dir.path().join("england.jpg");
        tokio::fs::write(&fake, b"this is not a jpeg").await.unwrap();
        assert_eq!(sniff(&fake).await.unwrap(), SniffedType::Unknown);

        let real = dir.path().join("flag.txt");
        tokio::fs::write(&real, PNG_MAGIC).await.unwrap();
        assert_eq!(sniff(&real).await.unwrap(), SniffedType::Png);
    }

    #[tokio::test]
    async fn test_sniff_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        assert!(sniff(&dir.path().join("missing.png")).await.is_err());
    }
}
