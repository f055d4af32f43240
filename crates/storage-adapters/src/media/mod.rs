//! # Local media store
//!
//! Content-addressed storage of uploaded images under a root directory.
//! Files land at `ab/cd/<sha256>.<ext>`, so identical uploads share one file.
//! Images are decoded before they are accepted, downscaled to fit
//! [`MAX_WIDTH`]x[`MAX_HEIGHT`], and PNGs are losslessly optimized.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use domains::ports::{MediaStorage, Upload};
use domains::{DomainError, Result};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

pub const MAX_WIDTH: u32 = 1920;
pub const MAX_HEIGHT: u32 = 1080;

pub struct LocalMediaStore {
    /// Root directory for all uploads (e.g. "./uploads").
    root: PathBuf,
    /// Public URL prefix the root is served under (e.g. "/uploads").
    url_prefix: String,
    max_bytes: usize,
}

/// An image ready to be written.
#[derive(Debug)]
struct Processed {
    data: Vec<u8>,
    extension: &'static str,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
            max_bytes,
        }
    }

    /// `ab/cd/<hash>.<ext>`, relative to the root.
    fn relative_path(hash: &str, extension: &str) -> String {
        format!("{}/{}/{hash}.{extension}", &hash[0..2], &hash[2..4])
    }
}

fn process(data: Bytes) -> Result<Processed> {
    let reader = ImageReader::new(Cursor::new(data.as_ref()))
        .with_guessed_format()
        .map_err(DomainError::internal)?;
    let (format, extension) = match reader.format() {
        Some(ImageFormat::Jpeg) => (ImageFormat::Jpeg, "jpg"),
        Some(ImageFormat::Png) => (ImageFormat::Png, "png"),
        Some(ImageFormat::WebP) => (ImageFormat::WebP, "webp"),
        _ => return Err(DomainError::validation("Invalid image type")),
    };
    let img = reader
        .decode()
        .map_err(|_| DomainError::validation("Invalid image file"))?;

    let mut encoded = if img.width() > MAX_WIDTH || img.height() > MAX_HEIGHT {
        let resized = img.resize(MAX_WIDTH, MAX_HEIGHT, FilterType::Lanczos3);
        debug!(
            from = ?(img.width(), img.height()),
            to = ?(resized.width(), resized.height()),
            "downscaled upload"
        );
        encode(resized, format)?
    } else {
        data.to_vec()
    };

    if format == ImageFormat::Png {
        match oxipng::optimize_from_memory(&encoded, &oxipng::Options::from_preset(2)) {
            Ok(optimized) if optimized.len() < encoded.len() => encoded = optimized,
            Ok(_) => {}
            Err(err) => warn!(error = %err, "png optimization failed, storing as is"),
        }
    }

    Ok(Processed {
        data: encoded,
        extension,
    })
}

/// Writes into a sibling temp file and renames it over `target`, so readers
/// and the dedup check only ever see complete files.
async fn write_atomically(target: &Path, data: &[u8]) -> std::io::Result<()> {
    let temp = target.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
    if let Err(err) = fs::write(&temp, data).await {
        let _ = fs::remove_file(&temp).await;
        return Err(err);
    }
    if let Err(err) = fs::rename(&temp, target).await {
        let _ = fs::remove_file(&temp).await;
        return Err(err);
    }
    Ok(())
}

fn encode(img: DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    // JPEG has no alpha channel.
    let img = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()),
        _ => img,
    };
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).map_err(DomainError::internal)?;
    Ok(out.into_inner())
}

#[async_trait]
impl MediaStorage for LocalMediaStore {
    async fn save_image(&self, upload: Upload) -> Result<String> {
        if upload.data.len() > self.max_bytes {
            return Err(DomainError::validation(format!(
                "Image exceeds {} bytes",
                self.max_bytes
            )));
        }

        // Decoding and optimization are CPU bound.
        let processed = tokio::task::spawn_blocking(move || process(upload.data))
            .await
            .map_err(DomainError::internal)??;

        let hash = hex::encode(Sha256::digest(&processed.data));
        let relative = Self::relative_path(&hash, processed.extension);
        let target = self.root.join(&relative);

        if fs::try_exists(&target).await.map_err(DomainError::internal)? {
            debug!(%relative, "upload deduplicated");
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(DomainError::internal)?;
            }
            write_atomically(&target, &processed.data)
                .await
                .map_err(DomainError::internal)?;
            debug!(%relative, bytes = processed.data.len(), "upload stored");
        }

        Ok(format!("{}/{relative}", self.url_prefix))
    }
}
