//! Media probing and thumbnail rendering
//!
//! The repository treats decoding and transcoding as an external collaborator
//! behind [`MediaBackend`]. [`ImageBackend`] covers still images with the
//! `image` crate; video support is plugged in by providing another backend.

use crate::error::MediaError;
use crate::types::{ImgSize, MediaType};
use image::imageops::{self, FilterType};
use image::{ImageFormat, ImageReader, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

/// Result of probing a buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaInfo {
    pub media_type: MediaType,
    pub size: ImgSize,
    /// Only known for video
    pub duration: Option<Duration>,
}

/// Probe and thumbnail capability consumed by the content store
pub trait MediaBackend: Send + Sync {
    /// Identify a still image; `None` if the buffer is not one
    fn probe_image(&self, buffer: &[u8]) -> Option<MediaInfo>;

    /// Identify a video (rotation-corrected size); `None` if not one
    fn probe_video(&self, buffer: &[u8]) -> Option<MediaInfo>;

    /// Render a padded `box_size` square thumbnail of an image buffer
    fn image_thumbnail(&self, buffer: &[u8], dest: &Path, box_size: u32) -> Result<(), MediaError>;

    /// Grab one frame of a stored video at `seek`, scaled to `target`
    fn video_thumbnail(
        &self,
        source: &Path,
        dest: &Path,
        target: (u32, u32),
        seek: Duration,
    ) -> Result<(), MediaError>;

    /// Image probe first, video probe as fallback
    fn probe(&self, buffer: &[u8]) -> Option<MediaInfo> {
        self.probe_image(buffer).or_else(|| self.probe_video(buffer))
    }
}

/// Still-image backend built on the `image` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageBackend;

impl MediaBackend for ImageBackend {
    fn probe_image(&self, buffer: &[u8]) -> Option<MediaInfo> {
        let reader = ImageReader::new(Cursor::new(buffer))
            .with_guessed_format()
            .ok()?;
        reader.format()?;
        let (w, h) = reader.into_dimensions().ok()?;
        Some(MediaInfo {
            media_type: MediaType::Image,
            size: ImgSize::new(w as i32, h as i32),
            duration: None,
        })
    }

    fn probe_video(&self, _buffer: &[u8]) -> Option<MediaInfo> {
        None
    }

    fn image_thumbnail(&self, buffer: &[u8], dest: &Path, box_size: u32) -> Result<(), MediaError> {
        if box_size == 0 {
            return Err(MediaError::Unsupported("thumbnail box size must be positive".to_string()));
        }
        let img = image::load_from_memory(buffer)?;
        let thumb = pad_to_box(&img, box_size);
        thumb.save_with_format(dest, ImageFormat::Png)?;
        Ok(())
    }

    fn video_thumbnail(
        &self,
        source: &Path,
        _dest: &Path,
        _target: (u32, u32),
        _seek: Duration,
    ) -> Result<(), MediaError> {
        Err(MediaError::Unsupported(format!(
            "no video decoder available for {:?}",
            source
        )))
    }
}

/// Resize into a `box_size` square, centred on a transparent white background
pub fn pad_to_box(img: &image::DynamicImage, box_size: u32) -> RgbaImage {
    let resized = img.resize(box_size, box_size, FilterType::Lanczos3).to_rgba8();
    let mut canvas = RgbaImage::from_pixel(box_size, box_size, Rgba([255, 255, 255, 0]));
    let x = box_size.saturating_sub(resized.width()) / 2;
    let y = box_size.saturating_sub(resized.height()) / 2;
    imageops::overlay(&mut canvas, &resized, x as i64, y as i64);
    canvas
}

/// Largest size with the same aspect ratio fitting a `max` square
///
/// Unknown or degenerate sizes map to the full box.
pub fn fit_within(size: ImgSize, max: u32) -> (u32, u32) {
    if size.x <= 0 || size.y <= 0 {
        return (max, max);
    }
    let (x, y) = (size.x as f64, size.y as f64);
    if x > y {
        (max, ((max as f64 * y / x) as u32).max(1))
    } else {
        (((max as f64 * x / y) as u32).max(1), max)
    }
}

/// Frame offset for a video thumbnail: `limit` if the clip is longer, else the start
pub fn video_seek(duration: Option<Duration>, limit: Duration) -> Duration {
    match duration {
        Some(d) if d > limit => limit,
        _ => Duration::ZERO,
    }
}
