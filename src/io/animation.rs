//! GIF export of the layer-by-layer build of an item

use crate::io::configuration::{GifConfig, VIEWER_MIN_FRAME_DELAY_MS};
use crate::io::error::{GenerationError, Result, file_system};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use std::path::Path;

/// Writes captured canvas snapshots as an animated GIF
#[derive(Debug, Clone, Copy)]
pub struct GifExporter {
    delay_ms: u32,
    repeat: Repeat,
    speed: i32,
}

/// Encoder speed for a 1-100 quality setting; 100 maps to the slowest, best encoder
pub fn encoder_speed(quality: u8) -> i32 {
    let quality = i32::from(quality.clamp(1, 100));
    30 - (quality - 1) * 29 / 99
}

/// Loop behaviour for a repeat setting: 0 loops forever, negative plays once
pub fn repeat_mode(repeat: i32) -> Repeat {
    match repeat {
        0 => Repeat::Infinite,
        n if n < 0 => Repeat::Finite(0),
        n => Repeat::Finite(u16::try_from(n).unwrap_or(u16::MAX)),
    }
}

impl GifExporter {
    /// Create an exporter from the run's GIF settings
    pub fn from_config(gif: &GifConfig) -> Self {
        Self {
            delay_ms: gif.delay.max(VIEWER_MIN_FRAME_DELAY_MS),
            repeat: repeat_mode(gif.repeat),
            speed: encoder_speed(gif.quality),
        }
    }

    /// Frame delay after clamping to what viewers support
    pub const fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    /// Encode `frames` in order to `output_path`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No frames were captured
    /// - File system operations fail
    /// - GIF encoding fails
    pub fn export(&self, frames: &[RgbaImage], output_path: &Path) -> Result<()> {
        if frames.is_empty() {
            return Err(GenerationError::InvalidParameter {
                parameter: "frames",
                value: output_path.display().to_string(),
                reason: "no frames captured for animation".to_string(),
            });
        }

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent).map_err(file_system(parent, "create directory"))?;
        }

        let file =
            std::fs::File::create(output_path).map_err(file_system(output_path, "create file"))?;
        let export_error = |source: image::ImageError| GenerationError::ImageExport {
            path: output_path.to_path_buf(),
            source,
        };

        let mut encoder = GifEncoder::new_with_speed(file, self.speed);
        encoder.set_repeat(self.repeat).map_err(export_error)?;

        let delay = Delay::from_numer_denom_ms(self.delay_ms, 1);
        let frames = frames
            .iter()
            .map(|frame| Frame::from_parts(frame.clone(), 0, 0, delay));
        encoder.encode_frames(frames).map_err(export_error)?;

        Ok(())
    }
}
