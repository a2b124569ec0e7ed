//! Layer compositing onto a fixed-size canvas

use crate::catalog::layer::BlendMode;
use crate::catalog::selection::Selection;
use crate::io::configuration::{Background, Format};
use crate::io::error::{GenerationError, Result, invalid_parameter};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Output of rendering one item
#[derive(Debug, Clone)]
pub struct Rendered {
    /// Final composited image
    pub image: RgbaImage,
    /// Canvas snapshots after each layer, empty unless frame capture is on
    pub frames: Vec<RgbaImage>,
}

/// Turns a selection into pixels
pub trait Renderer {
    /// Render every pick of `selection` in composition order
    ///
    /// # Errors
    ///
    /// Returns an error if any layer image cannot be loaded
    fn render(&mut self, selection: &Selection<'_>) -> Result<Rendered>;
}

/// How the canvas is filled before the first layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundFill {
    /// The same colour for every item
    Static([u8; 4]),
    /// A random fully saturated hue at fixed lightness
    Pastel {
        /// Lightness in `[0, 1]`
        lightness: f32,
    },
}

impl BackgroundFill {
    /// Resolve the configured background, `None` when disabled
    ///
    /// # Errors
    ///
    /// Returns an error if the colour or brightness cannot be parsed
    pub fn from_config(background: &Background) -> Result<Option<Self>> {
        if !background.generate {
            return Ok(None);
        }
        if background.static_color {
            return parse_hex_color(&background.default).map(|c| Some(Self::Static(c)));
        }
        let lightness = parse_percentage(&background.brightness)?;
        Ok(Some(Self::Pastel { lightness }))
    }
}

/// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`
///
/// # Errors
///
/// Returns an error for any other shape or non-hex digits
pub fn parse_hex_color(value: &str) -> Result<[u8; 4]> {
    let invalid = || invalid_parameter("background.default", &value, &"expected #rgb, #rrggbb or #rrggbbaa");
    let digits = value.strip_prefix('#').ok_or_else(invalid)?;
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 | 8 => digits.to_string(),
        _ => return Err(invalid()),
    };

    let mut color = [0, 0, 0, 255];
    for (slot, chunk) in color.iter_mut().zip(expanded.as_bytes().chunks(2)) {
        let pair = std::str::from_utf8(chunk).map_err(|_utf8| invalid())?;
        *slot = u8::from_str_radix(pair, 16).map_err(|_parse| invalid())?;
    }
    Ok(color)
}

/// Parse a CSS style percentage such as `"80%"` into `[0, 1]`
///
/// # Errors
///
/// Returns an error if the value is not a number in `[0, 100]`
pub fn parse_percentage(value: &str) -> Result<f32> {
    let number = value.trim().trim_end_matches('%');
    number
        .parse::<f32>()
        .ok()
        .filter(|p| (0.0..=100.0).contains(p))
        .map(|p| p / 100.0)
        .ok_or_else(|| invalid_parameter("background.brightness", &value, &"expected 0% to 100%"))
}

/// Convert HSL (hue in degrees, saturation and lightness in `[0, 1]`) to RGB
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [u8; 3] {
    let chroma = (1.0 - 2.0f32.mul_add(lightness, -1.0).abs()) * saturation;
    let h = hue.rem_euclid(360.0) / 60.0;
    let x = chroma * (1.0 - (h.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = lightness - chroma / 2.0;
    [r, g, b].map(|c| ((c + m) * 255.0).round().clamp(0.0, 255.0) as u8)
}

fn blend_channel(mode: BlendMode, backdrop: f32, source: f32) -> f32 {
    let screen = |a: f32, b: f32| a + b - a * b;
    match mode {
        BlendMode::SourceOver => source,
        BlendMode::Multiply => backdrop * source,
        BlendMode::Screen => screen(backdrop, source),
        BlendMode::Overlay => {
            if backdrop <= 0.5 {
                2.0 * backdrop * source
            } else {
                screen(2.0f32.mul_add(backdrop, -1.0), source)
            }
        }
        BlendMode::Darken => backdrop.min(source),
        BlendMode::Lighten => backdrop.max(source),
        BlendMode::Difference => (backdrop - source).abs(),
    }
}

/// Composite one source pixel over a backdrop pixel
///
/// Applies the separable blend function where the backdrop is opaque and
/// plain source-over alpha compositing for the rest.
pub fn blend_pixel(backdrop: [u8; 4], source: [u8; 4], mode: BlendMode, opacity: f32) -> [u8; 4] {
    let to_unit = |v: u8| f32::from(v) / 255.0;
    let alpha_s = to_unit(source[3]) * opacity;
    let alpha_b = to_unit(backdrop[3]);
    let alpha_o = alpha_b.mul_add(1.0 - alpha_s, alpha_s);
    if alpha_o <= 0.0 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    for ((slot, &cb), &cs) in out.iter_mut().zip(&backdrop).zip(&source).take(3) {
        let (cb, cs) = (to_unit(cb), to_unit(cs));
        let mixed = (1.0 - alpha_b).mul_add(cs, alpha_b * blend_channel(mode, cb, cs));
        let composed = alpha_s.mul_add(mixed, alpha_b * cb * (1.0 - alpha_s)) / alpha_o;
        *slot = (composed * 255.0).round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (alpha_o * 255.0).round().clamp(0.0, 255.0) as u8;
    out
}

/// Draw `layer` over `canvas`; both must have the same dimensions
pub fn composite(canvas: &mut RgbaImage, layer: &RgbaImage, mode: BlendMode, opacity: f32) {
    for (dst, src) in canvas.pixels_mut().zip(layer.pixels()) {
        *dst = Rgba(blend_pixel(dst.0, src.0, mode, opacity));
    }
}

/// PNG compositor drawing layer images in order onto a canvas
pub struct Compositor {
    width: u32,
    height: u32,
    filter: FilterType,
    background: Option<BackgroundFill>,
    capture_frames: bool,
    rng: StdRng,
}

impl Compositor {
    /// Create a compositor for the configured canvas and background
    ///
    /// # Errors
    ///
    /// Returns an error if the background settings cannot be parsed
    pub fn new(
        format: &Format,
        background: &Background,
        capture_frames: bool,
        seed: u64,
    ) -> Result<Self> {
        Ok(Self {
            width: format.width,
            height: format.height,
            filter: if format.smoothing {
                FilterType::CatmullRom
            } else {
                FilterType::Nearest
            },
            background: BackgroundFill::from_config(background)?,
            capture_frames,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    fn blank_canvas(&mut self) -> RgbaImage {
        let fill = match self.background {
            None => [0, 0, 0, 0],
            Some(BackgroundFill::Static(color)) => color,
            Some(BackgroundFill::Pastel { lightness }) => {
                let hue = self.rng.random_range(0..360u16);
                let [r, g, b] = hsl_to_rgb(f32::from(hue), 1.0, lightness);
                [r, g, b, 255]
            }
        };
        RgbaImage::from_pixel(self.width, self.height, Rgba(fill))
    }

    fn load_layer_image(&self, path: &std::path::Path) -> Result<RgbaImage> {
        let image = image::open(path)
            .map_err(|source| GenerationError::ImageLoad {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        if image.dimensions() == (self.width, self.height) {
            Ok(image)
        } else {
            Ok(imageops::resize(&image, self.width, self.height, self.filter))
        }
    }
}

impl Renderer for Compositor {
    fn render(&mut self, selection: &Selection<'_>) -> Result<Rendered> {
        // All layer images are loaded before any drawing starts
        let images = selection
            .picks()
            .iter()
            .map(|pick| self.load_layer_image(&pick.element.path))
            .collect::<Result<Vec<_>>>()?;

        let mut canvas = self.blank_canvas();
        let mut frames = Vec::new();
        for (pick, image) in selection.picks().iter().zip(&images) {
            composite(&mut canvas, image, pick.layer.blend, pick.layer.opacity);
            if self.capture_frames {
                frames.push(canvas.clone());
            }
        }

        Ok(Rendered {
            image: canvas,
            frames,
        })
    }
}
