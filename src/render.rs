//! Raster previews of annotated pages and their side-by-side composition.
//!
//! Pages are drawn schematically: a white sheet, a light outline per word box
//! and the highlights blended on top. Glyphs are not rendered.

use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};

use crate::annotate::Highlight;
use crate::config::RenderConfig;
use crate::document::Page;
use crate::error::{Error, Result};
use crate::types::Region;

/// Largest page side, in pixels, that will be rasterized.
const MAX_PAGE_PIXELS: u32 = 20_000;

const PAPER: Rgba<u8> = Rgba([255, 255, 255, 255]);
const OUTLINE: Rgba<u8> = Rgba([190, 190, 190, 255]);

/// Pixel rectangle `[x0, x1) x [y0, y1)` inside an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PixelRect {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

fn scale(dpi: u32) -> f32 {
    dpi as f32 / 72.
}

fn to_pixels(points: f32, dpi: u32) -> Result<u32> {
    let px = (points * scale(dpi)).ceil();
    if !px.is_finite() || px < 1. || px > MAX_PAGE_PIXELS as f32 {
        return Err(Error::Render(format!(
            "{} points at {} dpi gives {} pixels (limit {})",
            points, dpi, px, MAX_PAGE_PIXELS
        )));
    }
    Ok(px as u32)
}

/// Clips a region to the image, or `None` if nothing of it is visible.
fn pixel_rect(region: &Region, dpi: u32, width: u32, height: u32) -> Option<PixelRect> {
    let s = scale(dpi);
    let clip = |v: f32, max: u32| -> u32 {
        if v.is_nan() {
            0
        } else {
            v.clamp(0., max as f32) as u32
        }
    };
    let rect = PixelRect {
        x0: clip((region.x0 * s).floor(), width),
        y0: clip((region.y0 * s).floor(), height),
        x1: clip((region.x1 * s).ceil(), width),
        y1: clip((region.y1 * s).ceil(), height),
    };
    (rect.x0 < rect.x1 && rect.y0 < rect.y1).then_some(rect)
}

fn blend(pixel: &mut Rgba<u8>, color: [u8; 3], opacity: f32) {
    for (channel, target) in pixel.0.iter_mut().zip(color) {
        let mixed = *channel as f32 * (1. - opacity) + target as f32 * opacity;
        *channel = mixed.round().clamp(0., 255.) as u8;
    }
}

fn outline(img: &mut RgbaImage, rect: PixelRect) {
    for x in rect.x0..rect.x1 {
        img.put_pixel(x, rect.y0, OUTLINE);
        img.put_pixel(x, rect.y1 - 1, OUTLINE);
    }
    for y in rect.y0..rect.y1 {
        img.put_pixel(rect.x0, y, OUTLINE);
        img.put_pixel(rect.x1 - 1, y, OUTLINE);
    }
}

/// Draws `page` at `config.dpi` with `highlights` blended over it.
pub fn rasterize_page(page: &Page, highlights: &[Highlight], config: &RenderConfig) -> Result<RgbaImage> {
    let width = to_pixels(page.width, config.dpi)?;
    let height = to_pixels(page.height, config.dpi)?;
    let mut img = RgbaImage::from_pixel(width, height, PAPER);

    if config.outline_tokens {
        for token in page.extract_tokens().iter().filter(|t| !t.is_whitespace()) {
            if let Some(rect) = pixel_rect(&token.region, config.dpi, width, height) {
                outline(&mut img, rect);
            }
        }
    }

    for highlight in highlights {
        let Some(rect) = pixel_rect(&highlight.region, config.dpi, width, height) else {
            continue;
        };
        let color = highlight.color.to_rgb8();
        for y in rect.y0..rect.y1 {
            for x in rect.x0..rect.x1 {
                blend(img.get_pixel_mut(x, y), color, highlight.opacity);
            }
        }
    }
    Ok(img)
}

/// Placement of N images laid out left to right, top-aligned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideBySideLayout {
    /// Sum of the widths
    pub width: u32,
    /// Tallest height
    pub height: u32,
    /// Left edge of each image
    pub offsets: Vec<u32>,
}

pub fn layout_side_by_side(sizes: &[(u32, u32)]) -> Result<SideBySideLayout> {
    if sizes.is_empty() {
        return Err(Error::Compose("nothing to compose".to_string()));
    }
    let mut offsets = Vec::with_capacity(sizes.len());
    let mut width: u32 = 0;
    let mut height: u32 = 0;
    for &(w, h) in sizes {
        offsets.push(width);
        width = width
            .checked_add(w)
            .ok_or_else(|| Error::Compose("combined width overflows".to_string()))?;
        height = height.max(h);
    }
    Ok(SideBySideLayout { width, height, offsets })
}

/// Pastes `images` onto one white canvas, left to right.
pub fn compose_side_by_side(images: &[RgbaImage]) -> Result<RgbaImage> {
    let sizes: Vec<(u32, u32)> = images.iter().map(|img| img.dimensions()).collect();
    let layout = layout_side_by_side(&sizes)?;
    let mut canvas = RgbaImage::from_pixel(layout.width, layout.height, PAPER);
    for (img, &offset) in images.iter().zip(&layout.offsets) {
        for (x, y, pixel) in img.enumerate_pixels() {
            canvas.put_pixel(offset + x, y, *pixel);
        }
    }
    Ok(canvas)
}

pub fn save_png(img: &RgbaImage, path: &Path) -> Result<()> {
    img.save_with_format(path, ImageFormat::Png)
        .map_err(|e| Error::Compose(format!("cannot write {}: {}", path.display(), e)))
}
