//! The fixed color correction pipeline.
//!
//! Six stages, applied per pixel, in this order:
//!
//! 1. RGB → CMYK working space (K is the shadow component, the minimum of
//!    the inverted channels; C/M/Y are the leftover ink densities)
//! 2. Ink density shift: each working channel scaled by its slider
//! 3. Reconvert to RGB, then exposure (brightness multiplier)
//! 4. Black level (uniform channel offset)
//! 5. Contrast (linear remap around the 128 midpoint)
//! 6. Clamp to [0, 255] and quantize once, round-half-to-even
//!
//! The order is load-bearing: later stages operate on already-adjusted
//! values, and a UI preview that mirrors this function must match the
//! printed output byte for byte. Only `+ - * /` and comparisons are used —
//! no libm calls — so the result is bit-identical across platforms.

use super::adjust::AdjustmentSet;
use super::buffer::ImageBuffer;
use crate::error::HermanoError;

/// Exposure slider at ±100 maps to a ×1.5 / ×0.5 brightness factor.
pub const EXPOSURE_SPAN: f64 = 0.5;

/// Black level slider at ±100 maps to a ±128 channel offset.
pub const BLACK_LEVEL_SPAN: f64 = 128.0;

/// Contrast pivots around this channel value.
pub const CONTRAST_PIVOT: f64 = 128.0;

/// Apply an adjustment set to an image.
///
/// Pure and deterministic: no I/O, no shared state, same bytes in → same
/// bytes out. The buffer is corrected in place and handed back; ownership
/// moves through the pipeline rather than aliasing.
///
/// An all-zero [`AdjustmentSet`] is an exact identity — every output byte
/// equals its input byte, which is what lets a UI treat "Original" and
/// "Adjusted with zero sliders" as the same preview.
///
/// ## Errors
///
/// Only malformed input fails; [`ImageBuffer`] construction already rejects
/// zero-dimension images, so `apply` itself cannot see one, but the
/// contract is kept here for callers building buffers by other means.
pub fn apply(
    mut image: ImageBuffer,
    adjustments: AdjustmentSet,
) -> Result<ImageBuffer, HermanoError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(HermanoError::InvalidImage(
            "zero-dimension image".to_string(),
        ));
    }

    // No identity short-circuit: zero sliders go through the arithmetic
    // and still come out byte-exact.
    let adj = adjustments.clamped();

    // Slider scalings are computed once, outside the pixel loop.
    let ink_c = ink_factor(adj.cyan);
    let ink_m = ink_factor(adj.magenta);
    let ink_y = ink_factor(adj.yellow);
    let ink_k = ink_factor(adj.key);
    let exposure = 1.0 + adj.exposure as f64 / 100.0 * EXPOSURE_SPAN;
    let offset = adj.black_level as f64 / 100.0 * BLACK_LEVEL_SPAN;
    let contrast = 1.0 + adj.contrast as f64 / 100.0;

    for px in image.as_raw_mut().chunks_exact_mut(3) {
        let (r, g, b) = correct_pixel(
            px[0], px[1], px[2],
            ink_c, ink_m, ink_y, ink_k,
            exposure, offset, contrast,
        );
        px[0] = r;
        px[1] = g;
        px[2] = b;
    }

    Ok(image)
}

/// Slider value to ink density factor: 0 → ×1.0, -100 → ×0.0, +100 → ×2.0.
///
/// Density scaling (rather than an additive shift) is what keeps neutral
/// pixels neutral: a gray has zero C/M/Y density, and zero times any factor
/// stays zero.
#[inline]
fn ink_factor(slider: i8) -> f64 {
    1.0 + slider as f64 / 100.0
}

#[inline]
fn clamp255(v: f64) -> f64 {
    v.clamp(0.0, 255.0)
}

/// The per-pixel pipeline. All arithmetic in f64; quantized exactly once.
#[inline]
#[allow(clippy::too_many_arguments)]
fn correct_pixel(
    r: u8, g: u8, b: u8,
    ink_c: f64, ink_m: f64, ink_y: f64, ink_k: f64,
    exposure: f64, offset: f64, contrast: f64,
) -> (u8, u8, u8) {
    let (r, g, b) = (r as f64, g as f64, b as f64);

    // Stage 1: extract the shadow component, leaving chromatic densities.
    let k = 255.0 - r.max(g).max(b);
    let c = (255.0 - r) - k;
    let m = (255.0 - g) - k;
    let y = (255.0 - b) - k;

    // Stage 2: scale each ink, clamped to the working range.
    let c = clamp255(c * ink_c);
    let m = clamp255(m * ink_m);
    let y = clamp255(y * ink_y);
    let k = clamp255(k * ink_k);

    // Stage 3: back to RGB, then exposure.
    let r = 255.0 - clamp255(c + k);
    let g = 255.0 - clamp255(m + k);
    let b = 255.0 - clamp255(y + k);
    let r = clamp255(r * exposure);
    let g = clamp255(g * exposure);
    let b = clamp255(b * exposure);

    // Stage 4: black level.
    let r = clamp255(r + offset);
    let g = clamp255(g + offset);
    let b = clamp255(b + offset);

    // Stage 5: contrast around the midpoint.
    let r = clamp255(CONTRAST_PIVOT + (r - CONTRAST_PIVOT) * contrast);
    let g = clamp255(CONTRAST_PIVOT + (g - CONTRAST_PIVOT) * contrast);
    let b = clamp255(CONTRAST_PIVOT + (b - CONTRAST_PIVOT) * contrast);

    // Stage 6: single quantization.
    (
        r.round_ties_even() as u8,
        g.round_ties_even() as u8,
        b.round_ties_even() as u8,
    )
}
