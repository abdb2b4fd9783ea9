#![deny(unsafe_code)]
//! CPU-side drawing surface for driftlines.
//!
//! [`PixelSurface`] implements the core `Surface` trait over a straight-alpha
//! RGBA8 buffer with anti-aliased strokes, so the wave field can run headless
//! (CLI, tests, offline renders). PNG output lives in [`snapshot`] behind the
//! `png` feature.

#[cfg(feature = "png")]
pub mod snapshot;

use driftlines_core::error::WaveError;
use driftlines_core::{Srgb, StrokeStyle, Surface};

/// RGBA8 pixel buffer that records paths and rasterizes them on `stroke`.
#[derive(Debug, Clone)]
pub struct PixelSurface {
    width: usize,
    height: usize,
    background: Option<Srgb>,
    pixels: Vec<u8>,
    subpaths: Vec<Vec<(f64, f64)>>,
    coverage: Vec<f32>,
}

impl PixelSurface {
    /// Creates a surface cleared to `background`, or transparent if `None`.
    ///
    /// Returns `WaveError::InvalidDimensions` if either dimension is zero or
    /// the buffer size overflows.
    pub fn new(width: usize, height: usize, background: Option<Srgb>) -> Result<Self, WaveError> {
        let len = checked_len(width, height)?;
        let mut surface = Self {
            width,
            height,
            background,
            pixels: vec![0; len * 4],
            subpaths: Vec::new(),
            coverage: vec![0.0; len],
        };
        surface.clear();
        Ok(surface)
    }

    /// Resizes the backing buffer and clears it. Pending paths are dropped.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), WaveError> {
        let len = checked_len(width, height)?;
        self.width = width;
        self.height = height;
        self.pixels = vec![0; len * 4];
        self.coverage = vec![0.0; len];
        self.subpaths.clear();
        self.clear();
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major RGBA8 pixels, straight alpha.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA of the pixel at `(x, y)`, or `None` outside the buffer.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Accumulates the coverage of one segment into `self.coverage`, keeping
    /// the maximum so overlapping segments do not darken joints.
    fn cover_segment(&mut self, a: (f64, f64), b: (f64, f64), half_width: f64) {
        let reach = half_width + 1.0;
        let min_x = (a.0.min(b.0) - reach).floor().max(0.0);
        let min_y = (a.1.min(b.1) - reach).floor().max(0.0);
        let max_x = (a.0.max(b.0) + reach).ceil().min(self.width as f64 - 1.0);
        let max_y = (a.1.max(b.1) + reach).ceil().min(self.height as f64 - 1.0);
        if !(min_x <= max_x && min_y <= max_y) {
            return;
        }

        for py in min_y as usize..=max_y as usize {
            for px in min_x as usize..=max_x as usize {
                let d = distance_to_segment((px as f64 + 0.5, py as f64 + 0.5), a, b);
                let c = (half_width + 0.5 - d).clamp(0.0, 1.0) as f32;
                let slot = &mut self.coverage[py * self.width + px];
                if c > *slot {
                    *slot = c;
                }
            }
        }
    }

    /// Source-over blend of `color`, scaled by coverage and `opacity`, onto
    /// every covered pixel. Resets the coverage mask.
    fn composite(&mut self, color: Srgb, opacity: f64) {
        let [sr, sg, sb] = color.to_rgb8().map(|c| c as f32 / 255.0);
        let opacity = opacity.clamp(0.0, 1.0) as f32;
        for (cov, px) in self.coverage.iter_mut().zip(self.pixels.chunks_exact_mut(4)) {
            if *cov <= 0.0 {
                continue;
            }
            let sa = *cov * opacity;
            *cov = 0.0;
            let da = px[3] as f32 / 255.0;
            let out_a = sa + da * (1.0 - sa);
            if out_a <= 0.0 {
                continue;
            }
            let blend = |s: f32, d: u8| {
                let d = d as f32 / 255.0;
                (s * sa + d * da * (1.0 - sa)) / out_a
            };
            let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
            px[0] = to_u8(blend(sr, px[0]));
            px[1] = to_u8(blend(sg, px[1]));
            px[2] = to_u8(blend(sb, px[2]));
            px[3] = to_u8(out_a);
        }
    }
}

impl Surface for PixelSurface {
    fn size(&self) -> (f64, f64) {
        (self.width as f64, self.height as f64)
    }

    fn clear(&mut self) {
        let fill = match self.background {
            Some(bg) => {
                let [r, g, b] = bg.to_rgb8();
                [r, g, b, 255]
            }
            None => [0, 0, 0, 0],
        };
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&fill);
        }
    }

    fn begin_path(&mut self) {
        self.subpaths.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.subpaths.push(vec![(x, y)]);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        match self.subpaths.last_mut() {
            Some(path) => path.push((x, y)),
            // Canvas semantics: a lineTo with no current point acts as moveTo.
            None => self.subpaths.push(vec![(x, y)]),
        }
    }

    fn stroke(&mut self, style: &StrokeStyle) {
        let half_width = (style.width.max(0.0)) / 2.0;
        let subpaths = std::mem::take(&mut self.subpaths);
        for path in &subpaths {
            for pair in path.windows(2) {
                self.cover_segment(pair[0], pair[1], half_width);
            }
        }
        self.subpaths = subpaths;
        self.composite(style.color, style.opacity);
        tracing::trace!(subpaths = self.subpaths.len(), "stroked path");
    }
}

fn checked_len(width: usize, height: usize) -> Result<usize, WaveError> {
    if width == 0 || height == 0 {
        return Err(WaveError::InvalidDimensions);
    }
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(4).map(|_| n))
        .ok_or(WaveError::InvalidDimensions)
}

/// Euclidean distance from `p` to the segment `a`-`b`.
fn distance_to_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (abx, aby) = (b.0 - a.0, b.1 - a.1);
    let (apx, apy) = (p.0 - a.0, p.1 - a.1);
    let len_sq = abx * abx + aby * aby;
    let t = if len_sq > 0.0 {
        ((apx * abx + apy * aby) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (dx, dy) = (apx - abx * t, apy - aby * t);
    (dx * dx + dy * dy).sqrt()
}
