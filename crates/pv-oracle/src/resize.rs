use pv_core::{BorderMode, Image, sample_bilinear_f64};

/// How destination pixel `d` maps onto a source coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleGrid {
    /// `d * factor`. Factor 2 puts pyramid level pixel `d` over finer
    /// pixel `2d`; factor 0.5 is the inverse.
    Dyadic(f64),
}

impl SampleGrid {
    fn source_coord(self, d: usize) -> f64 {
        match self {
            Self::Dyadic(factor) => d as f64 * factor,
        }
    }
}

/// Bilinear resize to an explicit `(out_w, out_h)`. Samples beyond the
/// source edge use reflect-101.
pub fn resize_bilinear(src: &Image<f64>, out_w: usize, out_h: usize, grid: SampleGrid) -> Image<f64> {
    if src.is_empty() || out_w == 0 || out_h == 0 {
        return Image::new_fill(out_w, out_h, 0.0f64);
    }

    let view = src.as_view();
    let border = BorderMode::Reflect101;

    Image::from_fn(out_w, out_h, |x, y| {
        let sx = grid.source_coord(x);
        let sy = grid.source_coord(y);
        sample_bilinear_f64(&view, sx, sy, &border)
    })
}
