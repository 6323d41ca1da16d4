use pv_core::{BorderMode, Error, Image};

use crate::conv::blur_separable;
use crate::kernel::GaussianKernel1D;
use crate::resize::{SampleGrid, resize_bilinear};

/// Smallest height/width a non-base pyramid level may have.
pub const DEFAULT_MIN_LEVEL_DIM: usize = 16;

const PYRAMID_SCALE: f64 = 2.0;

/// Blur then resample to `(src.width() / 2, src.height() / 2)`; level pixel
/// `d` lands on finer pixel `2d`.
pub fn pyramid_reduce(src: &Image<f64>) -> Image<f64> {
    pyramid_reduce_to(src, src.width() / 2, src.height() / 2)
}

pub fn pyramid_reduce_to(src: &Image<f64>, out_w: usize, out_h: usize) -> Image<f64> {
    let smoothed = blur_separable(src, &pyramid_kernel(), &BorderMode::Reflect101);
    resize_bilinear(&smoothed, out_w, out_h, SampleGrid::Dyadic(PYRAMID_SCALE))
}

/// Resample to the exact finer-level shape on the same grid, then blur.
pub fn pyramid_expand_to(src: &Image<f64>, out_w: usize, out_h: usize) -> Image<f64> {
    let resized = resize_bilinear(src, out_w, out_h, SampleGrid::Dyadic(PYRAMID_SCALE.recip()));
    blur_separable(&resized, &pyramid_kernel(), &BorderMode::Reflect101)
}

fn pyramid_kernel() -> GaussianKernel1D {
    GaussianKernel1D::new(GaussianKernel1D::pyramid_sigma(PYRAMID_SCALE))
}

/// Number of levels integer halving can produce from `(base_w, base_h)`
/// without any level beyond the base dropping below `min_dim`.
///
/// Level 0 always exists, even for empty or tiny inputs.
pub fn max_build_levels(
    base_w: usize,
    base_h: usize,
    requested_levels: usize,
    min_dim: usize,
) -> usize {
    let mut levels = 1usize;
    let mut w = base_w;
    let mut h = base_h;
    while levels < requested_levels && w / 2 >= min_dim && h / 2 >= min_dim {
        w /= 2;
        h /= 2;
        levels += 1;
    }
    levels
}

/// Trusted pyramid, index 0 = full resolution.
#[derive(Debug, Default, Clone)]
pub struct ReferencePyramid {
    levels: Vec<Image<f64>>,
}

impl ReferencePyramid {
    pub fn gaussian(src: &Image<f64>, max_levels: usize, min_dim: usize) -> Self {
        let build_levels = max_build_levels(src.width(), src.height(), max_levels, min_dim);

        let mut levels = Vec::with_capacity(build_levels);
        levels.push(src.clone());
        for level_idx in 1..build_levels {
            let prev = &levels[level_idx - 1];
            let next = pyramid_reduce_to(prev, prev.width() / 2, prev.height() / 2);
            levels.push(next);
        }

        Self { levels }
    }

    /// Band-pass levels plus the coarsest Gaussian level as the last entry.
    ///
    /// Built coarse-to-fine, then reversed so index 0 is the finest band.
    pub fn laplacian(src: &Image<f64>, max_levels: usize, min_dim: usize) -> Self {
        let gaussian = Self::gaussian(src, max_levels, min_dim).levels;
        let n = gaussian.len();

        let mut coarse_first = Vec::with_capacity(n);
        coarse_first.push(gaussian[n - 1].clone());
        for i in (0..n - 1).rev() {
            let fine = &gaussian[i];
            let expanded = pyramid_expand_to(&gaussian[i + 1], fine.width(), fine.height());
            coarse_first.push(subtract(fine, &expanded));
        }
        coarse_first.reverse();

        Self {
            levels: coarse_first,
        }
    }

    /// Collapses Laplacian `levels`, scaling level `i` by `coeffs[i]`.
    pub fn reconstruct(levels: &[Image<f64>], coeffs: &[f64]) -> Result<Image<f64>, Error> {
        if levels.len() != coeffs.len() {
            return Err(Error::SizeMismatch {
                expected: levels.len(),
                actual: coeffs.len(),
            });
        }
        let Some((coarsest, finer)) = levels.split_last() else {
            return Err(Error::EmptyPyramid);
        };

        let mut acc = coarsest.map(|&v| v * coeffs[levels.len() - 1]);
        for (i, band) in finer.iter().enumerate().rev() {
            let expanded = pyramid_expand_to(&acc, band.width(), band.height());
            let c = coeffs[i];
            acc = Image::from_fn(band.width(), band.height(), |x, y| {
                let idx = y * band.width() + x;
                expanded.data()[idx] + c * band.data()[idx]
            });
        }

        Ok(acc)
    }

    pub fn level(&self, i: usize) -> Option<&Image<f64>> {
        self.levels.get(i)
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn levels(&self) -> &[Image<f64>] {
        &self.levels
    }
}

fn subtract(a: &Image<f64>, b: &Image<f64>) -> Image<f64> {
    debug_assert_eq!(a.shape(), b.shape());
    Image::from_fn(a.width(), a.height(), |x, y| {
        let idx = y * a.width() + x;
        a.data()[idx] - b.data()[idx]
    })
}

#[cfg(test)]
mod tests {
    use pv_core::Image;

    use crate::pyramid::{DEFAULT_MIN_LEVEL_DIM, ReferencePyramid, max_build_levels};

    fn ramp(width: usize, height: usize) -> Image<f64> {
        Image::from_fn(width, height, |x, y| {
            ((x as f64 / width as f64) + (y as f64 / height as f64)) * 0.5
        })
    }

    #[test]
    fn level_count_honors_floor_and_request() {
        assert_eq!(max_build_levels(256, 256, 4, 16), 4);
        assert_eq!(max_build_levels(256, 256, 10, 16), 5);
        assert_eq!(max_build_levels(33, 300, 10, 16), 2);
        assert_eq!(max_build_levels(15, 15, 5, 16), 1);
        assert_eq!(max_build_levels(1, 1, 5, 16), 1);
        assert_eq!(max_build_levels(0, 0, 5, 16), 1);
        assert_eq!(max_build_levels(64, 64, 0, 16), 1);
    }

    #[test]
    fn gaussian_shapes_use_integer_halving() {
        let src = ramp(101, 67);
        let pyr = ReferencePyramid::gaussian(&src, 4, DEFAULT_MIN_LEVEL_DIM);

        let shapes: Vec<_> = pyr.levels().iter().map(Image::shape).collect();
        assert_eq!(shapes, vec![(67, 101), (33, 50), (16, 25)]);
        assert_eq!(pyr.level(0), Some(&src));
    }

    #[test]
    fn laplacian_coarsest_is_gaussian_top() {
        let src = ramp(64, 64);
        let gauss = ReferencePyramid::gaussian(&src, 3, DEFAULT_MIN_LEVEL_DIM);
        let lap = ReferencePyramid::laplacian(&src, 3, DEFAULT_MIN_LEVEL_DIM);

        assert_eq!(lap.num_levels(), 3);
        assert_eq!(lap.level(2), gauss.level(2));
        assert_eq!(lap.level(0).map(Image::shape), Some((64, 64)));
    }

    #[test]
    fn unit_coefficients_reconstruct_exactly() {
        let src = ramp(80, 48);
        let lap = ReferencePyramid::laplacian(&src, 5, DEFAULT_MIN_LEVEL_DIM);
        let coeffs = vec![1.0; lap.num_levels()];
        let out = ReferencePyramid::reconstruct(lap.levels(), &coeffs).expect("reconstruct");

        assert_eq!(out.shape(), src.shape());
        for (a, b) in out.data().iter().zip(src.data()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn reconstruct_rejects_mismatched_coefficients() {
        let src = ramp(32, 32);
        let lap = ReferencePyramid::laplacian(&src, 2, DEFAULT_MIN_LEVEL_DIM);
        assert!(ReferencePyramid::reconstruct(lap.levels(), &[1.0]).is_err());
        assert!(ReferencePyramid::reconstruct(&[], &[]).is_err());
    }

    #[test]
    fn tiny_inputs_yield_single_level() {
        let one = Image::new_fill(1, 1, 0.3f64);
        assert_eq!(ReferencePyramid::gaussian(&one, 6, 16).num_levels(), 1);

        let empty = Image::<f64>::from_vec(0, 0, Vec::new()).expect("empty");
        let lap = ReferencePyramid::laplacian(&empty, 6, 16);
        assert_eq!(lap.num_levels(), 1);
        assert!(lap.level(0).is_some_and(Image::is_empty));
    }
}
