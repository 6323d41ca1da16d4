//! Closed-form expectations for pyramid geometry and the blur kernel.

use pv_core::Image;

/// Normalized binomial kernel of order `size - 1` as a `1 x size` row.
///
/// Coefficients are built by repeated `[1, 1]` convolution and divided by
/// `2^(size - 1)`, so every entry is an exact dyadic rational for any size a
/// submission could reasonably request.
pub fn binomial_filter(size: usize) -> Image<f64> {
    if size == 0 {
        return Image::new_fill(0, 1, 0.0);
    }

    let mut coeffs = vec![1.0f64];
    for _ in 1..size {
        let mut next = vec![0.0f64; coeffs.len() + 1];
        for (i, &c) in coeffs.iter().enumerate() {
            next[i] += c;
            next[i + 1] += c;
        }
        coeffs = next;
    }

    let norm = 2.0f64.powi((size - 1) as i32);
    let data = coeffs.into_iter().map(|c| c / norm).collect();
    Image::from_vec(size, 1, data).expect("1 x size row holds size coefficients")
}

/// Shape of level `level` of a `(rows, cols)` base under integer halving.
pub fn level_shape(rows: usize, cols: usize, level: usize) -> (usize, usize) {
    let shift = u32::try_from(level).unwrap_or(u32::MAX);
    (
        rows.checked_shr(shift).unwrap_or(0),
        cols.checked_shr(shift).unwrap_or(0),
    )
}

/// Longest pyramid allowed by both `max_levels` and the size floor.
///
/// Level 0 always counts, so the result is at least 1.
pub fn achievable_levels(rows: usize, cols: usize, max_levels: usize, min_dim: usize) -> usize {
    let mut levels = 1usize;
    while levels < max_levels {
        let (h, w) = level_shape(rows, cols, levels);
        if h < min_dim || w < min_dim {
            break;
        }
        levels += 1;
    }
    levels
}

/// Canvas `(rows, cols)` for `levels` levels rendered side by side.
pub fn canvas_shape(rows: usize, cols: usize, levels: usize) -> (usize, usize) {
    let width = (0..levels).map(|i| level_shape(rows, cols, i).1).sum();
    (rows, width)
}
