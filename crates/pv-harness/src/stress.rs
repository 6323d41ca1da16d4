//! Edge-case and random input matrices.
//!
//! Every matrix is generated inside the case that uses it, from a seed
//! derived from the run seed and the case index, so a run is reproducible
//! and no matrix is shared between cases.

use pv_core::Image;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::StressConfig;

/// Degenerate inputs that have broken submissions before.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeMatrix {
    Empty,
    SingleCell,
    SingleZero,
    Zeros,
    Ones,
    LongRamp,
    TinyRow,
    ConstantRow,
    ZeroRow,
}

impl EdgeMatrix {
    pub const ALL: [Self; 9] = [
        Self::Empty,
        Self::SingleCell,
        Self::SingleZero,
        Self::Zeros,
        Self::Ones,
        Self::LongRamp,
        Self::TinyRow,
        Self::ConstantRow,
        Self::ZeroRow,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::SingleCell => "single-cell",
            Self::SingleZero => "single-zero",
            Self::Zeros => "zeros",
            Self::Ones => "ones",
            Self::LongRamp => "long-ramp",
            Self::TinyRow => "tiny-row",
            Self::ConstantRow => "constant-row",
            Self::ZeroRow => "zero-row",
        }
    }

    pub fn build(self) -> Image<f64> {
        match self {
            Self::Empty => Image::new_fill(0, 0, 0.0),
            Self::SingleCell => Image::new_fill(1, 1, 0.5),
            Self::SingleZero => Image::new_fill(1, 1, 0.0),
            Self::Zeros => Image::new_fill(1000, 1, 0.0),
            Self::Ones => Image::new_fill(1000, 1, 1.0),
            Self::LongRamp => Image::from_fn(1000, 1, |x, _| x as f64 / 999.0),
            Self::TinyRow => Image::from_fn(3, 1, |x, _| (x + 1) as f64 / 3.0),
            Self::ConstantRow => Image::new_fill(3, 1, 1.0),
            Self::ZeroRow => Image::new_fill(3, 1, 0.0),
        }
    }
}

/// One random case's input and parameters.
#[derive(Debug, Clone)]
pub struct StressMatrix {
    pub image: Image<f64>,
    pub max_levels: usize,
    pub filter_size: usize,
}

/// Generates random case `index` of a run. Values are uniform in `[0, 1)`.
pub fn random_matrix(config: &StressConfig, filter_sizes: &[usize], index: usize) -> StressMatrix {
    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(index as u64));
    let rows = rng.gen_range(config.dims());
    let cols = rng.gen_range(config.dims());
    let max_levels = rng.gen_range(config.levels());
    let filter_size = if filter_sizes.is_empty() {
        3
    } else {
        filter_sizes[rng.gen_range(0..filter_sizes.len())]
    };

    let image = Image::from_fn(cols, rows, |_, _| rng.r#gen::<f64>());
    StressMatrix {
        image,
        max_levels,
        filter_size,
    }
}

#[cfg(test)]
mod tests {
    use super::{EdgeMatrix, random_matrix};
    use crate::config::StressConfig;

    #[test]
    fn edge_matrices_have_expected_shapes() {
        let shapes: Vec<_> = EdgeMatrix::ALL.iter().map(|m| m.build().shape()).collect();
        assert_eq!(
            shapes,
            vec![
                (0, 0),
                (1, 1),
                (1, 1),
                (1, 1000),
                (1, 1000),
                (1, 1000),
                (1, 3),
                (1, 3),
                (1, 3)
            ]
        );
    }

    #[test]
    fn short_rows_cover_constant_and_zero_values() {
        assert_eq!(EdgeMatrix::ConstantRow.build().data(), &[1.0, 1.0, 1.0]);
        assert_eq!(EdgeMatrix::ZeroRow.build().data(), &[0.0, 0.0, 0.0]);
        assert_eq!(EdgeMatrix::ZeroRow.name(), "zero-row");
    }

    #[test]
    fn random_matrices_are_reproducible_and_independent() {
        let config = StressConfig::default();
        let a = random_matrix(&config, &[3, 5, 7], 4);
        let b = random_matrix(&config, &[3, 5, 7], 4);
        let c = random_matrix(&config, &[3, 5, 7], 5);

        assert_eq!(a.image, b.image);
        assert_eq!((a.max_levels, a.filter_size), (b.max_levels, b.filter_size));
        assert_ne!(a.image, c.image);
    }

    #[test]
    fn random_matrices_respect_configured_ranges() {
        let config = StressConfig {
            min_dim: 2,
            max_dim: 9,
            min_levels: 3,
            max_levels: 4,
            ..StressConfig::default()
        };
        for i in 0..32 {
            let m = random_matrix(&config, &[5], i);
            let (rows, cols) = m.image.shape();
            assert!((2..=9).contains(&rows) && (2..=9).contains(&cols));
            assert!((3..=4).contains(&m.max_levels));
            assert_eq!(m.filter_size, 5);
            assert!(m.image.data().iter().all(|v| (0.0..1.0).contains(v)));
        }
    }
}
