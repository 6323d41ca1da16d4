/// Sampled, normalized 1D Gaussian.
///
/// Conventions:
/// - `radius = round(truncate * sigma)`, minimum 1.
/// - `weights.len() == 2 * radius + 1`, `sum(weights) ~= 1`.
#[derive(Debug, Clone)]
pub struct GaussianKernel1D {
    pub sigma: f64,
    pub radius: usize,
    pub weights: Vec<f64>,
}

impl GaussianKernel1D {
    pub const DEFAULT_TRUNCATE: f64 = 4.0;

    pub fn new(sigma: f64) -> Self {
        Self::with_truncate(sigma, Self::DEFAULT_TRUNCATE)
    }

    pub fn with_truncate(sigma: f64, truncate: f64) -> Self {
        assert!(
            sigma.is_finite() && sigma > 0.0,
            "sigma must be > 0 and finite"
        );

        let radius = ((truncate * sigma + 0.5) as usize).max(1);
        let len = 2 * radius + 1;

        let sigma2 = sigma * sigma;
        let mut weights = vec![0.0f64; len];
        for (i, w) in weights.iter_mut().enumerate() {
            let x = i as f64 - radius as f64;
            *w = (-(x * x) / (2.0 * sigma2)).exp();
        }

        let sum: f64 = weights.iter().sum();
        for w in &mut weights {
            *w /= sum;
        }

        Self {
            sigma,
            radius,
            weights,
        }
    }

    /// Sigma used by the pyramid reduce/expand steps for a scale factor.
    pub fn pyramid_sigma(scale: f64) -> f64 {
        2.0 * scale / 6.0
    }
}
