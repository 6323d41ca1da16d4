//! Sample solution: binomial blur, even-index subsampling, zero-insertion
//! expansion.

use anyhow::{Context, Result, ensure};
use pv_core::{BorderMode, Image, map_index};

/// This file's own text, checked statically by the harness.
pub const SOURCE: &str = include_str!("solution.rs");

const MIN_LEVEL_DIM: usize = 16;

pub fn build_gaussian_pyramid(
    image: &Image<f64>,
    max_levels: usize,
    filter_size: usize,
) -> Result<(Vec<Image<f64>>, Image<f64>)> {
    let filter_vec = binomial_row(filter_size)?;
    let mut pyr = vec![image.clone()];
    while pyr.len() < max_levels {
        let last = &pyr[pyr.len() - 1];
        if last.height() / 2 < MIN_LEVEL_DIM || last.width() / 2 < MIN_LEVEL_DIM {
            break;
        }
        let next = reduce(last, filter_vec.data());
        pyr.push(next);
    }
    Ok((pyr, filter_vec))
}

pub fn build_laplacian_pyramid(
    image: &Image<f64>,
    max_levels: usize,
    filter_size: usize,
) -> Result<(Vec<Image<f64>>, Image<f64>)> {
    let (gauss, filter_vec) = build_gaussian_pyramid(image, max_levels, filter_size)?;
    let expand_kernel = doubled(&filter_vec);

    let mut pyr = Vec::with_capacity(gauss.len());
    for pair in gauss.windows(2) {
        let (fine, coarse) = (&pair[0], &pair[1]);
        let up = expand(coarse, &expand_kernel, fine.width(), fine.height());
        pyr.push(zip_with(fine, &up, |a, b| a - b));
    }
    pyr.push(gauss[gauss.len() - 1].clone());
    Ok((pyr, filter_vec))
}

pub fn laplacian_to_image(
    lpyr: &[Image<f64>],
    filter_vec: &Image<f64>,
    coeff: &[f64],
) -> Result<Image<f64>> {
    ensure!(
        lpyr.len() == coeff.len(),
        "got {} coefficients for {} levels",
        coeff.len(),
        lpyr.len()
    );
    let (coarsest, finer) = lpyr.split_last().context("empty laplacian pyramid")?;
    let expand_kernel = doubled(filter_vec);
    let top = coarsest.map(|&v| v * coeff[finer.len()]);

    Ok(finer.iter().zip(coeff).rev().fold(top, |acc, (band, &c)| {
        let up = expand(&acc, &expand_kernel, band.width(), band.height());
        zip_with(&up, band, |u, b| u + c * b)
    }))
}

pub fn render_pyramid(pyr: &[Image<f64>], levels: usize) -> Result<Image<f64>> {
    let stretched: Vec<Image<f64>> = pyr.iter().take(levels).map(stretch).collect();
    let shown = &stretched;
    let height = shown.first().map_or(0, Image::height);
    let width = shown.iter().map(Image::width).sum();
    let data = (0..height)
        .flat_map(move |y| {
            shown.iter().flat_map(move |level| {
                if y < level.height() {
                    level.row(y).to_vec()
                } else {
                    vec![0.0; level.width()]
                }
            })
        })
        .collect();
    Ok(Image::from_vec(width, height, data)?)
}

fn binomial_row(filter_size: usize) -> Result<Image<f64>> {
    ensure!(
        filter_size % 2 == 1,
        "filter_size must be odd, got {filter_size}"
    );
    let mut row = vec![1.0f64];
    while row.len() < filter_size {
        let mut next = row.clone();
        next.push(0.0);
        for i in 1..next.len() {
            next[i] += row[i - 1];
        }
        row = next;
    }
    let norm: f64 = row.iter().sum();
    let data = row.iter().map(|c| c / norm).collect();
    Ok(Image::from_vec(filter_size, 1, data)?)
}

fn doubled(filter_vec: &Image<f64>) -> Vec<f64> {
    filter_vec.data().iter().map(|v| 2.0 * v).collect()
}

fn reduce(img: &Image<f64>, kernel: &[f64]) -> Image<f64> {
    let blurred = blur(img, kernel);
    Image::from_fn(img.width() / 2, img.height() / 2, |x, y| {
        blurred.data()[(2 * y) * img.width() + 2 * x]
    })
}

fn expand(img: &Image<f64>, kernel: &[f64], out_w: usize, out_h: usize) -> Image<f64> {
    let padded = Image::from_fn(out_w, out_h, |x, y| {
        if x % 2 == 0 && y % 2 == 0 {
            img.get(x / 2, y / 2).copied().unwrap_or(0.0)
        } else {
            0.0
        }
    });
    blur(&padded, kernel)
}

fn blur(img: &Image<f64>, kernel: &[f64]) -> Image<f64> {
    let rows = Image::from_fn(img.width(), img.height(), |x, y| {
        convolve_at(img.row(y), x, kernel)
    });
    let columns: Vec<Vec<f64>> = (0..img.width())
        .map(|x| (0..img.height()).map(|y| rows.data()[y * img.width() + x]).collect())
        .collect();
    Image::from_fn(img.width(), img.height(), |x, y| {
        convolve_at(&columns[x], y, kernel)
    })
}

fn convolve_at(signal: &[f64], i: usize, kernel: &[f64]) -> f64 {
    let radius = (kernel.len() / 2) as isize;
    let mut acc = 0.0;
    for (k, w) in kernel.iter().enumerate() {
        let idx = i as isize + radius - k as isize;
        if let Some(j) = map_index(idx, signal.len(), &BorderMode::Reflect) {
            acc += w * signal[j];
        }
    }
    acc
}

fn stretch(level: &Image<f64>) -> Image<f64> {
    match (level.min_value(), level.max_value()) {
        (Some(lo), Some(hi)) if hi > lo => level.map(|&v| (v - lo) / (hi - lo)),
        _ => level.map(|_| 0.0),
    }
}

fn zip_with(a: &Image<f64>, b: &Image<f64>, f: impl Fn(f64, f64) -> f64) -> Image<f64> {
    Image::from_fn(a.width(), a.height(), |x, y| {
        let idx = y * a.width() + x;
        f(a.data()[idx], b.data()[idx])
    })
}

#[cfg(test)]
mod tests {
    use pv_core::Image;

    use super::{
        binomial_row, build_gaussian_pyramid, build_laplacian_pyramid, laplacian_to_image,
        render_pyramid,
    };

    fn ramp(width: usize, height: usize) -> Image<f64> {
        Image::from_fn(width, height, |x, y| (x + y) as f64 / (width + height) as f64)
    }

    #[test]
    fn binomial_rows_are_exact() {
        assert_eq!(binomial_row(3).expect("odd").data(), &[0.25, 0.5, 0.25]);
        assert_eq!(binomial_row(1).expect("odd").data(), &[1.0]);
        assert!(binomial_row(4).is_err());
    }

    #[test]
    fn gaussian_levels_halve_until_floor() {
        let (pyr, _) = build_gaussian_pyramid(&ramp(100, 70), 10, 5).expect("builds");
        let shapes: Vec<_> = pyr.iter().map(Image::shape).collect();
        assert_eq!(shapes, vec![(70, 100), (35, 50), (17, 25)]);
    }

    #[test]
    fn laplacian_round_trip_is_near_exact() {
        let img = ramp(64, 48);
        // 48 rows stop at 24: a third level would have 12 rows.
        let (lpyr, filter_vec) = build_laplacian_pyramid(&img, 3, 5).expect("builds");
        assert_eq!(lpyr.len(), 2);
        let coeff = vec![1.0; lpyr.len()];
        let out = laplacian_to_image(&lpyr, &filter_vec, &coeff).expect("collapses");
        for (a, b) in out.data().iter().zip(img.data()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn three_level_collapse_of_a_square_image() {
        let img = ramp(64, 64);
        let (lpyr, filter_vec) = build_laplacian_pyramid(&img, 3, 3).expect("builds");
        assert_eq!(lpyr.len(), 3);
        let out = laplacian_to_image(&lpyr, &filter_vec, &[1.0; 3]).expect("collapses");
        assert_eq!(out.shape(), (64, 64));
        for (a, b) in out.data().iter().zip(img.data()) {
            assert!((a - b).abs() < 1e-9);
        }
        assert!(laplacian_to_image(&lpyr, &filter_vec, &[1.0; 2]).is_err());
    }

    #[test]
    fn render_pads_short_levels_with_zeros() {
        let (pyr, _) = build_gaussian_pyramid(&ramp(64, 64), 3, 3).expect("builds");
        let canvas = render_pyramid(&pyr, 3).expect("renders");
        assert_eq!(canvas.shape(), (64, 112));
        assert_eq!(canvas.get(70, 40), Some(&0.0));
        assert_eq!(canvas.get(0, 0), Some(&0.0));
        assert_eq!(canvas.get(63, 63), Some(&1.0));
    }
}
