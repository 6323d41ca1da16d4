//! Input corpus: every image file in a directory, decoded to single-channel
//! `f64` in `[0, 1]`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use pv_core::Image;
use tracing::{debug, warn};

const EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// Luminance weights for RGB to gray.
const LUMA_WEIGHTS: [f64; 3] = [0.2125, 0.7154, 0.0721];

#[derive(Debug, Clone)]
pub struct CorpusImage {
    pub name: String,
    pub image: Image<f64>,
}

/// Decodes `path` to a gray `f64` image normalized to `[0, 1]`.
pub fn read_image(path: &Path) -> Result<Image<f64>> {
    let dyn_img =
        image::open(path).with_context(|| format!("opening input image {}", path.display()))?;
    let (w, h) = (dyn_img.width() as usize, dyn_img.height() as usize);

    let data: Vec<f64> = if dyn_img.color().has_color() {
        dyn_img
            .to_rgb32f()
            .pixels()
            .map(|p| {
                let [r, g, b] = p.0;
                LUMA_WEIGHTS[0] * f64::from(r)
                    + LUMA_WEIGHTS[1] * f64::from(g)
                    + LUMA_WEIGHTS[2] * f64::from(b)
            })
            .collect()
    } else {
        dyn_img
            .to_luma32f()
            .pixels()
            .map(|p| f64::from(p.0[0]))
            .collect()
    };

    Image::from_vec(w, h, data)
        .with_context(|| format!("constructing image from {}", path.display()))
}

/// Loads every supported image under `dir`, sorted by file name.
///
/// Falls back to [`synthetic_corpus`] when `dir` is `None`, missing, or
/// holds no supported images.
pub fn load_corpus(dir: Option<&Path>) -> Result<Vec<CorpusImage>> {
    let Some(dir) = dir else {
        warn!("no corpus directory given; using the synthetic corpus");
        return Ok(synthetic_corpus());
    };
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "corpus directory missing; using the synthetic corpus");
        return Ok(synthetic_corpus());
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let path = entry
            .with_context(|| format!("listing {}", dir.display()))?
            .path();
        let supported = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
        if supported && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    if paths.is_empty() {
        warn!(dir = %dir.display(), "corpus directory holds no images; using the synthetic corpus");
        return Ok(synthetic_corpus());
    }

    paths
        .iter()
        .map(|path| {
            let image = read_image(path)?;
            let name = path
                .file_name()
                .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
            debug!(%name, width = image.width(), height = image.height(), "loaded corpus image");
            Ok(CorpusImage { name, image })
        })
        .collect()
}

/// Smooth generated images covering square, wide and odd-sized inputs.
pub fn synthetic_corpus() -> Vec<CorpusImage> {
    let gradient = Image::from_fn(256, 256, |x, y| (x + y) as f64 / 510.0);

    let checker = Image::from_fn(200, 150, |x, y| {
        let u = (x as f64 * std::f64::consts::PI / 32.0).sin();
        let v = (y as f64 * std::f64::consts::PI / 32.0).sin();
        0.5 + 0.5 * u * v
    });

    let (cx, cy) = (65.0, 48.0);
    let blob = Image::from_fn(131, 97, |x, y| {
        let d2 = (x as f64 - cx).powi(2) + (y as f64 - cy).powi(2);
        (-d2 / (2.0 * 30.0 * 30.0)).exp()
    });

    vec![
        CorpusImage {
            name: "synthetic-gradient".into(),
            image: gradient,
        },
        CorpusImage {
            name: "synthetic-checkerboard".into(),
            image: checker,
        },
        CorpusImage {
            name: "synthetic-blob".into(),
            image: blob,
        },
    ]
}

#[cfg(test)]
mod tests {
    use image::{GrayImage, Luma, Rgb, RgbImage};

    use super::{load_corpus, read_image, synthetic_corpus};

    #[test]
    fn gray_png_is_normalized() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gray.png");
        GrayImage::from_fn(4, 2, |x, _| Luma([if x == 0 { 0 } else { 255 }]))
            .save(&path)
            .expect("save");

        let img = read_image(&path).expect("decodes");
        assert_eq!(img.shape(), (2, 4));
        assert_eq!(img.get(0, 1), Some(&0.0));
        assert_eq!(img.get(3, 1), Some(&1.0));
    }

    #[test]
    fn rgb_uses_luminance_weights() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("green.png");
        RgbImage::from_pixel(3, 3, Rgb([0, 255, 0])).save(&path).expect("save");

        let img = read_image(&path).expect("decodes");
        let v = *img.get(1, 1).expect("in bounds");
        assert!((v - 0.7154).abs() < 1e-6);
    }

    #[test]
    fn corpus_is_sorted_and_skips_other_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["b.png", "a.png"] {
            GrayImage::new(8, 8).save(dir.path().join(name)).expect("save");
        }
        std::fs::write(dir.path().join("notes.txt"), "not an image").expect("write");

        let corpus = load_corpus(Some(dir.path())).expect("loads");
        let names: Vec<_> = corpus.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
    }

    #[test]
    fn missing_or_empty_directory_falls_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(load_corpus(Some(dir.path())).expect("falls back").len(), 3);
        let missing = dir.path().join("nope");
        assert_eq!(load_corpus(Some(&missing)).expect("falls back").len(), 3);
        assert_eq!(load_corpus(None).expect("falls back").len(), 3);
    }

    #[test]
    fn synthetic_images_stay_in_unit_range() {
        for item in synthetic_corpus() {
            let lo = item.image.min_value().expect("non-empty");
            let hi = item.image.max_value().expect("non-empty");
            assert!(lo >= 0.0 && hi <= 1.0, "{} out of range", item.name);
        }
    }
}
