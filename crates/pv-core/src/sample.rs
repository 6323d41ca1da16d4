use crate::border::{BorderMode, map_index};
use crate::image::ImageView;

/// Bilinear sample at pixel-center coordinates `(x, y)`.
///
/// Integer coordinates hit pixel centers exactly. Out-of-range neighbors are
/// resolved through `border`. Empty images sample as `0.0`.
pub fn sample_bilinear_f64<T: Copy + Into<f64>>(
    img: &ImageView<'_, T>,
    x: f64,
    y: f64,
    border: &BorderMode,
) -> f64 {
    if img.width() == 0 || img.height() == 0 {
        return 0.0;
    }

    let x0 = x.floor() as isize;
    let y0 = y.floor() as isize;
    let x1 = x0 + 1;
    let y1 = y0 + 1;

    let dx = x - x0 as f64;
    let dy = y - y0 as f64;

    let p00 = sample_at_f64(img, x0, y0, border);
    let p10 = sample_at_f64(img, x1, y0, border);
    let p01 = sample_at_f64(img, x0, y1, border);
    let p11 = sample_at_f64(img, x1, y1, border);

    let top = p00 * (1.0 - dx) + p10 * dx;
    let bottom = p01 * (1.0 - dx) + p11 * dx;
    top * (1.0 - dy) + bottom * dy
}

fn sample_at_f64<T: Copy + Into<f64>>(
    img: &ImageView<'_, T>,
    x: isize,
    y: isize,
    border: &BorderMode,
) -> f64 {
    map_index(x, img.width(), border)
        .zip(map_index(y, img.height(), border))
        .and_then(|(xi, yi)| img.get(xi, yi))
        .map_or(0.0, |&v| v.into())
}
