use pv_core::{BorderMode, Image, map_index};

use crate::kernel::GaussianKernel1D;

pub fn convolve_f64(
    signal: &[f64],
    kernel: &[f64],
    radius: usize,
    border: &BorderMode,
    out: &mut [f64],
) {
    assert_eq!(out.len(), signal.len(), "out must match signal length");
    assert_eq!(
        kernel.len(),
        2 * radius + 1,
        "kernel len must be 2*radius+1"
    );

    let n = signal.len();
    if n == 0 {
        return;
    }

    if n > 2 * radius {
        convolve_split(signal, kernel, radius, border, out);
        return;
    }

    convolve_bordered(signal, kernel, radius, border, out, 0..n);
}

/// Interior samples skip index mapping; only the two border bands go
/// through `map_index`.
fn convolve_split(
    signal: &[f64],
    kernel: &[f64],
    radius: usize,
    border: &BorderMode,
    out: &mut [f64],
) {
    let n = signal.len();
    let klen = kernel.len();

    convolve_bordered(signal, kernel, radius, border, out, 0..radius);

    for i in radius..n - radius {
        let window = &signal[i - radius..=i + radius];
        let mut acc = 0.0f64;
        for k in 0..klen {
            acc += window[k] * kernel[klen - 1 - k];
        }
        out[i] = acc;
    }

    convolve_bordered(signal, kernel, radius, border, out, n - radius..n);
}

fn convolve_bordered(
    signal: &[f64],
    kernel: &[f64],
    radius: usize,
    border: &BorderMode,
    out: &mut [f64],
    range: core::ops::Range<usize>,
) {
    let n = signal.len();
    for i in range {
        let mut acc = 0.0f64;
        for (k, &kv) in kernel.iter().enumerate() {
            let idx = i as isize + radius as isize - k as isize;
            if let Some(j) = map_index(idx, n, border) {
                acc += signal[j] * kv;
            }
        }
        out[i] = acc;
    }
}

/// Separable 2D blur: rows first, then columns.
pub fn blur_separable(
    src: &Image<f64>,
    kernel: &GaussianKernel1D,
    border: &BorderMode,
) -> Image<f64> {
    let (h, w) = src.shape();
    let mut tmp = Image::new_fill(w, h, 0.0f64);
    if src.is_empty() {
        return tmp;
    }

    for y in 0..h {
        convolve_f64(src.row(y), &kernel.weights, kernel.radius, border, tmp.row_mut(y));
    }

    let mut out = Image::new_fill(w, h, 0.0f64);
    let mut column = vec![0.0f64; h];
    let mut column_out = vec![0.0f64; h];
    for x in 0..w {
        for (y, c) in column.iter_mut().enumerate() {
            *c = tmp.data()[y * w + x];
        }
        convolve_f64(&column, &kernel.weights, kernel.radius, border, &mut column_out);
        for (y, &v) in column_out.iter().enumerate() {
            out.data_mut()[y * w + x] = v;
        }
    }

    out
}
