use pv_core::Image;
use tracing::debug;

use crate::failure::Failure;
use crate::geometry::{canvas_shape, level_shape};

/// Slack on the per-level `[0, 1]` normalization of rendered content.
const NORMALIZED_EPS: f64 = 1e-9;

/// One level's slot on the canvas: columns `[offset, offset + width)`,
/// content rows `[0, height)`, padding rows `[height, canvas_rows)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelSlot {
    pub level: usize,
    pub offset: usize,
    pub width: usize,
    pub height: usize,
}

/// Slots for `levels` levels of a `(rows, cols)` base, left to right.
pub fn level_slots(rows: usize, cols: usize, levels: usize) -> Vec<LevelSlot> {
    let mut offset = 0;
    (0..levels)
        .map(|level| {
            let (height, width) = level_shape(rows, cols, level);
            let slot = LevelSlot {
                level,
                offset,
                width,
                height,
            };
            offset += width;
            slot
        })
        .collect()
}

/// `1` wherever the canvas must be blank padding, `0` elsewhere.
pub fn padding_mask(rows: usize, cols: usize, levels: usize) -> Image<u8> {
    let (canvas_rows, canvas_cols) = canvas_shape(rows, cols, levels);
    let mut mask = Image::new_fill(canvas_cols, canvas_rows, 0u8);
    for slot in level_slots(rows, cols, levels) {
        for y in slot.height..canvas_rows {
            mask.row_mut(y)[slot.offset..slot.offset + slot.width].fill(1);
        }
    }
    mask
}

/// Checks a rendered canvas against the geometry of its source image.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderLayoutValidator;

impl RenderLayoutValidator {
    pub fn validate(
        &self,
        canvas: &Image<f64>,
        original: &Image<f64>,
        levels: usize,
    ) -> Result<(), Failure> {
        let (rows, cols) = original.shape();
        let expected = canvas_shape(rows, cols, levels);
        if canvas.width() != expected.1 {
            return Err(Failure::geometric("rendered canvas width", expected.1, canvas.width()));
        }
        if canvas.height() != expected.0 {
            return Err(Failure::geometric(
                "rendered canvas height",
                expected.0,
                canvas.height(),
            ));
        }

        self.check_padding(canvas, rows, cols, levels)?;
        self.check_content_range(canvas, rows, cols, levels)?;
        debug!(levels, width = canvas.width(), "rendered layout holds");
        Ok(())
    }

    fn check_padding(
        &self,
        canvas: &Image<f64>,
        rows: usize,
        cols: usize,
        levels: usize,
    ) -> Result<(), Failure> {
        let mask = padding_mask(rows, cols, levels);
        let width = canvas.width();

        let mut nonzero = 0usize;
        let mut first = None;
        for (idx, (&m, &v)) in mask.data().iter().zip(canvas.data()).enumerate() {
            if m == 1 && v != 0.0 {
                nonzero += 1;
                first.get_or_insert((idx % width, idx / width, v));
            }
        }

        let Some((x, y, value)) = first else {
            return Ok(());
        };
        let level = level_slots(rows, cols, levels)
            .iter()
            .find(|slot| x >= slot.offset && x < slot.offset + slot.width)
            .map_or(0, |slot| slot.level);
        Err(Failure::Padding {
            level,
            nonzero,
            x,
            y,
            value,
        })
    }

    /// Each level is stretched independently, so its content must lie in
    /// `[0, 1]`.
    fn check_content_range(
        &self,
        canvas: &Image<f64>,
        rows: usize,
        cols: usize,
        levels: usize,
    ) -> Result<(), Failure> {
        let view = canvas.as_view();
        for slot in level_slots(rows, cols, levels) {
            let content = view
                .subview(slot.offset, 0, slot.width, slot.height)
                .map_err(|_| Failure::geometric("level slot", (slot.height, slot.width), canvas.shape()))?;
            let outside = content.pixels().find(|&(_, _, &v)| {
                v.is_nan() || !(-NORMALIZED_EPS..=1.0 + NORMALIZED_EPS).contains(&v)
            });
            if let Some((x, y, &value)) = outside {
                return Err(Failure::ValueRange {
                    what: "rendered level value".into(),
                    level: slot.level,
                    x: slot.offset + x,
                    y,
                    value,
                    low: 0.0,
                    high: 1.0,
                });
            }
        }
        Ok(())
    }
}
