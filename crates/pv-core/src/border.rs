/// How out-of-range indices fold back onto an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderMode {
    /// `c b | a b c d | c b`, the edge sample is not repeated.
    Reflect101,
    /// `b a | a b c d | d c`.
    Reflect,
}

/// Maps a possibly out-of-range index onto `[0, len)`.
///
/// Returns `None` only for empty axes.
pub fn map_index(i: isize, len: usize, mode: &BorderMode) -> Option<usize> {
    if len == 0 {
        return None;
    }
    if i >= 0 && (i as usize) < len {
        return Some(i as usize);
    }

    match mode {
        BorderMode::Reflect101 => {
            if len == 1 {
                return Some(0);
            }

            let period = (2 * len - 2) as isize;
            let r = i.rem_euclid(period) as usize;
            if r < len {
                Some(r)
            } else {
                Some((2 * len - 2) - r)
            }
        }
        BorderMode::Reflect => {
            let period = (2 * len) as isize;
            let r = i.rem_euclid(period) as usize;
            if r < len {
                Some(r)
            } else {
                Some(2 * len - 1 - r)
            }
        }
    }
}
