//! Property tests for border mapping and strided views.

use proptest::prelude::*;
use pv_core::{BorderMode, Image, map_index};

fn arb_border() -> impl Strategy<Value = BorderMode> {
    prop_oneof![
        Just(BorderMode::Reflect101),
        Just(BorderMode::Reflect),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn mapped_indices_stay_on_the_axis(i in -500isize..500, len in 1usize..40, mode in arb_border()) {
        let j = map_index(i, len, &mode).expect("non-empty axes always map");
        prop_assert!(j < len);
        if (0..len as isize).contains(&i) {
            prop_assert_eq!(j, i as usize);
        }
    }

    #[test]
    fn symmetric_reflect_mirrors_about_the_edge(k in 0usize..20, len in 1usize..40) {
        let k = k % len;
        let left = map_index(-1 - k as isize, len, &BorderMode::Reflect);
        let right = map_index((len + k) as isize, len, &BorderMode::Reflect);
        prop_assert_eq!(left, Some(k));
        prop_assert_eq!(right, Some(len - 1 - k));
    }

    #[test]
    fn subview_pixels_match_parent(
        (w, h, x, y, sw, sh) in (1usize..24, 1usize..24)
            .prop_flat_map(|(w, h)| (Just(w), Just(h), 0..=w, 0..=h))
            .prop_flat_map(|(w, h, x, y)| (Just(w), Just(h), Just(x), Just(y), 0..=w - x, 0..=h - y))
    ) {
        let img = Image::from_fn(w, h, |px, py| (py * w + px) as f64);
        let view = img.as_view();
        let sub = view.subview(x, y, sw, sh).expect("region lies inside the image");

        prop_assert_eq!(sub.pixels().count(), sw * sh);
        for (px, py, &v) in sub.pixels() {
            prop_assert_eq!(Some(&v), img.get(x + px, y + py));
        }
        prop_assert_eq!(sub.to_image().shape(), (sh, sw));
    }
}
