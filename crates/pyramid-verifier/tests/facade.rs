use pyramid_verifier::Image;
use pyramid_verifier::oracle::ReferencePyramid;
use pyramid_verifier::submission::{PyramidSubmission, SampleSubmission};
use pyramid_verifier::verify::{
    ApproximateImageComparator, PyramidInvariantValidator, PyramidKind, TestCase,
};

#[test]
fn sample_pyramid_matches_reference_through_the_facade() {
    let img = Image::from_fn(96, 64, |x, y| (x as f64 / 95.0 + y as f64 / 63.0) * 0.5);
    let case = TestCase::new("facade", &img, 3, 5);

    let (pyr, filter_vec) = SampleSubmission
        .build_gaussian_pyramid(&img, 3, 5)
        .expect("sample builds");
    PyramidInvariantValidator::default()
        .validate(&case, PyramidKind::Gaussian, &pyr, &filter_vec)
        .expect("sample pyramid is valid");

    let reference = ReferencePyramid::gaussian(&img, 3, case.min_level_dim);
    assert_eq!(pyr.len(), reference.num_levels());
    for (level, expected) in pyr.iter().zip(reference.levels()) {
        ApproximateImageComparator::default()
            .compare("gaussian level", level, expected)
            .expect("levels agree with the reference");
    }
}
