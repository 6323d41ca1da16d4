use pv_verify::FunctionContract;

/// Static requirements on submission source.
///
/// Parameter lists are part of the contract. Reconstruction and rendering
/// must be written without explicit loops; rendering must also be a single
/// expression without `return`. Both builders must return a
/// `(Vec<level>, filter)` pair.
pub fn submission_contracts() -> Vec<FunctionContract> {
    vec![
        FunctionContract::new(
            "build_gaussian_pyramid",
            "image: &Image<f64>, max_levels: usize, filter_size: usize",
        )
        .returns_pyramid_pair(),
        FunctionContract::new(
            "build_laplacian_pyramid",
            "image: &Image<f64>, max_levels: usize, filter_size: usize",
        )
        .returns_pyramid_pair(),
        FunctionContract::new(
            "laplacian_to_image",
            "lpyr: &[Image<f64>], filter_vec: &Image<f64>, coeff: &[f64]",
        )
        .no_loops(),
        FunctionContract::new("render_pyramid", "pyr: &[Image<f64>], levels: usize")
            .no_loops()
            .no_return(),
    ]
}
