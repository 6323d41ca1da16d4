//! Case registry.
//!
//! Cases are registered explicitly, in the order they run. The registry is
//! built once from a [`Fixture`], so the total is known before the first
//! case starts.

use pv_core::Image;
use pv_submission::{PyramidSubmission, submission_contracts};
use pv_verify::{Failure, PyramidKind, TestCase};

use crate::checks::{
    check_against_oracle, check_exact_length, check_idempotent, check_oracle_reconstruction,
    check_pyramid, check_reconstruction, check_render, render_levels,
};
use crate::fixture::Fixture;
use crate::stress::{EdgeMatrix, random_matrix};

const RENDER_EXTRA_LEVELS: usize = 2;

type CaseBody = Box<dyn Fn(&Fixture, &dyn PyramidSubmission) -> Result<(), Failure>>;

pub struct RegisteredCase {
    pub name: String,
    body: CaseBody,
}

impl RegisteredCase {
    pub fn run(&self, fixture: &Fixture, submission: &dyn PyramidSubmission) -> Result<(), Failure> {
        (self.body)(fixture, submission)
    }
}

impl core::fmt::Debug for RegisteredCase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegisteredCase").field("name", &self.name).finish()
    }
}

#[derive(Debug, Default)]
pub struct Suite {
    cases: Vec<RegisteredCase>,
}

impl Suite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        body: impl Fn(&Fixture, &dyn PyramidSubmission) -> Result<(), Failure> + 'static,
    ) {
        self.cases.push(RegisteredCase {
            name: name.into(),
            body: Box::new(body),
        });
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn cases(&self) -> &[RegisteredCase] {
        &self.cases
    }

    /// Keeps only cases whose name contains `pattern`.
    pub fn retain_matching(&mut self, pattern: &str) {
        self.cases.retain(|case| case.name.contains(pattern));
    }

    /// The full suite over `fixture`: conformance, corpus sweeps, scenario
    /// and boundary cases, edge matrices, random stress matrices.
    pub fn standard(fixture: &Fixture) -> Self {
        let mut suite = Self::new();
        let config = &fixture.config;

        for contract in submission_contracts() {
            let function = contract.name;
            suite.register(format!("conformance/{function}"), move |fx, _| {
                fx.conformance_verdict(&function)
            });
        }

        for (idx, item) in fixture.corpus.iter().enumerate() {
            for kind in [PyramidKind::Gaussian, PyramidKind::Laplacian] {
                for &filter_size in &config.filter_sizes {
                    for &max_levels in &config.max_levels {
                        suite.register(
                            format!(
                                "{}/{}/filter={filter_size}/levels={max_levels}",
                                kind_label(kind),
                                item.name
                            ),
                            move |fx, sub| {
                                let case = corpus_case(fx, idx, max_levels, filter_size);
                                check_pyramid(fx, sub, kind, &case).map(drop)
                            },
                        );
                    }
                }
            }
        }

        let round_trip = config.round_trip;
        for (idx, item) in fixture.corpus.iter().enumerate() {
            let (levels, filter) = (round_trip.max_levels, round_trip.filter_size);
            suite.register(format!("reconstruction/{}", item.name), move |fx, sub| {
                check_reconstruction(fx, sub, &corpus_case(fx, idx, levels, filter))
            });
            suite.register(format!("oracle-gaussian/{}", item.name), move |fx, sub| {
                check_against_oracle(fx, sub, &corpus_case(fx, idx, levels, filter))
            });
            suite.register(format!("oracle-reconstruction/{}", item.name), move |fx, sub| {
                check_oracle_reconstruction(fx, sub, &corpus_case(fx, idx, levels, filter))
            });
            let shown = config.render_levels;
            // Built deeper than rendered so `levels` is actually honored.
            let built = shown + RENDER_EXTRA_LEVELS;
            suite.register(format!("render/{}", item.name), move |fx, sub| {
                check_render(fx, sub, &corpus_case(fx, idx, built, 3), shown)
            });
        }
        if !fixture.corpus.is_empty() {
            let (levels, filter) = (round_trip.max_levels, round_trip.filter_size);
            for kind in [PyramidKind::Gaussian, PyramidKind::Laplacian] {
                suite.register(format!("idempotence/{}", kind_label(kind)), move |fx, sub| {
                    check_idempotent(fx, sub, kind, &corpus_case(fx, 0, levels, filter))
                });
            }
        }

        suite.register("scenario/256x256", |fx, sub| {
            let image = Image::from_fn(256, 256, |x, y| ((x ^ y) & 0xff) as f64 / 255.0);
            let case = TestCase::new("256x256", &image, 4, 3).with_min_level_dim(fx.config.min_level_dim);
            check_exact_length(fx, sub, PyramidKind::Laplacian, &case, 4)?;
            let (pyr, _) = check_exact_length(fx, sub, PyramidKind::Gaussian, &case, 4)?;
            render_levels(sub, &case, &pyr, 4)?;
            render_levels(sub, &case, &pyr, 2)
        });

        suite.register("boundary/single-pixel", |fx, sub| {
            let image = Image::new_fill(1, 1, 0.5);
            for max_levels in [1, 2, 5, 10] {
                let case = TestCase::new("single-pixel", &image, max_levels, 3)
                    .with_min_level_dim(fx.config.min_level_dim);
                for kind in [PyramidKind::Gaussian, PyramidKind::Laplacian] {
                    check_exact_length(fx, sub, kind, &case, 1)?;
                }
            }
            Ok(())
        });

        let edge_filter = config.filter_sizes.first().copied().unwrap_or(3);
        for matrix in EdgeMatrix::ALL {
            let levels = round_trip.max_levels;
            suite.register(format!("stress/{}", matrix.name()), move |fx, sub| {
                let image = matrix.build();
                let case = TestCase::new(matrix.name(), &image, levels, edge_filter)
                    .with_min_level_dim(fx.config.min_level_dim);
                check_pyramid(fx, sub, PyramidKind::Gaussian, &case)?;
                check_reconstruction(fx, sub, &case)
            });
        }

        for index in 0..config.stress.cases {
            suite.register(format!("stress/random-{index}"), move |fx, sub| {
                let matrix = random_matrix(&fx.config.stress, &fx.config.filter_sizes, index);
                let case = TestCase::new(
                    format!("random-{index}"),
                    &matrix.image,
                    matrix.max_levels,
                    matrix.filter_size,
                )
                .with_min_level_dim(fx.config.min_level_dim);
                check_pyramid(fx, sub, PyramidKind::Gaussian, &case)?;
                check_reconstruction(fx, sub, &case)
            });
        }

        suite
    }
}

fn kind_label(kind: PyramidKind) -> &'static str {
    match kind {
        PyramidKind::Gaussian => "gaussian",
        PyramidKind::Laplacian => "laplacian",
    }
}

fn corpus_case(fixture: &Fixture, idx: usize, max_levels: usize, filter_size: usize) -> TestCase<'_> {
    let item = fixture.image(idx);
    TestCase::new(item.name.as_str(), &item.image, max_levels, filter_size)
        .with_min_level_dim(fixture.config.min_level_dim)
}
