use datagen_core::common::EvaluatorConfig;
use datagen_core::data::{
    EndlElasticData, NativeElasticData, load_endl_elastic_data, load_native_elastic_data,
};
use datagen_core::domain::{
    BivariateGridPolicy, DataGenError, TwoDInterpolationPolicy,
};
use datagen_core::modules::elastic::{
    Advisory, ConfigurationError, CoupledElasticMomentsEvaluator, DiscreteAngles,
    ElasticMomentsEvaluator, ElectronElasticDataEvaluator, EvaluatorError, MomentsError, Notice,
};
use datagen_core::numerics::special::{
    LongFloat, RadauRule, SloanRadauQuadrature, legendre_values_long, long,
};
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn endl_fixture() -> EndlElasticData {
    load_endl_elastic_data(fixture_path("endl_uniform.json")).expect("ENDL fixture should load")
}

fn native_fixture() -> NativeElasticData {
    load_native_elastic_data(fixture_path("native_aluminum.json"))
        .expect("native fixture should load")
}

fn assert_scalar_close(label: &str, expected: f64, actual: f64, abs_tol: f64, rel_tol: f64) {
    let abs_diff = (actual - expected).abs();
    let rel_diff = abs_diff / expected.abs().max(1.0);
    assert!(
        abs_diff <= abs_tol || rel_diff <= rel_tol,
        "{label}: expected {expected}, got {actual} (abs {abs_diff}, rel {rel_diff})"
    );
}

#[test]
fn uniform_endl_distribution_gives_single_discrete_angle() {
    let evaluator = ElectronElasticDataEvaluator::from_endl(
        &endl_fixture(),
        EvaluatorConfig {
            number_of_moment_preserving_angles: 1,
            ..EvaluatorConfig::default()
        },
    )
    .expect("evaluator should build");

    let result = evaluator
        .evaluate_elastic_secondary_distribution(&[])
        .expect("distribution should evaluate");

    assert_eq!(result.angular_energy_grid, vec![1e-5, 1e5]);
    assert!(result.notices.is_empty());
    for (index, energy) in result.angular_energy_grid.iter().enumerate() {
        let angles = result
            .moment_preserving_angles
            .get(*energy)
            .expect("angles are tabulated");
        let weights = result
            .moment_preserving_weights
            .get(*energy)
            .expect("weights are tabulated");
        assert_eq!(angles.len(), 1);
        assert_scalar_close("angle", 0.933_333_333_326_667_1, angles[0], 1e-10, 0.0);
        assert_scalar_close("weight", 1.0, weights[0], 1e-15, 0.0);
        assert_scalar_close(
            "reduction",
            0.750_007_499_925_004_5,
            result.moment_preserving_cross_section_reduction[index],
            1e-10,
            0.0,
        );
    }
}

#[test]
fn two_point_grid_passes_tabulated_distributions_through() {
    let data = native_fixture();
    let evaluator = ElectronElasticDataEvaluator::from_native(&data, EvaluatorConfig::default())
        .expect("evaluator should build");
    let grid = [1e-5, 1e5];

    let result = evaluator
        .evaluate_elastic_secondary_distribution(&grid)
        .expect("distribution should evaluate");

    assert_eq!(result.angular_energy_grid, grid.to_vec());
    for energy in grid {
        assert_eq!(
            result.elastic_angle.get(energy),
            data.cutoff_elastic_angles.get(energy)
        );
        assert_eq!(result.elastic_pdf.get(energy), data.cutoff_elastic_pdf.get(energy));
    }
    assert_eq!(result.moment_preserving_cross_section_reduction.len(), 2);
}

#[test]
fn endl_flip_round_trips() {
    let raw_angle = [1e-6, 0.25, 0.5, 1.5, 2.0];
    let raw_pdf = [5.0, 4.0, 3.0, 2.0, 1.0];
    let (angle, pdf) = ElectronElasticDataEvaluator::calculate_elastic_angle_cosine(&raw_angle, &raw_pdf);

    assert_eq!(angle, vec![-1.0, -0.5, 0.5, 0.75, 0.999999]);
    assert_eq!(pdf, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    let n = angle.len();
    for (index, raw) in raw_angle.iter().enumerate() {
        assert_scalar_close("raw angle", *raw, 1.0 - angle[n - 1 - index], 1e-16, 0.0);
    }
}

#[test]
fn screened_rutherford_split_drops_the_zeroed_prefix() {
    let split = ElectronElasticDataEvaluator::evaluate_screened_rutherford_cross_section(
        &[10.0, 10.0],
        &[10.0, 0.0],
        1e-6,
    )
    .expect("split should evaluate");
    assert_eq!(split.threshold_index, 1);
    assert_eq!(split.cross_section, vec![10.0]);
}

#[test]
fn screened_rutherford_split_conserves_the_total() {
    let data = native_fixture();
    let split = ElectronElasticDataEvaluator::evaluate_default_screened_rutherford_cross_section(
        &data.total_elastic_cross_section,
        &data.cutoff_elastic_cross_section,
    )
    .expect("split should evaluate");

    assert_eq!(split.threshold_index, 1);
    for (offset, rutherford) in split.cross_section.iter().enumerate() {
        let index = split.threshold_index + offset;
        assert_scalar_close(
            "total",
            data.total_elastic_cross_section[index],
            rutherford + data.cutoff_elastic_cross_section[index],
            1e-14,
            1e-14,
        );
    }
}

#[test]
fn discrete_weights_are_normalized_and_preserve_moments() {
    let evaluator =
        ElectronElasticDataEvaluator::from_native(&native_fixture(), EvaluatorConfig::default())
            .expect("evaluator should build");
    let moments = moments_evaluator(&evaluator);

    for energy in [1e-5, 1e-3, 1.0, 1e5] {
        let discrete =
            ElectronElasticDataEvaluator::calculate_discrete_angles_and_weights(&moments, energy, 2)
                .expect("discrete angles should evaluate");
        assert_eq!(discrete.angles.len(), 2, "energy {energy}");
        assert_scalar_close("weight sum", 1.0, discrete.weights.iter().sum(), 1e-14, 0.0);
        assert!(discrete.cross_section_reduction > 0.0 && discrete.cross_section_reduction <= 1.0);
        assert!(discrete.angles.iter().all(|angle| *angle > -1.0 && *angle < 1.0));

        let legendre = moments
            .evaluate_elastic_moments(energy, 4, 1e-13)
            .expect("moments should evaluate");
        let rule = SloanRadauQuadrature::new(&legendre)
            .radau_nodes_and_weights(3)
            .expect("rule should exist");
        let legendre_f64: Vec<f64> = legendre.iter().map(|moment| f64::from(*moment)).collect();
        for (order, residual) in rule.moment_residuals(&legendre_f64).iter().enumerate() {
            assert!(residual.abs() < 1e-12, "energy {energy} order {order}: {residual}");
        }
    }
}

fn moments_evaluator(evaluator: &ElectronElasticDataEvaluator) -> CoupledElasticMomentsEvaluator {
    let angular = evaluator
        .evaluate_analog_elastic_secondary_distribution()
        .expect("angular distribution should evaluate");
    evaluator
        .moments_evaluator(&angular)
        .expect("moments evaluator should build")
}

/// Residuals of the full rule behind `discrete`: the returned angles with their
/// weights scaled back by the reduction, plus the forward node.
fn discrete_rule_residuals(discrete: &DiscreteAngles, legendre: &[f64]) -> Vec<f64> {
    let mut nodes = discrete.angles.clone();
    nodes.push(1.0);
    let mut weights: Vec<f64> = discrete
        .weights
        .iter()
        .map(|weight| weight * discrete.cross_section_reduction)
        .collect();
    weights.push(1.0 - discrete.cross_section_reduction);
    RadauRule {
        requested_nodes: nodes.len(),
        nodes,
        weights,
    }
    .moment_residuals(legendre)
}

#[test]
fn three_and_four_discrete_angles_preserve_all_rule_moments() {
    let evaluator =
        ElectronElasticDataEvaluator::from_native(&native_fixture(), EvaluatorConfig::default())
            .expect("evaluator should build");
    let moments = moments_evaluator(&evaluator);

    for angle_count in [3, 4] {
        for energy in [1e-5, 1e-3, 1.0, 1e5] {
            let discrete = ElectronElasticDataEvaluator::calculate_discrete_angles_and_weights(
                &moments,
                energy,
                angle_count,
            )
            .expect("discrete angles should evaluate");
            assert_eq!(discrete.angles.len(), angle_count, "energy {energy}");
            assert_eq!(discrete.truncation_notice(energy, angle_count), None);
            assert!(discrete.angles.windows(2).all(|pair| pair[0] < pair[1]));
            assert!(discrete.weights.iter().all(|weight| *weight > 0.0));

            let legendre: Vec<f64> = moments
                .evaluate_elastic_moments(energy, 2 * angle_count, 1e-13)
                .expect("moments should evaluate")
                .iter()
                .map(|moment| f64::from(*moment))
                .collect();
            let residuals = discrete_rule_residuals(&discrete, &legendre);
            assert_eq!(residuals.len(), 2 * angle_count + 1);
            for (order, residual) in residuals.iter().enumerate() {
                assert!(
                    residual.abs() < 1e-11,
                    "N={angle_count} energy {energy} order {order}: {residual}"
                );
            }
        }
    }
}

/// Moments of a three-point distribution, two of its points below the forward peak.
struct ThreePointMoments;

impl ElasticMomentsEvaluator for ThreePointMoments {
    fn evaluate_elastic_moments(
        &self,
        _energy: f64,
        order: usize,
        _precision: f64,
    ) -> Result<Vec<LongFloat>, MomentsError> {
        let mut moments = vec![long(0.0); order + 1];
        for (angle, weight) in [(0.92, 0.2), (0.97, 0.3), (1.0, 0.5)] {
            let values = legendre_values_long(long(angle), order);
            for (moment, value) in moments.iter_mut().zip(values) {
                *moment += long(weight) * value;
            }
        }
        Ok(moments)
    }
}

#[test]
fn under_supported_moments_return_fewer_discrete_angles() {
    let discrete = ElectronElasticDataEvaluator::calculate_discrete_angles_and_weights(
        &ThreePointMoments,
        1.0,
        4,
    )
    .expect("discrete angles should evaluate");

    assert_eq!(discrete.angles.len(), 2);
    assert!(discrete.angles.len() < 4);
    assert_scalar_close("angle 0", 0.92, discrete.angles[0], 1e-12, 0.0);
    assert_scalar_close("angle 1", 0.97, discrete.angles[1], 1e-12, 0.0);
    assert_scalar_close("weight 0", 0.4, discrete.weights[0], 1e-12, 0.0);
    assert_scalar_close("weight 1", 0.6, discrete.weights[1], 1e-12, 0.0);
    // Forward weight 0.5 removed; the reduction is what the free nodes carry.
    assert_scalar_close("reduction", 0.5, discrete.cross_section_reduction, 1e-12, 0.0);
    assert_eq!(
        discrete.truncation_notice(1.0, 4),
        Some(Notice::DiscreteAnglesTruncated {
            energy: 1.0,
            requested: 4,
            supported: 2,
        })
    );

    let legendre: Vec<f64> = ThreePointMoments
        .evaluate_elastic_moments(1.0, 8, 1e-13)
        .expect("moments should evaluate")
        .iter()
        .map(|moment| f64::from(*moment))
        .collect();
    for (order, residual) in discrete_rule_residuals(&discrete, &legendre).iter().enumerate() {
        assert!(residual.abs() < 1e-12, "order {order}: {residual}");
    }
}

#[test]
fn clamped_min_energy_matches_grid_front() {
    let data = endl_fixture();
    let clamped = ElectronElasticDataEvaluator::from_endl(
        &data,
        EvaluatorConfig {
            min_energy: 1e-7,
            ..EvaluatorConfig::default()
        },
    )
    .expect("evaluator should build");
    let direct = ElectronElasticDataEvaluator::from_endl(&data, EvaluatorConfig::default())
        .expect("evaluator should build");

    assert_eq!(clamped.min_energy(), direct.min_energy());
    assert_eq!(
        clamped.advisories(),
        &[Advisory::MinEnergyClamped {
            requested: 1e-7,
            applied: 1e-5,
        }]
    );
    assert!(direct.advisories().is_empty());
}

#[test]
fn angle_and_pdf_tables_share_keys_for_every_policy() {
    let data = native_fixture();
    let grids = [
        BivariateGridPolicy::Direct,
        BivariateGridPolicy::UnitBase,
        BivariateGridPolicy::Correlated,
        BivariateGridPolicy::UnitBaseCorrelated,
    ];
    let interps = [
        TwoDInterpolationPolicy::LogLogLog,
        TwoDInterpolationPolicy::LinLinLin,
        TwoDInterpolationPolicy::LinLinLog,
    ];

    for two_d_grid in grids {
        for two_d_interp in interps {
            for generate in [false, true] {
                let config = EvaluatorConfig {
                    min_energy: 1e-3,
                    max_energy: 10.0,
                    two_d_grid,
                    two_d_interp,
                    generate_new_distribution_at_min_and_max_energy: generate,
                    ..EvaluatorConfig::default()
                };
                let evaluator = ElectronElasticDataEvaluator::from_native(&data, config)
                    .expect("evaluator should build");
                let angular = evaluator
                    .evaluate_analog_elastic_secondary_distribution()
                    .expect("analog distribution should evaluate");

                let label = format!("{two_d_grid} {two_d_interp} {generate}");
                assert!(angular.elastic_angle.same_keys(&angular.elastic_pdf), "{label}");
                assert_eq!(
                    angular.elastic_angle.keys().collect::<Vec<_>>(),
                    angular.angular_energy_grid,
                    "{label}"
                );
                for (energy, angles) in angular.elastic_angle.iter() {
                    let pdf = angular.elastic_pdf.get(energy).expect("keys match");
                    assert_eq!(angles.len(), pdf.len(), "{label} at {energy}");
                    assert!(pdf.iter().all(|value| *value >= 0.0), "{label} at {energy}");
                }
            }
        }
    }
}

#[test]
fn unknown_policy_string_is_an_input_error() {
    let mut data = native_fixture();
    data.electron_two_d_grid_policy = "Histogram".to_string();

    let error = ElectronElasticDataEvaluator::from_native_basic(&data, false)
        .expect_err("policy is unknown");
    assert!(matches!(
        &error,
        EvaluatorError::Configuration(ConfigurationError::UnsupportedPolicy { value, .. })
            if value == "Histogram"
    ));

    let error = DataGenError::from(error);
    assert_eq!(error.exit_code(), 2);
    assert!(error.diagnostic_line().contains("'Histogram'"));
}

#[test]
fn evaluators_run_in_parallel_over_shared_tables() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ElectronElasticDataEvaluator>();

    let evaluator =
        ElectronElasticDataEvaluator::from_native(&native_fixture(), EvaluatorConfig::default())
            .expect("evaluator should build");
    let coarse_evaluator = evaluator
        .reconfigured(EvaluatorConfig {
            number_of_moment_preserving_angles: 1,
            ..EvaluatorConfig::default()
        })
        .expect("settings are valid");

    let (fine, coarse) = std::thread::scope(|scope| {
        let fine = scope.spawn(|| evaluator.evaluate_elastic_secondary_distribution(&[]));
        let coarse = scope.spawn(|| coarse_evaluator.evaluate_elastic_secondary_distribution(&[]));
        (
            fine.join().expect("thread should finish"),
            coarse.join().expect("thread should finish"),
        )
    });
    let fine = fine.expect("fine distribution should evaluate");
    let coarse = coarse.expect("coarse distribution should evaluate");

    assert_eq!(fine.angular_energy_grid, coarse.angular_energy_grid);
    assert_eq!(fine.elastic_pdf, coarse.elastic_pdf);
    for energy in &fine.angular_energy_grid {
        assert_eq!(fine.moment_preserving_angles.get(*energy).map(<[f64]>::len), Some(2));
        assert_eq!(coarse.moment_preserving_angles.get(*energy).map(<[f64]>::len), Some(1));
    }
}
