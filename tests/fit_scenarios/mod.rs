//! End-to-end fits of the built-in models.

use approx::assert_relative_eq;
use modelfit_rs::data::{CompositeObservation, Dataset, StimulusParameter};
use modelfit_rs::fit::{fit, FitDriver, FitOptions, FitState, ResidualEvaluator};
use modelfit_rs::lm::{ConvergenceStatus, LevenbergMarquardt};
use modelfit_rs::models::{get_model, FlmpModel, SingleChannelModel, REGISTRY};
use modelfit_rs::parameters::{flatten, Bounds, ParameterValue};
use modelfit_rs::{FitError, Model};
use ndarray::Array1;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const A: [f64; 5] = [0.01, 0.04, 0.23, 0.94, 0.99];
const V: [f64; 5] = [0.03, 0.44, 0.82, 0.93, 0.97];

/// Observed audiovisual identification proportions for the same a/v levels.
const AV: [f64; 25] = [
    0.02, 0.02, 0.07, 0.53, 0.76, 0.03, 0.09, 0.20, 0.81, 0.94, 0.13, 0.20, 0.46, 0.96, 0.99,
    0.27, 0.41, 0.68, 0.96, 0.99, 0.28, 0.50, 0.70, 0.99, 0.99,
];

fn av_dataset(composite: Vec<f64>, bias: Option<f64>) -> Dataset {
    let mut parameters = vec![
        StimulusParameter::new("a_params", "Auditory", "A", A.to_vec()),
        StimulusParameter::new("v_params", "Visual", "V", V.to_vec()),
    ];
    if let Some(bias) = bias {
        parameters.push(StimulusParameter::new("bias", "Bias", "B", vec![bias]));
    }
    Dataset::new(parameters, CompositeObservation::new(composite))
}

fn generate(model: &dyn Model, parameters: &[ParameterValue]) -> Vec<f64> {
    model.evaluate(parameters).unwrap().prediction
}

fn av_values() -> Vec<ParameterValue> {
    vec![ParameterValue::Vector(A.to_vec()), ParameterValue::Vector(V.to_vec())]
}

#[test]
fn flmp_identity_fit() {
    let composite = generate(&FlmpModel, &av_values());
    let dataset = av_dataset(composite, None);

    let result = fit(&FlmpModel, &dataset, FitOptions::default()).unwrap();

    assert!(result.rmsd < 1e-3, "rmsd {}", result.rmsd);
    assert!(!result.status.is_budget_exhausted());
    for (fitted, truth) in result.parameters[0].as_slice().iter().zip(A) {
        assert_relative_eq!(*fitted, truth, epsilon = 1e-4);
    }
    for (fitted, truth) in result.parameters[1].as_slice().iter().zip(V) {
        assert_relative_eq!(*fitted, truth, epsilon = 1e-4);
    }
}

#[test]
fn flmp_recovers_parameters_from_perturbed_start() {
    let composite = generate(&FlmpModel, &av_values());
    let (truth, index) = flatten(&av_values());
    let observed: Array1<f64> = truth.iter().chain(&composite).copied().collect();
    let evaluator = ResidualEvaluator::new(&FlmpModel, index, observed);

    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let start = truth.mapv(|x| (x + rng.gen_range(-0.02..0.02)).clamp(0.005, 0.995));

    let solver = LevenbergMarquardt::new().with_max_iterations(500);
    let bounds = vec![Bounds::unit(); truth.len()];
    let solution = solver.minimize_bounded(&evaluator, start, &bounds).unwrap();

    assert!(solution.status.is_converged(), "{}", solution.status);
    for (fitted, expected) in solution.params.iter().zip(truth.iter()) {
        assert!((fitted - expected).abs() < 1e-4, "{} vs {}", fitted, expected);
    }
}

#[test]
fn single_channel_data_is_misfit_by_flmp() {
    let mut values = av_values();
    values.push(ParameterValue::Scalar(0.5));
    let composite = generate(&SingleChannelModel, &values);
    let dataset = av_dataset(composite, Some(0.5));

    let flmp = fit(&FlmpModel, &dataset, FitOptions::default()).unwrap();
    assert!(flmp.rmsd > 1e-3, "rmsd {}", flmp.rmsd);

    let sc = fit(&SingleChannelModel, &dataset, FitOptions::default()).unwrap();
    assert!(sc.rmsd < 1e-3, "rmsd {}", sc.rmsd);
    assert!(sc.parameter("bias").unwrap().is_scalar());
}

#[test]
fn real_data_fit_improves_on_start() {
    let dataset = av_dataset(AV.to_vec(), Some(0.5));

    for model in [&FlmpModel as &dyn Model, &SingleChannelModel] {
        let driver = FitDriver::new(model, &dataset, FitOptions::default()).unwrap();
        let start = start_rmsd(model, &dataset);

        let result = fit(model, &dataset, FitOptions::default()).unwrap();
        assert!(result.rmsd < start, "{}: {} >= {}", model.name(), result.rmsd, start);
        assert_eq!(result.prediction.len(), 25);
        assert_eq!(result.residuals.len(), 25 + driver.index().total_len());
    }
}

/// RMSD of the model evaluated at the observed stimulus values.
fn start_rmsd(model: &dyn Model, dataset: &Dataset) -> f64 {
    let driver = FitDriver::new(model, dataset, FitOptions::default()).unwrap();
    let initial = model
        .evaluate(&modelfit_rs::parameters::unflatten(driver.initial(), driver.index()).unwrap())
        .unwrap();
    modelfit_rs::fit::residuals(driver.observed(), &initial.comparison_vector())
        .map(|r| modelfit_rs::fit::rmsd(&r))
        .unwrap()
}

fn two_level_dataset(a: Vec<f64>, v: Vec<f64>, composite: Vec<f64>) -> Dataset {
    Dataset::new(
        vec![
            StimulusParameter::new("a_params", "Auditory", "A", a),
            StimulusParameter::new("v_params", "Visual", "V", v),
        ],
        CompositeObservation::new(composite),
    )
}

#[test]
fn flmp_moves_a_stimulus_level_observed_on_either_bound() {
    let v = vec![0.3, 0.7];
    let composite = generate(
        &FlmpModel,
        &[ParameterValue::Vector(vec![0.6, 0.5]), ParameterValue::Vector(v.clone())],
    );

    for edge in [0.0, 1.0] {
        let dataset = two_level_dataset(vec![edge, 0.5], v.clone(), composite.clone());
        let start = start_rmsd(&FlmpModel, &dataset);

        let result = fit(&FlmpModel, &dataset, FitOptions::default()).unwrap();
        let a0 = result.parameters[0].as_slice()[0];

        assert!(result.rmsd < 0.75 * start, "edge {}: {} vs {}", edge, result.rmsd, start);
        assert!((a0 - edge).abs() > 0.01, "edge {}: a0 stayed at {}", edge, a0);
        assert!((0.0..=1.0).contains(&a0));
    }
}

#[test]
fn flmp_fit_with_levels_on_both_bounds() {
    let v = vec![0.3, 0.7];
    let composite = generate(
        &FlmpModel,
        &[
            ParameterValue::Vector(vec![0.2, 0.5, 0.8]),
            ParameterValue::Vector(v.clone()),
        ],
    );
    let dataset = two_level_dataset(vec![0.0, 0.5, 1.0], v, composite);
    let start = start_rmsd(&FlmpModel, &dataset);

    let result = fit(&FlmpModel, &dataset, FitOptions::default()).unwrap();
    let a = result.parameters[0].as_slice();

    assert!(result.rmsd < start, "{} >= {}", result.rmsd, start);
    assert!(a[0] > 0.01, "lower level stayed at {}", a[0]);
    assert!(a[2] < 0.99, "upper level stayed at {}", a[2]);
    assert!(result.prediction.iter().all(|p| (0.0..=1.0).contains(p)));
}

#[test]
fn fitted_parameters_stay_in_unit_box() {
    let mut rng = ChaCha8Rng::seed_from_u64(23);
    for _ in 0..10 {
        let a: Vec<f64> = (0..5).map(|_| rng.gen_range(0.1..0.9)).collect();
        let v: Vec<f64> = (0..5).map(|_| rng.gen_range(0.1..0.9)).collect();
        let clean = generate(
            &FlmpModel,
            &[ParameterValue::Vector(a.clone()), ParameterValue::Vector(v.clone())],
        );
        let composite = clean
            .iter()
            .map(|p| (p + rng.gen_range(-0.05..0.05)).clamp(0.0, 1.0))
            .collect();
        let dataset = Dataset::new(
            vec![
                StimulusParameter::new("a_params", "Auditory", "A", a),
                StimulusParameter::new("v_params", "Visual", "V", v),
                StimulusParameter::new("bias", "Bias", "B", vec![rng.gen()]),
            ],
            CompositeObservation::new(composite),
        );

        for model in REGISTRY.iter().skip(1) {
            let result = fit(*model, &dataset, FitOptions::new().with_max_iterations(Some(400)))
                .unwrap();
            for value in &result.parameters {
                assert!(value.as_slice().iter().all(|v| (0.0..=1.0).contains(v)));
            }
            assert!(result.prediction.iter().all(|p| (0.0..=1.0).contains(p)));
        }
    }
}

#[test]
fn composite_of_wrong_length_is_rejected() {
    let dataset = av_dataset(AV[..24].to_vec(), None);
    assert!(matches!(
        FitDriver::new(&FlmpModel, &dataset, FitOptions::default()),
        Err(FitError::Validation(_))
    ));
}

#[test]
fn layout_convention_two_by_two() {
    let dataset = Dataset::new(
        vec![
            StimulusParameter::new("a_params", "A", "A", vec![0.1, 0.9]),
            StimulusParameter::new("v_params", "V", "V", vec![0.2, 0.8]),
        ],
        CompositeObservation::new(vec![0.0; 4]),
    );
    let stimuli = dataset.select(FlmpModel.signature()).unwrap();
    assert_eq!(stimuli.len(), 2);

    let output = FlmpModel
        .evaluate(&[
            ParameterValue::Vector(vec![0.1, 0.9]),
            ParameterValue::Vector(vec![0.2, 0.8]),
        ])
        .unwrap();
    let expected = [
        FlmpModel::combine(0.1, 0.2).unwrap(),
        FlmpModel::combine(0.9, 0.2).unwrap(),
        FlmpModel::combine(0.1, 0.8).unwrap(),
        FlmpModel::combine(0.9, 0.8).unwrap(),
    ];
    assert_eq!(output.prediction, expected);
}

#[test]
fn invalid_model_index() {
    assert!(matches!(
        get_model(REGISTRY.len()),
        Err(FitError::IndexOutOfRange { index: 3, len: 3 })
    ));
}

#[test]
fn evaluation_budget_is_an_outcome() {
    let dataset = av_dataset(AV.to_vec(), None);
    let mut driver =
        FitDriver::new(&FlmpModel, &dataset, FitOptions::new().with_max_iterations(Some(25))).unwrap();

    let result = driver.run().unwrap();
    assert_eq!(driver.state(), FitState::Converged);
    assert_eq!(result.status, ConvergenceStatus::MaxEvaluationsReached);
    assert!(result.evaluations <= 25);
}

#[test]
fn fits_on_independent_threads() {
    let dataset = av_dataset(AV.to_vec(), Some(0.5));
    let results: Vec<f64> = std::thread::scope(|scope| {
        let handles: Vec<_> = REGISTRY[1..]
            .iter()
            .map(|model| {
                let dataset = &dataset;
                scope.spawn(move || fit(*model, dataset, FitOptions::default()).map(|r| r.rmsd))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect()
    });

    let sequential = fit(&FlmpModel, &dataset, FitOptions::default()).unwrap();
    assert_eq!(results[0], sequential.rmsd);
}
