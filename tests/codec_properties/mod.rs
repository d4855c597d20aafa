//! Property checks for the parameter codec and the composite layout,
//! driven by a seeded RNG so failures reproduce.

use modelfit_rs::data::CompositeLayout;
use modelfit_rs::parameters::{flatten, unflatten, BoundsTransform, Bounds, ParameterIndex, ParameterValue};
use modelfit_rs::FitError;
use ndarray::Array1;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const CASES: usize = 200;

fn random_groups(rng: &mut ChaCha8Rng) -> Vec<ParameterValue> {
    let count = rng.gen_range(1..=4);
    (0..count)
        .map(|_| {
            if rng.gen_bool(0.3) {
                ParameterValue::Scalar(rng.gen())
            } else {
                let len = rng.gen_range(2..=7);
                ParameterValue::Vector((0..len).map(|_| rng.gen()).collect())
            }
        })
        .collect()
}

#[test]
fn property_unflatten_inverts_flatten() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for _ in 0..CASES {
        let groups = random_groups(&mut rng);
        let (flat, index) = flatten(&groups);

        assert_eq!(flat.len(), groups.iter().map(ParameterValue::len).sum::<usize>());
        assert_eq!(index.group_count(), groups.len());

        let boundaries = index.boundaries();
        assert_eq!(boundaries[0], 0);
        assert!(boundaries.windows(2).all(|w| w[0] <= w[1]), "{:?}", boundaries);
        assert_eq!(boundaries.last().copied(), Some(flat.len()));

        assert_eq!(unflatten(&flat, &index).unwrap(), groups);
    }
}

#[test]
fn property_flatten_inverts_unflatten() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    for _ in 0..CASES {
        let lengths: Vec<usize> = (0..rng.gen_range(1..=4)).map(|_| rng.gen_range(1..=6)).collect();
        let index = ParameterIndex::from_lengths(lengths.iter().copied());
        let flat: Array1<f64> = (0..index.total_len()).map(|_| rng.gen::<f64>()).collect();

        let groups = unflatten(&flat, &index).unwrap();
        let (again, again_index) = flatten(&groups);
        assert_eq!(again, flat);
        assert_eq!(again_index, index);
    }
}

#[test]
fn property_wrong_length_is_shape_mismatch() {
    let mut rng = ChaCha8Rng::seed_from_u64(13);
    for _ in 0..CASES {
        let groups = random_groups(&mut rng);
        let (flat, index) = flatten(&groups);

        let longer: Array1<f64> = flat.iter().copied().chain([0.5]).collect();
        assert!(matches!(unflatten(&longer, &index), Err(FitError::ShapeMismatch(_))));

        let shorter = flat.slice(ndarray::s![..flat.len() - 1]).to_owned();
        assert!(matches!(unflatten(&shorter, &index), Err(FitError::ShapeMismatch(_))));
    }
}

#[test]
fn empty_group_unflattens_to_empty_vector() {
    let index = ParameterIndex::from_lengths([2, 0, 1]);
    let flat = Array1::from_vec(vec![0.1, 0.2, 0.3]);

    let groups = unflatten(&flat, &index).unwrap();
    assert_eq!(groups[1], ParameterValue::Vector(Vec::new()));
    assert_eq!(groups[2], ParameterValue::Scalar(0.3));
}

#[test]
fn property_layout_position_round_trips() {
    let mut rng = ChaCha8Rng::seed_from_u64(17);
    for _ in 0..CASES {
        let lengths: Vec<usize> = (0..rng.gen_range(1..=3)).map(|_| rng.gen_range(1..=5)).collect();
        let layout = CompositeLayout::new(lengths.clone());

        for position in 0..layout.size() {
            let levels = layout.levels(position).unwrap();
            assert_eq!(layout.position(&levels), Some(position));
        }
        // first parameter varies fastest
        if layout.size() > 1 && lengths[0] > 1 {
            assert_eq!(layout.levels(1).unwrap()[0], 1);
        }
        assert!(layout.levels(layout.size()).is_none());
    }
}

#[test]
fn property_bounds_transform_stays_in_unit_box() {
    let mut rng = ChaCha8Rng::seed_from_u64(19);
    let transform = BoundsTransform::new(Bounds::unit());
    for _ in 0..CASES {
        let internal = rng.gen_range(-50.0..50.0);
        let external = transform.to_external(internal);
        assert!((0.0..=1.0).contains(&external), "{} -> {}", internal, external);

        let value: f64 = rng.gen();
        let back = transform.to_external(transform.to_internal(value).unwrap());
        assert!((back - value).abs() < 1e-9, "{} -> {}", value, back);
    }
}
