use std::thread;

use inference_engine::kernels::affine::AffineConfig;
use inference_engine::kernels::normalization::BatchNormalizationConfig;
use inference_engine::kernels::softmax::SoftmaxConfig;
use inference_engine::{
    Codec, DataRepresentation, ExecutionPath, Function, FunctionConfig, FunctionState,
    FunctionType, Shape, Variable, VariableRef,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use runtime_config::{DispatchPolicy, EngineConfig};

fn shape(dims: &[usize]) -> Shape {
    Shape::new(dims.to_vec()).unwrap()
}

fn float(dims: &[usize], values: &[f32]) -> VariableRef {
    VariableRef::new(Variable::from_f32(shape(dims), values).unwrap())
}

fn zeros(dims: &[usize]) -> VariableRef {
    VariableRef::new(Variable::new(DataRepresentation::Float32, shape(dims)))
}

fn engine(dispatch: DispatchPolicy) -> EngineConfig {
    EngineConfig {
        dispatch,
        ..EngineConfig::default()
    }
}

fn affine(inputs: Vec<VariableRef>, output: VariableRef) -> Function {
    Function::new(
        FunctionConfig::Affine(AffineConfig::default()),
        inputs,
        vec![output],
    )
}

fn random(rng: &mut StdRng, len: usize) -> Vec<f32> {
    (0..len).map(|_| rng.gen_range(-2.0f32..2.0)).collect()
}

#[test]
fn affine_end_to_end_with_bias() {
    let y = zeros(&[1, 3]);
    let mut f = affine(
        vec![
            float(&[1, 2], &[1.0, 2.0]),
            float(&[2, 3], &[1.0, 0.0, 1.0, 0.0, 1.0, 1.0]),
            float(&[3], &[0.0, 0.0, 1.0]),
        ],
        y.clone(),
    );
    f.allocate(&EngineConfig::default()).unwrap();
    f.execute().unwrap();
    // [1*1 + 2*0, 1*0 + 2*1, 1*1 + 2*1 + 1]
    assert_eq!(y.read().as_f32(), &[1.0, 2.0, 4.0]);
    f.release().unwrap();
}

#[test]
fn affine_end_to_end_without_bias() {
    let y = zeros(&[1, 3]);
    let mut f = affine(
        vec![
            float(&[1, 2], &[1.0, 2.0]),
            float(&[2, 3], &[1.0, 0.0, 1.0, 0.0, 1.0, 1.0]),
        ],
        y.clone(),
    );
    f.allocate(&EngineConfig::default()).unwrap();
    f.execute().unwrap();
    assert_eq!(y.read().as_f32(), &[1.0, 2.0, 3.0]);
}

#[test]
fn affine_input_arity() {
    let x = float(&[1, 2], &[1.0, 2.0]);
    let w = float(&[2, 3], &[0.0; 6]);
    let b = float(&[3], &[0.0; 3]);

    let accepted = [vec![x.clone(), w.clone()], vec![x.clone(), w.clone(), b.clone()]];
    for inputs in accepted {
        let mut f = affine(inputs, zeros(&[1, 3]));
        assert!(f.allocate(&EngineConfig::default()).is_ok());
    }

    let rejected = [vec![x.clone()], vec![x, w, b.clone(), b]];
    for inputs in rejected {
        let count = inputs.len();
        let mut f = affine(inputs, zeros(&[1, 3]));
        let err = f.allocate(&EngineConfig::default()).unwrap_err();
        assert!(err.is_arity());
        assert!(err.is_contract_violation());
        assert_eq!(
            err.to_string(),
            format!("Affine: expected 2 or 3 inputs, got {}", count)
        );
        assert_eq!(f.state(), FunctionState::Unallocated);
    }
}

#[test]
fn double_release_is_a_no_op() {
    let mut f = affine(
        vec![float(&[1, 2], &[1.0, 2.0]), float(&[2, 1], &[1.0, 1.0])],
        zeros(&[1, 1]),
    );
    f.allocate(&EngineConfig::default()).unwrap();
    f.release().unwrap();
    f.release().unwrap();
    assert_eq!(f.state(), FunctionState::Released);
    assert_eq!(
        f.config(),
        &FunctionConfig::Affine(AffineConfig { base_axis: 1 })
    );
    assert!(f.execute().unwrap_err().is_lifecycle());
}

#[test]
fn affine_paths_agree_on_random_shapes() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..25 {
        let outer = rng.gen_range(1..4);
        let input_dims = [outer, rng.gen_range(1..5), rng.gen_range(1..4)];
        let output_inner = rng.gen_range(1..6);
        let input_inner = input_dims[1] * input_dims[2];

        let x = float(&input_dims, &random(&mut rng, outer * input_inner));
        let w = float(
            &[input_inner, output_inner],
            &random(&mut rng, input_inner * output_inner),
        );
        let b = float(&[output_inner], &random(&mut rng, output_inner));

        let fast = zeros(&[outer, output_inner]);
        let generic = zeros(&[outer, output_inner]);

        let mut f = affine(vec![x.clone(), w.clone(), b.clone()], fast.clone());
        f.allocate(&engine(DispatchPolicy::PerExecute)).unwrap();
        assert_eq!(f.execution_path(), Some(ExecutionPath::Float));
        f.execute().unwrap();

        let mut g = affine(vec![x, w, b], generic.clone());
        g.allocate(&engine(DispatchPolicy::GenericOnly)).unwrap();
        g.execute().unwrap();

        let fast = fast.read().as_f32().to_vec();
        let generic = generic.read().as_f32().to_vec();
        let fast_bits: Vec<u32> = fast.iter().map(|v| v.to_bits()).collect();
        let generic_bits: Vec<u32> = generic.iter().map(|v| v.to_bits()).collect();
        assert_eq!(fast_bits, generic_bits, "shape {:?}", input_dims);
    }
}

#[test]
fn axis_kernels_paths_agree() {
    let mut rng = StdRng::seed_from_u64(7);
    let dims = [2, 3, 4];
    let x = float(&dims, &random(&mut rng, 24));

    let softmax = FunctionConfig::Softmax(SoftmaxConfig { axis: Some(1) });
    let channels: Vec<VariableRef> = (0..4)
        .map(|i| {
            let mut values = random(&mut rng, 3);
            if i == 3 {
                values.iter_mut().for_each(|v| *v = v.abs() + 0.1);
            }
            float(&[3], &values)
        })
        .collect();
    let norm = FunctionConfig::BatchNormalization(BatchNormalizationConfig::default());

    let cases = [
        (softmax, vec![x.clone()]),
        (norm, std::iter::once(x).chain(channels).collect()),
    ];
    for (config, inputs) in cases {
        let mut results = Vec::new();
        for policy in [DispatchPolicy::CachedAtAllocate, DispatchPolicy::GenericOnly] {
            let y = zeros(&dims);
            let mut f = Function::new(config.clone(), inputs.clone(), vec![y.clone()]);
            f.allocate(&engine(policy)).unwrap();
            f.execute().unwrap();
            let values = y.read().as_f32().to_vec();
            results.push(values);
        }
        assert_eq!(results[0], results[1], "{:?}", config);
    }
}

#[test]
fn quantized_weights_take_generic_path() {
    for representation in [
        DataRepresentation::Float16,
        DataRepresentation::Int16,
        DataRepresentation::Int8,
    ] {
        let w = VariableRef::new(
            Variable::from_values(
                representation,
                shape(&[2, 3]),
                4,
                &[1.0, 0.0, 1.0, 0.0, 1.0, 1.0],
            )
            .unwrap(),
        );
        let y = zeros(&[1, 3]);
        let mut f = affine(vec![float(&[1, 2], &[1.0, 2.0]), w], y.clone());
        f.allocate(&EngineConfig::default()).unwrap();
        assert_eq!(f.execution_path(), Some(ExecutionPath::Generic));
        f.execute().unwrap();
        assert_eq!(y.read().as_f32(), &[1.0, 2.0, 3.0], "{}", representation);
    }
}

#[test]
fn representation_round_trip_within_precision() {
    let mut rng = StdRng::seed_from_u64(42);
    for (representation, position, range) in [
        (DataRepresentation::Float16, 0, 100.0f32),
        (DataRepresentation::Int16, 8, 100.0),
        (DataRepresentation::Int8, 3, 15.0),
    ] {
        let codec = Codec::select(representation);
        let mut v = Variable::new(representation, shape(&[64]))
            .with_fixed_point_position(position)
            .unwrap();
        let values: Vec<f32> = (0..64).map(|_| rng.gen_range(-range..range)).collect();
        for (i, &x) in values.iter().enumerate() {
            codec.encode(&mut v, i, x);
        }
        let precision = codec.precision(&v);
        for (i, &x) in values.iter().enumerate() {
            let tolerance = precision * x.abs().max(1.0);
            assert!((codec.decode(&v, i) - x).abs() <= tolerance, "{} {}", representation, x);
        }
    }
}

#[test]
fn kinds_without_kernels_are_rejected() {
    let missing: Vec<FunctionType> = FunctionType::ALL
        .iter()
        .copied()
        .filter(|kind| !kind.has_kernel())
        .collect();
    assert!(missing.contains(&FunctionType::Convolution));

    for kind in missing {
        let mut f = Function::new(
            FunctionConfig::Unimplemented(kind),
            vec![zeros(&[1])],
            vec![zeros(&[1])],
        );
        let err = f.allocate(&EngineConfig::default()).unwrap_err();
        assert!(err.is_unimplemented(), "{}", kind);
    }
}

#[test]
fn independent_graphs_run_on_separate_threads() {
    let handles: Vec<_> = (0..4)
        .map(|t| {
            thread::spawn(move || {
                let scale = (t + 1) as f32;
                let y = zeros(&[2, 2]);
                let mut f = affine(
                    vec![
                        float(&[2, 2], &[1.0, 0.0, 0.0, 1.0]),
                        float(&[2, 2], &[scale, 0.0, 0.0, scale]),
                    ],
                    y.clone(),
                );
                f.allocate(&EngineConfig::default()).unwrap();
                for _ in 0..100 {
                    f.execute().unwrap();
                }
                f.release().unwrap();
                let values = y.read().as_f32().to_vec();
                values
            })
        })
        .collect();

    for (t, handle) in handles.into_iter().enumerate() {
        let scale = (t + 1) as f32;
        assert_eq!(handle.join().unwrap(), vec![scale, 0.0, 0.0, scale]);
    }
}

#[test]
fn function_moves_between_threads() {
    let y = zeros(&[1, 1]);
    let mut f = affine(
        vec![float(&[1, 2], &[1.0, 2.0]), float(&[2, 1], &[3.0, 4.0])],
        y.clone(),
    );
    f.allocate(&EngineConfig::default()).unwrap();
    let f = thread::spawn(move || {
        f.execute().unwrap();
        f
    })
    .join()
    .unwrap();
    assert_eq!(f.state(), FunctionState::Ready);
    assert_eq!(y.read().as_f32(), &[11.0]);
}
