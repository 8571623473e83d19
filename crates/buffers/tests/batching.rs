use buffers::RolloutBuffer;
use state::{State, StateIndex};
use std::collections::BTreeMap;
use tensor::{Key, Tensor};

type Observation = BTreeMap<&'static str, Tensor>;

const LEN: usize = 12;

#[allow(clippy::cast_precision_loss)]
fn step_value(t: usize) -> f32 {
    t as f32
}

/// Every field encodes the step it was recorded at.
fn tagged() -> (RolloutBuffer<Observation, Tensor<usize>>, StateIndex) {
    let steps: Vec<f32> = (0..LEN).map(step_value).collect();
    let position = StateIndex::new(Tensor::zeros(vec![2]));
    let states: Vec<State> = (0..LEN)
        .map(|t| {
            State::new(&position)
                .set(&position, Tensor::vector(vec![step_value(t), -step_value(t)]))
                .unwrap()
        })
        .collect();

    let mut observations = BTreeMap::new();
    observations.insert("step", Tensor::vector(steps.clone()));
    observations.insert(
        "pixels",
        Tensor::from_vec(
            vec![LEN, 2, 2],
            (0..LEN * 4).map(|i| step_value(i / 4)).collect(),
        )
        .unwrap(),
    );

    let buffer = RolloutBuffer::builder()
        .observations(observations)
        .actions(Tensor::arange(LEN))
        .rewards(steps.clone())
        .terminations(Tensor::vector((0..LEN).map(|t| t % 3 == 0).collect()))
        .truncations(Tensor::vector((0..LEN).map(|t| t % 4 == 0).collect()))
        .log_probs(steps.iter().map(|s| -s).collect::<Vec<_>>())
        .values(steps.iter().map(|s| s * 2.0).collect::<Vec<_>>())
        .states(State::stack(&states).unwrap())
        .build()
        .unwrap();
    (buffer, position)
}

fn flat<T: Copy>(t: &Tensor<T>) -> Vec<T> {
    t.data().to_vec()
}

#[test]
fn keyless_batches_reshape_back_to_the_original() {
    let (buffer, position) = tagged();
    for batch_size in [1, 2, 3, 4, 6, 12] {
        let batched = buffer.batches(batch_size, None).unwrap();
        assert_eq!(batched.shape(), &[LEN / batch_size, batch_size]);

        assert_eq!(flat(batched.rewards()), flat(buffer.rewards()));
        assert_eq!(flat(batched.actions()), flat(buffer.actions()));
        assert_eq!(flat(batched.terminations()), flat(buffer.terminations()));
        assert_eq!(flat(batched.truncations()), flat(buffer.truncations()));
        assert_eq!(flat(batched.log_probs()), flat(buffer.log_probs()));
        assert_eq!(flat(batched.values()), flat(buffer.values()));
        for (name, leaf) in batched.observations() {
            assert_eq!(flat(leaf), flat(&buffer.observations()[name]));
        }
        assert_eq!(
            batched.observations()["pixels"].shape(),
            &[LEN / batch_size, batch_size, 2, 2]
        );
        assert_eq!(
            flat(batched.states().get(&position).unwrap()),
            flat(buffer.states().get(&position).unwrap())
        );
        // NaN targets travel with the rest.
        assert!(batched.returns().data().iter().all(|v| v.is_nan()));
    }
}

#[test]
fn shuffled_batches_keep_fields_aligned() {
    let (buffer, position) = tagged();
    let batched = buffer.batches(4, Some(Key::new(2024))).unwrap();
    assert_eq!(batched.shape(), &[3, 4]);

    let order = flat(batched.actions());
    let mut sorted = order.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..LEN).collect::<Vec<_>>());
    assert_ne!(order, sorted, "permutation should not be the identity");

    let states = batched.states().get(&position).unwrap().data();
    let pixels = batched.observations()["pixels"].data();
    for (i, &t) in order.iter().enumerate() {
        let tag = step_value(t);
        assert_eq!(batched.rewards().data()[i], tag);
        assert_eq!(batched.log_probs().data()[i], -tag);
        assert_eq!(batched.values().data()[i], tag * 2.0);
        assert_eq!(batched.terminations().data()[i], t % 3 == 0);
        assert_eq!(batched.truncations().data()[i], t % 4 == 0);
        assert_eq!(batched.observations()["step"].data()[i], tag);
        assert!(pixels[i * 4..i * 4 + 4].iter().all(|&p| p == tag));
        assert_eq!(&states[i * 2..i * 2 + 2], &[tag, -tag]);
    }
}

#[test]
fn targets_are_batched_with_their_steps() {
    let (buffer, _) = tagged();
    let computed = buffer
        .compute_returns_and_advantages(0.0f32, true, 0.95, 0.99)
        .unwrap();
    let batched = computed.batches(3, Some(Key::new(1))).unwrap();
    for (i, &t) in batched.actions().data().iter().enumerate() {
        assert_eq!(batched.advantages().data()[i], computed.advantages().data()[t]);
        assert_eq!(batched.returns().data()[i], computed.returns().data()[t]);
    }
}

#[test]
fn single_batch_selection() {
    let (buffer, _) = tagged();
    let batched = buffer.batches(6, None).unwrap();
    let second = batched.batch(1).unwrap();
    assert_eq!(second.shape(), &[6]);
    assert_eq!(flat(second.actions()), (6..12).collect::<Vec<_>>());
    assert!(batched.batch(2).is_err());
}
