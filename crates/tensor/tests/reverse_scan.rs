use tensor::{try_scan, Key, Tensor, TensorError, Tree};

// Discounted sum computed the way the buffers crate does it: flip the time
// axis, fold, then flip the stacked outputs back.
fn discounted(rewards: &Tensor, gamma: f32) -> Result<Tensor, TensorError> {
    let rows = rewards.flip0()?.rows()?;
    let init = Tensor::zeros(rewards.row_shape().to_vec());
    let (_, outputs) = try_scan(init, rows, |carry: Tensor, r: Tensor| {
        let next = r.add(&carry.scale(gamma))?;
        Ok::<_, TensorError>((next.clone(), next))
    })?;
    Tensor::stack(&outputs)?.flip0()
}

#[test]
fn reverse_scan_over_time_axis() {
    let rewards = Tensor::vector(vec![1.0, 1.0, 1.0]);
    let g = discounted(&rewards, 0.5).unwrap();
    assert_eq!(g.data(), &[1.75, 1.5, 1.0]);
}

#[test]
fn reverse_scan_keeps_trailing_batch_axis() {
    // Two environments side by side: shape [T = 2, B = 2].
    let rewards = Tensor::from_vec(vec![2, 2], vec![1.0, 0.0, 1.0, 2.0]).unwrap();
    let g = discounted(&rewards, 1.0).unwrap();
    assert_eq!(g.shape(), &[2, 2]);
    assert_eq!(g.data(), &[2.0, 2.0, 1.0, 2.0]);
}

#[test]
fn shuffled_gather_is_consistent_across_leaves() {
    let a = Tensor::vector((0..8).map(|v| v as f32).collect());
    let b = Tensor::from_vec(vec![8, 2], (0..16).collect()).unwrap();
    let perm = Key::new(123).permutation(8).reshape(vec![4, 2]).unwrap();

    let (ga, gb) = (a, b).take(&perm).unwrap();
    assert_eq!(ga.shape(), &[4, 2]);
    assert_eq!(gb.shape(), &[4, 2, 2]);
    for (i, &row) in ga.data().iter().enumerate() {
        let original = row as usize;
        assert_eq!(gb.data()[i * 2], original * 2);
        assert_eq!(gb.data()[i * 2 + 1], original * 2 + 1);
    }
}
