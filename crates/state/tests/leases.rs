use state::{State, StateError, StateIndex, Stateful};
use tensor::Tensor;

struct Counter {
    count: StateIndex,
}

impl Counter {
    fn new() -> Self {
        Self {
            count: StateIndex::new(Tensor::scalar(0.0)),
        }
    }

    fn bump(&self, state: State) -> Result<State, StateError> {
        let next = state.get(&self.count)?.map(|c| c + 1.0);
        state.set(&self.count, next)
    }
}

impl Stateful for Counter {
    fn state_indices(&self) -> Vec<StateIndex> {
        vec![self.count.clone()]
    }
}

#[test]
fn sibling_slices_are_isolated() {
    let left = Counter::new();
    let right = Counter::new();
    let root = (&left, &right);
    let state = State::new(&root);

    let (state, left_slice) = state.substate(&left).unwrap();
    // The right sibling can still be lent while the left one is out.
    let (state, right_slice) = state.substate(&right).unwrap();

    let left_slice = left.bump(left_slice).unwrap();
    let left_slice = left.bump(left_slice).unwrap();
    assert!(matches!(
        left_slice.get(&right.count),
        Err(StateError::UnknownIndex(_))
    ));

    let state = state.update(left_slice).unwrap();
    let state = state.update(right_slice).unwrap();
    assert_eq!(state.get(&left.count).unwrap().item(), Some(2.0));
    assert_eq!(state.get(&right.count).unwrap().item(), Some(0.0));
}

#[test]
fn slices_must_return_to_their_own_lease() {
    let left = Counter::new();
    let right = Counter::new();
    let root = (&left, &right);

    let (state, left_slice) = State::new(&root).substate(&left).unwrap();
    let (state, right_slice) = state.substate(&right).unwrap();
    drop(right_slice);

    let state = state.update(left_slice).unwrap();
    assert_eq!(state.lent_count(), 1);
    assert!(matches!(state.get(&right.count), Err(StateError::Lent(_))));
}

#[test]
fn a_slice_cannot_be_merged_twice() {
    let counter = Counter::new();
    let (outer, slice) = State::new(&counter).substate(&counter).unwrap();
    let merged = outer.update(slice.clone()).unwrap();
    let result = merged.update(slice);
    assert!(
        matches!(result, Err(StateError::StructureMismatch { .. })),
        "Expected StructureMismatch error, got {result:?}"
    );
}
