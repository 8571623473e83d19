#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! # State
//!
//! Mutable per-module state, threaded through pure calls as a value.
//!
//! Modules never hold their state themselves. Instead they own
//! [`StateIndex`] markers and report them through [`Stateful`]; a [`State`]
//! container maps every marker to its current tensor. A composed module lends
//! the slots belonging to a child with [`State::substate`], hands that slice
//! to the child, and merges the child's result back with [`State::update`].
//!
//! Lending is tracked in the container itself. While a slot is lent, the
//! parent holds only a placeholder: reading it, lending it again, or merging
//! back a slice that does not match the lease are all errors.

pub mod error;

pub use error::StateError;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use tensor::{Tensor, TensorError, Tree};

static NEXT_INDEX: AtomicU64 = AtomicU64::new(1);
static NEXT_LEASE: AtomicU64 = AtomicU64::new(1);

/// Identity of one piece of module state, together with its initial value.
#[derive(Clone, Debug)]
pub struct StateIndex {
    id: u64,
    init: Tensor,
}

impl StateIndex {
    /// Allocates a fresh identity.
    #[must_use]
    pub fn new(init: Tensor) -> Self {
        Self {
            id: NEXT_INDEX.fetch_add(1, Ordering::Relaxed),
            init,
        }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn init(&self) -> &Tensor {
        &self.init
    }
}

impl PartialEq for StateIndex {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for StateIndex {}

/// Anything that owns state slots, directly or through its children.
pub trait Stateful {
    /// Every index owned by this module and its descendants.
    fn state_indices(&self) -> Vec<StateIndex> {
        Vec::new()
    }
}

impl Stateful for StateIndex {
    fn state_indices(&self) -> Vec<StateIndex> {
        vec![self.clone()]
    }
}

impl<T: Stateful + ?Sized> Stateful for &T {
    fn state_indices(&self) -> Vec<StateIndex> {
        (**self).state_indices()
    }
}

impl<A: Stateful, B: Stateful> Stateful for (A, B) {
    fn state_indices(&self) -> Vec<StateIndex> {
        let mut indices = self.0.state_indices();
        indices.extend(self.1.state_indices());
        indices
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Slot {
    Live(Tensor),
    Lent { lease: u64, shape: Vec<usize> },
}

/// Container of module state slots.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct State {
    slots: BTreeMap<u64, Slot>,
    lease: Option<u64>,
}

impl State {
    /// A container holding the initial value of every slot `module` owns.
    #[must_use]
    pub fn new(module: &impl Stateful) -> Self {
        let slots = module
            .state_indices()
            .into_iter()
            .map(|index| (index.id, Slot::Live(index.init)))
            .collect();
        Self { slots, lease: None }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn contains(&self, index: &StateIndex) -> bool {
        self.slots.contains_key(&index.id)
    }

    #[must_use]
    pub fn is_lent(&self, index: &StateIndex) -> bool {
        matches!(self.slots.get(&index.id), Some(Slot::Lent { .. }))
    }

    /// Number of slots currently lent out of this container.
    #[must_use]
    pub fn lent_count(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| matches!(slot, Slot::Lent { .. }))
            .count()
    }

    pub fn get(&self, index: &StateIndex) -> Result<&Tensor, StateError> {
        match self.slots.get(&index.id) {
            Some(Slot::Live(value)) => Ok(value),
            Some(Slot::Lent { .. }) => Err(StateError::Lent(index.id)),
            None => Err(StateError::UnknownIndex(index.id)),
        }
    }

    /// Replaces a live slot. The new value must keep the slot's shape.
    pub fn set(mut self, index: &StateIndex, value: Tensor) -> Result<Self, StateError> {
        let current = self.get(index)?;
        if current.shape() != value.shape() {
            return Err(StateError::ShapeMismatch {
                index: index.id,
                expected: current.shape().to_vec(),
                found: value.shape().to_vec(),
            });
        }
        self.slots.insert(index.id, Slot::Live(value));
        Ok(self)
    }

    /// Lends every slot owned by `owner`.
    ///
    /// Returns the remaining container, in which those slots are placeholders,
    /// and the extracted slice. The slice must come back through
    /// [`State::update`] on the returned container.
    pub fn substate(mut self, owner: &impl Stateful) -> Result<(Self, Self), StateError> {
        let ids: BTreeSet<u64> = owner.state_indices().iter().map(StateIndex::id).collect();
        for id in &ids {
            match self.slots.get(id) {
                Some(Slot::Live(_)) => {}
                Some(Slot::Lent { .. }) => return Err(StateError::AlreadyLent(*id)),
                None => return Err(StateError::UnknownIndex(*id)),
            }
        }

        let lease = NEXT_LEASE.fetch_add(1, Ordering::Relaxed);
        let mut lent = BTreeMap::new();
        for id in ids {
            if let Some(Slot::Live(value)) = self.slots.remove(&id) {
                let shape = value.shape().to_vec();
                self.slots.insert(id, Slot::Lent { lease, shape });
                lent.insert(id, Slot::Live(value));
            }
        }
        tracing::trace!(lease, slots = lent.len(), "lent substate");

        let sub = Self {
            slots: lent,
            lease: Some(lease),
        };
        Ok((self, sub))
    }

    /// Merges a slice produced by [`State::substate`] back into this container.
    ///
    /// The slice must cover exactly the slots lent under its lease, keep each
    /// slot's shape, and have no nested lease still outstanding.
    pub fn update(mut self, sub: Self) -> Result<Self, StateError> {
        let lease = sub.lease.ok_or(StateError::NotASubstate)?;
        let outstanding = sub.lent_count();
        if outstanding > 0 {
            return Err(StateError::OutstandingLease(outstanding));
        }

        let lent: BTreeMap<u64, &Vec<usize>> = self
            .slots
            .iter()
            .filter_map(|(id, slot)| match slot {
                Slot::Lent { lease: l, shape } if *l == lease => Some((*id, shape)),
                _ => None,
            })
            .collect();

        if let Some(id) = lent.keys().find(|id| !sub.slots.contains_key(id)) {
            return Err(StateError::StructureMismatch {
                lease,
                detail: format!("slot {id} is missing from the substate"),
            });
        }
        for (id, slot) in &sub.slots {
            let Some(expected) = lent.get(id) else {
                return Err(StateError::StructureMismatch {
                    lease,
                    detail: format!("slot {id} was not lent under this lease"),
                });
            };
            if let Slot::Live(value) = slot {
                if value.shape() != expected.as_slice() {
                    return Err(StateError::ShapeMismatch {
                        index: *id,
                        expected: expected.to_vec(),
                        found: value.shape().to_vec(),
                    });
                }
            }
        }

        tracing::trace!(lease, slots = sub.slots.len(), "merged substate");
        self.slots.extend(sub.slots);
        Ok(self)
    }

    /// Stacks per-step containers into one whose slots gain a leading axis.
    ///
    /// Every container must hold the same live slots with the same shapes.
    pub fn stack(states: &[State]) -> Result<Self, StateError> {
        let first = states.first().ok_or(TensorError::Empty)?;
        let mut slots = BTreeMap::new();
        for (&id, slot) in &first.slots {
            if let Slot::Lent { .. } = slot {
                return Err(StateError::Lent(id));
            }
            let values = states
                .iter()
                .map(|state| match state.slots.get(&id) {
                    Some(Slot::Live(value)) => Ok(value.clone()),
                    Some(Slot::Lent { .. }) => Err(StateError::Lent(id)),
                    None => Err(StateError::UnknownIndex(id)),
                })
                .collect::<Result<Vec<_>, _>>()?;
            slots.insert(id, Slot::Live(Tensor::stack(&values)?));
        }
        if let Some(extra) = states.iter().find(|s| s.slots.len() != first.slots.len()) {
            let id = extra
                .slots
                .keys()
                .find(|id| !first.slots.contains_key(id))
                .copied()
                .unwrap_or_default();
            return Err(StateError::UnknownIndex(id));
        }
        Ok(Self { slots, lease: None })
    }
}

impl Tree for State {
    fn for_each_shape(&self, f: &mut dyn FnMut(&[usize])) {
        for slot in self.slots.values() {
            match slot {
                Slot::Live(value) => f(value.shape()),
                Slot::Lent { shape, .. } => f(shape),
            }
        }
    }

    fn take(&self, indices: &Tensor<usize>) -> Result<Self, TensorError> {
        let slots = self
            .slots
            .iter()
            .map(|(&id, slot)| match slot {
                Slot::Live(value) => Ok((id, Slot::Live(value.take(indices)?))),
                Slot::Lent { .. } => Err(TensorError::InvalidLeaf("state slot is lent")),
            })
            .collect::<Result<_, _>>()?;
        Ok(Self {
            slots,
            lease: self.lease,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Leaf {
        counter: StateIndex,
    }

    impl Leaf {
        fn new() -> Self {
            Self {
                counter: StateIndex::new(Tensor::scalar(0.0)),
            }
        }
    }

    impl Stateful for Leaf {
        fn state_indices(&self) -> Vec<StateIndex> {
            vec![self.counter.clone()]
        }
    }

    struct Parent {
        own: StateIndex,
        child: Leaf,
    }

    impl Stateful for Parent {
        fn state_indices(&self) -> Vec<StateIndex> {
            let mut indices = vec![self.own.clone()];
            indices.extend(self.child.state_indices());
            indices
        }
    }

    fn parent() -> Parent {
        Parent {
            own: StateIndex::new(Tensor::vector(vec![1.0, 2.0])),
            child: Leaf::new(),
        }
    }

    #[test]
    fn new_collects_initial_values() {
        let p = parent();
        let state = State::new(&p);
        assert_eq!(state.len(), 2);
        assert_eq!(state.get(&p.own).unwrap().data(), &[1.0, 2.0]);
        assert_eq!(state.get(&p.child.counter).unwrap().item(), Some(0.0));
    }

    #[test]
    fn substate_update_round_trip_reproduces_container() {
        let p = parent();
        let original = State::new(&p);
        let (outer, sub) = original.clone().substate(&p.child).unwrap();
        assert_eq!(sub.len(), 1);
        assert!(outer.is_lent(&p.child.counter));
        let merged = outer.update(sub).unwrap();
        assert_eq!(merged, original);
    }

    #[test]
    fn update_keeps_mutations_made_while_lent() {
        let p = parent();
        let (outer, sub) = State::new(&p).substate(&p.child).unwrap();
        let sub = sub.set(&p.child.counter, Tensor::scalar(5.0)).unwrap();
        let merged = outer.update(sub).unwrap();
        assert_eq!(merged.get(&p.child.counter).unwrap().item(), Some(5.0));
        assert_eq!(merged.get(&p.own).unwrap().data(), &[1.0, 2.0]);
        assert_eq!(merged.lent_count(), 0);
    }

    #[test]
    fn lent_slot_cannot_be_read_or_lent_again() {
        let p = parent();
        let (outer, _sub) = State::new(&p).substate(&p.child).unwrap();
        assert_eq!(
            outer.get(&p.child.counter),
            Err(StateError::Lent(p.child.counter.id()))
        );
        let again = outer.substate(&p.child);
        assert!(matches!(again, Err(StateError::AlreadyLent(_))));
    }

    #[test]
    fn merging_a_slice_from_another_lease_fails() {
        let p = parent();
        let (outer, _sub) = State::new(&p).substate(&p.child).unwrap();
        let (_, foreign) = State::new(&p).substate(&p.own).unwrap();
        let result = outer.update(foreign);
        assert!(
            matches!(result, Err(StateError::StructureMismatch { .. })),
            "Expected StructureMismatch, got {result:?}"
        );
    }

    #[test]
    fn merging_a_root_container_fails() {
        let p = parent();
        let (outer, _sub) = State::new(&p).substate(&p.child).unwrap();
        assert_eq!(outer.update(State::default()), Err(StateError::NotASubstate));
    }

    #[test]
    fn nested_lease_must_be_returned_first() {
        let p = parent();
        let (outer, sub) = State::new(&p).substate(&p).unwrap();
        let (inner, inner_sub) = sub.substate(&p.child).unwrap();
        assert_eq!(
            outer.clone().update(inner.clone()),
            Err(StateError::OutstandingLease(1))
        );
        let inner = inner.update(inner_sub).unwrap();
        assert!(outer.update(inner).is_ok());
    }

    #[test]
    fn set_rejects_shape_change() {
        let p = parent();
        let result = State::new(&p).set(&p.own, Tensor::scalar(3.0));
        assert!(matches!(result, Err(StateError::ShapeMismatch { .. })));
    }

    #[test]
    fn unknown_owner_cannot_be_extracted() {
        let p = parent();
        let stranger = Leaf::new();
        let result = State::new(&p).substate(&stranger);
        assert!(matches!(result, Err(StateError::UnknownIndex(_))));
    }

    #[test]
    fn stack_adds_time_axis_and_gathers() {
        let p = parent();
        let steps: Vec<State> = (0..3u8)
            .map(|i| {
                State::new(&p)
                    .set(&p.child.counter, Tensor::scalar(f32::from(i)))
                    .unwrap()
            })
            .collect();
        let stacked = State::stack(&steps).unwrap();
        assert_eq!(stacked.get(&p.child.counter).unwrap().data(), &[0.0, 1.0, 2.0]);
        assert_eq!(stacked.get(&p.own).unwrap().shape(), &[3, 2]);

        let reversed = stacked.take(&Tensor::vector(vec![2, 1, 0])).unwrap();
        assert_eq!(reversed.get(&p.child.counter).unwrap().data(), &[2.0, 1.0, 0.0]);
    }
}
