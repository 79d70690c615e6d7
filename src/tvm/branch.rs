//! 2-bit saturating-counter branch predictor, same indexing scheme as the
//! instruction cache.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CounterState {
    StronglyNotTaken = 0,
    WeaklyNotTaken = 1,
    WeaklyTaken = 2,
    StronglyTaken = 3,
}

impl CounterState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => CounterState::StronglyNotTaken,
            1 => CounterState::WeaklyNotTaken,
            2 => CounterState::WeaklyTaken,
            _ => CounterState::StronglyTaken,
        }
    }

    fn increment(self) -> Self {
        CounterState::from_u8((self as u8).saturating_add(1).min(3))
    }

    fn decrement(self) -> Self {
        CounterState::from_u8((self as u8).saturating_sub(1))
    }

    fn predicts_taken(self) -> bool {
        (self as u8) >= CounterState::WeaklyTaken as u8
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    address: i32,
    counter: u8,
    initialized: bool,
}

#[derive(Debug, Clone)]
pub struct BranchPredictor {
    slots: Vec<Slot>,
    capacity_mask: usize,
}

impl BranchPredictor {
    /// `capacity` must be a power of two. Fresh slots cold-start at
    /// `StronglyNotTaken`.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity.is_power_of_two(), "branch predictor capacity must be a power of two");
        Self {
            slots: vec![Slot::default(); capacity],
            capacity_mask: capacity - 1,
        }
    }

    fn index(&self, address: i32) -> usize {
        (address as usize) & self.capacity_mask
    }

    fn state_at(&self, address: i32) -> CounterState {
        let slot = &self.slots[self.index(address)];
        if slot.initialized && slot.address == address {
            CounterState::from_u8(slot.counter)
        } else {
            CounterState::StronglyNotTaken
        }
    }

    /// Predict whether the branch at `address` will be taken.
    pub fn predict(&self, address: i32) -> bool {
        self.state_at(address).predicts_taken()
    }

    /// Record the actual outcome, updating the saturating counter.
    pub fn resolve(&mut self, address: i32, taken: bool) {
        let state = self.state_at(address);
        let next = if taken { state.increment() } else { state.decrement() };
        let index = self.index(address);
        self.slots[index] = Slot {
            address,
            counter: next as u8,
            initialized: true,
        };
    }
}
