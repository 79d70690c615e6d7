//! A reference-counted arena for lambda terms.
//!
//! The first `capacity` allocations bump a cursor for amortized O(1)
//! allocation; once slots are freed, a free-list recycles them instead.
//! Allocation past `capacity` still succeeds — it falls through to plain
//! `Vec::push`, losing the O(1)-via-cursor property but not correctness.

use serde::{Deserialize, Serialize};

use super::term::Term;

/// A handle to a term living in a [`Pool`]. Opaque and copyable; the
/// referent's lifetime is governed by its reference count, not by this
/// handle's own lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermId(u32);

impl TermId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

struct Slot {
    term: Option<Term>,
    ref_count: u32,
    structural_hash: u64,
}

/// The small-object pool backing term allocation.
pub struct Pool {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    cursor: usize,
    capacity: usize,
}

impl Pool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            cursor: 0,
            capacity,
        }
    }

    /// Allocate a fresh term with reference count 1.
    pub fn alloc(&mut self, term: Term) -> TermId {
        let hash = super::alpha::structural_hash(&term, self);
        if let Some(index) = self.free_list.pop() {
            self.slots[index as usize] = Slot {
                term: Some(term),
                ref_count: 1,
                structural_hash: hash,
            };
            return TermId(index);
        }

        if self.cursor < self.capacity && self.cursor == self.slots.len() {
            self.cursor += 1;
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            term: Some(term),
            ref_count: 1,
            structural_hash: hash,
        });
        TermId(index)
    }

    pub fn get(&self, id: TermId) -> &Term {
        self.slots[id.index()]
            .term
            .as_ref()
            .expect("dereferencing a freed TermId")
    }

    pub fn structural_hash(&self, id: TermId) -> u64 {
        self.slots[id.index()].structural_hash
    }

    pub fn ref_count(&self, id: TermId) -> u32 {
        self.slots[id.index()].ref_count
    }

    /// Increment `id`'s reference count and return it unchanged, mirroring
    /// the "every edge increments the referent's count" ownership rule.
    pub fn retain(&mut self, id: TermId) -> TermId {
        self.slots[id.index()].ref_count += 1;
        id
    }

    /// Decrement `id`'s reference count, recursively releasing children
    /// and freeing the slot once the count reaches zero.
    pub fn release(&mut self, id: TermId) {
        let slot = &mut self.slots[id.index()];
        debug_assert!(slot.ref_count > 0, "release on a slot with zero refs");
        slot.ref_count -= 1;
        if slot.ref_count > 0 {
            return;
        }

        let term = slot.term.take().expect("live slot always holds a term");
        self.free_list.push(id.0);

        match term {
            Term::Variable(_) => {}
            Term::Abstraction { body, .. } => self.release(body),
            Term::Application { function, argument } => {
                self.release(function);
                self.release(argument);
            }
        }
    }

    /// Deep-clone the term rooted at `id`, allocating fresh slots for the
    /// whole subtree (used where sharing would be unsound, e.g. duplicating
    /// an argument across several substitution sites that might later
    /// diverge in reference count bookkeeping).
    pub fn deep_clone(&mut self, id: TermId) -> TermId {
        let cloned = match self.get(id).clone() {
            Term::Variable(var_id) => Term::Variable(var_id),
            Term::Abstraction { var_id, body } => {
                let body = self.deep_clone(body);
                Term::Abstraction { var_id, body }
            }
            Term::Application { function, argument } => {
                let function = self.deep_clone(function);
                let argument = self.deep_clone(argument);
                Term::Application { function, argument }
            }
        };
        self.alloc(cloned)
    }

    /// Number of slots currently live (reachable via some `TermId` with a
    /// positive reference count).
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.term.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retain_then_release_returns_to_starting_count() {
        let mut pool = Pool::new(16);
        let id = pool.alloc(Term::Variable(0));
        assert_eq!(pool.ref_count(id), 1);

        pool.retain(id);
        assert_eq!(pool.ref_count(id), 2);

        pool.release(id);
        assert_eq!(pool.ref_count(id), 1);
        assert_eq!(pool.live_count(), 1);
    }

    #[test]
    fn releasing_to_zero_frees_the_slot_and_recycles_it() {
        let mut pool = Pool::new(16);
        let id = pool.alloc(Term::Variable(0));
        pool.release(id);
        assert_eq!(pool.live_count(), 0);

        let next = pool.alloc(Term::Variable(1));
        assert_eq!(next.0, id.0, "freed slot should be recycled");
    }

    #[test]
    fn releasing_an_abstraction_recursively_frees_its_body() {
        let mut pool = Pool::new(16);
        let var = pool.alloc(Term::Variable(0));
        let abs = pool.alloc(Term::Abstraction { var_id: 0, body: var });
        pool.release(abs);
        assert_eq!(pool.live_count(), 0);
    }

    #[test]
    fn allocation_past_capacity_still_succeeds() {
        let mut pool = Pool::new(2);
        let ids: Vec<_> = (0..10).map(|i| pool.alloc(Term::Variable(i))).collect();
        assert_eq!(ids.len(), 10);
        assert_eq!(pool.live_count(), 10);
    }
}
