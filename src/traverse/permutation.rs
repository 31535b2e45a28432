use crate::error::{KeyhopError, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::collections::HashMap;

/// Seeded Fisher-Yates permutation of `0..capacity`.
///
/// Forward (Durstenfeld) form: for `i` in `0..capacity-1`, draw
/// `j` uniformly from `i..capacity` and swap. Indices are drawn as `u64`
/// from ChaCha20 so 32-bit and 64-bit targets consume the same entropy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permutation {
    seed: u64,
    capacity: usize,
}

impl Permutation {
    pub fn new(seed: u64, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(KeyhopError::AddressOutOfBounds {
                address: 0,
                capacity,
            });
        }
        Ok(Self { seed, capacity })
    }

    pub fn span(&self) -> usize {
        self.capacity
    }

    pub fn walk(&self) -> PermutationWalk {
        PermutationWalk {
            rng: ChaCha20Rng::seed_from_u64(self.seed),
            capacity: self.capacity,
            next: 0,
            displaced: HashMap::new(),
        }
    }
}

/// Lazily runs the shuffle one swap at a time. Only slots touched so far
/// are stored, so taking `n` addresses costs O(n) regardless of capacity.
#[derive(Debug, Clone)]
pub struct PermutationWalk {
    rng: ChaCha20Rng,
    capacity: usize,
    next: usize,
    displaced: HashMap<usize, usize>,
}

impl PermutationWalk {
    fn slot(&self, index: usize) -> usize {
        self.displaced.get(&index).copied().unwrap_or(index)
    }
}

impl Iterator for PermutationWalk {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let i = self.next;
        if i >= self.capacity {
            return None;
        }
        let j = draw(&mut self.rng, i, self.capacity);
        let at_i = self.slot(i);
        let at_j = self.slot(j);
        // slot i is final after this swap and never read again
        self.displaced.insert(j, at_i);
        self.displaced.remove(&i);
        self.next += 1;
        Some(at_j)
    }
}

/// Eagerly shuffle the whole identity sequence
pub fn full_permutation(seed: u64, capacity: usize) -> Vec<usize> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut order: Vec<usize> = (0..capacity).collect();
    for i in 0..capacity {
        let j = draw(&mut rng, i, capacity);
        order.swap(i, j);
    }
    order
}

/// Swap partner for position `i`; the last position swaps with itself without drawing
fn draw(rng: &mut ChaCha20Rng, i: usize, capacity: usize) -> usize {
    if i + 1 >= capacity {
        return i;
    }
    rng.gen_range(i as u64..capacity as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lazy_prefix_matches_full_shuffle() {
        let full = full_permutation(0xDEAD_BEEF, 500);
        let lazy: Vec<usize> = Permutation::new(0xDEAD_BEEF, 500)
            .unwrap()
            .walk()
            .take(40)
            .collect();
        assert_eq!(&full[..40], &lazy[..]);
    }

    #[test]
    fn test_walk_is_a_permutation() {
        let mut all: Vec<usize> = Permutation::new(7, 257).unwrap().walk().collect();
        assert_eq!(all.len(), 257);
        all.sort_unstable();
        assert_eq!(all, (0..257).collect::<Vec<_>>());
    }

    #[test]
    fn test_full_walk_matches_full_shuffle() {
        let lazy: Vec<usize> = Permutation::new(99, 64).unwrap().walk().collect();
        assert_eq!(lazy, full_permutation(99, 64));
    }

    #[test]
    fn test_is_deterministic() {
        let p = Permutation::new(42, 65536).unwrap();
        let a: Vec<usize> = p.walk().take(16).collect();
        let b: Vec<usize> = p.walk().take(16).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_seed_changes_order() {
        let a: Vec<usize> = Permutation::new(1, 1000).unwrap().walk().take(10).collect();
        let b: Vec<usize> = Permutation::new(2, 1000).unwrap().walk().take(10).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn test_single_unit() {
        let addrs: Vec<usize> = Permutation::new(5, 1).unwrap().walk().collect();
        assert_eq!(addrs, vec![0]);
    }

    #[test]
    fn test_shuffle_moves_something() {
        let order = full_permutation(3, 32);
        assert_ne!(order, (0..32).collect::<Vec<_>>());
    }
}
