use crate::error::{KeyhopError, Result};

/// `address[i] = (start + i * stride) mod capacity`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedStep {
    start: usize,
    stride: usize,
    capacity: usize,
}

impl FixedStep {
    /// A stride that is a multiple of the capacity (zero included) would
    /// pin every character to one unit; it is replaced by 1.
    pub fn new(start: usize, step: usize, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(KeyhopError::AddressOutOfBounds {
                address: start,
                capacity,
            });
        }
        let stride = if step % capacity == 0 {
            log::debug!("stride {} collapses on capacity {}, using 1", step, capacity);
            1
        } else {
            step % capacity
        };
        Ok(Self {
            start: start % capacity,
            stride,
            capacity,
        })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn address(&self, index: usize) -> usize {
        let cap = self.capacity as u128;
        ((self.start as u128 + index as u128 * self.stride as u128) % cap) as usize
    }

    /// Distinct addresses before the sequence repeats
    pub fn span(&self) -> usize {
        self.capacity / gcd(self.stride, self.capacity)
    }

    pub fn walk(&self) -> FixedStepWalk {
        FixedStepWalk {
            steps: *self,
            index: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FixedStepWalk {
    steps: FixedStep,
    index: usize,
}

impl Iterator for FixedStepWalk {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let address = self.steps.address(self.index);
        self.index += 1;
        Some(address)
    }
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}
