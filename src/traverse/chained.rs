use crate::error::{KeyhopError, Result};

/// Hop-by-previous-character addressing.
///
/// The first unit sits at `X`, the second one `Y` further on. Each later
/// unit is reached by hopping the value of the byte just placed, until a
/// delimiter has been placed past the start marker; from then on every hop
/// is `X`. Addresses depend on content, so the walk can only be driven one
/// byte at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainedHop {
    offset: usize,
    hop: usize,
    capacity: usize,
    delimiter: u8,
    /// Frame index from which a delimiter byte switches the hop rule
    guard: usize,
}

impl ChainedHop {
    pub fn new(offset: u8, hop: u8, capacity: usize, delimiter: u8, guard: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(KeyhopError::AddressOutOfBounds {
                address: offset.into(),
                capacity,
            });
        }
        Ok(Self {
            offset: usize::from(offset),
            hop: usize::from(hop),
            capacity,
            delimiter,
            guard,
        })
    }

    pub fn span(&self) -> usize {
        self.capacity
    }

    pub fn walk(&self) -> ChainedWalk {
        ChainedWalk {
            chain: *self,
            index: 0,
            position: 0,
            switched: false,
        }
    }

    /// Addresses for a frame known up front
    pub fn plan(&self, frame: &[u8]) -> Vec<usize> {
        let mut walk = self.walk();
        let mut addresses = Vec::with_capacity(frame.len());
        let mut previous = None;
        for &byte in frame {
            match walk.advance(previous) {
                Some(address) => addresses.push(address),
                None => break,
            }
            previous = Some(byte);
        }
        addresses
    }

    fn nonzero(&self, distance: usize) -> usize {
        match distance % self.capacity {
            0 => 1,
            d => d,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChainedWalk {
    chain: ChainedHop,
    index: usize,
    position: usize,
    switched: bool,
}

impl ChainedWalk {
    /// Next address. `previous` is the byte at the last address returned and
    /// must be present for every call after the first.
    pub fn advance(&mut self, previous: Option<u8>) -> Option<usize> {
        let chain = &self.chain;
        let position = if self.index == 0 {
            chain.offset % chain.capacity
        } else {
            let prev = previous?;
            if prev == chain.delimiter && self.index - 1 >= chain.guard {
                self.switched = true;
            }
            let distance = if self.switched {
                chain.nonzero(chain.offset)
            } else if self.index == 1 {
                chain.nonzero(chain.hop)
            } else {
                usize::from(prev)
            };
            ((self.position as u128 + distance as u128) % chain.capacity as u128) as usize
        };
        self.position = position;
        self.index += 1;
        Some(position)
    }

    pub fn switched(&self) -> bool {
        self.switched
    }
}
