//! Branch Target Buffer (BTB).
//!
//! The BTB is a direct-mapped cache that stores target addresses for control
//! flow instructions. It lets the fetch stage predict the target of an
//! indirect branch before the register value is available.

/// An entry in the Branch Target Buffer.
#[derive(Clone, Copy, Default, Debug)]
struct BtbEntry {
    /// Full PC tag used to verify that this entry belongs to the lookup.
    tag: u64,
    /// The predicted target address.
    target: u64,
    /// Indicates whether this entry contains valid data.
    valid: bool,
}

/// Direct-mapped branch target buffer.
#[derive(Debug)]
pub struct Btb {
    table: Vec<BtbEntry>,
    size: usize,
}

impl Btb {
    /// Creates a BTB with `size` entries. `size` must be a power of two.
    pub fn new(size: usize) -> Self {
        Self {
            table: vec![BtbEntry::default(); size],
            size,
        }
    }

    /// Index for a PC: instruction-aligned bits masked to the table size.
    fn index(&self, pc: u64) -> usize {
        ((pc >> 2) as usize) & (self.size - 1)
    }

    /// Looks up the predicted target for `pc`.
    ///
    /// Returns `Some(target)` only on a valid entry with a matching tag.
    pub fn lookup(&self, pc: u64) -> Option<u64> {
        let e = self.table[self.index(pc)];
        if e.valid && e.tag == pc { Some(e.target) } else { None }
    }

    /// Installs or overwrites the entry for `pc`. On a tag mismatch the old
    /// entry is simply replaced.
    pub fn update(&mut self, pc: u64, target: u64) {
        let idx = self.index(pc);
        self.table[idx] = BtbEntry {
            tag: pc,
            target,
            valid: true,
        };
    }
}
