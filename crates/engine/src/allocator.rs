//! Private-use code allocation for relocated cmap entries.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::error::{Error, Result};

/// Default first code of the allocation range (exclusive).
pub const PRIVATE_USE_BASE: u32 = 0xE000;

/// A three hex digit counter: codes base+0x001 ..= base+0x1000.
pub const CAPACITY: u32 = 0x1000;

/// Hands out sequential codes above a fixed private-use base.
///
/// Allocation is memoized by the existing code, so relocating the same code
/// in several cmap subtables lands on the same new code. Codes listed as
/// reserved are skipped; they are already routed somewhere in the font.
#[derive(Debug, Clone)]
pub struct CodeAllocator {
    base: u32,
    counter: u32,
    assigned: BTreeMap<u32, u32>,
    reserved: BTreeSet<u32>,
}

impl Default for CodeAllocator {
    fn default() -> Self {
        Self::new(PRIVATE_USE_BASE)
    }
}

impl CodeAllocator {
    pub fn new(base: u32) -> Self {
        Self { base, counter: 0, assigned: BTreeMap::new(), reserved: BTreeSet::new() }
    }

    pub fn with_reserved(mut self, reserved: impl IntoIterator<Item = u32>) -> Self {
        self.reserved.extend(reserved);
        self
    }

    /// Returns the new code for `existing`, allocating one on first request.
    pub fn allocate(&mut self, existing: u32) -> Result<u32> {
        if let Some(&code) = self.assigned.get(&existing) {
            return Ok(code);
        }
        loop {
            if self.counter >= CAPACITY {
                return Err(Error::CodeSpaceExhausted { capacity: CAPACITY });
            }
            self.counter += 1;
            let code = self.base + self.counter;
            if self.reserved.contains(&code) {
                debug!("skipping reserved code U+{code:04X}");
                continue;
            }
            debug!("relocating U+{existing:04X} -> U+{code:04X}");
            self.assigned.insert(existing, code);
            return Ok(code);
        }
    }

    /// Every relocation made so far, keyed by the original code.
    pub fn assignments(&self) -> &BTreeMap<u32, u32> {
        &self.assigned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_allocation() {
        let mut alloc = CodeAllocator::default();
        assert_eq!(alloc.allocate(0x61).unwrap(), 0xE001);
        assert_eq!(alloc.allocate(0x62).unwrap(), 0xE002);
    }

    #[test]
    fn test_memoized_per_existing_code() {
        let mut alloc = CodeAllocator::default();
        let first = alloc.allocate(0x61).unwrap();
        alloc.allocate(0x62).unwrap();
        assert_eq!(alloc.allocate(0x61).unwrap(), first);
        assert_eq!(alloc.assignments().len(), 2);
    }

    #[test]
    fn test_skips_reserved() {
        let mut alloc = CodeAllocator::default().with_reserved([0xE001, 0xE002]);
        assert_eq!(alloc.allocate(0x61).unwrap(), 0xE003);
    }

    #[test]
    fn test_exhaustion() {
        let mut alloc = CodeAllocator::default();
        let mut last = 0;
        for code in 0..CAPACITY {
            last = alloc.allocate(code).unwrap();
        }
        assert_eq!(alloc.assignments().len(), 4096);
        assert_eq!(last, 0xF000);
        assert!(matches!(
            alloc.allocate(0x10000),
            Err(Error::CodeSpaceExhausted { capacity: 4096 })
        ));
        // memoized codes are still served
        assert_eq!(alloc.allocate(0).unwrap(), 0xE001);
    }
}
