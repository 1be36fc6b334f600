//! Memory region enumeration.
//!
//! Regions are walked from address zero upward: each query returns the region
//! containing (or following) the requested address, and the next query starts
//! at that region's end. A failed query means the address space is exhausted.

/// `MEM_COMMIT` state flag.
pub const MEM_COMMIT: u32 = 0x1000;
/// `MEM_RESERVE` state flag.
pub const MEM_RESERVE: u32 = 0x2000;
/// `MEM_FREE` state flag.
pub const MEM_FREE: u32 = 0x10000;

/// `PAGE_NOACCESS` protection value.
pub const PAGE_NOACCESS: u32 = 0x01;
/// `PAGE_READONLY` protection value.
pub const PAGE_READONLY: u32 = 0x02;
/// `PAGE_READWRITE` protection value.
pub const PAGE_READWRITE: u32 = 0x04;
/// `PAGE_GUARD` protection modifier.
pub const PAGE_GUARD: u32 = 0x100;

/// A contiguous range of the target's address space with uniform flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRegion {
    pub base: u64,
    pub size: u64,
    /// Raw allocation state (`MEM_*`)
    pub state: u32,
    /// Raw protection flags (`PAGE_*`)
    pub protect: u32,
}

impl MemoryRegion {
    pub fn end(&self) -> u64 {
        self.base.saturating_add(self.size)
    }

    pub fn contains(&self, address: u64) -> bool {
        address >= self.base && address < self.end()
    }

    pub fn is_committed(&self) -> bool {
        self.state & MEM_COMMIT != 0
    }

    pub fn is_guarded(&self) -> bool {
        self.protect & PAGE_GUARD != 0
    }

    pub fn is_no_access(&self) -> bool {
        self.protect == PAGE_NOACCESS
    }

    /// Committed and neither guarded nor no-access.
    pub fn is_scannable(&self) -> bool {
        self.is_committed() && !self.is_guarded() && !self.is_no_access()
    }
}

impl std::fmt::Display for MemoryRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "base=0x{:08X} size=0x{:08X} state=0x{:X} protect=0x{:X}",
            self.base, self.size, self.state, self.protect
        )
    }
}

/// Trait for querying the region layout of a process.
pub trait QueryRegions {
    /// Describe the region containing `address`, or `None` once the address
    /// space is exhausted.
    fn query_region(&self, address: u64) -> Option<MemoryRegion>;

    /// Iterate over every region from address zero upward.
    fn regions(&self) -> RegionIter<'_, Self>
    where
        Self: Sized,
    {
        RegionIter::new(self)
    }
}

/// Iterator produced by [`QueryRegions::regions`].
pub struct RegionIter<'a, Q: QueryRegions> {
    source: &'a Q,
    next_address: Option<u64>,
}

impl<'a, Q: QueryRegions> RegionIter<'a, Q> {
    pub fn new(source: &'a Q) -> Self {
        Self {
            source,
            next_address: Some(0),
        }
    }
}

impl<Q: QueryRegions> Iterator for RegionIter<'_, Q> {
    type Item = MemoryRegion;

    fn next(&mut self) -> Option<MemoryRegion> {
        let address = self.next_address?;
        let region = self.source.query_region(address);

        self.next_address = match region {
            // A zero-sized region or one that does not advance would loop forever
            Some(r) if r.size > 0 && r.end() > address => Some(r.end()),
            _ => None,
        };

        region.filter(|r| r.size > 0)
    }
}
