//! Mock process backend for testing
//!
//! Provides an in-memory address space with region flags, a read log, and a
//! process/provider pair, so the scanner, pointer chains, and tracker can be
//! exercised without a running game.
//!
//! All handles are cheap clones sharing the same state, so a test can keep a
//! copy of the memory and mutate it while a tracker owns the process.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::process::pointer::STRING_HEADER;
use crate::process::provider::{ProcessInfo, ProcessProvider};
use crate::process::region::{
    MEM_COMMIT, MEM_FREE, MemoryRegion, PAGE_GUARD, PAGE_NOACCESS, PAGE_READWRITE, QueryRegions,
};
use crate::process::ReadMemory;

const PAGE_SIZE: u64 = 0x1000;

#[derive(Debug, Clone)]
struct MockRegion {
    base: u64,
    data: Vec<u8>,
    state: u32,
    protect: u32,
    /// Bytes from `base` that reads can actually reach
    readable: usize,
    /// Every read fails even though the flags look fine
    fail: bool,
}

impl MockRegion {
    fn new(base: u64, data: Vec<u8>, state: u32, protect: u32) -> Self {
        let readable = data.len();
        Self {
            base,
            data,
            state,
            protect,
            readable,
            fail: false,
        }
    }

    fn end(&self) -> u64 {
        self.base + self.data.len() as u64
    }

    fn contains(&self, address: u64) -> bool {
        address >= self.base && address < self.end()
    }

    fn describe(&self) -> MemoryRegion {
        MemoryRegion {
            base: self.base,
            size: self.data.len() as u64,
            state: self.state,
            protect: self.protect,
        }
    }

    fn readable_end(&self) -> u64 {
        let info = self.describe();
        if self.fail || !info.is_committed() || info.is_guarded() || info.is_no_access() {
            self.base
        } else {
            self.base + self.readable as u64
        }
    }
}

/// In-memory address space implementing [`ReadMemory`] and [`QueryRegions`].
#[derive(Debug, Clone, Default)]
pub struct MockMemory {
    regions: Rc<RefCell<Vec<MockRegion>>>,
    reads: Rc<RefCell<Vec<(u64, usize)>>>,
}

impl MockMemory {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&self, region: MockRegion) {
        let mut regions = self.regions.borrow_mut();
        regions.retain(|r| r.base != region.base);
        let at = regions.partition_point(|r| r.base < region.base);
        regions.insert(at, region);
    }

    /// Map `data` at `base` with the given state and protection.
    pub fn map(&self, base: u64, data: Vec<u8>, state: u32, protect: u32) {
        self.insert(MockRegion::new(base, data, state, protect));
    }

    /// Write bytes at an absolute address, mapping read-write pages as needed.
    pub fn write_bytes(&self, address: u64, bytes: &[u8]) {
        for (i, &byte) in bytes.iter().enumerate() {
            self.write_byte(address + i as u64, byte);
        }
    }

    fn write_byte(&self, address: u64, byte: u8) {
        let mut regions = self.regions.borrow_mut();
        if let Some(region) = regions.iter_mut().find(|r| r.contains(address)) {
            let index = (address - region.base) as usize;
            region.data[index] = byte;
            return;
        }

        // New page, clipped so it never overlaps an existing region
        let page = address & !(PAGE_SIZE - 1);
        let start = regions
            .iter()
            .filter(|r| r.end() <= address)
            .map(MockRegion::end)
            .max()
            .map_or(page, |end| end.max(page));
        let end = regions
            .iter()
            .filter(|r| r.base > address)
            .map(|r| r.base)
            .min()
            .map_or(page + PAGE_SIZE, |base| base.min(page + PAGE_SIZE));

        let mut region = MockRegion::new(
            start,
            vec![0; (end - start) as usize],
            MEM_COMMIT,
            PAGE_READWRITE,
        );
        region.data[(address - start) as usize] = byte;

        let at = regions.partition_point(|r| r.base < start);
        regions.insert(at, region);
    }

    pub fn write_u8(&self, address: u64, value: u8) {
        self.write_bytes(address, &[value]);
    }

    pub fn write_i32(&self, address: u64, value: i32) {
        self.write_bytes(address, &value.to_le_bytes());
    }

    pub fn write_u32(&self, address: u64, value: u32) {
        self.write_bytes(address, &value.to_le_bytes());
    }

    pub fn write_i64(&self, address: u64, value: i64) {
        self.write_bytes(address, &value.to_le_bytes());
    }

    pub fn write_bool(&self, address: u64, value: bool) {
        self.write_u8(address, value as u8);
    }

    /// Write a managed string object: header word, i32 length, UTF-16LE data.
    pub fn write_clr_string(&self, address: u64, text: &str) {
        let units: Vec<u16> = text.encode_utf16().collect();
        self.write_u32(address, STRING_HEADER);
        self.write_i32(address + 4, units.len() as i32);
        let bytes: Vec<u8> = units.iter().flat_map(|u| u.to_le_bytes()).collect();
        self.write_bytes(address + 8, &bytes);
    }

    /// Every `(address, size)` read attempted so far, in order.
    pub fn reads(&self) -> Vec<(u64, usize)> {
        self.reads.borrow().clone()
    }

    /// True if any attempted read covered `address`.
    pub fn was_read(&self, address: u64) -> bool {
        self.reads
            .borrow()
            .iter()
            .any(|&(start, size)| address >= start && address < start + size as u64)
    }

    pub fn clear_reads(&self) {
        self.reads.borrow_mut().clear();
    }

    /// Read as much of `[address, address + size)` as the regions allow.
    fn read_prefix(&self, address: u64, size: usize) -> Vec<u8> {
        self.reads.borrow_mut().push((address, size));

        let regions = self.regions.borrow();
        let mut out = Vec::with_capacity(size);
        let mut cursor = address;

        while out.len() < size {
            let Some(region) = regions.iter().find(|r| r.contains(cursor)) else {
                break;
            };
            let limit = region.readable_end();
            if cursor >= limit {
                break;
            }
            let want = (size - out.len()) as u64;
            let take = want.min(limit - cursor);
            let from = (cursor - region.base) as usize;
            out.extend_from_slice(&region.data[from..from + take as usize]);
            cursor += take;

            // A region readable only in part ends the read
            if limit < region.end() {
                break;
            }
        }

        out
    }
}

impl ReadMemory for MockMemory {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        let bytes = self.read_prefix(address, size);
        if bytes.len() != size {
            return Err(Error::MemoryReadFailed {
                address,
                message: format!("Expected {} bytes, read {}", size, bytes.len()),
            });
        }
        Ok(bytes)
    }

    fn read_bytes_partial(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        let bytes = self.read_prefix(address, size);
        if bytes.is_empty() && size > 0 {
            return Err(Error::MemoryReadFailed {
                address,
                message: "No bytes read".to_string(),
            });
        }
        Ok(bytes)
    }
}

impl QueryRegions for MockMemory {
    fn query_region(&self, address: u64) -> Option<MemoryRegion> {
        let regions = self.regions.borrow();
        if let Some(region) = regions.iter().find(|r| r.contains(address)) {
            return Some(region.describe());
        }

        // Unmapped gap up to the next region
        regions
            .iter()
            .find(|r| r.base > address)
            .map(|next| MemoryRegion {
                base: address,
                size: next.base - address,
                state: MEM_FREE,
                protect: PAGE_NOACCESS,
            })
    }
}

/// Builder for creating mock address spaces
///
/// Provides a fluent API for constructing memory layouts for testing.
#[derive(Debug, Clone, Default)]
pub struct MockMemoryBuilder {
    memory: MockMemory,
}

impl MockMemoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a committed read-write region holding `data`.
    pub fn region(self, base: u64, data: &[u8]) -> Self {
        self.memory
            .map(base, data.to_vec(), MEM_COMMIT, PAGE_READWRITE);
        self
    }

    /// Map a region with explicit state and protection flags.
    pub fn region_with_flags(self, base: u64, data: &[u8], state: u32, protect: u32) -> Self {
        self.memory.map(base, data.to_vec(), state, protect);
        self
    }

    /// Map a committed region carrying `PAGE_GUARD`.
    pub fn guarded(self, base: u64, data: &[u8]) -> Self {
        self.region_with_flags(base, data, MEM_COMMIT, PAGE_READWRITE | PAGE_GUARD)
    }

    /// Map a region whose reads stop after `readable` bytes.
    pub fn truncated(self, base: u64, data: &[u8], readable: usize) -> Self {
        let mut region = MockRegion::new(base, data.to_vec(), MEM_COMMIT, PAGE_READWRITE);
        region.readable = readable.min(region.data.len());
        self.memory.insert(region);
        self
    }

    /// Map a region that looks scannable but fails every read.
    pub fn unreadable(self, base: u64, data: &[u8]) -> Self {
        let mut region = MockRegion::new(base, data.to_vec(), MEM_COMMIT, PAGE_READWRITE);
        region.fail = true;
        self.memory.insert(region);
        self
    }

    pub fn write_bytes(self, address: u64, bytes: &[u8]) -> Self {
        self.memory.write_bytes(address, bytes);
        self
    }

    pub fn write_u8(self, address: u64, value: u8) -> Self {
        self.memory.write_u8(address, value);
        self
    }

    pub fn write_i32(self, address: u64, value: i32) -> Self {
        self.memory.write_i32(address, value);
        self
    }

    pub fn write_u32(self, address: u64, value: u32) -> Self {
        self.memory.write_u32(address, value);
        self
    }

    pub fn write_i64(self, address: u64, value: i64) -> Self {
        self.memory.write_i64(address, value);
        self
    }

    pub fn write_bool(self, address: u64, value: bool) -> Self {
        self.memory.write_bool(address, value);
        self
    }

    pub fn write_clr_string(self, address: u64, text: &str) -> Self {
        self.memory.write_clr_string(address, text);
        self
    }

    pub fn build(self) -> MockMemory {
        self.memory
    }
}

/// Mock process: a memory image plus a shared liveness flag.
#[derive(Debug, Clone)]
pub struct MockProcess {
    pub pid: u32,
    pub memory: MockMemory,
    alive: Rc<Cell<bool>>,
}

impl MockProcess {
    pub fn new(pid: u32, memory: MockMemory) -> Self {
        Self {
            pid,
            memory,
            alive: Rc::new(Cell::new(true)),
        }
    }

    /// Mark the process (and every clone of it) as exited.
    pub fn kill(&self) {
        self.alive.set(false);
    }
}

impl ProcessInfo for MockProcess {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn is_alive(&self) -> bool {
        self.alive.get()
    }
}

impl ReadMemory for MockProcess {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        self.memory.read_bytes(address, size)
    }

    fn read_bytes_partial(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        self.memory.read_bytes_partial(address, size)
    }
}

impl QueryRegions for MockProcess {
    fn query_region(&self, address: u64) -> Option<MemoryRegion> {
        self.memory.query_region(address)
    }
}

/// Provider handing out clones of a single, swappable mock process.
#[derive(Debug, Default)]
pub struct MockProcessProvider {
    process: RefCell<Option<MockProcess>>,
    attempts: Cell<usize>,
}

impl MockProcessProvider {
    /// A provider with no running process.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_process(process: MockProcess) -> Self {
        Self {
            process: RefCell::new(Some(process)),
            attempts: Cell::new(0),
        }
    }

    /// Replace (or remove) the process future lookups will find.
    pub fn set_process(&self, process: Option<MockProcess>) {
        *self.process.borrow_mut() = process;
    }

    /// Number of `find_process`/`open_process` calls so far.
    pub fn attempts(&self) -> usize {
        self.attempts.get()
    }
}

impl ProcessProvider for MockProcessProvider {
    type Process = MockProcess;

    fn find_process(&self) -> Result<Self::Process> {
        self.attempts.set(self.attempts.get() + 1);
        self.process
            .borrow()
            .as_ref()
            .filter(|p| p.is_alive())
            .cloned()
            .ok_or_else(|| Error::ProcessNotFound("Mock process not running".to_string()))
    }

    fn open_process(&self, pid: u32) -> Result<Self::Process> {
        self.attempts.set(self.attempts.get() + 1);
        self.process
            .borrow()
            .as_ref()
            .filter(|p| p.pid == pid && p.is_alive())
            .cloned()
            .ok_or_else(|| Error::ProcessOpenFailed(format!("No mock process with PID {}", pid)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_create_pages() {
        let memory = MockMemoryBuilder::new().write_u32(0x5004, 42).build();

        let region = memory.query_region(0x5004).unwrap();
        assert_eq!(region.base, 0x5000);
        assert_eq!(region.size, 0x1000);
        assert!(region.is_scannable());
        assert_eq!(memory.read_u32(0x5004).unwrap(), 42);
    }

    #[test]
    fn test_write_spanning_pages() {
        let memory = MockMemoryBuilder::new().write_i64(0x1FFC, -2).build();
        assert_eq!(memory.read_i64(0x1FFC).unwrap(), -2);
        assert_eq!(memory.query_region(0x2000).unwrap().base, 0x2000);
    }

    #[test]
    fn test_write_into_existing_region() {
        let memory = MockMemoryBuilder::new()
            .region(0x1000, &[0; 16])
            .write_u32(0x1004, 9)
            .build();

        assert_eq!(memory.query_region(0x1000).unwrap().size, 16);
        assert_eq!(memory.read_u32(0x1004).unwrap(), 9);
    }

    #[test]
    fn test_query_reports_gaps() {
        let memory = MockMemoryBuilder::new().region(0x3000, &[0; 0x100]).build();

        let gap = memory.query_region(0x1000).unwrap();
        assert_eq!(gap.base, 0x1000);
        assert_eq!(gap.size, 0x2000);
        assert_eq!(gap.state, MEM_FREE);
        assert!(memory.query_region(0x3100).is_none());
    }

    #[test]
    fn test_guarded_region_fails_reads() {
        let memory = MockMemoryBuilder::new().guarded(0x1000, &[1, 2, 3, 4]).build();
        assert!(memory.read_bytes(0x1000, 4).is_err());
        assert!(memory.read_bytes_partial(0x1000, 4).is_err());
    }

    #[test]
    fn test_truncated_region_partial_read() {
        let memory = MockMemoryBuilder::new()
            .truncated(0x1000, &[1, 2, 3, 4, 5, 6], 3)
            .build();

        assert!(memory.read_bytes(0x1000, 6).is_err());
        assert_eq!(memory.read_bytes_partial(0x1000, 6).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_unreadable_region() {
        let memory = MockMemoryBuilder::new().unreadable(0x1000, &[1, 2]).build();
        assert!(memory.query_region(0x1000).unwrap().is_scannable());
        assert!(memory.read_bytes_partial(0x1000, 2).is_err());
    }

    #[test]
    fn test_read_log() {
        let memory = MockMemoryBuilder::new().write_u32(0x1000, 1).build();
        let _ = memory.read_u32(0x1000);
        let _ = memory.read_u32(0x8000);

        assert_eq!(memory.reads(), vec![(0x1000, 4), (0x8000, 4)]);
        assert!(memory.was_read(0x1003));
        assert!(!memory.was_read(0x1004));

        memory.clear_reads();
        assert!(memory.reads().is_empty());
    }

    #[test]
    fn test_clr_string_layout() {
        let memory = MockMemoryBuilder::new()
            .write_clr_string(0x1000, "Hi")
            .build();

        assert_eq!(memory.read_u32(0x1000).unwrap(), STRING_HEADER);
        assert_eq!(memory.read_i32(0x1004).unwrap(), 2);
        assert_eq!(memory.read_bytes(0x1008, 4).unwrap(), vec![b'H', 0, b'i', 0]);
    }

    #[test]
    fn test_clones_share_state() {
        let memory = MockMemory::new();
        let process = MockProcess::new(7, memory.clone());
        memory.write_u32(0x1000, 11);

        assert_eq!(process.read_u32(0x1000).unwrap(), 11);

        let other = process.clone();
        other.kill();
        assert!(!process.is_alive());
    }

    #[test]
    fn test_provider_lookup() {
        let provider = MockProcessProvider::new();
        assert!(provider.find_process().is_err());

        provider.set_process(Some(MockProcess::new(7, MockMemory::new())));
        assert_eq!(provider.find_process().unwrap().pid, 7);
        assert_eq!(provider.open_process(7).unwrap().pid, 7);
        assert!(provider.open_process(8).is_err());
        assert_eq!(provider.attempts(), 4);
    }

    #[test]
    fn test_provider_skips_dead_process() {
        let process = MockProcess::new(7, MockMemory::new());
        let provider = MockProcessProvider::with_process(process.clone());
        process.kill();
        assert!(provider.find_process().is_err());
    }
}
