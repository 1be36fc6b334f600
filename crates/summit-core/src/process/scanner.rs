//! Signature scanning across a process's address space.

use tracing::debug;

use crate::process::region::{MemoryRegion, QueryRegions};
use crate::process::ReadMemory;
use crate::signature::CompiledSignature;

/// Committed, non-guarded, accessible regions in ascending address order.
pub fn scannable_regions<Q: QueryRegions>(source: &Q) -> Vec<MemoryRegion> {
    source.regions().filter(MemoryRegion::is_scannable).collect()
}

/// Address of the first match of `signature`, scanning regions in ascending order.
///
/// Each region is read in one pass. A failed read skips that region; a
/// truncated read is searched over the bytes actually obtained.
pub fn find_signature<M>(memory: &M, signature: &CompiledSignature) -> Option<u64>
where
    M: ReadMemory + QueryRegions,
{
    let regions = scannable_regions(memory);
    debug!("Scanning {} eligible regions", regions.len());

    for region in regions {
        let buffer = match memory.read_bytes_partial(region.base, region.size as usize) {
            Ok(buffer) => buffer,
            Err(e) => {
                debug!("Skipping region {}: {}", region, e);
                continue;
            }
        };

        if buffer.len() < region.size as usize {
            debug!(
                "Short read in region {}: got 0x{:X} bytes",
                region,
                buffer.len()
            );
        }

        if let Some(offset) = signature.find_in(&buffer) {
            let address = region.base + offset as u64;
            debug!("Signature matched at 0x{:08X}", address);
            return Some(address);
        }
    }

    None
}
