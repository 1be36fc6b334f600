//! Per-process discovery: from a signature match to readable fields.

use tracing::debug;

use crate::error::{Error, Result};
use crate::game::layout::{FieldLayout, MAX_OBJECT_SIZE, TITLE, object_size_chain, title_chain};
use crate::game::snapshot::{Snapshot, read_snapshot};
use crate::process::{QueryRegions, ReadMemory, find_signature, resolve};
use crate::signature::CompiledSignature;

/// The static slot holding the game object pointer, found by signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasePointer {
    pub signature_address: u64,
    pub address: u64,
}

/// Scan for `signature` and follow its embedded pointer to the static slot.
pub fn locate_base_pointer<M>(memory: &M, signature: &CompiledSignature) -> Result<BasePointer>
where
    M: ReadMemory + QueryRegions,
{
    let signature_address = find_signature(memory, signature).ok_or(Error::SignatureNotFound)?;
    let pointer_address =
        signature_address.wrapping_add_signed(i64::from(signature.offset_to_ptr()));

    let address = resolve(memory, pointer_address, &[0]).ok_or_else(|| {
        debug!(
            "Signature at 0x{:08X} has no readable pointer at 0x{:08X}",
            signature_address, pointer_address
        );
        Error::SignatureNotFound
    })?;

    Ok(BasePointer {
        signature_address,
        address,
    })
}

/// Find the offset of the title string within the game object.
///
/// Candidate offsets are tried from the end of the object down to zero in
/// 4-byte steps; the first slot pointing at the title string wins.
pub fn discover_title_offset<R: ReadMemory + ?Sized>(reader: &R, base: u64) -> Option<i32> {
    let size = object_size_chain().try_read_i32(reader, base)?;
    debug!("Game object size: {}", size);

    if !(4..=MAX_OBJECT_SIZE).contains(&size) {
        debug!("Implausible game object size {}", size);
        return None;
    }

    (0..=size - 4)
        .rev()
        .step_by(4)
        .find(|&offset| {
            title_chain(offset)
                .try_read_string(reader, base)
                .is_some_and(|s| s == TITLE)
        })
}

/// A fully discovered game object: base pointer plus field layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hook {
    pub base: BasePointer,
    pub layout: FieldLayout,
}

impl Hook {
    pub fn new(base: BasePointer, title_offset: i32) -> Self {
        Self {
            base,
            layout: FieldLayout::new(title_offset),
        }
    }

    pub fn title_offset(&self) -> i32 {
        self.layout.title_offset()
    }

    pub fn snapshot<R: ReadMemory + ?Sized>(&self, reader: &R) -> Option<Snapshot> {
        read_snapshot(reader, self.base.address, &self.layout)
    }
}
