//! Where the game keeps its run state.
//!
//! The engine's game object is reached through a static pointer located by
//! signature. Its fields are found relative to the slot holding the window
//! title string, whose offset varies between builds and is discovered at hook
//! time.

use crate::process::PointerChain;
use crate::signature::Signature;

/// Executable name of the game.
pub const PROCESS_NAME: &str = "Celeste.exe";

/// Window title stored on the game object; anchors field discovery.
pub const TITLE: &str = "Celeste";

/// Code that loads the static game-object pointer.
pub const SIGNATURE_PATTERN: &str = "83c604f30f7e06660fd6078bcbff15????????8d15";

/// Bytes from the signature match to the embedded pointer.
pub const SIGNATURE_OFFSET: i32 = 21;

/// Stopwatch ticks per millisecond.
pub const TICKS_PER_MS: i64 = 10_000;

/// Largest object size considered plausible during discovery.
pub const MAX_OBJECT_SIZE: i32 = 0x10000;

pub fn signature() -> Signature {
    Signature::new(SIGNATURE_PATTERN, SIGNATURE_OFFSET)
}

/// Chain from the base pointer to the game object's instance size.
pub fn object_size_chain() -> PointerChain {
    PointerChain::new([0, 4])
}

/// Chain from the base pointer to the string held at `offset` in the game object.
pub fn title_chain(offset: i32) -> PointerChain {
    PointerChain::new([offset, 0])
}

/// Pointer chains for every snapshot field, given the discovered title offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    title_offset: i32,
}

impl FieldLayout {
    pub fn new(title_offset: i32) -> Self {
        Self { title_offset }
    }

    pub fn title_offset(&self) -> i32 {
        self.title_offset
    }

    fn session(&self, tail: &[i32]) -> PointerChain {
        let mut offsets = vec![self.title_offset + 8, 0x2c];
        offsets.extend_from_slice(tail);
        PointerChain::new(offsets)
    }

    fn level(&self, field: i32) -> PointerChain {
        PointerChain::new([self.title_offset + 0x1c, field])
    }

    pub fn chapter_deaths(&self) -> PointerChain {
        self.session(&[0x40])
    }

    pub fn room_deaths(&self) -> PointerChain {
        self.session(&[0x4c])
    }

    /// Room the level was entered through.
    pub fn entry_room(&self) -> PointerChain {
        self.session(&[0x30, 0])
    }

    pub fn current_room(&self) -> PointerChain {
        self.session(&[0x34, 0])
    }

    pub fn chapter_id(&self) -> PointerChain {
        self.level(0x18)
    }

    pub fn side(&self) -> PointerChain {
        self.level(0x1c)
    }

    /// Elapsed chapter time in stopwatch ticks.
    pub fn chapter_time(&self) -> PointerChain {
        self.level(4)
    }

    pub fn completed(&self) -> PointerChain {
        self.level(0x32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_compiles() {
        let compiled = signature().compile().unwrap();
        assert_eq!(compiled.len(), 21);
        assert_eq!(compiled.offset_to_ptr(), SIGNATURE_OFFSET);
        assert_eq!(compiled.wildcards().iter().filter(|&&w| w).count(), 4);
    }

    #[test]
    fn test_field_chains() {
        let layout = FieldLayout::new(0x20);
        assert_eq!(layout.chapter_deaths().offsets(), &[0x28, 0x2c, 0x40]);
        assert_eq!(layout.room_deaths().offsets(), &[0x28, 0x2c, 0x4c]);
        assert_eq!(layout.entry_room().offsets(), &[0x28, 0x2c, 0x30, 0]);
        assert_eq!(layout.current_room().offsets(), &[0x28, 0x2c, 0x34, 0]);
        assert_eq!(layout.chapter_id().offsets(), &[0x3c, 0x18]);
        assert_eq!(layout.side().offsets(), &[0x3c, 0x1c]);
        assert_eq!(layout.chapter_time().offsets(), &[0x3c, 4]);
        assert_eq!(layout.completed().offsets(), &[0x3c, 0x32]);
    }
}
