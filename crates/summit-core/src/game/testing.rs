//! A synthetic game memory image for tests.
//!
//! Lays out the code signature, the static slot, the game object with its
//! title string, and the session/level objects the field chains walk, all in
//! a [`MockMemory`]. Setters rewrite field values in place, so a tracker
//! holding a clone observes them on its next tick.

use crate::game::layout::{TICKS_PER_MS, TITLE};
use crate::process::{MockMemory, MockProcess};

/// Code bytes matching the game signature, wildcards filled in.
pub const CODE: [u8; 21] = [
    0x83, 0xc6, 0x04, 0xf3, 0x0f, 0x7e, 0x06, 0x66, 0x0f, 0xd6, 0x07, 0x8b, 0xcb, 0xff, 0x15, 0x11,
    0x22, 0x33, 0x44, 0x8d, 0x15,
];

pub const SIGNATURE_ADDRESS: u64 = 0x0040_1010;
pub const STATIC_SLOT: u64 = 0x0100_0000;
pub const GAME_OBJECT: u64 = 0x0200_0000;
pub const METHOD_TABLE: u64 = 0x0300_0000;
pub const TITLE_STRING: u64 = 0x0400_0000;
pub const DECOY_STRING: u64 = 0x0400_1000;
pub const SESSION_HOLDER: u64 = 0x0500_0000;
pub const SESSION: u64 = 0x0600_0000;
pub const LEVEL: u64 = 0x0610_0000;
pub const ENTRY_ROOM: u64 = 0x0700_0000;
pub const CURRENT_ROOM: u64 = 0x0700_1000;

#[derive(Debug, Clone)]
pub struct GameImage {
    pub memory: MockMemory,
    /// Static slot the signature's embedded pointer names
    pub base: u64,
    pub title_offset: i32,
}

impl GameImage {
    /// A hooked-ready image whose title string sits at `title_offset` in the
    /// game object. Chapter, deaths and time start at zero.
    pub fn new(title_offset: i32) -> Self {
        let memory = MockMemory::new();
        let object_size = title_offset + 0x40;
        let title_slot = GAME_OBJECT + title_offset as u64;

        memory.write_bytes(SIGNATURE_ADDRESS, &CODE);
        memory.write_u32(SIGNATURE_ADDRESS + CODE.len() as u64, STATIC_SLOT as u32);
        memory.write_u32(STATIC_SLOT, GAME_OBJECT as u32);

        memory.write_u32(GAME_OBJECT, METHOD_TABLE as u32);
        memory.write_i32(METHOD_TABLE + 4, object_size);

        memory.write_u32(title_slot, TITLE_STRING as u32);
        memory.write_clr_string(TITLE_STRING, TITLE);
        // A different string above the title, which discovery reaches first
        memory.write_u32(title_slot + 0x10, DECOY_STRING as u32);
        memory.write_clr_string(DECOY_STRING, "Monocle");

        memory.write_u32(title_slot + 8, SESSION_HOLDER as u32);
        memory.write_u32(SESSION_HOLDER + 0x2c, SESSION as u32);
        memory.write_u32(title_slot + 0x1c, LEVEL as u32);

        let image = Self {
            memory,
            base: STATIC_SLOT,
            title_offset,
        };
        image.set_deaths(0, 0);
        image.set_chapter(0, 0);
        image.set_time_ms(0);
        image.set_completed(false);
        image
    }

    pub fn process(&self, pid: u32) -> MockProcess {
        MockProcess::new(pid, self.memory.clone())
    }

    pub fn set_chapter(&self, chapter_id: i32, side: i32) {
        self.memory.write_i32(LEVEL + 0x18, chapter_id);
        self.memory.write_i32(LEVEL + 0x1c, side);
    }

    pub fn set_rooms(&self, entry: &str, current: &str) {
        self.memory.write_u32(SESSION + 0x30, ENTRY_ROOM as u32);
        self.memory.write_u32(SESSION + 0x34, CURRENT_ROOM as u32);
        self.memory.write_clr_string(ENTRY_ROOM, entry);
        self.memory.write_clr_string(CURRENT_ROOM, current);
    }

    pub fn set_deaths(&self, chapter: i32, room: i32) {
        self.memory.write_i32(SESSION + 0x40, chapter);
        self.memory.write_i32(SESSION + 0x4c, room);
    }

    pub fn set_time_ms(&self, ms: i64) {
        self.memory.write_i64(LEVEL + 4, ms * TICKS_PER_MS);
    }

    pub fn set_completed(&self, completed: bool) {
        self.memory.write_bool(LEVEL + 0x32, completed);
    }

    /// Null the session pointer so every session field fails to resolve.
    pub fn break_session(&self) {
        self.memory
            .write_u32(GAME_OBJECT + self.title_offset as u64 + 8, 0);
    }

    /// Remove the title string so field discovery cannot succeed.
    pub fn clear_title(&self) {
        self.memory
            .write_u32(GAME_OBJECT + self.title_offset as u64, 0);
    }

    /// Restore the title slot cleared by [`GameImage::clear_title`].
    pub fn restore_title(&self) {
        self.memory.write_u32(
            GAME_OBJECT + self.title_offset as u64,
            TITLE_STRING as u32,
        );
    }
}
