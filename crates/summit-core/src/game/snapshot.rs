use serde::Serialize;

use crate::game::chapter::{Chapter, Side};
use crate::game::layout::{FieldLayout, TICKS_PER_MS};
use crate::game::location::LocationId;
use crate::process::ReadMemory;

/// One coherent read of every tracked field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub chapter_id: i32,
    pub side: i32,
    pub location: LocationId,
    pub chapter_deaths: i32,
    pub location_deaths: i32,
    pub elapsed_ms: i64,
    pub completed: bool,
}

impl Snapshot {
    pub fn chapter_name(&self) -> &'static str {
        Chapter::name_for(self.chapter_id)
    }

    pub fn side_name(&self) -> &'static str {
        Side::name_for(self.side)
    }
}

/// Read all fields through `layout` from the game object at `base`.
///
/// Returns `None` if any numeric or flag field cannot be read, so a tick never
/// sees half-updated state. Room names may legitimately be absent and read as
/// empty.
pub fn read_snapshot<R: ReadMemory + ?Sized>(
    reader: &R,
    base: u64,
    layout: &FieldLayout,
) -> Option<Snapshot> {
    let chapter_id = layout.chapter_id().try_read_i32(reader, base)?;
    let side = layout.side().try_read_i32(reader, base)?;
    let chapter_deaths = layout.chapter_deaths().try_read_i32(reader, base)?;
    let location_deaths = layout.room_deaths().try_read_i32(reader, base)?;
    let ticks = layout.chapter_time().try_read_i64(reader, base)?;
    let completed = layout.completed().try_read_bool(reader, base)?;

    let location = LocationId::new(
        layout.entry_room().read_string(reader, base),
        layout.current_room().read_string(reader, base),
    );

    Some(Snapshot {
        chapter_id,
        side,
        location,
        chapter_deaths,
        location_deaths,
        elapsed_ms: ticks / TICKS_PER_MS,
        completed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::testing::GameImage;

    #[test]
    fn test_read_snapshot() {
        let image = GameImage::new(0x20);
        image.set_chapter(1, 0);
        image.set_rooms("a-00", "a-01");
        image.set_deaths(3, 1);
        image.set_time_ms(12_345);
        image.set_completed(false);

        let snapshot = read_snapshot(&image.memory, image.base, &FieldLayout::new(0x20)).unwrap();
        assert_eq!(snapshot.chapter_id, 1);
        assert_eq!(snapshot.side, 0);
        assert_eq!(snapshot.location, LocationId::new("a-00", "a-01"));
        assert_eq!(snapshot.chapter_deaths, 3);
        assert_eq!(snapshot.location_deaths, 1);
        assert_eq!(snapshot.elapsed_ms, 12_345);
        assert!(!snapshot.completed);
        assert_eq!(snapshot.chapter_name(), "Forsaken City");
        assert_eq!(snapshot.side_name(), "A-Side");
    }

    #[test]
    fn test_missing_rooms_read_empty() {
        let image = GameImage::new(0x20);
        image.set_chapter(-1, 0);

        let snapshot = read_snapshot(&image.memory, image.base, &FieldLayout::new(0x20)).unwrap();
        assert!(snapshot.location.is_empty());
        assert_eq!(snapshot.chapter_name(), "Menu");
    }

    #[test]
    fn test_unreadable_field_skips_snapshot() {
        let image = GameImage::new(0x20);
        image.set_chapter(1, 0);
        image.break_session();

        assert!(read_snapshot(&image.memory, image.base, &FieldLayout::new(0x20)).is_none());
    }

    #[test]
    fn test_wrong_layout_skips_snapshot() {
        let image = GameImage::new(0x20);
        assert!(read_snapshot(&image.memory, image.base, &FieldLayout::new(0x400)).is_none());
    }
}
