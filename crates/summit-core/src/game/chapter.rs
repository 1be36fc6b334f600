use serde::{Deserialize, Serialize};
use strum::{EnumIter, FromRepr, IntoStaticStr};

/// Raw chapter id the game reports while in the menus.
pub const MENU_ID: i32 = -1;

/// Chapter id held before the first snapshot; neither the menu nor a chapter.
pub const UNSET_ID: i32 = -2;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    FromRepr,
    EnumIter,
    IntoStaticStr,
)]
#[repr(i32)]
pub enum Chapter {
    #[strum(serialize = "Menu")]
    Menu = -1,
    #[strum(serialize = "Prologue")]
    Prologue = 0,
    #[strum(serialize = "Forsaken City")]
    ForsakenCity = 1,
    #[strum(serialize = "Old Site")]
    OldSite = 2,
    #[strum(serialize = "Celestial Resort")]
    CelestialResort = 3,
    #[strum(serialize = "Golden Ridge")]
    GoldenRidge = 4,
    #[strum(serialize = "Mirror Temple")]
    MirrorTemple = 5,
    #[strum(serialize = "Reflection")]
    Reflection = 6,
    #[strum(serialize = "The Summit")]
    TheSummit = 7,
    #[strum(serialize = "Epilogue")]
    Epilogue = 8,
    #[strum(serialize = "Core")]
    Core = 9,
    #[strum(serialize = "Farewell")]
    Farewell = 10,
}

impl Chapter {
    pub fn from_id(id: i32) -> Option<Self> {
        Self::from_repr(id)
    }

    pub fn id(self) -> i32 {
        self as i32
    }

    pub fn name(&self) -> &'static str {
        self.into()
    }

    pub fn is_menu(self) -> bool {
        self == Chapter::Menu
    }

    /// Display name for a raw id; empty for ids the game never uses.
    pub fn name_for(id: i32) -> &'static str {
        Self::from_id(id).map_or("", |c| c.name())
    }

    /// True for ids naming a real, non-menu chapter.
    pub fn is_valid_id(id: i32) -> bool {
        Self::from_id(id).is_some_and(|c| !c.is_menu())
    }
}

impl std::fmt::Display for Chapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, FromRepr, IntoStaticStr,
)]
#[repr(i32)]
pub enum Side {
    #[default]
    #[strum(serialize = "A-Side")]
    A = 0,
    #[strum(serialize = "B-Side")]
    B = 1,
    #[strum(serialize = "C-Side")]
    C = 2,
}

impl Side {
    pub fn from_id(id: i32) -> Option<Self> {
        Self::from_repr(id)
    }

    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Display name for a raw side value; `-` when unknown.
    pub fn name_for(id: i32) -> &'static str {
        Self::from_id(id).map_or("-", |s| s.name())
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_chapter_from_id() {
        assert_eq!(Chapter::from_id(-1), Some(Chapter::Menu));
        assert_eq!(Chapter::from_id(7), Some(Chapter::TheSummit));
        assert_eq!(Chapter::from_id(10), Some(Chapter::Farewell));
        assert_eq!(Chapter::from_id(11), None);
        assert_eq!(Chapter::from_id(UNSET_ID), None);
    }

    #[test]
    fn test_chapter_ids_round_trip() {
        for chapter in Chapter::iter() {
            assert_eq!(Chapter::from_id(chapter.id()), Some(chapter));
        }
        assert_eq!(Chapter::iter().count(), 12);
    }

    #[test]
    fn test_chapter_validity() {
        assert!(!Chapter::is_valid_id(MENU_ID));
        assert!(!Chapter::is_valid_id(UNSET_ID));
        assert!(!Chapter::is_valid_id(i32::MIN));
        assert!(Chapter::is_valid_id(0));
        assert!(Chapter::is_valid_id(9));
    }

    #[test]
    fn test_chapter_names() {
        assert_eq!(Chapter::ForsakenCity.to_string(), "Forsaken City");
        assert_eq!(Chapter::name_for(3), "Celestial Resort");
        assert_eq!(Chapter::name_for(42), "");
    }

    #[test]
    fn test_side_names() {
        assert_eq!(Side::B.to_string(), "B-Side");
        assert_eq!(Side::name_for(2), "C-Side");
        assert_eq!(Side::name_for(5), "-");
        assert_eq!(Side::default(), Side::A);
    }
}
