//! Pointer chains and typed reads over a foreign 32-bit heap.
//!
//! Every read here degrades instead of failing: the `try_*` forms return
//! `None`, and the plain forms substitute a sentinel (`i32::MIN`, `i64::MIN`,
//! `false`, or an empty string).

use encoding_rs::UTF_16LE;

use crate::process::ReadMemory;

/// Header word at the start of a managed string object.
pub const STRING_HEADER: u32 = 0x7209_ABDC;

/// Upper bound on a decoded string's UTF-16 length; longer values are garbage.
const MAX_STRING_LEN: i32 = 1 << 20;

/// Follow `offsets` from `base`, dereferencing one 4-byte pointer per offset.
///
/// The last offset is added after the last dereference, so `n` offsets cost
/// exactly `n` reads. A zero base, a zero pointer at any step, or a failed read
/// ends the walk with `None`; nothing past the failing step is read.
pub fn resolve<R: ReadMemory + ?Sized>(reader: &R, base: u64, offsets: &[i32]) -> Option<u64> {
    if base == 0 {
        return None;
    }

    let mut address = base;
    for &offset in offsets {
        let pointer = reader.read_u32(address).ok()?;
        if pointer == 0 {
            return None;
        }
        address = u64::from(pointer).wrapping_add_signed(i64::from(offset));
    }

    (address != 0).then_some(address)
}

/// Decode the managed string object at `address`.
pub fn read_clr_string<R: ReadMemory + ?Sized>(reader: &R, address: u64) -> Option<String> {
    if reader.read_u32(address).ok()? != STRING_HEADER {
        return None;
    }

    let len = reader.read_i32(address + 4).ok()?;
    if !(0..=MAX_STRING_LEN).contains(&len) {
        return None;
    }
    if len == 0 {
        return Some(String::new());
    }

    let bytes = reader.read_bytes(address + 8, len as usize * 2).ok()?;
    let (text, _) = UTF_16LE.decode_without_bom_handling(&bytes);
    Some(text.into_owned())
}

/// An ordered list of offsets plus an optional byte offset applied after
/// the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerChain {
    offsets: Vec<i32>,
    trailing: i64,
}

impl PointerChain {
    pub fn new(offsets: impl Into<Vec<i32>>) -> Self {
        Self {
            offsets: offsets.into(),
            trailing: 0,
        }
    }

    /// Read `bytes` past the resolved address instead of at it.
    pub fn with_trailing(mut self, bytes: i64) -> Self {
        self.trailing = bytes;
        self
    }

    pub fn offsets(&self) -> &[i32] {
        &self.offsets
    }

    pub fn resolve<R: ReadMemory + ?Sized>(&self, reader: &R, base: u64) -> Option<u64> {
        resolve(reader, base, &self.offsets).map(|a| a.wrapping_add_signed(self.trailing))
    }

    pub fn try_read_i32<R: ReadMemory + ?Sized>(&self, reader: &R, base: u64) -> Option<i32> {
        let address = self.resolve(reader, base)?;
        reader.read_i32(address).ok()
    }

    pub fn try_read_i64<R: ReadMemory + ?Sized>(&self, reader: &R, base: u64) -> Option<i64> {
        let address = self.resolve(reader, base)?;
        reader.read_i64(address).ok()
    }

    pub fn try_read_bool<R: ReadMemory + ?Sized>(&self, reader: &R, base: u64) -> Option<bool> {
        let address = self.resolve(reader, base)?;
        reader.read_u8(address).ok().map(|b| b != 0)
    }

    pub fn try_read_string<R: ReadMemory + ?Sized>(&self, reader: &R, base: u64) -> Option<String> {
        let address = self.resolve(reader, base)?;
        read_clr_string(reader, address)
    }

    pub fn read_i32<R: ReadMemory + ?Sized>(&self, reader: &R, base: u64) -> i32 {
        self.try_read_i32(reader, base).unwrap_or(i32::MIN)
    }

    pub fn read_i64<R: ReadMemory + ?Sized>(&self, reader: &R, base: u64) -> i64 {
        self.try_read_i64(reader, base).unwrap_or(i64::MIN)
    }

    pub fn read_bool<R: ReadMemory + ?Sized>(&self, reader: &R, base: u64) -> bool {
        self.try_read_bool(reader, base).unwrap_or(false)
    }

    pub fn read_string<R: ReadMemory + ?Sized>(&self, reader: &R, base: u64) -> String {
        self.try_read_string(reader, base).unwrap_or_default()
    }
}
