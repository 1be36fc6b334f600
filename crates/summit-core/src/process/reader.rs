#![cfg_attr(not(target_os = "windows"), allow(dead_code, unused_variables))]

use crate::error::{Error, Result};
use crate::process::ProcessHandle;

#[cfg(target_os = "windows")]
use windows::Win32::System::Diagnostics::Debug::ReadProcessMemory;

/// Trait for reading memory from a process or buffer
///
/// This trait enables mocking for tests and abstracts over different memory sources.
pub trait ReadMemory {
    /// Read exactly `size` bytes at `address`; short reads are errors.
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>>;

    /// Read up to `size` bytes at `address`, returning whatever prefix could be
    /// obtained. Fails only when nothing at all was readable.
    fn read_bytes_partial(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        self.read_bytes(address, size)
    }

    /// Read an unsigned 8-bit integer from memory
    fn read_u8(&self, address: u64) -> Result<u8> {
        let bytes = self.read_bytes(address, 1)?;
        Ok(bytes[0])
    }

    /// Read a signed 32-bit integer from memory
    fn read_i32(&self, address: u64) -> Result<i32> {
        let bytes = self.read_bytes(address, 4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read an unsigned 32-bit integer from memory
    fn read_u32(&self, address: u64) -> Result<u32> {
        let bytes = self.read_bytes(address, 4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a signed 64-bit integer from memory
    fn read_i64(&self, address: u64) -> Result<i64> {
        let bytes = self.read_bytes(address, 8)?;
        Ok(i64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]))
    }
}

impl ProcessHandle {
    #[cfg(target_os = "windows")]
    fn read_into(&self, address: u64, size: usize) -> (Vec<u8>, usize, Option<String>) {
        let mut buffer = vec![0u8; size];
        let mut bytes_read = 0;

        // SAFETY: ReadProcessMemory is called with:
        // - A valid process handle from ProcessHandle (obtained via OpenProcess with PROCESS_VM_READ)
        // - A properly allocated buffer of the requested size
        // - A pointer to receive the actual bytes read
        // An unmapped or protected address makes the call fail, which is reported, not faulted.
        let result = unsafe {
            ReadProcessMemory(
                self.handle(),
                address as *const _,
                buffer.as_mut_ptr() as *mut _,
                size,
                Some(&mut bytes_read),
            )
        };

        (buffer, bytes_read, result.err().map(|e| e.to_string()))
    }

    #[cfg(target_os = "windows")]
    fn read_bytes_impl(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        let (buffer, bytes_read, error) = self.read_into(address, size);

        if let Some(message) = error {
            return Err(Error::MemoryReadFailed { address, message });
        }

        // All-or-nothing: decoded structures need complete data.
        if bytes_read != size {
            return Err(Error::MemoryReadFailed {
                address,
                message: format!("Expected {} bytes, read {}", size, bytes_read),
            });
        }

        Ok(buffer)
    }

    #[cfg(target_os = "windows")]
    fn read_bytes_partial_impl(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        let (mut buffer, bytes_read, error) = self.read_into(address, size);

        // ERROR_PARTIAL_COPY still reports how much was copied
        if bytes_read == 0 {
            return Err(Error::MemoryReadFailed {
                address,
                message: error.unwrap_or_else(|| "No bytes read".to_string()),
            });
        }

        buffer.truncate(bytes_read);
        Ok(buffer)
    }

    #[cfg(not(target_os = "windows"))]
    fn read_bytes_impl(&self, address: u64, _size: usize) -> Result<Vec<u8>> {
        Err(Error::MemoryReadFailed {
            address,
            message: "Windows only: memory reading not supported on this platform".to_string(),
        })
    }

    #[cfg(not(target_os = "windows"))]
    fn read_bytes_partial_impl(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        self.read_bytes_impl(address, size)
    }
}

impl ReadMemory for ProcessHandle {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        self.read_bytes_impl(address, size)
    }

    fn read_bytes_partial(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        self.read_bytes_partial_impl(address, size)
    }
}
