//! Sparse page-backed byte memory.
//!
//! This module implements the flat memory model shared by the functional
//! units and the timing pipeline. It provides:
//! 1. **Sparse Storage:** 64 KiB pages allocated on first write; uninitialised
//!    reads yield zero.
//! 2. **Little-Endian Accessors:** 8/16/32/64-bit reads and writes composed
//!    byte-wise, so unaligned and page-straddling accesses just work.
//! 3. **Bulk Loading:** Helpers for placing program segments.

use std::collections::HashMap;

/// Size of each memory page in bytes.
const PAGE_SIZE: u64 = 64 * 1024;
/// Mask extracting the in-page offset from an address.
const PAGE_MASK: u64 = PAGE_SIZE - 1;

/// Byte-addressable memory over the full 64-bit address space.
///
/// Pages are keyed by their base address and materialised lazily. Multi-byte
/// accesses are little-endian and assembled one byte at a time, so they carry
/// no alignment requirements.
#[derive(Default)]
pub struct Memory {
    pages: HashMap<u64, Box<[u8; PAGE_SIZE as usize]>>,
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memory")
            .field("resident_pages", &self.pages.len())
            .finish()
    }
}

impl Memory {
    /// Creates an empty memory with no resident pages.
    pub fn new() -> Self {
        Self::default()
    }

    fn page(&self, addr: u64) -> Option<&[u8; PAGE_SIZE as usize]> {
        self.pages.get(&(addr & !PAGE_MASK)).map(Box::as_ref)
    }

    fn page_mut(&mut self, addr: u64) -> &mut [u8; PAGE_SIZE as usize] {
        self.pages
            .entry(addr & !PAGE_MASK)
            .or_insert_with(|| Box::new([0; PAGE_SIZE as usize]))
    }

    /// Reads a single byte. Unmapped addresses read as zero.
    pub fn read_u8(&self, addr: u64) -> u8 {
        self.page(addr)
            .map_or(0, |p| p[(addr & PAGE_MASK) as usize])
    }

    /// Writes a single byte, materialising the page if needed.
    pub fn write_u8(&mut self, addr: u64, value: u8) {
        self.page_mut(addr)[(addr & PAGE_MASK) as usize] = value;
    }

    /// Reads a 16-bit little-endian value.
    pub fn read_u16(&self, addr: u64) -> u16 {
        let mut buf = [0u8; 2];
        for (i, b) in buf.iter_mut().enumerate() {
            *b = self.read_u8(addr.wrapping_add(i as u64));
        }
        u16::from_le_bytes(buf)
    }

    /// Writes a 16-bit little-endian value.
    pub fn write_u16(&mut self, addr: u64, value: u16) {
        for (i, b) in value.to_le_bytes().iter().enumerate() {
            self.write_u8(addr.wrapping_add(i as u64), *b);
        }
    }

    /// Reads a 32-bit little-endian value.
    pub fn read_u32(&self, addr: u64) -> u32 {
        let mut buf = [0u8; 4];
        for (i, b) in buf.iter_mut().enumerate() {
            *b = self.read_u8(addr.wrapping_add(i as u64));
        }
        u32::from_le_bytes(buf)
    }

    /// Writes a 32-bit little-endian value.
    pub fn write_u32(&mut self, addr: u64, value: u32) {
        for (i, b) in value.to_le_bytes().iter().enumerate() {
            self.write_u8(addr.wrapping_add(i as u64), *b);
        }
    }

    /// Reads a 64-bit little-endian value.
    pub fn read_u64(&self, addr: u64) -> u64 {
        let mut buf = [0u8; 8];
        for (i, b) in buf.iter_mut().enumerate() {
            *b = self.read_u8(addr.wrapping_add(i as u64));
        }
        u64::from_le_bytes(buf)
    }

    /// Writes a 64-bit little-endian value.
    pub fn write_u64(&mut self, addr: u64, value: u64) {
        for (i, b) in value.to_le_bytes().iter().enumerate() {
            self.write_u8(addr.wrapping_add(i as u64), *b);
        }
    }

    /// Copies `bytes` into memory starting at `addr`.
    pub fn write_bytes(&mut self, addr: u64, bytes: &[u8]) {
        for (i, b) in bytes.iter().enumerate() {
            self.write_u8(addr.wrapping_add(i as u64), *b);
        }
    }

    /// Reads `len` bytes starting at `addr`.
    pub fn read_bytes(&self, addr: u64, len: usize) -> Vec<u8> {
        (0..len)
            .map(|i| self.read_u8(addr.wrapping_add(i as u64)))
            .collect()
    }
}
