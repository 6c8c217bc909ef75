//! On-disk image header
//!
//! The header sits at offset 0 of the image, inside the reserved MBR sector.
//! All fields are little-endian and packed:
//!
//! ```text
//! 0   u16  header_size
//! 2   u16  sector_count
//! 4   u64  bootstrap_offset
//! 12  u64  bootstrap_size
//! 20  u64  kernel_offset
//! 28  u64  kernel_size
//! ```

use std::io::Read;

use crate::error::{ImageError, Result};
use crate::utils::{sectors_for, MBR_END_OFFSET, SECTOR_SIZE};

/// Header describing where each payload lives in the image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    /// Size of this header in bytes
    pub header_size: u16,
    /// Total number of sectors in the image
    pub sector_count: u16,
    /// Offset of the bootstrap payload
    pub bootstrap_offset: u64,
    /// Size of the bootstrap payload
    pub bootstrap_size: u64,
    /// Offset of the kernel payload
    pub kernel_offset: u64,
    /// Size of the kernel payload
    pub kernel_size: u64,
}

const _: () = assert!((ImageHeader::SIZE as u64) < MBR_END_OFFSET);

impl ImageHeader {
    /// Encoded size in bytes
    pub const SIZE: usize = 2 + 2 + 8 * 4;

    /// Encode the header in its on-disk form
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..2].copy_from_slice(&self.header_size.to_le_bytes());
        buf[2..4].copy_from_slice(&self.sector_count.to_le_bytes());
        buf[4..12].copy_from_slice(&self.bootstrap_offset.to_le_bytes());
        buf[12..20].copy_from_slice(&self.bootstrap_size.to_le_bytes());
        buf[20..28].copy_from_slice(&self.kernel_offset.to_le_bytes());
        buf[28..36].copy_from_slice(&self.kernel_size.to_le_bytes());
        buf
    }

    /// Decode a header from the first bytes of `bytes`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(ImageError::TruncatedHeader { len: bytes.len() });
        }

        let u16_at = |off: usize| u16::from_le_bytes([bytes[off], bytes[off + 1]]);
        let u64_at = |off: usize| {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&bytes[off..off + 8]);
            u64::from_le_bytes(raw)
        };

        Ok(Self {
            header_size: u16_at(0),
            sector_count: u16_at(2),
            bootstrap_offset: u64_at(4),
            bootstrap_size: u64_at(12),
            kernel_offset: u64_at(20),
            kernel_size: u64_at(28),
        })
    }

    /// Read the header from the start of an image
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut buf = [0u8; Self::SIZE];
        let mut filled = 0;
        while filled < Self::SIZE {
            let n = reader.read(&mut buf[filled..])?;
            if n == 0 {
                return Err(ImageError::TruncatedHeader { len: filled });
            }
            filled += n;
        }
        Self::from_bytes(&buf)
    }

    /// Check the header's internal consistency
    pub fn validate(&self) -> Result<()> {
        if usize::from(self.header_size) != Self::SIZE {
            return Err(ImageError::InvalidHeader("header_size mismatch"));
        }
        if self.bootstrap_offset != MBR_END_OFFSET {
            return Err(ImageError::InvalidHeader("bootstrap not at end of MBR"));
        }
        if Some(self.kernel_offset) != self.bootstrap_offset.checked_add(self.bootstrap_size) {
            return Err(ImageError::InvalidHeader("kernel does not follow bootstrap"));
        }
        let expected = self
            .kernel_offset
            .checked_add(self.kernel_size)
            .filter(|end| *end <= u64::MAX - SECTOR_SIZE)
            .map(sectors_for)
            .ok_or(ImageError::InvalidHeader("payloads overflow the image"))?;
        if u64::from(self.sector_count) != expected {
            return Err(ImageError::InvalidHeader("sector_count does not match payloads"));
        }
        Ok(())
    }

    /// Image length implied by `sector_count`
    pub fn image_size(&self) -> u64 {
        u64::from(self.sector_count) * SECTOR_SIZE
    }
}
