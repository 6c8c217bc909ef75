//! Image layout arithmetic
//!
//! ```text
//! [0 .. header_size)             header
//! [header_size .. 512)           reserved gap, zero filled
//! [512 .. kernel_offset)         bootstrap payload
//! [kernel_offset .. data_end)    kernel payload
//! [data_end .. image_size)       0xEE padding
//! ```
//!
//! `sector_count` counts the physical image, gap included. The older logical
//! count (header + payloads only) is available from [`ImageLayout::logical_sectors`].

use crate::error::{ImageError, Result};
use crate::header::ImageHeader;
use crate::utils::{align_up, sectors_for, MBR_END_OFFSET, SECTOR_SIZE};

/// Placement of both payloads within an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageLayout {
    bootstrap_size: u64,
    kernel_size: u64,
    kernel_offset: u64,
    data_end: u64,
    image_size: u64,
    sector_count: u16,
}

impl ImageLayout {
    /// Compute the layout for the given payload sizes
    pub fn new(bootstrap_size: u64, kernel_size: u64) -> Result<Self> {
        let too_large = || ImageError::ImageTooLarge { sectors: u64::MAX };

        let kernel_offset = MBR_END_OFFSET
            .checked_add(bootstrap_size)
            .ok_or_else(too_large)?;
        let data_end = kernel_offset.checked_add(kernel_size).ok_or_else(too_large)?;
        if data_end > u64::MAX - SECTOR_SIZE {
            return Err(too_large());
        }

        let image_size = align_up(data_end, SECTOR_SIZE);
        let sectors = image_size / SECTOR_SIZE;
        let sector_count =
            u16::try_from(sectors).map_err(|_| ImageError::ImageTooLarge { sectors })?;

        Ok(Self {
            bootstrap_size,
            kernel_size,
            kernel_offset,
            data_end,
            image_size,
            sector_count,
        })
    }

    pub const fn bootstrap_size(&self) -> u64 {
        self.bootstrap_size
    }

    pub const fn kernel_size(&self) -> u64 {
        self.kernel_size
    }

    pub const fn kernel_offset(&self) -> u64 {
        self.kernel_offset
    }

    /// End of the kernel payload
    pub const fn data_end(&self) -> u64 {
        self.data_end
    }

    /// Padded image length, a whole number of sectors
    pub const fn image_size(&self) -> u64 {
        self.image_size
    }

    pub const fn header_size(&self) -> u64 {
        ImageHeader::SIZE as u64
    }

    pub const fn bootstrap_offset(&self) -> u64 {
        MBR_END_OFFSET
    }

    /// Bytes between the end of the header and the bootstrap payload
    pub const fn reserved_gap(&self) -> u64 {
        MBR_END_OFFSET - self.header_size()
    }

    /// Fill bytes after the kernel payload
    pub const fn padding(&self) -> u64 {
        self.image_size - self.data_end
    }

    pub const fn sector_count(&self) -> u16 {
        self.sector_count
    }

    /// Header plus payload bytes, ignoring the reserved gap
    pub const fn logical_size(&self) -> u64 {
        self.header_size() + self.bootstrap_size + self.kernel_size
    }

    /// Sectors needed for [`Self::logical_size`]
    pub const fn logical_sectors(&self) -> u64 {
        sectors_for(self.logical_size())
    }

    pub fn header(&self) -> ImageHeader {
        ImageHeader {
            header_size: ImageHeader::SIZE as u16,
            sector_count: self.sector_count,
            bootstrap_offset: self.bootstrap_offset(),
            bootstrap_size: self.bootstrap_size,
            kernel_offset: self.kernel_offset,
            kernel_size: self.kernel_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::is_aligned;

    #[test]
    fn test_small_payloads() {
        let layout = ImageLayout::new(3, 1).unwrap();
        assert_eq!(layout.bootstrap_offset(), 512);
        assert_eq!(layout.kernel_offset(), 515);
        assert_eq!(layout.data_end(), 516);
        assert_eq!(layout.image_size(), 1024);
        assert_eq!(layout.padding(), 508);
        assert_eq!(layout.sector_count(), 2);
        assert_eq!(layout.reserved_gap(), 476);

        // Logical count ignores the gap before the bootstrap payload
        assert_eq!(layout.logical_size(), 40);
        assert_eq!(layout.logical_sectors(), 1);
    }

    #[test]
    fn test_exact_sector_fit() {
        let layout = ImageLayout::new(512, 512).unwrap();
        assert_eq!(layout.padding(), 0);
        assert_eq!(layout.image_size(), 1536);
        assert_eq!(layout.sector_count(), 3);
    }

    #[test]
    fn test_empty_payloads() {
        let layout = ImageLayout::new(0, 0).unwrap();
        assert_eq!(layout.kernel_offset(), 512);
        assert_eq!(layout.image_size(), 512);
        assert_eq!(layout.sector_count(), 1);
    }

    #[test]
    fn test_header_matches_layout() {
        let layout = ImageLayout::new(1000, 4097).unwrap();
        let hdr = layout.header();
        assert_eq!(hdr.header_size, 36);
        assert_eq!(hdr.kernel_offset, hdr.bootstrap_offset + hdr.bootstrap_size);
        assert_eq!(hdr.image_size(), layout.image_size());
        assert!(is_aligned(hdr.image_size(), SECTOR_SIZE));
        assert!(hdr.validate().is_ok());
    }

    #[test]
    fn test_sector_count_limit() {
        let max_data = u64::from(u16::MAX) * SECTOR_SIZE - MBR_END_OFFSET;
        assert_eq!(ImageLayout::new(max_data, 0).unwrap().sector_count(), u16::MAX);

        let err = ImageLayout::new(max_data, 1).unwrap_err();
        assert!(matches!(err, ImageError::ImageTooLarge { sectors: 65536 }));

        assert!(ImageLayout::new(u64::MAX, 1).is_err());
    }
}
